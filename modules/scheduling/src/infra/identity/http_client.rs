use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::config::IdentityProviderConfig;
use crate::contract::model::AuthTokens;
use crate::domain::ports::{IdentityProvider, ProviderError};

/// JSON-over-HTTP adapter for the identity provider gateway.
///
/// A non-2xx answer with a `{"code", "message"}` body is a coded provider
/// error; every other failure is a transport error.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base: Url,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ConfirmationBody<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct CreatedAccount {
    subject_id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

impl HttpIdentityProvider {
    pub fn new(base: Url, timeout: Duration) -> anyhow::Result<Self> {
        if base.cannot_be_a_base() {
            return Err(anyhow!("identity provider URL '{base}' cannot be a base"));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build identity provider HTTP client")?;
        Ok(Self { client, base })
    }

    pub fn from_config(cfg: &IdentityProviderConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid identity provider base_url '{}'", cfg.base_url))?;
        Self::new(base, cfg.timeout)
    }

    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("identity provider URL '{}' cannot be a base", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = request
            .send()
            .await
            .with_context(|| format!("{operation}: request failed"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("{operation}: reading error body failed"))?;
        match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(err) => {
                debug!(operation, %status, code = %err.code, "Identity provider refused");
                Err(ProviderError::coded(err.code, err.message))
            }
            Err(_) => Err(ProviderError::Transport(anyhow!(
                "{operation}: unexpected HTTP {status}"
            ))),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(name = "scheduling.http.identity.create_account", skip_all, fields(base = %self.base))]
    async fn create_account(&self, email: &str, password: &str) -> Result<String, ProviderError> {
        let url = self.endpoint(&["accounts"])?;
        let response = self
            .send(
                "create_account",
                self.client.post(url).json(&Credentials { email, password }),
            )
            .await?;
        let created: CreatedAccount = response
            .json()
            .await
            .context("create_account: malformed response body")?;
        Ok(created.subject_id)
    }

    #[instrument(name = "scheduling.http.identity.delete_account", skip_all, fields(base = %self.base))]
    async fn delete_account(&self, email: &str) -> Result<(), ProviderError> {
        let url = self.endpoint(&["accounts", email])?;
        self.send("delete_account", self.client.delete(url)).await?;
        Ok(())
    }

    #[instrument(name = "scheduling.http.identity.verify_credentials", skip_all, fields(base = %self.base))]
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, ProviderError> {
        let url = self.endpoint(&["sessions"])?;
        let response = self
            .send(
                "verify_credentials",
                self.client.post(url).json(&Credentials { email, password }),
            )
            .await?;
        let tokens: AuthTokens = response
            .json()
            .await
            .context("verify_credentials: malformed response body")?;
        Ok(tokens)
    }

    #[instrument(name = "scheduling.http.identity.confirm_code", skip_all, fields(base = %self.base))]
    async fn confirm_code(&self, email: &str, code: &str) -> Result<(), ProviderError> {
        let url = self.endpoint(&["accounts", email, "confirmation"])?;
        self.send(
            "confirm_code",
            self.client.post(url).json(&ConfirmationBody { code }),
        )
        .await?;
        Ok(())
    }
}
