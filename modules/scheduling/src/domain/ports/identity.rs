use async_trait::async_trait;
use thiserror::Error;

use crate::contract::model::AuthTokens;

/// Error codes the identity provider reports, by the provider's own names.
pub mod codes {
    pub const INVALID_PASSWORD: &str = "InvalidPasswordException";
    pub const USERNAME_EXISTS: &str = "UsernameExistsException";
    pub const USER_NOT_FOUND: &str = "UserNotFoundException";
    pub const USER_NOT_CONFIRMED: &str = "UserNotConfirmedException";
    pub const NOT_AUTHORIZED: &str = "NotAuthorizedException";
    pub const CODE_MISMATCH: &str = "CodeMismatchException";
    pub const EXPIRED_CODE: &str = "ExpiredCodeException";
}

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider answered with one of its own error codes.
    #[error("{code}: {message}")]
    Coded { code: String, message: String },

    /// The provider could not be reached or answered unintelligibly.
    #[error("identity provider transport failure: {0:#}")]
    Transport(#[from] anyhow::Error),
}

impl ProviderError {
    pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Coded {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The provider code, if the failure carried one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Coded { code, .. } => Some(code.as_str()),
            Self::Transport(_) => None,
        }
    }
}

/// Transport-agnostic port to the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account; returns the provider's subject id.
    async fn create_account(&self, email: &str, password: &str) -> Result<String, ProviderError>;
    async fn delete_account(&self, email: &str) -> Result<(), ProviderError>;
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, ProviderError>;
    async fn confirm_code(&self, email: &str, code: &str) -> Result<(), ProviderError>;
}
