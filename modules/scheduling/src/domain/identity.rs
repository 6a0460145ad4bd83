use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::contract::model::{
    AuthTokens, Caller, ConfirmSignupRequest, LoginRequest, SignupRequest, User,
};
use crate::domain::bounded::{bounded, store_call};
use crate::domain::clock::Clock;
use crate::domain::error::DomainError;
use crate::domain::ports::identity::codes;
use crate::domain::ports::{IdentityProvider, ProviderError};
use crate::domain::repo::{UserDraft, UsersRepository};
use crate::domain::saga::{Compensation, CompensationGuard, SignupStep};
use crate::domain::validation::Input;
use crate::domain::ServiceConfig;

/// Selector accepted by `get_user` for the calling user.
pub const SELF_SELECTOR: &str = "@me";

/// Identity provisioning and user lookups.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UsersRepository>,
    provider: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        provider: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            provider,
            clock,
            config,
        }
    }

    /// Create the external account, then the local user. Once the provider
    /// may hold an account, any failure or abandonment deletes it again.
    #[instrument(
        name = "scheduling.identity.signup",
        skip(self, input),
        fields(email = %input.email)
    )]
    pub async fn signup(&self, input: SignupRequest) -> Result<String, DomainError> {
        info!("Provisioning user");
        let input = input.prepare()?;
        let timeout = self.config.io_timeout;

        debug!(step = SignupStep::ReserveEmail.name());
        if store_call("email_exists", timeout, self.users.email_exists(&input.email)).await? {
            return Err(DomainError::already_exists(input.email));
        }

        // Armed before the call: a timeout or cancellation may still leave
        // an account behind at the provider.
        debug!(step = SignupStep::CreateExternalAccount.name());
        let guard = CompensationGuard::arm(self.provider.clone(), input.email.clone(), timeout);
        let created = bounded(
            "create_account",
            timeout,
            self.provider.create_account(&input.email, &input.password),
        )
        .await;
        let subject = match created {
            Ok(Ok(subject)) => subject,
            Ok(Err(e)) => {
                // A coded answer is a refusal; nothing was created.
                let maybe_applied = e.code().is_none();
                unwind(guard, SignupStep::CreateExternalAccount, maybe_applied).await;
                return Err(map_signup_error(&input.email, e));
            }
            Err(e) => {
                unwind(guard, SignupStep::CreateExternalAccount, true).await;
                return Err(e);
            }
        };

        debug!(step = SignupStep::PersistLocalUser.name());
        let draft = UserDraft {
            external_subject_id: subject.clone(),
            username: input.username,
            email: input.email,
            created_at: self.clock.now_millis(),
        };
        match store_call("insert_user", timeout, self.users.insert(draft)).await {
            Ok(user) => {
                guard.disarm();
                info!(user_id = user.id, "Successfully provisioned user");
                Ok(subject)
            }
            Err(e) => {
                unwind(guard, SignupStep::PersistLocalUser, true).await;
                Err(e)
            }
        }
    }

    #[instrument(
        name = "scheduling.identity.login",
        skip(self, input),
        fields(email = %input.email)
    )]
    pub async fn login(&self, input: LoginRequest) -> Result<AuthTokens, DomainError> {
        info!("Logging in");
        let input = input.prepare()?;
        let timeout = self.config.io_timeout;

        store_call(
            "find_user_by_email",
            timeout,
            self.users.find_by_email(&input.email),
        )
        .await?
        .ok_or(DomainError::IdentityNotFound)?;

        let tokens = bounded(
            "verify_credentials",
            timeout,
            self.provider.verify_credentials(&input.email, &input.password),
        )
        .await?
        .map_err(map_login_error)?;

        info!("Successfully logged in");
        Ok(tokens)
    }

    /// Verify the emailed code and mark the local user verified.
    ///
    /// Once the provider accepts the code the request succeeds even if the
    /// local update fails; that failure is logged for reconciliation.
    #[instrument(
        name = "scheduling.identity.confirm_signup",
        skip(self, input),
        fields(email = %input.email)
    )]
    pub async fn confirm_signup(&self, input: ConfirmSignupRequest) -> Result<(), DomainError> {
        info!("Confirming signup");
        let input = input.prepare()?;
        let timeout = self.config.io_timeout;

        let mut user = store_call(
            "find_user_by_email",
            timeout,
            self.users.find_by_email(&input.email),
        )
        .await?
        .ok_or(DomainError::IdentityNotFound)?;
        if user.email_verified {
            return Err(DomainError::already_confirmed(input.email));
        }

        bounded(
            "confirm_code",
            timeout,
            self.provider.confirm_code(&input.email, &input.code),
        )
        .await?
        .map_err(map_confirm_error)?;

        user.email_verified = true;
        user.updated_at = self.clock.now_millis();
        let (user_id, email) = (user.id, user.email.clone());
        if let Err(e) = store_call("update_user", timeout, self.users.update(user)).await {
            error!(
                user_id,
                %email,
                reconcile = "email_verified",
                error = %e,
                "Provider confirmed the signup but the local user was not updated"
            );
        }

        info!("Successfully confirmed signup");
        Ok(())
    }

    #[instrument(name = "scheduling.identity.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = store_call("find_all_users", self.config.io_timeout, self.users.find_all())
            .await?;
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// `id_or_self` is a numeric user id or `@me` for the caller.
    #[instrument(name = "scheduling.identity.get_user", skip(self, subject))]
    pub async fn get_user(&self, id_or_self: &str, subject: &str) -> Result<User, DomainError> {
        let id_or_self = id_or_self.trim();
        if id_or_self == SELF_SELECTOR {
            return self.find_by_subject(subject).await;
        }

        let id: i64 = id_or_self.parse().map_err(|_| {
            DomainError::malformed("id", format!("'{id_or_self}' is neither a user id nor {SELF_SELECTOR}"))
        })?;
        store_call("find_user", self.config.io_timeout, self.users.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::not_found("user"))
    }

    /// Map the authenticated subject to the principal operations run as.
    #[instrument(name = "scheduling.identity.resolve_caller", skip_all)]
    pub async fn resolve_caller(&self, subject: &str) -> Result<Caller, DomainError> {
        debug!("Resolving caller");
        let user = self.find_by_subject(subject).await?;
        Ok(Caller {
            user_id: user.id,
            is_admin: user.is_admin,
        })
    }

    async fn find_by_subject(&self, subject: &str) -> Result<User, DomainError> {
        store_call(
            "find_user_by_subject",
            self.config.io_timeout,
            self.users.find_by_subject(subject),
        )
        .await?
        .ok_or(DomainError::IdentityNotFound)
    }
}

/// Settle the signup guard after `failed` failed, running whatever the
/// compensation table owes.
async fn unwind(guard: CompensationGuard, failed: SignupStep, maybe_applied: bool) {
    let owed = SignupStep::compensations_for(failed, maybe_applied);
    if !owed.contains(&Compensation::DeleteExternalAccount) {
        guard.disarm();
        return;
    }
    if let Err(e) = guard.compensate().await {
        error!(step = failed.name(), error = %e, "Compensating delete failed; external account orphaned");
    }
}

fn unexpected(operation: &'static str, err: ProviderError) -> DomainError {
    error!(operation, error = %err, "Identity provider call failed");
    DomainError::provider(operation, err)
}

fn map_signup_error(email: &str, err: ProviderError) -> DomainError {
    match err.code() {
        Some(codes::INVALID_PASSWORD) => DomainError::weak_password(err.to_string()),
        Some(codes::USERNAME_EXISTS) => DomainError::external_already_exists(email),
        _ => unexpected("create_account", err),
    }
}

fn map_login_error(err: ProviderError) -> DomainError {
    match err.code() {
        Some(codes::USER_NOT_FOUND) => DomainError::IdentityNotFound,
        Some(codes::USER_NOT_CONFIRMED) => DomainError::IdentityNotConfirmed,
        Some(codes::NOT_AUTHORIZED) => DomainError::CredentialsMismatch,
        _ => unexpected("verify_credentials", err),
    }
}

fn map_confirm_error(err: ProviderError) -> DomainError {
    match err.code() {
        Some(codes::CODE_MISMATCH) => DomainError::ConfirmationCodeMismatch,
        Some(codes::EXPIRED_CODE) => DomainError::ConfirmationCodeExpired,
        Some(codes::USER_NOT_FOUND) => DomainError::IdentityNotFound,
        _ => unexpected("confirm_code", err),
    }
}
