//! Signup as an explicit saga: forward steps, each with its compensating
//! action, plus a drop guard that runs the compensation when the signup is
//! abandoned after the external account exists.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::domain::bounded::bounded;
use crate::domain::error::DomainError;
use crate::domain::ports::identity::codes;
use crate::domain::ports::IdentityProvider;

/// Forward steps of a signup, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStep {
    /// Local email uniqueness check; nothing external has happened yet.
    ReserveEmail,
    /// Account creation at the identity provider.
    CreateExternalAccount,
    /// Local user record insertion; the last step, so it commits the saga.
    PersistLocalUser,
}

/// Action that undoes a completed step when a later step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    Nothing,
    DeleteExternalAccount,
}

impl SignupStep {
    pub const ORDER: [SignupStep; 3] = [
        SignupStep::ReserveEmail,
        SignupStep::CreateExternalAccount,
        SignupStep::PersistLocalUser,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SignupStep::ReserveEmail => "reserve_email",
            SignupStep::CreateExternalAccount => "create_external_account",
            SignupStep::PersistLocalUser => "persist_local_user",
        }
    }

    pub const fn compensation(self) -> Compensation {
        match self {
            SignupStep::CreateExternalAccount => Compensation::DeleteExternalAccount,
            SignupStep::ReserveEmail | SignupStep::PersistLocalUser => Compensation::Nothing,
        }
    }

    /// Compensations owed when `failed` fails, latest step first.
    ///
    /// `maybe_applied` is set when the failed step may still have taken
    /// effect (a timeout or transport failure), so its own compensation is
    /// owed too.
    pub fn compensations_for(failed: SignupStep, maybe_applied: bool) -> Vec<Compensation> {
        let idx = Self::ORDER
            .iter()
            .position(|s| *s == failed)
            .unwrap_or(Self::ORDER.len());
        let end = (if maybe_applied { idx + 1 } else { idx }).min(Self::ORDER.len());
        Self::ORDER[..end]
            .iter()
            .rev()
            .map(|s| s.compensation())
            .filter(|c| *c != Compensation::Nothing)
            .collect()
    }
}

/// Delete the external account for `email`. An account that is already
/// gone counts as deleted, so this is safe to repeat.
pub async fn delete_external_account(
    provider: &dyn IdentityProvider,
    email: &str,
    io_timeout: Duration,
) -> Result<(), DomainError> {
    match bounded("delete_account", io_timeout, provider.delete_account(email)).await? {
        Ok(()) => Ok(()),
        Err(e) if e.code() == Some(codes::USER_NOT_FOUND) => Ok(()),
        Err(e) => Err(DomainError::provider("delete_account", e)),
    }
}

/// Owes a `DeleteExternalAccount` until disarmed.
///
/// Dropping an armed guard (a cancelled signup future) spawns the delete on
/// the current Tokio runtime.
pub struct CompensationGuard {
    provider: Arc<dyn IdentityProvider>,
    email: String,
    io_timeout: Duration,
    armed: bool,
}

impl CompensationGuard {
    pub fn arm(provider: Arc<dyn IdentityProvider>, email: String, io_timeout: Duration) -> Self {
        Self {
            provider,
            email,
            io_timeout,
            armed: true,
        }
    }

    /// The saga committed; nothing is owed anymore.
    pub fn disarm(mut self) {
        self.armed = false;
    }

    /// Run the compensation now, exactly once.
    pub async fn compensate(mut self) -> Result<(), DomainError> {
        self.armed = false;
        info!(email = %self.email, "Compensating signup: deleting external account");
        delete_external_account(self.provider.as_ref(), &self.email, self.io_timeout).await
    }
}

impl Drop for CompensationGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let email = std::mem::take(&mut self.email);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(%email, "Signup abandoned after external account creation; compensating");
                let provider = self.provider.clone();
                let io_timeout = self.io_timeout;
                handle.spawn(async move {
                    if let Err(e) =
                        delete_external_account(provider.as_ref(), &email, io_timeout).await
                    {
                        error!(%email, error = %e, "Compensating delete failed; external account orphaned");
                    }
                });
            }
            Err(_) => {
                error!(%email, "No runtime to compensate abandoned signup; external account orphaned");
            }
        }
    }
}
