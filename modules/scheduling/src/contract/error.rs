use thiserror::Error;

use crate::domain::error::DomainError;
use crate::errors::ErrorCode;
use slotkeeper_errors::Problem;

/// Errors that are safe to expose across the module boundary.
/// Exactly one variant per catalog entry; internal detail never crosses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Slot must start exactly on the hour")]
    SlotNotAligned,

    #[error("Interval start must precede its end")]
    InvalidInterval,

    #[error("Slot must start in the future")]
    SlotInPast,

    #[error("Slot is already taken")]
    SlotTaken,

    #[error("User already exists")]
    AlreadyExists,

    #[error("Identity already exists at the provider")]
    ExternalAlreadyExists,

    #[error("Signup is already confirmed")]
    AlreadyConfirmed,

    #[error("Not found")]
    NotFound,

    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Password does not meet the provider's policy")]
    WeakPassword,

    #[error("Identity is not confirmed")]
    IdentityNotConfirmed,

    #[error("Credentials do not match")]
    CredentialsMismatch,

    #[error("Confirmation code does not match")]
    ConfirmationCodeMismatch,

    #[error("Confirmation code expired")]
    ConfirmationCodeExpired,

    #[error("Internal error")]
    Internal,
}

impl SchedulingError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Catalog entry for this error kind.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedInput { .. } => ErrorCode::scheduling_input_malformed_v1,
            Self::SlotNotAligned => ErrorCode::scheduling_slot_not_aligned_v1,
            Self::InvalidInterval => ErrorCode::scheduling_interval_invalid_v1,
            Self::SlotInPast => ErrorCode::scheduling_slot_in_past_v1,
            Self::SlotTaken => ErrorCode::scheduling_slot_taken_v1,
            Self::AlreadyExists => ErrorCode::scheduling_user_already_exists_v1,
            Self::ExternalAlreadyExists => ErrorCode::scheduling_identity_already_exists_v1,
            Self::AlreadyConfirmed => ErrorCode::scheduling_identity_already_confirmed_v1,
            Self::NotFound => ErrorCode::scheduling_resource_not_found_v1,
            Self::IdentityNotFound => ErrorCode::scheduling_identity_not_found_v1,
            Self::WeakPassword => ErrorCode::scheduling_identity_weak_password_v1,
            Self::IdentityNotConfirmed => ErrorCode::scheduling_identity_not_confirmed_v1,
            Self::CredentialsMismatch => ErrorCode::scheduling_identity_credentials_mismatch_v1,
            Self::ConfirmationCodeMismatch => ErrorCode::scheduling_identity_code_mismatch_v1,
            Self::ConfirmationCodeExpired => ErrorCode::scheduling_identity_code_expired_v1,
            Self::Internal => ErrorCode::scheduling_internal_v1,
        }
    }

    /// Suggested transport status, relayed verbatim by the boundary layer.
    pub const fn status(&self) -> u16 {
        self.code().status()
    }

    pub fn to_problem(&self, instance: &str) -> Problem {
        self.code()
            .to_problem(self.to_string())
            .with_instance(instance)
    }
}

impl From<DomainError> for SchedulingError {
    fn from(domain_error: DomainError) -> Self {
        use DomainError::*;
        match domain_error {
            MalformedInput { field, message } => Self::malformed(format!("{field}: {message}")),
            SlotNotAligned { .. } => Self::SlotNotAligned,
            InvalidInterval { .. } => Self::InvalidInterval,
            SlotInPast { .. } => Self::SlotInPast,
            SlotTaken { .. } => Self::SlotTaken,
            AlreadyExists { .. } => Self::AlreadyExists,
            ExternalAlreadyExists { .. } => Self::ExternalAlreadyExists,
            AlreadyConfirmed { .. } => Self::AlreadyConfirmed,
            NotFound { .. } => Self::NotFound,
            IdentityNotFound => Self::IdentityNotFound,
            WeakPassword { .. } => Self::WeakPassword,
            IdentityNotConfirmed => Self::IdentityNotConfirmed,
            CredentialsMismatch => Self::CredentialsMismatch,
            ConfirmationCodeMismatch => Self::ConfirmationCodeMismatch,
            ConfirmationCodeExpired => Self::ConfirmationCodeExpired,
            Store { .. } | Provider { .. } | Timeout { .. } => Self::Internal,
        }
    }
}
