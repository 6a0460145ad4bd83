use thiserror::Error;

/// Domain-specific errors using thiserror.
///
/// Rule violations carry enough context for logs; collaborator failures
/// (`Store`, `Provider`, `Timeout`) carry internal detail that is dropped
/// when crossing into the public contract.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed {field}: {message}")]
    MalformedInput { field: String, message: String },

    #[error("Slot start {begins_at} is not aligned to the hour")]
    SlotNotAligned { begins_at: i64 },

    #[error("Interval [{begin}, {end}) is empty or inverted")]
    InvalidInterval { begin: i64, end: i64 },

    #[error("Slot start {begins_at} is not in the future")]
    SlotInPast { begins_at: i64 },

    #[error("Slot starting at {begins_at} is already taken")]
    SlotTaken { begins_at: i64 },

    #[error("User with email '{email}' already exists")]
    AlreadyExists { email: String },

    #[error("Identity '{email}' already exists at the provider")]
    ExternalAlreadyExists { email: String },

    #[error("Signup for '{email}' is already confirmed")]
    AlreadyConfirmed { email: String },

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Password rejected by identity provider: {message}")]
    WeakPassword { message: String },

    #[error("Identity is not confirmed")]
    IdentityNotConfirmed,

    #[error("Credentials do not match")]
    CredentialsMismatch,

    #[error("Confirmation code does not match")]
    ConfirmationCodeMismatch,

    #[error("Confirmation code expired")]
    ConfirmationCodeExpired,

    #[error("Store failure during {operation}: {message}")]
    Store {
        operation: &'static str,
        message: String,
    },

    #[error("Identity provider failure during {operation}: {message}")]
    Provider {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} timed out after {elapsed_ms} ms")]
    Timeout {
        operation: &'static str,
        elapsed_ms: u64,
    },
}

impl DomainError {
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn slot_not_aligned(begins_at: i64) -> Self {
        Self::SlotNotAligned { begins_at }
    }

    pub fn invalid_interval(begin: i64, end: i64) -> Self {
        Self::InvalidInterval { begin, end }
    }

    pub fn slot_in_past(begins_at: i64) -> Self {
        Self::SlotInPast { begins_at }
    }

    pub fn slot_taken(begins_at: i64) -> Self {
        Self::SlotTaken { begins_at }
    }

    pub fn already_exists(email: impl Into<String>) -> Self {
        Self::AlreadyExists {
            email: email.into(),
        }
    }

    pub fn external_already_exists(email: impl Into<String>) -> Self {
        Self::ExternalAlreadyExists {
            email: email.into(),
        }
    }

    pub fn already_confirmed(email: impl Into<String>) -> Self {
        Self::AlreadyConfirmed {
            email: email.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn weak_password(message: impl Into<String>) -> Self {
        Self::WeakPassword {
            message: message.into(),
        }
    }

    pub fn store(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Store {
            operation,
            message: err.to_string(),
        }
    }

    pub fn provider(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Provider {
            operation,
            message: err.to_string(),
        }
    }

    pub fn timeout(operation: &'static str, elapsed_ms: u64) -> Self {
        Self::Timeout {
            operation,
            elapsed_ms,
        }
    }

    /// True for failures of a collaborator rather than of a domain rule.
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Store { .. } | Self::Provider { .. } | Self::Timeout { .. }
        )
    }
}
