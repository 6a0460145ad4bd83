use serde::{Deserialize, Serialize};
use std::fmt;

pub type UserId = i64;
pub type AppointmentId = i64;

/// A booked one-hour slot. Instants are epoch milliseconds (UTC) in memory
/// and RFC 3339 text once serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(with = "crate::contract::timestamp")]
    pub begins_at: i64,
    /// Inclusive end: `begins_at + 3_600_000 - 1`.
    #[serde(with = "crate::contract::timestamp")]
    pub ends_at: i64,
    pub owner_id: UserId,
    pub is_deleted: bool,
    pub title: Option<String>,
    #[serde(with = "crate::contract::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::contract::timestamp")]
    pub updated_at: i64,
}

/// Interval-only projection of an appointment, used for calendar rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "crate::contract::timestamp")]
    pub begins_at: i64,
    #[serde(with = "crate::contract::timestamp")]
    pub ends_at: i64,
}

impl Slot {
    /// Overlap predicate against a candidate `[begin, end)`.
    ///
    /// Strict on both sides: a stored slot ending exactly at `begin` does
    /// not conflict, which is what lets back-to-back hours coexist.
    pub const fn overlaps(&self, begin: i64, end: i64) -> bool {
        self.begins_at < end && self.ends_at > begin
    }
}

/// Occupied slots of one UTC month, ascending by `begins_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub month: String,
    pub scheduled: Vec<Slot>,
}

/// Local user record linked to an identity-provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub external_subject_id: String,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub is_admin: bool,
    #[serde(with = "crate::contract::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::contract::timestamp")]
    pub updated_at: i64,
}

/// Public projection of a user; never exposes the subject id or email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
    #[serde(with = "crate::contract::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::contract::timestamp")]
    pub updated_at: i64,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The authenticated principal an operation runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub is_admin: bool,
}

/// Request to book the slot starting at `begins_at` (RFC 3339 text).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewAppointment {
    pub begins_at: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmSignupRequest {
    pub email: String,
    pub code: String,
}

/// Tokens issued by the identity provider on a successful login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokens").finish_non_exhaustive()
    }
}
