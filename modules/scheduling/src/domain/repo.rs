use crate::contract::model::{Appointment, AppointmentId, Slot, User, UserId};
use async_trait::async_trait;

/// Appointment fields the lifecycle manager decides before insertion; the
/// store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub begins_at: i64,
    pub ends_at: i64,
    pub owner_id: UserId,
    pub title: Option<String>,
    pub created_at: i64,
}

/// User fields the provisioning saga decides before insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub external_subject_id: String,
    pub username: String,
    pub email: String,
    pub created_at: i64,
}

/// Port for appointment persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait AppointmentsRepository: Send + Sync {
    /// Load an appointment by id, soft-deleted or not.
    async fn find_by_id(&self, id: AppointmentId) -> anyhow::Result<Option<Appointment>>;
    /// Live appointments owned by `owner_id`.
    async fn find_by_owner(&self, owner_id: UserId) -> anyhow::Result<Vec<Appointment>>;
    /// Live appointments of every owner.
    async fn find_all(&self) -> anyhow::Result<Vec<Appointment>>;
    /// Number of live appointments with `begins_at < end && ends_at > begin`.
    async fn count_overlapping(&self, begin: i64, end: i64) -> anyhow::Result<u64>;
    /// Intervals of live appointments overlapping `[begin, end)`, ascending
    /// by `begins_at`.
    async fn find_overlapping_slots(&self, begin: i64, end: i64) -> anyhow::Result<Vec<Slot>>;
    /// Insert unless the store's slot constraint rejects the row.
    ///
    /// `Ok(None)` means another live appointment already holds the slot.
    async fn insert_if_free(&self, draft: AppointmentDraft) -> anyhow::Result<Option<Appointment>>;
    /// Flag as deleted. Returns true if a live row was updated.
    async fn soft_delete(&self, id: AppointmentId, at: i64) -> anyhow::Result<bool>;
}

/// Port for user persistence.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_subject(&self, subject: &str) -> anyhow::Result<Option<User>>;
    async fn find_all(&self) -> anyhow::Result<Vec<User>>;
    /// Check uniqueness by email.
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    /// Insert with `email_verified = false` and `is_admin = false`.
    async fn insert(&self, draft: UserDraft) -> anyhow::Result<User>;
    /// Update an existing user (by primary key in `u.id`).
    async fn update(&self, u: User) -> anyhow::Result<()>;
}
