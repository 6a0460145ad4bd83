use crate::contract::model::{Appointment, User};
use crate::infra::storage::entity::{appointment, user};

impl From<appointment::Model> for Appointment {
    fn from(m: appointment::Model) -> Self {
        Self {
            id: m.id,
            begins_at: m.begins_at,
            ends_at: m.ends_at,
            owner_id: m.owner_id,
            is_deleted: m.is_deleted,
            title: m.title,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            external_subject_id: m.external_subject_id,
            username: m.username,
            email: m.email,
            email_verified: m.email_verified,
            is_admin: m.is_admin,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
