//! SeaORM-backed repositories for the domain ports.
//!
//! Both are generic over `C: ConnectionTrait`, so they run on a
//! `DatabaseConnection` or inside a transaction.

use anyhow::Context;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use crate::contract::model::{Appointment, AppointmentId, Slot, User, UserId};
use crate::domain::repo::{AppointmentDraft, AppointmentsRepository, UserDraft, UsersRepository};
use crate::infra::storage::entity::appointment::{
    ActiveModel as AppointmentAM, Column as AppointmentColumn, Entity as AppointmentEntity,
};
use crate::infra::storage::entity::user::{
    ActiveModel as UserAM, Column as UserColumn, Entity as UserEntity,
};

pub struct SeaOrmAppointmentsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAppointmentsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> AppointmentsRepository for SeaOrmAppointmentsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: AppointmentId) -> anyhow::Result<Option<Appointment>> {
        let found = AppointmentEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_owner(&self, owner_id: UserId) -> anyhow::Result<Vec<Appointment>> {
        let rows = AppointmentEntity::find()
            .filter(AppointmentColumn::IsDeleted.eq(false))
            .filter(AppointmentColumn::OwnerId.eq(owner_id))
            .order_by_asc(AppointmentColumn::BeginsAt)
            .all(&self.conn)
            .await
            .context("find_by_owner failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Appointment>> {
        let rows = AppointmentEntity::find()
            .filter(AppointmentColumn::IsDeleted.eq(false))
            .order_by_asc(AppointmentColumn::BeginsAt)
            .all(&self.conn)
            .await
            .context("find_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_overlapping(&self, begin: i64, end: i64) -> anyhow::Result<u64> {
        AppointmentEntity::find()
            .filter(AppointmentColumn::IsDeleted.eq(false))
            .filter(AppointmentColumn::BeginsAt.lt(end))
            .filter(AppointmentColumn::EndsAt.gt(begin))
            .count(&self.conn)
            .await
            .context("count_overlapping failed")
    }

    async fn find_overlapping_slots(&self, begin: i64, end: i64) -> anyhow::Result<Vec<Slot>> {
        let rows: Vec<(i64, i64)> = AppointmentEntity::find()
            .select_only()
            .column(AppointmentColumn::BeginsAt)
            .column(AppointmentColumn::EndsAt)
            .filter(AppointmentColumn::IsDeleted.eq(false))
            .filter(AppointmentColumn::BeginsAt.lt(end))
            .filter(AppointmentColumn::EndsAt.gt(begin))
            .order_by_asc(AppointmentColumn::BeginsAt)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("find_overlapping_slots failed")?;
        Ok(rows
            .into_iter()
            .map(|(begins_at, ends_at)| Slot { begins_at, ends_at })
            .collect())
    }

    async fn insert_if_free(&self, draft: AppointmentDraft) -> anyhow::Result<Option<Appointment>> {
        let m = AppointmentAM {
            id: NotSet,
            begins_at: Set(draft.begins_at),
            ends_at: Set(draft.ends_at),
            owner_id: Set(draft.owner_id),
            is_deleted: Set(false),
            title: Set(draft.title),
            created_at: Set(draft.created_at),
            updated_at: Set(draft.created_at),
        };
        match m.insert(&self.conn).await {
            Ok(model) => Ok(Some(model.into())),
            // The live-slot index rejected a second live row for this hour.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(None),
            Err(e) => Err(e).context("insert_if_free failed"),
        }
    }

    async fn soft_delete(&self, id: AppointmentId, at: i64) -> anyhow::Result<bool> {
        let res = AppointmentEntity::update_many()
            .col_expr(AppointmentColumn::IsDeleted, Expr::value(true))
            .col_expr(AppointmentColumn::UpdatedAt, Expr::value(at))
            .filter(AppointmentColumn::Id.eq(id))
            .filter(AppointmentColumn::IsDeleted.eq(false))
            .exec(&self.conn)
            .await
            .context("soft_delete failed")?;
        Ok(res.rows_affected > 0)
    }
}

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: UserId) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(UserColumn::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_subject(&self, subject: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(UserColumn::ExternalSubjectId.eq(subject))
            .one(&self.conn)
            .await
            .context("find_by_subject failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        let rows = UserEntity::find()
            .order_by_asc(UserColumn::Id)
            .all(&self.conn)
            .await
            .context("find_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(UserColumn::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, draft: UserDraft) -> anyhow::Result<User> {
        let m = UserAM {
            id: NotSet,
            external_subject_id: Set(draft.external_subject_id),
            username: Set(draft.username),
            email: Set(draft.email),
            email_verified: Set(false),
            is_admin: Set(false),
            created_at: Set(draft.created_at),
            updated_at: Set(draft.created_at),
        };
        let model = m.insert(&self.conn).await.context("insert failed")?;
        Ok(model.into())
    }

    async fn update(&self, u: User) -> anyhow::Result<()> {
        let m = UserAM {
            id: Set(u.id),
            external_subject_id: Set(u.external_subject_id),
            username: Set(u.username),
            email: Set(u.email),
            email_verified: Set(u.email_verified),
            is_admin: Set(u.is_admin),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        };
        m.update(&self.conn).await.context("update failed")?;
        Ok(())
    }
}
