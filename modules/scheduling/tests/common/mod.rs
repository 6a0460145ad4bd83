#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use scheduling::contract::model::{AuthTokens, User, UserId};
use scheduling::domain::clock::{parse_timestamp, Clock};
use scheduling::domain::ports::{IdentityProvider, ProviderError};
use scheduling::domain::repo::{UserDraft, UsersRepository};
use scheduling::infra::storage::migrations::Migrator;
use scheduling::infra::storage::SeaOrmUsersRepository;

/// Clock pinned to a settable instant.
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn at(text: &str) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(ts(text))))
    }

    pub fn set(&self, text: &str) {
        self.0.store(ts(text), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn ts(text: &str) -> i64 {
    parse_timestamp(text).unwrap()
}

/// Fresh in-memory SQLite with migrations applied. One pooled connection
/// keeps every query on the same database.
pub async fn sqlite() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Insert a user straight into the store, optionally promoted to admin.
pub async fn seed_user(db: &DatabaseConnection, subject: &str, is_admin: bool) -> User {
    let repo = SeaOrmUsersRepository::new(db.clone());
    let mut user = repo
        .insert(UserDraft {
            external_subject_id: subject.to_string(),
            username: subject.to_string(),
            email: format!("{subject}@example.com"),
            created_at: 0,
        })
        .await
        .unwrap();
    if is_admin {
        user.is_admin = true;
        repo.update(user.clone()).await.unwrap();
    }
    user
}

/// Scripted identity provider that counts calls per operation.
#[derive(Default)]
pub struct MockIdentityProvider {
    pub created: AtomicUsize,
    pub deleted: AtomicUsize,
    pub verified: AtomicUsize,
    pub confirmed: AtomicUsize,
    create_failure: Mutex<Option<String>>,
    delete_failure: Mutex<Option<String>>,
    verify_failure: Mutex<Option<String>>,
    confirm_failure: Mutex<Option<String>>,
    create_delay: Mutex<Option<Duration>>,
}

fn scripted(slot: &Mutex<Option<String>>) -> Result<(), ProviderError> {
    match slot.lock().unwrap().clone() {
        None => Ok(()),
        Some(code) if code == "transport" => {
            Err(ProviderError::Transport(anyhow::anyhow!("connection reset")))
        }
        Some(code) => Err(ProviderError::coded(code, "scripted failure")),
    }
}

impl MockIdentityProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail `create_account` with a provider code, or `"transport"`.
    pub fn fail_create(&self, code: &str) {
        *self.create_failure.lock().unwrap() = Some(code.to_string());
    }

    /// Create the account, then answer only after `delay`.
    pub fn delay_create(&self, delay: Duration) {
        *self.create_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_delete(&self, code: &str) {
        *self.delete_failure.lock().unwrap() = Some(code.to_string());
    }

    pub fn fail_verify(&self, code: &str) {
        *self.verify_failure.lock().unwrap() = Some(code.to_string());
    }

    pub fn fail_confirm(&self, code: &str) {
        *self.confirm_failure.lock().unwrap() = Some(code.to_string());
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn create_account(&self, email: &str, _password: &str) -> Result<String, ProviderError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let delay = *self.create_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        scripted(&self.create_failure)?;
        Ok(format!("sub-{email}"))
    }

    async fn delete_account(&self, _email: &str) -> Result<(), ProviderError> {
        self.deleted.fetch_add(1, Ordering::SeqCst);
        scripted(&self.delete_failure)
    }

    async fn verify_credentials(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<AuthTokens, ProviderError> {
        self.verified.fetch_add(1, Ordering::SeqCst);
        scripted(&self.verify_failure)?;
        Ok(AuthTokens {
            access_token: format!("access-{email}"),
            id_token: format!("id-{email}"),
        })
    }

    async fn confirm_code(&self, _email: &str, _code: &str) -> Result<(), ProviderError> {
        self.confirmed.fetch_add(1, Ordering::SeqCst);
        scripted(&self.confirm_failure)
    }
}

/// How `FaultyUsersRepository` misbehaves on writes.
#[derive(Clone, Copy, Debug)]
pub enum WriteFault {
    None,
    /// `insert` and `update` return an error.
    Fail,
    /// `insert` and `update` never complete.
    Hang,
}

/// Real repository whose writes can be made to fail or hang.
pub struct FaultyUsersRepository {
    inner: Arc<dyn UsersRepository>,
    fault: Mutex<WriteFault>,
}

impl FaultyUsersRepository {
    pub fn new(inner: Arc<dyn UsersRepository>, fault: WriteFault) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fault: Mutex::new(fault),
        })
    }

    pub fn set_fault(&self, fault: WriteFault) {
        *self.fault.lock().unwrap() = fault;
    }

    async fn gate(&self) -> Result<()> {
        let fault = *self.fault.lock().unwrap();
        match fault {
            WriteFault::None => Ok(()),
            WriteFault::Fail => Err(anyhow::anyhow!("database is locked")),
            WriteFault::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl UsersRepository for FaultyUsersRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>> {
        self.inner.find_by_subject(subject).await
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        self.inner.find_all().await
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        self.inner.email_exists(email).await
    }

    async fn insert(&self, draft: UserDraft) -> Result<User> {
        self.gate().await?;
        self.inner.insert(draft).await
    }

    async fn update(&self, u: User) -> Result<()> {
        self.gate().await?;
        self.inner.update(u).await
    }
}
