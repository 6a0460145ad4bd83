use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::config::SchedulingConfig;
use crate::contract::client::SchedulingApi;
use crate::domain::appointments::AppointmentService;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::identity::IdentityService;
use crate::domain::ports::IdentityProvider;
use crate::domain::ServiceConfig;
use crate::gateways::local::SchedulingLocalClient;
use crate::infra::identity::HttpIdentityProvider;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{SeaOrmAppointmentsRepository, SeaOrmUsersRepository};

/// The scheduling module, wired to a SeaORM connection.
#[derive(Clone)]
pub struct Scheduling {
    db: DatabaseConnection,
    api: Arc<dyn SchedulingApi>,
}

impl Scheduling {
    /// Wire against the configured HTTP identity provider and the system clock.
    pub fn init(cfg: &SchedulingConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        info!("Initializing scheduling module");
        debug!(
            io_timeout = ?cfg.io_timeout,
            identity_base_url = %cfg.identity_provider.base_url,
            "Loaded scheduling config"
        );
        let provider = HttpIdentityProvider::from_config(&cfg.identity_provider)?;
        Ok(Self::with_collaborators(
            cfg,
            db,
            Arc::new(provider),
            Arc::new(SystemClock),
        ))
    }

    /// Wire with explicit identity provider and clock.
    pub fn with_collaborators(
        cfg: &SchedulingConfig,
        db: DatabaseConnection,
        provider: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let service_config = ServiceConfig {
            io_timeout: cfg.io_timeout,
        };
        let appointments = AppointmentService::new(
            Arc::new(SeaOrmAppointmentsRepository::new(db.clone())),
            clock.clone(),
            service_config,
        );
        let identity = IdentityService::new(
            Arc::new(SeaOrmUsersRepository::new(db.clone())),
            provider,
            clock,
            service_config,
        );
        let api: Arc<dyn SchedulingApi> = Arc::new(SchedulingLocalClient::new(
            Arc::new(appointments),
            Arc::new(identity),
        ));
        Self { db, api }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Running scheduling database migrations");
        Migrator::up(&self.db, None).await?;
        info!("Scheduling database migrations completed successfully");
        Ok(())
    }

    /// In-process client for the inbound surface.
    pub fn api(&self) -> Arc<dyn SchedulingApi> {
        self.api.clone()
    }
}
