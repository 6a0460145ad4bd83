use std::time::Duration;

pub mod appointments;
pub mod availability;
pub mod bounded;
pub mod clock;
pub mod error;
pub mod identity;
pub mod ports;
pub mod repo;
pub mod saga;
pub mod validation;

/// Settings shared by the domain services.
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// Deadline for every single store or provider call.
    pub io_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            io_timeout: Duration::from_secs(5),
        }
    }
}
