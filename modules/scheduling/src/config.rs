use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the scheduling module (`modules.scheduling`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulingConfig {
    /// Deadline for each record-store and identity-provider call.
    #[serde(default = "default_io_timeout", with = "humantime_serde")]
    pub io_timeout: Duration,
    #[serde(default)]
    pub identity_provider: IdentityProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityProviderConfig {
    #[serde(default = "default_identity_base_url")]
    pub base_url: String,
    /// HTTP client timeout for provider requests.
    #[serde(default = "default_identity_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            io_timeout: default_io_timeout(),
            identity_provider: IdentityProviderConfig::default(),
        }
    }
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_identity_base_url(),
            timeout: default_identity_timeout(),
        }
    }
}

fn default_io_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_identity_base_url() -> String {
    "http://identity.local".to_string()
}

fn default_identity_timeout() -> Duration {
    Duration::from_secs(5)
}
