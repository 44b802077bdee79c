// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const PROD: &str = "prod";
pub const TEST: &str = "test";

/// Name handed to the environment for every grant unless configured.
pub const DEFAULT_LEASE_NAME: &str = "LeaseCoordinatorTask";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Root {
    #[serde(rename = "leasekeeper")]
    pub leasekeeper: ConfigBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfigBox {
    pub env: String,
    pub logs: Option<Logs>,
    #[serde(default)]
    pub lease: Lease,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub telemetry: Telemetry,
    #[serde(default)]
    pub demo: Demo,
    #[serde(default)]
    pub shutdown: Shutdown,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Lease {
    pub name: Option<String>,
}

/// Simulated platform that hands out extensions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Platform {
    pub enabled: bool,
    /// How long a grant lives before the platform revokes it.
    #[serde(with = "humantime_serde")]
    pub budget: Duration,
    /// Simultaneous grants the platform hands out.
    pub capacity: usize,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            enabled: true,
            budget: Duration::from_secs(30),
            capacity: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Telemetry {
    pub enabled: bool,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(5),
        }
    }
}

/// Deferred actions scheduled by the binary.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Demo {
    pub tasks: usize,
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
    #[serde(with = "humantime_serde")]
    pub spacing: Duration,
}

impl Default for Demo {
    fn default() -> Self {
        Self {
            tasks: 3,
            delay: Duration::from_secs(5),
            spacing: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Shutdown {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    fn lease_name(&self) -> &str;
    fn platform(&self) -> &Platform;
    fn telemetry(&self) -> &Telemetry;
    fn demo(&self) -> &Demo;
    fn shutdown(&self) -> &Shutdown;
}

// Config type alias for convenience
pub type Config = Root;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.leasekeeper.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.leasekeeper.env == PROD
    }

    fn lease_name(&self) -> &str {
        self.leasekeeper
            .lease
            .name
            .as_deref()
            .unwrap_or(DEFAULT_LEASE_NAME)
    }

    fn platform(&self) -> &Platform {
        &self.leasekeeper.platform
    }

    fn telemetry(&self) -> &Telemetry {
        &self.leasekeeper.telemetry
    }

    fn demo(&self) -> &Demo {
        &self.leasekeeper.demo
    }

    fn shutdown(&self) -> &Shutdown {
        &self.leasekeeper.shutdown
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        Self::parse(&data).with_context(|| format!("unmarshal yaml from {:?}", abs_path))
    }

    /// Parses and validates configuration from YAML text.
    pub fn parse(data: &str) -> Result<Self> {
        let cfg: Root = serde_yaml::from_str(data)?;

        if cfg.leasekeeper.platform.capacity == 0 {
            anyhow::bail!("platform.capacity must be at least 1");
        }
        if cfg.leasekeeper.telemetry.enabled && cfg.leasekeeper.telemetry.interval.is_zero() {
            anyhow::bail!("telemetry.interval must be positive when telemetry is enabled");
        }
        if let Some(name) = cfg.leasekeeper.lease.name.as_deref() {
            if name.trim().is_empty() {
                anyhow::bail!("lease.name must not be blank");
            }
        }

        Ok(cfg)
    }
}


// Test config is always available for integration tests
mod test_config;
pub use test_config::new_test_config;
