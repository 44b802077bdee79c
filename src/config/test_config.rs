use super::{ConfigBox, Config, Demo, Lease, Logs, Platform, Shutdown, Telemetry};
use std::time::Duration;

/// Creates a new test configuration.
pub fn new_test_config() -> Config {
    Config {
        leasekeeper: ConfigBox {
            env: super::TEST.to_string(),
            logs: Some(Logs {
                level: Some("debug".to_string()),
            }),
            lease: Lease {
                name: Some("TestLease".to_string()),
            },
            platform: Platform {
                enabled: true,
                budget: Duration::from_secs(10),
                capacity: 1,
            },
            telemetry: Telemetry {
                enabled: false,
                interval: Duration::from_secs(1),
            },
            demo: Demo {
                tasks: 2,
                delay: Duration::from_millis(500),
                spacing: Duration::from_millis(100),
            },
            shutdown: Shutdown {
                timeout: Duration::from_secs(5),
            },
        },
    }
}
