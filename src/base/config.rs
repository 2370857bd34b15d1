//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use reqwest::Url;
use serde::Deserialize;

use crate::service::genie::poll::PollPolicy;

use super::types::Res;

/// Default Genie API route family, relative to the host.
fn default_genie_api_path() -> String {
    "ajax-api/2.0/data-rooms".to_string()
}

/// Default number of status checks before a job is reported as timed out.
fn default_poll_max_attempts() -> u32 {
    10
}

/// Default wait between status checks, in seconds.
fn default_poll_interval_secs() -> u64 {
    5
}

/// Default growth factor of the wait between status checks (1 keeps it fixed).
fn default_poll_backoff_factor() -> u32 {
    1
}

/// Default ceiling on the wait between status checks, in seconds.
fn default_poll_max_interval_secs() -> u64 {
    30
}

/// Default number of jobs allowed to talk to Genie at once.
fn default_max_concurrent_jobs() -> usize {
    16
}

/// Configuration for the genie-bridge application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The shared configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Configuration values, with their environment variable names (prefixed with `GENIE_BRIDGE_`).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Databricks workspace URL (`GENIE_HOST`).
    pub genie_host: String,
    /// Databricks personal access token (`GENIE_TOKEN`).
    pub genie_token: String,
    /// Genie space (room) to ask questions in (`GENIE_SPACE_ID`).
    pub genie_space_id: String,
    /// Route family under the host (`GENIE_API_PATH`).
    /// The public API lives under `api/2.0/genie/spaces`.
    #[serde(default = "default_genie_api_path")]
    pub genie_api_path: String,
    /// Status checks per job before giving up (`POLL_MAX_ATTEMPTS`).
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
    /// Wait between status checks, in seconds (`POLL_INTERVAL_SECS`).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Multiplier applied to the wait after every pending check (`POLL_BACKOFF_FACTOR`).
    #[serde(default = "default_poll_backoff_factor")]
    pub poll_backoff_factor: u32,
    /// Ceiling for the wait between status checks, in seconds (`POLL_MAX_INTERVAL_SECS`).
    #[serde(default = "default_poll_max_interval_secs")]
    pub poll_max_interval_secs: u64,
    /// Jobs allowed to talk to Genie at once (`MAX_CONCURRENT_JOBS`).
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    /// Slack app token (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Port for the liveness endpoint; disabled when unset (`HEALTH_PORT`).
    #[serde(default)]
    pub health_port: Option<u16>,
}

impl Config {
    /// Load the configuration from the environment and an optional TOML file, then validate it.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("GENIE_BRIDGE"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Checks the values that would otherwise only fail once a job runs.
    pub fn validate(&self) -> Res<()> {
        let host = Url::parse(&self.genie_host).map_err(|e| anyhow::anyhow!("Genie host must be an absolute URL: {e}"))?;

        if host.scheme() != "http" && host.scheme() != "https" {
            return Err(anyhow::anyhow!("Genie host must use http or https."));
        }

        if self.genie_token.is_empty() {
            return Err(anyhow::anyhow!("Genie token must not be empty."));
        }

        if self.genie_space_id.is_empty() {
            return Err(anyhow::anyhow!("Genie space ID must not be empty."));
        }

        if self.poll_max_attempts < 1 {
            return Err(anyhow::anyhow!("Poll max attempts must be at least 1."));
        }

        if self.poll_backoff_factor < 1 {
            return Err(anyhow::anyhow!("Poll backoff factor must be at least 1."));
        }

        if self.max_concurrent_jobs < 1 {
            return Err(anyhow::anyhow!("Max concurrent jobs must be at least 1."));
        }

        Ok(())
    }

    /// The poll schedule every job follows.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.poll_max_attempts,
            interval: Duration::from_secs(self.poll_interval_secs),
            backoff_factor: self.poll_backoff_factor,
            max_interval: Duration::from_secs(self.poll_max_interval_secs.max(self.poll_interval_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_inner() -> ConfigInner {
        ConfigInner {
            genie_host: "https://dbc-123.cloud.databricks.com".to_string(),
            genie_token: "dapi-test".to_string(),
            genie_space_id: "01ef-space".to_string(),
            genie_api_path: default_genie_api_path(),
            poll_max_attempts: default_poll_max_attempts(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_backoff_factor: default_poll_backoff_factor(),
            poll_max_interval_secs: default_poll_max_interval_secs(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            ..Default::default()
        }
    }

    fn config(inner: ConfigInner) -> Config {
        Config { inner: Arc::new(inner) }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(config(valid_inner()).validate().is_ok());
    }

    #[test]
    fn test_rejects_relative_host() {
        let inner = ConfigInner {
            genie_host: "dbc-123.cloud.databricks.com".to_string(),
            ..valid_inner()
        };

        assert!(config(inner).validate().is_err());
    }

    #[test]
    fn test_rejects_missing_credentials() {
        let inner = ConfigInner {
            genie_token: String::new(),
            ..valid_inner()
        };
        assert!(config(inner).validate().is_err());

        let inner = ConfigInner {
            genie_space_id: String::new(),
            ..valid_inner()
        };
        assert!(config(inner).validate().is_err());
    }

    #[test]
    fn test_rejects_zero_budgets() {
        let inner = ConfigInner {
            poll_max_attempts: 0,
            ..valid_inner()
        };
        assert!(config(inner).validate().is_err());

        let inner = ConfigInner {
            max_concurrent_jobs: 0,
            ..valid_inner()
        };
        assert!(config(inner).validate().is_err());
    }

    #[test]
    fn test_default_poll_policy_is_ten_by_five_seconds() {
        let policy = config(valid_inner()).poll_policy();

        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.backoff_factor, 1);
    }

    #[test]
    fn test_load_from_file() {
        // Socket Mode needs only the app and bot tokens.
        let dir = std::env::temp_dir().join(format!("genie-bridge-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        std::fs::write(
            &path,
            r#"
genie_host = "https://dbc-123.cloud.databricks.com"
genie_token = "dapi-test"
genie_space_id = "01ef-space"
poll_max_attempts = 3
slack_app_token = "xapp-test"
slack_bot_token = "xoxb-test"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.poll_max_attempts, 3);
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.genie_api_path, "ajax-api/2.0/data-rooms");
        assert_eq!(config.health_port, None);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
