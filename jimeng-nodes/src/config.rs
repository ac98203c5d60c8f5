//! Node configuration
//!
//! Defines the settings shared by all nodes: where the generation service
//! lives, where saved videos go, and how long to wait for a task.

use std::path::PathBuf;
use std::time::Duration;

use jimeng_client::{DEFAULT_BASE_URL, PollPolicy};

/// Node configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Generation service base URL
    pub api_base_url: String,

    /// Credential used when a client node is given an empty key
    pub api_key: Option<String>,

    /// Root directory for saved videos
    pub output_dir: PathBuf,

    /// Sleep between task status queries
    pub poll_interval: Duration,

    /// Total time to wait for a task before giving up
    pub task_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            output_dir: output_dir.into(),
            poll_interval: Duration::from_secs(5),
            task_timeout: Duration::from_secs(300), // 5 minutes
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - ARK_BASE_URL (default: the public service endpoint)
    /// - ARK_API_KEY
    /// - JIMENG_OUTPUT_DIR (default: output)
    /// - POLL_INTERVAL (seconds, default: 5)
    /// - TASK_TIMEOUT (seconds, default: 300)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let api_base_url = std::env::var("ARK_BASE_URL").unwrap_or(defaults.api_base_url);

        let api_key = std::env::var("ARK_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let output_dir = std::env::var("JIMENG_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let poll_interval = parse_secs("POLL_INTERVAL")?.unwrap_or(defaults.poll_interval);
        let task_timeout = parse_secs("TASK_TIMEOUT")?.unwrap_or(defaults.task_timeout);

        Ok(Self {
            api_base_url,
            api_key,
            output_dir,
            poll_interval,
            task_timeout,
        })
    }

    /// Poll loop timing derived from this configuration
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.task_timeout, self.poll_interval)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            anyhow::bail!("api_base_url must start with http:// or https://");
        }

        if self.output_dir.as_os_str().is_empty() {
            anyhow::bail!("output_dir cannot be empty");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.task_timeout < self.poll_interval {
            anyhow::bail!("task_timeout must be at least one poll_interval");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("output")
    }
}

fn parse_secs(var: &str) -> anyhow::Result<Option<Duration>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds, got '{}'", var, raw)),
        Err(_) => Ok(None),
    }
}
