//! Configuration loaded from `lintrack.toml`.
//!
//! Every field has a default, so a missing file is not an error. The
//! `GITHUB_TOKEN` environment variable takes precedence over the file, and
//! command-line flags take precedence over both.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::github::API_URL;

pub const DEFAULT_CONFIG_FILE: &str = "lintrack.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintrackConfig {
    /// Base URL of the GitHub REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub token: String,

    /// Login whose issues count as ours. Resolved from the token when unset.
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default = "default_issue_title")]
    pub issue_title: String,

    #[serde(default = "default_label_name")]
    pub label_name: String,

    /// Only used when the label has to be created.
    #[serde(default = "default_label_color")]
    pub label_color: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    API_URL.to_string()
}

fn default_issue_title() -> String {
    "Open Source Policy Issues".to_string()
}

fn default_label_name() -> String {
    "lintrack".to_string()
}

fn default_label_color() -> String {
    "fbca04".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for LintrackConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: String::new(),
            username: None,
            issue_title: default_issue_title(),
            label_name: default_label_name(),
            label_color: default_label_color(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LintrackConfig {
    /// Load `path`, or `lintrack.toml` in the working directory when `path` is `None`.
    ///
    /// The default file may be absent; an explicitly named one must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(token) = std::env::var("GITHUB_TOKEN")
            && !token.is_empty()
        {
            config.token = token;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("unable to open config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("unable to parse config file {}", path.display()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
