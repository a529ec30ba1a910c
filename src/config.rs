use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    pub trello: Option<TrelloConfig>,
    pub youtrack: Option<YouTrackConfig>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrelloConfig {
    pub api_key: String,
    pub token: String,
    pub board_id: String,
    #[serde(default = "default_trello_url")]
    pub base_url: String,
    #[serde(default = "default_new_list")]
    pub new_list: String,
    #[serde(default = "default_complete_list")]
    pub complete_list: String,
    #[serde(default = "default_trello_estimate")]
    pub estimate_field: String,
    #[serde(default = "default_trello_fact")]
    pub fact_field: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTrackConfig {
    /// REST root, e.g. `https://example.youtrack.cloud/api`.
    pub base_url: String,
    pub token: String,
    pub project_id: String,
    #[serde(default = "default_link_field")]
    pub link_field: String,
    #[serde(default = "default_assignee_field")]
    pub assignee_field: String,
    #[serde(default = "default_youtrack_estimate")]
    pub estimate_field: String,
    #[serde(default = "default_spent_time")]
    pub spent_time_field: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_trello_url() -> String {
    "https://api.trello.com/1".into()
}

fn default_new_list() -> String {
    "New".into()
}

fn default_complete_list() -> String {
    "Complete".into()
}

fn default_trello_estimate() -> String {
    "Estimate".into()
}

fn default_trello_fact() -> String {
    "Fact".into()
}

fn default_link_field() -> String {
    "Trello Task".into()
}

fn default_assignee_field() -> String {
    "Assignee".into()
}

fn default_youtrack_estimate() -> String {
    "Estimation".into()
}

fn default_spent_time() -> String {
    "Spent time".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bind() -> String {
    "127.0.0.1:8080".into()
}

impl AppConfig {
    pub fn trello(&self) -> Result<&TrelloConfig> {
        self.trello
            .as_ref()
            .context("No [trello] section in config.toml")
    }

    pub fn youtrack(&self) -> Result<&YouTrackConfig> {
        self.youtrack
            .as_ref()
            .context("No [youtrack] section in config.toml")
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cardsync")
        .join("config.toml")
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    Ok(config)
}
