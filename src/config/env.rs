use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack: SlackConfig,
    pub anthropic: AnthropicConfig,
    pub notion: NotionConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
    pub scheduler: SchedulerConfig,
    pub web: WebContentConfig,
    pub watermark: WatermarkConfig,
    pub listed_date_fallback: ListedDateFallback,
    pub timezone: Tz,
    pub http_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub channel_id: String,
    pub history_page_size: u32,
    pub ack_reaction: String,
    /// Empty disables the warning reaction.
    pub warning_reaction: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub token: String,
    pub database_id: String,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub data_dir: String,
    pub db_filename: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
    pub poll_cron: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WebContentConfig {
    pub fetch_timeout: Duration,
    pub content_max_length: usize,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    pub backend: WatermarkBackend,
    pub startup_lookback: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkBackend {
    Memory,
    Sqlite,
}

/// What a posting's listed date falls back to when neither the activity id
/// nor the extracted page supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListedDateFallback {
    None,
    MessageDate,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
