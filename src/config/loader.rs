use std::{env, time::Duration};

use chrono_tz::Tz;

use super::env::{
    AnthropicConfig, AppConfig, ConfigError, DirectoryConfig, ListedDateFallback, LoggingConfig,
    NotionConfig, SchedulerConfig, SlackConfig, WatermarkBackend, WatermarkConfig,
    WebContentConfig,
};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    /// Builds the configuration from an arbitrary key lookup so tests do not
    /// have to mutate the process environment.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let slack = SlackConfig {
            bot_token: required("SLACK_BOT_TOKEN")?,
            channel_id: required("SLACK_CHANNEL_ID")?,
            history_page_size: parse_or(&var, "SLACK_HISTORY_PAGE_SIZE", 50),
            ack_reaction: var("SLACK_ACK_REACTION")
                .unwrap_or_else(|| "white_check_mark".to_string()),
            warning_reaction: match lookup("SLACK_WARNING_REACTION") {
                Some(value) if value.trim().is_empty() => None,
                Some(value) => Some(value.trim().to_string()),
                None => Some("warning".to_string()),
            },
        };

        let anthropic = AnthropicConfig {
            api_key: required("ANTHROPIC_API_KEY")?,
            model: var("ANTHROPIC_MODEL")
                .unwrap_or_else(|| "claude-sonnet-4-20250514".to_string()),
            max_tokens: parse_or(&var, "ANTHROPIC_MAX_TOKENS", 1000),
        };

        let notion = NotionConfig {
            token: required("NOTION_TOKEN")?,
            database_id: required("NOTION_DATABASE_ID")?,
        };

        let directories = DirectoryConfig {
            logs_dir: var("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
            data_dir: var("DATA_DIR").unwrap_or_else(|| "data".to_string()),
            db_filename: var("DB_FILENAME").unwrap_or_else(|| "tracker.db".to_string()),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        let scheduler = SchedulerConfig {
            poll_interval: Duration::from_secs(parse_or(&var, "POLL_INTERVAL_SECS", 600u64).max(1)),
            poll_cron: var("POLL_CRON").map(|v| v.trim().to_string()),
        };

        let web = WebContentConfig {
            fetch_timeout: Duration::from_millis(parse_or(&var, "WEBPAGE_FETCH_TIMEOUT", 15_000)),
            content_max_length: parse_or(&var, "WEBPAGE_CONTENT_MAX_LENGTH", 15_000),
            user_agent: var("FETCH_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };

        let backend = match var("WATERMARK_BACKEND").as_deref().map(str::trim) {
            None | Some("memory") => WatermarkBackend::Memory,
            Some("sqlite") => WatermarkBackend::Sqlite,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "WATERMARK_BACKEND",
                    value: other.to_string(),
                })
            }
        };
        let watermark = WatermarkConfig {
            backend,
            startup_lookback: Duration::from_secs(parse_or(&var, "STARTUP_LOOKBACK_SECS", 600)),
        };

        let listed_date_fallback = match var("LISTED_DATE_FALLBACK").as_deref().map(str::trim) {
            None | Some("none") => ListedDateFallback::None,
            Some("message") => ListedDateFallback::MessageDate,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LISTED_DATE_FALLBACK",
                    value: other.to_string(),
                })
            }
        };

        let timezone = match var("TRACKER_TIMEZONE") {
            None => Tz::UTC,
            Some(name) => name.trim().parse::<Tz>().map_err(|_| ConfigError::Invalid {
                key: "TRACKER_TIMEZONE",
                value: name,
            })?,
        };

        Ok(Self {
            slack,
            anthropic,
            notion,
            directories,
            logging,
            scheduler,
            web,
            watermark,
            listed_date_fallback,
            timezone,
            http_timeout: Duration::from_secs(parse_or(&var, "HTTP_TIMEOUT_SECS", 30)),
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}
