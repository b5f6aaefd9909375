use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use tracing::trace;

use crate::util::{self, *};
use crate::{Channel, ChannelRole};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "crate::util::get_default_smtp_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "crate::util::get_default_telegram_api_url")]
    pub api_url: String,
    /// Upper bound for one Bot API request
    #[serde(default = "crate::util::get_default_telegram_timeout_secs")]
    pub timeout_secs: u64,
}

/// Process-wide configuration, read once at startup and handed to every
/// component by reference.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub smtp: SmtpConfig,
    pub telegram: TelegramConfig,

    /// Address of the primary stream (required)
    pub stream_url: String,

    /// Address of the secondary stream; absent means the channel is skipped
    #[serde(default)]
    pub stream2_url: Option<String>,

    /// Loudness below which audio counts as silence, in dBFS
    #[serde(default = "crate::util::get_default_threshold_dbfs")]
    pub threshold_dbfs: i32,

    /// Directory holding the daily `log_<date>.log` files
    #[serde(default = "crate::util::get_default_log_dir")]
    pub log_dir: PathBuf,

    /// Daily log files older than this are pruned
    #[serde(default = "crate::util::get_default_retention_days")]
    pub retention_days: u32,

    #[serde(default = "crate::util::get_default_ffmpeg_bin")]
    pub ffmpeg_bin: String,

    /// Where temporary audio artifacts are written
    #[serde(default = "crate::util::get_default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Send at most one summary per trigger band
    #[serde(default = "crate::util::get_default_summary_once_per_band")]
    pub summary_once_per_band: bool,
}

impl Config {
    /// Build the configuration from the process environment. Call
    /// `dotenv::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> anyhow::Result<Config> {
        Self::from_lookup(|key| std::env::var(key).ok())
            .inspect(|config| trace!("loaded config from environment: {:?}", config.redacted()))
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> anyhow::Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("missing required setting {key}"))
        };
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let smtp = SmtpConfig {
            host: required(SMTP_SERVER)?,
            port: parse_or(&optional, SMTP_PORT, util::get_default_smtp_port())?,
            user: required(SMTP_USER)?,
            password: required(SMTP_PASS)?,
            from: required(EMAIL_FROM)?,
            to: required(EMAIL_TO)?,
        };

        let telegram = TelegramConfig {
            bot_token: required(TELEGRAM_BOT_TOKEN)?,
            chat_id: required(TELEGRAM_CHAT_ID)?,
            api_url: optional(TELEGRAM_API_URL).unwrap_or_else(util::get_default_telegram_api_url),
            timeout_secs: parse_or(
                &optional,
                TELEGRAM_TIMEOUT_SECS,
                util::get_default_telegram_timeout_secs(),
            )?,
        };

        let summary_once_per_band = match optional(SUMMARY_ONCE_PER_BAND) {
            Some(value) => util::parse_flag(&value)
                .ok_or_else(|| anyhow!("invalid value for {SUMMARY_ONCE_PER_BAND}: {value}"))?,
            None => util::get_default_summary_once_per_band(),
        };

        Ok(Config {
            smtp,
            telegram,
            stream_url: required(STREAM_URL)?,
            stream2_url: optional(STREAM2_URL),
            threshold_dbfs: parse_or(&optional, THRESHOLD_DBFS, util::get_default_threshold_dbfs())?,
            log_dir: optional(LOG_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(util::get_default_log_dir),
            retention_days: parse_or(&optional, RETENTION_DAYS, util::get_default_retention_days())?,
            ffmpeg_bin: optional(FFMPEG_BIN).unwrap_or_else(util::get_default_ffmpeg_bin),
            temp_dir: optional(TEMP_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(util::get_default_temp_dir),
            summary_once_per_band,
        })
    }

    /// All channels in role order, configured or not.
    pub fn channels(&self) -> Vec<Channel> {
        vec![
            Channel::new(ChannelRole::Primary, Some(self.stream_url.clone())),
            Channel::new(ChannelRole::Secondary, self.stream2_url.clone()),
        ]
    }

    /// Copy with credentials masked, for tracing.
    pub fn redacted(&self) -> Config {
        let mut config = self.clone();
        config.smtp.password = "***".to_string();
        config.telegram.bot_token = "***".to_string();
        config
    }
}

fn parse_or<T, F>(optional: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {value}")),
        None => Ok(default),
    }
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str::<Config>(&file_content)
        .map_err(|e| anyhow!("Invalid configuration file provided: {e}"))
        .map(|mut config| {
            config.stream2_url = config.stream2_url.filter(|url| !url.trim().is_empty());
            config
        })
        .inspect(|config| trace!("loaded config: {:?}", config.redacted()))
}
