use std::path::PathBuf;

pub const SMTP_SERVER: &str = "SMTP_SERVER";
pub const SMTP_PORT: &str = "SMTP_PORT";
pub const SMTP_USER: &str = "SMTP_USER";
pub const SMTP_PASS: &str = "SMTP_PASS";
pub const EMAIL_FROM: &str = "EMAIL_FROM";
pub const EMAIL_TO: &str = "EMAIL_TO";
pub const STREAM_URL: &str = "STREAM_URL";
pub const STREAM2_URL: &str = "STREAM2_URL";
pub const THRESHOLD_DBFS: &str = "THRESHOLD_DBFS";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
pub const TELEGRAM_TIMEOUT_SECS: &str = "TELEGRAM_TIMEOUT_SECS";
pub const LOG_DIR: &str = "LOG_DIR";
pub const RETENTION_DAYS: &str = "RETENTION_DAYS";
pub const FFMPEG_BIN: &str = "FFMPEG_BIN";
pub const TEMP_DIR: &str = "TEMP_DIR";
pub const SUMMARY_ONCE_PER_BAND: &str = "SUMMARY_ONCE_PER_BAND";

const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_THRESHOLD_DBFS: i32 = -35;
const DEFAULT_RETENTION_DAYS: u32 = 30;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_TELEGRAM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";

pub fn get_default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

pub fn get_default_threshold_dbfs() -> i32 {
    DEFAULT_THRESHOLD_DBFS
}

pub fn get_default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

pub fn get_default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

pub fn get_default_telegram_timeout_secs() -> u64 {
    DEFAULT_TELEGRAM_TIMEOUT_SECS
}

pub fn get_default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

pub fn get_default_ffmpeg_bin() -> String {
    DEFAULT_FFMPEG_BIN.to_string()
}

pub fn get_default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

pub fn get_default_summary_once_per_band() -> bool {
    true
}

/// Parse a boolean switch the way `.env` files usually spell them.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
