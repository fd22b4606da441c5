use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub upload_dir: PathBuf,
    pub upload_base_url: String,
    pub max_upload_bytes: usize,
    pub feed_page_size: u32,
    pub feed_page_size_max: u32,
    pub session_secret: Option<String>,
    pub session_max_age: Duration,
    pub reset_token_ttl: Duration,
    pub reset_base_url: String,
    pub token_cleanup_interval: Duration,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub mail_from: String,
    pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr_raw = read_string("PINBOARD_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let database_url = read_optional_string("PINBOARD_DATABASE_URL");
        let db_max_connections = read_u32("PINBOARD_DB_MAX_CONNECTIONS", 5)?;
        let upload_dir = PathBuf::from(read_string("PINBOARD_UPLOAD_DIR", "./data/uploads"));
        let upload_base_url = read_string("PINBOARD_UPLOAD_BASE_URL", "/uploads");
        let max_upload_bytes = read_usize("PINBOARD_MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;
        let feed_page_size = read_u32("PINBOARD_FEED_PAGE_SIZE", 10)?;
        let feed_page_size_max = read_u32("PINBOARD_FEED_PAGE_SIZE_MAX", 50)?;
        if feed_page_size == 0 || feed_page_size > feed_page_size_max {
            return Err(ConfigError::InvalidValue(
                "PINBOARD_FEED_PAGE_SIZE",
                feed_page_size.to_string(),
            ));
        }
        let session_secret = read_optional_string("PINBOARD_SESSION_SECRET");
        let session_max_age_secs = read_u64("PINBOARD_SESSION_MAX_AGE_SECS", 7 * 24 * 60 * 60)?;
        let reset_token_ttl_secs = read_u64("PINBOARD_RESET_TOKEN_TTL_SECS", 60 * 60)?;
        let reset_base_url = read_string(
            "PINBOARD_RESET_BASE_URL",
            "http://localhost:8080/reset-password",
        );
        let token_cleanup_interval_secs =
            read_u64("PINBOARD_TOKEN_CLEANUP_INTERVAL_SECS", 60 * 60)?;
        let smtp_host = read_optional_string("PINBOARD_SMTP_HOST");
        let smtp_port = read_u16("PINBOARD_SMTP_PORT", 587)?;
        let smtp_username = read_optional_string("PINBOARD_SMTP_USERNAME");
        let smtp_password = read_optional_string("PINBOARD_SMTP_PASSWORD");
        let mail_from = read_string("PINBOARD_MAIL_FROM", "Pinboard <no-reply@pinboard.local>");
        let cors_allow_origins = read_list("PINBOARD_CORS_ALLOW_ORIGINS");

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections,
            upload_dir,
            upload_base_url,
            max_upload_bytes,
            feed_page_size,
            feed_page_size_max,
            session_secret,
            session_max_age: Duration::from_secs(session_max_age_secs),
            reset_token_ttl: Duration::from_secs(reset_token_ttl_secs),
            reset_base_url,
            token_cleanup_interval: Duration::from_secs(token_cleanup_interval_secs),
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            mail_from,
            cors_allow_origins,
        })
    }
}

pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn read_string(key: &'static str, default: &'static str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_u32(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_u16(key: &'static str, default: u16) -> Result<u16, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_usize(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_optional_string(key: &'static str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_list(key: &'static str) -> Vec<String> {
    split_list(&std::env::var(key).unwrap_or_default())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents.lines().filter_map(parse_dotenv_line).collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = parse_dotenv_value(value.trim());
    Some((key.to_string(), value))
}

fn parse_dotenv_value(value: &str) -> String {
    if let Some(stripped) = value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        return unescape_double_quoted(stripped);
    }
    if let Some(stripped) = value
        .strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
    {
        return stripped.to_string();
    }
    value.to_string()
}

fn unescape_double_quoted(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => output.push('\n'),
                Some('r') => output.push('\r'),
                Some('t') => output.push('\t'),
                Some('\\') => output.push('\\'),
                Some('"') => output.push('"'),
                Some(other) => {
                    output.push('\\');
                    output.push(other);
                }
                None => output.push('\\'),
            }
        } else {
            output.push(ch);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{parse_dotenv_line, split_list};

    #[test]
    fn parse_dotenv_line_basic() {
        let (key, value) = parse_dotenv_line("FOO=bar").unwrap();
        assert_eq!(key, "FOO");
        assert_eq!(value, "bar");
    }

    #[test]
    fn parse_dotenv_line_export() {
        let (key, value) = parse_dotenv_line("export FOO=bar").unwrap();
        assert_eq!(key, "FOO");
        assert_eq!(value, "bar");
    }

    #[test]
    fn parse_dotenv_line_double_quotes() {
        let (key, value) = parse_dotenv_line(r#"FOO="hello world""#).unwrap();
        assert_eq!(key, "FOO");
        assert_eq!(value, "hello world");
    }

    #[test]
    fn parse_dotenv_line_single_quotes() {
        let (key, value) = parse_dotenv_line("FOO='hello world'").unwrap();
        assert_eq!(key, "FOO");
        assert_eq!(value, "hello world");
    }

    #[test]
    fn parse_dotenv_line_escaped() {
        let (key, value) = parse_dotenv_line(r#"FOO="line\n\"quote\"""#).unwrap();
        assert_eq!(key, "FOO");
        assert_eq!(value, "line\n\"quote\"");
    }

    #[test]
    fn parse_dotenv_line_comment() {
        assert!(parse_dotenv_line("# comment").is_none());
        assert!(parse_dotenv_line("   ").is_none());
    }

    #[test]
    fn split_list_trims_and_drops_empties() {
        let parsed = split_list("https://a.test, https://b.test ,");
        assert_eq!(parsed, vec!["https://a.test", "https://b.test"]);
        assert!(split_list("").is_empty());
    }
}
