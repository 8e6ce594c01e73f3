//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_ANALYTICS_CACHE_TTL_SECONDS, DEFAULT_DATABASE_URL, DEFAULT_EMAIL_FROM,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Redis is optional; without it caching and rate limiting are off.
    pub redis_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub email_from: String,
    pub job_queue_enabled: bool,
    pub analytics_cache_ttl: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("email_from", &self.email_from)
            .field("job_queue_enabled", &self.job_queue_enabled)
            .field("analytics_cache_ttl", &self.analytics_cache_ttl)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            email_from: env::var("EMAIL_FROM").unwrap_or_else(|_| DEFAULT_EMAIL_FROM.to_string()),
            job_queue_enabled: env::var("JOB_QUEUE_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            analytics_cache_ttl: env::var("ANALYTICS_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ANALYTICS_CACHE_TTL_SECONDS),
        }
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("ON"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_debug_redacts_urls() {
        let config = Config {
            database_url: "postgres://user:secret@db/agenda".to_string(),
            redis_url: Some("redis://:secret@cache".to_string()),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            email_from: "agenda@example.com".to_string(),
            job_queue_enabled: false,
            analytics_cache_ttl: 60,
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
    }
}
