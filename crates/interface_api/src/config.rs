//! API configuration
//!
//! Environment-driven settings for the compliance API: bind address,
//! JWT signing, the PostgreSQL connection, and the renewal-reminder
//! horizon. All variables carry the `API_` prefix.

use serde::Deserialize;

/// Runtime settings for the compliance API server
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub jwt_expiration_secs: u64,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// How many days ahead of expiry renewal reminders go out
    pub notify_days_before: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/rto_ledger".to_string(),
            log_level: "info".to_string(),
            notify_days_before: 10,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_local_development() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.notify_days_before, 10);
        assert!(config.database_url.ends_with("/rto_ledger"));
    }
}
