//! Application settings loaded from environment variables.

use rust_decimal::Decimal;
use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_DEDUCTION_PERCENTAGE, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};
use crate::domain::PaymentPolicy;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    /// Status given to orders at checkout
    pub payment_policy: PaymentPolicy,
    /// Enqueue notifications to the job queue instead of only logging them
    pub notification_queue: bool,
    /// Deduction applied to earnings rows created on first sale
    pub default_deduction_percentage: Decimal,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("payment_policy", &self.payment_policy)
            .field("notification_queue", &self.notification_queue)
            .field("default_deduction_percentage", &self.default_deduction_percentage)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let payment_policy = match env::var("CHECKOUT_PAYMENT_POLICY") {
            Ok(raw) => PaymentPolicy::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown CHECKOUT_PAYMENT_POLICY, settling immediately");
                PaymentPolicy::SettleImmediately
            }),
            Err(_) => PaymentPolicy::SettleImmediately,
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            payment_policy,
            notification_queue: env::var("NOTIFICATION_QUEUE")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            default_deduction_percentage: env::var("DEFAULT_DEDUCTION_PERCENTAGE")
                .ok()
                .and_then(|v| v.parse::<Decimal>().ok())
                .filter(|d| *d >= Decimal::ZERO && *d <= Decimal::ONE_HUNDRED)
                .unwrap_or_else(|| Decimal::from(DEFAULT_DEDUCTION_PERCENTAGE)),
        }
    }

    /// Build a configuration for tests and embedded use without touching the environment.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            payment_policy: PaymentPolicy::SettleImmediately,
            notification_queue: false,
            default_deduction_percentage: Decimal::from(DEFAULT_DEDUCTION_PERCENTAGE),
        }
    }

    /// Get JWT secret bytes for token verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
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
        assert!(parse_flag(" On "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::for_tests("test-secret-key-for-testing-only-32chars");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test-secret-key"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
