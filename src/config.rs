use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is designed to be
/// immutable once loaded, ensuring consistency across all threads and services.
/// It is pulled into the application state via FromRef, embodying the "immutable AppConfig"
/// part of the Unified State Pattern.
#[derive(Clone)]
pub struct AppConfig {
    // Database connection string (SQLite).
    pub db_url: String,
    // Runtime environment marker. Controls log format and the dev identity bypass.
    pub env: Env,
    // Secret key used to sign and validate session tokens. Every session cookie
    // is only as trustworthy as this value.
    pub session_secret: String,
}

/// Env
///
/// Defines the runtime context, used to switch between development utilities
/// (readable logs, identity bypass) and production behavior (JSON logs, strict auth).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup.
    /// This allows tests to instantiate the configuration without needing to set
    /// environment variables.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            env: Env::Local,
            session_secret: "insecure-local-session-secret".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration at startup.
    /// It reads all parameters from environment variables and implements the **fail-fast**
    /// principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current runtime
    /// environment (especially Production) is not found. This prevents the application
    /// from starting with an incomplete or insecure configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // Session Secret Resolution
        // The production secret is mandatory and must be explicitly set.
        let session_secret = match env {
            Env::Production => env::var("SESSION_SECRET")
                .expect("FATAL: SESSION_SECRET must be set in production."),
            // In local, a fixed fallback keeps the first run frictionless.
            _ => env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "insecure-local-session-secret".to_string()),
        };

        let db_url = match env {
            Env::Production => {
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in production")
            }
            // Local default: an on-disk SQLite file, created on first use (mode=rwc).
            Env::Local => env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:blog.db?mode=rwc".to_string()),
        };

        Self {
            db_url,
            env,
            session_secret,
        }
    }
}
