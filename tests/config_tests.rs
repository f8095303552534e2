use blog_portal::config::{AppConfig, Env};
use serial_test::serial;
use std::env;

// Process-wide environment mutation: every test here is #[serial].
// set_var/remove_var are unsafe in edition 2024; these tests are the only
// callers and run single-threaded relative to each other.
fn set(key: &str, value: &str) {
    unsafe { env::set_var(key, value) }
}

fn clear(key: &str) {
    unsafe { env::remove_var(key) }
}

fn reset_env() {
    clear("APP_ENV");
    clear("SESSION_SECRET");
    clear("DATABASE_URL");
}

#[test]
#[serial]
fn load_falls_back_to_local_defaults() {
    reset_env();

    let config = AppConfig::load();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.db_url, "sqlite:blog.db?mode=rwc");
    assert_eq!(config.session_secret, "insecure-local-session-secret");
}

#[test]
#[serial]
fn load_honors_explicit_local_overrides() {
    reset_env();
    set("APP_ENV", "local");
    set("DATABASE_URL", "sqlite:elsewhere.db");
    set("SESSION_SECRET", "local-but-explicit");

    let config = AppConfig::load();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.db_url, "sqlite:elsewhere.db");
    assert_eq!(config.session_secret, "local-but-explicit");

    reset_env();
}

#[test]
#[serial]
fn load_reads_production_configuration() {
    reset_env();
    set("APP_ENV", "production");
    set("DATABASE_URL", "sqlite:/var/lib/blog/blog.db");
    set("SESSION_SECRET", "a-real-secret");

    let config = AppConfig::load();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.db_url, "sqlite:/var/lib/blog/blog.db");
    assert_eq!(config.session_secret, "a-real-secret");

    reset_env();
}

#[test]
#[serial]
#[should_panic(expected = "SESSION_SECRET must be set in production")]
fn load_fails_fast_without_a_production_secret() {
    reset_env();
    set("APP_ENV", "production");
    set("DATABASE_URL", "sqlite:/var/lib/blog/blog.db");

    // Missing SESSION_SECRET: the process must refuse to start.
    let _ = AppConfig::load();
}
