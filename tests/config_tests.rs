use serial_test::serial;
use std::{env, panic, path::PathBuf};
use unisocial_client::{
    AppConfig, Env,
    config::{ConfigError, DEFAULT_ADMIN_PAGE_SIZE, DEFAULT_API_BASE, DEFAULT_SESSION_FILE},
};

const VARS: [&str; 4] = ["APP_ENV", "API_BASE_URL", "SESSION_FILE", "ADMIN_PAGE_SIZE"];

// --- Setup/Teardown Utilities ---

/// Runs `test` with the config variables cleared, then restores whatever was set
/// before, even if the test panics.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_local_defaults() {
    let config = run_with_env(AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert_eq!(config.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
    assert_eq!(config.admin_page_size, DEFAULT_ADMIN_PAGE_SIZE);
}

#[test]
#[serial]
fn test_production_requires_api_base() {
    let result = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
        }
        AppConfig::load()
    });

    assert_eq!(result.unwrap_err(), ConfigError::Missing("API_BASE_URL"));
}

#[test]
#[serial]
fn test_production_with_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("API_BASE_URL", "https://api.campus.example/");
            env::set_var("SESSION_FILE", "/tmp/unisocial-session.json");
            env::set_var("ADMIN_PAGE_SIZE", "25");
        }
        AppConfig::load()
    })
    .unwrap();

    assert_eq!(config.env, Env::Production);
    // Trailing slash is dropped so paths can be appended verbatim.
    assert_eq!(config.api_base, "https://api.campus.example");
    assert_eq!(config.session_file, PathBuf::from("/tmp/unisocial-session.json"));
    assert_eq!(config.admin_page_size, 25);
}

#[test]
#[serial]
fn test_invalid_page_size_is_rejected() {
    for bad in ["zero", "0", "-3"] {
        let result = run_with_env(|| {
            unsafe {
                env::set_var("ADMIN_PAGE_SIZE", bad);
            }
            AppConfig::load()
        });

        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidNumber {
                var: "ADMIN_PAGE_SIZE",
                value: bad.to_string()
            }
        );
    }
}

#[test]
#[serial]
fn test_unknown_env_falls_back_to_local() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "staging");
        }
        AppConfig::load()
    })
    .unwrap();

    assert_eq!(config.env, Env::Local);
}

#[test]
fn test_default_needs_no_environment() {
    let config = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert_eq!(config.admin_page_size, 10);
}
