use crate::config::{Config, DEFAULT_GATEWAY_URL};
use crate::domain::credential::{AuthScheme, Credential};
use crate::domain::push_job::PushMethod;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const VARS: [&str; 12] = [
    "PUSHGATEWAY_URL",
    "PUSH_JOB_NAME",
    "PUSH_GROUPING",
    "PUSH_METHOD",
    "PUSH_TIMEOUT_SECS",
    "PUSH_CONNECT_TIMEOUT_SECS",
    "METRIC_NAMESPACE",
    "PUSH_SYNTHETIC_RUNS",
    "PUSH_AUTH_SCHEME",
    "PUSH_BEARER_TOKEN",
    "PUSH_BASIC_USERNAME",
    "PUSH_BASIC_PASSWORD",
];

fn clear_env() {
    for var in VARS {
        // SAFETY: tests touching the environment hold ENV_LOCK
        unsafe { env::remove_var(var) };
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: tests touching the environment hold ENV_LOCK
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.gateway.url, DEFAULT_GATEWAY_URL);
    assert_eq!(config.gateway.job_name, "db_backup");
    assert_eq!(
        config.gateway.grouping,
        vec![("instance".to_string(), "cluster01".to_string())]
    );
    assert_eq!(config.gateway.method, PushMethod::Put);
    assert_eq!(config.timeout().as_secs(), 10);
    assert_eq!(config.connect_timeout().as_secs(), 5);
    assert_eq!(config.namespace, "db_backup");
    assert_eq!(config.synthetic_runs, 20);
    assert_eq!(config.auth.scheme, AuthScheme::Bearer);

    // Bearer without a token cannot be built
    assert!(config.credential().is_err());
}

#[test]
fn test_config_bearer_deployment() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    set_env("PUSHGATEWAY_URL", "https://io.telemetrytower.com/pushgateway");
    set_env("PUSH_BEARER_TOKEN", "token");
    set_env("PUSH_GROUPING", "instance=cluster01,zone=eu");

    let config = Config::from_env().unwrap();
    assert_eq!(config.credential().unwrap(), Credential::Bearer("token".to_string()));
    assert_eq!(
        config.push_job().endpoint().unwrap().as_str(),
        "https://io.telemetrytower.com/pushgateway/metrics/job/db_backup/instance/cluster01/zone/eu"
    );

    clear_env();
}

#[test]
fn test_config_basic_deployment() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    set_env("PUSH_AUTH_SCHEME", "basic");
    set_env("PUSH_BASIC_USERNAME", "ops");
    set_env("PUSH_BASIC_PASSWORD", "secret");
    set_env("METRIC_NAMESPACE", "nightly_backup");
    set_env("PUSH_METHOD", "post");

    let config = Config::from_env().unwrap();
    assert_eq!(
        config.credential().unwrap(),
        Credential::Basic {
            username: "ops".to_string(),
            password: "secret".to_string()
        }
    );
    assert_eq!(config.namespace, "nightly_backup");
    assert_eq!(config.push_job().push_method(), PushMethod::Post);
    assert!(!format!("{:?}", config).contains("secret"));

    clear_env();
}

#[test]
fn test_config_rejects_malformed_values() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());

    clear_env();
    set_env("PUSH_TIMEOUT_SECS", "soon");
    assert!(Config::from_env().is_err());

    clear_env();
    set_env("PUSH_AUTH_SCHEME", "digest");
    assert!(Config::from_env().is_err());

    clear_env();
    set_env("PUSH_METHOD", "delete");
    assert!(Config::from_env().is_err());

    clear_env();
    set_env("PUSH_GROUPING", "instance");
    assert!(Config::from_env().is_err());

    clear_env();
}
