use portal_gateway::{AppConfig, Category, ConfigError, config::Env};
use serial_test::serial;
use std::{env, fs, panic, path::PathBuf, time::Duration};

const CONFIG_VARS: [&str; 7] = [
    "APP_ENV",
    "PORTAL_API_URL",
    "PORTAL_AUTH_CHECK_PATH",
    "PORTAL_SPLASH_DELAY_MS",
    "PORTAL_PROBE_TIMEOUT_MS",
    "PORTAL_SESSION_COOKIE",
    "PORTAL_ROUTE_RULES",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with the given variables set (and every other config variable
/// cleared), restoring the original environment afterwards.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

fn temp_rules_file(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("portal-gateway-{}-{}.json", std::process::id(), name));
    fs::write(&path, contents).expect("write rules file");
    path
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    // PORTAL_API_URL is missing.
    let result = run_with_env(&[("APP_ENV", "production")], || {
        panic::catch_unwind(AppConfig::load)
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without a backend URL"
    );
}

#[test]
#[serial]
fn test_offline_config_needs_no_backend_in_production() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("PORTAL_ROUTE_RULES", "/etc/portal/rules.json"),
        ],
        AppConfig::load_offline,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(
        config.route_rules_path,
        Some(PathBuf::from("/etc/portal/rules.json"))
    );
}

#[test]
#[serial]
fn test_app_config_production_with_backend() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("PORTAL_API_URL", "https://api.sindicato.example"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(
        config.auth_check_url().unwrap().as_str(),
        "https://api.sindicato.example/auth/check"
    );
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_url, "http://localhost:8000");
    assert_eq!(config.auth_check_path, "/auth/check");
    assert_eq!(config.splash_delay, Duration::from_millis(3000));
    assert_eq!(config.probe_timeout, None);
    assert_eq!(config.session_cookie, None);
    assert_eq!(config.route_rules_path, None);
}

#[test]
#[serial]
fn test_app_config_overrides() {
    let config = run_with_env(
        &[
            ("PORTAL_AUTH_CHECK_PATH", "/api/usuarios/me"),
            ("PORTAL_SPLASH_DELAY_MS", "1500"),
            ("PORTAL_PROBE_TIMEOUT_MS", "800"),
            ("PORTAL_SESSION_COOKIE", "session=xyz"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.splash_delay, Duration::from_millis(1500));
    assert_eq!(config.probe_timeout, Some(Duration::from_millis(800)));
    assert_eq!(config.session_cookie.as_deref(), Some("session=xyz"));
    assert_eq!(
        config.auth_check_url().unwrap().as_str(),
        "http://localhost:8000/api/usuarios/me"
    );
}

#[test]
#[serial]
fn test_app_config_invalid_delay_falls_back() {
    let config = run_with_env(&[("PORTAL_SPLASH_DELAY_MS", "soon")], AppConfig::load);
    assert_eq!(config.splash_delay, Duration::from_millis(3000));
}

#[test]
fn test_invalid_api_url_is_reported() {
    let config = AppConfig {
        api_url: "not a url".to_string(),
        ..AppConfig::default()
    };
    assert!(matches!(
        config.auth_check_url(),
        Err(ConfigError::InvalidUrl { .. })
    ));
}

#[test]
#[serial]
fn test_route_rules_from_file() {
    let path = temp_rules_file(
        "valid",
        r#"{
            "public_exact": ["/"],
            "public_dynamic": ["/noticias/*"],
            "admin_prefixes": ["/gestion"],
            "agremiado_prefixes": ["/socios"]
        }"#,
    );
    let path_str = path.to_string_lossy().to_string();

    let config = run_with_env(&[("PORTAL_ROUTE_RULES", path_str.as_str())], AppConfig::load);
    let rules = config.route_rules().expect("rules load");

    assert_eq!(rules.classify("/gestion/altas"), Category::Admin);
    assert_eq!(rules.classify("/panel-admin"), Category::Unknown);
    fs::remove_file(path).ok();
}

#[test]
fn test_route_rules_file_errors() {
    let missing = AppConfig {
        route_rules_path: Some(env::temp_dir().join("portal-gateway-does-not-exist.json")),
        ..AppConfig::default()
    };
    assert!(matches!(
        missing.route_rules(),
        Err(ConfigError::RulesFile { .. })
    ));

    let path = temp_rules_file(
        "conflict",
        r#"{
            "public_exact": ["/"],
            "public_dynamic": [],
            "admin_prefixes": ["/socios"],
            "agremiado_prefixes": ["/socios/carnet"]
        }"#,
    );
    let conflicting = AppConfig {
        route_rules_path: Some(path.clone()),
        ..AppConfig::default()
    };
    assert!(matches!(
        conflicting.route_rules(),
        Err(ConfigError::RulesConflict(_))
    ));
    fs::remove_file(path).ok();
}

#[test]
fn test_default_route_rules() {
    let rules = AppConfig::default().route_rules().unwrap();
    assert_eq!(rules.classify("/panel-admin"), Category::Admin);
}
