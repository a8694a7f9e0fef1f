use koinonia::config::Config;
use serial_test::serial;
use std::env;

const CONFIG_KEYS: [&str; 13] = [
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRATION_DAYS",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "BASE_URL",
    "AI_GATEWAY_URL",
    "AI_GATEWAY_KEY",
    "AI_MODEL",
    "AI_DAILY_LIMIT",
    "AI_TRIAL_DAYS",
    "INVITE_EXPIRY_DAYS",
];

fn save_env() -> Vec<(&'static str, Result<String, env::VarError>)> {
    CONFIG_KEYS.iter().map(|&key| (key, env::var(key))).collect()
}

fn restore_env(saved: Vec<(&'static str, Result<String, env::VarError>)>) {
    for (key, value) in saved {
        match value {
            Ok(val) => unsafe {
                env::set_var(key, val);
            },
            Err(_) => unsafe {
                env::remove_var(key);
            },
        }
    }
}

#[test]
#[serial]
fn test_config_from_env_with_defaults() {
    let original_values = save_env();

    // Clear everything to exercise the defaults
    for key in CONFIG_KEYS {
        unsafe {
            env::remove_var(key);
        }
    }

    let config = Config::from_env().unwrap();

    assert_eq!(config.database_url, "postgres://@localhost:5432/koinonia");
    assert_eq!(
        config.jwt_secret,
        "your-super-secret-jwt-key-change-this-in-production-12345"
    );
    assert_eq!(config.jwt_expiration_days, 30);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert_eq!(config.client_base_url, "http://localhost:3000");
    assert_eq!(config.ai_gateway_url, "https://ai.gateway.lovable.dev");
    assert_eq!(config.ai_gateway_key, "");
    assert_eq!(config.ai_model, "google/gemini-3-flash-preview");
    assert_eq!(config.ai_daily_limit, 10);
    assert_eq!(config.ai_trial_days, 30);
    assert_eq!(config.invite_expiry_days, 7);

    restore_env(original_values);
}

#[test]
#[serial]
fn test_config_from_env_only_with_custom_values() {
    let original_values = save_env();

    unsafe {
        env::set_var("DATABASE_URL", "postgres://koinonia@db:5432/koinonia_prod");
        env::set_var("JWT_SECRET", "custom-secret");
        env::set_var("JWT_EXPIRATION_DAYS", "7");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("PORT", "9090");
        env::set_var("ENVIRONMENT", "production");
        env::set_var("BASE_URL", "https://app.koinonia.church");
        env::set_var("AI_GATEWAY_URL", "https://gateway.example.com/");
        env::set_var("AI_GATEWAY_KEY", "sk-test-key");
        env::set_var("AI_MODEL", "google/gemini-3-pro");
        env::set_var("AI_DAILY_LIMIT", "25");
        env::set_var("AI_TRIAL_DAYS", "14");
        env::set_var("INVITE_EXPIRY_DAYS", "3");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(
        config.database_url,
        "postgres://koinonia@db:5432/koinonia_prod"
    );
    assert_eq!(config.jwt_secret, "custom-secret");
    assert_eq!(config.jwt_expiration_days, 7);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 9090);
    assert_eq!(config.environment, "production");
    assert_eq!(config.client_base_url, "https://app.koinonia.church");
    assert_eq!(config.ai_gateway_url, "https://gateway.example.com/");
    assert_eq!(config.ai_gateway_key, "sk-test-key");
    assert_eq!(config.ai_model, "google/gemini-3-pro");
    assert_eq!(config.ai_daily_limit, 25);
    assert_eq!(config.ai_trial_days, 14);
    assert_eq!(config.invite_expiry_days, 3);

    restore_env(original_values);
}

#[test]
#[serial]
fn test_config_invalid_numbers_fall_back_to_defaults() {
    let original_values = save_env();

    unsafe {
        env::set_var("PORT", "not-a-port");
        env::set_var("JWT_EXPIRATION_DAYS", "soon");
        env::set_var("AI_DAILY_LIMIT", "unlimited");
        env::set_var("AI_TRIAL_DAYS", "forever");
        env::set_var("INVITE_EXPIRY_DAYS", "never");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.jwt_expiration_days, 30);
    assert_eq!(config.ai_daily_limit, 10);
    assert_eq!(config.ai_trial_days, 30);
    assert_eq!(config.invite_expiry_days, 7);

    restore_env(original_values);
}

fn sample_config() -> Config {
    Config {
        database_url: "postgres://@localhost:5432/koinonia_test".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_days: 30,
        host: "127.0.0.1".to_string(),
        port: 8080,
        environment: "development".to_string(),
        client_base_url: "http://localhost:3000".to_string(),
        ai_gateway_url: "https://ai.gateway.lovable.dev".to_string(),
        ai_gateway_key: String::new(),
        ai_model: "google/gemini-3-flash-preview".to_string(),
        ai_daily_limit: 10,
        ai_trial_days: 30,
        invite_expiry_days: 7,
    }
}

#[test]
fn test_environment_detection() {
    let mut config = sample_config();
    assert!(config.is_development());
    assert!(!config.is_production());

    config.environment = "production".to_string();
    assert!(config.is_production());
    assert!(!config.is_development());

    config.environment = "staging".to_string();
    assert!(!config.is_production());
    assert!(!config.is_development());
}

#[test]
fn test_server_address() {
    let mut config = sample_config();
    config.host = "0.0.0.0".to_string();
    config.port = 3000;

    assert_eq!(config.server_address(), "0.0.0.0:3000");
}

#[test]
fn test_invite_link_joins_client_base_url() {
    let mut config = sample_config();
    config.client_base_url = "https://app.koinonia.church".to_string();

    assert_eq!(
        config.invite_link("123e4567-e89b-12d3-a456-426614174000"),
        "https://app.koinonia.church/invite/123e4567-e89b-12d3-a456-426614174000"
    );
}
