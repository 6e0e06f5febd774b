//! Integration tests for configuration loading and validation through the
//! public surface: YAML parsing, `Config::load` with a `CHATBRIDGE_CONFIG`
//! override, and secret masking.

use chatbridge::config::{masked, Config};

/// Serializes access to the `CHATBRIDGE_CONFIG` env var across test threads.
fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static ENV_LOCK: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    ENV_LOCK
        .get_or_init(|| std::sync::Mutex::new(()))
        .lock()
        .expect("env lock poisoned")
}

fn write_temp_config(contents: &str) -> (std::path::PathBuf, std::path::PathBuf) {
    let dir = std::env::temp_dir().join(format!("chatbridge_itest_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("chatbridge.config.yaml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

fn load_with_env(path: &std::path::Path) -> Result<Config, chatbridge::error::ChatBridgeError> {
    std::env::set_var("CHATBRIDGE_CONFIG", path);
    let result = Config::load();
    std::env::remove_var("CHATBRIDGE_CONFIG");
    result
}

#[test]
fn test_minimal_config_gets_defaults() {
    let _guard = env_lock();
    let (dir, path) = write_temp_config("telegram_bot_token: tok\napi_key: key\n");

    let config = load_with_env(&path).unwrap();
    assert_eq!(config.telegram_bot_token, "tok");
    assert_eq!(config.api_key, "key");
    assert_eq!(config.model, "deepseek-chat");
    assert_eq!(config.data_dir, "./chatbridge.data");
    assert!(config.llm_base_url.is_none());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_full_config_overrides_defaults() {
    let _guard = env_lock();
    let (dir, path) = write_temp_config(
        "telegram_bot_token: tok\n\
         api_key: key\n\
         model: gpt-4o-mini\n\
         llm_base_url: https://api.openai.com/v1\n\
         data_dir: /tmp/chatbridge\n",
    );

    let config = load_with_env(&path).unwrap();
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(
        config.llm_base_url.as_deref(),
        Some("https://api.openai.com/v1")
    );
    assert_eq!(config.data_dir, "/tmp/chatbridge");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_missing_bot_token_is_fatal() {
    let _guard = env_lock();
    let (dir, path) = write_temp_config("api_key: key\n");

    let err = load_with_env(&path).unwrap_err();
    assert!(err.to_string().contains("telegram_bot_token is required"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_missing_api_key_is_fatal() {
    let _guard = env_lock();
    let (dir, path) = write_temp_config("telegram_bot_token: tok\n");

    let err = load_with_env(&path).unwrap_err();
    assert!(err.to_string().contains("api_key is required"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_unparseable_yaml_is_config_error() {
    let _guard = env_lock();
    let (dir, path) = write_temp_config(": not yaml [\n");

    let err = load_with_env(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_env_override_pointing_nowhere_is_config_error() {
    let _guard = env_lock();
    std::env::set_var("CHATBRIDGE_CONFIG", "/nonexistent/chatbridge.yaml");
    let err = Config::load().unwrap_err();
    std::env::remove_var("CHATBRIDGE_CONFIG");
    assert!(err.to_string().contains("non-existent"));
}

#[test]
fn test_empty_optional_fields_normalize_to_defaults() {
    let _guard = env_lock();
    let (dir, path) = write_temp_config(
        "telegram_bot_token: tok\n\
         api_key: key\n\
         model: ''\n\
         llm_base_url: '  '\n\
         data_dir: ''\n",
    );

    let config = load_with_env(&path).unwrap();
    assert_eq!(config.model, "deepseek-chat");
    assert!(config.llm_base_url.is_none());
    assert_eq!(config.data_dir, "./chatbridge.data");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_masked_never_reveals_short_secrets() {
    assert_eq!(masked("short"), "***");
    assert_eq!(masked("1234567890abcdef"), "12345678...");
    assert!(!masked("1234567890abcdef").contains("abcdef"));
}
