use maitred_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let api_key = config
        .oracle
        .api_key
        .as_ref()
        .map(|key| redact(key.expose_secret()))
        .unwrap_or_else(|| "(unset)".to_string());

    [
        "effective config (source precedence: overrides > env > file > default):".to_string(),
        format!("oracle.provider = {:?}", config.oracle.provider),
        format!("oracle.base_url = {}", config.oracle.base_url),
        format!("oracle.model = {}", config.oracle.model),
        format!("oracle.api_key = {api_key}"),
        format!("oracle.timeout_secs = {}", config.oracle.timeout_secs),
        format!("server.bind_address = {}", config.server.bind_address),
        format!("server.port = {}", config.server.port),
        format!("limits.max_input_words = {}", config.limits.max_input_words),
        format!("limits.daily_tokens = {}", config.limits.daily_tokens),
        format!("limits.lifetime_tokens = {}", config.limits.lifetime_tokens),
        format!("logging.level = {}", config.logging.level),
        format!("logging.format = {:?}", config.logging.format),
    ]
    .join("\n")
}

fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{prefix}****")
    }
}
