use maitred_core::config::{AppConfig, LoadOptions};

use super::CommandResult;

pub fn run(json: bool) -> CommandResult {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            let message = format!(
                "config ok: provider={:?} model={} daily_quota={} lifetime_quota={}",
                config.oracle.provider,
                config.oracle.model,
                config.limits.daily_tokens,
                config.limits.lifetime_tokens,
            );
            if json {
                CommandResult::success("doctor", message)
            } else {
                CommandResult { exit_code: 0, output: format!("doctor: {message}") }
            }
        }
        Err(error) => {
            if json {
                CommandResult::failure("doctor", "config", error.to_string(), 2)
            } else {
                CommandResult {
                    exit_code: 2,
                    output: format!("doctor: config validation failed: {error}"),
                }
            }
        }
    }
}
