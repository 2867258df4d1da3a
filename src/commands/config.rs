//! Configuration commands.
//!
//! - `config set`: Set a configuration value
//! - `config show`: Display current configuration

use owo_colors::OwoColorize;
use secrecy::ExposeSecret;
use serde_json::json;

use super::CommandOutput;
use crate::config::Config;
use crate::display::mask_sensitive_value;
use crate::error::{CampusError, Result};

const SECRET_KEYS: &[&str] = &["store.api_key", "auth.api_key"];

/// Reject `store_url` style keys with a dot-notation suggestion
fn validate_config_key(key: &str) -> Result<&str> {
    if key.contains('.') {
        return Ok(key);
    }
    if let Some(pos) = key.find('_') {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        return Err(CampusError::Config(format!(
            "invalid config key '{key}'. Use dot notation: '{dot_version}'"
        )));
    }
    Ok(key)
}

fn status_text(configured: bool) -> String {
    if configured {
        "configured".green().to_string()
    } else {
        "not configured".dimmed().to_string()
    }
}

/// Show current configuration
pub fn cmd_config_show(as_json: bool) -> Result<()> {
    let config = Config::load()?;

    let store_url = config.store_url();
    let store_key = config
        .store_api_key()
        .map(|k| mask_sensitive_value(k.expose_secret()));
    let auth_key = config
        .auth_api_key()
        .map(|k| mask_sensitive_value(k.expose_secret()));
    let timeout = config.request_timeout().as_secs();

    let json_output = json!({
        "store": {
            "url": store_url,
            "api_key_configured": store_key.is_some(),
            "timeout_secs": timeout,
        },
        "auth": {
            "api_key_configured": auth_key.is_some(),
        },
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text_output.push_str(&format!("{}:\n", "store".cyan()));
    match &store_url {
        Some(url) => text_output.push_str(&format!("  url: {url}\n")),
        None => text_output.push_str(&format!("  url: {}\n", "not configured".dimmed())),
    }
    match &store_key {
        Some(masked) => text_output.push_str(&format!("  api_key: {masked}\n")),
        None => text_output.push_str(&format!("  api_key: {}\n", status_text(false))),
    }
    text_output.push_str(&format!("  timeout_secs: {timeout}\n\n"));

    text_output.push_str(&format!("{}:\n", "auth".cyan()));
    match &auth_key {
        Some(masked) => text_output.push_str(&format!("  api_key: {masked}\n")),
        None => text_output.push_str(&format!("  api_key: {}\n", status_text(false))),
    }

    text_output.push('\n');
    text_output.push_str(
        &format!("Config file: {}", Config::config_path().display())
            .dimmed()
            .to_string(),
    );

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(as_json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, as_json: bool) -> Result<()> {
    let key = validate_config_key(key)?;

    let mut config = Config::load()?;
    config.set_value(key, value)?;
    config.save()?;

    let shown = if SECRET_KEYS.contains(&key) {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} = {}", key.cyan(), shown))
    .print(as_json)
}
