//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, PdfReaderKind, ServerConfig, StoreKind};
use crate::domain::error::ConfigError;
use crate::domain::timing::Timeout;
use crate::domain::topic::{MasteryPolicy, TopicCount};

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn require_known_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    require_known_key(key)?;
    validate_config_value(key, value)?;

    store.update(|config| apply_value(config, key, value)).await?;

    let shown = if is_secret(key) {
        mask_secret(value)
    } else {
        value.to_string()
    };
    presenter.success(&format!("{} = {}", key, shown));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    require_known_key(key)?;
    let config = store.load().await?;
    presenter.output(display_value(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, display_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn server_mut(config: &mut AppConfig) -> &mut ServerConfig {
    config.server.get_or_insert_with(ServerConfig::default)
}

/// Write a validated value into the config
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim().to_string();
    match key {
        "api_key" => config.api_key = Some(value),
        "model" => config.model = Some(value),
        "max_tokens" => config.max_tokens = Some(parse_max_tokens(key, &value)?),
        "timeout" => config.timeout = Some(value),
        "mastery_policy" => config.mastery_policy = Some(value),
        "topic_count" => config.topic_count = Some(value),
        "pdf_reader" => config.pdf_reader = Some(value),
        "store" => config.store = Some(value),
        "identity" => config.identity = Some(value),
        "language" => config.language = Some(value),
        "server.url" => server_mut(config).url = Some(value.trim_end_matches('/').to_string()),
        "server.token" => server_mut(config).token = Some(value),
        _ => {
            return Err(ConfigError::ValidationError {
                key: key.to_string(),
                message: "Unknown key".to_string(),
            })
        }
    }
    Ok(())
}

/// Value of a key as shown to the user; secrets are masked
fn display_value(config: &AppConfig, key: &str) -> Option<String> {
    let server = config.server.as_ref();
    match key {
        "api_key" => config.api_key.as_deref().map(mask_secret),
        "model" => config.model.clone(),
        "max_tokens" => config.max_tokens.map(|n| n.to_string()),
        "timeout" => config.timeout.clone(),
        "mastery_policy" => config.mastery_policy.clone(),
        "topic_count" => config.topic_count.clone(),
        "pdf_reader" => config.pdf_reader.clone(),
        "store" => config.store.clone(),
        "identity" => config.identity.clone(),
        "language" => config.language.clone(),
        "server.url" => server.and_then(|s| s.url.clone()),
        "server.token" => server.and_then(|s| s.token.as_deref()).map(mask_secret),
        _ => None,
    }
}

fn is_secret(key: &str) -> bool {
    matches!(key, "api_key" | "server.token")
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

fn parse_max_tokens(key: &str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(key, "Value must be a positive integer")),
    }
}

/// Validate a config value based on key type
pub(crate) fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "max_tokens" => {
            parse_max_tokens(key, value)?;
        }
        "timeout" => {
            value
                .parse::<Timeout>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "mastery_policy" => {
            value
                .parse::<MasteryPolicy>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "topic_count" => {
            value
                .parse::<TopicCount>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "pdf_reader" => {
            value
                .parse::<PdfReaderKind>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "store" => {
            value
                .parse::<StoreKind>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "model" | "identity" | "language" => {
            if value.trim().is_empty() {
                return Err(invalid(key, "Value must not be empty"));
            }
        }
        "server.url" => {
            let v = value.trim();
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid(key, "Value must start with http:// or https://"));
            }
        }
        _ => {} // secrets accept any string
    }
    Ok(())
}

/// Mask a secret for display (show first 4 and last 4 chars)
pub(crate) fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
