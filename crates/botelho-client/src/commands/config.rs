//! Configuration commands.

use std::path::Path;

use crate::config::BotConfig;
use crate::error::{ClientError, ClientResult};

/// Placeholder printed instead of inline secrets.
const REDACTED: &str = "<redacted>";

/// Dump the current configuration to stdout. Inline secrets are hidden;
/// `env::` and `pass::` references are shown as written.
pub fn dump(config: &BotConfig, path: Option<&Path>) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&redacted(config))
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", config_path(path).display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration, including secret references.
pub fn validate(config: &BotConfig) -> ClientResult<()> {
    config.validate()?;
    config.telegram.resolve_token()?;
    println!("Telegram token resolves.");

    match config.thingspeak.resolve_write_key()? {
        Some(_) => println!("ThingSpeak write key resolves."),
        None => println!("ThingSpeak disabled (no write key)."),
    }

    println!(
        "Event sources: {}",
        config
            .calendars
            .iter()
            .map(|c| format!("{} ({})", c.label, c.category))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: Option<&Path>) -> ClientResult<()> {
    println!("config: {}", config_path(path).display());
    Ok(())
}

fn config_path(path: Option<&Path>) -> std::path::PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(BotConfig::default_path)
}

fn is_reference(value: &str) -> bool {
    value.starts_with("env::") || value.starts_with("pass::")
}

fn redacted(config: &BotConfig) -> BotConfig {
    let hide = |secret: &Option<String>| {
        secret.as_ref().map(|value| {
            if is_reference(value) {
                value.clone()
            } else {
                REDACTED.to_string()
            }
        })
    };

    let mut config = config.clone();
    config.telegram.token = hide(&config.telegram.token);
    config.thingspeak.write_key = hide(&config.thingspeak.write_key);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_secrets_are_hidden() {
        let mut config = BotConfig::default();
        config.telegram.token = Some("123:plain".into());
        config.thingspeak.write_key = Some("env::TS_KEY".into());

        let shown = redacted(&config);
        assert_eq!(shown.telegram.token.as_deref(), Some(REDACTED));
        assert_eq!(shown.thingspeak.write_key.as_deref(), Some("env::TS_KEY"));
    }

    #[test]
    fn explicit_path_wins() {
        let path = Path::new("/etc/botelho.toml");
        assert_eq!(config_path(Some(path)), path.to_path_buf());
        assert_eq!(config_path(None), BotConfig::default_path());
    }
}
