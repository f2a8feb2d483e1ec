//! Connection settings resolution and store bootstrapping.

use std::path::PathBuf;

use coinbank_core::{AccountStore, DocumentId, SqliteStore};

use crate::cli::Cli;
use crate::config::{default_config_path, default_db_path, read_config};
use crate::constants::DEFAULT_COLLECTION;
use crate::errors::CliError;

/// Where the accounts live, after merging flags, env, and config.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub uri: String,
    pub collection: String,
}

/// Resolve the config file path, checking COINBANK_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("COINBANK_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Flags and env vars win, then the config file, then the XDG default.
pub fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let config_path = resolve_config_path()?;
    let config = if config_path.exists() {
        Some(read_config(&config_path)?)
    } else {
        None
    };

    let uri = match (&cli.db, &config) {
        (Some(uri), _) => uri.clone(),
        (None, Some(config)) => config.database.uri.clone(),
        (None, None) => default_db_path()?.to_string_lossy().to_string(),
    };
    let collection = match (&cli.collection, &config) {
        (Some(collection), _) => collection.clone(),
        (None, Some(config)) => config.database.collection.clone(),
        (None, None) => DEFAULT_COLLECTION.to_string(),
    };

    Ok(Settings { uri, collection })
}

pub fn open_accounts(settings: &Settings) -> anyhow::Result<AccountStore<SqliteStore>> {
    let store = SqliteStore::open(&settings.uri, &settings.collection)?;
    Ok(AccountStore::new(store))
}

pub fn parse_id(value: &str) -> Result<DocumentId, CliError> {
    DocumentId::parse_str(value.trim())
        .map_err(|_| CliError::invalid_input(format!("Invalid account id: {}", value)))
}

/// Parse a balance amount; anything that is not a finite number is rejected.
pub fn parse_amount(value: &str) -> Result<f64, CliError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| CliError::invalid_input(format!("Invalid amount: {}", value)))
}

/// Exit when an id matched nothing.
pub fn exit_unknown_account(id: &DocumentId) -> ! {
    CliError::not_found(
        format!("No account with id {}", id),
        "List accounts with: coinbank list",
    )
    .exit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = DocumentId::generate();
        assert_eq!(parse_id(&format!(" {} ", id)).unwrap(), id);
        assert!(matches!(parse_id("nope"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-5").unwrap(), -5.0);
        assert_eq!(parse_amount(" 2.5 ").unwrap(), 2.5);
        for bad in ["abc", "", "NaN", "inf"] {
            assert!(
                matches!(parse_amount(bad), Err(CliError::InvalidInput(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
