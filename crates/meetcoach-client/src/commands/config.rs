//! Configuration commands.

use std::path::Path;

use meetcoach_notes::CredentialStore;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout, API keys masked.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    println!("# config.toml ({})", path.display());
    println!("{}", render(config)?);
    Ok(())
}

fn render(config: &ClientConfig) -> ClientResult<String> {
    toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))
}

/// Validate the configuration.
///
/// Checks the notes endpoints and credentials file, then resolves the
/// analysis and email settings, reporting the first failure.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.notes.endpoints()?;

    let store = CredentialStore::new(config.notes.credentials_path());
    let credentials = store.load()?;
    println!(
        "Notes credentials found ({:?} format) at {}",
        credentials.shape,
        store.path().display()
    );

    let analyzer = config.analysis.resolve()?;
    println!("Analysis: model {} at {}", analyzer.model, analyzer.base_url);

    let email = config.email.resolve()?;
    println!("Email: {} -> {}", email.from, email.to);

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
