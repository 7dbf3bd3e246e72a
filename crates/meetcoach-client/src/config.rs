//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/meetcoach/config.toml` by default. Every field is optional.
//! Settings that the classic `.env` setup provided (`OPENAI_API_KEY`,
//! `RESEND_API_KEY`, `FROM_EMAIL`, `RECIPIENT_EMAIL`, `NAME`, `PEOPLE`) fall
//! back to the environment when the file leaves them unset.
//!
//! API keys support secret references (see [`crate::secret`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use meetcoach_notes::{
    CredentialStore, DEFAULT_API_BASE, DEFAULT_AUTH_URL, DEFAULT_CLIENT_VERSION, DEFAULT_PAGE_SIZE,
    FetchOptions, NotesEndpoints,
};
use serde::{Deserialize, Serialize};

use crate::analyzer::AnalyzerConfig;
use crate::email::EmailConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Default analysis endpoint.
pub const DEFAULT_ANALYSIS_BASE_URL: &str = "https://api.openai.com/v1";

/// Default analysis model.
pub const DEFAULT_MODEL: &str = "gpt-5";

/// Default email API endpoint.
pub const DEFAULT_EMAIL_BASE_URL: &str = "https://api.resend.com";

/// How the report addresses the person being coached when `NAME` is unset.
pub const DEFAULT_NAME: &str = "You";

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the meetcoach client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Notes service settings.
    pub notes: NotesSettings,

    /// Analysis service settings.
    pub analysis: AnalysisSettings,

    /// Email delivery settings.
    pub email: EmailSettings,

    /// Local file locations.
    pub storage: StorageSettings,
}

/// Notes service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesSettings {
    /// Path to the desktop app's credential file.
    pub credentials_path: Option<PathBuf>,

    /// Base URL of the notes API.
    pub api_base: String,

    /// Token refresh URL.
    pub auth_url: String,

    /// Desktop app version to identify as.
    pub client_version: String,

    /// Documents per listing page.
    pub page_size: usize,

    /// Stop scanning after this many pages (0 = no limit).
    pub max_pages: usize,

    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotesSettings {
    fn default() -> Self {
        Self {
            credentials_path: None,
            api_base: DEFAULT_API_BASE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: 500,
            timeout_secs: 30,
        }
    }
}

impl NotesSettings {
    /// Returns the credential file path.
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .unwrap_or_else(CredentialStore::default_path)
    }

    /// Returns validated endpoint settings.
    pub fn endpoints(&self) -> ClientResult<NotesEndpoints> {
        let endpoints = NotesEndpoints {
            api_base: self.api_base.clone(),
            auth_url: self.auth_url.clone(),
            client_version: self.client_version.clone(),
        };
        endpoints
            .validated()
            .map_err(|e| ClientError::Config(e.message().to_string()))
    }

    /// Returns the pagination options.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            page_size: self.page_size.max(1),
            max_pages: (self.max_pages > 0).then_some(self.max_pages),
        }
    }

    /// Returns the HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Analysis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// API key (supports `pass::` and `env::`). Falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Name of the person being coached. Falls back to `NAME`.
    pub name: Option<String>,

    /// People who usually attend. Falls back to `PEOPLE`.
    pub people: Option<String>,

    /// Custom coaching prompt file.
    pub prompt_file: Option<PathBuf>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ANALYSIS_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            name: None,
            people: None,
            prompt_file: None,
        }
    }
}

impl AnalysisSettings {
    /// Returns the custom prompt file path.
    pub fn prompt_file(&self) -> PathBuf {
        self.prompt_file
            .clone()
            .unwrap_or_else(|| ClientConfig::default_config_dir().join("prompt.txt"))
    }

    /// Resolves the settings against the process environment.
    pub fn resolve(&self) -> ClientResult<AnalyzerConfig> {
        self.resolve_with(&env_lookup)
    }

    /// Resolves the settings using `env` for fallbacks.
    ///
    /// Fails if no API key is configured.
    pub fn resolve_with(
        &self,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> ClientResult<AnalyzerConfig> {
        let api_key = setting_or_env(self.api_key.as_deref(), "OPENAI_API_KEY", env)?
            .ok_or_else(|| {
                ClientError::Config(
                    "analysis API key not provided. Set [analysis] api_key in config.toml \
                     or OPENAI_API_KEY in the environment"
                        .to_string(),
                )
            })?;

        let name = setting_or_env(self.name.as_deref(), "NAME", env)?
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let people = setting_or_env(self.people.as_deref(), "PEOPLE", env)?.unwrap_or_default();

        Ok(AnalyzerConfig {
            api_key,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            model: self.model.clone(),
            name,
            people,
        })
    }
}

/// Email delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    /// API key (supports `pass::` and `env::`). Falls back to `RESEND_API_KEY`.
    pub api_key: Option<String>,

    /// Sender address. Falls back to `FROM_EMAIL`.
    pub from: Option<String>,

    /// Recipient address. Falls back to `RECIPIENT_EMAIL`.
    pub to: Option<String>,

    /// Base URL of the email API.
    pub base_url: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            from: None,
            to: None,
            base_url: DEFAULT_EMAIL_BASE_URL.to_string(),
        }
    }
}

impl EmailSettings {
    /// Resolves the settings against the process environment.
    pub fn resolve(&self) -> ClientResult<EmailConfig> {
        self.resolve_with(&env_lookup)
    }

    /// Resolves the settings using `env` for fallbacks.
    ///
    /// Fails if the API key, sender, or recipient is missing.
    pub fn resolve_with(
        &self,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> ClientResult<EmailConfig> {
        let required = |value: Option<&str>, var: &str, field: &str| -> ClientResult<String> {
            setting_or_env(value, var, env)?.ok_or_else(|| {
                ClientError::Config(format!(
                    "{} not provided. Set [email] {} in config.toml or {} in the environment",
                    var, field, var
                ))
            })
        };

        Ok(EmailConfig {
            api_key: required(self.api_key.as_deref(), "RESEND_API_KEY", "api_key")?,
            from: required(self.from.as_deref(), "FROM_EMAIL", "from")?,
            to: required(self.to.as_deref(), "RECIPIENT_EMAIL", "to")?,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Local file locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Processed-document ledger.
    pub state_file: Option<PathBuf>,

    /// Directory for daily feedback files.
    pub feedback_dir: Option<PathBuf>,

    /// Directory for per-run report logs.
    pub logs_dir: Option<PathBuf>,
}

impl StorageSettings {
    /// Returns the ledger path.
    pub fn state_file(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| ClientConfig::default_data_dir().join("analysis_state.json"))
    }

    /// Returns the feedback directory.
    pub fn feedback_dir(&self) -> PathBuf {
        self.feedback_dir
            .clone()
            .unwrap_or_else(|| ClientConfig::default_data_dir().join("feedback"))
    }

    /// Returns the report log directory.
    pub fn logs_dir(&self) -> PathBuf {
        self.logs_dir
            .clone()
            .unwrap_or_else(|| ClientConfig::default_data_dir().join("logs"))
    }
}

impl ClientConfig {
    /// Loads configuration.
    ///
    /// An explicit `path` must exist and parse. Without one, the default
    /// file is used if present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetcoach")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetcoach")
    }

    /// Returns a copy with literal API keys masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for key in [&mut config.analysis.api_key, &mut config.email.api_key] {
            if let Some(value) = key {
                if matches!(secret::SecretRef::parse(value), secret::SecretRef::Plain(_)) {
                    *value = "<redacted>".to_string();
                }
            }
        }
        config
    }
}

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// Returns the configured value (secret references resolved), else the
/// environment variable, else `None`.
fn setting_or_env(
    value: Option<&str>,
    var: &str,
    env: &dyn Fn(&str) -> Option<String>,
) -> ClientResult<Option<String>> {
    match value {
        Some(value) if !value.is_empty() => secret::resolve(value).map(Some),
        _ => Ok(env(var)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.notes.api_base, "https://api.granola.ai");
        assert_eq!(config.notes.page_size, 100);
        assert_eq!(config.notes.fetch_options().max_pages, Some(500));
        assert_eq!(config.notes.timeout(), Duration::from_secs(30));
        assert_eq!(config.analysis.model, "gpt-5");
        assert_eq!(config.email.base_url, "https://api.resend.com");
        assert!(config.storage.state_file().ends_with("meetcoach/analysis_state.json"));
        assert!(config.storage.feedback_dir().ends_with("meetcoach/feedback"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
[notes]
max_pages = 0

[analysis]
model = "gpt-4o"
people = "Alice (CTO), Bob (PM)"

[storage]
logs_dir = "/tmp/meetcoach-logs"
"#,
        )
        .unwrap();
        assert_eq!(config.notes.fetch_options().max_pages, None);
        assert_eq!(config.notes.page_size, 100);
        assert_eq!(config.analysis.model, "gpt-4o");
        assert_eq!(config.analysis.base_url, DEFAULT_ANALYSIS_BASE_URL);
        assert_eq!(config.storage.logs_dir(), PathBuf::from("/tmp/meetcoach-logs"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ClientConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[notes\npage_size = ").unwrap();
        let err = ClientConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn invalid_endpoint_is_a_config_error() {
        let settings = NotesSettings {
            api_base: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(settings.endpoints(), Err(ClientError::Config(_))));
    }

    #[test]
    fn analysis_falls_back_to_environment() {
        let env = env_from(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("NAME", "Dana"),
            ("PEOPLE", "Team"),
        ]);
        let resolved = AnalysisSettings::default().resolve_with(&env).unwrap();
        assert_eq!(resolved.api_key, "sk-env");
        assert_eq!(resolved.name, "Dana");
        assert_eq!(resolved.people, "Team");
        assert_eq!(resolved.model, "gpt-5");
    }

    #[test]
    fn analysis_file_values_win() {
        let env = env_from(&[("OPENAI_API_KEY", "sk-env")]);
        let settings = AnalysisSettings {
            api_key: Some("sk-file".to_string()),
            base_url: "https://llm.test/v1/".to_string(),
            ..Default::default()
        };
        let resolved = settings.resolve_with(&env).unwrap();
        assert_eq!(resolved.api_key, "sk-file");
        assert_eq!(resolved.base_url, "https://llm.test/v1");
        assert_eq!(resolved.name, DEFAULT_NAME);
        assert_eq!(resolved.people, "");
    }

    #[test]
    fn analysis_without_key_fails() {
        let err = AnalysisSettings::default()
            .resolve_with(&env_from(&[]))
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn email_requires_all_three() {
        let env = env_from(&[("RESEND_API_KEY", "re_1"), ("FROM_EMAIL", "coach@example.com")]);
        let err = EmailSettings::default().resolve_with(&env).unwrap_err();
        assert!(err.to_string().contains("RECIPIENT_EMAIL"));

        let env = env_from(&[
            ("RESEND_API_KEY", "re_1"),
            ("FROM_EMAIL", "coach@example.com"),
            ("RECIPIENT_EMAIL", "me@example.com"),
        ]);
        let resolved = EmailSettings::default().resolve_with(&env).unwrap();
        assert_eq!(resolved.to, "me@example.com");
        assert_eq!(resolved.base_url, "https://api.resend.com");
    }

    #[test]
    fn redaction_masks_only_literal_keys() {
        let mut config = ClientConfig::default();
        config.analysis.api_key = Some("sk-literal".to_string());
        config.email.api_key = Some("pass::mail/resend".to_string());
        let redacted = config.redacted();
        assert_eq!(redacted.analysis.api_key.as_deref(), Some("<redacted>"));
        assert_eq!(redacted.email.api_key.as_deref(), Some("pass::mail/resend"));
    }
}
