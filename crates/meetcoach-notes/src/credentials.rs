//! Credential store for the notes desktop app.
//!
//! The desktop app keeps its session in a JSON file. Over time it has used
//! three layouts, checked in this order:
//!
//! 1. `workos_tokens`: a *string* holding JSON with the token pair
//! 2. `currentSession`: an object holding the token pair
//! 3. `access_token` / `refresh_token` at the top level
//!
//! Refresh tokens are single-use, so every refresh must be written back in
//! the layout it was read from, or the next run cannot authenticate.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{NotesError, NotesResult};

/// Client id used when the credential file does not name one.
pub const DEFAULT_CLIENT_ID: &str = "client_01JARHTH2HQ6D64XDAEVXFNQ44";

const ENCODED_TOKENS_KEY: &str = "workos_tokens";
const SESSION_KEY: &str = "currentSession";
const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";
const CLIENT_ID_KEY: &str = "client_id";

/// Which on-disk layout the tokens were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialShape {
    /// Tokens inside a JSON-encoded string field.
    EncodedTokens,
    /// Tokens inside a nested session object.
    Session,
    /// Tokens at the top level.
    Flat,
}

impl CredentialShape {
    /// Probe order used when reading a credential file.
    pub const PRIORITY: [CredentialShape; 3] = [Self::EncodedTokens, Self::Session, Self::Flat];

    /// Extracts `(access_token, refresh_token)` from `root` if this layout
    /// is present and holds both tokens.
    fn extract(&self, root: &Map<String, Value>) -> Option<(String, String)> {
        match self {
            Self::EncodedTokens => {
                let encoded = root.get(ENCODED_TOKENS_KEY)?.as_str()?;
                let inner: Value = serde_json::from_str(encoded).ok()?;
                token_pair(inner.as_object()?)
            }
            Self::Session => token_pair(root.get(SESSION_KEY)?.as_object()?),
            Self::Flat => token_pair(root),
        }
    }

    /// Writes the token pair into `root` using this layout, leaving every
    /// other key untouched.
    fn inject(&self, root: &mut Map<String, Value>, access: &str, refresh: &str) {
        match self {
            Self::EncodedTokens => {
                let mut inner = root
                    .get(ENCODED_TOKENS_KEY)
                    .and_then(Value::as_str)
                    .and_then(|s| serde_json::from_str::<Value>(s).ok())
                    .and_then(|v| match v {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .unwrap_or_default();
                set_token_pair(&mut inner, access, refresh);
                root.insert(
                    ENCODED_TOKENS_KEY.to_string(),
                    Value::String(Value::Object(inner).to_string()),
                );
            }
            Self::Session => {
                let session = root
                    .entry(SESSION_KEY)
                    .or_insert_with(|| Value::Object(Map::new()));
                if !session.is_object() {
                    *session = Value::Object(Map::new());
                }
                if let Value::Object(map) = session {
                    set_token_pair(map, access, refresh);
                }
            }
            Self::Flat => set_token_pair(root, access, refresh),
        }
    }
}

fn token_pair(map: &Map<String, Value>) -> Option<(String, String)> {
    let access = map.get(ACCESS_TOKEN_KEY)?.as_str()?;
    let refresh = map.get(REFRESH_TOKEN_KEY)?.as_str()?;
    if access.is_empty() || refresh.is_empty() {
        return None;
    }
    Some((access.to_string(), refresh.to_string()))
}

fn set_token_pair(map: &mut Map<String, Value>, access: &str, refresh: &str) {
    map.insert(ACCESS_TOKEN_KEY.to_string(), Value::String(access.to_string()));
    map.insert(REFRESH_TOKEN_KEY.to_string(), Value::String(refresh.to_string()));
}

/// The token pair used to talk to the notes service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Single-use token exchanged for a new pair.
    pub refresh_token: String,
    /// Client id presented to the auth endpoint.
    pub client_id: String,
    /// Layout the tokens were read from.
    pub shape: CredentialShape,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("shape", &self.shape)
            .finish()
    }
}

impl Credentials {
    /// Parses a credential document.
    ///
    /// Each layout is tried in [`CredentialShape::PRIORITY`] order; the first
    /// one holding both tokens wins.
    pub fn from_json(content: &str) -> NotesResult<Self> {
        let root: Value = serde_json::from_str(content).map_err(|e| {
            NotesError::credentials_invalid(format!("failed to parse credentials: {}", e))
                .with_source(e)
        })?;
        let root = root.as_object().ok_or_else(|| {
            NotesError::credentials_invalid("failed to parse credentials: not a JSON object")
        })?;

        let (shape, (access_token, refresh_token)) = CredentialShape::PRIORITY
            .iter()
            .find_map(|shape| shape.extract(root).map(|pair| (*shape, pair)))
            .ok_or_else(|| {
                NotesError::credentials_invalid(
                    "no access/refresh token pair found in credentials; log in to the notes app again",
                )
            })?;

        let client_id = root
            .get(CLIENT_ID_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CLIENT_ID)
            .to_string();

        Ok(Self {
            access_token,
            refresh_token,
            client_id,
            shape,
        })
    }

    /// Replaces the token pair after a refresh.
    pub fn rotate(&mut self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        self.access_token = access_token.into();
        self.refresh_token = refresh_token.into();
    }
}

/// The credential file on disk.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The desktop app's default location, under the platform data dir.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Granola")
            .join("supabase.json")
    }

    /// Returns the credential file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the credential file.
    ///
    /// A missing file and an unparsable file are both fatal; the user has
    /// to log in to the desktop app again.
    pub fn load(&self) -> NotesResult<Credentials> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NotesError::credentials_not_found(format!(
                    "credentials not found at {}. Make sure the notes app is installed and you are logged in",
                    self.path.display()
                )));
            }
            Err(e) => {
                return Err(NotesError::credentials_invalid(format!(
                    "failed to read credentials at {}: {}",
                    self.path.display(),
                    e
                ))
                .with_source(e));
            }
        };

        let credentials = Credentials::from_json(&content)?;
        info!(
            path = %self.path.display(),
            shape = ?credentials.shape,
            "loaded notes credentials"
        );
        Ok(credentials)
    }

    /// Writes the current token pair back in the layout it was read from.
    ///
    /// The file is re-read so keys this crate does not know about survive.
    /// If the file vanished it is recreated with just the tokens.
    pub fn persist(&self, credentials: &Credentials) -> NotesResult<()> {
        let mut root = match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    warn!(path = %self.path.display(), "credential file is no longer a JSON object, rewriting");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                return Err(NotesError::persistence(format!(
                    "failed to read credentials for update: {}",
                    e
                ))
                .with_source(e));
            }
        };

        credentials
            .shape
            .inject(&mut root, &credentials.access_token, &credentials.refresh_token);

        let content = serde_json::to_string_pretty(&Value::Object(root)).map_err(|e| {
            NotesError::internal(format!("failed to serialize credentials: {}", e))
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                NotesError::persistence(format!("failed to create credential directory: {}", e))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| {
            NotesError::persistence(format!("failed to write credentials: {}", e)).with_source(e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600));
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            NotesError::persistence(format!("failed to replace credentials: {}", e))
                .with_source(e)
        })?;

        debug!(path = %self.path.display(), "persisted refreshed tokens");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotesErrorCode;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, value: &Value) -> CredentialStore {
        let path = dir.path().join("supabase.json");
        fs::write(&path, value.to_string()).unwrap();
        CredentialStore::new(path)
    }

    fn read(store: &CredentialStore) -> Value {
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap()
    }

    #[test]
    fn encoded_tokens_shape() {
        let doc = json!({
            "workos_tokens": json!({
                "access_token": "test_access_token",
                "refresh_token": "test_refresh_token"
            }).to_string()
        });
        let creds = Credentials::from_json(&doc.to_string()).unwrap();
        assert_eq!(creds.access_token, "test_access_token");
        assert_eq!(creds.refresh_token, "test_refresh_token");
        assert_eq!(creds.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(creds.shape, CredentialShape::EncodedTokens);
    }

    #[test]
    fn session_shape() {
        let doc = json!({
            "currentSession": {"access_token": "a2", "refresh_token": "r2"},
            "client_id": "client_custom"
        });
        let creds = Credentials::from_json(&doc.to_string()).unwrap();
        assert_eq!((creds.access_token.as_str(), creds.refresh_token.as_str()), ("a2", "r2"));
        assert_eq!(creds.client_id, "client_custom");
        assert_eq!(creds.shape, CredentialShape::Session);
    }

    #[test]
    fn flat_shape() {
        let doc = json!({"access_token": "a3", "refresh_token": "r3"});
        let creds = Credentials::from_json(&doc.to_string()).unwrap();
        assert_eq!((creds.access_token.as_str(), creds.refresh_token.as_str()), ("a3", "r3"));
        assert_eq!(creds.shape, CredentialShape::Flat);
    }

    #[test]
    fn encoded_tokens_take_priority() {
        let doc = json!({
            "workos_tokens": json!({"access_token": "a1", "refresh_token": "r1"}).to_string(),
            "currentSession": {"access_token": "a2", "refresh_token": "r2"},
            "access_token": "a3",
            "refresh_token": "r3"
        });
        let creds = Credentials::from_json(&doc.to_string()).unwrap();
        assert_eq!(creds.access_token, "a1");
        assert_eq!(creds.shape, CredentialShape::EncodedTokens);
    }

    #[test]
    fn incomplete_shape_falls_through() {
        let doc = json!({
            "workos_tokens": json!({"access_token": "a1"}).to_string(),
            "currentSession": {"access_token": "a2", "refresh_token": "r2"}
        });
        let creds = Credentials::from_json(&doc.to_string()).unwrap();
        assert_eq!(creds.shape, CredentialShape::Session);
    }

    #[test]
    fn no_tokens_is_invalid() {
        let err = Credentials::from_json(r#"{"user": "me"}"#).unwrap_err();
        assert_eq!(err.code(), NotesErrorCode::CredentialsInvalid);
        assert!(err.message().contains("no access/refresh token pair"));
    }

    #[test]
    fn malformed_json_is_invalid() {
        let err = Credentials::from_json("{not json").unwrap_err();
        assert_eq!(err.code(), NotesErrorCode::CredentialsInvalid);
        assert!(err.message().contains("failed to parse credentials"));
    }

    #[test]
    fn missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.json");
        let err = CredentialStore::new(&path).load().unwrap_err();
        assert_eq!(err.code(), NotesErrorCode::CredentialsNotFound);
        assert!(err.message().contains(&path.display().to_string()));
    }

    #[test]
    fn debug_redacts_tokens() {
        let creds = Credentials::from_json(r#"{"access_token":"secret-a","refresh_token":"secret-r"}"#)
            .unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret-a"));
        assert!(!debug.contains("secret-r"));
    }

    #[test]
    fn persist_keeps_encoded_shape_and_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = write(
            &dir,
            &json!({
                "workos_tokens": json!({
                    "access_token": "old-a",
                    "refresh_token": "old-r",
                    "expires_in": 3600
                }).to_string(),
                "user_info": {"email": "me@example.com"}
            }),
        );

        let mut creds = store.load().unwrap();
        creds.rotate("new-a", "new-r");
        store.persist(&creds).unwrap();

        let saved = read(&store);
        assert_eq!(saved["user_info"]["email"], "me@example.com");
        let inner: Value =
            serde_json::from_str(saved["workos_tokens"].as_str().unwrap()).unwrap();
        assert_eq!(inner["access_token"], "new-a");
        assert_eq!(inner["refresh_token"], "new-r");
        assert_eq!(inner["expires_in"], 3600);

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.refresh_token, "new-r");
        assert_eq!(reloaded.shape, CredentialShape::EncodedTokens);
    }

    #[test]
    fn persist_keeps_session_shape() {
        let dir = TempDir::new().unwrap();
        let store = write(
            &dir,
            &json!({"currentSession": {"access_token": "a", "refresh_token": "r", "user": "u"}}),
        );

        let mut creds = store.load().unwrap();
        creds.rotate("a2", "r2");
        store.persist(&creds).unwrap();

        let saved = read(&store);
        assert_eq!(saved["currentSession"]["access_token"], "a2");
        assert_eq!(saved["currentSession"]["refresh_token"], "r2");
        assert_eq!(saved["currentSession"]["user"], "u");
        assert!(saved.get("access_token").is_none());
    }

    #[test]
    fn persist_keeps_flat_shape() {
        let dir = TempDir::new().unwrap();
        let store = write(
            &dir,
            &json!({"access_token": "a", "refresh_token": "r", "client_id": "c"}),
        );

        let mut creds = store.load().unwrap();
        creds.rotate("a2", "r2");
        store.persist(&creds).unwrap();

        let saved = read(&store);
        assert_eq!(saved["access_token"], "a2");
        assert_eq!(saved["refresh_token"], "r2");
        assert_eq!(saved["client_id"], "c");
        assert!(!dir.path().join("supabase.json.tmp").exists());
    }
}
