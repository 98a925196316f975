//! Secret service implementation.
//!
//! Loads the Gemini API key from `~/.config/pictor/secret.json`, with the
//! `GEMINI_API_KEY` environment variable taking precedence. The loaded
//! configuration is cached to avoid repeated file I/O.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use pictor_core::config::{GeminiConfig, SecretConfig};
use pictor_core::error::{PictorError, Result};
use pictor_core::secret::SecretService;

/// Environment variable that supplies (or overrides) the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Service for managing secret configuration.
#[derive(Clone)]
pub struct SecretServiceImpl {
    /// Cached secret config. Uses RwLock for thread-safe lazy loading.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    /// Location of secret.json.
    path: PathBuf,
}

impl SecretServiceImpl {
    /// Creates a service reading from the default secret.json location.
    pub fn default() -> Result<Self> {
        Ok(Self::new(default_secret_path()?))
    }

    /// Creates a service reading from an explicit secret.json path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            secrets: Arc::new(RwLock::new(None)),
            path: path.into(),
        }
    }

    fn load_secrets_internal(&self) -> std::result::Result<SecretConfig, String> {
        {
            let read_lock = self.secrets.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let from_file = read_secret_file(&self.path)?;
        let env_key = std::env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty());

        let Some(loaded) = apply_env_override(from_file, env_key) else {
            return Err(format!(
                "No Gemini API key found: set {GEMINI_API_KEY_ENV} or create {}",
                self.path.display()
            ));
        };

        {
            let mut write_lock = self.secrets.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> std::result::Result<SecretConfig, String> {
        self.load_secrets_internal()
    }

    async fn secret_file_exists(&self) -> bool {
        self.load_secrets_internal().is_ok()
    }
}

/// Reads and parses secret.json, `None` when the file does not exist.
fn read_secret_file(path: &Path) -> std::result::Result<Option<SecretConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read secret file at {}: {e}", path.display()))?;

    let config = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse secret file at {}: {e}", path.display()))?;

    Ok(Some(config))
}

/// Merges an environment-provided API key over the file configuration.
///
/// The environment key wins; the file's model selection is kept.
fn apply_env_override(
    config: Option<SecretConfig>,
    env_key: Option<String>,
) -> Option<SecretConfig> {
    match (config, env_key) {
        (Some(mut config), Some(api_key)) => {
            let model_name = config.gemini.take().and_then(|gemini| gemini.model_name);
            config.gemini = Some(GeminiConfig {
                api_key,
                model_name,
            });
            Some(config)
        }
        (Some(config), None) => Some(config),
        (None, Some(api_key)) => Some(SecretConfig {
            gemini: Some(GeminiConfig {
                api_key,
                model_name: None,
            }),
        }),
        (None, None) => None,
    }
}

/// Returns the default secret file location: ~/.config/pictor/secret.json
fn default_secret_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PictorError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("pictor").join("secret.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_valid_secret_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(
            &path,
            r#"{"gemini": {"api_key": "k-123", "model_name": "gemini-x"}}"#,
        )
        .unwrap();

        let config = read_secret_file(&path).unwrap().unwrap();
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key, "k-123");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-x"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_secret_file(&dir.path().join("missing.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn malformed_file_reports_a_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_secret_file(&path).unwrap_err();
        assert!(err.contains("parse"), "unexpected message: {err}");
    }

    #[test]
    fn env_key_wins_but_keeps_the_file_model() {
        let config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "from-file".to_string(),
                model_name: Some("gemini-x".to_string()),
            }),
        };

        let merged = apply_env_override(Some(config), Some("from-env".to_string())).unwrap();
        let gemini = merged.gemini.unwrap();
        assert_eq!(gemini.api_key, "from-env");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-x"));
    }

    #[test]
    fn env_key_alone_is_enough() {
        let merged = apply_env_override(None, Some("k-env".to_string())).unwrap();
        assert_eq!(merged.gemini.unwrap().api_key, "k-env");
    }

    #[test]
    fn no_source_at_all_yields_none() {
        assert!(apply_env_override(None, None).is_none());
    }
}
