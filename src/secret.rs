//! Secret webhook path generation and persistence.
//!
//! The webhook route is protected only by being unguessable: a 32-byte random
//! token, hex-encoded to 64 characters. The token is generated once on first
//! run and persisted to a per-user config file, so the public URL stays stable
//! across restarts. Deleting the file is the only way to rotate it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory name under the user config directory.
pub const CONFIG_DIR_NAME: &str = "puzzmo2signal";

/// File holding the persisted webhook path.
pub const CONFIG_FILE_NAME: &str = "webhook_config.json";

/// On-disk format: a single-record JSON object.
#[derive(Debug, Serialize, Deserialize)]
struct WebhookConfig {
    #[serde(default)]
    path: String,
}

/// Store for the single secret webhook path.
///
/// Read once at startup, before the server begins accepting connections;
/// never touched again while serving.
pub struct SecretPathStore {
    config_dir: PathBuf,
}

impl SecretPathStore {
    /// Create a store rooted at an explicit directory.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Create a store at the default per-user location,
    /// e.g. `~/.config/puzzmo2signal` on Linux.
    pub fn default_location() -> Result<Self> {
        let base = dirs::config_dir().context("Failed to resolve user config directory")?;
        Ok(Self::new(base.join(CONFIG_DIR_NAME)))
    }

    /// Return the persisted webhook path, generating and saving a new one if
    /// no valid record exists.
    ///
    /// Repeated calls return the same value. Any filesystem failure here is
    /// fatal for the caller: the server must not start without a stable path.
    pub fn load_or_create(&self) -> Result<String> {
        create_dir_restricted(&self.config_dir).with_context(|| {
            format!(
                "Failed to create config directory {}",
                self.config_dir.display()
            )
        })?;

        let config_file = self.config_dir.join(CONFIG_FILE_NAME);

        // An unreadable or corrupt file is treated the same as a missing one:
        // a fresh path is generated and written over it.
        if let Ok(data) = fs::read(&config_file) {
            if let Ok(config) = serde_json::from_slice::<WebhookConfig>(&data) {
                if !config.path.is_empty() {
                    return Ok(config.path);
                }
            }
        }

        let path = generate_secret_path();

        let data = serde_json::to_vec(&WebhookConfig { path: path.clone() })
            .context("Failed to serialize webhook config")?;

        write_restricted(&config_file, &data)
            .with_context(|| format!("Failed to write {}", config_file.display()))?;

        info!(
            config_file = %config_file.display(),
            "webhook_path_generated"
        );

        Ok(path)
    }
}

/// Generate a new secret path: 32 bytes from the OS CSPRNG, lowercase hex.
fn generate_secret_path() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Create a directory (and parents) readable only by the owner.
fn create_dir_restricted(dir: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
    }
    #[cfg(not(unix))]
    {
        fs::create_dir_all(dir)
    }
}

/// Write a file readable only by the owner.
fn write_restricted(file: &Path, data: &[u8]) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut f = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(file)?;
        f.write_all(data)
    }
    #[cfg(not(unix))]
    {
        fs::write(file, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_path_is_64_lowercase_hex() {
        let path = generate_secret_path();

        assert_eq!(path.len(), 64);
        assert!(path
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generated_paths_are_unique() {
        assert_ne!(generate_secret_path(), generate_secret_path());
    }

    #[test]
    fn test_load_or_create_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretPathStore::new(dir.path().join(CONFIG_DIR_NAME));

        let first = store.load_or_create().unwrap();
        let second = store.load_or_create().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_existing_path_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR_NAME);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join(CONFIG_FILE_NAME),
            r#"{"path":"deadbeef"}"#,
        )
        .unwrap();

        let store = SecretPathStore::new(&config_dir);

        assert_eq!(store.load_or_create().unwrap(), "deadbeef");
    }

    #[test]
    fn test_corrupt_config_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR_NAME);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(CONFIG_FILE_NAME), "not valid json").unwrap();

        let store = SecretPathStore::new(&config_dir);
        let path = store.load_or_create().unwrap();

        assert_eq!(path.len(), 64);
        // The replacement must have been persisted
        assert_eq!(store.load_or_create().unwrap(), path);
    }

    #[test]
    fn test_empty_path_field_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR_NAME);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(CONFIG_FILE_NAME), r#"{"path":""}"#).unwrap();

        let store = SecretPathStore::new(&config_dir);

        assert_eq!(store.load_or_create().unwrap().len(), 64);
    }

    #[cfg(unix)]
    #[test]
    fn test_config_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR_NAME);
        let store = SecretPathStore::new(&config_dir);
        store.load_or_create().unwrap();

        let dir_mode = fs::metadata(&config_dir).unwrap().permissions().mode();
        let file_mode = fs::metadata(config_dir.join(CONFIG_FILE_NAME))
            .unwrap()
            .permissions()
            .mode();

        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }
}
