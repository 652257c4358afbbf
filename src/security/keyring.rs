//! API key storage
//!
//! Lookup order is the `SPROUT_API_KEY` environment variable, the OS
//! keyring, then a private file in the config directory. Writes always
//! land in the file, and in the keyring too when one is available.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const SERVICE_NAME: &str = "sprout";
const API_KEY_USERNAME: &str = "llm-api-key";
const API_KEY_FILE: &str = "api_key.txt";

/// Environment variable that overrides any stored key
pub const API_KEY_ENV: &str = "SPROUT_API_KEY";

/// Where a key is stored
pub struct KeyStore {
    file: PathBuf,
    use_keyring: bool,
}

impl KeyStore {
    /// Keyring plus the fallback file in the sprout config directory
    pub fn system() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("com", "sprout", "sprout")
            .context("Failed to get project directories")?;
        Ok(Self {
            file: dirs.config_dir().join(API_KEY_FILE),
            use_keyring: true,
        })
    }

    /// File-only store at `path`
    pub fn file_only(path: impl Into<PathBuf>) -> Self {
        Self { file: path.into(), use_keyring: false }
    }

    fn entry(&self) -> Option<keyring::Entry> {
        if !self.use_keyring {
            return None;
        }
        keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME).ok()
    }

    pub fn set(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("API key cannot be empty");
        }
        if let Some(entry) = self.entry() {
            if let Err(e) = entry.set_password(key) {
                tracing::info!("Keyring unavailable ({}), storing API key in file only", e);
            }
        }
        // Backup in case keyring retrieval fails in a later process
        write_private(&self.file, key)
    }

    pub fn get(&self) -> Result<String> {
        if let Some(key) = self.entry().and_then(|e| e.get_password().ok()) {
            return Ok(key);
        }
        let key = fs::read_to_string(&self.file)
            .context("No API key stored. Run 'sprout config --set-api-key YOUR_KEY' first.")?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("API key file {} is empty", self.file.display());
        }
        Ok(key.to_string())
    }

    /// Remove the key from the keyring and the file
    pub fn delete(&self) -> Result<()> {
        if let Some(entry) = self.entry() {
            let _ = entry.delete_credential();
        }
        if self.file.exists() {
            fs::remove_file(&self.file).context("Failed to delete API key file")?;
        }
        Ok(())
    }

    pub fn has(&self) -> bool {
        self.get().is_ok()
    }
}

fn write_private(path: &Path, key: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create config directory")?;
    }
    fs::write(path, key).context("Failed to write API key file")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .context("Failed to set file permissions")?;
    }

    Ok(())
}

fn env_api_key() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

pub fn set_api_key(key: &str) -> Result<()> {
    KeyStore::system()?.set(key)
}

pub fn get_api_key() -> Result<String> {
    match env_api_key() {
        Some(key) => Ok(key),
        None => KeyStore::system()?.get(),
    }
}

pub fn delete_api_key() -> Result<()> {
    KeyStore::system()?.delete()
}

pub fn has_api_key() -> bool {
    env_api_key().is_some() || KeyStore::system().map(|s| s.has()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = KeyStore::file_only(dir.path().join("nested").join(API_KEY_FILE));
        assert!(!store.has());

        store.set("  sk-or-test  ").unwrap();
        assert_eq!(store.get().unwrap(), "sk-or-test");

        store.delete().unwrap();
        assert!(!store.has());
    }

    #[test]
    fn test_empty_key_rejected() {
        let dir = tempdir().unwrap();
        let store = KeyStore::file_only(dir.path().join(API_KEY_FILE));
        assert!(store.set("   ").is_err());
        assert!(!store.has());
    }

    #[test]
    fn test_keyring_store_survives_a_new_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(API_KEY_FILE);
        let writer = KeyStore { file: path.clone(), use_keyring: true };
        writer.set("sk-or-persist").unwrap();
        assert!(path.exists());

        let reader = KeyStore { file: path, use_keyring: true };
        assert_eq!(reader.get().unwrap(), "sk-or-persist");

        reader.delete().unwrap();
        assert!(!writer.file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join(API_KEY_FILE);
        KeyStore::file_only(&path).set("secret").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
