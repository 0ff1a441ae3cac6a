use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Credential;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionData {
    credential: Credential,
    saved_at: DateTime<Utc>,
}

/// On-disk copy of the current credential so a session survives restarts.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn in_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: cache_dir.into().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved credential.
    ///
    /// A session without a refresh token cannot be renewed and is treated as
    /// absent. An expired access token is kept: the dispatcher refreshes it.
    pub fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;

        if data.credential.refresh_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(data.credential))
    }

    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = SessionData {
            credential: credential.clone(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&data)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = SessionFile::in_dir(dir.path());
        assert_eq!(file.load().expect("load"), None);

        let cred = Credential::new("admin", "Aditya", "admin", "A1", "R1");
        file.save(&cred).expect("save");
        assert_eq!(file.load().expect("load"), Some(cred));

        file.clear().expect("clear");
        assert!(!file.path().exists());
        assert_eq!(file.load().expect("load"), None);
        // Clearing twice is fine
        file.clear().expect("clear again");
    }

    #[test]
    fn test_load_without_refresh_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = SessionFile::in_dir(dir.path());
        file.save(&Credential::new("admin", "Aditya", "admin", "A1", ""))
            .expect("save");
        assert_eq!(file.load().expect("load"), None);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = SessionFile::in_dir(dir.path());
        std::fs::write(file.path(), "{not json").expect("write");
        assert!(file.load().is_err());
    }
}
