//! The logged-in session, persisted as JSON between invocations.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use quill_core::domain::Session;

const SESSION_FILE_ENV: &str = "QUILL_SESSION_FILE";
const DEFAULT_FILE_NAME: &str = ".quill-session.json";

pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `QUILL_SESSION_FILE`, else `$HOME/.quill-session.json`.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var(SESSION_FILE_ENV) {
            return Ok(Self::new(path));
        }
        let home = std::env::var("HOME")
            .map_err(|_| anyhow!("Set {SESSION_FILE_ENV} or HOME to store the session"))?;
        Ok(Self::new(Path::new(&home).join(DEFAULT_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session, or `None` when logged out or expired.
    pub fn load(&self) -> Result<Option<Session>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let session: Session = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a valid session file", self.path.display()))?;

        if session.is_expired() {
            tracing::debug!(path = %self.path.display(), "Stored session has expired");
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Like [`Self::load`], but logged out is an error.
    pub fn require(&self) -> Result<Session> {
        self.load()?
            .ok_or_else(|| anyhow!("Not logged in. Run `quill login` first."))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Forget the session. Returns whether there was one.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use uuid::Uuid;

    use super::*;

    fn session(valid_for: TimeDelta) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            access_token: "token".to_string(),
            expires_at: Utc::now() + valid_for,
        }
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("nested").join("session.json"));
        let stored = session(TimeDelta::hours(1));

        assert!(file.load().unwrap().is_none());
        file.save(&stored).unwrap();
        assert_eq!(file.load().unwrap(), Some(stored));

        assert!(file.clear().unwrap());
        assert!(!file.clear().unwrap());
        assert!(file.require().is_err());
    }

    #[test]
    fn test_expired_session_counts_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));
        file.save(&session(TimeDelta::minutes(-5))).unwrap();

        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = SessionFile::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("not a valid session file"));
    }
}
