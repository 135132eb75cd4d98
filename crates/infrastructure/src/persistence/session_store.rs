//! File-backed session store.
//!
//! The session lives in a single JSON document in the platform config
//! directory:
//! - Linux/macOS: ~/.config/riptide/session.json
//! - Windows: %APPDATA%/riptide/session.json

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::{fs, io};

use riptide_application::SessionStore;
use riptide_domain::{AuthSession, TokenPair};
use serde_json::Value;

/// Durable [`SessionStore`] that mirrors every change to disk.
///
/// The file is read once at construction. A missing file means a signed-out
/// session; an unreadable or corrupt file is treated the same way so a bad
/// disk state can never take the client down.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    session: Mutex<AuthSession>,
}

impl FileSessionStore {
    /// Opens the store at `path`, loading whatever session is already there.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = load_session(&path);
        Self {
            path,
            session: Mutex::new(session),
        }
    }

    /// Default location of the session file.
    ///
    /// Falls back to the system temp directory when no config directory is
    /// available.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("riptide")
            .join("session.json")
    }

    /// Path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AuthSession> {
        self.session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn persist(&self, session: &AuthSession) {
        if let Some(parent) = self.path.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            tracing::warn!(path = %parent.display(), error = %err, "could not create session directory");
            return;
        }
        match serde_json::to_vec_pretty(session) {
            Ok(bytes) => {
                if let Err(err) = fs::write(&self.path, bytes) {
                    tracing::warn!(path = %self.path.display(), error = %err, "could not write session file");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not serialize session");
            }
        }
    }

    fn remove_file(&self) {
        if let Err(err) = fs::remove_file(&self.path)
            && err.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %err, "could not remove session file");
        }
    }
}

fn load_session(path: &Path) -> AuthSession {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return AuthSession::default(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not read session file");
            return AuthSession::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "session file is corrupt; starting signed out"
            );
            AuthSession::default()
        }
    }
}

impl SessionStore for FileSessionStore {
    fn snapshot(&self) -> AuthSession {
        self.lock().clone()
    }

    fn set_tokens(&self, tokens: &TokenPair) {
        let mut session = self.lock();
        session.apply_tokens(tokens);
        self.persist(&session);
    }

    fn set_cached_user(&self, user: Option<Value>) {
        let mut session = self.lock();
        session.apply_user(user);
        self.persist(&session);
    }

    fn clear(&self) {
        let mut session = self.lock();
        session.clear();
        drop(session);
        self.remove_file();
    }
}
