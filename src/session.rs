//! On-disk login session and UI preferences.
//!
//! `session.json` holds the bearer token and the signed-in user. It is
//! written on login and removed on logout or when the service answers 401.
//! `prefs.json` keeps list settings between runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{SessionError, ValidationError};
use crate::model::{EntryKind, Role, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Reject the session unless its role is one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<&Self, SessionError> {
        if allowed.contains(&self.user.role) {
            return Ok(self);
        }
        Err(SessionError::Forbidden {
            role: self.user.role,
            allowed: allowed
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

/// Role guard over an optional session.
pub fn require_role<'a>(session: Option<&'a Session>, allowed: &[Role]) -> Result<&'a Session, SessionError> {
    session.ok_or(SessionError::NotLoggedIn)?.require_role(allowed)
}

/// Checks run before the login request is sent.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminTab {
    #[default]
    Overview,
    Products,
    Users,
    Totals,
}

/// Settings remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub products_query: String,
    pub products_page: u32,
    pub products_take: u32,
    pub products_include_inactive: bool,
    pub admin_tab: AdminTab,
    pub overview_kind: EntryKind,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            products_query: String::new(),
            products_page: 1,
            products_take: 20,
            products_include_inactive: false,
            admin_tab: AdminTab::default(),
            overview_kind: EntryKind::Ipqc,
        }
    }
}

/// Directory holding `session.json` and `prefs.json`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join("session.json")
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.dir.join("prefs.json")
    }

    /// `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        read_json(&self.session_path())
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        write_json(&self.session_path(), session)?;
        debug!(user = %session.user.email, "session saved");
        Ok(())
    }

    /// Remove the session file. Missing files are fine.
    pub fn clear(&self) -> Result<(), SessionError> {
        let path = self.session_path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io { path, source }),
        }
    }

    /// Stored preferences, or defaults when none are saved.
    pub fn preferences(&self) -> Result<Preferences, SessionError> {
        Ok(read_json(&self.prefs_path())?.unwrap_or_default())
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<(), SessionError> {
        write_json(&self.prefs_path(), prefs)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SessionError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SessionError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| SessionError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SessionError> {
    let io_err = |source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = serde_json::to_string_pretty(value).map_err(|source| SessionError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content).map_err(io_err)
}
