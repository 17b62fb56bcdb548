//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module     | Commands handled                    |
//! |------------|-------------------------------------|
//! | `auth`     | `Login`, `Logout`, `Whoami`         |
//! | `config`   | `Config`                            |
//! | `entries`  | `Ipqc`, `Oqc`                       |
//! | `products` | `Products`                          |
//! | `users`    | `Users`                             |
//! | `admin`    | `Admin`                             |

pub mod admin;
pub mod auth;
pub mod config;
pub mod entries;
pub mod products;
pub mod users;

pub use admin::cmd_admin;
pub use auth::{cmd_login, cmd_logout, cmd_whoami};
pub use config::cmd_config;
pub use entries::{cmd_ipqc, cmd_oqc};
pub use products::cmd_products;
pub use users::cmd_users;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use console::style;
use tracing::warn;

use qcdesk::api::ApiClient;
use qcdesk::config::{QcConfig, config_home};
use qcdesk::errors::{ApiError, SessionError};
use qcdesk::model::{EntryFilter, Role, today};
use qcdesk::session::{Session, SessionStore};
use qcdesk::ui::icons::WARN;

use super::{Cli, ScopeArgs};

/// Config, session store and the loaded session for one invocation.
pub struct AppContext {
    pub config: QcConfig,
    pub store: SessionStore,
    pub session: Option<Session>,
    pub yes: bool,
}

impl AppContext {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config = QcConfig::load(cli.config.clone(), cli.api_url.clone())?;
        let store = SessionStore::new(cli.session_dir.clone().unwrap_or_else(config_home));
        let session = match store.load() {
            Ok(session) => session,
            Err(e @ SessionError::Parse { .. }) => {
                warn!(error = %e, "ignoring unreadable session");
                None
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            config,
            store,
            session,
            yes: cli.yes,
        })
    }

    pub fn client(&self) -> Result<ApiClient> {
        self.config
            .client(self.session.as_ref().map(|s| s.token.clone()))
    }

    /// The session, if its role is one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<&Session> {
        Ok(qcdesk::session::require_role(self.session.as_ref(), allowed)?)
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(Session::role)
    }

    /// Turn an API failure into a command error. A 401 also ends the session.
    pub fn api_error(&self, err: ApiError) -> anyhow::Error {
        if err.is_auth() {
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "failed to clear session after 401");
            }
        }
        anyhow!(err)
    }

    /// Ask before a destructive action unless `--yes` was given.
    pub fn confirm(&self, prompt: &str) -> bool {
        if self.yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    /// Resolve the date/shift/plant/line scope: flags, then qcdesk.toml,
    /// then today and S1.
    pub fn filter(&self, scope: &ScopeArgs) -> Result<EntryFilter> {
        let date = match &scope.date {
            Some(d) => check_date(d)?,
            None => today(),
        };
        let defaults = &self.config.toml.defaults;
        let shift = scope.shift.unwrap_or(defaults.shift);
        Ok(EntryFilter::new(date, shift)
            .with_plant(scope.plant.clone().or_else(|| defaults.plant.clone()))
            .with_line(scope.line.clone().or_else(|| defaults.line.clone())))
    }
}

/// Accept `YYYY-MM-DD` only.
pub fn check_date(input: &str) -> Result<String> {
    let trimmed = input.trim();
    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", input))?;
    Ok(trimmed.to_string())
}

/// Where to write an export: the given file, or `default_name` inside the
/// given directory (or the current directory).
pub fn export_path(output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(p) if p.is_dir() => p.join(default_name),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(default_name),
    }
}

pub fn print_warning(message: &str) {
    eprintln!("{}{}", WARN, style(message).yellow());
}

/// Read a password from the flag or an interactive hidden prompt.
pub fn password_or_prompt(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(p) => Ok(p),
        None => dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .context("Failed to read password"),
    }
}
