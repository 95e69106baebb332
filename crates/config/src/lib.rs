//! Local configuration for the console tools.
//!
//! Two files under `~/.config/dataramp/`:
//! - `settings.json` - tunables (API base, default environment, page size)
//! - `auth.json` - bearer token, 0600 on Unix
//!
//! Auth is soft: a missing or unreadable auth file yields `None` and
//! callers proceed unauthenticated.

mod auth;
mod settings;

pub use auth::{auth_file_path, delete_auth, load_auth, save_auth, AuthCredentials};
pub use settings::Settings;
