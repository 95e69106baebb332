//! Token storage.
//!
//! Reads/writes ~/.config/dataramp/auth.json (0600 on Unix). Auth is
//! soft: callers tolerate a missing file and proceed unauthenticated.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Authentication credentials stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredentials {
    /// Bearer token for the console API
    pub token: String,
    /// API base override; when absent, settings.json's base applies
    #[serde(default)]
    pub api_base: Option<String>,
    /// User identifier (for display and upload attribution)
    #[serde(default)]
    pub user: Option<String>,
}

impl AuthCredentials {
    pub fn new(token: String) -> Self {
        Self {
            token,
            api_base: None,
            user: None,
        }
    }
}

/// Returns the path to the auth credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("dataramp/auth.json"))
}

/// Load saved auth credentials from disk.
/// Returns None if no credentials are saved or if the file is invalid.
pub fn load_auth() -> Option<AuthCredentials> {
    let path = auth_file_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save auth credentials to disk.
/// Creates the parent directory if it doesn't exist.
/// Sets 0600 permissions on Unix.
pub fn save_auth(creds: &AuthCredentials) -> Result<(), String> {
    let path = auth_file_path().ok_or("Could not determine config directory")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(creds)
        .map_err(|e| format!("Failed to serialize credentials: {}", e))?;

    std::fs::write(&path, &contents).map_err(|e| format!("Failed to write auth file: {}", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, permissions)
            .map_err(|e| format!("Failed to set file permissions: {}", e))?;
    }

    Ok(())
}

/// Delete saved auth credentials.
pub fn delete_auth() -> Result<(), String> {
    let Some(path) = auth_file_path() else {
        return Ok(());
    };
    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| format!("Failed to delete auth file: {}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_roundtrip() {
        let creds = AuthCredentials {
            token: "tok-123".into(),
            api_base: Some("https://console.acme.dev".into()),
            user: Some("alice".into()),
        };

        let json = serde_json::to_string_pretty(&creds).unwrap();
        let parsed: AuthCredentials = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.token, "tok-123");
        assert_eq!(parsed.api_base.as_deref(), Some("https://console.acme.dev"));
        assert_eq!(parsed.user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_missing_optional_fields() {
        let parsed: AuthCredentials = serde_json::from_str(r#"{"token":"tok"}"#).unwrap();
        assert_eq!(parsed.token, "tok");
        assert!(parsed.api_base.is_none());
        assert!(parsed.user.is_none());
    }

    #[test]
    fn test_auth_file_path_shape() {
        let path = auth_file_path().unwrap();
        assert!(path.to_string_lossy().contains("dataramp"));
        assert!(path.to_string_lossy().ends_with("auth.json"));
    }

    #[test]
    fn test_save_and_load_in_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");

        // Write and read manually since save_auth targets the real config path
        let creds = AuthCredentials::new("tok456".into());
        std::fs::write(&path, serde_json::to_string_pretty(&creds).unwrap()).unwrap();

        let loaded: AuthCredentials =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.token, "tok456");
        assert!(loaded.user.is_none());
    }
}
