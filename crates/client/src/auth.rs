//! Token storage.
//!
//! Reads/writes ~/.config/metagrid/auth.json (0600 on Unix) so that
//! `mgrid login` has to run only once per machine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Locally stored API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredentials {
    /// Bearer token for the platform API
    pub token: String,
    /// API base URL (e.g., "https://platform.example.org")
    pub api_base: String,
    /// User name, for display only
    #[serde(default)]
    pub user: Option<String>,
}

impl AuthCredentials {
    pub fn new(token: String, api_base: String) -> Self {
        Self {
            token,
            api_base,
            user: None,
        }
    }
}

/// Path to the credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("metagrid/auth.json"))
}

/// Load saved credentials. None if nothing is saved or the file is
/// invalid.
pub fn load_auth() -> Option<AuthCredentials> {
    let path = auth_file_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save credentials, creating the parent directory if needed and
/// restricting permissions to the owner on Unix.
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

/// Delete saved credentials. Succeeds when none exist.
pub fn delete_auth() -> Result<(), String> {
    let Some(path) = auth_file_path() else {
        return Ok(());
    };
    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| format!("Failed to delete auth file: {}", e))?;
    }
    Ok(())
}
