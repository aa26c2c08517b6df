//! Saved connection profile.
//!
//! Only the server URL and user name are persisted. The password is always
//! supplied per invocation (flag or `NETTIME_PASSWORD`).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored profile data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub url: Option<String>,
    pub username: Option<String>,
}

/// Get the profile file path, creating its directory.
fn profile_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "nettime").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("profile.json"))
}

/// Save the profile to disk.
pub fn save(profile: &Profile) -> Result<PathBuf> {
    let path = profile_path()?;
    let json = serde_json::to_string_pretty(profile)?;

    fs::write(&path, json).context("Failed to write profile file")?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(path)
}

/// Load the profile, if one was saved.
pub fn load() -> Result<Option<Profile>> {
    let path = profile_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read profile file")?;
    let profile = serde_json::from_str(&json).context("Invalid profile file")?;
    Ok(Some(profile))
}

/// Remove the saved profile. Returns whether one existed.
pub fn clear() -> Result<bool> {
    let path = profile_path()?;

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).context("Failed to remove profile file")?;
    Ok(true)
}
