use crate::errors::{ErrorKind, JsonDbError, JsonDbResult};
use crate::DATABASE_DIR_NAME;
use std::env;
use std::path::PathBuf;

/// Resolves the platform application-data directory for `app_name`.
///
/// - Windows: `%APPDATA%/<app_name>/database`
/// - macOS: `$HOME/Library/Application Support/<app_name>/database`
/// - anything else: `var/local/<app_name>/database`, relative to the working directory
///
/// An unset `APPDATA` or `HOME` falls back to the relative location.
pub fn default_base_dir(app_name: &str) -> PathBuf {
    platform_user_data(env::consts::OS, app_name).join(DATABASE_DIR_NAME)
}

fn platform_user_data(os: &str, app_name: &str) -> PathBuf {
    let fallback = || PathBuf::from("var").join("local").join(app_name);
    match os {
        "windows" => env::var_os("APPDATA")
            .map(|app_data| PathBuf::from(app_data).join(app_name))
            .unwrap_or_else(fallback),
        "macos" => env::var_os("HOME")
            .map(|home| {
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(app_name)
            })
            .unwrap_or_else(fallback),
        _ => fallback(),
    }
}

/// Checks that a collection name maps to exactly one file inside the base directory.
pub fn validate_collection_name(name: &str) -> JsonDbResult<()> {
    if name.trim().is_empty() {
        log::error!("Collection name cannot be empty");
        return Err(JsonDbError::new(
            "Collection name cannot be empty",
            ErrorKind::InvalidCollectionName,
        ));
    }

    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        log::error!("Collection name '{}' is not a plain file name", name);
        return Err(JsonDbError::new(
            &format!("Collection name '{}' is not a plain file name", name),
            ErrorKind::InvalidCollectionName,
        ));
    }

    Ok(())
}
