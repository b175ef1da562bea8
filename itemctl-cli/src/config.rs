//! Environment loading for itemctl
//!
//! Values come from the process environment, optionally seeded from `.env`
//! files. Existing variables are never overwritten.

use std::path::PathBuf;

/// Get the itemctl config directory path (~/.itemctl)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".itemctl"))
}

/// Load environment variables from .env files
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.itemctl/.env
///
/// Runs before tracing is initialized (clap reads the environment for its
/// defaults), so the loaded paths are returned for the caller to log.
/// Unreadable files are skipped.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded_from = Vec::new();

    // dotenvy never overwrites, so the first file loaded wins
    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path);
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
            loaded_from.push(env_file);
        }
    }

    loaded_from
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_ends_with_itemctl() {
        if let Some(path) = config_dir() {
            assert!(path.ends_with(".itemctl"));
        }
    }

    #[test]
    fn load_dotenv_doesnt_panic() {
        let _ = load_dotenv();
    }
}
