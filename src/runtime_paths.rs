use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{DEFAULT_ROOT_DIR_NAME, DESKTOP_STATE_FILE, ROOT_DIR_ENV, SESSION_DATA_DIR};

/// Root directory holding settings, persisted state, session data and logs.
///
/// `DESKTOP_SHELL_ROOT` wins over the per-user default `~/.desktop-shell`.
pub fn default_root_dir() -> Option<PathBuf> {
    root_dir_from_env().or_else(|| home::home_dir().map(|home| home.join(DEFAULT_ROOT_DIR_NAME)))
}

fn root_dir_from_env() -> Option<PathBuf> {
    let raw = env::var(ROOT_DIR_ENV).ok()?;
    let path = PathBuf::from(raw.trim());
    if path.as_os_str().is_empty() {
        return None;
    }
    Some(path)
}

pub fn desktop_state_path(root_dir: &Path) -> PathBuf {
    root_dir.join("data").join(DESKTOP_STATE_FILE)
}

pub fn session_data_dir(root_dir: &Path) -> PathBuf {
    root_dir.join("data").join(SESSION_DATA_DIR)
}

pub fn settings_path_for_env(root_dir: &Path, env_name: &str) -> PathBuf {
    root_dir.join(format!("settings.{env_name}.json"))
}
