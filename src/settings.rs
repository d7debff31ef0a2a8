use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    runtime_paths, DEFAULT_APP_NAME, DEFAULT_BACKGROUND_COLOR, DEFAULT_SERVICE_HOST,
    DEFAULT_SERVICE_PORT, DEFAULT_SERVICE_READY_POLL_INTERVAL_MS,
    DEFAULT_SERVICE_READY_TIMEOUT_MS, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH,
    SETTINGS_ENV_NAME_ENV, SETTINGS_PATH_ENV,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesktopSettings {
    pub app_name: String,
    pub app_version: String,
    pub quit_on_all_windows_closed: bool,
    pub service: ServiceSettings,
    pub window: WindowSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceSettings {
    pub host: String,
    pub port: u16,
    pub routes: Vec<String>,
    /// Command line that starts the service. `None` means the service is
    /// already running and only readiness is awaited.
    pub command: Option<String>,
    pub cwd: Option<PathBuf>,
    pub ready_timeout_ms: u64,
    pub ready_poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowSettings {
    pub default_width: u32,
    pub default_height: u32,
    pub background_color: String,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            quit_on_all_windows_closed: true,
            service: ServiceSettings::default(),
            window: WindowSettings::default(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVICE_HOST.to_string(),
            port: DEFAULT_SERVICE_PORT,
            routes: vec![String::new()],
            command: None,
            cwd: None,
            ready_timeout_ms: DEFAULT_SERVICE_READY_TIMEOUT_MS,
            ready_poll_interval_ms: DEFAULT_SERVICE_READY_POLL_INTERVAL_MS,
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_WINDOW_WIDTH,
            default_height: DEFAULT_WINDOW_HEIGHT,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
        }
    }
}

impl DesktopSettings {
    pub fn window_title(&self) -> String {
        format!("{} {}", self.app_name, self.app_version)
    }
}

/// `(r, g, b)` from `#rgb` or `#rrggbb`.
pub fn parse_hex_color(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |text: &str| u8::from_str_radix(text, 16).ok();
    match hex.len() {
        3 => {
            let expand = |index: usize| channel(&hex[index..index + 1].repeat(2));
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

pub fn normalize_env_name(raw: Option<&str>) -> &'static str {
    match raw.map(|value| value.trim().to_ascii_lowercase()) {
        Some(value) if value == "development" || value == "dev" => "development",
        _ => "production",
    }
}

/// Candidate settings file: explicit path first, then the per-environment
/// file under the root directory.
pub fn resolve_settings_path(
    explicit_path: Option<PathBuf>,
    root_dir: Option<&Path>,
    env_name: &str,
) -> Option<PathBuf> {
    explicit_path
        .filter(|path| !path.as_os_str().is_empty())
        .or_else(|| root_dir.map(|root| runtime_paths::settings_path_for_env(root, env_name)))
}

pub fn load_settings_from_path<F>(path: &Path, log: F) -> DesktopSettings
where
    F: Fn(&str),
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            log(&format!(
                "settings file {} not found, using built-in defaults",
                path.display()
            ));
            return DesktopSettings::default();
        }
        Err(error) => {
            log(&format!(
                "failed to read settings file {}: {}. using built-in defaults",
                path.display(),
                error
            ));
            return DesktopSettings::default();
        }
    };

    match serde_json::from_str::<DesktopSettings>(&raw) {
        Ok(settings) => {
            log(&format!("loaded settings from {}", path.display()));
            settings
        }
        Err(error) => {
            log(&format!(
                "failed to parse settings file {}: {}. using built-in defaults",
                path.display(),
                error
            ));
            DesktopSettings::default()
        }
    }
}

pub fn load_settings<F>(root_dir: Option<&Path>, log: F) -> DesktopSettings
where
    F: Fn(&str),
{
    let env_name = normalize_env_name(env::var(SETTINGS_ENV_NAME_ENV).ok().as_deref());
    let explicit_path = env::var(SETTINGS_PATH_ENV)
        .ok()
        .map(|value| PathBuf::from(value.trim()));
    match resolve_settings_path(explicit_path, root_dir, env_name) {
        Some(path) => load_settings_from_path(&path, log),
        None => {
            log("settings path is unavailable, using built-in defaults");
            DesktopSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("settings.development.json");
        fs::write(
            &path,
            r#"{ "appName": "cnc", "service": { "port": 8000, "routes": ["", "widget"] } }"#,
        )
        .expect("write settings");

        let settings = load_settings_from_path(&path, |_| {});
        assert_eq!(settings.app_name, "cnc");
        assert_eq!(settings.service.port, 8000);
        assert_eq!(settings.service.routes, vec!["".to_string(), "widget".to_string()]);
        assert_eq!(settings.service.host, DEFAULT_SERVICE_HOST);
        assert!(settings.quit_on_all_windows_closed);
        assert_eq!(settings.window.default_width, DEFAULT_WINDOW_WIDTH);
    }

    #[test]
    fn unreadable_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("settings.production.json");
        fs::write(&path, "{ broken").expect("write settings");

        assert_eq!(
            load_settings_from_path(&path, |_| {}),
            DesktopSettings::default()
        );
        assert_eq!(
            load_settings_from_path(&dir.path().join("missing.json"), |_| {}),
            DesktopSettings::default()
        );
    }

    #[test]
    fn resolve_settings_path_prefers_explicit_path() {
        let root = PathBuf::from("/opt/shell");
        assert_eq!(
            resolve_settings_path(Some(PathBuf::from("/etc/shell.json")), Some(&root), "production"),
            Some(PathBuf::from("/etc/shell.json"))
        );
        assert_eq!(
            resolve_settings_path(Some(PathBuf::new()), Some(&root), "production"),
            Some(PathBuf::from("/opt/shell/settings.production.json"))
        );
        assert_eq!(resolve_settings_path(None, None, "production"), None);
    }

    #[test]
    fn normalize_env_name_defaults_to_production() {
        assert_eq!(normalize_env_name(Some("Development")), "development");
        assert_eq!(normalize_env_name(Some(" dev ")), "development");
        assert_eq!(normalize_env_name(Some("staging")), "production");
        assert_eq!(normalize_env_name(None), "production");
    }

    #[test]
    fn parse_hex_color_accepts_short_and_long_forms() {
        assert_eq!(parse_hex_color("#111"), Some((0x11, 0x11, 0x11)));
        assert_eq!(parse_hex_color("#1a2b3c"), Some((0x1a, 0x2b, 0x3c)));
        assert_eq!(parse_hex_color("111111"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn window_title_combines_name_and_version() {
        let settings = DesktopSettings {
            app_name: "cnc".to_string(),
            app_version: "1.9.0".to_string(),
            ..DesktopSettings::default()
        };
        assert_eq!(settings.window_title(), "cnc 1.9.0");
    }
}
