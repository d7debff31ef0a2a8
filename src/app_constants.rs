pub const MAIN_WINDOW_LABEL: &str = "main";
pub const WINDOW_BOUNDS_KEY: &str = "winBounds";
pub const DEFAULT_WINDOW_WIDTH: u32 = 1280;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 768;
pub const DEFAULT_BACKGROUND_COLOR: &str = "#111111";
pub const DEFAULT_APP_NAME: &str = "desktop-shell";

pub const DEFAULT_SERVICE_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVICE_PORT: u16 = 8009;
pub const DEFAULT_SERVICE_READY_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_SERVICE_READY_POLL_INTERVAL_MS: u64 = 200;
pub const SERVICE_READY_POLL_INTERVAL_MIN_MS: u64 = 50;
pub const SERVICE_READY_POLL_INTERVAL_MAX_MS: u64 = 5_000;
pub const SERVICE_PROBE_TIMEOUT_MS: u64 = 500;
pub const SERVICE_STOP_WAIT_MS: u64 = 1_500;

pub const ROOT_DIR_ENV: &str = "DESKTOP_SHELL_ROOT";
pub const SETTINGS_PATH_ENV: &str = "DESKTOP_SHELL_SETTINGS";
pub const SETTINGS_ENV_NAME_ENV: &str = "DESKTOP_SHELL_ENV";
pub const LOG_PATH_ENV: &str = "DESKTOP_SHELL_LOG_PATH";
pub const DEFAULT_ROOT_DIR_NAME: &str = ".desktop-shell";
pub const DESKTOP_STATE_FILE: &str = "desktop_state.json";
pub const SESSION_DATA_DIR: &str = "session";

pub const DESKTOP_LOG_FILE: &str = "desktop.log";
pub const DESKTOP_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const LOG_BACKUP_COUNT: usize = 5;
