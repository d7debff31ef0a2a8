use std::sync::{Mutex, OnceLock};

use crate::{
    logging, runtime_paths, DESKTOP_LOG_FILE, DESKTOP_LOG_MAX_BYTES, LOG_BACKUP_COUNT,
};

static DESKTOP_LOG_WRITE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub fn append_desktop_log(message: &str) {
    append_desktop_log_with_category(logging::DesktopLogCategory::Runtime, message);
}

pub fn append_startup_log(message: &str) {
    append_desktop_log_with_category(logging::DesktopLogCategory::Startup, message);
}

pub fn append_shutdown_log(message: &str) {
    append_desktop_log_with_category(logging::DesktopLogCategory::Shutdown, message);
}

pub fn append_desktop_log_with_category(category: logging::DesktopLogCategory, message: &str) {
    let path = logging::resolve_desktop_log_path(runtime_paths::default_root_dir(), DESKTOP_LOG_FILE);
    logging::append_log_line(
        &path,
        category,
        message,
        DESKTOP_LOG_MAX_BYTES,
        LOG_BACKUP_COUNT,
        &DESKTOP_LOG_WRITE_LOCK,
    );
}
