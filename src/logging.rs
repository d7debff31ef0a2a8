use std::{
    env,
    ffi::OsString,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use crate::LOG_PATH_ENV;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopLogCategory {
    Startup,
    Runtime,
    Shutdown,
}

impl DesktopLogCategory {
    fn as_label(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Runtime => "runtime",
            Self::Shutdown => "shutdown",
        }
    }
}

pub fn rotate_log_if_needed(path: &Path, max_bytes: u64, backup_count: usize) {
    if max_bytes == 0 || backup_count == 0 {
        return;
    }

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                eprintln!(
                    "[log rotation] failed to read metadata for {}: {}",
                    path.display(),
                    error
                );
            }
            return;
        }
    };
    if metadata.len() < max_bytes {
        return;
    }

    let oldest = rotated_log_path(path, backup_count);
    if let Err(error) = fs::remove_file(&oldest) {
        if error.kind() != std::io::ErrorKind::NotFound {
            eprintln!(
                "[log rotation] failed to remove oldest backup {}: {}",
                oldest.display(),
                error
            );
        }
    }

    for index in (1..backup_count).rev() {
        let source = rotated_log_path(path, index);
        if !source.exists() {
            continue;
        }
        let target = rotated_log_path(path, index + 1);
        if let Err(error) = fs::rename(&source, &target) {
            eprintln!(
                "[log rotation] failed to rename {} to {}: {}",
                source.display(),
                target.display(),
                error
            );
        }
    }

    let rotated = rotated_log_path(path, 1);
    if let Err(error) = fs::rename(path, &rotated) {
        eprintln!(
            "[log rotation] failed to rotate {} to {}: {}",
            path.display(),
            rotated.display(),
            error
        );
    }
}

fn rotated_log_path(path: &Path, index: usize) -> PathBuf {
    let mut value = OsString::from(path.as_os_str());
    value.push(format!(".{index}"));
    PathBuf::from(value)
}

pub fn resolve_desktop_log_path(root_dir: Option<PathBuf>, desktop_log_file: &str) -> PathBuf {
    if let Ok(custom) = env::var(LOG_PATH_ENV) {
        let candidate = PathBuf::from(custom.trim());
        if !candidate.as_os_str().is_empty() {
            return candidate;
        }
    }

    if let Some(root) = root_dir {
        return root.join("logs").join(desktop_log_file);
    }

    env::temp_dir()
        .join("desktop-shell")
        .join("logs")
        .join(desktop_log_file)
}

pub fn format_log_line(category: DesktopLogCategory, message: &str) -> String {
    let timestamp = chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f %z")
        .to_string();
    format!("[{}] [{}] {}\n", timestamp, category.as_label(), message)
}

pub fn append_log_line(
    path: &Path,
    category: DesktopLogCategory,
    message: &str,
    max_bytes: u64,
    backup_count: usize,
    write_lock: &OnceLock<Mutex<()>>,
) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _guard = match write_lock.get_or_init(|| Mutex::new(())).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    rotate_log_if_needed(path, max_bytes, backup_count);
    let line = format_log_line(category, message);
    let _ = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(line.as_bytes()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_log_line_tags_category() {
        let line = format_log_line(DesktopLogCategory::Shutdown, "persisted window bounds");
        assert!(line.ends_with("[shutdown] persisted window bounds\n"));
        assert!(line.starts_with('['));
    }

    #[test]
    fn append_log_line_rotates_when_size_exceeded() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("logs").join("desktop.log");
        let lock = OnceLock::new();

        append_log_line(&path, DesktopLogCategory::Runtime, "first", 16, 2, &lock);
        append_log_line(&path, DesktopLogCategory::Runtime, "second", 16, 2, &lock);

        let rotated = rotated_log_path(&path, 1);
        let rotated_text = fs::read_to_string(&rotated).expect("read rotated log");
        let active_text = fs::read_to_string(&path).expect("read active log");
        assert!(rotated_text.contains("first"));
        assert!(active_text.contains("second"));
        assert!(!active_text.contains("first"));
    }

    #[test]
    fn rotate_log_if_needed_is_noop_when_disabled() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("desktop.log");
        fs::write(&path, "0123456789").expect("write log");

        rotate_log_if_needed(&path, 0, 3);
        rotate_log_if_needed(&path, 4, 0);

        assert!(path.exists());
        assert!(!rotated_log_path(&path, 1).exists());
    }
}
