//! Desktop shell that boots a local web service and presents it in a native
//! window.
//!
//! The lifecycle core is host-agnostic; the tauri adapter lives behind the
//! `desktop` feature.

mod app_constants;
mod app_helpers;
pub mod config_store;
pub mod data_storage;
pub mod lifecycle;
pub mod logging;
pub mod menu_builder;
pub mod runtime_paths;
pub mod service;
pub mod service_launch;
pub mod settings;
pub mod window_geometry;
pub mod window_manager;

#[cfg(feature = "desktop")]
pub mod app_runtime;
#[cfg(feature = "desktop")]
mod exit_events;
#[cfg(feature = "desktop")]
mod startup_task;
#[cfg(feature = "desktop")]
pub mod tauri_host;
#[cfg(feature = "desktop")]
mod ui_dispatch;

#[cfg(test)]
mod test_support;

pub use app_constants::*;
pub use app_helpers::{
    append_desktop_log, append_desktop_log_with_category, append_shutdown_log,
    append_startup_log,
};
pub use config_store::{ConfigStore, JsonFileConfigStore, MemoryConfigStore};
pub use data_storage::{DataStorage, SessionDataStorage};
pub use lifecycle::AppLifecycleController;
pub use service::{ServiceBootstrapper, ServiceHandle};
pub use service_launch::ConfiguredServiceBootstrapper;
pub use window_geometry::WindowGeometry;
