use std::{env, path::Path, sync::Arc};

use tauri::{Manager, WindowEvent};

use crate::{
    append_desktop_log, append_startup_log, exit_events, logging, runtime_paths, settings,
    startup_task,
    tauri_host::DesktopController,
    AppLifecycleController, ConfigStore, ConfiguredServiceBootstrapper, DataStorage,
    JsonFileConfigStore, MemoryConfigStore, SessionDataStorage, DESKTOP_LOG_FILE,
    MAIN_WINDOW_LABEL, SESSION_DATA_DIR,
};

fn build_controller(
    settings: &settings::DesktopSettings,
    root_dir: Option<&Path>,
) -> DesktopController {
    let config: Arc<dyn ConfigStore> = match root_dir {
        Some(root) => Arc::new(JsonFileConfigStore::open(
            runtime_paths::desktop_state_path(root),
            append_desktop_log,
        )),
        None => {
            append_startup_log("root directory is unavailable; window geometry will not persist");
            Arc::new(MemoryConfigStore::default())
        }
    };
    let session_dir = root_dir
        .map(runtime_paths::session_data_dir)
        .unwrap_or_else(|| env::temp_dir().join("desktop-shell").join(SESSION_DATA_DIR));
    let storage: Arc<dyn DataStorage> = Arc::new(SessionDataStorage::new(session_dir));
    let bootstrapper = Arc::new(ConfiguredServiceBootstrapper::new(
        settings.service.clone(),
        append_startup_log,
    ));

    AppLifecycleController::new(storage, bootstrapper, config, settings)
}

pub fn run() {
    let root_dir = runtime_paths::default_root_dir();

    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        logging::resolve_desktop_log_path(root_dir.clone(), DESKTOP_LOG_FILE).display()
    ));
    let settings = settings::load_settings(root_dir.as_deref(), append_startup_log);
    let controller = build_controller(&settings, root_dir.as_deref());

    tauri::Builder::default()
        .manage(controller)
        .on_menu_event(|app_handle, event| {
            let controller = app_handle.state::<DesktopController>();
            controller.handle_menu_action(event.id().as_ref());
        })
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            if let WindowEvent::CloseRequested { .. } = event {
                let controller = window.app_handle().state::<DesktopController>();
                controller.handle_surface_closing();
            }
        })
        .setup(|app| {
            startup_task::spawn_startup_task(app.handle().clone(), append_startup_log);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(exit_events::handle_run_event);
}
