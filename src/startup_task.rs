use tauri::{AppHandle, Manager};

use crate::{
    tauri_host::{DesktopController, TauriHost},
    ui_dispatch,
};

/// Runs storage init and service bootstrap on the blocking pool, then applies
/// the result on the main thread where windows and menus are created.
pub fn spawn_startup_task<F>(app_handle: AppHandle, log: F)
where
    F: Fn(&str) + Copy + Send + 'static,
{
    if !app_handle.state::<DesktopController>().begin_startup() {
        return;
    }

    tauri::async_runtime::spawn(async move {
        let startup_worker_handle = app_handle.clone();
        let startup_result = tauri::async_runtime::spawn_blocking(move || {
            startup_worker_handle
                .state::<DesktopController>()
                .run_bootstrap()
        })
        .await
        .map_err(|error| format!("Startup task failed: {error}"))
        .and_then(|result| result);

        if let Err(error) = ui_dispatch::run_on_main_thread_dispatch(
            &app_handle,
            "complete startup",
            move |main_app| {
                let controller = main_app.state::<DesktopController>();
                let outcome = controller.complete_startup(&TauriHost::new(main_app), startup_result);
                log(&format!("startup finished: {outcome:?}"));
            },
        ) {
            log(&format!("failed to dispatch startup completion: {error}"));
        }
    });
}
