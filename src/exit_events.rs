use tauri::{AppHandle, Manager, RunEvent};

use crate::{
    append_shutdown_log,
    lifecycle::AllSurfacesClosedDecision,
    tauri_host::DesktopController,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitRequestedDecision {
    AllSurfacesClosed,
    ExplicitQuit,
}

fn decide_exit_requested_flow(code: Option<i32>) -> ExitRequestedDecision {
    // Tauri reports `None` when the request comes from the last window closing.
    if code.is_none() {
        ExitRequestedDecision::AllSurfacesClosed
    } else {
        ExitRequestedDecision::ExplicitQuit
    }
}

pub fn handle_run_event(app_handle: &AppHandle, event: RunEvent) {
    match event {
        RunEvent::ExitRequested { code, api, .. } => {
            let controller = app_handle.state::<DesktopController>();
            match decide_exit_requested_flow(code) {
                ExitRequestedDecision::AllSurfacesClosed => {
                    match controller.handle_all_surfaces_closed() {
                        AllSurfacesClosedDecision::QuitProcess => {}
                        AllSurfacesClosedDecision::StayResident => api.prevent_exit(),
                    }
                }
                ExitRequestedDecision::ExplicitQuit => {
                    append_shutdown_log("exit requested, running quit sequence");
                    controller.handle_quitting();
                }
            }
        }
        RunEvent::Exit => {
            let controller = app_handle.state::<DesktopController>();
            if controller.handle_quitting() {
                append_shutdown_log("exit event ran quit sequence");
            }
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            let controller = app_handle.state::<DesktopController>();
            let outcome = controller.handle_activate(&crate::tauri_host::TauriHost::new(app_handle));
            crate::append_desktop_log(&format!("activate handled: {outcome:?}"));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{decide_exit_requested_flow, ExitRequestedDecision};

    #[test]
    fn decide_exit_requested_flow_treats_missing_code_as_all_closed() {
        assert_eq!(
            decide_exit_requested_flow(None),
            ExitRequestedDecision::AllSurfacesClosed
        );
    }

    #[test]
    fn decide_exit_requested_flow_treats_exit_code_as_explicit_quit() {
        assert_eq!(
            decide_exit_requested_flow(Some(0)),
            ExitRequestedDecision::ExplicitQuit
        );
    }
}
