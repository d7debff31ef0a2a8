//! Application lifecycle state machine.
//!
//! The host adapter forwards its lifecycle signals here; every ordering and
//! branching decision lives in this module so it can run without a real
//! windowing host.
//!
//! ```text
//! Idle --ready--> Bootstrapping --ok--> Ready <--activate-- NoWindow
//!                                         \--all closed-->/
//! (any) --quitting--> Quitting
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    app_helpers::append_desktop_log_with_category,
    logging::DesktopLogCategory,
    menu_builder::{self, MenuAction},
    settings::DesktopSettings,
    window_geometry::WindowGeometry,
    window_manager::{Surface, SurfaceHost, WindowManager},
    ConfigStore, DataStorage, ServiceBootstrapper, ServiceHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    #[default]
    Idle,
    Bootstrapping,
    Ready,
    NoWindow,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateOutcome {
    AlreadyOpen,
    Reopened,
    Ignored,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllSurfacesClosedDecision {
    QuitProcess,
    StayResident,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    WindowOpened,
    WindowFailed,
    BootstrapFailed,
    Abandoned,
}

struct ControllerState<S> {
    phase: LifecyclePhase,
    current: Option<S>,
    last_url: Option<String>,
    last_bounds: Option<WindowGeometry>,
    service: Option<ServiceHandle>,
}

impl<S> Default for ControllerState<S> {
    fn default() -> Self {
        Self {
            phase: LifecyclePhase::Idle,
            current: None,
            last_url: None,
            last_bounds: None,
            service: None,
        }
    }
}

pub struct AppLifecycleController<S: Surface> {
    storage: Arc<dyn DataStorage>,
    bootstrapper: Arc<dyn ServiceBootstrapper>,
    windows: WindowManager,
    app_name: String,
    quit_on_all_windows_closed: bool,
    state: Mutex<ControllerState<S>>,
    log: fn(DesktopLogCategory, &str),
}

impl<S: Surface> AppLifecycleController<S> {
    pub fn new(
        storage: Arc<dyn DataStorage>,
        bootstrapper: Arc<dyn ServiceBootstrapper>,
        config: Arc<dyn ConfigStore>,
        settings: &DesktopSettings,
    ) -> Self {
        Self {
            storage,
            bootstrapper,
            windows: WindowManager::new(config, settings),
            app_name: settings.app_name.clone(),
            quit_on_all_windows_closed: settings.quit_on_all_windows_closed,
            state: Mutex::new(ControllerState::default()),
            log: append_desktop_log_with_category,
        }
    }

    pub fn with_logger(mut self, log: fn(DesktopLogCategory, &str)) -> Self {
        self.log = log;
        self
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState<S>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(error) => {
                (self.log)(
                    DesktopLogCategory::Runtime,
                    &format!("lifecycle state lock poisoned: {error}"),
                );
                error.into_inner()
            }
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.lock_state().phase
    }

    pub fn has_surface(&self) -> bool {
        self.lock_state().current.is_some()
    }

    pub fn last_url(&self) -> Option<String> {
        self.lock_state().last_url.clone()
    }

    pub fn service_handle(&self) -> Option<ServiceHandle> {
        self.lock_state().service.clone()
    }

    /// Single-flight guard: only the first call moves `Idle` to
    /// `Bootstrapping` and returns `true`.
    pub fn begin_startup(&self) -> bool {
        let mut state = self.lock_state();
        if state.phase != LifecyclePhase::Idle {
            (self.log)(
                DesktopLogCategory::Startup,
                &format!("ready signal ignored in phase {:?}", state.phase),
            );
            return false;
        }
        state.phase = LifecyclePhase::Bootstrapping;
        true
    }

    /// Initializes storage, then starts the service. Blocking; does not touch
    /// the controller state so it can run off the UI thread.
    pub fn run_bootstrap(&self) -> Result<ServiceHandle, String> {
        (self.log)(DesktopLogCategory::Startup, "initializing data storage");
        self.storage
            .init()
            .map_err(|error| format!("Data storage init failed: {error}"))?;

        (self.log)(DesktopLogCategory::Startup, "bootstrapping embedded service");
        let handle = self
            .bootstrapper
            .bootstrap()
            .map_err(|error| format!("Service bootstrap failed: {error}"))?;
        (self.log)(
            DesktopLogCategory::Startup,
            &format!(
                "service ready at {} with {} route(s)",
                handle.base_url(),
                handle.routes().len()
            ),
        );
        Ok(handle)
    }

    /// Applies the bootstrap result: menu first, then the window.
    pub fn complete_startup<H>(
        &self,
        host: &H,
        result: Result<ServiceHandle, String>,
    ) -> StartupOutcome
    where
        H: SurfaceHost<Surface = S>,
    {
        let handle = match result {
            Ok(handle) => handle,
            Err(error) => {
                (self.log)(
                    DesktopLogCategory::Startup,
                    &format!("startup failed, staying windowless: {error}"),
                );
                return StartupOutcome::BootstrapFailed;
            }
        };

        let mut state = self.lock_state();
        if state.phase != LifecyclePhase::Bootstrapping {
            (self.log)(
                DesktopLogCategory::Startup,
                &format!(
                    "bootstrap finished in phase {:?}, not opening a window",
                    state.phase
                ),
            );
            return StartupOutcome::Abandoned;
        }

        let menu = menu_builder::build_menu(&handle, &self.app_name);
        if let Err(error) = host.install_menu(&menu) {
            (self.log)(
                DesktopLogCategory::Startup,
                &format!("failed to install application menu: {error}"),
            );
        }

        let url = handle.base_url();
        state.service = Some(handle);
        state.last_url = Some(url.clone());

        match self.windows.open(host, &url, None) {
            Ok(surface) => {
                if let Err(error) = surface.maximize() {
                    (self.log)(
                        DesktopLogCategory::Startup,
                        &format!("failed to maximize main window: {error}"),
                    );
                }
                state.current = Some(surface);
                state.phase = LifecyclePhase::Ready;
                (self.log)(
                    DesktopLogCategory::Startup,
                    &format!("main window opened at {url}"),
                );
                StartupOutcome::WindowOpened
            }
            Err(error) => {
                state.phase = LifecyclePhase::NoWindow;
                (self.log)(
                    DesktopLogCategory::Startup,
                    &format!("failed to open main window at {url}: {error}"),
                );
                StartupOutcome::WindowFailed
            }
        }
    }

    /// Synchronous `ready` handling for hosts that can block their event
    /// loop. Returns `None` when startup already ran.
    pub fn handle_ready<H>(&self, host: &H) -> Option<StartupOutcome>
    where
        H: SurfaceHost<Surface = S>,
    {
        if !self.begin_startup() {
            return None;
        }
        let result = self.run_bootstrap();
        Some(self.complete_startup(host, result))
    }

    pub fn handle_activate<H>(&self, host: &H) -> ActivateOutcome
    where
        H: SurfaceHost<Surface = S>,
    {
        let mut state = self.lock_state();
        let phase = state.phase;
        match phase {
            LifecyclePhase::Ready if state.current.is_some() => ActivateOutcome::AlreadyOpen,
            LifecyclePhase::Ready | LifecyclePhase::NoWindow => {
                let Some(url) = state.last_url.clone() else {
                    return ActivateOutcome::Ignored;
                };
                match self.windows.open(host, &url, None) {
                    Ok(surface) => {
                        state.current = Some(surface);
                        state.phase = LifecyclePhase::Ready;
                        (self.log)(
                            DesktopLogCategory::Runtime,
                            &format!("main window reopened at {url}"),
                        );
                        ActivateOutcome::Reopened
                    }
                    Err(error) => {
                        (self.log)(
                            DesktopLogCategory::Runtime,
                            &format!("failed to reopen main window at {url}: {error}"),
                        );
                        ActivateOutcome::Failed
                    }
                }
            }
            _ => {
                (self.log)(
                    DesktopLogCategory::Runtime,
                    &format!("activate ignored in phase {phase:?}"),
                );
                ActivateOutcome::Ignored
            }
        }
    }

    /// Snapshots the bounds of the surface about to be torn down; the quit
    /// path falls back to them once the surface is gone.
    pub fn handle_surface_closing(&self) {
        let mut state = self.lock_state();
        let Some(bounds) = state.current.as_ref().map(|surface| surface.bounds()) else {
            return;
        };
        match bounds {
            Ok(bounds) => state.last_bounds = Some(bounds),
            Err(error) => (self.log)(
                DesktopLogCategory::Runtime,
                &format!("failed to read main window bounds on close: {error}"),
            ),
        }
    }

    pub fn handle_all_surfaces_closed(&self) -> AllSurfacesClosedDecision {
        let mut state = self.lock_state();
        if let Some(surface) = state.current.take() {
            if let Ok(bounds) = surface.bounds() {
                state.last_bounds = Some(bounds);
            }
        }
        if state.phase == LifecyclePhase::Ready {
            state.phase = LifecyclePhase::NoWindow;
        }

        if self.quit_on_all_windows_closed || state.phase == LifecyclePhase::Quitting {
            (self.log)(
                DesktopLogCategory::Shutdown,
                "all windows closed, quitting desktop process",
            );
            AllSurfacesClosedDecision::QuitProcess
        } else {
            (self.log)(
                DesktopLogCategory::Runtime,
                "all windows closed, staying resident",
            );
            AllSurfacesClosedDecision::StayResident
        }
    }

    /// Terminal quit handling. Runs once; every step is attempted even when an
    /// earlier one fails. Returns `false` when quitting was already handled.
    pub fn handle_quitting(&self) -> bool {
        let mut state = self.lock_state();
        if state.phase == LifecyclePhase::Quitting {
            (self.log)(
                DesktopLogCategory::Shutdown,
                "quit already handled, skipping duplicate signal",
            );
            return false;
        }
        state.phase = LifecyclePhase::Quitting;

        if let Err(error) = self.storage.clear() {
            (self.log)(
                DesktopLogCategory::Shutdown,
                &format!("data storage clear failed: {error}"),
            );
        }

        let live_bounds = match state.current.as_ref().map(|surface| surface.bounds()) {
            Some(Ok(bounds)) => Some(bounds),
            Some(Err(error)) => {
                (self.log)(
                    DesktopLogCategory::Shutdown,
                    &format!("failed to read main window bounds: {error}"),
                );
                None
            }
            None => None,
        };
        match live_bounds.or(state.last_bounds) {
            Some(bounds) => match self.windows.persist_geometry(&bounds) {
                Ok(()) => (self.log)(
                    DesktopLogCategory::Shutdown,
                    &format!(
                        "persisted window bounds {}x{}",
                        bounds.width, bounds.height
                    ),
                ),
                Err(error) => (self.log)(
                    DesktopLogCategory::Shutdown,
                    &format!("failed to persist window bounds: {error}"),
                ),
            },
            None => (self.log)(
                DesktopLogCategory::Shutdown,
                "no window bounds available, keeping persisted geometry",
            ),
        }

        state.current = None;
        drop(state);

        if let Err(error) = self.bootstrapper.shutdown() {
            (self.log)(
                DesktopLogCategory::Shutdown,
                &format!("embedded service shutdown failed: {error}"),
            );
        }
        true
    }

    pub fn handle_menu_action(&self, menu_id: &str) -> bool {
        let Some(action) = menu_builder::action_from_menu_id(menu_id) else {
            return false;
        };

        let state = self.lock_state();
        let Some(surface) = state.current.as_ref() else {
            (self.log)(
                DesktopLogCategory::Runtime,
                &format!("menu action {menu_id} skipped: main window not open"),
            );
            return false;
        };

        let result = match action {
            MenuAction::Reload => surface.reload(),
            MenuAction::ToggleFullscreen => surface.toggle_fullscreen(),
            MenuAction::GoHome => match state.service.as_ref() {
                Some(service) => surface.load_url(&service.base_url()),
                None => Err("service is not running".to_string()),
            },
            MenuAction::OpenRoute(index) => {
                match state
                    .service
                    .as_ref()
                    .and_then(|service| Some(service.route_url(service.routes().get(index)?)))
                {
                    Some(url) => surface.load_url(&url),
                    None => Err(format!("unknown route index {index}")),
                }
            }
        };

        match result {
            Ok(()) => true,
            Err(error) => {
                (self.log)(
                    DesktopLogCategory::Runtime,
                    &format!("menu action {menu_id} failed: {error}"),
                );
                false
            }
        }
    }
}
