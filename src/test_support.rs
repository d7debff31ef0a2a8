use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use crate::{
    menu_builder::MenuDescription,
    window_geometry::WindowGeometry,
    window_manager::{Surface, SurfaceHost, SurfaceOptions},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    MenuInstalled(MenuDescription),
    Created(SurfaceOptions),
    Loaded(usize, String),
    Shown(usize),
    Maximized(usize),
    Reloaded(usize),
    FullscreenToggled(usize),
    Closed(usize),
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Arc<Mutex<Vec<HostEvent>>>,
    bounds: Arc<Mutex<Option<WindowGeometry>>>,
    next_id: AtomicUsize,
    fail_create: bool,
    fail_load: bool,
}

impl RecordingHost {
    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().expect("lock events").clone()
    }

    pub fn created_options(&self) -> Vec<SurfaceOptions> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Created(options) => Some(options),
                _ => None,
            })
            .collect()
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Loaded(_, url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Surfaces created and not yet closed.
    pub fn live_surfaces(&self) -> usize {
        let events = self.events();
        let created = events
            .iter()
            .filter(|event| matches!(event, HostEvent::Created(_)))
            .count();
        let closed = events
            .iter()
            .filter(|event| matches!(event, HostEvent::Closed(_)))
            .count();
        created - closed
    }

    /// Bounds reported by every surface of this host; `None` makes
    /// `bounds()` fail.
    pub fn set_bounds(&self, bounds: Option<WindowGeometry>) {
        *self.bounds.lock().expect("lock bounds") = bounds;
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().expect("lock events").push(event);
    }
}

impl SurfaceHost for RecordingHost {
    type Surface = FakeSurface;

    fn install_menu(&self, menu: &MenuDescription) -> Result<(), String> {
        self.record(HostEvent::MenuInstalled(menu.clone()));
        Ok(())
    }

    fn create_surface(&self, options: &SurfaceOptions) -> Result<FakeSurface, String> {
        if self.fail_create {
            return Err("window creation refused".to_string());
        }
        self.record(HostEvent::Created(options.clone()));
        let mut bounds = self.bounds.lock().expect("lock bounds");
        if bounds.is_none() {
            *bounds = Some(options.geometry);
        }
        Ok(FakeSurface {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            events: self.events.clone(),
            bounds: self.bounds.clone(),
            fail_load: self.fail_load,
        })
    }
}

#[derive(Debug)]
pub struct FakeSurface {
    pub id: usize,
    events: Arc<Mutex<Vec<HostEvent>>>,
    bounds: Arc<Mutex<Option<WindowGeometry>>>,
    fail_load: bool,
}

impl FakeSurface {
    fn record(&self, event: HostEvent) {
        self.events.lock().expect("lock events").push(event);
    }
}

impl Surface for FakeSurface {
    fn load_url(&self, url: &str) -> Result<(), String> {
        if self.fail_load {
            return Err(format!("failed to load {url}"));
        }
        self.record(HostEvent::Loaded(self.id, url.to_string()));
        Ok(())
    }

    fn show(&self) -> Result<(), String> {
        self.record(HostEvent::Shown(self.id));
        Ok(())
    }

    fn maximize(&self) -> Result<(), String> {
        self.record(HostEvent::Maximized(self.id));
        Ok(())
    }

    fn bounds(&self) -> Result<WindowGeometry, String> {
        self.bounds
            .lock()
            .expect("lock bounds")
            .ok_or_else(|| "surface already destroyed".to_string())
    }

    fn reload(&self) -> Result<(), String> {
        self.record(HostEvent::Reloaded(self.id));
        Ok(())
    }

    fn toggle_fullscreen(&self) -> Result<(), String> {
        self.record(HostEvent::FullscreenToggled(self.id));
        Ok(())
    }

    fn close(&self) -> Result<(), String> {
        self.record(HostEvent::Closed(self.id));
        Ok(())
    }
}
