use std::sync::Arc;

use crate::{
    menu_builder::MenuDescription,
    service::parse_service_url,
    settings::{parse_hex_color, DesktopSettings},
    window_geometry::{parse_persisted_geometry, resolve_window_geometry, WindowGeometry},
    ConfigStore, MAIN_WINDOW_LABEL, WINDOW_BOUNDS_KEY,
};

/// How a surface reaches the network. `Direct` ignores any ambient proxy so
/// the local service is always reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EgressPolicy {
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub label: String,
    pub title: String,
    pub geometry: WindowGeometry,
    pub visible: bool,
    pub egress: EgressPolicy,
    pub background_color: Option<(u8, u8, u8)>,
}

/// A native window presenting the service UI.
pub trait Surface: Send {
    fn load_url(&self, url: &str) -> Result<(), String>;
    fn show(&self) -> Result<(), String>;
    fn maximize(&self) -> Result<(), String>;
    fn bounds(&self) -> Result<WindowGeometry, String>;
    fn reload(&self) -> Result<(), String>;
    fn toggle_fullscreen(&self) -> Result<(), String>;
    /// Tears down the native window. Dropping a handle does not.
    fn close(&self) -> Result<(), String>;
}

/// Windowing host operations the lifecycle needs.
pub trait SurfaceHost {
    type Surface: Surface;

    /// Replaces the process-wide application menu.
    fn install_menu(&self, menu: &MenuDescription) -> Result<(), String>;

    /// Creates a surface honouring `options`, including visibility and
    /// egress policy. Must not navigate anywhere.
    fn create_surface(&self, options: &SurfaceOptions) -> Result<Self::Surface, String>;
}

pub struct WindowManager {
    config: Arc<dyn ConfigStore>,
    title: String,
    defaults: WindowGeometry,
    background_color: Option<(u8, u8, u8)>,
}

impl WindowManager {
    pub fn new(config: Arc<dyn ConfigStore>, settings: &DesktopSettings) -> Self {
        Self {
            config,
            title: settings.window_title(),
            defaults: WindowGeometry::default_size(
                settings.window.default_width,
                settings.window.default_height,
            ),
            background_color: parse_hex_color(&settings.window.background_color),
        }
    }

    pub fn persisted_geometry(&self) -> Option<WindowGeometry> {
        self.config
            .get(WINDOW_BOUNDS_KEY)
            .as_ref()
            .and_then(parse_persisted_geometry)
    }

    pub fn persist_geometry(&self, geometry: &WindowGeometry) -> Result<(), String> {
        self.config.set(WINDOW_BOUNDS_KEY, geometry.to_value()?)
    }

    pub fn surface_options(&self, geometry_override: Option<WindowGeometry>) -> SurfaceOptions {
        SurfaceOptions {
            label: MAIN_WINDOW_LABEL.to_string(),
            title: self.title.clone(),
            geometry: resolve_window_geometry(
                self.defaults,
                self.persisted_geometry(),
                geometry_override.filter(WindowGeometry::is_valid),
            ),
            visible: false,
            egress: EgressPolicy::Direct,
            background_color: self.background_color,
        }
    }

    /// Creates a hidden surface, loads `url`, and only then shows it. A
    /// surface that fails to load or show is closed before returning.
    pub fn open<H: SurfaceHost>(
        &self,
        host: &H,
        url: &str,
        geometry_override: Option<WindowGeometry>,
    ) -> Result<H::Surface, String> {
        parse_service_url(url)?;
        let options = self.surface_options(geometry_override);
        let surface = host.create_surface(&options)?;
        if let Err(error) = surface.load_url(url).and_then(|()| surface.show()) {
            return Err(match surface.close() {
                Ok(()) => error,
                Err(close_error) => {
                    format!("{error} (closing the unused window also failed: {close_error})")
                }
            });
        }
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_support::{HostEvent, RecordingHost},
        MemoryConfigStore,
    };
    use serde_json::json;

    fn manager_with(config: Arc<dyn ConfigStore>) -> WindowManager {
        WindowManager::new(config, &DesktopSettings::default())
    }

    #[test]
    fn open_shows_surface_only_after_url_load() {
        let host = RecordingHost::default();
        let manager = manager_with(Arc::new(MemoryConfigStore::default()));

        manager
            .open(&host, "http://127.0.0.1:8009", None)
            .expect("open surface");

        let events = host.events();
        let create = events
            .iter()
            .position(|event| matches!(event, HostEvent::Created(options) if !options.visible))
            .expect("hidden create event");
        let load = events
            .iter()
            .position(|event| matches!(event, HostEvent::Loaded(_, url) if url == "http://127.0.0.1:8009"))
            .expect("load event");
        let show = events
            .iter()
            .position(|event| matches!(event, HostEvent::Shown(_)))
            .expect("show event");
        assert!(create < load && load < show, "events: {events:?}");
    }

    #[test]
    fn open_uses_direct_egress_policy() {
        let host = RecordingHost::default();
        let manager = manager_with(Arc::new(MemoryConfigStore::default()));
        manager
            .open(&host, "http://127.0.0.1:8009", None)
            .expect("open surface");

        let options = host.created_options();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].egress, EgressPolicy::Direct);
        assert_eq!(options[0].label, MAIN_WINDOW_LABEL);
        assert_eq!(options[0].background_color, Some((0x11, 0x11, 0x11)));
    }

    #[test]
    fn open_uses_persisted_geometry() {
        let config = Arc::new(MemoryConfigStore::default());
        config
            .set(WINDOW_BOUNDS_KEY, json!({ "width": 1024, "height": 600 }))
            .expect("seed bounds");
        let host = RecordingHost::default();

        manager_with(config)
            .open(&host, "http://127.0.0.1:8009", None)
            .expect("open surface");

        assert_eq!(
            host.created_options()[0].geometry,
            WindowGeometry::new(None, None, 1024, 600)
        );
    }

    #[test]
    fn open_uses_defaults_without_persisted_geometry() {
        let host = RecordingHost::default();
        manager_with(Arc::new(MemoryConfigStore::default()))
            .open(&host, "http://127.0.0.1:8009", None)
            .expect("open surface");

        assert_eq!(
            host.created_options()[0].geometry,
            WindowGeometry::new(None, None, 1280, 768)
        );
    }

    #[test]
    fn open_falls_back_to_defaults_for_malformed_geometry() {
        let config = Arc::new(MemoryConfigStore::default());
        config
            .set(WINDOW_BOUNDS_KEY, json!({ "width": -1024, "height": 600 }))
            .expect("seed bounds");
        let host = RecordingHost::default();

        manager_with(config)
            .open(&host, "http://127.0.0.1:8009", None)
            .expect("open surface");

        assert_eq!(
            host.created_options()[0].geometry,
            WindowGeometry::new(None, None, 1280, 768)
        );
    }

    #[test]
    fn open_prefers_valid_override_over_persisted_geometry() {
        let config = Arc::new(MemoryConfigStore::default());
        config
            .set(WINDOW_BOUNDS_KEY, json!({ "width": 1024, "height": 600 }))
            .expect("seed bounds");
        let manager = manager_with(config);

        let explicit = WindowGeometry::new(Some(5), Some(5), 640, 480);
        assert_eq!(manager.surface_options(Some(explicit)).geometry, explicit);

        let invalid = WindowGeometry::new(None, None, 0, 480);
        assert_eq!(
            manager.surface_options(Some(invalid)).geometry,
            WindowGeometry::new(None, None, 1024, 600)
        );
    }

    #[test]
    fn open_propagates_load_failure_without_showing() {
        let host = RecordingHost::failing_load();
        let result = manager_with(Arc::new(MemoryConfigStore::default())).open(
            &host,
            "http://127.0.0.1:8009",
            None,
        );

        assert!(result.is_err());
        assert!(!host
            .events()
            .iter()
            .any(|event| matches!(event, HostEvent::Shown(_))));
    }

    #[test]
    fn open_closes_surface_that_failed_to_load() {
        let host = RecordingHost::failing_load();
        let result = manager_with(Arc::new(MemoryConfigStore::default())).open(
            &host,
            "http://127.0.0.1:8009",
            None,
        );

        assert!(result.is_err());
        let events = host.events();
        let created = events
            .iter()
            .position(|event| matches!(event, HostEvent::Created(_)))
            .expect("create event");
        let closed = events
            .iter()
            .position(|event| matches!(event, HostEvent::Closed(0)))
            .expect("close event");
        assert!(created < closed, "events: {events:?}");
        assert_eq!(host.live_surfaces(), 0);
    }

    #[test]
    fn open_rejects_non_http_url_before_creating_surface() {
        let host = RecordingHost::default();
        let result =
            manager_with(Arc::new(MemoryConfigStore::default())).open(&host, "file:///tmp", None);

        assert!(result.is_err());
        assert!(host.events().is_empty());
    }

    #[test]
    fn persist_geometry_writes_bounds_key() {
        let config = Arc::new(MemoryConfigStore::default());
        let manager = manager_with(config.clone());
        manager
            .persist_geometry(&WindowGeometry::new(Some(10), Some(20), 900, 700))
            .expect("persist");

        assert_eq!(
            config.get(WINDOW_BOUNDS_KEY),
            Some(json!({ "x": 10, "y": 20, "width": 900, "height": 700 }))
        );
    }
}
