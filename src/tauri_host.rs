use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem, Submenu},
    AppHandle, WebviewUrl, WebviewWindow, WebviewWindowBuilder, Wry,
};
use url::Url;

use crate::{
    menu_builder::{MenuDescription, MenuEntry, PredefinedMenuEntry, SubmenuDescription},
    service::parse_service_url,
    window_geometry::WindowGeometry,
    window_manager::{EgressPolicy, Surface, SurfaceHost, SurfaceOptions},
    AppLifecycleController,
};

pub type DesktopController = AppLifecycleController<WebviewWindow>;

#[cfg(target_os = "windows")]
const WEBVIEW2_DIRECT_EGRESS_ARGS: &str =
    "--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection --no-proxy-server";

pub struct TauriHost<'a> {
    app_handle: &'a AppHandle,
}

impl<'a> TauriHost<'a> {
    pub fn new(app_handle: &'a AppHandle) -> Self {
        Self { app_handle }
    }

    fn build_submenu(&self, description: &SubmenuDescription) -> Result<Submenu<Wry>, String> {
        let submenu = Submenu::new(self.app_handle, &description.label, true)
            .map_err(|error| format!("Failed to create submenu {}: {error}", description.label))?;
        for entry in &description.entries {
            match entry {
                MenuEntry::Action {
                    id,
                    label,
                    accelerator,
                } => {
                    let item = MenuItem::with_id(
                        self.app_handle,
                        id.as_str(),
                        label,
                        true,
                        accelerator.as_deref(),
                    )
                    .map_err(|error| format!("Failed to create menu item {id}: {error}"))?;
                    submenu
                        .append(&item)
                        .map_err(|error| format!("Failed to append menu item {id}: {error}"))?;
                }
                MenuEntry::Predefined(predefined) => {
                    let item = self.predefined_item(*predefined)?;
                    submenu.append(&item).map_err(|error| {
                        format!("Failed to append predefined menu item {predefined:?}: {error}")
                    })?;
                }
                MenuEntry::Separator => {
                    let separator = PredefinedMenuItem::separator(self.app_handle)
                        .map_err(|error| format!("Failed to create menu separator: {error}"))?;
                    submenu
                        .append(&separator)
                        .map_err(|error| format!("Failed to append menu separator: {error}"))?;
                }
            }
        }
        Ok(submenu)
    }

    fn predefined_item(
        &self,
        predefined: PredefinedMenuEntry,
    ) -> Result<PredefinedMenuItem<Wry>, String> {
        let app = self.app_handle;
        let item = match predefined {
            PredefinedMenuEntry::About => PredefinedMenuItem::about(app, None, None),
            PredefinedMenuEntry::Hide => PredefinedMenuItem::hide(app, None),
            PredefinedMenuEntry::HideOthers => PredefinedMenuItem::hide_others(app, None),
            PredefinedMenuEntry::ShowAll => PredefinedMenuItem::show_all(app, None),
            PredefinedMenuEntry::Quit => PredefinedMenuItem::quit(app, None),
            PredefinedMenuEntry::Undo => PredefinedMenuItem::undo(app, None),
            PredefinedMenuEntry::Redo => PredefinedMenuItem::redo(app, None),
            PredefinedMenuEntry::Cut => PredefinedMenuItem::cut(app, None),
            PredefinedMenuEntry::Copy => PredefinedMenuItem::copy(app, None),
            PredefinedMenuEntry::Paste => PredefinedMenuItem::paste(app, None),
            PredefinedMenuEntry::SelectAll => PredefinedMenuItem::select_all(app, None),
            PredefinedMenuEntry::Minimize => PredefinedMenuItem::minimize(app, None),
            PredefinedMenuEntry::CloseWindow => PredefinedMenuItem::close_window(app, None),
        };
        item.map_err(|error| format!("Failed to create predefined menu item {predefined:?}: {error}"))
    }
}

impl SurfaceHost for TauriHost<'_> {
    type Surface = WebviewWindow;

    fn install_menu(&self, description: &MenuDescription) -> Result<(), String> {
        let menu = Menu::new(self.app_handle)
            .map_err(|error| format!("Failed to create application menu: {error}"))?;
        for submenu_description in &description.submenus {
            let submenu = self.build_submenu(submenu_description)?;
            menu.append(&submenu)
                .map_err(|error| format!("Failed to append submenu: {error}"))?;
        }
        self.app_handle
            .set_menu(menu)
            .map(|_| ())
            .map_err(|error| format!("Failed to install application menu: {error}"))
    }

    fn create_surface(&self, options: &SurfaceOptions) -> Result<WebviewWindow, String> {
        let blank = Url::parse("about:blank")
            .map_err(|error| format!("Failed to build placeholder URL: {error}"))?;
        let mut builder =
            WebviewWindowBuilder::new(self.app_handle, &options.label, WebviewUrl::External(blank))
                .title(&options.title)
                .inner_size(
                    f64::from(options.geometry.width),
                    f64::from(options.geometry.height),
                )
                .visible(options.visible);

        if let (Some(x), Some(y)) = (options.geometry.x, options.geometry.y) {
            builder = builder.position(f64::from(x), f64::from(y));
        }
        if let Some((red, green, blue)) = options.background_color {
            builder = builder.background_color(tauri::window::Color(red, green, blue, 255));
        }

        match options.egress {
            EgressPolicy::Direct => {
                #[cfg(target_os = "windows")]
                {
                    builder = builder.additional_browser_args(WEBVIEW2_DIRECT_EGRESS_ARGS);
                }
                // WKWebView and WebKitGTK do not pick up an application-level
                // proxy; loopback traffic already bypasses the system proxy.
            }
        }

        #[cfg(target_os = "macos")]
        {
            builder = builder
                .title_bar_style(tauri::TitleBarStyle::Overlay)
                .hidden_title(true);
        }

        builder
            .build()
            .map_err(|error| format!("Failed to create main window: {error}"))
    }
}

impl Surface for WebviewWindow {
    fn load_url(&self, url: &str) -> Result<(), String> {
        let parsed = parse_service_url(url)?;
        self.navigate(parsed)
            .map_err(|error| format!("Failed to navigate main window to {url}: {error}"))
    }

    fn show(&self) -> Result<(), String> {
        WebviewWindow::show(self).map_err(|error| format!("Failed to show main window: {error}"))?;
        self.set_focus()
            .map_err(|error| format!("Failed to focus main window: {error}"))
    }

    fn maximize(&self) -> Result<(), String> {
        WebviewWindow::maximize(self)
            .map_err(|error| format!("Failed to maximize main window: {error}"))
    }

    fn bounds(&self) -> Result<WindowGeometry, String> {
        let scale_factor = self
            .scale_factor()
            .map_err(|error| format!("Failed to read main window scale factor: {error}"))?;
        let position = self
            .outer_position()
            .map_err(|error| format!("Failed to read main window position: {error}"))?
            .to_logical::<i32>(scale_factor);
        let size = self
            .inner_size()
            .map_err(|error| format!("Failed to read main window size: {error}"))?
            .to_logical::<u32>(scale_factor);
        Ok(WindowGeometry::new(
            Some(position.x),
            Some(position.y),
            size.width,
            size.height,
        ))
    }

    fn reload(&self) -> Result<(), String> {
        WebviewWindow::reload(self)
            .map_err(|error| format!("Failed to reload main window: {error}"))
    }

    fn toggle_fullscreen(&self) -> Result<(), String> {
        let fullscreen = self
            .is_fullscreen()
            .map_err(|error| format!("Failed to read fullscreen state: {error}"))?;
        self.set_fullscreen(!fullscreen)
            .map_err(|error| format!("Failed to toggle fullscreen: {error}"))
    }

    fn close(&self) -> Result<(), String> {
        self.destroy()
            .map_err(|error| format!("Failed to destroy main window: {error}"))
    }
}
