//! Declarative application menu derived from the service handle.
//!
//! The description is plain data so it can be compared in tests; the host
//! adapter turns it into native menu items.

use crate::ServiceHandle;

pub const MENU_RELOAD: &str = "menu_reload";
pub const MENU_GO_HOME: &str = "menu_go_home";
pub const MENU_TOGGLE_FULLSCREEN: &str = "menu_toggle_fullscreen";
pub const MENU_ROUTE_PREFIX: &str = "menu_route:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredefinedMenuEntry {
    About,
    Hide,
    HideOthers,
    ShowAll,
    Quit,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Minimize,
    CloseWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Action {
        id: String,
        label: String,
        accelerator: Option<String>,
    },
    Predefined(PredefinedMenuEntry),
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmenuDescription {
    pub label: String,
    pub entries: Vec<MenuEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDescription {
    pub submenus: Vec<SubmenuDescription>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Reload,
    GoHome,
    ToggleFullscreen,
    OpenRoute(usize),
}

pub fn action_from_menu_id(menu_id: &str) -> Option<MenuAction> {
    match menu_id {
        MENU_RELOAD => Some(MenuAction::Reload),
        MENU_GO_HOME => Some(MenuAction::GoHome),
        MENU_TOGGLE_FULLSCREEN => Some(MenuAction::ToggleFullscreen),
        _ => menu_id
            .strip_prefix(MENU_ROUTE_PREFIX)
            .and_then(|index| index.parse::<usize>().ok())
            .map(MenuAction::OpenRoute),
    }
}

pub fn route_menu_id(index: usize) -> String {
    format!("{MENU_ROUTE_PREFIX}{index}")
}

/// `""` and `"/"` read as "Home"; otherwise the trimmed route.
pub fn route_label(route: &str) -> String {
    let trimmed = route.trim().trim_matches('/');
    if trimmed.is_empty() {
        "Home".to_string()
    } else {
        trimmed.to_string()
    }
}

fn action(id: &str, label: &str, accelerator: Option<&str>) -> MenuEntry {
    MenuEntry::Action {
        id: id.to_string(),
        label: label.to_string(),
        accelerator: accelerator.map(str::to_string),
    }
}

pub fn build_menu(handle: &ServiceHandle, app_name: &str) -> MenuDescription {
    let app_submenu = SubmenuDescription {
        label: app_name.to_string(),
        entries: vec![
            MenuEntry::Predefined(PredefinedMenuEntry::About),
            MenuEntry::Separator,
            MenuEntry::Predefined(PredefinedMenuEntry::Hide),
            MenuEntry::Predefined(PredefinedMenuEntry::HideOthers),
            MenuEntry::Predefined(PredefinedMenuEntry::ShowAll),
            MenuEntry::Separator,
            MenuEntry::Predefined(PredefinedMenuEntry::Quit),
        ],
    };

    let edit_submenu = SubmenuDescription {
        label: "Edit".to_string(),
        entries: vec![
            MenuEntry::Predefined(PredefinedMenuEntry::Undo),
            MenuEntry::Predefined(PredefinedMenuEntry::Redo),
            MenuEntry::Separator,
            MenuEntry::Predefined(PredefinedMenuEntry::Cut),
            MenuEntry::Predefined(PredefinedMenuEntry::Copy),
            MenuEntry::Predefined(PredefinedMenuEntry::Paste),
            MenuEntry::Predefined(PredefinedMenuEntry::SelectAll),
        ],
    };

    let view_submenu = SubmenuDescription {
        label: "View".to_string(),
        entries: vec![
            action(MENU_RELOAD, "Reload", Some("CmdOrCtrl+R")),
            action(MENU_GO_HOME, "Home", Some("CmdOrCtrl+Shift+H")),
            MenuEntry::Separator,
            action(MENU_TOGGLE_FULLSCREEN, "Toggle Full Screen", Some("F11")),
        ],
    };

    let navigate_submenu = SubmenuDescription {
        label: "Navigate".to_string(),
        entries: handle
            .routes()
            .iter()
            .enumerate()
            .map(|(index, route)| MenuEntry::Action {
                id: route_menu_id(index),
                label: route_label(route),
                accelerator: None,
            })
            .collect(),
    };

    let window_submenu = SubmenuDescription {
        label: "Window".to_string(),
        entries: vec![
            MenuEntry::Predefined(PredefinedMenuEntry::Minimize),
            MenuEntry::Predefined(PredefinedMenuEntry::CloseWindow),
        ],
    };

    MenuDescription {
        submenus: vec![
            app_submenu,
            edit_submenu,
            view_submenu,
            navigate_submenu,
            window_submenu,
        ],
    }
}
