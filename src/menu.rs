//! Application menu.
//!
//! The menu is described by a static, serializable template. Custom entries
//! carry an identifier that [`MenuActions`] maps to a handler function; the
//! template never holds behavior itself.

use serde::Serialize;
use std::collections::HashMap;
use tauri::menu::{AboutMetadataBuilder, Menu, MenuBuilder, MenuItemBuilder, Submenu, SubmenuBuilder};
use tauri::{AppHandle, Manager, Wry};

use crate::profile::{ProfileId, PERSONAL_LABEL, WORK_LABEL};
use crate::windows;

pub const MENU_QUIT_ID: &str = "app.quit";
pub const MENU_PERSONAL_ID: &str = "profile.personal";
pub const MENU_WORK_ID: &str = "profile.work";
pub const MENU_SWITCH_ID: &str = "profile.switch";

/// Items whose behavior is provided by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredefinedItem {
    About,
    Separator,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Minimize,
    Fullscreen,
    CloseWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuEntry {
    Action {
        id: &'static str,
        label: &'static str,
        accelerator: Option<&'static str>,
    },
    Predefined {
        item: PredefinedItem,
    },
}

const fn action(id: &'static str, label: &'static str, accelerator: &'static str) -> MenuEntry {
    MenuEntry::Action {
        id,
        label,
        accelerator: Some(accelerator),
    }
}

const fn predefined(item: PredefinedItem) -> MenuEntry {
    MenuEntry::Predefined { item }
}

#[derive(Debug, Serialize)]
pub struct SubmenuSpec {
    pub label: &'static str,
    pub entries: &'static [MenuEntry],
}

pub const MENU_TEMPLATE: &[SubmenuSpec] = &[
    SubmenuSpec {
        label: "Dualboard",
        entries: &[
            predefined(PredefinedItem::About),
            predefined(PredefinedItem::Separator),
            action(MENU_QUIT_ID, "Quit", "CmdOrCtrl+Q"),
        ],
    },
    SubmenuSpec {
        label: "Edit",
        entries: &[
            predefined(PredefinedItem::Undo),
            predefined(PredefinedItem::Redo),
            predefined(PredefinedItem::Separator),
            predefined(PredefinedItem::Cut),
            predefined(PredefinedItem::Copy),
            predefined(PredefinedItem::Paste),
            predefined(PredefinedItem::SelectAll),
        ],
    },
    SubmenuSpec {
        label: "Profile",
        entries: &[
            action(MENU_PERSONAL_ID, PERSONAL_LABEL, "CmdOrCtrl+1"),
            action(MENU_WORK_ID, WORK_LABEL, "CmdOrCtrl+2"),
            predefined(PredefinedItem::Separator),
            action(MENU_SWITCH_ID, "Switch Profile", "CmdOrCtrl+Shift+S"),
        ],
    },
    SubmenuSpec {
        label: "Window",
        entries: &[
            predefined(PredefinedItem::Minimize),
            predefined(PredefinedItem::Fullscreen),
            predefined(PredefinedItem::Separator),
            predefined(PredefinedItem::CloseWindow),
        ],
    },
];

pub type MenuHandler = fn(&AppHandle);

/// Handler table for the custom entries of [`MENU_TEMPLATE`].
pub struct MenuActions {
    handlers: HashMap<&'static str, MenuHandler>,
}

impl Default for MenuActions {
    fn default() -> Self {
        let mut handlers: HashMap<&'static str, MenuHandler> = HashMap::new();
        handlers.insert(MENU_QUIT_ID, |app| windows::request_quit(app));
        handlers.insert(MENU_PERSONAL_ID, |app| {
            windows::switch_profile(app, Some(ProfileId::Primary))
        });
        handlers.insert(MENU_WORK_ID, |app| {
            windows::switch_profile(app, Some(ProfileId::Secondary))
        });
        handlers.insert(MENU_SWITCH_ID, |app| windows::switch_profile(app, None));
        Self { handlers }
    }
}

impl MenuActions {
    /// Run the handler for `id`. Returns false for ids without a handler
    /// (predefined items, tray entries).
    pub fn dispatch(&self, app: &AppHandle, id: &str) -> bool {
        match self.handlers.get(id) {
            Some(handler) => {
                log::debug!("Menu action: {}", id);
                handler(app);
                true
            }
            None => false,
        }
    }
}

pub fn handle_menu_event(app: &AppHandle, id: &str) {
    if let Some(actions) = app.try_state::<MenuActions>() {
        actions.dispatch(app, id);
    }
}

pub fn build_menu(app: &AppHandle, template: &[SubmenuSpec]) -> tauri::Result<Menu<Wry>> {
    let mut menu = MenuBuilder::new(app);
    for spec in template {
        let submenu = build_submenu(app, spec)?;
        menu = menu.item(&submenu);
    }
    menu.build()
}

fn build_submenu(app: &AppHandle, spec: &SubmenuSpec) -> tauri::Result<Submenu<Wry>> {
    let mut submenu = SubmenuBuilder::new(app, spec.label);
    for entry in spec.entries {
        submenu = match *entry {
            MenuEntry::Action {
                id,
                label,
                accelerator,
            } => {
                let mut item = MenuItemBuilder::with_id(id, label);
                if let Some(accelerator) = accelerator {
                    item = item.accelerator(accelerator);
                }
                submenu.item(&item.build(app)?)
            }
            MenuEntry::Predefined { item } => match item {
                PredefinedItem::About => {
                    let info = app.package_info();
                    let metadata = AboutMetadataBuilder::new()
                        .name(Some(info.name.clone()))
                        .version(Some(info.version.to_string()))
                        .build();
                    submenu.about(Some(metadata))
                }
                PredefinedItem::Separator => submenu.separator(),
                PredefinedItem::Undo => submenu.undo(),
                PredefinedItem::Redo => submenu.redo(),
                PredefinedItem::Cut => submenu.cut(),
                PredefinedItem::Copy => submenu.copy(),
                PredefinedItem::Paste => submenu.paste(),
                PredefinedItem::SelectAll => submenu.select_all(),
                PredefinedItem::Minimize => submenu.minimize(),
                PredefinedItem::Fullscreen => submenu.fullscreen(),
                PredefinedItem::CloseWindow => submenu.close_window(),
            },
        };
    }
    submenu.build()
}
