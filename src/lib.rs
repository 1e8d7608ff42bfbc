use tauri::{AppHandle, Manager};
use tauri_plugin_store::StoreExt;

mod downloads;
mod error;
mod external_links;
mod host;
mod injections;
mod lifecycle;
mod menu;
mod profile;
mod settings;
mod state;
mod store;
mod switcher;
#[cfg(not(target_os = "macos"))]
mod tray;
mod window_state;
mod windows;

#[cfg(test)]
mod tests;

use downloads::DownloadState;
use menu::MenuActions;
use profile::{default_profiles, validate_profiles};
use settings::{ensure_default_settings, ShellConfig};
use state::AppContext;
use store::STORE_FILE;
use window_state::restore_window_state;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_store::Builder::new().build())
        .plugin(tauri_plugin_dialog::init())
        .manage(DownloadState::default())
        .manage(MenuActions::default())
        .on_menu_event(|app, event| menu::handle_menu_event(app, event.id().as_ref()))
        .on_window_event(windows::handle_window_event)
        .setup(|app| {
            setup_shell(app.handle())?;
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| windows::handle_run_event(app_handle, &event));
}

/// Create both profile windows, the menu and (where needed) the tray.
fn setup_shell(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let store = app.store(STORE_FILE)?;

    // Seeding failures are not fatal; the runtime fallbacks still apply.
    if let Err(e) = ensure_default_settings(&*store) {
        log::warn!("Failed to save seeded default settings: {}", e);
    }

    let config = ShellConfig::from_store(&*store);
    let profiles = default_profiles();
    validate_profiles(&profiles)?;
    let geometry = restore_window_state(&*store);
    let data_root = app.path().app_local_data_dir()?;

    log::info!("Loading {} in two profiles", config.home_url);
    app.manage(AppContext::new(config, profiles));
    let ctx = app.state::<AppContext>();

    for spec in &ctx.profiles {
        windows::create_profile_window(app, spec, geometry, &ctx.config, &data_root)?;
    }
    windows::schedule_reveal_fallback(app);

    let app_menu = menu::build_menu(app, menu::MENU_TEMPLATE)?;
    app.set_menu(app_menu)?;

    #[cfg(not(target_os = "macos"))]
    tray::setup_tray(app)?;

    Ok(())
}
