//! Profile window creation and the event handlers wired to them.

use std::path::Path;
use std::time::Duration;

use tauri::webview::PageLoadEvent;
use tauri::{
    AppHandle, Manager, RunEvent, Runtime, WebviewUrl, WebviewWindow, WebviewWindowBuilder,
    Window, WindowEvent,
};
use tauri_plugin_store::StoreExt;

use crate::downloads;
use crate::error::ShellError;
use crate::external_links;
use crate::host::ProfilePair;
use crate::injections;
use crate::lifecycle::{self, CloseAction, PersistOutcome, VetoAction};
use crate::profile::{ProfileId, ProfileSpec};
use crate::settings::ShellConfig;
use crate::state::{AppContext, LifecyclePhase};
use crate::store::STORE_FILE;
use crate::switcher::{self, SwitchOutcome};
use crate::window_state::{InitialGeometry, MIN_HEIGHT, MIN_WIDTH};

/// Reveal the primary window even if its page never reports a finished load.
const REVEAL_FALLBACK: Duration = Duration::from_secs(8);

/// Build a hidden window for `spec` at `geometry`, loading the home page in
/// the profile's own storage partition.
pub fn create_profile_window<R: Runtime>(
    app: &AppHandle<R>,
    spec: &ProfileSpec,
    geometry: InitialGeometry,
    config: &ShellConfig,
    data_root: &Path,
) -> Result<WebviewWindow<R>, ShellError> {
    let id = spec.id;
    let data_dir = spec.data_directory(data_root);
    std::fs::create_dir_all(&data_dir)?;

    let title = format!("{} - {}", app.package_info().name, spec.display_name);
    let opener = app.clone();

    let mut builder = WebviewWindowBuilder::new(
        app,
        id.window_label(),
        WebviewUrl::External(config.home_url.clone()),
    )
    .title(title)
    .visible(false)
    .min_inner_size(MIN_WIDTH, MIN_HEIGHT)
    .data_directory(data_dir.clone())
    .on_page_load(move |window, payload| {
        if payload.event() == PageLoadEvent::Finished {
            if let Err(e) = injections::inject_stylesheet(&window) {
                log::warn!("Failed to inject stylesheet into {:?}: {}", id, e);
            }
            reveal_on_first_load(&window, id);
        }
    })
    .on_new_window(move |url, features| {
        external_links::handle_new_window(&opener, url, features)
    });

    builder = match geometry {
        InitialGeometry::Restored(frame) => builder
            .inner_size(frame.width, frame.height)
            .position(frame.x, frame.y),
        InitialGeometry::Centered { width, height } => {
            builder.inner_size(width, height).center()
        }
    };

    if id == ProfileId::Primary {
        builder = builder.on_download(downloads::handle_download::<R>);
    }

    #[cfg(target_os = "macos")]
    {
        builder = builder
            .title_bar_style(tauri::TitleBarStyle::Overlay)
            .hidden_title(true)
            .data_store_identifier(spec.data_store_identifier());
    }

    let window = builder.build()?;
    log::info!(
        "Created {:?} window ({}) with data in {}",
        id,
        spec.display_name,
        data_dir.display()
    );
    Ok(window)
}

fn reveal_on_first_load<R: Runtime>(window: &WebviewWindow<R>, id: ProfileId) {
    let Some(ctx) = window.try_state::<AppContext>() else {
        return;
    };
    if !ctx.with_state(|state| state.take_initial_reveal(id)) {
        return;
    }
    if let Err(e) = window.show().and_then(|_| window.set_focus()) {
        log::warn!("Failed to show {:?} window: {}", id, e);
    }
}

pub fn schedule_reveal_fallback<R: Runtime>(app: &AppHandle<R>) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(REVEAL_FALLBACK).await;
        let handle = app.clone();
        let posted = app.run_on_main_thread(move || {
            if let Some(window) = handle.get_webview_window(ProfileId::Primary.window_label()) {
                reveal_on_first_load(&window, ProfileId::Primary);
            }
        });
        if let Err(e) = posted {
            log::warn!("Failed to schedule window reveal: {}", e);
        }
    });
}

/// Window-level events for both profile windows.
pub fn handle_window_event<R: Runtime>(window: &Window<R>, event: &WindowEvent) {
    let Some(id) = ProfileId::from_window_label(window.label()) else {
        return;
    };
    let app = window.app_handle();
    let Some(ctx) = app.try_state::<AppContext>() else {
        return;
    };

    match event {
        WindowEvent::CloseRequested { api, .. } => match close_requested(app, &ctx) {
            Ok(CloseAction::Proceed(outcome)) => {
                log::info!("Closing {:?} window ({:?})", id, outcome);
            }
            Ok(CloseAction::Veto(action)) => {
                api.prevent_close();
                if action == VetoAction::HideApplication {
                    hide_application(app);
                }
            }
            Err(e) => {
                log::error!("Close handling failed for {:?} window: {}", id, e);
                if ctx.phase() == LifecyclePhase::Running {
                    api.prevent_close();
                }
            }
        },
        WindowEvent::Destroyed => {
            ctx.with_state(|state| lifecycle::mark_destroyed(state, id));
        }
        _ => {}
    }
}

fn close_requested<R: Runtime>(
    app: &AppHandle<R>,
    ctx: &AppContext,
) -> Result<CloseAction, ShellError> {
    let windows = ProfilePair::from_app(app)?;
    let store = app.store(STORE_FILE)?;
    ctx.with_state(|state| {
        lifecycle::handle_close_request(
            &windows,
            state,
            &*store,
            VetoAction::for_current_platform(),
        )
    })
}

#[cfg(target_os = "macos")]
fn hide_application<R: Runtime>(app: &AppHandle<R>) {
    if let Err(e) = app.hide() {
        log::warn!("Failed to hide application: {}", e);
    }
}

#[cfg(not(target_os = "macos"))]
fn hide_application<R: Runtime>(_app: &AppHandle<R>) {}

/// Application-level events from the run loop.
pub fn handle_run_event<R: Runtime>(app: &AppHandle<R>, event: &RunEvent) {
    match event {
        RunEvent::ExitRequested { code, .. } => {
            let Some(ctx) = app.try_state::<AppContext>() else {
                return;
            };
            if ctx.phase() == LifecyclePhase::Running {
                log::info!("Exit requested by the system (code {:?})", code);
                if let Err(e) = begin_quit(app) {
                    log::warn!("Failed to save window state: {}", e);
                }
            }
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => restore_active_profile(app),
        _ => {}
    }
}

fn begin_quit<R: Runtime>(app: &AppHandle<R>) -> Result<PersistOutcome, ShellError> {
    let ctx = app.state::<AppContext>();
    // Enter Quitting even if saving geometry fails below.
    if ctx.with_state(|state| state.begin_quit()) {
        log::info!("Entering quit sequence");
    }
    let windows = ProfilePair::from_app(app)?;
    let store = app.store(STORE_FILE)?;
    ctx.with_state(|state| lifecycle::begin_quit(&windows, state, &*store))
}

/// Start the quit sequence and exit the process.
pub fn request_quit<R: Runtime>(app: &AppHandle<R>) {
    match begin_quit(app) {
        Ok(outcome) => log::info!("Quitting ({:?})", outcome),
        Err(e) => log::warn!("Failed to save window state: {}", e),
    }
    app.exit(0);
}

/// Switch to `target`, or to the other profile when `None`.
pub fn switch_profile<R: Runtime>(app: &AppHandle<R>, target: Option<ProfileId>) {
    match try_switch_profile(app, target) {
        Ok(SwitchOutcome::AlreadyActive) => log::debug!("Profile already active"),
        Ok(SwitchOutcome::Switched { .. }) => {}
        Err(e) => log::error!("Failed to switch profile: {}", e),
    }
}

fn try_switch_profile<R: Runtime>(
    app: &AppHandle<R>,
    target: Option<ProfileId>,
) -> Result<SwitchOutcome, ShellError> {
    let windows = ProfilePair::from_app(app)?;
    let ctx = app.state::<AppContext>();
    let match_geometry = ctx.config.match_geometry_on_switch;
    ctx.with_state(|state| match target {
        Some(target) => switcher::switch_to(&windows, state, target, match_geometry),
        None => switcher::toggle(&windows, state, match_geometry),
    })
}

/// Show the active profile again after a vetoed close.
pub fn restore_active_profile<R: Runtime>(app: &AppHandle<R>) {
    let result = ProfilePair::from_app(app).and_then(|windows| {
        app.state::<AppContext>()
            .with_state(|state| lifecycle::restore_active(&windows, state))
    });
    if let Err(e) = result {
        log::error!("Failed to restore window: {}", e);
    }
}
