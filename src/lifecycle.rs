//! Close-request handling and the quit sequence.
//!
//! While running, closing a profile window never destroys it: the close is
//! vetoed and the application is hidden instead. Only once the quit sequence
//! has started do closes go through, and the primary window's frame is saved
//! first unless it is fullscreen.

use crate::error::ShellError;
use crate::host::{HostWindow, ProfilePair};
use crate::profile::ProfileId;
use crate::state::{LifecyclePhase, ShellState, WindowPhase};
use crate::store::KeyValueStore;
use crate::window_state::{persist_window_state, WindowState};

/// How a vetoed close hides the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetoAction {
    /// Hide the whole app; the dock icon brings it back (macOS)
    HideApplication,
    /// Hide the active window; the tray icon brings it back
    HideToTray,
}

impl VetoAction {
    pub fn for_current_platform() -> Self {
        if cfg!(target_os = "macos") {
            VetoAction::HideApplication
        } else {
            VetoAction::HideToTray
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PersistOutcome {
    Saved(WindowState),
    SkippedFullscreen,
    AlreadySaved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CloseAction {
    /// Let the host close the window
    Proceed(PersistOutcome),
    /// Suppress the close; the caller finishes a `HideApplication` veto
    Veto(VetoAction),
}

/// Save the primary window's frame, at most once per quit sequence and never
/// while it is fullscreen.
pub fn persist_primary_geometry<W: HostWindow>(
    windows: &ProfilePair<W>,
    state: &mut ShellState,
    store: &dyn KeyValueStore,
) -> Result<PersistOutcome, ShellError> {
    if state.geometry_persisted() {
        return Ok(PersistOutcome::AlreadySaved);
    }

    let primary = windows.get(ProfileId::Primary);
    if primary.is_fullscreen()? {
        log::info!("Primary window is fullscreen, keeping previous window state");
        return Ok(PersistOutcome::SkippedFullscreen);
    }

    let bounds = primary.bounds()?;
    persist_window_state(store, &bounds)?;
    state.mark_geometry_persisted();
    Ok(PersistOutcome::Saved(bounds))
}

/// Enter the quit sequence and save geometry. The caller exits the process
/// afterwards.
pub fn begin_quit<W: HostWindow>(
    windows: &ProfilePair<W>,
    state: &mut ShellState,
    store: &dyn KeyValueStore,
) -> Result<PersistOutcome, ShellError> {
    if state.begin_quit() {
        log::info!("Quit requested");
    }
    persist_primary_geometry(windows, state, store)
}

/// Decide what happens to a close request on any profile window.
pub fn handle_close_request<W: HostWindow>(
    windows: &ProfilePair<W>,
    state: &mut ShellState,
    store: &dyn KeyValueStore,
    veto: VetoAction,
) -> Result<CloseAction, ShellError> {
    match state.phase {
        LifecyclePhase::Quitting => {
            let outcome = persist_primary_geometry(windows, state, store)?;
            Ok(CloseAction::Proceed(outcome))
        }
        LifecyclePhase::Running => {
            let active = state.active;
            if veto == VetoAction::HideToTray {
                windows.get(active).hide()?;
            }
            state.set_window_phase(active, WindowPhase::HiddenPendingQuit);
            log::debug!("Close vetoed, hiding {:?} ({:?})", active, veto);
            Ok(CloseAction::Veto(veto))
        }
    }
}

/// Bring the active profile back after the app was hidden.
pub fn restore_active<W: HostWindow>(
    windows: &ProfilePair<W>,
    state: &mut ShellState,
) -> Result<ProfileId, ShellError> {
    let active = state.active;
    let window = windows.get(active);
    if !window.is_visible()? {
        window.show()?;
    }
    window.focus()?;
    if state.window_phase(active) == WindowPhase::HiddenPendingQuit {
        state.set_window_phase(active, WindowPhase::Open);
    }
    Ok(active)
}

/// Record that the host destroyed a window.
pub fn mark_destroyed(state: &mut ShellState, id: ProfileId) {
    state.set_window_phase(id, WindowPhase::Closed);
    if state.phase == LifecyclePhase::Running {
        log::warn!("{:?} window destroyed outside of the quit sequence", id);
    }
}
