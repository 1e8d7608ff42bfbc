use std::sync::{Mutex, PoisonError};

use crate::profile::{ProfileId, ProfileSpec};
use crate::settings::ShellConfig;

/// Whether the application is about to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Normal operation: closing a window hides the app instead of closing it
    Running,
    /// A real quit is in progress: closes go through, geometry gets saved
    Quitting,
}

/// Per-window close state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    Open,
    /// A close was vetoed and the window (or the whole app) was hidden
    HiddenPendingQuit,
    Closed,
}

/// Mutable state shared by every window and menu handler.
#[derive(Debug)]
pub struct ShellState {
    pub phase: LifecyclePhase,
    /// The profile whose window is the visible one
    pub active: ProfileId,
    windows: [WindowPhase; 2],
    geometry_persisted: bool,
    primary_revealed: bool,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            phase: LifecyclePhase::Running,
            active: ProfileId::Primary,
            windows: [WindowPhase::Open; 2],
            geometry_persisted: false,
            primary_revealed: false,
        }
    }
}

impl ShellState {
    pub fn window_phase(&self, id: ProfileId) -> WindowPhase {
        self.windows[id.index()]
    }

    pub fn set_window_phase(&mut self, id: ProfileId, phase: WindowPhase) {
        self.windows[id.index()] = phase;
    }

    /// Windows that have not been destroyed (hidden ones count).
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn live_windows(&self) -> usize {
        self.windows
            .iter()
            .filter(|phase| **phase != WindowPhase::Closed)
            .count()
    }

    /// Enter the quit sequence. Returns false if already quitting.
    pub fn begin_quit(&mut self) -> bool {
        if self.phase == LifecyclePhase::Quitting {
            return false;
        }
        self.phase = LifecyclePhase::Quitting;
        true
    }

    pub fn geometry_persisted(&self) -> bool {
        self.geometry_persisted
    }

    pub(crate) fn mark_geometry_persisted(&mut self) {
        self.geometry_persisted = true;
    }

    /// True exactly once: the first time the primary window's page finishes
    /// loading while it is still the active profile.
    pub fn take_initial_reveal(&mut self, id: ProfileId) -> bool {
        if id != ProfileId::Primary
            || self.primary_revealed
            || self.active != ProfileId::Primary
            || self.phase != LifecyclePhase::Running
        {
            return false;
        }
        self.primary_revealed = true;
        true
    }
}

/// Application context managed by Tauri and handed to every event handler.
pub struct AppContext {
    pub config: ShellConfig,
    pub profiles: [ProfileSpec; 2],
    state: Mutex<ShellState>,
}

impl AppContext {
    pub fn new(config: ShellConfig, profiles: [ProfileSpec; 2]) -> Self {
        Self {
            config,
            profiles,
            state: Mutex::new(ShellState::default()),
        }
    }

    /// Run `f` with the shell state locked. Do not exit the process from inside.
    pub fn with_state<T>(&self, f: impl FnOnce(&mut ShellState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.with_state(|state| state.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_quit_is_one_way() {
        let mut state = ShellState::default();
        assert_eq!(state.phase, LifecyclePhase::Running);
        assert!(state.begin_quit());
        assert!(!state.begin_quit());
        assert_eq!(state.phase, LifecyclePhase::Quitting);
    }

    #[test]
    fn test_initial_reveal_happens_once_for_primary() {
        let mut state = ShellState::default();
        assert!(!state.take_initial_reveal(ProfileId::Secondary));
        assert!(state.take_initial_reveal(ProfileId::Primary));
        assert!(!state.take_initial_reveal(ProfileId::Primary));
    }

    #[test]
    fn test_no_reveal_after_switching_away() {
        let mut state = ShellState::default();
        state.active = ProfileId::Secondary;
        assert!(!state.take_initial_reveal(ProfileId::Primary));
    }

    #[test]
    fn test_live_windows_ignores_hidden() {
        let mut state = ShellState::default();
        state.set_window_phase(ProfileId::Primary, WindowPhase::HiddenPendingQuit);
        assert_eq!(state.live_windows(), 2);
        state.set_window_phase(ProfileId::Secondary, WindowPhase::Closed);
        assert_eq!(state.live_windows(), 1);
    }
}
