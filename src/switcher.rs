use crate::error::ShellError;
use crate::host::{HostWindow, ProfilePair};
use crate::profile::ProfileId;
use crate::state::{ShellState, WindowPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    AlreadyActive,
    Switched { from: ProfileId, to: ProfileId },
}

/// Make `target` the visible profile.
///
/// The outgoing window is hidden, never closed, so its page keeps its state.
/// With `match_geometry` the target first takes over the outgoing frame,
/// unless the outgoing window is fullscreen.
pub fn switch_to<W: HostWindow>(
    windows: &ProfilePair<W>,
    state: &mut ShellState,
    target: ProfileId,
    match_geometry: bool,
) -> Result<SwitchOutcome, ShellError> {
    let current = state.active;
    if current == target {
        return Ok(SwitchOutcome::AlreadyActive);
    }

    let outgoing = windows.get(current);
    let incoming = windows.get(target);

    if match_geometry && !outgoing.is_fullscreen()? {
        let frame = outgoing.bounds()?;
        incoming.set_bounds(&frame)?;
    }

    // Show before hiding so there is never a moment with no window on screen.
    incoming.show()?;
    if let Err(e) = outgoing.hide() {
        if let Err(undo) = incoming.hide() {
            log::warn!("Failed to hide {:?} after aborted switch: {}", target, undo);
        }
        return Err(e);
    }
    state.active = target;
    state.set_window_phase(target, WindowPhase::Open);
    incoming.focus()?;

    log::info!("Switched profile {:?} -> {:?}", current, target);
    Ok(SwitchOutcome::Switched {
        from: current,
        to: target,
    })
}

/// Switch to whichever profile is not active.
pub fn toggle<W: HostWindow>(
    windows: &ProfilePair<W>,
    state: &mut ShellState,
    match_geometry: bool,
) -> Result<SwitchOutcome, ShellError> {
    let target = state.active.other();
    switch_to(windows, state, target, match_geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fake_window::{fake_pair, visible_count, FakeWindow};
    use crate::window_state::WindowState;

    const FRAME: WindowState = WindowState { x: 100.0, y: 50.0, width: 800.0, height: 600.0 };

    fn started() -> (ProfilePair<FakeWindow>, ShellState) {
        let windows = fake_pair(FRAME);
        windows.get(ProfileId::Primary).show().unwrap();
        (windows, ShellState::default())
    }

    #[test]
    fn test_switch_to_active_is_noop() {
        let (windows, mut state) = started();
        let outcome = switch_to(&windows, &mut state, ProfileId::Primary, true).unwrap();

        assert_eq!(outcome, SwitchOutcome::AlreadyActive);
        assert!(windows.get(ProfileId::Primary).visible());
        assert!(!windows.get(ProfileId::Secondary).visible());
        assert_eq!(windows.get(ProfileId::Primary).geometry_writes(), 0);
        assert_eq!(windows.get(ProfileId::Secondary).geometry_writes(), 0);
    }

    #[test]
    fn test_switch_matches_outgoing_frame() {
        let (windows, mut state) = started();
        let moved = WindowState { x: 300.0, y: 200.0, width: 1000.0, height: 640.0 };
        windows.get(ProfileId::Primary).set_bounds(&moved).unwrap();

        let outcome = switch_to(&windows, &mut state, ProfileId::Secondary, true).unwrap();
        assert_eq!(
            outcome,
            SwitchOutcome::Switched { from: ProfileId::Primary, to: ProfileId::Secondary }
        );
        assert_eq!(windows.get(ProfileId::Secondary).frame(), moved);
        assert!(windows.get(ProfileId::Secondary).focused());
        assert_eq!(state.active, ProfileId::Secondary);
    }

    #[test]
    fn test_switch_without_geometry_matching() {
        let (windows, mut state) = started();
        windows
            .get(ProfileId::Primary)
            .set_bounds(&WindowState { x: 0.0, y: 0.0, width: 500.0, height: 400.0 })
            .unwrap();

        switch_to(&windows, &mut state, ProfileId::Secondary, false).unwrap();
        assert_eq!(windows.get(ProfileId::Secondary).frame(), FRAME);
        assert_eq!(windows.get(ProfileId::Secondary).geometry_writes(), 0);
    }

    #[test]
    fn test_fullscreen_frame_is_not_copied() {
        let (windows, mut state) = started();
        windows.get(ProfileId::Primary).set_fullscreen(true);

        switch_to(&windows, &mut state, ProfileId::Secondary, true).unwrap();
        assert_eq!(windows.get(ProfileId::Secondary).geometry_writes(), 0);
        assert_eq!(visible_count(&windows), 1);
    }

    #[test]
    fn test_toggle_alternates() {
        let (windows, mut state) = started();
        toggle(&windows, &mut state, true).unwrap();
        assert_eq!(state.active, ProfileId::Secondary);
        toggle(&windows, &mut state, true).unwrap();
        assert_eq!(state.active, ProfileId::Primary);
        assert!(windows.get(ProfileId::Primary).visible());
        assert_eq!(visible_count(&windows), 1);
    }

    #[test]
    fn test_failed_hide_keeps_previous_profile() {
        let (windows, mut state) = started();
        windows.get(ProfileId::Primary).set_fail_hide(true);

        assert!(switch_to(&windows, &mut state, ProfileId::Secondary, true).is_err());
        assert_eq!(state.active, ProfileId::Primary);
        assert!(windows.get(ProfileId::Primary).visible());
        assert!(!windows.get(ProfileId::Secondary).visible());
        assert_eq!(visible_count(&windows), 1);
    }

    #[test]
    fn test_switch_reopens_hidden_target_phase() {
        let (windows, mut state) = started();
        state.set_window_phase(ProfileId::Secondary, WindowPhase::HiddenPendingQuit);
        switch_to(&windows, &mut state, ProfileId::Secondary, true).unwrap();
        assert_eq!(state.window_phase(ProfileId::Secondary), WindowPhase::Open);
    }
}
