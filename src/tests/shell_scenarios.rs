//! End-to-end walks through the profile shell using fake windows.

use serde_json::json;

use crate::host::{HostWindow, ProfilePair};
use crate::lifecycle::{begin_quit, handle_close_request, restore_active, CloseAction, VetoAction};
use crate::profile::ProfileId;
use crate::state::ShellState;
use crate::store::MemoryStore;
use crate::switcher::{switch_to, toggle, SwitchOutcome};
use crate::tests::fake_window::{visible_count, FakeWindow};
use crate::window_state::{
    restore_window_state, InitialGeometry, WindowState, LAST_WINDOW_STATE_KEY,
};

/// Mirror of startup: both windows at the restored frame, primary revealed.
fn launch(store: &MemoryStore) -> (ProfilePair<FakeWindow>, ShellState) {
    let frame = match restore_window_state(store) {
        InitialGeometry::Restored(state) => state,
        InitialGeometry::Centered { width, height } => WindowState { x: 0.0, y: 0.0, width, height },
    };
    let windows = ProfilePair::new(FakeWindow::new(frame), FakeWindow::new(frame));
    let mut state = ShellState::default();
    if state.take_initial_reveal(ProfileId::Primary) {
        windows.get(ProfileId::Primary).show().unwrap();
    }
    (windows, state)
}

#[test]
fn test_saved_frame_scenario() {
    let saved = WindowState { x: 100.0, y: 50.0, width: 800.0, height: 600.0 };
    let store = MemoryStore::with(&[(
        LAST_WINDOW_STATE_KEY,
        json!({"x": 100, "y": 50, "width": 800, "height": 600}),
    )]);

    let (windows, mut state) = launch(&store);
    let primary = windows.get(ProfileId::Primary);
    let secondary = windows.get(ProfileId::Secondary);
    assert_eq!(primary.frame(), saved);
    assert!(primary.visible());

    secondary.type_into_page("draft card title");

    let first = toggle(&windows, &mut state, true).unwrap();
    assert_eq!(
        first,
        SwitchOutcome::Switched { from: ProfileId::Primary, to: ProfileId::Secondary }
    );
    assert!(!primary.visible());
    assert!(secondary.visible());
    assert_eq!(secondary.frame(), saved);

    toggle(&windows, &mut state, true).unwrap();
    assert!(primary.visible());
    assert!(!secondary.visible());
    assert_eq!(secondary.page_state(), "draft card title");
}

#[test]
fn test_exactly_one_visible_across_all_switch_sequences() {
    // Every sequence of up to 8 menu choices among Personal, Work and toggle
    const MAX_LEN: u32 = 8;
    for len in 0..=MAX_LEN {
        for code in 0..3u32.pow(len) {
            let (windows, mut state) = launch(&MemoryStore::default());
            windows.get(ProfileId::Secondary).type_into_page("work");
            assert_eq!(visible_count(&windows), 1);

            let mut c = code;
            for _ in 0..len {
                match c % 3 {
                    0 => switch_to(&windows, &mut state, ProfileId::Primary, true),
                    1 => switch_to(&windows, &mut state, ProfileId::Secondary, true),
                    _ => toggle(&windows, &mut state, true),
                }
                .unwrap();
                c /= 3;

                assert_eq!(visible_count(&windows), 1, "sequence {code} of length {len}");
                assert!(windows.get(state.active).visible());
            }
            assert_eq!(windows.get(ProfileId::Secondary).page_state(), "work");
        }
    }
}

#[test]
fn test_close_requests_while_running_keep_windows_alive() {
    let (windows, mut state) = launch(&MemoryStore::default());
    let store = MemoryStore::default();

    for round in 0..6 {
        if round % 2 == 1 {
            toggle(&windows, &mut state, true).unwrap();
        }
        let action =
            handle_close_request(&windows, &mut state, &store, VetoAction::HideToTray).unwrap();
        assert!(matches!(action, CloseAction::Veto(_)));
        assert_eq!(state.live_windows(), 2);

        restore_active(&windows, &mut state).unwrap();
        assert_eq!(visible_count(&windows), 1);
    }
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_quit_then_relaunch_restores_frame() {
    let store = MemoryStore::default();
    let (windows, mut state) = launch(&store);

    let resized = WindowState { x: 40.0, y: 60.0, width: 1100.0, height: 720.0 };
    windows.get(ProfileId::Primary).set_bounds(&resized).unwrap();

    begin_quit(&windows, &mut state, &store).unwrap();
    for id in ProfileId::ALL {
        let action =
            handle_close_request(&windows, &mut state, &store, VetoAction::HideToTray).unwrap();
        assert!(matches!(action, CloseAction::Proceed(_)));
        crate::lifecycle::mark_destroyed(&mut state, id);
    }
    assert_eq!(state.live_windows(), 0);
    assert_eq!(store.save_count(), 1);

    let (relaunched, _) = launch(&store);
    assert_eq!(relaunched.get(ProfileId::Primary).frame(), resized);
}
