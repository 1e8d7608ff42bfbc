use serde::{Deserialize, Serialize};

use crate::error::ShellError;
use crate::store::KeyValueStore;

pub const LAST_WINDOW_STATE_KEY: &str = "lastWindowState";

pub const MIN_WIDTH: f64 = 400.0;
pub const MIN_HEIGHT: f64 = 200.0;
pub const DEFAULT_WIDTH: f64 = 1280.0;
pub const DEFAULT_HEIGHT: f64 = 800.0;

/// Last-known frame of the primary window, in logical pixels.
///
/// `x`/`y` is the outer position, `width`/`height` the inner size. This is the
/// same pair the window builder accepts, so a restored window lands exactly on
/// the saved frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowState {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WindowState {
    /// Positions may be negative on multi-monitor setups; sizes may not.
    fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Grow a frame that is smaller than the window minimum.
    fn clamped_to_minimum(mut self) -> Self {
        self.width = self.width.max(MIN_WIDTH);
        self.height = self.height.max(MIN_HEIGHT);
        self
    }
}

/// Where a freshly created window should appear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialGeometry {
    Restored(WindowState),
    Centered { width: f64, height: f64 },
}

impl Default for InitialGeometry {
    fn default() -> Self {
        InitialGeometry::Centered {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Read the persisted frame. Missing or malformed data yields the centered
/// default instead of an error.
pub fn restore_window_state(store: &dyn KeyValueStore) -> InitialGeometry {
    let Some(raw) = store.get(LAST_WINDOW_STATE_KEY) else {
        log::info!("No saved window state, using defaults");
        return InitialGeometry::default();
    };

    match serde_json::from_value::<WindowState>(raw) {
        Ok(state) if state.is_well_formed() => {
            InitialGeometry::Restored(state.clamped_to_minimum())
        }
        Ok(state) => {
            log::warn!("Ignoring out-of-range window state: {:?}", state);
            InitialGeometry::default()
        }
        Err(e) => {
            log::warn!("Ignoring malformed window state: {}", e);
            InitialGeometry::default()
        }
    }
}

/// Write the frame and flush the store to disk.
pub fn persist_window_state(
    store: &dyn KeyValueStore,
    state: &WindowState,
) -> Result<(), ShellError> {
    store.set(LAST_WINDOW_STATE_KEY, serde_json::to_value(state)?);
    store.save()?;
    log::info!(
        "Saved window state: {}x{} at ({}, {})",
        state.width,
        state.height,
        state.x,
        state.y
    );
    Ok(())
}
