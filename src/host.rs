use tauri::{LogicalPosition, LogicalSize, Manager, Runtime, WebviewWindow};

use crate::error::ShellError;
use crate::profile::ProfileId;
use crate::window_state::WindowState;

/// The window primitives the profile state machine needs from the browser host.
pub trait HostWindow {
    fn bounds(&self) -> Result<WindowState, ShellError>;
    fn set_bounds(&self, bounds: &WindowState) -> Result<(), ShellError>;
    fn is_visible(&self) -> Result<bool, ShellError>;
    fn is_fullscreen(&self) -> Result<bool, ShellError>;
    fn show(&self) -> Result<(), ShellError>;
    fn hide(&self) -> Result<(), ShellError>;
    fn focus(&self) -> Result<(), ShellError>;
}

impl<R: Runtime> HostWindow for WebviewWindow<R> {
    fn bounds(&self) -> Result<WindowState, ShellError> {
        let scale = self.scale_factor()?;
        let position = self.outer_position()?.to_logical::<f64>(scale);
        let size = self.inner_size()?.to_logical::<f64>(scale);
        Ok(WindowState {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn set_bounds(&self, bounds: &WindowState) -> Result<(), ShellError> {
        self.set_size(LogicalSize::new(bounds.width, bounds.height))?;
        self.set_position(LogicalPosition::new(bounds.x, bounds.y))?;
        Ok(())
    }

    fn is_visible(&self) -> Result<bool, ShellError> {
        Ok(WebviewWindow::is_visible(self)?)
    }

    fn is_fullscreen(&self) -> Result<bool, ShellError> {
        Ok(WebviewWindow::is_fullscreen(self)?)
    }

    fn show(&self) -> Result<(), ShellError> {
        Ok(WebviewWindow::show(self)?)
    }

    fn hide(&self) -> Result<(), ShellError> {
        Ok(WebviewWindow::hide(self)?)
    }

    fn focus(&self) -> Result<(), ShellError> {
        Ok(self.set_focus()?)
    }
}

/// Both profile windows, addressable by [`ProfileId`].
pub struct ProfilePair<W> {
    windows: [W; 2],
}

impl<W> ProfilePair<W> {
    pub fn new(primary: W, secondary: W) -> Self {
        Self {
            windows: [primary, secondary],
        }
    }

    pub fn get(&self, id: ProfileId) -> &W {
        &self.windows[id.index()]
    }
}

impl<R: Runtime> ProfilePair<WebviewWindow<R>> {
    /// Look up both windows by label.
    pub fn from_app<M: Manager<R>>(manager: &M) -> Result<Self, ShellError> {
        let lookup = |id: ProfileId| {
            manager
                .get_webview_window(id.window_label())
                .ok_or_else(|| ShellError::MissingWindow(id.window_label().to_string()))
        };
        Ok(Self::new(
            lookup(ProfileId::Primary)?,
            lookup(ProfileId::Secondary)?,
        ))
    }
}
