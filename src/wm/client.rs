use crate::config::{ActionsConfig, IconConfig};
use crate::wm::backend::{Backend, WindowId};
use crate::wm::error::Result;
use crate::wm::properties::{Properties, WindowType};
use crate::wm::state::{self, ExtendedState};

/// Metadata of one client as the panel and decorations consume it.
/// Nothing is cached: every accessor goes back to the server.
pub struct ClientProperties<'c, B: Backend + ?Sized> {
    window: WindowId,
    props: Properties<'c, B>,
    icon_size: u32,
}

impl<'c, B: Backend + ?Sized> ClientProperties<'c, B> {
    pub fn new(conn: &'c B, window: WindowId, icons: &IconConfig) -> Self {
        Self {
            window,
            props: Properties::new(conn),
            icon_size: icons.icon_size(),
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn title(&self) -> Result<String> {
        self.props.title(self.window)
    }

    /// WM_CLASS entries, never empty.
    pub fn class(&self) -> Result<Vec<String>> {
        self.props.class(self.window)
    }

    pub fn command(&self) -> Result<String> {
        self.props.command(self.window)
    }

    pub fn icon_name(&self) -> Result<String> {
        self.props.icon_name(self.window)
    }

    /// PNG at the configured launcher size, `None` if the window has no
    /// usable icon.
    pub fn icon(&self) -> Option<Vec<u8>> {
        let png = self.props.icon(self.window, self.icon_size, self.icon_size);
        if png.is_empty() { None } else { Some(png) }
    }

    pub fn decorated(&self) -> Result<bool> {
        self.props.decorated(self.window)
    }

    pub fn window_type(&self) -> Result<WindowType> {
        self.props.window_type(self.window)
    }

    pub fn transient_for(&self) -> Result<Option<WindowId>> {
        self.props.transient_for(self.window)
    }

    pub fn skip_taskbar(&self) -> Result<bool> {
        ExtendedState::new(self.props.connection()).contains(self.window, state::SKIP_TASKBAR)
    }

    /// Publish the configured `_NET_WM_ALLOWED_ACTIONS` if this is a normal
    /// window. Returns whether anything was written.
    pub fn advertise_actions(&self, actions: &ActionsConfig) -> Result<bool> {
        if self.window_type()? != WindowType::Normal {
            return Ok(false);
        }
        self.props.set_allowed_actions(self.window, &actions.allowed);
        Ok(true)
    }
}
