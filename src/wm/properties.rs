//! Properties Module
//!
//! Per-window metadata with ICCCM/EWMH fallback. Every read goes to the
//! server; nothing is cached here. Reads only fail on a broken connection,
//! anything else (missing property, BadWindow, undecodable data) resolves
//! to the documented default. Writes are best-effort and only logged.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::wm::backend::{Backend, Prop, PropertyValue, WindowId};
use crate::wm::error::{Error, Result};
use crate::wm::hints::{MotifWmHints, SizeHints, WmHints, WmHintsFlags};
use crate::wm::icons;

/// `_NET_WM_WINDOW_TYPE` values, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowType {
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
    DropdownMenu,
    PopupMenu,
    Tooltip,
    Notification,
    Combo,
    Dnd,
    #[default]
    Normal,
}

impl WindowType {
    pub const ALL: [WindowType; 14] = [
        WindowType::Desktop,
        WindowType::Dock,
        WindowType::Toolbar,
        WindowType::Menu,
        WindowType::Utility,
        WindowType::Splash,
        WindowType::Dialog,
        WindowType::DropdownMenu,
        WindowType::PopupMenu,
        WindowType::Tooltip,
        WindowType::Notification,
        WindowType::Combo,
        WindowType::Dnd,
        WindowType::Normal,
    ];

    pub fn atom_name(self) -> &'static str {
        match self {
            WindowType::Desktop => "_NET_WM_WINDOW_TYPE_DESKTOP",
            WindowType::Dock => "_NET_WM_WINDOW_TYPE_DOCK",
            WindowType::Toolbar => "_NET_WM_WINDOW_TYPE_TOOLBAR",
            WindowType::Menu => "_NET_WM_WINDOW_TYPE_MENU",
            WindowType::Utility => "_NET_WM_WINDOW_TYPE_UTILITY",
            WindowType::Splash => "_NET_WM_WINDOW_TYPE_SPLASH",
            WindowType::Dialog => "_NET_WM_WINDOW_TYPE_DIALOG",
            WindowType::DropdownMenu => "_NET_WM_WINDOW_TYPE_DROPDOWN_MENU",
            WindowType::PopupMenu => "_NET_WM_WINDOW_TYPE_POPUP_MENU",
            WindowType::Tooltip => "_NET_WM_WINDOW_TYPE_TOOLTIP",
            WindowType::Notification => "_NET_WM_WINDOW_TYPE_NOTIFICATION",
            WindowType::Combo => "_NET_WM_WINDOW_TYPE_COMBO",
            WindowType::Dnd => "_NET_WM_WINDOW_TYPE_DND",
            WindowType::Normal => "_NET_WM_WINDOW_TYPE_NORMAL",
        }
    }

    pub fn from_atom_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.atom_name() == name)
    }
}

/// `_NET_WM_ALLOWED_ACTIONS` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAction {
    Move,
    Resize,
    Minimize,
    Shade,
    Stick,
    MaximizeHorz,
    MaximizeVert,
    Fullscreen,
    ChangeDesktop,
    Close,
    Above,
    Below,
}

impl WindowAction {
    pub fn atom_name(self) -> &'static str {
        match self {
            WindowAction::Move => "_NET_WM_ACTION_MOVE",
            WindowAction::Resize => "_NET_WM_ACTION_RESIZE",
            WindowAction::Minimize => "_NET_WM_ACTION_MINIMIZE",
            WindowAction::Shade => "_NET_WM_ACTION_SHADE",
            WindowAction::Stick => "_NET_WM_ACTION_STICK",
            WindowAction::MaximizeHorz => "_NET_WM_ACTION_MAXIMIZE_HORZ",
            WindowAction::MaximizeVert => "_NET_WM_ACTION_MAXIMIZE_VERT",
            WindowAction::Fullscreen => "_NET_WM_ACTION_FULLSCREEN",
            WindowAction::ChangeDesktop => "_NET_WM_ACTION_CHANGE_DESKTOP",
            WindowAction::Close => "_NET_WM_ACTION_CLOSE",
            WindowAction::Above => "_NET_WM_ACTION_ABOVE",
            WindowAction::Below => "_NET_WM_ACTION_BELOW",
        }
    }
}

/// ICCCM WM_STATE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WmState {
    Withdrawn,
    #[default]
    Normal,
    Iconic,
}

impl WmState {
    fn to_wire(self) -> u32 {
        match self {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }

    fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(WmState::Withdrawn),
            1 => Some(WmState::Normal),
            3 => Some(WmState::Iconic),
            _ => None,
        }
    }
}

/// Source indication for `_NET_ACTIVE_WINDOW` requests (pager).
const ACTIVE_WINDOW_SOURCE_PAGER: u32 = 2;

/// Property reader/writer bound to one connection.
pub struct Properties<'c, B: Backend + ?Sized> {
    conn: &'c B,
}

impl<B: Backend + ?Sized> Clone for Properties<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Backend + ?Sized> Copy for Properties<'_, B> {}

impl<'c, B: Backend + ?Sized> Properties<'c, B> {
    pub fn new(conn: &'c B) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'c B {
        self.conn
    }

    /// Raw read. Non-fatal errors read as an absent property.
    pub fn read(&self, window: WindowId, prop: Prop) -> Result<Option<PropertyValue>> {
        match self.conn.get_property(window, prop) {
            Ok(value) => Ok(value),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                debug!("Reading {} on 0x{:x} failed: {}", prop.atom_name(), window, e);
                Ok(None)
            }
        }
    }

    /// Read and decode. Undecodable values read as absent.
    pub fn read_as<T>(
        &self,
        window: WindowId,
        prop: Prop,
        decode: impl Fn(&PropertyValue) -> Result<T>,
    ) -> Result<Option<T>> {
        let Some(value) = self.read(window, prop)? else {
            return Ok(None);
        };
        match decode(&value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                debug!("Ignoring {} on 0x{:x}: {}", prop.atom_name(), window, e);
                Ok(None)
            }
        }
    }

    /// Try each property in order; the first one that decodes wins.
    fn first_of<T>(
        &self,
        window: WindowId,
        chain: &[Prop],
        decode: impl Fn(&PropertyValue) -> Result<T>,
    ) -> Result<Option<T>> {
        for &prop in chain {
            if let Some(value) = self.read_as(window, prop, &decode)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Best-effort write.
    pub fn write(&self, window: WindowId, prop: Prop, value: PropertyValue) {
        if let Err(e) = self.conn.set_property(window, prop, &value) {
            warn!("Failed to set {} on 0x{:x}: {}", prop.atom_name(), window, e);
        }
    }

    /// `_NET_WM_NAME`, then `WM_NAME`.
    pub fn title(&self, window: WindowId) -> Result<String> {
        Ok(self
            .first_of(window, &[Prop::NetWmName, Prop::WmName], decode_text)?
            .unwrap_or_default())
    }

    /// `WM_CLASS`, then `_NET_WM_CLASS`. Always at least one entry.
    pub fn class(&self, window: WindowId) -> Result<Vec<String>> {
        let class = self.first_of(window, &[Prop::WmClass, Prop::NetWmClass], decode_string_list)?;
        Ok(class.unwrap_or_else(|| vec![String::new()]))
    }

    /// `WM_COMMAND`, then `_NET_WM_COMMAND`; arguments joined by spaces.
    pub fn command(&self, window: WindowId) -> Result<String> {
        let argv = self.first_of(window, &[Prop::WmCommand, Prop::NetWmCommand], decode_string_list)?;
        Ok(argv.map(|argv| argv.join(" ")).unwrap_or_default())
    }

    /// `WM_ICON_NAME`, then `_NET_WM_ICON_NAME`.
    pub fn icon_name(&self, window: WindowId) -> Result<String> {
        Ok(self
            .first_of(window, &[Prop::WmIconName, Prop::NetWmIconName], decode_text)?
            .unwrap_or_default())
    }

    /// PNG-encoded icon scaled to `width` x `height`, empty when the window
    /// has no usable icon. Never fails.
    pub fn icon(&self, window: WindowId, width: u32, height: u32) -> Vec<u8> {
        match icons::render_png(self, window, width, height) {
            Ok(Some(png)) => png,
            Ok(None) => {
                debug!("Window 0x{:x} has no icon", window);
                Vec::new()
            }
            Err(e) => {
                warn!("Could not get icon for window 0x{:x}: {:#}", window, e);
                Vec::new()
            }
        }
    }

    /// False only when `_MOTIF_WM_HINTS` explicitly turns decorations off.
    pub fn decorated(&self, window: WindowId) -> Result<bool> {
        let hints = self.read_as(window, Prop::MotifWmHints, MotifWmHints::from_property)?;
        Ok(hints.is_none_or(|h| h.decorated()))
    }

    pub fn normal_hints(&self, window: WindowId) -> Result<Option<SizeHints>> {
        self.read_as(window, Prop::WmNormalHints, SizeHints::from_property)
    }

    pub fn wm_hints(&self, window: WindowId) -> Result<Option<WmHints>> {
        self.read_as(window, Prop::WmHints, WmHints::from_property)
    }

    /// `WM_TRANSIENT_FOR`, then the `WM_HINTS` window group.
    pub fn transient_for(&self, window: WindowId) -> Result<Option<WindowId>> {
        let transient = self.read_as(window, Prop::WmTransientFor, first_window)?.flatten();
        if transient.is_some() {
            return Ok(transient);
        }
        Ok(self.wm_hints(window)?.and_then(|hints| hints.window_group))
    }

    /// Client hints first, then the live window attributes.
    pub fn override_redirect(&self, window: WindowId) -> Result<bool> {
        let hinted = self
            .wm_hints(window)?
            .is_some_and(|hints| hints.flags.contains(WmHintsFlags::OVERRIDE_REDIRECT));
        if hinted {
            return Ok(true);
        }

        match self.conn.override_redirect(window) {
            Ok(value) => Ok(value),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                debug!("No attributes for window 0x{:x}: {}", window, e);
                Ok(false)
            }
        }
    }

    /// First recognised `_NET_WM_WINDOW_TYPE` entry, `Normal` otherwise.
    pub fn window_type(&self, window: WindowId) -> Result<WindowType> {
        let names = self.read_as(window, Prop::NetWmWindowType, decode_atoms)?;
        Ok(names
            .unwrap_or_default()
            .iter()
            .find_map(|name| WindowType::from_atom_name(name))
            .unwrap_or_default())
    }

    pub fn set_allowed_actions(&self, window: WindowId, actions: &[WindowAction]) {
        let names: Vec<&str> = actions.iter().map(|a| a.atom_name()).collect();
        self.write(window, Prop::NetWmAllowedActions, PropertyValue::atoms(&names));
    }

    /// Ask the window manager (via the root window) to activate `window`.
    pub fn request_active_window(&self, window: WindowId) {
        let data = [ACTIVE_WINDOW_SOURCE_PAGER, 0, 0, 0, 0];
        if let Err(e) = self.conn.send_root_message(window, Prop::NetActiveWindow, data) {
            warn!("Failed to request activation of 0x{:x}: {}", window, e);
        }
    }

    pub fn set_active_window(&self, window: WindowId) {
        let root = self.conn.root();
        self.write(root, Prop::NetActiveWindow, PropertyValue::Windows(vec![window]));
    }

    /// Current `_NET_ACTIVE_WINDOW`. `None` means the property holds 0
    /// (nothing focused); an unset property is an error.
    pub fn active_window(&self) -> Result<Option<WindowId>> {
        let root = self.conn.root();
        match self.read_as(root, Prop::NetActiveWindow, first_window)? {
            Some(active) => Ok(active),
            None => Err(Error::NoActiveWindow),
        }
    }

    pub fn wm_state(&self, window: WindowId) -> Result<WmState> {
        let state = self.read_as(window, Prop::WmState, |value| {
            value
                .words()
                .and_then(|words| words.first().copied())
                .and_then(WmState::from_wire)
                .ok_or_else(|| Error::malformed("WM_STATE", "unknown state"))
        })?;
        Ok(state.unwrap_or_default())
    }

    pub fn set_wm_state(&self, window: WindowId, state: WmState) {
        // Second word is the icon window; we never create one.
        self.write(window, Prop::WmState, PropertyValue::Cardinals(vec![state.to_wire(), 0]));
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// NUL-separated string list (`WM_CLASS`, `WM_COMMAND`).
pub(crate) fn decode_strings(value: &PropertyValue) -> Result<Vec<String>> {
    let (bytes, utf8): (&[u8], bool) = match value {
        PropertyValue::Latin1(b) => (b, false),
        PropertyValue::Utf8(b) => (b, true),
        _ => return Err(Error::malformed("text", "not 8-bit data")),
    };

    let bytes = bytes.strip_suffix(&[0]).unwrap_or(bytes);
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    bytes
        .split(|&b| b == 0)
        .map(|part| {
            if utf8 {
                String::from_utf8(part.to_vec()).map_err(|e| Error::malformed("text", e.to_string()))
            } else {
                Ok(latin1(part))
            }
        })
        .collect()
}

/// Like `decode_strings`, but an empty list does not count as a value.
fn decode_string_list(value: &PropertyValue) -> Result<Vec<String>> {
    let list = decode_strings(value)?;
    if list.is_empty() {
        return Err(Error::malformed("text", "empty list"));
    }
    Ok(list)
}

/// Single string; anything after the first NUL is dropped.
pub(crate) fn decode_text(value: &PropertyValue) -> Result<String> {
    Ok(decode_strings(value)?.into_iter().next().unwrap_or_default())
}

pub(crate) fn decode_atoms(value: &PropertyValue) -> Result<Vec<String>> {
    match value {
        PropertyValue::Atoms(names) => Ok(names.clone()),
        _ => Err(Error::malformed("atom list", "not ATOM data")),
    }
}

/// First window in a WINDOW list; 0 reads as `None`.
fn first_window(value: &PropertyValue) -> Result<Option<WindowId>> {
    let words = value
        .words()
        .ok_or_else(|| Error::malformed("window", "not 32-bit data"))?;
    let first = words
        .first()
        .ok_or_else(|| Error::malformed("window", "empty"))?;
    Ok((*first != 0).then_some(*first))
}
