//! Backend Module
//!
//! The seam between the property layer and the display server. Everything
//! above this module talks to a `Backend`; `X11Backend` (see `ewmh.rs`) is
//! the real implementation and tests substitute a fake one.

use crate::wm::error::Result;

/// X11 window ID.
pub type WindowId = u32;

/// Properties this layer reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prop {
    WmName,
    NetWmName,
    WmIconName,
    NetWmIconName,
    WmClass,
    NetWmClass,
    WmCommand,
    NetWmCommand,
    WmNormalHints,
    WmHints,
    WmTransientFor,
    WmState,
    MotifWmHints,
    NetWmState,
    NetWmWindowType,
    NetWmAllowedActions,
    NetWmIcon,
    NetActiveWindow,
    NetClientList,
    NetClientListStacking,
}

impl Prop {
    /// Every property, in declaration order.
    pub const ALL: [Prop; 20] = [
        Prop::WmName,
        Prop::NetWmName,
        Prop::WmIconName,
        Prop::NetWmIconName,
        Prop::WmClass,
        Prop::NetWmClass,
        Prop::WmCommand,
        Prop::NetWmCommand,
        Prop::WmNormalHints,
        Prop::WmHints,
        Prop::WmTransientFor,
        Prop::WmState,
        Prop::MotifWmHints,
        Prop::NetWmState,
        Prop::NetWmWindowType,
        Prop::NetWmAllowedActions,
        Prop::NetWmIcon,
        Prop::NetActiveWindow,
        Prop::NetClientList,
        Prop::NetClientListStacking,
    ];

    /// Atom name on the wire.
    pub fn atom_name(self) -> &'static str {
        match self {
            Prop::WmName => "WM_NAME",
            Prop::NetWmName => "_NET_WM_NAME",
            Prop::WmIconName => "WM_ICON_NAME",
            Prop::NetWmIconName => "_NET_WM_ICON_NAME",
            Prop::WmClass => "WM_CLASS",
            Prop::NetWmClass => "_NET_WM_CLASS",
            Prop::WmCommand => "WM_COMMAND",
            Prop::NetWmCommand => "_NET_WM_COMMAND",
            Prop::WmNormalHints => "WM_NORMAL_HINTS",
            Prop::WmHints => "WM_HINTS",
            Prop::WmTransientFor => "WM_TRANSIENT_FOR",
            Prop::WmState => "WM_STATE",
            Prop::MotifWmHints => "_MOTIF_WM_HINTS",
            Prop::NetWmState => "_NET_WM_STATE",
            Prop::NetWmWindowType => "_NET_WM_WINDOW_TYPE",
            Prop::NetWmAllowedActions => "_NET_WM_ALLOWED_ACTIONS",
            Prop::NetWmIcon => "_NET_WM_ICON",
            Prop::NetActiveWindow => "_NET_ACTIVE_WINDOW",
            Prop::NetClientList => "_NET_CLIENT_LIST",
            Prop::NetClientListStacking => "_NET_CLIENT_LIST_STACKING",
        }
    }
}

/// A decoded property value, already split by wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// 8-bit `STRING` (ISO 8859-1) or `COMPOUND_TEXT` data.
    Latin1(Vec<u8>),
    /// 8-bit `UTF8_STRING` data.
    Utf8(Vec<u8>),
    /// 32-bit `CARDINAL` data or a hint structure (`WM_SIZE_HINTS`, `WM_HINTS`, ...).
    Cardinals(Vec<u32>),
    /// 32-bit `WINDOW` data.
    Windows(Vec<WindowId>),
    /// 32-bit `ATOM` data, resolved to atom names.
    Atoms(Vec<String>),
}

impl PropertyValue {
    pub fn utf8(text: &str) -> Self {
        PropertyValue::Utf8(text.as_bytes().to_vec())
    }

    pub fn latin1(text: &str) -> Self {
        PropertyValue::Latin1(text.chars().map(|c| c as u32 as u8).collect())
    }

    pub fn atoms<S: AsRef<str>>(names: &[S]) -> Self {
        PropertyValue::Atoms(names.iter().map(|n| n.as_ref().to_string()).collect())
    }

    /// 32-bit words regardless of whether they were typed as windows or cardinals.
    pub fn words(&self) -> Option<&[u32]> {
        match self {
            PropertyValue::Cardinals(w) | PropertyValue::Windows(w) => Some(w),
            _ => None,
        }
    }
}

/// A server-side image read back as ARGB32 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgbImage {
    pub width: u32,
    pub height: u32,
    /// Row-major, 0xAARRGGBB
    pub pixels: Vec<u32>,
}

/// One synchronous display-server connection.
///
/// Reads return `Ok(None)` when the property does not exist. Any error that
/// is not `Error::Connection` is treated by callers as a missing value.
pub trait Backend {
    /// Root window of the managed screen.
    fn root(&self) -> WindowId;

    fn get_property(&self, window: WindowId, prop: Prop) -> Result<Option<PropertyValue>>;

    /// Replace the whole property in a single request.
    fn set_property(&self, window: WindowId, prop: Prop, value: &PropertyValue) -> Result<()>;

    /// `override_redirect` from the live window attributes.
    fn override_redirect(&self, window: WindowId) -> Result<bool>;

    /// Send a 32-bit client message about `window` to the root window.
    fn send_root_message(&self, window: WindowId, message: Prop, data: [u32; 5]) -> Result<()>;

    /// Read back a pixmap (icon or icon mask) as ARGB pixels.
    fn pixmap_image(&self, pixmap: u32) -> Result<Option<ArgbImage>>;

    fn grab_server(&self) -> Result<()>;

    fn ungrab_server(&self) -> Result<()>;
}
