//! EWMH / ICCCM wire access
//!
//! `X11Backend` implements `Backend` on top of an x11rb connection: property
//! reads split by wire type, whole-property writes, root client messages,
//! pixmap readback and server grabs.

use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::wrapper::ConnectionExt as _;

use crate::wm::backend::{ArgbImage, Backend, Prop, PropertyValue, WindowId};
use crate::wm::error::{Error, Result};

/// Upper bound for a single GetProperty, in 32-bit units. Large enough for a
/// few 256x256 `_NET_WM_ICON` entries.
const MAX_PROPERTY_WORDS: u32 = 1 << 20;

/// Holds all interned atoms
#[derive(Debug)]
pub struct Atoms {
    pub wm_name: Atom,
    pub net_wm_name: Atom,
    pub wm_icon_name: Atom,
    pub net_wm_icon_name: Atom,
    pub wm_class: Atom,
    pub net_wm_class: Atom,
    pub wm_command: Atom,
    pub net_wm_command: Atom,
    pub wm_normal_hints: Atom,
    pub wm_hints: Atom,
    pub wm_transient_for: Atom,
    pub wm_state: Atom,
    pub motif_wm_hints: Atom,
    pub net_wm_state: Atom,
    pub net_wm_window_type: Atom,
    pub net_wm_allowed_actions: Atom,
    pub net_wm_icon: Atom,
    pub net_active_window: Atom,
    pub net_client_list: Atom,
    pub net_client_list_stacking: Atom,
    // Types
    pub utf8_string: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        // Helper to intern a single atom
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            wm_name: AtomEnum::WM_NAME.into(),
            net_wm_name: intern("_NET_WM_NAME")?,
            wm_icon_name: AtomEnum::WM_ICON_NAME.into(),
            net_wm_icon_name: intern("_NET_WM_ICON_NAME")?,
            wm_class: AtomEnum::WM_CLASS.into(),
            net_wm_class: intern("_NET_WM_CLASS")?,
            wm_command: AtomEnum::WM_COMMAND.into(),
            net_wm_command: intern("_NET_WM_COMMAND")?,
            wm_normal_hints: AtomEnum::WM_NORMAL_HINTS.into(),
            wm_hints: AtomEnum::WM_HINTS.into(),
            wm_transient_for: AtomEnum::WM_TRANSIENT_FOR.into(),
            wm_state: intern("WM_STATE")?,
            motif_wm_hints: intern("_MOTIF_WM_HINTS")?,
            net_wm_state: intern("_NET_WM_STATE")?,
            net_wm_window_type: intern("_NET_WM_WINDOW_TYPE")?,
            net_wm_allowed_actions: intern("_NET_WM_ALLOWED_ACTIONS")?,
            net_wm_icon: intern("_NET_WM_ICON")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_client_list: intern("_NET_CLIENT_LIST")?,
            net_client_list_stacking: intern("_NET_CLIENT_LIST_STACKING")?,
            utf8_string: intern("UTF8_STRING")?,
        })
    }

    pub fn prop(&self, prop: Prop) -> Atom {
        match prop {
            Prop::WmName => self.wm_name,
            Prop::NetWmName => self.net_wm_name,
            Prop::WmIconName => self.wm_icon_name,
            Prop::NetWmIconName => self.net_wm_icon_name,
            Prop::WmClass => self.wm_class,
            Prop::NetWmClass => self.net_wm_class,
            Prop::WmCommand => self.wm_command,
            Prop::NetWmCommand => self.net_wm_command,
            Prop::WmNormalHints => self.wm_normal_hints,
            Prop::WmHints => self.wm_hints,
            Prop::WmTransientFor => self.wm_transient_for,
            Prop::WmState => self.wm_state,
            Prop::MotifWmHints => self.motif_wm_hints,
            Prop::NetWmState => self.net_wm_state,
            Prop::NetWmWindowType => self.net_wm_window_type,
            Prop::NetWmAllowedActions => self.net_wm_allowed_actions,
            Prop::NetWmIcon => self.net_wm_icon,
            Prop::NetActiveWindow => self.net_active_window,
            Prop::NetClientList => self.net_client_list,
            Prop::NetClientListStacking => self.net_client_list_stacking,
        }
    }

    /// Type atom used when writing 32-bit structured data to `prop`.
    fn cardinal_type(&self, prop: Prop) -> Atom {
        match prop {
            Prop::WmState => self.wm_state,
            Prop::WmNormalHints => AtomEnum::WM_SIZE_HINTS.into(),
            Prop::WmHints => AtomEnum::WM_HINTS.into(),
            Prop::MotifWmHints => self.motif_wm_hints,
            _ => AtomEnum::CARDINAL.into(),
        }
    }
}

/// `Backend` over a live x11rb connection.
pub struct X11Backend<C: Connection> {
    conn: C,
    root: Window,
    atoms: Atoms,
}

impl<C: Connection> X11Backend<C> {
    pub fn new(conn: C, screen_num: usize) -> Result<Self> {
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| Error::Request(format!("screen {} does not exist", screen_num)))?;
        let atoms = Atoms::new(&conn)?;
        debug!("Interned atoms for screen {} (root 0x{:x})", screen_num, root);

        Ok(Self { conn, root, atoms })
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    fn atom_names(&self, atoms: &[Atom]) -> Result<Vec<String>> {
        // Send every request before waiting on the first reply.
        let cookies = atoms
            .iter()
            .filter(|&&atom| atom != x11rb::NONE)
            .map(|&atom| self.conn.get_atom_name(atom))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        cookies
            .into_iter()
            .map(|cookie| Ok(String::from_utf8_lossy(&cookie.reply()?.name).into_owned()))
            .collect()
    }

    fn intern_names(&self, names: &[String]) -> Result<Vec<Atom>> {
        let cookies = names
            .iter()
            .map(|name| self.conn.intern_atom(false, name.as_bytes()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        cookies
            .into_iter()
            .map(|cookie| Ok(cookie.reply()?.atom))
            .collect()
    }

    fn decode_image(&self, depth: u8, width: u16, height: u16, data: &[u8]) -> Option<ArgbImage> {
        let setup = self.conn.setup();
        let format = setup.pixmap_formats.iter().find(|f| f.depth == depth)?;
        let pad = u32::from(format.scanline_pad).max(8);
        let bpp = u32::from(format.bits_per_pixel);
        let (width, height) = (u32::from(width), u32::from(height));
        let stride = ((width * bpp).div_ceil(pad) * pad / 8) as usize;

        if data.len() < stride * height as usize {
            debug!("Short image data: {} bytes for {}x{}", data.len(), width, height);
            return None;
        }

        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height as usize {
            let row = &data[y * stride..(y + 1) * stride];
            for x in 0..width as usize {
                let pixel = match bpp {
                    32 => {
                        let bytes = [row[x * 4], row[x * 4 + 1], row[x * 4 + 2], row[x * 4 + 3]];
                        let value = if setup.image_byte_order == ImageOrder::MSB_FIRST {
                            u32::from_be_bytes(bytes)
                        } else {
                            u32::from_le_bytes(bytes)
                        };
                        if depth == 32 { value } else { value | 0xff00_0000 }
                    }
                    1 => {
                        let byte = row[x / 8];
                        let bit = if setup.bitmap_format_bit_order == ImageOrder::MSB_FIRST {
                            (byte >> (7 - x % 8)) & 1
                        } else {
                            (byte >> (x % 8)) & 1
                        };
                        if bit != 0 { 0xffff_ffff } else { 0 }
                    }
                    other => {
                        debug!("Unsupported pixmap format: depth {} at {} bpp", depth, other);
                        return None;
                    }
                };
                pixels.push(pixel);
            }
        }

        Some(ArgbImage { width, height, pixels })
    }
}

impl<C: Connection> Backend for X11Backend<C> {
    fn root(&self) -> WindowId {
        self.root
    }

    fn get_property(&self, window: WindowId, prop: Prop) -> Result<Option<PropertyValue>> {
        let reply = self
            .conn
            .get_property(false, window, self.atoms.prop(prop), AtomEnum::ANY, 0, MAX_PROPERTY_WORDS)?
            .reply()?;

        if reply.type_ == x11rb::NONE {
            return Ok(None);
        }

        let value = match reply.format {
            8 if reply.type_ == self.atoms.utf8_string => PropertyValue::Utf8(reply.value),
            8 => PropertyValue::Latin1(reply.value),
            16 => {
                let words = reply
                    .value16()
                    .ok_or_else(|| Error::malformed(prop.atom_name(), "bad 16-bit data"))?;
                PropertyValue::Cardinals(words.map(u32::from).collect())
            }
            32 => {
                let words: Vec<u32> = reply
                    .value32()
                    .ok_or_else(|| Error::malformed(prop.atom_name(), "bad 32-bit data"))?
                    .collect();
                if reply.type_ == u32::from(AtomEnum::ATOM) {
                    PropertyValue::Atoms(self.atom_names(&words)?)
                } else if reply.type_ == u32::from(AtomEnum::WINDOW) {
                    PropertyValue::Windows(words)
                } else {
                    PropertyValue::Cardinals(words)
                }
            }
            other => {
                return Err(Error::malformed(prop.atom_name(), format!("format {}", other)));
            }
        };

        Ok(Some(value))
    }

    fn set_property(&self, window: WindowId, prop: Prop, value: &PropertyValue) -> Result<()> {
        let atom = self.atoms.prop(prop);
        let mode = PropMode::REPLACE;

        let cookie = match value {
            PropertyValue::Latin1(bytes) => {
                self.conn.change_property8(mode, window, atom, AtomEnum::STRING, bytes)?
            }
            PropertyValue::Utf8(bytes) => {
                self.conn.change_property8(mode, window, atom, self.atoms.utf8_string, bytes)?
            }
            PropertyValue::Cardinals(words) => {
                self.conn.change_property32(mode, window, atom, self.atoms.cardinal_type(prop), words)?
            }
            PropertyValue::Windows(windows) => {
                self.conn.change_property32(mode, window, atom, AtomEnum::WINDOW, windows)?
            }
            PropertyValue::Atoms(names) => {
                let atoms = self.intern_names(names)?;
                self.conn.change_property32(mode, window, atom, AtomEnum::ATOM, &atoms)?
            }
        };
        cookie.check()?;

        Ok(())
    }

    fn override_redirect(&self, window: WindowId) -> Result<bool> {
        Ok(self.conn.get_window_attributes(window)?.reply()?.override_redirect)
    }

    fn send_root_message(&self, window: WindowId, message: Prop, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent::new(32, window, self.atoms.prop(message), data);

        self.conn
            .send_event(
                false,
                self.root,
                EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
                event,
            )?
            .check()?;

        Ok(())
    }

    fn pixmap_image(&self, pixmap: u32) -> Result<Option<ArgbImage>> {
        let geometry = self.conn.get_geometry(pixmap)?.reply()?;
        if geometry.width == 0 || geometry.height == 0 {
            return Ok(None);
        }

        let image = self
            .conn
            .get_image(
                ImageFormat::Z_PIXMAP,
                pixmap,
                0,
                0,
                geometry.width,
                geometry.height,
                !0,
            )?
            .reply()?;

        Ok(self.decode_image(geometry.depth, geometry.width, geometry.height, &image.data))
    }

    fn grab_server(&self) -> Result<()> {
        self.conn.grab_server()?.check()?;
        Ok(())
    }

    fn ungrab_server(&self) -> Result<()> {
        self.conn.ungrab_server()?;
        self.conn.flush()?;
        Ok(())
    }
}
