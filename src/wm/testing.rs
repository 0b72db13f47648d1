//! In-memory `Backend` for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use x11rb::errors::ConnectionError;

use crate::wm::backend::{ArgbImage, Backend, Prop, PropertyValue, WindowId};
use crate::wm::error::{Error, Result};

pub const ROOT: WindowId = 0x100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub window: WindowId,
    pub prop: Prop,
    pub value: PropertyValue,
    pub grabbed: bool,
}

#[derive(Default)]
pub struct FakeBackend {
    props: RefCell<HashMap<(WindowId, Prop), PropertyValue>>,
    override_redirect: RefCell<HashMap<WindowId, bool>>,
    pixmaps: RefCell<HashMap<u32, ArgbImage>>,
    /// Properties that answer with an X11 error instead of a value.
    broken: RefCell<Vec<(WindowId, Prop)>>,
    pub writes: RefCell<Vec<Write>>,
    pub messages: RefCell<Vec<(WindowId, Prop, [u32; 5])>>,
    grabbed: Cell<bool>,
    disconnected: Cell<bool>,
    reject_writes: Cell<bool>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, window: WindowId, prop: Prop, value: PropertyValue) -> Self {
        self.props.borrow_mut().insert((window, prop), value);
        self
    }

    pub fn put(&self, window: WindowId, prop: Prop, value: PropertyValue) {
        self.props.borrow_mut().insert((window, prop), value);
    }

    pub fn value(&self, window: WindowId, prop: Prop) -> Option<PropertyValue> {
        self.props.borrow().get(&(window, prop)).cloned()
    }

    pub fn set_override_redirect(&self, window: WindowId, value: bool) {
        self.override_redirect.borrow_mut().insert(window, value);
    }

    pub fn add_pixmap(&self, pixmap: u32, image: ArgbImage) {
        self.pixmaps.borrow_mut().insert(pixmap, image);
    }

    pub fn break_property(&self, window: WindowId, prop: Prop) {
        self.broken.borrow_mut().push((window, prop));
    }

    pub fn disconnect(&self) {
        self.disconnected.set(true);
    }

    pub fn reject_writes(&self) {
        self.reject_writes.set(true);
    }

    pub fn writes_to(&self, prop: Prop) -> Vec<Write> {
        self.writes
            .borrow()
            .iter()
            .filter(|w| w.prop == prop)
            .cloned()
            .collect()
    }

    fn connected(&self) -> Result<()> {
        if self.disconnected.get() {
            return Err(Error::Connection(ConnectionError::UnknownError));
        }
        Ok(())
    }
}

impl Backend for FakeBackend {
    fn root(&self) -> WindowId {
        ROOT
    }

    fn get_property(&self, window: WindowId, prop: Prop) -> Result<Option<PropertyValue>> {
        self.connected()?;
        if self.broken.borrow().contains(&(window, prop)) {
            return Err(Error::Request("BadWindow".into()));
        }
        Ok(self.value(window, prop))
    }

    fn set_property(&self, window: WindowId, prop: Prop, value: &PropertyValue) -> Result<()> {
        self.connected()?;
        if self.reject_writes.get() {
            return Err(Error::Request("BadAccess".into()));
        }
        self.put(window, prop, value.clone());
        self.writes.borrow_mut().push(Write {
            window,
            prop,
            value: value.clone(),
            grabbed: self.grabbed.get(),
        });
        Ok(())
    }

    fn override_redirect(&self, window: WindowId) -> Result<bool> {
        self.connected()?;
        self.override_redirect
            .borrow()
            .get(&window)
            .copied()
            .ok_or_else(|| Error::Request("BadWindow".into()))
    }

    fn send_root_message(&self, window: WindowId, message: Prop, data: [u32; 5]) -> Result<()> {
        self.connected()?;
        self.messages.borrow_mut().push((window, message, data));
        Ok(())
    }

    fn pixmap_image(&self, pixmap: u32) -> Result<Option<ArgbImage>> {
        self.connected()?;
        Ok(self.pixmaps.borrow().get(&pixmap).cloned())
    }

    fn grab_server(&self) -> Result<()> {
        self.connected()?;
        self.grabbed.set(true);
        Ok(())
    }

    fn ungrab_server(&self) -> Result<()> {
        self.grabbed.set(false);
        Ok(())
    }
}
