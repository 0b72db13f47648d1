//! `_NET_WM_STATE` as a set of tags.
//!
//! The property is a list, but readers only ever see each tag once and
//! `add` does not append a tag that is already present. A naive
//! read-append-write would duplicate tags on repeated requests.

use crate::wm::backend::{Backend, Prop, PropertyValue, WindowId};
use crate::wm::error::Result;
use crate::wm::properties::{Properties, decode_atoms};

pub const SKIP_TASKBAR: &str = "_NET_WM_STATE_SKIP_TASKBAR";
pub const SKIP_PAGER: &str = "_NET_WM_STATE_SKIP_PAGER";
pub const FULLSCREEN: &str = "_NET_WM_STATE_FULLSCREEN";
pub const MAXIMIZED_VERT: &str = "_NET_WM_STATE_MAXIMIZED_VERT";
pub const MAXIMIZED_HORZ: &str = "_NET_WM_STATE_MAXIMIZED_HORZ";
pub const HIDDEN: &str = "_NET_WM_STATE_HIDDEN";
pub const DEMANDS_ATTENTION: &str = "_NET_WM_STATE_DEMANDS_ATTENTION";

pub struct ExtendedState<'c, B: Backend + ?Sized> {
    props: Properties<'c, B>,
}

impl<'c, B: Backend + ?Sized> ExtendedState<'c, B> {
    pub fn new(conn: &'c B) -> Self {
        Self {
            props: Properties::new(conn),
        }
    }

    /// Current tags in stored order, duplicates collapsed. Empty when the
    /// property is missing or unreadable.
    pub fn get(&self, window: WindowId) -> Result<Vec<String>> {
        let tags = self
            .props
            .read_as(window, Prop::NetWmState, decode_atoms)?
            .unwrap_or_default();

        let mut unique: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        Ok(unique)
    }

    pub fn contains(&self, window: WindowId, tag: &str) -> Result<bool> {
        Ok(self.get(window)?.iter().any(|t| t == tag))
    }

    /// Append `tag` unless already present.
    pub fn add(&self, window: WindowId, tag: &str) -> Result<()> {
        let mut tags = self.get(window)?;
        if tags.iter().any(|t| t == tag) {
            return Ok(());
        }
        tags.push(tag.to_string());
        self.props.write(window, Prop::NetWmState, PropertyValue::Atoms(tags));
        Ok(())
    }

    /// Drop `tag`; a tag that is not set is left alone.
    pub fn remove(&self, window: WindowId, tag: &str) -> Result<()> {
        let mut tags = self.get(window)?;
        let Some(pos) = tags.iter().position(|t| t == tag) else {
            return Ok(());
        };
        tags.remove(pos);
        self.props.write(window, Prop::NetWmState, PropertyValue::Atoms(tags));
        Ok(())
    }
}
