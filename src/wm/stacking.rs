//! Stacking Module
//!
//! Managed windows in mapping order and stacking order, published as
//! `_NET_CLIENT_LIST` and `_NET_CLIENT_LIST_STACKING`.
//!
//! Both orders are overlays on a single entry list, so a window is either in
//! both or in neither. Every mutation republishes both lists inside one
//! server grab; no client ever sees the two lists disagree.

use tracing::{debug, warn};

use crate::wm::backend::{Backend, Prop, PropertyValue, WindowId};

#[derive(Debug, Clone, Copy)]
struct Entry {
    window: WindowId,
    /// Higher ranks stack above lower ones.
    rank: i64,
}

/// Registry of managed clients.
#[derive(Debug, Default)]
pub struct ClientOrder {
    /// Mapping order, oldest first.
    entries: Vec<Entry>,
    top: i64,
    bottom: i64,
}

impl ClientOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.position(window).is_some()
    }

    fn position(&self, window: WindowId) -> Option<usize> {
        self.entries.iter().position(|e| e.window == window)
    }

    /// Windows in the order they became managed.
    pub fn mapping_order(&self) -> Vec<WindowId> {
        self.entries.iter().map(|e| e.window).collect()
    }

    /// Windows bottom to top.
    pub fn stacking_order(&self) -> Vec<WindowId> {
        let mut stack = self.entries.clone();
        stack.sort_by_key(|e| e.rank);
        stack.into_iter().map(|e| e.window).collect()
    }

    /// Start tracking `window` on top of the stack. Returns false if it is
    /// already managed.
    pub fn on_manage<B: Backend + ?Sized>(&mut self, conn: &B, window: WindowId) -> bool {
        if self.contains(window) {
            debug!("Window 0x{:x} is already managed", window);
            return false;
        }
        self.top += 1;
        self.entries.push(Entry { window, rank: self.top });
        self.publish(conn);
        true
    }

    /// Forget `window`. Returns false if it was not managed.
    pub fn on_unmanage<B: Backend + ?Sized>(&mut self, conn: &B, window: WindowId) -> bool {
        let Some(pos) = self.position(window) else {
            return false;
        };
        self.entries.remove(pos);
        self.publish(conn);
        true
    }

    pub fn on_raise<B: Backend + ?Sized>(&mut self, conn: &B, window: WindowId) -> bool {
        let Some(pos) = self.position(window) else {
            return false;
        };
        if self.entries[pos].rank != self.top {
            self.top += 1;
            self.entries[pos].rank = self.top;
        }
        self.publish(conn);
        true
    }

    pub fn on_lower<B: Backend + ?Sized>(&mut self, conn: &B, window: WindowId) -> bool {
        let Some(pos) = self.position(window) else {
            return false;
        };
        if self.entries[pos].rank != self.bottom {
            self.bottom -= 1;
            self.entries[pos].rank = self.bottom;
        }
        self.publish(conn);
        true
    }

    /// Write `_NET_CLIENT_LIST` in one request.
    pub fn publish_mapping_list<B: Backend + ?Sized>(&self, conn: &B) {
        write_list(conn, Prop::NetClientList, self.mapping_order());
    }

    /// Write `_NET_CLIENT_LIST_STACKING` in one request.
    pub fn publish_stacking_list<B: Backend + ?Sized>(&self, conn: &B) {
        write_list(conn, Prop::NetClientListStacking, self.stacking_order());
    }

    fn publish<B: Backend + ?Sized>(&self, conn: &B) {
        let grabbed = match conn.grab_server() {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to grab server for client list update: {}", e);
                false
            }
        };

        self.publish_mapping_list(conn);
        self.publish_stacking_list(conn);

        if grabbed {
            if let Err(e) = conn.ungrab_server() {
                warn!("Failed to ungrab server: {}", e);
            }
        }
    }
}

fn write_list<B: Backend + ?Sized>(conn: &B, prop: Prop, windows: Vec<WindowId>) {
    let count = windows.len();
    match conn.set_property(conn.root(), prop, &PropertyValue::Windows(windows)) {
        Ok(()) => debug!("Updated {} with {} windows", prop.atom_name(), count),
        Err(e) => warn!("Failed to update {}: {}", prop.atom_name(), e),
    }
}
