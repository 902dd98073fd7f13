//! Drag-to-reorder boundary.
//!
//! A drag adapter reports that a drop happened and nothing more. After a drop
//! the controller asks the adapter for the arrangement it now shows and adopts
//! that as the canonical order.

use crate::models::BlockId;

/// Notification that a drag gesture completed. Carries no ordering data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dropped;

pub trait DragReorderAdapter {
    /// Whether a drag starting on `handle` may move its block.
    fn is_drag_handle(&self, handle: &str) -> bool;

    /// The arrangement currently shown, first block first.
    fn read_order(&self) -> Vec<BlockId>;
}

/// Default drag-handle class.
pub const DEFAULT_HANDLE_CLASS: &str = "card-handle";

/// Drag adapter over a mirrored arrangement of block ids.
///
/// The host keeps it in sync with the container after structural changes,
/// moves the carried block while a gesture is in progress, and forwards the
/// [`Dropped`] notice to the controller on release.
#[derive(Debug, Clone)]
pub struct ArrangementAdapter {
    handle_class: String,
    order: Vec<BlockId>,
    carried: Option<BlockId>,
}

impl ArrangementAdapter {
    pub fn new(handle_class: impl Into<String>) -> Self {
        Self {
            handle_class: handle_class.into(),
            order: Vec::new(),
            carried: None,
        }
    }

    /// Mirror the container's order. Cancels any gesture in progress.
    pub fn sync(&mut self, order: impl IntoIterator<Item = BlockId>) {
        self.order = order.into_iter().collect();
        self.carried = None;
    }

    /// Start dragging `block` from `handle`; refused unless `handle` is a drag handle.
    pub fn pick_up(&mut self, block: BlockId, handle: &str) -> bool {
        if !self.is_drag_handle(handle) || !self.order.contains(&block) {
            return false;
        }
        self.carried = Some(block);
        true
    }

    pub fn carried(&self) -> Option<BlockId> {
        self.carried
    }

    /// Move the carried block to `index`, clamped to the arrangement.
    pub fn move_to(&mut self, index: usize) {
        let Some(block) = self.carried else {
            return;
        };
        let Some(from) = self.order.iter().position(|id| *id == block) else {
            return;
        };
        let id = self.order.remove(from);
        let to = index.min(self.order.len());
        self.order.insert(to, id);
    }

    /// Move the carried block by `delta` places.
    pub fn shift(&mut self, delta: isize) {
        let Some(block) = self.carried else {
            return;
        };
        if let Some(from) = self.order.iter().position(|id| *id == block) {
            self.move_to(from.saturating_add_signed(delta));
        }
    }

    /// End the gesture. Yields a drop notice only if a block was carried.
    pub fn release(&mut self) -> Option<Dropped> {
        self.carried.take().map(|_| Dropped)
    }
}

impl Default for ArrangementAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLE_CLASS)
    }
}

impl DragReorderAdapter for ArrangementAdapter {
    fn is_drag_handle(&self, handle: &str) -> bool {
        handle
            .split_whitespace()
            .any(|class| class == self.handle_class)
    }

    fn read_order(&self) -> Vec<BlockId> {
        self.order.clone()
    }
}
