use std::collections::HashSet;

use crate::error::RepeaterError;
use crate::models::{Block, BlockId, FieldDiagnostic};
use crate::template::{TemplateError, TemplateRenderer};

/// Ordered collection of blocks.
///
/// Order is significant: it is both the visual order and the index used in
/// every nested field name. Only the controller mutates a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    blocks: Vec<Block>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks in current order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(Block::id).collect()
    }

    pub(crate) fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Insert `blocks` as one contiguous run starting at `index`.
    pub(crate) fn insert_run(&mut self, index: usize, blocks: Vec<Block>) {
        let index = index.min(self.blocks.len());
        self.blocks.splice(index..index, blocks);
    }

    pub(crate) fn remove(&mut self, id: BlockId) -> Option<Block> {
        let index = self.index_of(id)?;
        Some(self.blocks.remove(index))
    }

    /// Adopt `order` as the canonical order.
    ///
    /// `order` must name every block exactly once.
    pub(crate) fn rearrange(&mut self, order: &[BlockId]) -> Result<(), RepeaterError> {
        if order.len() != self.blocks.len() {
            return Err(RepeaterError::InvalidOrder(format!(
                "expected {} blocks, got {}",
                self.blocks.len(),
                order.len()
            )));
        }

        let mut seen = HashSet::with_capacity(order.len());
        if let Some(dup) = order.iter().find(|id| !seen.insert(**id)) {
            return Err(RepeaterError::InvalidOrder(format!("block {dup} listed twice")));
        }

        let mut remaining = std::mem::take(&mut self.blocks);
        let mut arranged = Vec::with_capacity(remaining.len());
        for id in order {
            let Some(index) = remaining.iter().position(|b| b.id() == *id) else {
                self.blocks = restore(arranged, remaining);
                return Err(RepeaterError::UnknownBlock(*id));
            };
            arranged.push(remaining.remove(index));
        }
        self.blocks = arranged;
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Walk the blocks in order, assigning positions, count labels and field names.
    ///
    /// Depends only on content, order and `field_name`, so repeated calls
    /// without a structural change produce identical output.
    pub(crate) fn reindex<R: TemplateRenderer + ?Sized>(
        &mut self,
        field_name: &str,
        renderer: &R,
    ) -> Result<Vec<FieldDiagnostic>, TemplateError> {
        let mut diagnostics = Vec::new();
        for (position, block) in self.blocks.iter_mut().enumerate() {
            diagnostics.extend(block.restamp(position, field_name, renderer)?);
        }
        Ok(diagnostics)
    }
}

// Undo a partial rearrange, keeping the original relative order.
fn restore(mut arranged: Vec<Block>, remaining: Vec<Block>) -> Vec<Block> {
    arranged.extend(remaining);
    arranged.sort_by_key(Block::position);
    arranged
}
