//! The repeater controller.
//!
//! Owns the block container and is the only thing that mutates it. Every
//! mutation is staged on a copy, reindexed, and committed only when all of
//! its steps succeed, so a failed fetch or render leaves the list exactly as
//! it was.
//!
//! ```no_run
//! # async fn example() -> Result<(), repeater_engine::RepeaterError> {
//! use repeater_engine::{BlockListController, Command, HttpBlockSource, Options};
//!
//! let source = HttpBlockSource::new("https://example.test/repeater")?;
//! let mut controller = BlockListController::initialize(
//!     Options { required: true, min: None, max: Some(5) },
//!     "addresses",
//!     source,
//!     &serde_json::json!([]),
//!     r#"<div class="repeater-item">{{ content }}</div>"#,
//! )
//! .await?;
//!
//! controller
//!     .dispatch(Command::RequestAddBlocks { count: 1, after: None })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::chrome::{ChromeActivation, NoChrome};
use crate::error::{CardinalityViolation, RepeaterError};
use crate::models::{Block, BlockId, Container, FieldDiagnostic};
use crate::options::Options;
use crate::reorder::{DragReorderAdapter, Dropped};
use crate::source::BlockSource;
use crate::template::{BlockTemplate, TemplateRenderer};

/// A structural change requested by the user or by the minimum policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch `count` new blocks and insert them after `after`, or at the end.
    RequestAddBlocks {
        count: usize,
        after: Option<BlockId>,
    },
    DeleteBlock(BlockId),
    /// Adopt a new order, first block first.
    Reorder(Vec<BlockId>),
}

/// What a successfully dispatched command changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Vec<BlockId>),
    Deleted(BlockId),
    Reordered,
}

pub struct BlockListController<S, R = BlockTemplate> {
    field_name: String,
    options: Options,
    source: S,
    renderer: Option<R>,
    chrome: Box<dyn ChromeActivation>,
    container: Container,
    diagnostics: Vec<FieldDiagnostic>,
    populated: bool,
}

impl<S: BlockSource> BlockListController<S, BlockTemplate> {
    /// Compile `template_source`, then populate from the source and apply the
    /// minimum policy.
    pub async fn initialize(
        options: Options,
        field_name: impl Into<String>,
        source: S,
        persisted_value: &serde_json::Value,
        template_source: &str,
    ) -> Result<Self, RepeaterError> {
        let renderer = BlockTemplate::compile(template_source)?;
        let mut controller = Self::new(field_name, options, source, renderer)?;
        controller.populate(persisted_value).await?;
        Ok(controller)
    }
}

impl<S: BlockSource, R: TemplateRenderer> BlockListController<S, R> {
    pub fn new(
        field_name: impl Into<String>,
        options: Options,
        source: S,
        renderer: R,
    ) -> Result<Self, RepeaterError> {
        options.validate()?;
        Ok(Self {
            field_name: field_name.into(),
            options,
            source,
            renderer: Some(renderer),
            chrome: Box::new(NoChrome),
            container: Container::new(),
            diagnostics: Vec::new(),
            populated: false,
        })
    }

    pub fn with_chrome(mut self, chrome: impl ChromeActivation + 'static) -> Self {
        self.chrome = Box::new(chrome);
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn blocks(&self) -> &[Block] {
        self.container.blocks()
    }

    pub fn len(&self) -> usize {
        self.container.len()
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    /// Fields whose names could not be derived at the last reindex.
    pub fn diagnostics(&self) -> &[FieldDiagnostic] {
        &self.diagnostics
    }

    pub fn is_connected(&self) -> bool {
        self.renderer.is_some()
    }

    /// Load the blocks for `persisted_value`, then top up to the minimum.
    ///
    /// Items beyond `max` are dropped. Returns the ids of every block added,
    /// including those synthesized by the minimum policy. Runs once per
    /// controller; a failed initial fetch may be retried.
    pub async fn populate(
        &mut self,
        persisted_value: &serde_json::Value,
    ) -> Result<Vec<BlockId>, RepeaterError> {
        self.renderer()?;
        if self.populated {
            return Err(RepeaterError::AlreadyPopulated);
        }

        let mut items = self
            .source
            .fetch_initial(&self.field_name, persisted_value)
            .await
            .inspect_err(|e| log::warn!("Fetching blocks for {} failed: {e}", self.field_name))?;

        if let Some(capacity) = self.options.capacity(self.container.len())
            && items.len() > capacity
        {
            log::debug!(
                "Dropping {} block(s) beyond the maximum of {:?}",
                items.len() - capacity,
                self.options.max
            );
            items.truncate(capacity);
        }

        let mut staged = self.container.clone();
        let mut added = Vec::with_capacity(items.len());
        for item in items {
            let block = Block::new(item.concat());
            added.push(block.id());
            staged.push(block);
        }
        self.commit(staged)?;
        self.populated = true;
        self.activate_chrome(&added);

        added.extend(self.enforce_minimum().await?);
        Ok(added)
    }

    /// Synthesize one add request covering any shortfall below the minimum.
    ///
    /// Whatever the source returns is kept. If that still leaves the list
    /// short, `BelowMinimum` is returned and a later call may top it up.
    pub async fn enforce_minimum(&mut self) -> Result<Vec<BlockId>, RepeaterError> {
        let shortfall = self.options.shortfall(self.container.len());
        if shortfall == 0 {
            return Ok(Vec::new());
        }

        log::debug!(
            "{} has {} block(s), requesting {shortfall} more",
            self.field_name,
            self.container.len()
        );
        let added = match self
            .dispatch(Command::RequestAddBlocks {
                count: shortfall,
                after: None,
            })
            .await?
        {
            Outcome::Added(ids) => ids,
            _ => Vec::new(),
        };

        let len = self.container.len();
        if let Some(min) = self.options.floor()
            && len < min
        {
            return Err(self.reject(CardinalityViolation::BelowMinimum { min, len }));
        }
        Ok(added)
    }

    /// Entry point for every structural change, user-triggered or synthesized.
    pub async fn dispatch(&mut self, command: Command) -> Result<Outcome, RepeaterError> {
        match command {
            Command::RequestAddBlocks { count, after } => {
                self.add(count, after).await.map(Outcome::Added)
            }
            Command::DeleteBlock(id) => self.delete(id).map(|()| Outcome::Deleted(id)),
            Command::Reorder(order) => self.reorder(&order).map(|()| Outcome::Reordered),
        }
    }

    /// Fetch `count` blank blocks and insert them as one run after `after`,
    /// or at the end.
    pub async fn add(
        &mut self,
        count: usize,
        after: Option<BlockId>,
    ) -> Result<Vec<BlockId>, RepeaterError> {
        self.renderer()?;

        let existing = self.container.len();
        if let Some(max) = self.options.max
            && existing >= max
        {
            return Err(self.reject(CardinalityViolation::MaxReached { max }));
        }
        if let Some(anchor) = after
            && self.container.index_of(anchor).is_none()
        {
            return Err(RepeaterError::UnknownBlock(anchor));
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut items = self
            .source
            .fetch_new(&self.field_name, existing, count)
            .await
            .inspect_err(|e| {
                log::warn!("Fetching new blocks for {} failed: {e}", self.field_name)
            })?;

        if let Some(capacity) = self.options.capacity(existing)
            && items.len() > capacity
        {
            log::debug!("Truncating add batch of {} to {capacity}", items.len());
            items.truncate(capacity);
        }

        let blocks: Vec<Block> = items.iter().map(|item| Block::new(item.concat())).collect();
        let added: Vec<BlockId> = blocks.iter().map(Block::id).collect();

        let index = after
            .and_then(|anchor| self.container.index_of(anchor))
            .map_or(existing, |i| i + 1);
        let mut staged = self.container.clone();
        staged.insert_run(index, blocks);
        self.commit(staged)?;
        self.activate_chrome(&added);

        Ok(added)
    }

    pub fn delete(&mut self, id: BlockId) -> Result<(), RepeaterError> {
        self.renderer()?;

        if let Some(min) = self.options.floor()
            && self.container.len() <= min
        {
            return Err(self.reject(CardinalityViolation::MinReached { min }));
        }

        let mut staged = self.container.clone();
        staged.remove(id).ok_or(RepeaterError::UnknownBlock(id))?;
        self.commit(staged)
    }

    /// Adopt `order` as the canonical order. It must list every block once.
    pub fn reorder(&mut self, order: &[BlockId]) -> Result<(), RepeaterError> {
        self.renderer()?;

        let mut staged = self.container.clone();
        staged.rearrange(order)?;
        self.commit(staged)
    }

    /// React to a completed drag by reading the arrangement the adapter now shows.
    pub fn handle_drop(
        &mut self,
        _dropped: Dropped,
        adapter: &dyn DragReorderAdapter,
    ) -> Result<(), RepeaterError> {
        let order = adapter.read_order();
        self.reorder(&order)
    }

    /// Recompute positions, count labels and field names in current order.
    pub fn reindex(&mut self) -> Result<&[FieldDiagnostic], RepeaterError> {
        let staged = self.container.clone();
        self.commit(staged)?;
        Ok(&self.diagnostics)
    }

    /// Discard every block and release the compiled template.
    pub fn disconnect(&mut self) {
        self.container.clear();
        self.diagnostics.clear();
        self.renderer = None;
    }

    fn renderer(&self) -> Result<&R, RepeaterError> {
        self.renderer.as_ref().ok_or(RepeaterError::Disconnected)
    }

    fn activate_chrome(&mut self, inserted: &[BlockId]) {
        if !inserted.is_empty() {
            self.chrome.activate(inserted);
        }
    }

    fn reject(&self, violation: CardinalityViolation) -> RepeaterError {
        log::warn!("{}: {violation}", self.field_name);
        violation.into()
    }

    fn commit(&mut self, mut staged: Container) -> Result<(), RepeaterError> {
        let renderer = self.renderer()?;
        let diagnostics = staged.reindex(&self.field_name, renderer)?;
        for diagnostic in &diagnostics {
            log::warn!(
                "{} block {}: {}",
                self.field_name,
                diagnostic.position,
                diagnostic.error
            );
        }
        self.container = staged;
        self.diagnostics = diagnostics;
        Ok(())
    }
}
