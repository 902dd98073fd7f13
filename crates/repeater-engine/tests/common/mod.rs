//! Shared fixtures for controller integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use repeater_engine::markup::{self, FieldAttributes};
use repeater_engine::{
    BlockId, BlockListController, BlockSource, BlockTemplate, ChromeActivation, MemoryBlockSource,
    Options, RawContent, TemplateRenderer, field_name,
};

pub const FIELD: &str = "people";

/// Block template without a `data-sort` placeholder; reindex stamps it.
pub const TEMPLATE: &str = concat!(
    r#"<div class="repeater-item">"#,
    r#"<span class="card-handle">#{{ block_count }}</span>{{ content }}</div>"#,
);

pub const BLANK: &str = concat!(
    r#"<input data-repeater-name-key="name">"#,
    r#"<select data-repeater-name-key="tags." multiple></select>"#,
);

/// Content for a stored block, recognisable by `label`.
pub fn stored(label: &str) -> RawContent {
    RawContent(vec![
        format!(r#"<input data-repeater-name-key="name" value="{label}">"#),
        r#"<input data-repeater-name-key="address.street">"#.to_string(),
    ])
}

pub fn source(labels: &[&str]) -> MemoryBlockSource {
    MemoryBlockSource::new(labels.iter().map(|l| stored(l)).collect(), BLANK)
}

pub fn controller(
    options: Options,
    source: MemoryBlockSource,
) -> BlockListController<MemoryBlockSource> {
    let renderer = BlockTemplate::compile(TEMPLATE).unwrap();
    BlockListController::new(FIELD, options, source, renderer).unwrap()
}

pub async fn populated(
    options: Options,
    labels: &[&str],
) -> BlockListController<MemoryBlockSource> {
    let mut controller = controller(options, source(labels));
    controller.populate(&serde_json::Value::Null).await.unwrap();
    controller
}

/// The `value="..."` label of each block, in current order. Blank blocks read as "".
pub fn labels<S: BlockSource, R: TemplateRenderer>(
    controller: &BlockListController<S, R>,
) -> Vec<String> {
    controller
        .blocks()
        .iter()
        .map(|block| {
            block
                .content()
                .split_once(r#"value=""#)
                .and_then(|(_, rest)| rest.split_once('"'))
                .map(|(label, _)| label.to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// Assert every invariant that must hold once an operation has completed.
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check<S: BlockSource, R: TemplateRenderer>(controller: &BlockListController<S, R>) {
    let options = controller.options();
    let len = controller.len();

    if let Some(max) = options.max {
        assert!(len <= max, "{len} blocks exceeds max {max}");
    }
    if let Some(floor) = options.floor() {
        assert!(len >= floor, "{len} blocks is below floor {floor}");
    }

    for (index, block) in controller.blocks().iter().enumerate() {
        assert_eq!(block.position(), index, "position gap at {index}");
        assert_eq!(block.count_label(), index + 1, "stale count label at {index}");
        assert!(
            block.markup().contains(&format!("#{}", index + 1)),
            "stale count label markup at {index}"
        );

        let expected: Vec<FieldAttributes> = block
            .fields()
            .iter()
            .map(|field| {
                let name = field_name(controller.field_name(), index, field.pattern()).ok();
                assert_eq!(
                    field.name().map(str::to_string),
                    name,
                    "stale name for {:?} at {index}",
                    field.pattern()
                );
                FieldAttributes {
                    pattern: field.pattern().to_string(),
                    name,
                }
            })
            .collect();

        // Parse the markup back so a corrupted tag cannot pass on a substring.
        let stamped = markup::inspect(block.markup()).unwrap();
        assert_eq!(
            stamped.sort,
            Some(index.to_string()),
            "stale sort attribute at {index}"
        );
        assert_eq!(stamped.fields, expected, "markup out of sync at {index}");
    }
}

/// Chrome activation that records every batch it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingChrome {
    pub batches: Arc<Mutex<Vec<Vec<BlockId>>>>,
}

impl ChromeActivation for RecordingChrome {
    fn activate(&mut self, inserted: &[BlockId]) {
        self.batches.lock().unwrap().push(inserted.to_vec());
    }
}
