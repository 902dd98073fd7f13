use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::markup;
use crate::naming::{self, NameError};
use crate::template::{TemplateError, TemplateRenderer};

/// Handle to a block while it lives in a container.
///
/// Plays the role of the block's element reference; it is never serialized
/// into field names, which depend only on position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A form input inside a block whose name the repeater owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedField {
    pattern: String,
    name: Result<String, NameError>,
}

impl NestedField {
    fn derive(field_name: &str, position: usize, pattern: String) -> Self {
        let name = naming::field_name(field_name, position, &pattern);
        Self { pattern, name }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Current serialization name, absent when the pattern is malformed.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().ok()
    }

    pub fn diagnostic(&self) -> Option<&NameError> {
        self.name.as_ref().err()
    }
}

/// A nested field whose name could not be derived during a reindex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiagnostic {
    pub block: BlockId,
    pub position: usize,
    pub error: NameError,
}

/// One repeated unit of form inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    position: usize,
    content: String,
    markup: String,
    fields: Vec<NestedField>,
}

impl Block {
    /// A block holding `content`; positioned and rendered by the next reindex.
    pub(crate) fn new(content: String) -> Self {
        Self {
            id: BlockId::new(),
            position: 0,
            content,
            markup: String::new(),
            fields: Vec::new(),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The 1-based label shown to the user.
    pub fn count_label(&self) -> usize {
        self.position + 1
    }

    /// Server-rendered content this block was created from.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Rendered markup with nested field names stamped in.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn fields(&self) -> &[NestedField] {
        &self.fields
    }

    /// Move the block to `position` and re-derive everything that depends on it:
    /// the rendered markup, its `data-sort`, and every nested field name.
    pub(crate) fn restamp<R: TemplateRenderer + ?Sized>(
        &mut self,
        position: usize,
        field_name: &str,
        renderer: &R,
    ) -> Result<Vec<FieldDiagnostic>, TemplateError> {
        let rendered = renderer.render(&self.content, position, position + 1)?;

        let mut fields = Vec::new();
        let markup = markup::stamp_block(&rendered, position, |pattern| {
            let field = NestedField::derive(field_name, position, pattern);
            let name = field.name().map(str::to_string);
            fields.push(field);
            name
        })
        .map_err(|source| TemplateError::Markup {
            block_key: position,
            source,
        })?;

        let diagnostics = fields
            .iter()
            .filter_map(NestedField::diagnostic)
            .map(|error| FieldDiagnostic {
                block: self.id,
                position,
                error: error.clone(),
            })
            .collect();

        self.position = position;
        self.markup = markup;
        self.fields = fields;
        Ok(diagnostics)
    }
}
