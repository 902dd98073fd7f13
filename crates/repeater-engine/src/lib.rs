pub mod chrome;
pub mod controller;
pub mod error;
pub mod markup;
pub mod models;
pub mod naming;
pub mod options;
pub mod reorder;
pub mod source;
pub mod template;

// Re-export key types for easier usage
pub use chrome::{ChromeActivation, LogChrome, NoChrome};
pub use controller::{BlockListController, Command, Outcome};
pub use error::{CardinalityViolation, RepeaterError};
pub use models::{Block, BlockId, Container, FieldDiagnostic, NestedField};
pub use naming::{NameError, NamePattern, field_name};
pub use options::Options;
pub use reorder::{ArrangementAdapter, DragReorderAdapter, Dropped};
pub use source::{BlockSource, HttpBlockSource, MemoryBlockSource, RawContent, SourceError};
pub use template::{BlockTemplate, ContentTrust, TemplateError, TemplateRenderer};
