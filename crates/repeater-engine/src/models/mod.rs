pub mod block;
pub mod container;

pub use block::{Block, BlockId, FieldDiagnostic, NestedField};
pub use container::Container;
