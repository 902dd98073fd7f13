//! Serialization names for fields nested inside a block.
//!
//! A name pattern is a dotted path such as `address.street`. A trailing
//! separator (`tags.`) marks an array of values with no sub-key. Given the
//! repeater's field name and a block position the pattern expands to
//! bracket notation:
//!
//! ```
//! use repeater_engine::naming::field_name;
//!
//! assert_eq!(field_name("people", 2, "items.").unwrap(), "people[2][items][]");
//! assert_eq!(field_name("people", 0, "items.street").unwrap(), "people[0][items][street]");
//! ```

/// Path separator inside a name pattern.
pub const SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("empty name pattern")]
    Empty,
    #[error("name pattern {pattern:?} has an empty segment")]
    EmptySegment { pattern: String },
    #[error("name pattern {pattern:?} contains invalid character {found:?}")]
    InvalidCharacter { pattern: String, found: char },
}

/// A parsed name pattern: its key segments and whether it denotes an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    segments: Vec<String>,
    array: bool,
}

impl NamePattern {
    pub fn parse(pattern: &str) -> Result<Self, NameError> {
        if pattern.trim().is_empty() {
            return Err(NameError::Empty);
        }

        if let Some(found) = pattern
            .chars()
            .find(|c| matches!(c, '[' | ']' | '"') || c.is_whitespace())
        {
            return Err(NameError::InvalidCharacter {
                pattern: pattern.to_string(),
                found,
            });
        }

        let (body, array) = match pattern.strip_suffix(SEPARATOR) {
            Some(body) => (body, true),
            None => (pattern, false),
        };

        let segments: Vec<String> = body.split(SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(NameError::EmptySegment {
                pattern: pattern.to_string(),
            });
        }

        Ok(Self { segments, array })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    /// Expand into `container[position][seg1][seg2]...`, plus `[]` for arrays.
    pub fn expand(&self, container: &str, position: usize) -> String {
        let mut name = format!("{container}[{position}]");
        for segment in &self.segments {
            name.push('[');
            name.push_str(segment);
            name.push(']');
        }
        if self.array {
            name.push_str("[]");
        }
        name
    }
}

/// Compute the serialization name of one nested field.
pub fn field_name(container: &str, position: usize, pattern: &str) -> Result<String, NameError> {
    NamePattern::parse(pattern).map(|p| p.expand(container, position))
}
