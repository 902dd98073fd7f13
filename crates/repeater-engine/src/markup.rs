//! Markup conventions shared with the host page.
//!
//! A nested field is any element carrying `data-repeater-name-key`. Its
//! `name` attribute is owned by the repeater and rewritten on every reindex,
//! as is the `data-sort` attribute of the block's root element.

use lol_html::errors::RewritingError;
use lol_html::{RewriteStrSettings, element, rewrite_str};

/// Attribute holding a nested field's name pattern.
pub const NAME_KEY_ATTR: &str = "data-repeater-name-key";

/// Attribute holding a block's sortable order.
pub const SORT_ATTR: &str = "data-sort";

const NAME_ATTR: &str = "name";

/// The repeater-owned attributes of one nested field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAttributes {
    pub pattern: String,
    pub name: Option<String>,
}

/// The repeater-owned attributes of a rendered block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAttributes {
    /// `data-sort` of the root element.
    pub sort: Option<String>,
    /// Nested fields in document order.
    pub fields: Vec<FieldAttributes>,
}

fn field_selector() -> String {
    format!("[{NAME_KEY_ATTR}]")
}

fn decode_pattern(raw: Option<String>) -> String {
    raw.map(|value| html_escape::decode_html_entities(&value).into_owned())
        .unwrap_or_default()
}

/// Stamp `sort_key` onto the root element and a name onto every nested field.
///
/// `name_for` is called once per field with its pattern, in document order.
/// `None` strips any existing name so a field whose pattern failed never
/// keeps a stale one. Every other attribute is left untouched.
pub fn stamp_block<F>(
    markup: &str,
    sort_key: usize,
    mut name_for: F,
) -> Result<String, RewritingError>
where
    F: FnMut(String) -> Option<String>,
{
    let sort_value = sort_key.to_string();
    let mut root_seen = false;

    rewrite_str(
        markup,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("*", |el| {
                    if !root_seen {
                        root_seen = true;
                        el.set_attribute(SORT_ATTR, &sort_value)?;
                    }
                    Ok(())
                }),
                element!(field_selector(), |el| {
                    let pattern = decode_pattern(el.get_attribute(NAME_KEY_ATTR));
                    match name_for(pattern) {
                        Some(name) => el.set_attribute(NAME_ATTR, &name)?,
                        None => el.remove_attribute(NAME_ATTR),
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
}

/// Read back the repeater-owned attributes of `markup`.
pub fn inspect(markup: &str) -> Result<BlockAttributes, RewritingError> {
    let mut sort = None;
    let mut root_seen = false;
    let mut fields = Vec::new();

    rewrite_str(
        markup,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("*", |el| {
                    if !root_seen {
                        root_seen = true;
                        sort = el.get_attribute(SORT_ATTR);
                    }
                    Ok(())
                }),
                element!(field_selector(), |el| {
                    fields.push(FieldAttributes {
                        pattern: decode_pattern(el.get_attribute(NAME_KEY_ATTR)),
                        name: el.get_attribute(NAME_ATTR),
                    });
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;

    Ok(BlockAttributes { sort, fields })
}
