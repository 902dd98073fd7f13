//! Block template compilation and rendering.
//!
//! Templates are minijinja sources with three variables in scope:
//! `content` (the block's server-rendered markup), `block_key` (0-based
//! position) and `block_count` (1-based label).

use minijinja::{AutoEscape, Environment, context};
use serde::{Deserialize, Serialize};

const TEMPLATE_NAME: &str = "block";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to compile block template: {0}")]
    Compile(#[source] minijinja::Error),
    #[error("Failed to render block {block_key}: {source}")]
    Render {
        block_key: usize,
        #[source]
        source: minijinja::Error,
    },
    #[error("Failed to stamp block {block_key}: {source}")]
    Markup {
        block_key: usize,
        #[source]
        source: lol_html::errors::RewritingError,
    },
}

/// How far block content is trusted when interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTrust {
    /// Content is server-rendered markup and is inserted verbatim.
    #[default]
    Trusted,
    /// Content is HTML-escaped before interpolation.
    Escaped,
}

/// Renders one block's markup.
pub trait TemplateRenderer {
    fn render(
        &self,
        content: &str,
        block_key: usize,
        block_count: usize,
    ) -> Result<String, TemplateError>;
}

/// A block template compiled once at initialization.
pub struct BlockTemplate {
    env: Environment<'static>,
    trust: ContentTrust,
}

impl BlockTemplate {
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        Self::compile_with_trust(source, ContentTrust::default())
    }

    pub fn compile_with_trust(source: &str, trust: ContentTrust) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        // Escaping is decided by `trust`, not by the engine.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template_owned(TEMPLATE_NAME, source.to_string())
            .map_err(TemplateError::Compile)?;
        Ok(Self { env, trust })
    }

    pub fn trust(&self) -> ContentTrust {
        self.trust
    }
}

impl TemplateRenderer for BlockTemplate {
    fn render(
        &self,
        content: &str,
        block_key: usize,
        block_count: usize,
    ) -> Result<String, TemplateError> {
        let content = match self.trust {
            ContentTrust::Trusted => content.to_string(),
            ContentTrust::Escaped => html_escape::encode_text(content).into_owned(),
        };

        self.env
            .get_template(TEMPLATE_NAME)
            .and_then(|template| {
                template.render(context! {
                    content => content,
                    block_key => block_key,
                    block_count => block_count,
                })
            })
            .map_err(|source| TemplateError::Render { block_key, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str =
        r#"<div class="repeater-item" data-sort="{{ block_key }}"><b>#{{ block_count }}</b>{{ content }}</div>"#;

    #[test]
    fn test_render_interpolates_all_variables() {
        let template = BlockTemplate::compile(SOURCE).unwrap();
        let html = template.render("<input data-repeater-name-key=\"a\">", 2, 3).unwrap();
        assert_eq!(
            html,
            r#"<div class="repeater-item" data-sort="2"><b>#3</b><input data-repeater-name-key="a"></div>"#
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = BlockTemplate::compile(SOURCE).unwrap();
        assert_eq!(
            template.render("<p>x</p>", 0, 1).unwrap(),
            template.render("<p>x</p>", 0, 1).unwrap()
        );
    }

    #[test]
    fn test_escaped_trust_encodes_content() {
        let template =
            BlockTemplate::compile_with_trust("{{ content }}", ContentTrust::Escaped).unwrap();
        assert_eq!(template.trust(), ContentTrust::Escaped);
        assert_eq!(
            template.render("<script>x</script>", 0, 1).unwrap(),
            "&lt;script&gt;x&lt;/script&gt;"
        );
    }

    #[test]
    fn test_compile_error() {
        let result = BlockTemplate::compile("{% if %}");
        assert!(matches!(result, Err(TemplateError::Compile(_))));
    }

    #[test]
    fn test_render_error_reports_block_key() {
        let template =
            BlockTemplate::compile("{% if block_key > 3 %}{{ content.missing.deeper }}{% endif %}")
                .unwrap();

        assert_eq!(template.render("x", 0, 1).unwrap(), "");
        let err = template.render("x", 4, 5).unwrap_err();
        assert!(matches!(err, TemplateError::Render { block_key: 4, .. }));
    }
}
