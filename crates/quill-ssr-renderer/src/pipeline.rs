//! Server-side rendering of editor documents.
//!
//! The pipeline runs in three stages:
//!
//! 1. embeds that must stand on their own are promoted to blocks,
//! 2. the delta is converted group by group, merging inline spoiler runs in
//!    every inline group that contains one,
//! 3. empty paragraphs in the assembled output are tagged.
//!
//! Stage 3 runs after stage 2 because the spoiler merge re-serializes the
//! group's HTML and would otherwise undo the `empty` class.

use quill_ssr_common::{EmbedStyles, RenderConfig, SsrError};
use serde_json::Value;
use smol_str::SmolStr;

use crate::classify::should_render_as_block;
use crate::converter::{ConverterOptions, DeltaConverter, GroupKind, RenderHooks};
use crate::delta::{DeltaInput, Operation, RENDER_AS_BLOCK};
use crate::embeds::render_custom_op;
use crate::normalize::mark_empty_paragraphs;
use crate::spoilers::{SPOILER_CLASS, compact_spoilers};

/// Class given to code blocks so the client highlighter picks them up.
pub const CODE_BLOCK_CLASS: &str = "ql-syntax";

/// Attribute the editor puts on inline spoiler text.
pub const SPOILER_ATTRIBUTE: &str = "inline-spoilers";

/// Converts editor deltas into static HTML.
#[derive(Debug, Clone, Default)]
pub struct SsrConverter {
    config: RenderConfig,
}

/// A converter with the default render configuration.
pub fn get_ssr_converter() -> SsrConverter {
    SsrConverter::default()
}

impl SsrConverter {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn convert(&self, input: &DeltaInput) -> String {
        let ops: Vec<Operation> = input.ops().iter().map(promote_block_embed).collect();
        let options = ConverterOptions {
            multi_line_paragraph: false,
            multi_line_blockquote: false,
            ..ConverterOptions::default()
        };
        let hooks = SsrHooks {
            styles: &self.config.embeds,
        };
        let html = DeltaConverter::new(ops, options).with_hooks(hooks).convert();
        mark_empty_paragraphs(&html)
    }

    /// Convert a delta given as JSON text.
    pub fn convert_json(&self, json: &str) -> Result<String, SsrError> {
        Ok(self.convert(&DeltaInput::from_json(json)?))
    }

    /// Convert a delta given as a parsed JSON value.
    pub fn convert_value(&self, value: Value) -> Result<String, SsrError> {
        Ok(self.convert(&DeltaInput::from_value(value)?))
    }
}

/// Copy of `op` flagged to render as a block when its embed requires it.
fn promote_block_embed(op: &Operation) -> Operation {
    if should_render_as_block(op) {
        op.with_attribute(RENDER_AS_BLOCK, Value::Bool(true))
    } else {
        op.clone()
    }
}

struct SsrHooks<'a> {
    styles: &'a EmbedStyles,
}

impl RenderHooks for SsrHooks<'_> {
    fn custom_css_class(&self, op: &Operation) -> Option<SmolStr> {
        if !op.is_text() {
            return None;
        }
        if op.has_attr("code-block") {
            Some(SmolStr::new_static(CODE_BLOCK_CLASS))
        } else if op.has_attr(SPOILER_ATTRIBUTE) {
            Some(SmolStr::new_static(SPOILER_CLASS))
        } else {
            None
        }
    }

    fn render_custom(&self, op: &Operation) -> String {
        render_custom_op(op, self.styles)
    }

    fn after_render(&self, kind: GroupKind, html: String) -> String {
        if kind == GroupKind::InlineGroup && html.contains(SPOILER_CLASS) {
            compact_spoilers(&html)
        } else {
            html
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_promotion_keeps_attributes() {
        let op: Operation = serde_json::from_value(json!({
            "insert": {"block-image": {"src": "a.png"}},
            "attributes": {"align": "center"}
        }))
        .unwrap();
        let promoted = promote_block_embed(&op);
        assert!(promoted.has_attr(RENDER_AS_BLOCK));
        assert!(promoted.has_attr("align"));
        assert!(!op.has_attr(RENDER_AS_BLOCK));
    }

    #[test]
    fn test_text_is_not_promoted() {
        let op = Operation::text("plain text");
        assert_eq!(promote_block_embed(&op), op);
    }

    #[test]
    fn test_hook_classes() {
        let styles = EmbedStyles::default();
        let hooks = SsrHooks { styles: &styles };
        let code = Operation::text("\n")
            .with_attribute("code-block", json!(true));
        let spoiler = Operation::text("s").with_attribute(SPOILER_ATTRIBUTE, json!(true));
        let embed = Operation::embed("tweet", json!({})).with_attribute(SPOILER_ATTRIBUTE, json!(true));
        assert_eq!(hooks.custom_css_class(&code).as_deref(), Some(CODE_BLOCK_CLASS));
        assert_eq!(hooks.custom_css_class(&spoiler).as_deref(), Some(SPOILER_CLASS));
        assert_eq!(hooks.custom_css_class(&embed), None);
    }

    #[test]
    fn test_after_render_only_touches_inline_groups() {
        let styles = EmbedStyles::default();
        let hooks = SsrHooks { styles: &styles };
        let html = "<p><span class=\"inline-spoilers\">a</span><span class=\"inline-spoilers\">b</span></p>";
        assert_eq!(
            hooks.after_render(GroupKind::InlineGroup, html.to_owned()),
            "<p><span class=\"inline-spoilers\">ab</span></p>"
        );
        assert_eq!(hooks.after_render(GroupKind::Block, html.to_owned()), html);
    }

    #[test]
    fn test_code_block_gets_syntax_class() {
        let html = get_ssr_converter()
            .convert_value(json!([
                {"insert": "fn main() {}"},
                {"insert": "\n", "attributes": {"code-block": true}}
            ]))
            .unwrap();
        assert_eq!(html, "<pre class=\"ql-syntax\">fn main() {}</pre>");
    }

    #[test]
    fn test_custom_config_flows_into_embeds() {
        let mut config = RenderConfig::default();
        config.embeds.oembed.loading_message = "Loading...".to_owned();
        let html = SsrConverter::new(config)
            .convert_value(json!([{"insert": {"oembed-embed": {"url": "https://e.x"}}}]))
            .unwrap();
        assert!(html.contains(">Loading...</div>"));
    }
}
