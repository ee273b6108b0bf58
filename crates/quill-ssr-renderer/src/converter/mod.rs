//! Delta to HTML conversion.
//!
//! Operations are first split so every line break is its own operation, then
//! grouped: inline runs become paragraphs, newlines with block attributes close
//! block groups (headers, quotes, code, aligned paragraphs), list blocks are
//! gathered into lists, and videos and block-level custom embeds stand alone.
//! Each group is rendered and passed through [`RenderHooks::after_render`].

mod grouper;
mod op_html;


use std::fmt::Write;

use smol_str::SmolStr;

use crate::delta::Operation;
use grouper::{BlockGroup, Group, ListGroup};
use op_html::{OpHtml, encode_html};

pub(crate) const BR_TAG: &str = "<br/>";

/// Kind of group handed to [`RenderHooks::after_render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    InlineGroup,
    Block,
    List,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    pub paragraph_tag: SmolStr,
    pub class_prefix: SmolStr,
    pub link_target: Option<SmolStr>,
    /// Keep all lines of an inline group in one paragraph.
    pub multi_line_paragraph: bool,
    pub multi_line_blockquote: bool,
    pub multi_line_header: bool,
    pub multi_line_codeblock: bool,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            paragraph_tag: SmolStr::new_static("p"),
            class_prefix: SmolStr::new_static("ql"),
            link_target: Some(SmolStr::new_static("_blank")),
            multi_line_paragraph: true,
            multi_line_blockquote: true,
            multi_line_header: true,
            multi_line_codeblock: true,
        }
    }
}

/// Extension points of the conversion.
pub trait RenderHooks {
    /// Extra class for an operation's outermost tag.
    fn custom_css_class(&self, _op: &Operation) -> Option<SmolStr> {
        None
    }

    /// HTML for an embed the converter has no built-in markup for.
    fn render_custom(&self, _op: &Operation) -> String {
        String::new()
    }

    /// Post-process the HTML of one rendered group.
    fn after_render(&self, _kind: GroupKind, html: String) -> String {
        html
    }
}

impl RenderHooks for () {}

impl<T: RenderHooks + ?Sized> RenderHooks for &T {
    fn custom_css_class(&self, op: &Operation) -> Option<SmolStr> {
        (**self).custom_css_class(op)
    }

    fn render_custom(&self, op: &Operation) -> String {
        (**self).render_custom(op)
    }

    fn after_render(&self, kind: GroupKind, html: String) -> String {
        (**self).after_render(kind, html)
    }
}

pub struct DeltaConverter<H = ()> {
    ops: Vec<Operation>,
    options: ConverterOptions,
    hooks: H,
}

impl DeltaConverter<()> {
    pub fn new(ops: Vec<Operation>, options: ConverterOptions) -> Self {
        Self {
            ops,
            options,
            hooks: (),
        }
    }
}

impl<H: RenderHooks> DeltaConverter<H> {
    pub fn with_hooks<T: RenderHooks>(self, hooks: T) -> DeltaConverter<T> {
        DeltaConverter {
            ops: self.ops,
            options: self.options,
            hooks,
        }
    }

    pub fn convert(&self) -> String {
        let ops = grouper::denormalize(&self.ops);
        let groups = grouper::group(&ops, &self.options);
        tracing::debug!(ops = ops.len(), groups = groups.len(), "converting delta");

        let mut html = String::new();
        for group in &groups {
            html.push_str(&self.render_group(group));
        }
        html
    }

    fn render_group(&self, group: &Group<'_>) -> String {
        match group {
            Group::Inline(ops) => self
                .hooks
                .after_render(GroupKind::InlineGroup, self.render_paragraphs(ops)),
            Group::Block(block) => self
                .hooks
                .after_render(GroupKind::Block, self.render_block(block)),
            Group::List(list) => self
                .hooks
                .after_render(GroupKind::List, self.render_list(list)),
            Group::Video(op) => self
                .hooks
                .after_render(GroupKind::Video, self.op_html(op).html()),
            Group::Blot(op) => self.hooks.render_custom(op),
        }
    }

    fn op_html<'a>(&'a self, op: &'a Operation) -> OpHtml<'a> {
        OpHtml::new(op, &self.options, self.hooks.custom_css_class(op))
    }

    fn render_inline(&self, op: &Operation) -> String {
        if op_html::is_custom_embed(op) {
            return self.hooks.render_custom(op);
        }
        self.op_html(op).html().replace('\n', BR_TAG)
    }

    fn render_paragraphs(&self, ops: &[&Operation]) -> String {
        let mut html = String::new();
        if self.options.multi_line_paragraph {
            self.push_paragraph(&mut html, &self.render_inlines(ops));
            return html;
        }

        let mut line = String::new();
        let mut open = false;
        for op in ops {
            if op.is_newline() {
                self.push_paragraph(&mut html, if line.is_empty() { BR_TAG } else { line.as_str() });
                line.clear();
                open = false;
            } else {
                line.push_str(&self.render_inline(op));
                open = true;
            }
        }
        if open {
            self.push_paragraph(&mut html, if line.is_empty() { BR_TAG } else { line.as_str() });
        }
        html
    }

    fn push_paragraph(&self, html: &mut String, content: &str) {
        let tag = &self.options.paragraph_tag;
        let _ = write!(html, "<{tag}>{content}</{tag}>");
    }

    /// Inline HTML of `ops`, dropping a trailing line break.
    fn render_inlines(&self, ops: &[&Operation]) -> String {
        let last = ops.len().saturating_sub(1);
        ops.iter()
            .enumerate()
            .map(|(i, op)| {
                if i > 0 && i == last && op.is_newline() {
                    String::new()
                } else {
                    self.render_inline(op)
                }
            })
            .collect()
    }

    fn render_block(&self, block: &BlockGroup<'_>) -> String {
        let parts = self.op_html(block.op).parts();
        if block.op.has_attr("code-block") {
            let text: String = block
                .ops
                .iter()
                .map(|op| match op.as_text() {
                    Some(text) => text.to_owned(),
                    None => self.hooks.render_custom(op),
                })
                .collect();
            return format!("{}{}{}", parts.opening, encode_html(&text), parts.closing);
        }
        let inner: String = block.ops.iter().map(|op| self.render_inline(op)).collect();
        let inner = if inner.is_empty() { BR_TAG.to_owned() } else { inner };
        format!("{}{}{}", parts.opening, inner, parts.closing)
    }

    fn render_list(&self, list: &ListGroup<'_>) -> String {
        let tag = if list.is_ordered() { "ol" } else { "ul" };
        let mut html = format!("<{tag}>");
        for item in &list.items {
            let mut op = item.op.clone();
            op.attributes.remove("indent");
            let parts = self.op_html(&op).parts();
            html.push_str(&parts.opening);
            html.push_str(&self.render_inlines(&item.ops));
            html.push_str(&parts.closing);
        }
        let _ = write!(html, "</{tag}>");
        html
    }
}
