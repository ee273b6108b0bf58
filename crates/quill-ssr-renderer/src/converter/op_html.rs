//! Tag and attribute rendering for a single operation.

use std::borrow::Cow;
use std::fmt::Write;

use smol_str::{SmolStr, format_smolstr};

use super::ConverterOptions;
use super::grouper::is_container_block;
use crate::delta::{Operation, value_text};

/// Embeds the converter draws itself.
const BUILTIN_EMBEDS: [&str; 3] = ["image", "video", "formula"];

/// Inline formats and the tags they map to, outermost first after links.
const INLINE_TAGS: [(&str, &str); 5] = [
    ("bold", "strong"),
    ("italic", "em"),
    ("strike", "s"),
    ("underline", "u"),
    ("code", "code"),
];

const CLASS_ATTRIBUTES: [&str; 5] = ["indent", "align", "direction", "font", "size"];

const SELF_CLOSING_TAGS: [&str; 2] = ["img", "br"];

pub(super) fn is_custom_embed(op: &Operation) -> bool {
    op.as_embed()
        .is_some_and(|embed| !BUILTIN_EMBEDS.contains(&embed.kind.as_str()))
}

fn is_embed_kind(op: &Operation, kind: &str) -> bool {
    op.as_embed().is_some_and(|embed| embed.kind == kind)
}

/// Escape text content.
pub(super) fn encode_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_safe(text)
}

#[derive(Debug, Default)]
pub(super) struct HtmlParts {
    pub opening: String,
    pub content: String,
    pub closing: String,
}

pub(super) struct OpHtml<'a> {
    op: &'a Operation,
    options: &'a ConverterOptions,
    custom_class: Option<SmolStr>,
}

impl<'a> OpHtml<'a> {
    pub fn new(
        op: &'a Operation,
        options: &'a ConverterOptions,
        custom_class: Option<SmolStr>,
    ) -> Self {
        Self {
            op,
            options,
            custom_class,
        }
    }

    pub fn html(&self) -> String {
        let parts = self.parts();
        format!("{}{}{}", parts.opening, parts.content, parts.closing)
    }

    pub fn parts(&self) -> HtmlParts {
        let container = is_container_block(self.op);
        if self.op.is_newline() && !container {
            return HtmlParts {
                content: "\n".to_owned(),
                ..HtmlParts::default()
            };
        }

        let mut tags = self.tags();
        let mut attrs = self.tag_attributes();
        if tags.is_empty() && !attrs.is_empty() {
            tags.push(SmolStr::new_static("span"));
        }

        let mut parts = HtmlParts {
            content: self.content(),
            ..HtmlParts::default()
        };
        for tag in &tags {
            start_tag(&mut parts.opening, tag, &attrs);
            // Only the outermost tag carries attributes.
            attrs.clear();
        }
        for tag in tags.iter().rev() {
            if tag != "img" {
                let _ = write!(parts.closing, "</{tag}>");
            }
        }
        parts
    }

    fn tags(&self) -> Vec<SmolStr> {
        let op = self.op;
        if let Some(embed) = op.as_embed() {
            let tag = match embed.kind.as_str() {
                "video" => "iframe",
                "image" => "img",
                "formula" => "span",
                _ => return Vec::new(),
            };
            return vec![SmolStr::new_static(tag)];
        }

        if is_container_block(op) {
            let tag = if op.has_attr("blockquote") {
                SmolStr::new_static("blockquote")
            } else if op.has_attr("code-block") {
                SmolStr::new_static("pre")
            } else if op.has_attr("list") {
                SmolStr::new_static("li")
            } else if let Some(level) = op.attr("header").filter(|_| op.has_attr("header")) {
                format_smolstr!("h{}", header_level(level))
            } else {
                self.options.paragraph_tag.clone()
            };
            return vec![tag];
        }

        let mut tags = Vec::new();
        if op.has_attr("link") {
            tags.push(SmolStr::new_static("a"));
        }
        match op.attr("script").and_then(|v| v.as_str()) {
            Some("sub") => tags.push(SmolStr::new_static("sub")),
            Some("super") => tags.push(SmolStr::new_static("sup")),
            _ => {}
        }
        for (attr, tag) in INLINE_TAGS {
            if op.has_attr(attr) {
                tags.push(SmolStr::new_static(tag));
            }
        }
        tags
    }

    fn classes(&self) -> Vec<String> {
        let op = self.op;
        let prefix = &self.options.class_prefix;
        let mut classes: Vec<String> = self
            .custom_class
            .iter()
            .map(|class| class.to_string())
            .collect();
        for attr in CLASS_ATTRIBUTES {
            if let Some(value) = op.attr(attr).filter(|_| op.has_attr(attr)).and_then(value_text) {
                classes.push(format!("{prefix}-{attr}-{value}"));
            }
        }
        for kind in BUILTIN_EMBEDS {
            if is_embed_kind(op, kind) {
                classes.push(format!("{prefix}-{kind}"));
            }
        }
        classes
    }

    fn styles(&self) -> Vec<String> {
        let mut styles = Vec::new();
        for (attr, property) in [("color", "color"), ("background", "background-color")] {
            if let Some(value) = self.op.attr(attr).and_then(value_text) {
                if !value.is_empty() {
                    styles.push(format!("{property}:{value}"));
                }
            }
        }
        styles
    }

    fn tag_attributes(&self) -> Vec<(&'static str, String)> {
        let op = self.op;
        if op.has_attr("code") && !op.has_attr("link") {
            return Vec::new();
        }

        let mut attrs = Vec::new();
        let classes = self.classes();
        if !classes.is_empty() {
            attrs.push(("class", classes.join(" ")));
        }

        if let Some(embed) = op.as_embed() {
            match embed.kind.as_str() {
                "image" => {
                    if let Some(width) = op.attr("width").and_then(value_text) {
                        attrs.push(("width", width));
                    }
                    attrs.push(("src", value_text(&embed.value).unwrap_or_default()));
                    return attrs;
                }
                "video" => {
                    attrs.push(("frameborder", "0".to_owned()));
                    attrs.push(("allowfullscreen", "true".to_owned()));
                    attrs.push(("src", value_text(&embed.value).unwrap_or_default()));
                    return attrs;
                }
                "formula" => return attrs,
                _ => {}
            }
        }

        if let Some(state) = op.attr("list").and_then(|v| v.as_str()) {
            if matches!(state, "checked" | "unchecked") {
                attrs.push(("data-checked", (state == "checked").to_string()));
            }
        }

        let styles = self.styles();
        if !styles.is_empty() {
            attrs.push(("style", styles.join(";")));
        }

        if let Some(language) = op.attr("code-block").and_then(|v| v.as_str()) {
            attrs.push(("data-language", language.to_owned()));
            return attrs;
        }

        if is_container_block(op) {
            return attrs;
        }

        if op.has_attr("link") {
            if let Some(href) = op.attr("link").and_then(value_text) {
                attrs.push(("href", href));
            }
            let target = op
                .attr("target")
                .and_then(value_text)
                .or_else(|| self.options.link_target.as_ref().map(|t| t.to_string()));
            if let Some(target) = target {
                attrs.push(("target", target));
            }
            if let Some(rel) = op.attr("rel").and_then(value_text) {
                attrs.push(("rel", rel));
            }
        }
        attrs
    }

    fn content(&self) -> String {
        if is_container_block(self.op) {
            return String::new();
        }
        if let Some(text) = self.op.as_text() {
            return encode_html(text).into_owned();
        }
        match self.op.as_embed() {
            Some(embed) if embed.kind == "formula" => value_text(&embed.value)
                .map(|formula| encode_html(&formula).into_owned())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

fn header_level(value: &serde_json::Value) -> u64 {
    let level = value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(1);
    level.clamp(1, 6)
}

fn start_tag(out: &mut String, tag: &str, attrs: &[(&str, String)]) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            html_escape::encode_double_quoted_attribute_to_string(value, out);
            out.push('"');
        }
    }
    if SELF_CLOSING_TAGS.contains(&tag) {
        out.push_str("/>");
    } else {
        out.push('>');
    }
}
