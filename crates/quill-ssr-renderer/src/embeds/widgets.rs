//! HTML builders for the editor's embed widgets.
//!
//! - `block_image` - standalone image, optionally hidden behind a spoiler
//! - `tweet` - tweet placeholder with a link fallback
//! - `tumblr_embed` - tumblr post placeholder
//! - `oembed_base` - shared builder for pixiv, tiktok and generic oEmbed content
//!
//! Every builder accepts any JSON shape. Missing fields render empty, and a bare
//! string value is taken as the embed's URL.

use std::borrow::Cow;
use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute_to_string, encode_text_to_string};
use quill_ssr_common::EmbedStyle;
use serde_json::Value;

use crate::classify::EmbedSize;
use crate::delta::is_truthy;

pub fn block_image(value: &Value) -> String {
    let mut html = String::new();
    open_container(&mut html, "ql-block-image", None, value);
    html.push('>');
    push_sizer(&mut html, value);
    html.push_str("<img src=\"");
    encode_double_quoted_attribute_to_string(field(value, "src").unwrap_or_default(), &mut html);
    html.push('"');
    if let Some(alt) = field(value, "alt") {
        html.push_str(" alt=\"");
        encode_double_quoted_attribute_to_string(alt, &mut html);
        html.push('"');
    }
    html.push_str("/></div>");
    html
}

pub fn tweet(value: &Value) -> String {
    let url = field(value, "url").unwrap_or_default();
    let mut html = String::new();
    open_container(&mut html, "ql-tweet", None, value);
    push_attr(&mut html, "data-url", &url);
    if let Some(id) = field(value, "id") {
        push_attr(&mut html, "data-id", &id);
    }
    html.push_str("><blockquote class=\"twitter-tweet\">");
    push_link(&mut html, &url);
    html.push_str("</blockquote></div>");
    html
}

pub fn tumblr_embed(value: &Value) -> String {
    let url = field(value, "url").unwrap_or_default();
    let mut html = String::new();
    open_container(&mut html, "ql-tumblr-embed", None, value);
    html.push_str("><div class=\"tumblr-post\"");
    if let Some(href) = field(value, "href") {
        push_attr(&mut html, "data-href", &href);
    }
    if let Some(did) = field(value, "did") {
        push_attr(&mut html, "data-did", &did);
    }
    html.push('>');
    push_link(&mut html, &url);
    html.push_str("</div></div>");
    html
}

pub fn oembed_base(value: &Value, style: &EmbedStyle) -> String {
    let url = field(value, "url").unwrap_or_default();
    let mut html = String::new();
    open_container(
        &mut html,
        "ql-oembed-embed",
        style.extra_class.as_deref(),
        value,
    );
    push_attr(&mut html, "data-url", &url);
    html.push_str("><div class=\"loading-message\" style=\"background-color: ");
    encode_double_quoted_attribute_to_string(&style.background_color, &mut html);
    html.push_str("\">");
    encode_text_to_string(&style.loading_message, &mut html);
    html.push_str("</div>");
    push_sizer(&mut html, value);
    html.push_str("<a class=\"embed-fallback\"");
    push_attr(&mut html, "href", &url);
    html.push('>');
    encode_text_to_string(&url, &mut html);
    html.push_str("</a></div>");
    html
}

/// Writes `<div class="..."` without closing the tag.
fn open_container(html: &mut String, class: &str, extra_class: Option<&str>, value: &Value) {
    html.push_str("<div class=\"");
    html.push_str(class);
    html.push_str(" ql-embed");
    if let Some(extra) = extra_class {
        html.push(' ');
        encode_double_quoted_attribute_to_string(extra, html);
    }
    if flag(value, "spoilers") {
        html.push_str(" spoilers");
    }
    html.push_str("\" contenteditable=\"false\"");
}

fn push_attr(html: &mut String, name: &str, value: &str) {
    let _ = write!(html, " {name}=\"");
    encode_double_quoted_attribute_to_string(value, html);
    html.push('"');
}

fn push_link(html: &mut String, url: &str) {
    html.push_str("<a");
    push_attr(html, "href", url);
    html.push('>');
    encode_text_to_string(url, html);
    html.push_str("</a>");
}

fn push_sizer(html: &mut String, value: &Value) {
    if let Some(ratio) = EmbedSize::from_value(value).and_then(|size| size.aspect_ratio_percent()) {
        let _ = write!(
            html,
            "<div class=\"ql-embed-sizer\" style=\"padding-top: {ratio}%\"></div>"
        );
    }
}

/// A string-ish field, or the whole value when it is a bare string and the
/// field names the embed's location.
fn field<'v>(value: &'v Value, name: &str) -> Option<Cow<'v, str>> {
    match value {
        Value::String(s) if matches!(name, "url" | "src") => Some(Cow::Borrowed(s)),
        Value::Object(map) => match map.get(name)? {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            _ => None,
        },
        _ => None,
    }
}

fn flag(value: &Value, name: &str) -> bool {
    value.get(name).is_some_and(is_truthy)
}
