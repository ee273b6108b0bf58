//! Rendering of custom embed operations.

pub mod widgets;

use quill_ssr_common::EmbedStyles;

use crate::classify::maybe_get_embed_sizes;
use crate::delta::Operation;

/// Fragment for custom embeds nothing else knows how to draw.
pub const NEUTRAL_PLACEHOLDER: &str = "<div></div>";

/// The custom embed kinds with a dedicated builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    BlockImage,
    Tweet,
    TumblrEmbed,
    PixivEmbed,
    TiktokEmbed,
    OEmbedEmbed,
    Other,
}

impl EmbedKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "block-image" => EmbedKind::BlockImage,
            "tweet" => EmbedKind::Tweet,
            "tumblr-embed" => EmbedKind::TumblrEmbed,
            "pixiv-embed" => EmbedKind::PixivEmbed,
            "tiktok-embed" => EmbedKind::TiktokEmbed,
            "oembed-embed" => EmbedKind::OEmbedEmbed,
            _ => EmbedKind::Other,
        }
    }
}

/// Render one custom operation. Always yields a non-empty fragment.
pub fn render_custom_op(op: &Operation, styles: &EmbedStyles) -> String {
    let Some(embed) = op.as_embed() else {
        return NEUTRAL_PLACEHOLDER.to_owned();
    };
    match EmbedKind::from_name(&embed.kind) {
        EmbedKind::BlockImage => widgets::block_image(&embed.value),
        EmbedKind::Tweet => widgets::tweet(&embed.value),
        EmbedKind::TumblrEmbed => widgets::tumblr_embed(&embed.value),
        EmbedKind::PixivEmbed | EmbedKind::TiktokEmbed | EmbedKind::OEmbedEmbed => {
            match styles.for_kind(&embed.kind) {
                Some(style) => widgets::oembed_base(&embed.value, style),
                None => NEUTRAL_PLACEHOLDER.to_owned(),
            }
        }
        EmbedKind::Other => {
            sized_placeholder(op).unwrap_or_else(|| NEUTRAL_PLACEHOLDER.to_owned())
        }
    }
}

/// An empty box reserving the embed's aspect ratio.
fn sized_placeholder(op: &Operation) -> Option<String> {
    let size = maybe_get_embed_sizes(op)?;
    match size.aspect_ratio_percent() {
        Some(ratio) => Some(format!("<div style=\"padding-top: {ratio}%\"></div>")),
        None => {
            tracing::warn!(
                width = %size.width,
                height = %size.height,
                "embed size is not numeric, using neutral placeholder"
            );
            None
        }
    }
}
