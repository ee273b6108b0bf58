//! Decides which operations render as standalone blocks.

use serde_json::Value;
use smol_str::SmolStr;

use crate::delta::{Operation, is_truthy};

/// Embed kinds that always occupy their own block.
pub const BLOCK_EMBED_KINDS: [&str; 6] = [
    "block-image",
    "tweet",
    "tumblr-embed",
    "pixiv-embed",
    "tiktok-embed",
    "oembed-embed",
];

const WIDTH_KEY: &str = "embedWidth";
const HEIGHT_KEY: &str = "embedHeight";

/// Declared dimensions of an embed, kept as the text the editor stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSize {
    pub width: SmolStr,
    pub height: SmolStr,
}

impl EmbedSize {
    /// Read `embedWidth`/`embedHeight` from an embed payload. Both must be truthy.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            width: size_text(object.get(WIDTH_KEY)?)?,
            height: size_text(object.get(HEIGHT_KEY)?)?,
        })
    }

    /// `height / width * 100`, or `None` unless the width is positive, the
    /// height is not negative and the ratio itself is finite.
    pub fn aspect_ratio_percent(&self) -> Option<f64> {
        let width: f64 = self.width.trim().parse().ok()?;
        let height: f64 = self.height.trim().parse().ok()?;
        if !(width > 0.0 && height >= 0.0) {
            return None;
        }
        let ratio = height / width * 100.0;
        ratio.is_finite().then_some(ratio)
    }
}

fn size_text(value: &Value) -> Option<SmolStr> {
    if !is_truthy(value) {
        return None;
    }
    Some(match value {
        Value::String(s) => SmolStr::new(s),
        other => SmolStr::new(other.to_string()),
    })
}

/// The declared size of an embed operation, if it has one.
pub fn maybe_get_embed_sizes(op: &Operation) -> Option<EmbedSize> {
    EmbedSize::from_value(&op.as_embed()?.value)
}

/// True for known block embed kinds with a truthy payload, and for any embed
/// that declares its size.
pub fn should_render_as_block(op: &Operation) -> bool {
    let Some(embed) = op.as_embed() else {
        return false;
    };
    (BLOCK_EMBED_KINDS.contains(&embed.kind.as_str()) && is_truthy(&embed.value))
        || maybe_get_embed_sizes(op).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_kinds_render_as_block() {
        for kind in BLOCK_EMBED_KINDS {
            let op = Operation::embed(kind, json!({"url": "https://example.com"}));
            assert!(should_render_as_block(&op), "{kind}");
        }
    }

    #[test]
    fn test_falsy_payload_stays_inline() {
        let op = Operation::embed("tweet", json!(""));
        assert!(!should_render_as_block(&op));
    }

    #[test]
    fn test_sized_unknown_embed_renders_as_block() {
        let op = Operation::embed(
            "youtube",
            json!({"url": "https://y", "embedWidth": "560", "embedHeight": 315}),
        );
        assert!(should_render_as_block(&op));
        let size = maybe_get_embed_sizes(&op).unwrap();
        assert_eq!(size.width, "560");
        assert_eq!(size.height, "315");
    }

    #[test]
    fn test_unknown_embed_without_size_is_inline() {
        let op = Operation::embed("emoji", json!({"name": "wave", "embedWidth": "20"}));
        assert!(!should_render_as_block(&op));
        assert!(maybe_get_embed_sizes(&op).is_none());
    }

    #[test]
    fn test_text_never_renders_as_block() {
        assert!(!should_render_as_block(&Operation::text("tweet")));
        assert!(maybe_get_embed_sizes(&Operation::text("x")).is_none());
    }

    #[test]
    fn test_aspect_ratio() {
        let size = EmbedSize {
            width: "400".into(),
            height: " 100 ".into(),
        };
        assert_eq!(size.aspect_ratio_percent(), Some(25.0));

        let zero = EmbedSize {
            width: "0".into(),
            height: "100".into(),
        };
        assert_eq!(zero.aspect_ratio_percent(), None);

        let junk = EmbedSize {
            width: "wide".into(),
            height: "100".into(),
        };
        assert_eq!(junk.aspect_ratio_percent(), None);
    }

    #[test]
    fn test_aspect_ratio_rejects_unusable_css() {
        let cases = [
            ("1e-300", "1e300"),
            ("-200", "50"),
            ("200", "-50"),
            ("inf", "50"),
            ("NaN", "50"),
            ("200", "NaN"),
        ];
        for (width, height) in cases {
            let size = EmbedSize {
                width: width.into(),
                height: height.into(),
            };
            assert_eq!(size.aspect_ratio_percent(), None, "{width} x {height}");
        }
    }
}
