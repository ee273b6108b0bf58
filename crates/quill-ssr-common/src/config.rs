use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use std::path::Path;
use std::path::PathBuf;

use crate::error::{SerDeError, SsrError};

/// Presentation of one oEmbed-style embed kind while its content loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedStyle {
    /// Extra CSS class added to the embed container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_class: Option<SmolStr>,
    /// Message shown until the third-party content has loaded.
    pub loading_message: String,
    /// Background color of the loading block.
    pub background_color: SmolStr,
}

impl EmbedStyle {
    pub fn new(
        extra_class: Option<&str>,
        loading_message: impl Into<String>,
        background_color: &str,
    ) -> Self {
        Self {
            extra_class: extra_class.map(SmolStr::new),
            loading_message: loading_message.into(),
            background_color: SmolStr::new(background_color),
        }
    }
}

/// Per-kind styles for the embeds rendered through the shared oEmbed builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedStyles {
    pub pixiv: EmbedStyle,
    pub tiktok: EmbedStyle,
    pub oembed: EmbedStyle,
}

impl Default for EmbedStyles {
    fn default() -> Self {
        Self {
            pixiv: EmbedStyle::new(Some("ql-pixiv-embed"), "行っ・・・行っちゃう!", "#0096fa"),
            tiktok: EmbedStyle::new(
                Some("ql-tiktok-embed"),
                "Hello fellow kids, it's TikTok time™",
                "aquamarine",
            ),
            oembed: EmbedStyle::new(None, "Doing my best!", "#e6e6e6"),
        }
    }
}

impl EmbedStyles {
    /// Look up the style for an embed kind name (`pixiv-embed`, `tiktok-embed`, `oembed-embed`).
    pub fn for_kind(&self, kind: &str) -> Option<&EmbedStyle> {
        match kind {
            "pixiv-embed" => Some(&self.pixiv),
            "tiktok-embed" => Some(&self.tiktok),
            "oembed-embed" => Some(&self.oembed),
            _ => None,
        }
    }
}

/// Configuration for a server-side render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Styles for oEmbed-style embeds.
    pub embeds: EmbedStyles,
}

impl RenderConfig {
    /// Loads the configuration from the provided loader.
    pub fn load(loader: &impl Loader) -> Result<Self, SsrError> {
        loader.load()
    }

    /// Saves the configuration using the provided saver.
    pub fn save(&self, saver: &impl Saver) -> Result<(), SsrError> {
        saver.save(self)
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> Result<RenderConfig, SsrError>;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(&self, config: &RenderConfig) -> Result<(), SsrError>;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// [`RenderConfig`] data is serialized and deserialized based on the file extension.
    /// `.json` and `.toml` files are supported.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn format(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

impl Loader for FileStore {
    fn load(&self) -> Result<RenderConfig, SsrError> {
        let parse = |text: &str| -> Result<RenderConfig, SerDeError> {
            match self.format() {
                Some("toml") => Ok(toml::from_str(text)?),
                _ => Ok(serde_json::from_str(text)?),
            }
        };
        match self.format() {
            Some("json") | Some("toml") => {
                let text = std::fs::read_to_string(&self.path)?;
                let config = parse(&text).map_err(|e| SsrError::config(&self.path, e))?;
                tracing::debug!(path = %self.path.display(), "loaded render config");
                Ok(config)
            }
            _ => Err(SsrError::config(&self.path, "Unsupported file format")),
        }
    }
}

impl Saver for FileStore {
    fn save(&self, config: &RenderConfig) -> Result<(), SsrError> {
        let text = match self.format() {
            Some("json") => serde_json::to_string_pretty(config).map_err(SerDeError::from),
            Some("toml") => toml::to_string_pretty(config).map_err(SerDeError::from),
            _ => return Err(SsrError::config(&self.path, "Unsupported file format")),
        }
        .map_err(|e| SsrError::config(&self.path, e))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}
