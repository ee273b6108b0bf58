use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smol_str::SmolStr;

pub type Attributes = Map<String, Value>;

/// Embed kind the editor uses to carry inline spoiler text.
pub const INLINE_SPOILERS_TEXT: &str = "inline-spoilers-text";

/// Embed kinds whose string payload is plain text rather than an embed.
const TEXT_EMBED_KINDS: &[&str] = &[INLINE_SPOILERS_TEXT];

/// Attribute that promotes a custom embed to block-level rendering.
pub const RENDER_AS_BLOCK: &str = "renderAsBlock";

/// One unit of the delta: a run of text or an embed, plus formatting attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub insert: Insert,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInsert", into = "RawInsert")]
pub enum Insert {
    Text(String),
    Embed(Embed),
}

/// A non-text payload: the embed kind and its opaque value.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub kind: SmolStr,
    pub value: Value,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawInsert {
    Text(String),
    Embed(Map<String, Value>),
}

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum InsertError {
    #[error("embed insert has no kind")]
    #[diagnostic(code(delta::insert::empty))]
    Empty,

    #[error("embed insert carries {0} kinds, expected exactly one")]
    #[diagnostic(code(delta::insert::ambiguous))]
    Ambiguous(usize),
}

impl TryFrom<RawInsert> for Insert {
    type Error = InsertError;

    fn try_from(raw: RawInsert) -> Result<Self, Self::Error> {
        match raw {
            RawInsert::Text(text) => Ok(Insert::Text(text)),
            RawInsert::Embed(map) => {
                if map.len() > 1 {
                    return Err(InsertError::Ambiguous(map.len()));
                }
                let (kind, value) = map.into_iter().next().ok_or(InsertError::Empty)?;
                match value {
                    Value::String(text) if TEXT_EMBED_KINDS.contains(&kind.as_str()) => {
                        Ok(Insert::Text(text))
                    }
                    value => Ok(Insert::Embed(Embed {
                        kind: SmolStr::new(kind),
                        value,
                    })),
                }
            }
        }
    }
}

impl From<Insert> for RawInsert {
    fn from(insert: Insert) -> Self {
        match insert {
            Insert::Text(text) => RawInsert::Text(text),
            Insert::Embed(embed) => {
                let mut map = Map::new();
                map.insert(embed.kind.to_string(), embed.value);
                RawInsert::Embed(map)
            }
        }
    }
}

impl Operation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            insert: Insert::Text(text.into()),
            attributes: Attributes::new(),
        }
    }

    pub fn embed(kind: &str, value: Value) -> Self {
        Self {
            insert: Insert::Embed(Embed {
                kind: SmolStr::new(kind),
                value,
            }),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Copy of this operation with one attribute added or replaced.
    pub fn with_attribute(&self, name: &str, value: Value) -> Self {
        let mut op = self.clone();
        op.attributes.insert(name.to_owned(), value);
        op
    }

    pub fn is_text(&self) -> bool {
        matches!(self.insert, Insert::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.insert {
            Insert::Text(text) => Some(text),
            Insert::Embed(_) => None,
        }
    }

    pub fn as_embed(&self) -> Option<&Embed> {
        match &self.insert {
            Insert::Embed(embed) => Some(embed),
            Insert::Text(_) => None,
        }
    }

    /// True when this is exactly one line break.
    pub fn is_newline(&self) -> bool {
        self.as_text() == Some("\n")
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Whether the attribute is present and truthy.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some_and(is_truthy)
    }
}

/// JSON truthiness as the editor evaluates it: `null`, `false`, `0` and `""` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Textual form of an attribute value, as used in class names and tag attributes.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_owned()),
        _ => None,
    }
}
