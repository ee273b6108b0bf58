//! Quill SSR renderer
//!
//! Turns Quill editor deltas into static HTML for server-side rendering, with
//! the post's custom embeds drawn as placeholders and adjacent inline spoilers
//! merged into one revealable span.
//!

pub mod classify;
pub mod converter;
pub mod delta;
pub mod dom;
pub mod embeds;
pub mod interact;
pub mod normalize;
pub mod pipeline;
pub mod spoilers;

pub use classify::{EmbedSize, maybe_get_embed_sizes, should_render_as_block};
pub use delta::{DeltaInput, Operation};
pub use interact::attach_event_listeners;
pub use pipeline::{SsrConverter, get_ssr_converter};
pub use quill_ssr_common::{RenderConfig, SsrError};
