//! Shared plumbing for the quill-ssr crates.
//!
//! - [`error`]: error types with miette diagnostics
//! - [`config`]: render configuration and file-backed loading
//! - [`telemetry`]: tracing subscriber setup (behind the `telemetry` feature)

pub mod config;
pub mod error;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use config::{EmbedStyle, EmbedStyles, FileStore, Loader, RenderConfig, Saver};
pub use error::{SerDeError, SsrError};
