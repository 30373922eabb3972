// src/transform/mod.rs

//! Opaque external transformers.
//!
//! Every unit of real work in the pipeline is delegated through the
//! [`Transformer`] trait to an already-implemented library (lightningcss,
//! oxc, pulldown-cmark, image). Each implementation is constructed once from
//! its option record and invoked with fixed configuration for the process
//! lifetime.

use std::fmt;
use std::path::Path;

pub mod html;
pub mod images;
pub mod scripts;
pub mod styles;
pub mod templates;

pub use html::HtmlMinifier;
pub use images::ImageOptimizer;
pub use scripts::{JsMinifier, ScriptTranspiler};
pub use styles::CssProcessor;
pub use templates::TemplateCompiler;

/// Error from an external transformer rejecting its input.
///
/// Carries only a message; the task executor attaches the task name when it
/// surfaces the failure.
#[derive(Debug, Clone)]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransformError {}

/// One format conversion.
///
/// `source` is the originating path (for diagnostics and extension
/// dispatch); `input` is the raw file content. Implementations are pure with
/// respect to the filesystem: reading and writing is the executor's job.
pub trait Transformer: Send + Sync {
    fn name(&self) -> &'static str;

    fn transform(&self, source: &Path, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// Byte-for-byte passthrough (fonts, unrecognized image formats).
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyTransformer;

impl Transformer for CopyTransformer {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn transform(&self, _source: &Path, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(input.to_vec())
    }
}

/// Decode transformer input as UTF-8, mapping failure to a transform error.
pub(crate) fn input_utf8<'a>(
    source: &Path,
    input: &'a [u8],
) -> Result<&'a str, TransformError> {
    std::str::from_utf8(input)
        .map_err(|e| TransformError::new(format!("{}: not valid UTF-8: {e}", source.display())))
}
