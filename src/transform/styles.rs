// src/transform/styles.rs

//! Style processing via `lightningcss`.
//!
//! The same collaborator backs two tasks: the styles task re-emits parsed
//! CSS in readable form (catching syntax errors early), and the minify-css
//! task prints the compact form.

use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

use super::{TransformError, Transformer, input_utf8};

pub struct CssProcessor {
    minify: bool,
}

impl CssProcessor {
    /// Parse and pretty-print (styles task).
    pub fn pretty() -> Self {
        Self { minify: false }
    }

    /// Parse and print compact (minify-css task).
    pub fn minified() -> Self {
        Self { minify: true }
    }
}

impl Transformer for CssProcessor {
    fn name(&self) -> &'static str {
        if self.minify { "minify-css" } else { "styles" }
    }

    fn transform(&self, source: &Path, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let text = input_utf8(source, input)?;

        let stylesheet = StyleSheet::parse(text, ParserOptions::default())
            .map_err(|e| TransformError::new(format!("{}: {e}", source.display())))?;

        let result = stylesheet
            .to_css(PrinterOptions {
                minify: self.minify,
                ..PrinterOptions::default()
            })
            .map_err(|e| TransformError::new(format!("{}: {e}", source.display())))?;

        Ok(result.code.into_bytes())
    }
}
