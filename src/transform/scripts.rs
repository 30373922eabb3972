// src/transform/scripts.rs

//! Script transpilation and minification via `oxc`.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::config::model::{MinifyOptions as MinifyConfig, ScriptOptions};

use super::{TransformError, Transformer, input_utf8};

/// Parse + re-emit scripts without minification.
///
/// The emitted form is normalized modern JS; comments are stripped unless
/// configured otherwise.
pub struct ScriptTranspiler {
    comments: bool,
}

impl ScriptTranspiler {
    pub fn new(opts: &ScriptOptions) -> Self {
        Self {
            comments: opts.comments,
        }
    }
}

impl Transformer for ScriptTranspiler {
    fn name(&self) -> &'static str {
        "scripts"
    }

    fn transform(&self, source: &Path, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let text = input_utf8(source, input)?;

        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, text, SourceType::mjs()).parse();
        if !ret.errors.is_empty() {
            return Err(parse_error(source, &ret.errors));
        }
        let program = ret.program;

        let mut options = CodegenOptions::default();
        if !self.comments {
            options.comments = CommentOptions::disabled();
        }
        let code = Codegen::new().with_options(options).build(&program).code;
        Ok(code.into_bytes())
    }
}

/// Parse, compress, mangle and re-emit scripts in minified form.
pub struct JsMinifier {
    mangle: bool,
}

impl JsMinifier {
    pub fn new(opts: &MinifyConfig) -> Self {
        Self {
            mangle: opts.mangle,
        }
    }
}

impl Transformer for JsMinifier {
    fn name(&self) -> &'static str {
        "minify-js"
    }

    fn transform(&self, source: &Path, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let text = input_utf8(source, input)?;

        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, text, SourceType::mjs()).parse();
        if !ret.errors.is_empty() {
            return Err(parse_error(source, &ret.errors));
        }
        let mut program = ret.program;

        let options = MinifierOptions {
            mangle: self.mangle.then(MangleOptions::default),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);

        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        Ok(code.into_bytes())
    }
}

fn parse_error(source: &Path, errors: &[oxc::diagnostics::OxcDiagnostic]) -> TransformError {
    let first = errors
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown parse error".to_string());
    TransformError::new(format!(
        "{}: {} parse error(s), first: {first}",
        source.display(),
        errors.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpile_strips_comments_by_default() {
        let t = ScriptTranspiler::new(&ScriptOptions::default());
        let out = t
            .transform(
                Path::new("scripts/app.js"),
                b"// a comment\nconst greet = (name) => `hi ${name}`;\n",
            )
            .unwrap();
        let code = String::from_utf8(out).unwrap();
        assert!(!code.contains("a comment"));
        assert!(code.contains("greet"));
    }

    #[test]
    fn transpile_rejects_broken_source() {
        let t = ScriptTranspiler::new(&ScriptOptions::default());
        let err = t.transform(Path::new("scripts/app.js"), b"const = ;");
        assert!(err.is_err());
    }

    #[test]
    fn minify_output_is_smaller_than_input() {
        let src = b"function add ( a , b ) {\n    // sum\n    return a + b ;\n}\nexport { add };\n";
        let m = JsMinifier::new(&MinifyConfig::default());
        let out = m.transform(Path::new("scripts/main.js"), src).unwrap();
        assert!(out.len() < src.len());
        assert!(!String::from_utf8(out).unwrap().contains("sum"));
    }
}
