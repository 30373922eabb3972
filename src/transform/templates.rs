// src/transform/templates.rs

//! Template compilation via `pulldown-cmark`.
//!
//! Markdown templates under the source tree compile to standalone HTML
//! documents at the public root.

use std::path::Path;

use pulldown_cmark::{Options, Parser, html};

use crate::config::model::TemplateOptions;

use super::{TransformError, Transformer, input_utf8};

pub struct TemplateCompiler {
    options: Options,
}

impl TemplateCompiler {
    pub fn new(opts: &TemplateOptions) -> Self {
        let mut options = Options::empty();
        if opts.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if opts.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if opts.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        Self { options }
    }
}

impl Transformer for TemplateCompiler {
    fn name(&self) -> &'static str {
        "templates"
    }

    fn transform(&self, source: &Path, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let text = input_utf8(source, input)?;

        let parser = Parser::new_ext(text, self.options);
        let mut body = String::with_capacity(text.len() * 2);
        html::push_html(&mut body, parser);

        let title = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");

        let page = format!(
            "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n</head>\n<body>\n{body}</body>\n</html>\n"
        );
        Ok(page.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> String {
        let t = TemplateCompiler::new(&TemplateOptions::default());
        let out = t.transform(Path::new("templates/index.md"), src.as_bytes());
        String::from_utf8(out.unwrap()).unwrap()
    }

    #[test]
    fn compiles_markdown_to_html_document() {
        let out = compile("# Hello\n\nsome *text*\n");
        assert!(out.starts_with("<!doctype html>"));
        assert!(out.contains("<h1>Hello</h1>"));
        assert!(out.contains("<em>text</em>"));
        assert!(out.contains("<title>index</title>"));
    }

    #[test]
    fn rejects_non_utf8_input() {
        let t = TemplateCompiler::new(&TemplateOptions::default());
        let err = t.transform(Path::new("templates/x.md"), &[0xff, 0xfe, 0x00]);
        assert!(err.is_err());
    }
}
