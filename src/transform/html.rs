// src/transform/html.rs

//! Whitespace-collapsing HTML minifier.
//!
//! Collapses runs of whitespace in text content to a single space, leaving
//! tag contents and the inside of `<pre>`, `<textarea>`, `<script>` and
//! `<style>` untouched.

use std::path::Path;

use crate::config::model::HtmlOptions;

use super::{TransformError, Transformer, input_utf8};

const PRESERVED: [&str; 4] = ["pre", "textarea", "script", "style"];

pub struct HtmlMinifier {
    collapse_whitespace: bool,
}

impl HtmlMinifier {
    pub fn new(opts: &HtmlOptions) -> Self {
        Self {
            collapse_whitespace: opts.collapse_whitespace,
        }
    }
}

impl Transformer for HtmlMinifier {
    fn name(&self) -> &'static str {
        "minify-html"
    }

    fn transform(&self, source: &Path, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let text = input_utf8(source, input)?;
        if !self.collapse_whitespace {
            return Ok(input.to_vec());
        }
        Ok(collapse_whitespace(text).into_bytes())
    }
}

fn collapse_whitespace(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    // Name of the preserved element we are currently inside, if any.
    let mut preserved: Option<&str> = None;

    while let Some(lt) = rest.find('<') {
        let (text, tail) = rest.split_at(lt);
        push_text(&mut out, text, preserved.is_some());

        let Some(gt) = tail.find('>') else {
            // Unterminated tag; emit as-is.
            out.push_str(tail);
            return out;
        };
        let (tag, after) = tail.split_at(gt + 1);
        out.push_str(tag);

        match preserved {
            Some(name) if is_closing_tag(tag, name) => preserved = None,
            None => {
                preserved = PRESERVED.iter().find(|n| is_opening_tag(tag, n)).copied();
            }
            _ => {}
        }

        rest = after;
    }

    push_text(&mut out, rest, preserved.is_some());
    out
}

fn push_text(out: &mut String, text: &str, preserve: bool) {
    if preserve {
        out.push_str(text);
        return;
    }

    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }
}

fn is_opening_tag(tag: &str, name: &str) -> bool {
    let body = tag.trim_start_matches('<');
    let lower = body.get(..name.len()).unwrap_or("").to_ascii_lowercase();
    lower == name
        && body[name.len()..]
            .starts_with(|c: char| c == '>' || c.is_whitespace() || c == '/')
}

fn is_closing_tag(tag: &str, name: &str) -> bool {
    let body = tag.trim_start_matches("</");
    body.len() != tag.len()
        && body.to_ascii_lowercase().starts_with(name)
        && body[name.len()..]
            .starts_with(|c: char| c == '>' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minify(src: &str) -> String {
        let m = HtmlMinifier::new(&HtmlOptions::default());
        String::from_utf8(m.transform(Path::new("index.html"), src.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        let out = minify("<p>\n    hello   world\n</p>");
        assert_eq!(out, "<p> hello world </p>");
    }

    #[test]
    fn preserves_pre_blocks() {
        let out = minify("<pre>  a\n  b</pre>\n\n<p>  x  </p>");
        assert_eq!(out, "<pre>  a\n  b</pre> <p> x </p>");
    }

    #[test]
    fn preserves_script_contents() {
        let out = minify("<script>\nlet a  =  1;\n</script>");
        assert_eq!(out, "<script>\nlet a  =  1;\n</script>");
    }

    #[test]
    fn disabled_collapse_is_passthrough() {
        let m = HtmlMinifier::new(&HtmlOptions {
            collapse_whitespace: false,
        });
        let src = b"<p>  keep  </p>";
        assert_eq!(
            m.transform(Path::new("index.html"), src).unwrap(),
            src.to_vec()
        );
    }
}
