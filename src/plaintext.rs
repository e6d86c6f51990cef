//! Markdown to plain text extraction.
//!
//! Puzzmo sends Discord-flavored Markdown; Signal renders messages as plain
//! text, so by default all markup is stripped before delivery. Walks the
//! pulldown-cmark event stream and keeps only human-readable content: link
//! and image destinations are dropped, inline code is kept verbatim, block
//! boundaries become newlines.

use anyhow::Result;
use pulldown_cmark::{Event, Options, Parser, TagEnd};

/// Extract the plain text content of a Markdown document.
///
/// Best-effort by contract: callers must skip delivery on error rather than
/// fall back to the raw markup.
pub fn to_plain_text(markdown: &str) -> Result<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut plain = String::new();

    for event in parser {
        match event {
            Event::Text(text) => plain.push_str(&text),
            Event::Code(code) => plain.push_str(&code),
            Event::SoftBreak => plain.push(' '),
            Event::HardBreak | Event::Rule => plain.push('\n'),
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::CodeBlock) => {
                if !plain.ends_with('\n') {
                    plain.push('\n');
                }
            }
            _ => {}
        }
    }

    Ok(plain.trim().to_string())
}
