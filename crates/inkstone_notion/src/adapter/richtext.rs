//! Vendor rich text to legacy decoration conversion.

use crate::api::RichTextSpan;
use crate::record::{Decoration, Mark};

/// Color value the vendor uses for "no color set".
const DEFAULT_COLOR: &str = "default";

/// Convert vendor rich-text spans into legacy decorations.
///
/// One decoration per span, order preserved. Empty input produces the
/// `[[""]]` placeholder so the renderer never sees an empty sequence.
pub fn convert_rich_text(spans: &[RichTextSpan]) -> Vec<Decoration> {
    if spans.is_empty() {
        return Decoration::empty();
    }
    spans.iter().map(convert_span).collect()
}

/// Marks are appended in a fixed order: bold, italic, strikethrough,
/// underline, code, link, color.
fn convert_span(span: &RichTextSpan) -> Decoration {
    let annotations = &span.annotations;
    let mut marks = Vec::new();

    if annotations.bold {
        marks.push(Mark::Bold);
    }
    if annotations.italic {
        marks.push(Mark::Italic);
    }
    if annotations.strikethrough {
        marks.push(Mark::Strikethrough);
    }
    if annotations.underline {
        marks.push(Mark::Underline);
    }
    if annotations.code {
        marks.push(Mark::Code);
    }
    if let Some(href) = span.href.as_deref() {
        if !href.is_empty() {
            marks.push(Mark::Link(href.to_string()));
        }
    }
    if annotations.color != DEFAULT_COLOR {
        marks.push(Mark::Color(annotations.color.clone()));
    }

    Decoration {
        text: span.plain_text.clone(),
        marks,
    }
}

/// Plain-text rendering of a rich-text sequence.
pub fn plain_text(spans: &[RichTextSpan]) -> String {
    spans.iter().map(|s| s.plain_text.as_str()).collect()
}
