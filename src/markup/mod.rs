//! Streaming parser for the restricted HTML subset used in rich-text
//! chat messages.
//!
//! The vocabulary is a fixed whitelist (paragraphs, headings, lists,
//! preformatted code); anything else is a hard parse failure. This is
//! deliberately not an HTML5 parser: no entity decoding beyond two fixed
//! substitutions, no attributes, no recovery. Callers are expected to
//! fall back to [`Document::Unhandled`] wrapping the raw body when
//! [`parse`] fails.
//!
//! The parse is a single left-to-right scan with an explicit cursor; tag
//! nesting is tracked by descending into and ascending out of an
//! arena-backed working tree, which is then converted into the detached
//! [`Document`] output.

mod document;
mod dom;
mod scan;
mod tag;

pub use document::Document;
pub use scan::{scan_tag, ParsedTag, Span};
pub use tag::Tag;

use thiserror::Error;

/// Terminal parse failures. None of these are recoverable within the
/// parser; the whole input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Tag name not in the whitelist.
    #[error("unknown tag `{0}`")]
    UnknownTag(String),
    /// Child added where the structure disallows it, or a close tag that
    /// does not match the open element.
    #[error("invalid nesting: {0}")]
    InvalidNesting(&'static str),
    /// Input ended while elements were still open.
    #[error("input ended with unclosed elements")]
    UnclosedTag,
    /// A `<` with no matching `>`.
    #[error("malformed tag at offset {position}: missing `>`")]
    MalformedTag { position: usize },
}

/// Parse a restricted-markup message body into a document tree.
///
/// Pure function of the input. Preprocessing replaces literal `<br>`
/// with a newline and trims leading/trailing whitespace of the whole
/// input (not of each text run).
pub fn parse(input: &str) -> Result<Document, ParseError> {
    let preprocessed = input.replace("<br>", "\n");
    let src = preprocessed.trim();

    let mut tree = dom::DomTree::new();
    let mut current = tree.root();
    let mut run_start: Option<usize> = None;
    let bytes = src.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'<' {
            if let Some(start) = run_start.take() {
                tree.push_text(current, src[start..pos].to_string())?;
            }
            let parsed = scan::scan_tag(src, pos)?;
            pos = parsed.document_end();
            current = match parsed {
                ParsedTag::Open { .. } => tree.open_element(current, parsed)?,
                ParsedTag::Close { .. } => tree.close_element(current, parsed)?,
            };
        } else {
            // Text directly between a list container and its items is
            // discarded; list containers hold no text of their own.
            if !tree.is_list(current) && run_start.is_none() {
                run_start = Some(pos);
            }
            pos += 1;
        }
    }

    if let Some(start) = run_start {
        tree.push_text(current, src[start..].to_string())?;
    }
    if current != tree.root() {
        return Err(ParseError::UnclosedTag);
    }

    // The root always builds; an input with no renderable content yields
    // an empty Root.
    Ok(document::build(&tree, tree.root()).unwrap_or_else(|| Document::Root(Vec::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> Document {
        parse(input).unwrap_or_else(|e| panic!("parse failed for {input:?}: {e}"))
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            parse_ok("hello world"),
            Document::Root(vec![Document::Text("hello world".into())])
        );
    }

    #[test]
    fn test_br_becomes_newline() {
        assert_eq!(
            parse_ok("one<br>two"),
            Document::Root(vec![Document::Text("one\ntwo".into())])
        );
    }

    #[test]
    fn test_input_is_trimmed_as_a_whole() {
        assert_eq!(
            parse_ok("  hello  "),
            Document::Root(vec![Document::Text("hello".into())])
        );
    }

    #[test]
    fn test_lone_newline_run_produces_nothing() {
        // A stray <br> between elements collapses to a lone "\n" run,
        // which must not materialize as a text node.
        let doc = parse_ok("<p>a</p><br><p>b</p>");
        assert_eq!(
            doc,
            Document::Root(vec![
                Document::Paragraph("a".into()),
                Document::Paragraph("b".into()),
            ])
        );
    }

    #[test]
    fn test_whitespace_only_run_is_kept() {
        let doc = parse_ok("<p>a</p> <p>b</p>");
        assert_eq!(
            doc,
            Document::Root(vec![
                Document::Paragraph("a".into()),
                Document::Text(" ".into()),
                Document::Paragraph("b".into()),
            ])
        );
    }

    #[test]
    fn test_list_container_text_is_discarded() {
        let doc = parse_ok("<ul>ignored<li>kept</li>also ignored</ul>");
        assert_eq!(
            doc,
            Document::Root(vec![Document::UnorderedList(vec![Document::ListNode(vec![
                Document::Text("kept".into()),
            ])])])
        );
    }

    #[test]
    fn test_ordered_list() {
        let doc = parse_ok("<ol><li>one</li><li>two</li></ol>");
        assert_eq!(
            doc,
            Document::Root(vec![Document::OrderedList(vec![
                Document::ListNode(vec![Document::Text("one".into())]),
                Document::ListNode(vec![Document::Text("two".into())]),
            ])])
        );
    }

    #[test]
    fn test_code_block_unescapes_quot() {
        let doc = parse_ok("<pre><code>let s = &quot;hi&quot;;</code></pre>");
        assert_eq!(
            doc,
            Document::Root(vec![Document::CodeBlock("let s = \"hi\";".into())])
        );
    }

    #[test]
    fn test_heading_levels_survive_build() {
        for level in 1..=6u8 {
            let input = format!("<h{level}>title</h{level}>");
            assert_eq!(
                parse_ok(&input),
                Document::Root(vec![Document::Heading {
                    level,
                    children: vec![Document::Text("title".into())],
                }])
            );
        }
    }

    #[test]
    fn test_open_tag_attributes_tolerated() {
        let doc = parse_ok("<p class=\"lead\">text</p>");
        assert_eq!(doc, Document::Root(vec![Document::Paragraph("text".into())]));
    }

    #[test]
    fn test_unknown_tag_is_terminal() {
        assert_eq!(
            parse("<div>nope</div>"),
            Err(ParseError::UnknownTag("div".into()))
        );
    }

    #[test]
    fn test_unclosed_tag_at_eof() {
        assert_eq!(parse("<p>dangling"), Err(ParseError::UnclosedTag));
        assert_eq!(parse("<ul><li>item</li>"), Err(ParseError::UnclosedTag));
    }

    #[test]
    fn test_malformed_tag() {
        assert!(matches!(parse("text<p"), Err(ParseError::MalformedTag { .. })));
    }

    #[test]
    fn test_invalid_nesting_is_terminal() {
        assert!(matches!(parse("<pre>raw</pre>"), Err(ParseError::InvalidNesting(_))));
        assert!(matches!(parse("<p>a</li>"), Err(ParseError::InvalidNesting(_))));
        assert!(matches!(parse("</p>"), Err(ParseError::InvalidNesting(_))));
    }

    #[test]
    fn test_freestanding_text_around_list() {
        // Literal scenario: two freestanding runs plus five list items.
        let input = "firstFreeStanding<ul>\
            <li>First</li><li>Second</li><li>Third</li><li>Fourth</li><li>Fifth</li>\
            </ul>secondFreeStanding";
        let doc = parse_ok(input);
        assert_eq!(doc.text_leaves(), 7);
    }

    #[test]
    fn test_paragraph_inside_list_item() {
        let doc = parse_ok("foo<ul><li>bar<p>baz</p></li></ul>");
        assert_eq!(doc.text_leaves(), 3);
        assert_eq!(
            doc,
            Document::Root(vec![
                Document::Text("foo".into()),
                Document::UnorderedList(vec![Document::ListNode(vec![
                    Document::Text("bar".into()),
                    Document::Paragraph("baz".into()),
                ])]),
            ])
        );
    }

    #[test]
    fn test_mixed_document() {
        // Headings h1..h4 interleaved with paragraphs, a two-item list
        // and one code block: ten text-bearing leaves in total.
        let input = "<h1>A</h1><p>pa</p><h2>B</h2><p>pb</p><h3>C</h3><p>pc</p><h4>D</h4>\
            <ul><li>one</li><li>two</li></ul>\
            <pre><code>code()</code></pre>";
        let doc = parse_ok(input);
        assert_eq!(doc.text_leaves(), 10);
    }

    #[test]
    fn test_inner_text_round_trips() {
        let doc = parse_ok("<p>exact text 1</p><h2>exact text 2</h2>free run");
        assert_eq!(
            doc,
            Document::Root(vec![
                Document::Paragraph("exact text 1".into()),
                Document::Heading {
                    level: 2,
                    children: vec![Document::Text("exact text 2".into())],
                },
                Document::Text("free run".into()),
            ])
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Ok(Document::Root(vec![])));
        assert_eq!(parse("   \n  "), Ok(Document::Root(vec![])));
    }

    #[test]
    fn test_multibyte_text() {
        let doc = parse_ok("<p>héllo wörld 🦀</p>");
        assert_eq!(doc, Document::Root(vec![Document::Paragraph("héllo wörld 🦀".into())]));
    }
}
