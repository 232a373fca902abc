//! Tag scanning: spans and the single-tag scanner.

use super::tag::Tag;
use super::ParseError;

/// Inclusive character range `[start, end]` into the preprocessed input.
///
/// A span with `start == end` is empty; otherwise its length counts both
/// endpoints. Tag spans cover `<` through the matching `>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Number of characters covered, 0 when `start == end`.
    pub fn len(&self) -> usize {
        if self.start == self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The covered slice of the input.
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.start + self.len()]
    }
}

/// A single scanned tag, open or close, with its source span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParsedTag {
    Open { span: Span, tag: Tag },
    Close { span: Span, tag: Tag },
}

impl ParsedTag {
    pub fn tag(&self) -> Tag {
        match self {
            ParsedTag::Open { tag, .. } | ParsedTag::Close { tag, .. } => *tag,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParsedTag::Open { span, .. } | ParsedTag::Close { span, .. } => *span,
        }
    }

    /// Position of the tag's `<` in the input.
    pub fn document_start(&self) -> usize {
        self.span().start
    }

    /// Position one past the tag's `>`.
    pub fn document_end(&self) -> usize {
        let span = self.span();
        span.start + span.len()
    }

    /// Where an open tag's inner content begins. Equals [`document_end`]
    /// and is only meaningful for `Open` tags.
    ///
    /// [`document_end`]: ParsedTag::document_end
    pub fn inner_content_start(&self) -> usize {
        debug_assert!(matches!(self, ParsedTag::Open { .. }));
        self.document_end()
    }
}

/// Scan the tag starting at `pos`, which must index a `<` in `input`.
///
/// Close tags must consist of exactly `/` and a whitelisted name. Open
/// tags may carry attributes; the name is truncated at the first space.
pub fn scan_tag(input: &str, pos: usize) -> Result<ParsedTag, ParseError> {
    debug_assert_eq!(input.as_bytes().get(pos), Some(&b'<'));

    let end = pos
        + input[pos..]
            .find('>')
            .ok_or(ParseError::MalformedTag { position: pos })?;
    let span = Span::new(pos, end);
    let inner = &input[pos + 1..end];

    if let Some(name) = inner.strip_prefix('/') {
        let tag = Tag::from_name(name).ok_or_else(|| ParseError::UnknownTag(name.to_string()))?;
        Ok(ParsedTag::Close { span, tag })
    } else {
        let name = inner.split(' ').next().unwrap_or(inner);
        let tag = Tag::from_name(name).ok_or_else(|| ParseError::UnknownTag(name.to_string()))?;
        Ok(ParsedTag::Open { span, tag })
    }
}
