//! Highlight rendering
//!
//! Turns one document and a list of differences into an ordered sequence of
//! [`Run`]s: plain stretches of text interleaved with highlighted stretches
//! tagged by difference kind. The runs partition the text, so concatenating
//! them reproduces it exactly.
//!
//! The renderer walks the text once and consumes spans in order. It never
//! splices markup into the text and never re-reads what it has emitted, so
//! adjacent and zero-length spans cannot shift later offsets.
//!
//! ## Examples
//!
//! ```rust
//! use docdiff::render::render;
//! use docdiff::types::DocumentSide;
//!
//! # fn main() -> docdiff::Result<()> {
//! let list = docdiff::compare("the cat sat", "the dog sat down")?;
//! let runs = render("the dog sat down", &list.differences, DocumentSide::B, Some(1))?;
//!
//! let texts: Vec<&str> = runs.iter().map(|r| r.text).collect();
//! assert_eq!(texts, ["the ", "dog", " sat ", "down"]);
//! assert!(runs[3].highlight.unwrap().active);
//! # Ok(())
//! # }
//! ```

use crate::error::{DocDiffError, Result};
use crate::tokenizer::tokenize;
use crate::types::{Difference, DifferenceKind, DocumentSide, Span, Token, TokenizerMode};
use serde::Serialize;

/// Tag attached to a highlighted run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    /// Kind of the difference covering the run
    pub kind: DifferenceKind,
    /// Index of the difference in the slice passed to [`render`]
    pub index: usize,
    /// Whether `index` is the active difference
    pub active: bool,
}

/// A stretch of the rendered document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Run<'a> {
    /// The text of the run, borrowed from the document
    pub text: &'a str,
    /// Highlight tag, `None` for unchanged text
    pub highlight: Option<Highlight>,
}

/// Render `text` as document `side` of the given differences
///
/// Differences without a span on `side` are skipped but keep their index, so
/// `active` and [`Highlight::index`] refer to positions in `differences`
/// (typically the store's filtered view).
///
/// # Errors
///
/// Returns [`DocDiffError::InvalidSpan`] if a span lies outside `text`, does
/// not fall on character boundaries, or starts before the previous span ends.
pub fn render<'a>(
    text: &'a str,
    differences: &[Difference],
    side: DocumentSide,
    active: Option<usize>,
) -> Result<Vec<Run<'a>>> {
    render_with(text, differences.iter(), side, active)
}

/// [`render`] over any ordered sequence of difference references
///
/// Accepts the store's `filtered()` output directly.
pub fn render_with<'a, 'd>(
    text: &'a str,
    differences: impl IntoIterator<Item = &'d Difference>,
    side: DocumentSide,
    active: Option<usize>,
) -> Result<Vec<Run<'a>>> {
    let mut runs = Vec::new();
    let mut pos = 0;

    for (index, difference) in differences.into_iter().enumerate() {
        let Some(span) = difference.span(side) else {
            continue;
        };
        check_span(text, span, pos)?;
        if span.is_empty() {
            continue;
        }

        if pos < span.start {
            runs.push(Run {
                text: &text[pos..span.start],
                highlight: None,
            });
        }
        runs.push(Run {
            text: &text[span.start..span.end],
            highlight: Some(Highlight {
                kind: difference.kind,
                index,
                active: active == Some(index),
            }),
        });
        pos = span.end;
    }

    if pos < text.len() {
        runs.push(Run {
            text: &text[pos..],
            highlight: None,
        });
    }
    Ok(runs)
}

fn check_span(text: &str, span: Span, pos: usize) -> Result<()> {
    let invalid = |reason| DocDiffError::InvalidSpan {
        start: span.start,
        end: span.end,
        len: text.len(),
        reason,
    };
    if span.start > span.end || span.end > text.len() {
        return Err(invalid("out of bounds"));
    }
    if span.start < pos {
        return Err(invalid("overlaps or precedes the previous span"));
    }
    if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end) {
        return Err(invalid("not on a character boundary"));
    }
    Ok(())
}

/// A stretch of the unified view of both documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnifiedRun<'a> {
    /// The text of the run, borrowed from the document named by `side`
    pub text: &'a str,
    /// Document the text comes from
    pub side: DocumentSide,
    /// Highlight tag, `None` for unchanged text
    pub highlight: Option<Highlight>,
}

/// Render both documents as one interleaved sequence
///
/// Unchanged text is taken from document B. Each difference contributes its
/// A text (if any) followed by its B text (if any), so a modification reads
/// as the old wording directly followed by the new one. Concatenating the
/// runs with `side == B` reproduces `text_b`; likewise for A once unchanged
/// runs are replaced by their A counterparts.
///
/// Additions have no span in A and deletions none in B. Their position on the
/// other side is recovered by counting the unchanged tokens since the previous
/// difference, so `differences` must be the complete list of the comparison
/// and `mode` the policy it was computed with.
///
/// # Errors
///
/// Returns [`DocDiffError::InvalidSpan`] if a span does not fit its document
/// or the differences are out of order.
pub fn render_unified<'a, 'd>(
    text_a: &'a str,
    text_b: &'a str,
    differences: impl IntoIterator<Item = &'d Difference>,
    mode: TokenizerMode,
    active: Option<usize>,
) -> Result<Vec<UnifiedRun<'a>>> {
    let tokens_a = tokenize(text_a, mode);
    let tokens_b = tokenize(text_b, mode);
    let mut runs = Vec::new();
    let (mut pos_a, mut pos_b) = (0, 0);

    for (index, difference) in differences.into_iter().enumerate() {
        let (start_a, start_b) = match (difference.document_a, difference.document_b) {
            (Some(a), Some(b)) => (a.start, b.start),
            (Some(a), None) => (a.start, anchor(&tokens_a, pos_a, a.start, &tokens_b, pos_b, text_b.len())),
            (None, Some(b)) => (anchor(&tokens_b, pos_b, b.start, &tokens_a, pos_a, text_a.len()), b.start),
            (None, None) => continue,
        };
        let span_a = difference.document_a.unwrap_or(Span::new(start_a, start_a));
        let span_b = difference.document_b.unwrap_or(Span::new(start_b, start_b));
        check_span(text_a, span_a, pos_a)?;
        check_span(text_b, span_b, pos_b)?;

        if pos_b < span_b.start {
            runs.push(UnifiedRun {
                text: &text_b[pos_b..span_b.start],
                side: DocumentSide::B,
                highlight: None,
            });
        }
        let highlight = Some(Highlight {
            kind: difference.kind,
            index,
            active: active == Some(index),
        });
        for (text, span, side) in [(text_a, span_a, DocumentSide::A), (text_b, span_b, DocumentSide::B)] {
            if !span.is_empty() {
                runs.push(UnifiedRun {
                    text: &text[span.start..span.end],
                    side,
                    highlight,
                });
            }
        }
        pos_a = span_a.end;
        pos_b = span_b.end;
    }

    if pos_b < text_b.len() {
        runs.push(UnifiedRun {
            text: &text_b[pos_b..],
            side: DocumentSide::B,
            highlight: None,
        });
    }
    Ok(runs)
}

/// Offset in the other document matching `end` in this one
///
/// The unchanged stretch `[pos, end)` holds the same number of tokens in both
/// documents; the result is the start of the first token after that many
/// tokens on the other side, or the end of the other text.
fn anchor(
    tokens: &[Token],
    pos: usize,
    end: usize,
    other_tokens: &[Token],
    other_pos: usize,
    other_len: usize,
) -> usize {
    let unchanged = tokens
        .partition_point(|t| t.start < end)
        .saturating_sub(tokens.partition_point(|t| t.start < pos));
    let first = other_tokens.partition_point(|t| t.start < other_pos);
    other_tokens
        .get(first + unchanged)
        .map(|t| t.start)
        .unwrap_or(other_len)
}
