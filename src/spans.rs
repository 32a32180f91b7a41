//! Span mapping
//!
//! Converts a token-level edit script back into user-facing [`Difference`]s
//! carrying byte spans into the original documents.
//!
//! Each non-`Equal` operation covers the range from its first token's start
//! to its last token's end on every side where it has tokens. Adjacent
//! operations of the same kind with no `Equal` between them are merged. The
//! result is checked before it is returned: within each document the spans
//! must be non-empty, sorted ascending and pairwise non-overlapping. A
//! violation is a defect in the pipeline and is reported as
//! [`DocDiffError::InternalConsistency`] instead of producing corrupted
//! highlights.

use crate::error::{DocDiffError, Result};
use crate::types::{Difference, DifferenceKind, DocumentSide, EditOperation, Span, Token};
use std::ops::Range;
use tracing::error;

/// The two documents a difference list refers to
#[derive(Debug, Clone, Copy)]
pub struct DocumentPair<'a> {
    /// Tokens of document A
    pub tokens_a: &'a [Token],
    /// Tokens of document B
    pub tokens_b: &'a [Token],
    /// Original text of document A
    pub text_a: &'a str,
    /// Original text of document B
    pub text_b: &'a str,
}

/// Map an edit script to differences with original-document spans
///
/// `preview_chars` bounds each side of the generated preview.
///
/// # Errors
///
/// Returns [`DocDiffError::InternalConsistency`] if an operation refers to
/// tokens that do not exist or if the resulting spans are not a sorted,
/// non-overlapping partition of each document.
pub fn map_to_spans(
    ops: &[EditOperation],
    docs: DocumentPair<'_>,
    preview_chars: usize,
) -> Result<Vec<Difference>> {
    let mut differences: Vec<Difference> = Vec::new();
    let mut after_change = false;

    for op in ops {
        let Some(kind) = DifferenceKind::from_edit(op.kind) else {
            after_change = false;
            continue;
        };
        let span_a = token_span(docs.tokens_a, &op.a, DocumentSide::A)?;
        let span_b = token_span(docs.tokens_b, &op.b, DocumentSide::B)?;

        if after_change {
            if let Some(last) = differences.last_mut() {
                if last.kind == kind {
                    last.document_a = merge(last.document_a, span_a);
                    last.document_b = merge(last.document_b, span_b);
                    continue;
                }
            }
        }

        differences.push(Difference {
            kind,
            document_a: span_a,
            document_b: span_b,
            preview: String::new(),
        });
        after_change = true;
    }

    verify_partition(&differences)?;

    for difference in &mut differences {
        difference.preview = preview(difference, docs.text_a, docs.text_b, preview_chars);
    }
    Ok(differences)
}

fn token_span(tokens: &[Token], range: &Range<usize>, side: DocumentSide) -> Result<Option<Span>> {
    if range.is_empty() {
        return Ok(None);
    }
    match (tokens.get(range.start), tokens.get(range.end - 1)) {
        (Some(first), Some(last)) => Ok(Some(Span::new(first.start, last.end))),
        _ => Err(DocDiffError::inconsistency(format!(
            "token range {:?} out of bounds for document {} ({} tokens)",
            range,
            side,
            tokens.len()
        ))),
    }
}

fn merge(existing: Option<Span>, next: Option<Span>) -> Option<Span> {
    match (existing, next) {
        (Some(a), Some(b)) => Some(a.cover(&b)),
        (a, b) => a.or(b),
    }
}

/// Check span shapes and the sorted, non-overlapping post-condition
pub fn verify_partition(differences: &[Difference]) -> Result<()> {
    for (index, difference) in differences.iter().enumerate() {
        let shape_ok = match difference.kind {
            DifferenceKind::Addition => {
                difference.document_a.is_none() && difference.document_b.is_some()
            }
            DifferenceKind::Deletion => {
                difference.document_a.is_some() && difference.document_b.is_none()
            }
            DifferenceKind::Modification => {
                difference.document_a.is_some() && difference.document_b.is_some()
            }
        };
        if !shape_ok {
            return Err(report(format!(
                "difference {} is a {} with spans A={:?} B={:?}",
                index, difference.kind, difference.document_a, difference.document_b
            )));
        }
    }

    for side in [DocumentSide::A, DocumentSide::B] {
        let mut previous: Option<(usize, Span)> = None;
        for (index, span) in differences
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.span(side).map(|s| (i, s)))
        {
            if span.is_empty() {
                return Err(report(format!(
                    "difference {} has an empty span {:?} in document {}",
                    index, span, side
                )));
            }
            if let Some((prev_index, prev)) = previous {
                if prev.end > span.start {
                    return Err(report(format!(
                        "differences {} and {} overlap or are unsorted in document {}: {:?} then {:?}",
                        prev_index, index, side, prev, span
                    )));
                }
            }
            previous = Some((index, span));
        }
    }
    Ok(())
}

fn report(message: String) -> DocDiffError {
    error!("Span mapping invariant violated: {}", message);
    DocDiffError::inconsistency(message)
}

fn preview(difference: &Difference, text_a: &str, text_b: &str, max_chars: usize) -> String {
    let side = |span: Option<Span>, text: &str| {
        span.and_then(|s| s.slice(text))
            .map(|s| excerpt(s, max_chars))
            .unwrap_or_default()
    };
    match difference.kind {
        DifferenceKind::Addition => side(difference.document_b, text_b),
        DifferenceKind::Deletion => side(difference.document_a, text_a),
        DifferenceKind::Modification => format!(
            "{} → {}",
            side(difference.document_a, text_a),
            side(difference.document_b, text_b)
        ),
    }
}

/// Collapse whitespace and cut to `max_chars` characters
fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
