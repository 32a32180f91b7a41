//! Core data types used throughout the docdiff library
//!
//! This module contains the data structures shared by the pipeline stages.
//!
//! ## Overview
//!
//! The types in this module represent:
//! - **Text units**: `Token`, `Span` - comparable units and byte ranges in the original text
//! - **Alignment**: `EditKind`, `EditOperation` - token-level edit script steps
//! - **Results**: `Difference`, `DifferenceList`, `DiffSummary`, `ChangeStats` - what the UI consumes
//! - **Navigation**: `KindFilter`, `Generation` - filtering and recomputation bookkeeping
//! - **Configuration**: `DiffOptions`, `TokenizerMode` - engine parameters
//!
//! ## Examples
//!
//! ```rust
//! use docdiff::types::{DiffOptions, TokenizerMode};
//!
//! let options = DiffOptions {
//!     tokenizer: TokenizerMode::Whitespace,
//!     ignore_case: true,
//!     ..Default::default()
//! };
//! assert!(options.validate().is_ok());
//! ```

use crate::error::{DocDiffError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::Path;

/// A minimal comparable unit of text
///
/// Offsets are byte offsets into the owning document and always fall on
/// UTF-8 character boundaries, so `&text[token.start..token.end] == token.text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// The token text, exactly as it appears in the document
    pub text: String,
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Token {
    /// Create a new token
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Byte span of this token
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// A half-open byte range `[start, end)` into an original document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: usize,
    /// End position (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both `self` and `other`
    pub fn cover(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Slice the span out of `text`, if it fits
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

/// Identifies one of the two compared documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentSide {
    /// The original document
    A,
    /// The revised document
    B,
}

impl fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSide::A => write!(f, "A"),
            DocumentSide::B => write!(f, "B"),
        }
    }
}

/// Classification of one alignment step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    /// Tokens present in both documents
    Equal,
    /// Tokens present only in document B
    Insert,
    /// Tokens present only in document A
    Delete,
    /// Tokens of A replaced by tokens of B
    Replace,
}

/// One step of a token-level edit script
///
/// `a` and `b` are token index ranges. An `Insert` has an empty `a` range
/// positioned at the alignment point, a `Delete` an empty `b` range. Across
/// an edit script the `a` ranges tile the A tokens and the `b` ranges tile the
/// B tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditOperation {
    /// Kind of step
    pub kind: EditKind,
    /// Token range in document A
    pub a: Range<usize>,
    /// Token range in document B
    pub b: Range<usize>,
}

impl EditOperation {
    /// Create a new edit operation
    pub fn new(kind: EditKind, a: Range<usize>, b: Range<usize>) -> Self {
        Self { kind, a, b }
    }

    /// Whether this step leaves the text unchanged
    pub fn is_equal(&self) -> bool {
        self.kind == EditKind::Equal
    }
}

/// User-facing classification of a difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceKind {
    /// Text present only in document B
    Addition,
    /// Text present only in document A
    Deletion,
    /// Text of A replaced by text of B
    Modification,
}

impl DifferenceKind {
    /// Map an edit kind to the difference it produces, if any
    pub fn from_edit(kind: EditKind) -> Option<Self> {
        match kind {
            EditKind::Equal => None,
            EditKind::Insert => Some(DifferenceKind::Addition),
            EditKind::Delete => Some(DifferenceKind::Deletion),
            EditKind::Replace => Some(DifferenceKind::Modification),
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifferenceKind::Addition => "addition",
            DifferenceKind::Deletion => "deletion",
            DifferenceKind::Modification => "modification",
        };
        f.write_str(name)
    }
}

/// An offset-stamped difference between the two documents
///
/// A `Modification` has spans in both documents, an `Addition` only in B and
/// a `Deletion` only in A. Spans always refer to the original, untouched text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    /// Kind of difference
    pub kind: DifferenceKind,
    /// Affected range of document A
    pub document_a: Option<Span>,
    /// Affected range of document B
    pub document_b: Option<Span>,
    /// Short human-readable excerpt of the changed text
    pub preview: String,
}

impl Difference {
    /// Span of this difference in the given document
    pub fn span(&self, side: DocumentSide) -> Option<Span> {
        match side {
            DocumentSide::A => self.document_a,
            DocumentSide::B => self.document_b,
        }
    }

    /// Offset used to order differences (A offset, B offset for pure additions)
    pub fn position(&self) -> usize {
        self.document_a
            .or(self.document_b)
            .map(|s| s.start)
            .unwrap_or(0)
    }
}

/// Per-kind difference counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Number of additions
    pub additions: usize,
    /// Number of deletions
    pub deletions: usize,
    /// Number of modifications
    pub modifications: usize,
    /// Total number of differences
    pub total: usize,
}

impl DiffSummary {
    /// Count the differences by kind
    pub fn from_differences(differences: &[Difference]) -> Self {
        let mut summary = DiffSummary::default();
        for difference in differences {
            match difference.kind {
                DifferenceKind::Addition => summary.additions += 1,
                DifferenceKind::Deletion => summary.deletions += 1,
                DifferenceKind::Modification => summary.modifications += 1,
            }
        }
        summary.total = differences.len();
        summary
    }

    /// Whether the documents are identical at token level
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Token and byte level statistics about a comparison
///
/// # Examples
///
/// ```rust
/// # use docdiff::types::ChangeStats;
/// let stats = ChangeStats {
///     tokens_a: 3,
///     tokens_b: 4,
///     tokens_equal: 2,
///     ..Default::default()
/// };
/// assert!((stats.similarity() - 4.0 / 7.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeStats {
    /// Number of tokens in document A
    pub tokens_a: usize,
    /// Number of tokens in document B
    pub tokens_b: usize,
    /// Number of tokens matched between the documents
    pub tokens_equal: usize,
    /// Bytes of B covered by additions
    pub bytes_added: usize,
    /// Bytes of A covered by deletions
    pub bytes_deleted: usize,
    /// Bytes of A covered by modifications
    pub bytes_modified_a: usize,
    /// Bytes of B covered by modifications
    pub bytes_modified_b: usize,
}

impl ChangeStats {
    /// Dice similarity over tokens: `2 * equal / (a + b)`, 1.0 for two empty documents
    pub fn similarity(&self) -> f64 {
        let total = self.tokens_a + self.tokens_b;
        if total == 0 {
            return 1.0;
        }
        (2 * self.tokens_equal) as f64 / total as f64
    }
}

/// Monotonic tag distinguishing the current recomputation from superseded ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation following this one
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The ordered, typed result of one comparison
///
/// This is the only pipeline output retained across user interaction, and
/// the stable serializable form handed to analysis providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceList {
    /// Generation of the computation that produced this list
    pub generation: Generation,
    /// Differences ordered by position
    pub differences: Vec<Difference>,
    /// Per-kind counts
    pub summary: DiffSummary,
    /// Token and byte statistics
    pub stats: ChangeStats,
    /// When the comparison finished
    pub computed_at: DateTime<Utc>,
}

impl DifferenceList {
    /// Build a list, deriving the summary from the differences
    pub fn new(generation: Generation, differences: Vec<Difference>, stats: ChangeStats) -> Self {
        let summary = DiffSummary::from_differences(&differences);
        Self {
            generation,
            differences,
            summary,
            stats,
            computed_at: Utc::now(),
        }
    }

    /// Number of differences
    pub fn len(&self) -> usize {
        self.differences.len()
    }

    /// Whether there are no differences
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    /// Serialize the list as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Filter applied to the difference list by the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    /// Every difference
    #[default]
    All,
    /// Additions only
    Additions,
    /// Deletions only
    Deletions,
    /// Modifications only
    Modifications,
}

impl KindFilter {
    /// Whether a difference of `kind` passes this filter
    pub fn matches(&self, kind: DifferenceKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Additions => kind == DifferenceKind::Addition,
            KindFilter::Deletions => kind == DifferenceKind::Deletion,
            KindFilter::Modifications => kind == DifferenceKind::Modification,
        }
    }
}

/// How documents are split into tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerMode {
    /// Maximal runs of non-whitespace characters
    Whitespace,
    /// Whitespace runs with leading and trailing punctuation split off
    #[default]
    Punctuation,
}

/// Options controlling a comparison
///
/// Every field has a default, so a configuration file only needs to name the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Tokenization policy
    pub tokenizer: TokenizerMode,
    /// Compare tokens case-insensitively
    pub ignore_case: bool,
    /// Maximum number of tokens per document
    pub max_tokens: usize,
    /// Maximum number of diagonals the aligner may visit for one comparison
    pub max_alignment_cost: u64,
    /// Maximum characters per side in a difference preview
    pub preview_chars: usize,
    /// Combined input size in bytes above which documents are tokenized in parallel
    pub parallel_threshold: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerMode::default(),
            ignore_case: false,
            max_tokens: 500_000,
            max_alignment_cost: 200_000_000,
            preview_chars: 80,
            parallel_threshold: 64 * 1024,
        }
    }
}

impl DiffOptions {
    /// Check the options for values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(DocDiffError::config("max_tokens must be greater than zero"));
        }
        if self.max_alignment_cost == 0 {
            return Err(DocDiffError::config("max_alignment_cost must be greater than zero"));
        }
        if self.preview_chars == 0 {
            return Err(DocDiffError::config("preview_chars must be greater than zero"));
        }
        Ok(())
    }

    /// Load and validate options from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: DiffOptions = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }
}
