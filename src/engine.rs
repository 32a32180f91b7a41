//! Comparison engine
//!
//! This module provides [`DiffEngine`], which runs the whole pipeline for a
//! document pair as one unit of work:
//!
//! 1. **Tokenize** both documents (in parallel for large inputs)
//! 2. **Align** the token sequences into a coalesced edit script
//! 3. **Map** the edit script to differences with original-text spans
//! 4. **Summarize** the result into a [`DifferenceList`]
//!
//! The engine is stateless apart from its options, so one instance can be
//! shared between threads and sessions.
//!
//! ## Examples
//!
//! ```rust
//! use docdiff::{DiffEngineBuilder, DifferenceKind};
//! use docdiff::types::TokenizerMode;
//!
//! # fn main() -> docdiff::Result<()> {
//! let engine = DiffEngineBuilder::new()
//!     .tokenizer(TokenizerMode::Punctuation)
//!     .ignore_case(true)
//!     .max_tokens(250_000)
//!     .build()?;
//!
//! let list = engine.compare("The Landlord shall repair.", "the landlord may repair.")?;
//! assert_eq!(list.summary.modifications, 1);
//! assert_eq!(list.differences[0].kind, DifferenceKind::Modification);
//! # Ok(())
//! # }
//! ```

use crate::align::align;
use crate::error::Result;
use crate::spans::{map_to_spans, DocumentPair};
use crate::tokenizer::tokenize;
use crate::types::{
    ChangeStats, DiffOptions, Difference, DifferenceKind, DifferenceList, EditOperation,
    Generation, Token, TokenizerMode,
};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Runs the tokenize → align → map pipeline for document pairs
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    options: DiffOptions,
}

impl DiffEngine {
    /// Create an engine with the given options
    ///
    /// # Errors
    ///
    /// Returns [`crate::DocDiffError::InvalidConfiguration`] if the options
    /// fail validation.
    pub fn new(options: DiffOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Options this engine runs with
    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Tokenize a single document with the engine's policy
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize(text, self.options.tokenizer)
    }

    /// Compare two documents
    ///
    /// The resulting list carries the default generation; use
    /// [`DiffEngine::compare_tagged`] when feeding a [`crate::DifferenceStore`].
    pub fn compare(&self, text_a: &str, text_b: &str) -> Result<DifferenceList> {
        self.compare_tagged(Generation::default(), text_a, text_b)
    }

    /// Compare two documents on behalf of the given store generation
    ///
    /// # Errors
    ///
    /// - [`crate::DocDiffError::ResourceExceeded`] if a document has more
    ///   tokens than `max_tokens`
    /// - [`crate::DocDiffError::AlignmentBudgetExceeded`] if the documents
    ///   diverge too much to align within `max_alignment_cost`
    /// - [`crate::DocDiffError::InternalConsistency`] if span mapping breaks
    ///   its post-condition
    #[instrument(skip_all, fields(generation = %generation, bytes_a = text_a.len(), bytes_b = text_b.len()))]
    pub fn compare_tagged(
        &self,
        generation: Generation,
        text_a: &str,
        text_b: &str,
    ) -> Result<DifferenceList> {
        let start = Instant::now();

        let (tokens_a, tokens_b) = self.tokenize_pair(text_a, text_b);
        debug!(
            "Tokenized {} + {} tokens in {:?}",
            tokens_a.len(),
            tokens_b.len(),
            start.elapsed()
        );

        let ops = align(&tokens_a, &tokens_b, &self.options)?;
        debug!("Aligned {} operations in {:?}", ops.len(), start.elapsed());

        let docs = DocumentPair {
            tokens_a: &tokens_a,
            tokens_b: &tokens_b,
            text_a,
            text_b,
        };
        let differences = map_to_spans(&ops, docs, self.options.preview_chars)?;
        let stats = change_stats(&ops, &differences, tokens_a.len(), tokens_b.len());
        let list = DifferenceList::new(generation, differences, stats);

        info!(
            "Comparison {} found {} differences (+{} -{} ~{}) in {:?}",
            generation,
            list.summary.total,
            list.summary.additions,
            list.summary.deletions,
            list.summary.modifications,
            start.elapsed()
        );
        Ok(list)
    }

    fn tokenize_pair(&self, text_a: &str, text_b: &str) -> (Vec<Token>, Vec<Token>) {
        let mode = self.options.tokenizer;
        if text_a.len() + text_b.len() >= self.options.parallel_threshold {
            rayon::join(|| tokenize(text_a, mode), || tokenize(text_b, mode))
        } else {
            (tokenize(text_a, mode), tokenize(text_b, mode))
        }
    }
}

fn change_stats(
    ops: &[EditOperation],
    differences: &[Difference],
    tokens_a: usize,
    tokens_b: usize,
) -> ChangeStats {
    let mut stats = ChangeStats {
        tokens_a,
        tokens_b,
        tokens_equal: ops
            .iter()
            .filter(|op| op.is_equal())
            .map(|op| op.a.len())
            .sum(),
        ..Default::default()
    };
    for difference in differences {
        let len_a = difference.document_a.map(|s| s.len()).unwrap_or(0);
        let len_b = difference.document_b.map(|s| s.len()).unwrap_or(0);
        match difference.kind {
            DifferenceKind::Addition => stats.bytes_added += len_b,
            DifferenceKind::Deletion => stats.bytes_deleted += len_a,
            DifferenceKind::Modification => {
                stats.bytes_modified_a += len_a;
                stats.bytes_modified_b += len_b;
            }
        }
    }
    stats
}

/// Builder for configuring a [`DiffEngine`]
///
/// # Examples
///
/// ```rust
/// use docdiff::DiffEngineBuilder;
///
/// let engine = DiffEngineBuilder::new()
///     .preview_chars(40)
///     .build()
///     .unwrap();
/// assert_eq!(engine.options().preview_chars, 40);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiffEngineBuilder {
    options: DiffOptions,
}

impl DiffEngineBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a complete set of options, e.g. loaded from a file
    pub fn options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the tokenization policy
    pub fn tokenizer(mut self, mode: TokenizerMode) -> Self {
        self.options.tokenizer = mode;
        self
    }

    /// Compare tokens case-insensitively
    pub fn ignore_case(mut self, ignore: bool) -> Self {
        self.options.ignore_case = ignore;
        self
    }

    /// Set the per-document token ceiling
    ///
    /// Documents above the ceiling fail with
    /// [`crate::DocDiffError::ResourceExceeded`] instead of running an
    /// unbounded alignment.
    pub fn max_tokens(mut self, max: usize) -> Self {
        self.options.max_tokens = max;
        self
    }

    /// Set the alignment search budget
    ///
    /// Document pairs that diverge too much to align within the budget fail
    /// with [`crate::DocDiffError::AlignmentBudgetExceeded`].
    pub fn max_alignment_cost(mut self, cost: u64) -> Self {
        self.options.max_alignment_cost = cost;
        self
    }

    /// Set the preview length per side, in characters
    pub fn preview_chars(mut self, chars: usize) -> Self {
        self.options.preview_chars = chars;
        self
    }

    /// Set the combined input size above which tokenization runs in parallel
    pub fn parallel_threshold(mut self, bytes: usize) -> Self {
        self.options.parallel_threshold = bytes;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<DiffEngine> {
        DiffEngine::new(self.options)
    }
}
