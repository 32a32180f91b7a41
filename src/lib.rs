//! # docdiff - Deterministic document comparison
//!
//! A token-level diff engine for comparing two versions of a document, such
//! as a contract and its redline, and presenting the changes in a UI.
//!
//! ## Overview
//!
//! docdiff turns two plain-text documents into a navigable list of changes:
//! - Split each document into word and punctuation tokens that keep their
//!   exact byte offsets
//! - Compute a minimal alignment between the token sequences with a
//!   linear-space Myers diff
//! - Classify changes as additions, deletions and modifications, stamped with
//!   spans into the untouched originals
//! - Filter and navigate the changes with a cursor that wraps around
//! - Render each document as plain and highlighted runs without splicing
//!   markup into the text
//!
//! ## Architecture
//!
//! ```text
//! text A ─┐                                          ┌─▶ render(A)
//!         ├─▶ tokenizer ─▶ align ─▶ spans ─▶ store ──┤
//! text B ─┘                                          └─▶ render(B)
//! ```
//!
//! - **Tokenizer**: whitespace and punctuation aware, never drops characters
//! - **Aligner**: Myers O(ND) with greedy prefix matching, so results are
//!   deterministic and the first unchanged run is as long as possible
//! - **Span mapper**: converts token ranges to byte spans and verifies that
//!   spans are sorted and non-overlapping
//! - **Store**: filter, cursor and an Idle/Computing/Ready state machine with
//!   generation-tagged results
//! - **Session**: runs comparisons on tokio's blocking pool and applies only
//!   the newest generation
//!
//! ## Quick Start
//!
//! ```rust
//! use docdiff::{compare, DifferenceKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let list = compare("the cat sat", "the dog sat down")?;
//!
//! assert_eq!(list.summary.total, 2);
//! assert_eq!(list.differences[0].kind, DifferenceKind::Modification);
//! assert_eq!(list.differences[1].kind, DifferenceKind::Addition);
//! # Ok(())
//! # }
//! ```
//!
//! ### Navigating Differences
//!
//! ```rust
//! use docdiff::{DiffEngine, DifferenceStore, KindFilter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DiffEngine::default();
//! let mut store = DifferenceStore::new();
//!
//! let generation = store.begin();
//! store.complete(generation, engine.compare_tagged(generation, "a b c", "a x c d"));
//!
//! store.set_filter(KindFilter::All);
//! store.next();
//! assert_eq!(store.position(), Some((2, 2)));
//! store.next();
//! assert_eq!(store.position(), Some((1, 2)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, DocDiffError>`:
//! - `ResourceExceeded` when a document is too large to diff
//! - `InternalConsistency` when span mapping breaks its invariants
//! - `InvalidSpan` when the renderer is handed spans that do not fit the text
//!
//! ## Module Organization
//!
//! - [`tokenizer`]: Splitting text into offset-stamped tokens
//! - [`align`]: Minimal edit scripts between token sequences
//! - [`spans`]: Edit scripts to offset-stamped differences
//! - [`store`]: Filtering, navigation and recomputation state
//! - [`render`]: Highlight runs for one document or both interleaved
//! - [`engine`]: The full pipeline and its builder
//! - [`session`]: Background comparisons with generation tagging
//! - [`analysis`]: The analysis provider interface
//! - [`types`]: Common types and configuration
//! - [`error`]: Error types and handling

// Public API modules
pub mod align;
pub mod analysis;
pub mod engine;
pub mod error;
pub mod render;
pub mod session;
pub mod spans;
pub mod store;
pub mod tokenizer;
pub mod types;

// Internal modules (not part of public API)
mod collections;

// Re-export main types for convenience
pub use analysis::{AnalysisProvider, ChangeReport, ChangeStatsProvider};
pub use engine::{DiffEngine, DiffEngineBuilder};
pub use error::{DocDiffError, Result};
pub use render::{render, render_unified, Highlight, Run, UnifiedRun};
pub use session::ComparisonSession;
pub use store::{Completion, DifferenceStore, StoreState};
pub use types::*;

/// Compare two documents with default options
///
/// Shorthand for `DiffEngine::default().compare(text_a, text_b)`.
pub fn compare(text_a: &str, text_b: &str) -> Result<DifferenceList> {
    DiffEngine::default().compare(text_a, text_b)
}
