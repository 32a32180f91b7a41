//! Difference store
//!
//! Holds the current [`DifferenceList`] together with the view state a
//! comparison UI needs: a kind filter, a cursor into the filtered view and
//! the recomputation state machine.
//!
//! ## States
//!
//! ```text
//! Idle ──begin──▶ Computing ──complete(ok)──▶ Ready
//!  ▲                 │  ▲                       │
//!  └──complete(err)──┘  └─────────begin─────────┘
//! ```
//!
//! Every [`DifferenceStore::begin`] bumps the generation. A completion is only
//! accepted when its generation is the current one; anything older is dropped
//! silently. A successful completion swaps the list in one step, so a reader
//! never sees a mix of generations. A failed completion keeps the previous
//! list (if any) and records the error.
//!
//! ## Examples
//!
//! ```rust
//! use docdiff::store::DifferenceStore;
//! use docdiff::types::KindFilter;
//! use docdiff::DiffEngine;
//!
//! # fn main() -> docdiff::Result<()> {
//! let engine = DiffEngine::default();
//! let mut store = DifferenceStore::new();
//!
//! let generation = store.begin();
//! let result = engine.compare_tagged(generation, "the cat sat", "the dog sat down");
//! store.complete(generation, result);
//!
//! store.set_filter(KindFilter::Additions);
//! assert_eq!(store.filtered().len(), 1);
//! assert_eq!(store.position(), Some((1, 1)));
//! # Ok(())
//! # }
//! ```

use crate::error::DocDiffError;
use crate::types::{Difference, DiffSummary, DifferenceList, Generation, KindFilter};
use std::sync::Arc;
use tracing::{debug, warn};

/// Recomputation state of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No documents have been compared yet
    Idle,
    /// A computation of this generation is outstanding
    Computing {
        /// Generation being computed
        generation: Generation,
    },
    /// A difference list is available
    Ready,
}

/// What happened to a completion handed to [`DifferenceStore::complete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result replaced the displayed list
    Applied,
    /// The computation failed; the previous list stays displayed
    Failed,
    /// The result belonged to a superseded generation and was ignored
    Stale,
}

/// Owned comparison state with a narrow mutation API
#[derive(Debug)]
pub struct DifferenceStore {
    state: StoreState,
    generation: Generation,
    list: Option<Arc<DifferenceList>>,
    filter: KindFilter,
    /// Indices into `list.differences` that pass `filter`
    view: Vec<usize>,
    cursor: Option<usize>,
    last_error: Option<Arc<DocDiffError>>,
}

impl Default for DifferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DifferenceStore {
    /// Create an empty store in the `Idle` state
    pub fn new() -> Self {
        Self {
            state: StoreState::Idle,
            generation: Generation::default(),
            list: None,
            filter: KindFilter::All,
            view: Vec::new(),
            cursor: None,
            last_error: None,
        }
    }

    /// Start a new computation, superseding any outstanding one
    ///
    /// Returns the generation the computation must report back with. The
    /// last good list stays readable until the new result is applied.
    pub fn begin(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.state = StoreState::Computing {
            generation: self.generation,
        };
        debug!("Started comparison generation {}", self.generation);
        self.generation
    }

    /// Apply the terminal result of a computation
    pub fn complete(
        &mut self,
        generation: Generation,
        result: crate::Result<DifferenceList>,
    ) -> Completion {
        if generation != self.generation
            || self.state != (StoreState::Computing { generation })
        {
            debug!(
                "Dropping stale result of generation {} (current {})",
                generation, self.generation
            );
            return Completion::Stale;
        }

        match result {
            Ok(list) => {
                self.list = Some(Arc::new(list));
                self.last_error = None;
                self.state = StoreState::Ready;
                self.refresh_view();
                Completion::Applied
            }
            Err(err) => {
                warn!("Comparison generation {} failed: {}", generation, err);
                self.last_error = Some(Arc::new(err));
                self.state = if self.list.is_some() {
                    StoreState::Ready
                } else {
                    StoreState::Idle
                };
                Completion::Failed
            }
        }
    }

    /// Discard everything because a document was withdrawn
    ///
    /// Outstanding computations become stale.
    pub fn clear(&mut self) {
        self.generation = self.generation.next();
        self.state = StoreState::Idle;
        self.list = None;
        self.last_error = None;
        self.refresh_view();
    }

    /// Change the kind filter and reset the cursor to the first match
    pub fn set_filter(&mut self, filter: KindFilter) {
        self.filter = filter;
        self.refresh_view();
    }

    /// Advance the cursor, wrapping to the first difference
    pub fn next(&mut self) {
        let len = self.view.len();
        if let Some(cursor) = self.cursor.as_mut() {
            *cursor = (*cursor + 1) % len;
        }
    }

    /// Move the cursor back, wrapping to the last difference
    pub fn previous(&mut self) {
        let len = self.view.len();
        if let Some(cursor) = self.cursor.as_mut() {
            *cursor = (*cursor + len - 1) % len;
        }
    }

    /// Jump to `index` of the filtered view
    ///
    /// Returns false (leaving the cursor alone) if the index is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.view.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    /// The difference under the cursor
    pub fn current(&self) -> Option<&Difference> {
        let list = self.list.as_ref()?;
        let index = *self.view.get(self.cursor?)?;
        list.differences.get(index)
    }

    /// The differences passing the current filter, in order
    pub fn filtered(&self) -> Vec<&Difference> {
        match &self.list {
            Some(list) => self
                .view
                .iter()
                .filter_map(|&i| list.differences.get(i))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Cursor index into the filtered view
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// 1-based cursor position and filtered length, for "n of m" displays
    pub fn position(&self) -> Option<(usize, usize)> {
        self.cursor.map(|c| (c + 1, self.view.len()))
    }

    /// Counts over the whole (unfiltered) list
    pub fn summary(&self) -> DiffSummary {
        self.list
            .as_ref()
            .map(|list| list.summary)
            .unwrap_or_default()
    }

    /// The last successfully applied list
    pub fn list(&self) -> Option<Arc<DifferenceList>> {
        self.list.clone()
    }

    /// Current filter
    pub fn filter(&self) -> KindFilter {
        self.filter
    }

    /// Current state
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Generation of the most recent `begin` or `clear`
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Error of the most recent failed computation, cleared by a success
    pub fn last_error(&self) -> Option<Arc<DocDiffError>> {
        self.last_error.clone()
    }

    fn refresh_view(&mut self) {
        self.view = match &self.list {
            Some(list) => list
                .differences
                .iter()
                .enumerate()
                .filter(|(_, d)| self.filter.matches(d.kind))
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        };
        self.cursor = if self.view.is_empty() { None } else { Some(0) };
    }
}
