//! Background comparison sessions
//!
//! A [`ComparisonSession`] owns a [`DifferenceStore`] and runs comparisons on
//! tokio's blocking thread pool so large documents never stall the caller.
//!
//! ## Model
//!
//! - [`ComparisonSession::submit`] starts a new generation and spawns exactly
//!   one background computation for it.
//! - Each computation reports a single terminal message (the list, or the
//!   error) over a channel. Nothing partial is ever sent.
//! - The owner applies messages with [`ComparisonSession::poll`] or
//!   [`ComparisonSession::wait`]. The store stays owned by the caller, and
//!   results of superseded generations are discarded on arrival instead of
//!   being cancelled.
//!
//! ## Examples
//!
//! ```rust
//! use docdiff::{ComparisonSession, DiffEngine, DocumentSide, KindFilter};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> docdiff::Result<()> {
//! let mut session = ComparisonSession::new(DiffEngine::default())?;
//! session.submit("the cat sat", "the dog sat down");
//! session.wait().await;
//!
//! session.set_filter(KindFilter::Additions);
//! assert_eq!(session.store().current().unwrap().preview, "down");
//!
//! let runs = session.render(DocumentSide::B)?;
//! assert_eq!(runs.iter().map(|r| r.text).collect::<String>(), "the dog sat down");
//! # Ok(())
//! # }
//! ```

use crate::analysis::AnalysisProvider;
use crate::engine::DiffEngine;
use crate::error::{DocDiffError, Result};
use crate::render::{render_unified, render_with, Run, UnifiedRun};
use crate::store::{Completion, DifferenceStore};
use crate::types::{DocumentSide, Generation, KindFilter};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, instrument, trace};

/// Terminal message of one background computation
struct Outcome {
    generation: Generation,
    result: Result<crate::types::DifferenceList>,
}

/// A document pair as submitted
#[derive(Debug, Clone)]
struct Documents {
    a: Arc<str>,
    b: Arc<str>,
}

/// Owner-side handle for generation-tagged background comparisons
pub struct ComparisonSession {
    engine: Arc<DiffEngine>,
    store: DifferenceStore,
    runtime: Handle,
    tx: mpsc::UnboundedSender<Outcome>,
    rx: mpsc::UnboundedReceiver<Outcome>,
    /// Documents of the generation being computed
    pending: Option<Documents>,
    /// Documents the store's current list was computed from
    displayed: Option<Documents>,
}

impl std::fmt::Debug for ComparisonSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonSession")
            .field("engine", &self.engine)
            .field("store", &self.store)
            .field("pending", &self.pending.is_some())
            .field("displayed", &self.displayed.is_some())
            .finish()
    }
}

impl ComparisonSession {
    /// Create a session on the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns [`DocDiffError::RuntimeUnavailable`] when called outside a
    /// tokio runtime.
    pub fn new(engine: DiffEngine) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| DocDiffError::RuntimeUnavailable)?;
        Ok(Self::with_runtime(engine, runtime))
    }

    /// Create a session that spawns its work on the given runtime
    pub fn with_runtime(engine: DiffEngine, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine: Arc::new(engine),
            store: DifferenceStore::new(),
            runtime,
            tx,
            rx,
            pending: None,
            displayed: None,
        }
    }

    /// Start comparing a new document pair in the background
    ///
    /// Supersedes any outstanding computation; its result will be ignored.
    #[instrument(skip_all)]
    pub fn submit(&mut self, text_a: impl Into<Arc<str>>, text_b: impl Into<Arc<str>>) -> Generation {
        let documents = Documents {
            a: text_a.into(),
            b: text_b.into(),
        };
        let generation = self.store.begin();
        self.pending = Some(documents.clone());

        let engine = Arc::clone(&self.engine);
        let tx = self.tx.clone();
        let task = self
            .runtime
            .spawn_blocking(move || engine.compare_tagged(generation, &documents.a, &documents.b));
        self.runtime.spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(DocDiffError::TaskFailed(e.to_string())),
            };
            if tx.send(Outcome { generation, result }).is_err() {
                trace!("Session dropped before generation {} finished", generation);
            }
        });

        debug!("Submitted comparison generation {}", generation);
        generation
    }

    /// Withdraw the documents and return to `Idle`
    pub fn clear(&mut self) {
        self.store.clear();
        self.pending = None;
        self.displayed = None;
    }

    /// Apply every completion that has already arrived, without blocking
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            completions.push(self.apply(outcome));
        }
        completions
    }

    /// Wait for the current generation to finish and apply it
    ///
    /// Stale completions arriving in the meantime are discarded. Returns
    /// `None` if no computation is outstanding.
    pub async fn wait(&mut self) -> Option<Completion> {
        while self.pending.is_some() {
            let outcome = self.rx.recv().await?;
            match self.apply(outcome) {
                Completion::Stale => continue,
                completion => return Some(completion),
            }
        }
        None
    }

    fn apply(&mut self, outcome: Outcome) -> Completion {
        let completion = self.store.complete(outcome.generation, outcome.result);
        match completion {
            Completion::Applied => self.displayed = self.pending.take(),
            Completion::Failed => self.pending = None,
            Completion::Stale => {}
        }
        completion
    }

    /// Change the kind filter (resets the cursor)
    pub fn set_filter(&mut self, filter: KindFilter) {
        self.store.set_filter(filter);
    }

    /// Move to the next difference, wrapping around
    pub fn next(&mut self) {
        self.store.next();
    }

    /// Move to the previous difference, wrapping around
    pub fn previous(&mut self) {
        self.store.previous();
    }

    /// Jump to an index of the filtered view
    pub fn select(&mut self, index: usize) -> bool {
        self.store.select(index)
    }

    /// Read access to the store
    pub fn store(&self) -> &DifferenceStore {
        &self.store
    }

    /// Text of the displayed document on `side`
    pub fn document(&self, side: DocumentSide) -> Option<&str> {
        self.displayed.as_ref().map(|docs| match side {
            DocumentSide::A => &*docs.a,
            DocumentSide::B => &*docs.b,
        })
    }

    /// Render the displayed document on `side` with the filtered differences
    ///
    /// The difference under the cursor is marked active. Returns no runs when
    /// nothing has been compared yet.
    pub fn render(&self, side: DocumentSide) -> Result<Vec<Run<'_>>> {
        match self.document(side) {
            Some(text) => render_with(text, self.store.filtered(), side, self.store.cursor()),
            None => Ok(Vec::new()),
        }
    }

    /// Render both displayed documents as one interleaved view
    ///
    /// Every difference is shown regardless of the filter. Highlight indices
    /// refer to the full list and the difference under the cursor is active.
    pub fn render_unified(&self) -> Result<Vec<UnifiedRun<'_>>> {
        let (Some(docs), Some(list)) = (&self.displayed, self.store.list()) else {
            return Ok(Vec::new());
        };
        let active = self
            .store
            .current()
            .and_then(|current| list.differences.iter().position(|d| std::ptr::eq(d, current)));
        render_unified(
            &docs.a,
            &docs.b,
            &list.differences,
            self.engine.options().tokenizer,
            active,
        )
    }

    /// Run an analysis provider over the displayed comparison
    ///
    /// Returns `Ok(None)` when there is no difference list yet.
    pub fn analyze<P: AnalysisProvider>(&self, provider: &P) -> Result<Option<P::Findings>> {
        let (Some(docs), Some(list)) = (&self.displayed, self.store.list()) else {
            return Ok(None);
        };
        provider.analyze(&docs.a, &docs.b, &list).map(Some)
    }
}
