//! Error types for the docdiff library
//!
//! This module defines all error types that can occur while tokenizing,
//! aligning, mapping and rendering document differences. Errors fall into
//! three groups:
//!
//! - **User-facing conditions** such as [`DocDiffError::ResourceExceeded`],
//!   which a UI surfaces as "document too large to diff"
//! - **Programming defects** such as [`DocDiffError::InternalConsistency`],
//!   which abort a recomputation and must never be swallowed
//! - **Plumbing failures** (I/O, JSON, background task) from the outer layers

use crate::types::DocumentSide;
use thiserror::Error;

/// Type alias for Results in the docdiff library
pub type Result<T> = std::result::Result<T, DocDiffError>;

/// Main error type for all docdiff operations
#[derive(Debug, Error)]
pub enum DocDiffError {
    /// I/O errors while reading documents or configuration files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document has more tokens than the configured safety ceiling
    #[error("Document {document} has {tokens} tokens, exceeding the limit of {limit}")]
    ResourceExceeded {
        /// Which document exceeded the limit
        document: DocumentSide,
        /// Number of tokens in the document
        tokens: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// The documents diverge too much to align within the search budget
    #[error("Alignment exceeded its budget of {limit} diagonals")]
    AlignmentBudgetExceeded {
        /// Configured budget
        limit: u64,
    },

    /// Span mapping produced overlapping or unsorted spans
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),

    /// A span handed to the renderer does not fit the text
    #[error("Invalid span {start}..{end} for text of {len} bytes: {reason}")]
    InvalidSpan {
        /// Span start offset
        start: usize,
        /// Span end offset
        end: usize,
        /// Length of the rendered text
        len: usize,
        /// What is wrong with the span
        reason: &'static str,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A background comparison was requested outside of a tokio runtime
    #[error("No tokio runtime available for background comparison")]
    RuntimeUnavailable,

    /// The background comparison task panicked or was aborted
    #[error("Comparison task failed: {0}")]
    TaskFailed(String),

    /// An analysis provider failed
    #[error("Analysis provider '{provider}' failed: {message}")]
    Analysis {
        /// Provider name
        provider: String,
        /// Failure description
        message: String,
    },

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocDiffError {
    /// Create an internal consistency error with a custom message
    pub fn inconsistency(msg: impl Into<String>) -> Self {
        DocDiffError::InternalConsistency(msg.into())
    }

    /// Create an invalid configuration error with a custom message
    pub fn config(msg: impl Into<String>) -> Self {
        DocDiffError::InvalidConfiguration(msg.into())
    }

    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        DocDiffError::Internal(msg.into())
    }

    /// Create an analysis error for the named provider
    pub fn analysis(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        DocDiffError::Analysis {
            provider: provider.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a programming defect rather than a user condition
    pub fn is_internal_defect(&self) -> bool {
        matches!(
            self,
            DocDiffError::InternalConsistency(_)
                | DocDiffError::Internal(_)
                | DocDiffError::TaskFailed(_)
        )
    }

    /// Check if this error is caused by the input being too large
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            DocDiffError::ResourceExceeded { .. } | DocDiffError::AlignmentBudgetExceeded { .. }
        )
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            DocDiffError::ResourceExceeded { document, tokens, limit } => {
                format!(
                    "Document {} is too large to diff ({} tokens, limit {}). \
                     Split the document or raise max_tokens in the configuration.",
                    document, tokens, limit
                )
            }
            DocDiffError::AlignmentBudgetExceeded { limit } => {
                format!(
                    "Documents are too large to diff at this level of divergence (budget {}). \
                     Compare smaller sections or raise max_alignment_cost in the configuration.",
                    limit
                )
            }
            DocDiffError::InternalConsistency(msg) => {
                format!("The comparison produced inconsistent highlights and was discarded ({}).", msg)
            }
            DocDiffError::RuntimeUnavailable => {
                "Background comparison needs a tokio runtime. Use DiffEngine::compare for synchronous use.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
