//! Analysis provider interface
//!
//! Risk scoring, clause classification and similar domain analysis live
//! outside this crate. They plug in through [`AnalysisProvider`], which
//! receives both documents and the finished [`DifferenceList`] and returns
//! serializable findings. The core never depends on what a provider returns.
//!
//! [`ChangeStatsProvider`] is the built-in provider; it reports how much of
//! each document changed and where the largest change is.

use crate::error::{DocDiffError, Result};
use crate::types::{ChangeStats, DiffSummary, Difference, DifferenceList};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A collaborator that derives domain findings from a comparison
pub trait AnalysisProvider {
    /// Structured findings returned by the provider
    type Findings: Serialize;

    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Analyze a compared document pair
    fn analyze(
        &self,
        text_a: &str,
        text_b: &str,
        differences: &DifferenceList,
    ) -> Result<Self::Findings>;
}

/// Run a provider and serialize its findings to JSON
///
/// Provider failures are wrapped in [`DocDiffError::Analysis`] so callers can
/// tell them apart from failures of the comparison itself.
pub fn run_provider<P: AnalysisProvider>(
    provider: &P,
    text_a: &str,
    text_b: &str,
    differences: &DifferenceList,
) -> Result<serde_json::Value> {
    debug!("Running analysis provider '{}'", provider.name());
    let findings = provider
        .analyze(text_a, text_b, differences)
        .map_err(|e| match e {
            DocDiffError::Analysis { .. } => e,
            other => DocDiffError::analysis(provider.name(), other.to_string()),
        })?;
    serde_json::to_value(&findings).map_err(|e| DocDiffError::analysis(provider.name(), e.to_string()))
}

/// Findings of the built-in [`ChangeStatsProvider`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeReport {
    /// Per-kind counts
    pub summary: DiffSummary,
    /// Token and byte statistics
    pub stats: ChangeStats,
    /// Token similarity in `[0, 1]`
    pub similarity: f64,
    /// Share of document A's bytes touched by deletions or modifications
    pub changed_ratio_a: f64,
    /// Share of document B's bytes touched by additions or modifications
    pub changed_ratio_b: f64,
    /// The difference covering the most bytes across both documents
    pub largest: Option<Difference>,
}

/// Reports change statistics without any domain knowledge
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeStatsProvider;

impl AnalysisProvider for ChangeStatsProvider {
    type Findings = ChangeReport;

    fn name(&self) -> &str {
        "change-stats"
    }

    fn analyze(
        &self,
        text_a: &str,
        text_b: &str,
        differences: &DifferenceList,
    ) -> Result<ChangeReport> {
        let stats = differences.stats.clone();
        let ratio = |bytes: usize, total: usize| {
            if total == 0 {
                0.0
            } else {
                bytes as f64 / total as f64
            }
        };
        let largest = differences
            .differences
            .iter()
            .max_by_key(|d| {
                d.document_a.map(|s| s.len()).unwrap_or(0) + d.document_b.map(|s| s.len()).unwrap_or(0)
            })
            .cloned();

        Ok(ChangeReport {
            summary: differences.summary,
            similarity: stats.similarity(),
            changed_ratio_a: ratio(stats.bytes_deleted + stats.bytes_modified_a, text_a.len()),
            changed_ratio_b: ratio(stats.bytes_added + stats.bytes_modified_b, text_b.len()),
            stats,
            largest,
        })
    }
}
