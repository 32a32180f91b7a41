//! Integration tests for docdiff
//!
//! Runs realistic review scenarios end to end: a contract goes through several
//! revisions, a reviewer filters and walks the changes, and comparisons are
//! recomputed in the background while edits keep arriving.

use ::docdiff::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

const CLAUSES: &[&str] = &[
    "The Tenant shall pay rent on the first day of each month.",
    "The Landlord shall keep the premises in good repair.",
    "Either party may terminate this lease with thirty (30) days written notice.",
    "The security deposit shall be returned within fourteen (14) days.",
    "No pets are allowed without prior written consent.",
    "This agreement is governed by the laws of the State of Oregon.",
];

const VOCABULARY: &[&str] = &[
    "shall", "may", "must", "not", "party", "lease", "premises", "notice", "rent", "deposit",
    "days", "written", "consent", "agreement", "the", "of", "within", "each",
];

/// Generates seeded documents and word-level edits of them
pub struct DocumentGenerator {
    rng: StdRng,
}

impl DocumentGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A document of `words` random vocabulary words
    pub fn document(&mut self, words: usize) -> Vec<String> {
        (0..words)
            .map(|_| VOCABULARY[self.rng.random_range(0..VOCABULARY.len())].to_string())
            .collect()
    }

    /// Apply `edits` random insertions, deletions and replacements
    pub fn mutate(&mut self, words: &[String], edits: usize) -> Vec<String> {
        let mut out = words.to_vec();
        for _ in 0..edits {
            let word = VOCABULARY[self.rng.random_range(0..VOCABULARY.len())].to_string();
            match self.rng.random_range(0..3) {
                0 => {
                    let at = self.rng.random_range(0..=out.len());
                    out.insert(at, word);
                }
                1 if !out.is_empty() => {
                    let at = self.rng.random_range(0..out.len());
                    out.remove(at);
                }
                _ if !out.is_empty() => {
                    let at = self.rng.random_range(0..out.len());
                    out[at] = word;
                }
                _ => out.push(word),
            }
        }
        out
    }
}

fn lease(clauses: &[&str]) -> String {
    clauses
        .iter()
        .enumerate()
        .map(|(i, clause)| format!("{}. {}", i + 1, clause))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn rebuild(text: &str, runs: &[Run<'_>]) -> bool {
    runs.iter().map(|r| r.text).collect::<String>() == text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_contract_review_workflow() {
        let original = lease(CLAUSES);
        let mut revised_clauses = CLAUSES.to_vec();
        revised_clauses[2] =
            "Either party may terminate this lease with sixty (60) days written notice.";
        revised_clauses.remove(4);
        revised_clauses.push("The Tenant may sublet with the Landlord's approval.");
        let revised = lease(&revised_clauses);

        let engine = DiffEngine::default();
        let mut store = DifferenceStore::new();
        let generation = store.begin();
        let outcome = store.complete(generation, engine.compare_tagged(generation, &original, &revised));
        assert_eq!(outcome, Completion::Applied);

        let summary = store.summary();
        info!("Review summary: {:?}", summary);
        assert!(summary.total > 0);
        assert_eq!(
            summary.total,
            summary.additions + summary.deletions + summary.modifications
        );

        // The reviewer walks every change once and ends up where they started.
        let first = store.current().cloned();
        for _ in 0..summary.total {
            store.next();
        }
        assert_eq!(store.current().cloned(), first);

        // Highlights on both sides cover exactly the documents.
        let differences = store.filtered();
        let runs_a = render::render_with(&original, differences.iter().copied(), DocumentSide::A, None).unwrap();
        let runs_b = render::render_with(&revised, differences, DocumentSide::B, store.cursor()).unwrap();
        assert!(rebuild(&original, &runs_a));
        assert!(rebuild(&revised, &runs_b));

        let modified: Vec<String> = store
            .list()
            .unwrap()
            .differences
            .iter()
            .filter(|d| d.kind == DifferenceKind::Modification)
            .map(|d| d.preview.clone())
            .collect();
        assert!(modified.contains(&"thirty → sixty".to_string()));
        assert!(modified.contains(&"30 → 60".to_string()));
    }

    #[test]
    #[traced_test]
    fn test_successive_revisions() {
        let mut generator = DocumentGenerator::new(42);
        let engine = DiffEngine::default();
        let mut store = DifferenceStore::new();

        let mut current = generator.document(400);
        let base = current.join(" ");
        for round in 0..10 {
            current = generator.mutate(&current, 5);
            let revised = current.join(" ");

            let generation = store.begin();
            let result = engine.compare_tagged(generation, &base, &revised);
            assert_eq!(store.complete(generation, result), Completion::Applied);
            assert_eq!(store.list().unwrap().generation, generation);
            info!("Round {}: {} differences", round, store.summary().total);

            let list = store.list().unwrap();
            let mut last_a = 0;
            let mut last_b = 0;
            for difference in &list.differences {
                if let Some(span) = difference.document_a {
                    assert!(span.start >= last_a);
                    last_a = span.end;
                }
                if let Some(span) = difference.document_b {
                    assert!(span.start >= last_b);
                    last_b = span.end;
                }
            }
        }
    }

    #[test]
    fn test_identical_generated_documents() {
        let mut generator = DocumentGenerator::new(7);
        let text = generator.document(2_000).join(" ");
        let list = compare(&text, &text).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.stats.similarity(), 1.0);
    }

    #[test]
    fn test_large_documents_within_budget() {
        let mut generator = DocumentGenerator::new(99);
        let words = generator.document(50_000);
        let edited = generator.mutate(&words, 50);

        let a = words.join(" ");
        let b = edited.join(" ");
        let list = compare(&a, &b).unwrap();
        assert!(list.summary.total > 0);
        assert!(list.summary.total <= 100);
    }

    #[test]
    fn test_oversized_document_reports_limit() {
        let engine = DiffEngineBuilder::new().max_tokens(1_000).build().unwrap();
        let mut generator = DocumentGenerator::new(1);
        let big = generator.document(1_001).join(" ");

        let err = engine.compare("short", &big).unwrap_err();
        match err {
            DocDiffError::ResourceExceeded { document, tokens, limit } => {
                assert_eq!(document, DocumentSide::B);
                assert_eq!(tokens, 1_001);
                assert_eq!(limit, 1_000);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    #[traced_test]
    fn test_rewritten_document_gives_up_quickly() {
        let engine = DiffEngineBuilder::new()
            .max_alignment_cost(5_000_000)
            .build()
            .unwrap();
        let original: String = (0..20_000).map(|i| format!("old{} ", i)).collect();
        let rewritten: String = (0..20_000).map(|i| format!("new{} ", i)).collect();

        let mut store = DifferenceStore::new();
        let generation = store.begin();
        let start = std::time::Instant::now();
        let result = engine.compare_tagged(generation, &original, &rewritten);
        assert!(start.elapsed() < std::time::Duration::from_secs(10));

        assert_eq!(store.complete(generation, result), Completion::Failed);
        assert_eq!(store.state(), StoreState::Idle);
        let err = store.last_error().unwrap();
        assert!(err.is_resource_limit());
        assert!(err.user_message().contains("too large to diff"));

        // A modest revision of the same document still fits the budget.
        let revised = original.replacen("old100 ", "new100 ", 1);
        let generation = store.begin();
        let result = engine.compare_tagged(generation, &original, &revised);
        assert_eq!(store.complete(generation, result), Completion::Applied);
        assert_eq!(store.summary().modifications, 1);
    }

    #[test]
    fn test_options_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{ "ignore_case": true, "tokenizer": "whitespace" }"#).unwrap();

        let options = DiffOptions::from_json_file(&path).unwrap();
        let engine = DiffEngineBuilder::new().options(options).build().unwrap();
        assert_eq!(engine.options().tokenizer, TokenizerMode::Whitespace);
        assert!(engine.compare("NOTICE.", "notice.").unwrap().is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_session_keeps_up_with_rapid_edits() {
        let mut generator = DocumentGenerator::new(3);
        let base = generator.document(3_000);
        let mut session = ComparisonSession::new(DiffEngine::default()).unwrap();

        let text_a = base.join(" ");
        let mut latest = Generation::default();
        let mut latest_text = String::new();
        let mut current = base.clone();
        for _ in 0..8 {
            current = generator.mutate(&current, 3);
            latest_text = current.join(" ");
            latest = session.submit(text_a.clone(), latest_text.clone());
        }

        assert_eq!(session.wait().await, Some(Completion::Applied));
        assert_eq!(session.store().list().unwrap().generation, latest);
        assert_eq!(session.document(DocumentSide::B), Some(latest_text.as_str()));

        // Nothing older may replace the applied generation afterwards.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(session.poll().iter().all(|c| *c == Completion::Stale));
        assert_eq!(session.store().list().unwrap().generation, latest);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_session_render_and_analyze() {
        let mut session = ComparisonSession::new(DiffEngine::default()).unwrap();
        session.submit(lease(&CLAUSES[..2]), lease(&CLAUSES[..3]));
        session.wait().await;

        assert_eq!(session.store().summary().additions, 1);
        let runs = session.render(DocumentSide::B).unwrap();
        let highlighted: Vec<&str> = runs
            .iter()
            .filter(|r| r.highlight.is_some())
            .map(|r| r.text)
            .collect();
        assert_eq!(highlighted.len(), 1);
        assert!(highlighted[0].starts_with("3. Either party"));

        let unified = session.render_unified().unwrap();
        let rebuilt: String = unified
            .iter()
            .filter(|r| r.side == DocumentSide::B)
            .map(|r| r.text)
            .collect();
        assert_eq!(Some(rebuilt.as_str()), session.document(DocumentSide::B));
        assert!(unified.iter().all(|r| r.side == DocumentSide::B));

        let report = session.analyze(&ChangeStatsProvider).unwrap().unwrap();
        assert_eq!(report.summary.additions, 1);
        assert!(report.similarity > 0.5 && report.similarity < 1.0);
        assert_eq!(report.changed_ratio_a, 0.0);
    }

    #[tokio::test]
    async fn test_session_filter_and_navigation() {
        let mut session = ComparisonSession::new(DiffEngine::default()).unwrap();
        session.submit("a b c d e f", "a x c e f g");
        session.wait().await;

        assert_eq!(session.store().summary().total, 3);
        session.set_filter(KindFilter::Deletions);
        assert_eq!(session.store().current().unwrap().preview, "d");

        session.set_filter(KindFilter::All);
        session.previous();
        assert_eq!(session.store().current().unwrap().kind, DifferenceKind::Addition);
        assert!(session.select(0));
        assert_eq!(session.store().position(), Some((1, 3)));
    }
}
