//! Property-based testing for docdiff
//!
//! Uses proptest to verify invariants of the pipeline across randomly
//! generated document pairs.

use ::docdiff::*;
use docdiff::align::align;
use docdiff::tokenizer::tokenize;
use proptest::prelude::*;

/// Words drawn from a small vocabulary so that random documents share content
fn word_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(vec![
            "the", "tenant", "shall", "pay", "rent", "notice", "days", "lease", "party",
        ])
        .prop_map(str::to_string),
        1 => "[a-zA-Zé€0-9]{1,6}",
        1 => prop::sample::select(vec!["(", ")", ",", ".", "3.5", "don't", "«x»"])
            .prop_map(str::to_string),
    ]
}

fn separator_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![" ", " ", " ", "  ", "\n", "\t", " \n "])
}

/// A document built from words and assorted whitespace
fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((word_strategy(), separator_strategy()), 0..60).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(word, sep)| format!("{}{}", word, sep))
            .collect()
    })
}

fn mode_strategy() -> impl Strategy<Value = TokenizerMode> {
    prop_oneof![Just(TokenizerMode::Whitespace), Just(TokenizerMode::Punctuation)]
}

fn filter_strategy() -> impl Strategy<Value = KindFilter> {
    prop_oneof![
        Just(KindFilter::All),
        Just(KindFilter::Additions),
        Just(KindFilter::Deletions),
        Just(KindFilter::Modifications),
    ]
}

fn ready_store(a: &str, b: &str) -> DifferenceStore {
    let mut store = DifferenceStore::new();
    let generation = store.begin();
    let result = DiffEngine::default().compare_tagged(generation, a, b);
    store.complete(generation, result);
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Rendering without differences reproduces the text
    #[test]
    fn render_round_trip(text in document_strategy()) {
        for side in [DocumentSide::A, DocumentSide::B] {
            let runs = render(&text, &[], side, None).unwrap();
            let rebuilt: String = runs.iter().map(|r| r.text).collect();
            prop_assert_eq!(&rebuilt, &text);
            prop_assert!(runs.iter().all(|r| r.highlight.is_none()));
        }
    }

    /// Rendering the real differences also reproduces both documents
    #[test]
    fn render_with_differences_round_trip(a in document_strategy(), b in document_strategy()) {
        let list = compare(&a, &b).unwrap();
        for (text, side) in [(&a, DocumentSide::A), (&b, DocumentSide::B)] {
            let runs = render(text, &list.differences, side, Some(0)).unwrap();
            let rebuilt: String = runs.iter().map(|r| r.text).collect();
            prop_assert_eq!(&rebuilt, text);
        }
    }

    /// Spans are sorted and non-overlapping within each document
    #[test]
    fn spans_partition(a in document_strategy(), b in document_strategy()) {
        let list = compare(&a, &b).unwrap();
        for side in [DocumentSide::A, DocumentSide::B] {
            let text = if side == DocumentSide::A { &a } else { &b };
            let mut last_end = 0;
            for span in list.differences.iter().filter_map(|d| d.span(side)) {
                prop_assert!(span.start >= last_end);
                prop_assert!(span.end <= text.len());
                prop_assert!(span.slice(text).is_some());
                last_end = span.end;
            }
        }
        for difference in &list.differences {
            match difference.kind {
                DifferenceKind::Addition => {
                    prop_assert!(difference.document_a.is_none() && difference.document_b.is_some())
                }
                DifferenceKind::Deletion => {
                    prop_assert!(difference.document_a.is_some() && difference.document_b.is_none())
                }
                DifferenceKind::Modification => {
                    prop_assert!(difference.document_a.is_some() && difference.document_b.is_some())
                }
            }
        }
    }

    /// Edit operations tile both token sequences and Equal means equal
    #[test]
    fn edit_script_reconstruction(
        a in document_strategy(),
        b in document_strategy(),
        mode in mode_strategy(),
    ) {
        let tokens_a = tokenize(&a, mode);
        let tokens_b = tokenize(&b, mode);
        let ops = align(&tokens_a, &tokens_b, &DiffOptions::default()).unwrap();

        let mut next_a = 0;
        let mut next_b = 0;
        for op in &ops {
            prop_assert_eq!(op.a.start, next_a);
            prop_assert_eq!(op.b.start, next_b);
            match op.kind {
                EditKind::Equal => {
                    prop_assert_eq!(op.a.len(), op.b.len());
                    for (x, y) in tokens_a[op.a.clone()].iter().zip(&tokens_b[op.b.clone()]) {
                        prop_assert_eq!(&x.text, &y.text);
                    }
                }
                EditKind::Insert => prop_assert!(op.a.is_empty() && !op.b.is_empty()),
                EditKind::Delete => prop_assert!(!op.a.is_empty() && op.b.is_empty()),
                EditKind::Replace => prop_assert!(!op.a.is_empty() && !op.b.is_empty()),
            }
            next_a = op.a.end;
            next_b = op.b.end;
        }
        prop_assert_eq!(next_a, tokens_a.len());
        prop_assert_eq!(next_b, tokens_b.len());

        // Neighbouring operations never share a kind.
        for pair in ops.windows(2) {
            prop_assert!(pair[0].kind != pair[1].kind);
        }
    }

    /// Tokens slice the original text and only whitespace lies between them
    #[test]
    fn tokens_cover_text(text in document_strategy(), mode in mode_strategy()) {
        let mut pos = 0;
        for token in tokenize(&text, mode) {
            prop_assert!(text[pos..token.start].chars().all(char::is_whitespace));
            prop_assert_eq!(&text[token.start..token.end], token.text.as_str());
            prop_assert!(token.end > token.start);
            pos = token.end;
        }
        prop_assert!(text[pos..].chars().all(char::is_whitespace));
    }

    /// Repeated comparisons agree exactly apart from the timestamp
    #[test]
    fn comparison_is_idempotent(a in document_strategy(), b in document_strategy()) {
        let first = compare(&a, &b).unwrap();
        let second = compare(&a, &b).unwrap();
        prop_assert_eq!(&first.differences, &second.differences);
        prop_assert_eq!(first.summary, second.summary);
        prop_assert_eq!(first.stats, second.stats);
    }

    /// Comparing a document with itself finds nothing
    #[test]
    fn self_comparison_is_empty(text in document_strategy()) {
        let list = compare(&text, &text).unwrap();
        prop_assert!(list.is_empty());
        prop_assert_eq!(list.summary.total, 0);
    }

    /// n steps forward return to the start and previous undoes next
    #[test]
    fn navigation_wraps(
        a in document_strategy(),
        b in document_strategy(),
        filter in filter_strategy(),
        steps in 0usize..20,
    ) {
        let mut store = ready_store(&a, &b);
        store.set_filter(filter);
        let n = store.filtered().len();
        prop_assume!(n > 0);

        for _ in 0..steps {
            store.next();
        }
        let here = store.cursor();
        prop_assert_eq!(here, Some(steps % n));

        store.next();
        store.previous();
        prop_assert_eq!(store.cursor(), here);

        for _ in 0..n {
            store.next();
        }
        prop_assert_eq!(store.cursor(), here);
    }

    /// Changing the filter resets the cursor to the first match
    #[test]
    fn filter_resets_cursor(
        a in document_strategy(),
        b in document_strategy(),
        first in filter_strategy(),
        second in filter_strategy(),
        steps in 0usize..10,
    ) {
        let mut store = ready_store(&a, &b);
        store.set_filter(first);
        for _ in 0..steps {
            store.next();
        }
        store.set_filter(second);

        let filtered = store.filtered();
        prop_assert!(filtered.iter().all(|d| second.matches(d.kind)));
        if filtered.is_empty() {
            prop_assert_eq!(store.cursor(), None);
        } else {
            prop_assert_eq!(store.cursor(), Some(0));
            prop_assert_eq!(store.current(), Some(filtered[0]));
        }
    }

    /// Summary counts always match the list
    #[test]
    fn summary_matches_list(a in document_strategy(), b in document_strategy()) {
        let list = compare(&a, &b).unwrap();
        let count = |kind| list.differences.iter().filter(|d| d.kind == kind).count();
        prop_assert_eq!(list.summary.additions, count(DifferenceKind::Addition));
        prop_assert_eq!(list.summary.deletions, count(DifferenceKind::Deletion));
        prop_assert_eq!(list.summary.modifications, count(DifferenceKind::Modification));
        prop_assert_eq!(list.summary.total, list.differences.len());

        let similarity = list.stats.similarity();
        prop_assert!((0.0..=1.0).contains(&similarity));
    }
}
