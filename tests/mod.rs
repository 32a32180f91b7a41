//! Main test module for docdiff
//!
//! This module includes all test suites:
//! - Integration tests for document scenarios and background sessions
//! - Property-based tests for invariants
//! - Edge cases around unusual input

pub mod integration;
pub mod property;

#[cfg(test)]
mod edge_cases {
    use ::docdiff::*;

    #[test]
    fn test_whitespace_only_changes_are_invisible() {
        let list = compare("the  cat\nsat", "the cat sat").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_one_side_empty() {
        let added = compare("", "brand new clause").unwrap();
        assert_eq!(added.summary.additions, 1);
        assert_eq!(added.differences[0].document_a, None);
        assert_eq!(added.differences[0].document_b, Some(Span::new(0, 16)));

        let removed = compare("brand new clause", "   ").unwrap();
        assert_eq!(removed.summary.deletions, 1);
        assert_eq!(removed.differences[0].preview, "brand new clause");
    }

    #[test]
    fn test_multibyte_text() {
        let a = "Le loyer est de 1 000 € par mois.";
        let b = "Le loyer est de 1 200 € par année.";
        let list = compare(a, b).unwrap();

        for difference in &list.differences {
            if let Some(span) = difference.document_a {
                assert!(a.is_char_boundary(span.start) && a.is_char_boundary(span.end));
            }
            if let Some(span) = difference.document_b {
                assert!(b.is_char_boundary(span.start) && b.is_char_boundary(span.end));
            }
        }
        let previews: Vec<&str> = list.differences.iter().map(|d| d.preview.as_str()).collect();
        assert_eq!(previews, ["000 → 200", "mois → année"]);
    }

    #[test]
    fn test_punctuation_only_change() {
        let list = compare("pay now.", "pay now!").unwrap();
        assert_eq!(list.summary.modifications, 1);
        assert_eq!(list.differences[0].document_a, Some(Span::new(7, 8)));
    }

    #[test]
    fn test_whitespace_mode_treats_attached_punctuation_as_word() {
        let engine = DiffEngineBuilder::new()
            .tokenizer(TokenizerMode::Whitespace)
            .build()
            .unwrap();
        let list = engine.compare("pay now.", "pay now!").unwrap();
        assert_eq!(list.differences[0].preview, "now. → now!");
    }

    #[test]
    fn test_case_sensitivity_is_configurable() {
        let a = "The Tenant SHALL pay";
        let b = "the tenant shall pay";
        assert_eq!(compare(a, b).unwrap().summary.modifications, 1);

        let engine = DiffEngineBuilder::new().ignore_case(true).build().unwrap();
        assert!(engine.compare(a, b).unwrap().is_empty());
    }

    #[test]
    fn test_long_preview_is_truncated() {
        let added = "word ".repeat(100);
        let engine = DiffEngineBuilder::new().preview_chars(20).build().unwrap();
        let list = engine.compare("start", &format!("start {}", added)).unwrap();

        let preview = &list.differences[0].preview;
        assert!(preview.ends_with('…'));
        assert!(preview.chars().count() <= 21);
    }

    #[test]
    fn test_render_rejects_spans_from_other_text() {
        let list = compare("a b c", "a b c d e f g").unwrap();
        let err = render("a b", &list.differences, DocumentSide::B, None).unwrap_err();
        assert!(matches!(err, DocDiffError::InvalidSpan { .. }));
    }
}
