//! Document tokenization
//!
//! Splits raw document text into an ordered sequence of [`Token`]s that keep
//! their exact byte offsets into the original text. Tokenization never fails
//! and never drops characters: the token spans together with the whitespace
//! between them reconstruct the input exactly.
//!
//! ## Policies
//!
//! - [`TokenizerMode::Whitespace`]: every maximal run of non-whitespace
//!   characters is one token.
//! - [`TokenizerMode::Punctuation`]: like `Whitespace`, but each leading and
//!   trailing punctuation character of a run becomes its own token, so
//!   `"(a)"` yields `(`, `a`, `)`. Interior punctuation such as `don't` or
//!   `3.5` stays inside the word.
//!
//! ## Examples
//!
//! ```rust
//! use docdiff::tokenizer::tokenize;
//! use docdiff::types::TokenizerMode;
//!
//! let tokens = tokenize("Pay $5, now.", TokenizerMode::Punctuation);
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["Pay", "$", "5", ",", "now", "."]);
//! ```

use crate::types::{Token, TokenizerMode};
use std::borrow::Cow;

/// Split `text` into tokens according to `mode`
pub fn tokenize(text: &str, mode: TokenizerMode) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (start, word) in words(text) {
        match mode {
            TokenizerMode::Whitespace => {
                tokens.push(Token::new(word, start, start + word.len()));
            }
            TokenizerMode::Punctuation => split_punctuation(word, start, &mut tokens),
        }
    }
    tokens
}

/// Key used to compare tokens during alignment
pub fn comparison_key(token: &Token, ignore_case: bool) -> Cow<'_, str> {
    if ignore_case {
        Cow::Owned(token.text.to_lowercase())
    } else {
        Cow::Borrowed(token.text.as_str())
    }
}

fn is_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

/// Maximal non-whitespace runs with their byte offsets
fn words(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut run_start: Option<usize> = None;
    let mut chars = text.char_indices();
    std::iter::from_fn(move || loop {
        match chars.next() {
            Some((i, c)) if c.is_whitespace() => {
                if let Some(start) = run_start.take() {
                    return Some((start, &text[start..i]));
                }
            }
            Some((i, _)) => {
                if run_start.is_none() {
                    run_start = Some(i);
                }
            }
            None => return run_start.take().map(|start| (start, &text[start..])),
        }
    })
}

fn split_punctuation(word: &str, base: usize, out: &mut Vec<Token>) {
    let lead_end = word
        .char_indices()
        .find(|(_, c)| !is_punctuation(*c))
        .map(|(i, _)| i)
        .unwrap_or(word.len());

    push_chars(&word[..lead_end], base, out);
    if lead_end == word.len() {
        return;
    }

    let rest = &word[lead_end..];
    let trail_start = rest
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_punctuation(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(rest.len());

    let core_start = base + lead_end;
    out.push(Token::new(
        &rest[..trail_start],
        core_start,
        core_start + trail_start,
    ));
    push_chars(&rest[trail_start..], core_start + trail_start, out);
}

/// One token per character
fn push_chars(s: &str, base: usize, out: &mut Vec<Token>) {
    for (i, c) in s.char_indices() {
        let start = base + i;
        out.push(Token::new(c.to_string(), start, start + c.len_utf8()));
    }
}
