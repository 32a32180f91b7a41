//! Token alignment
//!
//! Computes a minimal edit script between two token sequences using Myers'
//! O(ND) algorithm in its linear-space, divide-and-conquer form (the "middle
//! snake" variant from "An O(ND) Difference Algorithm and Its Variations",
//! 1986). Memory use is O(N + M), which keeps documents of several hundred
//! thousand tokens practical.
//!
//! ## Determinism
//!
//! The output is a pure function of the input. Within every subproblem the
//! longest common prefix and then the longest common suffix are matched
//! greedily before searching, so the first `Equal` run is as long as any
//! minimal alignment allows. Change regions (maximal runs without an `Equal`
//! token) are coalesced into a single operation:
//!
//! - tokens on both sides: [`EditKind::Replace`]
//! - tokens only in A: [`EditKind::Delete`]
//! - tokens only in B: [`EditKind::Insert`]
//!
//! ## Examples
//!
//! ```rust
//! use docdiff::align::align;
//! use docdiff::tokenizer::tokenize;
//! use docdiff::types::{DiffOptions, EditKind, TokenizerMode};
//!
//! # fn main() -> docdiff::Result<()> {
//! let a = tokenize("the cat sat", TokenizerMode::Punctuation);
//! let b = tokenize("the dog sat down", TokenizerMode::Punctuation);
//! let ops = align(&a, &b, &DiffOptions::default())?;
//!
//! let kinds: Vec<EditKind> = ops.iter().map(|op| op.kind).collect();
//! assert_eq!(kinds, [EditKind::Equal, EditKind::Replace, EditKind::Equal, EditKind::Insert]);
//! # Ok(())
//! # }
//! ```

use crate::collections::Interner;
use crate::error::{DocDiffError, Result};
use crate::tokenizer::comparison_key;
use crate::types::{DiffOptions, DocumentSide, EditKind, EditOperation, Token};
use std::ops::{Index, IndexMut, Range};
use tracing::{debug, trace, warn};

/// Align two token sequences into a coalesced edit script
///
/// # Errors
///
/// - [`DocDiffError::ResourceExceeded`] if either sequence is longer than
///   `options.max_tokens`
/// - [`DocDiffError::AlignmentBudgetExceeded`] if the documents diverge so
///   much that the search would visit more than `options.max_alignment_cost`
///   diagonals
pub fn align(
    tokens_a: &[Token],
    tokens_b: &[Token],
    options: &DiffOptions,
) -> Result<Vec<EditOperation>> {
    check_limit(DocumentSide::A, tokens_a.len(), options.max_tokens)?;
    check_limit(DocumentSide::B, tokens_b.len(), options.max_tokens)?;

    let mut interner = Interner::with_capacity(tokens_a.len() + tokens_b.len());
    let a: Vec<u32> = tokens_a
        .iter()
        .map(|t| interner.intern(comparison_key(t, options.ignore_case)))
        .collect();
    let b: Vec<u32> = tokens_b
        .iter()
        .map(|t| interner.intern(comparison_key(t, options.ignore_case)))
        .collect();
    trace!("Interned {} distinct tokens", interner.len());

    let mut script = EditScript::default();
    let max_d = max_d(a.len(), b.len());
    let mut vf = V::new(max_d);
    let mut vb = V::new(max_d);
    let mut budget = Budget::new(options.max_alignment_cost);
    conquer(&a, 0..a.len(), &b, 0..b.len(), &mut vf, &mut vb, &mut budget, &mut script)?;

    let ops = script.finish();
    debug!(
        "Aligned {} x {} tokens into {} operations (cost {})",
        a.len(),
        b.len(),
        ops.len(),
        budget.spent()
    );
    Ok(ops)
}

fn check_limit(document: DocumentSide, tokens: usize, limit: usize) -> Result<()> {
    if tokens > limit {
        return Err(DocDiffError::ResourceExceeded {
            document,
            tokens,
            limit,
        });
    }
    Ok(())
}

/// Search work allowed for one alignment, counted in visited diagonals
///
/// Near-identical documents spend almost nothing. The cost of documents that
/// share little grows with the square of their length.
struct Budget {
    limit: u64,
    remaining: u64,
}

impl Budget {
    fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    fn charge(&mut self, cost: u64) -> Result<()> {
        match self.remaining.checked_sub(cost) {
            Some(remaining) => {
                self.remaining = remaining;
                Ok(())
            }
            None => {
                warn!("Alignment gave up after exhausting a budget of {}", self.limit);
                Err(DocDiffError::AlignmentBudgetExceeded { limit: self.limit })
            }
        }
    }

    fn spent(&self) -> u64 {
        self.limit - self.remaining
    }
}

/// Accumulates raw Myers steps into coalesced operations
#[derive(Default)]
struct EditScript {
    ops: Vec<EditOperation>,
    /// Open change region (A range, B range)
    pending: Option<(Range<usize>, Range<usize>)>,
}

impl EditScript {
    fn equal(&mut self, a_start: usize, b_start: usize, len: usize) {
        self.flush();
        if let Some(last) = self.ops.last_mut() {
            if last.is_equal() && last.a.end == a_start && last.b.end == b_start {
                last.a.end += len;
                last.b.end += len;
                return;
            }
        }
        self.ops.push(EditOperation::new(
            EditKind::Equal,
            a_start..a_start + len,
            b_start..b_start + len,
        ));
    }

    fn delete(&mut self, a_start: usize, len: usize, b_at: usize) {
        match &mut self.pending {
            Some((a, b)) => {
                debug_assert_eq!(a.end, a_start);
                debug_assert_eq!(b.end, b_at);
                a.end = a_start + len;
            }
            None => self.pending = Some((a_start..a_start + len, b_at..b_at)),
        }
    }

    fn insert(&mut self, a_at: usize, b_start: usize, len: usize) {
        match &mut self.pending {
            Some((a, b)) => {
                debug_assert_eq!(a.end, a_at);
                debug_assert_eq!(b.end, b_start);
                b.end = b_start + len;
            }
            None => self.pending = Some((a_at..a_at, b_start..b_start + len)),
        }
    }

    fn flush(&mut self) {
        if let Some((a, b)) = self.pending.take() {
            let kind = match (a.is_empty(), b.is_empty()) {
                (false, false) => EditKind::Replace,
                (false, true) => EditKind::Delete,
                (true, false) => EditKind::Insert,
                (true, true) => return,
            };
            self.ops.push(EditOperation::new(kind, a, b));
        }
    }

    fn finish(mut self) -> Vec<EditOperation> {
        self.flush();
        self.ops
    }
}

/// Furthest-reaching x per diagonal, indexable by negative diagonals
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d],
        }
    }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, index: isize) -> &usize {
        &self.v[(index + self.offset) as usize]
    }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, index: isize) -> &mut usize {
        &mut self.v[(index + self.offset) as usize]
    }
}

/// Half the maximum edit distance, plus headroom for the diagonal array
fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

fn common_prefix_len(a: &[u32], a_range: Range<usize>, b: &[u32], b_range: Range<usize>) -> usize {
    a[a_range]
        .iter()
        .zip(&b[b_range])
        .take_while(|(x, y)| x == y)
        .count()
}

fn common_suffix_len(a: &[u32], a_range: Range<usize>, b: &[u32], b_range: Range<usize>) -> usize {
    a[a_range]
        .iter()
        .rev()
        .zip(b[b_range].iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Find a point on an optimal path splitting the problem roughly in half
///
/// Runs the forward search from the top-left and the backward search from
/// the bottom-right one step at a time until they overlap. The returned point
/// is in absolute coordinates. Every step of `d` is charged to `budget`.
fn find_middle_snake(
    a: &[u32],
    a_range: Range<usize>,
    b: &[u32],
    b_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    budget: &mut Budget,
) -> Result<Option<(usize, usize)>> {
    let n = a_range.len();
    let m = b_range.len();

    // The parity of the edit distance equals the parity of delta.
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    vf[1] = 0;
    vb[1] = 0;

    let d_max = max_d(n, m) as isize;
    for d in 0..d_max {
        // Both searches visit d + 1 diagonals.
        budget.charge(2 * (d as u64 + 1))?;

        // Forward search
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(
                    a,
                    a_range.start + x..a_range.end,
                    b,
                    b_range.start + y..b_range.end,
                );
            }
            vf[k] = x;

            if odd && (k - delta).abs() <= d - 1 && vf[k] + vb[-(k - delta)] >= n {
                return Ok(Some((x0 + a_range.start, y0 + b_range.start)));
            }
        }

        // Backward search
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            if x < n && y < m {
                let advance = common_suffix_len(
                    a,
                    a_range.start..a_range.start + n - x,
                    b,
                    b_range.start..b_range.start + m - y,
                );
                x += advance;
                y += advance;
            }
            vb[k] = x;

            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Ok(Some((n - x + a_range.start, m - y + b_range.start)));
            }
        }
    }

    Ok(None)
}

#[allow(clippy::too_many_arguments)]
fn conquer(
    a: &[u32],
    mut a_range: Range<usize>,
    b: &[u32],
    mut b_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    budget: &mut Budget,
    script: &mut EditScript,
) -> Result<()> {
    let prefix = common_prefix_len(a, a_range.clone(), b, b_range.clone());
    if prefix > 0 {
        script.equal(a_range.start, b_range.start, prefix);
    }
    a_range.start += prefix;
    b_range.start += prefix;

    let suffix = common_suffix_len(a, a_range.clone(), b, b_range.clone());
    let suffix_start = (a_range.end - suffix, b_range.end - suffix);
    a_range.end -= suffix;
    b_range.end -= suffix;

    if a_range.is_empty() && b_range.is_empty() {
        // Nothing left between prefix and suffix
    } else if b_range.is_empty() {
        script.delete(a_range.start, a_range.len(), b_range.start);
    } else if a_range.is_empty() {
        script.insert(a_range.start, b_range.start, b_range.len());
    } else if let Some((x, y)) =
        find_middle_snake(a, a_range.clone(), b, b_range.clone(), vf, vb, budget)?
    {
        conquer(a, a_range.start..x, b, b_range.start..y, vf, vb, budget, script)?;
        conquer(a, x..a_range.end, b, y..b_range.end, vf, vb, budget, script)?;
    } else {
        script.delete(a_range.start, a_range.len(), b_range.start);
        script.insert(a_range.end, b_range.start, b_range.len());
    }

    if suffix > 0 {
        script.equal(suffix_start.0, suffix_start.1, suffix);
    }
    Ok(())
}
