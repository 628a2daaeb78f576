// overlap ratios between annotated spans
use crate::core::types::Span;

fn overlap<A: Span + ?Sized, B: Span + ?Sized>(a: &A, b: &B) -> i64 {
    (a.end().min(b.end()) - a.start().max(b.start())).max(0)
}

/// Overlapping residues over the total span covered by both features.
///
/// ```text
///         -----------              -----------
/// overlap   |||||||||        span  ||||||||||||||
///      ------------              ------------
/// ```
///
/// Symmetric, in `[0, 1)` for valid spans; `0` when the spans are disjoint.
pub fn merge_overlap<A: Span + ?Sized, B: Span + ?Sized>(a: &A, b: &B) -> f64 {
    //disjoint (or touching) spans: nothing to divide
    if a.start().max(b.start()) >= a.end().min(b.end()) {
        return 0.0;
    }
    let span = a.end().max(b.end()) - a.start().min(b.start());
    overlap(a, b) as f64 / span as f64
}

/// Fraction of `smaller` covered by `larger`.
///
/// Only defined when `larger` is strictly longer; anything else yields `0`
/// instead of an error, so callers must pass the larger span first.
pub fn nest_overlap<A: Span + ?Sized, B: Span + ?Sized>(larger: &A, smaller: &B) -> f64 {
    if larger.length() <= smaller.length() {
        return 0.0;
    }
    let covered = overlap(larger, smaller);
    if covered == 0 {
        return 0.0;
    }
    covered as f64 / smaller.length() as f64
}
