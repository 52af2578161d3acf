//! Shared helpers for the unit tests

use crate::layout::Margins;
use crate::{FontLibrary, PageTracker, Pt};

/// The built-in Times-Roman metrics at index 0
pub fn fonts() -> FontLibrary {
    FontLibrary::standard()
}

/// A page of the given size with equal margins all round
pub fn tracker(width: f32, height: f32, margin: f32) -> PageTracker {
    PageTracker::new((Pt(width), Pt(height)), Margins::all(Pt(margin)))
}

/// Layout arithmetic happens in `f32`, so compare with a little slack
#[track_caller]
pub fn assert_close(actual: Pt, expected: f32) {
    assert!(
        (actual.0 - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}
