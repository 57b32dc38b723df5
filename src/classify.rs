//! Shape classification
//!
//! Maps a single [`ShapeRecord`] to its canonical [`PatternKey`] and to a
//! per-window visibility verdict. First matching rule wins:
//!
//! | Record | Pattern | Visibility |
//! |---|---|---|
//! | value array | `NoRef` | visible everywhere |
//! | object array | `ObjArray` | visible everywhere |
//! | generic, no offsets | `NoRef` | visible everywhere |
//! | generic, offsets | exact offset tuple | same window as last offset |
//!
//! The visibility test uses the *last recorded* offset, not the numerically
//! largest one. On unsorted offset lists the two differ.

use crate::shape::{PatternKey, ShapeKind, ShapeRecord};
use crate::window::{WindowSize, WindowSizes};

/// Result of classifying one record against a window family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub pattern: PatternKey,
    /// One verdict per window, in the family's ascending order
    pub visibility: Vec<(WindowSize, bool)>,
}

impl Classification {
    /// Verdict for `window`, if it was part of the evaluated family
    pub fn visible_at(&self, window: WindowSize) -> Option<bool> {
        self.visibility
            .iter()
            .find(|(w, _)| *w == window)
            .map(|&(_, visible)| visible)
    }
}

/// Classify a record against every window in `windows`
pub fn classify(record: &ShapeRecord, windows: &WindowSizes) -> Classification {
    Classification {
        pattern: pattern_key(record),
        visibility: windows
            .iter()
            .map(|w| (w, is_visible(record, w)))
            .collect(),
    }
}

/// Canonical pattern identity of a record
pub fn pattern_key(record: &ShapeRecord) -> PatternKey {
    match record.kind {
        ShapeKind::ValueArray => PatternKey::NoRef,
        ShapeKind::ObjectArray => PatternKey::ObjArray,
        ShapeKind::Generic if record.offsets.is_empty() => PatternKey::NoRef,
        ShapeKind::Generic => PatternKey::Offsets(record.offsets.clone()),
    }
}

/// Whether the record's last reference lies in the same `window`-aligned
/// window as the record itself
#[inline]
pub fn is_visible(record: &ShapeRecord, window: WindowSize) -> bool {
    match record.kind {
        ShapeKind::ValueArray | ShapeKind::ObjectArray => true,
        ShapeKind::Generic => match record.offsets.last() {
            None => true,
            Some(&last) => {
                let start = record.address as i128;
                window.window_of(start) == window.window_of(start + last as i128)
            }
        },
    }
}
