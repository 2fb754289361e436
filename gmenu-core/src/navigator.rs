//! Selection navigation with wraparound over the visible rows.
//!
//! Selections are carried as underlying list indices so that a refilter can
//! tell whether the selected candidate is still on screen. Both directions
//! are evaluated against whatever [`VisibleSet`] is current when called.

use crate::visible::VisibleSet;

/// Next visible entry after `current`, wrapping to the first one.
///
/// Without a selection this picks the first visible entry. Returns `None`
/// only when nothing is visible.
pub fn next(visible: &VisibleSet, current: Option<usize>) -> Option<usize> {
    current
        .and_then(|cur| visible.indices().find(|&i| i > cur))
        .or_else(|| visible.first())
}

/// Previous visible entry before `current`, wrapping to the last one.
///
/// Without a selection this picks the last visible entry, which is found by
/// walking the visible ordering to its end.
pub fn previous(visible: &VisibleSet, current: Option<usize>) -> Option<usize> {
    current
        .and_then(|cur| visible.indices().take_while(|&i| i < cur).last())
        .or_else(|| visible.last())
}
