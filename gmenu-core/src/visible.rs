//! The visible subset of the candidate list.

use crate::candidate::CandidateList;
use crate::matcher::Matcher;

/// One visibility flag per candidate, recomputed wholesale on each refilter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleSet {
    flags: Vec<bool>,
    count: usize,
}

impl VisibleSet {
    /// Everything visible (the empty-query state).
    pub fn all(len: usize) -> Self {
        Self {
            flags: vec![true; len],
            count: len,
        }
    }

    /// Evaluate `matcher` against every candidate, in list order.
    pub fn compute(candidates: &CandidateList, matcher: &Matcher) -> Self {
        if matcher.matches_everything() {
            return Self::all(candidates.len());
        }
        let flags: Vec<bool> = candidates
            .iter()
            .map(|c| matcher.is_match(c.text()))
            .collect();
        let count = flags.iter().filter(|&&f| f).count();
        Self { flags, count }
    }

    /// Number of visible candidates.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Underlying list indices of the visible candidates, in list order.
    pub fn indices(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
    }

    pub fn first(&self) -> Option<usize> {
        self.indices().next()
    }

    /// Last visible index. Walks the whole visible ordering.
    pub fn last(&self) -> Option<usize> {
        self.indices().last()
    }

    /// Row position of a list index within the visible ordering.
    pub fn position_of(&self, index: usize) -> Option<usize> {
        if !self.contains(index) {
            return None;
        }
        Some(self.flags[..index].iter().filter(|&&f| f).count())
    }

    /// List index shown at a visible row position.
    pub fn index_at(&self, position: usize) -> Option<usize> {
        self.indices().nth(position)
    }
}
