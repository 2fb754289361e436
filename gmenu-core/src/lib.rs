//! gmenu-core: candidate store, matching, debounced refiltering and
//! selection navigation for a dmenu-style picker.
//!
//! Nothing in this crate knows about a widget toolkit. A front end implements
//! [`MenuView`] for its entry/list widgets, owns a [`Menu`] and feeds it key
//! presses, text edits and clock readings from its event loop.

pub mod candidate;
pub mod keys;
pub mod matcher;
pub mod menu;
pub mod navigator;
pub mod scheduler;
pub mod sync;
pub mod visible;

pub use candidate::{Candidate, CandidateList};
pub use keys::{dispatch, Action, Key};
pub use matcher::{fold_case, visible, MatchMode, MatchSpan, Matcher};
pub use menu::{KeyOutcome, Menu, MenuOptions, MenuView, Outcome, Row};
pub use scheduler::{RefilterScheduler, RefilterToken, DEFAULT_DEBOUNCE};
pub use sync::Synchronizer;
pub use visible::VisibleSet;

/// Errors surfaced by the core.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("failed to read candidates: {0}")]
    Read(#[from] std::io::Error),
    #[error("unknown match mode `{0}` (expected substring, glob or regex)")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, MenuError>;
