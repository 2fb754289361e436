//! Application state for one picker session.
//!
//! [`Menu`] is owned by the front end's event loop and passed by `&mut` into
//! every handler. It never calls into a toolkit directly; all widget access
//! goes through the [`MenuView`] it owns.

use std::time::{Duration, Instant};

use crate::candidate::CandidateList;
use crate::keys::{dispatch, Action, Key};
use crate::matcher::{MatchMode, MatchSpan, Matcher};
use crate::navigator;
use crate::scheduler::{RefilterScheduler, DEFAULT_DEBOUNCE};
use crate::sync::Synchronizer;
use crate::visible::VisibleSet;

/// Widget surface the menu drives: a single-line entry and a list.
pub trait MenuView {
    /// Current entry text.
    fn query(&self) -> &str;
    /// Replace the entry text and select all of it.
    fn set_query_selected(&mut self, text: &str);
    /// Make the visible row at `row` scroll into view.
    fn scroll_to_row(&mut self, row: usize);
    /// Whether the entry text changed since the last call; resets the flag.
    fn take_query_changed(&mut self) -> bool;
    /// The visible rows were recomputed.
    fn rows_changed(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOptions {
    pub mode: MatchMode,
    pub case_sensitive: bool,
    pub debounce: Duration,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            mode: MatchMode::Substring,
            case_sensitive: false,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Return pressed; carries the line to print.
    Confirmed(String),
    /// Escape pressed or the window went away.
    Cancelled,
}

impl Outcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Confirmed(text) => Some(text),
            Outcome::Cancelled => None,
        }
    }

    /// Process exit status: success only for a confirmed result.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Confirmed(_) => 0,
            Outcome::Cancelled => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was consumed by the menu.
    Handled,
    /// Not a menu key; the entry should edit with it.
    Ignored,
    Finished(Outcome),
}

/// One visible row, ready for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a> {
    pub position: usize,
    pub index: usize,
    pub text: &'a str,
    pub selected: bool,
    pub span: Option<MatchSpan>,
}

pub struct Menu<V> {
    candidates: CandidateList,
    options: MenuOptions,
    // query as of the last refilter
    matcher: Matcher,
    visible: VisibleSet,
    // list index, always visible when set
    selected: Option<usize>,
    scheduler: RefilterScheduler,
    sync: Synchronizer,
    view: V,
    refilters: u64,
}

impl<V: MenuView> Menu<V> {
    pub fn new(candidates: CandidateList, options: MenuOptions, view: V) -> Self {
        let matcher = Matcher::new(options.mode, options.case_sensitive, view.query());
        let visible = VisibleSet::compute(&candidates, &matcher);
        Self {
            candidates,
            options,
            matcher,
            visible,
            selected: None,
            scheduler: RefilterScheduler::new(options.debounce),
            sync: Synchronizer::new(),
            view,
            refilters: 0,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    /// Matcher for the query the visible rows were computed from.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn refilter_count(&self) -> u64 {
        self.refilters
    }

    pub fn refilter_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn time_until_refilter(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_remaining(now)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Selection as a row position in the visible ordering.
    pub fn selected_position(&self) -> Option<usize> {
        self.selected.and_then(|i| self.visible.position_of(i))
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.candidates.get(i))
            .map(|c| c.text())
    }

    /// Visible texts in display order.
    pub fn visible_texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.visible.indices().map(|i| self.candidates[i].text())
    }

    /// Visible rows with selection state and, if asked, the match span.
    pub fn rows(&self, highlight: bool) -> impl Iterator<Item = Row<'_>> + '_ {
        self.visible
            .indices()
            .enumerate()
            .map(move |(position, index)| {
                let text = self.candidates[index].text();
                Row {
                    position,
                    index,
                    text,
                    selected: self.selected == Some(index),
                    span: if highlight {
                        self.matcher.highlight(text)
                    } else {
                        None
                    },
                }
            })
    }

    /// Apply a user edit to the view. A resulting text change arms the
    /// refilter timer.
    pub fn edit<R>(&mut self, now: Instant, f: impl FnOnce(&mut V) -> R) -> R {
        let out = f(&mut self.view);
        if self.view.take_query_changed() {
            self.query_changed(now);
        }
        out
    }

    /// The entry text changed. Ignored while a selection is being written
    /// into the entry.
    pub fn query_changed(&mut self, now: Instant) {
        if self.sync.suppress() {
            return;
        }
        self.scheduler.arm(now);
    }

    /// Run the refilter if its timer is due. Returns whether it ran.
    pub fn poll_refilter(&mut self, now: Instant) -> bool {
        match self.scheduler.fire_due(now) {
            Some(token) => {
                tracing::trace!(
                    token = token.id(),
                    late_us = now.saturating_duration_since(token.due()).as_micros() as u64,
                    "refilter due"
                );
                self.refilter();
                true
            }
            None => false,
        }
    }

    /// Recompute the visible set from the current entry text.
    pub fn refilter(&mut self) {
        self.matcher = Matcher::new(
            self.options.mode,
            self.options.case_sensitive,
            self.view.query(),
        );
        self.visible = VisibleSet::compute(&self.candidates, &self.matcher);
        if let Some(i) = self.selected {
            if !self.visible.contains(i) {
                self.selected = None;
            }
        }
        self.refilters += 1;
        tracing::debug!(
            query = self.matcher.query(),
            mode = %self.matcher.mode(),
            visible = self.visible.len(),
            total = self.candidates.len(),
            "refiltered"
        );
        self.view.rows_changed();
    }

    pub fn select_next(&mut self) -> bool {
        match navigator::next(&self.visible, self.selected) {
            Some(index) => self.set_selection(index),
            None => false,
        }
    }

    pub fn select_previous(&mut self) -> bool {
        match navigator::previous(&self.visible, self.selected) {
            Some(index) => self.set_selection(index),
            None => false,
        }
    }

    /// Select the visible row at `position`, as a click would.
    pub fn select_row(&mut self, position: usize) -> bool {
        match self.visible.index_at(position) {
            Some(index) => self.set_selection(index),
            None => false,
        }
    }

    fn set_selection(&mut self, index: usize) -> bool {
        if self.selected == Some(index) {
            return false;
        }
        let Some(row) = self.visible.position_of(index) else {
            return false;
        };
        self.selected = Some(index);
        let text = self.candidates[index].text();
        if self.sync.push_selection(&mut self.view, row, text) {
            // reported like a keystroke; the raised guard drops it
            self.query_changed(Instant::now());
        }
        self.sync.finish();
        true
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match dispatch(key) {
            None => KeyOutcome::Ignored,
            Some(Action::Cancel) => KeyOutcome::Finished(self.cancel()),
            Some(Action::SelectNext) => {
                self.select_next();
                KeyOutcome::Handled
            }
            Some(Action::SelectPrevious) => {
                self.select_previous();
                KeyOutcome::Handled
            }
            Some(Action::Confirm) => KeyOutcome::Finished(self.confirm()),
        }
    }

    /// End the session with the selected text, or the raw entry text when
    /// nothing is selected.
    pub fn confirm(&mut self) -> Outcome {
        self.scheduler.cancel();
        let text = match self.selected_text() {
            Some(text) => text.to_string(),
            None => self.view.query().to_string(),
        };
        tracing::info!(
            selected = self.selected.is_some(),
            suppressed = self.sync.suppressed(),
            "confirmed"
        );
        Outcome::Confirmed(text)
    }

    pub fn cancel(&mut self) -> Outcome {
        self.scheduler.cancel();
        tracing::info!(suppressed = self.sync.suppressed(), "cancelled");
        Outcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestView {
        text: String,
        changed: bool,
        all_selected: bool,
        scrolled_to: Option<usize>,
        row_refreshes: usize,
    }

    impl TestView {
        fn type_str(&mut self, s: &str) {
            if self.all_selected {
                self.text.clear();
                self.all_selected = false;
            }
            self.text.push_str(s);
            self.changed = true;
        }
    }

    impl MenuView for TestView {
        fn query(&self) -> &str {
            &self.text
        }
        fn set_query_selected(&mut self, text: &str) {
            self.text = text.to_string();
            self.all_selected = true;
            self.changed = true;
        }
        fn scroll_to_row(&mut self, row: usize) {
            self.scrolled_to = Some(row);
        }
        fn take_query_changed(&mut self) -> bool {
            std::mem::take(&mut self.changed)
        }
        fn rows_changed(&mut self) {
            self.row_refreshes += 1;
        }
    }

    fn menu(lines: &[&str]) -> Menu<TestView> {
        Menu::new(
            lines.iter().collect(),
            MenuOptions::default(),
            TestView::default(),
        )
    }

    fn settle(m: &mut Menu<TestView>, t: Instant) {
        assert!(m.poll_refilter(t + DEFAULT_DEBOUNCE));
    }

    #[test]
    fn starts_with_everything_visible_and_nothing_selected() {
        let m = menu(&["a", "b"]);
        assert_eq!(m.visible_texts().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(m.selected_position(), None);
        assert!(!m.refilter_pending());
    }

    #[test]
    fn typing_arms_and_refilter_waits_for_quiet_period() {
        let t0 = Instant::now();
        let mut m = menu(&["apple", "Banana", "apricot"]);
        m.edit(t0, |v| v.type_str("ap"));
        assert!(m.refilter_pending());
        assert!(!m.poll_refilter(t0 + Duration::from_millis(100)));
        assert_eq!(m.visible().len(), 3);
        settle(&mut m, t0);
        assert_eq!(m.visible_texts().collect::<Vec<_>>(), ["apple", "apricot"]);
        assert_eq!(m.view().row_refreshes, 1);
    }

    #[test]
    fn burst_of_edits_refilters_once_with_latest_text() {
        let t0 = Instant::now();
        let mut m = menu(&["apple", "Banana", "apricot"]);
        for (i, ch) in ["b", "a", "n"].into_iter().enumerate() {
            m.edit(t0 + Duration::from_millis(100 * i as u64), |v| v.type_str(ch));
        }
        let last = t0 + Duration::from_millis(200);
        assert!(!m.poll_refilter(t0 + DEFAULT_DEBOUNCE));
        assert!(m.poll_refilter(last + DEFAULT_DEBOUNCE));
        assert!(!m.poll_refilter(last + DEFAULT_DEBOUNCE * 2));
        assert_eq!(m.refilter_count(), 1);
        assert_eq!(m.matcher().query(), "ban");
        assert_eq!(m.visible_texts().collect::<Vec<_>>(), ["Banana"]);
    }

    #[test]
    fn selection_writes_entry_without_rearming() {
        let mut m = menu(&["apple", "Banana", "apricot"]);
        assert!(m.select_next());
        assert_eq!(m.view().query(), "apple");
        assert!(m.view().all_selected);
        assert_eq!(m.view().scrolled_to, Some(0));
        assert!(!m.refilter_pending());
        assert_eq!(m.refilter_count(), 0);

        assert!(m.select_previous());
        assert_eq!(m.view().query(), "apricot");
        assert_eq!(m.view().scrolled_to, Some(2));
        assert!(!m.refilter_pending());
        // both writes reached the change handler and were dropped there
        assert_eq!(m.sync.suppressed(), 2);
        assert!(!m.sync.suppress());
    }

    #[test]
    fn refilter_keeps_a_still_visible_selection() {
        let t0 = Instant::now();
        let mut m = menu(&["apple", "Banana", "apricot"]);
        m.select_previous(); // apricot
        m.edit(t0, |v| v.type_str("ap"));
        settle(&mut m, t0);
        assert_eq!(m.selected_text(), Some("apricot"));
        assert_eq!(m.selected_position(), Some(1));
    }

    #[test]
    fn refilter_drops_a_hidden_selection_without_reselecting() {
        let t0 = Instant::now();
        let mut m = menu(&["apple", "Banana", "apricot"]);
        m.select_next(); // apple, entry fully selected
        m.edit(t0, |v| v.type_str("ban"));
        assert_eq!(m.view().query(), "ban");
        settle(&mut m, t0);
        assert_eq!(m.selected_index(), None);
        assert_eq!(m.visible_texts().collect::<Vec<_>>(), ["Banana"]);
    }

    #[test]
    fn navigation_on_empty_set_is_a_no_op() {
        let t0 = Instant::now();
        let mut m = menu(&["one", "two"]);
        m.edit(t0, |v| v.type_str("zzz"));
        settle(&mut m, t0);
        assert!(!m.select_next());
        assert!(!m.select_previous());
        assert_eq!(m.selected_index(), None);
        assert_eq!(m.view().query(), "zzz");
    }

    #[test]
    fn single_visible_row_stays_selected() {
        let mut m = menu(&["only"]);
        assert!(m.select_next());
        assert!(!m.select_next());
        assert!(!m.select_previous());
        assert_eq!(m.selected_text(), Some("only"));
    }

    #[test]
    fn click_selects_by_visible_position() {
        let t0 = Instant::now();
        let mut m = menu(&["apple", "Banana", "apricot"]);
        m.edit(t0, |v| v.type_str("ap"));
        settle(&mut m, t0);
        assert!(m.select_row(1));
        assert_eq!(m.selected_text(), Some("apricot"));
        assert!(!m.select_row(2));
    }

    #[test]
    fn keys_drive_navigation_and_outcomes() {
        let mut m = menu(&["a", "b", "c"]);
        assert_eq!(m.handle_key(Key::Other), KeyOutcome::Ignored);
        assert_eq!(m.handle_key(Key::Up), KeyOutcome::Handled);
        assert_eq!(m.selected_text(), Some("c"));
        assert_eq!(m.handle_key(Key::Tab), KeyOutcome::Handled);
        assert_eq!(m.selected_text(), Some("a"));
        assert_eq!(m.handle_key(Key::BackTab), KeyOutcome::Handled);
        assert_eq!(m.selected_text(), Some("c"));
        assert_eq!(
            m.handle_key(Key::Enter),
            KeyOutcome::Finished(Outcome::Confirmed("c".into()))
        );
    }

    #[test]
    fn confirm_without_selection_emits_query() {
        let t0 = Instant::now();
        let mut m = menu(&[]);
        m.edit(t0, |v| v.type_str("free text"));
        let out = m.confirm();
        assert_eq!(out, Outcome::Confirmed("free text".into()));
        assert_eq!(out.exit_code(), 0);
        assert!(!m.refilter_pending());
    }

    #[test]
    fn cancel_tears_down_pending_timer() {
        let t0 = Instant::now();
        let mut m = menu(&["x"]);
        m.edit(t0, |v| v.type_str("x"));
        assert!(m.refilter_pending());
        let out = m.handle_key(Key::Escape);
        assert_eq!(out, KeyOutcome::Finished(Outcome::Cancelled));
        assert!(!m.refilter_pending());
        assert!(!m.poll_refilter(t0 + DEFAULT_DEBOUNCE * 2));
        assert_eq!(Outcome::Cancelled.exit_code(), 1);
    }

    #[test]
    fn rows_carry_highlight_for_applied_query() {
        let t0 = Instant::now();
        let mut m = menu(&["xAPple", "Banana", "apricot"]);
        m.edit(t0, |v| v.type_str("ap"));
        settle(&mut m, t0);
        m.select_next();
        let rows: Vec<Row<'_>> = m.rows(true).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].span, Some(MatchSpan { start: 1, len: 2 }));
        assert!(rows[0].selected);
        assert_eq!(rows[1].position, 1);
        assert_eq!(rows[1].index, 2);
        assert!(m.rows(false).all(|r| r.span.is_none()));
    }
}
