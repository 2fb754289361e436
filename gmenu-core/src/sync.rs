//! Entry/list synchronizer.
//!
//! When the selection moves, the selected text is written into the entry.
//! Widgets report that write as a text change like any keystroke, and the
//! menu forwards it to [`Menu::query_changed`](crate::Menu::query_changed)
//! as usual. The guard raised here makes that handler drop it, so a
//! selection never re-arms the refilter timer.

use crate::menu::MenuView;

#[derive(Debug, Default)]
pub struct Synchronizer {
    syncing: bool,
    suppressed: u64,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the guard, copy `text` into the entry with everything selected
    /// and bring `row` into view. Returns whether the view reported a text
    /// change. The guard stays up until [`finish`](Self::finish).
    pub fn push_selection<V: MenuView + ?Sized>(
        &mut self,
        view: &mut V,
        row: usize,
        text: &str,
    ) -> bool {
        self.syncing = true;
        view.set_query_selected(text);
        view.scroll_to_row(row);
        view.take_query_changed()
    }

    pub fn finish(&mut self) {
        self.syncing = false;
    }

    /// Called by the change handler. True (and counted) when the change
    /// came from a selection and must be ignored.
    pub fn suppress(&mut self) -> bool {
        if self.syncing {
            self.suppressed += 1;
            tracing::trace!(suppressed = self.suppressed, "entry change from selection");
        }
        self.syncing
    }

    /// Number of change notifications swallowed so far.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Field {
        text: String,
        changed: bool,
        scrolled: Option<usize>,
    }

    impl MenuView for Field {
        fn query(&self) -> &str {
            &self.text
        }
        fn set_query_selected(&mut self, text: &str) {
            self.changed |= self.text != text;
            self.text = text.to_string();
        }
        fn scroll_to_row(&mut self, row: usize) {
            self.scrolled = Some(row);
        }
        fn take_query_changed(&mut self) -> bool {
            std::mem::take(&mut self.changed)
        }
    }

    #[test]
    fn guard_is_up_between_push_and_finish() {
        let mut sync = Synchronizer::new();
        let mut field = Field::default();
        assert!(!sync.suppress());

        assert!(sync.push_selection(&mut field, 3, "apple"));
        assert_eq!(field.text, "apple");
        assert_eq!(field.scrolled, Some(3));
        assert!(sync.suppress());
        sync.finish();

        assert!(!sync.suppress());
        assert_eq!(sync.suppressed(), 1);
    }

    #[test]
    fn unchanged_text_reports_no_change() {
        let mut sync = Synchronizer::new();
        let mut field = Field {
            text: "apple".into(),
            ..Field::default()
        };
        assert!(!sync.push_selection(&mut field, 0, "apple"));
        sync.finish();
    }
}
