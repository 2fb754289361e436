//! Key dispatcher: classifies key presses into menu actions.

/// Keys the menu reacts to. Front ends map their native key events onto this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Tab,
    /// Shift+Tab
    BackTab,
    Up,
    Down,
    Enter,
    /// Anything else; left to the entry's own editing.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Cancel,
    SelectNext,
    SelectPrevious,
    Confirm,
}

/// First matching rule wins; `None` means the key falls through.
pub fn dispatch(key: Key) -> Option<Action> {
    match key {
        Key::Escape => Some(Action::Cancel),
        Key::Tab | Key::Down => Some(Action::SelectNext),
        Key::BackTab | Key::Up => Some(Action::SelectPrevious),
        Key::Enter => Some(Action::Confirm),
        Key::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table() {
        assert_eq!(dispatch(Key::Escape), Some(Action::Cancel));
        assert_eq!(dispatch(Key::Tab), Some(Action::SelectNext));
        assert_eq!(dispatch(Key::Down), Some(Action::SelectNext));
        assert_eq!(dispatch(Key::BackTab), Some(Action::SelectPrevious));
        assert_eq!(dispatch(Key::Up), Some(Action::SelectPrevious));
        assert_eq!(dispatch(Key::Enter), Some(Action::Confirm));
        assert_eq!(dispatch(Key::Other), None);
    }
}
