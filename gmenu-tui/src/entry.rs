//! Single-line text entry for the query.
//!
//! Cursor positions are char indices. Any mutation that changes the text
//! raises a changed flag, which the menu drains after every edit.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Default, Clone)]
pub struct Entry {
    text: String,
    cursor: usize,
    all_selected: bool,
    changed: bool,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    /// Programmatic replace; the whole text ends up selected so the next
    /// keystroke overwrites it.
    pub fn set_text_selected(&mut self, text: &str) {
        self.set_text(text.to_string());
        self.cursor = self.char_len();
        self.all_selected = true;
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Edit with a key press. Returns false for keys the entry ignores.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('a') if ctrl => self.move_to(0),
            KeyCode::Char('e') if ctrl => self.move_to(self.char_len()),
            KeyCode::Char('u') if ctrl => self.kill_to_start(),
            KeyCode::Char('w') if ctrl => self.kill_word(),
            KeyCode::Char(c) if !ctrl && !alt => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => {
                let to = if self.all_selected { 0 } else { self.cursor.saturating_sub(1) };
                self.move_to(to)
            }
            KeyCode::Right => {
                let to = if self.all_selected { self.char_len() } else { self.cursor + 1 };
                self.move_to(to)
            }
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.char_len()),
            _ => return false,
        }
        true
    }

    pub fn insert(&mut self, c: char) {
        if self.all_selected {
            self.clear_selected();
        }
        let mut text = std::mem::take(&mut self.text);
        text.insert(self.byte_at(&text, self.cursor), c);
        self.cursor += 1;
        self.set_text(text);
    }

    pub fn backspace(&mut self) {
        if self.all_selected {
            self.clear_selected();
            return;
        }
        if self.cursor == 0 {
            return;
        }
        self.remove_range(self.cursor - 1, self.cursor);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.all_selected {
            self.clear_selected();
            return;
        }
        if self.cursor < self.char_len() {
            self.remove_range(self.cursor, self.cursor + 1);
        }
    }

    fn kill_to_start(&mut self) {
        if self.all_selected {
            self.clear_selected();
            return;
        }
        self.remove_range(0, self.cursor);
        self.cursor = 0;
    }

    fn kill_word(&mut self) {
        if self.all_selected {
            self.clear_selected();
            return;
        }
        let chars: Vec<char> = self.text.chars().take(self.cursor).collect();
        let mut start = chars.len();
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        self.remove_range(start, self.cursor);
        self.cursor = start;
    }

    fn move_to(&mut self, cursor: usize) {
        self.all_selected = false;
        self.cursor = cursor.min(self.char_len());
    }

    fn clear_selected(&mut self) {
        self.all_selected = false;
        self.cursor = 0;
        self.set_text(String::new());
    }

    fn remove_range(&mut self, from: usize, to: usize) {
        if from >= to {
            return;
        }
        let mut text = std::mem::take(&mut self.text);
        let a = self.byte_at(&text, from);
        let b = self.byte_at(&text, to);
        text.replace_range(a..b, "");
        self.set_text(text);
    }

    fn set_text(&mut self, text: String) {
        if text != self.text {
            self.changed = true;
        }
        self.text = text;
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, text: &str, cursor: usize) -> usize {
        text.char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    }

    /// Display columns occupied by the text before the cursor.
    pub fn cursor_column(&self) -> usize {
        let end = self.byte_at(&self.text, self.cursor);
        self.text[..end].width()
    }
}
