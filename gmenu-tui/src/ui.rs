//! Drawing: a centred dialog with the entry above a header-less list.

use gmenu_core::{MatchSpan, Menu, Row};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::picker::{PickerConfig, TuiView};

const ELLIPSIS: char = '…';

pub fn draw(f: &mut Frame, menu: &mut Menu<TuiView>, cfg: &PickerConfig) {
    let thm = cfg.theme;
    let area = dialog_area(f.area(), cfg.width, cfg.height);
    f.render_widget(Clear, area);

    let outer = Block::bordered()
        .title(cfg.title.as_str())
        .border_style(Style::default().fg(thm.border_fg));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let [entry_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(inner);

    // entry
    let entry_block = Block::bordered().border_style(Style::default().fg(thm.border_fg));
    let field = entry_block.inner(entry_area);
    let entry = &menu.view().entry;
    let (shown, cursor_x) = entry_window(entry.text(), entry.cursor_column(), field.width as usize);
    let entry_style = if entry.is_all_selected() && !entry.text().is_empty() {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(shown, entry_style))).block(entry_block),
        entry_area,
    );
    if field.width > 0 && field.height > 0 {
        f.set_cursor_position(Position::new(field.x + cursor_x as u16, field.y));
    }

    // list
    let list_block = Block::bordered().border_style(Style::default().fg(thm.border_fg));
    let rows_area = list_block.inner(list_area);
    let height = rows_area.height as usize;
    let width = rows_area.width as usize;
    let selected = menu.selected_position();
    let total = menu.visible().len();
    let offset = menu.view_mut().place_window(selected, height, total);

    let items: Vec<ListItem> = menu
        .rows(cfg.highlight)
        .skip(offset)
        .take(height)
        .map(|row| row_item(&row, width, cfg))
        .collect();
    let list = List::new(items).block(list_block).highlight_style(
        Style::default()
            .fg(thm.highlight_fg)
            .bg(thm.highlight_bg),
    );
    let mut state =
        ListState::default().with_selected(selected.and_then(|p| p.checked_sub(offset)));
    f.render_stateful_widget(list, list_area, &mut state);

    menu.view_mut().rows_area = rows_area;
}

/// `width` x `height` centred in `area`, shrunk to fit.
pub fn dialog_area(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

fn row_item(row: &Row<'_>, width: usize, cfg: &PickerConfig) -> ListItem<'static> {
    let (chars, dropped) = ellipsize_start(row.text, width);
    let span = row.span.and_then(|s| shift_span(s, dropped));
    let line = match span {
        Some(MatchSpan { start, len }) => {
            let before: String = chars[..start].iter().collect();
            let matched: String = chars[start..start + len].iter().collect();
            let after: String = chars[start + len..].iter().collect();
            Line::from(vec![
                Span::raw(before),
                Span::styled(
                    matched,
                    Style::default()
                        .fg(cfg.theme.match_fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(after),
            ])
        }
        None => Line::from(chars.into_iter().collect::<String>()),
    };
    ListItem::new(line)
}

/// Fit `text` into `width` columns by dropping leading chars behind an
/// ellipsis. Returns the displayed chars and how many original chars were
/// replaced by the ellipsis.
pub fn ellipsize_start(text: &str, width: usize) -> (Vec<char>, usize) {
    let chars: Vec<char> = text.chars().collect();
    if text.width() <= width {
        return (chars, 0);
    }
    if width == 0 {
        return (Vec::new(), chars.len());
    }
    let budget = width - 1;
    let mut used = 0;
    let mut keep_from = chars.len();
    while keep_from > 0 {
        let w = chars[keep_from - 1].width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        keep_from -= 1;
    }
    let mut shown = Vec::with_capacity(chars.len() - keep_from + 1);
    shown.push(ELLIPSIS);
    shown.extend_from_slice(&chars[keep_from..]);
    (shown, keep_from)
}

/// Re-base a span onto ellipsized text. The ellipsis occupies one char in
/// place of `dropped` original chars.
fn shift_span(span: MatchSpan, dropped: usize) -> Option<MatchSpan> {
    if dropped == 0 {
        return Some(span);
    }
    let end = span.start + span.len;
    if end <= dropped {
        return None;
    }
    let start = span.start.max(dropped);
    Some(MatchSpan {
        start: start - dropped + 1,
        len: end - start,
    })
}

/// Slice of the entry text to show so the cursor stays inside the field.
/// Returns the visible text and the cursor column within it.
fn entry_window(text: &str, cursor_col: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    if cursor_col < width {
        return (text.to_string(), cursor_col);
    }
    // skip leading columns until the cursor fits in the last cell
    let skip = cursor_col + 1 - width;
    let mut skipped = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if skipped < skip {
            skipped += w;
            continue;
        }
        out.push(c);
    }
    (out, cursor_col - skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::PickerConfig;
    use gmenu_core::{CandidateList, MenuOptions};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Instant;

    fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buf = terminal.backend().buffer();
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn ellipsis_drops_from_the_start() {
        let (shown, dropped) = ellipsize_start("/usr/local/bin/thing", 8);
        assert_eq!(shown.iter().collect::<String>(), "…n/thing");
        assert_eq!(dropped, 13);
        let (shown, dropped) = ellipsize_start("short", 8);
        assert_eq!(shown.iter().collect::<String>(), "short");
        assert_eq!(dropped, 0);
    }

    #[test]
    fn ellipsis_respects_wide_chars() {
        let (shown, _) = ellipsize_start("日本語テキスト", 6);
        let s: String = shown.iter().collect();
        assert_eq!(s, "…スト");
        assert_eq!(s.width(), 5);
    }

    #[test]
    fn spans_follow_ellipsis() {
        let span = MatchSpan { start: 14, len: 3 };
        assert_eq!(shift_span(span, 13), Some(MatchSpan { start: 2, len: 3 }));
        assert_eq!(shift_span(MatchSpan { start: 0, len: 4 }, 13), None);
        assert_eq!(
            shift_span(MatchSpan { start: 12, len: 3 }, 13),
            Some(MatchSpan { start: 1, len: 2 })
        );
    }

    #[test]
    fn entry_scrolls_to_keep_cursor_visible() {
        assert_eq!(entry_window("abc", 3, 10), ("abc".to_string(), 3));
        let (shown, col) = entry_window("abcdefghij", 10, 5);
        assert_eq!(shown, "ghij");
        assert_eq!(col, 4);
    }

    #[test]
    fn dialog_is_centred_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(dialog_area(area, 40, 20), Rect::new(30, 10, 40, 20));
        assert_eq!(dialog_area(Rect::new(0, 0, 30, 10), 40, 20), Rect::new(0, 0, 30, 10));
    }

    #[test]
    fn renders_title_rows_and_selection() {
        let cfg = PickerConfig {
            width: 30,
            height: 10,
            ..PickerConfig::default()
        };
        let candidates: CandidateList = ["apple", "Banana", "apricot"].into_iter().collect();
        let mut menu = Menu::new(candidates, MenuOptions::default(), TuiView::default());
        let t0 = Instant::now();
        menu.edit(t0, |v| {
            v.entry.insert('a');
            v.entry.insert('p');
        });
        assert!(menu.poll_refilter(t0 + cfg.menu.debounce));
        menu.select_next();

        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        terminal.draw(|f| draw(f, &mut menu, &cfg)).unwrap();
        let lines = screen(&terminal);
        assert!(lines[0].contains("gmenu"));
        assert!(lines.iter().any(|l| l.contains("apple")));
        assert!(lines.iter().any(|l| l.contains("apricot")));
        assert!(!lines.iter().any(|l| l.contains("Banana")));
        // rows area recorded for mouse hit-testing
        let rows = menu.view().rows_area;
        assert_eq!(rows.height, 10 - 2 - 3 - 2);
        assert!(lines[rows.y as usize].contains("apple"));
    }
}
