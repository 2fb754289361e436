use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use gmenu_core::{CandidateList, Key, KeyOutcome, Menu, MenuOptions, MenuView, Outcome};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::sync::Once;
use std::time::{Duration, Instant};

use crate::entry::Entry;
use crate::theme::TuiTheme;
use crate::ui;

/// Upper bound on how long the loop sleeps when no refilter is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct PickerConfig {
    pub menu: MenuOptions,
    pub title: String,
    pub width: u16,
    pub height: u16,
    pub highlight: bool,
    pub theme: TuiTheme,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            menu: MenuOptions::default(),
            title: String::from("gmenu"),
            width: 40,
            height: 20,
            highlight: true,
            theme: TuiTheme::default(),
        }
    }
}

/// Entry and list state backing the menu in the terminal.
#[derive(Debug, Default)]
pub struct TuiView {
    pub entry: Entry,
    /// First visible row drawn at the top of the list.
    pub offset: usize,
    /// Where the rows were last drawn; used for mouse hit-testing.
    pub rows_area: Rect,
    // row to bring into view on the next draw
    scroll_to: Option<usize>,
}

impl TuiView {
    /// Pick the scroll offset for a list of `total` rows shown `height` at a
    /// time, keeping the requested (or selected) row on screen.
    pub fn place_window(&mut self, selected: Option<usize>, height: usize, total: usize) -> usize {
        if let Some(row) = self.scroll_to.take().or(selected) {
            if row < self.offset {
                self.offset = row;
            } else if height > 0 && row >= self.offset + height {
                self.offset = row + 1 - height;
            }
        }
        self.offset = self.offset.min(total.saturating_sub(height.max(1)));
        self.offset
    }

    /// Visible row position under a screen cell, if any.
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let a = self.rows_area;
        let inside = column >= a.x && column < a.x + a.width && row >= a.y && row < a.y + a.height;
        inside.then(|| self.offset + (row - a.y) as usize)
    }
}

impl MenuView for TuiView {
    fn query(&self) -> &str {
        self.entry.text()
    }

    fn set_query_selected(&mut self, text: &str) {
        self.entry.set_text_selected(text);
    }

    fn scroll_to_row(&mut self, row: usize) {
        self.scroll_to = Some(row);
    }

    fn take_query_changed(&mut self) -> bool {
        self.entry.take_changed()
    }

    fn rows_changed(&mut self) {
        self.offset = 0;
        self.scroll_to = None;
    }
}

pub trait EventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>>;
}
pub struct RealEventSource;
impl EventSource for RealEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if crossterm::event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

pub fn run_picker_default(candidates: CandidateList, cfg: &PickerConfig) -> Result<Outcome> {
    let mut es = RealEventSource;
    run_picker_with(candidates, cfg, &mut es, true)
}

/// Run one session. With `draw` off nothing touches the terminal, which is
/// how the tests drive the loop.
pub fn run_picker_with(
    candidates: CandidateList,
    cfg: &PickerConfig,
    es: &mut dyn EventSource,
    draw: bool,
) -> Result<Outcome> {
    let mut menu = Menu::new(candidates, cfg.menu, TuiView::default());
    if !draw {
        return event_loop(&mut menu, es, &mut |_: &mut Menu<TuiView>| Ok(()));
    }

    // The UI goes to stderr; stdout is reserved for the result line.
    let guard = enter_terminal().context("preparing terminal")?;
    let result = match Terminal::new(CrosstermBackend::new(io::stderr())) {
        Ok(mut terminal) => event_loop(&mut menu, es, &mut |m: &mut Menu<TuiView>| {
            terminal.draw(|f| ui::draw(f, m, cfg))?;
            Ok(())
        }),
        Err(e) => Err(e.into()),
    };
    let restored = guard.finish().context("restoring terminal");
    result.and_then(|outcome| restored.map(|()| outcome))
}

/// Runs its restore step exactly once: on `finish`, or on drop when an
/// early return or a panic skips `finish`.
struct TerminalGuard<R: FnMut() -> io::Result<()>> {
    restore: Option<R>,
}

impl<R: FnMut() -> io::Result<()>> TerminalGuard<R> {
    fn finish(mut self) -> io::Result<()> {
        self.restore.take().map_or(Ok(()), |mut restore| restore())
    }
}

impl<R: FnMut() -> io::Result<()>> Drop for TerminalGuard<R> {
    fn drop(&mut self) {
        if let Some(mut restore) = self.restore.take() {
            let _ = restore();
        }
    }
}

/// Enable raw mode, then arm the guard before switching screens so a failed
/// switch still leaves raw mode.
fn guarded_setup<R: FnMut() -> io::Result<()>>(
    raw: impl FnOnce() -> io::Result<()>,
    screen: impl FnOnce() -> io::Result<()>,
    restore: R,
) -> io::Result<TerminalGuard<R>> {
    raw()?;
    let guard = TerminalGuard {
        restore: Some(restore),
    };
    screen()?;
    Ok(guard)
}

fn enter_terminal() -> io::Result<TerminalGuard<fn() -> io::Result<()>>> {
    install_panic_hook();
    guarded_setup(
        enable_raw_mode,
        || crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture),
        restore_terminal as fn() -> io::Result<()>,
    )
}

/// Every step runs even if an earlier one fails; the first error wins.
fn restore_terminal() -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = crossterm::execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);
    raw.and(screen)
}

// The panic message would otherwise be printed on the alternate screen and
// vanish when the guard leaves it.
fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            tracing::error!(%info, "panic");
            default_panic(info);
        }));
    });
}

fn event_loop(
    menu: &mut Menu<TuiView>,
    es: &mut dyn EventSource,
    draw: &mut dyn FnMut(&mut Menu<TuiView>) -> Result<()>,
) -> Result<Outcome> {
    loop {
        draw(menu)?;
        let timeout = menu
            .time_until_refilter(Instant::now())
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));
        if let Some(ev) = es.poll(timeout)? {
            if let Some(outcome) = handle_event(menu, ev) {
                return Ok(outcome);
            }
        }
        menu.poll_refilter(Instant::now());
    }
}

fn handle_event(menu: &mut Menu<TuiView>, ev: Event) -> Option<Outcome> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press => {
            // window close
            if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
                return Some(menu.cancel());
            }
            match menu.handle_key(map_key(&k)) {
                KeyOutcome::Finished(outcome) => return Some(outcome),
                KeyOutcome::Handled => {}
                KeyOutcome::Ignored => {
                    menu.edit(Instant::now(), |v| v.entry.handle_key(&k));
                }
            }
        }
        Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
            if let Some(row) = menu.view().row_at(m.column, m.row) {
                menu.select_row(row);
            }
        }
        _ => {}
    }
    None
}

fn map_key(k: &KeyEvent) -> Key {
    match k.code {
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab if k.modifiers.contains(KeyModifiers::SHIFT) => Key::BackTab,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Enter => Key::Enter,
        _ => Key::Other,
    }
}
