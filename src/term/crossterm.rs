//! Crossterm-based `DisplaySink`/`EventSource` implementation (spec §6).
//!
//! Crossterm's base key events don't distinguish left/right modifier keys
//! or report modifier-only press/release independently of a keypress, so
//! this backend only ever synthesizes the *left* variant (`LCtrl`, `LAlt`,
//! `LShift`, `LSuper`) and derives down/up transitions by diffing each
//! event's modifier bitset against the previous one. A keyboard-protocol
//! extension (kitty's enhancement flags) could report true left/right
//! press/release, but plain crossterm cannot.

use crate::error::{LiteError, Result};
use crate::gui::{AnnotatedText, DisplaySink, EventSource, GuiContext, InputEvent};
use crate::key::Modifier;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute, queue,
    style::{Color as CtColor, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::collections::VecDeque;
use std::io::{stdout, BufWriter, Write};

fn io_err(e: impl std::fmt::Display) -> LiteError {
    LiteError::new(crate::error::ErrorKind::Generic, "TERMINAL", e.to_string())
}

/// Renders a well-known keystring for keys without a printable form (spec
/// §6: `<return>`, `<backspace>`, `<tab>`, `<escape>`, `<left-arrow>`,
/// `<up-arrow>`, `<f1>`…`<f24>`, `<numpad:…>`).
fn translate_keycode(code: KeyCode) -> Option<String> {
    Some(match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "<return>".to_string(),
        KeyCode::Backspace => "<backspace>".to_string(),
        KeyCode::Tab => "<tab>".to_string(),
        KeyCode::Esc => "<escape>".to_string(),
        KeyCode::Left => "<left-arrow>".to_string(),
        KeyCode::Right => "<right-arrow>".to_string(),
        KeyCode::Up => "<up-arrow>".to_string(),
        KeyCode::Down => "<down-arrow>".to_string(),
        KeyCode::Home => "<home>".to_string(),
        KeyCode::End => "<end>".to_string(),
        KeyCode::PageUp => "<page-up>".to_string(),
        KeyCode::PageDown => "<page-down>".to_string(),
        KeyCode::Delete => "<delete>".to_string(),
        KeyCode::Insert => "<insert>".to_string(),
        KeyCode::F(n) => format!("<f{n}>"),
        KeyCode::BackTab => "<back-tab>".to_string(),
        _ => return None,
    })
}

/// Only the `L*` half of the modifier set is ever reported — see the
/// module doc comment.
const TRACKED: [(KeyModifiers, Modifier); 4] = [
    (KeyModifiers::CONTROL, Modifier::LCtrl),
    (KeyModifiers::ALT, Modifier::LAlt),
    (KeyModifiers::SHIFT, Modifier::LShift),
    (KeyModifiers::SUPER, Modifier::LSuper),
];

/// Diffs `prev` against `next`'s modifier bitset, pushing `ModifierDown`/
/// `ModifierUp` events for every bit that changed.
fn diff_modifiers(prev: KeyModifiers, next: KeyModifiers, out: &mut VecDeque<InputEvent>) {
    for (bit, modifier) in TRACKED {
        let was = prev.contains(bit);
        let is = next.contains(bit);
        if is && !was {
            out.push_back(InputEvent::ModifierDown(modifier));
        } else if was && !is {
            out.push_back(InputEvent::ModifierUp(modifier));
        }
    }
}

pub struct CrosstermBackend {
    writer: BufWriter<std::io::Stdout>,
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
    last_modifiers: KeyModifiers,
    pending: VecDeque<InputEvent>,
}

impl CrosstermBackend {
    pub fn new() -> Result<Self> {
        Ok(CrosstermBackend {
            writer: BufWriter::with_capacity(8192, stdout()),
            raw_mode_enabled: false,
            alternate_screen_enabled: false,
            last_modifiers: KeyModifiers::NONE,
            pending: VecDeque::new(),
        })
    }

    pub fn init(&mut self) -> Result<()> {
        execute!(self.writer, terminal::EnterAlternateScreen).map_err(io_err)?;
        self.alternate_screen_enabled = true;
        terminal::enable_raw_mode().map_err(io_err)?;
        self.raw_mode_enabled = true;
        execute!(self.writer, cursor::Hide).map_err(io_err)?;
        self.writer.flush().map_err(io_err)?;
        Ok(())
    }

    pub fn deinit(&mut self) {
        let _ = execute!(self.writer, cursor::Show);
        if self.raw_mode_enabled {
            let _ = terminal::disable_raw_mode();
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            let _ = execute!(self.writer, terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }
        let _ = self.writer.flush();
    }

    fn queue_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind != event::KeyEventKind::Press {
            return;
        }
        diff_modifiers(self.last_modifiers, key_event.modifiers, &mut self.pending);
        self.last_modifiers = key_event.modifiers;
        if let Some(keystring) = translate_keycode(key_event.code) {
            self.pending.push_back(InputEvent::KeyDown(keystring));
        }
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        self.deinit();
    }
}

impl EventSource for CrosstermBackend {
    fn poll(&mut self, idle_ms: u64) -> Result<Option<InputEvent>> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }
        if !event::poll(std::time::Duration::from_millis(idle_ms)).map_err(io_err)? {
            return Ok(None);
        }
        match event::read().map_err(io_err)? {
            Event::Key(key_event) => self.queue_key_event(key_event),
            Event::Resize(_, _) => {}
            _ => {}
        }
        Ok(self.pending.pop_front())
    }
}

fn ct_color(rgba: [u8; 4]) -> CtColor {
    CtColor::Rgb { r: rgba[0], g: rgba[1], b: rgba[2] }
}

/// Writes `text`'s bytes with its property spans applied, defaulting to
/// `default_fg`/`default_bg` between spans.
fn write_annotated(
    writer: &mut BufWriter<std::io::Stdout>,
    text: &AnnotatedText,
    default_fg: [u8; 4],
    default_bg: [u8; 4],
) -> Result<()> {
    let mut cursor = 0usize;
    let mut spans: Vec<_> = text.spans.iter().collect();
    spans.sort_by_key(|s| s.offset);
    for span in spans {
        if span.offset > cursor {
            queue!(writer, SetForegroundColor(ct_color(default_fg)), SetBackgroundColor(ct_color(default_bg)))
                .map_err(io_err)?;
            writer.write_all(&text.bytes[cursor..span.offset]).map_err(io_err)?;
        }
        let end = (span.offset + span.length).min(text.bytes.len());
        queue!(writer, SetForegroundColor(ct_color(span.fg)), SetBackgroundColor(ct_color(span.bg))).map_err(io_err)?;
        writer.write_all(&text.bytes[span.offset.min(text.bytes.len())..end]).map_err(io_err)?;
        cursor = end;
    }
    if cursor < text.bytes.len() {
        queue!(writer, SetForegroundColor(ct_color(default_fg)), SetBackgroundColor(ct_color(default_bg))).map_err(io_err)?;
        writer.write_all(&text.bytes[cursor..]).map_err(io_err)?;
    }
    queue!(writer, ResetColor).map_err(io_err)?;
    Ok(())
}

impl DisplaySink for CrosstermBackend {
    fn present(&mut self, ctx: &GuiContext) -> Result<()> {
        queue!(self.writer, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0)).map_err(io_err)?;

        if let Some(title) = &ctx.title {
            write_annotated(&mut self.writer, title, ctx.default_fg, ctx.default_bg)?;
            queue!(self.writer, cursor::MoveToNextLine(1)).map_err(io_err)?;
        }

        write_annotated(&mut self.writer, &ctx.headline, ctx.default_fg, ctx.default_bg)?;
        queue!(self.writer, cursor::MoveToNextLine(1)).map_err(io_err)?;

        let body = if ctx.reading { ctx.popup.as_ref().unwrap_or(&ctx.contents) } else { &ctx.contents };
        let lines: Vec<&[u8]> = body.bytes.split(|b| *b == b'\n').collect();
        let start = ctx.scroll_row.min(lines.len());
        let end = (start + ctx.window_rows as usize).min(lines.len());
        for line in &lines[start..end] {
            self.writer.write_all(line).map_err(io_err)?;
            queue!(self.writer, cursor::MoveToNextLine(1)).map_err(io_err)?;
        }

        write_annotated(&mut self.writer, &ctx.footline, ctx.default_fg, ctx.default_bg)?;
        self.writer.flush().map_err(io_err)?;
        Ok(())
    }
}
