//! The top-level `Editor`: wires `EditorState` to a `DisplaySink`/
//! `EventSource` backend and runs the cooperative draw/wait/handle loop
//! (spec §5, §9's scheduling model).

use crate::error::Result;
use crate::gui::{AnnotatedText, DisplaySink, EventSource};
use crate::input;
use crate::state::EditorState;
use crate::value::Value;

/// Default idle sleep between frames until `REDISPLAY-IDLE-MS` is bound.
const DEFAULT_IDLE_MS: u64 = 16;

pub struct Editor<B: DisplaySink + EventSource> {
    pub state: EditorState,
    backend: B,
}

impl<B: DisplaySink + EventSource> Editor<B> {
    /// Builds an editor over an empty scratch buffer.
    pub fn new(backend: B) -> Self {
        Self::with_files(backend, &[])
    }

    /// Builds an editor, opening `paths` as buffers (first one current) —
    /// an empty scratch buffer if `paths` is empty, mirroring the original
    /// LITE's "no args opens scratch" behavior.
    pub fn with_files(backend: B, paths: &[std::path::PathBuf]) -> Self {
        let mut state = EditorState::new();
        crate::builtins::install_all(&mut state);

        let current = if paths.is_empty() {
            state.open_buffer(None).expect("an unnamed buffer never fails to open")
        } else {
            let mut first = None;
            for path in paths {
                match state.open_buffer(Some(path)) {
                    Ok(id) => first.get_or_insert(id),
                    Err(e) => {
                        eprintln!("lite: {}: {}", path.display(), e.message);
                        continue;
                    }
                };
            }
            first.unwrap_or_else(|| state.open_buffer(None).expect("an unnamed buffer never fails to open"))
        };
        state.set_current_buffer(current).expect("global environment always accepts a new binding");

        Editor { state, backend }
    }

    /// Requests that `run` return after the current frame, equivalent to
    /// the `QUIT-LISP` builtin.
    pub fn quit(&mut self) {
        self.state.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit
    }

    fn idle_ms(&mut self) -> u64 {
        let sym = self.state.symbols.intern("REDISPLAY-IDLE-MS");
        let ctx = self.state.env_ctx();
        match crate::env::try_get(&self.state.arena, self.state.global_env, sym, &ctx) {
            Some(Value::Integer(ms)) if ms >= 0 => ms as u64,
            _ => DEFAULT_IDLE_MS,
        }
    }

    /// Rebuilds `state.gui`'s `{title, headline, contents}` from the
    /// current buffer. `footline` is left alone — it is the input
    /// pipeline's error/result channel and should only change in response
    /// to a key event, not on every frame.
    fn refresh_gui(&mut self) {
        let buffer_id = match self.state.current_buffer() {
            Ok(id) => id,
            Err(_) => return,
        };
        let buffer = self.state.buffers.get(buffer_id);
        let name = buffer
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "*scratch*".to_string());
        let (row, col) = buffer.row_col(buffer.point());
        let modified = if buffer.modified { "*" } else { "" };
        self.state.gui.headline =
            AnnotatedText::plain(format!("{name}{modified}  {}:{}", row + 1, col + 1).into_bytes());
        self.state.gui.contents = AnnotatedText::plain(buffer.contents());
        self.state.gui.reading = self.state.reading;
    }

    fn draw(&mut self) -> Result<()> {
        self.refresh_gui();
        self.backend.present(&self.state.gui)
    }

    /// The main loop named in spec §5 and §9: `draw → wait-for-event →
    /// handle-event → draw`, with no internal threads — a stalled
    /// `EventSource::poll` just stalls the editor, by design.
    pub fn run(&mut self) -> Result<()> {
        self.draw()?;
        while !self.state.should_quit {
            let idle_ms = self.idle_ms();
            match self.backend.poll(idle_ms)? {
                Some(event) => {
                    input::handle_event(&mut self.state, event)?;
                    self.draw()?;
                }
                None => continue,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::{GuiContext, InputEvent};
    use std::collections::VecDeque;

    /// A fake backend that feeds a scripted sequence of events and records
    /// every presented snapshot, so the loop can be exercised without a
    /// real terminal.
    struct FakeBackend {
        events: VecDeque<InputEvent>,
        frames: Vec<GuiContext>,
    }

    impl DisplaySink for FakeBackend {
        fn present(&mut self, ctx: &GuiContext) -> Result<()> {
            self.frames.push(ctx.clone());
            Ok(())
        }
    }

    impl EventSource for FakeBackend {
        fn poll(&mut self, _idle_ms: u64) -> Result<Option<InputEvent>> {
            Ok(self.events.pop_front())
        }
    }

    #[test]
    fn with_files_opens_a_scratch_buffer_when_given_none() {
        let backend = FakeBackend { events: VecDeque::new(), frames: Vec::new() };
        let editor = Editor::with_files(backend, &[]);
        assert_eq!(editor.state.buffers.len(), 2); // popup + scratch
    }

    #[test]
    fn run_drains_queued_events_then_returns_once_quit_is_requested() {
        let mut events = VecDeque::new();
        events.push_back(InputEvent::KeyDown("a".to_string()));
        events.push_back(InputEvent::KeyDown("b".to_string()));
        let backend = FakeBackend { events, frames: Vec::new() };
        let mut editor = Editor::with_files(backend, &[]);

        // Drive two events by hand, then request a quit so `run` returns.
        let idle_ms = editor.idle_ms();
        assert_eq!(idle_ms, DEFAULT_IDLE_MS);
        while let Some(event) = editor.backend.poll(idle_ms).unwrap() {
            input::handle_event(&mut editor.state, event).unwrap();
        }
        editor.quit();
        editor.run().unwrap();

        let buffer_id = editor.state.current_buffer().unwrap();
        assert_eq!(editor.state.buffers.get(buffer_id).contents(), b"ab\n");
    }

    #[test]
    fn refresh_gui_reflects_buffer_contents_in_the_snapshot() {
        let backend = FakeBackend { events: VecDeque::new(), frames: Vec::new() };
        let mut editor = Editor::with_files(backend, &[]);
        let buffer_id = editor.state.current_buffer().unwrap();
        editor.state.buffers.get_mut(buffer_id).insert(b"hi");
        editor.refresh_gui();
        assert_eq!(editor.state.gui.contents.bytes, b"hi\n");
        assert!(editor.state.gui.headline.bytes.starts_with(b"*scratch*"));
    }
}
