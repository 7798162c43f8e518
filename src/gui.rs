//! The display snapshot and the external interfaces a concrete frontend
//! implements against (spec §3, §6): `DisplaySink`, `EventSource`, and the
//! optional `SyntaxAnnotator` collaborator.

/// Where a property span's color/id comes from, per spec §6's
/// `id ∈ {DEFAULT, CURSOR, REGION, USER+n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanId {
    Default,
    Cursor,
    Region,
    User(u32),
}

/// An annotated byte range within one of the snapshot's strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySpan {
    pub offset: usize,
    pub length: usize,
    pub fg: [u8; 4],
    pub bg: [u8; 4],
    pub id: SpanId,
}

/// One annotated string: raw bytes plus an ordered list of property spans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotatedText {
    pub bytes: Vec<u8>,
    pub spans: Vec<PropertySpan>,
}

impl AnnotatedText {
    pub fn plain(bytes: Vec<u8>) -> Self {
        AnnotatedText { bytes, spans: Vec::new() }
    }
}

/// The per-frame display snapshot emitted by the core (spec §6).
#[derive(Debug, Clone, Default)]
pub struct GuiContext {
    pub title: Option<AnnotatedText>,
    pub headline: AnnotatedText,
    pub contents: AnnotatedText,
    pub footline: AnnotatedText,
    pub popup: Option<AnnotatedText>,
    /// Selects whether keystrokes target `contents` (false) or `popup`
    /// (true, prompt mode). Mirrors the `EnvContext::reading` flag that
    /// drives the `CURRENT-BUFFER` → `POPUP-BUFFER` redirect.
    pub reading: bool,
    pub default_fg: [u8; 4],
    pub default_bg: [u8; 4],
    /// Frontend hints set by the `CHANGE-FONT`/`CHANGE-WINDOW-*` builtins.
    /// The core only stores these; a `DisplaySink` decides whether and how
    /// to honor them.
    pub font: String,
    pub font_size: i64,
    pub window_cols: u32,
    pub window_rows: u32,
    pub window_mode: String,
    /// First visible row of `contents`, advanced by the `SCROLL-*` builtins.
    pub scroll_row: usize,
}

impl GuiContext {
    pub fn new() -> Self {
        GuiContext {
            default_fg: [0xff, 0xff, 0xff, 0xff],
            default_bg: [0x00, 0x00, 0x00, 0xff],
            font: "monospace".to_string(),
            font_size: 12,
            window_cols: 80,
            window_rows: 24,
            window_mode: "WINDOWED".to_string(),
            scroll_row: 0,
            ..Default::default()
        }
    }

    /// Sets the footline to a plain, unannotated message — the primary
    /// user-visible error channel (spec §7).
    pub fn set_footline(&mut self, message: impl Into<Vec<u8>>) {
        self.footline = AnnotatedText::plain(message.into());
    }
}

/// A keyboard/modifier event delivered by the backend (spec §6).
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    ModifierDown(crate::key::Modifier),
    ModifierUp(crate::key::Modifier),
}

/// Implemented by a concrete frontend to render a `GuiContext` snapshot.
pub trait DisplaySink {
    fn present(&mut self, ctx: &GuiContext) -> crate::error::Result<()>;
}

/// Implemented by a concrete frontend to deliver input events to the core.
/// `poll` blocks (cooperatively, per spec §5) until an event is available
/// or `idle_ms` elapses, in which case it returns `Ok(None)`.
pub trait EventSource {
    fn poll(&mut self, idle_ms: u64) -> crate::error::Result<Option<InputEvent>>;
}

/// A pluggable syntax highlighter (spec §6's "optional collaborator"):
/// given a buffer's bytes, returns spans to merge into the `contents`
/// frame before rendering. No other coupling to the core is permitted.
pub trait SyntaxAnnotator {
    fn annotate(&mut self, bytes: &[u8]) -> Vec<PropertySpan>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_sane_default_colors() {
        let ctx = GuiContext::new();
        assert_eq!(ctx.default_fg, [0xff, 0xff, 0xff, 0xff]);
        assert_eq!(ctx.default_bg, [0x00, 0x00, 0x00, 0xff]);
        assert!(!ctx.reading);
    }

    #[test]
    fn set_footline_replaces_prior_spans() {
        let mut ctx = GuiContext::new();
        ctx.footline.spans.push(PropertySpan {
            offset: 0,
            length: 1,
            fg: [0; 4],
            bg: [0; 4],
            id: SpanId::Default,
        });
        ctx.set_footline("Undefined keybinding!");
        assert_eq!(ctx.footline.bytes, b"Undefined keybinding!");
        assert!(ctx.footline.spans.is_empty());
    }
}
