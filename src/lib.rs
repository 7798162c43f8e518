//! LITE: a text editor scriptable in an embedded Lisp dialect.
//!
//! The core (`value`, `eval`, `env`, `gc`, `buffer`, `input`, `editor`) has
//! no dependency on any concrete terminal or GUI toolkit — it talks to the
//! outside world only through the `DisplaySink`/`EventSource` traits in
//! `gui`. `term::crossterm` is the one frontend shipped here.

pub mod buffer;
pub mod builtins;
pub mod editor;
pub mod env;
pub mod error;
pub mod eval;
pub mod file_io;
pub mod gc;
pub mod gui;
pub mod input;
pub mod key;
pub mod parser;
pub mod rope;
pub mod state;
pub mod symbol;
pub mod term;
pub mod value;

#[cfg(feature = "syntax")]
pub mod syntax;
