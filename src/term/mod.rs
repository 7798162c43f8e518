//! Terminal backend abstraction (spec §6): a concrete `DisplaySink` and
//! `EventSource` pair the core is otherwise entirely decoupled from. The
//! only implementation shipped is `crossterm`; anything else just needs to
//! implement the two traits in `crate::gui`.

pub mod crossterm;
