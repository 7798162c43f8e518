//! Thin binary entry point. Positional arguments are files to open, exactly
//! as the original LITE's `main.c` treated `argv` — no flag parsing.

use lite::editor::Editor;
use lite::term::crossterm::CrosstermBackend;
use std::path::PathBuf;
use std::process;

fn main() {
    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();

    let mut backend = match CrosstermBackend::new() {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("lite: {}", e.message);
            process::exit(1);
        }
    };
    if let Err(e) = backend.init() {
        eprintln!("lite: {}", e.message);
        process::exit(1);
    }

    let mut editor = Editor::with_files(backend, &paths);
    let result = editor.run();

    if let Err(e) = result {
        eprintln!("lite: {}", e.message);
        process::exit(1);
    }
}
