//! Optional syntax-annotation collaborator (spec §6), behind the `syntax`
//! Cargo feature: a `tree-sitter` grammar loader plus a `SyntaxAnnotator`
//! that turns a buffer's bytes into `PropertySpan`s the core merges into
//! the `contents` frame before rendering.

use crate::error::{ErrorKind, LiteError, Result};
use crate::gui::{PropertySpan, SpanId, SyntaxAnnotator};
use libloading::Library;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser, Query, QueryCursor};

/// A loaded grammar. `library` keeps a dynamically loaded `.so`/`.dylib`
/// alive for as long as the `Language` derived from it is in use; bundled
/// grammars (linked directly into this binary) carry `None`.
pub struct LoadedLanguage {
    pub language: Language,
    pub library: Option<Arc<Library>>,
    pub name: String,
}

impl LoadedLanguage {
    fn bundled(language: Language, name: &str) -> Self {
        LoadedLanguage { language, library: None, name: name.to_string() }
    }
}

/// Resolves a file extension to a grammar and loads it, preferring the
/// grammars bundled at build time (spec's four: rust/c/python/javascript)
/// over a dynamically loaded one from `grammar_dir`.
pub struct LanguageLoader {
    grammar_dir: PathBuf,
}

impl LanguageLoader {
    pub fn new(grammar_dir: PathBuf) -> Self {
        LanguageLoader { grammar_dir }
    }

    pub fn load_language_for_file(&self, path: &Path) -> Result<LoadedLanguage> {
        let extension = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            LiteError::new(ErrorKind::Generic, "NO_EXTENSION", "file has no extension")
        })?;
        let lang_name = match extension {
            "rs" => "rust",
            "c" => "c",
            "py" => "python",
            "js" => "javascript",
            other => {
                return Err(LiteError::new(
                    ErrorKind::Generic,
                    "UNKNOWN_EXTENSION",
                    format!("unknown extension: {other}"),
                ))
            }
        };
        self.load_language(lang_name)
    }

    pub fn load_language(&self, lang_name: &str) -> Result<LoadedLanguage> {
        match lang_name {
            "rust" => Ok(LoadedLanguage::bundled(tree_sitter_rust::LANGUAGE.into(), "rust")),
            "c" => Ok(LoadedLanguage::bundled(tree_sitter_c::LANGUAGE.into(), "c")),
            "python" => Ok(LoadedLanguage::bundled(tree_sitter_python::LANGUAGE.into(), "python")),
            "javascript" => {
                Ok(LoadedLanguage::bundled(tree_sitter_javascript::LANGUAGE.into(), "javascript"))
            }
            _ => self.load_language_dynamic(lang_name),
        }
    }

    /// Dynamic loading of a grammar shared library from `grammar_dir`.
    /// Not yet implemented — opening the library and resolving its
    /// `tree_sitter_{name}` entry point needs a `Language` construction
    /// path this crate doesn't pin down yet, so an unbundled language is
    /// reported as not found rather than guessed at.
    fn load_language_dynamic(&self, lang_name: &str) -> Result<LoadedLanguage> {
        let _ = &self.grammar_dir;
        Err(LiteError::new(
            ErrorKind::Todo,
            "LANGUAGE_NOT_FOUND",
            format!("language {lang_name} is not bundled and dynamic grammar loading is not implemented"),
        ))
    }

    pub fn load_highlights_query(&self, lang_name: &str) -> Result<String> {
        match lang_name {
            "rust" => Ok(tree_sitter_rust::HIGHLIGHTS_QUERY.to_string()),
            "javascript" => Ok(tree_sitter_javascript::HIGHLIGHT_QUERY.to_string()),
            _ => {
                let filename = format!("{lang_name}.scm");
                let path = self.grammar_dir.join("queries").join(&filename);
                std::fs::read_to_string(&path).map_err(|e| {
                    LiteError::new(
                        ErrorKind::Generic,
                        "QUERY_NOT_FOUND",
                        format!("no highlights query for {lang_name}: {e}"),
                    )
                })
            }
        }
    }
}

/// Maps a tree-sitter capture name to a foreground color. Unrecognized
/// captures fall back to plain text (the default colors `DisplaySink`
/// already uses between spans).
fn capture_color(name: &str) -> [u8; 4] {
    match name {
        "keyword" | "keyword.control" => [0xc6, 0x78, 0xdd, 0xff],
        "string" => [0x98, 0xc3, 0x79, 0xff],
        "comment" => [0x5c, 0x63, 0x70, 0xff],
        "function" | "function.method" => [0x61, 0xaf, 0xef, 0xff],
        "type" | "type.builtin" => [0xe5, 0xc0, 0x7b, 0xff],
        "number" | "constant" | "constant.builtin" => [0xd1, 0x9a, 0x66, 0xff],
        "variable" | "variable.parameter" => [0xab, 0xb2, 0xbf, 0xff],
        "operator" | "punctuation" | "punctuation.bracket" | "punctuation.delimiter" => {
            [0x56, 0xb6, 0xc2, 0xff]
        }
        _ => [0xff, 0xff, 0xff, 0xff],
    }
}

/// Parses a buffer from scratch on every call and runs the language's
/// highlights query over the whole tree. `LanguageLoader`'s grammar
/// selection governs what this annotates; no incremental reparse — spec
/// §6 only asks for a `SyntaxAnnotator` collaborator, not an editing-aware
/// parse cache.
pub struct TreeSitterAnnotator {
    parser: Parser,
    query: Option<Query>,
}

impl TreeSitterAnnotator {
    pub fn new(loaded: LoadedLanguage, highlights_source: Option<String>) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&loaded.language).map_err(|e| {
            LiteError::new(ErrorKind::Generic, "LANGUAGE_ERROR", e.to_string())
        })?;
        let query = match highlights_source {
            Some(source) => Some(
                Query::new(&loaded.language, &source)
                    .map_err(|e| LiteError::new(ErrorKind::Generic, "QUERY_ERROR", e.to_string()))?,
            ),
            None => None,
        };
        Ok(TreeSitterAnnotator { parser, query })
    }
}

impl SyntaxAnnotator for TreeSitterAnnotator {
    fn annotate(&mut self, bytes: &[u8]) -> Vec<PropertySpan> {
        let Some(tree) = self.parser.parse(bytes, None) else {
            return Vec::new();
        };
        let Some(query) = &self.query else {
            return Vec::new();
        };
        let mut cursor = QueryCursor::new();
        let mut spans = Vec::new();
        let mut matches = cursor.matches(query, tree.root_node(), bytes);
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let range = capture.node.byte_range();
                let name = query.capture_names()[capture.index as usize];
                let fg = capture_color(name);
                spans.push(PropertySpan {
                    offset: range.start,
                    length: range.end - range.start,
                    fg,
                    bg: [0x00, 0x00, 0x00, 0x00],
                    id: SpanId::Default,
                });
            }
        }
        spans
    }
}
