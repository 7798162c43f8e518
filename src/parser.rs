//! The s-expression reader (spec §4.4): a whitespace-and-comment-skipping
//! lexer feeding a recursive-descent parser for the Lisp surface syntax.

use crate::error::{LiteError, Result};
use crate::symbol::SymbolTable;
use crate::value::{Arena, Value};

/// Parses expressions out of `source` one at a time. Each call to `next`
/// advances past the parsed expression; `Ok(None)` means clean end-of-input.
pub struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Parser { bytes: source, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                    self.pos += 1;
                }
                Some(b';') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn is_delimiter(b: u8) -> bool {
        matches!(b, b'(' | b')' | b' ' | b'\t' | b'\n' | b'\r' | b'"')
    }

    /// Parses the next top-level expression. Returns `Ok(None)` at clean
    /// end-of-input (no more expressions, not mid-form).
    pub fn next(&mut self, arena: &mut Arena, symbols: &mut SymbolTable) -> Result<Option<Value>> {
        self.skip_whitespace_and_comments();
        if self.peek().is_none() {
            return Ok(None);
        }
        self.parse_expr(arena, symbols).map(Some)
    }

    fn parse_expr(&mut self, arena: &mut Arena, symbols: &mut SymbolTable) -> Result<Value> {
        self.skip_whitespace_and_comments();
        match self.peek() {
            None => Err(LiteError::syntax("unexpected end of input")),
            Some(b'(') => {
                self.advance();
                self.parse_list(arena, symbols)
            }
            Some(b')') => Err(LiteError::syntax("unexpected ')'")),
            Some(b'"') => self.parse_string(arena),
            Some(b'\'') => {
                self.advance();
                let inner = self.parse_expr(arena, symbols)?;
                Ok(wrap(arena, symbols, "QUOTE", inner))
            }
            Some(b'`') => {
                self.advance();
                let inner = self.parse_expr(arena, symbols)?;
                Ok(wrap(arena, symbols, "QUASIQUOTE", inner))
            }
            Some(b',') => {
                self.advance();
                if self.peek() == Some(b'@') {
                    self.advance();
                    let inner = self.parse_expr(arena, symbols)?;
                    Ok(wrap(arena, symbols, "UNQUOTE-SPLICING", inner))
                } else {
                    let inner = self.parse_expr(arena, symbols)?;
                    Ok(wrap(arena, symbols, "UNQUOTE", inner))
                }
            }
            Some(_) => self.parse_atom(arena, symbols),
        }
    }

    fn parse_list(&mut self, arena: &mut Arena, symbols: &mut SymbolTable) -> Result<Value> {
        let mut items = Vec::new();
        let mut tail = Value::Nil;
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => return Err(LiteError::syntax("unexpected end of input in list")),
                Some(b')') => {
                    self.advance();
                    break;
                }
                Some(b'.') if self.is_dot_token() => {
                    self.advance();
                    if items.is_empty() {
                        return Err(LiteError::syntax("'.' with no preceding element"));
                    }
                    tail = self.parse_expr(arena, symbols)?;
                    self.skip_whitespace_and_comments();
                    match self.advance() {
                        Some(b')') => break,
                        _ => return Err(LiteError::syntax("malformed dotted pair")),
                    }
                }
                Some(_) => items.push(self.parse_expr(arena, symbols)?),
            }
        }
        let mut result = tail;
        for item in items.into_iter().rev() {
            result = arena.cons(item, result);
        }
        Ok(result)
    }

    /// True if the `.` at the current position is a standalone dotted-pair
    /// marker rather than the start of a longer atom like `.5` or `foo.bar`.
    fn is_dot_token(&self) -> bool {
        match self.bytes.get(self.pos + 1) {
            None => true,
            Some(&b) => Self::is_delimiter(b),
        }
    }

    fn parse_string(&mut self, arena: &mut Arena) -> Result<Value> {
        self.advance(); // opening quote
        let start = self.pos;
        loop {
            match self.advance() {
                None => return Err(LiteError::syntax("unterminated string literal")),
                Some(b'"') => break,
                Some(_) => {}
            }
        }
        let bytes = self.bytes[start..self.pos - 1].to_vec();
        Ok(arena.make_string(bytes))
    }

    fn parse_atom(&mut self, arena: &mut Arena, symbols: &mut SymbolTable) -> Result<Value> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if Self::is_delimiter(b) || b == b';' || b == b'\'' {
                break;
            }
            self.pos += 1;
        }
        let token = &self.bytes[start..self.pos];
        if token.is_empty() {
            return Err(LiteError::syntax("empty atom"));
        }
        let text = String::from_utf8_lossy(token);
        if let Ok(n) = text.parse::<i64>() {
            let _ = arena; // Integer doesn't allocate; kept for symmetry with other branches.
            return Ok(Value::Integer(n));
        }
        if text.eq_ignore_ascii_case("NIL") {
            return Ok(Value::Nil);
        }
        let sym = symbols.intern(&text);
        Ok(Value::Symbol(sym))
    }
}

fn wrap(arena: &mut Arena, symbols: &mut SymbolTable, head: &str, inner: Value) -> Value {
    let sym = Value::Symbol(symbols.intern(head));
    let tail = arena.cons(inner, Value::Nil);
    arena.cons(sym, tail)
}

/// Parses every expression in `source`, collecting them into a `Vec`.
/// Used by `evaluate-string`/`evaluate-file`, which run a whole file's
/// worth of top-level forms.
pub fn parse_all(source: &[u8], arena: &mut Arena, symbols: &mut SymbolTable) -> Result<Vec<Value>> {
    let mut parser = Parser::new(source);
    let mut out = Vec::new();
    while let Some(expr) = parser.next(arena, symbols)? {
        out.push(expr);
    }
    Ok(out)
}
