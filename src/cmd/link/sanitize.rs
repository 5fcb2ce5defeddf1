//! Comment and whitespace stripping for Lua source.
//!
//! The source is first split into code, string literal and comment spans by a
//! small lexical scan. Comments are dropped, whitespace in code spans is
//! compacted, and literals are copied through untouched, so nothing inside a
//! string can be mistaken for a comment or lose its spacing.

use std::mem;

/// A span of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Span<'a> {
    Code(&'a str),
    Literal(&'a str),
    Comment,
}

/// Produce a compact, single-line rendering of `code`.
///
/// - comments (`-- ...`, `--[[ ... ]]`, `--[==[ ... ]==]`) are removed;
/// - whitespace next to a symbol is removed, other whitespace runs (line
///   breaks included) collapse to a single space;
/// - string literals (`'...'`, `"..."`, `[[...]]`, `[==[...]==]`) are kept
///   verbatim.
///
/// Whitespace is kept where dropping it would fuse two tokens into another
/// one (`- -`, `[ [`, `.. ...`, `0xff ..`). A name or number followed by a
/// dot keeps its space even when joining would be harmless.
///
/// Known edge case: line breaks are not preserved. Lua does not need
/// statement terminators, so joining lines is safe for ordinary code, but
/// source that relies on a line break to separate two expressions may be
/// read differently once joined.
pub fn sanitize(code: &str) -> String {
    let mut out = Compactor::with_capacity(code.len());
    for span in spans(code) {
        match span {
            Span::Comment => out.whitespace(),
            Span::Literal(text) => out.push(text, false),
            Span::Code(text) => {
                let mut buf = [0; 4];
                for c in text.chars() {
                    if c.is_whitespace() {
                        out.whitespace();
                    } else {
                        out.push(c.encode_utf8(&mut buf), is_symbol(c));
                    }
                }
            }
        }
    }
    out.finish()
}

/// Anything that is not an identifier character, whitespace or an angle
/// bracket.
fn is_symbol(c: char) -> bool {
    !(c.is_alphanumeric() || c == '_' || c.is_whitespace() || c == '<' || c == '>')
}

/// Whether `a` directly followed by `b` would lex differently than `a b`.
fn fuses(a: char, b: char) -> bool {
    matches!((a, b), ('-', '-') | ('[', '[') | ('.', '.')) || (a.is_alphanumeric() && b == '.')
}

#[derive(Debug, Default)]
struct Compactor {
    out: String,
    pending_space: bool,
    /// Last emitted character, and whether it belongs to a symbol.
    last: Option<(char, bool)>,
}

impl Compactor {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            ..Self::default()
        }
    }

    fn whitespace(&mut self) {
        self.pending_space = true;
    }

    /// Emit `text` as one unit. Literals are emitted as non-symbols.
    fn push(&mut self, text: &str, symbolic: bool) {
        let (Some(first), Some(last)) = (text.chars().next(), text.chars().next_back()) else {
            return;
        };
        if mem::take(&mut self.pending_space) {
            if let Some((prev, prev_symbolic)) = self.last {
                if (!prev_symbolic && !symbolic) || fuses(prev, first) {
                    self.out.push(' ');
                }
            }
        }
        self.out.push_str(text);
        self.last = Some((last, symbolic));
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Split `src` into code, literal and comment spans.
fn spans(src: &str) -> Vec<Span<'_>> {
    let bytes = src.as_bytes();
    let mut spans = Vec::new();
    let mut code_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let token = match bytes[i] {
            b'\'' | b'"' => quoted_end(bytes, i).map(|end| (end, true)),
            b'[' => long_bracket_end(bytes, i).map(|end| (end, true)),
            b'-' if bytes.get(i + 1) == Some(&b'-') => Some((comment_end(bytes, i), false)),
            _ => None,
        };

        let Some((end, is_literal)) = token else {
            i += 1;
            continue;
        };
        if code_start < i {
            spans.push(Span::Code(&src[code_start..i]));
        }
        spans.push(if is_literal {
            Span::Literal(&src[i..end])
        } else {
            Span::Comment
        });
        i = end;
        code_start = end;
    }

    if code_start < bytes.len() {
        spans.push(Span::Code(&src[code_start..]));
    }
    spans
}

/// End (exclusive) of the quoted string starting at `start`.
///
/// Quoted strings end on the same line; an unterminated quote is not a
/// string.
fn quoted_end(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    loop {
        match *bytes.get(i)? {
            b'\\' => i += 2,
            b'\n' => return None,
            c if c == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
}

/// Level of the long bracket opening at `start` (`[[` is 0, `[==[` is 2).
fn long_bracket_level(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes.get(start) != Some(&b'[') {
        return None;
    }
    let level = bytes[start + 1..].iter().take_while(|&&b| b == b'=').count();
    (bytes.get(start + 1 + level) == Some(&b'[')).then_some(level)
}

/// End (exclusive) of the long bracket opening at `start`, if it is closed.
fn long_bracket_end(bytes: &[u8], start: usize) -> Option<usize> {
    let level = long_bracket_level(bytes, start)?;
    let close = format!("]{}]", "=".repeat(level)).into_bytes();
    let body = start + level + 2;
    bytes[body..]
        .windows(close.len())
        .position(|window| window == close.as_slice())
        .map(|pos| body + pos + close.len())
}

/// End (exclusive) of the comment starting at `start`.
///
/// Block comments are checked first; a line comment stops before the line
/// break. An unclosed block comment runs to the end of the text.
fn comment_end(bytes: &[u8], start: usize) -> usize {
    let body = start + 2;
    if long_bracket_level(bytes, body).is_some() {
        return long_bracket_end(bytes, body).unwrap_or(bytes.len());
    }
    bytes[body..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |pos| body + pos)
}
