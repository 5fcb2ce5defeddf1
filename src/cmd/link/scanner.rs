use {
    indexmap::IndexSet,
    once_cell::sync::Lazy,
    regex::{Captures, Regex},
    std::ops::Range,
};

/// Matches a `require` call with a literal dotted module name, either
/// parenthesized (`require( "a.b" )`) or bare (`require "a.b"`). Computed
/// names such as `require(name)` or `require("a" .. b)` never match.
static RE_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"require\s*(?:\(\s*['"]([\w.]+)['"]\s*\)|['"]([\w.]+)['"])"#)
        .expect("require pattern is valid")
});

/// A single `require` call found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireCall<'a> {
    /// Byte range of the whole call, including `require` and any parentheses.
    pub span: Range<usize>,

    /// The dotted module reference, e.g. `ui.button`.
    pub reference: &'a str,
}

impl<'a> RequireCall<'a> {
    fn from_captures(caps: &Captures<'a>) -> Option<Self> {
        let reference = caps.get(1).or_else(|| caps.get(2))?;
        Some(Self {
            span: caps.get(0)?.range(),
            reference: reference.as_str(),
        })
    }
}

/// All `require` calls in `code`, in source order.
///
/// The scan is purely textual: calls inside comments and string literals are
/// reported too.
pub fn require_calls(code: &str) -> impl Iterator<Item = RequireCall<'_>> {
    RE_REQUIRE
        .captures_iter(code)
        .filter_map(|caps| RequireCall::from_captures(&caps))
}

/// Distinct module references required by `code`, in order of first
/// appearance.
pub fn find_required_modules(code: &str) -> IndexSet<String> {
    require_calls(code)
        .map(|call| call.reference.to_string())
        .collect()
}
