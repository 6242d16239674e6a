//! Tool-name matchers, compiled once when a config snapshot is built.

use regex::Regex;
use tracing::warn;

/// Characters that make a matcher string a pattern rather than a literal.
const REGEX_METACHARACTERS: &[char] = &[
    '\\', '^', '$', '.', '|', '?', '*', '+', '(', ')', '[', ']', '{', '}',
];

/// A matcher's kind is decided here, at load time, never re-derived per
/// call. A string with no regex metacharacters is a [`Literal`]; one that
/// fails to compile falls back to a literal so a typo can never widen a
/// match.
///
/// [`Literal`]: CompiledMatcher::Literal
#[derive(Debug, Clone)]
pub enum CompiledMatcher {
    /// Matches when the tool name equals or starts with the string.
    Literal(String),
    /// Matches when the expression tests true against the tool name.
    Pattern(Regex),
}

impl CompiledMatcher {
    pub fn compile(raw: &str) -> Self {
        if raw.contains(REGEX_METACHARACTERS) {
            match Regex::new(raw) {
                Ok(pattern) => return CompiledMatcher::Pattern(pattern),
                Err(e) => {
                    warn!(matcher = raw, error = %e, "Invalid matcher pattern, treating as literal");
                }
            }
        }
        CompiledMatcher::Literal(raw.to_string())
    }

    pub fn matches(&self, tool_name: &str) -> bool {
        match self {
            CompiledMatcher::Literal(literal) => tool_name.starts_with(literal.as_str()),
            CompiledMatcher::Pattern(pattern) => pattern.is_match(tool_name),
        }
    }
}
