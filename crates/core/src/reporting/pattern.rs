//! Cost code pattern translation.
//!
//! Users write patterns such as `5.100.*` or `*.10.*`: a dot is a literal
//! dot and `*` stands for any sequence of characters. A pattern starting
//! with a single quote is taken literally after the quote is stripped.
//!
//! Examples:
//! - `5.100.*` matches `5.100.200` but not `5.1000.200`
//! - `*.10.*` matches `5.10.200` and `999.10.1`
//! - `'5.1*` matches only `5.1*`

use regex::Regex;
use tracing::warn;

/// Prefix marking a pattern as literal.
const LITERAL_PREFIX: char = '\'';

/// A translated cost code pattern, ready for matching whole codes.
#[derive(Debug, Clone)]
pub enum CodePattern {
    /// Exact comparison against the code.
    Literal(String),
    /// Wildcard pattern compiled to an anchored regular expression.
    Wildcard(Regex),
}

impl CodePattern {
    /// Translates an optional user pattern. Absence propagates.
    #[must_use]
    pub fn translate(pattern: Option<&str>) -> Option<Self> {
        pattern.map(Self::parse)
    }

    /// Translates a user pattern. Never fails: every input yields a matcher.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        if let Some(literal) = pattern.strip_prefix(LITERAL_PREFIX) {
            return Self::Literal(literal.to_string());
        }

        let source = wildcard_to_regex(pattern);
        match Regex::new(&source) {
            Ok(regex) => Self::Wildcard(regex),
            Err(err) => {
                // Only reachable when the compiled program exceeds the regex size limit.
                warn!(pattern, error = %err, "Wildcard pattern too large, matching literally");
                Self::Literal(pattern.to_string())
            }
        }
    }

    /// Returns true if the whole code matches this pattern.
    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == code,
            Self::Wildcard(regex) => regex.is_match(code),
        }
    }
}

/// Rewrites a wildcard pattern into an anchored regular expression.
///
/// Every character except `*` is escaped, so the result always compiles.
#[must_use]
pub fn wildcard_to_regex(pattern: &str) -> String {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("(?s)^(?:{body})$")
}
