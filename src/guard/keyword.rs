//! Keyword denylist rules.
//!
//! Operates on the trimmed, lower-cased query text. Matching is by plain
//! substring, so identifiers and string literals that merely contain a
//! denied word are rejected too.

use regex::Regex;
use std::sync::OnceLock;

use super::{GuardRejection, DISALLOWED_KEYWORDS};

/// A semicolon followed by more statement text.
fn second_statement() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r";\s*\w").expect("second statement pattern is valid"))
}

/// Applies the denylist and single-statement rules to normalized text.
pub(super) fn check(normalized: &str) -> Result<(), GuardRejection> {
    if let Some(keyword) = DISALLOWED_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| normalized.contains(keyword))
    {
        return Err(GuardRejection::DeniedKeyword(keyword));
    }

    if second_statement().is_match(normalized) {
        return Err(GuardRejection::MultipleStatements);
    }

    Ok(())
}
