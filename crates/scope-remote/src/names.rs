//! Remote alias validation.
//!
//! An alias doubles as the origin segment of identifiers fetched through it
//! (`alias/namespace/name`), so it follows the identifier segment rules:
//! non-empty, no `/`, no whitespace, no `@`, `:` or glob characters, no `..`
//! and no leading `.`.

use crate::error::{RemoteError, RemoteResult};

const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '/', '@', ':', '?', '*', '[', '\\'];

/// Validate a remote alias.
///
/// ```
/// use scope_remote::names::validate_alias;
///
/// assert!(validate_alias("origin").is_ok());
/// assert!(validate_alias("team.shared").is_ok());
/// assert!(validate_alias("").is_err());
/// assert!(validate_alias("a/b").is_err());
/// ```
pub fn validate_alias(alias: &str) -> RemoteResult<()> {
    let invalid = |reason: String| RemoteError::InvalidAlias {
        alias: alias.to_string(),
        reason,
    };
    if alias.is_empty() {
        return Err(invalid("alias must not be empty".into()));
    }
    if let Some(ch) = alias.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    if alias.contains("..") {
        return Err(invalid("must not contain '..'".into()));
    }
    if alias.starts_with('.') {
        return Err(invalid("must not start with '.'".into()));
    }
    Ok(())
}
