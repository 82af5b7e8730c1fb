//! Branch name validation following git-style conventions.
//!
//! Valid branch names:
//! - Must be non-empty and must not be `@`
//! - Must not contain whitespace, control characters, `~`, `^`, `:`, `?`,
//!   `*`, `[`, `\`
//! - Must not contain `..` (double dot) or `@{`
//! - Must not start or end with `/`, or end with `.`
//! - Components between slashes must be non-empty, must not start with `.`,
//!   and must not end with `.lock`

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a branch name.
const FORBIDDEN_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

fn invalid(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidBranchName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a branch name, returning `Ok(())` if valid.
///
/// Branch names become paths under `refs/heads/`, so anything that could
/// escape that directory or collide with lock files is refused.
///
/// # Examples
///
/// ```
/// use gitcas_refs::names::validate_branch_name;
///
/// assert!(validate_branch_name("master").is_ok());
/// assert!(validate_branch_name("feature/auth").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "branch name must not be empty"));
    }
    if name == "@" {
        return Err(invalid(name, "'@' is reserved"));
    }
    if let Some(ch) = name
        .chars()
        .find(|ch| ch.is_control() || FORBIDDEN_CHARS.contains(ch))
    {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }
    if name.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }
    if name.contains("@{") {
        return Err(invalid(name, "must not contain '@{'"));
    }
    if name.ends_with('.') {
        return Err(invalid(name, "must not end with '.'"));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid(name, "must not start or end with '/'"));
    }

    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(invalid(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
        if component.ends_with(".lock") {
            return Err(invalid(
                name,
                format!("component must not end with '.lock': {component:?}"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_simple_names() {
        assert!(validate_branch_name("master").is_ok());
        assert!(validate_branch_name("develop").is_ok());
        assert!(validate_branch_name("my-branch").is_ok());
        assert!(validate_branch_name("v1.0").is_ok());
    }

    #[test]
    fn valid_nested_names() {
        assert!(validate_branch_name("feature/auth").is_ok());
        assert!(validate_branch_name("feature/deep/nested/branch").is_ok());
        assert!(validate_branch_name("user/alice/fix-123").is_ok());
    }

    #[test]
    fn reject_empty_and_at() {
        assert!(validate_branch_name("").is_err());
        assert!(validate_branch_name("@").is_err());
    }

    #[test]
    fn reject_double_dot() {
        assert!(validate_branch_name("bad..name").is_err());
        assert!(validate_branch_name("../escape").is_err());
    }

    #[test]
    fn reject_whitespace_and_control() {
        assert!(validate_branch_name("has space").is_err());
        assert!(validate_branch_name("has\ttab").is_err());
        assert!(validate_branch_name("has\nnewline").is_err());
        assert!(validate_branch_name("del\x7f").is_err());
    }

    #[test]
    fn reject_forbidden_chars() {
        for name in ["a~b", "a^b", "a:b", "a?b", "a*b", "a[b", "a\\b"] {
            assert!(validate_branch_name(name).is_err(), "{name:?}");
        }
    }

    #[test]
    fn reject_dot_boundaries() {
        assert!(validate_branch_name(".hidden").is_err());
        assert!(validate_branch_name("trailing.").is_err());
        assert!(validate_branch_name("feature/.hidden").is_err());
    }

    #[test]
    fn reject_slash_boundaries() {
        assert!(validate_branch_name("/leading").is_err());
        assert!(validate_branch_name("trailing/").is_err());
        assert!(validate_branch_name("a//b").is_err());
    }

    #[test]
    fn reject_lock_suffix() {
        assert!(validate_branch_name("master.lock").is_err());
        assert!(validate_branch_name("wip.lock/child").is_err());
    }

    #[test]
    fn reject_at_brace() {
        assert!(validate_branch_name("ref@{0}").is_err());
    }

    #[test]
    fn error_carries_reason() {
        let err = validate_branch_name("a b").unwrap_err();
        assert!(err.to_string().contains("forbidden character"));
    }
}
