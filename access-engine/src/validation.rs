//! Input validation helpers
//!
//! Text limits, name normalization and duplicate-name detection. All checks
//! run before anything is sent to the backend.

use crate::error::{EngineError, EngineResult};

// ── Text length limits ──────────────────────────────────────────────

/// Module, role and catalog names
pub const MAX_NAME_LEN: usize = 200;

/// Module routes and icon references
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(EngineError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> EngineResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(EngineError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

// ── Names ───────────────────────────────────────────────────────────

/// Comparison form of a name: trimmed, lowercased, inner whitespace collapsed
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fail with [`EngineError::Duplicate`] when `candidate` matches any existing name
pub fn ensure_unique_name<'a, I>(entity: &'static str, candidate: &str, existing: I) -> EngineResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = normalize_name(candidate);
    if existing.into_iter().any(|name| normalize_name(name) == wanted) {
        return Err(EngineError::Duplicate {
            entity,
            name: candidate.trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Sales   Manager "), "sales manager");
        assert_eq!(normalize_name("ADMIN"), "admin");
        assert_eq!(normalize_name("a\t\nb"), "a b");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_duplicate_ignores_case_and_spacing() {
        let existing = ["admin", "Sales Manager"];
        let err = ensure_unique_name("role", " Admin ", existing).unwrap_err();
        assert!(matches!(err, EngineError::Duplicate { entity: "role", ref name } if name == "Admin"));
        assert!(ensure_unique_name("role", "sales   MANAGER", existing).is_err());
        assert!(ensure_unique_name("role", "Auditor", existing).is_ok());
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Roles", "name", MAX_NAME_LEN).is_ok());
        assert!(matches!(
            validate_required_text("  ", "name", MAX_NAME_LEN),
            Err(EngineError::Validation(_))
        ));
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
        assert!(validate_optional_text(&Some("x".repeat(2049)), "url", MAX_URL_LEN).is_err());
        assert!(validate_optional_text(&None, "url", MAX_URL_LEN).is_ok());
    }
}
