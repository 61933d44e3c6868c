//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Canonical form of a username: trimmed and NFC-normalized, so that
/// visually identical names collide on the unique index.
pub(crate) fn normalize_username(value: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidInput(
            "username must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}

/// Trim optional free text; blank input becomes an empty string.
pub(crate) fn normalize_text(value: &str) -> String {
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed_and_composed() {
        // "e" + combining acute accent
        let decomposed = "  jose\u{0301} ";
        assert_eq!(normalize_username(decomposed).unwrap(), "jos\u{00e9}");
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(matches!(
            normalize_username("   "),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
