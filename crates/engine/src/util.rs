//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidInput(format!("invalid {label} id")))
}

/// Trim a required name and reject empty values.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Accent- and case-insensitive search key (`"Feirão"` → `"feirao"`).
pub(crate) fn search_key(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Canonical email used as login name.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email: String = value.trim().nfc().collect::<String>().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(EngineError::InvalidInput(format!("invalid email: {email}")));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_key_folds_accents_and_case() {
        assert_eq!(search_key("  Feirão de Sábado "), "feirao de sabado");
        assert_eq!(search_key("MERCADO"), "mercado");
    }

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(normalize_required_name("  Leite ", "name").unwrap(), "Leite");
        assert!(normalize_required_name("   ", "name").is_err());
    }

    #[test]
    fn email_is_lowercased_and_checked() {
        assert_eq!(normalize_email(" Ana@Example.com ").unwrap(), "ana@example.com");
        assert!(normalize_email("ana").is_err());
        assert!(normalize_email("@example.com").is_err());
    }
}
