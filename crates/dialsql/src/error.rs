//! Error types for dialsql

use crate::dialect::DialectKind;
use crate::validate::InjectionPattern;
use thiserror::Error;

/// Result type alias for dialsql operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Longest excerpt of a rejected value carried by [`SqlError::UnsafeValue`].
const EXCERPT_BYTES: usize = 48;

/// Error types for statement compilation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlError {
    /// The command state is malformed (missing table, arity mismatch, wildcard
    /// misuse, conflicting value sources, unbalanced brackets, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A validator rejected a value or raw expression.
    #[error("Unsafe value rejected ({pattern}): {excerpt:?}")]
    UnsafeValue {
        pattern: InjectionPattern,
        excerpt: String,
    },

    /// Placeholders and bindings disagree.
    #[error("Binding count mismatch: {placeholders} placeholder(s) for {bindings} binding(s)")]
    BindingCountMismatch { placeholders: usize, bindings: usize },

    /// The targeted engine or version lacks a capability.
    #[error(
        "{feature} is not supported by {dialect}{}{}",
        version_suffix(.version),
        hint_suffix(.hint)
    )]
    UnsupportedFeature {
        feature: String,
        dialect: DialectKind,
        version: Option<String>,
        hint: Option<String>,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn version_suffix(version: &Option<String>) -> String {
    version
        .as_deref()
        .map(|v| format!(" {v}"))
        .unwrap_or_default()
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_deref()
        .map(|h| format!(" (hint: {h})"))
        .unwrap_or_default()
}

impl SqlError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an unsafe value error, keeping only a short excerpt of the value
    pub fn unsafe_value(pattern: InjectionPattern, value: &str) -> Self {
        let excerpt = if value.len() > EXCERPT_BYTES {
            format!("{}...", truncate_bytes(value, EXCERPT_BYTES))
        } else {
            value.to_string()
        };
        Self::UnsafeValue { pattern, excerpt }
    }

    /// Create an unsupported feature error
    pub fn unsupported(
        feature: impl Into<String>,
        dialect: DialectKind,
        version: Option<String>,
        hint: Option<&str>,
    ) -> Self {
        Self::UnsupportedFeature {
            feature: feature.into(),
            dialect,
            version,
            hint: hint.map(str::to_string),
        }
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this is an unsafe value error
    pub fn is_unsafe_value(&self) -> bool {
        matches!(self, Self::UnsafeValue { .. })
    }

    /// Check if this is an unsupported feature error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedFeature { .. })
    }

    /// The pattern class that caused an [`SqlError::UnsafeValue`].
    pub fn unsafe_pattern(&self) -> Option<InjectionPattern> {
        match self {
            Self::UnsafeValue { pattern, .. } => Some(*pattern),
            _ => None,
        }
    }
}

/// Cut `s` to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message_includes_version_and_hint() {
        let err = SqlError::unsupported(
            "RETURNING",
            DialectKind::MySql,
            Some("8.0".to_string()),
            Some("issue a follow-up SELECT"),
        );
        assert_eq!(
            err.to_string(),
            "RETURNING is not supported by mysql 8.0 (hint: issue a follow-up SELECT)"
        );
    }

    #[test]
    fn unsupported_message_without_version() {
        let err = SqlError::unsupported("FULL OUTER JOIN", DialectKind::Sqlite, None, None);
        assert_eq!(err.to_string(), "FULL OUTER JOIN is not supported by sqlite");
    }

    #[test]
    fn unsafe_value_excerpt_is_truncated() {
        let long = "x".repeat(200);
        let err = SqlError::unsafe_value(InjectionPattern::Comment, &long);
        match err {
            SqlError::UnsafeValue { excerpt, .. } => {
                assert_eq!(excerpt.len(), EXCERPT_BYTES + 3);
                assert!(excerpt.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncate_respects_char_boundary() {
        assert_eq!(truncate_bytes("héllo", 2), "h");
        assert_eq!(truncate_bytes("abc", 10), "abc");
    }
}
