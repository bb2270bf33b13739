//! Compiler configuration.
//!
//! ```toml
//! dialect = "mysql"
//! version = "8.0.32"
//! unsupported_clauses = "reject"
//! max_nesting_depth = 16
//! max_logged_sql_length = 500
//! ```

use crate::dialect::DialectKind;
use crate::error::{SqlError, SqlResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a clause or join the target engine cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedPolicy {
    /// Drop it and emit a `dialsql.compat` warning.
    #[default]
    Omit,
    /// Fail with `UnsupportedFeature`.
    Reject,
}

fn default_max_nesting_depth() -> usize {
    32
}

fn default_max_logged_sql_length() -> Option<usize> {
    Some(200)
}

/// Configuration for a [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    pub dialect: DialectKind,

    /// Engine version; unset enables every version-gated feature.
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub unsupported_clauses: UnsupportedPolicy,

    /// Deepest allowed subquery / CTE / UNION nesting.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,

    /// SQL longer than this is truncated in `dialsql.compile` events. `None` logs it whole.
    #[serde(default = "default_max_logged_sql_length")]
    pub max_logged_sql_length: Option<usize>,
}

impl CompilerConfig {
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            version: None,
            unsupported_clauses: UnsupportedPolicy::default(),
            max_nesting_depth: default_max_nesting_depth(),
            max_logged_sql_length: default_max_logged_sql_length(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_unsupported_policy(mut self, policy: UnsupportedPolicy) -> Self {
        self.unsupported_clauses = policy;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_max_logged_sql_length(mut self, len: usize) -> Self {
        self.max_logged_sql_length = Some(len);
        self
    }

    /// Log compiled SQL without truncation.
    pub fn no_sql_truncation(mut self) -> Self {
        self.max_logged_sql_length = None;
        self
    }

    pub fn from_toml_str(raw: &str) -> SqlResult<Self> {
        toml::from_str(raw)
            .map_err(|e| SqlError::Config(format!("failed to parse compiler config: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> SqlResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SqlError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            SqlError::Config(msg) => SqlError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_minimal_toml() {
        let config = CompilerConfig::from_toml_str(r#"dialect = "sqlite""#).unwrap();
        assert_eq!(config, CompilerConfig::new(DialectKind::Sqlite));
        assert_eq!(config.unsupported_clauses, UnsupportedPolicy::Omit);
        assert_eq!(config.max_nesting_depth, 32);
        assert_eq!(config.max_logged_sql_length, Some(200));
    }

    #[test]
    fn full_toml() {
        let config = CompilerConfig::from_toml_str(
            r#"
            dialect = "postgresql"
            version = "15.4"
            unsupported_clauses = "reject"
            max_nesting_depth = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect, DialectKind::Postgres);
        assert_eq!(config.version.as_deref(), Some("15.4"));
        assert_eq!(config.unsupported_clauses, UnsupportedPolicy::Reject);
        assert_eq!(config.max_nesting_depth, 8);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = CompilerConfig::from_toml_str("dialect = \"oracle\"").unwrap_err();
        assert!(matches!(err, SqlError::Config(_)));
        assert!(CompilerConfig::from_toml_str("version = \"8.0\"").is_err());
    }

    #[test]
    fn load_missing_file() {
        let err = CompilerConfig::load("/nonexistent/dialsql.toml").unwrap_err();
        assert!(matches!(err, SqlError::Config(_)));
    }

    #[test]
    fn builder_methods() {
        let config = CompilerConfig::new(DialectKind::MySql)
            .with_version("5.7")
            .with_unsupported_policy(UnsupportedPolicy::Reject)
            .no_sql_truncation();
        assert_eq!(config.version.as_deref(), Some("5.7"));
        assert_eq!(config.max_logged_sql_length, None);
    }
}
