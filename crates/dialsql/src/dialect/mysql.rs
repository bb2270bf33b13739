//! MySQL / MariaDB rendering rules.

use super::{
    at_least, dollar_path, join_assignments, DialectKind, Feature, JoinType, Modifier,
    MutationJoins, MutationLimits, SqlDialect, UpsertClause, UpsertKind, Version,
};
use crate::error::{SqlError, SqlResult};

const V5_7: Version = Version::new(5, 7, 0);
const V8_0: Version = Version::new(8, 0, 0);

#[derive(Debug, Clone, Default)]
pub struct MySqlDialect {
    version: Option<Version>,
}

impl MySqlDialect {
    pub fn new(version: Option<Version>) -> Self {
        Self { version }
    }
}

impl SqlDialect for MySqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn backslash_escapes(&self) -> bool {
        true
    }

    fn format_boolean(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn supports_join_type(&self, join: JoinType) -> bool {
        !matches!(join, JoinType::Full)
    }

    fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::CommonTableExpressions | Feature::WindowFunctions => {
                at_least(self.version, V8_0)
            }
            Feature::JsonFunctions => at_least(self.version, V5_7),
            Feature::Upsert => true,
            Feature::GroupsFrame | Feature::Returning | Feature::NullsOrdering => false,
        }
    }

    fn mutation_joins(&self) -> MutationJoins {
        MutationJoins::Inline
    }

    fn mutation_limits(&self) -> MutationLimits {
        MutationLimits::Native
    }

    fn insert_keyword(&self, modifier: Option<Modifier>) -> SqlResult<&'static str> {
        Ok(match modifier {
            None => "INSERT INTO",
            Some(Modifier::Ignore) => "INSERT IGNORE INTO",
            Some(Modifier::Replace) => "REPLACE INTO",
        })
    }

    fn update_keyword(&self, modifier: Option<Modifier>) -> SqlResult<&'static str> {
        match modifier {
            None => Ok("UPDATE"),
            Some(Modifier::Ignore) => Ok("UPDATE IGNORE"),
            Some(Modifier::Replace) => Err(self.unsupported("UPDATE with REPLACE", None)),
        }
    }

    fn build_upsert(&self, clause: &UpsertClause<'_>) -> SqlResult<String> {
        match &clause.kind {
            // MySQL has no DO NOTHING; assigning a key column to itself is a no-op update.
            UpsertKind::DoNothing => {
                let key = clause
                    .target
                    .first()
                    .or_else(|| clause.fields.first())
                    .ok_or_else(|| SqlError::invalid("Upsert requires at least one column"))?;
                Ok(format!("ON DUPLICATE KEY UPDATE {key} = {key}"))
            }
            UpsertKind::DoUpdate(sets) => {
                if sets.is_empty() {
                    return Err(SqlError::invalid("Upsert update requires at least one column"));
                }
                let assignments = join_assignments(sets, |c| format!("VALUES({c})"));
                Ok(format!("ON DUPLICATE KEY UPDATE {assignments}"))
            }
        }
    }

    fn build_json_extract(&self, column: &str, path: &[String]) -> String {
        format!("JSON_UNQUOTE(JSON_EXTRACT({column}, '{}'))", dollar_path(path))
    }

    fn build_json_contains(&self, column: &str) -> String {
        format!("JSON_CONTAINS({column}, ?)")
    }

    fn build_json_length(&self, column: &str) -> String {
        format!("JSON_LENGTH({column})")
    }

    fn offset_only_limit(&self) -> Option<&'static str> {
        Some("18446744073709551615")
    }
}
