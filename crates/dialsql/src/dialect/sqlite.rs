//! SQLite rendering rules.

use super::{
    at_least, dollar_path, on_conflict_clause, DialectKind, Feature, JoinType, Modifier,
    MutationJoins, MutationLimits, SqlDialect, UpsertClause, Version,
};
use crate::error::SqlResult;

const V3_8_3: Version = Version::new(3, 8, 3);
const V3_9: Version = Version::new(3, 9, 0);
const V3_24: Version = Version::new(3, 24, 0);
const V3_25: Version = Version::new(3, 25, 0);
const V3_28: Version = Version::new(3, 28, 0);
const V3_30: Version = Version::new(3, 30, 0);
const V3_35: Version = Version::new(3, 35, 0);
const V3_39: Version = Version::new(3, 39, 0);

#[derive(Debug, Clone, Default)]
pub struct SqliteDialect {
    version: Option<Version>,
}

impl SqliteDialect {
    pub fn new(version: Option<Version>) -> Self {
        Self { version }
    }
}

impl SqlDialect for SqliteDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn format_boolean(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn supports_join_type(&self, join: JoinType) -> bool {
        match join {
            JoinType::Full => false,
            JoinType::Right => at_least(self.version, V3_39),
            JoinType::Inner | JoinType::Left | JoinType::Cross => true,
        }
    }

    fn supports(&self, feature: Feature) -> bool {
        let min = match feature {
            Feature::CommonTableExpressions => V3_8_3,
            Feature::JsonFunctions => V3_9,
            Feature::Upsert => V3_24,
            Feature::WindowFunctions => V3_25,
            Feature::GroupsFrame => V3_28,
            Feature::NullsOrdering => V3_30,
            Feature::Returning => V3_35,
        };
        at_least(self.version, min)
    }

    fn mutation_joins(&self) -> MutationJoins {
        MutationJoins::Unsupported
    }

    fn mutation_limits(&self) -> MutationLimits {
        MutationLimits::Unsupported
    }

    fn insert_keyword(&self, modifier: Option<Modifier>) -> SqlResult<&'static str> {
        Ok(match modifier {
            None => "INSERT INTO",
            Some(Modifier::Ignore) => "INSERT OR IGNORE INTO",
            Some(Modifier::Replace) => "INSERT OR REPLACE INTO",
        })
    }

    fn update_keyword(&self, modifier: Option<Modifier>) -> SqlResult<&'static str> {
        Ok(match modifier {
            None => "UPDATE",
            Some(Modifier::Ignore) => "UPDATE OR IGNORE",
            Some(Modifier::Replace) => "UPDATE OR REPLACE",
        })
    }

    fn build_upsert(&self, clause: &UpsertClause<'_>) -> SqlResult<String> {
        on_conflict_clause(self, clause)
    }

    fn build_json_extract(&self, column: &str, path: &[String]) -> String {
        format!("json_extract({column}, '{}')", dollar_path(path))
    }

    fn build_json_contains(&self, column: &str) -> String {
        format!("EXISTS (SELECT 1 FROM json_each({column}) WHERE json_each.value = ?)")
    }

    fn build_json_length(&self, column: &str) -> String {
        format!("json_array_length({column})")
    }

    fn offset_only_limit(&self) -> Option<&'static str> {
        Some("-1")
    }

    fn parenthesize_union_arms(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins() {
        let d = SqliteDialect::default();
        assert!(!d.supports_join_type(JoinType::Full));
        assert!(d.supports_join_type(JoinType::Right));
        let old = SqliteDialect::new(Some(Version::new(3, 31, 1)));
        assert!(!old.supports_join_type(JoinType::Right));
        assert!(old.supports_join_type(JoinType::Left));
    }

    #[test]
    fn version_gates() {
        let d = SqliteDialect::new(Some(Version::new(3, 24, 0)));
        assert!(d.supports(Feature::Upsert));
        assert!(!d.supports(Feature::WindowFunctions));
        assert!(!d.supports(Feature::Returning));
        assert!(d.supports(Feature::CommonTableExpressions));
        let unversioned = SqliteDialect::default();
        assert!(unversioned.supports(Feature::Returning));
    }

    #[test]
    fn modifiers() {
        let d = SqliteDialect::default();
        assert_eq!(
            d.insert_keyword(Some(Modifier::Replace)).unwrap(),
            "INSERT OR REPLACE INTO"
        );
        assert_eq!(d.update_keyword(Some(Modifier::Ignore)).unwrap(), "UPDATE OR IGNORE");
    }

    #[test]
    fn json_functions() {
        let d = SqliteDialect::default();
        assert_eq!(
            d.build_json_extract(r#""data""#, &["a".to_string()]),
            r#"json_extract("data", '$.a')"#
        );
        assert_eq!(d.build_json_length(r#""tags""#), r#"json_array_length("tags")"#);
    }
}
