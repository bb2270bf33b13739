//! PostgreSQL rendering rules.

use super::{
    at_least, on_conflict_clause, DialectKind, Feature, JoinType, Modifier, MutationJoins,
    MutationLimits, SqlDialect, UpsertClause, Version,
};
use crate::error::SqlResult;

const V9_4: Version = Version::new(9, 4, 0);
const V9_5: Version = Version::new(9, 5, 0);
const V11: Version = Version::new(11, 0, 0);

#[derive(Debug, Clone, Default)]
pub struct PostgresDialect {
    version: Option<Version>,
}

impl PostgresDialect {
    pub fn new(version: Option<Version>) -> Self {
        Self { version }
    }
}

impl SqlDialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn format_boolean(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    fn supports_join_type(&self, _join: JoinType) -> bool {
        true
    }

    fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::CommonTableExpressions
            | Feature::WindowFunctions
            | Feature::Returning
            | Feature::NullsOrdering => true,
            Feature::JsonFunctions => at_least(self.version, V9_4),
            Feature::Upsert => at_least(self.version, V9_5),
            Feature::GroupsFrame => at_least(self.version, V11),
        }
    }

    fn mutation_joins(&self) -> MutationJoins {
        MutationJoins::FromUsing
    }

    fn mutation_limits(&self) -> MutationLimits {
        MutationLimits::RowIdSubquery { column: "ctid" }
    }

    fn insert_keyword(&self, modifier: Option<Modifier>) -> SqlResult<&'static str> {
        match modifier {
            None | Some(Modifier::Ignore) => Ok("INSERT INTO"),
            Some(Modifier::Replace) => Err(self.unsupported(
                "INSERT OR REPLACE",
                Some("use on_conflict(..).do_update(..)"),
            )),
        }
    }

    fn update_keyword(&self, modifier: Option<Modifier>) -> SqlResult<&'static str> {
        match modifier {
            None => Ok("UPDATE"),
            Some(Modifier::Ignore) => Err(self.unsupported("UPDATE OR IGNORE", None)),
            Some(Modifier::Replace) => Err(self.unsupported("UPDATE OR REPLACE", None)),
        }
    }

    fn ignore_as_conflict_nothing(&self) -> bool {
        true
    }

    fn build_upsert(&self, clause: &UpsertClause<'_>) -> SqlResult<String> {
        on_conflict_clause(self, clause)
    }

    fn build_json_extract(&self, column: &str, path: &[String]) -> String {
        format!("{column} #>> '{{{}}}'", path.join(","))
    }

    fn build_json_contains(&self, column: &str) -> String {
        format!("{column}::jsonb @> ?::jsonb")
    }

    fn build_json_length(&self, column: &str) -> String {
        format!("jsonb_array_length({column}::jsonb)")
    }

    fn build_ilike(&self, column: &str, pattern: &str, negated: bool) -> String {
        if negated {
            format!("{column} NOT ILIKE {pattern}")
        } else {
            format!("{column} ILIKE {pattern}")
        }
    }

    fn offset_only_limit(&self) -> Option<&'static str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{UpsertKind, UpsertSet, UpsertValue};

    #[test]
    fn quoting_and_booleans() {
        let d = PostgresDialect::default();
        assert_eq!(d.quote_identifier("public.users").unwrap(), r#""public"."users""#);
        assert_eq!(d.format_boolean(true), "TRUE");
    }

    #[test]
    fn on_conflict_do_update() {
        let d = PostgresDialect::default();
        let target = vec![r#""id""#.to_string()];
        let clause = UpsertClause {
            target: &target,
            fields: &target,
            kind: UpsertKind::DoUpdate(vec![UpsertSet {
                column: r#""name""#.into(),
                value: UpsertValue::Incoming,
            }]),
        };
        assert_eq!(
            d.build_upsert(&clause).unwrap(),
            r#"ON CONFLICT ("id") DO UPDATE SET "name" = EXCLUDED."name""#
        );
    }

    #[test]
    fn do_update_without_target_is_unsupported() {
        let d = PostgresDialect::default();
        let clause = UpsertClause {
            target: &[],
            fields: &[],
            kind: UpsertKind::DoUpdate(vec![UpsertSet {
                column: r#""name""#.into(),
                value: UpsertValue::Incoming,
            }]),
        };
        assert!(d.build_upsert(&clause).unwrap_err().is_unsupported());
    }

    #[test]
    fn json_functions() {
        let d = PostgresDialect::default();
        let path = vec!["address".to_string(), "city".to_string()];
        assert_eq!(
            d.build_json_extract(r#""data""#, &path),
            r#""data" #>> '{address,city}'"#
        );
        assert_eq!(d.build_json_contains(r#""tags""#), r#""tags"::jsonb @> ?::jsonb"#);
    }

    #[test]
    fn version_gates() {
        let d = PostgresDialect::new(Some(Version::new(9, 4, 0)));
        assert!(!d.supports(Feature::Upsert));
        assert!(d.supports(Feature::JsonFunctions));
        assert!(!d.supports(Feature::GroupsFrame));
    }
}
