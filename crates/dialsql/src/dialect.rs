//! Dialect capabilities and the `(dialect, version)` registry.
//!
//! Each engine implements [`SqlDialect`] once. Statement builders never branch
//! on the engine name; they ask the dialect for quoting, literal rendering,
//! upsert syntax, JSON functions and which clauses it can express.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::error::{SqlError, SqlResult};
use crate::ident::quote_identifier;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The closed set of supported engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl DialectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DialectKind::MySql => "mysql",
            DialectKind::Postgres => "postgres",
            DialectKind::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            "postgres" | "postgresql" | "pgsql" | "pg" => Ok(DialectKind::Postgres),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            other => Err(SqlError::invalid(format!("Unknown dialect: {other}"))),
        }
    }
}

/// An engine version such as `8.0.32` or `3.35`.
///
/// Parsing tolerates vendor suffixes (`8.0.32-log`, `16.2 (Debian)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn parse(s: &str) -> SqlResult<Self> {
        let numeric: String = s
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let mut parts = numeric.split('.').filter(|p| !p.is_empty());
        let major = match parts.next() {
            Some(p) => parse_component(p, s)?,
            None => return Err(SqlError::invalid(format!("Invalid version string: {s:?}"))),
        };
        let minor = parts.next().map(|p| parse_component(p, s)).transpose()?;
        let patch = parts.next().map(|p| parse_component(p, s)).transpose()?;
        Ok(Self::new(major, minor.unwrap_or(0), patch.unwrap_or(0)))
    }
}

fn parse_component(part: &str, whole: &str) -> SqlResult<u32> {
    part.parse()
        .map_err(|_| SqlError::invalid(format!("Invalid version string: {whole:?}")))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

/// `true` when no version is pinned or the pinned version is at least `min`.
pub(crate) fn at_least(version: Option<Version>, min: Version) -> bool {
    version.is_none_or(|v| v >= min)
}

/// Join kinds a command can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// Capabilities that are missing on some engines or versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    CommonTableExpressions,
    WindowFunctions,
    GroupsFrame,
    Upsert,
    Returning,
    JsonFunctions,
    NullsOrdering,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::CommonTableExpressions => "common table expressions",
            Feature::WindowFunctions => "window functions",
            Feature::GroupsFrame => "GROUPS window frames",
            Feature::Upsert => "upsert",
            Feature::Returning => "RETURNING",
            Feature::JsonFunctions => "JSON functions",
            Feature::NullsOrdering => "NULLS FIRST/LAST",
        }
    }

    fn hint(self, kind: DialectKind) -> Option<&'static str> {
        match (self, kind) {
            (Feature::Returning, DialectKind::MySql) => {
                Some("read generated keys from the driver or issue a follow-up SELECT")
            }
            (Feature::GroupsFrame, DialectKind::MySql) => Some("use a ROWS or RANGE frame"),
            (Feature::CommonTableExpressions, _) => Some("inline the CTE as a FROM subquery"),
            (Feature::Upsert, DialectKind::Sqlite) => Some("use or_replace() or or_ignore()"),
            _ => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// INSERT/UPDATE conflict modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// Skip rows that violate a constraint.
    Ignore,
    /// Replace the conflicting row.
    Replace,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Placement of NULLs in an ORDER BY item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nulls {
    First,
    Last,
}

/// How an engine expresses JOIN inside UPDATE/DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationJoins {
    /// `UPDATE t JOIN x ON .. SET ..` / `DELETE t FROM t JOIN x ON ..`
    Inline,
    /// `UPDATE t SET .. FROM x WHERE ..` / `DELETE FROM t USING x WHERE ..`
    FromUsing,
    Unsupported,
}

/// How an engine expresses ORDER BY/LIMIT inside UPDATE/DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationLimits {
    /// Trailing `ORDER BY .. LIMIT n` on single-table statements, no OFFSET.
    Native,
    /// `WHERE t.<column> IN (SELECT t.<column> .. ORDER BY .. LIMIT n OFFSET m)`
    RowIdSubquery { column: &'static str },
    Unsupported,
}

/// Right-hand side of one upsert assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertValue {
    /// The value the conflicting row tried to insert.
    Incoming,
    /// An already-resolved expression; any `?` it holds is bound in order.
    Expr(String),
}

/// One `column = value` pair of an upsert update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertSet {
    /// Quoted column name.
    pub column: String,
    pub value: UpsertValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertKind {
    DoNothing,
    DoUpdate(Vec<UpsertSet>),
}

/// Everything a dialect needs to render the conflict clause of an INSERT.
///
/// Column names are already quoted for the dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertClause<'a> {
    pub target: &'a [String],
    pub fields: &'a [String],
    pub kind: UpsertKind,
}

/// Per-engine rendering rules.
pub trait SqlDialect: fmt::Debug + Send + Sync {
    fn kind(&self) -> DialectKind;

    fn version(&self) -> Option<Version>;

    /// Character that opens and closes a quoted identifier.
    fn quote_char(&self) -> char;

    /// Parse `name` as a (possibly dotted) identifier and quote each part.
    fn quote_identifier(&self, name: &str) -> SqlResult<String> {
        quote_identifier(name, self.quote_char())
    }

    /// Whether `\` escapes the next character inside a `'...'` literal.
    fn backslash_escapes(&self) -> bool {
        false
    }

    fn format_boolean(&self, value: bool) -> &'static str;

    fn supports_join_type(&self, join: JoinType) -> bool;

    fn supports(&self, feature: Feature) -> bool;

    /// Fail with `UnsupportedFeature` unless `feature` is available.
    fn require(&self, feature: Feature) -> SqlResult<()> {
        if self.supports(feature) {
            return Ok(());
        }
        Err(SqlError::unsupported(
            feature.name(),
            self.kind(),
            self.version().map(|v| v.to_string()),
            feature.hint(self.kind()),
        ))
    }

    /// Build an `UnsupportedFeature` error for a capability outside [`Feature`].
    fn unsupported(&self, feature: &str, hint: Option<&str>) -> SqlError {
        SqlError::unsupported(
            feature,
            self.kind(),
            self.version().map(|v| v.to_string()),
            hint,
        )
    }

    fn mutation_joins(&self) -> MutationJoins;

    fn mutation_limits(&self) -> MutationLimits;

    /// Statement head for INSERT, e.g. `INSERT IGNORE INTO`.
    fn insert_keyword(&self, modifier: Option<Modifier>) -> SqlResult<&'static str>;

    /// Statement head for UPDATE, e.g. `UPDATE OR IGNORE`.
    fn update_keyword(&self, modifier: Option<Modifier>) -> SqlResult<&'static str>;

    /// Whether `INSERT .. or_ignore()` is expressed as `ON CONFLICT DO NOTHING`.
    fn ignore_as_conflict_nothing(&self) -> bool {
        false
    }

    /// Render the conflict clause. Assignments are emitted in the order given.
    fn build_upsert(&self, clause: &UpsertClause<'_>) -> SqlResult<String>;

    /// Extract the text value at `path` (already validated segments) from a JSON column.
    fn build_json_extract(&self, column: &str, path: &[String]) -> String;

    /// JSON containment test with a single `?` for the probe value.
    fn build_json_contains(&self, column: &str) -> String;

    /// Number of elements of a JSON array column.
    fn build_json_length(&self, column: &str) -> String;

    /// Case-insensitive LIKE of `column` against `pattern`, both rendered SQL.
    fn build_ilike(&self, column: &str, pattern: &str, negated: bool) -> String {
        let not = if negated { "NOT " } else { "" };
        format!("LOWER({column}) {not}LIKE LOWER({pattern})")
    }

    /// LIMIT spelling when only an OFFSET is requested.
    fn offset_only_limit(&self) -> Option<&'static str>;

    fn build_limit(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (None, None) => None,
            (Some(l), None) => Some(format!("LIMIT {l}")),
            (Some(l), Some(o)) => Some(format!("LIMIT {l} OFFSET {o}")),
            (None, Some(o)) => Some(match self.offset_only_limit() {
                Some(all) => format!("LIMIT {all} OFFSET {o}"),
                None => format!("OFFSET {o}"),
            }),
        }
    }

    /// Render one ORDER BY item, emulating NULLS FIRST/LAST where needed.
    fn build_order_item(&self, expr: &str, direction: Direction, nulls: Option<Nulls>) -> String {
        let dir = direction.keyword();
        match nulls {
            None => format!("{expr} {dir}"),
            Some(n) if self.supports(Feature::NullsOrdering) => {
                let placement = match n {
                    Nulls::First => "FIRST",
                    Nulls::Last => "LAST",
                };
                format!("{expr} {dir} NULLS {placement}")
            }
            Some(Nulls::First) => format!("{expr} IS NULL DESC, {expr} {dir}"),
            Some(Nulls::Last) => format!("{expr} IS NULL ASC, {expr} {dir}"),
        }
    }

    /// Whether each arm of a UNION is wrapped in parentheses.
    fn parenthesize_union_arms(&self) -> bool {
        true
    }
}

/// Resolve the dialect implementation for `(kind, version)`.
///
/// Without a version every version-gated capability is enabled.
pub fn dialect_for(kind: DialectKind, version: Option<&str>) -> SqlResult<Box<dyn SqlDialect>> {
    let version = version.map(Version::parse).transpose()?;
    Ok(boxed_dialect(kind, version))
}

pub(crate) fn boxed_dialect(kind: DialectKind, version: Option<Version>) -> Box<dyn SqlDialect> {
    match kind {
        DialectKind::MySql => Box::new(MySqlDialect::new(version)),
        DialectKind::Postgres => Box::new(PostgresDialect::new(version)),
        DialectKind::Sqlite => Box::new(SqliteDialect::new(version)),
    }
}

/// Render the JSON path segments as a `$.a.b[0]` path string.
pub(crate) fn dollar_path(path: &[String]) -> String {
    let mut out = String::from("$");
    for segment in path {
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            out.push('.');
            out.push_str(segment);
        }
    }
    out
}

/// Render a MySQL/SQLite style upsert assignment list.
pub(crate) fn join_assignments(sets: &[UpsertSet], incoming: impl Fn(&str) -> String) -> String {
    sets.iter()
        .map(|s| match &s.value {
            UpsertValue::Incoming => format!("{} = {}", s.column, incoming(&s.column)),
            UpsertValue::Expr(sql) => format!("{} = {}", s.column, sql),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `ON CONFLICT` rendering shared by PostgreSQL and SQLite.
pub(crate) fn on_conflict_clause(dialect: &dyn SqlDialect, clause: &UpsertClause<'_>) -> SqlResult<String> {
    let target = if clause.target.is_empty() {
        String::new()
    } else {
        format!(" ({})", clause.target.join(", "))
    };
    match &clause.kind {
        UpsertKind::DoNothing => Ok(format!("ON CONFLICT{target} DO NOTHING")),
        UpsertKind::DoUpdate(sets) => {
            if clause.target.is_empty() {
                return Err(dialect.unsupported(
                    "ON CONFLICT DO UPDATE without a conflict target",
                    Some("call on_conflict(&[..]) with the unique columns"),
                ));
            }
            if sets.is_empty() {
                return Err(SqlError::invalid("Upsert update requires at least one column"));
            }
            let assignments = join_assignments(sets, |c| format!("EXCLUDED.{c}"));
            Ok(format!("ON CONFLICT{target} DO UPDATE SET {assignments}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_kind_from_str_aliases() {
        assert_eq!("MySQL".parse::<DialectKind>().unwrap(), DialectKind::MySql);
        assert_eq!("mariadb".parse::<DialectKind>().unwrap(), DialectKind::MySql);
        assert_eq!("postgresql".parse::<DialectKind>().unwrap(), DialectKind::Postgres);
        assert_eq!("sqlite3".parse::<DialectKind>().unwrap(), DialectKind::Sqlite);
        assert!("oracle".parse::<DialectKind>().is_err());
    }

    #[test]
    fn version_parse_and_order() {
        let v = Version::parse("8.0.32-log").unwrap();
        assert_eq!(v, Version::new(8, 0, 32));
        assert_eq!(Version::parse("16").unwrap(), Version::new(16, 0, 0));
        assert!(Version::parse("3.35").unwrap() > Version::parse("3.8.3").unwrap());
        assert!(Version::parse("abc").is_err());
        assert_eq!(Version::new(8, 0, 0).to_string(), "8.0");
        assert_eq!(Version::new(3, 8, 3).to_string(), "3.8.3");
    }

    #[test]
    fn at_least_unversioned_is_permissive() {
        assert!(at_least(None, Version::new(99, 0, 0)));
        assert!(!at_least(Some(Version::new(5, 7, 0)), Version::new(8, 0, 0)));
    }

    #[test]
    fn dollar_path_rendering() {
        let path = vec!["a".to_string(), "0".to_string(), "b".to_string()];
        assert_eq!(dollar_path(&path), "$.a[0].b");
    }

    #[test]
    fn limit_forms_per_dialect() {
        let my = dialect_for(DialectKind::MySql, None).unwrap();
        let pg = dialect_for(DialectKind::Postgres, None).unwrap();
        let lite = dialect_for(DialectKind::Sqlite, None).unwrap();

        assert_eq!(my.build_limit(Some(10), None).unwrap(), "LIMIT 10");
        assert_eq!(
            my.build_limit(None, Some(5)).unwrap(),
            "LIMIT 18446744073709551615 OFFSET 5"
        );
        assert_eq!(lite.build_limit(None, Some(5)).unwrap(), "LIMIT -1 OFFSET 5");
        assert_eq!(pg.build_limit(None, Some(5)).unwrap(), "OFFSET 5");
        assert_eq!(pg.build_limit(Some(1), Some(2)).unwrap(), "LIMIT 1 OFFSET 2");
        assert!(pg.build_limit(None, None).is_none());
    }

    #[test]
    fn nulls_ordering_emulated_on_mysql() {
        let my = dialect_for(DialectKind::MySql, None).unwrap();
        assert_eq!(
            my.build_order_item("`a`", Direction::Asc, Some(Nulls::Last)),
            "`a` IS NULL ASC, `a` ASC"
        );
        let pg = dialect_for(DialectKind::Postgres, None).unwrap();
        assert_eq!(
            pg.build_order_item(r#""a""#, Direction::Desc, Some(Nulls::First)),
            r#""a" DESC NULLS FIRST"#
        );
    }

    #[test]
    fn require_reports_version_and_hint() {
        let my = dialect_for(DialectKind::MySql, Some("5.7.44")).unwrap();
        let err = my.require(Feature::CommonTableExpressions).unwrap_err();
        match err {
            SqlError::UnsupportedFeature {
                feature,
                dialect,
                version,
                hint,
            } => {
                assert_eq!(feature, "common table expressions");
                assert_eq!(dialect, DialectKind::MySql);
                assert_eq!(version.as_deref(), Some("5.7.44"));
                assert!(hint.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
