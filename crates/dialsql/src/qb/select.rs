//! SELECT command state.

use crate::condition::{Conditions, Conjunction, Op, Predicate};
use crate::qb::common::{Cte, Join, OrderBy, Source, Union};
use crate::qb::traits::{Filter, Joins, Sorted};
use crate::qb::window::{Window, WindowRef};
use crate::value::Value;

/// One item of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// A column, `*`, `t.*`, or an expression optionally followed by `AS alias`.
    Column(String),
    /// `(subquery) AS alias`
    Subquery { query: Box<Select>, alias: String },
    /// `function OVER window [AS alias]`
    Window {
        function: String,
        over: WindowRef,
        alias: Option<String>,
    },
}

/// SELECT builder.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Select {
    pub(crate) ctes: Vec<Cte>,
    pub(crate) distinct: bool,
    pub(crate) projections: Vec<Projection>,
    pub(crate) source: Source,
    pub(crate) joins: Vec<Join>,
    pub(crate) where_: Conditions,
    pub(crate) group_by: Vec<String>,
    pub(crate) having: Conditions,
    pub(crate) windows: Vec<(String, Window)>,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) unions: Vec<Union>,
}

impl Select {
    /// Create a SELECT over `table` (`"users"`, `"users u"`, `"users AS u"`).
    pub fn new(table: &str) -> Self {
        Self::with_source(Source::table(table))
    }

    /// Create a SELECT over a derived table.
    pub fn from_subquery(query: Select, alias: &str) -> Self {
        Self::with_source(Source::subquery(query, alias))
    }

    pub(crate) fn with_source(source: Source) -> Self {
        Self {
            ctes: Vec::new(),
            distinct: false,
            projections: Vec::new(),
            source,
            joins: Vec::new(),
            where_: Conditions::new(),
            group_by: Vec::new(),
            having: Conditions::new(),
            windows: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            unions: Vec::new(),
        }
    }

    // ==================== SELECT list ====================

    /// Replace the SELECT list.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.projections = columns
            .iter()
            .map(|c| Projection::Column(c.to_string()))
            .collect();
        self
    }

    /// Append one SELECT item.
    pub fn column(mut self, column: &str) -> Self {
        self.projections.push(Projection::Column(column.to_string()));
        self
    }

    /// Append `(query) AS alias`.
    pub fn column_subquery(mut self, query: Select, alias: &str) -> Self {
        self.projections.push(Projection::Subquery {
            query: Box::new(query),
            alias: alias.to_string(),
        });
        self
    }

    /// Append `function OVER (...)` or `function OVER name`.
    ///
    /// ```ignore
    /// select("scores")
    ///     .column("player")
    ///     .column_window(
    ///         "RANK()",
    ///         Window::new().partition_by(&["game"]).order_by("points", Direction::Desc),
    ///         Some("place"),
    ///     )
    /// ```
    pub fn column_window(
        mut self,
        function: &str,
        over: impl Into<WindowRef>,
        alias: Option<&str>,
    ) -> Self {
        self.projections.push(Projection::Window {
            function: function.to_string(),
            over: over.into(),
            alias: alias.map(str::to_string),
        });
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== GROUP BY / HAVING / WINDOW ====================

    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.group_by.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// HAVING: `expr op value`.
    pub fn having(mut self, expr: &str, op: Op, value: impl Into<Value>) -> Self {
        self.having.push(
            Conjunction::And,
            Predicate::Compare {
                column: expr.to_string(),
                op,
                value: value.into(),
            },
        );
        self
    }

    /// HAVING: `OR expr op value`.
    pub fn or_having(mut self, expr: &str, op: Op, value: impl Into<Value>) -> Self {
        self.having.push(
            Conjunction::Or,
            Predicate::Compare {
                column: expr.to_string(),
                op,
                value: value.into(),
            },
        );
        self
    }

    /// HAVING with `?` placeholders.
    pub fn having_raw(mut self, sql: &str, values: Vec<Value>) -> Self {
        self.having.push(
            Conjunction::And,
            Predicate::Template {
                sql: sql.to_string(),
                values,
            },
        );
        self
    }

    /// Declare a named window for the `WINDOW` clause.
    pub fn window(mut self, name: &str, window: Window) -> Self {
        self.windows.push((name.to_string(), window));
        self
    }

    // ==================== CTE / UNION ====================

    /// `WITH name AS (query)`
    pub fn with(self, name: &str, query: Select) -> Self {
        self.push_cte(name, &[], query, false)
    }

    /// `WITH name (columns...) AS (query)`
    pub fn with_columns(self, name: &str, columns: &[&str], query: Select) -> Self {
        self.push_cte(name, columns, query, false)
    }

    /// `WITH RECURSIVE name (columns...) AS (query)`.
    ///
    /// The body is usually an anchor SELECT with a `union_all` arm that
    /// references `name`.
    pub fn with_recursive(self, name: &str, columns: &[&str], query: Select) -> Self {
        self.push_cte(name, columns, query, true)
    }

    fn push_cte(mut self, name: &str, columns: &[&str], query: Select, recursive: bool) -> Self {
        self.ctes.push(Cte {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            query: Box::new(query),
            recursive,
        });
        self
    }

    pub fn union(mut self, query: Select) -> Self {
        self.unions.push(Union {
            all: false,
            query: Box::new(query),
        });
        self
    }

    pub fn union_all(mut self, query: Select) -> Self {
        self.unions.push(Union {
            all: true,
            query: Box::new(query),
        });
        self
    }

    // ==================== inspection ====================

    /// `true` when the SELECT list is empty (implicit `*`) or contains a
    /// wildcard item (`*`, `t.*`, `DISTINCT *`).
    pub fn projects_wildcard(&self) -> bool {
        if self.projections.is_empty() {
            return true;
        }
        self.projections.iter().any(|p| match p {
            Projection::Column(c) => {
                let lowered = c.trim().to_ascii_lowercase();
                let item = lowered
                    .strip_prefix("distinct")
                    .map(str::trim_start)
                    .unwrap_or(&lowered);
                item == "*" || item.ends_with(".*")
            }
            _ => false,
        })
    }

    /// `true` when ORDER BY, LIMIT or OFFSET is set.
    pub fn has_order_or_limit(&self) -> bool {
        !self.order_by.is_empty() || self.limit.is_some() || self.offset.is_some()
    }
}

impl Filter for Select {
    fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.where_
    }
}

impl Joins for Select {
    fn joins_mut(&mut self) -> &mut Vec<Join> {
        &mut self.joins
    }
}

impl Sorted for Select {
    fn sort_mut(&mut self) -> (&mut Vec<OrderBy>, &mut Option<u64>, &mut Option<u64>) {
        (&mut self.order_by, &mut self.limit, &mut self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::select;

    #[test]
    fn wildcard_detection() {
        assert!(select("t").projects_wildcard());
        assert!(select("t").columns(&["*"]).projects_wildcard());
        assert!(select("t").columns(&["DISTINCT *"]).projects_wildcard());
        assert!(select("t").columns(&["id", "u.*"]).projects_wildcard());
        assert!(!select("t").columns(&["id", "name"]).projects_wildcard());
        assert!(!select("t").columns(&["COUNT(*) AS n"]).projects_wildcard());
    }

    #[test]
    fn alias_is_parsed_from_table() {
        let q = select("users AS u");
        assert_eq!(q.source.alias(), Some("u"));
    }

    #[test]
    fn builder_records_conditions_in_order() {
        let q = select("t").eq("a", 1).or_eq("b", 2).is_null("c");
        assert_eq!(q.where_.len(), 3);
    }
}
