//! UPDATE command state.

use crate::condition::Conditions;
use crate::dialect::Modifier;
use crate::ident::split_alias;
use crate::qb::common::{Join, OrderBy};
use crate::qb::traits::{Filter, Joins, Sorted};
use crate::value::Value;

/// UPDATE builder.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Update {
    pub(crate) table: String,
    pub(crate) alias: Option<String>,
    pub(crate) assignments: Vec<(String, Value)>,
    pub(crate) modifier: Option<Modifier>,
    pub(crate) joins: Vec<Join>,
    pub(crate) where_: Conditions,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) returning: Vec<String>,
}

impl Update {
    /// Create an UPDATE for `table` (`"users"` or `"users u"`).
    pub fn new(table: &str) -> Self {
        let (table, alias) = split_alias(table);
        Self {
            table,
            alias,
            assignments: Vec::new(),
            modifier: None,
            joins: Vec::new(),
            where_: Conditions::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            returning: Vec::new(),
        }
    }

    /// `SET column = value`. Use [`raw`](crate::raw) for expressions like `hits + 1`.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.assignments.push((column.to_string(), value.into()));
        self
    }

    /// `UPDATE IGNORE` / `UPDATE OR IGNORE`.
    pub fn or_ignore(mut self) -> Self {
        self.modifier = Some(Modifier::Ignore);
        self
    }

    /// `UPDATE OR REPLACE` (SQLite).
    pub fn or_replace(mut self) -> Self {
        self.modifier = Some(Modifier::Replace);
        self
    }

    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

impl Filter for Update {
    fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.where_
    }
}

impl Joins for Update {
    fn joins_mut(&mut self) -> &mut Vec<Join> {
        &mut self.joins
    }
}

impl Sorted for Update {
    fn sort_mut(&mut self) -> (&mut Vec<OrderBy>, &mut Option<u64>, &mut Option<u64>) {
        (&mut self.order_by, &mut self.limit, &mut self.offset)
    }
}
