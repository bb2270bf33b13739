//! DELETE command state.

use crate::condition::Conditions;
use crate::ident::split_alias;
use crate::qb::common::{Join, OrderBy};
use crate::qb::traits::{Filter, Joins, Sorted};

/// DELETE builder.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Delete {
    pub(crate) table: String,
    pub(crate) alias: Option<String>,
    pub(crate) joins: Vec<Join>,
    pub(crate) where_: Conditions,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) returning: Vec<String>,
}

impl Delete {
    /// Create a DELETE for `table` (`"users"` or `"users u"`).
    pub fn new(table: &str) -> Self {
        let (table, alias) = split_alias(table);
        Self {
            table,
            alias,
            joins: Vec::new(),
            where_: Conditions::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            returning: Vec::new(),
        }
    }

    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

impl Filter for Delete {
    fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.where_
    }
}

impl Joins for Delete {
    fn joins_mut(&mut self) -> &mut Vec<Join> {
        &mut self.joins
    }
}

impl Sorted for Delete {
    fn sort_mut(&mut self) -> (&mut Vec<OrderBy>, &mut Option<u64>, &mut Option<u64>) {
        (&mut self.order_by, &mut self.limit, &mut self.offset)
    }
}
