//! Building blocks shared by the command builders.

use crate::condition::{Conditions, Conjunction, Op, Predicate};
use crate::dialect::{Direction, JoinType, Nulls};
use crate::ident::split_alias;
use crate::qb::select::Select;
use crate::qb::traits::Filter;

/// A FROM / JOIN / mutation target.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table {
        name: String,
        alias: Option<String>,
    },
    Subquery {
        query: Box<Select>,
        alias: Option<String>,
    },
}

impl Source {
    /// Parse `"users"`, `"users u"` or `"users AS u"`.
    pub fn table(spec: &str) -> Self {
        let (name, alias) = split_alias(spec);
        Source::Table { name, alias }
    }

    pub fn subquery(query: Select, alias: &str) -> Self {
        Source::Subquery {
            query: Box::new(query),
            alias: Some(alias.to_string()),
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Source::Table { alias, .. } | Source::Subquery { alias, .. } => alias.as_deref(),
        }
    }
}

impl From<&str> for Source {
    fn from(spec: &str) -> Self {
        Source::table(spec)
    }
}

/// One JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub(crate) kind: JoinType,
    pub(crate) target: Source,
    pub(crate) on: Conditions,
}

impl Join {
    pub fn new(kind: JoinType, target: Source, on: On) -> Self {
        Self {
            kind,
            target,
            on: on.conditions,
        }
    }

    pub fn kind(&self) -> JoinType {
        self.kind
    }
}

/// ON-condition builder used by [`Joins::join_with`](crate::qb::Joins::join_with).
///
/// Besides column comparisons it accepts every [`Filter`] method, so value
/// comparisons can sit in the ON clause too.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct On {
    conditions: Conditions,
}

impl On {
    pub fn new() -> Self {
        Self::default()
    }

    /// `left = right` between two columns.
    pub fn on(mut self, left: &str, right: &str) -> Self {
        self.conditions.push(Conjunction::And, columns(left, Op::Eq, right));
        self
    }

    /// `OR left = right` between two columns.
    pub fn or_on(mut self, left: &str, right: &str) -> Self {
        self.conditions.push(Conjunction::Or, columns(left, Op::Eq, right));
        self
    }

    /// `left op right` between two columns.
    pub fn on_op(mut self, left: &str, op: Op, right: &str) -> Self {
        self.conditions.push(Conjunction::And, columns(left, op, right));
        self
    }
}

impl Filter for On {
    fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.conditions
    }
}

fn columns(left: &str, op: Op, right: &str) -> Predicate {
    Predicate::Columns {
        left: left.to_string(),
        op,
        right: right.to_string(),
    }
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub(crate) expr: String,
    pub(crate) direction: Direction,
    pub(crate) nulls: Option<Nulls>,
}

impl OrderBy {
    pub fn new(expr: &str, direction: Direction) -> Self {
        Self {
            expr: expr.to_string(),
            direction,
            nulls: None,
        }
    }

    pub fn nulls(mut self, nulls: Nulls) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

/// A named common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub(crate) name: String,
    pub(crate) columns: Vec<String>,
    pub(crate) query: Box<Select>,
    pub(crate) recursive: bool,
}

/// One UNION arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub(crate) all: bool,
    pub(crate) query: Box<Select>,
}
