//! WHERE / HAVING / ON condition collection.
//!
//! [`Conditions`] keeps an ordered token stream of predicates and bracket
//! markers, each predicate tagged with the connector that joins it to what came
//! before. Values stay typed until compile time, where the statement builder
//! resolves them into placeholders in text order.

use crate::error::{SqlError, SqlResult};
use crate::qb::Select;
use crate::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    ILike,
    NotILike,
    In,
    NotIn,
}

impl Op {
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::ILike => "ILIKE",
            Op::NotILike => "NOT ILIKE",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
        }
    }
}

/// Boolean connector placed before a predicate or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

/// One structured condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column op value`
    Compare { column: String, op: Op, value: Value },
    /// `column [NOT] BETWEEN low AND high`
    Between {
        column: String,
        low: Value,
        high: Value,
        negated: bool,
    },
    /// `column IS [NOT] NULL`
    Null { column: String, negated: bool },
    /// `left op right`, both column references
    Columns { left: String, op: Op, right: String },
    /// Caller SQL with `?` placeholders, one value per placeholder
    Template { sql: String, values: Vec<Value> },
    /// `[NOT] EXISTS (subquery)`
    Exists { query: Box<Select>, negated: bool },
    /// Compare the text at a JSON path
    JsonPath {
        column: String,
        path: String,
        op: Op,
        value: Value,
    },
    /// JSON containment
    JsonContains { column: String, value: Value },
    /// Compare the length of a JSON array
    JsonLength { column: String, op: Op, value: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Open(Conjunction),
    Close,
    Pred(Conjunction, Predicate),
}

/// Ordered collection of conditions and bracket groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pub(crate) tokens: Vec<Token>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Pred(..)))
            .count()
    }

    pub fn push(&mut self, conjunction: Conjunction, predicate: Predicate) {
        self.tokens.push(Token::Pred(conjunction, predicate));
    }

    /// Open a bracket group joined to the preceding condition by `conjunction`.
    pub fn open(&mut self, conjunction: Conjunction) {
        self.tokens.push(Token::Open(conjunction));
    }

    pub fn close(&mut self) {
        self.tokens.push(Token::Close);
    }

    /// Check bracket nesting: every group closed, none empty, no stray close.
    pub fn validate(&self) -> SqlResult<()> {
        let mut depth = 0usize;
        let mut previous_open = false;
        for token in &self.tokens {
            match token {
                Token::Open(_) => {
                    depth += 1;
                    previous_open = true;
                }
                Token::Close => {
                    if depth == 0 {
                        return Err(SqlError::invalid(
                            "Unbalanced condition brackets: close without open",
                        ));
                    }
                    if previous_open {
                        return Err(SqlError::invalid("Empty condition group"));
                    }
                    depth -= 1;
                }
                Token::Pred(..) => previous_open = false,
            }
        }
        if depth != 0 {
            return Err(SqlError::invalid(format!(
                "Unbalanced condition brackets: {depth} group(s) left open"
            )));
        }
        Ok(())
    }
}
