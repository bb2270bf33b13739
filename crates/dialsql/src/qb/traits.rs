//! Shared builder behavior for conditions, joins and ordering.

use crate::condition::{Conditions, Conjunction, Op, Predicate};
use crate::dialect::{Direction, JoinType, Nulls};
use crate::qb::common::{Join, On, OrderBy, Source};
use crate::qb::select::Select;
use crate::value::Value;

/// WHERE (or ON) condition methods.
///
/// Conditions are joined with AND unless the `or_` variant is used. Bracket
/// groups are opened with [`open`](Filter::open) / [`or_open`](Filter::or_open)
/// and closed with [`close`](Filter::close); nesting is checked at compile time.
pub trait Filter: Sized {
    #[doc(hidden)]
    fn conditions_mut(&mut self) -> &mut Conditions;

    /// Append a structured predicate joined with AND.
    fn and_where(mut self, predicate: Predicate) -> Self {
        self.conditions_mut().push(Conjunction::And, predicate);
        self
    }

    /// Append a structured predicate joined with OR.
    fn or_where(mut self, predicate: Predicate) -> Self {
        self.conditions_mut().push(Conjunction::Or, predicate);
        self
    }

    /// `column op value`
    fn where_op(self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        self.and_where(compare(column, op, value.into()))
    }

    /// `OR column op value`
    fn or_where_op(self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        self.or_where(compare(column, op, value.into()))
    }

    fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_op(column, Op::Eq, value)
    }

    fn ne(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_op(column, Op::Ne, value)
    }

    fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_op(column, Op::Gt, value)
    }

    fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_op(column, Op::Gte, value)
    }

    fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_op(column, Op::Lt, value)
    }

    fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_op(column, Op::Lte, value)
    }

    fn like(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.where_op(column, Op::Like, pattern)
    }

    fn not_like(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.where_op(column, Op::NotLike, pattern)
    }

    /// Case-insensitive LIKE. Native on PostgreSQL, `LOWER(..) LIKE LOWER(..)` elsewhere.
    fn ilike(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.where_op(column, Op::ILike, pattern)
    }

    fn not_ilike(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.where_op(column, Op::NotILike, pattern)
    }

    /// `column IN (...)`. An empty list matches nothing.
    fn in_list<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.where_op(column, Op::In, values)
    }

    /// `column NOT IN (...)`. An empty list matches everything.
    fn not_in<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.where_op(column, Op::NotIn, values)
    }

    /// `column IN (subquery)`
    fn in_subquery(self, column: &str, query: Select) -> Self {
        self.where_op(column, Op::In, query)
    }

    fn between(self, column: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.and_where(Predicate::Between {
            column: column.to_string(),
            low: low.into(),
            high: high.into(),
            negated: false,
        })
    }

    fn not_between(self, column: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.and_where(Predicate::Between {
            column: column.to_string(),
            low: low.into(),
            high: high.into(),
            negated: true,
        })
    }

    fn is_null(self, column: &str) -> Self {
        self.and_where(Predicate::Null {
            column: column.to_string(),
            negated: false,
        })
    }

    fn is_not_null(self, column: &str) -> Self {
        self.and_where(Predicate::Null {
            column: column.to_string(),
            negated: true,
        })
    }

    /// Caller SQL with `?` placeholders, one value per placeholder.
    ///
    /// A [`Value::Subquery`] value is compiled in place as `(subquery)`, a
    /// [`Value::List`] expands to `(?, ?, ...)`.
    fn where_raw(self, sql: &str, values: Vec<Value>) -> Self {
        self.and_where(Predicate::Template {
            sql: sql.to_string(),
            values,
        })
    }

    fn or_where_raw(self, sql: &str, values: Vec<Value>) -> Self {
        self.or_where(Predicate::Template {
            sql: sql.to_string(),
            values,
        })
    }

    fn exists(self, query: Select) -> Self {
        self.and_where(Predicate::Exists {
            query: Box::new(query),
            negated: false,
        })
    }

    fn not_exists(self, query: Select) -> Self {
        self.and_where(Predicate::Exists {
            query: Box::new(query),
            negated: true,
        })
    }

    /// Compare the text at `path` (`"address.city"`, `"tags[0]"`) of a JSON column.
    fn json_path(self, column: &str, path: &str, op: Op, value: impl Into<Value>) -> Self {
        self.and_where(Predicate::JsonPath {
            column: column.to_string(),
            path: path.to_string(),
            op,
            value: value.into(),
        })
    }

    /// JSON containment of `value` in `column`.
    fn json_contains(self, column: &str, value: impl Into<Value>) -> Self {
        self.and_where(Predicate::JsonContains {
            column: column.to_string(),
            value: value.into(),
        })
    }

    /// Compare the array length of a JSON column.
    fn json_length(self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        self.and_where(Predicate::JsonLength {
            column: column.to_string(),
            op,
            value: value.into(),
        })
    }

    fn or_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.or_where_op(column, Op::Eq, value)
    }

    fn or_ne(self, column: &str, value: impl Into<Value>) -> Self {
        self.or_where_op(column, Op::Ne, value)
    }

    fn or_like(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.or_where_op(column, Op::Like, pattern)
    }

    fn or_ilike(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.or_where_op(column, Op::ILike, pattern)
    }

    fn or_in_list<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.or_where_op(column, Op::In, values)
    }

    fn or_is_null(self, column: &str) -> Self {
        self.or_where(Predicate::Null {
            column: column.to_string(),
            negated: false,
        })
    }

    fn or_exists(self, query: Select) -> Self {
        self.or_where(Predicate::Exists {
            query: Box::new(query),
            negated: false,
        })
    }

    /// Open a bracket group joined with AND.
    fn open(mut self) -> Self {
        self.conditions_mut().open(Conjunction::And);
        self
    }

    /// Open a bracket group joined with OR.
    fn or_open(mut self) -> Self {
        self.conditions_mut().open(Conjunction::Or);
        self
    }

    fn close(mut self) -> Self {
        self.conditions_mut().close();
        self
    }
}

fn compare(column: &str, op: Op, value: Value) -> Predicate {
    Predicate::Compare {
        column: column.to_string(),
        op,
        value,
    }
}

/// JOIN methods.
pub trait Joins: Sized {
    #[doc(hidden)]
    fn joins_mut(&mut self) -> &mut Vec<Join>;

    /// Add a join with an arbitrary ON builder.
    ///
    /// ```ignore
    /// select("users u").join_with(JoinType::Left, "orders o", |on| {
    ///     on.on("o.user_id", "u.id").eq("o.status", "paid")
    /// })
    /// ```
    fn join_with(mut self, kind: JoinType, target: impl Into<Source>, on: impl FnOnce(On) -> On) -> Self {
        let join = Join::new(kind, target.into(), on(On::new()));
        self.joins_mut().push(join);
        self
    }

    fn inner_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join_with(JoinType::Inner, table, |on| on.on(left, right))
    }

    fn left_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join_with(JoinType::Left, table, |on| on.on(left, right))
    }

    fn right_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join_with(JoinType::Right, table, |on| on.on(left, right))
    }

    /// FULL OUTER JOIN. Dropped (or rejected, per policy) on engines without it.
    fn full_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join_with(JoinType::Full, table, |on| on.on(left, right))
    }

    fn cross_join(self, table: &str) -> Self {
        self.join_with(JoinType::Cross, table, |on| on)
    }

    /// Join a derived table.
    fn join_subquery(
        self,
        kind: JoinType,
        query: Select,
        alias: &str,
        on: impl FnOnce(On) -> On,
    ) -> Self {
        self.join_with(kind, Source::subquery(query, alias), on)
    }
}

/// ORDER BY / LIMIT / OFFSET methods.
pub trait Sorted: Sized {
    #[doc(hidden)]
    fn sort_mut(&mut self) -> (&mut Vec<OrderBy>, &mut Option<u64>, &mut Option<u64>);

    fn order_by(mut self, expr: &str, direction: Direction) -> Self {
        self.sort_mut().0.push(OrderBy::new(expr, direction));
        self
    }

    fn order_by_asc(self, expr: &str) -> Self {
        self.order_by(expr, Direction::Asc)
    }

    fn order_by_desc(self, expr: &str) -> Self {
        self.order_by(expr, Direction::Desc)
    }

    /// ORDER BY with explicit NULL placement, emulated where not native.
    fn order_by_nulls(mut self, expr: &str, direction: Direction, nulls: Nulls) -> Self {
        self.sort_mut()
            .0
            .push(OrderBy::new(expr, direction).nulls(nulls));
        self
    }

    fn limit(mut self, limit: u64) -> Self {
        *self.sort_mut().1 = Some(limit);
        self
    }

    fn offset(mut self, offset: u64) -> Self {
        *self.sort_mut().2 = Some(offset);
        self
    }
}
