//! DELETE assembly.

use super::mutation::Mutation;
use super::{clause, BuildContext};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::Fragment;
use crate::qb::Delete;

pub(crate) fn build(ctx: &BuildContext<'_>, q: &Delete) -> SqlResult<Fragment> {
    if q.table.trim().is_empty() {
        return Err(SqlError::invalid("Table name is required"));
    }

    let mutation = Mutation {
        statement: "DELETE",
        table: &q.table,
        alias: q.alias.as_deref(),
        joins: &q.joins,
        where_: &q.where_,
        order_by: &q.order_by,
        limit: q.limit,
        offset: q.offset,
    };
    let plan = mutation.plan(ctx)?;

    let target = ctx.table_ref(&q.table, q.alias.as_deref())?;
    // A joined DELETE names the table whose rows go.
    let mut out = if plan.joins.is_empty() {
        Fragment::sql(format!("DELETE FROM {target}"))
    } else {
        Fragment::sql(format!("DELETE {} FROM {target}", mutation.qualifier(ctx)?))
    };
    out.push_clause(plan.joins);
    if !plan.sources.is_empty() {
        out.push_str(" USING ");
        out.push(plan.sources);
    }
    out.push_clause(plan.filter);
    out.push_clause(clause::returning(ctx, &q.returning)?);
    Ok(out)
}
