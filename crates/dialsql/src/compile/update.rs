//! UPDATE assembly.

use super::mutation::Mutation;
use super::{clause, resolve, BuildContext};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::Fragment;
use crate::qb::Update;
use crate::value::Value;

pub(crate) fn build(ctx: &BuildContext<'_>, q: &Update) -> SqlResult<Fragment> {
    if q.table.trim().is_empty() {
        return Err(SqlError::invalid("Table name is required"));
    }
    if q.assignments.is_empty() {
        return Err(SqlError::invalid("UPDATE requires at least one SET assignment"));
    }

    let plan = Mutation {
        statement: "UPDATE",
        table: &q.table,
        alias: q.alias.as_deref(),
        joins: &q.joins,
        where_: &q.where_,
        order_by: &q.order_by,
        limit: q.limit,
        offset: q.offset,
    }
    .plan(ctx)?;

    let keyword = ctx.dialect.update_keyword(q.modifier)?;
    let mut out = Fragment::sql(format!(
        "{keyword} {}",
        ctx.table_ref(&q.table, q.alias.as_deref())?
    ));
    out.push_clause(plan.joins);
    out.push_clause(assignments(ctx, &q.assignments)?);
    if !plan.sources.is_empty() {
        out.push_str(" FROM ");
        out.push(plan.sources);
    }
    out.push_clause(plan.filter);
    out.push_clause(clause::returning(ctx, &q.returning)?);
    Ok(out)
}

fn assignments(ctx: &BuildContext<'_>, list: &[(String, Value)]) -> SqlResult<Fragment> {
    let mut out = Fragment::sql("SET ");
    for (i, (column, value)) in list.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{} = ", ctx.quote(column)?));
        out.push(resolve::value(ctx, value)?);
    }
    Ok(out)
}
