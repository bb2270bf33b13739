//! SELECT assembly.

use super::{clause, BuildContext};
use crate::error::SqlResult;
use crate::placeholder::Fragment;
use crate::qb::Select;

/// Clause order: WITH, SELECT, FROM, JOIN, WHERE, GROUP BY, HAVING, WINDOW,
/// ORDER BY, LIMIT, UNION.
pub(crate) fn build(ctx: &BuildContext<'_>, q: &Select) -> SqlResult<Fragment> {
    let has_unions = !q.unions.is_empty();
    if has_unions {
        clause::check_union_member(ctx, q.has_order_or_limit())?;
    }

    let mut out = clause::with(ctx, &q.ctes)?;

    let mut body = clause::projection(ctx, q.distinct, &q.projections)?;
    let mut from = Fragment::sql("FROM ");
    from.push(clause::source(ctx, &q.source)?);
    body.push_clause(from);
    body.push_clause(clause::joins(ctx, &q.joins)?);
    body.push_clause(clause::filter(ctx, "WHERE", &q.where_)?);
    body.push_clause(clause::group_by(ctx, &q.group_by)?);
    body.push_clause(clause::filter(ctx, "HAVING", &q.having)?);
    body.push_clause(clause::windows(ctx, &q.windows)?);
    body.push_clause(clause::order_by(ctx, &q.order_by)?);
    body.push_clause(clause::limit(ctx, q.limit, q.offset));

    if has_unions && ctx.dialect.parenthesize_union_arms() {
        body = body.wrap_parens();
    }
    out.push_clause(body);
    out.push_clause(clause::unions(ctx, &q.unions)?);
    Ok(out)
}
