//! Clause builders.
//!
//! Each builder renders one clause into a [`Fragment`]. An absent clause is an
//! empty fragment, which [`Fragment::push_clause`] skips.

use super::{resolve, select, BuildContext};
use crate::condition::{Conditions, Op, Predicate, Token};
use crate::dialect::{Feature, JoinType};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::{splice, Fragment};
use crate::qb::{Cte, FrameUnit, Join, OrderBy, Projection, Source, Union, Window, WindowRef};
use std::collections::HashSet;

// ==================== conditions ====================

pub(crate) fn predicate(ctx: &BuildContext<'_>, predicate: &Predicate) -> SqlResult<Fragment> {
    match predicate {
        Predicate::Compare { column, op, value } => {
            resolve::compare(ctx, &ctx.reference(column)?, *op, value)
        }
        Predicate::Between {
            column,
            low,
            high,
            negated,
        } => {
            let not = if *negated { "NOT " } else { "" };
            let mut out = Fragment::sql(format!("{} {not}BETWEEN ", ctx.reference(column)?));
            out.push(resolve::value(ctx, low)?);
            out.push_str(" AND ");
            out.push(resolve::value(ctx, high)?);
            Ok(out)
        }
        Predicate::Null { column, negated } => {
            let not = if *negated { "NOT " } else { "" };
            Ok(Fragment::sql(format!("{} IS {not}NULL", ctx.reference(column)?)))
        }
        Predicate::Columns { left, op, right } => {
            let (left, right) = (ctx.reference(left)?, ctx.reference(right)?);
            Ok(Fragment::sql(match op {
                Op::ILike | Op::NotILike => {
                    ctx.dialect.build_ilike(&left, &right, *op == Op::NotILike)
                }
                Op::In | Op::NotIn => format!("{left} {} ({right})", op.as_sql()),
                _ => format!("{left} {} {right}", op.as_sql()),
            }))
        }
        // Parenthesized so an OR inside the template cannot leak into the
        // surrounding AND chain.
        Predicate::Template { sql, values } => {
            Ok(resolve::template(ctx, sql, values)?.wrap_parens())
        }
        Predicate::Exists { query, negated } => {
            let not = if *negated { "NOT " } else { "" };
            let mut out = Fragment::sql(format!("{not}EXISTS "));
            out.push(select::build(&ctx.nested()?, query)?.wrap_parens());
            Ok(out)
        }
        Predicate::JsonPath {
            column,
            path,
            op,
            value,
        } => {
            ctx.dialect.require(Feature::JsonFunctions)?;
            let segments = resolve::json_path_segments(path)?;
            let lhs = ctx
                .dialect
                .build_json_extract(&ctx.reference(column)?, &segments);
            resolve::compare(ctx, &lhs, *op, value)
        }
        Predicate::JsonContains { column, value } => {
            ctx.dialect.require(Feature::JsonFunctions)?;
            let sql = ctx.dialect.build_json_contains(&ctx.reference(column)?);
            let probe = resolve::json_probe(ctx.dialect.kind(), value)?;
            splice(&sql, ctx.dialect.backslash_escapes(), vec![probe], |v| {
                resolve::value(ctx, &v)
            })
        }
        Predicate::JsonLength { column, op, value } => {
            ctx.dialect.require(Feature::JsonFunctions)?;
            let lhs = ctx.dialect.build_json_length(&ctx.reference(column)?);
            resolve::compare(ctx, &lhs, *op, value)
        }
    }
}

/// Render a condition list with its bracket groups.
pub(crate) fn conditions(ctx: &BuildContext<'_>, conditions: &Conditions) -> SqlResult<Fragment> {
    conditions.validate()?;

    let mut out = Fragment::new();
    // No connector at the very start or right after an opening bracket.
    let mut group_start = true;
    for token in &conditions.tokens {
        match token {
            Token::Open(conjunction) => {
                if !group_start {
                    out.push_str(&format!(" {} ", conjunction.as_sql()));
                }
                out.push_str("(");
                group_start = true;
            }
            Token::Close => {
                out.push_str(")");
                group_start = false;
            }
            Token::Pred(conjunction, p) => {
                if !group_start {
                    out.push_str(&format!(" {} ", conjunction.as_sql()));
                }
                out.push(predicate(ctx, p)?);
                group_start = false;
            }
        }
    }
    Ok(out)
}

/// `WHERE ...` / `HAVING ...`, or nothing.
pub(crate) fn filter(
    ctx: &BuildContext<'_>,
    keyword: &str,
    list: &Conditions,
) -> SqlResult<Fragment> {
    if list.is_empty() {
        return Ok(Fragment::new());
    }
    let mut out = Fragment::sql(format!("{keyword} "));
    out.push(conditions(ctx, list)?);
    Ok(out)
}

// ==================== WITH ====================

pub(crate) fn with(ctx: &BuildContext<'_>, ctes: &[Cte]) -> SqlResult<Fragment> {
    if ctes.is_empty() {
        return Ok(Fragment::new());
    }
    ctx.dialect.require(Feature::CommonTableExpressions)?;

    let mut seen = HashSet::new();
    for cte in ctes {
        if !seen.insert(cte.name.to_ascii_lowercase()) {
            return Err(SqlError::invalid(format!("Duplicate CTE name: {}", cte.name)));
        }
    }

    let recursive = ctes.iter().any(|c| c.recursive);
    let mut out = Fragment::sql(if recursive { "WITH RECURSIVE " } else { "WITH " });
    let nested = ctx.nested()?;
    for (i, cte) in ctes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&ctx.quote(&cte.name)?);
        if !cte.columns.is_empty() {
            out.push_str(&format!(" ({})", quote_list(ctx, &cte.columns)?));
        }
        out.push_str(" AS ");
        out.push(select::build(&nested, &cte.query)?.wrap_parens());
    }
    Ok(out)
}

// ==================== SELECT list / WINDOW ====================

pub(crate) fn projection(
    ctx: &BuildContext<'_>,
    distinct: bool,
    items: &[Projection],
) -> SqlResult<Fragment> {
    let mut out = Fragment::sql(if distinct { "SELECT DISTINCT " } else { "SELECT " });
    if items.is_empty() {
        out.push_str("*");
        return Ok(out);
    }

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match item {
            Projection::Column(column) => out.push_str(&ctx.projection(column)?),
            Projection::Subquery { query, alias } => {
                out.push(select::build(&ctx.nested()?, query)?.wrap_parens());
                out.push_str(&format!(" AS {}", ctx.quote(alias)?));
            }
            Projection::Window {
                function,
                over,
                alias,
            } => {
                ctx.dialect.require(Feature::WindowFunctions)?;
                out.push_str(&ctx.expression(function.trim())?);
                out.push_str(" OVER ");
                match over {
                    WindowRef::Named(name) => out.push_str(&ctx.quote(name)?),
                    WindowRef::Inline(window) => {
                        out.push_str(&format!("({})", window_spec(ctx, window)?));
                    }
                }
                if let Some(alias) = alias {
                    out.push_str(&format!(" AS {}", ctx.quote(alias)?));
                }
            }
        }
    }
    Ok(out)
}

fn window_spec(ctx: &BuildContext<'_>, window: &Window) -> SqlResult<String> {
    let mut parts = Vec::new();
    if !window.partition_by.is_empty() {
        let columns = window
            .partition_by
            .iter()
            .map(|c| ctx.reference(c))
            .collect::<SqlResult<Vec<_>>>()?;
        parts.push(format!("PARTITION BY {}", columns.join(", ")));
    }
    if !window.order_by.is_empty() {
        parts.push(format!("ORDER BY {}", order_items(ctx, &window.order_by)?));
    }
    if let Some(frame) = &window.frame {
        frame.validate()?;
        if frame.unit() == FrameUnit::Groups {
            ctx.dialect.require(Feature::GroupsFrame)?;
        }
        parts.push(frame.to_sql());
    }
    Ok(parts.join(" "))
}

/// `WINDOW name AS (...), ...`
pub(crate) fn windows(ctx: &BuildContext<'_>, windows: &[(String, Window)]) -> SqlResult<Fragment> {
    if windows.is_empty() {
        return Ok(Fragment::new());
    }
    ctx.dialect.require(Feature::WindowFunctions)?;
    let defs = windows
        .iter()
        .map(|(name, window)| Ok(format!("{} AS ({})", ctx.quote(name)?, window_spec(ctx, window)?)))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(Fragment::sql(format!("WINDOW {}", defs.join(", "))))
}

// ==================== FROM / JOIN ====================

pub(crate) fn source(ctx: &BuildContext<'_>, source: &Source) -> SqlResult<Fragment> {
    match source {
        Source::Table { name, alias } => {
            if name.trim().is_empty() {
                return Err(SqlError::invalid("Table name is required"));
            }
            Ok(Fragment::sql(ctx.table_ref(name, alias.as_deref())?))
        }
        Source::Subquery { query, alias } => {
            let alias = alias
                .as_deref()
                .ok_or_else(|| SqlError::invalid("Derived table requires an alias"))?;
            let mut out = select::build(&ctx.nested()?, query)?.wrap_parens();
            out.push_str(&format!(" AS {}", ctx.quote(alias)?));
            Ok(out)
        }
    }
}

/// Every join the dialect supports, in order. The rest go through the
/// compatibility policy.
pub(crate) fn joins(ctx: &BuildContext<'_>, joins: &[Join]) -> SqlResult<Fragment> {
    let mut out = Fragment::new();
    for join in joins {
        if !ctx.dialect.supports_join_type(join.kind) {
            ctx.omit(join.kind.keyword())?;
            continue;
        }
        out.push_clause(self::join(ctx, join)?);
    }
    Ok(out)
}

pub(crate) fn join(ctx: &BuildContext<'_>, join: &Join) -> SqlResult<Fragment> {
    check_join(join)?;
    let mut out = Fragment::sql(format!("{} ", join.kind.keyword()));
    out.push(source(ctx, &join.target)?);
    if join.kind != JoinType::Cross {
        out.push_str(" ON ");
        out.push(conditions(ctx, &join.on)?);
    }
    Ok(out)
}

/// CROSS JOIN takes no ON clause; every other join needs one.
pub(crate) fn check_join(join: &Join) -> SqlResult<()> {
    match (join.kind, join.on.is_empty()) {
        (JoinType::Cross, false) => Err(SqlError::invalid("CROSS JOIN cannot have an ON clause")),
        (JoinType::Cross, true) | (_, false) => Ok(()),
        (kind, true) => Err(SqlError::invalid(format!(
            "{} requires an ON condition",
            kind.keyword()
        ))),
    }
}

// ==================== GROUP BY / ORDER BY / LIMIT / RETURNING ====================

pub(crate) fn group_by(ctx: &BuildContext<'_>, columns: &[String]) -> SqlResult<Fragment> {
    if columns.is_empty() {
        return Ok(Fragment::new());
    }
    let columns = columns
        .iter()
        .map(|c| ctx.reference(c))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(Fragment::sql(format!("GROUP BY {}", columns.join(", "))))
}

fn order_items(ctx: &BuildContext<'_>, items: &[OrderBy]) -> SqlResult<String> {
    let items = items
        .iter()
        .map(|o| {
            Ok(ctx
                .dialect
                .build_order_item(&ctx.reference(&o.expr)?, o.direction, o.nulls))
        })
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(items.join(", "))
}

pub(crate) fn order_by(ctx: &BuildContext<'_>, items: &[OrderBy]) -> SqlResult<Fragment> {
    if items.is_empty() {
        return Ok(Fragment::new());
    }
    Ok(Fragment::sql(format!("ORDER BY {}", order_items(ctx, items)?)))
}

pub(crate) fn limit(ctx: &BuildContext<'_>, limit: Option<u64>, offset: Option<u64>) -> Fragment {
    ctx.dialect
        .build_limit(limit, offset)
        .map(Fragment::sql)
        .unwrap_or_default()
}

pub(crate) fn returning(ctx: &BuildContext<'_>, columns: &[String]) -> SqlResult<Fragment> {
    if columns.is_empty() {
        return Ok(Fragment::new());
    }
    ctx.dialect.require(Feature::Returning)?;
    let columns = columns
        .iter()
        .map(|c| ctx.projection(c))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(Fragment::sql(format!("RETURNING {}", columns.join(", "))))
}

// ==================== UNION ====================

/// Fail when a UNION member carries ORDER BY/LIMIT on a dialect that cannot
/// scope them to the member.
pub(crate) fn check_union_member(ctx: &BuildContext<'_>, has_order_or_limit: bool) -> SqlResult<()> {
    if has_order_or_limit && !ctx.dialect.parenthesize_union_arms() {
        return Err(ctx.dialect.unsupported(
            "ORDER BY/LIMIT on a UNION member",
            Some("select from the union as a derived table and order the outer query"),
        ));
    }
    Ok(())
}

pub(crate) fn unions(ctx: &BuildContext<'_>, unions: &[Union]) -> SqlResult<Fragment> {
    let mut out = Fragment::new();
    if unions.is_empty() {
        return Ok(out);
    }
    let nested = ctx.nested()?;
    for union in unions {
        check_union_member(ctx, union.query.has_order_or_limit())?;
        let mut arm = Fragment::sql(if union.all { "UNION ALL " } else { "UNION " });
        let body = select::build(&nested, &union.query)?;
        arm.push(if ctx.dialect.parenthesize_union_arms() {
            body.wrap_parens()
        } else {
            body
        });
        out.push_clause(arm);
    }
    Ok(out)
}

pub(crate) fn quote_list(ctx: &BuildContext<'_>, names: &[String]) -> SqlResult<String> {
    let quoted = names
        .iter()
        .map(|n| ctx.quote(n))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(quoted.join(", "))
}
