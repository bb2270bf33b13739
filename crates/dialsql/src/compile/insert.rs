//! INSERT assembly.

use super::{clause, resolve, select, BuildContext};
use crate::dialect::{Feature, Modifier, UpsertClause, UpsertKind, UpsertSet, UpsertValue};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::Fragment;
use crate::qb::{Assignment, Insert, OnConflict};

pub(crate) fn build(ctx: &BuildContext<'_>, q: &Insert) -> SqlResult<Fragment> {
    validate(q)?;

    // PostgreSQL has no INSERT IGNORE; the same intent is ON CONFLICT DO NOTHING.
    let implied = OnConflict::DoNothing;
    let ignore_as_conflict =
        q.modifier == Some(Modifier::Ignore) && ctx.dialect.ignore_as_conflict_nothing();
    let conflict = match (&q.on_conflict, ignore_as_conflict) {
        (Some(_), true) => {
            return Err(SqlError::invalid(
                "or_ignore() cannot be combined with an explicit conflict clause",
            ));
        }
        (Some(explicit), false) => Some(explicit),
        (None, true) => Some(&implied),
        (None, false) => None,
    };
    if !q.conflict_target.is_empty() && conflict.is_none() {
        return Err(SqlError::invalid(
            "Conflict target given without do_nothing() or do_update()",
        ));
    }

    let keyword = ctx.dialect.insert_keyword(q.modifier)?;
    let fields = q
        .fields
        .iter()
        .map(|f| ctx.quote(f))
        .collect::<SqlResult<Vec<_>>>()?;
    let mut out = Fragment::sql(format!(
        "{keyword} {} ({})",
        ctx.quote(&q.table)?,
        fields.join(", ")
    ));

    match &q.source {
        Some(query) => {
            out.push_str(" ");
            out.push(select::build(&ctx.nested()?, query)?);
        }
        None => {
            out.push_str(" VALUES ");
            for (i, row) in q.rows.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str("(");
                for (j, value) in row.iter().enumerate() {
                    if j > 0 {
                        out.push_str(", ");
                    }
                    out.push(resolve::value(ctx, value)?);
                }
                out.push_str(")");
            }
        }
    }

    if let Some(conflict) = conflict {
        out.push_clause(upsert(ctx, q, &fields, conflict)?);
    }
    out.push_clause(clause::returning(ctx, &q.returning)?);
    Ok(out)
}

fn validate(q: &Insert) -> SqlResult<()> {
    if q.table.trim().is_empty() {
        return Err(SqlError::invalid("Table name is required"));
    }
    if q.fields.is_empty() {
        return Err(SqlError::invalid("INSERT requires at least one column"));
    }
    if q.fields.len() == 1 && q.fields[0].trim() == "*" {
        return Err(SqlError::invalid("INSERT column list cannot be a wildcard"));
    }

    match (q.rows.is_empty(), &q.source) {
        (false, Some(_)) => {
            return Err(SqlError::invalid(
                "INSERT takes either value rows or a SELECT, not both",
            ));
        }
        (true, None) => {
            return Err(SqlError::invalid("INSERT requires value rows or a SELECT"));
        }
        (true, Some(query)) => {
            if query.projects_wildcard() {
                return Err(SqlError::invalid(
                    "INSERT ... SELECT must list its columns explicitly",
                ));
            }
        }
        (false, None) => {
            for (i, row) in q.rows.iter().enumerate() {
                if row.len() != q.fields.len() {
                    return Err(SqlError::invalid(format!(
                        "Row {i} has {} values for {} columns",
                        row.len(),
                        q.fields.len()
                    )));
                }
            }
        }
    }

    if q.modifier == Some(Modifier::Replace) && q.on_conflict.is_some() {
        return Err(SqlError::invalid(
            "or_replace() cannot be combined with an upsert clause",
        ));
    }
    Ok(())
}

fn upsert(
    ctx: &BuildContext<'_>,
    q: &Insert,
    fields: &[String],
    conflict: &OnConflict,
) -> SqlResult<Fragment> {
    ctx.dialect.require(Feature::Upsert)?;

    let target = q
        .conflict_target
        .iter()
        .map(|c| ctx.quote(c))
        .collect::<SqlResult<Vec<_>>>()?;

    // Assignment values are resolved here; the dialect places them in the
    // order given, so their bindings follow that order too.
    let mut bindings = Vec::new();
    let kind = match conflict {
        OnConflict::DoNothing => UpsertKind::DoNothing,
        OnConflict::DoUpdate(assignments) => {
            let mut sets = Vec::with_capacity(assignments.len());
            for assignment in assignments {
                sets.push(match assignment {
                    Assignment::Incoming(column) => UpsertSet {
                        column: ctx.quote(column)?,
                        value: UpsertValue::Incoming,
                    },
                    Assignment::Set(column, value) => {
                        let resolved = resolve::value(ctx, value)?;
                        bindings.extend(resolved.bindings);
                        UpsertSet {
                            column: ctx.quote(column)?,
                            value: UpsertValue::Expr(resolved.sql),
                        }
                    }
                });
            }
            UpsertKind::DoUpdate(sets)
        }
    };

    let sql = ctx.dialect.build_upsert(&UpsertClause {
        target: &target,
        fields,
        kind,
    })?;
    Ok(Fragment { sql, bindings })
}
