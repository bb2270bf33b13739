//! JOIN / ORDER BY / LIMIT planning shared by UPDATE and DELETE.
//!
//! Engines disagree on how (and whether) a mutation can join other tables or
//! bound the rows it touches. [`Mutation::plan`] asks the dialect for its
//! strategy and returns the pieces the statement builder splices around its
//! own head and SET list.

use super::{clause, select, BuildContext};
use crate::condition::Conditions;
use crate::dialect::{JoinType, MutationJoins, MutationLimits};
use crate::error::SqlResult;
use crate::placeholder::Fragment;
use crate::qb::{Join, OrderBy, Select, Source};

/// The parts of an UPDATE/DELETE that vary by engine.
pub(crate) struct Mutation<'q> {
    pub statement: &'static str,
    pub table: &'q str,
    pub alias: Option<&'q str>,
    pub joins: &'q [Join],
    pub where_: &'q Conditions,
    pub order_by: &'q [OrderBy],
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default)]
pub(crate) struct Plan {
    /// JOIN clauses written right after the target table.
    pub joins: Fragment,
    /// Comma-separated sources for `UPDATE .. FROM` / `DELETE .. USING`.
    pub sources: Fragment,
    /// WHERE, ORDER BY and LIMIT.
    pub filter: Fragment,
}

impl<'q> Mutation<'q> {
    pub fn plan(&self, ctx: &BuildContext<'_>) -> SqlResult<Plan> {
        if let MutationLimits::RowIdSubquery { column } = ctx.dialect.mutation_limits() {
            if self.has_order_or_limit() {
                return Ok(Plan {
                    filter: self.row_id_filter(ctx, column)?,
                    ..Plan::default()
                });
            }
        }

        let joins = self.usable_joins(ctx)?;
        let mut plan = Plan::default();
        if ctx.dialect.mutation_joins() == MutationJoins::FromUsing && !joins.is_empty() {
            plan.sources = self.sources(ctx, &joins)?;
            plan.filter = self.combined_filter(ctx, &joins)?;
        } else {
            for join in &joins {
                plan.joins.push_clause(clause::join(ctx, join)?);
            }
            plan.filter = clause::filter(ctx, "WHERE", self.where_)?;
        }
        plan.filter.push_clause(self.order_limit(ctx, !joins.is_empty())?);
        Ok(plan)
    }

    /// Quoted name the statement's rows are addressed by: the alias when
    /// present, otherwise the table.
    pub fn qualifier(&self, ctx: &BuildContext<'_>) -> SqlResult<String> {
        ctx.quote(self.alias.unwrap_or(self.table))
    }

    fn has_order_or_limit(&self) -> bool {
        !self.order_by.is_empty() || self.limit.is_some() || self.offset.is_some()
    }

    fn usable_joins(&self, ctx: &BuildContext<'_>) -> SqlResult<Vec<&'q Join>> {
        let strategy = ctx.dialect.mutation_joins();
        let mut kept = Vec::with_capacity(self.joins.len());
        for join in self.joins {
            let usable = match strategy {
                MutationJoins::Inline => ctx.dialect.supports_join_type(join.kind),
                // A FROM/USING list can only express inner and cross joins.
                MutationJoins::FromUsing => matches!(join.kind, JoinType::Inner | JoinType::Cross),
                MutationJoins::Unsupported => false,
            };
            if usable {
                kept.push(join);
            } else {
                ctx.omit(&format!("{} in {}", join.kind.keyword(), self.statement))?;
            }
        }
        Ok(kept)
    }

    fn sources(&self, ctx: &BuildContext<'_>, joins: &[&Join]) -> SqlResult<Fragment> {
        let mut out = Fragment::new();
        for (i, join) in joins.iter().enumerate() {
            clause::check_join(join)?;
            if i > 0 {
                out.push_str(", ");
            }
            out.push(clause::source(ctx, &join.target)?);
        }
        Ok(out)
    }

    /// ON conditions of the FROM/USING sources ANDed with the WHERE list.
    fn combined_filter(&self, ctx: &BuildContext<'_>, joins: &[&Join]) -> SqlResult<Fragment> {
        let mut parts = Vec::new();
        for join in joins {
            if !join.on.is_empty() {
                parts.push(clause::conditions(ctx, &join.on)?);
            }
        }
        if !self.where_.is_empty() {
            parts.push(clause::conditions(ctx, self.where_)?);
        }
        if parts.is_empty() {
            return Ok(Fragment::new());
        }

        let wrap = parts.len() > 1;
        let mut out = Fragment::sql("WHERE ");
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            out.push(if wrap { part.wrap_parens() } else { part });
        }
        Ok(out)
    }

    /// `WHERE t.<row id> IN (SELECT t.<row id> FROM .. ORDER BY .. LIMIT ..)`
    fn row_id_filter(&self, ctx: &BuildContext<'_>, column: &str) -> SqlResult<Fragment> {
        let row_id = format!("{}.{column}", self.alias.unwrap_or(self.table));

        let mut rows = Select::with_source(Source::Table {
            name: self.table.to_string(),
            alias: self.alias.map(str::to_string),
        })
        .column(&row_id);
        rows.joins = self.joins.to_vec();
        rows.where_ = self.where_.clone();
        rows.order_by = self.order_by.to_vec();
        rows.limit = self.limit;
        rows.offset = self.offset;

        let mut out = Fragment::sql(format!("WHERE {} IN ", ctx.reference(&row_id)?));
        out.push(select::build(&ctx.nested()?, &rows)?.wrap_parens());
        Ok(out)
    }

    fn order_limit(&self, ctx: &BuildContext<'_>, multi_table: bool) -> SqlResult<Fragment> {
        match ctx.dialect.mutation_limits() {
            MutationLimits::Native => {
                if multi_table {
                    if self.has_order_or_limit() {
                        ctx.omit(&format!("ORDER BY/LIMIT in a multi-table {}", self.statement))?;
                    }
                    return Ok(Fragment::new());
                }
                if self.offset.is_some() {
                    ctx.omit(&format!("OFFSET in {}", self.statement))?;
                }
                let mut out = clause::order_by(ctx, self.order_by)?;
                if let Some(limit) = self.limit {
                    out.push_clause(Fragment::sql(format!("LIMIT {limit}")));
                }
                Ok(out)
            }
            // Only reached without ORDER BY/LIMIT/OFFSET; see `plan`.
            MutationLimits::RowIdSubquery { .. } => Ok(Fragment::new()),
            MutationLimits::Unsupported => {
                if !self.order_by.is_empty() {
                    ctx.omit(&format!("ORDER BY in {}", self.statement))?;
                }
                if self.limit.is_some() || self.offset.is_some() {
                    ctx.omit(&format!("LIMIT in {}", self.statement))?;
                }
                Ok(Fragment::new())
            }
        }
    }
}
