//! Statement compilation.
//!
//! A [`Compiler`] owns one dialect, one set of validators and its
//! configuration. Compiling a command runs the statement builder for its kind,
//! which assembles clause fragments in fixed textual order. Every fragment
//! carries the bindings for its own placeholders, so appending fragments in
//! order keeps binding order equal to placeholder order, nested queries
//! included.

mod clause;
mod delete;
mod insert;
mod mutation;
mod resolve;
mod select;
mod update;


use crate::config::{CompilerConfig, UnsupportedPolicy};
use crate::dialect::{boxed_dialect, dialect_for, DialectKind, SqlDialect};
use crate::error::{truncate_bytes, SqlError, SqlResult};
use crate::format::ValueFormatter;
use crate::ident::Ident;
use crate::placeholder::{inline_bindings, normalize_whitespace, placeholder_offsets};
use crate::qb::Command;
use crate::validate::Validators;
use crate::value::{RawExpr, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// `?` placeholders plus an ordered binding list.
    Prepared,
    /// Values formatted into the text. For display and logging only.
    Inlined,
}

/// Statement-type tag carried by a [`PreparedQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL with positional `?` placeholders, its ordered bindings and its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    sql: String,
    bindings: Vec<Value>,
    kind: StatementKind,
}

impl PreparedQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn into_parts(self) -> (String, Vec<Value>, StatementKind) {
        (self.sql, self.bindings, self.kind)
    }
}

/// Result of [`Compiler::compile`].
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    Prepared(PreparedQuery),
    Inlined(String),
}

impl Compiled {
    pub fn sql(&self) -> &str {
        match self {
            Compiled::Prepared(q) => q.sql(),
            Compiled::Inlined(sql) => sql,
        }
    }

    pub fn into_prepared(self) -> Option<PreparedQuery> {
        match self {
            Compiled::Prepared(q) => Some(q),
            Compiled::Inlined(_) => None,
        }
    }
}

/// Dialect-aware statement compiler.
///
/// # Example
/// ```ignore
/// use dialsql::prelude::*;
///
/// let compiler = Compiler::new(DialectKind::MySql);
/// let q = compiler.prepare(select("users").columns(&["id"]).eq("status", "active"))?;
/// assert_eq!(q.sql(), "SELECT `id` FROM `users` WHERE `status` = ?");
/// ```
#[derive(Debug)]
pub struct Compiler {
    dialect: Box<dyn SqlDialect>,
    validators: Validators,
    config: CompilerConfig,
}

impl Compiler {
    /// Compiler for an unversioned dialect with default configuration.
    pub fn new(kind: DialectKind) -> Self {
        Self {
            dialect: boxed_dialect(kind, None),
            validators: Validators::new(),
            config: CompilerConfig::new(kind),
        }
    }

    /// Compiler pinned to an engine version such as `"8.0.32"`.
    pub fn for_version(kind: DialectKind, version: &str) -> SqlResult<Self> {
        Self::from_config(CompilerConfig::new(kind).with_version(version))
    }

    pub fn from_config(config: CompilerConfig) -> SqlResult<Self> {
        let dialect = dialect_for(config.dialect, config.version.as_deref())?;
        Ok(Self {
            dialect,
            validators: Validators::new(),
            config,
        })
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `command` in the requested mode, consuming it.
    pub fn compile(&self, command: impl Into<Command>, mode: Mode) -> SqlResult<Compiled> {
        match mode {
            Mode::Prepared => self.prepare(command).map(Compiled::Prepared),
            Mode::Inlined => self.to_sql(command).map(Compiled::Inlined),
        }
    }

    /// Compile to SQL with `?` placeholders and ordered bindings.
    pub fn prepare(&self, command: impl Into<Command>) -> SqlResult<PreparedQuery> {
        let (kind, sql, bindings) = self.build(command.into())?;
        self.log(kind, Mode::Prepared, &sql, bindings.len());
        Ok(PreparedQuery {
            sql,
            bindings,
            kind,
        })
    }

    /// Compile to display SQL with every value inlined as an escaped literal.
    ///
    /// The output is for logs and debugging. Execute [`prepare`](Self::prepare)
    /// output instead.
    pub fn to_sql(&self, command: impl Into<Command>) -> SqlResult<String> {
        let (kind, sql, bindings) = self.build(command.into())?;
        let formatter = ValueFormatter::new(self.dialect(), &self.validators);
        let sql = inline_bindings(&sql, &bindings, &formatter)?;
        self.log(kind, Mode::Inlined, &sql, bindings.len());
        Ok(sql)
    }

    fn build(&self, command: Command) -> SqlResult<(StatementKind, String, Vec<Value>)> {
        let kind = command.kind();
        let ctx = BuildContext::root(self);

        let fragment = match &command {
            Command::Select(q) => select::build(&ctx, q)?,
            Command::Insert(q) => insert::build(&ctx, q)?,
            Command::Update(q) => update::build(&ctx, q)?,
            Command::Delete(q) => delete::build(&ctx, q)?,
        };

        let escapes = self.dialect.backslash_escapes();
        let sql = normalize_whitespace(&fragment.sql, escapes);
        let placeholders = placeholder_offsets(&sql, escapes).len();
        if placeholders != fragment.bindings.len() {
            return Err(SqlError::BindingCountMismatch {
                placeholders,
                bindings: fragment.bindings.len(),
            });
        }
        Ok((kind, sql, fragment.bindings))
    }

    fn log(&self, kind: StatementKind, mode: Mode, sql: &str, bindings: usize) {
        let shown = match self.config.max_logged_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_bytes(sql, max)),
            _ => sql.to_string(),
        };
        tracing::debug!(
            target: "dialsql.compile",
            dialect = %self.dialect.kind(),
            statement = %kind,
            mode = ?mode,
            bindings,
            sql = %shown,
            "compiled statement"
        );
    }
}

/// Per-compilation state handed to every statement and clause builder.
#[derive(Clone, Copy)]
pub(crate) struct BuildContext<'a> {
    pub dialect: &'a dyn SqlDialect,
    pub validators: &'a Validators,
    pub config: &'a CompilerConfig,
    pub depth: usize,
}

impl<'a> BuildContext<'a> {
    fn root(compiler: &'a Compiler) -> Self {
        Self {
            dialect: compiler.dialect.as_ref(),
            validators: &compiler.validators,
            config: &compiler.config,
            depth: 0,
        }
    }

    /// Context for a nested query one level down.
    pub fn nested(&self) -> SqlResult<Self> {
        let depth = self.depth + 1;
        if depth > self.config.max_nesting_depth {
            return Err(SqlError::invalid(format!(
                "Query nesting exceeds the configured maximum depth of {}",
                self.config.max_nesting_depth
            )));
        }
        Ok(Self { depth, ..*self })
    }

    /// Quote a table or column identifier.
    pub fn quote(&self, name: &str) -> SqlResult<String> {
        self.dialect.quote_identifier(name)
    }

    /// `table` or `table AS alias`, quoted.
    pub fn table_ref(&self, table: &str, alias: Option<&str>) -> SqlResult<String> {
        let table = self.quote(table)?;
        match alias {
            Some(alias) => Ok(format!("{table} AS {}", self.quote(alias)?)),
            None => Ok(table),
        }
    }

    /// A column reference: quoted when it parses as an identifier, otherwise
    /// treated as a caller-trusted expression and validated.
    pub fn reference(&self, text: &str) -> SqlResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SqlError::invalid("Column reference cannot be empty"));
        }
        match Ident::parse(text) {
            Ok(ident) => Ok(ident.to_sql(self.dialect.quote_char())),
            Err(_) => self.expression(text),
        }
    }

    /// A SELECT-list item: a reference with an optional trailing `AS alias`.
    pub fn projection(&self, text: &str) -> SqlResult<String> {
        let text = text.trim();
        if let Some(pos) = text.to_ascii_lowercase().rfind(" as ") {
            let (base, alias) = (text[..pos].trim(), text[pos + 4..].trim());
            if let Ok(alias) = Ident::parse(alias) {
                if !alias.is_wildcard() && !base.is_empty() {
                    return Ok(format!(
                        "{} AS {}",
                        self.reference(base)?,
                        alias.to_sql(self.dialect.quote_char())
                    ));
                }
            }
        }
        self.reference(text)
    }

    /// Validate caller-trusted SQL text.
    pub fn expression(&self, sql: &str) -> SqlResult<String> {
        self.validators.expression.validate(sql)?;
        Ok(sql.to_string())
    }

    pub fn raw(&self, expr: &RawExpr) -> SqlResult<String> {
        self.expression(expr.as_str())
    }

    /// Apply the compatibility policy to a clause the dialect cannot express.
    ///
    /// Returns `Ok(())` when the clause should be silently dropped.
    pub fn omit(&self, feature: &str) -> SqlResult<()> {
        match self.config.unsupported_clauses {
            UnsupportedPolicy::Omit => {
                tracing::warn!(
                    target: "dialsql.compat",
                    dialect = %self.dialect.kind(),
                    feature,
                    "omitting clause unsupported by dialect"
                );
                Ok(())
            }
            UnsupportedPolicy::Reject => Err(self.dialect.unsupported(feature, None)),
        }
    }
}
