//! # dialsql
//!
//! A dialect-aware SQL statement compiler for MySQL, PostgreSQL and SQLite.
//!
//! ## Features
//!
//! - **Prepared or inlined output**: `?` placeholders with an ordered binding list, or
//!   escaped literals for logs and debugging
//! - **Exact binding order**: bindings follow placeholder order across subqueries, CTEs and UNIONs
//! - **Dialect rules in one place**: quoting, booleans, upserts, JSON functions, join support
//!   and version-gated features live behind [`SqlDialect`](dialect::SqlDialect)
//! - **Compatibility policy**: clauses an engine cannot express are dropped with a warning
//!   or rejected, per [`UnsupportedPolicy`]
//! - **Injection guard for inlining**: string literals and raw expressions are pattern-checked
//!   before they are written into display SQL
//!
//! ## Usage
//!
//! ```ignore
//! use dialsql::prelude::*;
//!
//! let compiler = Compiler::new(DialectKind::MySql);
//!
//! let q = compiler.prepare(
//!     select("users")
//!         .columns(&["id", "name"])
//!         .eq("status", "active")
//!         .in_subquery("id", select("orders").columns(&["user_id"]).gt("total", 100))
//!         .limit(10),
//! )?;
//! assert_eq!(
//!     q.sql(),
//!     "SELECT `id`, `name` FROM `users` WHERE `status` = ? AND `id` IN \
//!      (SELECT `user_id` FROM `orders` WHERE `total` > ?) LIMIT 10"
//! );
//! assert_eq!(q.bindings().len(), 2);
//!
//! // Display only; never execute inlined SQL.
//! let shown = compiler.to_sql(update("users").set("name", "O'Brien").eq("id", 7))?;
//! assert_eq!(shown, "UPDATE `users` SET `name` = 'O''Brien' WHERE `id` = 7");
//! ```

pub mod compile;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod format;
pub mod ident;
pub mod qb;
pub mod validate;
pub mod value;

mod placeholder;

pub use compile::{Compiled, Compiler, Mode, PreparedQuery, StatementKind};
pub use condition::{Conditions, Conjunction, Op, Predicate};
pub use config::{CompilerConfig, UnsupportedPolicy};
pub use dialect::{dialect_for, DialectKind, Direction, Feature, JoinType, Nulls, SqlDialect, Version};
pub use error::{SqlError, SqlResult};
pub use validate::{InjectionPattern, Validators};
pub use value::{raw, RawExpr, Value};

// Re-export qb builders for easy access
pub use qb::{
    delete, insert, select, update, Command, Delete, Filter, Frame, FrameBound, FrameUnit, Insert,
    Joins, On, Select, Sorted, Update, Window,
};

/// Everything needed to build and compile commands.
pub mod prelude {
    pub use crate::compile::{Compiled, Compiler, Mode, PreparedQuery, StatementKind};
    pub use crate::condition::Op;
    pub use crate::config::{CompilerConfig, UnsupportedPolicy};
    pub use crate::dialect::{DialectKind, Direction, JoinType, Nulls};
    pub use crate::error::{SqlError, SqlResult};
    pub use crate::qb::{
        delete, insert, select, update, Filter, Frame, FrameBound, Joins, Sorted, Window,
    };
    pub use crate::value::{raw, Value};
}
