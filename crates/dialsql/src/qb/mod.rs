//! Command state builders.
//!
//! Each builder is a consuming, chainable value that only records intent: no
//! SQL is produced until a [`Compiler`](crate::Compiler) consumes the command.
//!
//! # Usage
//!
//! ```ignore
//! use dialsql::prelude::*;
//!
//! let compiler = Compiler::new(DialectKind::Postgres);
//!
//! // SELECT
//! let q = compiler.prepare(
//!     dialsql::select("users u")
//!         .columns(&["u.id", "u.name"])
//!         .eq("u.status", "active")
//!         .order_by_desc("u.created_at")
//!         .limit(20),
//! )?;
//!
//! // INSERT with upsert
//! let q = compiler.prepare(
//!     dialsql::insert("users")
//!         .columns(&["email", "name"])
//!         .values(["alice@example.com", "Alice"])
//!         .on_conflict(&["email"])
//!         .do_update(&["name"]),
//! )?;
//!
//! // UPDATE
//! let q = compiler.prepare(
//!     dialsql::update("users").set("status", "inactive").eq("id", 7),
//! )?;
//!
//! // DELETE
//! let q = compiler.prepare(dialsql::delete("sessions").lt("expires_at", cutoff))?;
//! ```

mod common;
mod delete;
mod insert;
mod select;
mod traits;
mod update;
mod window;

pub use common::{Cte, Join, On, OrderBy, Source, Union};
pub use delete::Delete;
pub use insert::{Assignment, Insert, OnConflict};
pub use select::{Projection, Select};
pub use traits::{Filter, Joins, Sorted};
pub use update::Update;
pub use window::{Frame, FrameBound, FrameUnit, Window, WindowRef};

use crate::compile::StatementKind;

/// Create a SELECT builder for `table` (`"users"`, `"users u"`, `"users AS u"`).
pub fn select(table: &str) -> Select {
    Select::new(table)
}

/// Create an INSERT builder for `table`.
pub fn insert(table: &str) -> Insert {
    Insert::new(table)
}

/// Create an UPDATE builder for `table`.
pub fn update(table: &str) -> Update {
    Update::new(table)
}

/// Create a DELETE builder for `table`.
pub fn delete(table: &str) -> Delete {
    Delete::new(table)
}

/// Any compilable command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Command {
    pub fn kind(&self) -> StatementKind {
        match self {
            Command::Select(_) => StatementKind::Select,
            Command::Insert(_) => StatementKind::Insert,
            Command::Update(_) => StatementKind::Update,
            Command::Delete(_) => StatementKind::Delete,
        }
    }
}

impl From<Select> for Command {
    fn from(v: Select) -> Self {
        Command::Select(v)
    }
}

impl From<Insert> for Command {
    fn from(v: Insert) -> Self {
        Command::Insert(v)
    }
}

impl From<Update> for Command {
    fn from(v: Update) -> Self {
        Command::Update(v)
    }
}

impl From<Delete> for Command {
    fn from(v: Delete) -> Self {
        Command::Delete(v)
    }
}
