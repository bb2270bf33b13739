//! INSERT command state.

use crate::dialect::Modifier;
use crate::qb::select::Select;
use crate::value::Value;

/// Right-hand side of a conflict-update column.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `col = <value the row tried to insert>` (`VALUES(col)` / `EXCLUDED.col`).
    Incoming(String),
    /// `col = value`
    Set(String, Value),
}

/// What happens when the insert hits a unique conflict.
#[derive(Debug, Clone, PartialEq)]
pub enum OnConflict {
    DoNothing,
    DoUpdate(Vec<Assignment>),
}

/// INSERT builder.
///
/// Exactly one value source is allowed at compile time: either one or more
/// value rows, or a nested SELECT.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Insert {
    pub(crate) table: String,
    pub(crate) fields: Vec<String>,
    pub(crate) rows: Vec<Vec<Value>>,
    pub(crate) source: Option<Box<Select>>,
    pub(crate) modifier: Option<Modifier>,
    pub(crate) conflict_target: Vec<String>,
    pub(crate) on_conflict: Option<OnConflict>,
    pub(crate) returning: Vec<String>,
}

impl Insert {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            fields: Vec::new(),
            rows: Vec::new(),
            source: None,
            modifier: None,
            conflict_target: Vec::new(),
            on_conflict: None,
            returning: Vec::new(),
        }
    }

    /// Set the column list.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.fields = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append one value row; its width must equal the column count.
    pub fn values<I, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Append several value rows.
    pub fn rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Add a column and its value to the single-row form.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.fields.push(column.to_string());
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        self.rows[0].push(value.into());
        self
    }

    /// Insert the rows produced by `query` instead of literal rows.
    pub fn select(mut self, query: Select) -> Self {
        self.source = Some(Box::new(query));
        self
    }

    /// `INSERT IGNORE` / `INSERT OR IGNORE` / `ON CONFLICT DO NOTHING`.
    pub fn or_ignore(mut self) -> Self {
        self.modifier = Some(Modifier::Ignore);
        self
    }

    /// `REPLACE INTO` / `INSERT OR REPLACE`.
    pub fn or_replace(mut self) -> Self {
        self.modifier = Some(Modifier::Replace);
        self
    }

    /// MySQL-style upsert: update `columns` from the incoming row on any key conflict.
    pub fn on_duplicate_key_update(mut self, columns: &[&str]) -> Self {
        for column in columns {
            self.push_update(Assignment::Incoming(column.to_string()));
        }
        self
    }

    /// MySQL-style upsert with an explicit value.
    pub fn on_duplicate_key_set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.push_update(Assignment::Set(column.to_string(), value.into()));
        self
    }

    /// Set the conflict target columns for `ON CONFLICT (...)`.
    pub fn on_conflict(mut self, columns: &[&str]) -> Self {
        self.conflict_target = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn do_nothing(mut self) -> Self {
        self.on_conflict = Some(OnConflict::DoNothing);
        self
    }

    /// Update `columns` from the incoming row on conflict.
    pub fn do_update(self, columns: &[&str]) -> Self {
        self.on_duplicate_key_update(columns)
    }

    /// Update `column` to `value` on conflict.
    pub fn do_update_set(self, column: &str, value: impl Into<Value>) -> Self {
        self.on_duplicate_key_set(column, value)
    }

    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    fn push_update(&mut self, assignment: Assignment) {
        match &mut self.on_conflict {
            Some(OnConflict::DoUpdate(list)) => list.push(assignment),
            other => *other = Some(OnConflict::DoUpdate(vec![assignment])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::insert;

    #[test]
    fn set_builds_single_row() {
        let q = insert("users").set("name", "a").set("age", 3);
        assert_eq!(q.fields, vec!["name", "age"]);
        assert_eq!(q.rows, vec![vec![Value::from("a"), Value::Int(3)]]);
    }

    #[test]
    fn upsert_assignments_accumulate() {
        let q = insert("t")
            .columns(&["a", "b"])
            .values([1, 2])
            .on_duplicate_key_update(&["a"])
            .on_duplicate_key_set("b", 9);
        assert_eq!(
            q.on_conflict,
            Some(OnConflict::DoUpdate(vec![
                Assignment::Incoming("a".into()),
                Assignment::Set("b".into(), Value::Int(9)),
            ]))
        );
    }
}
