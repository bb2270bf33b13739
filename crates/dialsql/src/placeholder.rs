//! Positional placeholder handling.
//!
//! All scanning here is quote-aware: a `?` or a whitespace run inside `'...'`,
//! `"..."` or `` `...` `` belongs to a literal or identifier and is left alone.
//! A backslash escapes the next character inside `'...'` only when the dialect
//! says so; elsewhere `'C:\'` is a complete literal.

use crate::error::{SqlError, SqlResult};
use crate::format::ValueFormatter;
use crate::value::Value;

/// SQL text plus the bindings for its `?` placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Fragment {
    pub sql: String,
    pub bindings: Vec<Value>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sql(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    /// A single `?` bound to `value`.
    pub fn param(value: Value) -> Self {
        Self {
            sql: "?".to_string(),
            bindings: vec![value],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn push_str(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append `other`; its bindings follow the ones already collected because
    /// its text comes later.
    pub fn push(&mut self, other: Fragment) {
        self.sql.push_str(&other.sql);
        self.bindings.extend(other.bindings);
    }

    /// Append `other` after a single space, skipping empty fragments.
    pub fn push_clause(&mut self, other: Fragment) {
        if other.is_empty() {
            return;
        }
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        self.push(other);
    }

    pub fn wrap_parens(mut self) -> Self {
        self.sql = format!("({})", self.sql);
        self
    }
}

#[derive(Clone, Copy)]
enum Scan {
    Code,
    Quoted(char),
}

/// Byte offsets of every `?` outside quoted text.
pub(crate) fn placeholder_offsets(sql: &str, backslash_escapes: bool) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut state = Scan::Code;
    let mut chars = sql.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        match state {
            Scan::Code => match ch {
                '\'' | '"' | '`' => state = Scan::Quoted(ch),
                '?' => offsets.push(i),
                _ => {}
            },
            Scan::Quoted(q) => {
                if backslash_escapes && ch == '\\' && q == '\'' {
                    chars.next();
                } else if ch == q {
                    // A doubled quote stays inside the literal.
                    if chars.peek().is_some_and(|&(_, next)| next == q) {
                        chars.next();
                    } else {
                        state = Scan::Code;
                    }
                }
            }
        }
    }
    offsets
}

/// Replace each `?` in `sql` with the fragment produced for the next value.
///
/// The produced fragments' bindings land exactly where their text lands, so a
/// nested subquery's bindings sit between the bindings of the placeholders
/// before and after it.
pub(crate) fn splice(
    sql: &str,
    backslash_escapes: bool,
    values: Vec<Value>,
    mut resolve: impl FnMut(Value) -> SqlResult<Fragment>,
) -> SqlResult<Fragment> {
    let offsets = placeholder_offsets(sql, backslash_escapes);
    if offsets.len() != values.len() {
        return Err(SqlError::BindingCountMismatch {
            placeholders: offsets.len(),
            bindings: values.len(),
        });
    }

    let mut out = Fragment::new();
    let mut last = 0;
    for (offset, value) in offsets.into_iter().zip(values) {
        out.push_str(&sql[last..offset]);
        out.push(resolve(value)?);
        last = offset + 1;
    }
    out.push_str(&sql[last..]);
    Ok(out)
}

/// Replace every `?` with the formatted literal of the next binding.
pub(crate) fn inline_bindings(
    sql: &str,
    bindings: &[Value],
    formatter: &ValueFormatter<'_>,
) -> SqlResult<String> {
    let offsets = placeholder_offsets(sql, formatter.backslash_escapes());
    if offsets.len() != bindings.len() {
        return Err(SqlError::BindingCountMismatch {
            placeholders: offsets.len(),
            bindings: bindings.len(),
        });
    }

    let mut out = String::with_capacity(sql.len() + bindings.len() * 8);
    let mut last = 0;
    for (offset, value) in offsets.into_iter().zip(bindings) {
        out.push_str(&sql[last..offset]);
        out.push_str(&formatter.format(value)?);
        last = offset + 1;
    }
    out.push_str(&sql[last..]);
    Ok(out)
}

/// Collapse whitespace runs outside quoted text to one space and trim.
pub(crate) fn normalize_whitespace(sql: &str, backslash_escapes: bool) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut state = Scan::Code;
    let mut pending_space = false;
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match state {
            Scan::Code => {
                if ch.is_whitespace() {
                    pending_space = !out.is_empty();
                    continue;
                }
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                if matches!(ch, '\'' | '"' | '`') {
                    state = Scan::Quoted(ch);
                }
                out.push(ch);
            }
            Scan::Quoted(q) => {
                out.push(ch);
                if backslash_escapes && ch == '\\' && q == '\'' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else if ch == q {
                    if chars.peek() == Some(&q) {
                        if let Some(next) = chars.next() {
                            out.push(next);
                        }
                    } else {
                        state = Scan::Code;
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{dialect_for, DialectKind};
    use crate::validate::Validators;

    #[test]
    fn offsets_skip_quoted_text() {
        assert_eq!(placeholder_offsets("a = ? AND b = '?'", false), vec![4]);
        assert_eq!(placeholder_offsets(r#""col?" = ?"#, false), vec![9]);
        assert_eq!(placeholder_offsets("'it''s ?' = ?", false), vec![12]);
        assert!(placeholder_offsets("no params", false).is_empty());
    }

    #[test]
    fn backslash_escape_depends_on_dialect() {
        assert_eq!(placeholder_offsets(r"'a\'?' = ?", true), vec![9]);
        assert_eq!(placeholder_offsets(r"p <> 'C:\' AND id = ?", false), vec![20]);
        assert!(placeholder_offsets(r"p <> 'C:\' AND id = ?", true).is_empty());
        assert_eq!(
            normalize_whitespace(r"p <> 'C:\'   AND   q = 'a  b'", false),
            r"p <> 'C:\' AND q = 'a  b'"
        );
    }

    #[test]
    fn splice_merges_nested_bindings_in_place() {
        let out = splice(
            "a = ? AND b IN ? AND c = ?",
            false,
            vec![Value::Int(1), Value::Null, Value::Int(3)],
            |v| match v {
                Value::Null => Ok(Fragment {
                    sql: "(SELECT id FROM t WHERE x = ?)".into(),
                    bindings: vec![Value::Int(2)],
                }),
                other => Ok(Fragment::param(other)),
            },
        )
        .unwrap();
        assert_eq!(out.sql, "a = ? AND b IN (SELECT id FROM t WHERE x = ?) AND c = ?");
        assert_eq!(out.bindings, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn splice_count_mismatch() {
        let err = splice("a = ? AND b = ?", false, vec![Value::Int(1)], |v| {
            Ok(Fragment::param(v))
        })
        .unwrap_err();
        assert_eq!(
            err,
            SqlError::BindingCountMismatch {
                placeholders: 2,
                bindings: 1
            }
        );
    }

    #[test]
    fn inline_count_mismatch() {
        let dialect = dialect_for(DialectKind::Postgres, None).unwrap();
        let validators = Validators::new();
        let formatter = ValueFormatter::new(dialect.as_ref(), &validators);

        let too_few = inline_bindings("a = ? AND b = ?", &[Value::Int(1)], &formatter);
        assert_eq!(
            too_few.unwrap_err(),
            SqlError::BindingCountMismatch {
                placeholders: 2,
                bindings: 1
            }
        );

        let too_many = inline_bindings("a = ?", &[Value::Int(1), Value::Int(2)], &formatter);
        assert_eq!(
            too_many.unwrap_err(),
            SqlError::BindingCountMismatch {
                placeholders: 1,
                bindings: 2
            }
        );

        assert_eq!(
            inline_bindings("a = ?", &[Value::Int(7)], &formatter).unwrap(),
            "a = 7"
        );
    }

    #[test]
    fn normalize_preserves_literals() {
        assert_eq!(
            normalize_whitespace("  SELECT   a \n FROM  t WHERE b = '  x  '  ", false),
            "SELECT a FROM t WHERE b = '  x  '"
        );
        assert_eq!(
            normalize_whitespace(r#"SELECT "a  b"   FROM t"#, false),
            r#"SELECT "a  b" FROM t"#
        );
    }
}
