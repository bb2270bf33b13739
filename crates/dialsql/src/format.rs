//! Literal rendering for inlined output.

use crate::dialect::SqlDialect;
use crate::error::{SqlError, SqlResult};
use crate::validate::Validators;
use crate::value::Value;

/// Converts typed values to dialect-correct SQL literal text.
///
/// Used only when producing inlined (display) SQL. Every string passes the
/// value validator before it is escaped; raw expressions pass the expression
/// validator.
#[derive(Clone, Copy)]
pub struct ValueFormatter<'a> {
    dialect: &'a dyn SqlDialect,
    validators: &'a Validators,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(dialect: &'a dyn SqlDialect, validators: &'a Validators) -> Self {
        Self {
            dialect,
            validators,
        }
    }

    pub(crate) fn backslash_escapes(&self) -> bool {
        self.dialect.backslash_escapes()
    }

    pub fn format(&self, value: &Value) -> SqlResult<String> {
        Ok(match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.dialect.format_boolean(*b).to_string(),
            Value::Int(n) => n.to_string(),
            Value::UInt(n) => n.to_string(),
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(SqlError::invalid(format!(
                        "Non-finite float {f} has no SQL literal"
                    )));
                }
                f.to_string()
            }
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(d) => d.to_string(),
            Value::Text(s) => self.string_literal(s)?,
            Value::Json(j) => self.string_literal(&j.to_string())?,
            Value::Uuid(u) => quote(&u.to_string()),
            Value::Date(d) => quote(&d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => quote(&dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Value::List(items) => {
                if items.is_empty() {
                    return Err(SqlError::invalid("Empty list has no SQL literal"));
                }
                let parts = items
                    .iter()
                    .map(|v| self.format(v))
                    .collect::<SqlResult<Vec<_>>>()?;
                format!("({})", parts.join(", "))
            }
            Value::Raw(expr) => {
                self.validators.expression.validate(expr.as_str())?;
                expr.as_str().to_string()
            }
            Value::Subquery(_) => {
                return Err(SqlError::invalid(
                    "Subquery cannot be formatted as a literal",
                ));
            }
        })
    }

    fn string_literal(&self, s: &str) -> SqlResult<String> {
        self.validators.value.validate(s)?;
        Ok(quote(&escape(s)))
    }
}

/// Double backslashes and single quotes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("''"),
            c => out.push(c),
        }
    }
    out
}

fn quote(s: &str) -> String {
    format!("'{s}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{dialect_for, DialectKind};
    use crate::value::raw;
    use chrono::NaiveDate;

    fn with_formatter<R>(kind: DialectKind, f: impl FnOnce(ValueFormatter<'_>) -> R) -> R {
        let dialect = dialect_for(kind, None).unwrap();
        let validators = Validators::new();
        f(ValueFormatter::new(dialect.as_ref(), &validators))
    }

    #[test]
    fn scalars() {
        with_formatter(DialectKind::MySql, |fmt| {
            assert_eq!(fmt.format(&Value::Null).unwrap(), "NULL");
            assert_eq!(fmt.format(&Value::Bool(true)).unwrap(), "1");
            assert_eq!(fmt.format(&Value::Int(-4)).unwrap(), "-4");
            assert_eq!(fmt.format(&Value::Float(1.5)).unwrap(), "1.5");
        });
        with_formatter(DialectKind::Postgres, |fmt| {
            assert_eq!(fmt.format(&Value::Bool(false)).unwrap(), "FALSE");
        });
    }

    #[test]
    fn strings_are_escaped() {
        with_formatter(DialectKind::Sqlite, |fmt| {
            assert_eq!(fmt.format(&Value::from("O'Brien")).unwrap(), "'O''Brien'");
            assert_eq!(fmt.format(&Value::from(r"a\b")).unwrap(), r"'a\\b'");
        });
    }

    #[test]
    fn unsafe_string_rejected() {
        with_formatter(DialectKind::MySql, |fmt| {
            let err = fmt.format(&Value::from("a; DROP TABLE t--")).unwrap_err();
            assert!(err.is_unsafe_value());
        });
    }

    #[test]
    fn dates_lists_and_raw() {
        with_formatter(DialectKind::Postgres, |fmt| {
            let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
            assert_eq!(fmt.format(&Value::from(d)).unwrap(), "'2024-02-29'");
            assert_eq!(fmt.format(&Value::from(vec![1, 2])).unwrap(), "(1, 2)");
            assert_eq!(fmt.format(&Value::from(raw("NOW()"))).unwrap(), "NOW()");
            assert!(fmt.format(&Value::from(raw("1 -- x"))).is_err());
        });
    }

    #[test]
    fn non_finite_float_rejected() {
        with_formatter(DialectKind::Sqlite, |fmt| {
            assert!(fmt.format(&Value::Float(f64::NAN)).unwrap_err().is_invalid_input());
        });
    }
}
