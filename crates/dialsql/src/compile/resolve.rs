//! Value resolution.
//!
//! Scalars become a bound `?`, raw expressions are validated and written
//! verbatim, subqueries compile in place and lists expand element by element.

use super::{select, BuildContext};
use crate::condition::Op;
use crate::dialect::DialectKind;
use crate::error::{SqlError, SqlResult};
use crate::placeholder::{splice, Fragment};
use crate::value::Value;

pub(crate) fn value(ctx: &BuildContext<'_>, value: &Value) -> SqlResult<Fragment> {
    match value {
        Value::Raw(expr) => Ok(Fragment::sql(ctx.raw(expr)?)),
        Value::Subquery(query) => Ok(select::build(&ctx.nested()?, query)?.wrap_parens()),
        Value::List(items) => list(ctx, items),
        scalar => Ok(Fragment::param(scalar.clone())),
    }
}

fn list(ctx: &BuildContext<'_>, items: &[Value]) -> SqlResult<Fragment> {
    if items.is_empty() {
        return Err(SqlError::invalid("Value list cannot be empty"));
    }
    let mut out = Fragment::sql("(");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push(value(ctx, item)?);
    }
    out.push_str(")");
    Ok(out)
}

/// Caller SQL with one value per `?`, validated as an expression first.
pub(crate) fn template(ctx: &BuildContext<'_>, sql: &str, values: &[Value]) -> SqlResult<Fragment> {
    ctx.expression(sql)?;
    splice(sql, ctx.dialect.backslash_escapes(), values.to_vec(), |v| value(ctx, &v))
}

/// `lhs op rhs`, where `lhs` is already rendered SQL.
pub(crate) fn compare(ctx: &BuildContext<'_>, lhs: &str, op: Op, rhs: &Value) -> SqlResult<Fragment> {
    match (op, rhs) {
        (Op::Eq, Value::Null) => return Ok(Fragment::sql(format!("{lhs} IS NULL"))),
        (Op::Ne, Value::Null) => return Ok(Fragment::sql(format!("{lhs} IS NOT NULL"))),
        (Op::In | Op::NotIn, _) => return membership(ctx, lhs, op, rhs),
        (Op::ILike | Op::NotILike, _) => {
            let pattern = value(ctx, rhs)?;
            return Ok(Fragment {
                sql: ctx.dialect.build_ilike(lhs, &pattern.sql, op == Op::NotILike),
                bindings: pattern.bindings,
            });
        }
        _ => {}
    }
    let mut out = Fragment::sql(format!("{lhs} {} ", op.as_sql()));
    out.push(value(ctx, rhs)?);
    Ok(out)
}

fn membership(ctx: &BuildContext<'_>, lhs: &str, op: Op, rhs: &Value) -> SqlResult<Fragment> {
    let negated = op == Op::NotIn;
    // An empty set matches no row; its negation matches every row.
    if let Value::List(items) = rhs {
        if items.is_empty() {
            return Ok(Fragment::sql(if negated { "1=1" } else { "1=0" }));
        }
    }

    let mut out = Fragment::sql(format!("{lhs} {} ", op.as_sql()));
    match rhs {
        Value::List(_) | Value::Subquery(_) => out.push(value(ctx, rhs)?),
        single => out.push(value(ctx, single)?.wrap_parens()),
    }
    Ok(out)
}

/// Split `$.a.b[0]`, `a.b[0]` or `a.0` into validated segments.
///
/// Array indexes become all-digit segments.
pub(crate) fn json_path_segments(path: &str) -> SqlResult<Vec<String>> {
    let invalid = || SqlError::invalid(format!("Invalid JSON path: {path:?}"));

    let trimmed = path.trim();
    let body = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let body = body.strip_prefix('.').unwrap_or(body);
    if body.is_empty() {
        return Err(SqlError::invalid("JSON path cannot be empty"));
    }

    let mut segments = Vec::new();
    for part in body.split('.') {
        let (name, mut indexes) = match part.find('[') {
            Some(i) => (&part[..i], &part[i..]),
            None => (part, ""),
        };
        if name.is_empty() {
            if indexes.is_empty() || !segments.is_empty() {
                return Err(invalid());
            }
        } else {
            if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
                return Err(invalid());
            }
            segments.push(name.to_string());
        }

        while !indexes.is_empty() {
            let close = match (indexes.starts_with('['), indexes.find(']')) {
                (true, Some(close)) => close,
                _ => return Err(invalid()),
            };
            let index = &indexes[1..close];
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            segments.push(index.to_string());
            indexes = &indexes[close + 1..];
        }
    }
    Ok(segments)
}

/// Convert a containment probe to the binding shape the dialect compares with.
///
/// MySQL and PostgreSQL compare JSON documents, so the probe is bound as JSON
/// text. SQLite compares against `json_each.value`, which yields SQL scalars.
pub(crate) fn json_probe(kind: DialectKind, probe: &Value) -> SqlResult<Value> {
    match probe {
        Value::Raw(_) => return Ok(probe.clone()),
        Value::Subquery(_) => {
            return Err(SqlError::invalid("JSON containment takes a value, not a subquery"));
        }
        _ => {}
    }

    if kind == DialectKind::Sqlite {
        return match probe {
            Value::List(_) => Err(SqlError::invalid(
                "JSON containment on sqlite takes a single element",
            )),
            Value::Json(j) => Ok(json_scalar(j)),
            other => Ok(other.clone()),
        };
    }
    Ok(Value::Text(to_json(probe)?.to_string()))
}

fn to_json(value: &Value) -> SqlResult<serde_json::Value> {
    use serde_json::Value as Json;

    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::from(*n),
        Value::UInt(n) => Json::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| SqlError::invalid(format!("Non-finite float {f} has no JSON form")))?,
        #[cfg(feature = "rust_decimal")]
        Value::Decimal(d) => Json::String(d.to_string()),
        Value::Text(s) => Json::String(s.clone()),
        Value::Json(j) => j.clone(),
        Value::Uuid(u) => Json::String(u.to_string()),
        Value::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => Json::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect::<SqlResult<_>>()?),
        Value::Raw(_) | Value::Subquery(_) => {
            return Err(SqlError::invalid(format!(
                "A {} value has no JSON form",
                value.type_name()
            )));
        }
    })
}

fn json_scalar(j: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match j {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Int(i64::from(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                n.as_f64().map_or(Value::Null, Value::Float)
            }
        }
        Json::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_path_forms() {
        assert_eq!(json_path_segments("$.a.b").unwrap(), vec!["a", "b"]);
        assert_eq!(json_path_segments("tags[0]").unwrap(), vec!["tags", "0"]);
        assert_eq!(json_path_segments("a.items[2][1].name").unwrap(), vec![
            "a", "items", "2", "1", "name"
        ]);
        assert_eq!(json_path_segments("$[3]").unwrap(), vec!["3"]);
    }

    #[test]
    fn json_path_rejects_injection() {
        assert!(json_path_segments("").is_err());
        assert!(json_path_segments("$").is_err());
        assert!(json_path_segments("a..b").is_err());
        assert!(json_path_segments("a') OR 1=1 --").is_err());
        assert!(json_path_segments("a[x]").is_err());
        assert!(json_path_segments("a[1").is_err());
    }

    #[test]
    fn probes_are_json_text_on_document_engines() {
        assert_eq!(
            json_probe(DialectKind::Postgres, &Value::Json(json!({"a": 1}))).unwrap(),
            Value::Text(r#"{"a":1}"#.into())
        );
        assert_eq!(
            json_probe(DialectKind::MySql, &Value::from("x")).unwrap(),
            Value::Text(r#""x""#.into())
        );
        assert_eq!(
            json_probe(DialectKind::MySql, &Value::from(vec![1, 2])).unwrap(),
            Value::Text("[1,2]".into())
        );
    }

    #[test]
    fn probes_are_scalars_on_sqlite() {
        assert_eq!(
            json_probe(DialectKind::Sqlite, &Value::Json(json!("x"))).unwrap(),
            Value::Text("x".into())
        );
        assert_eq!(
            json_probe(DialectKind::Sqlite, &Value::Json(json!(true))).unwrap(),
            Value::Int(1)
        );
        assert_eq!(json_probe(DialectKind::Sqlite, &Value::Int(4)).unwrap(), Value::Int(4));
        assert!(json_probe(DialectKind::Sqlite, &Value::from(vec![1])).is_err());
    }
}
