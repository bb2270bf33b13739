//! SQL identifier parsing and dialect quoting.
//!
//! [`Ident`] represents a table or column reference, supporting dotted notation,
//! already-quoted parts and a trailing wildcard.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts (`"..."` or `` `...` ``) allow any characters except NUL
//! - `*` is only allowed as the last part (`*`, `t.*`)
//!
//! Every named part is re-quoted with the target dialect's quote character on
//! output, so `public."UserTable".id` becomes `` `public`.`UserTable`.`id` `` on MySQL.

use crate::error::{SqlError, SqlResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// A plain or quoted name.
    Name(String),
    /// `*`
    Wildcard,
}

/// A parsed SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted, quoted and wildcard forms.
    ///
    /// - Dotted: `schema.table.column`
    /// - Quoted: `"CamelCase"."UserTable"` or `` `CamelCase` ``
    /// - Mixed: `public."UserTable".id`
    /// - Wildcard: `*`, `u.*`
    pub fn parse(s: &str) -> SqlResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SqlError::invalid("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(SqlError::invalid("Identifier cannot contain NUL character"));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                if matches!(parts.last(), Some(IdentPart::Wildcard)) {
                    return Err(SqlError::invalid(format!(
                        "Wildcard must be the last identifier part in '{s}'"
                    )));
                }
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(SqlError::invalid(format!(
                                "Trailing '.' in identifier '{s}'"
                            )));
                        }
                    }
                    Some(c) => {
                        return Err(SqlError::invalid(format!(
                            "Expected '.' between identifier parts, got '{c}' in '{s}'"
                        )));
                    }
                    None => break,
                }
            }

            match chars.peek() {
                Some(&q) if q == '"' || q == '`' => {
                    chars.next();
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some(c) if c == q => {
                                // Doubled quote is an escaped quote.
                                if chars.peek() == Some(&q) {
                                    chars.next();
                                    name.push(q);
                                } else {
                                    break;
                                }
                            }
                            Some(c) => name.push(c),
                            None => {
                                return Err(SqlError::invalid(format!(
                                    "Unclosed quoted identifier '{s}'"
                                )));
                            }
                        }
                    }
                    if name.is_empty() {
                        return Err(SqlError::invalid("Empty quoted identifier"));
                    }
                    parts.push(IdentPart::Name(name));
                    continue;
                }
                Some('*') => {
                    chars.next();
                    parts.push(IdentPart::Wildcard);
                    continue;
                }
                _ => {}
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let valid = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !valid {
                    return Err(SqlError::invalid(format!(
                        "Invalid character '{c}' in identifier '{s}'"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(SqlError::invalid(format!("Empty identifier segment in '{s}'")));
            }
            parts.push(IdentPart::Name(name));
        }

        Ok(Self { parts })
    }

    /// `true` when the identifier is `*` or ends in `.*`.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.parts.last(), Some(IdentPart::Wildcard))
    }

    /// Render the identifier, quoting every named part with `quote`.
    pub fn to_sql(&self, quote: char) -> String {
        let mut out = String::new();
        self.write_sql(quote, &mut out);
        out
    }

    pub(crate) fn write_sql(&self, quote: char, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Wildcard => out.push('*'),
                IdentPart::Name(s) => {
                    out.push(quote);
                    for ch in s.chars() {
                        if ch == quote {
                            out.push(quote);
                        }
                        out.push(ch);
                    }
                    out.push(quote);
                }
            }
        }
    }
}

/// Parse and quote `name` in one step.
pub fn quote_identifier(name: &str, quote: char) -> SqlResult<String> {
    Ok(Ident::parse(name)?.to_sql(quote))
}

/// Split `"users u"` / `"users AS u"` into table and alias.
pub(crate) fn split_alias(spec: &str) -> (String, Option<String>) {
    let words: Vec<&str> = spec.split_whitespace().collect();
    match words.as_slice() {
        [table, kw, alias] if kw.eq_ignore_ascii_case("as") => {
            (table.to_string(), Some(alias.to_string()))
        }
        [table, alias] => (table.to_string(), Some(alias.to_string())),
        _ => (spec.trim().to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("users").unwrap();
        assert_eq!(ident.to_sql('"'), r#""users""#);
        assert_eq!(ident.to_sql('`'), "`users`");
    }

    #[test]
    fn ident_dotted() {
        let ident = Ident::parse("public.users").unwrap();
        assert_eq!(ident.to_sql('"'), r#""public"."users""#);
    }

    #[test]
    fn ident_requoted_for_mysql() {
        let ident = Ident::parse(r#"public."UserTable".id"#).unwrap();
        assert_eq!(ident.to_sql('`'), "`public`.`UserTable`.`id`");
    }

    #[test]
    fn ident_backtick_input() {
        let ident = Ident::parse("`order`").unwrap();
        assert_eq!(ident.to_sql('"'), r#""order""#);
    }

    #[test]
    fn ident_escapes_quote_char() {
        let ident = Ident::parse(r#""has""quote""#).unwrap();
        assert_eq!(ident.to_sql('"'), r#""has""quote""#);
        assert_eq!(ident.to_sql('`'), r#"`has"quote`"#);
    }

    #[test]
    fn ident_wildcards() {
        assert_eq!(Ident::parse("*").unwrap().to_sql('"'), "*");
        let qualified = Ident::parse("u.*").unwrap();
        assert!(qualified.is_wildcard());
        assert_eq!(qualified.to_sql('`'), "`u`.*");
    }

    #[test]
    fn ident_rejects_wildcard_in_middle() {
        assert!(Ident::parse("*.id").is_err());
    }

    #[test]
    fn ident_with_dollar() {
        assert_eq!(Ident::parse("my_var$1").unwrap().to_sql('"'), r#""my_var$1""#);
    }

    #[test]
    fn ident_rejects_bad_input() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::parse("1table").is_err());
        assert!(Ident::parse("my table").is_err());
        assert!(Ident::parse("schema..table").is_err());
        assert!(Ident::parse("schema.").is_err());
        assert!(Ident::parse(r#""unclosed"#).is_err());
        assert!(Ident::parse("users; DROP TABLE x").is_err());
    }

    #[test]
    fn split_alias_forms() {
        assert_eq!(split_alias("users"), ("users".to_string(), None));
        assert_eq!(
            split_alias("users u"),
            ("users".to_string(), Some("u".to_string()))
        );
        assert_eq!(
            split_alias("users AS u"),
            ("users".to_string(), Some("u".to_string()))
        );
    }
}
