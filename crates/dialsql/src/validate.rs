//! Pattern-based rejection of unsafe text on the inlining path.
//!
//! Two validators with different strictness:
//!
//! - [`ExpressionValidator`]: for caller-trusted raw SQL. Blocks comment-based
//!   context escapes, statement chaining and file I/O functions.
//! - [`ValueValidator`]: for arbitrary string literals. Adds DML/DDL keywords,
//!   privilege manipulation, timing functions, system catalogs, hex literals and
//!   UNION SELECT.
//!
//! Both run a cheap character-class pre-check first and accept immediately when
//! no suspicious character is present. Prepared output never inlines values, so
//! neither validator runs for bound parameters.

use crate::error::{SqlError, SqlResult};
use regex::{Regex, RegexBuilder};
use std::fmt;

/// The class of pattern that caused a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionPattern {
    Comment,
    StatementChaining,
    FileAccess,
    UnionSelect,
    Keyword,
    Privilege,
    Timing,
    SystemCatalog,
    HexLiteral,
}

impl InjectionPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            InjectionPattern::Comment => "comment",
            InjectionPattern::StatementChaining => "statement chaining",
            InjectionPattern::FileAccess => "file access",
            InjectionPattern::UnionSelect => "union select",
            InjectionPattern::Keyword => "sql keyword",
            InjectionPattern::Privilege => "privilege",
            InjectionPattern::Timing => "timing",
            InjectionPattern::SystemCatalog => "system catalog",
            InjectionPattern::HexLiteral => "hex literal",
        }
    }
}

impl fmt::Display for InjectionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const EXPRESSION_TRIGGERS: &[char] = &['-', '/', '#', ';', '(', '\''];

const VALUE_TRIGGERS: &[char] = &[
    '-', '/', '#', ';', '(', ')', '\'', '"', '\\', '=', '*', '%', '`',
];

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("invalid built-in validator regex")
}

fn reject(validator: &'static str, pattern: InjectionPattern, text: &str) -> SqlError {
    tracing::warn!(
        target: "dialsql.guard",
        validator,
        pattern = %pattern,
        len = text.len(),
        "rejected unsafe text"
    );
    SqlError::unsafe_value(pattern, text)
}

/// Permissive validator for raw SQL expressions.
#[derive(Debug, Clone)]
pub struct ExpressionValidator {
    comment: Regex,
    chaining: Regex,
    file_access: Regex,
}

impl Default for ExpressionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionValidator {
    pub fn new() -> Self {
        Self {
            // `#>` / `#>>` are PostgreSQL JSON operators, not comments.
            comment: compile(r"--|/\*|\*/|#(?:$|[^>])"),
            chaining: compile(
                r";\s*(?:select|insert|update|delete|drop|create|alter|truncate|replace|merge|grant|revoke|exec|execute|call|declare|shutdown|attach|detach|pragma|with)\b",
            ),
            file_access: compile(
                r"\b(?:load_file|pg_read_file|pg_read_binary_file|pg_ls_dir|pg_stat_file|lo_import|lo_export|load_extension|readfile|writefile)\s*\(|\binto\s+(?:out|dump)file\b",
            ),
        }
    }

    pub fn validate(&self, text: &str) -> SqlResult<()> {
        if !text.contains(EXPRESSION_TRIGGERS) {
            return Ok(());
        }
        self.check(text).map_err(|p| reject("expression", p, text))
    }

    fn check(&self, text: &str) -> Result<(), InjectionPattern> {
        if self.comment.is_match(text) {
            return Err(InjectionPattern::Comment);
        }
        if self.chaining.is_match(text) {
            return Err(InjectionPattern::StatementChaining);
        }
        if self.file_access.is_match(text) {
            return Err(InjectionPattern::FileAccess);
        }
        Ok(())
    }
}

/// Strict validator for string literals.
#[derive(Debug, Clone)]
pub struct ValueValidator {
    base: ExpressionValidator,
    union_select: Regex,
    keyword: Regex,
    privilege: Regex,
    timing: Regex,
    catalog: Regex,
    hex: Regex,
}

impl Default for ValueValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueValidator {
    pub fn new() -> Self {
        Self {
            base: ExpressionValidator::new(),
            union_select: compile(r"\bunion\b(?:\s+all|\s+distinct)?\s*\(?\s*select\b"),
            keyword: compile(
                r"\b(?:insert\s+into|delete\s+from|update\s+\S+\s+set|drop\s+(?:table|database|schema|index|view|user)|create\s+(?:table|database|schema|index|view|trigger|function)|alter\s+(?:table|database|schema)|truncate\s+(?:table\s+)?\S+|select\s[\s\S]*\bfrom|exec(?:ute)?\s*\()",
            ),
            privilege: compile(
                r"\b(?:grant|revoke)\s[\s\S]*\b(?:to|from|on)\b|\b(?:create|alter)\s+(?:user|role)\b|\bset\s+role\b",
            ),
            timing: compile(
                r"\b(?:sleep|benchmark|pg_sleep|pg_sleep_for|pg_sleep_until|randomblob)\s*\(|\bwaitfor\s+delay\b",
            ),
            catalog: compile(
                r"\b(?:information_schema|pg_catalog|pg_shadow|pg_authid|pg_user|mysql\s*\.\s*user|sqlite_master|sqlite_schema|sqlite_temp_master)\b",
            ),
            hex: compile(r"\b0x[0-9a-f]{2,}\b"),
        }
    }

    pub fn validate(&self, text: &str) -> SqlResult<()> {
        if !Self::suspicious(text) {
            return Ok(());
        }
        self.check(text).map_err(|p| reject("value", p, text))
    }

    fn suspicious(text: &str) -> bool {
        text.contains(VALUE_TRIGGERS) || text.contains("0x") || text.contains("0X")
    }

    fn check(&self, text: &str) -> Result<(), InjectionPattern> {
        self.base.check(text)?;
        let rules = [
            (&self.union_select, InjectionPattern::UnionSelect),
            (&self.keyword, InjectionPattern::Keyword),
            (&self.privilege, InjectionPattern::Privilege),
            (&self.timing, InjectionPattern::Timing),
            (&self.catalog, InjectionPattern::SystemCatalog),
            (&self.hex, InjectionPattern::HexLiteral),
        ];
        for (re, pattern) in rules {
            if re.is_match(text) {
                return Err(pattern);
            }
        }
        Ok(())
    }
}

/// Both validators, constructed once and shared by reference with every
/// statement builder of a compiler.
#[derive(Debug, Clone, Default)]
pub struct Validators {
    pub expression: ExpressionValidator,
    pub value: ValueValidator,
}

impl Validators {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_of(result: SqlResult<()>) -> Option<InjectionPattern> {
        result.err().and_then(|e| e.unsafe_pattern())
    }

    #[test]
    fn expression_allows_ordinary_sql() {
        let v = ExpressionValidator::new();
        assert!(v.validate("COUNT(*) + 1").is_ok());
        assert!(v.validate("COALESCE(a, 'x')").is_ok());
        assert!(v.validate("price * 1.1").is_ok());
        assert!(v.validate(r#"data #>> '{a,b}'"#).is_ok());
        assert!(v.validate("a - b").is_ok());
    }

    #[test]
    fn expression_blocks_comments_and_chaining() {
        let v = ExpressionValidator::new();
        assert_eq!(pattern_of(v.validate("1 -- tail")), Some(InjectionPattern::Comment));
        assert_eq!(pattern_of(v.validate("1 /* x */")), Some(InjectionPattern::Comment));
        assert_eq!(pattern_of(v.validate("1 #")), Some(InjectionPattern::Comment));
        assert_eq!(
            pattern_of(v.validate("1; DROP TABLE users")),
            Some(InjectionPattern::StatementChaining)
        );
        assert_eq!(
            pattern_of(v.validate("LOAD_FILE('/etc/passwd')")),
            Some(InjectionPattern::FileAccess)
        );
    }

    #[test]
    fn expression_is_permissive_about_keywords() {
        let v = ExpressionValidator::new();
        assert!(v.validate("(SELECT MAX(id) FROM t)").is_ok());
    }

    #[test]
    fn value_precheck_short_circuits() {
        let v = ValueValidator::new();
        assert!(v.validate("please select an option from the list").is_ok());
        assert!(v.validate("O'Brien").is_ok());
        assert!(v.validate("50% off").is_ok());
    }

    #[test]
    fn value_blocks_injection_classes() {
        let v = ValueValidator::new();
        assert_eq!(
            pattern_of(v.validate("a; DROP TABLE t--")),
            Some(InjectionPattern::Comment)
        );
        assert_eq!(
            pattern_of(v.validate("' UNION SELECT password FROM users")),
            Some(InjectionPattern::UnionSelect)
        );
        assert_eq!(
            pattern_of(v.validate("x' OR id IN (SELECT id FROM admins)")),
            Some(InjectionPattern::Keyword)
        );
        assert_eq!(
            pattern_of(v.validate("'; GRANT ALL ON db TO evil")),
            Some(InjectionPattern::StatementChaining)
        );
        assert_eq!(
            pattern_of(v.validate("x' AND GRANT ALL ON db TO evil")),
            Some(InjectionPattern::Privilege)
        );
        assert_eq!(
            pattern_of(v.validate("1' AND SLEEP(5)")),
            Some(InjectionPattern::Timing)
        );
        assert_eq!(
            pattern_of(v.validate("x' AND information_schema.tables")),
            Some(InjectionPattern::SystemCatalog)
        );
        assert_eq!(
            pattern_of(v.validate("0x41424344")),
            Some(InjectionPattern::HexLiteral)
        );
    }
}
