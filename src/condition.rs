//! Boolean guard expressions over installer properties
//!
//! A [`Condition`] is an immutable expression tree attached to an action to
//! decide at install time whether that action fires. Guard evaluation itself
//! happens in the emitted installer; this module only models, parses, and
//! composes the expressions.
//!
//! # Grammar
//!
//! ```text
//! expression := or-expr
//! or-expr    := and-expr ( OR and-expr )*
//! and-expr   := unary ( AND unary )*
//! unary      := NOT unary | primary
//! primary    := '(' expression ')'
//!             | property                      (true when the property is set)
//!             | property ('=' | '<>') value
//! value      := '"' chars '"' | integer | property
//! ```
//!
//! `AND`/`OR`/`NOT` are matched case-insensitively. Anything outside the
//! grammar is rejected at parse time; nothing is silently coerced.

use crate::error::{Result, SequenceError};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Property the built-in navigation guards inspect. The routine shown by
/// the spliced custom action stores the pressed button here before the
/// transition's guarded actions run.
pub const NAVIGATION_PROPERTY: &str = "Custom_UI_Command";

/// Comparison operator inside a guard expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => f.write_str("="),
            Self::Ne => f.write_str("<>"),
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Property(String),
    Literal(String),
    Number(i64),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(name) => f.write_str(name),
            Self::Literal(value) => write!(f, "\"{value}\""),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    /// Bare property reference: true when the property has a value
    Test(String),
    Compare {
        prop: String,
        op: CmpOp,
        rhs: Operand,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Precedence for rendering: OR < AND < NOT < atoms
    fn precedence(&self) -> u8 {
        match self {
            Self::Or(..) => 1,
            Self::And(..) => 2,
            Self::Not(_) => 3,
            Self::Test(_) | Self::Compare { .. } => 4,
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        let prec = self.precedence();
        let parens = prec < parent;
        if parens {
            f.write_str("(")?;
        }
        match self {
            Self::Test(name) => f.write_str(name)?,
            Self::Compare { prop, op, rhs } => write!(f, "{prop} {op} {rhs}")?,
            Self::Not(inner) => {
                f.write_str("NOT ")?;
                inner.render(f, prec)?;
            }
            Self::And(lhs, rhs) => {
                lhs.render(f, prec)?;
                f.write_str(" AND ")?;
                rhs.render(f, prec)?;
            }
            Self::Or(lhs, rhs) => {
                lhs.render(f, prec)?;
                f.write_str(" OR ")?;
                rhs.render(f, prec)?;
            }
        }
        if parens {
            f.write_str(")")?;
        }
        Ok(())
    }

    fn collect_properties<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Self::Test(name) => {
                out.insert(name);
            }
            Self::Compare { prop, rhs, .. } => {
                out.insert(prop);
                if let Operand::Property(name) = rhs {
                    out.insert(name);
                }
            }
            Self::Not(inner) => inner.collect_properties(out),
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.collect_properties(out);
                rhs.collect_properties(out);
            }
        }
    }
}

/// An immutable boolean expression over installer properties.
///
/// Conditions are created by [`Condition::parse`] or one of the built-in
/// guard constructors, and composed with [`and`](Self::and),
/// [`or`](Self::or) and [`not`](Self::not); every composition yields a new
/// value. Rendering via `Display` produces the canonical expression text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    root: Expr,
}

impl Condition {
    /// Parse an expression, rejecting anything outside the grammar.
    ///
    /// # Errors
    ///
    /// `MalformedExpression` with the offending input and a reason.
    pub fn parse(expression: &str) -> Result<Self> {
        let tokens = tokenize(expression)?;
        if tokens.is_empty() {
            return Err(SequenceError::malformed(expression, "empty expression"));
        }
        let mut parser = Parser {
            expression,
            tokens,
            pos: 0,
        };
        let root = parser.or_expr()?;
        if let Some(token) = parser.peek() {
            return Err(SequenceError::malformed(
                expression,
                format!("trailing input starting at {}", token.describe()),
            ));
        }
        Ok(Self { root })
    }

    /// Guard matching "the Next button was pressed in the injected dialog"
    pub fn next_pressed() -> Self {
        Self::navigation_command("next")
    }

    /// Guard matching "the Back button was pressed in the injected dialog"
    pub fn back_pressed() -> Self {
        Self::navigation_command("back")
    }

    /// Guard matching "the Cancel button was pressed in the injected dialog"
    pub fn cancel_pressed() -> Self {
        Self::navigation_command("cancel")
    }

    fn navigation_command(command: &str) -> Self {
        Self {
            root: Expr::Compare {
                prop: NAVIGATION_PROPERTY.to_string(),
                op: CmpOp::Eq,
                rhs: Operand::Literal(command.to_string()),
            },
        }
    }

    /// Conjunction; yields a new condition
    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        Self {
            root: Expr::And(Box::new(self.root), Box::new(other.root)),
        }
    }

    /// Disjunction; yields a new condition
    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        Self {
            root: Expr::Or(Box::new(self.root), Box::new(other.root)),
        }
    }

    /// Negation; yields a new condition
    #[must_use]
    pub fn not(self) -> Self {
        Self {
            root: Expr::Not(Box::new(self.root)),
        }
    }

    /// Every property name the expression references, deduplicated.
    ///
    /// Used to auto-register the properties a guard requires when the
    /// guarded action is installed into a sequence.
    pub fn distinct_properties(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.root.collect_properties(&mut out);
        out
    }

    /// Conservative mutual-exclusion check: true only when both conditions
    /// are equality tests on the same property against different constants,
    /// so at most one of them can hold at runtime. Returns false whenever
    /// exclusivity cannot be proven structurally.
    pub fn excludes(&self, other: &Condition) -> bool {
        match (&self.root, &other.root) {
            (
                Expr::Compare {
                    prop: p1,
                    op: CmpOp::Eq,
                    rhs: r1,
                },
                Expr::Compare {
                    prop: p2,
                    op: CmpOp::Eq,
                    rhs: r2,
                },
            ) => {
                let constant = |rhs: &Operand| !matches!(rhs, Operand::Property(_));
                p1 == p2 && constant(r1) && constant(r2) && r1 != r2
            }
            _ => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.render(f, 0)
    }
}

// The emitter consumes conditions as expression text, so the serialized
// form is the canonical rendering rather than the internal tree.
impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Tokenizer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Number(i64),
    Eq,
    Ne,
    LParen,
    RParen,
    And,
    Or,
    Not,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("'{name}'"),
            Self::Str(value) => format!("\"{value}\""),
            Self::Number(value) => format!("'{value}'"),
            Self::Eq => "'='".to_string(),
            Self::Ne => "'<>'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::And => "'AND'".to_string(),
            Self::Or => "'OR'".to_string(),
            Self::Not => "'NOT'".to_string(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'>') {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    return Err(SequenceError::malformed(
                        expression,
                        "'<' is only valid as part of '<>'",
                    ));
                }
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => value.push(c),
                        None => {
                            return Err(SequenceError::malformed(
                                expression,
                                "unterminated string literal",
                            ));
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = digits.parse::<i64>().map_err(|_| {
                    SequenceError::malformed(expression, format!("integer '{digits}' out of range"))
                })?;
                tokens.push(Token::Number(value));
            }
            c if is_ident_start(c) => {
                let mut name = String::new();
                while let Some(&i) = chars.peek() {
                    if is_ident_continue(i) {
                        name.push(i);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let token = if name.eq_ignore_ascii_case("AND") {
                    Token::And
                } else if name.eq_ignore_ascii_case("OR") {
                    Token::Or
                } else if name.eq_ignore_ascii_case("NOT") {
                    Token::Not
                } else {
                    Token::Ident(name)
                };
                tokens.push(token);
            }
            c => {
                return Err(SequenceError::malformed(
                    expression,
                    format!("unexpected character '{c}'"),
                ));
            }
        }
    }

    Ok(tokens)
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    expression: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn malformed(&self, reason: impl Into<String>) -> SequenceError {
        SequenceError::malformed(self.expression, reason)
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.next();
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Not) {
            self.next();
            let inner = self.unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.or_expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(token) => {
                        Err(self.malformed(format!("expected ')', found {}", token.describe())))
                    }
                    None => Err(self.malformed("expected ')' before end of expression")),
                }
            }
            Some(Token::Ident(prop)) => {
                let op = match self.peek() {
                    Some(Token::Eq) => CmpOp::Eq,
                    Some(Token::Ne) => CmpOp::Ne,
                    _ => return Ok(Expr::Test(prop)),
                };
                self.next();
                let rhs = match self.next() {
                    Some(Token::Ident(name)) => Operand::Property(name),
                    Some(Token::Str(value)) => Operand::Literal(value),
                    Some(Token::Number(value)) => Operand::Number(value),
                    Some(token) => {
                        return Err(self.malformed(format!(
                            "expected a value after '{op}', found {}",
                            token.describe()
                        )));
                    }
                    None => {
                        return Err(self.malformed(format!("expected a value after '{op}'")));
                    }
                };
                Ok(Expr::Compare { prop, op, rhs })
            }
            Some(token) => Err(self.malformed(format!(
                "expected a property name or '(', found {}",
                token.describe()
            ))),
            None => Err(self.malformed("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comparison() {
        let cond = Condition::parse("LicenseAccepted = \"1\"").unwrap();
        assert_eq!(cond.to_string(), "LicenseAccepted = \"1\"");
    }

    #[test]
    fn test_parse_property_test() {
        let cond = Condition::parse("Installed").unwrap();
        assert_eq!(cond.to_string(), "Installed");
        assert_eq!(cond.distinct_properties().into_iter().collect::<Vec<_>>(), vec!["Installed"]);
    }

    #[test]
    fn test_parse_number_comparison_stays_unquoted() {
        let cond = Condition::parse("MsiNTProductType = 1").unwrap();
        assert_eq!(cond.to_string(), "MsiNTProductType = 1");
    }

    #[test]
    fn test_parse_keywords_case_insensitive() {
        let cond = Condition::parse("not Installed and Quick").unwrap();
        assert_eq!(cond.to_string(), "NOT Installed AND Quick");
    }

    #[test]
    fn test_parse_precedence_and_parens() {
        let cond = Condition::parse("A AND (B OR C)").unwrap();
        assert_eq!(cond.to_string(), "A AND (B OR C)");

        let cond = Condition::parse("A AND B OR C").unwrap();
        assert_eq!(cond.to_string(), "A AND B OR C");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Condition::parse("").is_err());
        assert!(Condition::parse("   ").is_err());
        assert!(Condition::parse("A = ").is_err());
        assert!(Condition::parse("= \"1\"").is_err());
        assert!(Condition::parse("(A").is_err());
        assert!(Condition::parse("A)").is_err());
        assert!(Condition::parse("A & B").is_err());
        assert!(Condition::parse("A < B").is_err());
        assert!(Condition::parse("A = \"unterminated").is_err());
        assert!(Condition::parse("A B").is_err());
    }

    #[test]
    fn test_parse_error_carries_expression_and_reason() {
        let err = Condition::parse("A = ").unwrap_err();
        match err {
            SequenceError::MalformedExpression { expression, reason } => {
                assert_eq!(expression, "A = ");
                assert!(reason.contains("expected a value"), "reason was: {reason}");
            }
            other => panic!("expected MalformedExpression, got {other:?}"),
        }
    }

    #[test]
    fn test_composition_yields_new_values() {
        let a = Condition::parse("A = \"1\"").unwrap();
        let b = Condition::parse("B").unwrap();
        let both = a.clone().and(b.clone());
        assert_eq!(both.to_string(), "A = \"1\" AND B");
        // Originals are unchanged values
        assert_eq!(a.to_string(), "A = \"1\"");

        let negated = both.not();
        assert_eq!(negated.to_string(), "NOT (A = \"1\" AND B)");

        let either = a.or(b);
        assert_eq!(either.to_string(), "A = \"1\" OR B");
    }

    #[test]
    fn test_distinct_properties_deduplicates() {
        let cond = Condition::parse("A = \"1\" AND (A <> \"2\" OR B = C)").unwrap();
        let props: Vec<&str> = cond.distinct_properties().into_iter().collect();
        assert_eq!(props, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_navigation_guards_reference_command_property() {
        for cond in [
            Condition::next_pressed(),
            Condition::back_pressed(),
            Condition::cancel_pressed(),
        ] {
            let props: Vec<&str> = cond.distinct_properties().into_iter().collect();
            assert_eq!(props, vec![NAVIGATION_PROPERTY]);
        }
        assert_eq!(
            Condition::next_pressed().to_string(),
            "Custom_UI_Command = \"next\""
        );
    }

    #[test]
    fn test_navigation_guards_are_mutually_exclusive() {
        let next = Condition::next_pressed();
        let back = Condition::back_pressed();
        let cancel = Condition::cancel_pressed();

        assert!(next.excludes(&back));
        assert!(next.excludes(&cancel));
        assert!(back.excludes(&cancel));
        assert!(!next.excludes(&next.clone()));
    }

    #[test]
    fn test_excludes_is_conservative() {
        let a = Condition::parse("A = \"1\"").unwrap();
        let b = Condition::parse("B = \"2\"").unwrap();
        // Different properties: cannot prove exclusivity
        assert!(!a.excludes(&b));

        let p = Condition::parse("A = B").unwrap();
        let q = Condition::parse("A = C").unwrap();
        // Property-valued comparisons: cannot prove exclusivity
        assert!(!p.excludes(&q));
    }

    #[test]
    fn test_parse_render_roundtrip() {
        for expr in [
            "A",
            "A = \"1\"",
            "A <> \"yes\"",
            "NOT A",
            "A AND B",
            "A OR B AND C",
            "NOT (A OR B)",
            "Custom_UI_Command = \"next\"",
            "VersionNT = 600",
        ] {
            let cond = Condition::parse(expr).unwrap();
            assert_eq!(cond.to_string(), expr);
            // Rendering parses back to an equal tree
            let reparsed = Condition::parse(&cond.to_string()).unwrap();
            assert_eq!(reparsed, cond);
        }
    }

    #[test]
    fn test_serializes_as_expression_text() {
        let cond = Condition::next_pressed();
        let json = serde_json::to_string(&cond).unwrap();
        assert_eq!(json, "\"Custom_UI_Command = \\\"next\\\"\"");
    }
}
