//! Inline expression evaluator
//!
//! Expands templated strings such as `ds_${0..1}.t_order_${[0, 1, 2]}` into
//! concrete strings. The same engine produces actual data node topologies
//! and the targets of inline sharding strategies.
//!
//! # Syntax
//!
//! ```text
//! expression  := segment (',' segment)*
//! segment     := (literal | placeholder)*
//! placeholder := ('${' | '$->{') body '}'
//! body        := INT '..' INT          inclusive range
//!              | INT '..<' INT         half-open range
//!              | '[' item (',' item)* ']'
//!              | item (',' item)+
//!              | arithmetic            + - * / % ( ), variables, 'strings'
//! ```
//!
//! Multiple placeholders in one segment expand to their cross product,
//! first placeholder outermost.

use std::collections::{BTreeSet, HashMap};

use crate::error::ConfigError;
use crate::types::ShardingKey;

/// Upper bound on the strings one expression may expand to
pub const MAX_EXPANSION: usize = 100_000;

/// Evaluate an expression without variable bindings
///
/// Blank input yields an empty sequence.
pub fn evaluate(expression: &str) -> Result<Vec<String>, ConfigError> {
    InlineExpression::parse(expression)?.evaluate()
}

/// A parsed inline expression
#[derive(Debug, Clone, PartialEq)]
pub struct InlineExpression {
    raw: String,
    segments: Vec<Vec<Part>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Literal(String),
    Placeholder(Placeholder),
}

#[derive(Debug, Clone, PartialEq)]
enum Placeholder {
    Range { start: i64, end: i64, inclusive: bool },
    List(Vec<String>),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Int(i64),
    Str(String),
    Var(String),
    Neg(Box<Expr>),
    Binary(Op, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Str(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<&ShardingKey> for Value {
    fn from(key: &ShardingKey) -> Self {
        match key {
            ShardingKey::Int(v) => Value::Int(*v),
            ShardingKey::Text(v) => Value::Str(v.clone()),
        }
    }
}

impl InlineExpression {
    /// Parse an expression, reporting syntax errors eagerly
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let segments = split_segments(expression)?
            .into_iter()
            .map(|segment| parse_segment(expression, segment))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: expression.to_string(),
            segments,
        })
    }

    /// Raw expression text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the expression expands to nothing
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Variable names referenced by arithmetic placeholders
    pub fn variables(&self) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        for part in self.segments.iter().flatten() {
            if let Part::Placeholder(Placeholder::Expr(expr)) = part {
                collect_variables(expr, &mut result);
            }
        }
        result
    }

    /// Expand without bindings
    pub fn evaluate(&self) -> Result<Vec<String>, ConfigError> {
        self.evaluate_with(&HashMap::new())
    }

    /// Expand with variables bound to sharding values
    pub fn evaluate_with(&self, bindings: &HashMap<String, ShardingKey>) -> Result<Vec<String>, ConfigError> {
        let mut result = Vec::new();
        for segment in &self.segments {
            let mut expanded = vec![String::new()];
            for part in segment {
                match part {
                    Part::Literal(text) => {
                        for each in expanded.iter_mut() {
                            each.push_str(text);
                        }
                    }
                    Part::Placeholder(placeholder) => {
                        let values = self.expand(placeholder, bindings)?;
                        if expanded.len().saturating_mul(values.len()) > MAX_EXPANSION {
                            return Err(self.error(format!("expands to more than {} values", MAX_EXPANSION)));
                        }
                        let mut next = Vec::with_capacity(expanded.len() * values.len());
                        for prefix in &expanded {
                            for value in &values {
                                next.push(format!("{}{}", prefix, value));
                            }
                        }
                        expanded = next;
                    }
                }
            }
            result.extend(expanded);
            if result.len() > MAX_EXPANSION {
                return Err(self.error(format!("expands to more than {} values", MAX_EXPANSION)));
            }
        }
        Ok(result)
    }

    fn expand(&self, placeholder: &Placeholder, bindings: &HashMap<String, ShardingKey>) -> Result<Vec<String>, ConfigError> {
        match placeholder {
            Placeholder::Range { start, end, inclusive } => self.expand_range(*start, *end, *inclusive),
            Placeholder::List(items) => Ok(items.clone()),
            Placeholder::Expr(expr) => Ok(vec![self.eval(expr, bindings)?.to_string()]),
        }
    }

    fn eval(&self, expr: &Expr, bindings: &HashMap<String, ShardingKey>) -> Result<Value, ConfigError> {
        match expr {
            Expr::Int(v) => Ok(Value::Int(*v)),
            Expr::Str(v) => Ok(Value::Str(v.clone())),
            Expr::Var(name) => bindings
                .get(name)
                .map(Value::from)
                .ok_or_else(|| self.error(format!("unknown variable '{}'", name))),
            Expr::Neg(inner) => match self.eval(inner, bindings)? {
                Value::Int(v) => v
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| self.error("integer overflow")),
                Value::Str(v) => Err(self.error(format!("cannot negate '{}'", v))),
            },
            Expr::Binary(op, left, right) => {
                let left = self.eval(left, bindings)?;
                let right = self.eval(right, bindings)?;
                self.apply(*op, left, right)
            }
        }
    }

    fn apply(&self, op: Op, left: Value, right: Value) -> Result<Value, ConfigError> {
        match (op, left, right) {
            (Op::Add, Value::Int(a), Value::Int(b)) => self.checked(a.checked_add(b)),
            (Op::Add, a, b) => Ok(Value::Str(format!("{}{}", a, b))),
            (Op::Sub, Value::Int(a), Value::Int(b)) => self.checked(a.checked_sub(b)),
            (Op::Mul, Value::Int(a), Value::Int(b)) => self.checked(a.checked_mul(b)),
            (Op::Div | Op::Rem, Value::Int(_), Value::Int(0)) => Err(self.error("division by zero")),
            (Op::Div, Value::Int(a), Value::Int(b)) => self.checked(a.checked_div(b)),
            (Op::Rem, Value::Int(a), Value::Int(b)) => self.checked(a.checked_rem(b)),
            (_, a, b) => Err(self.error(format!("non-numeric operands '{}' and '{}'", a, b))),
        }
    }

    fn expand_range(&self, start: i64, end: i64, inclusive: bool) -> Result<Vec<String>, ConfigError> {
        let span = (i128::from(end) - i128::from(start)).unsigned_abs() + u128::from(inclusive);
        if span > MAX_EXPANSION as u128 {
            return Err(self.error(format!("range {}..{} has more than {} values", start, end, MAX_EXPANSION)));
        }

        let values: Vec<i64> = match (start <= end, inclusive) {
            (true, true) => (start..=end).collect(),
            (true, false) => (start..end).collect(),
            (false, true) => (end..=start).rev().collect(),
            (false, false) => (end + 1..=start).rev().collect(),
        };
        Ok(values.into_iter().map(|v| v.to_string()).collect())
    }

    fn checked(&self, value: Option<i64>) -> Result<Value, ConfigError> {
        value.map(Value::Int).ok_or_else(|| self.error("integer overflow"))
    }

    fn error(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::invalid_expression(&self.raw, reason)
    }
}

fn collect_variables(expr: &Expr, out: &mut BTreeSet<String>) {
    match expr {
        Expr::Var(name) => {
            out.insert(name.clone());
        }
        Expr::Neg(inner) => collect_variables(inner, out),
        Expr::Binary(_, left, right) => {
            collect_variables(left, out);
            collect_variables(right, out);
        }
        Expr::Int(_) | Expr::Str(_) => {}
    }
}

/// Length of the placeholder opener at `pos`, if any
fn opener_len(bytes: &[u8], pos: usize) -> Option<usize> {
    if bytes[pos] != b'$' {
        return None;
    }
    if bytes.get(pos + 1) == Some(&b'{') {
        Some(2)
    } else if bytes[pos..].starts_with(b"$->{") {
        Some(4)
    } else {
        None
    }
}

/// Index of the `}` closing a placeholder whose body starts at `from`
///
/// Braces inside quoted literals do not count.
fn closing_brace(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match (quote, b) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'\'' | b'"') => quote = Some(b),
            (None, b'{') => depth += 1,
            (None, b'}') if depth == 0 => return Some(i),
            (None, b'}') => depth -= 1,
            _ => {}
        }
    }
    None
}

fn split_segments(expression: &str) -> Result<Vec<&str>, ConfigError> {
    let bytes = expression.as_bytes();
    let mut result = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        if let Some(len) = opener_len(bytes, pos) {
            let close = closing_brace(bytes, pos + len)
                .ok_or_else(|| ConfigError::invalid_expression(expression, "unterminated placeholder"))?;
            pos = close + 1;
            continue;
        }
        if bytes[pos] == b',' {
            result.push(&expression[start..pos]);
            start = pos + 1;
        }
        pos += 1;
    }
    result.push(&expression[start..]);

    Ok(result
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect())
}

fn parse_segment(expression: &str, segment: &str) -> Result<Vec<Part>, ConfigError> {
    let bytes = segment.as_bytes();
    let mut parts = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        if let Some(len) = opener_len(bytes, pos) {
            if literal_start < pos {
                parts.push(Part::Literal(segment[literal_start..pos].to_string()));
            }
            let close = closing_brace(bytes, pos + len)
                .ok_or_else(|| ConfigError::invalid_expression(expression, "unterminated placeholder"))?;
            let body = &segment[pos + len..close];
            parts.push(Part::Placeholder(parse_placeholder(expression, body)?));
            pos = close + 1;
            literal_start = pos;
            continue;
        }
        pos += 1;
    }
    if literal_start < bytes.len() {
        parts.push(Part::Literal(segment[literal_start..].to_string()));
    }
    Ok(parts)
}

fn parse_placeholder(expression: &str, body: &str) -> Result<Placeholder, ConfigError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ConfigError::invalid_expression(expression, "empty placeholder"));
    }

    if let Some(inner) = body.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
        return parse_list(expression, inner);
    }

    if !body.starts_with(|c| c == '\'' || c == '"') {
        if let Some((lo, hi)) = body.split_once("..") {
            let (hi, inclusive) = match hi.strip_prefix('<') {
                Some(hi) => (hi, false),
                None => (hi, true),
            };
            let parse = |s: &str| {
                s.trim().parse::<i64>().map_err(|_| {
                    ConfigError::invalid_expression(expression, format!("invalid range bound '{}'", s.trim()))
                })
            };
            return Ok(Placeholder::Range {
                start: parse(lo)?,
                end: parse(hi)?,
                inclusive,
            });
        }
    }

    if split_top_level_commas(body).len() > 1 {
        return parse_list(expression, body);
    }

    let tokens = tokenize(expression, body)?;
    let mut parser = ExprParser { expression, tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(ConfigError::invalid_expression(expression, format!("unexpected input in '{}'", body)));
    }
    Ok(Placeholder::Expr(expr))
}

fn parse_list(expression: &str, inner: &str) -> Result<Placeholder, ConfigError> {
    let items: Vec<String> = split_top_level_commas(inner)
        .into_iter()
        .map(|item| unquote(item.trim()).to_string())
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        return Err(ConfigError::invalid_expression(expression, "empty list"));
    }
    Ok(Placeholder::List(items))
}

fn split_top_level_commas(s: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, ',') if depth == 0 => {
                result.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    result.push(&s[start..]);
    result
}

fn unquote(s: &str) -> &str {
    for q in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Str(String),
    Ident(String),
    Op(Op),
    LParen,
    RParen,
}

fn tokenize(expression: &str, body: &str) -> Result<Vec<Token>, ConfigError> {
    let chars: Vec<char> = body.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<i64>()
                    .map_err(|_| ConfigError::invalid_expression(expression, format!("integer out of range '{}'", text)))?;
                tokens.push(Token::Int(value));
            }
            '\'' | '"' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == c)
                    .map(|p| start + p)
                    .ok_or_else(|| ConfigError::invalid_expression(expression, "unterminated string"))?;
                tokens.push(Token::Str(chars[start..end].iter().collect()));
                i = end + 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(match c {
                    '+' => Op::Add,
                    '-' => Op::Sub,
                    '*' => Op::Mul,
                    '/' => Op::Div,
                    _ => Op::Rem,
                }));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => {
                return Err(ConfigError::invalid_expression(expression, format!("unexpected character '{}'", other)));
            }
        }
    }
    Ok(tokens)
}

/// Recursive descent over `+ -` / `* / %` / unary minus / primaries
struct ExprParser<'a> {
    expression: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser<'_> {
    fn peek_op(&self, ops: &[Op]) -> Option<Op> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) if ops.contains(op) => Some(*op),
            _ => None,
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ConfigError> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek_op(&[Op::Add, Op::Sub]) {
            self.pos += 1;
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ConfigError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek_op(&[Op::Mul, Op::Div, Op::Rem]) {
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ConfigError> {
        if self.peek_op(&[Op::Sub]).is_some() {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ConfigError> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        match token {
            Some(Token::Int(v)) => Ok(Expr::Int(v)),
            Some(Token::Str(v)) => Ok(Expr::Str(v)),
            Some(Token::Ident(name)) => Ok(Expr::Var(name)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.tokens.get(self.pos) {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(ConfigError::invalid_expression(self.expression, "missing ')'")),
                }
            }
            _ => Err(ConfigError::invalid_expression(self.expression, "expected a value")),
        }
    }
}
