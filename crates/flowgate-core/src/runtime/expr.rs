// flowgate-core/src/runtime/expr.rs
// ============================================================================
// Module: Flowgate Sandboxed Expression Evaluator
// Description: Closed, allow-listed expression-tree interpreter for chain verification.
// Purpose: Evaluate contract verification expressions without executing arbitrary code.
// Dependencies: serde_json, std, thiserror
// ============================================================================

//! ## Overview
//! Verification expressions are parsed into a closed expression tree whose
//! node kinds are an explicit enum: comparisons, boolean operators, literals,
//! the three bound variables, one-level method access on a binding, and two
//! allow-listed free functions. Anything outside the allow-list is rejected
//! at parse time; this is a restricted query language, not a sandboxed
//! general interpreter. Constraints are enforced in order: source length at
//! load, structural allow-list at parse, one-level attribute access at
//! parse, and a wall-clock deadline during evaluation. A deadline overrun is
//! an error, never `false`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum expression source length in characters.
pub const MAX_SOURCE_LEN: usize = 500;
/// Maximum expression nesting depth.
pub const MAX_DEPTH: usize = 32;
/// Default evaluation deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Enforced evaluator limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum source length in characters, checked before parsing.
    pub max_source_len: usize,
    /// Maximum nesting depth, checked during parsing.
    pub max_depth: usize,
    /// Wall-clock evaluation deadline.
    pub timeout: Duration,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_source_len: MAX_SOURCE_LEN,
            max_depth: MAX_DEPTH,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Expression parsing and evaluation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Source exceeds the maximum length.
    #[error("expression exceeds {max} characters ({len})")]
    TooLong {
        /// Actual source length.
        len: usize,
        /// Maximum permitted length.
        max: usize,
    },
    /// Expression nesting exceeds the maximum depth.
    #[error("expression exceeds maximum nesting depth {max}")]
    TooDeep {
        /// Maximum permitted depth.
        max: usize,
    },
    /// Source failed to tokenize or parse.
    #[error("expression parse error: {0}")]
    Parse(String),
    /// Expression used a construct outside the allow-list.
    #[error("disallowed construct: {0}")]
    Disallowed(String),
    /// Identifier is not one of the three bound variables.
    #[error("unknown binding: {0}")]
    UnknownBinding(String),
    /// Function or method name is not allow-listed.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// Operand types do not fit the operator.
    #[error("type error: {0}")]
    Type(String),
    /// Evaluation exceeded the wall-clock deadline.
    #[error("evaluation exceeded deadline of {limit_ms} ms")]
    Timeout {
        /// Deadline in milliseconds.
        limit_ms: u64,
    },
}

// ============================================================================
// SECTION: Expression Tree
// ============================================================================

/// The three bound variables available to verification expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    /// Full execution context snapshot.
    Context,
    /// Chain source field value.
    Source,
    /// Chain destination field value.
    Dest,
}

impl Binding {
    /// Resolves an identifier to a binding.
    fn resolve(name: &str) -> Option<Self> {
        match name {
            "context" => Some(Self::Context),
            "source" => Some(Self::Source),
            "dest" => Some(Self::Dest),
            _ => None,
        }
    }
}

/// Allow-listed methods callable on a binding, one level deep.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Method {
    /// Dot-path lookup inside the binding value.
    Get(String),
    /// Length of a string, array, or object.
    Len,
    /// True when the binding value is JSON null.
    IsNull,
}

/// Allow-listed free functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    /// True when the argument is present (not null).
    Present,
    /// Length of a string, array, or object argument.
    Len,
}

/// Binary operators permitted by the closed grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Deep equality.
    Eq,
    /// Deep inequality.
    Ne,
    /// Ordering: less-than.
    Lt,
    /// Ordering: less-than-or-equal.
    Le,
    /// Ordering: greater-than.
    Gt,
    /// Ordering: greater-than-or-equal.
    Ge,
}

/// Closed expression tree node kinds.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    /// Literal JSON value.
    Literal(Value),
    /// One of the three bound variables.
    Binding(Binding),
    /// One-level method access on a binding.
    Access {
        /// Receiver binding.
        binding: Binding,
        /// Allow-listed method.
        method: Method,
    },
    /// Allow-listed free function call.
    Call {
        /// Function identifier.
        func: Func,
        /// Single argument node.
        arg: Box<Node>,
    },
    /// Boolean negation.
    Not(Box<Node>),
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Node>,
        /// Right operand.
        rhs: Box<Node>,
    },
}

// ============================================================================
// SECTION: Tokenizer
// ============================================================================

/// Lexical tokens of the expression grammar.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Identifier (binding, method, function, or keyword).
    Ident(String),
    /// String literal.
    Str(String),
    /// Numeric literal; integers stay integral so they compare equal to
    /// integral context values.
    Num(serde_json::Number),
    /// Punctuation or operator.
    Punct(&'static str),
}

/// Tokenizes an expression source string.
fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut index = 0;
    while index < chars.len() {
        let ch = chars[index];
        match ch {
            ' ' | '\t' | '\r' | '\n' => index += 1,
            '(' | ')' | '.' | ',' => {
                tokens.push(Token::Punct(match ch {
                    '(' => "(",
                    ')' => ")",
                    '.' => ".",
                    _ => ",",
                }));
                index += 1;
            }
            '&' | '|' => {
                if index + 1 < chars.len() && chars[index + 1] == ch {
                    tokens.push(Token::Punct(if ch == '&' { "&&" } else { "||" }));
                    index += 2;
                } else {
                    return Err(EvalError::Parse(format!("single '{ch}' is not an operator")));
                }
            }
            '=' => {
                if index + 1 < chars.len() && chars[index + 1] == '=' {
                    tokens.push(Token::Punct("=="));
                    index += 2;
                } else {
                    return Err(EvalError::Disallowed("assignment is not permitted".to_string()));
                }
            }
            '!' => {
                if index + 1 < chars.len() && chars[index + 1] == '=' {
                    tokens.push(Token::Punct("!="));
                    index += 2;
                } else {
                    tokens.push(Token::Punct("!"));
                    index += 1;
                }
            }
            '<' | '>' => {
                if index + 1 < chars.len() && chars[index + 1] == '=' {
                    tokens.push(Token::Punct(if ch == '<' { "<=" } else { ">=" }));
                    index += 2;
                } else {
                    tokens.push(Token::Punct(if ch == '<' { "<" } else { ">" }));
                    index += 1;
                }
            }
            '"' => {
                let (literal, next) = lex_string(&chars, index)?;
                tokens.push(Token::Str(literal));
                index = next;
            }
            _ if ch.is_ascii_digit() || (ch == '-' && peek_digit(&chars, index + 1)) => {
                let (number, next) = lex_number(&chars, index)?;
                tokens.push(Token::Num(number));
                index = next;
            }
            _ if ch.is_ascii_alphabetic() || ch == '_' => {
                let start = index;
                while index < chars.len()
                    && (chars[index].is_ascii_alphanumeric() || chars[index] == '_')
                {
                    index += 1;
                }
                tokens.push(Token::Ident(chars[start..index].iter().collect()));
            }
            _ => {
                return Err(EvalError::Disallowed(format!("character '{ch}' is not permitted")));
            }
        }
    }
    Ok(tokens)
}

/// Returns true when the character at `index` is an ASCII digit.
fn peek_digit(chars: &[char], index: usize) -> bool {
    chars.get(index).is_some_and(char::is_ascii_digit)
}

/// Lexes a double-quoted string literal starting at `start`.
fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), EvalError> {
    let mut literal = String::new();
    let mut index = start + 1;
    while index < chars.len() {
        match chars[index] {
            '"' => return Ok((literal, index + 1)),
            '\\' => {
                let escaped = chars
                    .get(index + 1)
                    .ok_or_else(|| EvalError::Parse("unterminated escape".to_string()))?;
                match escaped {
                    '"' | '\\' => literal.push(*escaped),
                    _ => {
                        return Err(EvalError::Disallowed(format!(
                            "escape '\\{escaped}' is not permitted"
                        )));
                    }
                }
                index += 2;
            }
            ch => {
                literal.push(ch);
                index += 1;
            }
        }
    }
    Err(EvalError::Parse("unterminated string literal".to_string()))
}

/// Lexes a numeric literal starting at `start`.
fn lex_number(chars: &[char], start: usize) -> Result<(serde_json::Number, usize), EvalError> {
    let mut index = start;
    if chars[index] == '-' {
        index += 1;
    }
    while index < chars.len() && (chars[index].is_ascii_digit() || chars[index] == '.') {
        index += 1;
    }
    let text: String = chars[start..index].iter().collect();
    if text.contains('.') {
        let number = text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .ok_or_else(|| EvalError::Parse(format!("invalid number: {text}")))?;
        return Ok((number, index));
    }
    text.parse::<i64>()
        .map(|number| (serde_json::Number::from(number), index))
        .map_err(|_| EvalError::Parse(format!("invalid number: {text}")))
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser over the token stream.
struct Parser<'a> {
    /// Token stream.
    tokens: &'a [Token],
    /// Cursor into the stream.
    position: usize,
    /// Maximum permitted nesting depth.
    max_depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser over the token stream.
    const fn new(tokens: &'a [Token], max_depth: usize) -> Self {
        Self {
            tokens,
            position: 0,
            max_depth,
        }
    }

    /// Parses a complete expression, requiring end-of-input.
    fn parse(&mut self) -> Result<Node, EvalError> {
        let node = self.parse_or(0)?;
        if self.position < self.tokens.len() {
            return Err(EvalError::Parse("unexpected trailing tokens".to_string()));
        }
        Ok(node)
    }

    /// Parses `||` chains.
    fn parse_or(&mut self, depth: usize) -> Result<Node, EvalError> {
        self.check_depth(depth)?;
        let mut node = self.parse_and(depth + 1)?;
        while self.eat_punct("||") {
            let rhs = self.parse_and(depth + 1)?;
            node = Node::Binary {
                op: BinaryOp::Or,
                lhs: Box::new(node),
                rhs: Box::new(rhs),
            };
        }
        Ok(node)
    }

    /// Parses `&&` chains.
    fn parse_and(&mut self, depth: usize) -> Result<Node, EvalError> {
        self.check_depth(depth)?;
        let mut node = self.parse_not(depth + 1)?;
        while self.eat_punct("&&") {
            let rhs = self.parse_not(depth + 1)?;
            node = Node::Binary {
                op: BinaryOp::And,
                lhs: Box::new(node),
                rhs: Box::new(rhs),
            };
        }
        Ok(node)
    }

    /// Parses `!` prefixes.
    fn parse_not(&mut self, depth: usize) -> Result<Node, EvalError> {
        self.check_depth(depth)?;
        if self.eat_punct("!") {
            let inner = self.parse_not(depth + 1)?;
            return Ok(Node::Not(Box::new(inner)));
        }
        self.parse_comparison(depth + 1)
    }

    /// Parses an optional comparison between two terms.
    fn parse_comparison(&mut self, depth: usize) -> Result<Node, EvalError> {
        self.check_depth(depth)?;
        let lhs = self.parse_term(depth + 1)?;
        let op = if self.eat_punct("==") {
            BinaryOp::Eq
        } else if self.eat_punct("!=") {
            BinaryOp::Ne
        } else if self.eat_punct("<=") {
            BinaryOp::Le
        } else if self.eat_punct(">=") {
            BinaryOp::Ge
        } else if self.eat_punct("<") {
            BinaryOp::Lt
        } else if self.eat_punct(">") {
            BinaryOp::Gt
        } else {
            return Ok(lhs);
        };
        let rhs = self.parse_term(depth + 1)?;
        Ok(Node::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// Parses a term: literal, binding, access, call, or parenthesized expression.
    fn parse_term(&mut self, depth: usize) -> Result<Node, EvalError> {
        self.check_depth(depth)?;
        if self.eat_punct("(") {
            let inner = self.parse_or(depth + 1)?;
            self.expect_punct(")")?;
            return Ok(inner);
        }

        match self.next_token()? {
            Token::Str(literal) => Ok(Node::Literal(Value::String(literal))),
            Token::Num(number) => Ok(Node::Literal(Value::Number(number))),
            Token::Punct(punct) => Err(EvalError::Parse(format!("unexpected token: {punct}"))),
            Token::Ident(ident) => self.parse_ident(&ident, depth),
        }
    }

    /// Parses an identifier-led term: keyword, binding, access, or call.
    fn parse_ident(&mut self, ident: &str, depth: usize) -> Result<Node, EvalError> {
        match ident {
            "true" => return Ok(Node::Literal(Value::Bool(true))),
            "false" => return Ok(Node::Literal(Value::Bool(false))),
            "null" => return Ok(Node::Literal(Value::Null)),
            _ => {}
        }

        if let Some(binding) = Binding::resolve(ident) {
            if self.eat_punct(".") {
                return self.parse_access(binding);
            }
            return Ok(Node::Binding(binding));
        }

        if self.peek_punct("(") {
            let func = match ident {
                "present" => Func::Present,
                "len" => Func::Len,
                _ => return Err(EvalError::UnknownFunction(ident.to_string())),
            };
            self.expect_punct("(")?;
            let arg = self.parse_term(depth + 1)?;
            self.expect_punct(")")?;
            ensure_simple_argument(&arg)?;
            return Ok(Node::Call {
                func,
                arg: Box::new(arg),
            });
        }

        Err(EvalError::UnknownBinding(ident.to_string()))
    }

    /// Parses a one-level method access after `binding.`.
    fn parse_access(&mut self, binding: Binding) -> Result<Node, EvalError> {
        let Token::Ident(method_name) = self.next_token()? else {
            return Err(EvalError::Parse("expected method name after '.'".to_string()));
        };
        self.expect_punct("(")?;
        let method = match method_name.as_str() {
            "get" => {
                let Token::Str(path) = self.next_token()? else {
                    return Err(EvalError::Disallowed(
                        "get() requires a string literal path".to_string(),
                    ));
                };
                Method::Get(path)
            }
            "len" => Method::Len,
            "is_null" => Method::IsNull,
            _ => return Err(EvalError::UnknownFunction(method_name)),
        };
        self.expect_punct(")")?;
        if self.peek_punct(".") {
            return Err(EvalError::Disallowed(
                "chained access on a call result is not permitted".to_string(),
            ));
        }
        Ok(Node::Access {
            binding,
            method,
        })
    }

    /// Fails when the nesting depth exceeds the limit.
    fn check_depth(&self, depth: usize) -> Result<(), EvalError> {
        if depth > self.max_depth {
            return Err(EvalError::TooDeep {
                max: self.max_depth,
            });
        }
        Ok(())
    }

    /// Consumes the next token or fails at end of input.
    fn next_token(&mut self) -> Result<Token, EvalError> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(|| EvalError::Parse("unexpected end of expression".to_string()))?;
        self.position += 1;
        Ok(token)
    }

    /// Consumes the given punctuation when it is next.
    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.peek_punct(punct) {
            self.position += 1;
            return true;
        }
        false
    }

    /// Returns true when the given punctuation is next.
    fn peek_punct(&self, punct: &str) -> bool {
        matches!(self.tokens.get(self.position), Some(Token::Punct(next)) if *next == punct)
    }

    /// Requires the given punctuation next.
    fn expect_punct(&mut self, punct: &'static str) -> Result<(), EvalError> {
        if self.eat_punct(punct) {
            return Ok(());
        }
        Err(EvalError::Parse(format!("expected '{punct}'")))
    }
}

/// Restricts function arguments to bindings, accesses, and literals.
fn ensure_simple_argument(arg: &Node) -> Result<(), EvalError> {
    match arg {
        Node::Literal(_)
        | Node::Binding(_)
        | Node::Access {
            ..
        } => Ok(()),
        Node::Call {
            ..
        }
        | Node::Not(_)
        | Node::Binary {
            ..
        } => Err(EvalError::Disallowed(
            "function arguments must be a binding, access, or literal".to_string(),
        )),
    }
}

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// Bound variables supplied to a verification expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    /// Execution context snapshot.
    pub context: Value,
    /// Chain source field value.
    pub source: Value,
    /// Chain destination field value.
    pub dest: Value,
}

impl Bindings {
    /// Resolves a binding to its value.
    const fn value(&self, binding: Binding) -> &Value {
        match binding {
            Binding::Context => &self.context,
            Binding::Source => &self.source,
            Binding::Dest => &self.dest,
        }
    }
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Sandboxed expression evaluator with enforced limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    /// Enforced limits.
    limits: EvalLimits,
}

impl Evaluator {
    /// Creates an evaluator with the given limits.
    #[must_use]
    pub const fn new(limits: EvalLimits) -> Self {
        Self {
            limits,
        }
    }

    /// Returns the enforced limits.
    #[must_use]
    pub const fn limits(&self) -> EvalLimits {
        self.limits
    }

    /// Parses an expression without evaluating it. Used by the contract
    /// loader so a malformed or unsafe expression is a load-time rejection,
    /// never a runtime surprise.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] when the source violates any parse-time constraint.
    pub fn pre_validate(&self, source: &str) -> Result<(), EvalError> {
        self.parse(source).map(|_| ())
    }

    /// Evaluates an expression against the bound variables.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] on parse failures, type errors, or deadline overrun.
    pub fn evaluate(&self, source: &str, bindings: &Bindings) -> Result<bool, EvalError> {
        let node = self.parse(source)?;
        let deadline = Instant::now() + self.limits.timeout;
        let result = self.eval_node(&node, bindings, deadline)?;
        match result {
            Value::Bool(value) => Ok(value),
            other => Err(EvalError::Type(format!(
                "expression must produce a boolean, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Parses a source string with length and depth limits enforced.
    fn parse(&self, source: &str) -> Result<Node, EvalError> {
        let len = source.chars().count();
        if len > self.limits.max_source_len {
            return Err(EvalError::TooLong {
                len,
                max: self.limits.max_source_len,
            });
        }
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(EvalError::Parse("empty expression".to_string()));
        }
        Parser::new(&tokens, self.limits.max_depth).parse()
    }

    /// Evaluates one node under the deadline.
    fn eval_node(
        &self,
        node: &Node,
        bindings: &Bindings,
        deadline: Instant,
    ) -> Result<Value, EvalError> {
        if Instant::now() >= deadline {
            return Err(EvalError::Timeout {
                limit_ms: u64::try_from(self.limits.timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }

        match node {
            Node::Literal(value) => Ok(value.clone()),
            Node::Binding(binding) => Ok(bindings.value(*binding).clone()),
            Node::Access {
                binding,
                method,
            } => eval_method(bindings.value(*binding), method),
            Node::Call {
                func,
                arg,
            } => {
                let value = self.eval_node(arg, bindings, deadline)?;
                eval_func(*func, &value)
            }
            Node::Not(inner) => {
                let value = self.eval_node(inner, bindings, deadline)?;
                match value {
                    Value::Bool(flag) => Ok(Value::Bool(!flag)),
                    other => Err(EvalError::Type(format!(
                        "'!' requires a boolean, got {}",
                        type_name(&other)
                    ))),
                }
            }
            Node::Binary {
                op,
                lhs,
                rhs,
            } => self.eval_binary(*op, lhs, rhs, bindings, deadline),
        }
    }

    /// Evaluates a binary operation with boolean short-circuiting.
    fn eval_binary(
        &self,
        op: BinaryOp,
        lhs: &Node,
        rhs: &Node,
        bindings: &Bindings,
        deadline: Instant,
    ) -> Result<Value, EvalError> {
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let left = expect_bool(&self.eval_node(lhs, bindings, deadline)?, "boolean operator")?;
            let short = match op {
                BinaryOp::And => !left,
                _ => left,
            };
            if short {
                return Ok(Value::Bool(left));
            }
            let right = expect_bool(&self.eval_node(rhs, bindings, deadline)?, "boolean operator")?;
            return Ok(Value::Bool(right));
        }

        let left = self.eval_node(lhs, bindings, deadline)?;
        let right = self.eval_node(rhs, bindings, deadline)?;
        match op {
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::Ne => Ok(Value::Bool(left != right)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                compare_ordering(op, &left, &right)
            }
            BinaryOp::And | BinaryOp::Or => Err(EvalError::Type(
                "boolean operators handled by short-circuit path".to_string(),
            )),
        }
    }
}

/// Evaluates an allow-listed method on a binding value.
fn eval_method(receiver: &Value, method: &Method) -> Result<Value, EvalError> {
    match method {
        Method::Get(path) => {
            let mut current = receiver;
            for segment in path.split('.') {
                let Some(next) = current.as_object().and_then(|object| object.get(segment)) else {
                    return Ok(Value::Null);
                };
                current = next;
            }
            Ok(current.clone())
        }
        Method::Len => value_len(receiver),
        Method::IsNull => Ok(Value::Bool(receiver.is_null())),
    }
}

/// Evaluates an allow-listed free function.
fn eval_func(func: Func, value: &Value) -> Result<Value, EvalError> {
    match func {
        Func::Present => Ok(Value::Bool(!value.is_null())),
        Func::Len => value_len(value),
    }
}

/// Returns the length of a string, array, or object value.
fn value_len(value: &Value) -> Result<Value, EvalError> {
    let len = match value {
        Value::String(text) => text.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(entries) => entries.len(),
        other => {
            return Err(EvalError::Type(format!("len() requires a collection, got {}", type_name(other))));
        }
    };
    Ok(Value::Number(serde_json::Number::from(len)))
}

/// Requires a boolean operand.
fn expect_bool(value: &Value, operator: &str) -> Result<bool, EvalError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        other => Err(EvalError::Type(format!(
            "{operator} requires booleans, got {}",
            type_name(other)
        ))),
    }
}

/// Evaluates ordering comparisons over numbers or strings.
fn compare_ordering(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let ordering = match (left, right) {
        (Value::Number(lhs), Value::Number(rhs)) => {
            let (Some(lhs), Some(rhs)) = (lhs.as_f64(), rhs.as_f64()) else {
                return Err(EvalError::Type("non-finite numeric comparison".to_string()));
            };
            lhs.partial_cmp(&rhs)
                .ok_or_else(|| EvalError::Type("non-finite numeric comparison".to_string()))?
        }
        (Value::String(lhs), Value::String(rhs)) => lhs.cmp(rhs),
        (lhs, rhs) => {
            return Err(EvalError::Type(format!(
                "ordering requires two numbers or two strings, got {} and {}",
                type_name(lhs),
                type_name(rhs)
            )));
        }
    };
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    };
    Ok(Value::Bool(result))
}

/// Returns a short JSON type name for diagnostics.
const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
