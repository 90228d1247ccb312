//! Simple attribute expression compiler
//!
//! Attribute values such as `current_user_can="edit_posts AND !manage_options"`
//! use a deliberately small grammar:
//!
//! ```text
//! expr    := or
//! or      := and  (("||" | "OR")  and)*
//! and     := unary (("&&" | "AND") unary)*
//! unary   := "!" unary | "(" expr ")" | operand
//! operand := item ("," item)*
//! item    := '"' chars '"' | "'" chars "'" | bare
//! ```
//!
//! Each operand is handed to an attribute-specific callback which turns it
//! into a sub-expression (for example a `current_user_can` predicate). The
//! compiler only ever glues those sub-expressions together with `!`, `&&` and
//! `||`, so the resulting tree cannot contain anything the callbacks did not
//! produce themselves.

use crate::error::{ParseError, Result};
use crate::MAX_NESTING;
use ifsc_core::ast::{Expression, LogicalGroupOp, Operator};

/// A comma-separated list of one or more tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    items: Vec<String>,
}

impl Operand {
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    /// All tokens of the operand, in source order
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Expand every token with `f` and combine the results with `op`.
    ///
    /// This is the comma shorthand used by built-in attributes:
    /// `current_user_can="edit_posts,publish_posts"` requires both.
    pub fn expand<F>(&self, op: LogicalGroupOp, mut f: F) -> Result<Expression>
    where
        F: FnMut(&str) -> Result<Expression>,
    {
        let conditions = self
            .items
            .iter()
            .map(|item| f(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Expression::group(op, conditions))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Comma,
    Item(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Not => "'!'".to_string(),
            Token::And => "AND".to_string(),
            Token::Or => "OR".to_string(),
            Token::Comma => "','".to_string(),
            Token::Item(s) => format!("token '{}'", s),
        }
    }
}

fn is_bare_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '@' | '/' | '+')
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push((Token::LParen, pos));
            }
            ')' => {
                chars.next();
                tokens.push((Token::RParen, pos));
            }
            ',' => {
                chars.next();
                tokens.push((Token::Comma, pos));
            }
            '!' => {
                chars.next();
                tokens.push((Token::Not, pos));
            }
            '&' | '|' => {
                chars.next();
                match chars.next() {
                    Some((_, next)) if next == c => {
                        tokens.push((if c == '&' { Token::And } else { Token::Or }, pos));
                    }
                    _ => return Err(ParseError::InvalidCharacter { ch: c, position: pos }),
                }
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == c {
                        closed = true;
                        break;
                    }
                    value.push(next);
                }
                if !closed {
                    return Err(ParseError::UnbalancedQuotes(input.to_string()));
                }
                tokens.push((Token::Item(value), pos));
            }
            c if is_bare_char(c) => {
                let mut word = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if !is_bare_char(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                let token = if word.eq_ignore_ascii_case("and") {
                    Token::And
                } else if word.eq_ignore_ascii_case("or") {
                    Token::Or
                } else {
                    Token::Item(word)
                };
                tokens.push((token, pos));
            }
            _ => return Err(ParseError::InvalidCharacter { ch: c, position: pos }),
        }
    }

    Ok(tokens)
}

/// Compiles attribute values into condition trees
pub struct SimpleExprCompiler;

impl SimpleExprCompiler {
    /// Compile `raw` into an expression, mapping every operand with `callback`.
    ///
    /// Any grammar violation fails the whole value; a partial expression is
    /// never returned. Trees deeper than [`MAX_NESTING`] are rejected.
    pub fn compile<F>(raw: &str, mut callback: F) -> Result<Expression>
    where
        F: FnMut(&Operand) -> Result<Expression>,
    {
        let input = raw.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyExpression);
        }

        let tokens = tokenize(input)?;
        Self::check_parentheses(input, &tokens)?;

        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
            callback: &mut callback,
        };
        let expr = parser.parse_or()?;

        if let Some((token, position)) = parser.tokens.get(parser.pos) {
            return Err(ParseError::UnexpectedToken {
                found: token.describe(),
                position: *position,
            });
        }

        tracing::trace!("compiled simple expression '{}' => {}", input, expr);
        Ok(expr)
    }

    fn check_parentheses(input: &str, tokens: &[(Token, usize)]) -> Result<()> {
        let mut depth: i32 = 0;
        for (token, _) in tokens {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ParseError::UnbalancedParentheses(input.to_string()));
                    }
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(ParseError::UnbalancedParentheses(input.to_string()));
        }
        Ok(())
    }
}

struct Parser<'a, F> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
    callback: &'a mut F,
}

impl<F> Parser<'_, F>
where
    F: FnMut(&Operand) -> Result<Expression>,
{
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // Bounds the recursion of `!` and `(`
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::NestingTooDeep(MAX_NESTING));
        }
        Ok(())
    }

    // Bounds the height of the tree built so far, operator chains included
    fn bounded(expr: Expression) -> Result<Expression> {
        if expr.depth() > MAX_NESTING {
            return Err(ParseError::NestingTooDeep(MAX_NESTING));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Self::bounded(Expression::binary(left, Operator::Or, right))?;
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_unary()?;
            left = Self::bounded(Expression::binary(left, Operator::And, right))?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        match self.advance() {
            Some((Token::Not, _)) => {
                self.descend()?;
                let operand = self.parse_unary()?;
                self.depth -= 1;
                Self::bounded(Expression::not(operand))
            }
            Some((Token::LParen, _)) => {
                self.descend()?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((token, position)) => Err(ParseError::UnexpectedToken {
                        found: token.describe(),
                        position,
                    }),
                    None => Err(ParseError::UnexpectedEnd),
                }
            }
            Some((Token::Item(first), _)) => {
                let mut items = vec![first];
                while self.peek() == Some(&Token::Comma) {
                    self.advance();
                    match self.advance() {
                        Some((Token::Item(item), _)) => items.push(item),
                        Some((token, position)) => {
                            return Err(ParseError::UnexpectedToken {
                                found: token.describe(),
                                position,
                            })
                        }
                        None => return Err(ParseError::UnexpectedEnd),
                    }
                }
                if let Some(empty) = items.iter().find(|item| item.trim().is_empty()) {
                    return Err(ParseError::InvalidOperand(format!("empty token '{}'", empty)));
                }
                (self.callback)(&Operand::new(items))
            }
            Some((token, position)) => Err(ParseError::UnexpectedToken {
                found: token.describe(),
                position,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}
