//! Direct expression parser
//!
//! Parses the value of the `php=""` attribute into an Expression AST. Only a
//! closed subset is accepted, so the expression is interpreted by the
//! evaluator instead of being executed.
//!
//! Supported syntax:
//! - Literals: `42`, `3.14`, `'string'`, `"string"`, `true`, `false`, `null`
//! - Comparison operators: `==`, `===`, `!=`, `!==`, `<`, `>`, `<=`, `>=`
//! - Logical operators: `&&`, `||`, `and`, `or`, `!`
//! - Function calls: `is_user_logged_in()`, `current_user_can('edit_posts')`
//! - Parentheses for grouping: `(a || b) && c`
//!
//! Every nested operand, group or argument counts one level; inputs deeper
//! than [`MAX_NESTING`] are rejected.

use crate::error::{ParseError, Result};
use crate::MAX_NESTING;
use ifsc_core::ast::{Expression, Operator, UnaryOperator};
use ifsc_core::Value;

/// Expression parser
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parse an expression from a string
    pub fn parse(input: &str) -> Result<Expression> {
        let input = input.trim();

        if input.is_empty() {
            return Err(ParseError::EmptyExpression);
        }

        Self::check_balance(input)?;
        Self::parse_expression(input, 0)
    }

    fn descend(depth: usize) -> Result<usize> {
        let depth = depth + 1;
        if depth > MAX_NESTING {
            return Err(ParseError::NestingTooDeep(MAX_NESTING));
        }
        Ok(depth)
    }

    /// Parse a complete expression (handles binary operators with precedence)
    fn parse_expression(input: &str, depth: usize) -> Result<Expression> {
        let depth = Self::descend(depth)?;
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::UnexpectedEnd);
        }

        // Logical OR has the lowest precedence, then AND
        for (symbol, keyword) in [("||", "or"), ("&&", "and")] {
            let split = Self::split_by_operator(input, &[symbol])
                .or_else(|| Self::split_by_keyword_operator(input, &[keyword]));
            if let Some((left, op, right)) = split {
                let op = Self::parse_operator(op)?;
                return Ok(Expression::binary(
                    Self::parse_expression(left, depth)?,
                    op,
                    Self::parse_expression(right, depth)?,
                ));
            }
        }

        // Try to parse as binary expression with comparison operators
        if let Some((left, op, right)) =
            Self::split_by_operator(input, &["===", "!==", "==", "!=", "<=", ">=", "<", ">"])
        {
            let op = Self::parse_operator(op)?;
            return Ok(Expression::binary(
                Self::parse_expression(left, depth)?,
                op,
                Self::parse_expression(right, depth)?,
            ));
        }

        // Parse primary expression (literals, function calls, parentheses)
        Self::parse_primary(input, depth)
    }

    /// Parse a primary expression
    fn parse_primary(input: &str, depth: usize) -> Result<Expression> {
        let depth = Self::descend(depth)?;
        let input = input.trim();

        // Check for unary operators
        if let Some(rest) = input.strip_prefix('!') {
            return Ok(Expression::unary(
                UnaryOperator::Not,
                Self::parse_primary(rest, depth)?,
            ));
        }

        if let Some(rest) = input.strip_prefix('-') {
            if !rest.trim_start().starts_with(|c: char| c.is_ascii_digit()) {
                return Ok(Expression::unary(
                    UnaryOperator::Negate,
                    Self::parse_primary(rest, depth)?,
                ));
            }
        }

        // Check for parentheses wrapping the whole input
        if input.starts_with('(') && Self::matching_paren(input, 0) == Some(input.len() - 1) {
            return Self::parse_expression(&input[1..input.len() - 1], depth);
        }

        // Check for string literals
        if let Some(s) = Self::parse_string_literal(input) {
            return Ok(Expression::literal(Value::String(s)));
        }

        // Check for keyword literals
        match input.to_ascii_lowercase().as_str() {
            "true" => return Ok(Expression::literal(Value::Bool(true))),
            "false" => return Ok(Expression::literal(Value::Bool(false))),
            "null" => return Ok(Expression::literal(Value::Null)),
            _ => {}
        }

        // Check for number literals
        if input.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
            if let Ok(num) = input.parse::<f64>() {
                return Ok(Expression::literal(Value::Number(num)));
            }
        }

        // Check for function calls
        if let Some(paren_pos) = input.find('(') {
            let func_name = input[..paren_pos].trim();
            if Self::is_identifier(func_name)
                && Self::matching_paren(input, paren_pos) == Some(input.len() - 1)
            {
                let args =
                    Self::parse_function_args(&input[paren_pos + 1..input.len() - 1], depth)?;
                return Ok(Expression::function_call(func_name, args));
            }
        }

        Err(ParseError::InvalidExpression(format!("Cannot parse: {}", input)))
    }

    /// Rejects unterminated strings and unbalanced parentheses up front
    fn check_balance(input: &str) -> Result<()> {
        let mask = Self::string_mask(input)
            .ok_or_else(|| ParseError::UnbalancedQuotes(input.to_string()))?;

        let mut depth: i32 = 0;
        for (i, b) in input.bytes().enumerate() {
            if mask[i] {
                continue;
            }
            match b {
                b'(' => depth += 1,
                b')' => {
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

        if let Some((i, c)) = input
            .char_indices()
            .find(|(i, c)| !mask[*i] && matches!(c, ';' | '$' | '`' | '{' | '}' | '[' | ']'))
        {
            return Err(ParseError::InvalidCharacter { ch: c, position: i });
        }

        Ok(())
    }

    /// Marks every byte that belongs to a quoted string (quotes included).
    /// Returns None when a string is left open.
    fn string_mask(input: &str) -> Option<Vec<bool>> {
        let bytes = input.as_bytes();
        let mut mask = vec![false; bytes.len()];
        let mut quote: Option<u8> = None;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) => {
                    mask[i] = true;
                    if b == b'\\' && i + 1 < bytes.len() {
                        mask[i + 1] = true;
                        i += 1;
                    } else if b == q {
                        quote = None;
                    }
                }
                None if b == b'"' || b == b'\'' => {
                    mask[i] = true;
                    quote = Some(b);
                }
                None => {}
            }
            i += 1;
        }

        quote.is_none().then_some(mask)
    }

    /// Index of the parenthesis closing the one at `open`
    fn matching_paren(input: &str, open: usize) -> Option<usize> {
        let mask = Self::string_mask(input)?;
        let mut depth = 0;
        for (i, b) in input.bytes().enumerate().skip(open) {
            if mask[i] {
                continue;
            }
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Parses a complete single- or double-quoted literal, handling `\\` escapes
    fn parse_string_literal(input: &str) -> Option<String> {
        let quote = input.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let mut out = String::new();
        let mut chars = input[1..].chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(next) if next == quote || next == '\\' => out.push(next),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => return None,
                },
                c if c == quote => {
                    // The closing quote must end the input
                    return chars.as_str().is_empty().then_some(out);
                }
                c => out.push(c),
            }
        }
        None
    }

    fn is_identifier(s: &str) -> bool {
        let mut chars = s.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Split input by binary operator (respecting parentheses and strings)
    fn split_by_operator<'a>(
        input: &'a str,
        operators: &[&str],
    ) -> Option<(&'a str, &'a str, &'a str)> {
        let mask = Self::string_mask(input)?;
        let mut paren_depth = 0;
        let bytes = input.as_bytes();

        // Scan from right to left to handle left-to-right associativity
        for i in (0..input.len()).rev() {
            if mask[i] {
                continue;
            }
            let c = bytes[i] as char;

            if c == ')' {
                paren_depth += 1;
            } else if c == '(' {
                paren_depth -= 1;
            }

            if paren_depth == 0 {
                for &op in operators {
                    if i + op.len() <= input.len() && &input.as_bytes()[i..i + op.len()] == op.as_bytes() {
                        // Make sure it's not part of another operator
                        let is_valid = (i == 0 || !Self::is_operator_char(bytes[i - 1] as char))
                            && (i + op.len() >= input.len()
                                || !Self::is_operator_char(bytes[i + op.len()] as char));

                        if is_valid {
                            return Some((
                                input[..i].trim(),
                                &input[i..i + op.len()],
                                input[i + op.len()..].trim(),
                            ));
                        }
                    }
                }
            }
        }

        None
    }

    /// Split input by keyword operator (respecting parentheses, strings and word boundaries)
    fn split_by_keyword_operator<'a>(
        input: &'a str,
        operators: &[&str],
    ) -> Option<(&'a str, &'a str, &'a str)> {
        let mask = Self::string_mask(input)?;
        let mut paren_depth = 0;
        let bytes = input.as_bytes();

        // Scan from right to left to handle left-to-right associativity
        for i in (0..input.len()).rev() {
            if mask[i] {
                continue;
            }
            let c = bytes[i] as char;

            if c == ')' {
                paren_depth += 1;
            } else if c == '(' {
                paren_depth -= 1;
            }

            if paren_depth == 0 {
                for &op in operators {
                    if i + op.len() <= input.len()
                        && input.as_bytes()[i..i + op.len()].eq_ignore_ascii_case(op.as_bytes())
                    {
                        // For keyword operators, check word boundaries
                        let has_space_before = i == 0 || bytes[i - 1].is_ascii_whitespace();
                        let has_space_after = i + op.len() >= input.len()
                            || bytes[i + op.len()].is_ascii_whitespace();

                        if has_space_before && has_space_after {
                            return Some((
                                input[..i].trim(),
                                &input[i..i + op.len()],
                                input[i + op.len()..].trim(),
                            ));
                        }
                    }
                }
            }
        }

        None
    }

    /// Check if a character is part of an operator
    fn is_operator_char(c: char) -> bool {
        matches!(c, '=' | '!' | '<' | '>' | '&' | '|')
    }

    /// Parse function arguments
    fn parse_function_args(args_str: &str, depth: usize) -> Result<Vec<Expression>> {
        if args_str.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mask = Self::string_mask(args_str)
            .ok_or_else(|| ParseError::UnbalancedQuotes(args_str.to_string()))?;
        let mut args = Vec::new();
        let mut start = 0;
        let mut paren_depth = 0;

        for (i, b) in args_str.bytes().enumerate() {
            if mask[i] {
                continue;
            }
            match b {
                b'(' => paren_depth += 1,
                b')' => paren_depth -= 1,
                b',' if paren_depth == 0 => {
                    args.push(Self::parse_expression(&args_str[start..i], depth)?);
                    start = i + 1;
                }
                _ => {}
            }
        }
        args.push(Self::parse_expression(&args_str[start..], depth)?);

        Ok(args)
    }

    /// Parse an operator string
    fn parse_operator(op: &str) -> Result<Operator> {
        Ok(op.parse::<Operator>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_literal() {
        let expr = ExpressionParser::parse("42").unwrap();
        assert_eq!(expr, Expression::literal(Value::Number(42.0)));

        let expr = ExpressionParser::parse("-3.5").unwrap();
        assert_eq!(expr, Expression::literal(Value::Number(-3.5)));
    }

    #[test]
    fn test_parse_string_literal() {
        let expr = ExpressionParser::parse(r#""hello world""#).unwrap();
        assert_eq!(expr, Expression::literal("hello world"));

        let expr = ExpressionParser::parse(r"'it\'s'").unwrap();
        assert_eq!(expr, Expression::literal("it's"));
    }

    #[test]
    fn test_parse_boolean_and_null_literal() {
        assert_eq!(ExpressionParser::parse("TRUE").unwrap(), Expression::literal(true));
        assert_eq!(ExpressionParser::parse("false").unwrap(), Expression::literal(false));
        assert_eq!(ExpressionParser::parse("null").unwrap(), Expression::literal(Value::Null));
    }

    #[test]
    fn test_parse_comparison() {
        let expr = ExpressionParser::parse("1==1").unwrap();
        assert_eq!(
            expr,
            Expression::binary(Expression::literal(1.0), Operator::Eq, Expression::literal(1.0))
        );

        let expr = ExpressionParser::parse("2 !== '2'").unwrap();
        assert!(matches!(expr, Expression::Binary { op: Operator::Ne, .. }));

        let expr = ExpressionParser::parse("3 <= 4").unwrap();
        assert!(matches!(expr, Expression::Binary { op: Operator::Le, .. }));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = ExpressionParser::parse("true || false && false").unwrap();
        match expr {
            Expression::Binary { op, right, .. } => {
                assert_eq!(op, Operator::Or);
                assert!(matches!(*right, Expression::Binary { op: Operator::And, .. }));
            }
            _ => panic!("Expected Binary expression"),
        }
    }

    #[test]
    fn test_parse_keyword_operators() {
        let expr = ExpressionParser::parse("is_home() and not_found() OR x()").unwrap();
        assert!(matches!(expr, Expression::Binary { op: Operator::Or, .. }));
    }

    #[test]
    fn test_operators_inside_strings_are_ignored() {
        let expr = ExpressionParser::parse("'a || b' == \"a || b\"").unwrap();
        assert!(matches!(expr, Expression::Binary { op: Operator::Eq, .. }));
    }

    #[test]
    fn test_parse_function_call() {
        let expr = ExpressionParser::parse("current_user_can('edit_posts')").unwrap();
        assert_eq!(
            expr,
            Expression::function_call("current_user_can", vec![Expression::literal("edit_posts")])
        );

        let expr = ExpressionParser::parse("has_term('a,b', 3)").unwrap();
        if let Expression::FunctionCall { name, args } = expr {
            assert_eq!(name, "has_term");
            assert_eq!(args, vec![Expression::literal("a,b"), Expression::literal(3.0)]);
        } else {
            panic!("Expected function call");
        }
    }

    #[test]
    fn test_parse_unary_not_and_grouping() {
        let expr = ExpressionParser::parse("!(is_home() || is_admin())").unwrap();
        match expr {
            Expression::Unary { op, operand } => {
                assert_eq!(op, UnaryOperator::Not);
                assert!(matches!(*operand, Expression::Binary { op: Operator::Or, .. }));
            }
            _ => panic!("Expected Unary expression"),
        }

        let expr = ExpressionParser::parse("(a()) && (b())").unwrap();
        assert!(matches!(expr, Expression::Binary { op: Operator::And, .. }));
    }

    #[test]
    fn test_rejects_code() {
        assert!(matches!(
            ExpressionParser::parse("exit(); 1").unwrap_err(),
            ParseError::InvalidCharacter { ch: ';', .. }
        ));
        assert!(matches!(
            ExpressionParser::parse("$wpdb").unwrap_err(),
            ParseError::InvalidCharacter { ch: '$', .. }
        ));
        assert!(matches!(
            ExpressionParser::parse("PHP_VERSION").unwrap_err(),
            ParseError::InvalidExpression(_)
        ));
        assert!(matches!(
            ExpressionParser::parse("1 = 1").unwrap_err(),
            ParseError::InvalidExpression(_)
        ));
    }

    #[test]
    fn test_rejects_deep_nesting() {
        let negations = format!("{}true", "!".repeat(10_000));
        assert_eq!(
            ExpressionParser::parse(&negations).unwrap_err(),
            ParseError::NestingTooDeep(MAX_NESTING)
        );

        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(
            ExpressionParser::parse(&parens).unwrap_err(),
            ParseError::NestingTooDeep(MAX_NESTING)
        );

        let chain = vec!["true"; 10_000].join(" && ");
        assert_eq!(
            ExpressionParser::parse(&chain).unwrap_err(),
            ParseError::NestingTooDeep(MAX_NESTING)
        );

        assert!(ExpressionParser::parse("!!(!(true) && ((1 == 1)))").is_ok());
    }

    #[test]
    fn test_rejects_unbalanced_input() {
        assert!(matches!(
            ExpressionParser::parse("(1 == 1").unwrap_err(),
            ParseError::UnbalancedParentheses(_)
        ));
        assert!(matches!(
            ExpressionParser::parse("'abc").unwrap_err(),
            ParseError::UnbalancedQuotes(_)
        ));
        assert_eq!(ExpressionParser::parse("").unwrap_err(), ParseError::EmptyExpression);
        assert_eq!(ExpressionParser::parse("1 &&").unwrap_err(), ParseError::UnexpectedEnd);
    }
}
