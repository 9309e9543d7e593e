//! Formula parser
//!
//! A recursive descent parser for formula expressions and for the
//! definitions preamble, with proper operator precedence.

use crate::ast::{
    BinaryOperator, CompareOperator, ComprehensionClause, Expr, LogicalOperator, Statement,
    UnaryOperator,
};
use crate::error::{FormulaError, FormulaResult};
use yamlcalc_core::formula_payload;

/// Words that can never be used as names
const KEYWORDS: &[&str] = &[
    "and", "or", "not", "in", "if", "else", "for", "def", "return", "lambda", "True", "False",
    "None",
];

/// Deepest allowed nesting of sub-expressions in one formula
pub const MAX_NESTING: usize = 100;

/// Parse a formula string (including its leading `=`) into an AST
///
/// # Example
/// ```rust
/// use yamlcalc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=sum(self['values'])").unwrap();
/// let ast = parse_formula("=[x * 2 for x in prices if x > 0]").unwrap();
/// ```
pub fn parse_formula(text: &str) -> FormulaResult<Expr> {
    let payload = formula_payload(text)
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;
    parse_expression(payload)
}

/// Parse bare expression text (a formula payload, without the marker)
pub fn parse_expression(source: &str) -> FormulaResult<Expr> {
    let mut parser = FormulaParser::new(source, false)?;
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Parse a definitions preamble into its statements
///
/// Statements are separated by newlines or `;`. Two forms are accepted:
/// `name = expr` and `def name(a, b): expr` (the body may be prefixed with
/// `return` and may start on the following line).
pub fn parse_definitions(source: &str) -> FormulaResult<Vec<Statement>> {
    let mut parser = FormulaParser::new(source, true)?;
    let mut statements = Vec::new();

    loop {
        parser.skip_separators()?;
        if matches!(parser.current_token(), Token::Eof) {
            break;
        }

        statements.push(parser.parse_statement()?);

        match parser.current_token() {
            Token::Newline | Token::Semicolon | Token::Eof => {}
            other => {
                return Err(FormulaError::Parse(format!(
                    "Expected end of statement, got {:?}",
                    other
                )))
            }
        }
    }

    Ok(statements)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),

    // Names and keywords
    Ident(String),

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Assign,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Colon,
    Dot,
    Semicolon,
    Newline,

    // End of input
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Option<Token>,
    /// Whether line breaks at bracket depth 0 separate statements
    newlines: bool,
    /// Open bracket nesting
    depth: usize,
    /// Nested sub-expressions being parsed
    nesting: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str, newlines: bool) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: None,
            newlines,
            depth: 0,
            nesting: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = Some(self.scan_token()?);
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        if c == '\n' {
            self.advance();
            return Ok(Token::Newline);
        }

        // Single-character tokens
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '%' => Some(Token::Percent),
            ',' => Some(Token::Comma),
            ':' => Some(Token::Colon),
            ';' => Some(Token::Semicolon),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            '[' => Some(Token::LeftBracket),
            ']' => Some(Token::RightBracket),
            '{' => Some(Token::LeftBrace),
            '}' => Some(Token::RightBrace),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            match token {
                Token::LeftParen | Token::LeftBracket | Token::LeftBrace => self.depth += 1,
                Token::RightParen | Token::RightBracket | Token::RightBrace => {
                    self.depth = self.depth.saturating_sub(1)
                }
                _ => {}
            }
            return Ok(token);
        }

        // One- or two-character operators
        match c {
            '*' => {
                self.advance();
                return Ok(self.follow('*', Token::DoubleStar, Token::Star));
            }
            '/' => {
                self.advance();
                return Ok(self.follow('/', Token::DoubleSlash, Token::Slash));
            }
            '=' => {
                self.advance();
                return Ok(self.follow('=', Token::Equal, Token::Assign));
            }
            '<' => {
                self.advance();
                return Ok(self.follow('=', Token::LessEqual, Token::LessThan));
            }
            '>' => {
                self.advance();
                return Ok(self.follow('=', Token::GreaterEqual, Token::GreaterThan));
            }
            '!' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    return Ok(Token::NotEqual);
                }
                return Err(FormulaError::Parse("Unexpected character '!'".into()));
            }
            _ => {}
        }

        // String literal
        if c == '"' || c == '\'' {
            return self.scan_string(c);
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c == '.' {
            self.advance();
            return Ok(Token::Dot);
        }

        // Identifier or keyword
        if c.is_alphabetic() || c == '_' {
            let start = self.pos;
            while self
                .peek_char()
                .map_or(false, |c| c.is_alphanumeric() || c == '_')
            {
                self.advance();
            }
            return Ok(Token::Ident(self.input[start..self.pos].to_string()));
        }

        Err(FormulaError::Parse(format!("Unexpected character '{}'", c)))
    }

    /// Pick `double` if the next character is `next`, `single` otherwise
    fn follow(&mut self, next: char, double: Token, single: Token) -> Token {
        if self.peek_char() == Some(next) {
            self.advance();
            double
        } else {
            single
        }
    }

    fn scan_string(&mut self, quote: char) -> FormulaResult<Token> {
        self.advance(); // Skip opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Err(FormulaError::Parse("Unterminated string literal".into()))
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(Token::Str(s));
                }
                Some('\\') => {
                    self.advance();
                    let escaped = self
                        .peek_char()
                        .ok_or_else(|| FormulaError::Parse("Unterminated string literal".into()))?;
                    self.advance();
                    match escaped {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        'r' => s.push('\r'),
                        '0' => s.push('\0'),
                        '\\' | '\'' | '"' => s.push(escaped),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        let mut is_float = false;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            is_float = true;
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            is_float = true;
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        if is_float {
            num_str
                .parse()
                .map(Token::Float)
                .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", num_str)))
        } else {
            num_str
                .parse()
                .map(Token::Int)
                .map_err(|_| FormulaError::Parse(format!("Integer literal too large: {}", num_str)))
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '#' {
                // Comment runs to the end of the line
                while self.peek_char().map_or(false, |c| c != '\n') {
                    self.advance();
                }
            } else if c == '\n' && self.newlines && self.depth == 0 {
                break;
            } else if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.current_token(), Token::Ident(name) if name == keyword)
    }

    fn expect_keyword(&mut self, keyword: &str) -> FormulaResult<()> {
        if self.is_keyword(keyword) {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected '{}', got {:?}",
                keyword,
                self.current_token()
            )))
        }
    }

    /// Consume a non-keyword identifier
    fn expect_name(&mut self) -> FormulaResult<String> {
        match self.current_token().clone() {
            Token::Ident(name) if !KEYWORDS.contains(&name.as_str()) => {
                self.consume()?;
                Ok(name)
            }
            other => Err(FormulaError::Parse(format!(
                "Expected a name, got {:?}",
                other
            ))),
        }
    }

    fn skip_separators(&mut self) -> FormulaResult<()> {
        while matches!(self.current_token(), Token::Newline | Token::Semicolon) {
            self.consume()?;
        }
        Ok(())
    }

    fn skip_newlines(&mut self) -> FormulaResult<()> {
        while matches!(self.current_token(), Token::Newline) {
            self.consume()?;
        }
        Ok(())
    }

    // === Statements ===

    fn parse_statement(&mut self) -> FormulaResult<Statement> {
        if self.is_keyword("def") {
            self.consume()?;
            let name = self.expect_name()?;
            self.expect(&Token::LeftParen)?;

            let mut params = Vec::new();
            while !matches!(self.current_token(), Token::RightParen) {
                let param = self.expect_name()?;
                if params.contains(&param) {
                    return Err(FormulaError::Parse(format!(
                        "Duplicate parameter '{}' in '{}'",
                        param, name
                    )));
                }
                params.push(param);
                if matches!(self.current_token(), Token::Comma) {
                    self.consume()?;
                } else {
                    break;
                }
            }
            self.expect(&Token::RightParen)?;
            self.expect(&Token::Colon)?;
            self.skip_newlines()?;
            if self.is_keyword("return") {
                self.consume()?;
            }
            let body = self.parse_expression()?;

            return Ok(Statement::Function { name, params, body });
        }

        let name = self.expect_name()?;
        self.expect(&Token::Assign)?;
        let value = self.parse_expression()?;
        Ok(Statement::Assign { name, value })
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Conditional: a if c else b
    // 2. or
    // 3. and
    // 4. not
    // 5. Comparison: ==, !=, <, <=, >, >=, in, not in (chainable)
    // 6. Addition/Subtraction: +, -
    // 7. Multiplication/Division: *, /, //, %
    // 8. Unary: -, +
    // 9. Exponentiation: ** (right associative, binds tighter than a unary on its left)
    // 10. Postfix: subscripts, slices, calls, attributes
    // 11. Primary: literals, names, parentheses, lists, dicts, comprehensions

    /// Run a parse step one nesting level deeper
    fn nested<T>(&mut self, step: impl FnOnce(&mut Self) -> FormulaResult<T>) -> FormulaResult<T> {
        if self.nesting >= MAX_NESTING {
            return Err(FormulaError::Parse("expression nested too deeply".to_string()));
        }
        self.nesting += 1;
        let result = step(self);
        self.nesting -= 1;
        result
    }

    fn parse_expression(&mut self) -> FormulaResult<Expr> {
        self.nested(Self::parse_conditional)
    }

    fn parse_conditional(&mut self) -> FormulaResult<Expr> {
        let body = self.parse_or()?;

        if self.is_keyword("if") {
            self.consume()?;
            let condition = self.parse_or()?;
            self.expect_keyword("else")?;
            let orelse = self.parse_expression()?;
            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                body: Box::new(body),
                orelse: Box::new(orelse),
            });
        }

        Ok(body)
    }

    fn parse_or(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_and()?;

        while self.is_keyword("or") {
            self.consume()?;
            let right = self.parse_and()?;
            left = Expr::Logical {
                op: LogicalOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_not()?;

        while self.is_keyword("and") {
            self.consume()?;
            let right = self.parse_not()?;
            left = Expr::Logical {
                op: LogicalOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_not(&mut self) -> FormulaResult<Expr> {
        if self.is_keyword("not") {
            self.consume()?;
            let operand = self.nested(Self::parse_not)?;
            return Ok(Expr::UnaryOp {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
            });
        }

        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> FormulaResult<Expr> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.current_token() {
                Token::Equal => CompareOperator::Equal,
                Token::NotEqual => CompareOperator::NotEqual,
                Token::LessThan => CompareOperator::LessThan,
                Token::LessEqual => CompareOperator::LessEqual,
                Token::GreaterThan => CompareOperator::GreaterThan,
                Token::GreaterEqual => CompareOperator::GreaterEqual,
                Token::Ident(name) if name == "in" => CompareOperator::In,
                Token::Ident(name) if name == "not" => {
                    self.consume()?;
                    if !self.is_keyword("in") {
                        return Err(FormulaError::Parse(format!(
                            "Expected 'in' after 'not', got {:?}",
                            self.current_token()
                        )));
                    }
                    CompareOperator::NotIn
                }
                _ => break,
            };

            self.consume()?;
            rest.push((op, self.parse_additive()?));
        }

        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                Token::DoubleSlash => BinaryOperator::FloorDivide,
                Token::Percent => BinaryOperator::Modulo,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_power(),
        };

        self.consume()?;
        let operand = self.nested(Self::parse_unary)?;
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> FormulaResult<Expr> {
        let base = self.parse_postfix()?;

        if matches!(self.current_token(), Token::DoubleStar) {
            self.consume()?;
            let exponent = self.nested(Self::parse_unary)?; // Right associative
            return Ok(Expr::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }

        Ok(base)
    }

    fn parse_postfix(&mut self) -> FormulaResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current_token() {
                Token::LeftBracket => expr = self.parse_subscript(expr)?,
                Token::LeftParen => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                Token::Dot => {
                    self.consume()?;
                    let name = self.expect_name()?;
                    expr = Expr::Attribute {
                        target: Box::new(expr),
                        name,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_subscript(&mut self, target: Expr) -> FormulaResult<Expr> {
        self.expect(&Token::LeftBracket)?;

        let start = if matches!(self.current_token(), Token::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        if matches!(self.current_token(), Token::Colon) {
            self.consume()?;
            let end = if matches!(self.current_token(), Token::RightBracket) {
                None
            } else {
                Some(Box::new(self.parse_expression()?))
            };
            self.expect(&Token::RightBracket)?;
            return Ok(Expr::Slice {
                target: Box::new(target),
                start,
                end,
            });
        }

        self.expect(&Token::RightBracket)?;
        match start {
            Some(index) => Ok(Expr::Subscript {
                target: Box::new(target),
                index,
            }),
            None => Err(FormulaError::Parse("Empty subscript".into())),
        }
    }

    fn parse_arguments(&mut self) -> FormulaResult<Vec<Expr>> {
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();
        while !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_expression()?);
            if matches!(self.current_token(), Token::Comma) {
                self.consume()?;
            } else {
                break;
            }
        }

        self.expect(&Token::RightParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.current_token().clone() {
            Token::Int(i) => {
                self.consume()?;
                Ok(Expr::Int(i))
            }

            Token::Float(f) => {
                self.consume()?;
                Ok(Expr::Float(f))
            }

            Token::Str(s) => {
                self.consume()?;
                Ok(Expr::Str(s))
            }

            Token::Ident(name) => match name.as_str() {
                "True" | "False" | "None" => {
                    self.consume()?;
                    Ok(match name.as_str() {
                        "True" => Expr::Bool(true),
                        "False" => Expr::Bool(false),
                        _ => Expr::None,
                    })
                }
                _ => Ok(Expr::Name(self.expect_name()?)),
            },

            Token::LeftParen => {
                self.consume()?;
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::LeftBracket => self.parse_list(),

            Token::LeftBrace => self.parse_dict(),

            other => Err(FormulaError::Parse(format!("Unexpected token: {:?}", other))),
        }
    }

    fn parse_list(&mut self) -> FormulaResult<Expr> {
        self.expect(&Token::LeftBracket)?;

        if matches!(self.current_token(), Token::RightBracket) {
            self.consume()?;
            return Ok(Expr::List(Vec::new()));
        }

        let first = self.parse_expression()?;

        if self.is_keyword("for") {
            let clauses = self.parse_comprehension_clauses()?;
            self.expect(&Token::RightBracket)?;
            return Ok(Expr::Comprehension {
                element: Box::new(first),
                clauses,
            });
        }

        let mut items = vec![first];
        while matches!(self.current_token(), Token::Comma) {
            self.consume()?;
            if matches!(self.current_token(), Token::RightBracket) {
                break;
            }
            items.push(self.parse_expression()?);
        }

        self.expect(&Token::RightBracket)?;
        Ok(Expr::List(items))
    }

    fn parse_comprehension_clauses(&mut self) -> FormulaResult<Vec<ComprehensionClause>> {
        let mut clauses = Vec::new();

        loop {
            if self.is_keyword("for") {
                self.consume()?;
                let mut targets = vec![self.expect_name()?];
                while matches!(self.current_token(), Token::Comma) {
                    self.consume()?;
                    targets.push(self.expect_name()?);
                }
                self.expect_keyword("in")?;
                let iter = self.parse_or()?;
                clauses.push(ComprehensionClause::For { targets, iter });
            } else if self.is_keyword("if") {
                self.consume()?;
                clauses.push(ComprehensionClause::If(self.parse_or()?));
            } else {
                break;
            }
        }

        Ok(clauses)
    }

    fn parse_dict(&mut self) -> FormulaResult<Expr> {
        self.expect(&Token::LeftBrace)?;

        let mut entries = Vec::new();
        while !matches!(self.current_token(), Token::RightBrace) {
            let key = self.parse_expression()?;
            self.expect(&Token::Colon)?;
            let value = self.parse_expression()?;
            entries.push((key, value));

            if matches!(self.current_token(), Token::Comma) {
                self.consume()?;
            } else {
                break;
            }
        }

        self.expect(&Token::RightBrace)?;
        Ok(Expr::Dict(entries))
    }
}
