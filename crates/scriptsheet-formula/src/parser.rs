//! Formula parser
//!
//! A recursive descent parser for the scriptsheet formula language. Cell
//! references are resolved against the grid while parsing, so the result
//! only ever names cells that exist.

use scriptsheet_core::{ArithOp, CellAddress, Comparator, Formula, Grid, RangeOp, Value};
use tracing::trace;

use crate::error::{FormulaError, FormulaResult};

/// How deeply operands may nest (parentheses, unary minus, IF arguments)
const MAX_NESTING: usize = 64;

/// Parse formula text into a [`Formula`]
///
/// A leading `=` is optional. Function names are case-insensitive.
///
/// # Example
/// ```rust
/// use scriptsheet_core::Grid;
/// use scriptsheet_formula::parse_formula;
///
/// let grid = Grid::new(4, 4).unwrap();
/// let formula = parse_formula("=SUM(A1:B2)", &grid).unwrap();
/// let formula = parse_formula("A1 + 2 * B1", &grid).unwrap();
/// let formula = parse_formula("=IF(A1 > 0, \"Yes\", \"No\")", &grid).unwrap();
/// ```
pub fn parse_formula(text: &str, grid: &Grid) -> FormulaResult<Formula> {
    let text = text.trim();
    let text = text.strip_prefix('=').unwrap_or(text);
    trace!(formula = text, "parsing formula");

    let mut parser = FormulaParser::new(text, grid)?;
    if parser.current_token() == &Token::Eof {
        return Err(FormulaError::Parse("Empty formula".into()));
    }

    let formula = parser.parse_expression()?;

    // Make sure we consumed all input
    if parser.current_token() != &Token::Eof {
        return Err(FormulaError::Parse(format!(
            "Unexpected {} after expression",
            parser.current_token()
        )));
    }

    Ok(formula)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    String(String),

    // Identifiers and references
    Identifier(String), // Function name
    CellRef(String),    // Cell reference like A1

    // Operators
    Arith(ArithOp),
    Compare(Comparator),
    Colon,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string \"{}\"", s),
            Token::Identifier(name) => write!(f, "'{}'", name),
            Token::CellRef(r) => write!(f, "reference {}", r),
            Token::Arith(op) => write!(f, "'{}'", op.symbol()),
            Token::Compare(cmp) => write!(f, "'{}'", cmp.symbol()),
            Token::Colon => write!(f, "':'"),
            Token::Comma => write!(f, "','"),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::Eof => write!(f, "end of formula"),
        }
    }
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    grid: &'a Grid,
    depth: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str, grid: &'a Grid) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            grid,
            depth: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        // Single-character tokens
        let single = match c {
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => ArithOp::from_symbol(c).map(Token::Arith),
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        // Comparators, one or two characters
        if matches!(c, '<' | '>' | '=' | '!') {
            return self.scan_comparator();
        }

        // String literal
        if c == '"' {
            return self.scan_string();
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Identifier or cell reference
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.scan_identifier_or_ref());
        }

        Err(FormulaError::Parse(format!(
            "Unexpected character '{}' at position {}",
            c, self.pos
        )))
    }

    fn scan_comparator(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance();
        if matches!(self.peek_char(), Some('=') | Some('>')) {
            self.advance();
            if let Some(cmp) = Comparator::from_symbol(&self.input[start..self.pos]) {
                return Ok(Token::Compare(cmp));
            }
            // Not a two-character comparator (e.g. "=>"); keep the first one
            self.pos = start + 1;
        }

        Comparator::from_symbol(&self.input[start..self.pos])
            .map(Token::Compare)
            .ok_or_else(|| {
                FormulaError::Parse(format!(
                    "Unexpected character '{}' at position {}",
                    &self.input[start..self.pos],
                    start
                ))
            })
    }

    fn scan_string(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    // Check for escaped quote ("")
                    if self.peek_char() == Some('"') {
                        s.push('"');
                        self.advance();
                    } else {
                        return Ok(Token::String(s));
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => {
                    return Err(FormulaError::Parse(format!(
                        "Unterminated string starting at position {}",
                        start
                    )))
                }
            }
        }
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        match num_str.parse::<f64>() {
            Ok(num) if num.is_finite() => Ok(Token::Number(num)),
            _ => Err(FormulaError::Parse(format!("Invalid number '{}'", num_str))),
        }
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        // Letters followed by digits is a cell reference, unless it is
        // called like a function
        if Self::is_cell_reference(text) && self.peek_char_after_whitespace() != Some('(') {
            return Token::CellRef(text.to_string());
        }

        Token::Identifier(text.to_string())
    }

    fn is_cell_reference(text: &str) -> bool {
        let digits = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        digits.len() < text.len()
            && !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn peek_char_after_whitespace(&self) -> Option<char> {
        self.input[self.pos..].chars().find(|c| !c.is_whitespace())
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {}, got {}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing ===
    // An expression is a flat chain of operands joined by + - * /; the
    // evaluator applies precedence. Parentheses nest a whole chain as one
    // operand.

    fn parse_expression(&mut self) -> FormulaResult<Formula> {
        let first = self.parse_operand()?;

        let mut rest = Vec::new();
        while let Token::Arith(op) = self.current_token().clone() {
            self.consume()?;
            rest.push((op, self.parse_operand()?));
        }

        Ok(Formula::chain(first, rest))
    }

    fn parse_operand(&mut self) -> FormulaResult<Formula> {
        if self.depth >= MAX_NESTING {
            return Err(FormulaError::Parse(format!(
                "Formula nested deeper than {} levels",
                MAX_NESTING
            )));
        }

        self.depth += 1;
        let operand = self.parse_primary();
        self.depth -= 1;
        operand
    }

    fn parse_primary(&mut self) -> FormulaResult<Formula> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok(Formula::literal(n))
            }

            Token::String(s) => {
                self.consume()?;
                Ok(Formula::literal(Value::Text(s)))
            }

            Token::LeftParen => {
                self.consume()?;
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::Arith(ArithOp::Subtract) => {
                self.consume()?;
                match self.parse_operand()? {
                    Formula::Literal(Value::Number(n)) => Ok(Formula::literal(-n)),
                    operand => Ok(Formula::arithmetic(
                        Formula::literal(0),
                        ArithOp::Subtract,
                        operand,
                    )),
                }
            }

            Token::CellRef(reference) => {
                self.consume()?;
                Ok(Formula::cell(self.resolve_cell(&reference)?))
            }

            Token::Identifier(name) => {
                self.consume()?;
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Err(FormulaError::Parse(format!("Unknown name '{}'", name)))
                }
            }

            other => Err(FormulaError::Parse(format!("Unexpected {}", other))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<Formula> {
        if name.eq_ignore_ascii_case("IF") {
            return self.parse_conditional();
        }

        let op = RangeOp::from_name(&name).ok_or(FormulaError::UnknownFunction(name))?;

        self.expect(&Token::LeftParen)?;

        let mut cells = Vec::new();
        if !matches!(self.current_token(), Token::RightParen) {
            self.parse_argument(&mut cells)?;
            while matches!(self.current_token(), Token::Comma) {
                self.consume()?;
                self.parse_argument(&mut cells)?;
            }
        }

        self.expect(&Token::RightParen)?;
        Ok(Formula::range(op, cells))
    }

    /// One reduction argument: a cell or a `start:end` rectangle
    fn parse_argument(&mut self, cells: &mut Vec<CellAddress>) -> FormulaResult<()> {
        let start = self.parse_reference()?;

        if matches!(self.current_token(), Token::Colon) {
            self.consume()?;
            let end = self.parse_reference()?;
            cells.extend(self.grid.get_range(start, end)?);
        } else {
            cells.push(start);
        }

        Ok(())
    }

    fn parse_reference(&mut self) -> FormulaResult<CellAddress> {
        match self.current_token().clone() {
            Token::CellRef(reference) => {
                self.consume()?;
                self.resolve_cell(&reference)
            }
            other => Err(FormulaError::Parse(format!(
                "Expected a cell reference, got {}",
                other
            ))),
        }
    }

    fn parse_conditional(&mut self) -> FormulaResult<Formula> {
        self.expect(&Token::LeftParen)?;

        let lhs = self.parse_expression()?;
        let cmp = match self.current_token().clone() {
            Token::Compare(cmp) => cmp,
            other => {
                return Err(FormulaError::Parse(format!(
                    "Expected a comparison in IF, got {}",
                    other
                )))
            }
        };
        self.consume()?;
        let rhs = self.parse_expression()?;

        self.expect(&Token::Comma)?;
        let then_branch = self.parse_expression()?;
        self.expect(&Token::Comma)?;
        let else_branch = self.parse_expression()?;
        self.expect(&Token::RightParen)?;

        Ok(Formula::conditional(lhs, cmp, rhs, then_branch, else_branch))
    }

    fn resolve_cell(&self, reference: &str) -> FormulaResult<CellAddress> {
        let addr = CellAddress::parse(reference)?;
        Ok(self.grid.get_cell(addr.row, addr.col)?.address())
    }
}
