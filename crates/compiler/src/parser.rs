//! Parser for Reso source text
//!
//! Indentation-structured syntax: blocks are introduced by `:` and a
//! deeper indent on the following lines, closed by dedenting. The
//! tokenizer turns the layout into explicit `Indent`/`Dedent`/`Newline`
//! tokens so the grammar itself stays context-free.

use crate::ast::{Block, Expr, FnDecl, Module, Param, Span, Stmt, UnaryOp, Visibility};
use crate::types::{BinOp, Ty};

/// A parse (or tokenizer) error with the line it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Line number (0-indexed)
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        ParseError {
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line + 1, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Ident(String),
    Int(i128),
    Float(f64),
    Str(String),
    Char(char),
    // Keywords
    Def,
    Pub,
    Var,
    If,
    Else,
    While,
    Break,
    Continue,
    Return,
    Pass,
    True,
    False,
    And,
    Or,
    Not,
    As,
    Div,
    Rem,
    // Operators and punctuation
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    Assign,
    Colon,
    Comma,
    Arrow,
    // Layout
    Newline,
    Indent,
    Dedent,
}

/// A token with source position information
#[derive(Debug, Clone)]
pub struct Token {
    pub tok: Tok,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub column: usize,
}

fn keyword(word: &str) -> Option<Tok> {
    Some(match word {
        "def" => Tok::Def,
        "pub" => Tok::Pub,
        "var" => Tok::Var,
        "if" => Tok::If,
        "else" => Tok::Else,
        "while" => Tok::While,
        "break" => Tok::Break,
        "continue" => Tok::Continue,
        "return" => Tok::Return,
        "pass" => Tok::Pass,
        "true" => Tok::True,
        "false" => Tok::False,
        "and" => Tok::And,
        "or" => Tok::Or,
        "not" => Tok::Not,
        "as" => Tok::As,
        "div" => Tok::Div,
        "rem" => Tok::Rem,
        _ => return None,
    })
}

/// Tokenize one source file, producing layout tokens from indentation.
fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut indent_stack: Vec<usize> = vec![0];

    for (line_no, raw_line) in source.lines().enumerate() {
        let mut chars: Vec<char> = raw_line.chars().collect();

        // Measure indentation (spaces only)
        let mut indent = 0;
        while indent < chars.len() && chars[indent] == ' ' {
            indent += 1;
        }

        // Drop trailing comment (respecting string and char literals)
        let mut in_str = false;
        let mut in_char = false;
        let mut escaped = false;
        let mut cut = chars.len();
        for (i, &c) in chars.iter().enumerate() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if in_str || in_char => escaped = true,
                '"' if !in_char => in_str = !in_str,
                '\'' if !in_str => in_char = !in_char,
                '#' if !in_str && !in_char => {
                    cut = i;
                    break;
                }
                _ => {}
            }
        }
        chars.truncate(cut);

        // Blank lines contribute nothing, not even a Newline
        if chars.iter().all(|c| c.is_whitespace()) {
            continue;
        }
        if indent < chars.len() && chars[indent] == '\t' {
            return Err(ParseError::new(
                line_no,
                "Tabs are not allowed in indentation; use spaces",
            ));
        }

        // Emit Indent/Dedent transitions
        let current = *indent_stack.last().unwrap_or(&0);
        if indent > current {
            indent_stack.push(indent);
            tokens.push(Token {
                tok: Tok::Indent,
                line: line_no,
                column: 0,
            });
        } else if indent < current {
            while indent < *indent_stack.last().unwrap_or(&0) {
                indent_stack.pop();
                tokens.push(Token {
                    tok: Tok::Dedent,
                    line: line_no,
                    column: 0,
                });
            }
            if indent != *indent_stack.last().unwrap_or(&0) {
                return Err(ParseError::new(
                    line_no,
                    "Inconsistent indentation: dedent does not match any outer level",
                ));
            }
        }

        tokenize_line(&chars, line_no, indent, &mut tokens)?;
        tokens.push(Token {
            tok: Tok::Newline,
            line: line_no,
            column: chars.len(),
        });
    }

    // Close any open blocks at end of file
    let last_line = source.lines().count();
    while indent_stack.len() > 1 {
        indent_stack.pop();
        tokens.push(Token {
            tok: Tok::Dedent,
            line: last_line,
            column: 0,
        });
    }

    Ok(tokens)
}

/// Tokenize the payload of a single line (indentation already consumed).
fn tokenize_line(
    chars: &[char],
    line: usize,
    start: usize,
    tokens: &mut Vec<Token>,
) -> Result<(), ParseError> {
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        let column = i;
        match c {
            ' ' | '\t' => {
                i += 1;
            }
            '(' => {
                tokens.push(Token { tok: Tok::LParen, line, column });
                i += 1;
            }
            ')' => {
                tokens.push(Token { tok: Tok::RParen, line, column });
                i += 1;
            }
            '+' => {
                tokens.push(Token { tok: Tok::Plus, line, column });
                i += 1;
            }
            '*' => {
                tokens.push(Token { tok: Tok::Star, line, column });
                i += 1;
            }
            '/' => {
                tokens.push(Token { tok: Tok::Slash, line, column });
                i += 1;
            }
            ':' => {
                tokens.push(Token { tok: Tok::Colon, line, column });
                i += 1;
            }
            ',' => {
                tokens.push(Token { tok: Tok::Comma, line, column });
                i += 1;
            }
            '-' => {
                if chars.get(i + 1) == Some(&'>') {
                    tokens.push(Token { tok: Tok::Arrow, line, column });
                    i += 2;
                } else {
                    tokens.push(Token { tok: Tok::Minus, line, column });
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token { tok: Tok::Le, line, column });
                    i += 2;
                } else {
                    tokens.push(Token { tok: Tok::Lt, line, column });
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token { tok: Tok::Ge, line, column });
                    i += 2;
                } else {
                    tokens.push(Token { tok: Tok::Gt, line, column });
                    i += 1;
                }
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token { tok: Tok::EqEq, line, column });
                    i += 2;
                } else {
                    tokens.push(Token { tok: Tok::Assign, line, column });
                    i += 1;
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token { tok: Tok::Ne, line, column });
                    i += 2;
                } else {
                    return Err(ParseError::new(
                        line,
                        "Unexpected character '!'; logical negation is spelled 'not'",
                    ));
                }
            }
            '"' => {
                let (value, next) = lex_string(chars, i, line)?;
                tokens.push(Token { tok: Tok::Str(value), line, column });
                i = next;
            }
            '\'' => {
                let (value, next) = lex_char(chars, i, line)?;
                tokens.push(Token { tok: Tok::Char(value), line, column });
                i = next;
            }
            c if c.is_ascii_digit() => {
                let (tok, next) = lex_number(chars, i, line)?;
                tokens.push(Token { tok, line, column });
                i = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = i;
                while end < chars.len()
                    && (chars[end].is_alphanumeric() || chars[end] == '_')
                {
                    end += 1;
                }
                let word: String = chars[i..end].iter().collect();
                let tok = keyword(&word).unwrap_or(Tok::Ident(word));
                tokens.push(Token { tok, line, column });
                i = end;
            }
            other => {
                return Err(ParseError::new(
                    line,
                    format!("Unexpected character '{}'", other),
                ));
            }
        }
    }
    Ok(())
}

/// Lex a number starting at `i`. Underscore separators are allowed;
/// a `.` or exponent makes it a float.
fn lex_number(chars: &[char], i: usize, line: usize) -> Result<(Tok, usize), ParseError> {
    let mut end = i;
    let mut is_float = false;

    while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '_') {
        end += 1;
    }
    if end < chars.len()
        && chars[end] == '.'
        && chars.get(end + 1).is_some_and(|c| c.is_ascii_digit())
    {
        is_float = true;
        end += 1;
        while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '_') {
            end += 1;
        }
    }
    if end < chars.len() && (chars[end] == 'e' || chars[end] == 'E') {
        let mut exp_end = end + 1;
        if exp_end < chars.len() && (chars[exp_end] == '+' || chars[exp_end] == '-') {
            exp_end += 1;
        }
        if exp_end < chars.len() && chars[exp_end].is_ascii_digit() {
            is_float = true;
            end = exp_end;
            while end < chars.len() && chars[end].is_ascii_digit() {
                end += 1;
            }
        }
    }

    let text: String = chars[i..end].iter().filter(|&&c| c != '_').collect();
    if is_float {
        let value: f64 = text
            .parse()
            .map_err(|_| ParseError::new(line, format!("Invalid float literal '{}'", text)))?;
        Ok((Tok::Float(value), end))
    } else {
        let value: i128 = text
            .parse()
            .map_err(|_| ParseError::new(line, format!("Invalid integer literal '{}'", text)))?;
        Ok((Tok::Int(value), end))
    }
}

fn unescape(c: char, line: usize) -> Result<char, ParseError> {
    Ok(match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        '\\' => '\\',
        '\'' => '\'',
        '"' => '"',
        other => {
            return Err(ParseError::new(
                line,
                format!("Unknown escape sequence '\\{}'", other),
            ));
        }
    })
}

/// Lex a string literal starting at the opening quote; returns the value
/// and the index just past the closing quote.
fn lex_string(chars: &[char], i: usize, line: usize) -> Result<(String, usize), ParseError> {
    let mut value = String::new();
    let mut j = i + 1;
    while j < chars.len() {
        match chars[j] {
            '"' => return Ok((value, j + 1)),
            '\\' => {
                let escape = chars
                    .get(j + 1)
                    .ok_or_else(|| ParseError::new(line, "Unterminated string literal"))?;
                value.push(unescape(*escape, line)?);
                j += 2;
            }
            c => {
                value.push(c);
                j += 1;
            }
        }
    }
    Err(ParseError::new(
        line,
        "Unterminated string literal - missing closing quote",
    ))
}

/// Lex a char literal starting at the opening quote.
fn lex_char(chars: &[char], i: usize, line: usize) -> Result<(char, usize), ParseError> {
    let mut j = i + 1;
    let value = match chars.get(j) {
        Some('\\') => {
            let escape = chars
                .get(j + 1)
                .ok_or_else(|| ParseError::new(line, "Unterminated char literal"))?;
            j += 2;
            unescape(*escape, line)?
        }
        Some('\'') | None => {
            return Err(ParseError::new(line, "Empty char literal"));
        }
        Some(&c) => {
            j += 1;
            c
        }
    };
    if chars.get(j) != Some(&'\'') {
        return Err(ParseError::new(
            line,
            "Char literal must contain exactly one character",
        ));
    }
    Ok((value, j + 1))
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(source)?;
        Ok(Parser { tokens, pos: 0 })
    }

    /// Parse the whole file into a module named `file`.
    pub fn parse(&mut self, file: &str) -> Result<Module, ParseError> {
        let mut functions = Vec::new();
        self.skip_newlines();
        while !self.is_at_end() {
            functions.push(self.parse_fn_decl()?);
            self.skip_newlines();
        }
        Ok(Module {
            file: file.to_string(),
            functions,
        })
    }

    // ---- token helpers ----

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| Span::new(t.line, t.column))
            .unwrap_or_else(|| {
                let line = self.tokens.last().map(|t| t.line).unwrap_or(0);
                Span::new(line, 0)
            })
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, tok: &Tok) -> bool {
        self.peek() == Some(tok)
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.check(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok, context: &str) -> Result<Span, ParseError> {
        let span = self.peek_span();
        if self.eat(&tok) {
            Ok(span)
        } else {
            Err(ParseError::new(
                span.line,
                format!("Expected {:?} {}", tok, context),
            ))
        }
    }

    fn expect_ident(&mut self, context: &str) -> Result<(String, Span), ParseError> {
        let span = self.peek_span();
        match self.peek().cloned() {
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                Ok((name, span))
            }
            _ => Err(ParseError::new(
                span.line,
                format!("Expected identifier {}", context),
            )),
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&Tok::Newline) {
            self.pos += 1;
        }
    }

    // ---- declarations ----

    fn parse_fn_decl(&mut self) -> Result<FnDecl, ParseError> {
        let span = self.peek_span();
        let visibility = if self.eat(&Tok::Pub) {
            Visibility::Public
        } else {
            Visibility::FilePrivate
        };
        self.expect(Tok::Def, "to start a function declaration")?;
        let (name, _) = self.expect_ident("after 'def'")?;

        self.expect(Tok::LParen, "after the function name")?;
        let params = self.parse_params()?;
        self.expect(Tok::RParen, "after the parameter list")?;

        let return_ty = if self.eat(&Tok::Arrow) {
            self.parse_type()?
        } else {
            Ty::Unit
        };

        self.expect(Tok::Colon, "after the function signature")?;
        let body = self.parse_suite()?;

        Ok(FnDecl {
            name,
            visibility,
            params,
            return_ty,
            body,
            span,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        if self.check(&Tok::RParen) {
            return Ok(params);
        }
        loop {
            let (name, span) = self.expect_ident("as a parameter name")?;
            self.expect(Tok::Colon, "after the parameter name")?;
            let ty = self.parse_type()?;
            params.push(Param { name, ty, span });
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_type(&mut self) -> Result<Ty, ParseError> {
        let span = self.peek_span();
        if self.eat(&Tok::LParen) {
            self.expect(Tok::RParen, "to complete the unit type '()'")?;
            return Ok(Ty::Unit);
        }
        let (name, _) = self.expect_ident("as a type name")?;
        Ty::from_name(&name)
            .ok_or_else(|| ParseError::new(span.line, format!("Unknown type '{}'", name)))
    }

    // ---- statements ----

    /// Parse a suite: either statements inline on the same line, or an
    /// indented block on the following lines.
    fn parse_suite(&mut self) -> Result<Block, ParseError> {
        if self.eat(&Tok::Newline) {
            let span = self.peek_span();
            if !self.eat(&Tok::Indent) {
                return Err(ParseError::new(
                    span.line,
                    "Expected an indented block after ':'",
                ));
            }
            let mut stmts = Vec::new();
            while !self.check(&Tok::Dedent) && !self.is_at_end() {
                stmts.push(self.parse_stmt()?);
            }
            self.eat(&Tok::Dedent);
            Ok(Block { stmts })
        } else {
            // Single-line suite: one simple statement
            let stmt = self.parse_simple_stmt()?;
            self.expect(Tok::Newline, "at the end of the statement")?;
            Ok(Block { stmts: vec![stmt] })
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Some(Tok::If) => self.parse_if_stmt(),
            Some(Tok::While) => self.parse_while_stmt(),
            _ => {
                let stmt = self.parse_simple_stmt()?;
                self.expect(Tok::Newline, "at the end of the statement")?;
                Ok(stmt)
            }
        }
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek_span();
        self.expect(Tok::If, "to start an if statement")?;
        let cond = self.parse_expr()?;
        self.expect(Tok::Colon, "after the if condition")?;
        let then_block = self.parse_suite()?;

        let else_block = if self.check(&Tok::Else) {
            self.pos += 1;
            if self.check(&Tok::If) {
                // `else if`: nest the chained if as the sole else statement
                let nested = self.parse_if_stmt()?;
                Some(Block { stmts: vec![nested] })
            } else {
                self.expect(Tok::Colon, "after 'else'")?;
                Some(self.parse_suite()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
            span,
        })
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek_span();
        self.expect(Tok::While, "to start a while loop")?;
        let cond = self.parse_expr()?;
        self.expect(Tok::Colon, "after the while condition")?;
        let body = self.parse_suite()?;
        Ok(Stmt::While { cond, body, span })
    }

    fn parse_simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek_span();
        match self.peek() {
            Some(Tok::Var) => self.parse_var_decl(),
            Some(Tok::Break) => {
                self.pos += 1;
                Ok(Stmt::Break { span })
            }
            Some(Tok::Continue) => {
                self.pos += 1;
                Ok(Stmt::Continue { span })
            }
            Some(Tok::Pass) => {
                self.pos += 1;
                Ok(Stmt::Pass { span })
            }
            Some(Tok::Return) => {
                self.pos += 1;
                let value = if self.check(&Tok::Newline) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Ok(Stmt::Return { value, span })
            }
            _ => {
                let expr = self.parse_expr()?;
                if self.eat(&Tok::Assign) {
                    let name = match expr {
                        Expr::VarRef { name, .. } => name,
                        _ => {
                            return Err(ParseError::new(
                                span.line,
                                "Invalid assignment target; expected a variable name",
                            ));
                        }
                    };
                    let value = self.parse_expr()?;
                    Ok(Stmt::Assign { name, value, span })
                } else {
                    Ok(Stmt::Expr { expr, span })
                }
            }
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek_span();
        self.expect(Tok::Var, "to start a variable declaration")?;
        let (name, _) = self.expect_ident("after 'var'")?;

        let declared_ty = if self.eat(&Tok::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.eat(&Tok::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        if declared_ty.is_none() && init.is_none() {
            return Err(ParseError::new(
                span.line,
                format!("Variable '{}' needs a type annotation or an initializer", name),
            ));
        }

        Ok(Stmt::VarDecl {
            name,
            declared_ty,
            init,
            span,
        })
    }

    // ---- expressions ----

    /// Entry point; the ternary `a if cond else b` is the lowest
    /// precedence level and associates to the right.
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let then_val = self.parse_or_expr()?;
        if self.check(&Tok::If) {
            let span = self.peek_span();
            self.pos += 1;
            let cond = self.parse_or_expr()?;
            self.expect(Tok::Else, "in a ternary expression")?;
            let else_val = self.parse_expr()?;
            return Ok(Expr::Ternary {
                then_val: Box::new(then_val),
                cond: Box::new(cond),
                else_val: Box::new(else_val),
                span,
            });
        }
        Ok(then_val)
    }

    fn parse_or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and_expr()?;
        while self.check(&Tok::Or) {
            let span = self.peek_span();
            self.pos += 1;
            let rhs = self.parse_and_expr()?;
            lhs = Expr::Binary {
                op: BinOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_not_expr()?;
        while self.check(&Tok::And) {
            let span = self.peek_span();
            self.pos += 1;
            let rhs = self.parse_not_expr()?;
            lhs = Expr::Binary {
                op: BinOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Tok::Not) {
            let span = self.peek_span();
            self.pos += 1;
            let operand = self.parse_not_expr()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Lt) => BinOp::Lt,
                Some(Tok::Le) => BinOp::Le,
                Some(Tok::Gt) => BinOp::Gt,
                Some(Tok::Ge) => BinOp::Ge,
                Some(Tok::EqEq) => BinOp::Eq,
                Some(Tok::Ne) => BinOp::Ne,
                _ => break,
            };
            let span = self.peek_span();
            self.pos += 1;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Plus) => BinOp::Add,
                Some(Tok::Minus) => BinOp::Sub,
                _ => break,
            };
            let span = self.peek_span();
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_cast()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Star) => BinOp::Mul,
                Some(Tok::Slash) => BinOp::FloatDiv,
                Some(Tok::Div) => BinOp::IntDiv,
                Some(Tok::Rem) => BinOp::Rem,
                _ => break,
            };
            let span = self.peek_span();
            self.pos += 1;
            let rhs = self.parse_cast()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_unary()?;
        while self.check(&Tok::As) {
            let span = self.peek_span();
            self.pos += 1;
            let target = self.parse_type()?;
            expr = Expr::Cast {
                expr: Box::new(expr),
                target,
                span,
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Tok::Minus) {
            let span = self.peek_span();
            self.pos += 1;
            // Fold negation into numeric literals
            match self.peek().cloned() {
                Some(Tok::Int(value)) => {
                    self.pos += 1;
                    return Ok(Expr::IntLit { value: -value, span });
                }
                Some(Tok::Float(value)) => {
                    self.pos += 1;
                    return Ok(Expr::FloatLit { value: -value, span });
                }
                _ => {}
            }
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.peek_span();
        match self.peek().cloned() {
            Some(Tok::Int(value)) => {
                self.pos += 1;
                Ok(Expr::IntLit { value, span })
            }
            Some(Tok::Float(value)) => {
                self.pos += 1;
                Ok(Expr::FloatLit { value, span })
            }
            Some(Tok::True) => {
                self.pos += 1;
                Ok(Expr::BoolLit { value: true, span })
            }
            Some(Tok::False) => {
                self.pos += 1;
                Ok(Expr::BoolLit { value: false, span })
            }
            Some(Tok::Char(value)) => {
                self.pos += 1;
                Ok(Expr::CharLit { value, span })
            }
            Some(Tok::Str(value)) => {
                self.pos += 1;
                Ok(Expr::StringLit { value, span })
            }
            Some(Tok::LParen) => {
                self.pos += 1;
                let expr = self.parse_expr()?;
                self.expect(Tok::RParen, "to close the parenthesized expression")?;
                Ok(expr)
            }
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                if self.eat(&Tok::LParen) {
                    let mut args = Vec::new();
                    if !self.check(&Tok::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.eat(&Tok::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(Tok::RParen, "after the call arguments")?;
                    Ok(Expr::Call { name, args, span })
                } else {
                    Ok(Expr::VarRef { name, span })
                }
            }
            other => Err(ParseError::new(
                span.line,
                format!("Expected an expression, found {:?}", other),
            )),
        }
    }
}
