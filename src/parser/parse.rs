//! Line parser coordinator
//!
//! This module provides the [`LineParser`], the parse error taxonomy and
//! [`ParsedLine`], the result of parsing one line of program text.
//!
//! # Parser Architecture
//!
//! - [`lexer`](super::lexer): one line of text → tokens with char offsets
//! - this module: assignment detection, entry point, helper methods
//! - [`expressions`](super::expressions): precedence levels, one method each
//!
//! Errors never abort a program: they are returned inside the [`ParsedLine`]
//! and the line is simply not executed.

use crate::interpreter::functions::FunctionTable;
use crate::parser::ast::Expr;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Nesting depth at which parsing gives up with [`ParseErrorKind::ParseError`]
pub const MAX_NESTING_DEPTH: usize = 64;

/// `IDENT '=' ...` at the start of a line, without mistaking `==` for it
static ASSIGNMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*[A-Za-z][A-Za-z0-9_.]*[ \t]*=[^=]").expect("assignment pattern")
});

static COMMENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(#.*)?$").expect("comment pattern"));

/// Parse error kinds. The display form is the key shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParseErrorKind {
    #[error("invalid_character")]
    InvalidCharacter,
    #[error("parse_error")]
    ParseError,
    #[error("expected_assignment")]
    ExpectedAssignment,
    #[error("symbol_readonly")]
    SymbolReadonly,
    #[error("missing_closing_parenthesis")]
    MissingClosingParenthesis,
    #[error("missing_closing_function_parenthesis")]
    MissingClosingFunctionParenthesis,
    #[error("missing_function_arguments")]
    MissingFunctionArguments,
    #[error("unknown_function")]
    UnknownFunction,
    #[error("unexpected_character")]
    UnexpectedCharacter,
    #[error("invalid_number_of_arguments")]
    InvalidNumberOfArguments,
}

/// A parse error and the character offset (within the line) it was found at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Result of parsing one non-blank line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub source_text: String,
    /// Always an [`Expr::Assign`]; a discarding `0` when `error` is set
    pub root: Expr,
    /// Every symbol the line reads or writes, with the char offset of its
    /// first occurrence
    pub referenced: BTreeMap<String, usize>,
    pub error: Option<ParseError>,
}

impl ParsedLine {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Assignment target; empty when the value is discarded
    pub fn target(&self) -> &str {
        self.root.target().unwrap_or("")
    }

    fn failed(source_text: &str, error: ParseError) -> Self {
        ParsedLine {
            source_text: source_text.to_string(),
            root: Expr::Assign {
                target: String::new(),
                value: Box::new(Expr::Const(0)),
            },
            referenced: BTreeMap::new(),
            error: Some(error),
        }
    }
}

/// Recursive descent parser for one line
pub struct LineParser<'f> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) functions: &'f FunctionTable,
    pub(crate) referenced: BTreeMap<String, usize>,
    pub(crate) depth: usize,
}

impl<'f> LineParser<'f> {
    /// Parse one line. Blank and comment-only lines yield `None`.
    ///
    /// Lines that do not start with `IDENT =` are assigned to
    /// `default_target`; an empty default discards the value.
    pub fn parse(
        line: &str,
        default_target: &str,
        functions: &'f FunctionTable,
    ) -> Option<ParsedLine> {
        if COMMENT_LINE.is_match(line) {
            return None;
        }

        let tokens = match Lexer::new(line).tokenize() {
            Ok(tokens) => tokens,
            Err(e) => return Some(ParsedLine::failed(line, e)),
        };

        let mut parser = LineParser {
            tokens,
            position: 0,
            functions,
            referenced: BTreeMap::new(),
            depth: 0,
        };

        let is_assignment = ASSIGNMENT_LINE.is_match(line);
        match parser.parse_line(is_assignment, default_target) {
            Ok(root) => Some(ParsedLine {
                source_text: line.to_string(),
                root,
                referenced: parser.referenced,
                error: None,
            }),
            Err(e) => Some(ParsedLine::failed(line, e)),
        }
    }

    fn parse_line(&mut self, is_assignment: bool, default_target: &str) -> Result<Expr, ParseError> {
        let target = if is_assignment {
            self.parse_assignment_target()?
        } else {
            default_target.to_ascii_lowercase()
        };

        let value = self.parse_expression()?;

        if !self.is_at_end() {
            return Err(self.error_here(ParseErrorKind::ParseError));
        }

        Ok(Expr::Assign {
            target,
            value: Box::new(value),
        })
    }

    fn parse_assignment_target(&mut self) -> Result<String, ParseError> {
        let offset = self.current_offset();
        let name = match self.peek_kind() {
            TokenKind::Ident(name) => name.clone(),
            _ => return Err(self.error_here(ParseErrorKind::ExpectedAssignment)),
        };
        self.advance();

        if !self.match_token(&TokenKind::Assign) {
            return Err(self.error_here(ParseErrorKind::ExpectedAssignment));
        }
        if self.functions.contains(&name) {
            return Err(ParseError::new(ParseErrorKind::SymbolReadonly, offset));
        }

        self.reference(&name, offset);
        Ok(name)
    }

    // ===== Helper methods =====

    pub(crate) fn reference(&mut self, name: &str, offset: usize) {
        self.referenced.entry(name.to_string()).or_insert(offset);
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        &self.tokens[self.position - 1]
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn current_offset(&self) -> usize {
        self.peek().offset
    }

    pub(crate) fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.current_offset())
    }

    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(self.error_here(ParseErrorKind::ParseError));
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
