//! Logic language parser
//!
//! This module turns one line of program text into an expression tree:
//! - [`lexer`]: Tokenization (line text → tokens with char offsets)
//! - [`parse`]: [`LineParser`](parse::LineParser), [`ParsedLine`](parse::ParsedLine) and the error taxonomy
//! - [`expressions`]: Precedence levels
//! - [`ast`]: Expression tree definitions
//!
//! # Language
//!
//! A program is a list of lines, each either `name = expr` or a bare `expr`
//! whose value is computed (with side effects of stateful built-ins) and then
//! discarded. Values are `i32`; booleans are `15` (true) and `0` (false).
//! Identifiers are case-insensitive and may contain dots (`r.re`, `ton1.et`).
//! `#` starts a comment.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent over a token vector. Calls are resolved
//! against an explicit [`FunctionTable`](crate::interpreter::functions::FunctionTable)
//! at parse time, so arity and name errors never reach the evaluator.

pub mod ast;
pub mod expressions;
pub mod lexer;
pub mod parse;
