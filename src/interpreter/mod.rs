//! Logic runtime
//!
//! - [`engine`]: the [`Logic`](engine::Logic) runtime driven by a device
//! - [`expressions`]: tree-walking evaluator
//! - [`functions`]: the function table shared by parser and evaluator
//! - [`builtins`], [`timers`]: pure and stateful built-in functions
//! - [`constants`]: port names, signal levels and symbol conventions
//! - [`errors`]: errors of the fallible runtime surface
//!
//! # Execution Model
//!
//! A tick copies inputs into memory, computes edge symbols, then evaluates
//! every valid line in source order. Built-ins keep all of their state in
//! memory, so a program has no hidden state besides its symbol table.

pub mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod functions;
pub mod timers;
