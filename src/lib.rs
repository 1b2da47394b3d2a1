//! # Introduction
//!
//! RLC parses and runs the line-oriented logic language of programmable
//! redstone control boxes. A program is a list of assignments such as
//! `r = ton1(u.re or d, 20)`; every logic tick re-evaluates all lines against
//! a persistent symbol table that also holds timer and counter state.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → LineParser → Program → Logic::tick → port/bus outputs
//! ```
//!
//! 1. [`parser`]: tokenises one line and builds an expression tree, reporting
//!    errors as values with their offset.
//! 2. [`program`]: splits program text into lines, validates symbol suffixes
//!    and aggregates the symbols each line reads and assigns.
//! 3. [`interpreter`]: the [`interpreter::engine::Logic`] runtime: derives
//!    I/O masks, computes edges and evaluates lines with the built-in
//!    functions.
//! 4. [`memory`]: the symbol table, the only mutable runtime state.
//! 5. [`snapshot`]: serde snapshots of code and memory.
//! 6. [`device`]: a simulated control box scheduling logic ticks.
//! 7. [`ui`]: ratatui-based bench; not part of the stable library API.
//!
//! ## Language summary
//!
//! Operators: `+ - * / %`, comparisons, `and`/`&&`/`&`, `or`/`||`/`|`,
//! `xor`/`^`, `not`/`!`. Truth values are `15` and `0`.
//! Ports: `d u r y g b`, with `.re`/`.fe` edges and `.co` comparator values.
//! Built-ins: `inv`, `max`, `min`, `mean`, `lim`, `if`, `rnd`, `clock`,
//! `time`, counters `cnt1`..`cnt5`, timers `ton`/`tof`/`tp` 1..5 and interval
//! generators `tiv1`..`tiv3`.

pub mod device;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod program;
pub mod snapshot;
pub mod ui;
