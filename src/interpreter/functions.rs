//! Built-in function table
//!
//! The table is an immutable value built once by [`FunctionTable::standard`]
//! and handed to the parser. Each entry resolves to a [`Builtin`], which the
//! parser stores in the call node; evaluation dispatches on it directly.

use rustc_hash::FxHashMap;

/// Number of arguments a built-in accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic,
}

/// Implementation selector for a built-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Inv,
    Max,
    Min,
    Mean,
    Lim,
    If,
    Rnd,
    Clock,
    Time,
    Counter,
    TimerOn,
    TimerOff,
    TimerPulse,
    Interval,
}

impl Builtin {
    /// Whether calls keep state in memory under the function's name
    pub fn is_stateful(self) -> bool {
        matches!(
            self,
            Builtin::Counter
                | Builtin::TimerOn
                | Builtin::TimerOff
                | Builtin::TimerPulse
                | Builtin::Interval
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub arity: Arity,
    pub builtin: Builtin,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    defs: FxHashMap<String, FunctionDef>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The control box library: pure functions, `cnt1..5`, `ton1..5`,
    /// `tof1..5`, `tp1..5` and `tiv1..3`
    pub fn standard() -> Self {
        let mut table = FunctionTable::new();

        table.define("inv", Arity::Fixed(1), Builtin::Inv);
        table.define("max", Arity::Variadic, Builtin::Max);
        table.define("min", Arity::Variadic, Builtin::Min);
        table.define("mean", Arity::Variadic, Builtin::Mean);
        table.define("lim", Arity::Variadic, Builtin::Lim);
        table.define("if", Arity::Variadic, Builtin::If);
        table.define("rnd", Arity::Fixed(0), Builtin::Rnd);
        table.define("clock", Arity::Fixed(0), Builtin::Clock);
        table.define("time", Arity::Fixed(0), Builtin::Time);

        for i in 1..=5 {
            table.define(&format!("cnt{}", i), Arity::Variadic, Builtin::Counter);
            table.define(&format!("ton{}", i), Arity::Fixed(2), Builtin::TimerOn);
            table.define(&format!("tof{}", i), Arity::Fixed(2), Builtin::TimerOff);
            table.define(&format!("tp{}", i), Arity::Fixed(2), Builtin::TimerPulse);
        }
        for i in 1..=3 {
            table.define(&format!("tiv{}", i), Arity::Variadic, Builtin::Interval);
        }

        table
    }

    /// Add or replace a definition. Names are case-insensitive.
    pub fn define(&mut self, name: &str, arity: Arity, builtin: Builtin) {
        let name = name.to_ascii_lowercase();
        self.defs.insert(
            name.clone(),
            FunctionDef {
                name,
                arity,
                builtin,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Function names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.defs.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}
