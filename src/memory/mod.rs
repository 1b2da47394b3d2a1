//! Persistent symbol table of a logic program
//!
//! [`Memory`] is the only mutable runtime state. It holds, by convention,
//! three kinds of symbols:
//! - plain names: ports (`d`, `u`, `r`, `y`, `g`, `b`) and user variables
//! - dotted suffixes: edges (`.re`, `.fe`), comparator overrides (`.co`),
//!   timer period/elapsed (`.pt`, `.et`)
//! - leading-dot control symbols: `.clock`, `.time`, `.deadline` and the
//!   hidden bookkeeping keys of timers and counters
//!
//! Reads of unknown symbols yield `0`. Keys are stored lowercase.
//!
//! Because timers and counters keep all their state here, serializing the map
//! wholesale is enough to persist a running program.

use crate::interpreter::constants::{port_index, DEADLINE_SYMBOL, DEFAULT_DEADLINE};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memory {
    symbols: FxHashMap<String, i32>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, `0` if unset
    pub fn get(&self, key: &str) -> i32 {
        self.get_or(key, 0)
    }

    pub fn get_or(&self, key: &str, default: i32) -> i32 {
        match self.symbols.get(key) {
            Some(v) => *v,
            None if has_uppercase(key) => self
                .symbols
                .get(&key.to_ascii_lowercase())
                .copied()
                .unwrap_or(default),
            None => default,
        }
    }

    pub fn set(&mut self, key: &str, value: i32) {
        if has_uppercase(key) {
            self.symbols.insert(key.to_ascii_lowercase(), value);
        } else if let Some(slot) = self.symbols.get_mut(key) {
            *slot = value;
        } else {
            self.symbols.insert(key.to_string(), value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<i32> {
        self.symbols.remove(&key.to_ascii_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.symbols.contains_key(&key.to_ascii_lowercase())
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// All symbols sorted by name
    pub fn sorted(&self) -> Vec<(&str, i32)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Symbols a user would care about: no control symbols, ports or edges
    pub fn user_symbols(&self) -> Vec<(&str, i32)> {
        self.sorted()
            .into_iter()
            .filter(|(k, _)| {
                !(k.starts_with('.')
                    || port_index(k).is_some()
                    || k.ends_with(".re")
                    || k.ends_with(".fe"))
            })
            .collect()
    }

    /// Lowers `.deadline` to `ticks` if that is sooner than the current value
    pub fn request_deadline(&mut self, ticks: i32) {
        let current = self.get_or(DEADLINE_SYMBOL, DEFAULT_DEADLINE);
        self.set(DEADLINE_SYMBOL, current.min(ticks));
    }
}

impl FromIterator<(String, i32)> for Memory {
    fn from_iter<I: IntoIterator<Item = (String, i32)>>(iter: I) -> Self {
        let mut memory = Memory::new();
        for (k, v) in iter {
            memory.set(&k, v);
        }
        memory
    }
}

fn has_uppercase(key: &str) -> bool {
    key.bytes().any(|b| b.is_ascii_uppercase())
}
