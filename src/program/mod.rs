//! Multi-line program aggregation
//!
//! [`Program::build`] splits program text into lines, parses each non-blank
//! line and sorts the results into executable [`Entry`]s and
//! [`InvalidEntry`]s. Symbol sets are aggregated over valid lines only, which
//! is what the runtime uses to derive its port and channel masks.
//!
//! A program is never edited in place; new text means a new `Program`.

use crate::interpreter::constants::{ALLOWED_SUFFIXES, PORT_NAMES};
use crate::interpreter::functions::FunctionTable;
use crate::parser::parse::{LineParser, ParseError, ParseErrorKind, ParsedLine};
use std::collections::{BTreeMap, BTreeSet};

/// A successfully parsed line, in execution order
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Zero-based line number in the program text
    pub line_index: usize,
    /// Char offset of the line start within the program text
    pub offset: usize,
    pub parsed: ParsedLine,
    /// Value of the line's expression in the most recent tick
    pub last_result: i32,
}

/// A line that failed to parse
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidEntry {
    pub line_index: usize,
    /// Char offset of the line start within the program text
    pub offset: usize,
    pub parsed: ParsedLine,
    pub error: ParseError,
}

impl InvalidEntry {
    /// Char offset of the error within the program text
    pub fn error_offset(&self) -> usize {
        self.offset + self.error.offset
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.error.kind
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub entries: Vec<Entry>,
    pub invalid_entries: Vec<InvalidEntry>,
    /// Symbols referenced anywhere in valid lines
    pub all_symbols: BTreeSet<String>,
    /// Assignment targets of valid lines
    pub assigned_symbols: BTreeSet<String>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source` line by line against `functions`
    pub fn build(source: &str, functions: &FunctionTable) -> Program {
        let mut program = Program::new();
        if source.trim().is_empty() {
            return program;
        }

        let mut offset = 0;
        for (line_index, raw_line) in source.split('\n').enumerate() {
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
            let line_offset = offset;
            offset += raw_line.chars().count() + 1;

            let Some(mut parsed) = LineParser::parse(line, "", functions) else {
                continue;
            };

            if parsed.error.is_none() {
                parsed.error = invalid_suffix(&parsed.referenced);
            }

            match parsed.error {
                Some(error) => program.invalid_entries.push(InvalidEntry {
                    line_index,
                    offset: line_offset,
                    parsed,
                    error,
                }),
                None => {
                    program
                        .all_symbols
                        .extend(parsed.referenced.keys().cloned());
                    let target = parsed.target();
                    if !target.is_empty() {
                        program.assigned_symbols.insert(target.to_string());
                    }
                    program.entries.push(Entry {
                        line_index,
                        offset: line_offset,
                        parsed,
                        last_result: 0,
                    });
                }
            }
        }

        // Comparator edges need the comparator value itself
        for port in PORT_NAMES {
            let co_re = format!("{}.co.re", port);
            let co_fe = format!("{}.co.fe", port);
            if program.all_symbols.contains(&co_re) || program.all_symbols.contains(&co_fe) {
                program.all_symbols.insert(format!("{}.co", port));
            }
        }

        program
    }

    /// True if there is nothing to execute
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_entries.is_empty()
    }

    /// Error kinds keyed by their char offset in the program text
    pub fn errors(&self) -> BTreeMap<usize, ParseErrorKind> {
        self.invalid_entries
            .iter()
            .map(|e| (e.error_offset(), e.kind()))
            .collect()
    }
}

/// First symbol whose dotted suffix is not one of the known ones
fn invalid_suffix(referenced: &BTreeMap<String, usize>) -> Option<ParseError> {
    referenced
        .iter()
        .filter_map(|(name, offset)| {
            let dot = name.find('.')?;
            if ALLOWED_SUFFIXES.contains(&&name[dot..]) {
                None
            } else {
                Some(ParseError::new(ParseErrorKind::ParseError, offset + dot))
            }
        })
        .min_by_key(|e| e.offset)
}
