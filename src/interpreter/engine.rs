// Runtime of the control box logic: program, memory and I/O masks

use crate::interpreter::constants::{
    clamp, port_index, DEADLINE_SYMBOL, DEFAULT_DEADLINE, NIBBLE_MAX, PORT_INPUT_SUFFIXES,
    PORT_NAMES, RCA_CHANNELS, SIGNAL_FALSE, SIGNAL_TRUE,
};
use crate::interpreter::expressions::evaluate;
use crate::interpreter::functions::FunctionTable;
use crate::memory::Memory;
use crate::parser::parse::ParseErrorKind;
use crate::program::Program;
use crate::snapshot::LogicState;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

/// Extended bus channel symbols, `di0`..`di15` and `do0`..`do15`
static RCA_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(di|do)([0-9]|1[0-5])(\..*)?$").expect("RCA symbol pattern is valid")
});

/// Bit mask of the nibble at `index`
fn nibble_mask(index: usize) -> u32 {
    0xf << (4 * index)
}

fn rca_nibble_mask(channel: usize) -> u64 {
    0xf << (4 * channel)
}

/// The logic runtime of one device.
///
/// The embedding device owns a `Logic` and drives it synchronously: it writes
/// inputs (`port_input_data`, `rca_input_data`, `.clock`, `.time`, edge
/// interrupts), calls [`Logic::tick`], then reads `port_output_data` and
/// `rca_output_data`. How often it ticks is up to the device; `.deadline` in
/// memory tells it how long it may wait.
#[derive(Debug, Clone)]
pub struct Logic {
    code: String,
    program: Program,
    memory: Memory,
    functions: FunctionTable,

    port_input_mask: u32,
    port_output_mask: u32,
    rca_input_mask: u64,
    rca_output_mask: u64,

    /// Port nibbles supplied by the device, copied in at the start of a tick
    pub port_input_data: u32,
    /// Port nibbles computed by the last tick
    pub port_output_data: u32,
    /// Bus nibbles supplied by the device
    pub rca_input_data: u64,
    /// Bus nibbles computed by the last tick
    pub rca_output_data: u64,

    /// Rising port edges seen by the device between ticks
    pub intr_redges: u32,
    /// Falling port edges seen by the device between ticks
    pub intr_fedges: u32,
}

impl Default for Logic {
    fn default() -> Self {
        Self::new()
    }
}

impl Logic {
    pub fn new() -> Self {
        Self::with_functions(FunctionTable::standard())
    }

    /// Runtime with a custom function table
    pub fn with_functions(functions: FunctionTable) -> Self {
        Logic {
            code: String::new(),
            program: Program::new(),
            memory: Memory::new(),
            functions,
            port_input_mask: 0,
            port_output_mask: 0,
            rca_input_mask: 0,
            rca_output_mask: 0,
            port_input_data: 0,
            port_output_data: 0,
            rca_input_data: 0,
            rca_output_data: 0,
            intr_redges: 0,
            intr_fedges: 0,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Replaces the program, clears memory and re-derives the I/O masks.
    ///
    /// Setting the text that is already running is a no-op. Returns whether
    /// every line parsed.
    pub fn set_code(&mut self, text: &str) -> bool {
        if self.code == text && !self.program.is_empty() {
            return self.valid();
        }
        self.code = text.to_string();
        self.program = Program::build(&self.code, &self.functions);
        self.memory.clear();
        self.derive_masks();

        for invalid in &self.program.invalid_entries {
            warn!(
                line = invalid.line_index + 1,
                offset = invalid.error_offset(),
                error = %invalid.kind(),
                "line not executable"
            );
        }
        debug!(
            entries = self.program.entries.len(),
            errors = self.program.invalid_entries.len(),
            port_inputs = format_args!("{:06x}", self.port_input_mask),
            port_outputs = format_args!("{:06x}", self.port_output_mask),
            rca_inputs = format_args!("{:016x}", self.rca_input_mask),
            rca_outputs = format_args!("{:016x}", self.rca_output_mask),
            "program built"
        );
        self.valid()
    }

    fn derive_masks(&mut self) {
        let program = &self.program;
        self.port_input_mask = 0;
        self.port_output_mask = 0;
        for (i, port) in PORT_NAMES.iter().enumerate() {
            if program.assigned_symbols.contains(*port) {
                self.port_output_mask |= nibble_mask(i);
            } else if PORT_INPUT_SUFFIXES
                .iter()
                .any(|suffix| program.all_symbols.contains(&format!("{}{}", port, suffix)))
            {
                self.port_input_mask |= nibble_mask(i);
            }
        }

        self.rca_input_mask = 0;
        self.rca_output_mask = 0;
        for symbol in &program.all_symbols {
            let Some(caps) = RCA_SYMBOL.captures(symbol) else {
                continue;
            };
            let Ok(channel) = caps[2].parse::<usize>() else {
                continue;
            };
            if &caps[1] == "di" {
                self.rca_input_mask |= rca_nibble_mask(channel);
            } else if program.assigned_symbols.contains(symbol) {
                self.rca_output_mask |= rca_nibble_mask(channel);
            }
        }

        self.port_output_data &= self.port_output_mask;
        self.rca_output_data &= self.rca_output_mask;
    }

    /// Runs one evaluation cycle
    pub fn tick(&mut self) {
        self.copy_inputs();
        self.detect_edges();
        self.fold_interrupts();
        self.memory.set(DEADLINE_SYMBOL, DEFAULT_DEADLINE);

        for entry in &mut self.program.entries {
            let result = evaluate(&entry.parsed.root, &mut self.memory);
            entry.last_result = result;
            let target = entry.parsed.target();
            if target.is_empty() {
                continue;
            }
            if port_index(target).is_some() {
                self.memory.set(target, clamp(result, 0, NIBBLE_MAX));
            } else {
                self.memory.set(target, result);
            }
        }

        self.port_output_data = 0;
        for (i, port) in PORT_NAMES.iter().enumerate() {
            let value = clamp(self.memory.get(port), 0, NIBBLE_MAX) as u32;
            self.port_output_data |= value << (4 * i);
        }
        self.port_output_data &= self.port_output_mask;

        self.rca_output_data = 0;
        for channel in 0..RCA_CHANNELS {
            let value = clamp(self.memory.get(&format!("do{}", channel)), 0, NIBBLE_MAX) as u64;
            self.rca_output_data |= value << (4 * channel);
        }
        self.rca_output_data &= self.rca_output_mask;

        trace!(
            deadline = self.memory.get(DEADLINE_SYMBOL),
            ports = format_args!("{:06x}", self.port_output_data),
            rca = format_args!("{:016x}", self.rca_output_data),
            "tick"
        );
    }

    fn copy_inputs(&mut self) {
        for (i, port) in PORT_NAMES.iter().enumerate() {
            if self.port_input_mask & nibble_mask(i) != 0 {
                let value = (self.port_input_data >> (4 * i)) & 0xf;
                self.memory.set(port, value as i32);
            }
        }
        for channel in 0..RCA_CHANNELS {
            if self.rca_input_mask & rca_nibble_mask(channel) != 0 {
                let value = (self.rca_input_data >> (4 * channel)) & 0xf;
                self.memory.set(&format!("di{}", channel), value as i32);
            }
        }
    }

    /// Sets every referenced `.re`/`.fe` symbol from the level change of its
    /// base since the previous tick. The previous level is kept in `.<sym>.d`;
    /// the first observation never reports an edge.
    fn detect_edges(&mut self) {
        for symbol in &self.program.all_symbols {
            let rising = symbol.ends_with(".re");
            if !rising && !symbol.ends_with(".fe") {
                continue;
            }
            let base = &symbol[..symbol.len() - 3];
            if !self.memory.contains(base) && port_index(base).is_none() {
                continue;
            }
            let last_key = format!(".{}.d", symbol);
            let now = self.memory.get(base) > 0;
            let edge = self.memory.contains(&last_key) && {
                let before = self.memory.get(&last_key) > 0;
                if rising {
                    !before && now
                } else {
                    before && !now
                }
            };
            self.memory.set(symbol, if edge { SIGNAL_TRUE } else { SIGNAL_FALSE });
            self.memory.set(&last_key, if now { SIGNAL_TRUE } else { SIGNAL_FALSE });
        }
    }

    fn fold_interrupts(&mut self) {
        for (i, port) in PORT_NAMES.iter().enumerate() {
            if self.intr_redges & nibble_mask(i) != 0 {
                self.memory.set(&format!("{}.re", port), SIGNAL_TRUE);
            }
            if self.intr_fedges & nibble_mask(i) != 0 {
                self.memory.set(&format!("{}.fe", port), SIGNAL_TRUE);
            }
        }
        self.intr_redges = 0;
        self.intr_fedges = 0;
    }

    /// Memory value of `name`, `0` if unset
    pub fn symbol(&self, name: &str) -> i32 {
        self.memory.get(name)
    }

    pub fn set_symbol(&mut self, name: &str, value: i32) {
        self.memory.set(name, value);
    }

    pub fn symbols(&self) -> &Memory {
        &self.memory
    }

    /// Forgets all symbols, including timer and counter state
    pub fn clear_symbols(&mut self) {
        self.memory.clear();
    }

    pub fn valid(&self) -> bool {
        self.program.is_valid()
    }

    /// Parse errors keyed by char offset into the program text
    pub fn errors(&self) -> BTreeMap<usize, ParseErrorKind> {
        self.program.errors()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn port_input_mask(&self) -> u32 {
        self.port_input_mask
    }

    pub fn port_output_mask(&self) -> u32 {
        self.port_output_mask
    }

    pub fn rca_input_mask(&self) -> u64 {
        self.rca_input_mask
    }

    pub fn rca_output_mask(&self) -> u64 {
        self.rca_output_mask
    }

    /// Snapshot of code and memory
    pub fn state(&self) -> LogicState {
        LogicState::new(self.code.clone(), self.memory.clone())
    }

    /// Reinstates a snapshot. Memory is taken as-is, so running timers and
    /// counters carry on.
    pub fn restore(&mut self, state: LogicState) {
        self.code.clear();
        self.program = Program::new();
        self.set_code(&state.code);
        self.memory = state
            .memory
            .iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logic(code: &str) -> Logic {
        let mut logic = Logic::new();
        logic.set_code(code);
        logic
    }

    #[test]
    fn test_port_masks() {
        let logic = logic("r = u\ny = g.co.re");
        // d u r y g b
        assert_eq!(logic.port_output_mask(), 0x000f00 | 0x00f000);
        assert_eq!(logic.port_input_mask(), 0x0000f0 | 0x0f0000);
        assert!(logic.program().all_symbols.contains("g.co"));
    }

    #[test]
    fn test_output_port_is_not_input() {
        let logic = logic("r = r.re + 1");
        assert_eq!(logic.port_input_mask() & 0xf00, 0);
        assert_eq!(logic.port_output_mask(), 0xf00);
    }

    #[test]
    fn test_rca_masks() {
        let logic = logic("do3 = di0 + di15.re\ndo4 + 1");
        assert_eq!(logic.rca_input_mask(), 0xf | (0xf << 60));
        assert_eq!(logic.rca_output_mask(), 0xf << 12);
    }

    #[test]
    fn test_inputs_copied_and_outputs_clamped() {
        let mut logic = logic("r = u * 3\ndo1 = di2 - 20");
        logic.port_input_data = 0x00000070; // u = 7
        logic.rca_input_data = 0x0000_0000_0000_0500; // di2 = 5
        logic.tick();
        assert_eq!(logic.symbol("u"), 7);
        assert_eq!(logic.symbol("r"), 15);
        assert_eq!(logic.port_output_data, 0xf00);
        assert_eq!(logic.symbol("do1"), -15);
        assert_eq!(logic.rca_output_data, 0);
        assert_eq!(logic.program().entries[0].last_result, 21);
    }

    #[test]
    fn test_edges_skip_first_observation() {
        let mut logic = logic("a = u.re\nb = u.fe");
        logic.port_input_data = 0x10;
        logic.tick();
        assert_eq!(logic.symbol("a"), 0);
        logic.port_input_data = 0;
        logic.tick();
        assert_eq!(logic.symbol("b"), 15);
        logic.port_input_data = 0x10;
        logic.tick();
        assert_eq!(logic.symbol("a"), 15);
        assert_eq!(logic.symbol("b"), 0);
        logic.tick();
        assert_eq!(logic.symbol("a"), 0);
    }

    #[test]
    fn test_interrupts_force_edges() {
        let mut logic = logic("a = d.re");
        logic.intr_redges = 0xf;
        logic.tick();
        assert_eq!(logic.symbol("a"), 15);
        assert_eq!(logic.intr_redges, 0);
        logic.tick();
        assert_eq!(logic.symbol("a"), 0);
    }

    #[test]
    fn test_user_symbol_edges() {
        let mut logic = logic("e = x.re");
        logic.tick();
        assert!(!logic.symbols().contains(".x.re.d"));
        logic.set_symbol("x", 0);
        logic.tick();
        assert_eq!(logic.symbol("e"), 0);
        logic.set_symbol("x", 4);
        logic.tick();
        assert_eq!(logic.symbol("e"), 15);
        logic.tick();
        assert_eq!(logic.symbol("e"), 0);
    }

    #[test]
    fn test_deadline_reset_each_tick() {
        let mut logic = logic("a = ton1(1, 3)");
        logic.tick();
        assert_eq!(logic.symbol(DEADLINE_SYMBOL), 3);
        logic.set_code("a = 1");
        logic.tick();
        assert_eq!(logic.symbol(DEADLINE_SYMBOL), DEFAULT_DEADLINE);
    }

    #[test]
    fn test_unchanged_code_keeps_memory() {
        let mut logic = logic("a = a + 1");
        logic.tick();
        logic.tick();
        assert!(logic.set_code("a = a + 1"));
        assert_eq!(logic.symbol("a"), 2);
        logic.set_code("a = a + 2");
        assert_eq!(logic.symbol("a"), 0);
    }

    #[test]
    fn test_errors_do_not_stop_valid_lines() {
        let mut logic = logic("a = b +\nc = c + 1");
        assert!(!logic.valid());
        assert_eq!(logic.errors().len(), 1);
        logic.tick();
        logic.tick();
        assert_eq!(logic.symbol("c"), 2);
        assert!(!logic.symbols().contains("a"));
    }

    #[test]
    fn test_state_round_trip() {
        let mut logic = logic("a = cnt1(1)");
        logic.tick();
        logic.tick();
        let state = logic.state();

        let mut other = Logic::new();
        other.restore(state);
        other.tick();
        assert_eq!(other.symbol("a"), 3);
        assert_eq!(other.code(), "a = cnt1(1)");
    }
}
