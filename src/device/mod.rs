//! Simulated control box
//!
//! [`ControlBox`] plays the role of the block that embeds a [`Logic`]: it
//! advances a game clock, samples port inputs, decides when the logic runs
//! and forwards outputs. Scheduling follows the in-world device:
//!
//! - the logic runs every [`TICK_INTERVAL`] game ticks, or every `tickrate`
//!   ticks if the program assigns that symbol (clamped to `1..=20`)
//! - a smaller positive `.deadline` left by the last run shortens the wait
//! - a powered/unpowered change on an input port records an edge interrupt
//!   and makes the logic run on the very next game tick

use crate::interpreter::constants::{clamp, CLOCK_SYMBOL, DEADLINE_SYMBOL, NIBBLE_MAX, PORT_NAMES, TIME_SYMBOL};
use crate::interpreter::engine::Logic;
use tracing::{debug, trace};

/// Game ticks between two logic runs unless the program says otherwise
pub const TICK_INTERVAL: i32 = 4;

/// Program symbol overriding the tick interval
pub const TICKRATE_SYMBOL: &str = "tickrate";

/// Bounds of the `tickrate` override
pub const TICKRATE_MIN: i32 = 1;
pub const TICKRATE_MAX: i32 = 20;

/// Game ticks per in-game day, the period of `.time`
pub const DAY_LENGTH: u64 = 24000;

#[derive(Debug, Clone)]
pub struct ControlBox {
    logic: Logic,
    enabled: bool,
    game_time: u64,
    tick_interval: i32,
    tick_timer: i32,
    /// Signal levels present at the six ports, nibble packed
    port_signals: u32,
    /// Number of logic runs so far
    runs: u64,
}

impl Default for ControlBox {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlBox {
    pub fn new() -> Self {
        ControlBox {
            logic: Logic::new(),
            enabled: true,
            game_time: 0,
            tick_interval: TICK_INTERVAL,
            tick_timer: TICK_INTERVAL,
            port_signals: 0,
            runs: 0,
        }
    }

    /// Wraps an existing runtime, e.g. one restored from a saved state.
    ///
    /// The game clock resumes at the `.clock` the logic last saw, so start
    /// clocks of running timers stay in the past.
    pub fn with_logic(logic: Logic) -> Self {
        let game_time = logic.symbol(CLOCK_SYMBOL).max(0) as u64;
        ControlBox {
            logic,
            game_time,
            ..Self::new()
        }
    }

    pub fn logic(&self) -> &Logic {
        &self.logic
    }

    pub fn logic_mut(&mut self) -> &mut Logic {
        &mut self.logic
    }

    pub fn set_code(&mut self, text: &str) -> bool {
        self.logic.set_code(text)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling forgets all program state and silences the outputs
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.logic.clear_symbols();
            self.logic.port_output_data = 0;
            self.logic.rca_output_data = 0;
        }
        debug!(enabled, "control box state changed");
    }

    pub fn game_time(&self) -> u64 {
        self.game_time
    }

    /// Game ticks until the logic runs again
    pub fn tick_timer(&self) -> i32 {
        self.tick_timer
    }

    pub fn tick_interval(&self) -> i32 {
        self.tick_interval
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Signal level present at port `index`
    pub fn input(&self, index: usize) -> i32 {
        ((self.port_signals >> (4 * index)) & 0xf) as i32
    }

    /// Level the device drives on port `index`
    pub fn output(&self, index: usize) -> i32 {
        ((self.logic.port_output_data >> (4 * index)) & 0xf) as i32
    }

    /// Changes the signal level at port `index`.
    ///
    /// Only input ports are watched. When the port flips between powered and
    /// unpowered since the logic last sampled it, the matching edge interrupt
    /// is recorded and the next game tick runs the logic.
    pub fn set_input(&mut self, index: usize, level: i32) {
        if index >= PORT_NAMES.len() {
            return;
        }
        let shift = 4 * index;
        let mask = 0xf_u32 << shift;
        let level = clamp(level, 0, NIBBLE_MAX) as u32;
        self.port_signals = (self.port_signals & !mask) | (level << shift);

        if self.logic.port_input_mask() & mask == 0 {
            return;
        }
        let sampled = self.logic.port_input_data & mask;
        let now = self.port_signals & mask;
        if now != 0 && sampled == 0 {
            self.logic.intr_redges |= mask;
            self.tick_timer = 0;
        } else if now == 0 && sampled != 0 {
            self.logic.intr_fedges |= mask;
            self.tick_timer = 0;
        } else {
            return;
        }
        trace!(port = PORT_NAMES[index], level, "input edge");
    }

    /// Advances one game tick. Returns whether the logic ran.
    pub fn step(&mut self) -> bool {
        self.game_time += 1;
        if self.tick_timer > 1 {
            self.tick_timer -= 1;
            return false;
        }
        self.run_logic();
        true
    }

    /// Advances `ticks` game ticks, returning how many logic runs happened
    pub fn advance(&mut self, ticks: u64) -> u64 {
        (0..ticks).filter(|_| self.step()).count() as u64
    }

    fn run_logic(&mut self) {
        let logic = &mut self.logic;
        logic.port_input_data = self.port_signals & !logic.port_output_mask();

        if self.enabled {
            logic.set_symbol(CLOCK_SYMBOL, (self.game_time & 0x7fff_ffff) as i32);
            logic.set_symbol(TIME_SYMBOL, (self.game_time % DAY_LENGTH) as i32);
            logic.tick();
            self.runs += 1;
        } else {
            logic.port_output_data = 0;
            logic.rca_output_data = 0;
        }

        if logic.symbols().contains(TICKRATE_SYMBOL) {
            self.tick_interval = clamp(logic.symbol(TICKRATE_SYMBOL), TICKRATE_MIN, TICKRATE_MAX);
        }
        self.tick_timer = self.tick_interval;
        let deadline = logic.symbol(DEADLINE_SYMBOL);
        if deadline > 0 && deadline < self.tick_timer {
            self.tick_timer = deadline;
        }
        logic.intr_redges = 0;
        logic.intr_fedges = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U: usize = 1;
    const R: usize = 2;

    fn control_box(code: &str) -> ControlBox {
        let mut device = ControlBox::new();
        assert!(device.set_code(code));
        device
    }

    #[test]
    fn test_runs_every_tick_interval() {
        let mut device = control_box("r = 15");
        assert_eq!(device.advance(3), 0);
        assert!(device.step());
        assert_eq!(device.output(R), 15);
        assert_eq!(device.advance(40), 10);
    }

    #[test]
    fn test_tickrate_override() {
        let mut device = control_box("tickrate = 2\nr = 1");
        device.advance(4);
        assert_eq!(device.tick_interval(), 2);
        assert_eq!(device.advance(10), 5);

        device.set_code("tickrate = 99");
        device.advance(2);
        assert_eq!(device.tick_interval(), TICKRATE_MAX);
    }

    #[test]
    fn test_deadline_shortens_wait() {
        let mut device = control_box("r = ton1(u, 2)");
        device.set_input(U, 15);
        assert!(device.step());
        // timer started, asks to be run again after 2 ticks
        assert_eq!(device.tick_timer(), 2);
        assert_eq!(device.output(R), 0);
        device.advance(2);
        assert_eq!(device.output(R), 15);
    }

    #[test]
    fn test_input_change_forces_next_tick() {
        let mut device = control_box("r = u.re");
        device.advance(4);
        assert_eq!(device.tick_timer(), TICK_INTERVAL);

        device.set_input(U, 9);
        assert_eq!(device.tick_timer(), 0);
        assert!(device.step());
        assert_eq!(device.output(R), 15);
        assert_eq!(device.logic().intr_redges, 0);

        // level change without crossing the powered threshold is not an edge
        device.set_input(U, 4);
        assert_eq!(device.tick_timer(), TICK_INTERVAL);
    }

    #[test]
    fn test_output_ports_ignore_inputs() {
        let mut device = control_box("r = 3");
        device.set_input(R, 15);
        assert_eq!(device.logic().intr_redges, 0);
        device.advance(4);
        assert_eq!(device.output(R), 3);
        assert_eq!(device.input(R), 15);
    }

    #[test]
    fn test_clock_and_time_supplied() {
        let mut device = control_box("a = clock()\nb = time()");
        device.advance(24004);
        assert_eq!(device.logic().symbol("a"), 24004);
        assert_eq!(device.logic().symbol("b"), 4);
    }

    #[test]
    fn test_restored_timer_continues() {
        let mut device = control_box("r = ton1(u, 20)");
        device.advance(100);
        device.set_input(U, 15);
        assert!(device.step());
        device.advance(8);
        assert_eq!(device.logic().symbol("ton1.et"), 8);

        let mut logic = Logic::new();
        logic.restore(device.logic().state());
        let mut resumed = ControlBox::with_logic(logic);
        assert_eq!(resumed.game_time(), 109);

        resumed.set_input(U, 15);
        assert!(resumed.step());
        assert_eq!(resumed.logic().symbol("ton1.et"), 9);
        resumed.advance(10);
        assert_eq!(resumed.output(R), 0);
        assert!(resumed.step());
        assert_eq!(resumed.output(R), 15);
    }

    #[test]
    fn test_disable_clears_state() {
        let mut device = control_box("a = a + 1\nr = 15");
        device.advance(8);
        assert_eq!(device.logic().symbol("a"), 2);
        device.set_enabled(false);
        assert_eq!(device.output(R), 0);
        device.advance(8);
        assert_eq!(device.logic().symbol("a"), 0);
        assert_eq!(device.output(R), 0);
        device.set_enabled(true);
        device.advance(4);
        assert_eq!(device.logic().symbol("a"), 1);
    }
}
