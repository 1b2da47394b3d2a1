//! Stateful built-ins: counters, timers and interval generators
//!
//! None of these hold private state. Everything lives in [`Memory`], keyed by
//! the function's own name (`cnt1`, `ton2`, ...):
//!
//! | key            | meaning                                         |
//! |----------------|-------------------------------------------------|
//! | `.cntN`        | counter value                                   |
//! | `<name>.et`    | elapsed ticks of a timer (readable by programs) |
//! | `<name>.pt`    | preset ticks of the running cycle (readable)    |
//! | `.<name>.clk`  | `.clock` value when the timer started (hidden)  |
//!
//! The hidden start key is removed whenever a timer settles (idle or
//! expired). Every running timer lowers `.deadline` to the ticks left until
//! it can change its output.

use crate::interpreter::constants::{clamp, signal, CLOCK_SYMBOL, SIGNAL_FALSE, SIGNAL_TRUE};
use crate::interpreter::expressions::evaluate;
use crate::memory::Memory;
use crate::parser::ast::Expr;

/// Memory keys of one timer instance
struct TimerKeys {
    clk: String,
    et: String,
    pt: String,
}

impl TimerKeys {
    fn new(name: &str) -> Self {
        TimerKeys {
            clk: format!(".{}.clk", name),
            et: format!("{}.et", name),
            pt: format!("{}.pt", name),
        }
    }

    fn clear(&self, mem: &mut Memory) {
        mem.remove(&self.clk);
        mem.remove(&self.et);
        mem.remove(&self.pt);
    }

    /// Begin a timing cycle at the current clock
    fn start(&self, mem: &mut Memory, pt: i32) {
        let now = mem.get(CLOCK_SYMBOL);
        mem.set(&self.clk, now);
        mem.set(&self.et, 1);
        mem.set(&self.pt, pt);
        mem.request_deadline(pt);
    }

    /// Update and return the elapsed ticks of a running cycle, capped at `pt`
    fn elapsed(&self, mem: &mut Memory, pt: i32) -> i32 {
        let now = mem.get(CLOCK_SYMBOL);
        let started = mem.get_or(&self.clk, now);
        let et = now.wrapping_sub(started).min(pt);
        mem.set(&self.et, et);
        et
    }
}

/// `cntN(up)`, `cntN(up, down)`, `cntN(up, down, hi)`,
/// `cntN(up, down, lo, hi)`, `cntN(up, down, lo, hi, reset)`
///
/// Counts on levels, not edges: every call with `up > 0` (and `down <= 0`)
/// adds one, every call with only `down > 0` subtracts one. Without bounds
/// the value is kept non-negative.
pub fn counter(name: &str, args: &[Expr], mem: &mut Memory) -> i32 {
    if args.is_empty() {
        return 0;
    }
    let key = format!(".{}", name);
    let mut q = mem.get(&key);

    if args.len() >= 5 && evaluate(&args[4], mem) > 0 {
        q = 0;
    } else if args.len() == 1 {
        if evaluate(&args[0], mem) > 0 {
            q = q.saturating_add(1);
        }
    } else {
        let up = evaluate(&args[0], mem);
        let down = evaluate(&args[1], mem);
        if up > 0 && down <= 0 {
            q = q.saturating_add(1);
        } else if up <= 0 && down > 0 {
            q = q.saturating_sub(1);
        }
    }

    q = match args.len() {
        1 | 2 => clamp(q, 0, i32::MAX),
        3 => {
            let hi = evaluate(&args[2], mem);
            clamp(q, 0, hi)
        }
        _ => {
            let lo = evaluate(&args[2], mem);
            let hi = evaluate(&args[3], mem);
            clamp(q, lo, hi)
        }
    };

    mem.set(&key, q);
    q
}

/// `tonN(in, pt)`: on-delay. Output goes high once `in` has been high for
/// `pt` ticks and stays high until `in` drops.
pub fn timer_on(name: &str, args: &[Expr], mem: &mut Memory) -> i32 {
    let keys = TimerKeys::new(name);
    let [input, preset] = args else {
        keys.clear(mem);
        return SIGNAL_FALSE;
    };
    let input = evaluate(input, mem);
    let pt = evaluate(preset, mem);

    if input <= 0 {
        mem.remove(&keys.clk);
        mem.set(&keys.et, 0);
        return SIGNAL_FALSE;
    }
    if pt <= 0 {
        return SIGNAL_TRUE;
    }

    let et = mem.get(&keys.et);
    if et >= pt {
        SIGNAL_TRUE
    } else if et <= 0 {
        keys.start(mem, pt);
        SIGNAL_FALSE
    } else {
        let et = keys.elapsed(mem, pt);
        if et >= pt {
            mem.remove(&keys.clk);
            SIGNAL_TRUE
        } else {
            mem.request_deadline(pt - et);
            SIGNAL_FALSE
        }
    }
}

/// `tofN(in, pt)`: off-delay. Output follows a high `in` immediately and
/// stays high for `pt` ticks after `in` drops. With `pt <= 0` the output
/// is plain `in > 0`, so a low input reads 0 rather than a latched 15.
pub fn timer_off(name: &str, args: &[Expr], mem: &mut Memory) -> i32 {
    let keys = TimerKeys::new(name);
    let [input, preset] = args else {
        keys.clear(mem);
        return SIGNAL_FALSE;
    };
    let input = evaluate(input, mem);
    let pt = evaluate(preset, mem);

    if input > 0 {
        mem.remove(&keys.clk);
        mem.set(&keys.et, 0);
        return SIGNAL_TRUE;
    }
    if pt <= 0 {
        mem.remove(&keys.clk);
        return SIGNAL_FALSE;
    }

    let et = mem.get(&keys.et);
    if et >= pt {
        SIGNAL_FALSE
    } else if et <= 0 {
        keys.start(mem, pt);
        SIGNAL_TRUE
    } else {
        let et = keys.elapsed(mem, pt);
        if et >= pt {
            mem.remove(&keys.clk);
            SIGNAL_FALSE
        } else {
            mem.request_deadline(pt - et);
            SIGNAL_TRUE
        }
    }
}

/// `tpN(in, pt)`: pulse. A rising `in` emits a pulse of `pt` ticks that
/// ignores `in` meanwhile; `in` must drop before the next pulse.
pub fn timer_pulse(name: &str, args: &[Expr], mem: &mut Memory) -> i32 {
    let keys = TimerKeys::new(name);
    let [input, preset] = args else {
        keys.clear(mem);
        return SIGNAL_FALSE;
    };
    let input = evaluate(input, mem);
    let pt = evaluate(preset, mem);

    if pt <= 0 {
        return signal(input > 0);
    }

    let et = mem.get(&keys.et);
    if et > 0 {
        if et >= pt {
            // Expired, waiting for the input to drop
            if input <= 0 {
                mem.set(&keys.et, 0);
            }
            SIGNAL_FALSE
        } else {
            let et = keys.elapsed(mem, pt);
            if et >= pt {
                mem.remove(&keys.clk);
                SIGNAL_FALSE
            } else {
                mem.request_deadline(pt - et);
                SIGNAL_TRUE
            }
        }
    } else if input > 0 {
        keys.start(mem, pt);
        SIGNAL_TRUE
    } else {
        SIGNAL_FALSE
    }
}

/// `tivN(period)`, `tivN(period, enable)`: emits `15` for one call every
/// `period` ticks of `.clock` while enabled. Periods `<= 2` never fire.
pub fn interval(name: &str, args: &[Expr], mem: &mut Memory) -> i32 {
    let keys = TimerKeys::new(name);
    let Some(period) = args.first() else {
        keys.clear(mem);
        return SIGNAL_FALSE;
    };
    let period = evaluate(period, mem);
    let enabled = match args.get(1) {
        Some(enable) => evaluate(enable, mem) > 0,
        None => true,
    };

    if period <= 2 || !enabled {
        mem.remove(&keys.clk);
        mem.set(&keys.et, 0);
        return SIGNAL_FALSE;
    }

    let now = mem.get(CLOCK_SYMBOL);
    mem.set(&keys.pt, period);

    if !mem.contains(&keys.clk) {
        mem.set(&keys.clk, now);
        mem.set(&keys.et, 0);
        mem.request_deadline(period);
        return SIGNAL_FALSE;
    }

    let et = now.wrapping_sub(mem.get(&keys.clk)).max(0);
    if et >= period {
        mem.set(&keys.clk, now);
        mem.set(&keys.et, 0);
        mem.request_deadline(1);
        SIGNAL_TRUE
    } else {
        mem.set(&keys.et, et);
        mem.request_deadline(period - et);
        SIGNAL_FALSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::constants::{DEADLINE_SYMBOL, DEFAULT_DEADLINE};
    use crate::interpreter::functions::FunctionTable;
    use crate::parser::parse::LineParser;

    /// Parses `line` once and evaluates it at each given clock value
    fn run(line: &str, mem: &mut Memory, clock: i32) -> i32 {
        let functions = FunctionTable::standard();
        let parsed = LineParser::parse(line, "", &functions).unwrap();
        assert!(parsed.is_valid(), "{:?}", parsed.error);
        mem.set(CLOCK_SYMBOL, clock);
        mem.set(DEADLINE_SYMBOL, DEFAULT_DEADLINE);
        evaluate(&parsed.root, mem)
    }

    #[test]
    fn test_counter_level_triggered() {
        let mut mem = Memory::new();
        mem.set("x", 15);
        for expected in 1..=5 {
            assert_eq!(run("cnt1(x)", &mut mem, 0), expected);
        }
        mem.set("x", 0);
        assert_eq!(run("cnt1(x)", &mut mem, 0), 5);
        assert_eq!(mem.get(".cnt1"), 5);
    }

    #[test]
    fn test_counter_up_down_and_bounds() {
        let mut mem = Memory::new();
        mem.set("up", 1);
        for _ in 0..10 {
            run("cnt2(up, down, 3)", &mut mem, 0);
        }
        assert_eq!(mem.get(".cnt2"), 3);

        mem.set("up", 0);
        mem.set("down", 1);
        for _ in 0..10 {
            run("cnt2(up, down, 3)", &mut mem, 0);
        }
        assert_eq!(mem.get(".cnt2"), 0);

        // Both high: no change
        mem.set("up", 1);
        assert_eq!(run("cnt2(up, down)", &mut mem, 0), 0);
    }

    #[test]
    fn test_counter_lower_bound_and_reset() {
        let mut mem = Memory::new();
        assert_eq!(run("cnt3(0, 0, 4, 9)", &mut mem, 0), 4);
        assert_eq!(run("cnt3(1, 0, 4, 9)", &mut mem, 0), 5);
        assert_eq!(run("cnt3(1, 0, 4, 9, 1)", &mut mem, 0), 4);
        mem.set("rst", 15);
        assert_eq!(run("cnt3(1, 0, 0, 9, rst)", &mut mem, 0), 0);
    }

    #[test]
    fn test_timer_on_sequence() {
        let mut mem = Memory::new();
        mem.set("x", 15);
        assert_eq!(run("ton1(x, 3)", &mut mem, 0), 0);
        assert_eq!(mem.get(DEADLINE_SYMBOL), 3);
        assert_eq!(run("ton1(x, 3)", &mut mem, 1), 0);
        assert_eq!(mem.get(DEADLINE_SYMBOL), 2);
        assert_eq!(run("ton1(x, 3)", &mut mem, 2), 0);
        assert_eq!(run("ton1(x, 3)", &mut mem, 3), 15);
        assert!(!mem.contains(".ton1.clk"));
        assert_eq!(mem.get("ton1.et"), 3);
        assert_eq!(run("ton1(x, 3)", &mut mem, 9), 15);

        mem.set("x", 0);
        assert_eq!(run("ton1(x, 3)", &mut mem, 10), 0);
        assert_eq!(mem.get("ton1.et"), 0);
    }

    #[test]
    fn test_timer_on_zero_preset_passes_through() {
        let mut mem = Memory::new();
        assert_eq!(run("ton2(1, 0)", &mut mem, 0), 15);
        assert_eq!(run("ton2(0, 0)", &mut mem, 1), 0);
    }

    #[test]
    fn test_timer_off_sequence() {
        let mut mem = Memory::new();
        mem.set("x", 15);
        assert_eq!(run("tof1(x, 2)", &mut mem, 0), 15);
        mem.set("x", 0);
        assert_eq!(run("tof1(x, 2)", &mut mem, 1), 15);
        assert_eq!(run("tof1(x, 2)", &mut mem, 2), 15);
        assert_eq!(run("tof1(x, 2)", &mut mem, 3), 0);
        assert!(!mem.contains(".tof1.clk"));
        assert_eq!(run("tof1(x, 2)", &mut mem, 4), 0);

        mem.set("x", 15);
        assert_eq!(run("tof1(x, 2)", &mut mem, 5), 15);
        assert_eq!(run("tof1(0, 0)", &mut mem, 6), 0);
    }

    #[test]
    fn test_timer_pulse_ignores_input_while_running() {
        let mut mem = Memory::new();
        mem.set("x", 15);
        assert_eq!(run("tp1(x, 2)", &mut mem, 0), 15);
        mem.set("x", 0);
        assert_eq!(run("tp1(x, 2)", &mut mem, 1), 15);
        mem.set("x", 15);
        assert_eq!(run("tp1(x, 2)", &mut mem, 2), 0);
        assert!(!mem.contains(".tp1.clk"));
        // Held high after expiry: no retrigger
        assert_eq!(run("tp1(x, 2)", &mut mem, 3), 0);
        mem.set("x", 0);
        assert_eq!(run("tp1(x, 2)", &mut mem, 4), 0);
        mem.set("x", 15);
        assert_eq!(run("tp1(x, 2)", &mut mem, 5), 15);
    }

    #[test]
    fn test_timer_pulse_zero_preset_passes_through() {
        let mut mem = Memory::new();
        mem.set("x", 15);
        assert_eq!(run("tp2(x, 0)", &mut mem, 0), 15);
        assert_eq!(run("tp2(x, 0)", &mut mem, 1), 15);
        mem.set("x", 0);
        assert_eq!(run("tp2(x, 0)", &mut mem, 2), 0);
        mem.set("x", -3);
        assert_eq!(run("tp2(x, -1)", &mut mem, 3), 0);
        assert!(!mem.contains(".tp2.clk"));
    }

    #[test]
    fn test_interval_generator() {
        let mut mem = Memory::new();
        let fired: Vec<i32> = (0..=9).map(|t| run("tiv1(4)", &mut mem, t)).collect();
        assert_eq!(fired, vec![0, 0, 0, 0, 15, 0, 0, 0, 15, 0]);

        run("tiv1(4)", &mut mem, 12);
        assert_eq!(mem.get(DEADLINE_SYMBOL), 1);
        run("tiv1(4)", &mut mem, 13);
        assert_eq!(mem.get(DEADLINE_SYMBOL), 3);
    }

    #[test]
    fn test_interval_short_period_and_disable() {
        let mut mem = Memory::new();
        for t in 0..6 {
            assert_eq!(run("tiv2(2)", &mut mem, t), 0);
        }
        run("tiv3(3, 1)", &mut mem, 0);
        assert!(mem.contains(".tiv3.clk"));
        assert_eq!(run("tiv3(3, 0)", &mut mem, 3), 0);
        assert!(!mem.contains(".tiv3.clk"));
    }
}
