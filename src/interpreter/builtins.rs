//! Pure built-in functions
//!
//! - `inv(x)`: `15 - x`, clamped to the nibble range
//! - `max(...)`, `min(...)`: extremum of the arguments, `0` without arguments
//! - `mean(...)`: integer average, `0` without arguments
//! - `lim(x)`, `lim(x, hi)`, `lim(x, lo, hi)`: clamp to `[0,15]`, `[0,hi]`, `[lo,hi]`
//! - `if(c)`, `if(c, a)`, `if(c, a, b)`: `c > 0` selects `15`/`a`/`a`, else `0`/`0`/`b`
//! - `rnd()`: uniform in `[0,15]`
//! - `clock()`, `time()`: the device supplied `.clock` and `.time`
//!
//! Arguments are evaluated only when needed and at most once, in order.

use crate::interpreter::constants::{clamp, CLOCK_SYMBOL, NIBBLE_MAX, TIME_SYMBOL};
use crate::interpreter::expressions::evaluate;
use crate::memory::Memory;
use crate::parser::ast::Expr;
use rand::Rng;

pub fn inv(args: &[Expr], mem: &mut Memory) -> i32 {
    match args.first() {
        Some(x) => clamp(NIBBLE_MAX.wrapping_sub(evaluate(x, mem)), 0, NIBBLE_MAX),
        None => 0,
    }
}

pub fn max(args: &[Expr], mem: &mut Memory) -> i32 {
    args.iter().map(|e| evaluate(e, mem)).max().unwrap_or(0)
}

pub fn min(args: &[Expr], mem: &mut Memory) -> i32 {
    args.iter().map(|e| evaluate(e, mem)).min().unwrap_or(0)
}

pub fn mean(args: &[Expr], mem: &mut Memory) -> i32 {
    if args.is_empty() {
        return 0;
    }
    let sum = args
        .iter()
        .fold(0i32, |acc, e| acc.wrapping_add(evaluate(e, mem)));
    sum / args.len() as i32
}

pub fn lim(args: &[Expr], mem: &mut Memory) -> i32 {
    match args {
        [] => 0,
        [x] => clamp(evaluate(x, mem), 0, NIBBLE_MAX),
        [x, hi] => {
            let x = evaluate(x, mem);
            evaluate(hi, mem).min(x.max(0))
        }
        [x, lo, hi, ..] => {
            let x = evaluate(x, mem);
            let lo = evaluate(lo, mem);
            evaluate(hi, mem).min(x.max(lo))
        }
    }
}

pub fn if_function(args: &[Expr], mem: &mut Memory) -> i32 {
    match args {
        [] => 0,
        [c] => {
            if evaluate(c, mem) > 0 {
                NIBBLE_MAX
            } else {
                0
            }
        }
        [c, a] => {
            if evaluate(c, mem) > 0 {
                evaluate(a, mem)
            } else {
                0
            }
        }
        [c, a, b, ..] => {
            if evaluate(c, mem) > 0 {
                evaluate(a, mem)
            } else {
                evaluate(b, mem)
            }
        }
    }
}

pub fn rnd() -> i32 {
    rand::rng().random_range(0..=NIBBLE_MAX)
}

pub fn clock(mem: &Memory) -> i32 {
    mem.get(CLOCK_SYMBOL)
}

pub fn time(mem: &Memory) -> i32 {
    mem.get(TIME_SYMBOL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::functions::FunctionTable;
    use crate::parser::parse::LineParser;

    fn eval_with(line: &str, mem: &mut Memory) -> i32 {
        let functions = FunctionTable::standard();
        let parsed = LineParser::parse(line, "", &functions).unwrap();
        assert!(parsed.is_valid(), "{:?}", parsed.error);
        evaluate(&parsed.root, mem)
    }

    fn eval(line: &str) -> i32 {
        eval_with(line, &mut Memory::new())
    }

    #[test]
    fn test_inv_clamps_both_ways() {
        assert_eq!(eval("inv(15)"), 0);
        assert_eq!(eval("inv(0)"), 15);
        assert_eq!(eval("inv(20)"), 0);
        assert_eq!(eval("inv(-5)"), 15);
        assert_eq!(eval("inv(4)"), 11);
    }

    #[test]
    fn test_if_forms() {
        assert_eq!(eval("if(1, 7, 3)"), 7);
        assert_eq!(eval("if(0, 7, 3)"), 3);
        assert_eq!(eval("if(-1)"), 0);
        assert_eq!(eval("if(5)"), 15);
        assert_eq!(eval("if(5, 9)"), 9);
        assert_eq!(eval("if(0, 9)"), 0);
        assert_eq!(eval("if()"), 0);
    }

    #[test]
    fn test_extrema_and_mean() {
        assert_eq!(eval("max(3, 9, -2)"), 9);
        assert_eq!(eval("min(3, 9, -2)"), -2);
        assert_eq!(eval("max()"), 0);
        assert_eq!(eval("min()"), 0);
        assert_eq!(eval("mean(1, 2, 4)"), 2);
        assert_eq!(eval("mean()"), 0);
    }

    #[test]
    fn test_lim_forms() {
        assert_eq!(eval("lim(20)"), 15);
        assert_eq!(eval("lim(-3)"), 0);
        assert_eq!(eval("lim(9, 5)"), 5);
        assert_eq!(eval("lim(-9, 5)"), 0);
        assert_eq!(eval("lim(1, 3, 8)"), 3);
        assert_eq!(eval("lim(12, 3, 8)"), 8);
        assert_eq!(eval("lim(5, 3, 8)"), 5);
        assert_eq!(eval("lim()"), 0);
    }

    #[test]
    fn test_rnd_range() {
        for _ in 0..200 {
            let v = eval("rnd()");
            assert!((0..=15).contains(&v));
        }
    }

    #[test]
    fn test_clock_and_time() {
        let mut mem = Memory::new();
        mem.set(CLOCK_SYMBOL, 1234);
        mem.set(TIME_SYMBOL, 6000);
        assert_eq!(eval_with("clock()", &mut mem), 1234);
        assert_eq!(eval_with("time()", &mut mem), 6000);
    }
}
