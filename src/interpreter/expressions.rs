//! Expression evaluation
//!
//! [`evaluate`] walks an [`Expr`] against [`Memory`]. All arithmetic wraps on
//! overflow; division and modulo by a divisor `<= 0` yield `0`. Comparisons
//! and logical operators produce exactly `15` or `0`, where any value `> 0`
//! counts as true (`!` and `not` test for `== 0`).
//!
//! Only built-in calls touch memory as a side effect. An [`Expr::Assign`]
//! evaluates to its value; storing it is the caller's job, since the caller
//! decides about port clamping.

use crate::interpreter::builtins;
use crate::interpreter::constants::{signal, SIGNAL_FALSE, SIGNAL_TRUE};
use crate::interpreter::functions::Builtin;
use crate::interpreter::timers;
use crate::memory::Memory;
use crate::parser::ast::{BinOp, Expr, UnOp};

/// Evaluate `expr`, letting stateful built-ins read and write `mem`
pub fn evaluate(expr: &Expr, mem: &mut Memory) -> i32 {
    match expr {
        Expr::Const(v) => *v,
        Expr::VarRef(name) => mem.get(name),
        Expr::Unary { op, operand } => {
            let v = evaluate(operand, mem);
            match op {
                UnOp::Neg => v.wrapping_neg(),
                UnOp::Not => {
                    if v == 0 {
                        SIGNAL_TRUE
                    } else {
                        SIGNAL_FALSE
                    }
                }
            }
        }
        Expr::Binary { op, left, right } => evaluate_binary(*op, left, right, mem),
        Expr::Call {
            name,
            builtin,
            args,
        } => call(*builtin, name, args, mem),
        Expr::Assign { value, .. } => evaluate(value, mem),
    }
}

fn evaluate_binary(op: BinOp, left: &Expr, right: &Expr, mem: &mut Memory) -> i32 {
    match op {
        // Divisor first, the dividend is not evaluated for a degenerate divisor
        BinOp::Div => {
            let b = evaluate(right, mem);
            if b <= 0 {
                0
            } else {
                evaluate(left, mem).wrapping_div(b)
            }
        }
        BinOp::Mod => {
            let b = evaluate(right, mem);
            if b <= 0 {
                0
            } else {
                evaluate(left, mem).wrapping_rem(b)
            }
        }
        // Short-circuit like the logical operators they stand for
        BinOp::And => signal(evaluate(left, mem) > 0 && evaluate(right, mem) > 0),
        BinOp::Or => signal(evaluate(left, mem) > 0 || evaluate(right, mem) > 0),
        BinOp::Add => apply(left, right, mem, i32::wrapping_add),
        BinOp::Sub => apply(left, right, mem, i32::wrapping_sub),
        BinOp::Mul => apply(left, right, mem, i32::wrapping_mul),
        BinOp::Xor => apply(left, right, mem, |a, b| signal((a > 0) ^ (b > 0))),
        BinOp::Eq => apply(left, right, mem, |a, b| signal(a == b)),
        BinOp::Neq => apply(left, right, mem, |a, b| signal(a != b)),
        BinOp::Lt => apply(left, right, mem, |a, b| signal(a < b)),
        BinOp::Le => apply(left, right, mem, |a, b| signal(a <= b)),
        BinOp::Gt => apply(left, right, mem, |a, b| signal(a > b)),
        BinOp::Ge => apply(left, right, mem, |a, b| signal(a >= b)),
    }
}

/// Evaluates both operands left to right, then combines them
fn apply(left: &Expr, right: &Expr, mem: &mut Memory, f: impl Fn(i32, i32) -> i32) -> i32 {
    let a = evaluate(left, mem);
    let b = evaluate(right, mem);
    f(a, b)
}

/// Dispatch a built-in call. Arguments are evaluated lazily by the built-in.
pub fn call(builtin: Builtin, name: &str, args: &[Expr], mem: &mut Memory) -> i32 {
    match builtin {
        Builtin::Inv => builtins::inv(args, mem),
        Builtin::Max => builtins::max(args, mem),
        Builtin::Min => builtins::min(args, mem),
        Builtin::Mean => builtins::mean(args, mem),
        Builtin::Lim => builtins::lim(args, mem),
        Builtin::If => builtins::if_function(args, mem),
        Builtin::Rnd => builtins::rnd(),
        Builtin::Clock => builtins::clock(mem),
        Builtin::Time => builtins::time(mem),
        Builtin::Counter => timers::counter(name, args, mem),
        Builtin::TimerOn => timers::timer_on(name, args, mem),
        Builtin::TimerOff => timers::timer_off(name, args, mem),
        Builtin::TimerPulse => timers::timer_pulse(name, args, mem),
        Builtin::Interval => timers::interval(name, args, mem),
    }
}
