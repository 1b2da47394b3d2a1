// AST definitions for the control box logic language

use crate::interpreter::functions::Builtin;
use std::fmt;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Logical
    And,
    Or,
    Xor,
    // Comparison
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg, // -x
    Not, // !x, not x
}

/// Expression tree of one program line. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(i32),
    VarRef(String),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Built-in call, resolved against the function table at parse time.
    /// `name` doubles as the state key of stateful built-ins.
    Call {
        name: String,
        builtin: Builtin,
        args: Vec<Expr>,
    },
    /// Root of every parsed line. An empty `target` discards the value.
    Assign {
        target: String,
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn unary(op: UnOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Assignment target of an `Assign` root, `None` for other nodes
    pub fn target(&self) -> Option<&str> {
        match self {
            Expr::Assign { target, .. } => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(v) => write!(f, "{}", v),
            Expr::VarRef(name) => write!(f, "{}", name),
            Expr::Unary { op: UnOp::Neg, operand } => write!(f, "(-{})", operand),
            Expr::Unary { op: UnOp::Not, operand } => write!(f, "(!{})", operand),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Call { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Assign { target, value } if target.is_empty() => write!(f, "{}", value),
            Expr::Assign { target, value } => write!(f, "{} = {}", target, value),
        }
    }
}
