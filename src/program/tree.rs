use crate::lang::value::Value;
use serde::{Deserialize, Serialize};

/// Compiled program, ready for a printer or executor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub body: Sequence,
}

/// Ordered statement sequence. Order is execution order.
pub type Sequence = Vec<Stmt>;

// =============================================================================
// STMT - statement nodes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `if (test) { consequent } else { alternate }`
    If {
        test: Expr,
        consequent: Sequence,
        alternate: Option<Sequence>,
    },

    /// Counted loop: `for (init; test; update) { body }`
    For {
        init: Box<Stmt>,
        test: Expr,
        update: Box<Stmt>,
        body: Sequence,
    },

    /// Pre-test loop.
    While { test: Expr, body: Sequence },

    /// Post-test loop: the body runs once before `test` is checked.
    DoWhile { body: Sequence, test: Expr },

    Switch {
        discriminant: Expr,
        cases: Sequence,
    },

    /// Switch case; `test` is `None` for the default case.
    Case {
        test: Option<Expr>,
        consequent: Sequence,
    },

    Break,

    /// `let name = init`
    Let { name: String, init: Expr },

    /// `target = value`
    Assign { target: Expr, value: Expr },

    /// Expression evaluated for its effect (calls).
    Expr(Expr),

    /// Ends a generated callable; carries the end-of-flow marker.
    Return(Expr),
}

// =============================================================================
// EXPR - expression nodes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Value),

    Ident(String),

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        mode: CallMode,
    },

    /// Non-computed property access: `object.property`
    Member {
        object: Box<Expr>,
        property: String,
    },

    /// Anonymous callable: `async (params) => { body }`
    Closure {
        params: Vec<String>,
        body: Sequence,
        is_async: bool,
    },
}

/// How a call is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallMode {
    /// Ordinary call.
    Plain,

    /// Suspending call: the executor waits for its effect before the next
    /// sibling statement runs.
    Suspend,

    /// Entity instantiation (`new Callee(args)`).
    Construct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Lt,
    Gt,
    Or,
    And,
    Xor,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Or => "|",
            BinaryOp::And => "&",
            BinaryOp::Xor => "^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }

    pub fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string())
    }

    pub fn member(object: Expr, property: &str) -> Expr {
        Expr::Member {
            object: Box::new(object),
            property: property.to_string(),
        }
    }

    /// Build `a.b.c` from a dotted name; a name without dots is an identifier.
    pub fn path(dotted: &str) -> Expr {
        let mut parts = dotted.split('.');
        let root = Expr::ident(parts.next().unwrap_or_default());
        parts.fold(root, Expr::member)
    }

    /// Build `object.a.b` from a dotted property path.
    pub fn member_path(object: Expr, dotted: &str) -> Expr {
        dotted.split('.').fold(object, Expr::member)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, arg: Expr) -> Expr {
        Expr::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>, mode: CallMode) -> Expr {
        Expr::Call {
            callee: Box::new(callee),
            args,
            mode,
        }
    }
}

impl Expr {
    /// Whether the inline rendering starts with a prefix operator or sign.
    fn leads_with_sign(&self) -> bool {
        match self {
            Expr::Unary { .. } => true,
            Expr::Literal(Value::Integer(n)) => *n < 0,
            Expr::Literal(Value::Float(n)) => n.is_sign_negative(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Expr {
    /// Inline rendering used by the outline listing and error output.
    /// Closure bodies are elided.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            // `-(-x)`, not `--x`
            Expr::Unary { op, arg } if arg.leads_with_sign() => {
                write!(f, "{}({})", op.symbol(), arg)
            }
            Expr::Unary { op, arg } => write!(f, "{}{}", op.symbol(), arg),
            Expr::Call { callee, args, mode } => {
                match mode {
                    CallMode::Plain => {}
                    CallMode::Suspend => write!(f, "await ")?,
                    CallMode::Construct => write!(f, "new ")?,
                }
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Member { object, property } => write!(f, "{}.{}", object, property),
            Expr::Closure {
                params, is_async, ..
            } => {
                if *is_async {
                    write!(f, "async ")?;
                }
                write!(f, "({}) => {{...}}", params.join(", "))
            }
        }
    }
}
