use crate::compile::Compiler;
use crate::lang::{flow::Arg, value::Value};
use crate::program::tree::{BinaryOp, CallMode, Expr, Stmt, UnaryOp};

/// Value blocks that compile to operators or math calls.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operator {
    Binary(BinaryOp),
    Unary(UnaryOp),
    /// Dotted path of a math function.
    Math(&'static str),
}

fn operator(opcode: &str) -> Option<Operator> {
    let op = match opcode {
        "plus" => Operator::Binary(BinaryOp::Add),
        "minus" => Operator::Binary(BinaryOp::Sub),
        "multiply" => Operator::Binary(BinaryOp::Mul),
        "divide" => Operator::Binary(BinaryOp::Div),
        "mod" => Operator::Binary(BinaryOp::Mod),
        "equal" => Operator::Binary(BinaryOp::Eq),
        "less" => Operator::Binary(BinaryOp::Lt),
        "greater" => Operator::Binary(BinaryOp::Gt),
        "or" => Operator::Binary(BinaryOp::Or),
        "and" => Operator::Binary(BinaryOp::And),
        "xor" => Operator::Binary(BinaryOp::Xor),
        "not" => Operator::Unary(UnaryOp::Not),
        "neg" => Operator::Unary(UnaryOp::Neg),
        "abs" => Operator::Math("Math.abs"),
        "sqrt" => Operator::Math("Math.sqrt"),
        "power" => Operator::Math("Math.pow"),
        "int" => Operator::Math("Math.floor"),
        _ => return None,
    };
    Some(op)
}

impl Compiler {
    /// Compile argument trees in order.
    pub fn compile_args(&self, args: &[Arg]) -> Vec<Expr> {
        args.iter().map(|arg| self.compile_arg(arg)).collect()
    }

    pub fn compile_arg(&self, arg: &Arg) -> Expr {
        match arg {
            Arg::Null => Expr::Literal(Value::Null),
            Arg::LocalRef(name) => Expr::ident(name),
            Arg::Literal(value) => Expr::Literal(value.clone()),
            Arg::Expr { opcode, args } => {
                if let Some(attr) = self.tables.getter(opcode) {
                    return self.compile_get(attr);
                }

                match operator(opcode) {
                    Some(Operator::Binary(op)) => Expr::binary(
                        op,
                        self.compile_nth(args, 0),
                        self.compile_nth(args, 1),
                    ),
                    Some(Operator::Unary(op)) => Expr::unary(op, self.compile_nth(args, 0)),
                    Some(Operator::Math(path)) => {
                        Expr::call(Expr::path(path), self.compile_args(args), CallMode::Plain)
                    }
                    None => Expr::call(Expr::ident(opcode), self.compile_args(args), CallMode::Plain),
                }
            }
        }
    }

    /// Compile the `n`th argument; a missing operand reads as `null`.
    pub(crate) fn compile_nth(&self, args: &[Arg], n: usize) -> Expr {
        match args.get(n) {
            Some(arg) => self.compile_arg(arg),
            None => Expr::Literal(Value::Null),
        }
    }

    /// `<context>.<identifier> = <first arg>`
    pub fn compile_set(&self, identifier: &str, args: &[Arg]) -> Stmt {
        Stmt::Assign {
            target: self.compile_get(identifier),
            value: self.compile_nth(args, 0),
        }
    }

    /// `<context>.<identifier>`
    pub fn compile_get(&self, identifier: &str) -> Expr {
        Expr::member(self.context(), identifier)
    }
}
