pub mod codec;
pub mod outline;
pub mod tree;

pub use tree::{BinaryOp, CallMode, Expr, Program, Sequence, Stmt, UnaryOp};
