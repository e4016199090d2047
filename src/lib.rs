//! # blockc
//!
//! Compiles block-editor flows into program trees for a downstream printer
//! or executor.
//!
//! ```text
//! JSON flow --lang::flow--> FlowTree --compile--> Program --codec--> JSON / postcard
//! ```

pub mod compile;
pub mod config;
pub mod lang;
pub mod program;
pub mod tables;

pub use compile::{CompileError, Compiler};
pub use config::{CompilerConfig, Conventions};
pub use lang::{Arg, Block, FlowError, FlowTree, Head, Project, Value};
pub use program::{Expr, Program, Stmt};
pub use tables::LookupTables;
