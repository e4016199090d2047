//! # Flow compiler
//!
//! Translates decoded block flows into program trees. The translation is a
//! pure recursive walk: every rule builds fresh nodes, the loop nesting depth
//! is passed down explicitly, and the first unresolvable opcode aborts the
//! whole compilation.
//!
//! - `expr`: argument trees to expressions
//! - `stmt`: blocks to statements
//! - `assemble`: actions, mouse programs and projects

pub mod assemble;
pub mod compile_error;
pub mod expr;
pub mod stmt;

pub use compile_error::CompileError;

use crate::config::{CompilerConfig, Conventions};
use crate::program::tree::{Expr, Stmt};
use crate::tables::LookupTables;

pub struct Compiler {
    tables: LookupTables,
    conventions: Conventions,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            tables: config.tables,
            conventions: config.conventions,
        }
    }

    pub fn with_tables(tables: LookupTables) -> Self {
        Self {
            tables,
            conventions: Conventions::default(),
        }
    }

    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// The execution-context binding as an expression.
    fn context(&self) -> Expr {
        Expr::ident(&self.conventions.context)
    }

    /// `return <context>.<marker>`
    fn end_marker(&self, marker: &str) -> Stmt {
        Stmt::Return(Expr::member(self.context(), marker))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}
