use tracing::debug;

use crate::compile::{Compiler, CompileError};
use crate::lang::flow::{Block, Project};
use crate::program::tree::{CallMode, Expr, Program, Stmt};

impl Compiler {
    /// Compile a named action:
    ///
    /// ```text
    /// let <name> = async (mouse) => { <flow>; return mouse.ENDFLOW; }
    /// ```
    pub fn compile_action(&self, name: &str, flow: &[Block]) -> Result<Program, CompileError> {
        debug!(action = name, blocks = flow.len(), "compiling action");

        Ok(Program {
            body: vec![self.action_decl(name, flow)?],
        })
    }

    /// Compile a mouse program and wrap it in the bootstrap skeleton:
    ///
    /// ```text
    /// new Mouse(async (mouse) => { <flow>; return mouse.ENDMOUSE; });
    /// MusicBlocks.run();
    /// ```
    pub fn compile_program(&self, flow: &[Block]) -> Result<Program, CompileError> {
        debug!(blocks = flow.len(), "compiling program");

        Ok(Program {
            body: vec![self.entity_stmt(flow)?, self.run_stmt()],
        })
    }

    /// Compile every action and mouse of a project into one program: action
    /// declarations first, then one instantiation per mouse, then the run call.
    pub fn compile_project(&self, project: &Project) -> Result<Program, CompileError> {
        debug!(
            actions = project.actions.len(),
            mice = project.mice.len(),
            "compiling project"
        );

        let mut body = Vec::with_capacity(project.actions.len() + project.mice.len() + 1);

        for (name, flow) in &project.actions {
            body.push(self.action_decl(name, flow)?);
        }

        for flow in &project.mice {
            body.push(self.entity_stmt(flow)?);
        }

        body.push(self.run_stmt());

        Ok(Program { body })
    }

    fn action_decl(&self, name: &str, flow: &[Block]) -> Result<Stmt, CompileError> {
        Ok(Stmt::Let {
            name: name.to_string(),
            init: self.entry_closure(flow, &self.conventions.end_of_flow)?,
        })
    }

    fn entity_stmt(&self, flow: &[Block]) -> Result<Stmt, CompileError> {
        let closure = self.entry_closure(flow, &self.conventions.end_of_program)?;

        Ok(Stmt::Expr(Expr::call(
            Expr::path(&self.conventions.entity),
            vec![closure],
            CallMode::Construct,
        )))
    }

    fn run_stmt(&self) -> Stmt {
        Stmt::Expr(Expr::call(
            Expr::path(&self.conventions.runner),
            Vec::new(),
            CallMode::Plain,
        ))
    }

    /// `async (<context>) => { <flow>; return <context>.<marker>; }`
    fn entry_closure(&self, flow: &[Block], marker: &str) -> Result<Expr, CompileError> {
        let mut body = self.compile_block(flow, 0)?;
        body.push(self.end_marker(marker));

        Ok(Expr::Closure {
            params: vec![self.conventions.context.clone()],
            body,
            is_async: true,
        })
    }
}
