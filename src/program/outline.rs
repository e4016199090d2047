use crate::program::tree::{Expr, Program, Stmt};
use std::fmt::Write;

/// Print the outline of a program to stdout.
pub fn print_outline(program: &Program) {
    println!("=== PROGRAM TREE ===\n");
    print!("{}", outline(program));
}

/// One node per line, children indented under their parent. Closures that
/// appear as call arguments are listed under the statement that owns them.
pub fn outline(program: &Program) -> String {
    let mut out = String::new();
    outline_stmts(&mut out, &program.body, 0);
    out
}

fn line(out: &mut String, indent: usize, text: impl std::fmt::Display) {
    let prefix = "  ".repeat(indent);
    // writing to a String cannot fail
    let _ = writeln!(out, "{}{}", prefix, text);
}

fn outline_stmts(out: &mut String, stmts: &[Stmt], indent: usize) {
    for stmt in stmts {
        outline_stmt(out, stmt, indent);
    }
}

fn outline_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    match stmt {
        Stmt::If {
            test,
            consequent,
            alternate,
        } => {
            line(out, indent, format_args!("if {}", test));
            outline_stmts(out, consequent, indent + 1);
            if let Some(alternate) = alternate {
                line(out, indent, "else");
                outline_stmts(out, alternate, indent + 1);
            }
        }

        Stmt::For {
            init,
            test,
            update,
            body,
        } => {
            line(
                out,
                indent,
                format_args!("for {}; {}; {}", inline(init), test, inline(update)),
            );
            outline_stmts(out, body, indent + 1);
        }

        Stmt::While { test, body } => {
            line(out, indent, format_args!("while {}", test));
            outline_stmts(out, body, indent + 1);
        }

        Stmt::DoWhile { body, test } => {
            line(out, indent, "do");
            outline_stmts(out, body, indent + 1);
            line(out, indent, format_args!("while {}", test));
        }

        Stmt::Switch {
            discriminant,
            cases,
        } => {
            line(out, indent, format_args!("switch {}", discriminant));
            outline_stmts(out, cases, indent + 1);
        }

        Stmt::Case { test, consequent } => {
            match test {
                Some(test) => line(out, indent, format_args!("case {}", test)),
                None => line(out, indent, "default"),
            }
            outline_stmts(out, consequent, indent + 1);
        }

        Stmt::Let { init, .. } | Stmt::Assign { value: init, .. } => {
            line(out, indent, inline(stmt));
            outline_closures(out, init, indent + 1);
        }

        Stmt::Expr(expr) => {
            line(out, indent, expr);
            outline_closures(out, expr, indent + 1);
        }

        Stmt::Break | Stmt::Return(_) => line(out, indent, inline(stmt)),
    }
}

/// List the bodies of closures reachable from `expr` without entering
/// another statement.
fn outline_closures(out: &mut String, expr: &Expr, indent: usize) {
    match expr {
        Expr::Closure { params, body, .. } => {
            line(out, indent, format_args!("closure ({})", params.join(", ")));
            outline_stmts(out, body, indent + 1);
        }
        Expr::Call { callee, args, .. } => {
            outline_closures(out, callee, indent);
            for arg in args {
                outline_closures(out, arg, indent);
            }
        }
        Expr::Binary { left, right, .. } => {
            outline_closures(out, left, indent);
            outline_closures(out, right, indent);
        }
        Expr::Unary { arg, .. } => outline_closures(out, arg, indent),
        Expr::Member { object, .. } => outline_closures(out, object, indent),
        Expr::Literal(_) | Expr::Ident(_) => {}
    }
}

/// Single-line rendering of a simple statement.
fn inline(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Let { name, init } => format!("let {} = {}", name, init),
        Stmt::Assign { target, value } => format!("{} = {}", target, value),
        Stmt::Expr(expr) => expr.to_string(),
        Stmt::Return(expr) => format!("return {}", expr),
        Stmt::Break => "break".to_string(),
        Stmt::If { .. } => "if ...".to_string(),
        Stmt::For { .. } => "for ...".to_string(),
        Stmt::While { .. } => "while ...".to_string(),
        Stmt::DoWhile { .. } => "do ...".to_string(),
        Stmt::Switch { .. } => "switch ...".to_string(),
        Stmt::Case { .. } => "case ...".to_string(),
    }
}
