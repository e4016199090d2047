use tracing::{trace, warn};

use crate::compile::{Compiler, CompileError};
use crate::lang::flow::{Arg, Block, FlowTree, Head};
use crate::program::tree::{BinaryOp, CallMode, Expr, Sequence, Stmt};

impl Compiler {
    /// Compile a flow into statements, in order.
    ///
    /// `depth` is the number of enclosing counted loops; it selects the
    /// iterator name of any `repeat` found at this level.
    pub fn compile_block(&self, flow: &[Block], depth: usize) -> Result<Sequence, CompileError> {
        let mut stmts = Vec::with_capacity(flow.len());
        for block in flow {
            stmts.push(self.compile_stmt(block, depth)?);
        }

        Ok(stmts)
    }

    fn compile_stmt(&self, block: &Block, depth: usize) -> Result<Stmt, CompileError> {
        match &block.head {
            Head::StoreIn(name) => {
                trace!(name = %name, "storein");
                Ok(Stmt::Let {
                    name: name.clone(),
                    init: self.compile_nth(&block.args, 0),
                })
            }

            // Actions take the context as their only argument.
            Head::NamedDo(name) => {
                trace!(name = %name, "nameddo");
                Ok(Stmt::Expr(Expr::call(
                    Expr::ident(name),
                    vec![self.context()],
                    CallMode::Suspend,
                )))
            }

            Head::Op(opcode) => {
                trace!(opcode = %opcode, depth, "block");
                self.compile_op(opcode, block, depth)
            }
        }
    }

    fn compile_op(&self, opcode: &str, block: &Block, depth: usize) -> Result<Stmt, CompileError> {
        let stmt = match opcode {
            // ───────────────────────────── Conditionals ─────────────────────────────
            "if" => Stmt::If {
                test: self.compile_nth(&block.args, 0),
                consequent: self.compile_body(&block.body, depth)?,
                alternate: None,
            },

            "ifthenelse" => Stmt::If {
                test: self.compile_nth(&block.args, 0),
                consequent: self.compile_body(&block.body, depth)?,
                alternate: Some(self.compile_body(&block.else_body, depth)?),
            },

            // ───────────────────────────────── Loops ─────────────────────────────────
            "repeat" => self.compile_repeat(block, depth)?,

            "while" => Stmt::While {
                test: self.compile_nth(&block.args, 0),
                body: self.compile_body(&block.body, depth)?,
            },

            "forever" => Stmt::While {
                test: Expr::literal(true),
                body: self.compile_body(&block.body, depth)?,
            },

            "until" => Stmt::DoWhile {
                body: self.compile_body(&block.body, depth)?,
                test: self.compile_nth(&block.args, 0),
            },

            "break" => Stmt::Break,

            // ───────────────────────────────── Switch ────────────────────────────────
            "switch" => Stmt::Switch {
                discriminant: self.compile_nth(&block.args, 0),
                cases: self.compile_body(&block.body, depth)?,
            },

            "case" => {
                let mut consequent = self.compile_body(&block.body, depth)?;
                consequent.push(Stmt::Break);
                Stmt::Case {
                    test: Some(self.compile_nth(&block.args, 0)),
                    consequent,
                }
            }

            // No trailing break: falls off the end of the switch.
            "defaultcase" => Stmt::Case {
                test: None,
                consequent: self.compile_body(&block.body, depth)?,
            },

            // ──────────────────────────────── Boxes ──────────────────────────────────
            "increment" => self.compile_increment(
                opcode,
                &block.args,
                self.compile_nth(&block.args, 1),
                BinaryOp::Add,
            )?,

            "incrementOne" => {
                self.compile_increment(opcode, &block.args, Expr::literal(1), BinaryOp::Add)?
            }

            "decrementOne" => {
                self.compile_increment(opcode, &block.args, Expr::literal(1), BinaryOp::Sub)?
            }

            // ───────────────────────────── Table-driven ──────────────────────────────
            _ => {
                if let Some(attr) = self.tables.setter(opcode) {
                    self.compile_set(attr, &block.args)
                } else if let Some(method) = self.tables.method(opcode) {
                    self.compile_method_call(opcode, method, block, depth)?
                } else if opcode == "print" {
                    Stmt::Expr(Expr::call(
                        Expr::path(&self.conventions.log),
                        self.compile_args(&block.args),
                        CallMode::Plain,
                    ))
                } else {
                    warn!(opcode = %opcode, "unsupported opcode");
                    return Err(CompileError::unsupported(&block.head));
                }
            }
        };

        Ok(stmt)
    }

    fn compile_body(&self, body: &Option<FlowTree>, depth: usize) -> Result<Sequence, CompileError> {
        match body {
            Some(flow) => self.compile_block(flow, depth),
            None => Ok(Vec::new()),
        }
    }

    /// `for (let iN = 0; iN < bound; iN = iN + 1) { body }` with N = depth.
    fn compile_repeat(&self, block: &Block, depth: usize) -> Result<Stmt, CompileError> {
        let iterator = self.conventions.iterator(depth);

        Ok(Stmt::For {
            init: Box::new(Stmt::Let {
                name: iterator.clone(),
                init: Expr::literal(0),
            }),
            test: Expr::binary(
                BinaryOp::Lt,
                Expr::ident(&iterator),
                self.compile_nth(&block.args, 0),
            ),
            update: Box::new(Stmt::Assign {
                target: Expr::ident(&iterator),
                value: Expr::binary(BinaryOp::Add, Expr::ident(&iterator), Expr::literal(1)),
            }),
            body: self.compile_body(&block.body, depth + 1)?,
        })
    }

    /// `target = target <op> delta`, target being the first argument.
    ///
    /// Only a variable (`box_` reference) or a context attribute (getter)
    /// can be assigned to.
    fn compile_increment(
        &self,
        opcode: &str,
        args: &[Arg],
        delta: Expr,
        op: BinaryOp,
    ) -> Result<Stmt, CompileError> {
        let target = self.compile_nth(args, 0);
        if !matches!(target, Expr::Ident(_) | Expr::Member { .. }) {
            warn!(opcode = %opcode, target = %target, "invalid assignment target");
            return Err(CompileError::InvalidTarget {
                opcode: opcode.to_string(),
                target: target.to_string(),
            });
        }

        Ok(Stmt::Assign {
            value: Expr::binary(op, target.clone(), delta),
            target,
        })
    }

    /// `await <context>.<method>(args...)`, plus a trailing callback for clamps.
    fn compile_method_call(
        &self,
        opcode: &str,
        method: &str,
        block: &Block,
        depth: usize,
    ) -> Result<Stmt, CompileError> {
        let mut args = self.compile_args(&block.args);

        if self.tables.is_clamp(opcode) {
            let mut body = self.compile_body(&block.body, depth)?;
            body.push(self.end_marker(&self.conventions.end_of_flow));
            args.push(Expr::Closure {
                params: Vec::new(),
                body,
                is_async: true,
            });
        }

        Ok(Stmt::Expr(Expr::call(
            Expr::member_path(self.context(), method),
            args,
            CallMode::Suspend,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::value::Value;
    use crate::tables::LookupTables;

    fn int(n: i64) -> Arg {
        Arg::Literal(Value::Integer(n))
    }

    fn print(text: &str) -> Block {
        Block::new("print", vec![Arg::Literal(Value::String(text.to_string()))])
    }

    fn log(text: &str) -> Stmt {
        Stmt::Expr(Expr::call(
            Expr::path("console.log"),
            vec![Expr::literal(text)],
            CallMode::Plain,
        ))
    }

    /// Iterator names of every counted loop, outermost first.
    fn iterators(stmts: &[Stmt], out: &mut Vec<String>) {
        for stmt in stmts {
            if let Stmt::For { init, body, .. } = stmt {
                if let Stmt::Let { name, .. } = init.as_ref() {
                    out.push(name.clone());
                }
                iterators(body, out);
            }
        }
    }

    #[test]
    fn test_repeat_with_print() {
        let flow = vec![Block::new("repeat", vec![int(3)]).with_body(vec![print("hi")])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                assert_eq!(
                    **init,
                    Stmt::Let {
                        name: "i0".to_string(),
                        init: Expr::literal(0)
                    }
                );
                assert_eq!(
                    *test,
                    Expr::binary(BinaryOp::Lt, Expr::ident("i0"), Expr::literal(3))
                );
                assert!(matches!(**update, Stmt::Assign { .. }));
                assert_eq!(body, &vec![log("hi")]);
            }
            other => panic!("expected For, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_repeat_iterators_distinct() {
        let flow = vec![Block::new("repeat", vec![int(2)]).with_body(vec![
            Block::new("repeat", vec![int(3)]).with_body(vec![
                Block::new("repeat", vec![int(4)]).with_body(vec![print("x")]),
            ]),
        ])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let mut names = Vec::new();
        iterators(&stmts, &mut names);
        assert_eq!(names, vec!["i0", "i1", "i2"]);
    }

    #[test]
    fn test_inner_repeat_tests_only_its_iterator() {
        let flow = vec![Block::new("repeat", vec![int(2)])
            .with_body(vec![Block::new("repeat", vec![int(5)]).with_body(vec![])])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let Stmt::For { body, .. } = &stmts[0] else {
            panic!("expected outer For");
        };
        let Stmt::For { test, .. } = &body[0] else {
            panic!("expected inner For");
        };
        assert_eq!(test.to_string(), "(i1 < 5)");
    }

    #[test]
    fn test_sibling_repeats_share_depth() {
        let flow = vec![
            Block::new("repeat", vec![int(1)]).with_body(vec![]),
            Block::new("repeat", vec![int(1)]).with_body(vec![]),
        ];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let mut names = Vec::new();
        iterators(&stmts, &mut names);
        assert_eq!(names, vec!["i0", "i0"]);
    }

    #[test]
    fn test_repeat_inside_if_keeps_depth() {
        let flow = vec![Block::new("repeat", vec![int(2)]).with_body(vec![
            Block::new("if", vec![Arg::Literal(Value::Bool(true))])
                .with_body(vec![Block::new("repeat", vec![int(2)]).with_body(vec![])]),
        ])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let Stmt::For { body, .. } = &stmts[0] else {
            panic!("expected For");
        };
        let Stmt::If { consequent, .. } = &body[0] else {
            panic!("expected If");
        };
        let mut names = Vec::new();
        iterators(consequent, &mut names);
        assert_eq!(names, vec!["i1"]);
    }

    #[test]
    fn test_if_with_break() {
        let flow = vec![Block::new("if", vec![Arg::expr("less", vec![int(1), int(2)])])
            .with_body(vec![Block::new("break", vec![])])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        assert_eq!(
            stmts,
            vec![Stmt::If {
                test: Expr::binary(BinaryOp::Lt, Expr::literal(1), Expr::literal(2)),
                consequent: vec![Stmt::Break],
                alternate: None,
            }]
        );
    }

    #[test]
    fn test_ifthenelse() {
        let flow = vec![Block::new("ifthenelse", vec![Arg::LocalRef("ok".to_string())])
            .with_body(vec![print("yes")])
            .with_else(vec![print("no")])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        assert_eq!(
            stmts,
            vec![Stmt::If {
                test: Expr::ident("ok"),
                consequent: vec![log("yes")],
                alternate: Some(vec![log("no")]),
            }]
        );
    }

    #[test]
    fn test_forever_and_while() {
        let flow = vec![
            Block::new("forever", vec![]).with_body(vec![Block::new("break", vec![])]),
            Block::new("while", vec![Arg::LocalRef("go".to_string())]).with_body(vec![]),
        ];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        assert_eq!(
            stmts[0],
            Stmt::While {
                test: Expr::literal(true),
                body: vec![Stmt::Break],
            }
        );
        assert_eq!(
            stmts[1],
            Stmt::While {
                test: Expr::ident("go"),
                body: vec![],
            }
        );
    }

    #[test]
    fn test_until_is_post_test() {
        let flow = vec![Block::new("until", vec![Arg::expr("greater", vec![int(3), int(1)])])
            .with_body(vec![print("once")])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        assert_eq!(
            stmts,
            vec![Stmt::DoWhile {
                body: vec![log("once")],
                test: Expr::binary(BinaryOp::Gt, Expr::literal(3), Expr::literal(1)),
            }]
        );
    }

    #[test]
    fn test_case_appends_break_default_does_not() {
        let flow = vec![Block::new("switch", vec![Arg::LocalRef("n".to_string())]).with_body(vec![
            Block::new("case", vec![int(1)]).with_body(vec![print("one")]),
            Block::new("case", vec![int(2)])
                .with_body(vec![print("two"), Block::new("break", vec![])]),
            Block::new("defaultcase", vec![]).with_body(vec![print("other")]),
        ])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let Stmt::Switch {
            discriminant,
            cases,
        } = &stmts[0]
        else {
            panic!("expected Switch");
        };
        assert_eq!(*discriminant, Expr::ident("n"));
        assert_eq!(
            cases[0],
            Stmt::Case {
                test: Some(Expr::literal(1)),
                consequent: vec![log("one"), Stmt::Break],
            }
        );
        // explicit break in the body still gets a trailing one
        assert_eq!(
            cases[1],
            Stmt::Case {
                test: Some(Expr::literal(2)),
                consequent: vec![log("two"), Stmt::Break, Stmt::Break],
            }
        );
        assert_eq!(
            cases[2],
            Stmt::Case {
                test: None,
                consequent: vec![log("other")],
            }
        );
    }

    #[test]
    fn test_empty_case_is_just_break() {
        let flow = vec![Block::new("case", vec![int(7)])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Case {
                test: Some(Expr::literal(7)),
                consequent: vec![Stmt::Break],
            }]
        );
    }

    #[test]
    fn test_increment_family() {
        let flow = vec![
            Block::new("increment", vec![Arg::LocalRef("n".to_string()), int(5)]),
            Block::new("incrementOne", vec![Arg::LocalRef("n".to_string())]),
            Block::new("decrementOne", vec![Arg::LocalRef("n".to_string())]),
        ];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let expected = |op, delta| Stmt::Assign {
            target: Expr::ident("n"),
            value: Expr::binary(op, Expr::ident("n"), delta),
        };
        assert_eq!(
            stmts,
            vec![
                expected(BinaryOp::Add, Expr::literal(5)),
                expected(BinaryOp::Add, Expr::literal(1)),
                expected(BinaryOp::Sub, Expr::literal(1)),
            ]
        );
    }

    #[test]
    fn test_increment_getter_target() {
        let flow = vec![Block::new("incrementOne", vec![Arg::expr("beatfactor", vec![])])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let target = Expr::member(Expr::ident("mouse"), "BEATFACTOR");
        assert_eq!(
            stmts,
            vec![Stmt::Assign {
                value: Expr::binary(BinaryOp::Add, target.clone(), Expr::literal(1)),
                target,
            }]
        );
    }

    #[test]
    fn test_increment_rejects_literal_target() {
        let flow = vec![Block::new(
            "increment",
            vec![Arg::Literal(Value::String("n".to_string())), int(5)],
        )];
        let err = Compiler::default().compile_block(&flow, 0).unwrap_err();

        assert_eq!(
            err,
            CompileError::InvalidTarget {
                opcode: "increment".to_string(),
                target: "\"n\"".to_string(),
            }
        );
    }

    #[test]
    fn test_decrement_rejects_missing_target() {
        let flow = vec![Block::new("decrementOne", vec![])];
        let err = Compiler::default().compile_block(&flow, 0).unwrap_err();

        assert!(matches!(
            err,
            CompileError::InvalidTarget { ref target, .. } if target == "null"
        ));
    }

    #[test]
    fn test_storein_declares() {
        let flow = vec![Block::new("storein2_x", vec![int(5)])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Let {
                name: "x".to_string(),
                init: Expr::literal(5),
            }]
        );
    }

    #[test]
    fn test_nameddo_passes_context() {
        let flow = vec![Block::new("nameddo_chorus", vec![int(9)])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Expr(Expr::call(
                Expr::ident("chorus"),
                vec![Expr::ident("mouse")],
                CallMode::Suspend,
            ))]
        );
    }

    #[test]
    fn test_setter_block() {
        let flow = vec![Block::new("setnotevolume", vec![int(80)])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Assign {
                target: Expr::member(Expr::ident("mouse"), "MASTERVOLUME"),
                value: Expr::literal(80),
            }]
        );
    }

    #[test]
    fn test_method_call_suspends() {
        let flow = vec![Block::new(
            "pitch",
            vec![Arg::Literal(Value::String("sol".to_string())), int(4)],
        )];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let Stmt::Expr(call) = &stmts[0] else {
            panic!("expected call statement");
        };
        assert_eq!(call.to_string(), "await mouse.playPitch(\"sol\", 4)");
    }

    #[test]
    fn test_dotted_method_name() {
        let flow = vec![Block::new("random", vec![int(0), int(9)])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let Stmt::Expr(call) = &stmts[0] else {
            panic!("expected call statement");
        };
        assert_eq!(call.to_string(), "await mouse.MathUtility.doRandom(0, 9)");
    }

    #[test]
    fn test_clamp_gets_trailing_callback() {
        let flow = vec![Block::new("newnote", vec![int(1), int(4)])
            .with_body(vec![Block::new("pitch", vec![Arg::Literal("do".into()), int(4)])])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let Stmt::Expr(Expr::Call { args, mode, .. }) = &stmts[0] else {
            panic!("expected call statement");
        };
        assert_eq!(*mode, CallMode::Suspend);
        assert_eq!(args.len(), 3);

        let Expr::Closure {
            params,
            body,
            is_async,
        } = &args[2]
        else {
            panic!("expected trailing closure, got {:?}", args[2]);
        };
        assert!(params.is_empty());
        assert!(*is_async);
        assert_eq!(body.len(), 2);
        assert_eq!(
            body.last(),
            Some(&Stmt::Return(Expr::member(Expr::ident("mouse"), "ENDFLOW")))
        );
    }

    #[test]
    fn test_clamp_without_body_still_gets_callback() {
        let flow = vec![Block::new("vibrato", vec![int(5), int(1)])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let Stmt::Expr(Expr::Call { args, .. }) = &stmts[0] else {
            panic!("expected call statement");
        };
        assert_eq!(args.len(), 3);
        assert!(matches!(&args[2], Expr::Closure { body, .. } if body.len() == 1));
    }

    #[test]
    fn test_repeat_inside_clamp_keeps_depth() {
        let flow = vec![Block::new("repeat", vec![int(2)]).with_body(vec![
            Block::new("newnote", vec![int(1)])
                .with_body(vec![Block::new("repeat", vec![int(2)]).with_body(vec![])]),
        ])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let Stmt::For { body, .. } = &stmts[0] else {
            panic!("expected For");
        };
        let Stmt::Expr(Expr::Call { args, .. }) = &body[0] else {
            panic!("expected clamp call");
        };
        let Expr::Closure { body, .. } = &args[1] else {
            panic!("expected closure");
        };
        let mut names = Vec::new();
        iterators(body, &mut names);
        assert_eq!(names, vec!["i1"]);
    }

    #[test]
    fn test_non_clamp_ignores_body() {
        let flow = vec![Block::new("forward", vec![int(100)]).with_body(vec![print("lost")])];
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();

        let Stmt::Expr(Expr::Call { args, .. }) = &stmts[0] else {
            panic!("expected call statement");
        };
        assert_eq!(args, &vec![Expr::literal(100)]);
    }

    #[test]
    fn test_unknown_opcode_fails() {
        let flow = vec![print("before"), Block::new("unknownblock", vec![])];
        let err = Compiler::default().compile_block(&flow, 0).unwrap_err();
        assert_eq!(err, CompileError::UnsupportedOpcode("unknownblock".to_string()));
    }

    #[test]
    fn test_unknown_opcode_deep_inside_fails() {
        let flow = vec![Block::new("repeat", vec![int(2)]).with_body(vec![
            Block::new("if", vec![Arg::Literal(Value::Bool(true))])
                .with_body(vec![Block::new("mystery", vec![])]),
        ])];
        let err = Compiler::default().compile_block(&flow, 0).unwrap_err();
        assert_eq!(err.opcode(), "mystery");
    }

    #[test]
    fn test_unknown_composite_fails_with_full_text() {
        let flow = vec![Block::new("storein_x", vec![int(1)])];
        let err = Compiler::default().compile_block(&flow, 0).unwrap_err();
        assert_eq!(err.opcode(), "storein_x");
    }

    #[test]
    fn test_clamp_without_method_fails() {
        let flow = vec![Block::new("definemode", vec![]).with_body(vec![])];
        let err = Compiler::default().compile_block(&flow, 0).unwrap_err();
        assert_eq!(err.opcode(), "definemode");
    }

    #[test]
    fn test_table_wins_over_print() {
        let tables = LookupTables::new().with_method("print", "say");
        let flow = vec![print("hello")];
        let stmts = Compiler::with_tables(tables).compile_block(&flow, 0).unwrap();

        let Stmt::Expr(call) = &stmts[0] else {
            panic!("expected call statement");
        };
        assert_eq!(call.to_string(), "await mouse.say(\"hello\")");
    }

    #[test]
    fn test_order_preserved() {
        let flow: Vec<Block> = ["a", "b", "c", "d"].iter().map(|t| print(t)).collect();
        let stmts = Compiler::default().compile_block(&flow, 0).unwrap();
        assert_eq!(stmts, vec![log("a"), log("b"), log("c"), log("d")]);
    }
}
