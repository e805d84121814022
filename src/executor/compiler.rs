use super::program::{Instruction, Program};
use super::value::Value;
use crate::error::SyntaxError;
use crate::parser::{self, Expr, Source, Stmt, StmtKind, UnaryOp};

/// Flags that shape how a source unit is compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileFlags {
    /// REPL-style fragment run inside a paused program. Its declarations
    /// live in a scope of their own.
    pub is_eval: bool,
    /// `this` refers to the global object rather than the frame receiver.
    pub is_global: bool,
}

impl CompileFlags {
    pub fn script() -> Self {
        Self {
            is_eval: false,
            is_global: true,
        }
    }
}

/// Parse and compile `source` into a runnable [`Program`].
pub fn compile(source: &Source, flags: CompileFlags) -> Result<Program, SyntaxError> {
    let body = parser::parse_program(source)?;
    let mut c = Compiler {
        flags,
        program: Program {
            code: Vec::new(),
            values: Vec::new(),
            positions: Vec::new(),
            src: source.clone(),
        },
    };

    if flags.is_eval {
        c.mark(0);
        c.emit(Instruction::EnterBlock);
    }
    for stmt in &body {
        c.statement(stmt);
    }
    if flags.is_eval {
        c.emit(Instruction::LeaveBlock);
    }
    c.emit(Instruction::Halt);

    Ok(c.program)
}

struct Compiler {
    flags: CompileFlags,
    program: Program,
}

impl Compiler {
    fn emit(&mut self, ins: Instruction) {
        self.program.code.push(ins);
    }

    fn mark(&mut self, offset: usize) {
        let pc = self.program.code.len();
        match self.program.positions.last_mut() {
            Some(last) if last.0 == pc => last.1 = offset,
            _ => self.program.positions.push((pc, offset)),
        }
    }

    fn constant(&mut self, value: Value) -> usize {
        if let Some(idx) = self.program.values.iter().position(|v| *v == value) {
            return idx;
        }
        self.program.values.push(value);
        self.program.values.len() - 1
    }

    fn statement(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Empty => {}
            StmtKind::Debugger => {
                self.mark(stmt.span.start);
                self.emit(Instruction::Debugger);
            }
            StmtKind::Let { name, init } | StmtKind::Var { name, init } => {
                self.mark(stmt.span.start);
                match init {
                    Some(expr) => self.expression(expr),
                    None => self.emit(Instruction::LoadUndefined),
                }
                let name = name.as_str().into();
                if matches!(stmt.kind, StmtKind::Let { .. }) {
                    self.emit(Instruction::DefineLet(name));
                } else {
                    self.emit(Instruction::DefineVar(name));
                }
            }
            StmtKind::Expr(expr) => {
                self.mark(stmt.span.start);
                self.expression(expr);
                self.emit(Instruction::SaveResult);
            }
            StmtKind::Block(body) => {
                self.mark(stmt.span.start);
                self.emit(Instruction::EnterBlock);
                for inner in body {
                    self.statement(inner);
                }
                // Closing brace sits at the last byte of the span.
                self.mark(stmt.span.end.saturating_sub(1));
                self.emit(Instruction::LeaveBlock);
            }
        }
    }

    fn expression(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(n) => {
                let idx = self.constant(Value::Number(*n));
                self.emit(Instruction::LoadConst(idx));
            }
            Expr::Str(s) => {
                let idx = self.constant(Value::string(s.as_str()));
                self.emit(Instruction::LoadConst(idx));
            }
            Expr::Bool(b) => self.emit(Instruction::LoadBool(*b)),
            Expr::Null => self.emit(Instruction::LoadNull),
            Expr::Undefined => self.emit(Instruction::LoadUndefined),
            Expr::Ident(name) => self.emit(Instruction::LoadName(name.as_str().into())),
            Expr::This => {
                if self.flags.is_global {
                    self.emit(Instruction::LoadGlobalThis);
                } else {
                    self.emit(Instruction::LoadThis);
                }
            }
            Expr::Unary { op, operand } => {
                self.expression(operand);
                self.emit(match op {
                    UnaryOp::Neg => Instruction::Neg,
                    UnaryOp::Not => Instruction::Not,
                });
            }
            Expr::Binary { op, lhs, rhs } => {
                self.expression(lhs);
                self.expression(rhs);
                self.emit(Instruction::Binary(*op));
            }
            Expr::Assign { name, value } => {
                self.expression(value);
                self.emit(Instruction::StoreName(name.as_str().into()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_pooled() {
        let source = Source::new("<test>", "1 + 1;\n'a' + 1;");
        let prg = compile(&source, CompileFlags::script()).expect("compile failed");
        assert_eq!(prg.values, vec![Value::Number(1.0), Value::string("a")]);
        assert_eq!(prg.code.last(), Some(&Instruction::Halt));
    }

    #[test]
    fn test_statement_positions() {
        let source = Source::new("<test>", "let a = 1;\n\nvar b = a;\n");
        let prg = compile(&source, CompileFlags::script()).expect("compile failed");
        // LoadConst, DefineLet, LoadName, DefineVar, Halt
        assert_eq!(prg.position_at(0).line, 1);
        assert_eq!(prg.position_at(1).line, 1, "inherits the statement entry");
        assert_eq!(prg.position_at(2).line, 3);
        assert_eq!(prg.position_at(4).line, 3);
    }

    #[test]
    fn test_statement_columns() {
        let source = Source::new("<test>", "let a = 1; let b = 2;\n  x;\n");
        let prg = compile(&source, CompileFlags::script()).expect("compile failed");
        // LoadConst, DefineLet, LoadConst, DefineLet, LoadName, SaveResult, Halt
        assert_eq!((prg.position_at(0).line, prg.position_at(0).column), (1, 1));
        assert_eq!((prg.position_at(2).line, prg.position_at(2).column), (1, 12));
        assert_eq!((prg.position_at(4).line, prg.position_at(4).column), (2, 3));
    }

    #[test]
    fn test_eval_fragment_gets_its_own_scope() {
        let source = Source::new("<eval>", "this");
        let flags = CompileFlags {
            is_eval: true,
            is_global: false,
        };
        let prg = compile(&source, flags).expect("compile failed");
        assert_eq!(
            prg.code,
            vec![
                Instruction::EnterBlock,
                Instruction::LoadThis,
                Instruction::SaveResult,
                Instruction::LeaveBlock,
                Instruction::Halt,
            ]
        );
    }
}
