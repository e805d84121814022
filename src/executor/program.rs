use super::value::Value;
use crate::parser::{BinaryOp, Source};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Push `values[idx]` from the constant pool.
    LoadConst(usize),
    LoadUndefined,
    LoadNull,
    LoadBool(bool),
    LoadName(Rc<str>),
    /// Assign the top of stack to an existing binding, leaving it in place.
    StoreName(Rc<str>),
    DefineLet(Rc<str>),
    DefineVar(Rc<str>),
    LoadThis,
    LoadGlobalThis,
    Neg,
    Not,
    Binary(BinaryOp),
    Pop,
    /// Pop into the completion value slot.
    SaveResult,
    EnterBlock,
    LeaveBlock,
    /// Pause marker emitted for `debugger;`.
    Debugger,
    Halt,
}

/// Resolved source position of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position<'a> {
    pub file: &'a str,
    pub line: usize,
    pub column: usize,
}

/// A compiled script or debugger fragment.
#[derive(Debug)]
pub struct Program {
    pub code: Vec<Instruction>,
    /// Literal constant pool.
    pub values: Vec<Value>,
    /// `(pc, source offset)` pairs, sorted by pc. Only the first
    /// instruction of each statement gets an entry.
    pub(crate) positions: Vec<(usize, usize)>,
    pub src: Source,
}

impl Program {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Source offset of the closest entry at or before `pc`.
    pub fn source_offset(&self, pc: usize) -> usize {
        match self.positions.binary_search_by_key(&pc, |&(p, _)| p) {
            Ok(i) => self.positions[i].1,
            Err(0) => 0,
            Err(i) => self.positions[i - 1].1,
        }
    }

    pub fn position_at(&self, pc: usize) -> Position<'_> {
        let (line, column) = self.src.line_col(self.source_offset(pc));
        Position {
            file: self.src.name(),
            line,
            column,
        }
    }

    /// Constant pool rendered as `[v1 v2 ...]`.
    pub fn values_display(&self) -> String {
        let parts: Vec<String> = self.values.iter().map(ToString::to_string).collect();
        format!("[{}]", parts.join(" "))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::LoadConst(idx) => write!(f, "LOAD_CONST {idx}"),
            Instruction::LoadName(name) => write!(f, "LOAD_NAME {name}"),
            Instruction::StoreName(name) => write!(f, "STORE_NAME {name}"),
            Instruction::DefineLet(name) => write!(f, "DEFINE_LET {name}"),
            Instruction::DefineVar(name) => write!(f, "DEFINE_VAR {name}"),
            Instruction::LoadBool(b) => write!(f, "LOAD_BOOL {b}"),
            Instruction::Binary(op) => write!(f, "BINARY {op:?}"),
            other => write!(f, "{}", format!("{other:?}").to_uppercase()),
        }
    }
}
