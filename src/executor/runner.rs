use super::program::{Instruction, Program};
use super::value::{ObjectRef, Stash, Value};
use crate::error::VmError;
use crate::parser::BinaryOp;
use log::trace;
use std::rc::Rc;

/// Execution state saved around a nested run.
#[derive(Debug, Clone)]
struct VmContext {
    prg: Rc<Program>,
    pc: usize,
    sb: Option<usize>,
    args: usize,
    result: Value,
    stash: Rc<Stash>,
}

/// Stack machine executing one [`Program`] at a time.
#[derive(Debug)]
pub struct Vm {
    pub(crate) prg: Rc<Program>,
    pub(crate) pc: usize,
    pub(crate) stack: Vec<Value>,
    /// Stack index of the current frame's receiver; `None` at script level.
    pub(crate) sb: Option<usize>,
    pub(crate) args: usize,
    pub(crate) result: Value,
    pub(crate) halt: bool,
    pub(crate) stash: Rc<Stash>,
    global: ObjectRef,
    ctx_stack: Vec<VmContext>,
}

impl Vm {
    pub fn new(program: Program) -> Self {
        Self {
            prg: Rc::new(program),
            pc: 0,
            stack: Vec::new(),
            sb: None,
            args: 0,
            result: Value::Undefined,
            halt: false,
            stash: Rc::new(Stash::new(None)),
            global: ObjectRef::new(),
            ctx_stack: Vec::new(),
        }
    }

    /// Start with `this` pushed as the frame receiver.
    pub fn with_receiver(program: Program, this: Value) -> Self {
        let mut vm = Self::new(program);
        vm.sb = Some(0);
        vm.stack.push(this);
        vm
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Stack pointer: index of the next free slot.
    pub fn sp(&self) -> usize {
        self.stack.len()
    }

    pub fn sb(&self) -> Option<usize> {
        self.sb
    }

    pub fn program(&self) -> &Program {
        &self.prg
    }

    pub fn result(&self) -> &Value {
        &self.result
    }

    pub fn global_object(&self) -> &ObjectRef {
        &self.global
    }

    pub fn stash(&self) -> &Rc<Stash> {
        &self.stash
    }

    /// Receiver at the frame base, if this frame has one.
    pub fn receiver(&self) -> Option<&Value> {
        self.sb.and_then(|sb| self.stack.get(sb))
    }

    /// `this` of the current frame, defaulting to the global object.
    pub fn this_value(&self) -> Value {
        self.receiver()
            .cloned()
            .unwrap_or_else(|| Value::Object(self.global.clone()))
    }

    pub fn has_instructions(&self) -> bool {
        self.pc < self.prg.code.len()
    }

    /// Drop the remaining instructions of the current program.
    pub fn terminate(&mut self) {
        self.pc = self.prg.code.len();
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> Result<Value, VmError> {
        let floor = self.sb.map_or(0, |sb| sb + 1);
        if self.stack.len() <= floor {
            return Err(VmError::Internal("stack underflow".to_string()));
        }
        self.stack
            .pop()
            .ok_or_else(|| VmError::Internal("stack underflow".to_string()))
    }

    fn peek(&self) -> Result<&Value, VmError> {
        self.stack
            .last()
            .ok_or_else(|| VmError::Internal("empty stack".to_string()))
    }

    pub(crate) fn push_ctx(&mut self) {
        self.ctx_stack.push(VmContext {
            prg: Rc::clone(&self.prg),
            pc: self.pc,
            sb: self.sb,
            args: self.args,
            result: self.result.clone(),
            stash: Rc::clone(&self.stash),
        });
    }

    pub(crate) fn pop_ctx(&mut self) -> Result<(), VmError> {
        let ctx = self
            .ctx_stack
            .pop()
            .ok_or_else(|| VmError::Internal("no saved context".to_string()))?;
        self.prg = ctx.prg;
        self.pc = ctx.pc;
        self.sb = ctx.sb;
        self.args = ctx.args;
        self.result = ctx.result;
        self.stash = ctx.stash;
        Ok(())
    }

    pub(crate) fn install(&mut self, program: Program) {
        self.prg = Rc::new(program);
    }

    /// Run until a `Halt` or the end of the program.
    pub fn run(&mut self) -> Result<(), VmError> {
        while !self.halt && self.has_instructions() {
            self.execute_one()?;
        }
        Ok(())
    }

    /// Execute the instruction at `pc`. On error `pc` is left on the
    /// faulting instruction.
    pub fn execute_one(&mut self) -> Result<(), VmError> {
        let prg = Rc::clone(&self.prg);
        let ins = prg
            .code
            .get(self.pc)
            .ok_or_else(|| VmError::Internal(format!("pc {} out of range", self.pc)))?;
        trace!(target: "vm", "{:>4}  {}", self.pc, ins);

        match ins {
            Instruction::LoadConst(idx) => {
                let value = prg
                    .values
                    .get(*idx)
                    .cloned()
                    .ok_or_else(|| VmError::Internal(format!("bad constant index {idx}")))?;
                self.push(value);
            }
            Instruction::LoadUndefined => self.push(Value::Undefined),
            Instruction::LoadNull => self.push(Value::Null),
            Instruction::LoadBool(b) => self.push(Value::Bool(*b)),
            Instruction::LoadName(name) => {
                let value = self.lookup(name)?;
                self.push(value);
            }
            Instruction::StoreName(name) => {
                let value = self.peek()?.clone();
                self.assign(name, value);
            }
            Instruction::DefineLet(name) => {
                let value = self.pop()?;
                self.stash.define(Rc::clone(name), value);
            }
            Instruction::DefineVar(name) => {
                let value = self.pop()?;
                self.global.set(&**name, value);
            }
            Instruction::LoadThis => {
                let this = self.this_value();
                self.push(this);
            }
            Instruction::LoadGlobalThis => self.push(Value::Object(self.global.clone())),
            Instruction::Neg => {
                let v = self.pop()?;
                self.push(Value::Number(-v.to_number()));
            }
            Instruction::Not => {
                let v = self.pop()?;
                self.push(Value::Bool(!v.is_truthy()));
            }
            Instruction::Binary(op) => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.push(binary(*op, &lhs, &rhs)?);
            }
            Instruction::Pop => {
                self.pop()?;
            }
            Instruction::SaveResult => {
                self.result = self.pop()?;
            }
            Instruction::EnterBlock => {
                self.stash = Rc::new(Stash::new(Some(Rc::clone(&self.stash))));
            }
            Instruction::LeaveBlock => {
                let outer = self
                    .stash
                    .outer()
                    .cloned()
                    .ok_or_else(|| VmError::Internal("left the outermost scope".to_string()))?;
                self.stash = outer;
            }
            Instruction::Debugger => {}
            Instruction::Halt => self.halt = true,
        }

        self.pc += 1;
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<Value, VmError> {
        let mut scope = Some(&self.stash);
        while let Some(stash) = scope {
            if let Some(v) = stash.get_by_name(name) {
                return Ok(v);
            }
            scope = stash.outer();
        }
        self.global
            .get_own_property(name)
            .ok_or_else(|| VmError::Reference(name.to_string()))
    }

    /// Assign to the nearest binding; unbound names become globals.
    fn assign(&mut self, name: &str, value: Value) {
        let mut scope = Some(&self.stash);
        while let Some(stash) = scope {
            if stash.assign(name, value.clone()) {
                return;
            }
            scope = stash.outer();
        }
        self.global.set(name, value);
    }
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, VmError> {
    if let (Value::Unresolved(name), _) | (_, Value::Unresolved(name)) = (lhs, rhs) {
        return Err(VmError::Type(format!("cannot operate on unresolved `{name}`")));
    }
    let value = match op {
        BinaryOp::Add => match (lhs, rhs) {
            (Value::String(_), _) | (_, Value::String(_)) => Value::string(format!("{lhs}{rhs}")),
            _ => Value::Number(lhs.to_number() + rhs.to_number()),
        },
        BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
        BinaryOp::Mul => Value::Number(lhs.to_number() * rhs.to_number()),
        BinaryOp::Div => Value::Number(lhs.to_number() / rhs.to_number()),
        BinaryOp::Rem => Value::Number(lhs.to_number() % rhs.to_number()),
        BinaryOp::Eq => Value::Bool(lhs == rhs),
        BinaryOp::NotEq => Value::Bool(lhs != rhs),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (lhs, rhs) {
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => lhs.to_number().partial_cmp(&rhs.to_number()),
            };
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(false));
            };
            Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
    };
    Ok(value)
}
