mod compiler;
mod program;
mod runner;
mod value;

pub use compiler::{compile, CompileFlags};
pub use program::{Instruction, Position, Program};
pub use runner::Vm;
pub use value::{Object, ObjectRef, Stash, Value};
