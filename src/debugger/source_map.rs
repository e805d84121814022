//! Instruction offset to source position mapping.
//!
//! Only the first instruction of a statement carries its own entry in the
//! program's position table; the rest inherit it. The reported line can
//! therefore lag behind the instruction actually being executed.

use crate::executor::Program;

pub fn line_at(program: &Program, pc: usize) -> usize {
    program.position_at(pc).line
}

pub fn filename_at(program: &Program, pc: usize) -> &str {
    program.position_at(pc).file
}

/// First line after `pc` that is strictly greater than the line at `pc`,
/// or 0 when the program ends without one.
pub fn next_line_boundary(program: &Program, pc: usize) -> usize {
    let current = line_at(program, pc);
    (pc + 1..program.len())
        .map(|next| line_at(program, next))
        .find(|&line| line > current)
        .unwrap_or(0)
}
