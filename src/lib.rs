//! Interactive source-level debugger for a small stack-based script VM.
//!
//! [`debugger::Debugger`] wraps a paused [`executor::Vm`] and drives it with
//! stepping, inspection and breakpoint commands. [`repl`] is the line-oriented
//! front-end used by the `vm-debugger` binary.

pub mod config;
pub mod debugger;
pub mod error;
pub mod executor;
pub mod parser;
pub mod repl;
