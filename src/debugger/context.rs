use super::breakpoints::{Breakpoint, Breakpoints};
use super::listing::{self, ListOptions};
use super::session::Session;
use super::source_map;
use super::stepping::{self, Command, CommandResult};
use crate::error::DebugError;
use crate::executor::{Instruction, Vm};
use log::warn;

/// A debugging session bound to one paused VM.
#[derive(Debug)]
pub struct Debugger {
    vm: Vm,
    session: Session,
    breakpoints: Breakpoints,
    /// Set while an `exec` fragment runs on top of the paused frame.
    pub(crate) evaluating: bool,
    list_options: ListOptions,
}

impl Debugger {
    pub fn new(vm: Vm) -> Self {
        let mut dbg = Self {
            vm,
            session: Session::new(),
            breakpoints: Breakpoints::new(),
            evaluating: false,
            list_options: ListOptions::default(),
        };
        dbg.update_current_line();
        dbg
    }

    pub fn with_list_options(mut self, opts: ListOptions) -> Self {
        self.list_options = opts;
        self
    }

    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut Vm {
        &mut self.vm
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn is_evaluating(&self) -> bool {
        self.evaluating
    }

    pub fn pc(&self) -> usize {
        self.vm.pc()
    }

    /// Source line of the instruction at pc.
    pub fn line(&self) -> usize {
        source_map::line_at(self.vm.program(), self.vm.pc())
    }

    pub fn filename(&self) -> &str {
        source_map::filename_at(self.vm.program(), self.vm.pc())
    }

    // Breakpoints

    pub fn set_breakpoint(&mut self, filename: &str, line: usize) -> Result<(), DebugError> {
        self.breakpoints.set(filename, line)
    }

    pub fn clear_breakpoint(&mut self, filename: &str, line: usize) -> Result<(), DebugError> {
        self.breakpoints.clear(filename, line)
    }

    pub fn breakpoints(&self) -> Result<&[Breakpoint], DebugError> {
        self.breakpoints.list()
    }

    // Commands

    pub fn run(&mut self, cmd: &Command) -> CommandResult {
        cmd.execute(self)
    }

    pub fn next(&mut self) -> CommandResult {
        self.run(&Command::Next)
    }

    /// Run to the next stop point, then release the session gate.
    pub fn continue_(&mut self) -> CommandResult {
        self.run(&Command::Continue)
    }

    pub fn step_in(&mut self) -> CommandResult {
        self.run(&Command::StepIn)
    }

    pub fn step_out(&mut self) -> CommandResult {
        self.run(&Command::StepOut)
    }

    pub fn exec(&mut self, expr: &str) -> CommandResult {
        self.run(&Command::Exec(expr.to_string()))
    }

    pub fn print(&mut self, name: &str) -> CommandResult {
        self.run(&Command::Print(name.to_string()))
    }

    pub fn list(&mut self) -> CommandResult {
        self.run(&Command::List)
    }

    /// Block until the current pause cycle is released by `continue`.
    pub fn wait(&self) {
        self.session.wait();
    }

    /// Re-arm the session gate after a release.
    pub fn reactivate(&mut self) {
        self.session.reactivate();
    }

    /// Initial positioning when not stopping on entry: run to the first
    /// pause marker or breakpoint. Leaves the gate alone.
    pub fn run_to_pause(&mut self) -> Result<(), DebugError> {
        let outcome = stepping::run_until_stop(self, false);
        self.update_current_line();
        outcome.map(|_| ())
    }

    /// True when the program opens with a pause marker that has not been
    /// passed yet.
    pub fn is_break_on_start(&self) -> bool {
        let code = &self.vm.program().code;
        code.iter()
            .position(|ins| *ins != Instruction::EnterBlock)
            .is_some_and(|first| code[first] == Instruction::Debugger && self.vm.pc() <= first)
    }

    // Helpers shared with the stepping commands

    pub(crate) fn update_current_line(&mut self) {
        self.session.current_line = self.line();
    }

    pub(crate) fn next_line_boundary(&self) -> usize {
        source_map::next_line_boundary(self.vm.program(), self.vm.pc())
    }

    pub(crate) fn is_safe_to_run(&self) -> bool {
        self.vm.has_instructions()
    }

    pub(crate) fn is_debugger_statement(&self) -> bool {
        self.vm.program().code.get(self.vm.pc()) == Some(&Instruction::Debugger)
    }

    pub(crate) fn is_breakpoint(&self) -> bool {
        self.breakpoints.contains(self.filename(), self.line())
    }

    /// Execute one instruction. An uncaught error ends the program.
    pub(crate) fn step_instruction(&mut self) -> Result<(), DebugError> {
        self.vm.execute_one().map_err(|e| {
            warn!(target: "debugger", "program raised at pc {}: {}", self.vm.pc(), e);
            self.vm.terminate();
            DebugError::Execution(e)
        })
    }

    pub(crate) fn list_source(&self) -> String {
        listing::render(
            self.vm.program().src.text(),
            self.line(),
            &self.list_options,
        )
    }
}
