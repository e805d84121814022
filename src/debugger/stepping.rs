use super::context::Debugger;
use super::session::SessionState;
use super::{eval, scope};
use crate::error::DebugError;
use crate::executor::Value;
use log::{debug, info};
use std::fmt;

/// Payload of a successful command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(Value),
    Text(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Value(v) => write!(f, "{v}"),
            Reply::Text(s) => f.write_str(s),
        }
    }
}

/// Outcome of a command. `error` may accompany a best-effort `value`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandResult {
    pub value: Option<Reply>,
    pub error: Option<DebugError>,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn value(value: Value) -> Self {
        Self {
            value: Some(Reply::Value(value)),
            error: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            value: Some(Reply::Text(text.into())),
            error: None,
        }
    }

    pub fn err(error: DebugError) -> Self {
        Self {
            value: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Stepping and inspection commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Continue,
    StepIn,
    StepOut,
    Exec(String),
    Print(String),
    List,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Next => "next",
            Command::Continue => "continue",
            Command::StepIn => "step",
            Command::StepOut => "out",
            Command::Exec(_) => "exec",
            Command::Print(_) => "print",
            Command::List => "list",
        }
    }

    pub fn execute(&self, dbg: &mut Debugger) -> CommandResult {
        debug!(target: "debugger", "command {} at pc {}", self.name(), dbg.pc());
        match self {
            Command::Next => next(dbg),
            Command::Continue => cont(dbg),
            Command::StepIn | Command::StepOut => CommandResult::err(DebugError::Unimplemented),
            Command::Exec(expr) => exec(dbg, expr),
            Command::Print(name) => print(dbg, name),
            Command::List => CommandResult::text(dbg.list_source()),
        }
    }
}

/// Where [`run_until_stop`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopReason {
    Marker,
    Breakpoint,
    Exhausted,
}

/// Run until a pause marker is reached, a breakpoint line is entered, or
/// the program runs out. With `step_off` the parked instruction executes
/// unconditionally first so a session sitting on a stop point moves on.
pub(crate) fn run_until_stop(
    dbg: &mut Debugger,
    step_off: bool,
) -> Result<StopReason, DebugError> {
    let mut prev_line = dbg.line();
    let mut first = true;
    loop {
        if !dbg.is_safe_to_run() {
            return Ok(StopReason::Exhausted);
        }
        if !(first && step_off) {
            if dbg.is_debugger_statement() {
                return Ok(StopReason::Marker);
            }
            let line = dbg.line();
            if (first || line != prev_line) && dbg.is_breakpoint() {
                return Ok(StopReason::Breakpoint);
            }
            prev_line = line;
        }
        first = false;
        dbg.step_instruction()?;
    }
}

fn next(dbg: &mut Debugger) -> CommandResult {
    dbg.session_mut().set_state(SessionState::Running);
    let last_line = dbg.line();
    dbg.update_current_line();
    let next_line = dbg.next_line_boundary();

    let mut first = true;
    let mut outcome = Ok(());
    while dbg.is_safe_to_run() && dbg.line() != next_line {
        dbg.update_current_line();
        if !first && dbg.is_debugger_statement() {
            break;
        }
        first = false;
        if let Err(e) = dbg.step_instruction() {
            outcome = Err(e);
            break;
        }
    }

    dbg.update_current_line();
    dbg.session_mut().push_last_line(last_line);
    dbg.session_mut().set_state(SessionState::Paused);
    match outcome {
        Ok(()) => CommandResult::ok(),
        Err(e) => CommandResult::err(e),
    }
}

fn cont(dbg: &mut Debugger) -> CommandResult {
    dbg.session_mut().set_state(SessionState::Running);
    let last_line = dbg.line();
    dbg.update_current_line();

    let outcome = run_until_stop(dbg, true);
    if let Ok(reason) = outcome {
        info!(
            target: "debugger",
            "stopped ({:?}) at {}:{}",
            reason,
            dbg.filename(),
            dbg.line()
        );
    }

    dbg.update_current_line();
    dbg.session_mut().push_last_line(last_line);
    dbg.session_mut().release();
    match outcome {
        Ok(_) => CommandResult::ok(),
        Err(e) => CommandResult::err(e),
    }
}

fn exec(dbg: &mut Debugger, expr: &str) -> CommandResult {
    if expr.trim().is_empty() {
        return CommandResult::err(DebugError::Usage("nothing to execute".to_string()));
    }

    dbg.evaluating = true;
    let outcome = eval::eval(dbg.vm_mut(), expr);
    dbg.evaluating = false;

    let last_line = dbg.line();
    dbg.session_mut().push_last_line(last_line);
    match outcome {
        Ok(v) => CommandResult::value(v),
        Err(e) => CommandResult::err(e),
    }
}

fn print(dbg: &mut Debugger, name: &str) -> CommandResult {
    if name.is_empty() {
        return CommandResult::err(DebugError::Usage("please specify variable name".to_string()));
    }

    let (value, _, diagnostic) = scope::resolve(dbg.vm(), name);
    let reply = if value.is_undefined() {
        // Legacy diagnostic: show the program's literal pool instead.
        Reply::Text(dbg.vm().program().values_display())
    } else {
        Reply::Value(value)
    };
    CommandResult {
        value: Some(reply),
        error: diagnostic,
    }
}
