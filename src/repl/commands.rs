use crate::debugger::Command;
use crate::error::DebugError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    SetBreakpoint,
    ClearBreakpoint,
    Breakpoints,
    Next,
    Continue,
    StepIn,
    StepOut,
    Exec,
    Print,
    List,
    Help,
    Quit,
}

/// One row of the front-end vocabulary.
#[derive(Debug)]
pub struct CommandSpec {
    pub short: Option<&'static str>,
    pub long: &'static str,
    pub kind: CommandKind,
    pub help: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        short: Some("sb"),
        long: "setBreakpoint",
        kind: CommandKind::SetBreakpoint,
        help: "Set a breakpoint on a given file and line",
    },
    CommandSpec {
        short: Some("cb"),
        long: "clearBreakpoint",
        kind: CommandKind::ClearBreakpoint,
        help: "Clear a breakpoint on a given file and line",
    },
    CommandSpec {
        short: None,
        long: "breakpoints",
        kind: CommandKind::Breakpoints,
        help: "List all known breakpoints",
    },
    CommandSpec {
        short: Some("n"),
        long: "next",
        kind: CommandKind::Next,
        help: "Continue to next line in current file",
    },
    CommandSpec {
        short: Some("c"),
        long: "continue",
        kind: CommandKind::Continue,
        help: "Resume execution until next debugger line",
    },
    CommandSpec {
        short: Some("s"),
        long: "step",
        kind: CommandKind::StepIn,
        help: "Step into, potentially entering a function (not implemented yet)",
    },
    CommandSpec {
        short: Some("o"),
        long: "out",
        kind: CommandKind::StepOut,
        help: "Step out, leaving the current function (not implemented yet)",
    },
    CommandSpec {
        short: Some("e"),
        long: "exec",
        kind: CommandKind::Exec,
        help: "Evaluate the expression and print the value",
    },
    CommandSpec {
        short: Some("p"),
        long: "print",
        kind: CommandKind::Print,
        help: "Print the provided variable's value",
    },
    CommandSpec {
        short: Some("l"),
        long: "list",
        kind: CommandKind::List,
        help: "Print the source around the current line where execution is currently paused",
    },
    CommandSpec {
        short: Some("h"),
        long: "help",
        kind: CommandKind::Help,
        help: "Print this very help message",
    },
    CommandSpec {
        short: Some("q"),
        long: "quit",
        kind: CommandKind::Quit,
        help: "Exit debugger and quit (Ctrl+C)",
    },
];

pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.long == name || spec.short == Some(name))
}

/// A parsed front-end command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    SetBreakpoint { filename: String, line: usize },
    ClearBreakpoint { filename: String, line: usize },
    Breakpoints,
    Debug(Command),
    Help,
    Quit(i32),
}

/// Parse one input line. Returns `Ok(None)` for blank input.
///
/// `exec` keeps the raw remainder of the line so string literals survive;
/// the other commands split their arguments shell-style.
pub fn parse_line(line: &str, current_file: &str) -> Result<Option<ReplCommand>, DebugError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let spec = lookup(word)
        .ok_or_else(|| DebugError::Usage(format!("unknown command `{word}`, try `help`")))?;
    // Only commands with shell-style arguments are split; `exec` sees the raw text.
    let split =
        || shlex::split(rest).ok_or_else(|| DebugError::Usage("unbalanced quotes".to_string()));

    let cmd = match spec.kind {
        CommandKind::SetBreakpoint => {
            let (filename, line) = location_args(&split()?, current_file)?;
            ReplCommand::SetBreakpoint { filename, line }
        }
        CommandKind::ClearBreakpoint => {
            let (filename, line) = location_args(&split()?, current_file)?;
            ReplCommand::ClearBreakpoint { filename, line }
        }
        CommandKind::Breakpoints => ReplCommand::Breakpoints,
        CommandKind::Next => ReplCommand::Debug(Command::Next),
        CommandKind::Continue => ReplCommand::Debug(Command::Continue),
        CommandKind::StepIn => ReplCommand::Debug(Command::StepIn),
        CommandKind::StepOut => ReplCommand::Debug(Command::StepOut),
        CommandKind::Exec => ReplCommand::Debug(Command::Exec(rest.to_string())),
        CommandKind::Print => {
            let name = split()?.into_iter().next().unwrap_or_default();
            ReplCommand::Debug(Command::Print(name))
        }
        CommandKind::List => ReplCommand::Debug(Command::List),
        CommandKind::Help => ReplCommand::Help,
        CommandKind::Quit => {
            let code = match split()?.first() {
                Some(c) => c
                    .parse()
                    .map_err(|_| DebugError::Usage(format!("invalid exit code `{c}`")))?,
                None => 0,
            };
            ReplCommand::Quit(code)
        }
    };
    Ok(Some(cmd))
}

/// `FILE LINE`, `FILE:LINE`, or a bare `LINE` in the current file.
fn location_args(args: &[String], current_file: &str) -> Result<(String, usize), DebugError> {
    let usage = || DebugError::Usage("expected FILE LINE, FILE:LINE or LINE".to_string());
    let parse_line_no = |s: &str| s.parse::<usize>().map_err(|_| usage());

    match args {
        [file, line] => Ok((file.clone(), parse_line_no(line)?)),
        [single] => match single.parse::<usize>() {
            Ok(line) => Ok((current_file.to_string(), line)),
            Err(_) => {
                let (file, line) = single.rsplit_once(':').ok_or_else(usage)?;
                Ok((file.to_string(), parse_line_no(line)?))
            }
        },
        _ => Err(usage()),
    }
}

/// Two-column help listing, columns separated by three spaces.
pub fn help_text() -> String {
    let names: Vec<String> = COMMANDS
        .iter()
        .map(|spec| match spec.short {
            Some(short) => format!("{}, {}", spec.long, short),
            None => spec.long.to_string(),
        })
        .collect();
    let width = names.iter().map(String::len).max().unwrap_or(0) + 3;

    let mut out = String::new();
    for (name, spec) in names.iter().zip(COMMANDS) {
        out.push_str(&format!("{name:<width$}{}\n", spec.help));
    }
    out
}
