mod commands;

pub use commands::{help_text, lookup, parse_line, CommandKind, CommandSpec, ReplCommand, COMMANDS};

use crate::debugger::{Command, CommandResult, Debugger};
use colored::Colorize;
use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done(CommandResult),
    Quit(i32),
}

/// Apply one parsed command to the debugger.
pub fn dispatch(dbg: &mut Debugger, cmd: &ReplCommand) -> Outcome {
    let result = match cmd {
        ReplCommand::SetBreakpoint { filename, line } => {
            match dbg.set_breakpoint(filename, *line) {
                Ok(()) => CommandResult::text(format!("breakpoint set at {filename}:{line}")),
                Err(e) => CommandResult::err(e),
            }
        }
        ReplCommand::ClearBreakpoint { filename, line } => {
            match dbg.clear_breakpoint(filename, *line) {
                Ok(()) => CommandResult::text(format!("breakpoint cleared at {filename}:{line}")),
                Err(e) => CommandResult::err(e),
            }
        }
        ReplCommand::Breakpoints => match dbg.breakpoints() {
            Ok(list) => {
                let lines: Vec<String> = list.iter().map(ToString::to_string).collect();
                CommandResult::text(lines.join("\n"))
            }
            Err(e) => CommandResult::err(e),
        },
        ReplCommand::Debug(command) => {
            let result = dbg.run(command);
            // Each continue closes one pause cycle; arm the next one while
            // there is still code left to pause in.
            if *command == Command::Continue && dbg.vm().has_instructions() {
                dbg.reactivate();
            }
            result
        }
        ReplCommand::Help => CommandResult::text(help_text()),
        ReplCommand::Quit(code) => return Outcome::Quit(*code),
    };
    Outcome::Done(result)
}

/// Interactive loop. Returns the exit code requested by `quit`, or 0 on
/// end of input.
pub fn run(dbg: &mut Debugger, history: Option<&Path>) -> rustyline::Result<i32> {
    let mut rl = DefaultEditor::new()?;
    if let Some(path) = history {
        if let Err(e) = rl.load_history(path) {
            debug!(target: "repl", "no history loaded from {}: {}", path.display(), e);
        }
    }

    print_location(dbg);
    let mut last: Option<ReplCommand> = None;

    let code = loop {
        let prompt = format!("debug[{}]> ", dbg.line());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break 0,
            Err(e) => return Err(e),
        };

        let cmd = match parse_line(&line, dbg.filename()) {
            Ok(Some(cmd)) => {
                rl.add_history_entry(line.as_str())?;
                cmd
            }
            // Empty input repeats the previous command.
            Ok(None) => match &last {
                Some(cmd) => cmd.clone(),
                None => continue,
            },
            Err(e) => {
                eprintln!("{} {}", "❌".red(), e);
                continue;
            }
        };

        match dispatch(dbg, &cmd) {
            Outcome::Quit(code) => break code,
            Outcome::Done(result) => report(dbg, &cmd, &result),
        }
        last = Some(cmd);
    };

    if let Some(path) = history {
        if let Err(e) = rl.save_history(path) {
            debug!(target: "repl", "could not save history to {}: {}", path.display(), e);
        }
    }
    Ok(code)
}

fn report(dbg: &Debugger, cmd: &ReplCommand, result: &CommandResult) {
    if let Some(reply) = &result.value {
        println!("{reply}");
    }
    if let Some(e) = &result.error {
        eprintln!("{} {}", "❌".red(), e);
    }
    if matches!(cmd, ReplCommand::Debug(Command::Next | Command::Continue)) {
        print_location(dbg);
    }
}

fn print_location(dbg: &Debugger) {
    if !dbg.vm().has_instructions() {
        eprintln!("\n🏁 Program finished, result: {}", dbg.vm().result());
        return;
    }
    let program = dbg.vm().program();
    let pos = program.position_at(dbg.pc());
    eprintln!("\n🔍 Stopped at {}:{}:{}", pos.file, pos.line, pos.column);
    let lines = program.src.lines();
    if let Some(text) = pos.line.checked_sub(1).and_then(|i| lines.get(i)) {
        eprintln!("    {}", text.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::Reply;
    use crate::error::DebugError;
    use crate::executor::{compile, CompileFlags, Vm};
    use crate::parser::Source;

    fn debugger(text: &str) -> Debugger {
        let src = Source::new("main.js", text);
        let program = compile(&src, CompileFlags::script()).expect("compile");
        Debugger::new(Vm::new(program))
    }

    fn done(outcome: Outcome) -> CommandResult {
        match outcome {
            Outcome::Done(result) => result,
            Outcome::Quit(code) => panic!("unexpected quit({code})"),
        }
    }

    #[test]
    fn test_breakpoint_commands() {
        let mut dbg = debugger("let a = 1;\nlet b = 2;\n");
        let set = ReplCommand::SetBreakpoint {
            filename: "main.js".to_string(),
            line: 2,
        };

        let result = done(dispatch(&mut dbg, &set));
        assert_eq!(
            result.value,
            Some(Reply::Text("breakpoint set at main.js:2".to_string()))
        );

        let again = done(dispatch(&mut dbg, &set));
        assert!(matches!(again.error, Some(DebugError::Duplicate(_))));

        let listed = done(dispatch(&mut dbg, &ReplCommand::Breakpoints));
        assert_eq!(listed.value, Some(Reply::Text("main.js:2".to_string())));
    }

    #[test]
    fn test_continue_rearms_gate_while_code_remains() {
        let mut dbg = debugger("debugger;\nlet a = 1;\ndebugger;\nlet b = 2;\n");
        let first = done(dispatch(&mut dbg, &ReplCommand::Debug(Command::Continue)));
        assert!(first.is_ok());
        assert!(dbg.vm().has_instructions());
        assert!(!dbg.session().gate().is_released(), "fresh gate expected");
    }

    #[test]
    fn test_quit_and_help() {
        let mut dbg = debugger("1;");
        assert_eq!(dispatch(&mut dbg, &ReplCommand::Quit(7)), Outcome::Quit(7));
        let help = done(dispatch(&mut dbg, &ReplCommand::Help));
        assert_eq!(help.value, Some(Reply::Text(help_text())));
    }
}
