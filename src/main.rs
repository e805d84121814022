use clap::Parser;
use log::{info, warn};
use simple_logger::SimpleLogger;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use vm_debugger::config::{self, DebuggerConfig};
use vm_debugger::debugger::Debugger;
use vm_debugger::executor::{compile, CompileFlags, Vm};
use vm_debugger::parser::Source;
use vm_debugger::repl;

#[derive(Debug, Parser)]
#[command(author, version, about = "Step through a script one line at a time")]
struct Cli {
    /// Script to debug.
    script: PathBuf,

    /// JSON settings file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Breakpoint as FILE:LINE. May be repeated.
    #[arg(long = "break", value_name = "FILE:LINE")]
    breakpoints: Vec<String>,

    /// Run to the first `debugger;` or breakpoint before prompting.
    #[arg(long)]
    no_stop_on_entry: bool,

    #[arg(long)]
    no_color: bool,

    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => DebuggerConfig::load(path)?,
        None => DebuggerConfig::default(),
    };
    for spec in &cli.breakpoints {
        cfg.breakpoints.push(config::parse_breakpoint(spec)?);
    }
    if cli.no_stop_on_entry {
        cfg.stop_on_entry = false;
    }
    if cli.no_color {
        cfg.color = false;
    }
    if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }

    SimpleLogger::new().with_level(cfg.level_filter()?).init()?;
    if !cfg.color {
        colored::control::set_override(false);
    }

    let name = cli.script.display().to_string();
    let text = fs::read_to_string(&cli.script)?;
    let program = compile(&Source::new(name.as_str(), text), CompileFlags::script())?;
    info!(target: "debugger", "loaded {} ({} instructions)", name, program.len());

    let mut dbg = Debugger::new(Vm::new(program)).with_list_options(cfg.list_options());
    for bp in &cfg.breakpoints {
        if let Err(e) = dbg.set_breakpoint(&bp.filename, bp.line) {
            warn!(target: "debugger", "{}: {}", bp, e);
        }
    }

    if !cfg.stop_on_entry && !dbg.is_break_on_start() {
        dbg.run_to_pause()?;
    }

    let code = repl::run(&mut dbg, cfg.history_file.as_deref())?;
    std::process::exit(code);
}
