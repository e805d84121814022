use std::fs;
use std::path::PathBuf;
use vm_debugger::config::{self, DebuggerConfig};
use vm_debugger::debugger::{Debugger, Reply, SessionState};
use vm_debugger::error::DebugError;
use vm_debugger::executor::{compile, CompileFlags, Value, Vm};
use vm_debugger::parser::Source;

// Helper to write a script into the temp dir
fn create_test_script(content: &str, name: &str) -> PathBuf {
    let file = format!("vm_debugger_{}_{}.js", std::process::id(), name);
    let path = std::env::temp_dir().join(file);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

fn cleanup_test_script(path: &PathBuf) {
    let _ = fs::remove_file(path);
}

// Load a script the way the binary does
fn load_debugger(path: &PathBuf) -> Debugger {
    let text = fs::read_to_string(path).expect("Could not read test file");
    let name = path.display().to_string();
    let program = compile(&Source::new(name.as_str(), text), CompileFlags::script())
        .expect("Script should compile");
    Debugger::new(Vm::new(program))
}

#[cfg(test)]
mod debugger_tests {
    use super::*;

    #[test]
    fn test_stop_on_entry_then_step_through() {
        let content = "let a = 1;\nlet b = a + 1;\nlet c = b * 2;\nc;\n";
        let path = create_test_script(content, "step_through");
        let mut dbg = load_debugger(&path);

        assert_eq!(dbg.line(), 1, "Should start on the first line");
        assert_eq!(dbg.filename(), path.display().to_string());

        for expected in 2..=4 {
            let result = dbg.next();
            assert!(result.is_ok(), "next failed: {:?}", result.error);
            assert_eq!(dbg.line(), expected, "next should land on line {expected}");
        }

        let result = dbg.print("c");
        assert_eq!(result.value, Some(Reply::Value(Value::Number(4.0))));

        assert!(dbg.continue_().is_ok());
        assert!(!dbg.vm().has_instructions(), "Program should have finished");
        assert_eq!(*dbg.vm().result(), Value::Number(4.0));

        cleanup_test_script(&path);
    }

    #[test]
    fn test_breakpoints_from_config() {
        let content = "let a = 1;\nlet b = 2;\nlet c = 3;\nlet d = 4;\n";
        let path = create_test_script(content, "config_breakpoints");
        let name = path.display().to_string();

        let json = format!(
            r#"{{ "breakpoints": [{{ "filename": {}, "line": 3 }}], "stop_on_entry": false }}"#,
            serde_json::to_string(&name).expect("quote path")
        );
        let cfg = DebuggerConfig::from_json("inline", &json).expect("Config should parse");
        assert!(!cfg.stop_on_entry);

        let mut dbg = load_debugger(&path);
        for bp in &cfg.breakpoints {
            dbg.set_breakpoint(&bp.filename, bp.line).expect("Breakpoint should be new");
        }
        dbg.run_to_pause().expect("run_to_pause failed");

        assert_eq!(dbg.line(), 3, "Should pause on the breakpoint line");
        assert_eq!(dbg.print("b").value, Some(Reply::Value(Value::Number(2.0))));
        assert_eq!(
            dbg.print("c").error,
            Some(DebugError::UnresolvedReference("c".to_string())),
            "Line 3 has not run yet"
        );

        cleanup_test_script(&path);
    }

    #[test]
    fn test_cli_breakpoint_spec() {
        let bp = config::parse_breakpoint("lib/util.js:12").expect("Should parse");
        assert_eq!(bp.filename, "lib/util.js");
        assert_eq!(bp.line, 12);
        assert!(config::parse_breakpoint("util.js").is_err());
    }

    #[test]
    fn test_breakpoint_bookkeeping() {
        let path = create_test_script("let a = 1;\n", "bookkeeping");
        let mut dbg = load_debugger(&path);

        assert!(
            matches!(dbg.breakpoints(), Err(DebugError::NotFound(_))),
            "Empty registry should report no breakpoints"
        );
        assert!(matches!(
            dbg.clear_breakpoint("x.js", 1),
            Err(DebugError::NotFound(_))
        ));

        dbg.set_breakpoint("x.js", 1).expect("first set");
        dbg.set_breakpoint("x.js", 2).expect("second set");
        assert!(matches!(
            dbg.set_breakpoint("x.js", 1),
            Err(DebugError::Duplicate(_))
        ));
        assert_eq!(dbg.breakpoints().expect("list").len(), 2);

        dbg.clear_breakpoint("x.js", 1).expect("clear");
        let listed = dbg.breakpoints().expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].to_string(), "x.js:2");

        cleanup_test_script(&path);
    }

    #[test]
    fn test_markers_pause_execution() {
        let content = "let n = 0;\ndebugger;\nn = n + 1;\ndebugger;\nn = n + 1;\n";
        let path = create_test_script(content, "markers");
        let mut dbg = load_debugger(&path);

        dbg.run_to_pause().expect("run_to_pause failed");
        assert_eq!(dbg.line(), 2);

        assert!(dbg.continue_().is_ok());
        assert_eq!(dbg.line(), 4, "Second marker should stop continue");
        assert_eq!(dbg.print("n").value, Some(Reply::Value(Value::Number(1.0))));
        assert_eq!(dbg.session().state(), SessionState::Released);

        dbg.reactivate();
        assert_eq!(dbg.session().state(), SessionState::Paused);
        assert!(dbg.continue_().is_ok());
        assert!(!dbg.vm().has_instructions());

        cleanup_test_script(&path);
    }

    #[test]
    fn test_exec_does_not_disturb_frame() {
        let content = "let x = 10;\n{\n  let y = 5;\n  debugger;\n}\nx;\n";
        let path = create_test_script(content, "exec_frame");
        let mut dbg = load_debugger(&path);
        dbg.run_to_pause().expect("run_to_pause failed");

        let (pc, sp, line) = (dbg.pc(), dbg.vm().sp(), dbg.line());
        let result = dbg.exec("x + y");
        assert_eq!(result.value, Some(Reply::Value(Value::Number(15.0))));

        let result = dbg.exec("let z = 1; z");
        assert_eq!(result.value, Some(Reply::Value(Value::Number(1.0))));
        assert_eq!(
            dbg.print("z").error,
            Some(DebugError::UnresolvedReference("z".to_string())),
            "Eval declarations must not leak into the paused frame"
        );

        assert_eq!(dbg.pc(), pc);
        assert_eq!(dbg.vm().sp(), sp);
        assert_eq!(dbg.line(), line);

        cleanup_test_script(&path);
    }

    #[test]
    fn test_listing_marks_current_line() {
        let content = "let a = 1;\nlet b = 2;\nlet c = 3;\n";
        let path = create_test_script(content, "listing");
        let mut dbg = load_debugger(&path).with_list_options(vm_debugger::debugger::ListOptions {
            color: false,
            ..Default::default()
        });
        dbg.next();

        let listing = match dbg.list().value {
            Some(Reply::Text(text)) => text,
            other => panic!("Expected listing text, got {other:?}"),
        };
        let marked: Vec<&str> = listing.lines().filter(|l| l.starts_with('>')).collect();
        assert_eq!(marked.len(), 1, "Exactly one line should be marked");
        assert!(marked[0].contains("let b = 2;"));

        cleanup_test_script(&path);
    }
}
