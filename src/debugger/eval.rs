use crate::error::{DebugError, VmError};
use crate::executor::{compile, CompileFlags, Value, Vm};
use crate::parser::Source;
use log::{debug, warn};

const EVAL_SOURCE_NAME: &str = "<eval>";

/// Compile `expr` and run it on top of the paused frame.
///
/// The paused program, pc, argument count, result slot, stack base and
/// stack pointer are saved first and put back on every exit path, so the
/// frame is untouched whether evaluation succeeds or fails.
pub fn eval(vm: &mut Vm, expr: &str) -> Result<Value, DebugError> {
    let source = Source::new(EVAL_SOURCE_NAME, expr);

    let this = vm.this_value();
    let is_global = matches!(&this, Value::Object(o) if o.ptr_eq(vm.global_object()));
    let flags = CompileFlags {
        is_eval: true,
        is_global,
    };
    let program = compile(&source, flags)?;
    debug!(
        target: "debugger",
        "evaluating {:?} ({} instructions, global receiver: {})",
        expr,
        program.len(),
        is_global
    );

    let saved_sp = vm.sp();
    let saved_halt = vm.halt;
    vm.push_ctx();
    vm.install(program);
    vm.pc = 0;
    vm.args = 0;
    vm.result = Value::Undefined;
    vm.sb = Some(saved_sp);
    vm.halt = false;
    vm.push(this);

    let outcome = vm.run().map(|()| vm.result.clone());

    let restored = vm.pop_ctx();
    vm.halt = saved_halt;
    vm.stack.truncate(saved_sp);

    if let Err(e) = restored {
        warn!(target: "debugger", "context restore failed after eval: {}", e);
        return Err(DebugError::Evaluation("cannot recover from exception".to_string()));
    }

    outcome.map_err(|e| match e {
        VmError::Internal(msg) => {
            warn!(target: "debugger", "eval hit an engine invariant: {}", msg);
            DebugError::Evaluation("cannot recover from exception".to_string())
        }
        other => DebugError::Evaluation(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Instruction;

    fn paused_vm(text: &str) -> Vm {
        let prg = compile(&Source::new("main.js", text), CompileFlags::script())
            .expect("compile failed");
        let mut vm = Vm::new(prg);
        while vm.has_instructions() && vm.program().code[vm.pc()] != Instruction::Debugger {
            vm.execute_one().expect("execute failed");
        }
        vm
    }

    #[test]
    fn test_sees_paused_bindings() {
        let mut vm = paused_vm("let a = 20;\n{\n let b = 22;\n debugger;\n}\n");
        assert_eq!(eval(&mut vm, "a + b"), Ok(Value::Number(42.0)));
    }

    #[test]
    fn test_frame_is_restored() {
        let mut vm = paused_vm("let a = 1;\ndebugger;\na;\n");
        let (pc, sp, sb) = (vm.pc(), vm.sp(), vm.sb());
        let result = vm.result().clone();

        eval(&mut vm, "let tmp = 5; tmp * 2").expect("eval failed");

        assert_eq!((vm.pc(), vm.sp(), vm.sb()), (pc, sp, sb));
        assert_eq!(vm.result(), &result);
        assert!(vm.stash().get_by_name("tmp").is_none(), "eval bindings must not leak");
        assert!(!vm.halt);
    }

    #[test]
    fn test_runtime_error_restores_frame() {
        let mut vm = paused_vm("let a = 1;\ndebugger;\n");
        let (pc, sp) = (vm.pc(), vm.sp());
        let err = eval(&mut vm, "1 + nope").unwrap_err();
        assert_eq!(
            err,
            DebugError::Evaluation("ReferenceError: nope is not defined".to_string())
        );
        assert_eq!((vm.pc(), vm.sp()), (pc, sp));
    }

    #[test]
    fn test_syntax_error() {
        let mut vm = paused_vm("debugger;");
        assert!(matches!(eval(&mut vm, "syntax((("), Err(DebugError::Syntax(_))));
    }

    #[test]
    fn test_this_is_global_at_script_level() {
        let mut vm = paused_vm("var marker = 1;\ndebugger;\n");
        let value = eval(&mut vm, "this").expect("eval failed");
        assert!(matches!(value, Value::Object(ref o) if o.ptr_eq(vm.global_object())));
    }

    #[test]
    fn test_this_is_frame_receiver() {
        let prg = compile(&Source::new("main.js", "debugger;"), CompileFlags::script())
            .expect("compile failed");
        let mut vm = Vm::with_receiver(prg, Value::string("recv"));
        assert_eq!(eval(&mut vm, "this + '!'"), Ok(Value::string("recv!")));
        assert_eq!(vm.sp(), 1);
        assert_eq!(vm.sb(), Some(0));
        assert_eq!(vm.receiver(), Some(&Value::string("recv")));
    }

    #[test]
    fn test_runs_after_program_halted() {
        let prg = compile(&Source::new("main.js", "let a = 40;"), CompileFlags::script())
            .expect("compile failed");
        let mut vm = Vm::new(prg);
        vm.run().expect("run failed");
        assert!(vm.halt);

        assert_eq!(eval(&mut vm, "a + 2"), Ok(Value::Number(42.0)));
        assert!(vm.halt, "halt flag is restored");
        assert!(!vm.has_instructions());
    }
}
