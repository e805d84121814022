use crate::error::DebugError;
use crate::executor::{Value, Vm};
use log::debug;

/// Where a resolved name was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeTier {
    Lexical,
    /// Legacy fallback: the frame receiver itself, not a real binding.
    Receiver,
    Global,
    Unresolved,
}

/// Resolve `name` the way a paused frame sees it.
///
/// Tiers, first hit wins:
/// 1. the stash chain, innermost scope first
/// 2. the frame receiver (`this`), reported with a [`DebugError::ReceiverFallback`]
/// 3. own properties of the global object
///
/// A miss yields [`Value::Unresolved`] paired with
/// [`DebugError::UnresolvedReference`]; the value is never left empty.
pub fn resolve(vm: &Vm, name: &str) -> (Value, ScopeTier, Option<DebugError>) {
    let mut scope = Some(vm.stash());
    while let Some(stash) = scope {
        if let Some(v) = stash.get_by_name(name) {
            return (v, ScopeTier::Lexical, None);
        }
        scope = stash.outer();
    }

    if let Some(this) = vm.receiver().filter(|v| !v.is_undefined()) {
        debug!(target: "debugger", "`{}` resolved to the frame receiver", name);
        return (
            this.clone(),
            ScopeTier::Receiver,
            Some(DebugError::ReceiverFallback(name.to_string())),
        );
    }

    if let Some(v) = vm.global_object().get_own_property(name) {
        return (v, ScopeTier::Global, None);
    }

    (
        Value::Unresolved(name.into()),
        ScopeTier::Unresolved,
        Some(DebugError::UnresolvedReference(name.to_string())),
    )
}
