mod breakpoints;
mod context;
pub mod eval;
mod listing;
pub mod scope;
mod session;
pub mod source_map;
mod stepping;

pub use breakpoints::{Breakpoint, Breakpoints};
pub use context::Debugger;
pub use listing::{ListOptions, ListStyle};
pub use scope::ScopeTier;
pub use session::{Gate, Session, SessionState};
pub use stepping::{Command, CommandResult, Reply};
