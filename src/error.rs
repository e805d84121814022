use crate::parser::Source;
use thiserror::Error;

/// Malformed source text, with the 1-based position it was detected at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("SyntaxError: {message} ({file}:{line}:{column})")]
pub struct SyntaxError {
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl SyntaxError {
    pub fn at(source: &Source, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = source.line_col(offset);
        Self {
            message: message.into(),
            file: source.name().to_string(),
            line,
            column,
        }
    }
}

/// Abrupt completion raised by the engine while executing an instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    #[error("TypeError: {0}")]
    Type(String),

    /// Broken engine invariant: stack underflow, bad operand, missing frame.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Every failure a debugger command can report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DebugError {
    /// Missing or empty command argument.
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The evaluated fragment threw, or the engine could not recover.
    #[error("{0}")]
    Evaluation(String),

    #[error("cannot resolve variable `{0}`")]
    UnresolvedReference(String),

    /// `name` was not a binding; the frame receiver was reported instead.
    #[error("`{0}` is not bound in any lexical scope, showing the frame receiver")]
    ReceiverFallback(String),

    #[error("not implemented yet")]
    Unimplemented,

    /// The debugged program itself raised while being stepped.
    #[error("uncaught exception: {0}")]
    Execution(VmError),
}

/// Errors loading a debugger configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid breakpoint `{0}`, expected FILE:LINE")]
    Breakpoint(String),

    #[error("unknown log level `{0}`")]
    LogLevel(String),
}
