use crate::error::DebugError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Breakpoint {
    pub filename: String,
    pub line: usize,
}

impl Breakpoint {
    pub fn new(filename: impl Into<String>, line: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

/// Ordered set of breakpoints. Counts stay small, so lookups are linear.
#[derive(Debug, Default)]
pub struct Breakpoints {
    points: Vec<Breakpoint>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, filename: &str, line: usize) -> Result<(), DebugError> {
        let b = Breakpoint::new(filename, line);
        if self.points.contains(&b) {
            return Err(DebugError::Duplicate("breakpoint exists".to_string()));
        }
        info!(target: "debugger", "breakpoint set at {}", b);
        self.points.push(b);
        Ok(())
    }

    pub fn clear(&mut self, filename: &str, line: usize) -> Result<(), DebugError> {
        if self.points.is_empty() {
            return Err(DebugError::NotFound("no breakpoints set".to_string()));
        }
        let idx = self
            .points
            .iter()
            .position(|b| b.filename == filename && b.line == line)
            .ok_or_else(|| DebugError::NotFound(format!("no breakpoint at {filename}:{line}")))?;
        let removed = self.points.remove(idx);
        info!(target: "debugger", "breakpoint removed from {}", removed);
        Ok(())
    }

    /// All breakpoints in insertion order. Having none is an error.
    pub fn list(&self) -> Result<&[Breakpoint], DebugError> {
        if self.points.is_empty() {
            return Err(DebugError::NotFound("no breakpoints".to_string()));
        }
        Ok(&self.points)
    }

    pub fn contains(&self, filename: &str, line: usize) -> bool {
        self.points
            .iter()
            .any(|b| b.filename == filename && b.line == line)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_set_is_rejected() {
        let mut bps = Breakpoints::new();
        bps.set("main.js", 3).expect("first set should succeed");
        let err = bps.set("main.js", 3).unwrap_err();
        assert!(matches!(err, DebugError::Duplicate(_)));
        assert_eq!(bps.len(), 1, "registry size must not change");
    }

    #[test]
    fn test_same_line_other_file_is_distinct() {
        let mut bps = Breakpoints::new();
        bps.set("a.js", 1).expect("set a");
        bps.set("b.js", 1).expect("set b");
        assert!(bps.contains("a.js", 1));
        assert!(bps.contains("b.js", 1));
        assert!(!bps.contains("c.js", 1));
    }

    #[test]
    fn test_clear_on_empty_registry() {
        let mut bps = Breakpoints::new();
        let err = bps.clear("main.js", 1).unwrap_err();
        assert_eq!(err, DebugError::NotFound("no breakpoints set".to_string()));
    }

    #[test]
    fn test_clear_removes_exactly_once() {
        let mut bps = Breakpoints::new();
        bps.set("main.js", 2).expect("set");
        bps.set("main.js", 5).expect("set");

        assert!(matches!(bps.clear("main.js", 9), Err(DebugError::NotFound(_))));
        bps.clear("main.js", 2).expect("clear registered breakpoint");
        assert!(matches!(bps.clear("main.js", 2), Err(DebugError::NotFound(_))));

        let listed = bps.list().expect("one breakpoint left");
        assert_eq!(listed, &[Breakpoint::new("main.js", 5)]);
    }

    #[test]
    fn test_list_on_empty_is_error() {
        let bps = Breakpoints::new();
        assert!(matches!(bps.list(), Err(DebugError::NotFound(_))));
    }
}
