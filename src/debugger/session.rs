use log::{debug, warn};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// One-shot signal ending a pause cycle.
///
/// Any number of threads may [`wait`](Gate::wait); they all wake on the
/// first [`release`](Gate::release). Releasing twice is a no-op.
#[derive(Debug, Default)]
pub struct Gate {
    released: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this call released the gate, false if it was
    /// already released.
    pub fn release(&self) -> bool {
        let mut released = self.released.lock().unwrap_or_else(PoisonError::into_inner);
        if *released {
            return false;
        }
        *released = true;
        self.cond.notify_all();
        true
    }

    pub fn is_released(&self) -> bool {
        *self.released.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the gate is released.
    pub fn wait(&self) {
        let mut released = self.released.lock().unwrap_or_else(PoisonError::into_inner);
        while !*released {
            released = self.cond.wait(released).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Paused,
    Running,
    Released,
}

/// Pause/resume synchronization and the stepping cursor of one debugging
/// session.
#[derive(Debug)]
pub struct Session {
    gate: Arc<Gate>,
    state: SessionState,
    pub(crate) current_line: usize,
    /// Starts with the sentinel 0; consecutive duplicates are never stored.
    last_lines: Vec<usize>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Gate::new()),
            state: SessionState::Paused,
            current_line: 0,
            last_lines: vec![0],
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Handle for threads that need to block on this pause cycle.
    pub fn gate(&self) -> Arc<Gate> {
        Arc::clone(&self.gate)
    }

    /// Block the calling thread until the current gate is released.
    pub fn wait(&self) {
        self.gate.wait();
    }

    /// Release the current gate. A second release is ignored.
    pub fn release(&mut self) {
        if self.gate.release() {
            debug!(target: "debugger", "session gate released");
        } else {
            warn!(target: "debugger", "session gate already released, ignoring");
        }
        self.state = SessionState::Released;
    }

    /// Arm a fresh gate for a new pause cycle.
    pub fn reactivate(&mut self) {
        self.gate = Arc::new(Gate::new());
        self.state = SessionState::Paused;
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn last_lines(&self) -> &[usize] {
        &self.last_lines
    }

    pub fn last_line(&self) -> usize {
        self.last_lines.last().copied().unwrap_or(self.current_line)
    }

    pub(crate) fn push_last_line(&mut self, line: usize) {
        if self.last_lines.last() != Some(&line) {
            self.last_lines.push(line);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
