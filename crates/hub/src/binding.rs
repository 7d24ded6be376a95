//! Remote binding state and the blocking wait primitive

use parking_lot::{Condvar, Mutex};

/// Connection state toward the remote aggregation endpoint.
///
/// Transitions are driven only by the external connection lifecycle:
/// `Unbound -> Bound -> Disconnected -> Bound -> ...` for the life of the
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// No connection has been established yet
    Unbound,
    /// A remote endpoint is bound and usable
    Bound,
    /// A previously bound endpoint went away
    Disconnected,
}

/// Guarded state flag with a wait/notify primitive.
///
/// `wait_until_bound` re-checks the flag in a loop, so spurious wakeups are
/// harmless. Must not be called from the thread that drives state
/// transitions; that would deadlock against itself.
pub struct BindingLatch {
    state: Mutex<BindingState>,
    cond: Condvar,
}

impl BindingLatch {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BindingState::Unbound),
            cond: Condvar::new(),
        }
    }

    pub fn state(&self) -> BindingState {
        *self.state.lock()
    }

    pub fn is_bound(&self) -> bool {
        self.state() == BindingState::Bound
    }

    /// Mark the endpoint bound and wake every waiter.
    pub fn set_bound(&self) {
        let mut state = self.state.lock();
        *state = BindingState::Bound;
        self.cond.notify_all();
    }

    /// Mark a previously bound endpoint as gone. A latch that never reached
    /// `Bound` stays `Unbound`.
    pub fn set_disconnected(&self) {
        let mut state = self.state.lock();
        if *state == BindingState::Bound {
            *state = BindingState::Disconnected;
        }
    }

    /// Block until the state is `Bound`.
    ///
    /// Returns immediately when already bound.
    pub fn wait_until_bound(&self) {
        let mut state = self.state.lock();
        while *state != BindingState::Bound {
            self.cond.wait(&mut state);
        }
    }
}

impl Default for BindingLatch {
    fn default() -> Self {
        Self::new()
    }
}
