use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Readiness of a [`Signal`]
///
/// `NotReady -> Ready` is the only transition and it happens at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    Ready,
}

/// State guarded by the signal's mutex
#[derive(Debug)]
struct State {
    readiness: Readiness,
    /// Threads currently blocked in the wait loop
    waiters: usize,
    /// Returns from `Condvar::wait`, spurious ones included
    wakeups: usize,
}

/// One-shot readiness flag guarded by a mutex and paired with a condition variable
///
/// The flag is only ever read or written while the mutex is held. Both
/// threads of the handshake hold the same `Signal` through an `Arc`.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use handshake::signal::Signal;
///
/// let signal = Arc::new(Signal::new());
/// let waiter = Arc::clone(&signal);
/// let handle = thread::spawn(move || waiter.wait_until_ready());
/// assert!(signal.set_ready_and_notify());
/// handle.join().unwrap();
/// assert!(signal.is_ready());
/// ```
#[derive(Debug)]
pub struct Signal {
    state: Mutex<State>,
    cvar: Condvar,
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal {
    /// Creates a signal in the `NotReady` state
    pub fn new() -> Signal {
        Signal {
            state: Mutex::new(State {
                readiness: Readiness::NotReady,
                waiters: 0,
                wakeups: 0,
            }),
            cvar: Condvar::new(),
        }
    }

    // A holder that panicked cannot leave the flag or counters half-written,
    // so a poisoned lock is taken over as is.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the signal is ready
    ///
    /// # Returns
    /// Number of times the caller blocked on the condition variable
    pub fn wait_until_ready(&self) -> usize {
        self.wait_until_ready_with(|| {}, || {})
    }

    /// Blocks until the signal is ready, calling `before_wait` under the lock
    /// right before every block and `on_ready` under the lock once the flag is
    /// observed set
    ///
    /// The predicate is re-checked after each wake-up, so a notify that does
    /// not correspond to the transition (or no notify at all) only sends the
    /// caller back to sleep.
    ///
    /// # Returns
    /// Number of times the caller blocked on the condition variable
    pub fn wait_until_ready_with<W, R>(&self, mut before_wait: W, on_ready: R) -> usize
    where
        W: FnMut(),
        R: FnOnce(),
    {
        let mut state = self.lock();
        let mut waits = 0;
        while state.readiness == Readiness::NotReady {
            before_wait();
            waits += 1;
            state.waiters += 1;
            state = self
                .cvar
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            state.waiters -= 1;
            state.wakeups += 1;
        }
        on_ready();
        waits
    }

    /// Marks the signal ready and wakes a waiter
    ///
    /// # Returns
    /// `true` if this call performed the `NotReady -> Ready` transition,
    /// `false` if the signal was already ready
    pub fn set_ready_and_notify(&self) -> bool {
        self.set_ready_and_notify_with(|| {}, || {})
    }

    /// Marks the signal ready and wakes a waiter, calling `before_set` under
    /// the lock before the transition and `after_notify` under the lock after
    /// the notify
    ///
    /// Repeated calls leave the state `Ready` and notify again.
    pub fn set_ready_and_notify_with<B, A>(&self, before_set: B, after_notify: A) -> bool
    where
        B: FnOnce(),
        A: FnOnce(),
    {
        let mut state = self.lock();
        before_set();
        let transitioned = state.readiness == Readiness::NotReady;
        state.readiness = Readiness::Ready;
        self.cvar.notify_one();
        after_notify();
        transitioned
    }

    pub fn readiness(&self) -> Readiness {
        self.lock().readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    /// Number of threads currently blocked in [`Signal::wait_until_ready`]
    pub fn waiters(&self) -> usize {
        self.lock().waiters
    }

    /// Total number of wake-ups observed by waiters, spurious ones included
    pub fn wakeups(&self) -> usize {
        self.lock().wakeups
    }

    /// Wakes every waiter without touching the flag
    ///
    /// Stands in for a spurious wake-up in tests.
    #[cfg(test)]
    pub(crate) fn wake_without_setting(&self) {
        let _state = self.lock();
        self.cvar.notify_all();
    }
}
