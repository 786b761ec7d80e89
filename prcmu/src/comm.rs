/*++

Licensed under the Apache-2.0 license.

File Name:

    comm.rs

Abstract:

    Adaptive communication timeout controller. Every wait for a firmware
    reply samples the timeout from here at wait time.

--*/

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::info;

use crate::wait::lock;

pub const DEFAULT_COMM_TIMEOUT: Duration = Duration::from_millis(2000);

struct State {
    tout: Duration,
    /// Value to restore after a temporary override expires. Snapshotted
    /// when the first override of a stack is applied.
    rst_tout: Duration,
    /// Bumped on every permanent or temporary change; a restore timer only
    /// fires if the generation it captured is still current.
    generation: u64,
    restore_armed: bool,
}

/// Controls how long mailbox transactions wait for a firmware reply.
/// Temporary overrides fall back to the pre-override value after their
/// validity window; stacked overrides restore the value from before the
/// first one.
pub struct CommTimeout {
    /// Restore timers block on the condvar; any generation bump signals
    /// it so a superseded timer exits instead of sleeping out its window.
    shared: Arc<(Mutex<State>, Condvar)>,
}

impl CommTimeout {
    pub fn new(default: Duration) -> Self {
        Self {
            shared: Arc::new((
                Mutex::new(State {
                    tout: default,
                    rst_tout: default,
                    generation: 0,
                    restore_armed: false,
                }),
                Condvar::new(),
            )),
        }
    }

    /// The timeout a wait started now should use.
    pub fn current(&self) -> Duration {
        lock(&self.shared.0).tout
    }

    /// Set a new default timeout. Cancels any pending temporary override.
    pub fn set_permanent(&self, timeout: Duration) {
        let mut state = lock(&self.shared.0);
        state.generation += 1;
        state.restore_armed = false;
        state.tout = timeout;
        state.rst_tout = timeout;
        info!("prcmu: changed comm timeout: {:?}", state.tout);
        self.shared.1.notify_all();
    }

    /// Temporarily override the timeout. After `valid_for`, it falls back
    /// to the last permanent value. A second override while one is pending
    /// replaces it but keeps the original restore value.
    pub fn set_temporary(&self, timeout: Duration, valid_for: Duration) {
        let generation;
        {
            let mut state = lock(&self.shared.0);
            state.generation += 1;
            generation = state.generation;
            if !state.restore_armed {
                state.rst_tout = state.tout;
                state.restore_armed = true;
            }
            state.tout = timeout;
            info!(
                "prcmu: changed comm timeout: {:?} (restore {:?})",
                state.tout, state.rst_tout
            );
            self.shared.1.notify_all();
        }
        let shared = Arc::clone(&self.shared);
        std::thread::spawn(move || {
            let deadline = Instant::now() + valid_for;
            let (mutex, cancelled) = &*shared;
            let mut state = lock(mutex);
            loop {
                if state.generation != generation {
                    // Superseded; the newer change owns the restore.
                    return;
                }
                let now = Instant::now();
                if now >= deadline {
                    state.tout = state.rst_tout;
                    state.restore_armed = false;
                    info!("prcmu: restored comm timeout: {:?}", state.tout);
                    return;
                }
                state = match cancelled.wait_timeout(state, deadline - now) {
                    Ok((guard, _)) => guard,
                    Err(poisoned) => poisoned.into_inner().0,
                };
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_set() {
        let c = CommTimeout::new(DEFAULT_COMM_TIMEOUT);
        assert_eq!(c.current(), DEFAULT_COMM_TIMEOUT);
        c.set_permanent(Duration::from_millis(100));
        assert_eq!(c.current(), Duration::from_millis(100));
    }

    #[test]
    fn test_temporary_restores() {
        let c = CommTimeout::new(Duration::from_millis(500));
        c.set_temporary(Duration::from_millis(50), Duration::from_millis(20));
        assert_eq!(c.current(), Duration::from_millis(50));
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(c.current(), Duration::from_millis(500));
    }

    #[test]
    fn test_stacked_overrides_restore_first_snapshot() {
        let c = CommTimeout::new(Duration::from_millis(500));
        c.set_temporary(Duration::from_millis(50), Duration::from_secs(60));
        c.set_temporary(Duration::from_millis(70), Duration::from_millis(20));
        assert_eq!(c.current(), Duration::from_millis(70));
        std::thread::sleep(Duration::from_millis(200));
        // Falls back to the value from before the first override, and the
        // first override's (cancelled) timer must not fire afterwards.
        assert_eq!(c.current(), Duration::from_millis(500));
    }

    #[test]
    fn test_permanent_cancels_pending_restore() {
        let c = CommTimeout::new(Duration::from_millis(500));
        c.set_temporary(Duration::from_millis(50), Duration::from_millis(20));
        c.set_permanent(Duration::from_millis(300));
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(c.current(), Duration::from_millis(300));
    }

    #[test]
    fn test_superseded_timer_exits_before_its_window() {
        let c = CommTimeout::new(Duration::from_millis(500));
        // A one-minute override, immediately cancelled. The restore timer
        // must wake and drop its state handle well within the window.
        c.set_temporary(Duration::from_millis(50), Duration::from_secs(60));
        c.set_permanent(Duration::from_millis(300));
        let deadline = Instant::now() + Duration::from_secs(5);
        while Arc::strong_count(&c.shared) > 1 {
            assert!(Instant::now() < deadline, "restore timer still running");
            std::thread::yield_now();
        }
        assert_eq!(c.current(), Duration::from_millis(300));
    }
}
