/*++

Licensed under the Apache-2.0 license.

File Name:

    wait.rs

Abstract:

    Busy-wait policy and completion primitives used by the mailbox
    transaction engine.

--*/

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// How the driver busy-waits on hardware bits (mailbox pending bits, the
/// clock-management semaphore, PLL lock). A policy bounds every spin so a
/// wedged firmware surfaces as a protocol desync instead of a hang.
pub trait WaitPolicy: Send + Sync {
    /// Upper bound on spin iterations before the wait is abandoned.
    fn max_spins(&self) -> u32 {
        10_000_000
    }

    /// Invoked between spin iterations.
    fn relax(&self) {
        std::hint::spin_loop();
    }

    /// Fixed delay, for hardware-mandated settle times.
    fn pause(&self, micros: u64) {
        std::thread::sleep(Duration::from_micros(micros));
    }
}

/// Default policy: plain bounded spinning.
#[derive(Default)]
pub struct SpinWait;

impl WaitPolicy for SpinWait {}

/// Lock a mutex, recovering the data if a previous holder panicked. The
/// driver's shared state stays consistent under its own locks, so a poison
/// marker carries no extra information here.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Counting completion: `complete` grants one wait, whether or not a waiter
/// is already blocked. Matches the semantics the transaction engine was
/// designed against, where an ack can land before the requester starts
/// waiting for it.
pub struct Completion {
    count: Mutex<u32>,
    cond: Condvar,
}

impl Completion {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    pub fn complete(&self) {
        let mut count = lock(&self.count);
        *count += 1;
        self.cond.notify_one();
    }

    /// Wait for a completion, consuming one grant. Returns false on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let mut count = lock(&self.count);
        while *count == 0 {
            let now = std::time::Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, result) = match self.cond.wait_timeout(count, deadline - now) {
                Ok((guard, result)) => (guard, result),
                Err(poisoned) => {
                    let (guard, result) = poisoned.into_inner();
                    (guard, result)
                }
            };
            count = guard;
            if result.timed_out() && *count == 0 {
                return false;
            }
        }
        *count -= 1;
        true
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_completion_grant_before_wait() {
        let c = Completion::new();
        c.complete();
        assert!(c.wait_timeout(Duration::from_millis(1)));
        // The grant is consumed.
        assert!(!c.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_completion_counts_grants() {
        let c = Completion::new();
        c.complete();
        c.complete();
        assert!(c.wait_timeout(Duration::from_millis(1)));
        assert!(c.wait_timeout(Duration::from_millis(1)));
        assert!(!c.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_completion_cross_thread() {
        let c = Arc::new(Completion::new());
        let c2 = c.clone();
        let t = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            c2.complete();
        });
        assert!(c.wait_timeout(Duration::from_secs(5)));
        t.join().unwrap();
    }
}
