/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    Shared test harness: an emulated firmware instance wired to the driver,
    with a pump thread standing in for the interrupt controller.

--*/

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use ux500_emu_prcmu::PrcmuFirmware;
use ux500_prcmu::{Prcmu, PrcmuArgs, WaitPolicy};

/// Busy-wait policy tuned for the emulated firmware: yields instead of
/// spinning so the pump thread gets scheduled, with a bound that still
/// trips quickly when the firmware is wedged.
pub struct TestWait;

impl WaitPolicy for TestWait {
    fn max_spins(&self) -> u32 {
        200_000
    }

    fn relax(&self) {
        std::thread::yield_now();
    }

    fn pause(&self, _micros: u64) {
        std::thread::yield_now();
    }
}

pub struct Harness {
    pub fw: PrcmuFirmware,
    pub prcmu: Arc<Prcmu<PrcmuFirmware>>,
    stop: Arc<AtomicBool>,
    pump: Option<JoinHandle<()>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_args(Self::args())
    }

    pub fn args() -> PrcmuArgs {
        PrcmuArgs {
            comm_timeout: Duration::from_millis(500),
            wait: Box::new(TestWait),
            ..Default::default()
        }
    }

    pub fn with_args(args: PrcmuArgs) -> Self {
        Self::with_fw(PrcmuFirmware::new(), args)
    }

    pub fn with_fw(fw: PrcmuFirmware, args: PrcmuArgs) -> Self {
        let prcmu = Arc::new(Prcmu::new(fw.clone(), args));
        let stop = Arc::new(AtomicBool::new(false));

        let pump = {
            let fw = fw.clone();
            let prcmu = Arc::clone(&prcmu);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    fw.service();
                    if prcmu.handle_interrupt() {
                        // Level-triggered line: hold off until the comm
                        // worker has cleared all bits, so one interrupt is
                        // raised per firmware reply.
                        while fw.pending_irqs() != 0 && !stop.load(Ordering::Relaxed) {
                            std::thread::yield_now();
                        }
                    }
                    std::thread::sleep(Duration::from_micros(50));
                }
            })
        };

        Self {
            fw,
            prcmu,
            stop,
            pump: Some(pump),
        }
    }

    /// Poll until `cond` holds, panicking after a generous deadline.
    pub fn wait_until(&self, what: &str, cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out waiting for {what}");
            std::thread::sleep(Duration::from_micros(100));
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
    }
}
