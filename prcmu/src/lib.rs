/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Host-side driver for the DB8500 PRCMU (power, reset and clock
    management unit). The host talks to the PRCMU firmware over eight
    mailbox channels whose payloads live in TCDM shared memory, and reads
    or programs clock hardware through the PRCM register window.

--*/

mod ab8500;
mod clock;
mod comm;
mod dump;
mod dvfs;
mod epod;
mod error;
mod io;
mod irq;
mod mailbox;
mod power;
mod types;
mod wait;
mod wakeup;
mod watchdog;

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::{reg, ALL_MBOX_BITS};

pub use comm::DEFAULT_COMM_TIMEOUT;
pub use dump::DiagnosticDump;
pub use error::{Error, Result};
pub use io::PrcmuMap;
pub use types::{
    ApPowerState, ApeOpp, ArmOpp, AutoPmConfig, ClkoutSource, DdrOpp, EpodId, EpodState,
    Esram0DeepSleepState, RomcodeRead, RomcodeWrite, AUTO_PM_OFF, AUTO_PM_ON, NUM_EPOD_ID,
};
pub use wait::{Completion, SpinWait, WaitPolicy};
pub use clock::{Clock, NUM_REG_CLOCKS, ROOT_CLOCK_RATE};
pub use ux500_prcmu_regs::wakeup::{PrcmuIrq, PrcmuWakeups, WakeupBit};

use crate::comm::CommTimeout;
use crate::io::Io;
use crate::irq::Work;
use crate::mailbox::{Mb0, Mb1, Mb2, Mb3, Mb4, Mb5};
use crate::wait::{lock, SpinWait as DefaultWait};

/// Callback invoked by the comm worker for each decoded logical wakeup.
pub type WakeupSink = Box<dyn Fn(PrcmuIrq) + Send + Sync>;

/// Construction arguments.
pub struct PrcmuArgs {
    pub map: PrcmuMap,
    /// Initial adaptive communication timeout.
    pub comm_timeout: Duration,
    /// Busy-wait policy for pending bits, the clock semaphore and PLL lock.
    pub wait: Box<dyn WaitPolicy>,
    /// Receiver for decoded wakeup interrupts.
    pub wakeup_sink: Option<WakeupSink>,
}

impl Default for PrcmuArgs {
    fn default() -> Self {
        Self {
            map: PrcmuMap::default(),
            comm_timeout: DEFAULT_COMM_TIMEOUT,
            wait: Box::new(DefaultWait),
            wakeup_sink: None,
        }
    }
}

/// Driver state shared with the comm worker thread.
pub(crate) struct Inner<M> {
    pub(crate) io: Io<M>,
    pub(crate) wait: Box<dyn WaitPolicy>,
    pub(crate) comm: CommTimeout,
    pub(crate) wakeup_sink: Option<WakeupSink>,
    pub(crate) mb0: Mb0,
    pub(crate) mb1: Mb1,
    pub(crate) mb2: Mb2,
    pub(crate) mb3: Mb3,
    pub(crate) mb4: Mb4,
    pub(crate) mb5: Mb5,
    pub(crate) clk: clock::ClockState,
}

/// The PRCMU driver. All methods take `&self`; the channel locks serialize
/// the hardware protocol. Replies are decoded by a dedicated comm worker
/// thread fed by [`Prcmu::handle_interrupt`].
pub struct Prcmu<M: Mmio + 'static> {
    inner: Arc<Inner<M>>,
    work_tx: Mutex<mpsc::Sender<Work>>,
    worker: Option<JoinHandle<()>>,
}

impl<M: Mmio + 'static> Prcmu<M> {
    pub fn new(mmio: M, args: PrcmuArgs) -> Self {
        let inner = Arc::new(Inner {
            io: Io::new(mmio, args.map),
            wait: args.wait,
            comm: CommTimeout::new(args.comm_timeout),
            wakeup_sink: args.wakeup_sink,
            mb0: Mb0::new(),
            mb1: Mb1::new(),
            mb2: Mb2::new(),
            mb3: Mb3::new(),
            mb4: Mb4::new(),
            mb5: Mb5::new(),
            clk: clock::ClockState::new(),
        });

        // The boot code may leave the A9 subsystem clocks forced on.
        inner.io.reg_write_masked(
            reg::PRCM_A9PL_FORCE_CLKEN,
            reg::PRCM_A9PL_FORCE_CLKEN_PRCM_A9PL_FORCE_CLKEN
                | reg::PRCM_A9PL_FORCE_CLKEN_PRCM_A9AXI_FORCE_CLKEN,
            0,
        );

        // Persist the reset reason of the reboot that got us here before
        // anything overwrites the status register's context.
        inner.persist_reset_code();

        // Drop mailbox interrupts left over from pre-boot code.
        inner.io.reg_write(reg::PRCM_ARM_IT1_CLR, ALL_MBOX_BITS);

        let (work_tx, work_rx) = mpsc::channel();
        let worker_inner = Arc::clone(&inner);
        let worker = std::thread::spawn(move || irq::worker_loop(worker_inner, work_rx));

        Self {
            inner,
            work_tx: Mutex::new(work_tx),
            worker: Some(worker),
        }
    }

    /// Non-blocking top half. Reads the mailbox ready vector and, when any
    /// channel has a reply pending, hands it to the comm worker. Returns
    /// whether the interrupt was ours.
    pub fn handle_interrupt(&self) -> bool {
        let bits = self.inner.io.reg_read(reg::PRCM_ARM_IT1_VAL) & ALL_MBOX_BITS;
        if bits == 0 {
            return false;
        }
        self.queue(Work::Dispatch(bits));
        true
    }

    pub(crate) fn queue(&self, work: Work) {
        // A send failure means the worker is already gone (drop in
        // progress); the work is moot then.
        let _ = lock(&self.work_tx).send(work);
    }

    /// Set a new default communication timeout; cancels any pending
    /// temporary override.
    pub fn set_comm_timeout(&self, timeout: Duration) {
        self.inner.comm.set_permanent(timeout);
    }

    /// Temporarily override the communication timeout; after `valid_for`
    /// it falls back to the last default. A second override while one is
    /// pending takes over but keeps the original restore value.
    pub fn temp_set_comm_timeout(&self, timeout: Duration, valid_for: Duration) {
        self.inner.comm.set_temporary(timeout, valid_for);
    }
}

impl<M: Mmio + 'static> Drop for Prcmu<M> {
    fn drop(&mut self) {
        let _ = lock(&self.work_tx).send(Work::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
