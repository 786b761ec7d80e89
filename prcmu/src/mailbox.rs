/*++

Licensed under the Apache-2.0 license.

File Name:

    mailbox.rs

Abstract:

    Per-channel mailbox state and the transaction primitives shared by all
    request paths: claim the channel, write the payload, fire the pending
    bit, wait for the firmware reply.

--*/

use std::sync::atomic::{AtomicBool, AtomicU32};
use std::sync::Mutex;

use log::error;
use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::{mbox_bit, reg, tcdm};

use crate::dump::DiagnosticDump;
use crate::error::{Error, Result};
use crate::types::ApeOpp;
use crate::wait::{lock, Completion};
use crate::Inner;

/// Mailbox 0: power-state requests, wakeup configuration and the incoming
/// wakeup-event stream. Requests are fire-and-forget; replies arrive as
/// unsolicited events.
pub(crate) struct Mb0 {
    /// Transaction lock; also guards the persistent request fields.
    pub lock: Mutex<Mb0State>,
    /// Wakeup bits currently forwarded as logical interrupts. Read by the
    /// wakeup decode path without taking the transaction lock.
    pub dbb_irqs: AtomicU32,
    pub ac_wake_lock: Mutex<()>,
    pub ac_wake_work: Completion,
    pub ac_wake_requested: AtomicBool,
}

#[derive(Default)]
pub(crate) struct Mb0State {
    pub dbb_wakeups: u32,
    pub abb_events: u32,
    /// Last event sets pushed to the firmware, to suppress no-op pushes.
    pub last_dbb_events: u32,
    pub last_abb_events: u32,
}

impl Mb0 {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(Mb0State::default()),
            dbb_irqs: AtomicU32::new(0),
            ac_wake_lock: Mutex::new(()),
            ac_wake_work: Completion::new(),
            ac_wake_requested: AtomicBool::new(false),
        }
    }
}

/// Mailbox 1: DVFS, modem control and PLL on/off.
pub(crate) struct Mb1 {
    pub lock: Mutex<Mb1State>,
    pub work: Completion,
    pub ack: Mutex<Mb1Ack>,
}

pub(crate) struct Mb1State {
    pub ape_opp: ApeOpp,
    /// Outstanding APE-OPP-100% voltage requests.
    pub ape_opp100_requests: u32,
    /// Outstanding PLL-SOC1 enable requests.
    pub pll_soc1_requests: u32,
}

#[derive(Default, Clone, Copy)]
pub(crate) struct Mb1Ack {
    pub header: u8,
    pub arm_opp: u8,
    pub ape_opp: u8,
    pub ape_voltage_status: u8,
}

impl Mb1 {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(Mb1State {
                ape_opp: ApeOpp::NoChange,
                ape_opp100_requests: 0,
                pll_soc1_requests: 0,
            }),
            work: Completion::new(),
            ack: Mutex::new(Mb1Ack::default()),
        }
    }
}

/// Mailbox 2: power domains and the shared auto-PM configuration.
pub(crate) struct Mb2 {
    pub lock: Mutex<()>,
    pub work: Completion,
    pub ack_status: Mutex<u8>,
    pub auto_pm: Mutex<bool>,
}

impl Mb2 {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            work: Completion::new(),
            ack_status: Mutex::new(0),
            auto_pm: Mutex::new(false),
        }
    }
}

/// Mailbox 3: system clock requests. The reply arrives as the SYSCLK_OK
/// event on mailbox 0.
pub(crate) struct Mb3 {
    pub lock: Mutex<()>,
    pub sysclk_lock: Mutex<()>,
    pub sysclk_work: Completion,
}

impl Mb3 {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            sysclk_lock: Mutex::new(()),
            sysclk_work: Completion::new(),
        }
    }
}

/// Mailbox 4: memory states, thermal supervision and the A9 watchdogs.
pub(crate) struct Mb4 {
    pub lock: Mutex<()>,
    pub work: Completion,
}

impl Mb4 {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            work: Completion::new(),
        }
    }
}

/// Mailbox 5: firmware-mediated I2C to the analog baseband.
pub(crate) struct Mb5 {
    pub lock: Mutex<()>,
    pub work: Completion,
    pub ack: Mutex<Mb5Ack>,
}

#[derive(Default, Clone, Copy)]
pub(crate) struct Mb5Ack {
    pub status: u8,
    pub value: u8,
}

impl Mb5 {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            work: Completion::new(),
            ack: Mutex::new(Mb5Ack::default()),
        }
    }
}

impl<M: Mmio> Inner<M> {
    /// Build the desync error, logging the snapshot on the way out.
    pub(crate) fn desync(&self, mailbox: u8, context: &'static str) -> Error {
        let dump = DiagnosticDump::capture(&self.io, mailbox, context);
        error!("prcmu: {dump}");
        Error::ProtocolDesync(Box::new(dump))
    }

    /// Spin until the channel's request-pending bit clears. The caller must
    /// hold the channel's transaction lock; only firmware clears the bit.
    pub(crate) fn claim(&self, n: usize, context: &'static str) -> Result<()> {
        let mut spins = 0;
        while self.io.reg_read(reg::PRCM_MBOX_CPU_VAL) & mbox_bit(n) != 0 {
            if spins >= self.wait.max_spins() {
                return Err(self.desync(n as u8, context));
            }
            spins += 1;
            self.wait.relax();
        }
        Ok(())
    }

    /// Hand the prepared request over to the firmware.
    pub(crate) fn fire(&self, n: usize) {
        self.io.reg_write(reg::PRCM_MBOX_CPU_SET, mbox_bit(n));
    }

    /// Wait for the channel's reply, bounded by the adaptive comm timeout
    /// sampled now.
    pub(crate) fn wait_reply(
        &self,
        n: usize,
        work: &Completion,
        context: &'static str,
    ) -> Result<()> {
        if !work.wait_timeout(self.comm.current()) {
            error!("prcmu: mailbox {n} timed out waiting for a reply ({context})");
            return Err(self.desync(n as u8, context));
        }
        Ok(())
    }

    /// One mailbox 4 transaction: payload bytes at their request offsets,
    /// then the header, then fire and wait.
    pub(crate) fn mb4_request(
        &self,
        header: u8,
        payload: &[(u32, u8)],
        context: &'static str,
    ) -> Result<()> {
        let _guard = lock(&self.mb4.lock);

        self.claim(4, context)?;

        for &(offset, value) in payload {
            self.io.tcdm_write8(offset, value);
        }
        self.io.tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB4, header);

        self.fire(4);
        self.wait_reply(4, &self.mb4.work, context)
    }
}
