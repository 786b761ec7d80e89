/*++

Licensed under the Apache-2.0 license.

File Name:

    dump.rs

Abstract:

    Diagnostic snapshot of the mailbox interface, captured when a protocol
    desync is detected.

--*/

use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::{reg, tcdm};

use crate::io::Io;

/// State of the host/firmware interface at the point a desync was detected.
#[derive(Debug, Clone)]
pub struct DiagnosticDump {
    /// Channel on which the desync was detected.
    pub mailbox: u8,
    /// What the driver was doing.
    pub context: &'static str,
    pub mbox_cpu_val: u32,
    pub arm_it1_val: u32,
    pub sem: u32,
    /// TCDM mailbox header block (request headers, ack header at +8).
    pub headers: [u8; 16],
    /// Mailbox 0 ack region (power-transition status, read pointer, event
    /// buffers).
    pub ack_mb0: [u8; 52],
    /// Ack words for mailboxes 1 through 5.
    pub ack: [[u8; 4]; 5],
}

impl DiagnosticDump {
    pub(crate) fn capture<M: Mmio>(io: &Io<M>, mailbox: u8, context: &'static str) -> Self {
        let mut headers = [0u8; 16];
        for (i, b) in headers.iter_mut().enumerate() {
            *b = io.tcdm_read8(tcdm::_PRCM_MBOX_HEADER + i as u32);
        }
        let mut ack_mb0 = [0u8; 52];
        for (i, b) in ack_mb0.iter_mut().enumerate() {
            *b = io.tcdm_read8(tcdm::PRCM_ACK_MB0 + i as u32);
        }
        let ack_base = [
            tcdm::PRCM_ACK_MB1,
            tcdm::PRCM_ACK_MB2,
            tcdm::PRCM_ACK_MB3,
            tcdm::PRCM_ACK_MB4,
            tcdm::PRCM_ACK_MB5,
        ];
        let mut ack = [[0u8; 4]; 5];
        for (n, base) in ack_base.iter().enumerate() {
            for i in 0..4 {
                ack[n][i] = io.tcdm_read8(base + i as u32);
            }
        }
        Self {
            mailbox,
            context,
            mbox_cpu_val: io.reg_read(reg::PRCM_MBOX_CPU_VAL),
            arm_it1_val: io.reg_read(reg::PRCM_ARM_IT1_VAL),
            sem: io.reg_read(reg::PRCM_SEM),
            headers,
            ack_mb0,
            ack,
        }
    }
}

impl core::fmt::Display for DiagnosticDump {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "mailbox {} ({}): cpu_val=0x{:02x} it1_val=0x{:02x} sem=0x{:x} headers=[",
            self.mailbox, self.context, self.mbox_cpu_val, self.arm_it1_val, self.sem
        )?;
        for (i, b) in self.headers.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{b:02x}")?;
        }
        write!(f, "]")
    }
}
