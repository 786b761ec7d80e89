/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Register and shared-memory map of the DB8500 PRCMU, as seen from the
    application processor. Two address windows exist: the PRCM register
    window and the TCDM shared memory window used for mailbox payloads.

--*/

pub mod reg;
pub mod tcdm;
pub mod wakeup;

/// Physical base of the PRCM register window.
pub const PRCMU_REG_BASE: u32 = 0x8015_7000;

/// Physical base of the TCDM shared memory window.
pub const PRCMU_TCDM_BASE: u32 = 0x801B_8000;

/// Size of the TCDM window.
pub const PRCMU_TCDM_SIZE: u32 = 0x1000;

/// Size of the PRCM register window.
pub const PRCMU_REG_SIZE: u32 = 0x1100;

/// Number of mailbox channels multiplexed on the PRCMU interrupt line.
pub const NUM_MB: usize = 8;

pub const fn mbox_bit(n: usize) -> u32 {
    1 << n
}

pub const ALL_MBOX_BITS: u32 = (1 << NUM_MB) - 1;
