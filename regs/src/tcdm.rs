/*++

Licensed under the Apache-2.0 license.

File Name:

    tcdm.rs

Abstract:

    TCDM shared-memory layout: mailbox request/acknowledgment regions,
    header block and fixed status locations. All offsets are within the
    4 KiB TCDM window and are part of the firmware contract.

--*/

pub const PRCM_BOOT_STATUS: u32 = 0xFFF;
pub const PRCM_ROMCODE_A2P: u32 = 0xFFE;
pub const PRCM_ROMCODE_P2A: u32 = 0xFFD;
/// Current xp70 power state, 4 bytes.
pub const PRCM_XP70_CUR_PWR_STATE: u32 = 0xFFC;

/// Software reset reason, 2 bytes, persisted across an APE soft reset.
pub const PRCM_RESET_REASON: u32 = 0xFF8;

/// Mailbox header block, 16 bytes: request headers first, ack headers at +8.
pub const _PRCM_MBOX_HEADER: u32 = 0xFE8;
pub const PRCM_MBOX_HEADER_REQ_MB0: u32 = _PRCM_MBOX_HEADER;
pub const PRCM_MBOX_HEADER_REQ_MB1: u32 = _PRCM_MBOX_HEADER + 0x1;
pub const PRCM_MBOX_HEADER_REQ_MB2: u32 = _PRCM_MBOX_HEADER + 0x2;
pub const PRCM_MBOX_HEADER_REQ_MB3: u32 = _PRCM_MBOX_HEADER + 0x3;
pub const PRCM_MBOX_HEADER_REQ_MB4: u32 = _PRCM_MBOX_HEADER + 0x4;
pub const PRCM_MBOX_HEADER_REQ_MB5: u32 = _PRCM_MBOX_HEADER + 0x5;
pub const PRCM_MBOX_HEADER_ACK_MB0: u32 = _PRCM_MBOX_HEADER + 0x8;

// Request mailbox regions.
pub const PRCM_REQ_MB0: u32 = 0xFDC; // 12 bytes
pub const PRCM_REQ_MB1: u32 = 0xFD0; // 12 bytes
pub const PRCM_REQ_MB2: u32 = 0xFC0; // 16 bytes
pub const PRCM_REQ_MB3: u32 = 0xE4C; // 372 bytes
pub const PRCM_REQ_MB4: u32 = 0xE48; // 4 bytes
pub const PRCM_REQ_MB5: u32 = 0xE44; // 4 bytes

// Acknowledgment mailbox regions.
pub const PRCM_ACK_MB0: u32 = 0xE08; // 52 bytes
pub const PRCM_ACK_MB1: u32 = 0xE04; // 4 bytes
pub const PRCM_ACK_MB2: u32 = 0xE00; // 4 bytes
pub const PRCM_ACK_MB3: u32 = 0xDFC; // 4 bytes
pub const PRCM_ACK_MB4: u32 = 0xDF8; // 4 bytes
pub const PRCM_ACK_MB5: u32 = 0xDF4; // 4 bytes

/// Request region span per mailbox, for payload-ownership checking.
pub const fn req_region(n: usize) -> (u32, u32) {
    match n {
        0 => (PRCM_REQ_MB0, 12),
        1 => (PRCM_REQ_MB1, 12),
        2 => (PRCM_REQ_MB2, 16),
        3 => (PRCM_REQ_MB3, 372),
        4 => (PRCM_REQ_MB4, 4),
        5 => (PRCM_REQ_MB5, 4),
        _ => (0, 0),
    }
}

// Mailbox 0 headers.
pub const MB0H_POWER_STATE_TRANS: u8 = 0;
pub const MB0H_CONFIG_WAKEUPS_EXE: u8 = 1;
pub const MB0H_READ_WAKEUP_ACK: u8 = 3;
pub const MB0H_CONFIG_WAKEUPS_SLEEP: u8 = 4;
pub const MB0H_WAKEUP_EXE: u8 = 2;
pub const MB0H_WAKEUP_SLEEP: u8 = 5;

// Mailbox 0 requests.
pub const PRCM_REQ_MB0_AP_POWER_STATE: u32 = PRCM_REQ_MB0;
pub const PRCM_REQ_MB0_AP_PLL_STATE: u32 = PRCM_REQ_MB0 + 0x1;
pub const PRCM_REQ_MB0_ULP_CLOCK_STATE: u32 = PRCM_REQ_MB0 + 0x2;
pub const PRCM_REQ_MB0_DO_NOT_WFI: u32 = PRCM_REQ_MB0 + 0x3;
pub const PRCM_REQ_MB0_WAKEUP_8500: u32 = PRCM_REQ_MB0 + 0x4;
pub const PRCM_REQ_MB0_WAKEUP_4500: u32 = PRCM_REQ_MB0 + 0x8;

// Mailbox 0 acks: wakeup event words are double-buffered, selected by the
// read pointer bit to avoid tearing against the firmware's writes.
pub const PRCM_ACK_MB0_AP_PWRSTTR_STATUS: u32 = PRCM_ACK_MB0;
pub const PRCM_ACK_MB0_READ_POINTER: u32 = PRCM_ACK_MB0 + 0x1;
pub const PRCM_ACK_MB0_WAKEUP_0_8500: u32 = PRCM_ACK_MB0 + 0x4;
pub const PRCM_ACK_MB0_WAKEUP_0_4500: u32 = PRCM_ACK_MB0 + 0x8;
pub const PRCM_ACK_MB0_WAKEUP_1_8500: u32 = PRCM_ACK_MB0 + 0x1C;
pub const PRCM_ACK_MB0_WAKEUP_1_4500: u32 = PRCM_ACK_MB0 + 0x20;
pub const PRCM_ACK_MB0_EVENT_4500_NUMBERS: u32 = 20;

// Mailbox 1 headers.
pub const MB1H_ARM_APE_OPP: u8 = 0x0;
pub const MB1H_RESET_MODEM: u8 = 0x2;
pub const MB1H_REQUEST_APE_OPP_100_VOLT: u8 = 0x3;
pub const MB1H_RELEASE_APE_OPP_100_VOLT: u8 = 0x4;
pub const MB1H_RELEASE_USB_WAKEUP: u8 = 0x5;
pub const MB1H_PLL_ON_OFF: u8 = 0x6;

// Mailbox 1 requests.
pub const PRCM_REQ_MB1_ARM_OPP: u32 = PRCM_REQ_MB1;
pub const PRCM_REQ_MB1_APE_OPP: u32 = PRCM_REQ_MB1 + 0x1;
pub const PRCM_REQ_MB1_PLL_ON_OFF: u32 = PRCM_REQ_MB1 + 0x4;
pub const PLL_SOC1_OFF: u8 = 0x4;
pub const PLL_SOC1_ON: u8 = 0x8;

// Mailbox 1 acks.
pub const PRCM_ACK_MB1_CURRENT_ARM_OPP: u32 = PRCM_ACK_MB1;
pub const PRCM_ACK_MB1_CURRENT_APE_OPP: u32 = PRCM_ACK_MB1 + 0x1;
pub const PRCM_ACK_MB1_APE_VOLTAGE_STATUS: u32 = PRCM_ACK_MB1 + 0x2;
pub const PRCM_ACK_MB1_DVFS_STATUS: u32 = PRCM_ACK_MB1 + 0x3;

// Mailbox 2 headers.
pub const MB2H_DPS: u8 = 0x0;
pub const MB2H_AUTO_PWR: u8 = 0x1;

// Mailbox 2 requests: one byte per power domain, then auto-PM words.
pub const PRCM_REQ_MB2_AUTO_PM_SLEEP: u32 = PRCM_REQ_MB2 + 0x8;
pub const PRCM_REQ_MB2_AUTO_PM_IDLE: u32 = PRCM_REQ_MB2 + 0xC;

// Mailbox 2 acks.
pub const PRCM_ACK_MB2_DPS_STATUS: u32 = PRCM_ACK_MB2;
pub const HWACC_PWR_ST_OK: u8 = 0xFE;

// Mailbox 3 headers.
pub const MB3H_ANC: u8 = 0x0;
pub const MB3H_SIDETONE: u8 = 0x1;
pub const MB3H_SYSCLK: u8 = 0xE;

// Mailbox 3 requests.
pub const PRCM_REQ_MB3_SYSCLK_MGT: u32 = PRCM_REQ_MB3 + 0x16C;

// Mailbox 4 headers.
pub const MB4H_DDR_INIT: u8 = 0x0;
pub const MB4H_MEM_ST: u8 = 0x1;
pub const MB4H_HOTDOG: u8 = 0x12;
pub const MB4H_HOTMON: u8 = 0x13;
pub const MB4H_HOT_PERIOD: u8 = 0x14;
pub const MB4H_A9WDOG_CONF: u8 = 0x16;
pub const MB4H_A9WDOG_EN: u8 = 0x17;
pub const MB4H_A9WDOG_DIS: u8 = 0x18;
pub const MB4H_A9WDOG_LOAD: u8 = 0x19;
pub const MB4H_A9WDOG_KICK: u8 = 0x20;

// Mailbox 4 requests.
pub const PRCM_REQ_MB4_DDR_ST_AP_SLEEP_IDLE: u32 = PRCM_REQ_MB4;
pub const PRCM_REQ_MB4_DDR_ST_AP_DEEP_IDLE: u32 = PRCM_REQ_MB4 + 0x1;
pub const PRCM_REQ_MB4_ESRAM0_ST: u32 = PRCM_REQ_MB4 + 0x3;
pub const PRCM_REQ_MB4_HOTDOG_THRESHOLD: u32 = PRCM_REQ_MB4;
pub const PRCM_REQ_MB4_HOTMON_LOW: u32 = PRCM_REQ_MB4;
pub const PRCM_REQ_MB4_HOTMON_HIGH: u32 = PRCM_REQ_MB4 + 0x1;
pub const PRCM_REQ_MB4_HOTMON_CONFIG: u32 = PRCM_REQ_MB4 + 0x2;
pub const PRCM_REQ_MB4_HOT_PERIOD: u32 = PRCM_REQ_MB4;
pub const HOTMON_CONFIG_LOW: u8 = 1 << 0;
pub const HOTMON_CONFIG_HIGH: u8 = 1 << 1;
pub const PRCM_REQ_MB4_A9WDOG_0: u32 = PRCM_REQ_MB4;
pub const PRCM_REQ_MB4_A9WDOG_1: u32 = PRCM_REQ_MB4 + 0x1;
pub const PRCM_REQ_MB4_A9WDOG_2: u32 = PRCM_REQ_MB4 + 0x2;
pub const PRCM_REQ_MB4_A9WDOG_3: u32 = PRCM_REQ_MB4 + 0x3;
pub const A9WDOG_AUTO_OFF_EN: u8 = 1 << 7;
pub const A9WDOG_AUTO_OFF_DIS: u8 = 0;
pub const A9WDOG_ID_MASK: u8 = 0xF;

// Mailbox 5 requests (firmware-mediated I2C to the analog baseband).
pub const PRCM_REQ_MB5_I2C_SLAVE_OP: u32 = PRCM_REQ_MB5;
pub const PRCM_REQ_MB5_I2C_HW_BITS: u32 = PRCM_REQ_MB5 + 0x1;
pub const PRCM_REQ_MB5_I2C_REG: u32 = PRCM_REQ_MB5 + 0x2;
pub const PRCM_REQ_MB5_I2C_VAL: u32 = PRCM_REQ_MB5 + 0x3;

pub const fn i2c_write_op(slave: u8) -> u8 {
    (slave << 1) | (1 << 6)
}

pub const fn i2c_read_op(slave: u8) -> u8 {
    (slave << 1) | (1 << 0) | (1 << 6)
}

pub const PRCMU_I2C_STOP_EN: u8 = 1 << 3;

// Mailbox 5 acks.
pub const PRCM_ACK_MB5_I2C_STATUS: u32 = PRCM_ACK_MB5 + 0x1;
pub const PRCM_ACK_MB5_I2C_VAL: u32 = PRCM_ACK_MB5 + 0x3;
pub const I2C_WR_OK: u8 = 0x1;
pub const I2C_RD_OK: u8 = 0x2;

// AVS settings block.
pub const PRCM_AVS_BASE: u32 = 0x2FC;
pub const PRCM_AVS_VARM_MAX_OPP: u32 = PRCM_AVS_BASE + 0x4;
pub const PRCM_AVS_SIZE: u32 = 14;
pub const PRCM_AVS_ISMODEENABLE_MASK: u8 = 1 << 7;
