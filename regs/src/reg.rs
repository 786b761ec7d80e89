/*++

Licensed under the Apache-2.0 license.

File Name:

    reg.rs

Abstract:

    PRCM register window offsets and bit fields.

--*/

use tock_registers::register_bitfields;

/// Mailbox request-pending bits: read shows the current value, writes to
/// `PRCM_MBOX_CPU_SET` set bits; firmware clears them as it drains.
pub const PRCM_MBOX_CPU_VAL: u32 = 0x0FC;
pub const PRCM_MBOX_CPU_SET: u32 = 0x100;

/// Mailbox acknowledgment interrupt line 1: value and write-1-to-clear.
pub const PRCM_ARM_IT1_VAL: u32 = 0x494;
pub const PRCM_ARM_IT1_CLR: u32 = 0x48C;

/// Single-bit hardware semaphore guarding all clock management registers.
pub const PRCM_SEM: u32 = 0x400;
pub const PRCM_SEM_PRCM_SEM: u32 = 1 << 0;

// PLL frequency registers.
pub const PRCM_PLLSOC0_FREQ: u32 = 0x080;
pub const PRCM_PLLSOC1_FREQ: u32 = 0x084;
pub const PRCM_PLLDDR_FREQ: u32 = 0x08C;
pub const PRCM_PLLDSI_FREQ: u32 = 0x500;

register_bitfields! [
    u32,

    /// PLL frequency register: rate = src * D / (N * R), with optional
    /// divide-by-2 stages.
    pub PllFreq [
        D OFFSET(0) NUMBITS(8) [],
        N OFFSET(8) NUMBITS(6) [],
        R OFFSET(16) NUMBITS(3) [],
        SELDIV2 OFFSET(24) NUMBITS(1) [],
        DIV2EN OFFSET(25) NUMBITS(1) [],
    ],

    /// Per-clock management register.
    pub ClkMgt [
        CLKPLLDIV OFFSET(0) NUMBITS(5) [],
        CLKPLLSW OFFSET(5) NUMBITS(3) [
            Soc0 = 0b001,
            Soc1 = 0b010,
            Ddr = 0b100,
        ],
        CLKEN OFFSET(8) NUMBITS(1) [],
        CLK38 OFFSET(9) NUMBITS(1) [],
        CLK38DIV OFFSET(11) NUMBITS(1) [],
        /// SGACLK only: divide the PLL output by 2.5 instead of CLKPLLDIV.
        SGACLKDIV_BY_2_5_EN OFFSET(12) NUMBITS(1) [],
    ],
];

pub const PRCM_CLK_MGT_CLKPLLDIV_MASK: u32 = 0x1F;
pub const PRCM_CLK_MGT_CLKPLLSW_MASK: u32 = 0x7 << 5;
pub const PRCM_CLK_MGT_CLKPLLSW_SOC0: u32 = 1 << 5;
pub const PRCM_CLK_MGT_CLKPLLSW_SOC1: u32 = 1 << 6;
pub const PRCM_CLK_MGT_CLKPLLSW_DDR: u32 = 1 << 7;
pub const PRCM_CLK_MGT_CLKEN: u32 = 1 << 8;
pub const PRCM_CLK_MGT_CLK38: u32 = 1 << 9;
pub const PRCM_CLK_MGT_CLK38DIV: u32 = 1 << 11;
pub const PRCM_SGACLK_MGT_SGACLKDIV_BY_2_5_EN: u32 = 1 << 12;

// Clock management register offsets, one per regulated clock line.
pub const PRCM_ACLK_MGT: u32 = 0x004;
pub const PRCM_SGACLK_MGT: u32 = 0x014;
pub const PRCM_UARTCLK_MGT: u32 = 0x018;
pub const PRCM_MSP02CLK_MGT: u32 = 0x01C;
pub const PRCM_I2CCLK_MGT: u32 = 0x020;
pub const PRCM_SDMMCCLK_MGT: u32 = 0x024;
pub const PRCM_SLIMCLK_MGT: u32 = 0x028;
pub const PRCM_PER1CLK_MGT: u32 = 0x02C;
pub const PRCM_PER2CLK_MGT: u32 = 0x030;
pub const PRCM_PER3CLK_MGT: u32 = 0x034;
pub const PRCM_PER5CLK_MGT: u32 = 0x038;
pub const PRCM_PER6CLK_MGT: u32 = 0x03C;
pub const PRCM_PER7CLK_MGT: u32 = 0x040;
pub const PRCM_LCDCLK_MGT: u32 = 0x044;
pub const PRCM_BMLCLK_MGT: u32 = 0x04C;
pub const PRCM_HSITXCLK_MGT: u32 = 0x050;
pub const PRCM_HSIRXCLK_MGT: u32 = 0x054;
pub const PRCM_HDMICLK_MGT: u32 = 0x058;
pub const PRCM_APEATCLK_MGT: u32 = 0x05C;
pub const PRCM_APETRACECLK_MGT: u32 = 0x060;
pub const PRCM_MCDECLK_MGT: u32 = 0x064;
pub const PRCM_IPI2CCLK_MGT: u32 = 0x068;
pub const PRCM_DSIALTCLK_MGT: u32 = 0x06C;
pub const PRCM_DMACLK_MGT: u32 = 0x074;
pub const PRCM_B2R2CLK_MGT: u32 = 0x078;
pub const PRCM_TVCLK_MGT: u32 = 0x07C;
pub const PRCM_UICCCLK_MGT: u32 = 0x27C;
pub const PRCM_SSPCLK_MGT: u32 = 0x280;
pub const PRCM_RNGCLK_MGT: u32 = 0x284;
pub const PRCM_MSP1CLK_MGT: u32 = 0x288;

// Timer clock control.
pub const PRCM_TCR: u32 = 0x1C8;
pub const PRCM_TCR_TENSEL_MASK: u32 = 0xFF;
pub const PRCM_TCR_STOP_TIMERS: u32 = 1 << 16;
pub const PRCM_TCR_DOZE_MODE: u32 = 1 << 17;

// Programmable clock outputs.
pub const PRCM_CLKOCR: u32 = 0x1CC;
pub const PRCM_CLKOCR_CLKODIV0_SHIFT: u32 = 0;
pub const PRCM_CLKOCR_CLKODIV0_MASK: u32 = 0x3F;
pub const PRCM_CLKOCR_CLKOSEL0_SHIFT: u32 = 6;
pub const PRCM_CLKOCR_CLKOSEL0_MASK: u32 = 0x7 << 6;
pub const PRCM_CLKOCR_CLKODIV1_SHIFT: u32 = 16;
pub const PRCM_CLKOCR_CLKODIV1_MASK: u32 = 0x3F << 16;
pub const PRCM_CLKOCR_CLKOSEL1_SHIFT: u32 = 22;
pub const PRCM_CLKOCR_CLKOSEL1_MASK: u32 = 0x7 << 22;
pub const PRCM_CLKOCR_CLK1TYPE: u32 = 1 << 28;

// Interconnect clock-gating bypass (needed while SGA is clocked).
pub const PRCM_CGATING_BYPASS: u32 = 0x134;
pub const PRCM_CGATING_BYPASS_ICN2: u32 = 1 << 6;

// DSI PLL control.
pub const PRCM_PLLDSI_ENABLE: u32 = 0x504;
pub const PRCM_PLLDSI_ENABLE_PRCM_PLLDSI_ENABLE: u32 = 1 << 0;
pub const PRCM_PLLDSI_LOCKP: u32 = 0x508;
pub const PRCM_PLLDSI_LOCKP_PRCM_PLLDSI_LOCKP3: u32 = 1 << 1;
pub const PRCM_PLLDSI_LOCKP_PRCM_PLLDSI_LOCKP10: u32 = 1 << 8;

pub const PRCM_MMIP_LS_CLAMP_SET: u32 = 0x420;
pub const PRCM_MMIP_LS_CLAMP_CLR: u32 = 0x424;
pub const PRCM_MMIP_LS_CLAMP_DSIPLL_CLAMP: u32 = 1 << 11;
pub const PRCM_MMIP_LS_CLAMP_DSIPLL_CLAMPI: u32 = 1 << 22;

pub const PRCM_APE_RESETN_SET: u32 = 0x1E4;
pub const PRCM_APE_RESETN_CLR: u32 = 0x1E8;
pub const PRCM_APE_RESETN_DSIPLL_RESETN: u32 = 1 << 14;

// DSI output clock divider selection.
pub const PRCM_DSI_PLLOUT_SEL: u32 = 0x530;
pub const PRCM_DSI_PLLOUT_SEL_DSI0_PLLOUT_DIVSEL_SHIFT: u32 = 0;
pub const PRCM_DSI_PLLOUT_SEL_DSI0_PLLOUT_DIVSEL_MASK: u32 = 0x7;
pub const PRCM_DSI_PLLOUT_SEL_DSI1_PLLOUT_DIVSEL_SHIFT: u32 = 8;
pub const PRCM_DSI_PLLOUT_SEL_DSI1_PLLOUT_DIVSEL_MASK: u32 = 0x7 << 8;
pub const PRCM_DSI_PLLOUT_SEL_OFF: u32 = 0;
pub const PRCM_DSI_PLLOUT_SEL_PHI: u32 = 1;
pub const PRCM_DSI_PLLOUT_SEL_PHI_2: u32 = 2;
pub const PRCM_DSI_PLLOUT_SEL_PHI_4: u32 = 3;

// DSI escape clock dividers and enables.
pub const PRCM_DSITVCLK_DIV: u32 = 0x52C;
pub const PRCM_DSITVCLK_DIV_DSI0_ESC_CLK_DIV_SHIFT: u32 = 0;
pub const PRCM_DSITVCLK_DIV_DSI0_ESC_CLK_DIV_MASK: u32 = 0xFF;
pub const PRCM_DSITVCLK_DIV_DSI1_ESC_CLK_DIV_SHIFT: u32 = 8;
pub const PRCM_DSITVCLK_DIV_DSI1_ESC_CLK_DIV_MASK: u32 = 0xFF << 8;
pub const PRCM_DSITVCLK_DIV_DSI2_ESC_CLK_DIV_SHIFT: u32 = 16;
pub const PRCM_DSITVCLK_DIV_DSI2_ESC_CLK_DIV_MASK: u32 = 0xFF << 16;
pub const PRCM_DSITVCLK_DIV_DSI0_ESC_CLK_EN: u32 = 1 << 24;
pub const PRCM_DSITVCLK_DIV_DSI1_ESC_CLK_EN: u32 = 1 << 25;
pub const PRCM_DSITVCLK_DIV_DSI2_ESC_CLK_EN: u32 = 1 << 26;

// Modem host-access handshake.
pub const PRCM_HOSTACCESS_REQ: u32 = 0x334;
pub const PRCM_HOSTACCESS_REQ_HOSTACCESS_REQ: u32 = 1 << 0;
pub const PRCM_HOSTACCESS_REQ_WAKE_REQ: u32 = 1 << 16;

// System reset request and last reset event.
pub const PRCM_APE_SOFTRST: u32 = 0x228;
pub const PRCM_RESET_STATUS: u32 = 0x103C;
pub const PRCM_RESET_STATUS_APE_SOFTWARE_RESET: u32 = 1 << 2;

pub const PRCM_A9PL_FORCE_CLKEN: u32 = 0x19C;
pub const PRCM_A9PL_FORCE_CLKEN_PRCM_A9PL_FORCE_CLKEN: u32 = 1 << 0;
pub const PRCM_A9PL_FORCE_CLKEN_PRCM_A9AXI_FORCE_CLKEN: u32 = 1 << 1;

// DDR subsystem minimum-bandwidth request (DDR OPP).
pub const PRCM_DDR_SUBSYS_APE_MINBW: u32 = 0x438;
