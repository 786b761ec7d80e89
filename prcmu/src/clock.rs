/*++

Licensed under the Apache-2.0 license.

File Name:

    clock.rs

Abstract:

    Clock and PLL rate engine: reading effective rates out of the PRCM
    clock tree, rounding and programming dividers, the PLLDSI frequency
    search, and clock enable/disable requests including the ones that go
    through the mailboxes.

--*/

use std::sync::Mutex;

use log::error;
use tock_registers::LocalRegisterCopy;
use ux500_emu_bus::Mmio;
use ux500_prcmu_regs::{reg, tcdm};

use crate::error::{Error, Result};
use crate::types::ClkoutSource;
use crate::wait::lock;
use crate::{Inner, Prcmu};

/// The 38.4 MHz system clock everything derives from.
pub const ROOT_CLOCK_RATE: u64 = 38_400_000;

pub const NUM_REG_CLOCKS: usize = 29;

/// Clocks the driver can rate-query, rate-set and gate. The first
/// `NUM_REG_CLOCKS` discriminants index the clock-management register
/// table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Clock {
    SgaClk = 0,
    UartClk,
    Msp02Clk,
    Msp1Clk,
    I2cClk,
    SdmmcClk,
    SlimClk,
    Per1Clk,
    Per2Clk,
    Per3Clk,
    Per5Clk,
    Per6Clk,
    Per7Clk,
    LcdClk,
    BmlClk,
    HsitxClk,
    HsirxClk,
    HdmiClk,
    ApeatClk,
    ApetraceClk,
    McdeClk,
    Ipi2cClk,
    DsiAltClk,
    DmaClk,
    B2r2Clk,
    TvClk,
    SspClk,
    RngClk,
    UiccClk,
    TimClk,
    SysClk,
    PllSoc0,
    PllSoc1,
    PllDdr,
    PllDsi,
    Dsi0Clk,
    Dsi1Clk,
    Dsi0EscClk,
    Dsi1EscClk,
    Dsi2EscClk,
}

impl Clock {
    fn reg_index(self) -> Option<usize> {
        let i = self as usize;
        if i < NUM_REG_CLOCKS {
            Some(i)
        } else {
            None
        }
    }
}

/// Which PLL output branch feeds a clock, deciding the fixed /2 stages.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Branch {
    Raw,
    Fix,
    Div,
}

struct ClkMgt {
    offset: u32,
    branch: Branch,
    clk38div: bool,
}

const fn clk_mgt(offset: u32, branch: Branch, clk38div: bool) -> ClkMgt {
    ClkMgt {
        offset,
        branch,
        clk38div,
    }
}

/// Indexed by the `Clock` discriminant.
static CLK_MGT: [ClkMgt; NUM_REG_CLOCKS] = [
    clk_mgt(reg::PRCM_SGACLK_MGT, Branch::Div, false),
    clk_mgt(reg::PRCM_UARTCLK_MGT, Branch::Fix, true),
    clk_mgt(reg::PRCM_MSP02CLK_MGT, Branch::Fix, true),
    clk_mgt(reg::PRCM_MSP1CLK_MGT, Branch::Fix, true),
    clk_mgt(reg::PRCM_I2CCLK_MGT, Branch::Fix, true),
    clk_mgt(reg::PRCM_SDMMCCLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_SLIMCLK_MGT, Branch::Fix, true),
    clk_mgt(reg::PRCM_PER1CLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_PER2CLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_PER3CLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_PER5CLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_PER6CLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_PER7CLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_LCDCLK_MGT, Branch::Fix, true),
    clk_mgt(reg::PRCM_BMLCLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_HSITXCLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_HSIRXCLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_HDMICLK_MGT, Branch::Fix, false),
    clk_mgt(reg::PRCM_APEATCLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_APETRACECLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_MCDECLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_IPI2CCLK_MGT, Branch::Fix, true),
    clk_mgt(reg::PRCM_DSIALTCLK_MGT, Branch::Fix, false),
    clk_mgt(reg::PRCM_DMACLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_B2R2CLK_MGT, Branch::Div, true),
    clk_mgt(reg::PRCM_TVCLK_MGT, Branch::Fix, false),
    clk_mgt(reg::PRCM_SSPCLK_MGT, Branch::Fix, true),
    clk_mgt(reg::PRCM_RNGCLK_MGT, Branch::Fix, true),
    clk_mgt(reg::PRCM_UICCCLK_MGT, Branch::Fix, false),
];

/// DSI output clock divider-select fields: (mask, shift).
const DSICLK: [(u32, u32); 2] = [
    (
        reg::PRCM_DSI_PLLOUT_SEL_DSI0_PLLOUT_DIVSEL_MASK,
        reg::PRCM_DSI_PLLOUT_SEL_DSI0_PLLOUT_DIVSEL_SHIFT,
    ),
    (
        reg::PRCM_DSI_PLLOUT_SEL_DSI1_PLLOUT_DIVSEL_MASK,
        reg::PRCM_DSI_PLLOUT_SEL_DSI1_PLLOUT_DIVSEL_SHIFT,
    ),
];

/// DSI escape clock fields: (enable bit, divider mask, divider shift).
const DSIESCCLK: [(u32, u32, u32); 3] = [
    (
        reg::PRCM_DSITVCLK_DIV_DSI0_ESC_CLK_EN,
        reg::PRCM_DSITVCLK_DIV_DSI0_ESC_CLK_DIV_MASK,
        reg::PRCM_DSITVCLK_DIV_DSI0_ESC_CLK_DIV_SHIFT,
    ),
    (
        reg::PRCM_DSITVCLK_DIV_DSI1_ESC_CLK_EN,
        reg::PRCM_DSITVCLK_DIV_DSI1_ESC_CLK_DIV_MASK,
        reg::PRCM_DSITVCLK_DIV_DSI1_ESC_CLK_DIV_SHIFT,
    ),
    (
        reg::PRCM_DSITVCLK_DIV_DSI2_ESC_CLK_EN,
        reg::PRCM_DSITVCLK_DIV_DSI2_ESC_CLK_DIV_MASK,
        reg::PRCM_DSITVCLK_DIV_DSI2_ESC_CLK_DIV_SHIFT,
    ),
];

pub(crate) struct ClkMgtState {
    /// PLL selector bits remembered across a clock being gated, restored
    /// when the clock is re-enabled.
    pub pllsw: [u32; NUM_REG_CLOCKS],
}

pub(crate) struct DsiState {
    /// Remembered divider selector per DSI output clock, reapplied on
    /// enable and on rate changes.
    pub divsel: [u32; 2],
}

/// Clock-engine state guarded separately from the mailbox channels.
pub(crate) struct ClockState {
    pub clk_mgt: Mutex<ClkMgtState>,
    pub dsi: Mutex<DsiState>,
    /// Outstanding configuration requests per programmable clock output.
    pub clkout: Mutex<[u32; 2]>,
}

impl ClockState {
    pub fn new() -> Self {
        Self {
            clk_mgt: Mutex::new(ClkMgtState {
                pllsw: [0; NUM_REG_CLOCKS],
            }),
            dsi: Mutex::new(DsiState {
                divsel: [reg::PRCM_DSI_PLLOUT_SEL_PHI; 2],
            }),
            clkout: Mutex::new([0; 2]),
        }
    }
}

const MIN_PLL_VCO_RATE: u64 = 600_000_000;
const MAX_PLL_VCO_RATE: u64 = 1_680_640_000;

/// Smallest divider whose output does not exceed `rate`.
fn clock_divider(src_rate: u64, rate: u64) -> u32 {
    if rate == 0 {
        return u32::MAX;
    }
    let mut div = src_rate / rate;
    if div == 0 {
        return 1;
    }
    if rate < src_rate / div {
        div += 1;
    }
    div as u32
}

/// PLLDSI frequency search over the (R, D) space with N fixed to 1. For a
/// given output divider R, the multiplier D is bracketed by the VCO's
/// operating window; the first rate above the target is kept only when
/// nothing under it fits, otherwise the closest rate below wins.
fn plldsi_search(src_rate: u64, rate: u64) -> Option<(u64, u32)> {
    // An unprogrammed HDMICLK source reads back as rate 0.
    if src_rate == 0 {
        return None;
    }
    let mut best: Option<(u64, u32)> = None;
    let mut rem = rate;

    for r in (1..=7u64).rev() {
        if rem == 0 {
            break;
        }
        let mut d = r * rate / src_rate;
        d = d.clamp(6, 255);
        let vco_num = d * src_rate;
        if 2 * vco_num < r * MIN_PLL_VCO_RATE || r * MAX_PLL_VCO_RATE < 2 * vco_num {
            continue;
        }
        let hwrate = vco_num / r;
        let pll_freq = (d as u32) | ((r as u32) << 16);
        if rate < hwrate {
            if best.is_none() {
                best = Some((hwrate, pll_freq));
            }
            break;
        }
        if rate - hwrate < rem {
            rem = rate - hwrate;
            best = Some((hwrate, pll_freq));
        }
    }
    best
}

impl<M: Mmio> Inner<M> {
    /// Take the hardware semaphore serializing clock-management register
    /// writes against the firmware.
    fn claim_sem(&self) -> Result<()> {
        let mut spins = 0;
        while self.io.reg_read(reg::PRCM_SEM) & reg::PRCM_SEM_PRCM_SEM != 0 {
            if spins >= self.wait.max_spins() {
                return Err(self.desync(0xFF, "clock management semaphore"));
            }
            spins += 1;
            self.wait.relax();
        }
        Ok(())
    }

    fn release_sem(&self) {
        self.io.reg_write(reg::PRCM_SEM, 0);
    }

    fn pll_rate(&self, reg_offset: u32, src_rate: u64, branch: Branch) -> u64 {
        let v = LocalRegisterCopy::<u32, reg::PllFreq::Register>::new(self.io.reg_read(reg_offset));

        let rate = src_rate * u64::from(v.read(reg::PllFreq::D));
        let mut div = 1u64;

        let n = u64::from(v.read(reg::PllFreq::N));
        if n > 1 {
            div *= n;
        }
        let r = u64::from(v.read(reg::PllFreq::R));
        if r > 1 {
            div *= r;
        }
        if v.is_set(reg::PllFreq::SELDIV2) {
            div *= 2;
        }
        if branch == Branch::Fix
            || (branch == Branch::Div
                && v.is_set(reg::PllFreq::DIV2EN)
                && (reg_offset == reg::PRCM_PLLSOC0_FREQ || reg_offset == reg::PRCM_PLLDDR_FREQ))
        {
            div *= 2;
        }
        rate / div
    }

    fn reg_clock_rate(&self, clock: Clock, idx: usize) -> u64 {
        let mgt = &CLK_MGT[idx];
        let mut val = self.io.reg_read(mgt.offset);

        if val & reg::PRCM_CLK_MGT_CLK38 != 0 {
            if mgt.clk38div && val & reg::PRCM_CLK_MGT_CLK38DIV != 0 {
                return ROOT_CLOCK_RATE / 2;
            }
            return ROOT_CLOCK_RATE;
        }

        val |= lock(&self.clk.clk_mgt).pllsw[idx];

        let rate = match val & reg::PRCM_CLK_MGT_CLKPLLSW_MASK {
            reg::PRCM_CLK_MGT_CLKPLLSW_SOC0 => {
                self.pll_rate(reg::PRCM_PLLSOC0_FREQ, ROOT_CLOCK_RATE, mgt.branch)
            }
            reg::PRCM_CLK_MGT_CLKPLLSW_SOC1 => {
                self.pll_rate(reg::PRCM_PLLSOC1_FREQ, ROOT_CLOCK_RATE, mgt.branch)
            }
            reg::PRCM_CLK_MGT_CLKPLLSW_DDR => {
                self.pll_rate(reg::PRCM_PLLDDR_FREQ, ROOT_CLOCK_RATE, mgt.branch)
            }
            _ => return 0,
        };

        if clock == Clock::SgaClk && val & reg::PRCM_SGACLK_MGT_SGACLKDIV_BY_2_5_EN != 0 {
            return rate * 10 / 25;
        }
        let div = u64::from(val & reg::PRCM_CLK_MGT_CLKPLLDIV_MASK);
        if div != 0 {
            rate / div
        } else {
            0
        }
    }

    fn dsiclk_rate(&self, n: usize) -> u64 {
        let (mask, shift) = DSICLK[n];
        let mut divsel = (self.io.reg_read(reg::PRCM_DSI_PLLOUT_SEL) & mask) >> shift;

        if divsel == reg::PRCM_DSI_PLLOUT_SEL_OFF {
            divsel = lock(&self.clk.dsi).divsel[n];
        }

        let div = match divsel {
            reg::PRCM_DSI_PLLOUT_SEL_PHI => 1,
            reg::PRCM_DSI_PLLOUT_SEL_PHI_2 => 2,
            reg::PRCM_DSI_PLLOUT_SEL_PHI_4 => 4,
            _ => return 0,
        };
        self.pll_rate(
            reg::PRCM_PLLDSI_FREQ,
            self.clock_rate(Clock::HdmiClk),
            Branch::Raw,
        ) / div
    }

    fn dsiescclk_rate(&self, n: usize) -> u64 {
        let (_, mask, shift) = DSIESCCLK[n];
        let div = u64::from((self.io.reg_read(reg::PRCM_DSITVCLK_DIV) & mask) >> shift);
        self.clock_rate(Clock::TvClk) / div.max(1)
    }

    pub(crate) fn clock_rate(&self, clock: Clock) -> u64 {
        if let Some(idx) = clock.reg_index() {
            return self.reg_clock_rate(clock, idx);
        }
        match clock {
            Clock::TimClk => ROOT_CLOCK_RATE / 16,
            Clock::SysClk => ROOT_CLOCK_RATE,
            Clock::PllSoc0 => self.pll_rate(reg::PRCM_PLLSOC0_FREQ, ROOT_CLOCK_RATE, Branch::Raw),
            Clock::PllSoc1 => self.pll_rate(reg::PRCM_PLLSOC1_FREQ, ROOT_CLOCK_RATE, Branch::Raw),
            Clock::PllDdr => self.pll_rate(reg::PRCM_PLLDDR_FREQ, ROOT_CLOCK_RATE, Branch::Raw),
            Clock::PllDsi => self.pll_rate(
                reg::PRCM_PLLDSI_FREQ,
                self.clock_rate(Clock::HdmiClk),
                Branch::Raw,
            ),
            Clock::Dsi0Clk => self.dsiclk_rate(0),
            Clock::Dsi1Clk => self.dsiclk_rate(1),
            Clock::Dsi0EscClk => self.dsiescclk_rate(0),
            Clock::Dsi1EscClk => self.dsiescclk_rate(1),
            Clock::Dsi2EscClk => self.dsiescclk_rate(2),
            _ => 0,
        }
    }

    /// The rate of a clock's selected source, with the remembered PLL
    /// selector folded into the register value.
    fn clock_source_rate(&self, clk_mgt_val: u32, branch: Branch) -> u64 {
        if clk_mgt_val & reg::PRCM_CLK_MGT_CLK38 != 0 {
            return ROOT_CLOCK_RATE;
        }
        match clk_mgt_val & reg::PRCM_CLK_MGT_CLKPLLSW_MASK {
            reg::PRCM_CLK_MGT_CLKPLLSW_SOC0 => {
                self.pll_rate(reg::PRCM_PLLSOC0_FREQ, ROOT_CLOCK_RATE, branch)
            }
            reg::PRCM_CLK_MGT_CLKPLLSW_SOC1 => {
                self.pll_rate(reg::PRCM_PLLSOC1_FREQ, ROOT_CLOCK_RATE, branch)
            }
            reg::PRCM_CLK_MGT_CLKPLLSW_DDR => {
                self.pll_rate(reg::PRCM_PLLDDR_FREQ, ROOT_CLOCK_RATE, branch)
            }
            _ => 0,
        }
    }

    fn round_reg_clock_rate(&self, clock: Clock, idx: usize, rate: u64) -> u64 {
        let mgt = &CLK_MGT[idx];
        let val = self.io.reg_read(mgt.offset);
        let src_rate =
            self.clock_source_rate(val | lock(&self.clk.clk_mgt).pllsw[idx], mgt.branch);
        let mut div = clock_divider(src_rate, rate);

        if val & reg::PRCM_CLK_MGT_CLK38 != 0 {
            if mgt.clk38div {
                div = div.min(2);
            } else {
                div = 1;
            }
        } else if clock == Clock::SgaClk && div == 3 {
            let r = src_rate * 10 / 25;
            if r <= rate {
                return r;
            }
        }
        src_rate / u64::from(div.min(31))
    }

    fn round_dsiclk_rate(&self, rate: u64) -> u64 {
        let src_rate = self.pll_rate(
            reg::PRCM_PLLDSI_FREQ,
            self.clock_rate(Clock::HdmiClk),
            Branch::Raw,
        );
        let div = clock_divider(src_rate, rate);
        src_rate / u64::from(if div > 2 { 4 } else { div })
    }

    fn round_dsiescclk_rate(&self, rate: u64) -> u64 {
        let src_rate = self.clock_rate(Clock::TvClk);
        let div = clock_divider(src_rate, rate);
        src_rate / u64::from(div.min(255))
    }

    pub(crate) fn round_clock_rate(&self, clock: Clock, rate: u64) -> u64 {
        if let Some(idx) = clock.reg_index() {
            return self.round_reg_clock_rate(clock, idx, rate);
        }
        match clock {
            Clock::PllDsi => plldsi_search(self.clock_rate(Clock::HdmiClk), rate)
                .map(|(hwrate, _)| hwrate)
                .unwrap_or(0),
            Clock::Dsi0Clk | Clock::Dsi1Clk => self.round_dsiclk_rate(rate),
            Clock::Dsi0EscClk | Clock::Dsi1EscClk | Clock::Dsi2EscClk => {
                self.round_dsiescclk_rate(rate)
            }
            _ => self.clock_rate(clock),
        }
    }

    fn set_reg_clock_rate(&self, clock: Clock, idx: usize, rate: u64) -> Result<()> {
        let mgt = &CLK_MGT[idx];
        let state = lock(&self.clk.clk_mgt);

        self.claim_sem()?;

        let mut val = self.io.reg_read(mgt.offset);
        let src_rate = self.clock_source_rate(val | state.pllsw[idx], mgt.branch);
        let mut div = clock_divider(src_rate, rate);

        if val & reg::PRCM_CLK_MGT_CLK38 != 0 {
            if mgt.clk38div {
                if div > 1 {
                    val |= reg::PRCM_CLK_MGT_CLK38DIV;
                } else {
                    val &= !reg::PRCM_CLK_MGT_CLK38DIV;
                }
            }
        } else if clock == Clock::SgaClk {
            val &= !(reg::PRCM_CLK_MGT_CLKPLLDIV_MASK
                | reg::PRCM_SGACLK_MGT_SGACLKDIV_BY_2_5_EN);
            if div == 3 && src_rate * 10 / 25 <= rate {
                val |= reg::PRCM_SGACLK_MGT_SGACLKDIV_BY_2_5_EN;
                div = 0;
            }
            val |= div.min(31);
        } else {
            val &= !reg::PRCM_CLK_MGT_CLKPLLDIV_MASK;
            val |= div.min(31);
        }
        self.io.reg_write(mgt.offset, val);

        self.release_sem();
        Ok(())
    }

    fn set_plldsi_rate(&self, rate: u64) -> Result<()> {
        let src_rate = self.clock_rate(Clock::HdmiClk);
        let (_, pll_freq) = plldsi_search(src_rate, rate).ok_or(Error::InvalidArgument)?;
        // N is always 1 on this PLL.
        self.io
            .reg_write(reg::PRCM_PLLDSI_FREQ, pll_freq | (1 << 8));
        Ok(())
    }

    fn set_dsiclk_rate(&self, n: usize, rate: u64) {
        let src_rate = self.pll_rate(
            reg::PRCM_PLLDSI_FREQ,
            self.clock_rate(Clock::HdmiClk),
            Branch::Raw,
        );
        let div = clock_divider(src_rate, rate);
        let divsel = match div {
            1 => reg::PRCM_DSI_PLLOUT_SEL_PHI,
            2 => reg::PRCM_DSI_PLLOUT_SEL_PHI_2,
            _ => reg::PRCM_DSI_PLLOUT_SEL_PHI_4,
        };

        let mut state = lock(&self.clk.dsi);
        state.divsel[n] = divsel;

        let (mask, shift) = DSICLK[n];
        let mut val = self.io.reg_read(reg::PRCM_DSI_PLLOUT_SEL);
        val &= !mask;
        val |= divsel << shift;
        self.io.reg_write(reg::PRCM_DSI_PLLOUT_SEL, val);
    }

    fn set_dsiescclk_rate(&self, n: usize, rate: u64) {
        let src_rate = self.clock_rate(Clock::TvClk);
        let div = clock_divider(src_rate, rate);
        let (_, mask, shift) = DSIESCCLK[n];
        let mut val = self.io.reg_read(reg::PRCM_DSITVCLK_DIV);
        val &= !mask;
        val |= div.min(255) << shift;
        self.io.reg_write(reg::PRCM_DSITVCLK_DIV, val);
    }

    pub(crate) fn set_clock_rate(&self, clock: Clock, rate: u64) -> Result<()> {
        if let Some(idx) = clock.reg_index() {
            return self.set_reg_clock_rate(clock, idx, rate);
        }
        match clock {
            Clock::PllDsi => self.set_plldsi_rate(rate),
            Clock::Dsi0Clk => {
                self.set_dsiclk_rate(0, rate);
                Ok(())
            }
            Clock::Dsi1Clk => {
                self.set_dsiclk_rate(1, rate);
                Ok(())
            }
            Clock::Dsi0EscClk => {
                self.set_dsiescclk_rate(0, rate);
                Ok(())
            }
            Clock::Dsi1EscClk => {
                self.set_dsiescclk_rate(1, rate);
                Ok(())
            }
            Clock::Dsi2EscClk => {
                self.set_dsiescclk_rate(2, rate);
                Ok(())
            }
            _ => Err(Error::InvalidArgument),
        }
    }

    fn request_reg_clock(&self, idx: usize, enable: bool) -> Result<()> {
        let mut state = lock(&self.clk.clk_mgt);

        self.claim_sem()?;

        let mut val = self.io.reg_read(CLK_MGT[idx].offset);
        if enable {
            val |= reg::PRCM_CLK_MGT_CLKEN | state.pllsw[idx];
        } else {
            state.pllsw[idx] = val & reg::PRCM_CLK_MGT_CLKPLLSW_MASK;
            val &= !(reg::PRCM_CLK_MGT_CLKEN | reg::PRCM_CLK_MGT_CLKPLLSW_MASK);
        }
        self.io.reg_write(CLK_MGT[idx].offset, val);

        self.release_sem();
        Ok(())
    }

    /// SGACLK needs the interconnect clock-gating bypass held while it is
    /// running.
    fn request_sga_clock(&self, idx: usize, enable: bool) -> Result<()> {
        if enable {
            self.io.reg_write_masked(
                reg::PRCM_CGATING_BYPASS,
                reg::PRCM_CGATING_BYPASS_ICN2,
                reg::PRCM_CGATING_BYPASS_ICN2,
            );
        }

        self.request_reg_clock(idx, enable)?;

        if !enable {
            self.io
                .reg_write_masked(reg::PRCM_CGATING_BYPASS, reg::PRCM_CGATING_BYPASS_ICN2, 0);
        }
        Ok(())
    }

    fn request_timclk(&self, enable: bool) {
        let mut val = reg::PRCM_TCR_DOZE_MODE | reg::PRCM_TCR_TENSEL_MASK;
        if !enable {
            val |= reg::PRCM_TCR_STOP_TIMERS;
        }
        self.io.reg_write(reg::PRCM_TCR, val);
    }

    fn plldsi_locked(&self) -> bool {
        const LOCKED: u32 = reg::PRCM_PLLDSI_LOCKP_PRCM_PLLDSI_LOCKP10
            | reg::PRCM_PLLDSI_LOCKP_PRCM_PLLDSI_LOCKP3;
        self.io.reg_read(reg::PRCM_PLLDSI_LOCKP) & LOCKED == LOCKED
    }

    fn request_plldsi(&self, enable: bool) -> Result<()> {
        const CLAMPS: u32 =
            reg::PRCM_MMIP_LS_CLAMP_DSIPLL_CLAMP | reg::PRCM_MMIP_LS_CLAMP_DSIPLL_CLAMPI;

        self.io.reg_write(
            if enable {
                reg::PRCM_MMIP_LS_CLAMP_CLR
            } else {
                reg::PRCM_MMIP_LS_CLAMP_SET
            },
            CLAMPS,
        );

        let mut val = self.io.reg_read(reg::PRCM_PLLDSI_ENABLE);
        if enable {
            val |= reg::PRCM_PLLDSI_ENABLE_PRCM_PLLDSI_ENABLE;
        } else {
            val &= !reg::PRCM_PLLDSI_ENABLE_PRCM_PLLDSI_ENABLE;
        }
        self.io.reg_write(reg::PRCM_PLLDSI_ENABLE, val);

        if enable {
            let mut locked = self.plldsi_locked();
            for _ in 0..10 {
                if locked {
                    break;
                }
                self.wait.pause(100);
                locked = self.plldsi_locked();
            }
            if !locked {
                // Roll back to the clamped, disabled state.
                self.io.reg_write(reg::PRCM_MMIP_LS_CLAMP_SET, CLAMPS);
                val &= !reg::PRCM_PLLDSI_ENABLE_PRCM_PLLDSI_ENABLE;
                self.io.reg_write(reg::PRCM_PLLDSI_ENABLE, val);
                return Err(Error::PllNotLocked);
            }
            self.io
                .reg_write(reg::PRCM_APE_RESETN_SET, reg::PRCM_APE_RESETN_DSIPLL_RESETN);
        } else {
            self.io
                .reg_write(reg::PRCM_APE_RESETN_CLR, reg::PRCM_APE_RESETN_DSIPLL_RESETN);
        }
        Ok(())
    }

    fn request_dsiclk(&self, n: usize, enable: bool) {
        let state = lock(&self.clk.dsi);
        let (mask, shift) = DSICLK[n];
        let mut val = self.io.reg_read(reg::PRCM_DSI_PLLOUT_SEL);
        val &= !mask;
        val |= (if enable {
            state.divsel[n]
        } else {
            reg::PRCM_DSI_PLLOUT_SEL_OFF
        }) << shift;
        self.io.reg_write(reg::PRCM_DSI_PLLOUT_SEL, val);
    }

    fn request_dsiescclk(&self, n: usize, enable: bool) {
        let (en, _, _) = DSIESCCLK[n];
        let mut val = self.io.reg_read(reg::PRCM_DSITVCLK_DIV);
        if enable {
            val |= en;
        } else {
            val &= !en;
        }
        self.io.reg_write(reg::PRCM_DSITVCLK_DIV, val);
    }

    fn request_sysclk(&self, enable: bool) -> Result<()> {
        let _guard = lock(&self.mb3.sysclk_lock);

        {
            let _req = lock(&self.mb3.lock);

            self.claim(3, "sysclk request")?;

            self.io
                .tcdm_write8(tcdm::PRCM_REQ_MB3_SYSCLK_MGT, enable as u8);
            self.io
                .tcdm_write8(tcdm::PRCM_MBOX_HEADER_REQ_MB3, tcdm::MB3H_SYSCLK);
            self.fire(3);
        }

        // The firmware only acknowledges a successful enable; the ack
        // arrives as the SYSCLK_OK event on mailbox 0.
        if enable && !self.mb3.sysclk_work.wait_timeout(self.comm.current()) {
            error!("prcmu: mailbox 3 timed out waiting for a reply (sysclk request)");
            return Err(self.desync(3, "sysclk request"));
        }
        Ok(())
    }

    pub(crate) fn request_clock(&self, clock: Clock, enable: bool) -> Result<()> {
        if clock == Clock::SgaClk {
            return self.request_sga_clock(0, enable);
        }
        if let Some(idx) = clock.reg_index() {
            return self.request_reg_clock(idx, enable);
        }
        match clock {
            Clock::TimClk => {
                self.request_timclk(enable);
                Ok(())
            }
            Clock::Dsi0Clk => {
                self.request_dsiclk(0, enable);
                Ok(())
            }
            Clock::Dsi1Clk => {
                self.request_dsiclk(1, enable);
                Ok(())
            }
            Clock::Dsi0EscClk => {
                self.request_dsiescclk(0, enable);
                Ok(())
            }
            Clock::Dsi1EscClk => {
                self.request_dsiescclk(1, enable);
                Ok(())
            }
            Clock::Dsi2EscClk => {
                self.request_dsiescclk(2, enable);
                Ok(())
            }
            Clock::PllDsi => self.request_plldsi(enable),
            Clock::SysClk => self.request_sysclk(enable),
            Clock::PllSoc1 => self.request_pll_soc1(enable),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Halve (or restore) the ACLK and DMACLK dividers for the
    /// partly-25% APE operating point. Runs under the clock lock and the
    /// hardware semaphore; divider values outside the reversible range
    /// stop the sweep.
    pub(crate) fn request_even_slower_clocks(&self, enable: bool) -> Result<()> {
        let _state = lock(&self.clk.clk_mgt);

        self.claim_sem()?;

        for offset in [reg::PRCM_ACLK_MGT, reg::PRCM_DMACLK_MGT] {
            let val = self.io.reg_read(offset);
            let mut div = val & reg::PRCM_CLK_MGT_CLKPLLDIV_MASK;
            if enable {
                if !(2..=15).contains(&div) {
                    error!("prcmu: bad clock divider {div} in slow-clock request");
                    break;
                }
                div <<= 1;
            } else {
                if div <= 2 {
                    break;
                }
                div >>= 1;
            }
            self.io.reg_write(
                offset,
                (val & !reg::PRCM_CLK_MGT_CLKPLLDIV_MASK)
                    | (div & reg::PRCM_CLK_MGT_CLKPLLDIV_MASK),
            );
        }

        self.release_sem();
        Ok(())
    }
}

impl<M: Mmio + 'static> Prcmu<M> {
    /// The effective rate of a clock, in Hz.
    pub fn clock_rate(&self, clock: Clock) -> u64 {
        self.inner.clock_rate(clock)
    }

    /// The rate that would actually be achieved for a requested rate.
    pub fn round_clock_rate(&self, clock: Clock, rate: u64) -> u64 {
        self.inner.round_clock_rate(clock, rate)
    }

    /// Program a clock's dividers for the requested rate.
    pub fn set_clock_rate(&self, clock: Clock, rate: u64) -> Result<()> {
        self.inner.set_clock_rate(clock, rate)
    }

    /// Enable or disable a clock.
    pub fn request_clock(&self, clock: Clock, enable: bool) -> Result<()> {
        self.inner.request_clock(clock, enable)
    }

    /// Configure one of the two programmable clock outputs. `div` in
    /// [1, 63] requests a configuration; 0 drops an earlier request.
    /// Conflicting concurrent configurations are refused.
    pub fn config_clkout(&self, clkout: u8, source: ClkoutSource, div: u8) -> Result<()> {
        if clkout > 1 || div > 63 {
            return Err(Error::InvalidArgument);
        }

        let (div_mask, mask, bits) = match clkout {
            0 => (
                reg::PRCM_CLKOCR_CLKODIV0_MASK,
                reg::PRCM_CLKOCR_CLKODIV0_MASK | reg::PRCM_CLKOCR_CLKOSEL0_MASK,
                (u32::from(source as u8) << reg::PRCM_CLKOCR_CLKOSEL0_SHIFT)
                    | (u32::from(div) << reg::PRCM_CLKOCR_CLKODIV0_SHIFT),
            ),
            _ => (
                reg::PRCM_CLKOCR_CLKODIV1_MASK,
                reg::PRCM_CLKOCR_CLKODIV1_MASK
                    | reg::PRCM_CLKOCR_CLKOSEL1_MASK
                    | reg::PRCM_CLKOCR_CLK1TYPE,
                (u32::from(source as u8) << reg::PRCM_CLKOCR_CLKOSEL1_SHIFT)
                    | (u32::from(div) << reg::PRCM_CLKOCR_CLKODIV1_SHIFT),
            ),
        };
        let bits = bits & mask;

        let inner = &self.inner;
        let mut requests = lock(&inner.clk.clkout);

        if div == 0 && requests[clkout as usize] == 0 {
            return Err(Error::InvalidArgument);
        }

        let val = inner.io.reg_read(reg::PRCM_CLKOCR);
        if val & div_mask != 0 {
            if div != 0 {
                if val & mask != bits {
                    return Err(Error::Busy);
                }
            } else if val & mask & !div_mask != bits {
                return Err(Error::InvalidArgument);
            }
        }
        inner.io.reg_write(reg::PRCM_CLKOCR, bits | (val & !mask));
        if div != 0 {
            requests[clkout as usize] += 1;
        } else {
            requests[clkout as usize] -= 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_divider_rounds_up() {
        // Exact divisions come back unchanged.
        for div in 1..=31u64 {
            assert_eq!(clock_divider(ROOT_CLOCK_RATE, ROOT_CLOCK_RATE / div), div as u32);
        }
        // A rate just below an exact division needs the next divider.
        assert_eq!(clock_divider(38_400_000, 19_200_001), 2);
        assert_eq!(clock_divider(38_400_000, 19_199_999), 3);
        // Requests above the source rate use the pass-through divider.
        assert_eq!(clock_divider(38_400_000, 50_000_000), 1);
    }

    #[test]
    fn test_plldsi_search_420mhz() {
        // 420 MHz from the 38.4 MHz reference: D=76, R=7 is the closest
        // reachable point below the target.
        let (hwrate, pll_freq) = plldsi_search(38_400_000, 420_000_000).unwrap();
        assert_eq!(hwrate, 416_914_285);
        assert_eq!(pll_freq & 0xFF, 76);
        assert_eq!((pll_freq >> 16) & 0x7, 7);
    }

    #[test]
    fn test_plldsi_search_respects_vco_window() {
        // 10 MHz cannot be produced: every candidate falls below the
        // minimum VCO rate.
        assert!(plldsi_search(38_400_000, 10_000_000).is_none());
    }

    #[test]
    fn test_plldsi_search_rejects_unknown_source() {
        // Before HDMICLK is sourced its rate reads as 0; the search must
        // report no candidate instead of dividing by it.
        assert!(plldsi_search(0, 420_000_000).is_none());
    }

    #[test]
    fn test_plldsi_first_over_target_accepted_when_nothing_below() {
        // The multiplier clamps at its minimum, so every reachable output
        // overshoots; the first one in the VCO window is kept.
        let (hwrate, pll_freq) = plldsi_search(600_000_000, 100_000_000).unwrap();
        assert_eq!(hwrate, 514_285_714);
        assert_eq!(pll_freq & 0xFF, 6);
        assert_eq!((pll_freq >> 16) & 0x7, 7);
    }
}
