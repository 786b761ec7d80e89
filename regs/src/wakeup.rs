/*++

Licensed under the Apache-2.0 license.

File Name:

    wakeup.rs

Abstract:

    Hardware wakeup bit positions in the firmware's event bit field, and
    the two logical index spaces mapped onto them. The logical indices are
    kept contiguous even though the hardware bits are not (and the bits
    have a tendency to move between firmware drops).

--*/

use bitflags::bitflags;

bitflags! {
    /// Hardware wakeup/event bits as laid out by the PRCMU firmware.
    pub struct WakeupBit: u32 {
        const RTC = 1 << 0;
        const RTT0 = 1 << 1;
        const RTT1 = 1 << 2;
        const HSI0 = 1 << 3;
        const HSI1 = 1 << 4;
        const CA_WAKE = 1 << 5;
        const USB = 1 << 6;
        const ABB = 1 << 7;
        const ABB_FIFO = 1 << 8;
        const SYSCLK_OK = 1 << 9;
        const CA_SLEEP = 1 << 10;
        const AC_WAKE_ACK = 1 << 11;
        const SIDE_TONE_OK = 1 << 12;
        const ANC_OK = 1 << 13;
        const SW_ERROR = 1 << 14;
        const AC_SLEEP_ACK = 1 << 15;
        const ARM = 1 << 17;
        const HOTMON_LOW = 1 << 18;
        const HOTMON_HIGH = 1 << 19;
        const MODEM_SW_RESET_REQ = 1 << 20;
        const GPIO0 = 1 << 23;
        const GPIO1 = 1 << 24;
        const GPIO2 = 1 << 25;
        const GPIO3 = 1 << 26;
        const GPIO4 = 1 << 27;
        const GPIO5 = 1 << 28;
        const GPIO6 = 1 << 29;
        const GPIO7 = 1 << 30;
        const GPIO8 = 1 << 31;
    }
}

/// Logical interrupt sources raised toward the host when the matching
/// hardware event bit fires.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(usize)]
pub enum PrcmuIrq {
    Rtc = 0,
    Rtt0,
    Rtt1,
    Hsi0,
    Hsi1,
    CaWake,
    Usb,
    Abb,
    AbbFifo,
    CaSleep,
    Arm,
    HotmonLow,
    HotmonHigh,
    ModemSwResetReq,
    Gpio0,
    Gpio1,
    Gpio2,
    Gpio3,
    Gpio4,
    Gpio5,
    Gpio6,
    Gpio7,
    Gpio8,
}

pub const NUM_PRCMU_IRQS: usize = 23;

/// Logical irq index -> hardware wakeup bit.
pub const PRCMU_IRQ_BIT: [WakeupBit; NUM_PRCMU_IRQS] = [
    WakeupBit::RTC,
    WakeupBit::RTT0,
    WakeupBit::RTT1,
    WakeupBit::HSI0,
    WakeupBit::HSI1,
    WakeupBit::CA_WAKE,
    WakeupBit::USB,
    WakeupBit::ABB,
    WakeupBit::ABB_FIFO,
    WakeupBit::CA_SLEEP,
    WakeupBit::ARM,
    WakeupBit::HOTMON_LOW,
    WakeupBit::HOTMON_HIGH,
    WakeupBit::MODEM_SW_RESET_REQ,
    WakeupBit::GPIO0,
    WakeupBit::GPIO1,
    WakeupBit::GPIO2,
    WakeupBit::GPIO3,
    WakeupBit::GPIO4,
    WakeupBit::GPIO5,
    WakeupBit::GPIO6,
    WakeupBit::GPIO7,
    WakeupBit::GPIO8,
];

impl PrcmuIrq {
    pub const ALL: [PrcmuIrq; NUM_PRCMU_IRQS] = [
        PrcmuIrq::Rtc,
        PrcmuIrq::Rtt0,
        PrcmuIrq::Rtt1,
        PrcmuIrq::Hsi0,
        PrcmuIrq::Hsi1,
        PrcmuIrq::CaWake,
        PrcmuIrq::Usb,
        PrcmuIrq::Abb,
        PrcmuIrq::AbbFifo,
        PrcmuIrq::CaSleep,
        PrcmuIrq::Arm,
        PrcmuIrq::HotmonLow,
        PrcmuIrq::HotmonHigh,
        PrcmuIrq::ModemSwResetReq,
        PrcmuIrq::Gpio0,
        PrcmuIrq::Gpio1,
        PrcmuIrq::Gpio2,
        PrcmuIrq::Gpio3,
        PrcmuIrq::Gpio4,
        PrcmuIrq::Gpio5,
        PrcmuIrq::Gpio6,
        PrcmuIrq::Gpio7,
        PrcmuIrq::Gpio8,
    ];

    pub fn bit(self) -> WakeupBit {
        PRCMU_IRQ_BIT[self as usize]
    }
}

bitflags! {
    /// Publicly exposed wakeup sources, a narrower subset of the full
    /// event space. Bit positions here are the abstract index space; use
    /// [`wakeup_bits`] to translate to hardware bits.
    pub struct PrcmuWakeups: u32 {
        const RTC = 1 << 0;
        const RTT0 = 1 << 1;
        const RTT1 = 1 << 2;
        const HSI0 = 1 << 3;
        const HSI1 = 1 << 4;
        const USB = 1 << 5;
        const ABB = 1 << 6;
        const ABB_FIFO = 1 << 7;
        const ARM = 1 << 8;
    }
}

pub const NUM_PRCMU_WAKEUP_INDICES: usize = 9;

/// Abstract wakeup index -> hardware wakeup bit.
pub const PRCMU_WAKEUP_BIT: [WakeupBit; NUM_PRCMU_WAKEUP_INDICES] = [
    WakeupBit::RTC,
    WakeupBit::RTT0,
    WakeupBit::RTT1,
    WakeupBit::HSI0,
    WakeupBit::HSI1,
    WakeupBit::USB,
    WakeupBit::ABB,
    WakeupBit::ABB_FIFO,
    WakeupBit::ARM,
];

/// Translate a set of abstract wakeup indices to hardware bits.
pub fn wakeup_bits(wakeups: PrcmuWakeups) -> WakeupBit {
    let mut bits = WakeupBit::empty();
    for (i, bit) in PRCMU_WAKEUP_BIT.iter().enumerate() {
        if wakeups.bits() & (1 << i) != 0 {
            bits |= *bit;
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wakeup_translation() {
        assert_eq!(
            wakeup_bits(PrcmuWakeups::RTC | PrcmuWakeups::ARM),
            WakeupBit::RTC | WakeupBit::ARM
        );
        // ARM sits at abstract index 8 but hardware bit 17.
        assert_eq!(wakeup_bits(PrcmuWakeups::ARM).bits(), 1 << 17);
        assert_eq!(wakeup_bits(PrcmuWakeups::empty()), WakeupBit::empty());
    }

    #[test]
    fn test_irq_table_is_contiguous_over_sparse_bits() {
        assert_eq!(PrcmuIrq::CaSleep.bit(), WakeupBit::CA_SLEEP);
        assert_eq!(PrcmuIrq::Gpio8.bit(), WakeupBit::GPIO8);
        for (i, irq) in PrcmuIrq::ALL.iter().enumerate() {
            assert_eq!(*irq as usize, i);
        }
    }
}
