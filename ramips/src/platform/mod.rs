//! Supported SoCs and the uart register table.
//!
//! The SoC is fixed at build time by cargo feature; see `SOC`.

use core::fmt;
use core::str::FromStr;

use static_assertions::const_assert;

use crate::uart::LineStatus;

/// Where a SoC's uart lives and how to tell it can take another byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UartLayout {
    /// Physical base address.
    pub base: usize,
    /// Transmit holding register, from base.
    pub thr: usize,
    /// Line status register, from base.
    pub lsr: usize,
    /// Line status bit that means ready.
    pub ready: LineStatus,
}

pub const FAMILY_A: UartLayout =
    UartLayout { base: 0x1000_0c00, thr: 0x04, lsr: 0x1c, ready: LineStatus::TEMT };
pub const FAMILY_B: UartLayout =
    UartLayout { base: 0x1e00_0c00, thr: 0x00, lsr: 0x14, ready: LineStatus::THRE };
pub const FAMILY_C: UartLayout =
    UartLayout { base: 0x1000_0c00, thr: 0x04, lsr: 0x1c, ready: LineStatus::THRE };
pub const FAMILY_D: UartLayout =
    UartLayout { base: 0x1fbf_0000, thr: 0x03, lsr: 0x17, ready: LineStatus::THRE };

// A poll must wait on exactly one condition.
const_assert!(FAMILY_A.ready.bits().count_ones() == 1);
const_assert!(FAMILY_B.ready.bits().count_ones() == 1);
const_assert!(FAMILY_C.ready.bits().count_ones() == 1);
const_assert!(FAMILY_D.ready.bits().count_ones() == 1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Soc {
    Mt7620,
    Rt3883,
    Mt7621,
    Rt305x,
    Rt63365e,
}

impl Soc {
    pub const ALL: [Soc; 5] = [Soc::Mt7620, Soc::Rt3883, Soc::Mt7621, Soc::Rt305x, Soc::Rt63365e];

    pub const fn layout(self) -> UartLayout {
        match self {
            Soc::Mt7620 | Soc::Rt3883 => FAMILY_A,
            Soc::Mt7621 => FAMILY_B,
            Soc::Rt305x => FAMILY_C,
            Soc::Rt63365e => FAMILY_D,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Soc::Mt7620 => "mt7620",
            Soc::Rt3883 => "rt3883",
            Soc::Mt7621 => "mt7621",
            Soc::Rt305x => "rt305x",
            Soc::Rt63365e => "rt63365e",
        }
    }

    pub fn from_name(name: &str) -> port::Result<Soc> {
        Soc::ALL
            .into_iter()
            .find(|soc| soc.name().eq_ignore_ascii_case(name))
            .ok_or("unsupported SoC")
    }
}

impl fmt::Display for Soc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Soc {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Soc::from_name(s)
    }
}

const SELECTED: usize = cfg!(feature = "mt7620") as usize
    + cfg!(feature = "rt3883") as usize
    + cfg!(feature = "mt7621") as usize
    + cfg!(feature = "rt305x") as usize
    + cfg!(feature = "rt63365e") as usize;

const _: () = assert!(
    SELECTED == 1,
    "Unsupported SOC: enable exactly one of the mt7620, rt3883, mt7621, rt305x, rt63365e features"
);

/// The SoC this build targets.
pub const SOC: Soc = if cfg!(feature = "mt7620") {
    Soc::Mt7620
} else if cfg!(feature = "rt3883") {
    Soc::Rt3883
} else if cfg!(feature = "mt7621") {
    Soc::Mt7621
} else if cfg!(feature = "rt305x") {
    Soc::Rt305x
} else {
    Soc::Rt63365e
};
