//! Watchdog overflow periods.

use nano_fmt::{NanoDisplay, NanoWrite};

use crate::error::Error;
use crate::registers::{WDE, WDIE, WDP0, WDP1, WDP2, WDP3};

/// Mask of the WDTCSR bits that make up a period encoding.
const PERIOD_MASK: u8 =
    (1 << WDIE) | (1 << WDP3) | (1 << WDE) | (1 << WDP2) | (1 << WDP1) | (1 << WDP0);

/// Watchdog overflow period.
///
/// Each variant is the exact WDTCSR value that selects the period with the
/// watchdog interrupt enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OverflowPeriod {
    Ms16 = 0b0100_0000,
    Ms32 = 0b0100_0001,
    Ms64 = 0b0100_0010,
    Ms125 = 0b0100_0011,
    Ms250 = 0b0100_0100,
    Ms500 = 0b0100_0101,
    #[default]
    Ms1000 = 0b0100_0110,
    Ms2000 = 0b0100_0111,
    Ms4000 = 0b0110_0000,
    Ms8000 = 0b0110_0001,
}

impl OverflowPeriod {
    /// All periods, shortest first.
    pub const ALL: [Self; 10] = [
        Self::Ms16,
        Self::Ms32,
        Self::Ms64,
        Self::Ms125,
        Self::Ms250,
        Self::Ms500,
        Self::Ms1000,
        Self::Ms2000,
        Self::Ms4000,
        Self::Ms8000,
    ];

    /// WDTCSR value for this period.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Period length in milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u16 {
        match self {
            Self::Ms16 => 16,
            Self::Ms32 => 32,
            Self::Ms64 => 64,
            Self::Ms125 => 125,
            Self::Ms250 => 250,
            Self::Ms500 => 500,
            Self::Ms1000 => 1000,
            Self::Ms2000 => 2000,
            Self::Ms4000 => 4000,
            Self::Ms8000 => 8000,
        }
    }

    /// Look up the period lasting exactly `ms` milliseconds.
    pub fn from_millis(ms: u16) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_millis() == ms)
            .ok_or(Error::InvalidMillis(ms))
    }

    /// Decode the period from a WDTCSR value.
    ///
    /// The interrupt flag and change enable bits are ignored. Anything else
    /// must match one of the encodings exactly.
    pub(crate) fn from_register(value: u8) -> Result<Self, Error> {
        Self::try_from(value & PERIOD_MASK).map_err(|_| Error::InvalidConfiguration(value))
    }

    /// The next longer period, saturating at [`OverflowPeriod::Ms8000`].
    #[must_use]
    pub fn longer(self) -> Self {
        let idx = Self::ALL.iter().position(|&p| p == self).unwrap_or(0);
        Self::ALL.get(idx + 1).copied().unwrap_or(self)
    }
}

impl TryFrom<u8> for OverflowPeriod {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|p| p.bits() == bits)
            .ok_or(Error::InvalidArgument(bits))
    }
}

impl From<OverflowPeriod> for u8 {
    fn from(p: OverflowPeriod) -> Self {
        p.bits()
    }
}

impl NanoDisplay for OverflowPeriod {
    fn fmt<F: NanoWrite>(self, f: &mut F) {
        self.as_millis().fmt(f);
        "ms".fmt(f);
    }
}
