use crate::hal;

/// Board clock rate.
pub type BoardClock = hal::clock::MHz8;
