use crate::{clock::BoardClock, hal};

/// Busy-wait delay for the board clock.
pub type Delay = hal::delay::Delay<BoardClock>;
