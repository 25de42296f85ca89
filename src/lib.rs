#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod interrupt;
pub mod period;
pub mod registers;
pub mod watchdog;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use error::Error;
pub use interrupt::InterruptControl;
pub use period::OverflowPeriod;
pub use registers::{Register, WatchdogRegisters};
pub use watchdog::{Callback, Status, Watchdog};

cfg_if::cfg_if! {
    if #[cfg(target_arch = "avr")] {
        pub mod clock;
        pub mod delay;
        pub mod hw;
        pub mod led;
        pub mod usart;

        pub use attiny_hal as hal;
    }
}
