//! Register access used by the watchdog driver.
//!
//! The driver never touches memory directly. It goes through
//! [`WatchdogRegisters`], which the target implements on top of the
//! peripheral access crate and tests implement with a simulated device.

/// Registers involved in watchdog configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// MCU status register, holds the reset cause flags.
    Mcusr,
    /// Watchdog timer control register.
    Wdtcsr,
}

/// Watchdog system reset flag (MCUSR).
pub const WDRF: u8 = 3;

/// Watchdog interrupt flag (WDTCSR).
pub const WDIF: u8 = 7;
/// Watchdog interrupt enable (WDTCSR).
pub const WDIE: u8 = 6;
/// Watchdog prescaler bit 3 (WDTCSR).
pub const WDP3: u8 = 5;
/// Watchdog change enable (WDTCSR).
pub const WDCE: u8 = 4;
/// Watchdog system reset enable (WDTCSR).
pub const WDE: u8 = 3;
/// Watchdog prescaler bit 2 (WDTCSR).
pub const WDP2: u8 = 2;
/// Watchdog prescaler bit 1 (WDTCSR).
pub const WDP1: u8 = 1;
/// Watchdog prescaler bit 0 (WDTCSR).
pub const WDP0: u8 = 0;

/// First write of the timed sequence, opens the change window.
pub const CHANGE_ENABLE: u8 = (1 << WDCE) | (1 << WDE);

/// Raw access to the watchdog registers.
pub trait WatchdogRegisters {
    /// Read the current register value.
    fn read(&self, reg: Register) -> u8;

    /// Overwrite the register with `value`.
    fn write(&mut self, reg: Register, value: u8);

    /// Reset the watchdog counter (`wdr`).
    fn reset_counter(&mut self);

    /// Set a single bit, leaving the others untouched.
    fn set_bit(&mut self, reg: Register, bit: u8) {
        let value = self.read(reg) | (1 << bit);
        self.write(reg, value);
    }

    /// Clear a single bit, leaving the others untouched.
    fn clear_bit(&mut self, reg: Register, bit: u8) {
        let value = self.read(reg) & !(1 << bit);
        self.write(reg, value);
    }
}
