//! Simulated watchdog peripheral for host-side testing.
//!
//! [`SimulatedDevice`] implements both [`WatchdogRegisters`] and
//! [`InterruptControl`] through shared references, so a test can hand
//! `&device` to the driver and keep inspecting the device afterwards.

use core::cell::Cell;

use crate::interrupt::InterruptControl;
use crate::registers::{
    CHANGE_ENABLE, Register, WDCE, WDE, WDIE, WDIF, WDP0, WDP1, WDP2, WDP3, WDRF,
    WatchdogRegisters,
};

/// WDTCSR bits that only change inside the timed sequence.
const PROTECTED: u8 = (1 << WDP3) | (1 << WDE) | (1 << WDP2) | (1 << WDP1) | (1 << WDP0);

/// Outcome of a simulated counter overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Timer is stopped, nothing happens.
    Ignored,
    /// Interrupt flag raised, the vector should run.
    Interrupt,
    /// The device would reset.
    Reset,
}

/// In-memory watchdog peripheral.
#[derive(Debug)]
pub struct SimulatedDevice {
    mcusr: Cell<u8>,
    wdtcsr: Cell<u8>,
    change_window: Cell<bool>,
    interrupts_enabled: Cell<bool>,
    unguarded_writes: Cell<u32>,
    critical_sections: Cell<u32>,
    counter_resets: Cell<u32>,
}

impl SimulatedDevice {
    /// Device after power-on: watchdog off, interrupts enabled.
    pub const fn new() -> Self {
        Self {
            mcusr: Cell::new(0),
            wdtcsr: Cell::new(0),
            change_window: Cell::new(false),
            interrupts_enabled: Cell::new(true),
            unguarded_writes: Cell::new(0),
            critical_sections: Cell::new(0),
            counter_resets: Cell::new(0),
        }
    }

    /// Device right after a watchdog reset.
    ///
    /// WDRF is set, which keeps WDE forced on until it is cleared.
    pub const fn after_watchdog_reset() -> Self {
        Self {
            mcusr: Cell::new(1 << WDRF),
            wdtcsr: Cell::new(1 << WDE),
            ..Self::new()
        }
    }

    /// Raw WDTCSR value.
    pub fn wdtcsr(&self) -> u8 {
        self.wdtcsr.get()
    }

    /// Raw MCUSR value.
    pub fn mcusr(&self) -> u8 {
        self.mcusr.get()
    }

    /// Force a raw WDTCSR value, bypassing the timed sequence.
    pub fn poke_wdtcsr(&self, value: u8) {
        self.wdtcsr.set(value);
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled.get()
    }

    /// Set the global interrupt flag, as `sei`/`cli` or vector entry would.
    pub fn set_interrupts_enabled(&self, enabled: bool) {
        self.interrupts_enabled.set(enabled);
    }

    /// Number of critical sections entered so far.
    pub fn critical_sections(&self) -> u32 {
        self.critical_sections.get()
    }

    /// Number of register writes made while interrupts were enabled.
    pub fn unguarded_writes(&self) -> u32 {
        self.unguarded_writes.get()
    }

    /// Number of `wdr` executions.
    pub fn counter_resets(&self) -> u32 {
        self.counter_resets.get()
    }

    /// Let the watchdog counter run out.
    pub fn overflow(&self) -> Overflow {
        let value = self.wdtcsr.get();
        let wde = value & (1 << WDE) != 0;
        let wdie = value & (1 << WDIE) != 0;

        match (wde, wdie) {
            (false, false) => Overflow::Ignored,
            (false, true) => {
                self.wdtcsr.set(value | (1 << WDIF));
                Overflow::Interrupt
            }
            // Interrupt and reset mode: the first timeout clears WDIE, the
            // next one resets.
            (true, true) => {
                self.wdtcsr.set((value | (1 << WDIF)) & !(1 << WDIE));
                Overflow::Interrupt
            }
            (true, false) => {
                self.mcusr.set(self.mcusr.get() | (1 << WDRF));
                Overflow::Reset
            }
        }
    }

    fn write_wdtcsr(&self, value: u8) {
        let current = self.wdtcsr.get();
        let window_open = self.change_window.replace(false);

        let mut next = value & (1 << WDIE);

        // WDIF is cleared by writing one to it.
        if value & (1 << WDIF) == 0 {
            next |= current & (1 << WDIF);
        }

        if window_open {
            next |= value & PROTECTED;
        } else {
            next |= current & PROTECTED;
            // Setting WDE never needs the timed sequence.
            next |= value & (1 << WDE);
        }

        if value & CHANGE_ENABLE == CHANGE_ENABLE {
            self.change_window.set(true);
            next |= 1 << WDCE;
        }

        if self.mcusr.get() & (1 << WDRF) != 0 {
            next |= 1 << WDE;
        }

        self.wdtcsr.set(next);
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchdogRegisters for &SimulatedDevice {
    fn read(&self, reg: Register) -> u8 {
        match reg {
            Register::Mcusr => self.mcusr.get(),
            Register::Wdtcsr => self.wdtcsr.get(),
        }
    }

    fn write(&mut self, reg: Register, value: u8) {
        if self.interrupts_enabled.get() {
            self.unguarded_writes.set(self.unguarded_writes.get() + 1);
        }

        match reg {
            Register::Mcusr => self.mcusr.set(value),
            Register::Wdtcsr => self.write_wdtcsr(value),
        }
    }

    fn reset_counter(&mut self) {
        self.counter_resets.set(self.counter_resets.get() + 1);
    }
}

/// Restores the saved interrupt state when dropped.
struct Restore<'a> {
    enabled: &'a Cell<bool>,
    saved: bool,
}

impl Drop for Restore<'_> {
    fn drop(&mut self) {
        self.enabled.set(self.saved);
    }
}

impl InterruptControl for SimulatedDevice {
    fn free<R>(&self, f: impl FnOnce() -> R) -> R {
        self.critical_sections.set(self.critical_sections.get() + 1);
        let _restore = Restore {
            enabled: &self.interrupts_enabled,
            saved: self.interrupts_enabled.replace(false),
        };
        f()
    }
}
