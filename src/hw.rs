//! Watchdog register access on the attiny2313.

use avr_device::interrupt;

use crate::hal::pac::{CPU, WDT};
use crate::interrupt::InterruptControl;
use crate::registers::{Register, WatchdogRegisters};

/// Watchdog registers backed by the peripheral access crate.
pub struct PacRegisters {
    cpu: CPU,
    wdt: WDT,
}

impl PacRegisters {
    /// Take ownership of the peripherals holding MCUSR and WDTCSR.
    #[must_use]
    pub fn new(cpu: CPU, wdt: WDT) -> Self {
        Self { cpu, wdt }
    }
}

impl WatchdogRegisters for PacRegisters {
    fn read(&self, reg: Register) -> u8 {
        match reg {
            Register::Mcusr => self.cpu.mcusr.read().bits(),
            Register::Wdtcsr => self.wdt.wdtcsr.read().bits(),
        }
    }

    fn write(&mut self, reg: Register, value: u8) {
        match reg {
            Register::Mcusr => self.cpu.mcusr.write(|w| unsafe { w.bits(value) }),
            Register::Wdtcsr => self.wdt.wdtcsr.write(|w| unsafe { w.bits(value) }),
        }
    }

    fn reset_counter(&mut self) {
        avr_device::asm::wdr();
    }
}

/// Global interrupt flag of the CPU.
pub struct GlobalInterrupts;

impl InterruptControl for GlobalInterrupts {
    fn free<R>(&self, f: impl FnOnce() -> R) -> R {
        // Saves SREG and restores it afterwards, so nesting inside an
        // interrupt handler keeps interrupts disabled.
        interrupt::free(|_| f())
    }
}
