//! Watchdog timer driver.

use nano_fmt::{NanoDisplay, NanoWrite};

use crate::error::Error;
use crate::interrupt::InterruptControl;
use crate::period::OverflowPeriod;
use crate::registers::{CHANGE_ENABLE, Register, WDIF, WDRF, WatchdogRegisters};

/// Overflow callback, invoked from the watchdog interrupt.
pub type Callback = fn();

/// Callback used until one is attached.
fn noop() {}

/// Whether the watchdog timer is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Stopped = 0,
    Running = 1,
}

impl NanoDisplay for Status {
    fn fmt<F: NanoWrite>(self, f: &mut F) {
        let s = match self {
            Status::Stopped => "stopped",
            Status::Running => "running",
        };
        s.fmt(f);
    }
}

/// Driver for the watchdog timer peripheral.
///
/// There is one watchdog per device, so only one instance should exist. It
/// is normally kept in a `static` shared with the `WDT_OVERFLOW` handler,
/// which calls [`Watchdog::on_overflow`].
pub struct Watchdog<R, I> {
    regs: R,
    irq: I,
    period: OverflowPeriod,
    callback: Callback,
}

impl<R, I> Watchdog<R, I>
where
    R: WatchdogRegisters,
    I: InterruptControl,
{
    /// Create a driver without touching the hardware.
    ///
    /// The period defaults to one second and the callback does nothing.
    pub fn new(regs: R, irq: I) -> Self {
        Self {
            regs,
            irq,
            period: OverflowPeriod::default(),
            callback: noop,
        }
    }

    /// Configure and start the watchdog, and attach `callback`.
    pub fn init(&mut self, callback: Callback, period: OverflowPeriod) {
        self.period = period;

        let regs = &mut self.regs;
        self.irq.free(|| {
            Self::commit(regs, period.bits());
            // A stale overflow must not fire right after enabling.
            regs.set_bit(Register::Wdtcsr, WDIF);
        });

        self.attach_interrupt(callback);
    }

    /// Enable the watchdog with the stored period.
    pub fn start(&mut self) {
        let bits = self.period.bits();
        let regs = &mut self.regs;
        self.irq.free(|| Self::commit(regs, bits));
    }

    /// Disable the watchdog.
    ///
    /// A pending overflow is discarded, so WDTCSR reads zero afterwards.
    pub fn stop(&mut self) {
        let regs = &mut self.regs;
        self.irq.free(|| Self::commit(regs, 1 << WDIF));
    }

    #[must_use]
    pub fn status(&self) -> Status {
        if self.regs.read(Register::Wdtcsr) != 0 {
            Status::Running
        } else {
            Status::Stopped
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status() == Status::Running
    }

    /// Stored overflow period.
    #[must_use]
    pub fn period(&self) -> OverflowPeriod {
        self.period
    }

    /// Stored overflow period in milliseconds.
    #[must_use]
    pub fn get_period(&self) -> u16 {
        self.period.as_millis()
    }

    /// Change the overflow period.
    ///
    /// A running watchdog is re-armed with the new period, a stopped one
    /// stays stopped.
    pub fn set_period(&mut self, period: OverflowPeriod) {
        self.period = period;
        match self.status() {
            Status::Running => self.start(),
            Status::Stopped => self.stop(),
        }
    }

    /// Period currently programmed into the hardware.
    ///
    /// Returns `None` when the watchdog is stopped, and an error when the
    /// control register holds something other than a known period.
    pub fn active_period(&self) -> Result<Option<OverflowPeriod>, Error> {
        match self.regs.read(Register::Wdtcsr) {
            0 => Ok(None),
            value => OverflowPeriod::from_register(value).map(Some),
        }
    }

    /// Replace the overflow callback.
    pub fn attach_interrupt(&mut self, callback: Callback) {
        let slot = &mut self.callback;
        self.irq.free(|| *slot = callback);
    }

    /// Replace the overflow callback and switch to `period`.
    pub fn attach_interrupt_with_period(&mut self, callback: Callback, period: OverflowPeriod) {
        self.attach_interrupt(callback);
        self.set_period(period);
    }

    /// Restart the watchdog counter.
    pub fn feed(&mut self) {
        self.regs.reset_counter();
    }

    /// Whether the last reset was caused by the watchdog.
    ///
    /// [`Watchdog::init`] clears the flag, so check this before.
    #[must_use]
    pub fn watchdog_reset_occurred(&self) -> bool {
        self.regs.read(Register::Mcusr) & (1 << WDRF) != 0
    }

    /// Handle the watchdog overflow interrupt.
    ///
    /// Must be called from the `WDT_OVERFLOW` vector with interrupts
    /// disabled.
    pub fn on_overflow(&mut self) {
        (self.callback)();
        self.regs.set_bit(Register::Wdtcsr, WDIF);
    }

    /// Release the underlying resources.
    pub fn release(self) -> (R, I) {
        (self.regs, self.irq)
    }

    /// Timed sequence writing `value` to WDTCSR.
    ///
    /// Must run with interrupts disabled: the second write has to follow
    /// the first one within four cycles.
    fn commit(regs: &mut R, value: u8) {
        // WDRF overrides WDE, clear it first.
        regs.clear_bit(Register::Mcusr, WDRF);
        regs.write(Register::Wdtcsr, CHANGE_ENABLE);
        regs.write(Register::Wdtcsr, value);
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::sim::{Overflow, SimulatedDevice};

    type SimWatchdog<'a> = Watchdog<&'a SimulatedDevice, &'a SimulatedDevice>;

    fn driver(dev: &SimulatedDevice) -> SimWatchdog<'_> {
        Watchdog::new(dev, dev)
    }

    thread_local! {
        static A_CALLS: Cell<u32> = const { Cell::new(0) };
        static B_CALLS: Cell<u32> = const { Cell::new(0) };
    }

    fn callback_a() {
        A_CALLS.with(|c| c.set(c.get() + 1));
    }

    fn callback_b() {
        B_CALLS.with(|c| c.set(c.get() + 1));
    }

    fn reset_calls() {
        A_CALLS.with(|c| c.set(0));
        B_CALLS.with(|c| c.set(0));
    }

    fn calls() -> (u32, u32) {
        (A_CALLS.with(Cell::get), B_CALLS.with(Cell::get))
    }

    #[test]
    fn init_programs_period_and_runs() {
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);

        wdt.init(noop, OverflowPeriod::Ms1000);

        assert_eq!(dev.wdtcsr(), OverflowPeriod::Ms1000.bits());
        assert_eq!(wdt.status(), Status::Running);
        assert_eq!(wdt.get_period(), 1000);
        assert_eq!(wdt.active_period(), Ok(Some(OverflowPeriod::Ms1000)));
    }

    #[test]
    fn period_read_back() {
        for p in OverflowPeriod::ALL {
            let dev = SimulatedDevice::new();
            let mut wdt = driver(&dev);
            wdt.init(noop, OverflowPeriod::Ms16);

            wdt.set_period(p);

            assert_eq!(wdt.period(), p);
            assert_eq!(wdt.get_period(), p.as_millis());
            assert_eq!(wdt.active_period(), Ok(Some(p)));
        }
    }

    #[test]
    fn status_follows_start_and_stop() {
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);
        assert_eq!(wdt.status(), Status::Stopped);

        wdt.stop();
        assert_eq!(wdt.status(), Status::Stopped);
        wdt.start();
        assert_eq!(wdt.status(), Status::Running);
        wdt.start();
        assert_eq!(wdt.status(), Status::Running);
        wdt.stop();
        assert_eq!(wdt.status(), Status::Stopped);
        assert_eq!(dev.wdtcsr(), 0);

        wdt.init(noop, OverflowPeriod::Ms500);
        assert!(wdt.is_running());
        wdt.init(noop, OverflowPeriod::Ms64);
        assert!(wdt.is_running());
    }

    #[test]
    fn set_period_keeps_running_state() {
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);
        wdt.init(noop, OverflowPeriod::Ms1000);

        wdt.set_period(OverflowPeriod::Ms8000);
        assert_eq!(wdt.status(), Status::Running);
        assert_eq!(dev.wdtcsr(), OverflowPeriod::Ms8000.bits());

        wdt.stop();
        wdt.set_period(OverflowPeriod::Ms32);
        assert_eq!(wdt.status(), Status::Stopped);
        assert_eq!(dev.wdtcsr(), 0);

        // The new period applies on the next start.
        wdt.start();
        assert_eq!(dev.wdtcsr(), OverflowPeriod::Ms32.bits());
    }

    #[test]
    fn stop_start_scenario() {
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);

        wdt.init(noop, OverflowPeriod::Ms1000);
        assert_eq!(wdt.status() as u8, 1);
        assert_eq!(wdt.get_period(), 1000);

        wdt.stop();
        assert_eq!(wdt.status() as u8, 0);

        wdt.set_period(OverflowPeriod::Ms250);
        assert_eq!(wdt.status() as u8, 0);
        assert_eq!(wdt.get_period(), 250);
        assert_eq!(wdt.active_period(), Ok(None));
    }

    #[test]
    fn register_writes_are_guarded() {
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);

        wdt.init(callback_a, OverflowPeriod::Ms125);
        wdt.stop();
        wdt.start();
        wdt.set_period(OverflowPeriod::Ms2000);
        wdt.attach_interrupt(callback_b);

        assert_eq!(dev.unguarded_writes(), 0);
        assert!(dev.interrupts_enabled());
    }

    #[test]
    fn recovers_after_watchdog_reset() {
        let dev = SimulatedDevice::after_watchdog_reset();
        let mut wdt = driver(&dev);
        assert!(wdt.watchdog_reset_occurred());
        // WDE alone is not a period the driver knows about.
        assert_eq!(wdt.active_period(), Err(Error::InvalidConfiguration(0b0000_1000)));

        wdt.init(noop, OverflowPeriod::Ms4000);
        assert!(!wdt.watchdog_reset_occurred());
        assert_eq!(wdt.active_period(), Ok(Some(OverflowPeriod::Ms4000)));

        wdt.stop();
        assert_eq!(dev.wdtcsr(), 0);
    }

    #[test]
    fn unknown_register_value() {
        let dev = SimulatedDevice::new();
        let wdt = driver(&dev);
        // Interrupt and reset mode is never programmed by the driver.
        dev.poke_wdtcsr(0b0100_1110);
        assert_eq!(wdt.status(), Status::Running);
        assert_eq!(wdt.active_period(), Err(Error::InvalidConfiguration(0b0100_1110)));
    }

    #[test]
    fn default_callback_is_noop() {
        reset_calls();
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);
        wdt.start();

        assert_eq!(dev.overflow(), Overflow::Interrupt);
        wdt.on_overflow();

        assert_eq!(calls(), (0, 0));
        assert_eq!(dev.wdtcsr(), OverflowPeriod::Ms1000.bits());
    }

    #[test]
    fn attach_replaces_callback() {
        reset_calls();
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);
        wdt.init(callback_a, OverflowPeriod::Ms16);

        assert_eq!(dev.overflow(), Overflow::Interrupt);
        wdt.on_overflow();
        assert_eq!(calls(), (1, 0));

        wdt.attach_interrupt(callback_b);
        assert_eq!(dev.overflow(), Overflow::Interrupt);
        wdt.on_overflow();
        assert_eq!(calls(), (1, 1));
    }

    #[test]
    fn overflow_clears_interrupt_flag() {
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);
        wdt.init(noop, OverflowPeriod::Ms250);

        dev.overflow();
        assert_ne!(dev.wdtcsr() & (1 << WDIF), 0);

        wdt.on_overflow();
        assert_eq!(dev.wdtcsr(), OverflowPeriod::Ms250.bits());
        assert!(dev.interrupts_enabled());
    }

    #[test]
    fn overflow_handler_leaves_interrupts_alone() {
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);
        wdt.init(noop, OverflowPeriod::Ms32);
        let sections = dev.critical_sections();

        // Inside the vector the CPU has already disabled interrupts.
        dev.set_interrupts_enabled(false);
        dev.overflow();
        wdt.on_overflow();
        assert!(!dev.interrupts_enabled());

        dev.set_interrupts_enabled(true);
        dev.overflow();
        wdt.on_overflow();
        assert!(dev.interrupts_enabled());

        assert_eq!(dev.critical_sections(), sections);
    }

    #[test]
    fn stop_discards_pending_overflow() {
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);
        wdt.init(noop, OverflowPeriod::Ms16);

        assert_eq!(dev.overflow(), Overflow::Interrupt);
        wdt.stop();

        assert_eq!(wdt.status(), Status::Stopped);
        assert_eq!(dev.wdtcsr(), 0);
        assert_eq!(wdt.active_period(), Ok(None));

        wdt.set_period(OverflowPeriod::Ms250);
        assert_eq!(wdt.status(), Status::Stopped);
        assert_eq!(dev.wdtcsr(), 0);
        assert_eq!(wdt.get_period(), 250);
    }

    #[test]
    fn init_clears_pending_overflow() {
        let dev = SimulatedDevice::new();
        dev.poke_wdtcsr(1 << WDIF);
        let mut wdt = driver(&dev);

        wdt.init(noop, OverflowPeriod::Ms500);

        assert_eq!(dev.wdtcsr(), OverflowPeriod::Ms500.bits());
    }

    #[test]
    fn attach_with_period() {
        reset_calls();
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);
        wdt.init(callback_a, OverflowPeriod::Ms1000);

        wdt.attach_interrupt_with_period(callback_b, OverflowPeriod::Ms64);
        assert_eq!(wdt.get_period(), 64);
        assert!(wdt.is_running());

        dev.overflow();
        wdt.on_overflow();
        assert_eq!(calls(), (0, 1));
    }

    #[test]
    fn feed_resets_counter() {
        let dev = SimulatedDevice::new();
        let mut wdt = driver(&dev);
        wdt.init(noop, OverflowPeriod::Ms16);

        wdt.feed();
        wdt.feed();

        assert_eq!(dev.counter_resets(), 2);

        // The released device is the one the driver was built on.
        let (mut regs, _) = wdt.release();
        regs.reset_counter();
        assert_eq!(dev.counter_resets(), 3);
    }
}
