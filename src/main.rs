#![cfg_attr(target_arch = "avr", no_std, no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use avr_device::interrupt::{self, CriticalSection, Mutex};
    use core::cell::{Cell, RefCell};
    use embedded_hal::delay::DelayNs;
    use panic_halt as _;

    use avr_watchdog::{
        OverflowPeriod, Watchdog,
        delay::Delay,
        hal,
        hw::{GlobalInterrupts, PacRegisters},
        led::Led,
        usart::Reporter,
    };

    type BoardWatchdog = Watchdog<PacRegisters, GlobalInterrupts>;

    /// UART baud rate.
    const BAUDRATE: u32 = 9600;

    /// Main loop polling interval (in milliseconds).
    const POLL_MS: u32 = 10;

    /// Number of overflows before switching to the next longer period.
    const OVERFLOWS_PER_PERIOD: u16 = 4;

    /// Driver instance shared with the overflow handler.
    static WATCHDOG: Mutex<RefCell<Option<BoardWatchdog>>> = Mutex::new(RefCell::new(None));

    /// Number of overflows seen by the callback.
    static OVERFLOWS: Mutex<Cell<u16>> = Mutex::new(Cell::new(0));

    /// Watchdog overflow callback.
    fn count_overflow() {
        // Runs inside the handler, interrupts stay disabled.
        interrupt::free(|cs| {
            let overflows = OVERFLOWS.borrow(cs);
            overflows.set(overflows.get().wrapping_add(1));
        });
    }

    /// Watchdog timer overflow interrupt.
    #[avr_device::interrupt(attiny2313)]
    fn WDT_OVERFLOW() {
        // SAFETY: We are inside a blocking interrupt.
        let cs = unsafe { CriticalSection::new() };

        if let Some(wdt) = WATCHDOG.borrow(cs).borrow_mut().as_mut() {
            wdt.on_overflow();
        }
    }

    /// Run `f` on the shared driver.
    fn with_watchdog<R>(f: impl FnOnce(&mut BoardWatchdog) -> R) -> Option<R> {
        interrupt::free(|cs| WATCHDOG.borrow(cs).borrow_mut().as_mut().map(f))
    }

    /// Log one overflow event and advance the period every few overflows.
    fn report_overflow(serial: &mut Reporter, count: u16) {
        let state = with_watchdog(|wdt| {
            if count % OVERFLOWS_PER_PERIOD == 0 {
                let next = wdt.period().longer();
                wdt.set_period(next);
            }
            (wdt.period(), wdt.status())
        });

        if let Some((period, status)) = state {
            serial.field("ovf", count);
            serial.field("period", period);
            serial.field("status", status);
            serial.end_line();
        }
    }

    #[hal::entry]
    fn main() -> ! {
        let dp = hal::Peripherals::take().unwrap();
        let pins = hal::pins!(dp);

        let mut serial = Reporter::new(dp.USART, pins.pd1.into_output(), BAUDRATE);
        let mut led = Led::new(pins.pb4.into_output());

        let mut wdt = Watchdog::new(PacRegisters::new(dp.CPU, dp.WDT), GlobalInterrupts);

        serial.field("boot wdt-reset", wdt.watchdog_reset_occurred());
        serial.end_line();

        wdt.init(count_overflow, OverflowPeriod::Ms16);

        interrupt::free(|cs| {
            WATCHDOG.borrow(cs).replace(Some(wdt));
        });

        // Enable interrupts.
        unsafe {
            // SAFETY: Not inside a critical section and the driver has been
            // moved to its shared location.
            avr_device::interrupt::enable();
        }

        let mut delay = Delay::new();
        let mut reported = 0u16;

        loop {
            delay.delay_ms(POLL_MS);

            let count = interrupt::free(|cs| OVERFLOWS.borrow(cs).get());
            if count != reported {
                reported = count;
                led.toggle();
                report_overflow(&mut serial, count);
            }
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
