use avr_hal_generic::port::{Pin, PinOps, mode::Output};

/// Status LED, toggled on every watchdog overflow.
pub struct Led<PIN> {
    pin: Pin<Output, PIN>,
}

impl<PIN> Led<PIN>
where
    PIN: PinOps,
{
    pub fn new(pin: Pin<Output, PIN>) -> Self {
        Self { pin }
    }

    pub fn toggle(&mut self) {
        self.pin.toggle();
    }
}
