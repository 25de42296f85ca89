use nano_fmt::{NanoDisplay, NanoWrite};

use crate::clock::BoardClock;
use crate::hal::pac::USART;
use crate::hal::port::{self, PD1};

type Baudrate = avr_hal_generic::usart::Baudrate<BoardClock>;

/// Transmit-only serial port used for event reports.
pub struct Reporter {
    p: USART,
}

impl Reporter {
    /// Configure the USART for 8N1 transmission at `baudrate`.
    #[must_use]
    pub fn new(p: USART, _tx: port::Pin<port::mode::Output, PD1>, baudrate: u32) -> Self {
        let baudrate = Baudrate::new(baudrate);
        p.ubrrh.write(|w| w.bits((baudrate.ubrr >> 8) as u8));
        p.ubrrl.write(|w| w.bits((baudrate.ubrr & 0xFF) as u8));
        p.ucsra.write(|w| w.u2x().bit(baudrate.u2x));

        // Nothing is ever received, leave PD0 to the board.
        p.ucsrb.write(|w| w.txen().set_bit());

        Self { p }
    }

    /// Write one `key value` field followed by a separator.
    pub fn field<T: NanoDisplay>(&mut self, key: &str, value: T) {
        key.fmt(self);
        self.write_byte(b' ');
        value.fmt(self);
        self.write_byte(b' ');
    }

    /// Terminate the current report line.
    pub fn end_line(&mut self) {
        self.write_bytes(b"\r\n");
    }
}

impl NanoWrite for Reporter {
    fn write_byte(&mut self, b: u8) {
        while self.p.ucsra.read().udre().bit_is_clear() {}

        self.p.udr.write(|w| w.bits(b));
    }
}
