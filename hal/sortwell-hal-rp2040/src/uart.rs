//! Companion link on UART0
//!
//! GPIO0 transmits, GPIO1 receives. Both directions block.

use embassy_rp::peripherals::{PIN_0, PIN_1, UART0};
use embassy_rp::uart::{self, Blocking, Uart};
use embassy_rp::Peri;
use sortwell_hal::uart::UartConfig;
use sortwell_hal::{UartRx, UartTx};

pub struct RpUart {
    uart: Uart<'static, Blocking>,
}

impl RpUart {
    pub fn new(
        uart: Peri<'static, UART0>,
        tx: Peri<'static, PIN_0>,
        rx: Peri<'static, PIN_1>,
        config: &UartConfig,
    ) -> Self {
        let mut line = uart::Config::default();
        line.baudrate = config.baudrate;
        Self {
            uart: Uart::new_blocking(uart, tx, rx, line),
        }
    }
}

impl UartTx for RpUart {
    type Error = uart::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), uart::Error> {
        self.uart.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), uart::Error> {
        self.uart.blocking_flush()
    }
}

impl UartRx for RpUart {
    type Error = uart::Error;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), uart::Error> {
        self.uart.blocking_read(buf)
    }
}
