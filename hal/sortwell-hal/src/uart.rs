//! Blocking serial port
//!
//! Used for the companion link. Reads wait for as long as it takes the
//! other side to answer.

pub trait UartTx {
    type Error;

    /// Queue every byte of `data`
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Wait until queued bytes have left the shift register
    fn flush(&mut self) -> Result<(), Self::Error>;
}

pub trait UartRx {
    type Error;

    /// Fill `buf` completely
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut byte = [0u8];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

/// Line settings; framing is always 8N1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    pub baudrate: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::with_baudrate(115_200)
    }
}

impl UartConfig {
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self { baudrate }
    }
}
