//! SPI transport for ILI9xxx-family controllers.
//!
//! Wraps an [`SpiDevice`] plus the data/command select line and the optional
//! reset and backlight lines. The DC line is driven low before every opcode
//! byte and high before argument or pixel bytes; all transfers are
//! synchronous and byte-order preserving.

use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

/// SPI interface with data/command, reset and backlight control lines
pub struct SpiDisplayInterface<SPI, DC, RST, BL> {
    spi: SPI,
    dc: DC,
    rst: Option<RST>,
    backlight: Option<BL>,
}

impl<SPI, DC, RST, BL> SpiDisplayInterface<SPI, DC, RST, BL> {
    /// Create a new interface from a concrete SPI device and pins
    pub fn new(spi: SPI, dc: DC, rst: Option<RST>, backlight: Option<BL>) -> Self {
        Self {
            spi,
            dc,
            rst,
            backlight,
        }
    }
}

impl<SPI, DC, RST, BL> SpiDisplayInterface<SPI, DC, RST, BL>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
{
    /// Pulse the reset line: ~10ms low, then ~10ms settle high.
    ///
    /// A no-op when no reset pin is wired.
    pub fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        if let Some(rst) = self.rst.as_mut() {
            rst.set_low().map_err(|_| DisplayError::RSError)?;
            delay.delay_ms(10);
            rst.set_high().map_err(|_| DisplayError::RSError)?;
            delay.delay_ms(10);
        }
        Ok(())
    }

    /// Drive the backlight enable line, when wired.
    ///
    /// `DisplayError` has no dedicated variant for the backlight line, so
    /// pin failures surface as `RSError` like the other control lines.
    pub fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        if let Some(bl) = self.backlight.as_mut() {
            let res = if on { bl.set_high() } else { bl.set_low() };
            res.map_err(|_| DisplayError::RSError)?;
        }
        Ok(())
    }

    /// Send a bare command byte
    pub fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        self.spi
            .write(&[command])
            .map_err(|_| DisplayError::BusWriteError)
    }

    /// Send a command byte followed by its argument bytes
    pub fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cmd(command)?;
        self.data(data)
    }

    /// Send raw data bytes (DC high)
    pub fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.spi
            .write(data)
            .map_err(|_| DisplayError::BusWriteError)
    }

    /// Read a single data byte back from the controller (DC high)
    pub fn read_data_byte(&mut self) -> Result<u8, DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        let mut buf = [0u8; 1];
        self.spi
            .read(&mut buf)
            .map_err(|_| DisplayError::BusWriteError)?;
        Ok(buf[0])
    }
}
