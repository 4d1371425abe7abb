//! Buffered driver for ILI9xxx-family controllers.
//!
//! The driver owns an in-memory framebuffer in the active [`ColorMode`] and
//! tracks the bounding window of changed pixels between flushes. A flush
//! addresses only that window on the panel and streams its rows through a
//! fixed-size staging buffer, so transfer memory stays bounded regardless
//! of panel resolution.

pub use display_interface::DisplayError;

use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::{debug, trace};

use crate::cmd::Cmd;
use crate::color::{Color, ColorMode, DEFAULT_PALETTE, PALETTE_LEN};
use crate::flag::Flag;
use crate::interface::SpiDisplayInterface;
use crate::models::Panel;
use crate::window::Window;

// Staging capacity in bytes; 64 wire pixels per chunk.
const TRANSFER_BUFFER_SIZE: usize = 128;

// Settle time after init-table records carrying the delay flag.
const INIT_SETTLE_MS: u32 = 150;

/// Errors surfaced by the driver
#[derive(Clone, Debug)]
pub enum Error {
    /// Transport or control-line failure
    Interface(DisplayError),
    /// The framebuffer could not be allocated, even after falling back to
    /// the narrowest color mode. The driver is permanently failed and all
    /// further flushes are skipped.
    OutOfMemory,
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Error::Interface(e)
    }
}

/// A buffered display driver for one panel
pub struct Ili9xxx<SPI, DC, RST, BL> {
    interface: SpiDisplayInterface<SPI, DC, RST, BL>,
    panel: Panel,
    color_mode: ColorMode,
    palette: &'static [u8; PALETTE_LEN],
    buffer: Vec<u8>,
    window: Window,
    transfer_buffer: [u8; TRANSFER_BUFFER_SIZE],
    failed: bool,
    // allocation ceiling in bytes, so tests can force allocation failure
    #[cfg(test)]
    alloc_cap: usize,
}

impl<SPI, DC, RST, BL> Ili9xxx<SPI, DC, RST, BL> {
    /// Create a driver for the given panel model.
    ///
    /// The framebuffer is not allocated and the panel is not initialized
    /// until [`setup`](Self::setup) runs.
    pub fn new(spi: SPI, dc: DC, rst: Option<RST>, backlight: Option<BL>, panel: Panel) -> Self {
        debug!(
            "creating {} driver ({}x{})",
            panel.name, panel.width, panel.height
        );
        Self {
            interface: SpiDisplayInterface::new(spi, dc, rst, backlight),
            panel,
            color_mode: ColorMode::default(),
            palette: &DEFAULT_PALETTE,
            buffer: Vec::new(),
            window: Window::empty(panel.width, panel.height),
            transfer_buffer: [0; TRANSFER_BUFFER_SIZE],
            failed: false,
            #[cfg(test)]
            alloc_cap: usize::MAX,
        }
    }

    /// Select the preferred framebuffer encoding. Call before
    /// [`setup`](Self::setup); the active mode may still narrow to
    /// [`ColorMode::Indexed8`] if allocation fails.
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    /// Provide the palette used by [`ColorMode::Indexed8`]
    pub fn set_palette(&mut self, palette: &'static [u8; PALETTE_LEN]) {
        self.palette = palette;
    }

    /// Panel width in pixels
    pub fn width(&self) -> u16 {
        self.panel.width
    }

    /// Panel height in pixels
    pub fn height(&self) -> u16 {
        self.panel.height
    }

    /// The encoding currently backing the framebuffer
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Whether the driver entered the permanent failed state at setup
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Write one pixel into the framebuffer.
    ///
    /// Out-of-bounds coordinates are silently ignored so callers composing
    /// partially off-screen content need no clipping of their own. The
    /// changed window only grows when the stored bytes actually change, so
    /// redrawing identical content never widens the next flush.
    pub fn write_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= i32::from(self.panel.width) || y >= i32::from(self.panel.height) {
            return;
        }
        if self.buffer.is_empty() {
            return;
        }
        let (x, y) = (x as u16, y as u16);
        let pos = y as usize * self.panel.width as usize + x as usize;

        let updated = match self.color_mode {
            ColorMode::Rgb565 => {
                let raw = color.to_rgb565().to_be_bytes();
                let i = pos * 2;
                let changed = self.buffer[i] != raw[0] || self.buffer[i + 1] != raw[1];
                self.buffer[i] = raw[0];
                self.buffer[i + 1] = raw[1];
                changed
            }
            ColorMode::Rgb332 => self.store_byte(pos, color.to_rgb332()),
            ColorMode::Indexed8 => self.store_byte(pos, color.to_index8(self.palette)),
        };

        if updated {
            self.window.expand(x, y);
            trace!(
                "pixel ({x},{y}) -> window x:{}..{} y:{}..{}",
                self.window.x_low,
                self.window.x_high,
                self.window.y_low,
                self.window.y_high
            );
        }
    }

    fn store_byte(&mut self, pos: usize, value: u8) -> bool {
        let changed = self.buffer[pos] != value;
        self.buffer[pos] = value;
        changed
    }

    /// Set every pixel of the framebuffer and mark the full panel changed
    pub fn fill(&mut self, color: Color) {
        if self.buffer.is_empty() {
            return;
        }
        self.window.cover_full(self.panel.width, self.panel.height);
        match self.color_mode {
            ColorMode::Rgb565 => {
                let raw = color.to_rgb565().to_be_bytes();
                for px in self.buffer.chunks_exact_mut(2) {
                    px[0] = raw[0];
                    px[1] = raw[1];
                }
            }
            ColorMode::Rgb332 => self.buffer.fill(color.to_rgb332()),
            ColorMode::Indexed8 => self.buffer.fill(color.to_index8(self.palette)),
        }
    }

    /// Convert up to one staging buffer worth of pixels starting at `pos`
    /// into wire format. Returns the number of pixels staged.
    fn stage_chunk(&mut self, pos: usize, remaining: usize) -> usize {
        let count = remaining.min(TRANSFER_BUFFER_SIZE / 2);
        match self.color_mode {
            // stored wire-ready, straight copy
            ColorMode::Rgb565 => {
                self.transfer_buffer[..count * 2]
                    .copy_from_slice(&self.buffer[pos * 2..(pos + count) * 2]);
            }
            ColorMode::Rgb332 => {
                for i in 0..count {
                    let wire = Color::from_rgb332(self.buffer[pos + i])
                        .to_rgb565()
                        .to_be_bytes();
                    self.transfer_buffer[i * 2] = wire[0];
                    self.transfer_buffer[i * 2 + 1] = wire[1];
                }
            }
            ColorMode::Indexed8 => {
                for i in 0..count {
                    let wire = Color::from_index8(self.buffer[pos + i], self.palette)
                        .to_rgb565()
                        .to_be_bytes();
                    self.transfer_buffer[i * 2] = wire[0];
                    self.transfer_buffer[i * 2 + 1] = wire[1];
                }
            }
        }
        count
    }

    fn try_alloc(&self, len: usize) -> Option<Vec<u8>> {
        #[cfg(test)]
        if len > self.alloc_cap {
            return None;
        }
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len).ok()?;
        buffer.resize(len, 0);
        Some(buffer)
    }
}

impl<SPI, DC, RST, BL> Ili9xxx<SPI, DC, RST, BL>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
{
    /// Reset and initialize the panel, then allocate the framebuffer.
    ///
    /// Replays the panel's init table, applies its inversion setting and
    /// enables the backlight. If the framebuffer cannot be allocated at the
    /// preferred encoding the driver falls back to [`ColorMode::Indexed8`];
    /// a second failure puts it into the permanent failed state.
    pub fn setup(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
        debug!(
            "setting up {} ({}x{})",
            self.panel.name, self.panel.width, self.panel.height
        );
        self.interface.hard_reset(delay)?;
        let sequence = self.panel.init_sequence;
        self.replay_init_table(sequence, delay)?;
        self.set_inversion(self.panel.invert_colors)?;
        self.interface.set_backlight(true)?;
        self.window = Window::empty(self.panel.width, self.panel.height);
        self.allocate_buffer()
    }

    fn allocate_buffer(&mut self) -> Result<(), Error> {
        let pixels = self.panel.width as usize * self.panel.height as usize;
        if self.color_mode == ColorMode::Rgb565 {
            if let Some(buffer) = self.try_alloc(pixels * 2) {
                self.buffer = buffer;
                return Ok(());
            }
            debug!("16-bit framebuffer allocation failed, falling back to indexed");
            self.color_mode = ColorMode::Indexed8;
        }
        match self.try_alloc(pixels) {
            Some(buffer) => {
                self.buffer = buffer;
                Ok(())
            }
            None => {
                self.failed = true;
                Err(Error::OutOfMemory)
            }
        }
    }

    /// Replay a flat init command table (see [`crate::models`] for the
    /// record format). Replay stops at the zero terminator, or early if a
    /// record is truncated.
    fn replay_init_table(
        &mut self,
        table: &[u8],
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        let mut i = 0;
        while let Some(&command) = table.get(i) {
            i += 1;
            if command == 0 {
                break;
            }
            let Some(&count_byte) = table.get(i) else {
                debug!("init table truncated at command {command:#04x}");
                break;
            };
            i += 1;
            let num_args = (count_byte & 0x7F) as usize;
            let Some(args) = table.get(i..i + num_args) else {
                debug!("init table truncated inside {command:#04x} arguments");
                break;
            };
            trace!("init command {command:#04x} with {num_args} args");
            self.interface.cmd_with_data(command, args)?;
            i += num_args;
            if count_byte & Flag::INIT_DELAY != 0 {
                delay.delay_ms(INIT_SETTLE_MS);
            }
        }
        Ok(())
    }

    /// Turn panel color inversion on or off
    pub fn set_inversion(&mut self, invert: bool) -> Result<(), Error> {
        let command = if invert { Cmd::INVON } else { Cmd::INVOFF };
        self.interface.cmd(command)?;
        Ok(())
    }

    /// Transmit the changed window to the panel and reset the tracking state
    pub fn flush(&mut self) -> Result<(), Error> {
        self.flush_with(|| {})
    }

    /// Like [`flush`](Self::flush), calling `keepalive` after each streamed
    /// row so a large update does not starve other duties of the host loop
    /// (e.g. a watchdog feed).
    pub fn flush_with(&mut self, mut keepalive: impl FnMut()) -> Result<(), Error> {
        if self.failed || self.window.is_empty() {
            return Ok(());
        }

        // Latch the bounds up front; the window resets only after the whole
        // rectangle has been streamed.
        let window = self.window;
        let w = u32::from(window.width());
        let h = u32::from(window.height());
        let start_pos =
            u32::from(window.y_low) * u32::from(self.panel.width) + u32::from(window.x_low);

        debug!(
            "flush window x:{}..{} y:{}..{} ({w}x{h} px)",
            window.x_low, window.x_high, window.y_low, window.y_high
        );

        self.set_address_window(window.x_low, window.y_low, window.width(), window.height())?;
        for row in 0..h {
            // Rows stream top to bottom, left to right; the panel's
            // auto-increment addressing removes any re-addressing between
            // chunks and rows.
            let mut pos = start_pos + row * u32::from(self.panel.width);
            let mut remaining = w;
            while remaining > 0 {
                let staged = self.stage_chunk(pos as usize, remaining as usize);
                self.interface.data(&self.transfer_buffer[..staged * 2])?;
                pos += staged as u32;
                remaining -= staged as u32;
            }
            keepalive();
        }

        self.window = Window::empty(self.panel.width, self.panel.height);
        Ok(())
    }

    /// Open an addressed write: column bounds, row bounds, then RAMWR,
    /// leaving the panel expecting the pixel stream.
    fn set_address_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), DisplayError> {
        let x2 = x + w - 1;
        let y2 = y + h - 1;
        self.interface.cmd(Cmd::CASET)?;
        self.interface
            .data(&[(x >> 8) as u8, x as u8, (x2 >> 8) as u8, x2 as u8])?;
        self.interface.cmd(Cmd::PASET)?;
        self.interface
            .data(&[(y >> 8) as u8, y as u8, (y2 >> 8) as u8, y2 as u8])?;
        self.interface.cmd(Cmd::RAMWR)
    }

    /// Read a register byte back from the controller.
    ///
    /// The controller's index semantics consume `index + 1` data bytes (the
    /// leading ones are dummies) and the last byte read is returned, so
    /// `index == 0` still reads one byte.
    pub fn read_command(&mut self, command: u8, index: u8) -> Result<u8, Error> {
        self.interface.cmd_with_data(Cmd::IDXRD, &[0x10 + index])?;
        self.interface.cmd(command)?;
        let mut remaining = index;
        loop {
            let result = self.interface.read_data_byte()?;
            if remaining == 0 {
                return Ok(result);
            }
            remaining -= 1;
        }
    }
}


#[cfg(feature = "graphics")]
mod graphics {
    use super::Ili9xxx;
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::prelude::*;

    impl<SPI, DC, RST, BL> DrawTarget for Ili9xxx<SPI, DC, RST, BL> {
        type Color = Rgb888;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                self.write_pixel(point.x, point.y, color.into());
            }
            Ok(())
        }
    }

    impl<SPI, DC, RST, BL> OriginDimensions for Ili9xxx<SPI, DC, RST, BL> {
        fn size(&self) -> Size {
            Size::new(u32::from(self.width()), u32::from(self.height()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{self, Panel};
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use embedded_hal::spi::Operation;

    #[derive(Default)]
    struct BusState {
        dc_high: bool,
        // one entry per transaction: (data mode, bytes written)
        log: Vec<(bool, Vec<u8>)>,
        read_queue: Vec<u8>,
        read_pos: usize,
    }

    impl BusState {
        fn commands(&self) -> Vec<u8> {
            self.log
                .iter()
                .filter(|(data, _)| !data)
                .flat_map(|(_, bytes)| bytes.iter().copied())
                .collect()
        }

        fn data_after(&self, command: u8) -> Vec<Vec<u8>> {
            let mut seen = false;
            let mut out = Vec::new();
            for (data, bytes) in &self.log {
                if !data {
                    seen = bytes.len() == 1 && bytes[0] == command;
                } else if seen {
                    out.push(bytes.clone());
                }
            }
            out
        }
    }

    #[derive(Debug)]
    struct BusFault;
    impl embedded_hal::spi::Error for BusFault {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    struct MockSpi(Rc<RefCell<BusState>>);

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = BusFault;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
            let mut state = self.0.borrow_mut();
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        let dc = state.dc_high;
                        state.log.push((dc, bytes.to_vec()));
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = state.read_queue.get(state.read_pos).copied().unwrap_or(0);
                            state.read_pos += 1;
                        }
                    }
                    _ => {}
                }
            }
            Ok(())
        }
    }

    struct DcPin(Rc<RefCell<BusState>>);

    impl embedded_hal::digital::ErrorType for DcPin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for DcPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().dc_high = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().dc_high = true;
            Ok(())
        }
    }

    struct NoPin;

    impl embedded_hal::digital::ErrorType for NoPin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for NoPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct CountingDelay(Rc<RefCell<u64>>);

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            *self.0.borrow_mut() += u64::from(ns);
        }
    }

    fn noop_delay() -> CountingDelay {
        CountingDelay(Rc::new(RefCell::new(0)))
    }

    type TestDisplay = Ili9xxx<MockSpi, DcPin, NoPin, NoPin>;

    fn display_for(panel: Panel, mode: ColorMode) -> (TestDisplay, Rc<RefCell<BusState>>) {
        let state = Rc::new(RefCell::new(BusState::default()));
        let mut display = Ili9xxx::new(
            MockSpi(state.clone()),
            DcPin(state.clone()),
            None,
            Some(NoPin),
            panel,
        );
        display.set_color_mode(mode);
        display.setup(&mut noop_delay()).unwrap();
        state.borrow_mut().log.clear();
        (display, state)
    }

    fn make_display() -> (TestDisplay, Rc<RefCell<BusState>>) {
        display_for(models::ILI9341, ColorMode::Rgb565)
    }

    fn total_data_bytes(state: &BusState) -> usize {
        state
            .log
            .iter()
            .filter(|(data, _)| *data)
            .map(|(_, bytes)| bytes.len())
            .sum()
    }

    #[test]
    fn empty_flush_issues_no_commands() {
        let (mut display, state) = make_display();
        display.flush().unwrap();
        assert!(state.borrow().log.is_empty());
    }

    #[test]
    fn redundant_writes_keep_the_window_empty() {
        let (mut display, state) = make_display();

        // buffer starts zeroed, so black writes change nothing
        display.write_pixel(5, 5, Color::BLACK);
        display.flush().unwrap();
        assert!(state.borrow().log.is_empty());

        // rewriting a pixel to its current color after a flush is also silent
        display.write_pixel(5, 5, Color::WHITE);
        display.flush().unwrap();
        state.borrow_mut().log.clear();
        display.write_pixel(5, 5, Color::WHITE);
        display.flush().unwrap();
        assert!(state.borrow().log.is_empty());
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let (mut display, state) = make_display();
        display.write_pixel(-1, 5, Color::WHITE);
        display.write_pixel(240, 0, Color::WHITE);
        display.write_pixel(0, 320, Color::WHITE);
        display.flush().unwrap();
        assert!(state.borrow().log.is_empty());
    }

    #[test]
    fn flush_streams_only_the_dirty_window() {
        let (mut display, state) = make_display();
        display.write_pixel(10, 20, Color::rgb(255, 0, 0));
        display.write_pixel(50, 60, Color::rgb(0, 0, 255));
        display.flush().unwrap();

        let state = state.borrow();
        assert_eq!(state.commands(), [Cmd::CASET, Cmd::PASET, Cmd::RAMWR]);
        assert_eq!(state.data_after(Cmd::CASET)[0], [0, 10, 0, 50]);
        assert_eq!(state.data_after(Cmd::PASET)[0], [0, 20, 0, 60]);

        // 41 rows of 41 pixels, one chunk per row
        let rows = state.data_after(Cmd::RAMWR);
        assert_eq!(rows.len(), 41);
        assert!(rows.iter().all(|chunk| chunk.len() == 41 * 2));

        // red pixel sits at the window origin
        assert_eq!(&rows[0][0..2], &0xF800u16.to_be_bytes());
        // blue pixel is 40 columns into the last row
        assert_eq!(&rows[40][80..82], &0x001Fu16.to_be_bytes());
        // everything else still carries the zeroed background
        let zeros = rows
            .iter()
            .flat_map(|c| c.iter())
            .filter(|&&b| b == 0)
            .count();
        assert_eq!(zeros, 41 * 41 * 2 - 2);
    }

    #[test]
    fn second_flush_is_a_noop() {
        let (mut display, state) = make_display();
        display.write_pixel(0, 0, Color::WHITE);
        display.flush().unwrap();
        state.borrow_mut().log.clear();
        display.flush().unwrap();
        assert!(state.borrow().log.is_empty());
    }

    #[test]
    fn rows_wider_than_the_staging_buffer_are_chunked() {
        let (mut display, state) = make_display();
        display.write_pixel(0, 0, Color::WHITE);
        display.write_pixel(99, 0, Color::WHITE);
        display.flush().unwrap();

        let state = state.borrow();
        let chunks = state.data_after(Cmd::RAMWR);
        // a 100 pixel row splits into a full 64 pixel chunk plus the rest
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 64 * 2);
        assert_eq!(chunks[1].len(), 36 * 2);
    }

    #[test]
    fn fill_then_flush_covers_the_whole_panel() {
        let (mut display, state) = make_display();
        display.fill(Color::WHITE);
        display.flush().unwrap();

        let state = state.borrow();
        assert_eq!(state.data_after(Cmd::CASET)[0], [0, 0, 0, 239]);
        assert_eq!(state.data_after(Cmd::PASET)[0], [0, 0, 0x01, 0x3F]);
        // address window arguments plus every panel pixel in 16 bits
        assert_eq!(total_data_bytes(&state), 240 * 320 * 2 + 8);
        assert!(state
            .data_after(Cmd::RAMWR)
            .iter()
            .all(|chunk| chunk.iter().all(|&b| b == 0xFF)));
    }

    #[test]
    fn flush_with_feeds_the_keepalive_per_row() {
        let (mut display, _) = make_display();
        display.write_pixel(0, 10, Color::WHITE);
        display.write_pixel(0, 14, Color::WHITE);
        let mut fed = 0;
        display.flush_with(|| fed += 1).unwrap();
        assert_eq!(fed, 5);
    }

    #[test]
    fn rgb332_pixels_are_reencoded_for_the_wire() {
        let (mut display, state) = display_for(models::ILI9341, ColorMode::Rgb332);
        display.write_pixel(0, 0, Color::rgb(255, 0, 0));
        display.flush().unwrap();

        // stored as one 332 byte, sent as big-endian 565
        let state = state.borrow();
        assert_eq!(state.data_after(Cmd::RAMWR)[0], 0xF800u16.to_be_bytes());
    }

    #[test]
    fn indexed_pixels_go_through_the_palette() {
        let (mut display, state) = display_for(models::ILI9341, ColorMode::Indexed8);
        display.write_pixel(0, 0, Color::WHITE);
        display.flush().unwrap();

        let state = state.borrow();
        assert_eq!(state.data_after(Cmd::RAMWR)[0], 0xFFFFu16.to_be_bytes());
    }

    #[test]
    fn setup_replays_the_init_table() {
        const TABLE: &[u8] = &[0xAB, 2, 0x01, 0x02, 0xCD, Flag::INIT_DELAY, 0x00];
        let panel = Panel {
            name: "test",
            width: 8,
            height: 8,
            init_sequence: TABLE,
            invert_colors: true,
        };

        let state = Rc::new(RefCell::new(BusState::default()));
        let mut display: TestDisplay = Ili9xxx::new(
            MockSpi(state.clone()),
            DcPin(state.clone()),
            None,
            None,
            panel,
        );
        let elapsed = Rc::new(RefCell::new(0));
        display.setup(&mut CountingDelay(elapsed.clone())).unwrap();

        let state = state.borrow();
        assert_eq!(state.commands(), [0xAB, 0xCD, Cmd::INVON]);
        assert_eq!(state.data_after(0xAB)[0], [0x01, 0x02]);
        // the flagged record settles for 150ms; no reset pin is wired
        assert_eq!(*elapsed.borrow(), 150_000_000);
    }

    #[test]
    fn truncated_init_table_stops_replay() {
        // second record claims three argument bytes but only one remains
        const TABLE: &[u8] = &[0xAB, 1, 0x01, 0xCD, 3, 0x01];
        let panel = Panel {
            name: "test",
            width: 8,
            height: 8,
            init_sequence: TABLE,
            invert_colors: false,
        };

        let state = Rc::new(RefCell::new(BusState::default()));
        let mut display: TestDisplay = Ili9xxx::new(
            MockSpi(state.clone()),
            DcPin(state.clone()),
            None,
            None,
            panel,
        );
        display.setup(&mut noop_delay()).unwrap();

        let state = state.borrow();
        // the short trailing record is dropped and setup still completes
        assert_eq!(state.commands(), [0xAB, Cmd::INVOFF]);
        assert_eq!(state.data_after(0xAB)[0], [0x01]);
    }

    #[test]
    fn failed_16bit_allocation_narrows_to_indexed() {
        let state = Rc::new(RefCell::new(BusState::default()));
        let mut display: TestDisplay = Ili9xxx::new(
            MockSpi(state.clone()),
            DcPin(state.clone()),
            None,
            None,
            models::ILI9341,
        );
        // room for one byte per pixel but not two
        display.alloc_cap = 240 * 320;
        display.setup(&mut noop_delay()).unwrap();
        assert_eq!(display.color_mode(), ColorMode::Indexed8);
        assert!(!display.is_failed());

        // the narrowed framebuffer is fully usable
        state.borrow_mut().log.clear();
        display.write_pixel(0, 0, Color::WHITE);
        display.flush().unwrap();
        let state = state.borrow();
        assert_eq!(state.data_after(Cmd::RAMWR)[0], 0xFFFFu16.to_be_bytes());
    }

    #[test]
    fn double_allocation_failure_parks_the_driver() {
        let state = Rc::new(RefCell::new(BusState::default()));
        let mut display: TestDisplay = Ili9xxx::new(
            MockSpi(state.clone()),
            DcPin(state.clone()),
            None,
            None,
            models::ILI9341,
        );
        display.alloc_cap = 0;
        assert!(matches!(
            display.setup(&mut noop_delay()),
            Err(Error::OutOfMemory)
        ));
        assert!(display.is_failed());

        // a parked driver stays silent on the bus
        state.borrow_mut().log.clear();
        display.fill(Color::WHITE);
        display.write_pixel(0, 0, Color::WHITE);
        display.flush().unwrap();
        assert!(state.borrow().log.is_empty());
    }

    #[test]
    fn read_command_consumes_index_plus_one_bytes() {
        let (mut display, state) = make_display();
        state.borrow_mut().read_queue.extend([0x11, 0x22, 0x33, 0x44]);

        let result = display.read_command(Cmd::RDID2, 2).unwrap();
        assert_eq!(result, 0x33);
        assert_eq!(state.borrow().read_pos, 3);
        // the index register is set before the read
        assert_eq!(state.borrow().data_after(Cmd::IDXRD)[0], [0x12]);
    }

    #[test]
    fn read_command_index_zero_still_reads_one_byte() {
        let (mut display, state) = make_display();
        state.borrow_mut().read_queue.extend([0xAA, 0xBB]);

        let result = display.read_command(Cmd::RDID1, 0).unwrap();
        assert_eq!(result, 0xAA);
        assert_eq!(state.borrow().read_pos, 1);
    }

    #[cfg(feature = "graphics")]
    #[test]
    fn draw_target_marks_drawn_pixels_dirty() {
        use embedded_graphics::pixelcolor::Rgb888;
        use embedded_graphics::prelude::*;
        use embedded_graphics::primitives::{Line, PrimitiveStyle};

        let (mut display, state) = make_display();
        Line::new(Point::new(3, 7), Point::new(12, 7))
            .into_styled(PrimitiveStyle::with_stroke(Rgb888::new(255, 255, 255), 1))
            .draw(&mut display)
            .unwrap();
        display.flush().unwrap();

        let state = state.borrow();
        assert_eq!(state.data_after(Cmd::CASET)[0], [0, 3, 0, 12]);
        assert_eq!(state.data_after(Cmd::PASET)[0], [0, 7, 0, 7]);
        assert_eq!(state.data_after(Cmd::RAMWR)[0].len(), 10 * 2);
    }
}
