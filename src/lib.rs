//! ILI9xxx / ST7796 SPI TFT Display Driver
//!
//! Buffered driver for the ILI9341/9342/9481/9486/9488 and ST7796 family of
//! SPI display controllers, including the M5Stack core display. The
//! controllers share one command and timing protocol; models differ only in
//! geometry and initialization data, so a single driver is parameterized by
//! a [`models::Panel`] descriptor.
//!
//! ## Architecture
//!
//! Drawing goes into an in-memory framebuffer in one of three encodings
//! (palette-indexed, RGB332 or RGB565). The driver tracks the bounding
//! window of changed pixels and, on [`driver::Ili9xxx::flush`], sends only
//! that window to the panel, converting buffer pixels to big-endian RGB565
//! through a small fixed staging buffer.
//!
//! ## Usage
//!
//! ```rust, ignore
//! use ili9xxx::models;
//! use ili9xxx::prelude::*;
//!
//! let mut display = Ili9xxx::new(spi_device, dc, Some(rst), Some(backlight), models::ILI9341);
//! display.setup(&mut delay)?;
//!
//! display.fill(Color::BLACK);
//! display.write_pixel(10, 20, Color::rgb(255, 0, 0));
//! display.flush()?;
//! ```
//!
//! With the `graphics` feature (default) the driver is an
//! [embedded-graphics](https://docs.rs/embedded-graphics) `DrawTarget` over
//! 24-bit color:
//!
//! ```rust, ignore
//! use embedded_graphics::{pixelcolor::Rgb888, prelude::*, primitives::*};
//!
//! Rectangle::new(Point::new(10, 10), Size::new(50, 30))
//!     .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
//!     .draw(&mut display)?;
//! display.flush()?;
//! ```
#![no_std]
#![deny(missing_docs)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;

mod cmd;
pub mod color;
pub mod driver;
mod flag;
pub mod interface;
pub mod models;
pub mod window;

/// Useful exports
pub mod prelude {
    pub use crate::color::{Color, ColorMode};
    pub use crate::driver::{Error, Ili9xxx};
    pub use crate::models::Panel;
}
