//! Canonical colors and the per-mode pixel codecs.
//!
//! The framebuffer stores pixels in one of three encodings; the panel itself
//! only ever receives big-endian RGB565. Conversions are lossy by bit width
//! (5/6/5 or 3/3/2 truncation) and never fail.

/// Number of bytes in an RGB888 palette table (256 entries x 3 bytes).
pub const PALETTE_LEN: usize = 768;

/// A canonical 24-bit RGB color, encoding-agnostic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    /// Red channel, 0-255
    pub r: u8,
    /// Green channel, 0-255
    pub g: u8,
    /// Blue channel, 0-255
    pub b: u8,
}

impl Color {
    /// Pure black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Pure white
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Create a color from its 8-bit channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into RGB565. The low 3/2/3 channel bits are truncated.
    pub const fn to_rgb565(self) -> u16 {
        ((self.r as u16 & 0xF8) << 8) | ((self.g as u16 & 0xFC) << 3) | (self.b as u16 >> 3)
    }

    /// Pack into RGB332. The low 5/5/6 channel bits are truncated.
    pub const fn to_rgb332(self) -> u8 {
        (self.r & 0xE0) | ((self.g & 0xE0) >> 3) | (self.b >> 6)
    }

    /// Nearest-match index into a 256-entry RGB888 palette table.
    pub fn to_index8(self, palette: &[u8; PALETTE_LEN]) -> u8 {
        let mut best = 0u8;
        let mut best_dist = u32::MAX;
        for i in 0..256 {
            let entry = Color::rgb(palette[i * 3], palette[i * 3 + 1], palette[i * 3 + 2]);
            let dr = i32::from(self.r) - i32::from(entry.r);
            let dg = i32::from(self.g) - i32::from(entry.g);
            let db = i32::from(self.b) - i32::from(entry.b);
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best_dist = dist;
                best = i as u8;
                if dist == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Expand an RGB565 value back to 24 bits, replicating the high bits into
    /// the truncated low bits.
    pub const fn from_rgb565(raw: u16) -> Self {
        let r5 = ((raw >> 11) & 0x1F) as u8;
        let g6 = ((raw >> 5) & 0x3F) as u8;
        let b5 = (raw & 0x1F) as u8;
        Color {
            r: (r5 << 3) | (r5 >> 2),
            g: (g6 << 2) | (g6 >> 4),
            b: (b5 << 3) | (b5 >> 2),
        }
    }

    /// Expand an RGB332 value back to 24 bits
    pub const fn from_rgb332(raw: u8) -> Self {
        let r3 = raw >> 5;
        let g3 = (raw >> 2) & 0x07;
        let b2 = raw & 0x03;
        Color {
            r: (r3 << 5) | (r3 << 2) | (r3 >> 1),
            g: (g3 << 5) | (g3 << 2) | (g3 >> 1),
            b: (b2 << 6) | (b2 << 4) | (b2 << 2) | b2,
        }
    }

    /// Look a palette index back up as a 24-bit color
    pub fn from_index8(index: u8, palette: &[u8; PALETTE_LEN]) -> Self {
        let i = index as usize * 3;
        Color::rgb(palette[i], palette[i + 1], palette[i + 2])
    }
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics::pixelcolor::Rgb888> for Color {
    fn from(c: embedded_graphics::pixelcolor::Rgb888) -> Self {
        use embedded_graphics::prelude::RgbColor;
        Color::rgb(c.r(), c.g(), c.b())
    }
}

/// The in-memory byte layout used for one pixel of the framebuffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// One byte per pixel, index into an RGB888 palette
    Indexed8,
    /// One byte per pixel, direct RGB332
    Rgb332,
    /// Two bytes per pixel, big-endian RGB565 (stored wire-ready)
    #[default]
    Rgb565,
}

impl ColorMode {
    /// Framebuffer bytes used by one pixel in this mode
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorMode::Indexed8 | ColorMode::Rgb332 => 1,
            ColorMode::Rgb565 => 2,
        }
    }
}

/// Fallback palette for [`ColorMode::Indexed8`]: entry `i` is the RGB888
/// expansion of `i` interpreted as RGB332. Callers with real image palettes
/// should provide their own table.
pub const DEFAULT_PALETTE: [u8; PALETTE_LEN] = build_default_palette();

const fn build_default_palette() -> [u8; PALETTE_LEN] {
    let mut table = [0u8; PALETTE_LEN];
    let mut i = 0;
    while i < 256 {
        let c = Color::from_rgb332(i as u8);
        table[i * 3] = c.r;
        table[i * 3 + 1] = c.g;
        table[i * 3 + 2] = c.b;
        i += 1;
    }
    table
}
