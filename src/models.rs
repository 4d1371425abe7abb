//! Per-model panel descriptors.
//!
//! All supported controllers speak the same command and timing protocol;
//! models differ only in geometry, initialization table and whether the
//! panel wants inverted colors. A [`Panel`] is pure data handed to the
//! driver at construction time and replayed once through
//! [`crate::driver::Ili9xxx::setup`].
//!
//! Init tables are flat byte streams of records
//! `{command, arg_count, args...}` terminated by a zero command byte. The
//! high bit of the count byte requests a 150ms settle delay after the
//! command.

use crate::cmd::Cmd;
use crate::flag::Flag;

/// Immutable per-model panel data
#[derive(Clone, Copy, Debug)]
pub struct Panel {
    /// Human-readable model name, used in logs
    pub name: &'static str,
    /// Panel width in pixels
    pub width: u16,
    /// Panel height in pixels
    pub height: u16,
    /// Flat initialization command table
    pub init_sequence: &'static [u8],
    /// Whether the panel is driven with inverted colors
    pub invert_colors: bool,
}

/// M5Stack basic core display (ILI9342, landscape, inverted)
pub const M5STACK: Panel = Panel {
    name: "M5Stack",
    width: 320,
    height: 240,
    init_sequence: INITCMD_M5STACK,
    invert_colors: true,
};

/// Generic 2.4" 240x320 ILI9341 module
pub const ILI9341: Panel = Panel {
    name: "ILI9341",
    width: 240,
    height: 320,
    init_sequence: INITCMD_ILI9341,
    invert_colors: false,
};

/// ILI9342: same controller family as the 9341 rotated to landscape
pub const ILI9342: Panel = Panel {
    name: "ILI9342",
    width: 320,
    height: 240,
    init_sequence: INITCMD_ILI9341,
    invert_colors: false,
};

/// 3.5" 480x320 ILI9481 module
pub const ILI9481: Panel = Panel {
    name: "ILI9481",
    width: 480,
    height: 320,
    init_sequence: INITCMD_ILI9481,
    invert_colors: false,
};

/// 3.5" 480x320 ILI9486 module
pub const ILI9486: Panel = Panel {
    name: "ILI9486",
    width: 480,
    height: 320,
    init_sequence: INITCMD_ILI9486,
    invert_colors: false,
};

/// 4.0" 480x320 ILI9488 module
pub const ILI9488: Panel = Panel {
    name: "ILI9488",
    width: 480,
    height: 320,
    init_sequence: INITCMD_ILI9488,
    invert_colors: false,
};

/// 4.0" 480x320 ST7796 module
pub const ST7796: Panel = Panel {
    name: "ST7796",
    width: 480,
    height: 320,
    init_sequence: INITCMD_ST7796,
    invert_colors: false,
};

#[rustfmt::skip]
const INITCMD_ILI9341: &[u8] = &[
    0xEF, 3, 0x03, 0x80, 0x02,
    0xCF, 3, 0x00, 0xC1, 0x30,
    0xED, 4, 0x64, 0x03, 0x12, 0x81,
    0xE8, 3, 0x85, 0x00, 0x78,
    0xCB, 5, 0x39, 0x2C, 0x00, 0x34, 0x02,
    0xF7, 1, 0x20,
    0xEA, 2, 0x00, 0x00,
    Cmd::PWCTR1, 1, 0x23,
    Cmd::PWCTR2, 1, 0x10,
    Cmd::VMCTR1, 2, 0x3E, 0x28,
    Cmd::VMCTR2, 1, 0x86,
    Cmd::MADCTL, 1, Flag::MADCTL_MX | Flag::MADCTL_BGR,
    Cmd::VSCRSADD, 1, 0x00,
    Cmd::PIXFMT, 1, Flag::PIXFMT_16BIT,
    Cmd::FRMCTR1, 2, 0x00, 0x18,
    Cmd::DFUNCTR, 3, 0x08, 0x82, 0x27,
    0xF2, 1, 0x00,
    Cmd::GAMMASET, 1, 0x01,
    Cmd::GMCTRP1, 15, 0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08,
        0x4E, 0xF1, 0x37, 0x07, 0x10, 0x03, 0x0E, 0x09, 0x00,
    Cmd::GMCTRN1, 15, 0x00, 0x0E, 0x14, 0x03, 0x11, 0x07,
        0x31, 0xC1, 0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36, 0x0F,
    Cmd::SLPOUT, Flag::INIT_DELAY,
    Cmd::DISPON, Flag::INIT_DELAY,
    0x00,
];

#[rustfmt::skip]
const INITCMD_M5STACK: &[u8] = &[
    0xEF, 3, 0x03, 0x80, 0x02,
    0xCF, 3, 0x00, 0xC1, 0x30,
    0xED, 4, 0x64, 0x03, 0x12, 0x81,
    0xE8, 3, 0x85, 0x00, 0x78,
    0xCB, 5, 0x39, 0x2C, 0x00, 0x34, 0x02,
    0xF7, 1, 0x20,
    0xEA, 2, 0x00, 0x00,
    Cmd::PWCTR1, 1, 0x23,
    Cmd::PWCTR2, 1, 0x10,
    Cmd::VMCTR1, 2, 0x3E, 0x28,
    Cmd::VMCTR2, 1, 0x86,
    Cmd::MADCTL, 1, Flag::MADCTL_BGR,
    Cmd::VSCRSADD, 1, 0x00,
    Cmd::PIXFMT, 1, Flag::PIXFMT_16BIT,
    Cmd::FRMCTR1, 2, 0x00, 0x13,
    Cmd::DFUNCTR, 3, 0x08, 0x82, 0x27,
    0xF2, 1, 0x00,
    Cmd::GAMMASET, 1, 0x01,
    Cmd::GMCTRP1, 15, 0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08,
        0x4E, 0xF1, 0x37, 0x07, 0x10, 0x03, 0x0E, 0x09, 0x00,
    Cmd::GMCTRN1, 15, 0x00, 0x0E, 0x14, 0x03, 0x11, 0x07,
        0x31, 0xC1, 0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36, 0x0F,
    Cmd::SLPOUT, Flag::INIT_DELAY,
    Cmd::DISPON, Flag::INIT_DELAY,
    0x00,
];

#[rustfmt::skip]
const INITCMD_ILI9481: &[u8] = &[
    Cmd::SLPOUT, Flag::INIT_DELAY,
    0xD0, 3, 0x07, 0x42, 0x18,                  // power setting
    0xD1, 3, 0x00, 0x07, 0x10,                  // VCOM control
    0xD2, 2, 0x01, 0x02,                        // power setting, normal mode
    Cmd::PWCTR1, 5, 0x10, 0x3B, 0x00, 0x02, 0x11,
    Cmd::VMCTR1, 1, 0x03,
    0xC8, 12, 0x00, 0x32, 0x36, 0x45, 0x06, 0x16,
        0x37, 0x75, 0x77, 0x54, 0x0C, 0x00,     // gamma setting
    Cmd::MADCTL, 1, 0x0A,
    Cmd::PIXFMT, 1, Flag::PIXFMT_16BIT,
    Cmd::CASET, 4, 0x00, 0x00, 0x01, 0x3F,
    Cmd::PASET, 4, 0x00, 0x00, 0x01, 0xDF,
    Cmd::DISPON, Flag::INIT_DELAY,
    0x00,
];

#[rustfmt::skip]
const INITCMD_ILI9486: &[u8] = &[
    Cmd::SLPOUT, Flag::INIT_DELAY,
    Cmd::PIXFMT, 1, Flag::PIXFMT_16BIT,
    Cmd::PWCTR3, 1, 0x44,
    Cmd::VMCTR1, 4, 0x00, 0x00, 0x00, 0x00,
    Cmd::GMCTRP1, 15, 0x0F, 0x1F, 0x1C, 0x0C, 0x0F, 0x08,
        0x48, 0x98, 0x37, 0x0A, 0x13, 0x04, 0x11, 0x0D, 0x00,
    Cmd::GMCTRN1, 15, 0x0F, 0x32, 0x2E, 0x0B, 0x0D, 0x05,
        0x47, 0x75, 0x37, 0x06, 0x10, 0x03, 0x24, 0x20, 0x00,
    Cmd::INVOFF, Flag::INIT_DELAY,
    Cmd::MADCTL, 1, Flag::MADCTL_MX | Flag::MADCTL_BGR,
    Cmd::DISPON, Flag::INIT_DELAY,
    0x00,
];

#[rustfmt::skip]
const INITCMD_ILI9488: &[u8] = &[
    Cmd::GMCTRP1, 15, 0x00, 0x03, 0x09, 0x08, 0x16, 0x0A,
        0x3F, 0x78, 0x4C, 0x09, 0x0A, 0x08, 0x16, 0x1A, 0x0F,
    Cmd::GMCTRN1, 15, 0x00, 0x16, 0x19, 0x03, 0x0F, 0x05,
        0x32, 0x45, 0x46, 0x04, 0x0E, 0x0D, 0x35, 0x37, 0x0F,
    Cmd::PWCTR1, 2, 0x17, 0x15,
    Cmd::PWCTR2, 1, 0x41,
    Cmd::VMCTR1, 3, 0x00, 0x12, 0x80,
    Cmd::MADCTL, 1, Flag::MADCTL_MX | Flag::MADCTL_BGR,
    Cmd::PIXFMT, 1, Flag::PIXFMT_16BIT,
    0xB0, 1, 0x80,                              // interface mode: SDO not used
    Cmd::FRMCTR1, 1, 0xA0,
    Cmd::INVCTR, 1, 0x02,
    Cmd::DFUNCTR, 2, 0x02, 0x02,
    0xE9, 1, 0x00,                              // disable 24-bit data
    0xF7, 4, 0xA9, 0x51, 0x2C, 0x82,            // adjust control
    Cmd::SLPOUT, Flag::INIT_DELAY,
    Cmd::DISPON, Flag::INIT_DELAY,
    0x00,
];

#[rustfmt::skip]
const INITCMD_ST7796: &[u8] = &[
    Cmd::CSCON, 1, 0xC3,                        // unlock command part 2
    Cmd::CSCON, 1, 0x96,
    Cmd::MADCTL, 1, Flag::MADCTL_MX | Flag::MADCTL_BGR,
    Cmd::PIXFMT, 1, Flag::PIXFMT_16BIT,
    Cmd::INVCTR, 1, 0x01,
    Cmd::DFUNCTR, 3, 0x80, 0x02, 0x3B,
    0xE8, 8, 0x40, 0x8A, 0x00, 0x00, 0x29, 0x19, 0xA5, 0x33,
    Cmd::PWCTR2, 1, 0x06,
    Cmd::PWCTR3, 1, 0xA7,
    Cmd::VMCTR1, 1, 0x18,
    Cmd::GMCTRP1, 14, 0xF0, 0x09, 0x0B, 0x06, 0x04, 0x15,
        0x2F, 0x54, 0x42, 0x3C, 0x17, 0x14, 0x18, 0x1B,
    Cmd::GMCTRN1, 14, 0xE0, 0x09, 0x0B, 0x06, 0x04, 0x03,
        0x2B, 0x43, 0x42, 0x3B, 0x16, 0x14, 0x17, 0x1B,
    Cmd::CSCON, 1, 0x3C,                        // relock
    Cmd::CSCON, 1, 0x69,
    Cmd::SLPOUT, Flag::INIT_DELAY,
    Cmd::DISPON, Flag::INIT_DELAY,
    0x00,
];
