//! 16-bit panel colors and their 18-bit wire encoding

/// A packed 5-6-5 color as used throughout the drawing API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u16);

/// The three bytes the controller expects per pixel in 18-bit mode.
///
/// Each channel is top-aligned, the bits below the channel width are zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct DeviceColor(pub [u8; 3]);

#[allow(missing_docs)]
impl Color {
    pub const BLACK: Color = Color(0x0000);
    pub const WHITE: Color = Color(0xFFFF);
    pub const BLUE: Color = Color(0x001F);
    pub const GREEN: Color = Color(0x07E0);
    pub const RED: Color = Color(0xF800);
    pub const NAVY: Color = Color(0x000F);
    pub const DARK_BLUE: Color = Color(0x0011);
    pub const DARK_GREEN: Color = Color(0x03E0);
    pub const DARK_CYAN: Color = Color(0x03EF);
    pub const CYAN: Color = Color(0x07FF);
    pub const TURQUOISE: Color = Color(0x471A);
    pub const INDIGO: Color = Color(0x4810);
    pub const DARK_RED: Color = Color(0x8000);
    pub const OLIVE: Color = Color(0x7BE0);
    pub const GRAY: Color = Color(0x8410);
    pub const SKY_BLUE: Color = Color(0x867D);
    pub const BLUE_VIOLET: Color = Color(0x895C);
    pub const LIGHT_GREEN: Color = Color(0x9772);
    pub const DARK_VIOLET: Color = Color(0x901A);
    pub const YELLOW_GREEN: Color = Color(0x9E66);
    pub const BROWN: Color = Color(0xA145);
    pub const DARK_GRAY: Color = Color(0x7BEF);
    pub const SIENNA: Color = Color(0xA285);
    pub const LIGHT_BLUE: Color = Color(0xAEDC);
    pub const GREEN_YELLOW: Color = Color(0xAFE5);
    pub const SILVER: Color = Color(0xC618);
    pub const LIGHT_CYAN: Color = Color(0xE7FF);
    pub const VIOLET: Color = Color(0xEC1D);
    pub const AZURE: Color = Color(0xF7FF);
    pub const BEIGE: Color = Color(0xF7BB);
    pub const MAGENTA: Color = Color(0xF81F);
    pub const TOMATO: Color = Color(0xFB08);
    pub const GOLD: Color = Color(0xFEA0);
    pub const ORANGE: Color = Color(0xFD20);
    pub const SNOW: Color = Color(0xFFDF);
    pub const YELLOW: Color = Color(0xFFE0);
}

impl Color {
    /// Pack 8-bit channels into 5-6-5, dropping the low bits of each channel.
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        let r = ((r as u16) >> 3) & 0x1F;
        let g = ((g as u16) >> 2) & 0x3F;
        let b = ((b as u16) >> 3) & 0x1F;
        Color((r << 11) | (g << 5) | b)
    }

    /// 5-bit red channel
    pub const fn red(self) -> u8 {
        (self.0 >> 11) as u8 & 0x1F
    }

    /// 6-bit green channel
    pub const fn green(self) -> u8 {
        (self.0 >> 5) as u8 & 0x3F
    }

    /// 5-bit blue channel
    pub const fn blue(self) -> u8 {
        self.0 as u8 & 0x1F
    }

    /// Convert to the controller's 18-bit color format.
    pub const fn to_device(self) -> DeviceColor {
        DeviceColor([self.red() << 3, self.green() << 2, self.blue() << 3])
    }
}

impl From<u16> for Color {
    fn from(raw: u16) -> Self {
        Color(raw)
    }
}

impl From<Color> for DeviceColor {
    fn from(color: Color) -> Self {
        color.to_device()
    }
}

impl DeviceColor {
    /// Wire bytes in transmission order
    pub const fn bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

#[cfg(feature = "graphics")]
mod graphics {
    use super::Color;
    use embedded_graphics::pixelcolor::{raw::RawU16, Rgb565};
    use embedded_graphics::prelude::RawData;

    impl From<Rgb565> for Color {
        fn from(color: Rgb565) -> Self {
            Color(RawU16::from(color).into_inner())
        }
    }

    impl From<Color> for Rgb565 {
        fn from(color: Color) -> Self {
            Rgb565::from(RawU16::new(color.0))
        }
    }
}
