//! RGB565 bitmaps
use crate::color::Color;
use crate::error::Error;

/// A borrowed row-major RGB565 image.
///
/// In word form a bitmap is laid out as `[width, height, pixels...]`, the
/// format image converters emit for this controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bitmap<'a> {
    width: u16,
    height: u16,
    pixels: &'a [u16],
}

impl<'a> Bitmap<'a> {
    /// Bitmap from separate dimensions and `width * height` pixels
    pub fn new(width: u16, height: u16, pixels: &'a [u16]) -> Result<Self, Error> {
        if width == 0 || height == 0 || pixels.len() != usize::from(width) * usize::from(height) {
            return Err(Error::InvalidBitmap);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Bitmap from `[width, height, pixels...]`
    pub fn from_words(words: &'a [u16]) -> Result<Self, Error> {
        match words {
            [width, height, pixels @ ..] => Self::new(*width, *height, pixels),
            _ => Err(Error::InvalidBitmap),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Pixel at `col`, `row`
    pub fn pixel(&self, col: u16, row: u16) -> Option<Color> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let index = usize::from(row) * usize::from(self.width) + usize::from(col);
        self.pixels.get(index).copied().map(Color)
    }

    /// Pixels of row `row`, left to right
    pub fn row(&self, row: u16) -> &'a [u16] {
        let width = usize::from(self.width);
        let start = usize::from(row) * width;
        self.pixels.get(start..start + width).unwrap_or(&[])
    }
}
