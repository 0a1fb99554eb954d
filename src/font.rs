//! Glyph bitmaps for text rendering
//!
//! Text is drawn from fixed 8×13 cells. Where the bitmaps come from is up to
//! the caller: any [`GlyphSource`] will do. [`GlyphTable`] wraps a plain
//! array of row bytes, and with the `graphics` feature [`MonoFontGlyphs`]
//! reads them out of an `embedded-graphics` mono font.
use crate::error::Error;

/// Glyph cell width in pixels
pub const GLYPH_WIDTH: u32 = 8;
/// Glyph cell height in pixels
pub const GLYPH_HEIGHT: u32 = 13;
/// Horizontal distance between two characters of a string, at scale 1
pub const GLYPH_ADVANCE: u32 = 9;

const ROWS: usize = GLYPH_HEIGHT as usize;

/// An 8×13 bit matrix. Row 0 is the top row, bit 7 of a row byte is the
/// leftmost column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Glyph {
    rows: [u8; ROWS],
}

impl Glyph {
    /// A cell with no pixels set
    pub const BLANK: Glyph = Glyph { rows: [0; ROWS] };

    /// Build a glyph from its row bytes
    pub const fn new(rows: [u8; ROWS]) -> Self {
        Self { rows }
    }

    /// Row bytes, top to bottom
    pub fn rows(&self) -> &[u8; ROWS] {
        &self.rows
    }

    /// Whether the pixel at `col` (0..8), `row` (0..13) is set
    pub fn is_set(&self, col: u32, row: u32) -> bool {
        col < GLYPH_WIDTH
            && (row as usize) < ROWS
            && self.rows[row as usize] & (0x80 >> col) != 0
    }
}

/// Where glyph bitmaps are looked up.
pub trait GlyphSource {
    /// Bitmap of `c`, or [`Error::UnsupportedGlyph`]
    fn glyph(&self, c: char) -> Result<Glyph, Error>;
}

impl<T: GlyphSource + ?Sized> GlyphSource for &T {
    fn glyph(&self, c: char) -> Result<Glyph, Error> {
        T::glyph(self, c)
    }
}

/// Consecutive glyphs indexed by character code.
#[derive(Clone, Copy, Debug)]
pub struct GlyphTable<'a> {
    first: u32,
    glyphs: &'a [[u8; ROWS]],
}

impl<'a> GlyphTable<'a> {
    /// Table whose first entry is the space character (code 32)
    pub const fn new(glyphs: &'a [[u8; ROWS]]) -> Self {
        Self::starting_at(' ', glyphs)
    }

    /// Table whose first entry is `first`
    pub const fn starting_at(first: char, glyphs: &'a [[u8; ROWS]]) -> Self {
        Self {
            first: first as u32,
            glyphs,
        }
    }
}

impl GlyphSource for GlyphTable<'_> {
    fn glyph(&self, c: char) -> Result<Glyph, Error> {
        (c as u32)
            .checked_sub(self.first)
            .and_then(|index| self.glyphs.get(index as usize))
            .map(|rows| Glyph::new(*rows))
            .ok_or(Error::UnsupportedGlyph(c))
    }
}

#[cfg(feature = "graphics")]
pub use self::mono::{MonoFontGlyphs, DEFAULT_FONT};

#[cfg(feature = "graphics")]
mod mono {
    use super::{Glyph, GlyphSource, GLYPH_HEIGHT, GLYPH_WIDTH, ROWS};
    use crate::error::Error;
    use embedded_graphics::image::GetPixel;
    use embedded_graphics::mono_font::{ascii::FONT_8X13, MonoFont};
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::{OriginDimensions, Point};

    /// The `embedded-graphics` 8×13 ASCII font
    pub const DEFAULT_FONT: MonoFontGlyphs<'static> = MonoFontGlyphs::new(&FONT_8X13);

    /// Glyphs read out of an `embedded-graphics` [`MonoFont`].
    ///
    /// Fonts larger than 8×13 are cropped to the top-left of each character.
    /// Characters the font maps to its replacement glyph are reported as
    /// unsupported.
    #[derive(Clone, Copy)]
    pub struct MonoFontGlyphs<'a> {
        font: &'a MonoFont<'a>,
    }

    impl<'a> MonoFontGlyphs<'a> {
        /// Wrap a mono font
        pub const fn new(font: &'a MonoFont<'a>) -> Self {
            Self { font }
        }
    }

    impl GlyphSource for MonoFontGlyphs<'_> {
        fn glyph(&self, c: char) -> Result<Glyph, Error> {
            let font = self.font;
            let index = font.glyph_mapping.index(c);
            if index == font.glyph_mapping.index(char::REPLACEMENT_CHARACTER) && c != '?' {
                return Err(Error::UnsupportedGlyph(c));
            }

            let char_size = font.character_size;
            let glyphs_per_row = (font.image.size().width / char_size.width).max(1);
            let index = index as u32;
            let origin_x = (index % glyphs_per_row) * char_size.width;
            let origin_y = (index / glyphs_per_row) * char_size.height;

            let mut rows = [0u8; ROWS];
            for (row, bits) in rows
                .iter_mut()
                .enumerate()
                .take(char_size.height.min(GLYPH_HEIGHT) as usize)
            {
                for col in 0..char_size.width.min(GLYPH_WIDTH) {
                    let p = Point::new((origin_x + col) as i32, (origin_y + row as u32) as i32);
                    if font.image.pixel(p) == Some(BinaryColor::On) {
                        *bits |= 0x80 >> col;
                    }
                }
            }
            Ok(Glyph::new(rows))
        }
    }
}
