//! `embedded-graphics` support
//!
//! The driver draws straight to the panel, there is no frame buffer.
//! Contiguous fills become one window each, individual pixels one window per
//! pixel. Anything outside the panel is clipped.
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::color::Color;
use crate::driver::Ili9488;
use crate::error::Error;
use crate::font::GlyphSource;
use crate::interface::DisplayBus;
use crate::staging::Staging;

impl<DI, S, F> OriginDimensions for Ili9488<DI, S, F>
where
    DI: DisplayBus,
    S: Staging<DI>,
    F: GlyphSource,
{
    fn size(&self) -> Size {
        let (width, height) = self.orientation().size();
        Size::new(u32::from(width), u32::from(height))
    }
}

// Corners of the part of `area` that is on the panel.
fn visible(area: &Rectangle, bounds: &Rectangle) -> Option<(Rectangle, [u16; 4])> {
    let drawable = area.intersection(bounds);
    let bottom_right = drawable.bottom_right()?;
    let top_left = drawable.top_left;
    Some((
        drawable,
        [
            top_left.x as u16,
            top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        ],
    ))
}

impl<DI, S, F> DrawTarget for Ili9488<DI, S, F>
where
    DI: DisplayBus,
    S: Staging<DI>,
    F: GlyphSource,
{
    type Color = Rgb565;
    type Error = Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if bounds.contains(point) {
                self.draw_pixel(point.x as u16, point.y as u16, color.into())?;
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let Some((drawable, [x1, y1, x2, y2])) = visible(area, &self.bounding_box()) else {
            return Ok(());
        };
        // row-major order of the clipped area is the filtered order
        let colors = area
            .points()
            .zip(colors)
            .filter(|(point, _)| drawable.contains(*point))
            .map(|(_, color)| Color::from(color));
        self.write_pixels(x1, y1, x2, y2, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let Some((_, [x1, y1, x2, y2])) = visible(area, &self.bounding_box()) else {
            return Ok(());
        };
        self.fill_rectangle(x1, y1, x2, y2, color.into())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let (width, height) = self.orientation().size();
        self.fill_rectangle(0, 0, width - 1, height - 1, color.into())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::driver::Config;
    use crate::font::{MonoFontGlyphs, DEFAULT_FONT};
    use crate::mock::MockBus;
    use crate::staging::SingleBuffer;
    use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
    use embedded_graphics::primitives::{Line, PrimitiveStyle};
    use embedded_graphics::text::Text;
    use std::vec::Vec;

    type TestDisplay = Ili9488<MockBus, SingleBuffer<96>, MonoFontGlyphs<'static>>;

    fn test_display() -> TestDisplay {
        Ili9488::new(
            MockBus::new(),
            SingleBuffer::new(),
            DEFAULT_FONT,
            Config::default(),
        )
    }

    fn bus(display: TestDisplay) -> MockBus {
        display.release().0
    }

    fn pixels(bus: &MockBus) -> Vec<Color> {
        bus.pixel_bytes()
            .chunks(3)
            .map(|px| {
                Color(
                    (u16::from(px[0]) << 8) | (u16::from(px[1]) << 3) | (u16::from(px[2]) >> 3),
                )
            })
            .collect()
    }

    #[test]
    fn reports_panel_size() {
        let display = test_display();
        assert_eq!(display.bounding_box().size, Size::new(480, 320));
    }

    #[test]
    fn filled_rectangle_is_one_window() {
        let mut display = test_display();
        Rectangle::new(Point::new(10, 20), Size::new(30, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut display)
            .unwrap();

        let bus = bus(display);
        assert_eq!(bus.windows(), [(10, 20, 39, 23)]);
        assert_eq!(pixels(&bus).len(), 120);
        assert!(pixels(&bus).iter().all(|c| *c == Color::RED));
    }

    #[test]
    fn fills_are_clipped_to_the_panel() {
        let mut display = test_display();
        display
            .fill_solid(
                &Rectangle::new(Point::new(470, 300), Size::new(20, 30)),
                Rgb565::BLUE,
            )
            .unwrap();
        display
            .fill_solid(
                &Rectangle::new(Point::new(-50, -50), Size::new(10, 10)),
                Rgb565::BLUE,
            )
            .unwrap();
        assert_eq!(bus(display).windows(), [(470, 300, 479, 319)]);
    }

    #[test]
    fn contiguous_fill_drops_clipped_colors() {
        let mut display = test_display();
        let colors = [Color(1), Color(2), Color(3), Color(4), Color(5), Color(6)];
        display
            .fill_contiguous(
                &Rectangle::new(Point::new(-1, 0), Size::new(3, 2)),
                colors.iter().map(|&c| Rgb565::from(c)),
            )
            .unwrap();

        let bus = bus(display);
        assert_eq!(bus.windows(), [(0, 0, 1, 1)]);
        assert_eq!(pixels(&bus), [Color(2), Color(3), Color(5), Color(6)]);
    }

    #[test]
    fn draw_iter_skips_points_off_the_panel() {
        let mut display = test_display();
        display
            .draw_iter([
                Pixel(Point::new(-1, 5), Rgb565::GREEN),
                Pixel(Point::new(479, 319), Rgb565::GREEN),
                Pixel(Point::new(480, 0), Rgb565::GREEN),
            ])
            .unwrap();
        assert_eq!(bus(display).windows(), [(479, 319, 479, 319)]);
    }

    #[test]
    fn lines_become_pixels() {
        let mut display = test_display();
        Line::new(Point::new(0, 0), Point::new(3, 0))
            .into_styled(PrimitiveStyle::with_stroke(Rgb565::WHITE, 1))
            .draw(&mut display)
            .unwrap();
        assert_eq!(pixels(&bus(display)).len(), 4);
    }

    #[test]
    fn text_renders_through_the_target() {
        let mut display = test_display();
        let style = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
        Text::new("Hi", Point::new(5, 20), style)
            .draw(&mut display)
            .unwrap();
        let bus = bus(display);
        assert!(!bus.windows().is_empty());
        assert!(pixels(&bus).iter().all(|c| *c == Color::WHITE));
    }

    #[test]
    fn clear_covers_the_panel() {
        let mut display = test_display();
        DrawTarget::clear(&mut display, Rgb565::BLACK).unwrap();
        assert_eq!(bus(display).windows(), [(0, 0, 479, 319)]);
    }
}
