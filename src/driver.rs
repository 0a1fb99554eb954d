//! Driver for streaming pixels to an ILI9488 controller
use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

use crate::bitmap::Bitmap;
use crate::color::{Color, DeviceColor};
use crate::error::Error;
use crate::font::{Glyph, GlyphSource, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::interface::DisplayBus;
use crate::staging::Staging;
use crate::window::{set_window, DrawWindow};
use crate::{cmd::Cmd, flag::Flag};
use crate::{MAX_HEIGHT, MAX_WIDTH};

/// Vendor bring-up script: gamma, power, VCOM, 18-bit pixels, frame rate,
/// then sleep out, inversion on, display on.
pub const DEFAULT_INIT_SEQUENCE: &[InitStep] = &[
    InitStep::HardReset,
    InitStep::CmdData(
        Cmd::POSITIVE_GAMMA,
        &[
            0x00, 0x13, 0x18, 0x04, 0x0F, 0x06, 0x3A, 0x56, 0x4D, 0x03, 0x0A, 0x06, 0x30, 0x3E,
            0x0F,
        ],
    ),
    InitStep::CmdData(
        Cmd::NEGATIVE_GAMMA,
        &[
            0x00, 0x13, 0x18, 0x01, 0x11, 0x06, 0x38, 0x34, 0x4D, 0x06, 0x0D, 0x0B, 0x31, 0x37,
            0x0F,
        ],
    ),
    InitStep::CmdData(Cmd::POWER_CTRL1, &[0x18, 0x16]),
    InitStep::CmdData(Cmd::POWER_CTRL2, &[0x45]),
    InitStep::CmdData(Cmd::VCOM_CTRL, &[0x00, 0x63, 0x01]),
    InitStep::MemoryAccess,
    InitStep::CmdData(Cmd::PIXEL_FORMAT, &[Flag::PIXEL_FORMAT_18BIT]),
    InitStep::CmdData(Cmd::INTERFACE_MODE_CTRL, &[Flag::INTERFACE_SDO_DISABLED]),
    // 70 Hz
    InitStep::CmdData(Cmd::FRAME_RATE_CTRL, &[0x00, 0x10]),
    InitStep::CmdData(Cmd::INVERSION_CTRL, &[Flag::DISPLAY_INVERSION_2DOT]),
    InitStep::CmdData(Cmd::DISPLAY_FUNCTION_CTRL, &[0x02]),
    InitStep::CmdData(Cmd::SET_IMAGE_FUNCTION, &[0x00]),
    InitStep::CmdData(Cmd::ADJUST_CTRL3, &[0xA9, 0x51, 0x2C, 0x82]),
    InitStep::Cmd(Cmd::SLEEP_OUT),
    InitStep::DelayMs(120),
    // most panels ship with inverted colors
    InitStep::Cmd(Cmd::INVERSION_ON),
    InitStep::DelayMs(120),
    InitStep::Cmd(Cmd::DISPLAY_ON),
];

/// Steps that a panel-specific init sequence can contain.
/// Keep variants minimal so sequences can live in static arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStep {
    /// Pulse the RST line
    HardReset,
    /// Wait for the given number of milliseconds
    DelayMs(u8),
    /// Send a bare command byte
    Cmd(u8),
    /// Send a command with a static data slice
    CmdData(u8, &'static [u8]),
    /// Send MEMORY_ACCESS_CTRL for the configured [`Orientation`]
    MemoryAccess,
}

/// Scan direction of the panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// 480 columns × 320 rows
    #[default]
    Landscape,
    /// 320 columns × 480 rows
    Portrait,
}

impl Orientation {
    /// MEMORY_ACCESS_CTRL value selecting this orientation
    pub fn madctl(self) -> u8 {
        match self {
            Orientation::Landscape => Flag::MADCTL_LANDSCAPE,
            Orientation::Portrait => Flag::MADCTL_PORTRAIT,
        }
    }

    /// Panel (width, height) in this orientation
    pub fn size(self) -> (u16, u16) {
        match self {
            Orientation::Landscape => (MAX_WIDTH, MAX_HEIGHT),
            Orientation::Portrait => (MAX_HEIGHT, MAX_WIDTH),
        }
    }
}

/// Driver settings fixed at construction time.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Orientation set up by [`InitStep::MemoryAccess`]
    pub orientation: Orientation,
    /// Panel-specific bring-up script
    pub init_sequence: &'static [InitStep],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            init_sequence: DEFAULT_INIT_SEQUENCE,
        }
    }
}

/// A configured display with a bus interface, a staging strategy and a font.
///
/// Every drawing call addresses one window and streams its pixels in
/// row-major order. Calls take `&mut self`, so two streams can never
/// interleave.
pub struct Ili9488<DI, S, F> {
    interface: DI,
    staging: S,
    font: F,
    orientation: Orientation,
    init_sequence: &'static [InitStep],
}

/// Hands pixels of one stream to the staging strategy.
struct PixelSink<'a, DI, S> {
    bus: &'a mut DI,
    staging: &'a mut S,
}

impl<DI: DisplayBus, S: Staging<DI>> PixelSink<'_, DI, S> {
    fn push(&mut self, color: DeviceColor) -> Result<(), Error> {
        self.staging.push(self.bus, color)
    }

    fn push_repeated(&mut self, color: DeviceColor, count: u32) -> Result<(), Error> {
        self.staging.push_repeated(self.bus, color, count)
    }
}

fn check_scale(scale: u8) -> Result<u32, Error> {
    if scale == 0 {
        return Err(Error::InvalidScale);
    }
    Ok(u32::from(scale))
}

impl<DI, S, F> Ili9488<DI, S, F>
where
    DI: DisplayBus,
    S: Staging<DI>,
    F: GlyphSource,
{
    /// Create the driver. Nothing is sent until [`init`](Self::init).
    pub fn new(interface: DI, staging: S, font: F, config: Config) -> Self {
        debug!(
            "creating new Ili9488 instance ({:?}, {} init steps)",
            config.orientation,
            config.init_sequence.len()
        );
        Self {
            interface,
            staging,
            font,
            orientation: config.orientation,
            init_sequence: config.init_sequence,
        }
    }

    /// Give back the interface, the staging strategy and the font
    pub fn release(self) -> (DI, S, F) {
        (self.interface, self.staging, self.font)
    }

    /// Run the init sequence
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
        debug!("initializing ili9488");
        self.staging.ready()?;
        for step in self.init_sequence {
            debug!("init step: {:?}", step);
            match *step {
                InitStep::HardReset => self.interface.hard_reset(delay)?,
                InitStep::DelayMs(ms) => delay.delay_ms(u32::from(ms)),
                InitStep::Cmd(c) => self.interface.cmd(c)?,
                InitStep::CmdData(c, d) => self.interface.cmd_with_data(c, d)?,
                InitStep::MemoryAccess => self
                    .interface
                    .cmd_with_data(Cmd::MEMORY_ACCESS_CTRL, &[self.orientation.madctl()])?,
            }
        }
        debug!("init sequence complete");
        Ok(())
    }

    /// Switch between landscape and portrait
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), Error> {
        debug!("setting orientation {:?}", orientation);
        self.command(Cmd::MEMORY_ACCESS_CTRL, &[orientation.madctl()])?;
        self.orientation = orientation;
        Ok(())
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Panel (width, height) in the current orientation
    pub fn size(&self) -> (u16, u16) {
        self.orientation.size()
    }

    /// Turn color inversion on or off
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), Error> {
        let c = if inverted {
            Cmd::INVERSION_ON
        } else {
            Cmd::INVERSION_OFF
        };
        self.command(c, &[])
    }

    /// Blank or unblank the panel. Frame memory is kept.
    pub fn set_display_on(&mut self, on: bool) -> Result<(), Error> {
        let c = if on { Cmd::DISPLAY_ON } else { Cmd::DISPLAY_OFF };
        self.command(c, &[])
    }

    /// Enter sleep mode
    pub fn sleep(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
        debug!("entering sleep");
        self.command(Cmd::SLEEP_IN, &[])?;
        delay.delay_ms(5);
        Ok(())
    }

    /// Leave sleep mode
    pub fn wake(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
        debug!("leaving sleep");
        self.command(Cmd::SLEEP_OUT, &[])?;
        delay.delay_ms(120);
        Ok(())
    }

    fn command(&mut self, command: u8, data: &[u8]) -> Result<(), Error> {
        self.staging.ready()?;
        self.interface.cmd_with_data(command, data)?;
        Ok(())
    }

    /// Address `window` and run `pixels` as its data stream.
    ///
    /// CS stays asserted for the whole stream and is released on every exit
    /// path. A failed stream drops its staged bytes.
    fn stream<G>(&mut self, window: DrawWindow, pixels: G) -> Result<(), Error>
    where
        G: FnOnce(&mut PixelSink<'_, DI, S>) -> Result<(), Error>,
    {
        let (width, height) = self.size();
        let window = window.fits(width, height)?;
        self.staging.ready()?;

        trace!(
            "stream ({},{})-({},{}), {} pixels",
            window.x1(),
            window.y1(),
            window.x2(),
            window.y2(),
            window.pixel_count()
        );
        set_window(&mut self.interface, &window)?;

        let result = self.interface.select_data().map_err(Error::from).and_then(|()| {
            let mut sink = PixelSink {
                bus: &mut self.interface,
                staging: &mut self.staging,
            };
            pixels(&mut sink)?;
            self.staging.finish(&mut self.interface)
        });
        if result.is_err() {
            self.staging.abort();
        }
        let released = self.interface.deselect();
        result?;
        Ok(released?)
    }

    fn glyph(&self, c: char) -> Glyph {
        match self.font.glyph(c) {
            Ok(glyph) => glyph,
            Err(err) => {
                warn!("{}, drawing '?' instead", err);
                self.font.glyph('?').unwrap_or(Glyph::BLANK)
            }
        }
    }

    /// Set a single pixel
    pub fn draw_pixel(&mut self, x: u16, y: u16, color: Color) -> Result<(), Error> {
        self.stream(DrawWindow::new(x, y, x, y), |sink| {
            sink.push(color.to_device())
        })
    }

    /// Fill the rectangle between two corners, both inclusive
    pub fn fill_rectangle(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        color: Color,
    ) -> Result<(), Error> {
        let window = DrawWindow::new(x1, y1, x2, y2);
        self.stream(window, |sink| {
            sink.push_repeated(color.to_device(), window.pixel_count())
        })
    }

    /// Fill the whole panel
    pub fn clear(&mut self, color: Color) -> Result<(), Error> {
        let (width, height) = self.size();
        self.fill_rectangle(0, 0, width - 1, height - 1, color)
    }

    /// Stream `colors` into the window between two corners in row-major
    /// order. Colors beyond the window's pixel count are ignored.
    pub fn write_pixels<I>(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        colors: I,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = Color>,
    {
        let window = DrawWindow::new(x1, y1, x2, y2);
        self.stream(window, |sink| {
            for color in colors.into_iter().take(window.pixel_count() as usize) {
                sink.push(color.to_device())?;
            }
            Ok(())
        })
    }

    /// Draw `c` opaquely: set glyph bits in `fg`, the rest of the cell in
    /// `bg`, all in one stream. Each glyph bit becomes a `scale` × `scale`
    /// block.
    pub fn draw_fast_glyph(
        &mut self,
        x: u16,
        y: u16,
        c: char,
        fg: Color,
        bg: Color,
        scale: u8,
    ) -> Result<(), Error> {
        let s = check_scale(scale)?;
        let (width, height) = self.size();
        let window =
            DrawWindow::with_size(x, y, GLYPH_WIDTH * s, GLYPH_HEIGHT * s, width, height)?;
        let glyph = self.glyph(c);
        let (fg, bg) = (fg.to_device(), bg.to_device());

        self.stream(window, |sink| {
            for row in 0..GLYPH_HEIGHT {
                for _ in 0..s {
                    for col in 0..GLYPH_WIDTH {
                        let color = if glyph.is_set(col, row) { fg } else { bg };
                        sink.push_repeated(color, s)?;
                    }
                }
            }
            Ok(())
        })
    }

    /// Draw the set bits of `c` only, leaving the background untouched.
    ///
    /// Every set bit is its own window, so this is much slower than
    /// [`draw_fast_glyph`](Self::draw_fast_glyph).
    pub fn draw_glyph(
        &mut self,
        x: u16,
        y: u16,
        c: char,
        color: Color,
        scale: u8,
    ) -> Result<(), Error> {
        let s = check_scale(scale)?;
        let (width, height) = self.size();
        DrawWindow::with_size(x, y, GLYPH_WIDTH * s, GLYPH_HEIGHT * s, width, height)?;
        let glyph = self.glyph(c);

        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !glyph.is_set(col, row) {
                    continue;
                }
                // inside the cell checked above
                let px = x + (col * s) as u16;
                let py = y + (row * s) as u16;
                if s == 1 {
                    self.draw_pixel(px, py, color)?;
                } else {
                    let extent = (s - 1) as u16;
                    self.fill_rectangle(px, py, px + extent, py + extent, color)?;
                }
            }
        }
        Ok(())
    }

    /// Draw `text` with [`draw_glyph`](Self::draw_glyph), advancing
    /// `9 * scale` columns per character
    pub fn draw_string(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        color: Color,
        scale: u8,
    ) -> Result<(), Error> {
        let s = check_scale(scale)?;
        self.check_text(x, y, text, s)?;
        for (i, c) in text.chars().enumerate() {
            let cx = x + (i as u32 * GLYPH_ADVANCE * s) as u16;
            self.draw_glyph(cx, y, c, color, scale)?;
        }
        Ok(())
    }

    /// Draw `text` with [`draw_fast_glyph`](Self::draw_fast_glyph),
    /// advancing `9 * scale` columns per character
    pub fn draw_fast_string(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Color,
        bg: Color,
        scale: u8,
    ) -> Result<(), Error> {
        let s = check_scale(scale)?;
        self.check_text(x, y, text, s)?;
        for (i, c) in text.chars().enumerate() {
            let cx = x + (i as u32 * GLYPH_ADVANCE * s) as u16;
            self.draw_fast_glyph(cx, y, c, fg, bg, scale)?;
        }
        Ok(())
    }

    // The whole line has to fit before the first glyph is sent.
    fn check_text(&self, x: u16, y: u16, text: &str, s: u32) -> Result<(), Error> {
        let count = text.chars().count() as u32;
        if count == 0 {
            return Ok(());
        }
        let span = (count - 1)
            .saturating_mul(GLYPH_ADVANCE * s)
            .saturating_add(GLYPH_WIDTH * s);
        let (width, height) = self.size();
        DrawWindow::with_size(x, y, span, GLYPH_HEIGHT * s, width, height)?;
        Ok(())
    }

    /// Blit `bitmap` with its top-left corner at `(x, y)`, every source
    /// pixel repeated into a `scale` × `scale` block
    pub fn draw_bitmap(
        &mut self,
        x: u16,
        y: u16,
        scale: u8,
        bitmap: &Bitmap<'_>,
    ) -> Result<(), Error> {
        let s = check_scale(scale)?;
        let (width, height) = self.size();
        let window = DrawWindow::with_size(
            x,
            y,
            u32::from(bitmap.width()) * s,
            u32::from(bitmap.height()) * s,
            width,
            height,
        )?;

        self.stream(window, |sink| {
            for row in 0..bitmap.height() {
                let pixels = bitmap.row(row);
                for _ in 0..s {
                    for &raw in pixels {
                        sink.push_repeated(Color(raw).to_device(), s)?;
                    }
                }
            }
            Ok(())
        })
    }
}
