//! Draw window addressing
//!
//! The controller has no host-addressable frame memory. Instead a rectangle
//! is selected with column/page address commands, and every data byte after
//! the memory-write command fills it in row-major order.
use display_interface::DisplayError;

use crate::cmd::Cmd;
use crate::error::Error;
use crate::interface::DisplayBus;

/// Rectangle with inclusive bounds, `x1 <= x2` and `y1 <= y2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawWindow {
    x1: u16,
    y1: u16,
    x2: u16,
    y2: u16,
}

impl DrawWindow {
    /// Build a window from two corners in any order.
    pub fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Window of `width` × `height` pixels with its top-left corner at
    /// `(x, y)`, or `InvalidWindow` if it does not fit on a
    /// `panel_width` × `panel_height` panel.
    pub fn with_size(
        x: u16,
        y: u16,
        width: u32,
        height: u32,
        panel_width: u16,
        panel_height: u16,
    ) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidWindow {
                x1: x,
                y1: y,
                x2: x,
                y2: y,
            });
        }
        let x2 = u32::from(x) + width - 1;
        let y2 = u32::from(y) + height - 1;
        let clamp = |v: u32| u16::try_from(v).unwrap_or(u16::MAX);
        Self {
            x1: x,
            y1: y,
            x2: clamp(x2),
            y2: clamp(y2),
        }
        .fits(panel_width, panel_height)
    }

    /// Check the window against the panel size.
    pub fn fits(self, panel_width: u16, panel_height: u16) -> Result<Self, Error> {
        if self.x2 >= panel_width || self.y2 >= panel_height {
            return Err(Error::InvalidWindow {
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
            });
        }
        Ok(self)
    }

    /// Left column
    pub fn x1(&self) -> u16 {
        self.x1
    }

    /// Top row
    pub fn y1(&self) -> u16 {
        self.y1
    }

    /// Right column, inclusive
    pub fn x2(&self) -> u16 {
        self.x2
    }

    /// Bottom row, inclusive
    pub fn y2(&self) -> u16 {
        self.y2
    }

    /// Columns covered
    pub fn width(&self) -> u32 {
        u32::from(self.x2 - self.x1) + 1
    }

    /// Rows covered
    pub fn height(&self) -> u32 {
        u32::from(self.y2 - self.y1) + 1
    }

    /// Number of pixels the controller expects after [`set_window`].
    /// Saturates at `u32::MAX` for the full 16-bit address range.
    pub fn pixel_count(&self) -> u32 {
        self.width().saturating_mul(self.height())
    }
}

/// Address `window`: column range, page range, then start a memory write.
///
/// Every data byte sent afterwards is pixel data for this window.
pub fn set_window<DI: DisplayBus>(bus: &mut DI, window: &DrawWindow) -> Result<(), DisplayError> {
    let [x1_hi, x1_lo] = window.x1.to_be_bytes();
    let [x2_hi, x2_lo] = window.x2.to_be_bytes();
    bus.cmd_with_data(Cmd::COLUMN_ADDRESS_SET, &[x1_hi, x1_lo, x2_hi, x2_lo])?;

    let [y1_hi, y1_lo] = window.y1.to_be_bytes();
    let [y2_hi, y2_lo] = window.y2.to_be_bytes();
    bus.cmd_with_data(Cmd::PAGE_ADDRESS_SET, &[y1_hi, y1_lo, y2_hi, y2_lo])?;

    bus.cmd(Cmd::MEMORY_WRITE)
}
