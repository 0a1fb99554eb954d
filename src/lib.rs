//! ILI9488 TFT Display Driver
//!
//! Used in the common 3.5" 480×320 SPI modules. The controller has no frame
//! buffer the host could address, so every drawing call selects a window on
//! the panel and streams 18-bit pixels into it in raster order.
//!
//! ## Architecture
//!
//! The driver separates pixel production from pixel transmission:
//! - **Rasterizers** ([`driver::Ili9488`]) turn pixels, rectangles, glyphs
//!   and bitmaps into an ordered pixel stream inside one window
//! - **Staging** ([`staging::SingleBuffer`], [`staging::DoubleBuffer`])
//!   collects converted pixels in fixed-size buffers and hands them to the bus,
//!   either blocking or as asynchronous (DMA) transfers
//! - **Interfaces** ([`interface::SpiInterface`],
//!   [`interface::ParallelInterface`]) move the bytes to the controller
//!
//! ## Usage
//!
//! ### Blocking SPI
//!
//! ```rust, ignore
//! use ili9488::prelude::*;
//!
//! let interface = SpiInterface::new(spi, cs, dc, rst);
//! let mut display = Ili9488::new(interface, SingleBuffer::<1024>::new(), DEFAULT_FONT, Config::default());
//! display.init(&mut delay)?;
//!
//! display.clear(Color::BLACK)?;
//! display.fill_rectangle(10, 10, 109, 59, Color::RED)?;
//! display.draw_fast_string(10, 80, "Hello", Color::WHITE, Color::BLACK, 2)?;
//! ```
//!
//! ### Double buffered DMA
//!
//! Implement [`interface::AsyncDisplayBus`] for a transport that can start a
//! DMA transfer, and complete the shared [`staging::TransferFlag`] from the
//! transfer-complete interrupt. The staging memory must be `'static`:
//!
//! ```rust, ignore
//! static DMA_DONE: TransferFlag = TransferFlag::new();
//! static STAGING: ConstStaticCell<DmaStorage<1024>> = ConstStaticCell::new([[0; 1024]; 2]);
//!
//! let staging = DoubleBuffer::new(STAGING.take(), &DMA_DONE, delay);
//! let mut display = Ili9488::new(dma_interface, staging, DEFAULT_FONT, Config::default());
//! ```
//!
//! With the `graphics` feature the driver is also an `embedded-graphics`
//! `DrawTarget`.
//!
#![no_std]
#![deny(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod bitmap;
mod cmd;
pub mod color;
pub mod driver;
pub mod error;
mod flag;
pub mod font;
#[cfg(feature = "graphics")]
pub mod graphics;
pub mod interface;
pub mod staging;
pub mod window;

#[cfg(test)]
mod mock;

/// Panel width in landscape orientation
pub const MAX_WIDTH: u16 = 480;

/// Panel height in landscape orientation
pub const MAX_HEIGHT: u16 = 320;

/// Useful exports
pub mod prelude {
    pub use crate::bitmap::Bitmap;
    pub use crate::color::Color;
    pub use crate::driver::{Config, Ili9488, InitStep, Orientation};
    pub use crate::error::Error;
    pub use crate::font::{GlyphSource, GlyphTable};
    pub use crate::interface::{
        AsyncDisplayBus, DisplayBus, Generic8BitBus, ParallelInterface, SpiInterface,
    };
    pub use crate::staging::{
        DmaBlock, DmaStorage, DoubleBuffer, SingleBuffer, Staging, Timeout, TransferFlag,
    };

    #[cfg(feature = "graphics")]
    pub use crate::font::{MonoFontGlyphs, DEFAULT_FONT};
}
