//! Driver error type
pub use display_interface::DisplayError;

use core::fmt;

/// Everything a drawing or bring-up call can fail with.
#[derive(Clone, Debug)]
pub enum Error {
    /// The bus or one of the control lines reported a failure
    Interface(DisplayError),
    /// The (normalized) window does not fit on the panel
    InvalidWindow {
        /// left column
        x1: u16,
        /// top row
        y1: u16,
        /// right column, inclusive
        x2: u16,
        /// bottom row, inclusive
        y2: u16,
    },
    /// A block transfer was started but its completion was never signalled
    BusTimeout,
    /// A drawing call could not start because an earlier transfer still owns the bus
    BusNotReady,
    /// The glyph source has no bitmap for this character
    UnsupportedGlyph(char),
    /// Bitmap header does not match the pixel data
    InvalidBitmap,
    /// Scale factors must be at least 1
    InvalidScale,
}

impl From<DisplayError> for Error {
    fn from(err: DisplayError) -> Self {
        Error::Interface(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Interface(err) => write!(f, "display interface error: {err:?}"),
            Error::InvalidWindow { x1, y1, x2, y2 } => {
                write!(f, "window ({x1},{y1})-({x2},{y2}) exceeds the panel")
            }
            Error::BusTimeout => f.write_str("bus transfer did not complete in time"),
            Error::BusNotReady => f.write_str("bus is still busy with a previous transfer"),
            Error::UnsupportedGlyph(c) => write!(f, "no glyph for {c:?}"),
            Error::InvalidBitmap => f.write_str("bitmap header does not match its data"),
            Error::InvalidScale => f.write_str("scale must be at least 1"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn interface_errors_convert() {
        let err: Error = DisplayError::BusWriteError.into();
        assert!(matches!(err, Error::Interface(DisplayError::BusWriteError)));
    }

    #[test]
    fn display_format() {
        assert_eq!(
            Error::InvalidWindow { x1: 0, y1: 1, x2: 480, y2: 2 }.to_string(),
            "window (0,1)-(480,2) exceeds the panel"
        );
        assert_eq!(Error::UnsupportedGlyph('\u{7f}').to_string(), "no glyph for '\\u{7f}'");
        assert_eq!(Error::BusTimeout.to_string(), "bus transfer did not complete in time");
    }
}
