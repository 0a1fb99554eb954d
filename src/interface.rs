//! Bus transports the driver streams commands and pixels through
//!
//! The controller distinguishes commands from parameters/pixels by the
//! data/command (DC) line and only listens while chip select (CS) is low.
//! [`DisplayBus::cmd`] and [`DisplayBus::data`] frame a single byte with CS,
//! while [`DisplayBus::select_data`] / [`DisplayBus::deselect`] keep CS
//! asserted around an arbitrarily long run of [`DisplayBus::write_block`]
//! calls.
use display_interface::DisplayError;
use display_interface_parallel_gpio::OutputBus;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::staging::{DmaBlock, TransferFlag};

pub use display_interface_parallel_gpio::Generic8BitBus;

/// Blocking transport to the controller.
pub trait DisplayBus {
    /// Send one command byte (DC low).
    fn cmd(&mut self, command: u8) -> Result<(), DisplayError>;

    /// Send one parameter byte (DC high).
    fn data(&mut self, byte: u8) -> Result<(), DisplayError>;

    /// Send a command followed by its parameters.
    fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cmd(command)?;
        for &byte in data {
            self.data(byte)?;
        }
        Ok(())
    }

    /// Assert DC=data and CS for a pixel stream.
    fn select_data(&mut self) -> Result<(), DisplayError>;

    /// Write a block of stream bytes, returning once they are on the wire.
    /// Only valid between [`select_data`](Self::select_data) and
    /// [`deselect`](Self::deselect).
    fn write_block(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;

    /// Release CS at the end of a stream.
    fn deselect(&mut self) -> Result<(), DisplayError>;

    /// Pulse the reset line.
    fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError>;
}

/// Transport that can hand a block to a DMA engine (or similar) and return
/// before the transfer is done.
///
/// The driver marks `done` as in flight before calling
/// [`write_block_async`](Self::write_block_async). The [`DmaBlock`] points
/// into `'static` staging memory that the driver leaves untouched until
/// [`TransferFlag::complete`] has been called, normally from the
/// transfer-complete interrupt. It implements `embedded_dma::ReadBuffer`, so
/// it can be handed straight to a HAL's DMA API.
pub trait AsyncDisplayBus: DisplayBus {
    /// Start transmitting `block`. `done` must be completed exactly once when
    /// the last byte has left the bus.
    fn write_block_async(
        &mut self,
        block: DmaBlock,
        done: &'static TransferFlag,
    ) -> Result<(), DisplayError>;
}

/// 4-wire serial interface: SPI bus plus CS, DC and RST lines.
///
/// CS is driven by the driver rather than by an `SpiDevice` so it can stay
/// asserted for a whole pixel stream.
pub struct SpiInterface<SPI, CS, DC, RST> {
    spi: SPI,
    cs: CS,
    dc: DC,
    rst: RST,
}

impl<SPI, CS, DC, RST> SpiInterface<SPI, CS, DC, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Create the interface from an SPI bus and the three control lines.
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: RST) -> Self {
        Self { spi, cs, dc, rst }
    }

    /// Give back the bus and pins
    pub fn release(self) -> (SPI, CS, DC, RST) {
        (self.spi, self.cs, self.dc, self.rst)
    }

    fn framed_byte(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::CSError)?;
        let written = self
            .spi
            .write(&[byte])
            .and_then(|()| self.spi.flush())
            .map_err(|_| DisplayError::BusWriteError);
        self.cs.set_high().map_err(|_| DisplayError::CSError)?;
        written
    }
}

impl<SPI, CS, DC, RST> DisplayBus for SpiInterface<SPI, CS, DC, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        self.framed_byte(command)
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.framed_byte(byte)
    }

    fn select_data(&mut self) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.cs.set_low().map_err(|_| DisplayError::CSError)
    }

    fn write_block(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.spi
            .write(bytes)
            .and_then(|()| self.spi.flush())
            .map_err(|_| DisplayError::BusWriteError)
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        let flushed = self.spi.flush().map_err(|_| DisplayError::BusWriteError);
        self.cs.set_high().map_err(|_| DisplayError::CSError)?;
        flushed
    }

    fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        hard_reset(&mut self.rst, &mut self.cs, &mut self.dc, delay)
    }
}

/// 8080-style 8-bit parallel interface: data bus plus CS, DC, WR and RST.
///
/// The controller latches the data lines on the rising edge of WR. Any
/// 8-bit [`OutputBus`] works as the data bus, usually a [`Generic8BitBus`]
/// over eight GPIO outputs.
pub struct ParallelInterface<BUS, CS, DC, WR, RST> {
    bus: BUS,
    cs: CS,
    dc: DC,
    wr: WR,
    rst: RST,
}

impl<BUS, CS, DC, WR, RST> ParallelInterface<BUS, CS, DC, WR, RST>
where
    BUS: OutputBus<Word = u8>,
    CS: OutputPin,
    DC: OutputPin,
    WR: OutputPin,
    RST: OutputPin,
{
    /// Create the interface from a data bus and the control lines.
    pub fn new(bus: BUS, cs: CS, dc: DC, wr: WR, rst: RST) -> Self {
        Self {
            bus,
            cs,
            dc,
            wr,
            rst,
        }
    }

    /// Give back the bus and pins
    pub fn release(self) -> (BUS, CS, DC, WR, RST) {
        (self.bus, self.cs, self.dc, self.wr, self.rst)
    }

    fn strobe(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.wr.set_low().map_err(|_| DisplayError::BusWriteError)?;
        self.bus.set_value(byte)?;
        self.wr.set_high().map_err(|_| DisplayError::BusWriteError)
    }

    fn framed_byte(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::CSError)?;
        let written = self.strobe(byte);
        self.cs.set_high().map_err(|_| DisplayError::CSError)?;
        written
    }
}

impl<BUS, CS, DC, WR, RST> DisplayBus for ParallelInterface<BUS, CS, DC, WR, RST>
where
    BUS: OutputBus<Word = u8>,
    CS: OutputPin,
    DC: OutputPin,
    WR: OutputPin,
    RST: OutputPin,
{
    fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        self.framed_byte(command)
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.framed_byte(byte)
    }

    fn select_data(&mut self) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.cs.set_low().map_err(|_| DisplayError::CSError)
    }

    fn write_block(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        for &byte in bytes {
            self.strobe(byte)?;
        }
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        self.cs.set_high().map_err(|_| DisplayError::CSError)
    }

    fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        self.wr.set_high().map_err(|_| DisplayError::BusWriteError)?;
        hard_reset(&mut self.rst, &mut self.cs, &mut self.dc, delay)
    }
}

// Control lines are active low; park them high, then pulse RST.
fn hard_reset<RST, CS, DC>(
    rst: &mut RST,
    cs: &mut CS,
    dc: &mut DC,
    delay: &mut impl DelayNs,
) -> Result<(), DisplayError>
where
    RST: OutputPin,
    CS: OutputPin,
    DC: OutputPin,
{
    rst.set_high().map_err(|_| DisplayError::RSError)?;
    cs.set_high().map_err(|_| DisplayError::CSError)?;
    dc.set_high().map_err(|_| DisplayError::DCError)?;
    delay.delay_ms(100);
    rst.set_low().map_err(|_| DisplayError::RSError)?;
    delay.delay_ms(500);
    rst.set_high().map_err(|_| DisplayError::RSError)?;
    delay.delay_ms(500);
    Ok(())
}
