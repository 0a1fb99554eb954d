//! Staging buffers between the rasterizers and the bus
//!
//! Pixels are converted to [`DeviceColor`]s and collected in fixed-size byte
//! buffers before they are handed to the transport. Two strategies exist:
//!
//! - [`SingleBuffer`]: one buffer, flushed with a blocking
//!   [`DisplayBus::write_block`]. Nothing runs concurrently.
//! - [`DoubleBuffer`]: two buffers, flushed with
//!   [`AsyncDisplayBus::write_block_async`]. While one buffer drains the
//!   other one fills. A [`TransferFlag`] shared with the transfer-complete
//!   interrupt tracks whether a transfer is still in flight.
//!
//! In both cases a buffer is flushed as soon as another 3-byte pixel would
//! no longer fit, so the capacity need not be a multiple of 3.
//!
//! A transfer may outlive the call that started it, and even the
//! [`DoubleBuffer`] itself after a timeout. Its memory is therefore borrowed
//! for `'static` instead of living inside the staging value.
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_dma::ReadBuffer;
use embedded_hal::delay::DelayNs;
use log::{error, trace};

use crate::color::DeviceColor;
use crate::error::Error;
use crate::interface::{AsyncDisplayBus, DisplayBus};

/// Staging buffer size used when none is given
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

const PIXEL_BYTES: usize = 3;

/// Completion flag of the one asynchronous transfer that can be in flight.
///
/// Lives for as long as the driver, usually in a `static` so the
/// transfer-complete interrupt handler can reach it:
///
/// ```rust, ignore
/// static DMA_DONE: TransferFlag = TransferFlag::new();
///
/// #[interrupt]
/// fn DMA1_CH5() {
///     // acknowledge the DMA interrupt, then
///     DMA_DONE.complete();
/// }
/// ```
#[derive(Debug, Default)]
pub struct TransferFlag {
    in_flight: AtomicBool,
}

impl TransferFlag {
    /// A flag with no transfer in flight
    pub const fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
        }
    }

    /// Signal that the last started transfer has left the bus.
    /// Safe to call from interrupt context.
    pub fn complete(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    /// Whether a transfer has been started and not yet completed
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn start(&self) {
        self.in_flight.store(true, Ordering::Release);
    }
}

/// How long to wait for a transfer to complete before giving up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeout {
    /// Total time to wait, in microseconds
    pub limit_us: u32,
    /// Time between two looks at the flag, in microseconds
    pub poll_us: u32,
}

impl Default for Timeout {
    fn default() -> Self {
        Self {
            limit_us: 100_000,
            poll_us: 10,
        }
    }
}

/// Strategy for collecting pixel bytes and moving them to the bus.
///
/// A drawing call runs `ready`, sends its window commands, then calls `push`
/// once per pixel and `finish` once at the end. On any error the driver calls
/// `abort` instead of `finish`.
pub trait Staging<DI: DisplayBus> {
    /// Make sure the bus is free for commands.
    fn ready(&mut self) -> Result<(), Error>;

    /// Append one pixel, flushing first if the buffer is full.
    fn push(&mut self, bus: &mut DI, color: DeviceColor) -> Result<(), Error>;

    /// Append the same pixel `count` times.
    fn push_repeated(&mut self, bus: &mut DI, color: DeviceColor, count: u32) -> Result<(), Error> {
        for _ in 0..count {
            self.push(bus, color)?;
        }
        Ok(())
    }

    /// Send whatever is buffered and return once it has left the bus.
    fn finish(&mut self, bus: &mut DI) -> Result<(), Error>;

    /// Drop buffered bytes of a failed stream.
    fn abort(&mut self);
}

/// Memory behind the two halves of a [`DoubleBuffer`].
///
/// Usually taken once from a `static`, e.g. a
/// `static_cell::ConstStaticCell<DmaStorage<1024>>`.
pub type DmaStorage<const C: usize> = [[u8; C]; 2];

/// Read-only view of a staged block that an asynchronous transfer is
/// sending.
///
/// Points into `'static` [`DmaStorage`], which the [`DoubleBuffer`] does not
/// write to again until the [`TransferFlag`] has been completed. Moving or
/// dropping the staging value leaves the block valid.
#[derive(Debug)]
pub struct DmaBlock {
    ptr: *const u8,
    len: usize,
}

// only ever read, and the memory is 'static
unsafe impl Send for DmaBlock {}

impl DmaBlock {
    // `bytes` must point into `DmaStorage` held by a `DoubleBuffer`
    fn new(bytes: &[u8]) -> Self {
        Self {
            ptr: bytes.as_ptr(),
            len: bytes.len(),
        }
    }

    /// Number of bytes to send
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there is nothing to send
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

unsafe impl ReadBuffer for DmaBlock {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        (self.ptr, self.len)
    }
}

struct Capacity<const C: usize>;

impl<const C: usize> Capacity<C> {
    const OK: () = assert!(C >= PIXEL_BYTES, "staging buffer must hold one pixel");
}

pub(crate) struct Buffer<B> {
    bytes: B,
    cursor: usize,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Buffer<B> {
    fn new(bytes: B) -> Self {
        Self { bytes, cursor: 0 }
    }

    fn capacity(&self) -> usize {
        self.bytes.as_ref().len()
    }

    /// Returns true once the next pixel would not fit.
    fn write(&mut self, color: DeviceColor) -> bool {
        let capacity = self.capacity();
        debug_assert!(self.cursor + PIXEL_BYTES <= capacity, "staging buffer overflow");
        self.bytes.as_mut()[self.cursor..self.cursor + PIXEL_BYTES]
            .copy_from_slice(color.bytes());
        self.cursor += PIXEL_BYTES;
        self.cursor + PIXEL_BYTES > capacity
    }

    fn filled(&self) -> &[u8] {
        &self.bytes.as_ref()[..self.cursor]
    }

    fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// One buffer, flushed synchronously.
pub struct SingleBuffer<const C: usize = DEFAULT_BUFFER_SIZE> {
    buffer: Buffer<[u8; C]>,
}

impl<const C: usize> SingleBuffer<C> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Capacity::<C>::OK;
        Self {
            buffer: Buffer {
                bytes: [0; C],
                cursor: 0,
            },
        }
    }

    /// Buffer capacity in bytes
    pub const fn capacity(&self) -> usize {
        C
    }

    fn flush<DI: DisplayBus>(&mut self, bus: &mut DI) -> Result<(), Error> {
        trace!("flushing {} staged bytes", self.buffer.cursor);
        bus.write_block(self.buffer.filled())?;
        self.buffer.reset();
        Ok(())
    }
}

impl<const C: usize> Default for SingleBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<DI: DisplayBus, const C: usize> Staging<DI> for SingleBuffer<C> {
    fn ready(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn push(&mut self, bus: &mut DI, color: DeviceColor) -> Result<(), Error> {
        if self.buffer.write(color) {
            self.flush(bus)?;
        }
        Ok(())
    }

    fn finish(&mut self, bus: &mut DI) -> Result<(), Error> {
        if !self.buffer.is_empty() {
            self.flush(bus)?;
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.buffer.reset();
    }
}

/// Two buffers, one filling while the other drains asynchronously.
///
/// `D` is only used to pace polling of the [`TransferFlag`] while waiting
/// for a transfer to complete.
///
/// ```rust, ignore
/// static DMA_DONE: TransferFlag = TransferFlag::new();
/// static STAGING: ConstStaticCell<DmaStorage<1024>> = ConstStaticCell::new([[0; 1024]; 2]);
///
/// let staging = DoubleBuffer::new(STAGING.take(), &DMA_DONE, delay);
/// ```
pub struct DoubleBuffer<D, const C: usize = DEFAULT_BUFFER_SIZE> {
    buffers: [Buffer<&'static mut [u8; C]>; 2],
    active: usize,
    // buffer the last started transfer reads from
    in_flight: Option<usize>,
    flag: &'static TransferFlag,
    delay: D,
    timeout: Timeout,
}

impl<D: DelayNs, const C: usize> DoubleBuffer<D, C> {
    /// Create with the default [`Timeout`]
    pub fn new(
        storage: &'static mut DmaStorage<C>,
        flag: &'static TransferFlag,
        delay: D,
    ) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Capacity::<C>::OK;
        let [first, second] = storage;
        Self {
            buffers: [Buffer::new(first), Buffer::new(second)],
            active: 0,
            in_flight: None,
            flag,
            delay,
            timeout: Timeout::default(),
        }
    }

    /// Replace the completion timeout
    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Capacity of each of the two buffers in bytes
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Give back the delay.
    ///
    /// The storage stays borrowed, so a transfer that is still in flight
    /// keeps reading valid bytes.
    pub fn release(self) -> D {
        self.delay
    }

    fn wait(&mut self, on_expiry: Error) -> Result<(), Error> {
        let poll_us = self.timeout.poll_us.max(1);
        let mut waited: u32 = 0;
        while self.flag.is_in_flight() {
            if waited >= self.timeout.limit_us {
                error!("transfer still in flight after {} us", waited);
                return Err(on_expiry);
            }
            self.delay.delay_us(poll_us);
            waited = waited.saturating_add(poll_us);
        }
        self.in_flight = None;
        Ok(())
    }

    fn flush<DI: AsyncDisplayBus>(&mut self, bus: &mut DI) -> Result<(), Error> {
        // the previous transfer is reading from the other buffer; the bus
        // takes one transfer at a time
        self.wait(Error::BusTimeout)?;

        let index = self.active;
        trace!(
            "starting transfer of {} bytes from buffer {}",
            self.buffers[index].cursor,
            index
        );
        self.flag.start();
        self.in_flight = Some(index);
        let block = DmaBlock::new(self.buffers[index].filled());
        if let Err(err) = bus.write_block_async(block, self.flag) {
            // nothing is on its way
            self.flag.complete();
            self.in_flight = None;
            return Err(err.into());
        }
        self.buffers[index].reset();
        self.active = index ^ 1;
        Ok(())
    }
}

impl<DI: AsyncDisplayBus, D: DelayNs, const C: usize> Staging<DI> for DoubleBuffer<D, C> {
    fn ready(&mut self) -> Result<(), Error> {
        self.wait(Error::BusNotReady)
    }

    fn push(&mut self, bus: &mut DI, color: DeviceColor) -> Result<(), Error> {
        debug_assert!(
            self.in_flight != Some(self.active) || !self.flag.is_in_flight(),
            "writing into a buffer that is in flight"
        );
        if self.buffers[self.active].write(color) {
            self.flush(bus)?;
        }
        Ok(())
    }

    fn finish(&mut self, bus: &mut DI) -> Result<(), Error> {
        if !self.buffers[self.active].is_empty() {
            self.flush(bus)?;
        }
        self.wait(Error::BusTimeout)
    }

    fn abort(&mut self) {
        // an in-flight transfer keeps its bytes; `ready` waits for it
        for buffer in &mut self.buffers {
            buffer.reset();
        }
    }
}
