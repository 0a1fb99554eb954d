//! Recording transport and simulated transfer completion for unit tests
extern crate std;

use core::cell::RefCell;
use std::boxed::Box;
use std::rc::Rc;
use std::vec::Vec;

use display_interface::DisplayError;
use embedded_dma::ReadBuffer;
use embedded_hal::delay::DelayNs;

use crate::interface::{AsyncDisplayBus, DisplayBus};
use crate::staging::{DmaBlock, DmaStorage, TransferFlag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    Cmd(u8),
    Data(u8),
    Select,
    Block(Vec<u8>),
    AsyncBlock(Vec<u8>),
    Deselect,
    Reset,
}

/// Flags are shared with the simulated interrupt, which outlives the test body.
pub(crate) fn leak_flag() -> &'static TransferFlag {
    Box::leak(Box::new(TransferFlag::new()))
}

pub(crate) fn leak_storage<const C: usize>() -> &'static mut DmaStorage<C> {
    Box::leak(Box::new([[0; C]; 2]))
}

/// Bytes a DMA engine would read for `block`
pub(crate) fn dma_bytes(block: &DmaBlock) -> Vec<u8> {
    // SAFETY: blocks point into leaked storage that is never freed
    let (ptr, len) = unsafe { block.read_buffer() };
    unsafe { core::slice::from_raw_parts(ptr, len) }.to_vec()
}

pub(crate) enum Latency {
    /// Completes after this many polls
    Fixed(u32),
    /// Completes after 0..8 polls, drawn from a xorshift sequence
    Random(u64),
    Never,
}

struct SimState {
    flag: &'static TransferFlag,
    latency: Latency,
    pending: Option<u32>,
    polls: usize,
}

/// Stands in for the transfer-complete interrupt: completes the flag after a
/// number of delay polls.
#[derive(Clone)]
pub(crate) struct CompletionSim(Rc<RefCell<SimState>>);

impl CompletionSim {
    pub(crate) fn new(flag: &'static TransferFlag, latency: Latency) -> Self {
        Self(Rc::new(RefCell::new(SimState {
            flag,
            latency,
            pending: None,
            polls: 0,
        })))
    }

    pub(crate) fn delay(&self) -> SimDelay {
        SimDelay(self.clone())
    }

    pub(crate) fn polls(&self) -> usize {
        self.0.borrow().polls
    }

    fn started(&self) {
        let mut state = self.0.borrow_mut();
        assert!(state.flag.is_in_flight(), "transfer started without marking the flag");
        assert!(state.pending.is_none(), "transfer started while the bus was busy");
        let polls = match &mut state.latency {
            Latency::Fixed(n) => Some(*n),
            Latency::Random(seed) => {
                *seed ^= *seed << 13;
                *seed ^= *seed >> 7;
                *seed ^= *seed << 17;
                Some((*seed % 8) as u32)
            }
            Latency::Never => None,
        };
        match polls {
            Some(0) => state.flag.complete(),
            Some(n) => state.pending = Some(n),
            None => {}
        }
    }

    fn tick(&self) {
        let mut state = self.0.borrow_mut();
        state.polls += 1;
        if matches!(state.latency, Latency::Never) {
            return;
        }
        match state.pending {
            Some(n) if n <= 1 => {
                state.pending = None;
                state.flag.complete();
            }
            Some(n) => state.pending = Some(n - 1),
            None => {}
        }
    }

    fn is_busy(&self) -> bool {
        self.0.borrow().flag.is_in_flight()
    }
}

pub(crate) struct SimDelay(CompletionSim);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, _ns: u32) {
        self.0.tick();
    }

    fn delay_us(&mut self, _us: u32) {
        self.0.tick();
    }

    fn delay_ms(&mut self, _ms: u32) {
        self.0.tick();
    }
}

pub(crate) struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[derive(Default)]
pub(crate) struct MockBus {
    pub(crate) ops: Vec<Op>,
    pub(crate) fail_blocks: bool,
    /// Blocks handed to `write_block_async`, as a DMA engine would hold them
    pub(crate) dma_blocks: Vec<DmaBlock>,
    sim: Option<CompletionSim>,
}

impl MockBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_completion(sim: &CompletionSim) -> Self {
        Self {
            sim: Some(sim.clone()),
            ..Self::default()
        }
    }

    fn check_idle(&self) {
        if let Some(sim) = &self.sim {
            assert!(!sim.is_busy(), "command sent while a transfer is in flight");
        }
    }

    /// All stream bytes in the order they were handed to the bus
    pub(crate) fn pixel_bytes(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Block(bytes) | Op::AsyncBlock(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    pub(crate) fn block_lengths(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Block(bytes) | Op::AsyncBlock(bytes) => Some(bytes.len()),
                _ => None,
            })
            .collect()
    }

    /// Commands paired with the parameter bytes that followed them
    pub(crate) fn commands(&self) -> Vec<(u8, Vec<u8>)> {
        let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
        for op in &self.ops {
            match op {
                Op::Cmd(c) => out.push((*c, Vec::new())),
                Op::Data(d) => {
                    if let Some((_, params)) = out.last_mut() {
                        params.push(*d);
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// (x1, y1, x2, y2) of every window that was addressed
    pub(crate) fn windows(&self) -> Vec<(u16, u16, u16, u16)> {
        let commands = self.commands();
        commands
            .windows(2)
            .filter_map(|pair| match pair {
                [(0x2A, x), (0x2B, y)] => Some((
                    u16::from_be_bytes([x[0], x[1]]),
                    u16::from_be_bytes([y[0], y[1]]),
                    u16::from_be_bytes([x[2], x[3]]),
                    u16::from_be_bytes([y[2], y[3]]),
                )),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn selects(&self) -> usize {
        self.ops.iter().filter(|op| **op == Op::Select).count()
    }

    pub(crate) fn deselects(&self) -> usize {
        self.ops.iter().filter(|op| **op == Op::Deselect).count()
    }
}

impl DisplayBus for MockBus {
    fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        self.check_idle();
        self.ops.push(Op::Cmd(command));
        Ok(())
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.check_idle();
        self.ops.push(Op::Data(byte));
        Ok(())
    }

    fn select_data(&mut self) -> Result<(), DisplayError> {
        self.ops.push(Op::Select);
        Ok(())
    }

    fn write_block(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        if self.fail_blocks {
            return Err(DisplayError::BusWriteError);
        }
        self.ops.push(Op::Block(bytes.to_vec()));
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        self.ops.push(Op::Deselect);
        Ok(())
    }

    fn hard_reset(&mut self, _delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        self.ops.push(Op::Reset);
        Ok(())
    }
}

impl AsyncDisplayBus for MockBus {
    fn write_block_async(
        &mut self,
        block: DmaBlock,
        done: &'static TransferFlag,
    ) -> Result<(), DisplayError> {
        if self.fail_blocks {
            return Err(DisplayError::BusWriteError);
        }
        self.ops.push(Op::AsyncBlock(dma_bytes(&block)));
        self.dma_blocks.push(block);
        match &self.sim {
            Some(sim) => sim.started(),
            // no interrupt to wait for
            None => done.complete(),
        }
        Ok(())
    }
}
