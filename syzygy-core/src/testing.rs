//! Host-side fakes for the HAL traits
//!
//! Time is a shared counter: `ManualClock` reads it and `ClockDelay`
//! advances it, so anything that busy-waits through the delay also moves
//! the clock forward.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use embedded_storage::nor_flash::{
    ErrorType as FlashErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};
use syzygy_hal::{AdcFifo, HardwareWatchdog, Monotonic, ResetCause};

/// Clock whose time only moves when told to
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_us(&self, us: u32) {
        self.now.set(us);
    }

    pub fn advance_us(&self, us: u32) {
        self.now.set(self.now.get().wrapping_add(us));
    }

    pub fn advance_ms(&self, ms: u32) {
        self.advance_us(ms * 1_000);
    }

    pub fn delay(&self) -> ClockDelay {
        ClockDelay {
            clock: self.clone(),
        }
    }
}

impl Monotonic for ManualClock {
    fn now_us(&self) -> u32 {
        self.now.get()
    }
}

/// Busy-wait that advances a [`ManualClock`]
pub struct ClockDelay {
    clock: ManualClock,
}

impl DelayNs for ClockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.advance_us(us);
    }
}

/// Everything a [`ScriptedAdc`] was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcOp {
    Select(u8),
    TempSensor(bool),
    Drain,
    Run(bool),
    Pop(u16),
}

#[derive(Default)]
pub struct AdcState {
    pub ops: Vec<AdcOp>,
    /// Value produced for each mux input when a conversion runs
    pub values: [Option<u16>; 5],
    /// Polls of `is_empty` that still see no data after `Run(true)`
    pub latency_polls: u32,
    pub selected: u8,
    fifo: VecDeque<u16>,
    pending_polls: u32,
    running: bool,
}

/// ADC fake that converts instantly (or never) per channel
///
/// A channel whose `values` slot is `None` never completes a conversion,
/// which models a stuck converter.
#[derive(Clone, Default)]
pub struct ScriptedAdc {
    pub state: Rc<RefCell<AdcState>>,
}

impl ScriptedAdc {
    pub fn with_values(values: [Option<u16>; 5]) -> Self {
        let adc = Self::default();
        adc.state.borrow_mut().values = values;
        adc
    }

    pub fn ops(&self) -> Vec<AdcOp> {
        self.state.borrow().ops.clone()
    }

    /// Number of conversions started per mux input
    pub fn conversions(&self, input: u8) -> usize {
        let mut selected = None;
        let mut count = 0;
        for op in self.ops() {
            match op {
                AdcOp::Select(i) => selected = Some(i),
                AdcOp::Run(true) if selected == Some(input) => count += 1,
                _ => {}
            }
        }
        count
    }
}

impl AdcFifo for ScriptedAdc {
    fn select_input(&mut self, input: u8) {
        let mut s = self.state.borrow_mut();
        s.selected = input;
        s.ops.push(AdcOp::Select(input));
    }

    fn set_temp_sensor_enabled(&mut self, enabled: bool) {
        self.state.borrow_mut().ops.push(AdcOp::TempSensor(enabled));
    }

    fn drain(&mut self) {
        let mut s = self.state.borrow_mut();
        s.fifo.clear();
        s.ops.push(AdcOp::Drain);
    }

    fn set_running(&mut self, running: bool) {
        let mut s = self.state.borrow_mut();
        s.running = running;
        s.pending_polls = s.latency_polls;
        s.ops.push(AdcOp::Run(running));
    }

    fn is_empty(&self) -> bool {
        let mut s = self.state.borrow_mut();
        if s.running && s.fifo.is_empty() {
            if s.pending_polls > 0 {
                s.pending_polls -= 1;
            } else if let Some(value) = s.values[s.selected as usize] {
                s.fifo.push_back(value);
            }
        }
        s.fifo.is_empty()
    }

    fn pop(&mut self) -> u16 {
        let mut s = self.state.borrow_mut();
        let value = s.fifo.pop_front().unwrap_or(0);
        s.ops.push(AdcOp::Pop(value));
        value
    }
}

#[derive(Default)]
pub struct WatchdogLog {
    pub timeout_us: Cell<Option<u32>>,
    pub last_feed_us: Cell<u32>,
    pub feeds: Cell<u32>,
}

/// Watchdog fake that records when it was armed and fed
#[derive(Clone)]
pub struct RecordingWatchdog {
    pub clock: ManualClock,
    pub log: Rc<WatchdogLog>,
    pub cause: ResetCause,
}

impl RecordingWatchdog {
    pub fn new(clock: &ManualClock) -> Self {
        Self {
            clock: clock.clone(),
            log: Rc::default(),
            cause: ResetCause::PowerOn,
        }
    }

    /// Whether the hardware would have reset the chip by `now`
    pub fn expired(&self) -> bool {
        match self.log.timeout_us.get() {
            Some(timeout) => {
                self.clock.now_us().wrapping_sub(self.log.last_feed_us.get()) >= timeout
            }
            None => false,
        }
    }
}

impl HardwareWatchdog for RecordingWatchdog {
    fn start(&mut self, timeout_us: u32) {
        self.log.timeout_us.set(Some(timeout_us));
        self.log.last_feed_us.set(self.clock.now_us());
    }

    fn feed(&mut self) {
        self.log.last_feed_us.set(self.clock.now_us());
        self.log.feeds.set(self.log.feeds.get() + 1);
    }

    fn reset_cause(&self) -> ResetCause {
        self.cause
    }
}

/// LED fake counting state changes
#[derive(Clone, Default)]
pub struct FakeLed {
    pub high: Rc<Cell<bool>>,
    pub toggles: Rc<Cell<u32>>,
}

impl ErrorType for FakeLed {
    type Error = Infallible;
}

impl OutputPin for FakeLed {
    fn set_low(&mut self) -> Result<(), Infallible> {
        if self.high.get() {
            self.toggles.set(self.toggles.get() + 1);
        }
        self.high.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        if !self.high.get() {
            self.toggles.set(self.toggles.get() + 1);
        }
        self.high.set(true);
        Ok(())
    }
}

impl StatefulOutputPin for FakeLed {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high.get())
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamFlashError(pub NorFlashErrorKind);

impl NorFlashError for RamFlashError {
    fn kind(&self) -> NorFlashErrorKind {
        self.0
    }
}

/// NOR flash in RAM: erase sets 0xFF, program can only clear bits
#[derive(Clone)]
pub struct RamFlash {
    pub data: Rc<RefCell<Vec<u8>>>,
    pub erases: Rc<Cell<u32>>,
    pub programs: Rc<Cell<u32>>,
}

impl RamFlash {
    pub const SECTOR: usize = 256;

    pub fn new(sectors: usize) -> Self {
        Self {
            data: Rc::new(RefCell::new(std::vec![0xFF; sectors * Self::SECTOR])),
            erases: Rc::default(),
            programs: Rc::default(),
        }
    }
}

impl FlashErrorType for RamFlash {
    type Error = RamFlashError;
}

impl ReadNorFlash for RamFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), RamFlashError> {
        let data = self.data.borrow();
        let start = offset as usize;
        let src = data
            .get(start..start + bytes.len())
            .ok_or(RamFlashError(NorFlashErrorKind::OutOfBounds))?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.borrow().len()
    }
}

impl NorFlash for RamFlash {
    const WRITE_SIZE: usize = 1;
    const ERASE_SIZE: usize = Self::SECTOR;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), RamFlashError> {
        let mut data = self.data.borrow_mut();
        let range = data
            .get_mut(from as usize..to as usize)
            .ok_or(RamFlashError(NorFlashErrorKind::OutOfBounds))?;
        range.fill(0xFF);
        self.erases.set(self.erases.get() + 1);
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), RamFlashError> {
        let mut data = self.data.borrow_mut();
        let start = offset as usize;
        let dst = data
            .get_mut(start..start + bytes.len())
            .ok_or(RamFlashError(NorFlashErrorKind::OutOfBounds))?;
        for (d, s) in dst.iter_mut().zip(bytes) {
            *d &= *s;
        }
        self.programs.set(self.programs.get() + 1);
        Ok(())
    }
}
