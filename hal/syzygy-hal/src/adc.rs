//! ADC abstractions
//!
//! Models a single successive-approximation ADC behind an input
//! multiplexer, with results delivered through a FIFO. This is the shape
//! of the RP2040 ADC, and the sampler drives it register-by-register so it
//! can bound every wait.

/// Multiplexed ADC with a result FIFO
///
/// Implementations own the ADC block exclusively. None of these calls may
/// block; waiting for a conversion is the caller's job (it polls
/// [`AdcFifo::is_empty`] with its own budget).
pub trait AdcFifo {
    /// Route mux input `input` to the converter
    fn select_input(&mut self, input: u8);

    /// Power the on-die temperature sensor on or off
    fn set_temp_sensor_enabled(&mut self, enabled: bool);

    /// Discard any results still queued in the FIFO
    fn drain(&mut self);

    /// Start or stop free-running conversions
    fn set_running(&mut self, running: bool);

    /// Check whether the FIFO holds no results
    fn is_empty(&self) -> bool;

    /// Pop the oldest result from the FIFO
    ///
    /// Only meaningful when [`AdcFifo::is_empty`] returned `false`.
    fn pop(&mut self) -> u16;
}
