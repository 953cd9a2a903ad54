//! ADC FIFO access
//!
//! embassy-rp's blocking `Adc` waits on a single conversion without a
//! bound. The sampler needs to bound every wait, so this drives the FIFO
//! registers directly and uses `Adc`/`Channel` only for bring-up:
//! resetting and enabling the block, and switching the analog pads out of
//! digital mode.
//!
//! RP2040 has a single ADC with 5 mux inputs:
//! - ADC0-3: GPIO26-29
//! - ADC4: Internal temperature sensor

use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::pac;
use heapless::Vec;
use syzygy_core::channel::CHANNEL_COUNT;
use syzygy_hal::AdcFifo;

/// ADC owned by the sampling core
pub struct Rp2040Adc<'d> {
    _adc: Adc<'d, Blocking>,
    _pads: Vec<Channel<'d>, CHANNEL_COUNT>,
}

impl<'d> Rp2040Adc<'d> {
    /// Take over an initialised ADC and its configured inputs
    ///
    /// The FIFO is enabled with a threshold of one result; the DMA and IRQ
    /// paths stay off.
    pub fn new(adc: Adc<'d, Blocking>, pads: Vec<Channel<'d>, CHANNEL_COUNT>) -> Self {
        let r = pac::ADC;
        r.fcs().modify(|w| {
            w.set_en(true);
            w.set_dreq_en(false);
            w.set_thresh(1);
            w.set_shift(false);
            w.set_err(false);
        });
        r.inte().write(|w| w.set_fifo(false));
        // Creating the temperature channel powers the sensor; the sampler
        // switches it per read instead
        r.cs().modify(|w| w.set_ts_en(false));

        Self {
            _adc: adc,
            _pads: pads,
        }
    }
}

impl AdcFifo for Rp2040Adc<'_> {
    fn select_input(&mut self, input: u8) {
        pac::ADC.cs().modify(|w| w.set_ainsel(input));
    }

    fn set_temp_sensor_enabled(&mut self, enabled: bool) {
        pac::ADC.cs().modify(|w| w.set_ts_en(enabled));
    }

    fn drain(&mut self) {
        let r = pac::ADC;
        while !r.fcs().read().empty() {
            let _ = r.fifo().read();
        }
    }

    fn set_running(&mut self, running: bool) {
        pac::ADC.cs().modify(|w| w.set_start_many(running));
    }

    fn is_empty(&self) -> bool {
        pac::ADC.fcs().read().empty()
    }

    fn pop(&mut self) -> u16 {
        pac::ADC.fifo().read().val()
    }
}
