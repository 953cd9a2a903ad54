//! Continuous multi-channel ADC acquisition
//!
//! The sampling core owns the ADC for the lifetime of the firmware. It
//! sweeps every enabled channel, averages raw conversions into
//! single-sample-equivalent readings, and publishes them to the
//! [`ReadingBoard`] where the control core picks them up without locking.
//!
//! ```text
//!   ChannelSampler ──raw──▶ Oversampler ──every N──▶ ReadingBoard ──▶ core 0
//!         ▲                                                  │
//!         └──────────── AcquisitionLoop (core 1) ◀── enable ─┘
//! ```

pub mod board;
pub mod oversample;
pub mod sampler;
pub mod task;

pub use board::ReadingBoard;
pub use oversample::Oversampler;
pub use sampler::{ChannelSampler, SampleOutcome};
pub use task::{AcquisitionLoop, ServiceOutcome, StepReport, SweepReport};
