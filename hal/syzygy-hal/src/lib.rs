//! Syzygy Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the acquisition and
//! supervision logic is written against. Chip-specific HALs implement them
//! for real silicon, and host tests implement them with small fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  syzygy-firmware (boot, tasks, cores)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  syzygy-core (sampler, supervisor, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  syzygy-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  syzygy-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`adc::AdcFifo`] - Multiplexed ADC with a conversion FIFO
//! - [`clock::Monotonic`] - Free-running 32-bit microsecond clock
//! - [`watchdog::HardwareWatchdog`] - Hardware reset timer
//! - [`flash::SettingsStore`] - Byte-addressable persistent settings

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod clock;
pub mod flash;
pub mod watchdog;

// Re-export key traits at crate root for convenience
pub use adc::AdcFifo;
pub use clock::Monotonic;
pub use flash::{FlashError, SettingsStore};
pub use watchdog::{HardwareWatchdog, ResetCause};
