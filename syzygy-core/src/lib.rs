//! Board-agnostic core logic for the Syzygy firmware
//!
//! This crate contains all acquisition and supervision logic that does not
//! depend on specific hardware implementations:
//!
//! - Channel model and oversampled multi-channel acquisition
//! - Lock-free cross-core reading board
//! - Dual-core watchdog supervision (heartbeats, liveness rule)
//! - Flash-backed settings store with CRC-16
//! - Configuration type definitions and TOML subset parser
//! - On-die temperature sensor conversion

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod acquisition;
pub mod channel;
pub mod config;
pub mod soc_temp;
pub mod storage;
pub mod supervision;

#[cfg(test)]
pub(crate) mod testing;
