//! Configuration types
//!
//! Board-agnostic configuration structures, stored as postcard binary data
//! or parsed from the compiled-in `machine.toml`.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;
