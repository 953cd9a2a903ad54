//! Dual-core watchdog supervision
//!
//! Each core stamps its own heartbeat whenever it refreshes. The hardware
//! watchdog is only kicked when the *other* core's heartbeat is recent, so
//! a healthy core cannot keep a hung one alive: kicks stop, the timeout
//! runs out and the whole chip resets.
//!
//! ```text
//!   core 0 ── refresh(Core0) ──┐                 ┌── refresh(Core1) ── core 1
//!                              ▼                 ▼
//!                    heartbeats[0]         heartbeats[1]
//!                              └──── peer fresh? ──── kick + LED
//! ```

pub mod grace;
pub mod heartbeat;
pub mod supervisor;

pub use grace::{FreezeSwitch, StartupGrace};
pub use heartbeat::{peer_alive, CoreId, Heartbeats};
pub use supervisor::{KickOutcome, WatchdogSupervisor};
