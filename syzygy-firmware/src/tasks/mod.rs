//! Embassy async tasks on core 0
//!
//! Each task runs independently and talks to core 1 only through the
//! shared statics in `channels`.

pub mod readings;
pub mod supervisor;

#[cfg(feature = "dev-mode")]
pub use freeze_test::freeze_test_task;
pub use readings::readings_task;
pub use supervisor::supervisor_task;
