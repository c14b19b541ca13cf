//! Two small measurement programs sharing one configuration and error layer.
//!
//! - `memory` runs [`alloc_stress::run_cycles`] under a [`heap_profile::HeapProfile`]
//!   and leaves a DHAT heap profile in the working directory.
//! - `speed` runs [`call_timer::run_all`] and prints how long a million calls
//!   take with a 64 KiB and a 1-byte record, by value and by reference.

pub mod alloc_stress;
pub mod call_timer;
pub mod config;
pub mod error;
pub mod heap_profile;
pub mod logging;

pub use alloc_stress::{allocate_cycle, run_cycles, RetainedSet, RetainedSlot};
pub use call_timer::{measure_batch, run_all, Batch, Convention, Measurement, RecordSize};
pub use config::Settings;
pub use error::{Error, Result};
pub use heap_profile::{HeapProfile, HeapSnapshot};
