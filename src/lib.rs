//! FAO-56 based irrigation decision engine for resource-constrained
//! controllers (spec §1/§2). A synchronous, allocation-light library:
//! reference-ET estimation with degraded-sensor fallbacks, phenological
//! crop coefficients, soil water balance with MAD-based triggering,
//! volume synthesis and cycle-and-soak scheduling, a tolerance-keyed
//! memoisation cache, and a FULL -> SIMPLIFIED -> DEFAULTS -> MANUAL
//! recovery ladder.
//!
//! Hardware, storage, BLE, the task scheduler and the wall-clock/RTC are
//! out of scope (spec §2 Non-goals) and are represented only by the
//! narrow traits in [`collaborators`] that the host firmware implements.

pub mod cache;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod logger;
pub mod models;
pub mod services;
pub mod testutil;

/// Fixed channel capacity the engine's cache and per-channel state are
/// sized by (spec §5: "all state fits in fixed arrays sized by
/// CHANNEL_COUNT"). A production build tunes this to the controller's
/// actual valve count at compile time.
pub const CHANNEL_COUNT: usize = 8;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Computed, EngineError, EngineResult, Recovery};
pub use logger::{Logger, NullLogger, StdoutLogger};
