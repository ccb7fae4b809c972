//! Error taxonomy surfaced to callers (spec §6/§7).

use thiserror::Error;

/// The complete set of errors the engine can return across every entry
/// point in [`crate::engine`]. Variants map 1:1 onto spec §6's taxonomy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Bad channel id, null result sink, out-of-range constant, etc.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// An entry point was called before `init_cache()` / equivalent setup.
    #[error("engine not initialized: {0}")]
    NotInitialized(String),

    /// Reference data (plant/soil/method) or channel configuration is
    /// missing for a required lookup.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// A reading or stored record violates a documented invariant.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The recovery ladder bottomed out without producing a usable volume.
    #[error("hardware/unrecoverable failure: {0}")]
    Hardware(String),

    /// A collaborator call exceeded its time budget.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Solar calculation fell back to polar defaults. Warning-level only;
    /// carried on [`Computed`], never returned as a hard `Err` from the
    /// solar entry points.
    #[error("solar fallback: {0}")]
    SolarFallback(String),
}

/// The recovery level a decision was produced at (spec §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recovery {
    /// Full pipeline: Penman-Monteith/Hargreaves ET₀, full phenology, full
    /// water balance.
    Full,
    /// Temperature-only ET with a coarse plant-type Kc.
    Simplified,
    /// Plant-class lookup table, no live sensor data at all.
    Defaults,
    /// Even the defaults table could not produce a volume; caller must
    /// surface this to the user.
    Manual,
}

impl Recovery {
    pub fn is_degraded(self) -> bool {
        !matches!(self, Recovery::Full)
    }
}

/// Wraps a value that may carry a non-fatal warning instead of failing
/// outright — used for the two solar entry points (spec §6), where a
/// polar/undefined calculation still "produces a usable value" per §4.1.
#[derive(Debug, Clone, PartialEq)]
pub struct Computed<T> {
    pub value: T,
    pub warning: Option<EngineError>,
}

impl<T> Computed<T> {
    pub fn ok(value: T) -> Self {
        Self { value, warning: None }
    }

    pub fn warned(value: T, warning: EngineError) -> Self {
        Self { value, warning: Some(warning) }
    }

    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
