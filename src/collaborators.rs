//! External collaborator contracts (spec §6 "Collaborator contracts
//! consumed"). These are narrow traits the host firmware implements —
//! valve driving, flow sensing, persistent storage, the RTC/timezone,
//! BLE/GATT, and the task scheduler are all out of scope for this crate
//! (spec §2 Non-goals) and are represented here only as the interfaces
//! the engine needs from them, never as real subsystems.

use crate::error::EngineResult;
use crate::models::{Channel, EnvReading, MethodEntry, PlantEntry, SoilEntry, WaterBalance};

/// Read-only plant reference database.
pub trait PlantDatabase {
    fn plant_by_index(&self, index: u16) -> Option<PlantEntry>;
}

/// Read-only soil reference database.
pub trait SoilDatabase {
    fn soil_by_index(&self, index: u16) -> Option<SoilEntry>;
}

/// Read-only irrigation-method reference database.
pub trait MethodDatabase {
    fn method_by_index(&self, index: u16) -> Option<MethodEntry>;
}

/// Channel configuration/state registry. `get_channel`/`set_channel` give
/// the engine read/write access to a channel's persisted configuration
/// and its live `WaterBalance` without owning storage itself.
pub trait ChannelRegistry {
    fn get_channel(&self, channel_id: usize) -> Option<Channel>;
    fn set_channel(&mut self, channel_id: usize, channel: Channel);
}

/// Environment sensor access, per-field validity included (spec §3).
pub trait EnvSensors {
    fn read_env(&self, channel_id: usize) -> EnvReading;
}

/// Rainfall history, used by the precipitation partitioner (C5).
pub trait RainHistory {
    fn last_24h_mm(&self, channel_id: usize) -> f32;
}

/// Monotonic clock — never wraps over device lifetime (spec §6).
pub trait MonotonicClock {
    fn now_ms(&self) -> u64;
}

/// Wall clock + timezone, used to derive day-of-year and local time.
pub trait WallClock {
    fn now_unix_utc(&self) -> u32;
    /// Offset of local time from UTC, in hours (fractional for
    /// half-hour/quarter-hour zones).
    fn utc_offset_hours(&self, unix_s: u32) -> f32;
}

/// Persistent storage for per-channel water-balance state (spec §4.9:
/// "persisted through the external storage collaborator after each daily
/// update"). Failure is non-fatal — logged and retried next cycle (spec
/// §7 item 5).
pub trait PersistentStorage {
    fn save_channel_water_balance(&mut self, channel_id: usize, wb: WaterBalance) -> EngineResult<()>;
}

#[cfg(test)]
mod tests {
    // Trait-object-safety smoke tests: every collaborator trait must be
    // usable behind `dyn` since the engine holds them as trait objects.
    use super::*;

    fn _assert_object_safe(
        _p: &dyn PlantDatabase,
        _s: &dyn SoilDatabase,
        _m: &dyn MethodDatabase,
        _r: &dyn ChannelRegistry,
        _e: &dyn EnvSensors,
        _rh: &dyn RainHistory,
        _c: &dyn MonotonicClock,
        _w: &dyn WallClock,
        _st: &dyn PersistentStorage,
    ) {
    }
}
