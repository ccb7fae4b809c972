//! In-memory mock collaborators for tests and the demo binary.
//!
//! Grounded in the teacher's `AppState` pattern (a plain collection
//! wrapped behind getter/setter methods, spec-unaware) — generalised
//! here to the narrow collaborator traits each external surface is
//! represented by in this crate (spec §6).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::collaborators::{
    ChannelRegistry, EnvSensors, MethodDatabase, MonotonicClock, PersistentStorage, PlantDatabase, RainHistory,
    SoilDatabase, WallClock,
};
use crate::error::EngineResult;
use crate::models::{Channel, EnvReading, MethodEntry, PlantEntry, SoilEntry, WaterBalance};

#[derive(Default)]
pub struct MockPlantDatabase {
    pub entries: HashMap<u16, PlantEntry>,
}

impl PlantDatabase for MockPlantDatabase {
    fn plant_by_index(&self, index: u16) -> Option<PlantEntry> {
        self.entries.get(&index).copied()
    }
}

#[derive(Default)]
pub struct MockSoilDatabase {
    pub entries: HashMap<u16, SoilEntry>,
}

impl SoilDatabase for MockSoilDatabase {
    fn soil_by_index(&self, index: u16) -> Option<SoilEntry> {
        self.entries.get(&index).copied()
    }
}

#[derive(Default)]
pub struct MockMethodDatabase {
    pub entries: HashMap<u16, MethodEntry>,
}

impl MethodDatabase for MockMethodDatabase {
    fn method_by_index(&self, index: u16) -> Option<MethodEntry> {
        self.entries.get(&index).copied()
    }
}

#[derive(Default)]
pub struct MockChannelRegistry {
    pub channels: HashMap<usize, Channel>,
}

impl ChannelRegistry for MockChannelRegistry {
    fn get_channel(&self, channel_id: usize) -> Option<Channel> {
        self.channels.get(&channel_id).copied()
    }

    fn set_channel(&mut self, channel_id: usize, channel: Channel) {
        self.channels.insert(channel_id, channel);
    }
}

#[derive(Default)]
pub struct MockEnvSensors {
    pub readings: HashMap<usize, EnvReading>,
}

impl EnvSensors for MockEnvSensors {
    fn read_env(&self, channel_id: usize) -> EnvReading {
        self.readings
            .get(&channel_id)
            .copied()
            .unwrap_or_else(|| EnvReading::unavailable(1, 0))
    }
}

#[derive(Default)]
pub struct MockRainHistory {
    pub rain_mm: HashMap<usize, f32>,
}

impl RainHistory for MockRainHistory {
    fn last_24h_mm(&self, channel_id: usize) -> f32 {
        self.rain_mm.get(&channel_id).copied().unwrap_or(0.0)
    }
}

/// Monotonic clock backed by a plain counter — advance it explicitly
/// with [`MockClock::advance_ms`] to simulate time passing between
/// decisions.
pub struct MockClock {
    now_ms: Cell<u64>,
}

impl MockClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now_ms: Cell::new(start_ms) }
    }

    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl MonotonicClock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

pub struct MockWallClock {
    pub unix_s: u32,
    pub offset_hours: f32,
}

impl WallClock for MockWallClock {
    fn now_unix_utc(&self) -> u32 {
        self.unix_s
    }

    fn utc_offset_hours(&self, _unix_s: u32) -> f32 {
        self.offset_hours
    }
}

/// Always-succeeds persistent storage, recording the last saved
/// `WaterBalance` per channel for assertions.
#[derive(Default)]
pub struct MockStorage {
    pub saved: RefCell<HashMap<usize, WaterBalance>>,
}

impl PersistentStorage for MockStorage {
    fn save_channel_water_balance(&mut self, channel_id: usize, wb: WaterBalance) -> EngineResult<()> {
        self.saved.borrow_mut().insert(channel_id, wb);
        Ok(())
    }
}
