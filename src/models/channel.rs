//! Channel configuration and state (spec §3 "Channel state").

use crate::models::reference::PlantClass;
use crate::models::water_balance::WaterBalance;

/// Automation mode for a channel (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutomationMode {
    Off,
    Quality,
    Eco,
}

impl AutomationMode {
    /// Whether the net-depth reduction for ECO mode (spec §4.7 step 1)
    /// applies.
    pub fn is_eco(self) -> bool {
        matches!(self, AutomationMode::Eco)
    }

    /// QUALITY/ECO both require full reference-table configuration
    /// (spec §3 invariant); OFF does not run the pipeline at all.
    pub fn requires_reference_indices(self) -> bool {
        matches!(self, AutomationMode::Quality | AutomationMode::Eco)
    }
}

/// Coverage mode: an area in m², or a fixed plant count (spec §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coverage {
    Area { area_m2: f32 },
    PlantCount { count: u32 },
}

/// Reference-table indices for a channel. `u16::MAX` is used as the
/// "unset" sentinel so the struct stays `Copy` without an `Option` per
/// field; [`Channel::validate`] is where that sentinel is turned into a
/// `ConfigMissing` error for modes that require it.
pub const UNSET_INDEX: u16 = u16::MAX;

/// One irrigation channel's persisted configuration and runtime state
/// (spec §3). Invariant: if `automation_mode` is QUALITY or ECO, all
/// three reference indices must be valid (`!= UNSET_INDEX`) and
/// `planting_unix_s` must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    pub latitude_deg: f32,
    pub sun_exposure_pct: f32,
    pub automation_mode: AutomationMode,
    pub coverage: Coverage,
    pub plant_index: u16,
    pub soil_index: u16,
    pub method_index: u16,
    /// Coarse plant-type class, configured independently of the full
    /// reference table so the SIMPLIFIED/DEFAULTS recovery levels have
    /// something to key Kc/volume off even when `plant_by_index` is
    /// unreachable (spec §4.9).
    pub plant_class: PlantClass,
    /// Unix seconds the channel was planted; `None` if not yet planted.
    pub planting_unix_s: Option<u32>,
    /// Cached days-after-planting, refreshed once per daily update.
    pub days_after_planting: u32,
    /// Optional cap on volume delivered in one decision, litres.
    pub max_volume_l: Option<f32>,
    /// Monotonic time of this channel's last `calculate_irrigation` call.
    pub last_calc_ms: u64,
    pub water_balance: WaterBalance,
}

impl Channel {
    pub fn has_reference_indices(&self) -> bool {
        self.plant_index != UNSET_INDEX
            && self.soil_index != UNSET_INDEX
            && self.method_index != UNSET_INDEX
    }

    /// Enforces the §3 invariant for QUALITY/ECO channels.
    pub fn is_configured_for_automation(&self) -> bool {
        if self.automation_mode.requires_reference_indices() {
            self.has_reference_indices() && self.planting_unix_s.is_some()
        } else {
            true
        }
    }
}

/// Solar event a schedule entry anchors to (spec §4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarEvent {
    Sunrise,
    Sunset,
}

/// A schedule entry's solar-anchored timing configuration (spec §4.11).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEvent {
    pub use_solar: bool,
    pub event: SolarEvent,
    /// Offset in minutes, clamped to `[-120, 120]`.
    pub offset_min: i32,
}

impl ScheduleEvent {
    pub fn clamped_offset_min(&self) -> i32 {
        self.offset_min.clamp(-120, 120)
    }
}
