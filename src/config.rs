//! Centralised tunable constants (spec §6: "Tunable constants (all
//! centralised)"). Grounded in the teacher's `Config::load`, which reads a
//! JSON file via `serde_json` and leans on `#[serde(default = "...")]` for
//! optional fields — generalised here to the engine's much larger tunable
//! surface instead of a handful of server ports.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

fn default_et0_clamp() -> (f32, f32) {
    (0.0, 15.0)
}
fn default_kc_clamp_full() -> (f32, f32) {
    (0.1, 2.0)
}
fn default_kc_clamp_simplified() -> (f32, f32) {
    (0.3, 1.5)
}
fn default_kc_clamp_auto() -> (f32, f32) {
    (0.3, 1.4)
}
fn default_heuristic_coeff() -> f32 {
    0.045
}
fn default_heuristic_offset_c() -> f32 {
    20.0
}
fn default_heuristic_vpd_floor_kpa() -> f32 {
    0.05
}
fn default_heuristic_range() -> (f32, f32) {
    (0.5, 6.0)
}
fn default_assumed_wind_m_s() -> f32 {
    2.0
}
fn default_sunshine_ratio() -> f32 {
    0.50
}
fn default_albedo() -> f32 {
    0.23
}
fn default_standard_pressure_kpa() -> f32 {
    101.3
}
fn default_et0_tolerance_c() -> f32 {
    0.5
}
fn default_et0_tolerance_rh_pct() -> f32 {
    5.0
}
fn default_et0_tolerance_p_hpa() -> f32 {
    2.0
}
fn default_et0_tolerance_lat_rad() -> f32 {
    0.01
}
fn default_et0_max_age_s() -> u64 {
    3600
}
fn default_kc_max_age_s() -> u64 {
    3600
}
fn default_wb_tolerance_root_depth_m() -> f32 {
    0.01
}
fn default_wb_max_age_s() -> u64 {
    900
}
fn default_min_hit_ratio_samples() -> u32 {
    100
}
fn default_min_hit_ratio() -> f32 {
    0.5
}
fn default_cycle_count_clamp() -> (u32, u32) {
    (2, 6)
}
fn default_cycle_duration_clamp_min() -> (f32, f32) {
    (5.0, 60.0)
}
fn default_soak_clamp_min() -> (f32, f32) {
    (10.0, 240.0)
}
fn default_max_missed_days() -> u32 {
    30
}
fn default_channel_count() -> usize {
    crate::CHANNEL_COUNT
}

/// All constants spec §6 asks to be centralised, plus the cache tolerances
/// named in §4.10. Every field has a conservative default matching the
/// spec text, so `EngineConfig::default()` alone is enough to run the
/// engine with no configuration file present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_channel_count")]
    pub channel_count: usize,

    #[serde(default = "default_et0_clamp")]
    pub et0_clamp_mm_day: (f32, f32),
    #[serde(default = "default_kc_clamp_full")]
    pub kc_clamp_full: (f32, f32),
    #[serde(default = "default_kc_clamp_simplified")]
    pub kc_clamp_simplified: (f32, f32),
    #[serde(default = "default_kc_clamp_auto")]
    pub kc_clamp_auto: (f32, f32),

    #[serde(default = "default_heuristic_coeff")]
    pub heuristic_et_coeff: f32,
    #[serde(default = "default_heuristic_offset_c")]
    pub heuristic_et_offset_c: f32,
    #[serde(default = "default_heuristic_vpd_floor_kpa")]
    pub heuristic_vpd_floor_kpa: f32,
    #[serde(default = "default_heuristic_range")]
    pub heuristic_et_range_mm_day: (f32, f32),

    #[serde(default = "default_assumed_wind_m_s")]
    pub assumed_wind_m_s: f32,
    #[serde(default = "default_sunshine_ratio")]
    pub assumed_sunshine_ratio: f32,
    #[serde(default = "default_albedo")]
    pub assumed_albedo: f32,
    #[serde(default = "default_standard_pressure_kpa")]
    pub standard_pressure_kpa: f32,

    #[serde(default = "default_et0_tolerance_c")]
    pub et0_tolerance_temp_c: f32,
    #[serde(default = "default_et0_tolerance_rh_pct")]
    pub et0_tolerance_rh_pct: f32,
    #[serde(default = "default_et0_tolerance_p_hpa")]
    pub et0_tolerance_pressure_hpa: f32,
    #[serde(default = "default_et0_tolerance_lat_rad")]
    pub et0_tolerance_lat_rad: f32,
    #[serde(default = "default_et0_max_age_s")]
    pub et0_cache_max_age_s: u64,
    #[serde(default = "default_kc_max_age_s")]
    pub kc_cache_max_age_s: u64,
    #[serde(default = "default_wb_tolerance_root_depth_m")]
    pub wb_tolerance_root_depth_m: f32,
    #[serde(default = "default_wb_max_age_s")]
    pub wb_cache_max_age_s: u64,

    #[serde(default = "default_min_hit_ratio_samples")]
    pub cache_min_samples_for_autoclear: u32,
    #[serde(default = "default_min_hit_ratio")]
    pub cache_min_hit_ratio: f32,

    #[serde(default = "default_cycle_count_clamp")]
    pub cycle_count_clamp: (u32, u32),
    #[serde(default = "default_cycle_duration_clamp_min")]
    pub cycle_duration_clamp_min: (f32, f32),
    #[serde(default = "default_soak_clamp_min")]
    pub soak_clamp_min: (f32, f32),

    #[serde(default = "default_max_missed_days")]
    pub max_missed_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // Deserialize an empty object so every field goes through its
        // `#[serde(default = ...)]`, keeping exactly one source of truth
        // for the defaults instead of duplicating them here.
        serde_json::from_str("{}").expect("EngineConfig defaults must parse")
    }
}

impl EngineConfig {
    /// Load from a JSON file, the same way the teacher's `Config::load`
    /// reads `config.json`. Any field missing from the file falls back to
    /// its documented default.
    pub fn load(path: &str) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::ConfigMissing(format!("{path}: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| EngineError::InvalidData(format!("{path}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let c = EngineConfig::default();
        assert_eq!(c.et0_clamp_mm_day, (0.0, 15.0));
        assert_eq!(c.kc_clamp_full, (0.1, 2.0));
        assert_eq!(c.kc_clamp_simplified, (0.3, 1.5));
        assert_eq!(c.assumed_wind_m_s, 2.0);
        assert_eq!(c.assumed_sunshine_ratio, 0.50);
        assert_eq!(c.assumed_albedo, 0.23);
        assert_eq!(c.channel_count, crate::CHANNEL_COUNT);
    }

    #[test]
    fn partial_json_fills_in_missing_fields_from_defaults() {
        let json = r#"{ "assumed_wind_m_s": 3.5 }"#;
        let c: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.assumed_wind_m_s, 3.5);
        assert_eq!(c.et0_clamp_mm_day, (0.0, 15.0));
    }
}
