//! Cycle-and-soak planner (spec §4.8, component C8): splits a gross
//! irrigation depth into one or more application cycles when the
//! method's application rate would outrun the soil's infiltration rate.

use crate::config::EngineConfig;
use crate::models::reference::{MethodEntry, SoilTexture};

/// A planned irrigation run: `cycle_count` repetitions of
/// `cycle_duration_min`, separated by `soak_interval_min` of rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclePlan {
    pub cycle_count: u32,
    pub cycle_duration_min: f32,
    pub soak_interval_min: f32,
}

impl CyclePlan {
    /// Single continuous cycle — the fallback when infiltration data is
    /// unavailable (spec §4.8) or when application rate doesn't outrun
    /// infiltration.
    pub fn single(duration_min: f32) -> Self {
        Self {
            cycle_count: 1,
            cycle_duration_min: duration_min,
            soak_interval_min: 0.0,
        }
    }
}

/// Plans cycles for a `gross_depth_mm` irrigation depth at the given
/// method's application rate against `infiltration_rate_mm_h`. Returns a
/// single continuous cycle when infiltration data is `None` (soil
/// collaborator unavailable, spec §4.8) or when application rate doesn't
/// meaningfully outrun infiltration.
pub fn plan_cycles(
    gross_depth_mm: f32,
    method: &MethodEntry,
    infiltration_rate_mm_h: Option<f32>,
    texture: SoilTexture,
    cfg: &EngineConfig,
) -> CyclePlan {
    let Some(infil) = infiltration_rate_mm_h else {
        let r_app = method.application_rate_midpoint_mm_h().max(1e-6);
        let duration_min = (gross_depth_mm / r_app) * 60.0;
        return CyclePlan::single(duration_min.max(0.0));
    };

    let r_app = method.application_rate_midpoint_mm_h().max(1e-6);

    if r_app <= 1.2 * infil {
        let duration_min = (gross_depth_mm / r_app) * 60.0;
        return CyclePlan::single(duration_min.max(0.0));
    }

    let target = 0.8 * infil;
    let raw_count = (r_app / target.max(1e-6)).ceil() as u32;
    let cycle_count = raw_count.clamp(cfg.cycle_count_clamp.0, cfg.cycle_count_clamp.1);

    let total_duration_min = (gross_depth_mm / target.max(1e-6)) * 60.0;
    let cycle_duration_min = (total_duration_min / cycle_count as f32)
        .clamp(cfg.cycle_duration_clamp_min.0, cfg.cycle_duration_clamp_min.1);

    let soak_interval_min = (cycle_duration_min * texture.soak_multiplier())
        .clamp(cfg.soak_clamp_min.0, cfg.soak_clamp_min.1);

    CyclePlan {
        cycle_count,
        cycle_duration_min,
        soak_interval_min,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reference::MethodClass;

    fn drip() -> MethodEntry {
        MethodEntry {
            efficiency: 0.9,
            distribution_uniformity: 0.85,
            wetting_fraction: 0.35,
            application_rate_min_mm_h: 1.0,
            application_rate_max_mm_h: 3.0,
            class: MethodClass::Drip,
        }
    }

    fn sprinkler_fast() -> MethodEntry {
        MethodEntry {
            efficiency: 0.75,
            distribution_uniformity: 0.8,
            wetting_fraction: 1.0,
            application_rate_min_mm_h: 18.0,
            application_rate_max_mm_h: 22.0, // midpoint 20
            class: MethodClass::Sprinkler,
        }
    }

    #[test]
    fn drip_within_infiltration_is_single_cycle() {
        let cfg = EngineConfig::default();
        let plan = plan_cycles(10.0, &drip(), Some(10.0), SoilTexture::Clay, &cfg);
        assert_eq!(plan.cycle_count, 1);
        assert_eq!(plan.soak_interval_min, 0.0);
    }

    #[test]
    fn fast_sprinkler_on_clay_splits_into_multiple_cycles_with_soak() {
        let cfg = EngineConfig::default();
        // R_app=20 on infil=5 => 20 > 1.2*5=6, splits.
        let plan = plan_cycles(15.0, &sprinkler_fast(), Some(5.0), SoilTexture::Clay, &cfg);
        assert!(plan.cycle_count >= 2);
        assert!(plan.cycle_count <= 6);
        assert!(plan.soak_interval_min >= cfg.soak_clamp_min.0);
        assert!(plan.soak_interval_min <= cfg.soak_clamp_min.1);
        assert!(plan.cycle_duration_min >= cfg.cycle_duration_clamp_min.0);
        assert!(plan.cycle_duration_min <= cfg.cycle_duration_clamp_min.1);
    }

    #[test]
    fn missing_infiltration_data_falls_back_to_single_cycle() {
        let cfg = EngineConfig::default();
        let plan = plan_cycles(12.0, &drip(), None, SoilTexture::Sand, &cfg);
        assert_eq!(plan.cycle_count, 1);
    }

    #[test]
    fn sand_has_lower_soak_multiplier_than_clay() {
        let cfg = EngineConfig::default();
        let sand_plan = plan_cycles(15.0, &sprinkler_fast(), Some(5.0), SoilTexture::Sand, &cfg);
        let clay_plan = plan_cycles(15.0, &sprinkler_fast(), Some(5.0), SoilTexture::Clay, &cfg);
        assert!(sand_plan.soak_interval_min <= clay_plan.soak_interval_min);
    }
}
