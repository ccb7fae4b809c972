//! Phenological stage, crop coefficient and root-depth development
//! (spec §4.4, component C4).

use crate::config::EngineConfig;
use crate::models::reference::{PlantClass, PlantEntry};

/// Which of the four FAO-56 growth stages a given days-after-planting
/// falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initial,
    Development,
    Mid,
    End,
}

/// Classifies `days_after_planting` against the plant entry's stage
/// boundaries `[0, Lini], (Lini, Lini+Ldev], (·, ·+Lmid], (·, ·+Lend]`
/// (spec §4.4). Days past the season end still classify as `End` —
/// `crop_coefficient` clamps the end-stage progress to 1 rather than
/// extrapolating past `Kc_end`.
pub fn classify_stage(plant: &PlantEntry, days_after_planting: u32) -> Stage {
    let init_end = plant.stage_init_days as u32;
    let dev_end = init_end + plant.stage_dev_days as u32;
    let mid_end = dev_end + plant.stage_mid_days as u32;

    if days_after_planting <= init_end {
        Stage::Initial
    } else if days_after_planting <= dev_end {
        Stage::Development
    } else if days_after_planting <= mid_end {
        Stage::Mid
    } else {
        Stage::End
    }
}

/// Piecewise-linear Kc from the full reference-table path (spec §4.4),
/// clamped to `cfg.kc_clamp_full`.
pub fn crop_coefficient(plant: &PlantEntry, days_after_planting: u32, cfg: &EngineConfig) -> f32 {
    let init_end = plant.stage_init_days as u32;
    let dev_end = init_end + plant.stage_dev_days as u32;
    let mid_end = dev_end + plant.stage_mid_days as u32;
    let end_end = mid_end + plant.stage_end_days as u32;

    let kc_init = plant.kc_init();
    let kc_mid = plant.kc_mid();
    let kc_end = plant.kc_end();

    let raw = match classify_stage(plant, days_after_planting) {
        Stage::Initial => kc_init,
        Stage::Development => {
            let span = plant.stage_dev_days as f32;
            if span <= 0.0 {
                kc_mid
            } else {
                let progress = (days_after_planting - init_end) as f32 / span;
                kc_init + (kc_mid - kc_init) * progress.clamp(0.0, 1.0)
            }
        }
        Stage::Mid => kc_mid,
        Stage::End => {
            let span = plant.stage_end_days as f32;
            let progress = if span <= 0.0 {
                1.0
            } else if days_after_planting >= end_end {
                1.0
            } else {
                ((days_after_planting - mid_end) as f32 / span).clamp(0.0, 1.0)
            };
            kc_mid + (kc_end - kc_mid) * progress
        }
    };

    raw.clamp(cfg.kc_clamp_full.0, cfg.kc_clamp_full.1)
}

/// Crude Kc used by the SIMPLIFIED recovery level (spec §4.4/§4.9): a
/// flat value by coarse plant-type class, clamped to `cfg.kc_clamp_simplified`.
pub fn simplified_crop_coefficient(plant_class: PlantClass, cfg: &EngineConfig) -> f32 {
    plant_class
        .coarse_kc()
        .clamp(cfg.kc_clamp_simplified.0, cfg.kc_clamp_simplified.1)
}

/// Root-zone depth, metres, via a sigmoid on season progress `s =
/// min(DAP / Ltotal, 1)` (spec §4.4). Zero-season plant entries (every
/// stage duration zero) fall back to `depth_min` rather than dividing by
/// zero.
pub fn root_depth_m(plant: &PlantEntry, days_after_planting: u32) -> f32 {
    let total = plant.total_days();
    if total == 0 {
        return plant.root_depth_min_m();
    }

    let s = (days_after_planting as f32 / total as f32).min(1.0);
    let depth_min = plant.root_depth_min_m();
    let depth_max = plant.root_depth_max_m();
    let sigmoid = 1.0 / (1.0 + (-6.0 * (s - 0.5)).exp());
    depth_min + (depth_max - depth_min) * sigmoid
}
