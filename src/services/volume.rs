//! Volume synthesiser (spec §4.7, component C7): turns a root-zone
//! deficit into an applied volume, accounting for localisation,
//! application efficiency, effective wetted area and plant/area coverage.

use crate::models::channel::Coverage;
use crate::models::reference::{MethodEntry, PlantEntry};

const AREA_PER_PLANT_MIN_M2: f32 = 0.002;
const AREA_PER_PLANT_MAX_M2: f32 = 100.0;
const AREA_MODE_THRESHOLD_L: f32 = 0.5;

/// Outcome of [`synthesize`] before cycle planning — net/gross depth and
/// the litres to apply, plus whether the configured max-volume clamp cut
/// it down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSynthesis {
    pub net_depth_mm: f32,
    pub gross_depth_mm: f32,
    pub volume_l: f32,
    pub effective_area_m2: f32,
    pub volume_limited: bool,
}

fn area_per_plant_m2(plant: &PlantEntry) -> f32 {
    let row = plant.row_spacing_m();
    let spacing = plant.plant_spacing_m();
    let from_spacing = row * spacing;
    let area = if from_spacing > 0.0 {
        from_spacing
    } else {
        let density = plant.density_per_m2();
        if density > 0.0 {
            1.0 / density
        } else {
            1.0
        }
    };
    area.clamp(AREA_PER_PLANT_MIN_M2, AREA_PER_PLANT_MAX_M2)
}

/// Canopy factor `0.8 + 0.2*canopy_cover` used by the plant-coverage
/// wetting adjustment and effective-area computation (spec §4.7 step 2/4).
fn canopy_factor(plant: &PlantEntry) -> f32 {
    0.8 + 0.2 * plant.canopy_cover_max()
}

/// Synthesises an applied volume from a root-zone `deficit_mm` (spec
/// §4.7). `plant` is only consulted in `Coverage::PlantCount` mode.
pub fn synthesize(
    deficit_mm: f32,
    method: &MethodEntry,
    coverage: Coverage,
    plant: Option<&PlantEntry>,
    eco_mode: bool,
    max_volume_l: Option<f32>,
) -> VolumeSynthesis {
    let mut net = deficit_mm.max(0.0);
    if eco_mode {
        net *= 0.7;
    }

    let wf = method.wetting_fraction;
    if wf < 0.9 && wf > 0.0 {
        net = match (coverage, plant) {
            (Coverage::PlantCount { .. }, Some(p)) => net / (wf * canopy_factor(p)),
            _ => net / wf.sqrt(),
        };
    }

    let mut gross = net / method.efficiency.max(1e-6);
    if method.distribution_uniformity < 1.0 && method.distribution_uniformity > 0.0 {
        gross /= method.distribution_uniformity;
    }

    let effective_area_m2 = match coverage {
        Coverage::Area { area_m2 } => area_m2 * wf,
        Coverage::PlantCount { count } => {
            let per_plant = plant
                .map(|p| area_per_plant_m2(p) * canopy_factor(p) * wf)
                .unwrap_or(1.0 * wf);
            per_plant * count as f32
        }
    };

    let mut volume_l = gross * effective_area_m2;

    let threshold = match coverage {
        Coverage::Area { .. } => AREA_MODE_THRESHOLD_L,
        Coverage::PlantCount { .. } => (0.1 * effective_area_m2).max(0.5),
    };
    if volume_l < threshold {
        return VolumeSynthesis {
            net_depth_mm: 0.0,
            gross_depth_mm: 0.0,
            volume_l: 0.0,
            effective_area_m2,
            volume_limited: false,
        };
    }

    let mut volume_limited = false;
    if let Some(max_l) = max_volume_l {
        if volume_l > max_l {
            let scale = max_l / volume_l;
            volume_l = max_l;
            gross *= scale;
            net *= scale;
            volume_limited = true;
        }
    }

    VolumeSynthesis {
        net_depth_mm: net,
        gross_depth_mm: gross,
        volume_l,
        effective_area_m2,
        volume_limited,
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

    fn sprinkler() -> MethodEntry {
        MethodEntry {
            efficiency: 0.75,
            distribution_uniformity: 0.8,
            wetting_fraction: 1.0,
            application_rate_min_mm_h: 10.0,
            application_rate_max_mm_h: 20.0,
            class: MethodClass::Sprinkler,
        }
    }

    #[test]
    fn area_mode_full_sensor_tomato_scenario_yields_nonzero_volume() {
        let result = synthesize(6.3, &drip(), Coverage::Area { area_m2: 10.0 }, None, false, None);
        assert!(result.volume_l > 0.0);
        assert!(!result.volume_limited);
        assert!(result.net_depth_mm > 6.3, "wetting adjustment should inflate net depth for wf<0.9");
    }

    #[test]
    fn eco_mode_reduces_net_depth_by_thirty_percent() {
        let normal = synthesize(10.0, &sprinkler(), Coverage::Area { area_m2: 5.0 }, None, false, None);
        let eco = synthesize(10.0, &sprinkler(), Coverage::Area { area_m2: 5.0 }, None, true, None);
        assert!((eco.net_depth_mm - 0.7 * normal.net_depth_mm).abs() < 1e-4);
    }

    #[test]
    fn below_threshold_volume_zeroes_out() {
        let result = synthesize(0.01, &sprinkler(), Coverage::Area { area_m2: 0.5 }, None, false, None);
        assert_eq!(result.volume_l, 0.0);
    }

    #[test]
    fn max_volume_clamp_scales_net_and_gross_together() {
        let unclamped = synthesize(20.0, &sprinkler(), Coverage::Area { area_m2: 20.0 }, None, false, None);
        let clamped = synthesize(20.0, &sprinkler(), Coverage::Area { area_m2: 20.0 }, None, false, Some(10.0));
        assert!(clamped.volume_limited);
        assert_eq!(clamped.volume_l, 10.0);
        assert!(clamped.net_depth_mm < unclamped.net_depth_mm);
    }

    #[test]
    fn plant_mode_scales_with_count_and_canopy() {
        let plant = PlantEntry {
            stage_init_days: 30,
            stage_dev_days: 40,
            stage_mid_days: 50,
            stage_end_days: 20,
            kc_init_x1000: 400,
            kc_mid_x1000: 1150,
            kc_end_x1000: 700,
            root_depth_min_m_x1000: 200,
            root_depth_max_m_x1000: 600,
            depletion_fraction_x1000: 400,
            canopy_cover_max_x1000: 800,
            row_spacing_m_x1000: 1000,
            plant_spacing_m_x1000: 400,
            density_x100: 250,
            optimum_temp_min_c: 18.0,
            optimum_temp_max_c: 28.0,
        };
        let result = synthesize(8.0, &drip(), Coverage::PlantCount { count: 12 }, Some(&plant), false, None);
        assert!(result.volume_l > 0.0);
        assert!(result.effective_area_m2 > 0.0);
    }
}
