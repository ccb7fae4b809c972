//! Precipitation partitioner (spec §4.5, component C5): splits a 24-h
//! rainfall total into runoff, post-rain evaporation, and the effective
//! depth actually available to the soil water balance.

use crate::models::reference::SoilEntry;

fn duration_band_h(rain_mm: f32) -> f32 {
    if rain_mm < 2.0 {
        0.5
    } else if rain_mm < 5.0 {
        1.0
    } else if rain_mm < 10.0 {
        1.5
    } else if rain_mm < 25.0 {
        3.0
    } else if rain_mm < 50.0 {
        6.0
    } else {
        12.0
    }
}

fn runoff_coefficient(intensity_mm_h: f32, infiltration_mm_h: f32, antecedent_moisture_pct: f32, soil: &SoilEntry) -> f32 {
    let mut c = ((intensity_mm_h - infiltration_mm_h) / intensity_mm_h).max(0.0);

    if antecedent_moisture_pct > 70.0 {
        c += 0.1 * (antecedent_moisture_pct - 70.0) / 30.0;
    } else if antecedent_moisture_pct < 30.0 {
        c -= 0.05 * (30.0 - antecedent_moisture_pct) / 30.0;
    }

    c += soil.texture.runoff_adjustment();
    c.clamp(0.0, 0.8)
}

fn evaporation_rate_mm_h(ambient_temp_c: f32) -> f32 {
    let mut rate = 0.1;
    if ambient_temp_c > 25.0 {
        rate += 0.02 * (ambient_temp_c - 25.0);
    } else if ambient_temp_c < 15.0 {
        rate -= 0.01 * (15.0 - ambient_temp_c);
    }
    rate.max(0.0)
}

/// Partitions a 24-h rainfall `rain_mm` into effective precipitation
/// (spec §4.5). `antecedent_moisture_pct` is the soil moisture percent
/// (0-100) driving the runoff adjustment; `ambient_temp_c` drives the
/// post-runoff evaporation rate.
pub fn effective_precipitation_mm(
    rain_mm: f32,
    antecedent_moisture_pct: f32,
    ambient_temp_c: f32,
    soil: &SoilEntry,
) -> f32 {
    if rain_mm < 1.0 {
        return 0.3 * rain_mm;
    }

    let duration_h = duration_band_h(rain_mm);
    let intensity = rain_mm / duration_h;

    let runoff = runoff_coefficient(intensity, soil.infiltration_rate_mm_h, antecedent_moisture_pct, soil);
    let post_runoff = rain_mm * (1.0 - runoff);

    let evap_rate = evaporation_rate_mm_h(ambient_temp_c);
    let evap_duration_h = (duration_h + 2.0).min(6.0);
    let magnitude_factor = if post_runoff < 5.0 {
        1.5
    } else if post_runoff > 20.0 {
        0.7
    } else {
        1.0
    };
    let evaporation = (evap_rate * evap_duration_h * magnitude_factor).min(0.3 * post_runoff);

    (post_runoff - evaporation).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reference::SoilTexture;

    fn clay_loam() -> SoilEntry {
        SoilEntry {
            awc_mm_per_m: 180.0,
            infiltration_rate_mm_h: 10.0,
            texture: SoilTexture::Loam,
        }
    }

    #[test]
    fn very_light_rain_uses_flat_thirty_percent() {
        let eff = effective_precipitation_mm(0.5, 50.0, 20.0, &clay_loam());
        assert!((eff - 0.15).abs() < 1e-6);
    }

    #[test]
    fn heavy_rain_mostly_stays_effective_when_intensity_is_under_infiltration() {
        // 30mm over the <50 band's 6h -> intensity 5mm/h, well under this
        // soil's 10mm/h infiltration, so runoff should be ~0 and most of
        // the rain stays effective.
        let eff = effective_precipitation_mm(30.0, 40.0, 22.0, &clay_loam());
        assert!((25.0..30.0).contains(&eff), "expected most of 30mm to remain effective, got {eff}");
    }

    #[test]
    fn intense_rain_that_exceeds_infiltration_produces_real_runoff() {
        // Same 30mm total, but a much lower infiltration soil should show
        // a meaningfully lower effective fraction than the high-infiltration case.
        let mut slow_soil = clay_loam();
        slow_soil.infiltration_rate_mm_h = 2.0;
        let eff = effective_precipitation_mm(30.0, 40.0, 22.0, &slow_soil);
        let fast_soil_eff = effective_precipitation_mm(30.0, 40.0, 22.0, &clay_loam());
        assert!(eff < fast_soil_eff, "low-infiltration soil should runoff more: {eff} vs {fast_soil_eff}");
    }

    #[test]
    fn dry_antecedent_soil_reduces_runoff_versus_wet() {
        let wet = effective_precipitation_mm(20.0, 90.0, 20.0, &clay_loam());
        let dry = effective_precipitation_mm(20.0, 10.0, 20.0, &clay_loam());
        assert!(dry >= wet, "drier antecedent soil should not runoff more than wetter: dry={dry} wet={wet}");
    }

    #[test]
    fn effective_precip_never_negative() {
        let mut parched = clay_loam();
        parched.infiltration_rate_mm_h = 0.1;
        let eff = effective_precipitation_mm(80.0, 95.0, 40.0, &parched);
        assert!(eff >= 0.0);
    }
}
