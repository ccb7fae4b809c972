//! Water-balance derivation (spec §4.6, component C6): AWC/RAW, the
//! stress-adjusted management-allowed-depletion fraction, the irrigation
//! timing projection, and the volume-to-depth conversion the deficit
//! accumulator needs when irrigation has just been applied. The deficit
//! evolution law itself lives in [`crate::models::water_balance::WaterBalance::accumulate`].

use crate::models::reference::SoilEntry;

/// In-zone conversion efficiency applied when turning applied-volume
/// litres back into an equivalent root-zone depth (spec §4.6).
const IN_ZONE_EFFICIENCY: f32 = 0.8;

/// `rwz_AWC = awc_mm_per_m * root_depth_m`, `wetted_AWC = rwz_AWC *
/// wetting_fraction`, `RAW = wetted_AWC * p` (spec §4.6).
pub fn derive_awc_raw(soil: &SoilEntry, root_depth_m: f32, wetting_fraction: f32, depletion_fraction: f32) -> (f32, f32, f32) {
    let root_zone_awc_mm = soil.awc_mm_per_m * root_depth_m;
    let wetted_awc_mm = root_zone_awc_mm * wetting_fraction;
    let raw_mm = wetted_awc_mm * depletion_fraction;
    (root_zone_awc_mm, wetted_awc_mm, raw_mm)
}

/// Stress-adjusted MAD (spec §4.6): reduces the plant's base depletion
/// fraction `p_base` when temperature or humidity push the plant toward
/// stress, floored at `0.2 * p_base` and never exceeding `p_base`.
pub fn stress_adjusted_depletion_fraction(
    p_base: f32,
    temp_max_c: f32,
    optimum_temp_max_c: f32,
    humidity_pct: f32,
) -> f32 {
    let mut p = p_base;

    let heat_excess = temp_max_c - (optimum_temp_max_c + 5.0);
    if heat_excess > 0.0 {
        let fraction = (heat_excess / 10.0).min(1.0);
        p -= p_base * 0.30 * fraction;
    }

    if humidity_pct < 30.0 {
        let fraction = ((30.0 - humidity_pct) / 30.0).min(1.0);
        p -= p_base * 0.20 * fraction;
    }

    p.clamp(0.2 * p_base, p_base)
}

/// Converts applied irrigation volume (L) to an equivalent root-zone
/// depth (mm) for subtraction from the deficit, using the channel's
/// wetted area and the fixed in-zone efficiency (spec §4.6).
pub fn applied_volume_to_depth_mm(volume_l: f32, wetted_area_m2: f32) -> f32 {
    if wetted_area_m2 <= 0.0 {
        return 0.0;
    }
    (volume_l / wetted_area_m2) * IN_ZONE_EFFICIENCY
}

/// Hours until the MAD trigger fires (spec §4.6): `r = RAW - deficit`,
/// `hours = r / (ET/24) - margin`, margin `2h` (ET>8), `3h` default, `4h`
/// (ET<3), capped at 168h. Already-triggered channels (`r <= 0`) return 0.
pub fn hours_until_trigger(raw_mm: f32, deficit_mm: f32, daily_et_mm: f32) -> f32 {
    let remaining = raw_mm - deficit_mm;
    if remaining <= 0.0 || daily_et_mm <= 0.0 {
        return 0.0;
    }

    let margin = if daily_et_mm > 8.0 {
        2.0
    } else if daily_et_mm < 3.0 {
        4.0
    } else {
        3.0
    };

    let hours = remaining / (daily_et_mm / 24.0) - margin;
    hours.max(0.0).min(168.0)
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
    fn awc_raw_chain_multiplies_through() {
        let (rwz, wetted, raw) = derive_awc_raw(&clay_loam(), 0.6, 0.35, 0.4);
        assert!((rwz - 108.0).abs() < 1e-3);
        assert!((wetted - 37.8).abs() < 1e-3);
        assert!((raw - 15.12).abs() < 1e-3);
    }

    #[test]
    fn heat_stress_reduces_depletion_fraction() {
        let p = stress_adjusted_depletion_fraction(0.4, 33.0, 25.0, 60.0);
        assert!(p < 0.4, "heat stress should reduce p below base, got {p}");
        assert!(p >= 0.2 * 0.4);
    }

    #[test]
    fn low_humidity_floor_never_goes_below_twenty_percent_of_base() {
        let p = stress_adjusted_depletion_fraction(0.4, 20.0, 25.0, 0.0);
        assert!((p - 0.2 * 0.4).abs() < 1e-4);
    }

    #[test]
    fn no_stress_conditions_return_base_unchanged() {
        let p = stress_adjusted_depletion_fraction(0.4, 24.0, 25.0, 50.0);
        assert_eq!(p, 0.4);
    }

    #[test]
    fn applied_volume_converts_using_in_zone_efficiency() {
        let depth = applied_volume_to_depth_mm(80.0, 10.0);
        assert!((depth - 6.4).abs() < 1e-3);
    }

    #[test]
    fn timing_projection_is_zero_once_trigger_already_fired() {
        assert_eq!(hours_until_trigger(10.0, 12.0, 5.0), 0.0);
    }

    #[test]
    fn timing_projection_uses_higher_margin_for_low_et() {
        let hours = hours_until_trigger(20.0, 5.0, 2.0);
        assert!(hours > 0.0 && hours <= 168.0);
    }
}
