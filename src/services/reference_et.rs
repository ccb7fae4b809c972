//! Reference-ET estimator (spec §4.3, component C3). Three paths,
//! selected by the decision engine according to which sensors are
//! present and which recovery level is active.

use crate::config::EngineConfig;
use crate::models::EnvReading;
use crate::services::astro::extraterrestrial_radiation;
use crate::services::atmosphere::{psychrometric_constant, saturation_vapor_pressure_kpa, svp_slope_kpa_per_c};

const STEFAN_BOLTZMANN: f32 = 4.903e-9; // MJ K^-4 m^-2 day^-1

fn clamp_et0(v: f32, cfg: &EngineConfig) -> f32 {
    v.clamp(cfg.et0_clamp_mm_day.0, cfg.et0_clamp_mm_day.1)
}

/// Degraded Penman-Monteith: requires valid temperature, humidity and
/// pressure; substitutes assumed constants for wind, sunshine ratio,
/// albedo and soil heat flux (spec §4.3). Caller is expected to have
/// checked `env.has_full_sensors()` first — this function doesn't
/// re-validate, it just computes with whatever is in `env`.
pub fn penman_monteith_eto(
    env: &EnvReading,
    day_of_year: u16,
    lat_rad: f32,
    cfg: &EngineConfig,
) -> f32 {
    let ra = extraterrestrial_radiation(day_of_year, lat_rad);

    let rs = (0.25 + 0.50 * cfg.assumed_sunshine_ratio) * ra;
    let rns = (1.0 - cfg.assumed_albedo) * rs;
    let rso = 0.75 * ra;

    let tmin_k = env.temp_min_c + 273.16;
    let tmax_k = env.temp_max_c + 273.16;

    let es_tmin = saturation_vapor_pressure_kpa(env.temp_min_c);
    let es_tmax = saturation_vapor_pressure_kpa(env.temp_max_c);
    let es_mean = 0.5 * (es_tmin + es_tmax);
    let ea = es_mean * (env.humidity_pct / 100.0);

    let rso_safe = rso.max(1e-6);
    let rnl = STEFAN_BOLTZMANN
        * (0.5 * (tmax_k.powi(4) + tmin_k.powi(4)))
        * (0.34 - 0.14 * ea.max(0.0).sqrt())
        * (1.35 * (rs / rso_safe) - 0.35);

    let rn = rns - rnl;

    let delta = svp_slope_kpa_per_c(env.temp_mean_c);
    let gamma = psychrometric_constant(env.pressure_hpa / 10.0);
    let u2 = cfg.assumed_wind_m_s;

    let numerator =
        0.408 * delta * rn + gamma * (900.0 / (env.temp_mean_c + 273.0)) * u2 * (es_mean - ea);
    let denominator = delta + gamma * (1.0 + 0.34 * u2);

    clamp_et0(numerator / denominator, cfg)
}

/// Hargreaves-Samani fallback: only needs temperature (spec §4.3).
pub fn hargreaves_samani_eto(
    temp_min_c: f32,
    temp_mean_c: f32,
    temp_max_c: f32,
    day_of_year: u16,
    lat_rad: f32,
    cfg: &EngineConfig,
) -> f32 {
    let ra = extraterrestrial_radiation(day_of_year, lat_rad);
    let range = (temp_max_c - temp_min_c).max(0.0);
    let eto = 0.0023 * (temp_mean_c + 17.8) * range.sqrt() * ra;
    clamp_et0(eto, cfg)
}

/// Heuristic temperature-driven ET used by the SIMPLIFIED recovery level
/// (spec §4.9), when even Hargreaves-Samani's day-of-year radiation
/// dependency is more machinery than the degraded path wants to lean on.
/// Built directly from the named tunables in spec §6 (coefficient,
/// offset, VPD floor, output range): `ET0 = coeff * (Tmean + offset) *
/// max(VPD, floor)`, where VPD is derived from mean temperature and
/// whatever humidity is available (defaulted if not).
pub fn heuristic_eto(temp_mean_c: f32, humidity_pct: f32, cfg: &EngineConfig) -> f32 {
    let es = saturation_vapor_pressure_kpa(temp_mean_c);
    let ea = es * (humidity_pct / 100.0);
    let vpd = (es - ea).max(cfg.heuristic_vpd_floor_kpa);
    let raw = cfg.heuristic_et_coeff * (temp_mean_c + cfg.heuristic_et_offset_c) * vpd;
    raw.clamp(cfg.heuristic_et_range_mm_day.0, cfg.heuristic_et_range_mm_day.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::environment::EnvReading;

    fn sunny_tomato_env() -> EnvReading {
        EnvReading {
            temp_min_c: 18.0,
            temp_min_valid: true,
            temp_mean_c: 24.0,
            temp_mean_valid: true,
            temp_max_c: 32.0,
            temp_max_valid: true,
            humidity_pct: 45.0,
            humidity_valid: true,
            pressure_hpa: 1010.0,
            pressure_valid: true,
            rain_24h_mm: 0.0,
            rain_valid: true,
            day_of_year: 172,
            sampled_at_ms: 0,
        }
    }

    #[test]
    fn penman_monteith_within_expected_band_for_summer_scenario() {
        let cfg = EngineConfig::default();
        let env = sunny_tomato_env();
        let lat_rad = 35.0_f32.to_radians();
        let eto = penman_monteith_eto(&env, env.day_of_year, lat_rad, &cfg);
        assert!((5.0..6.5).contains(&eto), "expected ET0 in [5.0, 6.5], got {eto}");
    }

    #[test]
    fn hargreaves_matches_order_of_magnitude_of_penman_monteith() {
        let cfg = EngineConfig::default();
        let env = sunny_tomato_env();
        let lat_rad = 35.0_f32.to_radians();
        let hs = hargreaves_samani_eto(env.temp_min_c, env.temp_mean_c, env.temp_max_c, env.day_of_year, lat_rad, &cfg);
        assert!((2.0..9.0).contains(&hs), "Hargreaves ET0 {hs} out of plausible range");
    }

    #[test]
    fn eto_is_always_clamped_nonnegative() {
        let cfg = EngineConfig::default();
        let hs = hargreaves_samani_eto(-10.0, -5.0, 0.0, 10, 0.9, &cfg);
        assert!(hs >= 0.0 && hs <= 15.0);
    }

    #[test]
    fn heuristic_respects_configured_range() {
        let cfg = EngineConfig::default();
        let v = heuristic_eto(40.0, 10.0, &cfg);
        assert!(v <= cfg.heuristic_et_range_mm_day.1);
        let v2 = heuristic_eto(-20.0, 90.0, &cfg);
        assert!(v2 >= cfg.heuristic_et_range_mm_day.0);
    }
}
