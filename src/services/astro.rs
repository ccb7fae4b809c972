//! Astronomical primitives (spec §4.1, component C1).

use std::f32::consts::PI;

use crate::error::{Computed, EngineError};
use crate::models::SolarTimes;

const GSC_MJ_M2_MIN: f32 = 0.0820;

/// Fractional-year day angle `2*pi*(J-1)/365`, shared by the declination
/// and eccentricity-correction formulas (spec §4.1).
fn day_angle_rad(day_of_year: u16) -> f32 {
    2.0 * PI * (day_of_year as f32 - 1.0) / 365.0
}

/// Solar declination (radians), Spencer (1971) 7-term polynomial — the
/// same formula the teacher's `solar_algorithm.rs` uses for `decl_deg`,
/// used here directly in radians instead of round-tripping through
/// degrees.
pub fn declination_rad(day_of_year: u16) -> f32 {
    let b = day_angle_rad(day_of_year);
    0.006918 - 0.399912 * b.cos() + 0.070257 * b.sin() - 0.006758 * (2.0 * b).cos()
        + 0.000907 * (2.0 * b).sin()
        - 0.002697 * (3.0 * b).cos()
        + 0.00148 * (3.0 * b).sin()
}

/// Inverse relative Earth-Sun distance `dr = 1 + 0.033*cos(2*pi*J/365)`
/// (spec §4.1).
pub fn inverse_earth_sun_distance(day_of_year: u16) -> f32 {
    1.0 + 0.033 * (2.0 * PI * day_of_year as f32 / 365.0).cos()
}

/// Sunset hour angle `arccos(-tan(phi)*tan(delta))`, radians. `None` when
/// the argument is out of `[-1, 1]` — polar day (`arg < -1`) or polar
/// night (`arg > 1`); the caller substitutes `pi`/`0` respectively.
pub fn sunset_hour_angle_rad(lat_rad: f32, decl_rad: f32) -> Option<f32> {
    let arg = -(lat_rad.tan()) * decl_rad.tan();
    if (-1.0..=1.0).contains(&arg) {
        Some(arg.acos())
    } else {
        None
    }
}

/// Extraterrestrial radiation Ra, MJ*m^-2*day^-1 (FAO-56, spec §4.1).
/// Polar conditions fall back to `omega_s = pi` (continuous daylight) or
/// `0` (continuous night) so a finite Ra is always produced.
pub fn extraterrestrial_radiation(day_of_year: u16, lat_rad: f32) -> f32 {
    let decl = declination_rad(day_of_year);
    let dr = inverse_earth_sun_distance(day_of_year);
    let omega_s = match sunset_hour_angle_rad(lat_rad, decl) {
        Some(w) => w,
        None => {
            let arg = -(lat_rad.tan()) * decl.tan();
            if arg < -1.0 { PI } else { 0.0 }
        }
    };

    let term = omega_s * lat_rad.sin() * decl.sin() + lat_rad.cos() * decl.cos() * omega_s.sin();
    ((24.0 * 60.0) / PI) * GSC_MJ_M2_MIN * dr * term
}

/// NOAA equation of time, minutes — 6-term trig polynomial (spec §4.1).
pub fn equation_of_time_min(day_of_year: u16) -> f32 {
    let gamma = 2.0 * PI * (day_of_year as f32 - 1.0) / 365.0;
    229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin())
}

/// The zenith-corrected hour-angle argument, shared between
/// `zenith_hour_angle_rad` and the polar-condition classification so both
/// agree on which side of the acos domain a given lat/decl falls.
fn zenith_hour_angle_arg(lat_rad: f32, decl_rad: f32) -> f32 {
    let zenith = 90.833_f32.to_radians();
    zenith.cos() / (lat_rad.cos() * decl_rad.cos()) - lat_rad.tan() * decl_rad.tan()
}

/// Hour angle at zenith 90.833 deg (sunrise/sunset including atmospheric
/// refraction), radians. `None` when the argument is out of range —
/// polar conditions.
fn zenith_hour_angle_rad(lat_rad: f32, decl_rad: f32) -> Option<f32> {
    let arg = zenith_hour_angle_arg(lat_rad, decl_rad);
    if (-1.0..=1.0).contains(&arg) {
        Some(arg.acos())
    } else {
        None
    }
}

fn clamp_minutes_of_day(total_min: f32) -> u16 {
    let m = total_min.rem_euclid(1440.0);
    m.round().clamp(0.0, 1439.0) as u16
}

/// Sunrise/sunset for a given latitude/longitude/day/timezone (spec
/// §4.1). Uses the NOAA solar-position method: equation of time plus the
/// Spencer declination polynomial, hour angle at a 90.833 deg zenith to
/// include atmospheric refraction.
///
/// On polar day/night, returns the `(06:00, 20:00)` fallback with
/// `calculation_valid = false` and a [`EngineError::SolarFallback`]
/// warning, never a hard error — the value is still usable for
/// scheduling (spec §4.1/§6).
pub fn solar_times(lat_deg: f32, lon_deg: f32, day_of_year: u16, tz_offset_h: f32) -> Computed<SolarTimes> {
    let lat_rad = lat_deg.to_radians();
    let decl = declination_rad(day_of_year);
    let eqtime = equation_of_time_min(day_of_year);

    match zenith_hour_angle_rad(lat_rad, decl) {
        Some(omega_h) => {
            let omega_h_deg = omega_h.to_degrees();
            let base = 720.0 - 4.0 * lon_deg - eqtime + 60.0 * tz_offset_h;
            let sunrise = clamp_minutes_of_day(base - omega_h_deg * 4.0);
            let sunset = clamp_minutes_of_day(base + omega_h_deg * 4.0);
            Computed::ok(SolarTimes {
                sunrise_min: sunrise,
                sunset_min: sunset,
                is_polar_day: false,
                is_polar_night: false,
                calculation_valid: true,
            })
        }
        None => {
            let arg = zenith_hour_angle_arg(lat_rad, decl);
            // arg < -1: acos(H) would be satisfied for every H -> sun
            // never sets (polar day). arg > 1: never satisfied -> sun
            // never rises (polar night).
            let is_polar_day = arg < -1.0;
            let is_polar_night = !is_polar_day;
            Computed::warned(
                SolarTimes::polar_fallback(is_polar_day, is_polar_night),
                EngineError::SolarFallback(format!(
                    "lat={lat_deg:.2} doy={day_of_year} has no sunrise/sunset (polar_day={is_polar_day})"
                )),
            )
        }
    }
}
