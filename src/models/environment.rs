//! Environmental reading (spec §3: "Environmental reading").

use crate::error::{EngineError, EngineResult};

/// A bitmask tagging which fields of an [`EnvReading`] changed, used by
/// [`crate::cache::Cache::invalidate_fields`] (spec §4.10).
pub mod env_field {
    pub const TEMP: u8 = 1 << 0;
    pub const HUMIDITY: u8 = 1 << 1;
    pub const PRESSURE: u8 = 1 << 2;
    pub const RAIN: u8 = 1 << 3;
}

/// Per-sample environmental record with per-field validity flags.
///
/// Invariants enforced by [`EnvReading::validate`]: `temp_min <= temp_mean
/// <= temp_max` when all three are valid; `humidity` in `[0, 100]`;
/// `pressure_hpa` in `[800, 1200]` if valid. Invalid fields are replaced
/// with conservative defaults before any consumer reads them — callers
/// should always go through `validate()` rather than constructing and
/// reading a raw reading directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvReading {
    pub temp_min_c: f32,
    pub temp_min_valid: bool,
    pub temp_mean_c: f32,
    pub temp_mean_valid: bool,
    pub temp_max_c: f32,
    pub temp_max_valid: bool,
    pub humidity_pct: f32,
    pub humidity_valid: bool,
    pub pressure_hpa: f32,
    pub pressure_valid: bool,
    pub rain_24h_mm: f32,
    pub rain_valid: bool,
    /// Day of year, 1..=366, used by C1/C10.
    pub day_of_year: u16,
    /// Monotonic sample time (ms), used by cache aging.
    pub sampled_at_ms: u64,
}

/// Conservative fallback values substituted for invalid fields (spec §7.2:
/// "locally recovered by substituting conservative defaults").
pub const DEFAULT_TEMP_C: f32 = 20.0;
pub const DEFAULT_HUMIDITY_PCT: f32 = 50.0;
pub const DEFAULT_PRESSURE_HPA: f32 = 1013.0;
pub const DEFAULT_RAIN_MM: f32 = 0.0;

impl EnvReading {
    /// Produces a reading with every field defaulted and marked invalid;
    /// a safe starting point for sensors that haven't reported yet.
    pub fn unavailable(day_of_year: u16, sampled_at_ms: u64) -> Self {
        Self {
            temp_min_c: DEFAULT_TEMP_C,
            temp_min_valid: false,
            temp_mean_c: DEFAULT_TEMP_C,
            temp_mean_valid: false,
            temp_max_c: DEFAULT_TEMP_C,
            temp_max_valid: false,
            humidity_pct: DEFAULT_HUMIDITY_PCT,
            humidity_valid: false,
            pressure_hpa: DEFAULT_PRESSURE_HPA,
            pressure_valid: false,
            rain_24h_mm: DEFAULT_RAIN_MM,
            rain_valid: false,
            day_of_year,
            sampled_at_ms,
        }
    }

    /// Validates field ranges and temperature ordering, then substitutes
    /// defaults for anything out of range or marked invalid. Returns
    /// `InvalidData` only for the one case spec §9 calls out explicitly:
    /// `temp_min > temp_max` with both valid is rejected rather than
    /// silently swapped, since the source material does that inconsistently
    /// (it swaps min/max but forgets to update mean).
    pub fn validate(mut self) -> EngineResult<Self> {
        if self.temp_min_valid && self.temp_max_valid && self.temp_min_c > self.temp_max_c {
            return Err(EngineError::InvalidData(format!(
                "temp_min ({:.1}) > temp_max ({:.1})",
                self.temp_min_c, self.temp_max_c
            )));
        }

        if !self.temp_min_valid {
            self.temp_min_c = DEFAULT_TEMP_C;
        }
        if !self.temp_max_valid {
            self.temp_max_c = DEFAULT_TEMP_C;
        }
        if self.temp_mean_valid {
            // A mean outside [min, max] is not trustworthy even if flagged
            // valid; recompute it as the midpoint and record that it was
            // defaulted instead (ordering alone is fatal, mean drift is
            // not — see SPEC_FULL.md open-question resolutions).
            if self.temp_mean_c < self.temp_min_c || self.temp_mean_c > self.temp_max_c {
                self.temp_mean_c = 0.5 * (self.temp_min_c + self.temp_max_c);
                self.temp_mean_valid = false;
            }
        } else {
            self.temp_mean_c = 0.5 * (self.temp_min_c + self.temp_max_c);
        }

        if !self.humidity_valid || !(0.0..=100.0).contains(&self.humidity_pct) {
            self.humidity_pct = DEFAULT_HUMIDITY_PCT;
            self.humidity_valid = false;
        }

        if !self.pressure_valid || !(800.0..=1200.0).contains(&self.pressure_hpa) {
            self.pressure_hpa = DEFAULT_PRESSURE_HPA;
            self.pressure_valid = false;
        }

        if !self.rain_valid || self.rain_24h_mm < 0.0 {
            self.rain_24h_mm = DEFAULT_RAIN_MM;
            self.rain_valid = false;
        }

        Ok(self)
    }

    /// Saturation/actual vapor pressure, kPa, from the validated mean
    /// temperature and relative humidity (spec §3/§4.2).
    pub fn actual_vapor_pressure_kpa(&self) -> f32 {
        crate::services::atmosphere::saturation_vapor_pressure_kpa(self.temp_mean_c)
            * (self.humidity_pct / 100.0)
    }

    /// True iff every sensor field needed for the full Penman-Monteith
    /// path is present.
    pub fn has_full_sensors(&self) -> bool {
        self.temp_min_valid && self.temp_max_valid && self.humidity_valid && self.pressure_valid
    }

    /// True iff there isn't even enough data for Hargreaves-Samani — C3
    /// fails entirely and C9 must escalate (spec §4.3).
    pub fn lacks_temperature(&self) -> bool {
        !self.temp_min_valid && !self.temp_max_valid && !self.temp_mean_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(day: u16) -> EnvReading {
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
            day_of_year: day,
            sampled_at_ms: 0,
        }
    }

    #[test]
    fn valid_reading_passes_through_unchanged() {
        let r = base(180).validate().unwrap();
        assert_eq!(r.temp_min_c, 18.0);
        assert_eq!(r.temp_max_c, 32.0);
        assert!(r.has_full_sensors());
    }

    #[test]
    fn inverted_temperature_is_rejected() {
        let mut r = base(180);
        r.temp_min_c = 32.0;
        r.temp_max_c = 18.0;
        assert!(matches!(r.validate(), Err(EngineError::InvalidData(_))));
    }

    #[test]
    fn invalid_fields_get_conservative_defaults() {
        let mut r = base(180);
        r.humidity_valid = false;
        r.pressure_valid = false;
        let r = r.validate().unwrap();
        assert_eq!(r.humidity_pct, DEFAULT_HUMIDITY_PCT);
        assert_eq!(r.pressure_hpa, DEFAULT_PRESSURE_HPA);
        assert!(!r.has_full_sensors());
    }

    #[test]
    fn humidity_out_of_range_is_defaulted() {
        let mut r = base(180);
        r.humidity_pct = 140.0;
        let r = r.validate().unwrap();
        assert_eq!(r.humidity_pct, DEFAULT_HUMIDITY_PCT);
    }

    #[test]
    fn mean_outside_bounds_is_recomputed_not_rejected() {
        let mut r = base(180);
        r.temp_mean_c = 100.0; // implausible but min<=max still holds
        let r = r.validate().unwrap();
        assert_eq!(r.temp_mean_c, 25.0); // midpoint of 18 and 32
        assert!(!r.temp_mean_valid);
    }

    #[test]
    fn lacking_all_temperature_fields_is_detected() {
        let mut r = base(180);
        r.temp_min_valid = false;
        r.temp_mean_valid = false;
        r.temp_max_valid = false;
        assert!(r.lacks_temperature());
    }
}
