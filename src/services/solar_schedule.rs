//! Solar scheduler offset (spec §4.11, component C11): combines a
//! schedule entry's solar anchor with the day's sunrise/sunset to
//! produce the effective start time of an irrigation event.

use crate::services::astro::solar_times;

/// Effective start time of a schedule entry (spec §4.11): hour, minute,
/// and whether a polar/invalid-calculation fallback was used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStartTime {
    pub hour: u8,
    pub minute: u8,
    pub solar_fallback: bool,
}

fn minutes_to_hm(total_min: u16) -> (u8, u8) {
    ((total_min / 60) as u8, (total_min % 60) as u8)
}

/// `(event_minutes + clamp(offset)) mod 1440` (spec §4.11). On polar
/// conditions or an invalid solar calculation, returns the `(06:00|20:00)`
/// fallback already baked into [`crate::models::SolarTimes::polar_fallback`]
/// and sets `solar_fallback`.
pub fn effective_start_time(
    event: crate::models::SolarEvent,
    offset_min: i32,
    lat_deg: f32,
    lon_deg: f32,
    day_of_year: u16,
    tz_offset_h: f32,
) -> EffectiveStartTime {
    let computed = solar_times(lat_deg, lon_deg, day_of_year, tz_offset_h);
    let times = computed.value;

    let event_minutes = match event {
        crate::models::SolarEvent::Sunrise => times.sunrise_min as i32,
        crate::models::SolarEvent::Sunset => times.sunset_min as i32,
    };

    let clamped_offset = offset_min.clamp(-120, 120);
    let total = (event_minutes + clamped_offset).rem_euclid(1440) as u16;
    let (hour, minute) = minutes_to_hm(total);

    EffectiveStartTime {
        hour,
        minute,
        solar_fallback: !times.calculation_valid || computed.has_warning(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SolarEvent;

    #[test]
    fn sunrise_with_positive_offset_shifts_later() {
        let base = effective_start_time(SolarEvent::Sunrise, 0, 35.0, 0.0, 172, 1.0);
        let shifted = effective_start_time(SolarEvent::Sunrise, 30, 35.0, 0.0, 172, 1.0);
        let base_min = base.hour as i32 * 60 + base.minute as i32;
        let shifted_min = shifted.hour as i32 * 60 + shifted.minute as i32;
        assert_eq!((shifted_min - base_min + 1440) % 1440, 30);
        assert!(!base.solar_fallback);
    }

    #[test]
    fn offset_beyond_range_is_clamped() {
        let within = effective_start_time(SolarEvent::Sunset, 120, 35.0, 0.0, 172, 1.0);
        let over = effective_start_time(SolarEvent::Sunset, 500, 35.0, 0.0, 172, 1.0);
        assert_eq!(within, over);
    }

    #[test]
    fn polar_conditions_surface_fallback_flag() {
        let result = effective_start_time(SolarEvent::Sunrise, 0, 80.0, 0.0, 355, 1.0);
        assert!(result.solar_fallback);
        assert_eq!(result.hour, 6);
        assert_eq!(result.minute, 0);
    }
}
