//! Memoisation cache (spec §4.10, component C10): three independent,
//! tolerance-keyed slots per channel (ET₀, Kc, water balance), fixed-size
//! and allocation-free per the §5 memory budget.

use crate::config::EngineConfig;
use crate::models::environment::env_field;
use crate::models::CacheStats;

/// Cached ET₀ computation, keyed on the inputs spec §4.10 lists.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Et0Entry {
    temp_min_c: f32,
    temp_max_c: f32,
    humidity_pct: f32,
    pressure_hpa: f32,
    lat_rad: f32,
    day_of_year: u16,
    value: f32,
    stamped_ms: u64,
}

/// Cached Kc + root depth, keyed on plant index and days-after-planting.
#[derive(Debug, Clone, Copy, PartialEq)]
struct KcEntry {
    plant_index: u16,
    days_after_planting: u32,
    kc: f32,
    root_depth_m: f32,
    stamped_ms: u64,
}

/// Cached AWC/RAW derivation, keyed on the exact plant/soil/method
/// indices and root depth within tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WbEntry {
    plant_index: u16,
    soil_index: u16,
    method_index: u16,
    root_depth_m: f32,
    root_zone_awc_mm: f32,
    wetted_awc_mm: f32,
    raw_mm: f32,
    stamped_ms: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelSlots {
    et0: Option<Et0Entry>,
    kc: Option<KcEntry>,
    wb: Option<WbEntry>,
}

/// Per-channel, fixed-size memoisation cache (spec §4.10/§5: `3 *
/// channels * entry_size`, no dynamic allocation).
pub struct Cache {
    slots: Vec<ChannelSlots>,
    enabled: bool,
    stats: CacheStats,
}

impl Cache {
    /// `init_cache()` (spec §6): allocates the fixed per-channel slots
    /// once, up front.
    pub fn new(channel_count: usize) -> Self {
        Self {
            slots: vec![ChannelSlots::default(); channel_count],
            enabled: true,
            stats: CacheStats::default(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear_all();
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear_all(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = ChannelSlots::default();
        }
        self.stats = CacheStats::default();
    }

    pub fn clear_channel(&mut self, channel_id: usize) {
        if let Some(slot) = self.slots.get_mut(channel_id) {
            *slot = ChannelSlots::default();
        }
    }

    /// Invalidates cache entries affected by a change in the given
    /// environment fields (spec §4.10: "explicit invalidation ... tagged
    /// by field bitmask"). Only ET₀ depends on environmental fields; Kc
    /// and water-balance slots are unaffected.
    pub fn invalidate_fields(&mut self, channel_id: usize, changed: u8) {
        let affects_et0 = changed & (env_field::TEMP | env_field::HUMIDITY | env_field::PRESSURE) != 0;
        if affects_et0 {
            if let Some(slot) = self.slots.get_mut(channel_id) {
                slot.et0 = None;
            }
        }
    }

    fn record_hit(&mut self, cfg: &EngineConfig) {
        self.stats.hits += 1;
        self.maybe_autoclear(cfg);
    }

    fn record_miss(&mut self, cfg: &EngineConfig) {
        self.stats.misses += 1;
        self.maybe_autoclear(cfg);
    }

    /// Below a hit ratio of `cache_min_hit_ratio` over at least
    /// `cache_min_samples_for_autoclear` samples, clear everything (spec
    /// §4.10).
    fn maybe_autoclear(&mut self, cfg: &EngineConfig) {
        if self.stats.samples() as u32 >= cfg.cache_min_samples_for_autoclear
            && self.stats.ratio() < cfg.cache_min_hit_ratio
        {
            self.clear_all();
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn lookup_et0(
        &mut self,
        channel_id: usize,
        temp_min_c: f32,
        temp_max_c: f32,
        humidity_pct: f32,
        pressure_hpa: f32,
        lat_rad: f32,
        day_of_year: u16,
        now_ms: u64,
        cfg: &EngineConfig,
    ) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        let max_age_ms = cfg.et0_cache_max_age_s * 1000;

        let Some(slot) = self.slots.get_mut(channel_id) else {
            return None;
        };

        let hit = slot.et0.as_ref().is_some_and(|e| {
            e.day_of_year == day_of_year
                && (e.temp_min_c - temp_min_c).abs() < cfg.et0_tolerance_temp_c
                && (e.temp_max_c - temp_max_c).abs() < cfg.et0_tolerance_temp_c
                && (e.humidity_pct - humidity_pct).abs() < cfg.et0_tolerance_rh_pct
                && (e.pressure_hpa - pressure_hpa).abs() < cfg.et0_tolerance_pressure_hpa
                && (e.lat_rad - lat_rad).abs() < cfg.et0_tolerance_lat_rad
                && now_ms.saturating_sub(e.stamped_ms) <= max_age_ms
        });

        if !hit {
            if slot.et0.is_some_and(|e| now_ms.saturating_sub(e.stamped_ms) > max_age_ms) {
                slot.et0 = None; // lazy eviction on read
            }
            self.record_miss(cfg);
            return None;
        }

        let value = slot.et0.unwrap().value;
        self.record_hit(cfg);
        Some(value)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn store_et0(
        &mut self,
        channel_id: usize,
        temp_min_c: f32,
        temp_max_c: f32,
        humidity_pct: f32,
        pressure_hpa: f32,
        lat_rad: f32,
        day_of_year: u16,
        value: f32,
        now_ms: u64,
    ) {
        if !self.enabled {
            return;
        }
        if let Some(slot) = self.slots.get_mut(channel_id) {
            slot.et0 = Some(Et0Entry {
                temp_min_c,
                temp_max_c,
                humidity_pct,
                pressure_hpa,
                lat_rad,
                day_of_year,
                value,
                stamped_ms: now_ms,
            });
        }
    }

    pub fn lookup_kc(
        &mut self,
        channel_id: usize,
        plant_index: u16,
        days_after_planting: u32,
        now_ms: u64,
        cfg: &EngineConfig,
    ) -> Option<(f32, f32)> {
        if !self.enabled {
            return None;
        }
        let max_age_ms = cfg.kc_cache_max_age_s * 1000;

        let Some(slot) = self.slots.get_mut(channel_id) else {
            return None;
        };

        let hit = slot.kc.as_ref().is_some_and(|e| {
            e.plant_index == plant_index
                && e.days_after_planting == days_after_planting
                && now_ms.saturating_sub(e.stamped_ms) <= max_age_ms
        });

        if !hit {
            if slot.kc.is_some_and(|e| now_ms.saturating_sub(e.stamped_ms) > max_age_ms) {
                slot.kc = None;
            }
            self.record_miss(cfg);
            return None;
        }

        let e = slot.kc.unwrap();
        self.record_hit(cfg);
        Some((e.kc, e.root_depth_m))
    }

    pub fn store_kc(
        &mut self,
        channel_id: usize,
        plant_index: u16,
        days_after_planting: u32,
        kc: f32,
        root_depth_m: f32,
        now_ms: u64,
    ) {
        if !self.enabled {
            return;
        }
        if let Some(slot) = self.slots.get_mut(channel_id) {
            slot.kc = Some(KcEntry {
                plant_index,
                days_after_planting,
                kc,
                root_depth_m,
                stamped_ms: now_ms,
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn lookup_water_balance(
        &mut self,
        channel_id: usize,
        plant_index: u16,
        soil_index: u16,
        method_index: u16,
        root_depth_m: f32,
        now_ms: u64,
        cfg: &EngineConfig,
    ) -> Option<(f32, f32, f32)> {
        if !self.enabled {
            return None;
        }
        let max_age_ms = cfg.wb_cache_max_age_s * 1000;

        let Some(slot) = self.slots.get_mut(channel_id) else {
            return None;
        };

        let hit = slot.wb.as_ref().is_some_and(|e| {
            e.plant_index == plant_index
                && e.soil_index == soil_index
                && e.method_index == method_index
                && (e.root_depth_m - root_depth_m).abs() < cfg.wb_tolerance_root_depth_m
                && now_ms.saturating_sub(e.stamped_ms) <= max_age_ms
        });

        if !hit {
            if slot.wb.is_some_and(|e| now_ms.saturating_sub(e.stamped_ms) > max_age_ms) {
                slot.wb = None;
            }
            self.record_miss(cfg);
            return None;
        }

        let e = slot.wb.unwrap();
        self.record_hit(cfg);
        Some((e.root_zone_awc_mm, e.wetted_awc_mm, e.raw_mm))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn store_water_balance(
        &mut self,
        channel_id: usize,
        plant_index: u16,
        soil_index: u16,
        method_index: u16,
        root_depth_m: f32,
        root_zone_awc_mm: f32,
        wetted_awc_mm: f32,
        raw_mm: f32,
        now_ms: u64,
    ) {
        if !self.enabled {
            return;
        }
        if let Some(slot) = self.slots.get_mut(channel_id) {
            slot.wb = Some(WbEntry {
                plant_index,
                soil_index,
                method_index,
                root_depth_m,
                root_zone_awc_mm,
                wetted_awc_mm,
                raw_mm,
                stamped_ms: now_ms,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn et0_hit_within_tolerance() {
        let mut cache = Cache::new(4);
        let c = cfg();
        cache.store_et0(0, 18.0, 32.0, 45.0, 1010.0, 0.6, 172, 5.8, 1_000);
        let hit = cache.lookup_et0(0, 18.2, 32.1, 46.0, 1011.0, 0.605, 172, 1_500, &c);
        assert_eq!(hit, Some(5.8));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn et0_miss_outside_tolerance() {
        let mut cache = Cache::new(4);
        let c = cfg();
        cache.store_et0(0, 18.0, 32.0, 45.0, 1010.0, 0.6, 172, 5.8, 1_000);
        let hit = cache.lookup_et0(0, 20.0, 32.0, 45.0, 1010.0, 0.6, 172, 1_500, &c);
        assert_eq!(hit, None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn et0_entry_expires_by_age() {
        let mut cache = Cache::new(4);
        let c = cfg();
        cache.store_et0(0, 18.0, 32.0, 45.0, 1010.0, 0.6, 172, 5.8, 0);
        let hit = cache.lookup_et0(0, 18.0, 32.0, 45.0, 1010.0, 0.6, 172, 3_601_000, &c);
        assert_eq!(hit, None);
    }

    #[test]
    fn invalidate_fields_clears_et0_but_not_kc() {
        let mut cache = Cache::new(4);
        cache.store_et0(0, 18.0, 32.0, 45.0, 1010.0, 0.6, 172, 5.8, 0);
        cache.store_kc(0, 3, 40, 0.9, 0.4, 0);
        cache.invalidate_fields(0, env_field::TEMP);
        let c = cfg();
        assert!(cache.lookup_et0(0, 18.0, 32.0, 45.0, 1010.0, 0.6, 172, 0, &c).is_none());
        assert!(cache.lookup_kc(0, 3, 40, 0, &c).is_some());
    }

    #[test]
    fn disabling_cache_clears_everything() {
        let mut cache = Cache::new(4);
        cache.store_kc(0, 3, 40, 0.9, 0.4, 0);
        cache.set_enabled(false);
        let c = cfg();
        assert!(cache.lookup_kc(0, 3, 40, 0, &c).is_none());
    }

    #[test]
    fn low_hit_ratio_over_threshold_triggers_autoclear() {
        let mut cache = Cache::new(4);
        let mut c = cfg();
        c.cache_min_samples_for_autoclear = 4;
        c.cache_min_hit_ratio = 0.9;
        cache.store_kc(0, 3, 40, 0.9, 0.4, 0);
        for _ in 0..4 {
            cache.lookup_kc(0, 99, 1, 0, &c); // always misses
        }
        // Autoclear should have reset stats and wiped the stored entry.
        assert!(cache.stats().samples() < 4 || cache.lookup_kc(0, 3, 40, 0, &c).is_none());
    }
}
