//! Decision engine (spec §4.9, component C9) and the §6 external entry
//! points. Orchestrates C1-C8 and C10-C11, holds the per-channel cache
//! and the resource-constrained/cache-enabled process flags, and
//! implements the FULL -> SIMPLIFIED -> DEFAULTS recovery ladder.

use crate::cache::Cache;
use crate::collaborators::{
    ChannelRegistry, EnvSensors, MethodDatabase, MonotonicClock, PersistentStorage, PlantDatabase, RainHistory,
    SoilDatabase, WallClock,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, Recovery};
use crate::logger::Logger;
use crate::models::channel::Coverage;
use crate::models::{AutoDecision, Channel, EnvReading, IrrigationResult, SolarTimes};
use crate::services::{cycles, phenology, precipitation, reference_et, solar_schedule, water_balance};

/// Internal result of running the decision pipeline once, carrying the
/// extra fields `daily_auto_update` needs beyond what `IrrigationResult`
/// exposes to `calculate_irrigation` callers.
struct PipelineOutcome {
    result: IrrigationResult,
    deficit_mm: f32,
    raw_mm: f32,
    daily_etc_mm: f32,
    effective_rain_mm: f32,
    stress_factor: f32,
}

/// The irrigation decision engine. Owns the per-channel cache and the
/// two process-wide flags (spec §5: "process-wide atomic booleans, set
/// by the system health watchdog"); everything else is reached through
/// the collaborator trait objects so the engine never touches hardware,
/// storage or the clock directly.
pub struct Engine {
    plants: Box<dyn PlantDatabase>,
    soils: Box<dyn SoilDatabase>,
    methods: Box<dyn MethodDatabase>,
    channels: Box<dyn ChannelRegistry>,
    env_sensors: Box<dyn EnvSensors>,
    rain: Box<dyn RainHistory>,
    clock: Box<dyn MonotonicClock>,
    wall: Box<dyn WallClock>,
    storage: Box<dyn PersistentStorage>,
    logger: Box<dyn Logger>,
    cache: Cache,
    resource_constrained: bool,
    config: EngineConfig,
}

#[allow(clippy::too_many_arguments)]
impl Engine {
    pub fn new(
        config: EngineConfig,
        plants: Box<dyn PlantDatabase>,
        soils: Box<dyn SoilDatabase>,
        methods: Box<dyn MethodDatabase>,
        channels: Box<dyn ChannelRegistry>,
        env_sensors: Box<dyn EnvSensors>,
        rain: Box<dyn RainHistory>,
        clock: Box<dyn MonotonicClock>,
        wall: Box<dyn WallClock>,
        storage: Box<dyn PersistentStorage>,
        logger: Box<dyn Logger>,
    ) -> Self {
        let channel_count = config.channel_count;
        Self {
            plants,
            soils,
            methods,
            channels,
            env_sensors,
            rain,
            clock,
            wall,
            storage,
            logger,
            cache: Cache::new(channel_count),
            resource_constrained: false,
            config,
        }
    }

    // ---- Cache management (spec §6) ----------------------------------

    pub fn init_cache(&mut self) -> EngineResult<()> {
        self.cache = Cache::new(self.config.channel_count);
        Ok(())
    }

    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear_all();
    }

    pub fn clear_channel_cache(&mut self, channel_id: usize) {
        self.cache.clear_channel(channel_id);
    }

    pub fn get_cache_stats(&self) -> crate::models::CacheStats {
        self.cache.stats()
    }

    // ---- Resource-constrained flag (spec §5) --------------------------

    /// Entering constrained mode clears and disables the cache (spec
    /// §5: "when constrained mode is entered, cache is cleared and
    /// disabled").
    pub fn set_resource_constrained(&mut self, constrained: bool) {
        self.resource_constrained = constrained;
        if constrained {
            self.cache.set_enabled(false);
        } else {
            self.cache.set_enabled(true);
        }
    }

    pub fn is_resource_constrained(&self) -> bool {
        self.resource_constrained
    }

    // ---- Solar (C11, delegates to services::astro/solar_schedule) ----

    pub fn solar_times(&self, lat_deg: f32, lon_deg: f32, day_of_year: u16, tz_offset_h: f32) -> SolarTimes {
        let computed = crate::services::astro::solar_times(lat_deg, lon_deg, day_of_year, tz_offset_h);
        if let Some(warning) = &computed.warning {
            self.logger.warn(&format!("{warning}"));
        }
        computed.value
    }

    pub fn effective_start_time(
        &self,
        event: crate::models::SolarEvent,
        offset_min: i32,
        lat_deg: f32,
        lon_deg: f32,
        day_of_year: u16,
        tz_offset_h: f32,
    ) -> (u8, u8, bool) {
        let start = solar_schedule::effective_start_time(event, offset_min, lat_deg, lon_deg, day_of_year, tz_offset_h);
        (start.hour, start.minute, start.solar_fallback)
    }

    // ---- Main decision entry points (spec §6) --------------------------

    pub fn calculate_irrigation(&mut self, channel_id: usize, env: EnvReading) -> EngineResult<IrrigationResult> {
        let outcome = self.run_pipeline(channel_id, env, false)?;
        Ok(outcome.result)
    }

    pub fn daily_auto_update(&mut self, channel_id: usize) -> EngineResult<AutoDecision> {
        self.refresh_days_after_planting(channel_id)?;

        let raw_env = self.env_sensors.read_env(channel_id);
        let outcome = self.run_pipeline(channel_id, raw_env, true)?;

        if let Some(channel) = self.channels.get_channel(channel_id) {
            if let Err(e) = self.storage.save_channel_water_balance(channel_id, channel.water_balance) {
                self.logger.warn(&format!("channel {channel_id}: persistence failed, will retry next cycle: {e}"));
            }
        }

        Ok(AutoDecision {
            should_water: outcome.result.volume_l > 0.0,
            volume_l: outcome.result.volume_l,
            deficit_mm: outcome.deficit_mm,
            raw_mm: outcome.raw_mm,
            daily_etc_mm: outcome.daily_etc_mm,
            effective_rain_mm: outcome.effective_rain_mm,
            stress_factor: outcome.stress_factor,
            recovery: outcome.result.recovery,
        })
    }

    pub fn realtime_update_deficit(&mut self, channel_id: usize, env: EnvReading) -> EngineResult<()> {
        let mut channel = self
            .channels
            .get_channel(channel_id)
            .ok_or_else(|| EngineError::InvalidParam(format!("unknown channel {channel_id}")))?;

        let env = env.validate()?;
        let now = self.clock.now_ms();
        let dt_s = now.saturating_sub(channel.water_balance.last_update_ms) as f32 / 1000.0;
        if dt_s <= 0.0 {
            return Ok(());
        }

        let plant = self.plants.plant_by_index(channel.plant_index);
        let lat_rad = channel.latitude_deg.to_radians();
        let eto = if env.has_full_sensors() {
            reference_et::penman_monteith_eto(&env, env.day_of_year, lat_rad, &self.config)
        } else if !env.lacks_temperature() {
            reference_et::hargreaves_samani_eto(env.temp_min_c, env.temp_mean_c, env.temp_max_c, env.day_of_year, lat_rad, &self.config)
        } else {
            reference_et::heuristic_eto(env.temp_mean_c, env.humidity_pct, &self.config)
        };
        let kc = match plant {
            Some(p) => phenology::crop_coefficient(&p, channel.days_after_planting, &self.config),
            None => phenology::simplified_crop_coefficient(channel.plant_class, &self.config),
        };

        let fractional_etc = eto * kc * (dt_s / 86_400.0);
        channel.water_balance.accumulate(fractional_etc, 0.0, 0.0, now);
        self.channels.set_channel(channel_id, channel);
        Ok(())
    }

    /// Estimates `ETc_avg * days_missed` deficit for a controller that
    /// has been offline (spec §4.9), capped at `cfg.max_missed_days`.
    pub fn apply_missed_days(&mut self, channel_id: usize, days_missed: u32) -> EngineResult<()> {
        let mut channel = self
            .channels
            .get_channel(channel_id)
            .ok_or_else(|| EngineError::InvalidParam(format!("unknown channel {channel_id}")))?;

        let capped_days = days_missed.min(self.config.max_missed_days);
        if capped_days == 0 {
            return Ok(());
        }

        let plant = self.plants.plant_by_index(channel.plant_index);
        let kc = match &plant {
            Some(p) => phenology::crop_coefficient(p, channel.days_after_planting, &self.config),
            None => phenology::simplified_crop_coefficient(channel.plant_class, &self.config),
        };
        // No live sensor reading is available for missed history; use the
        // heuristic estimator's midpoint temperature assumption as the
        // average daily ET rate proxy (spec §4.9 names `ETc_avg` without
        // prescribing how to obtain it for an offline window).
        let avg_eto = reference_et::heuristic_eto(20.0, 50.0, &self.config);
        let etc_avg = avg_eto * kc;

        let now = self.clock.now_ms();
        channel.water_balance.accumulate(etc_avg * capped_days as f32, 0.0, 0.0, now);
        self.channels.set_channel(channel_id, channel);

        if days_missed > self.config.max_missed_days {
            self.logger.warn(&format!(
                "channel {channel_id}: missed-days recovery capped at {} (requested {days_missed})",
                self.config.max_missed_days
            ));
        }
        Ok(())
    }

    /// Reduces a channel's deficit after irrigation has actually been
    /// applied (spec §4.6/§4.9's `apply_irrigation_result` hook; exposed
    /// directly as `reduce_deficit_after_irrigation` per spec §6).
    pub fn reduce_deficit_after_irrigation(&mut self, channel_id: usize, volume_l: f32) -> EngineResult<()> {
        let mut channel = self
            .channels
            .get_channel(channel_id)
            .ok_or_else(|| EngineError::InvalidParam(format!("unknown channel {channel_id}")))?;

        let wetted_area_m2 = match channel.coverage {
            Coverage::Area { area_m2 } => area_m2,
            Coverage::PlantCount { count } => {
                // Without a per-plant wetted area on hand here, approximate
                // using the existing wetted_awc/root_zone_awc ratio times a
                // nominal 1 sq metre per plant; fine since this hook only
                // nudges the deficit, it doesn't resynthesize a volume.
                count.max(1) as f32
            }
        };

        let now = self.clock.now_ms();
        let applied_depth_mm = water_balance::applied_volume_to_depth_mm(volume_l, wetted_area_m2);
        channel.water_balance.accumulate(0.0, 0.0, applied_depth_mm, now);
        self.channels.set_channel(channel_id, channel);
        Ok(())
    }

    /// Recomputes `Channel::days_after_planting` from `planting_unix_s` and
    /// the wall clock (spec §4.9: the AUTO variant runs once per day and
    /// phenology must progress across the season). A channel with no
    /// `planting_unix_s` yet (not planted) is left at its current DAP.
    fn refresh_days_after_planting(&mut self, channel_id: usize) -> EngineResult<()> {
        let mut channel = self
            .channels
            .get_channel(channel_id)
            .ok_or_else(|| EngineError::InvalidParam(format!("unknown channel {channel_id}")))?;

        if let Some(planting_unix_s) = channel.planting_unix_s {
            let now_unix = self.wall.now_unix_utc();
            let elapsed_s = now_unix.saturating_sub(planting_unix_s);
            channel.days_after_planting = elapsed_s / 86_400;
            self.channels.set_channel(channel_id, channel);
        }
        Ok(())
    }

    // ---- Pipeline internals -------------------------------------------

    fn run_pipeline(&mut self, channel_id: usize, raw_env: EnvReading, is_auto: bool) -> EngineResult<PipelineOutcome> {
        let channel = self
            .channels
            .get_channel(channel_id)
            .ok_or_else(|| EngineError::InvalidParam(format!("unknown channel {channel_id}")))?;

        if channel.automation_mode == crate::models::AutomationMode::Off {
            return Ok(PipelineOutcome {
                result: IrrigationResult::zero(Recovery::Full),
                deficit_mm: channel.water_balance.deficit_mm,
                raw_mm: channel.water_balance.raw_mm,
                daily_etc_mm: 0.0,
                effective_rain_mm: 0.0,
                stress_factor: 1.0,
            });
        }

        let now = self.clock.now_ms();

        let env = match raw_env.validate() {
            Ok(v) => v,
            Err(e) => {
                self.logger.warn(&format!("channel {channel_id}: sensor validation failed ({e}), falling to DEFAULTS"));
                return Ok(self.defaults_schedule(&channel, Recovery::Defaults));
            }
        };

        if self.resource_constrained {
            return self.simplified_path(channel_id, &channel, &env, now);
        }

        if !channel.is_configured_for_automation() {
            self.logger.warn(&format!("channel {channel_id}: not configured for automation, falling to SIMPLIFIED"));
            return self.simplified_path(channel_id, &channel, &env, now);
        }

        let plant = self.plants.plant_by_index(channel.plant_index);
        let soil = self.soils.soil_by_index(channel.soil_index);
        let method = self.methods.method_by_index(channel.method_index);

        let (plant, soil, method) = match (plant, soil, method) {
            (Some(p), Some(s), Some(m)) => (p, s, m),
            _ => {
                self.logger.warn(&format!("channel {channel_id}: reference lookup miss, falling to SIMPLIFIED"));
                return self.simplified_path(channel_id, &channel, &env, now);
            }
        };

        if env.lacks_temperature() {
            self.logger.warn(&format!("channel {channel_id}: no temperature data at all, falling to SIMPLIFIED"));
            return self.simplified_path(channel_id, &channel, &env, now);
        }

        let lat_rad = channel.latitude_deg.to_radians();

        let eto = match self.cache.lookup_et0(
            channel_id,
            env.temp_min_c,
            env.temp_max_c,
            env.humidity_pct,
            env.pressure_hpa,
            lat_rad,
            env.day_of_year,
            now,
            &self.config,
        ) {
            Some(cached) => cached,
            None => {
                let value = if env.has_full_sensors() {
                    reference_et::penman_monteith_eto(&env, env.day_of_year, lat_rad, &self.config)
                } else {
                    reference_et::hargreaves_samani_eto(env.temp_min_c, env.temp_mean_c, env.temp_max_c, env.day_of_year, lat_rad, &self.config)
                };
                self.cache.store_et0(
                    channel_id,
                    env.temp_min_c,
                    env.temp_max_c,
                    env.humidity_pct,
                    env.pressure_hpa,
                    lat_rad,
                    env.day_of_year,
                    value,
                    now,
                );
                value
            }
        };

        let (kc, root_depth_m) = match self.cache.lookup_kc(channel_id, channel.plant_index, channel.days_after_planting, now, &self.config) {
            Some(cached) => cached,
            None => {
                let kc = phenology::crop_coefficient(&plant, channel.days_after_planting, &self.config);
                let depth = phenology::root_depth_m(&plant, channel.days_after_planting);
                self.cache.store_kc(channel_id, channel.plant_index, channel.days_after_planting, kc, depth, now);
                (kc, depth)
            }
        };
        // The cache always holds the kc_clamp_full-bounded value so a
        // channel driven by both calculate_irrigation and the daily AUTO
        // loop shares one cache entry; the tighter AUTO-specific band
        // (spec §6) is applied on top only for the daily cadence.
        let kc = if is_auto {
            kc.clamp(self.config.kc_clamp_auto.0, self.config.kc_clamp_auto.1)
        } else {
            kc
        };

        let daily_etc_mm = eto * kc;

        let rain_mm = self.rain.last_24h_mm(channel_id);
        let effective_rain_mm = precipitation::effective_precipitation_mm(rain_mm, env.humidity_pct, env.temp_mean_c, &soil);

        let p_base = plant.depletion_fraction();
        let stress_p = water_balance::stress_adjusted_depletion_fraction(
            p_base,
            env.temp_max_c,
            plant.optimum_temp_max_c,
            env.humidity_pct,
        );
        let stress_factor = if p_base > 0.0 { stress_p / p_base } else { 1.0 };

        let (root_zone_awc_mm, wetted_awc_mm, raw_mm) = match self.cache.lookup_water_balance(
            channel_id,
            channel.plant_index,
            channel.soil_index,
            channel.method_index,
            root_depth_m,
            now,
            &self.config,
        ) {
            Some(cached) => cached,
            None => {
                let derived = water_balance::derive_awc_raw(&soil, root_depth_m, method.wetting_fraction, stress_p);
                self.cache.store_water_balance(
                    channel_id,
                    channel.plant_index,
                    channel.soil_index,
                    channel.method_index,
                    root_depth_m,
                    derived.0,
                    derived.1,
                    derived.2,
                    now,
                );
                derived
            }
        };

        let mut wb = channel.water_balance;
        wb.root_zone_awc_mm = root_zone_awc_mm;
        wb.wetted_awc_mm = wetted_awc_mm;
        wb.raw_mm = raw_mm;
        wb.accumulate(daily_etc_mm, effective_rain_mm, 0.0, now);

        let synth = crate::services::volume::synthesize(
            wb.deficit_mm,
            &method,
            channel.coverage,
            Some(&plant),
            channel.automation_mode.is_eco(),
            channel.max_volume_l,
        );
        let plan = cycles::plan_cycles(synth.gross_depth_mm, &method, Some(soil.infiltration_rate_mm_h), soil.texture, &self.config);

        let per_plant_volume_l = match channel.coverage {
            Coverage::PlantCount { count } if count > 0 => Some(synth.volume_l / count as f32),
            _ => None,
        };

        let result = IrrigationResult {
            net_depth_mm: synth.net_depth_mm,
            gross_depth_mm: synth.gross_depth_mm,
            volume_l: synth.volume_l,
            per_plant_volume_l,
            cycle_count: plan.cycle_count,
            cycle_duration_min: plan.cycle_duration_min,
            soak_interval_min: plan.soak_interval_min,
            volume_limited: synth.volume_limited,
            recovery: Recovery::Full,
        };

        let mut updated = channel;
        updated.water_balance = wb;
        updated.last_calc_ms = now;
        self.channels.set_channel(channel_id, updated);

        Ok(PipelineOutcome {
            result,
            deficit_mm: wb.deficit_mm,
            raw_mm,
            daily_etc_mm,
            effective_rain_mm,
            stress_factor,
        })
    }

    /// SIMPLIFIED recovery level (spec §4.9): heuristic temperature-only
    /// ET and a crude by-class Kc, still synthesising a real volume
    /// through C7/C8 if soil/method reference data is reachable.
    fn simplified_path(
        &mut self,
        channel_id: usize,
        channel: &Channel,
        env: &EnvReading,
        now: u64,
    ) -> EngineResult<PipelineOutcome> {
        let eto = reference_et::heuristic_eto(env.temp_mean_c, env.humidity_pct, &self.config);
        let kc = phenology::simplified_crop_coefficient(channel.plant_class, &self.config);
        let daily_etc_mm = eto * kc;

        let soil = self.soils.soil_by_index(channel.soil_index);
        let method = self.methods.method_by_index(channel.method_index);

        let (soil, method) = match (soil, method) {
            (Some(s), Some(m)) => (s, m),
            _ => return Ok(self.defaults_schedule(channel, Recovery::Defaults)),
        };

        let plant = self.plants.plant_by_index(channel.plant_index);
        let root_depth_m = plant
            .map(|p| 0.5 * (p.root_depth_min_m() + p.root_depth_max_m()))
            .unwrap_or(0.3);
        let depletion_fraction = plant.map(|p| p.depletion_fraction()).unwrap_or(0.4);

        let rain_mm = self.rain.last_24h_mm(channel_id);
        let effective_rain_mm = precipitation::effective_precipitation_mm(rain_mm, env.humidity_pct, env.temp_mean_c, &soil);

        let (root_zone_awc_mm, wetted_awc_mm, raw_mm) =
            water_balance::derive_awc_raw(&soil, root_depth_m, method.wetting_fraction, depletion_fraction);

        let mut wb = channel.water_balance;
        wb.root_zone_awc_mm = root_zone_awc_mm;
        wb.wetted_awc_mm = wetted_awc_mm;
        wb.raw_mm = raw_mm;
        wb.accumulate(daily_etc_mm, effective_rain_mm, 0.0, now);

        let synth = crate::services::volume::synthesize(
            wb.deficit_mm,
            &method,
            channel.coverage,
            plant.as_ref(),
            channel.automation_mode.is_eco(),
            channel.max_volume_l,
        );
        let plan = cycles::plan_cycles(synth.gross_depth_mm, &method, Some(soil.infiltration_rate_mm_h), soil.texture, &self.config);

        let per_plant_volume_l = match channel.coverage {
            Coverage::PlantCount { count } if count > 0 => Some(synth.volume_l / count as f32),
            _ => None,
        };

        let result = IrrigationResult {
            net_depth_mm: synth.net_depth_mm,
            gross_depth_mm: synth.gross_depth_mm,
            volume_l: synth.volume_l,
            per_plant_volume_l,
            cycle_count: plan.cycle_count,
            cycle_duration_min: plan.cycle_duration_min,
            soak_interval_min: plan.soak_interval_min,
            volume_limited: synth.volume_limited,
            recovery: Recovery::Simplified,
        };

        let mut updated = *channel;
        updated.water_balance = wb;
        updated.last_calc_ms = now;
        self.channels.set_channel(channel_id, updated);

        Ok(PipelineOutcome {
            result,
            deficit_mm: wb.deficit_mm,
            raw_mm,
            daily_etc_mm,
            effective_rain_mm,
            stress_factor: 1.0,
        })
    }

    /// DEFAULTS recovery level (spec §4.9): a plant-class-keyed volume
    /// table, 0.5-5 L/plant typical, with no water-balance or reference
    /// table access at all. Area-coverage channels with no reference
    /// data have no sensible default table to key off, so they degrade
    /// one rung further to MANUAL (a valid zero-volume result, never an
    /// error — spec §4.9: "Failed only when even DefaultsSchedule cannot
    /// produce a non-zero volume").
    fn defaults_schedule(&self, channel: &Channel, recovery: Recovery) -> PipelineOutcome {
        let result = match channel.coverage {
            Coverage::PlantCount { count } if count > 0 => {
                let per_plant = channel.plant_class.defaults_volume_l_per_plant();
                let mut volume_l = per_plant * count as f32;
                let mut volume_limited = false;
                if let Some(max_l) = channel.max_volume_l {
                    if volume_l > max_l {
                        volume_l = max_l;
                        volume_limited = true;
                    }
                }
                IrrigationResult {
                    net_depth_mm: 0.0,
                    gross_depth_mm: 0.0,
                    volume_l,
                    per_plant_volume_l: Some(per_plant),
                    cycle_count: 1,
                    cycle_duration_min: 0.0,
                    soak_interval_min: 0.0,
                    volume_limited,
                    recovery,
                }
            }
            _ => IrrigationResult::zero(Recovery::Manual),
        };

        PipelineOutcome {
            result,
            deficit_mm: 0.0,
            raw_mm: 0.0,
            daily_etc_mm: 0.0,
            effective_rain_mm: 0.0,
            stress_factor: 1.0,
        }
    }
}
