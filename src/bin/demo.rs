//! Illustrative harness: wires the engine up against the in-memory mock
//! collaborators and runs a handful of channels through one decision
//! each, printing the result the way the teacher's server prints plant
//! telemetry on startup. Not a deployment target — a real controller
//! supplies its own hardware-backed collaborators (spec §2 Non-goals).

use irrigation_engine::collaborators::ChannelRegistry;
use irrigation_engine::config::EngineConfig;
use irrigation_engine::engine::Engine;
use irrigation_engine::logger::StdoutLogger;
use irrigation_engine::models::channel::{AutomationMode, Coverage, UNSET_INDEX};
use irrigation_engine::models::reference::{MethodClass, PlantClass, SoilTexture};
use irrigation_engine::models::{Channel, EnvReading, MethodEntry, PlantEntry, SoilEntry, WaterBalance};
use irrigation_engine::testutil::{
    MockChannelRegistry, MockClock, MockEnvSensors, MockMethodDatabase, MockPlantDatabase, MockRainHistory,
    MockSoilDatabase, MockStorage, MockWallClock,
};

fn tomato() -> PlantEntry {
    PlantEntry {
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
    }
}

fn clay_loam() -> SoilEntry {
    SoilEntry {
        awc_mm_per_m: 180.0,
        infiltration_rate_mm_h: 10.0,
        texture: SoilTexture::Loam,
    }
}

fn drip_line() -> MethodEntry {
    MethodEntry {
        efficiency: 0.9,
        distribution_uniformity: 0.85,
        wetting_fraction: 0.35,
        application_rate_min_mm_h: 1.0,
        application_rate_max_mm_h: 3.0,
        class: MethodClass::Drip,
    }
}

fn main() {
    println!("[SETUP] seeding reference tables and channels");

    let mut plants = MockPlantDatabase::default();
    plants.entries.insert(0, tomato());

    let mut soils = MockSoilDatabase::default();
    soils.entries.insert(0, clay_loam());

    let mut methods = MockMethodDatabase::default();
    methods.entries.insert(0, drip_line());

    let mut channels = MockChannelRegistry::default();
    channels.set_channel(
        0,
        Channel {
            latitude_deg: 35.0,
            sun_exposure_pct: 100.0,
            automation_mode: AutomationMode::Quality,
            coverage: Coverage::Area { area_m2: 10.0 },
            plant_index: 0,
            soil_index: 0,
            method_index: 0,
            plant_class: PlantClass::Vegetable,
            planting_unix_s: Some(0),
            days_after_planting: 100,
            max_volume_l: None,
            last_calc_ms: 0,
            water_balance: WaterBalance::default(),
        },
    );
    channels.set_channel(
        1,
        Channel {
            latitude_deg: 35.0,
            sun_exposure_pct: 100.0,
            automation_mode: AutomationMode::Eco,
            coverage: Coverage::PlantCount { count: 6 },
            plant_index: UNSET_INDEX,
            soil_index: UNSET_INDEX,
            method_index: UNSET_INDEX,
            plant_class: PlantClass::Shrub,
            planting_unix_s: None,
            days_after_planting: 0,
            max_volume_l: None,
            last_calc_ms: 0,
            water_balance: WaterBalance::default(),
        },
    );

    let mut env_sensors = MockEnvSensors::default();
    env_sensors.readings.insert(
        0,
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
        },
    );

    let mut engine = Engine::new(
        EngineConfig::default(),
        Box::new(plants),
        Box::new(soils),
        Box::new(methods),
        Box::new(channels),
        Box::new(env_sensors),
        Box::new(MockRainHistory::default()),
        Box::new(MockClock::new(0)),
        Box::new(MockWallClock { unix_s: 0, offset_hours: 1.0 }),
        Box::new(MockStorage::default()),
        Box::new(StdoutLogger),
    );
    engine.init_cache().expect("cache init never fails");

    for channel_id in 0..2 {
        match engine.daily_auto_update(channel_id) {
            Ok(decision) => println!(
                "[DECISION] channel={channel_id} recovery={:?} should_water={} volume_l={:.2} deficit_mm={:.2}",
                decision.recovery, decision.should_water, decision.volume_l, decision.deficit_mm
            ),
            Err(e) => eprintln!("[ERROR] channel={channel_id}: {e}"),
        }
    }

    let stats = engine.get_cache_stats();
    println!("[CACHE] hits={} misses={} ratio={:.2}", stats.hits, stats.misses, stats.ratio());
}
