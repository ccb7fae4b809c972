//! Core data model (spec §3): the plain data records every service
//! function and the decision engine operate on.

pub mod channel;
pub mod environment;
pub mod reference;
pub mod result;
pub mod water_balance;

pub use channel::{AutomationMode, Channel, Coverage, ScheduleEvent, SolarEvent};
pub use environment::EnvReading;
pub use reference::{MethodClass, MethodEntry, PlantClass, PlantEntry, SoilEntry, SoilTexture};
pub use result::{AutoDecision, CacheStats, IrrigationResult, SolarTimes};
pub use water_balance::WaterBalance;
