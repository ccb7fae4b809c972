//! Pure computation services (spec §4): each submodule is one numbered
//! component (C1-C8, C11) from the control-flow table, free functions
//! operating on the data model with no collaborator access of their own.

pub mod astro;
pub mod atmosphere;
pub mod cycles;
pub mod phenology;
pub mod precipitation;
pub mod reference_et;
pub mod solar_schedule;
pub mod volume;
pub mod water_balance;
