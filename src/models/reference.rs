//! Read-only reference table entries (spec §3/§9).
//!
//! Scaled-integer fields (`_x1000`, `_x100`) exist to avoid floating point
//! in persistence (spec §9, "Design Notes"): they're kept scaled on disk
//! and decoded to `f32` only at the API boundary via the `*_decoded`
//! accessors below.

/// Coarse texture classification, replacing the source's stringly-typed
/// substring matching (spec §9 redesign flag) while preserving the same
/// classification outcomes: the first matching substring among
/// "sand"/"loam"/"clay" (case-insensitive) wins; anything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoilTexture {
    Sand,
    Loam,
    Clay,
    Other,
}

impl SoilTexture {
    pub fn classify(descriptor: &str) -> Self {
        let d = descriptor.to_ascii_lowercase();
        if d.contains("sand") {
            SoilTexture::Sand
        } else if d.contains("loam") {
            SoilTexture::Loam
        } else if d.contains("clay") {
            SoilTexture::Clay
        } else {
            SoilTexture::Other
        }
    }

    /// Cycle-and-soak multiplier applied to cycle duration (spec §4.8).
    pub fn soak_multiplier(self) -> f32 {
        match self {
            SoilTexture::Sand => 2.0,
            SoilTexture::Loam | SoilTexture::Other => 3.0,
            SoilTexture::Clay => 4.0,
        }
    }

    /// Runoff adjustment term from spec §4.5 step 3: `+0.05` clay,
    /// `-0.05` sand, `0.0` otherwise.
    pub fn runoff_adjustment(self) -> f32 {
        match self {
            SoilTexture::Clay => 0.05,
            SoilTexture::Sand => -0.05,
            SoilTexture::Loam | SoilTexture::Other => 0.0,
        }
    }
}

/// Irrigation method classification, same redesign flag as [`SoilTexture`]:
/// first matching substring among "drip"/"sprinkler"/"micro"/"bubbler"
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodClass {
    Drip,
    Sprinkler,
    Micro,
    Bubbler,
    Other,
}

impl MethodClass {
    pub fn classify(descriptor: &str) -> Self {
        let d = descriptor.to_ascii_lowercase();
        if d.contains("drip") {
            MethodClass::Drip
        } else if d.contains("sprinkler") {
            MethodClass::Sprinkler
        } else if d.contains("micro") {
            MethodClass::Micro
        } else if d.contains("bubbler") {
            MethodClass::Bubbler
        } else {
            MethodClass::Other
        }
    }
}

/// Soil reference entry (spec §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilEntry {
    /// Available water capacity, mm per metre of root depth.
    pub awc_mm_per_m: f32,
    /// Infiltration rate, mm/h.
    pub infiltration_rate_mm_h: f32,
    pub texture: SoilTexture,
}

/// Irrigation-method reference entry (spec §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodEntry {
    /// Fraction in `[0, 1]` (spec calls this "efficiency (%)"; stored here
    /// already decoded to a fraction since nothing downstream needs the
    /// percent form).
    pub efficiency: f32,
    /// Distribution uniformity, fraction `[0, 1]`.
    pub distribution_uniformity: f32,
    /// Wetting fraction, fraction `[0, 1]` (×1000 scaled on disk upstream;
    /// already decoded here).
    pub wetting_fraction: f32,
    pub application_rate_min_mm_h: f32,
    pub application_rate_max_mm_h: f32,
    pub class: MethodClass,
}

impl MethodEntry {
    /// Midpoint of the application-rate band, used by C8 when no
    /// hardware-measured application rate is supplied (spec §4.8).
    pub fn application_rate_midpoint_mm_h(&self) -> f32 {
        0.5 * (self.application_rate_min_mm_h + self.application_rate_max_mm_h)
    }
}

/// Plant reference entry (spec §3). Scaled fields keep their on-disk
/// integer representation; `*_decoded` methods divide by the documented
/// scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantEntry {
    pub stage_init_days: u16,
    pub stage_dev_days: u16,
    pub stage_mid_days: u16,
    pub stage_end_days: u16,

    pub kc_init_x1000: u16,
    pub kc_mid_x1000: u16,
    pub kc_end_x1000: u16,

    pub root_depth_min_m_x1000: u16,
    pub root_depth_max_m_x1000: u16,

    /// Management allowed depletion fraction `p`, ×1000.
    pub depletion_fraction_x1000: u16,
    /// Maximum canopy cover fraction, ×1000.
    pub canopy_cover_max_x1000: u16,

    pub row_spacing_m_x1000: u16,
    pub plant_spacing_m_x1000: u16,
    /// Density, plants per m², ×100.
    pub density_x100: u16,

    pub optimum_temp_min_c: f32,
    pub optimum_temp_max_c: f32,
}

impl PlantEntry {
    pub fn kc_init(&self) -> f32 {
        self.kc_init_x1000 as f32 / 1000.0
    }
    pub fn kc_mid(&self) -> f32 {
        self.kc_mid_x1000 as f32 / 1000.0
    }
    pub fn kc_end(&self) -> f32 {
        self.kc_end_x1000 as f32 / 1000.0
    }
    pub fn root_depth_min_m(&self) -> f32 {
        self.root_depth_min_m_x1000 as f32 / 1000.0
    }
    pub fn root_depth_max_m(&self) -> f32 {
        self.root_depth_max_m_x1000 as f32 / 1000.0
    }
    pub fn depletion_fraction(&self) -> f32 {
        self.depletion_fraction_x1000 as f32 / 1000.0
    }
    pub fn canopy_cover_max(&self) -> f32 {
        self.canopy_cover_max_x1000 as f32 / 1000.0
    }
    pub fn row_spacing_m(&self) -> f32 {
        self.row_spacing_m_x1000 as f32 / 1000.0
    }
    pub fn plant_spacing_m(&self) -> f32 {
        self.plant_spacing_m_x1000 as f32 / 1000.0
    }
    pub fn density_per_m2(&self) -> f32 {
        self.density_x100 as f32 / 100.0
    }

    /// Total season length in days (spec §4.4, used as `Ltotal`).
    pub fn total_days(&self) -> u32 {
        self.stage_init_days as u32
            + self.stage_dev_days as u32
            + self.stage_mid_days as u32
            + self.stage_end_days as u32
    }
}

/// Coarse plant-type class used by the SIMPLIFIED/DEFAULTS recovery
/// levels (spec §4.4, §4.9), when the full reference table lookup isn't
/// trusted or available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlantClass {
    Vegetable,
    Shrub,
    Tree,
    Turf,
    Other,
}

impl PlantClass {
    /// Crude Kc used by the SIMPLIFIED recovery path (spec §4.9).
    pub fn coarse_kc(self) -> f32 {
        match self {
            PlantClass::Vegetable => 1.05,
            PlantClass::Shrub => 0.75,
            PlantClass::Tree => 0.9,
            PlantClass::Turf => 0.8,
            PlantClass::Other => 0.85,
        }
    }

    /// DEFAULTS-level per-plant volume in litres, spec §4.9: "table keyed
    /// only on plant class yielding 0.5-5 L/plant typical".
    pub fn defaults_volume_l_per_plant(self) -> f32 {
        match self {
            PlantClass::Vegetable => 0.8,
            PlantClass::Shrub => 2.0,
            PlantClass::Tree => 5.0,
            PlantClass::Turf => 0.5,
            PlantClass::Other => 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soil_texture_classifies_by_substring() {
        assert_eq!(SoilTexture::classify("Sandy Loam"), SoilTexture::Sand);
        assert_eq!(SoilTexture::classify("Clay Loam"), SoilTexture::Loam);
        assert_eq!(SoilTexture::classify("Heavy Clay"), SoilTexture::Clay);
        assert_eq!(SoilTexture::classify("Silt"), SoilTexture::Other);
    }

    #[test]
    fn method_classifies_by_substring() {
        assert_eq!(MethodClass::classify("Drip line"), MethodClass::Drip);
        assert_eq!(MethodClass::classify("Impact Sprinkler"), MethodClass::Sprinkler);
        assert_eq!(MethodClass::classify("Micro-spray"), MethodClass::Micro);
    }

    #[test]
    fn plant_entry_decodes_scaled_fields() {
        let p = PlantEntry {
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
        };
        assert_eq!(p.kc_mid(), 1.15);
        assert_eq!(p.root_depth_max_m(), 0.6);
        assert_eq!(p.depletion_fraction(), 0.4);
        assert_eq!(p.density_per_m2(), 2.5);
        assert_eq!(p.total_days(), 140);
    }
}
