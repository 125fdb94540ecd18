//! Deterministic solar position and sunlight level transitions.
//!
//! Positions follow the NOAA solar calculator formulas, evaluated in 28-digit
//! decimal arithmetic so results are reproducible across platforms. On top of
//! that, [`next_sunlight_change`] and [`sunlight_changes`] locate the instants
//! at which the sun crosses the 0°, -6°, -12° and -18° elevation boundaries,
//! including at latitudes with polar day and polar night.

pub mod angles;
pub mod changes;
pub mod config;
pub mod error;
pub mod precision;
pub mod sunlight;
pub mod time;
pub mod transitions;
pub mod types;

pub use angles::{
    refraction_correction, solar_azimuth, solar_elevation, solar_geometry, solar_midnight,
    solar_noon, solar_position,
};

pub use changes::{sunlight_changes, sunlight_changes_with_config, SunlightChanges};

pub use config::SearchConfig;

pub use error::{MathError, SunlightError};

pub use sunlight::sunlight_level_at;

pub use transitions::{next_sunlight_change, SolarExtrema, TransitionEstimate, TransitionFinder};

pub use types::{
    SolarDirection, SolarGeometry, SolarPosition, SolarTimeOfDay, SunlightChange, SunlightLevel,
};
