//! Classification of elevations into sunlight levels, and the fixed mapping
//! between levels and the boundary events that separate them.

use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::angles;
use crate::error::SunlightError;
use crate::types::{SolarDirection, SolarTimeOfDay, SunlightLevel};

impl SolarDirection {
    pub fn reversed(self) -> Self {
        match self {
            SolarDirection::Rising => SolarDirection::Setting,
            SolarDirection::Setting => SolarDirection::Rising,
        }
    }
}

impl SunlightLevel {
    pub const ALL: [SunlightLevel; 5] = [
        SunlightLevel::Night,
        SunlightLevel::AstronomicalTwilight,
        SunlightLevel::NauticalTwilight,
        SunlightLevel::CivilTwilight,
        SunlightLevel::Daylight,
    ];

    /// Classifies a refraction-corrected elevation.
    ///
    /// Each level covers a half-open range `[lower, upper)`; values below -90
    /// or above 90 fall into `Night` and `Daylight` respectively.
    pub fn from_elevation(elevation: Decimal) -> Self {
        if elevation < dec!(-18) {
            SunlightLevel::Night
        } else if elevation < dec!(-12) {
            SunlightLevel::AstronomicalTwilight
        } else if elevation < dec!(-6) {
            SunlightLevel::NauticalTwilight
        } else if elevation < Decimal::ZERO {
            SunlightLevel::CivilTwilight
        } else {
            SunlightLevel::Daylight
        }
    }

    pub fn lower_bound(self) -> Decimal {
        match self {
            SunlightLevel::Night => dec!(-90),
            SunlightLevel::AstronomicalTwilight => dec!(-18),
            SunlightLevel::NauticalTwilight => dec!(-12),
            SunlightLevel::CivilTwilight => dec!(-6),
            SunlightLevel::Daylight => Decimal::ZERO,
        }
    }

    pub fn upper_bound(self) -> Decimal {
        match self {
            SunlightLevel::Night => dec!(-18),
            SunlightLevel::AstronomicalTwilight => dec!(-12),
            SunlightLevel::NauticalTwilight => dec!(-6),
            SunlightLevel::CivilTwilight => Decimal::ZERO,
            SunlightLevel::Daylight => dec!(90),
        }
    }

    /// The event that ends this level when the sun moves in `direction`.
    ///
    /// `None` for rising out of daylight or setting out of night.
    pub fn exit_event(self, direction: SolarDirection) -> Option<SolarTimeOfDay> {
        SolarTimeOfDay::leaving(self, direction)
    }
}

impl SolarTimeOfDay {
    /// All events in the order they occur on an ordinary day.
    pub const ALL: [SolarTimeOfDay; 8] = [
        SolarTimeOfDay::AstronomicalDawn,
        SolarTimeOfDay::NauticalDawn,
        SolarTimeOfDay::CivilDawn,
        SolarTimeOfDay::Sunrise,
        SolarTimeOfDay::Sunset,
        SolarTimeOfDay::CivilDusk,
        SolarTimeOfDay::NauticalDusk,
        SolarTimeOfDay::AstronomicalDusk,
    ];

    /// Looks up the event that takes the sun out of `level` in `direction`.
    pub fn leaving(level: SunlightLevel, direction: SolarDirection) -> Option<Self> {
        match direction {
            SolarDirection::Rising => match level {
                SunlightLevel::Night => Some(SolarTimeOfDay::AstronomicalDawn),
                SunlightLevel::AstronomicalTwilight => Some(SolarTimeOfDay::NauticalDawn),
                SunlightLevel::NauticalTwilight => Some(SolarTimeOfDay::CivilDawn),
                SunlightLevel::CivilTwilight => Some(SolarTimeOfDay::Sunrise),
                SunlightLevel::Daylight => None,
            },
            SolarDirection::Setting => match level {
                SunlightLevel::Night => None,
                SunlightLevel::AstronomicalTwilight => Some(SolarTimeOfDay::AstronomicalDusk),
                SunlightLevel::NauticalTwilight => Some(SolarTimeOfDay::NauticalDusk),
                SunlightLevel::CivilTwilight => Some(SolarTimeOfDay::CivilDusk),
                SunlightLevel::Daylight => Some(SolarTimeOfDay::Sunset),
            },
        }
    }

    /// Elevation, in degrees, at which this event happens.
    pub fn elevation(self) -> Decimal {
        match self {
            SolarTimeOfDay::AstronomicalDawn | SolarTimeOfDay::AstronomicalDusk => dec!(-18),
            SolarTimeOfDay::NauticalDawn | SolarTimeOfDay::NauticalDusk => dec!(-12),
            SolarTimeOfDay::CivilDawn | SolarTimeOfDay::CivilDusk => dec!(-6),
            SolarTimeOfDay::Sunrise | SolarTimeOfDay::Sunset => Decimal::ZERO,
        }
    }

    pub fn direction(self) -> SolarDirection {
        match self {
            SolarTimeOfDay::AstronomicalDawn
            | SolarTimeOfDay::NauticalDawn
            | SolarTimeOfDay::CivilDawn
            | SolarTimeOfDay::Sunrise => SolarDirection::Rising,
            SolarTimeOfDay::Sunset
            | SolarTimeOfDay::CivilDusk
            | SolarTimeOfDay::NauticalDusk
            | SolarTimeOfDay::AstronomicalDusk => SolarDirection::Setting,
        }
    }

    pub fn previous_level(self) -> SunlightLevel {
        match self {
            SolarTimeOfDay::AstronomicalDawn => SunlightLevel::Night,
            SolarTimeOfDay::NauticalDawn => SunlightLevel::AstronomicalTwilight,
            SolarTimeOfDay::CivilDawn => SunlightLevel::NauticalTwilight,
            SolarTimeOfDay::Sunrise => SunlightLevel::CivilTwilight,
            SolarTimeOfDay::Sunset => SunlightLevel::Daylight,
            SolarTimeOfDay::CivilDusk => SunlightLevel::CivilTwilight,
            SolarTimeOfDay::NauticalDusk => SunlightLevel::NauticalTwilight,
            SolarTimeOfDay::AstronomicalDusk => SunlightLevel::AstronomicalTwilight,
        }
    }

    pub fn new_level(self) -> SunlightLevel {
        match self {
            SolarTimeOfDay::AstronomicalDawn => SunlightLevel::AstronomicalTwilight,
            SolarTimeOfDay::NauticalDawn => SunlightLevel::NauticalTwilight,
            SolarTimeOfDay::CivilDawn => SunlightLevel::CivilTwilight,
            SolarTimeOfDay::Sunrise => SunlightLevel::Daylight,
            SolarTimeOfDay::Sunset => SunlightLevel::CivilTwilight,
            SolarTimeOfDay::CivilDusk => SunlightLevel::NauticalTwilight,
            SolarTimeOfDay::NauticalDusk => SunlightLevel::AstronomicalTwilight,
            SolarTimeOfDay::AstronomicalDusk => SunlightLevel::Night,
        }
    }
}

/// Sunlight level at `time` for the given location.
pub fn sunlight_level_at<Tz: TimeZone>(
    time: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
) -> Result<SunlightLevel, SunlightError> {
    let elevation = angles::solar_elevation(time, latitude, longitude)?;
    Ok(SunlightLevel::from_elevation(elevation))
}
