use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;

/// Whether the sun's elevation is increasing or decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarDirection {
    Rising,
    Setting,
}

/// Discrete daylight bands, ordered from darkest to brightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SunlightLevel {
    Night,
    AstronomicalTwilight,
    NauticalTwilight,
    CivilTwilight,
    Daylight,
}

/// Named instants at which the elevation crosses a sunlight level boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarTimeOfDay {
    AstronomicalDawn,
    NauticalDawn,
    CivilDawn,
    Sunrise,
    Sunset,
    CivilDusk,
    NauticalDusk,
    AstronomicalDusk,
}

/// Apparent position of the sun, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarPosition {
    /// Compass bearing clockwise from true north, in `[0, 360)`.
    pub azimuth: Decimal,
    /// Refraction-corrected angle above the horizon.
    pub elevation: Decimal,
    pub declination: Decimal,
}

/// Intermediate quantities of the NOAA solar formula for one instant.
///
/// Angles are in degrees, `equation_of_time` in minutes and `radius_vector`
/// in astronomical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarGeometry {
    pub julian_century: Decimal,
    pub geom_mean_longitude: Decimal,
    pub geom_mean_anomaly: Decimal,
    pub eccentricity: Decimal,
    pub equation_of_center: Decimal,
    pub true_longitude: Decimal,
    pub true_anomaly: Decimal,
    pub radius_vector: Decimal,
    pub apparent_longitude: Decimal,
    pub mean_obliquity: Decimal,
    pub corrected_obliquity: Decimal,
    pub right_ascension: Decimal,
    pub declination: Decimal,
    pub equation_of_time: Decimal,
}

/// A sunlight level change at a specific instant.
///
/// Only the instant and the event are stored; the levels on either side and
/// the direction of travel are always derived from the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SunlightChange<Tz: TimeZone> {
    time: DateTime<Tz>,
    event: SolarTimeOfDay,
}

impl<Tz: TimeZone> SunlightChange<Tz> {
    pub fn new(time: DateTime<Tz>, event: SolarTimeOfDay) -> Self {
        Self { time, event }
    }

    pub fn time(&self) -> &DateTime<Tz> {
        &self.time
    }

    pub fn event(&self) -> SolarTimeOfDay {
        self.event
    }

    pub fn previous_level(&self) -> SunlightLevel {
        self.event.previous_level()
    }

    pub fn new_level(&self) -> SunlightLevel {
        self.event.new_level()
    }

    pub fn direction(&self) -> SolarDirection {
        self.event.direction()
    }

    pub fn into_time(self) -> DateTime<Tz> {
        self.time
    }
}
