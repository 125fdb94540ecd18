use chrono::{DateTime, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::error::{MathError, SunlightError};
use crate::precision::{
    acos, asin, atan2, cos, normalize_degrees, powi, rem_euclid, sin, tan, to_degrees, to_radians,
};
use crate::time::{self, julian_century, julian_day, MINUTES_PER_DAY};
use crate::types::{SolarGeometry, SolarPosition};

pub const MINUTES_PER_DEGREE: Decimal = dec!(4);

/// Largest coordinate magnitude, in degrees, the formulas accept.
///
/// Values beyond the geographic range are not rejected below this limit; they
/// just produce meaningless angles. Above it the decimal products overflow.
pub const MAX_COORDINATE_MAGNITUDE: f64 = 1e9;

/// Converts a caller-supplied coordinate to the decimal type.
pub(crate) fn coordinate(value: f64) -> Result<Decimal, SunlightError> {
    if !value.is_finite() {
        return Err(SunlightError::NonFiniteCoordinate { value });
    }
    let out_of_range = SunlightError::CoordinateOutOfRange {
        value,
        limit: MAX_COORDINATE_MAGNITUDE,
    };
    if value.abs() > MAX_COORDINATE_MAGNITUDE {
        return Err(out_of_range);
    }
    Decimal::from_f64(value).ok_or(out_of_range)
}

/// Evaluates the NOAA solar formula at a Julian century.
pub fn solar_geometry(jc: Decimal) -> Result<SolarGeometry, MathError> {
    let geom_mean_longitude =
        normalize_degrees(dec!(280.46646) + jc * (dec!(36000.76983) + jc * dec!(0.0003032)));
    let geom_mean_anomaly = dec!(357.52911) + jc * (dec!(35999.05029) - dec!(0.0001537) * jc);
    let eccentricity = dec!(0.016708634) - jc * (dec!(0.000042037) + dec!(0.0000001267) * jc);

    let anomaly_rad = to_radians(geom_mean_anomaly);
    let equation_of_center = sin(anomaly_rad)
        * (dec!(1.914602) - jc * (dec!(0.004817) + dec!(0.000014) * jc))
        + sin(Decimal::TWO * anomaly_rad) * (dec!(0.019993) - dec!(0.000101) * jc)
        + sin(dec!(3) * anomaly_rad) * dec!(0.000289);

    let true_longitude = geom_mean_longitude + equation_of_center;
    let true_anomaly = geom_mean_anomaly + equation_of_center;
    let radius_vector = (dec!(1.000001018) * (Decimal::ONE - eccentricity * eccentricity))
        / (Decimal::ONE + eccentricity * cos(to_radians(true_anomaly)));

    let omega = to_radians(dec!(125.04) - dec!(1934.136) * jc);
    let apparent_longitude = true_longitude - dec!(0.00569) - dec!(0.00478) * sin(omega);

    let mean_obliquity = dec!(23)
        + (dec!(26)
            + (dec!(21.448) - jc * (dec!(46.815) + jc * (dec!(0.00059) - jc * dec!(0.001813))))
                / dec!(60))
            / dec!(60);
    let corrected_obliquity = mean_obliquity + dec!(0.00256) * cos(omega);

    let obliquity_rad = to_radians(corrected_obliquity);
    let longitude_rad = to_radians(apparent_longitude);
    let right_ascension = to_degrees(atan2(
        cos(obliquity_rad) * sin(longitude_rad),
        cos(longitude_rad),
    )?);
    let declination = to_degrees(asin(sin(obliquity_rad) * sin(longitude_rad))?);

    let half_tan = tan(obliquity_rad / Decimal::TWO)?;
    let y = half_tan * half_tan;
    let l0 = to_radians(geom_mean_longitude);
    let equation_of_time = MINUTES_PER_DEGREE
        * to_degrees(
            y * sin(Decimal::TWO * l0) - Decimal::TWO * eccentricity * sin(anomaly_rad)
                + dec!(4) * eccentricity * y * sin(anomaly_rad) * cos(Decimal::TWO * l0)
                - dec!(0.5) * y * y * sin(dec!(4) * l0)
                - dec!(1.25) * eccentricity * eccentricity * sin(Decimal::TWO * anomaly_rad),
        );

    Ok(SolarGeometry {
        julian_century: jc,
        geom_mean_longitude,
        geom_mean_anomaly,
        eccentricity,
        equation_of_center,
        true_longitude,
        true_anomaly,
        radius_vector,
        apparent_longitude,
        mean_obliquity,
        corrected_obliquity,
        right_ascension,
        declination,
        equation_of_time,
    })
}

/// Apparent solar time in minutes, wrapped into `[0, 1440)`.
pub fn true_solar_time(
    minutes_of_day: Decimal,
    equation_of_time: Decimal,
    longitude: Decimal,
    offset_hours: Decimal,
) -> Decimal {
    rem_euclid(
        minutes_of_day + equation_of_time + MINUTES_PER_DEGREE * longitude - dec!(60) * offset_hours,
        MINUTES_PER_DAY,
    )
}

/// Hour angle in `[-180, 180)` degrees.
///
/// The true solar time is wrapped into one day first, so any minute count is
/// accepted.
pub fn hour_angle(true_solar_time: Decimal) -> Decimal {
    rem_euclid(true_solar_time, MINUTES_PER_DAY) / MINUTES_PER_DEGREE - dec!(180)
}

/// Geometric zenith angle by the spherical law of cosines.
pub fn solar_zenith_angle(
    latitude: Decimal,
    declination: Decimal,
    hour_angle: Decimal,
) -> Result<Decimal, MathError> {
    let lat_rad = to_radians(latitude);
    let dec_rad = to_radians(declination);
    let ha_rad = to_radians(hour_angle);
    let cos_zenith =
        sin(lat_rad) * sin(dec_rad) + cos(lat_rad) * cos(dec_rad) * cos(ha_rad);
    Ok(to_degrees(acos(
        cos_zenith.clamp(Decimal::NEGATIVE_ONE, Decimal::ONE),
    )?))
}

/// Atmospheric refraction, in degrees, for an uncorrected elevation.
pub fn refraction_correction(elevation: Decimal) -> Result<Decimal, MathError> {
    let arc_seconds = if elevation > dec!(85) {
        Decimal::ZERO
    } else if elevation > dec!(5) {
        let te = tan(to_radians(elevation))?;
        dec!(58.1) / te - dec!(0.07) / powi(te, 3)? + dec!(0.000086) / powi(te, 5)?
    } else if elevation > dec!(-0.575) {
        dec!(1735)
            + elevation
                * (dec!(-518.2)
                    + elevation * (dec!(103.4) + elevation * (dec!(-12.79) + elevation * dec!(0.711))))
    } else {
        match tan(to_radians(elevation)) {
            Ok(te) => dec!(-20.772) / te,
            // nadir: tan is unbounded and the correction vanishes
            Err(MathError::DivisionByZero { .. } | MathError::Overflow { .. }) => Decimal::ZERO,
            Err(err) => return Err(err),
        }
    };
    Ok(arc_seconds / dec!(3600))
}

/// Azimuth clockwise from north in `[0, 360)`, from the geometric zenith.
pub fn solar_azimuth_angle(
    latitude: Decimal,
    declination: Decimal,
    hour_angle: Decimal,
    zenith: Decimal,
) -> Result<Decimal, MathError> {
    let lat_rad = to_radians(latitude);
    let zen_rad = to_radians(zenith);
    let numerator = sin(lat_rad) * cos(zen_rad) - sin(to_radians(declination));
    let denominator = cos(lat_rad) * sin(zen_rad);
    let same_sign = numerator.is_sign_negative() == denominator.is_sign_negative();
    // Undefined at the zenith or a pole; report due south there.
    let ratio = if denominator.is_zero() {
        Decimal::ONE
    } else {
        numerator.checked_div(denominator).unwrap_or(if same_sign {
            Decimal::ONE
        } else {
            Decimal::NEGATIVE_ONE
        })
    }
    .clamp(Decimal::NEGATIVE_ONE, Decimal::ONE);

    let angle = to_degrees(acos(ratio)?);
    Ok(if hour_angle > Decimal::ZERO {
        normalize_degrees(angle + dec!(180))
    } else {
        normalize_degrees(dec!(540) - angle)
    })
}

struct Horizontal {
    declination: Decimal,
    hour_angle: Decimal,
    zenith: Decimal,
}

fn horizontal<Tz: TimeZone>(
    at: &DateTime<Tz>,
    latitude: Decimal,
    longitude: Decimal,
) -> Result<Horizontal, MathError> {
    let geometry = solar_geometry(julian_century(julian_day(at)))?;
    let minutes = time::seconds_of_day(at) / dec!(60);
    let tst = true_solar_time(
        minutes,
        geometry.equation_of_time,
        longitude,
        time::offset_hours(at),
    );
    let ha = hour_angle(tst);
    let zenith = solar_zenith_angle(latitude, geometry.declination, ha)?;
    Ok(Horizontal {
        declination: geometry.declination,
        hour_angle: ha,
        zenith,
    })
}

fn corrected_elevation(zenith: Decimal) -> Result<Decimal, MathError> {
    Ok(dec!(90) - (zenith - refraction_correction(dec!(90) - zenith)?))
}

pub(crate) fn elevation_at<Tz: TimeZone>(
    at: &DateTime<Tz>,
    latitude: Decimal,
    longitude: Decimal,
) -> Result<Decimal, MathError> {
    corrected_elevation(horizontal(at, latitude, longitude)?.zenith)
}

pub(crate) fn position_at<Tz: TimeZone>(
    at: &DateTime<Tz>,
    latitude: Decimal,
    longitude: Decimal,
) -> Result<SolarPosition, MathError> {
    let h = horizontal(at, latitude, longitude)?;
    Ok(SolarPosition {
        azimuth: solar_azimuth_angle(latitude, h.declination, h.hour_angle, h.zenith)?,
        elevation: corrected_elevation(h.zenith)?,
        declination: h.declination,
    })
}

/// Azimuth, refraction-corrected elevation and declination of the sun.
///
/// `at` must carry the UTC offset actually in effect at the location; a wrong
/// offset is not detected and yields a wrong position.
pub fn solar_position<Tz: TimeZone>(
    at: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
) -> Result<SolarPosition, SunlightError> {
    Ok(position_at(at, coordinate(latitude)?, coordinate(longitude)?)?)
}

pub fn solar_elevation<Tz: TimeZone>(
    at: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
) -> Result<Decimal, SunlightError> {
    Ok(elevation_at(at, coordinate(latitude)?, coordinate(longitude)?)?)
}

pub fn solar_azimuth<Tz: TimeZone>(
    at: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
) -> Result<Decimal, SunlightError> {
    Ok(solar_position(at, latitude, longitude)?.azimuth)
}

/// Solar transit for a UTC offset, as minutes after UTC midnight of `date`
/// converted to an instant.
///
/// The equation of time is evaluated at the start of the local date.
fn transit_for_offset(
    date: NaiveDate,
    longitude: Decimal,
    offset_seconds: i32,
) -> Result<DateTime<Utc>, SunlightError> {
    let out_of_range = SunlightError::TimeOutOfRange {
        context: "computing solar noon",
    };
    let jd = time::julian_day_from_parts(date, Decimal::ZERO, offset_seconds);
    let geometry = solar_geometry(julian_century(jd))?;
    let minutes = dec!(720) - MINUTES_PER_DEGREE * longitude - geometry.equation_of_time;
    let delta = time::seconds_to_delta(minutes * dec!(60)).ok_or(out_of_range.clone())?;
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .checked_add_signed(delta)
        .ok_or(out_of_range)
}

pub(crate) fn solar_noon_at<Tz: TimeZone>(
    date: NaiveDate,
    zone: &Tz,
    longitude: Decimal,
) -> Result<DateTime<Tz>, SunlightError> {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let midnight_offset = zone
        .offset_from_local_datetime(&local_midnight)
        .earliest()
        .unwrap_or_else(|| zone.offset_from_utc_datetime(&local_midnight))
        .fix()
        .local_minus_utc();
    let coarse = transit_for_offset(date, longitude, midnight_offset)?;

    // Second pass with the offset in effect at the coarse estimate; differs
    // from the first only on days where the zone changes its offset.
    let noon_offset = zone
        .offset_from_utc_datetime(&coarse.naive_utc())
        .fix()
        .local_minus_utc();
    let noon = if noon_offset == midnight_offset {
        coarse
    } else {
        transit_for_offset(date, longitude, noon_offset)?
    };
    Ok(noon.with_timezone(zone))
}

/// Instant of solar transit over `longitude` on the local calendar `date`.
pub fn solar_noon<Tz: TimeZone>(
    date: NaiveDate,
    zone: &Tz,
    longitude: f64,
) -> Result<DateTime<Tz>, SunlightError> {
    solar_noon_at(date, zone, coordinate(longitude)?)
}

/// Solar noon plus twelve hours.
///
/// This ignores the drift of the equation of time and of the declination over
/// the half day, so it is only an approximation of the antimeridian transit.
pub fn solar_midnight<Tz: TimeZone>(
    date: NaiveDate,
    zone: &Tz,
    longitude: f64,
) -> Result<DateTime<Tz>, SunlightError> {
    let noon = solar_noon(date, zone, longitude)?;
    time::shift(&noon, TimeDelta::hours(12), "computing solar midnight")
}
