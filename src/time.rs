//! Julian date conversion and checked time arithmetic.

use chrono::{DateTime, Datelike, NaiveDate, Offset, TimeDelta, TimeZone, Timelike};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::error::SunlightError;

/// Julian day of the J2000.0 epoch (2000-01-01 12:00).
pub const J2000_JULIAN_DAY: Decimal = dec!(2451545);
pub const DAYS_PER_JULIAN_CENTURY: Decimal = dec!(36525);
pub const MINUTES_PER_DAY: Decimal = dec!(1440);

const J2000_MIDNIGHT_JULIAN_DAY: Decimal = dec!(2451544.5);
const J2000_DAYS_FROM_CE: i32 = 730_120;
const SECONDS_PER_DAY: Decimal = dec!(86400);

/// Julian day of the UTC instant behind a local civil time.
///
/// Built the way the NOAA worksheet does it: Julian day of the local calendar
/// date, plus the local time of day, minus the UTC offset.
pub fn julian_day<Tz: TimeZone>(time: &DateTime<Tz>) -> Decimal {
    let local = time.naive_local();
    julian_day_from_parts(
        local.date(),
        seconds_of_day(time),
        offset_seconds(time),
    )
}

/// Julian day for a local date, seconds after local midnight and UTC offset.
pub fn julian_day_from_parts(date: NaiveDate, seconds_of_day: Decimal, offset_seconds: i32) -> Decimal {
    let days = Decimal::from(date.num_days_from_ce() - J2000_DAYS_FROM_CE);
    let offset_hours = Decimal::from(offset_seconds) / dec!(3600);
    J2000_MIDNIGHT_JULIAN_DAY + days + seconds_of_day / SECONDS_PER_DAY - offset_hours / dec!(24)
}

pub fn julian_century(julian_day: Decimal) -> Decimal {
    (julian_day - J2000_JULIAN_DAY) / DAYS_PER_JULIAN_CENTURY
}

/// Local seconds since midnight, including the fractional part.
pub fn seconds_of_day<Tz: TimeZone>(time: &DateTime<Tz>) -> Decimal {
    let t = time.naive_local().time();
    Decimal::from(t.num_seconds_from_midnight()) + Decimal::new(i64::from(t.nanosecond()), 9)
}

pub fn offset_seconds<Tz: TimeZone>(time: &DateTime<Tz>) -> i32 {
    time.offset().fix().local_minus_utc()
}

pub fn offset_hours<Tz: TimeZone>(time: &DateTime<Tz>) -> Decimal {
    Decimal::from(offset_seconds(time)) / dec!(3600)
}

/// `time + delta`, failing instead of panicking outside chrono's range.
pub fn shift<Tz: TimeZone>(
    time: &DateTime<Tz>,
    delta: TimeDelta,
    context: &'static str,
) -> Result<DateTime<Tz>, SunlightError> {
    time.clone()
        .checked_add_signed(delta)
        .ok_or(SunlightError::TimeOutOfRange { context })
}

/// Converts a decimal number of seconds to a millisecond-resolution delta.
pub fn seconds_to_delta(seconds: Decimal) -> Option<TimeDelta> {
    let millis = (seconds * dec!(1000)).round().to_i64()?;
    TimeDelta::try_milliseconds(millis)
}

/// Converts a delta to decimal seconds.
pub fn delta_to_seconds(delta: TimeDelta) -> Decimal {
    Decimal::from(delta.num_milliseconds()) / dec!(1000)
}

pub fn midpoint<Tz: TimeZone>(low: &DateTime<Tz>, high: &DateTime<Tz>) -> DateTime<Tz> {
    let half = (high.clone() - low.clone()) / 2;
    low.clone() + half
}
