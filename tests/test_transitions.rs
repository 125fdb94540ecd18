use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;
use chrono_tz::Arctic::Longyearbyen;
use chrono_tz::Tz;
use proptest::prelude::*;
use rust_decimal_macros::dec;
use sunlight_tracker::{
    next_sunlight_change, solar_elevation, sunlight_changes, sunlight_level_at, SearchConfig,
    SolarDirection, SolarTimeOfDay, SunlightError, SunlightLevel, TransitionFinder,
};

use SolarTimeOfDay::*;

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let l = rust_decimal::prelude::ToPrimitive::to_f64(&$left).unwrap();
        let r = rust_decimal::prelude::ToPrimitive::to_f64(&$right).unwrap();
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    };
}

const SANTA_CLARA: (f64, f64) = (37.35, -121.95);
const SVALBARD: (f64, f64) = (78.92, 11.93);

fn local(zone: Tz, y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
    zone.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn assert_near(actual: &DateTime<Tz>, expected: &DateTime<Tz>, tolerance_secs: i64) {
    let diff = (actual.clone() - expected.clone()).num_seconds().abs();
    assert!(
        diff <= tolerance_secs,
        "expected {} got {} (off by {}s, tolerance {}s)",
        expected,
        actual,
        diff,
        tolerance_secs
    );
}

/// Changes on the local calendar day of `start`.
fn changes_on_day(start: &DateTime<Tz>, (lat, lon): (f64, f64)) -> Vec<(DateTime<Tz>, SolarTimeOfDay)> {
    let day = start.date_naive();
    sunlight_changes(start, lat, lon)
        .unwrap()
        .map(|change| change.unwrap())
        .take_while(|change| change.time().date_naive() == day)
        .map(|change| (change.time().clone(), change.event()))
        .collect()
}

// ── Reference days ──

#[test]
fn test_santa_clara_ordinary_day() {
    let start = local(Los_Angeles, 2024, 1, 28, 0, 0, 0);
    let expected = [
        (AstronomicalDawn, 5, 44),
        (NauticalDawn, 6, 15),
        (CivilDawn, 6, 46),
        (Sunrise, 7, 14),
        (Sunset, 17, 27),
        (CivilDusk, 17, 55),
        (NauticalDusk, 18, 26),
        (AstronomicalDusk, 18, 57),
    ];
    let found = changes_on_day(&start, SANTA_CLARA);
    assert_eq!(found.len(), expected.len(), "found {:?}", found);
    for ((time, event), (expected_event, h, m)) in found.iter().zip(expected) {
        assert_eq!(*event, expected_event);
        assert_near(time, &local(Los_Angeles, 2024, 1, 28, h, m, 0), 120);
    }
}

#[test]
fn test_svalbard_double_civil_dusk() {
    let start = local(Longyearbyen, 2024, 9, 10, 0, 0, 0);
    let expected = [
        (CivilDusk, 0, 28, 32),
        (CivilDawn, 1, 52, 33),
        (Sunrise, 5, 14, 44),
        (Sunset, 20, 57, 42),
        (CivilDusk, 23, 56, 38),
    ];
    let found = changes_on_day(&start, SVALBARD);
    assert_eq!(found.len(), expected.len(), "found {:?}", found);
    for ((time, event), (expected_event, h, m, s)) in found.iter().zip(expected) {
        assert_eq!(*event, expected_event);
        assert_near(time, &local(Longyearbyen, 2024, 9, 10, h, m, s), 60);
    }
}

#[test]
fn test_svalbard_polar_day_has_no_changes() {
    let start = local(Longyearbyen, 2024, 4, 17, 0, 0, 0);
    assert!(changes_on_day(&start, SVALBARD).is_empty());
    for hour in [0, 6, 12, 18, 23] {
        let t = local(Longyearbyen, 2024, 4, 17, hour, 0, 0);
        assert_eq!(
            sunlight_level_at(&t, SVALBARD.0, SVALBARD.1).unwrap(),
            SunlightLevel::Daylight
        );
    }
}

#[test]
fn test_svalbard_polar_day_ends_with_sunset_in_august() {
    let start = local(Longyearbyen, 2024, 4, 17, 0, 0, 0);
    let finder = TransitionFinder::new(SVALBARD.0, SVALBARD.1).unwrap();
    let estimate = finder.find_next(&start).unwrap();
    let time = estimate.change.time();
    assert_eq!(estimate.change.event(), Sunset);
    assert_eq!(time.month(), 8);
    assert!((22..=29).contains(&time.day()), "first sunset on {}", time);
    assert!(estimate.polar_skips > 200, "skips {}", estimate.polar_skips);
    assert!(estimate.converged);
}

#[test]
fn test_svalbard_polar_night_only_reaches_astronomical_twilight() {
    let start = local(Longyearbyen, 2024, 12, 21, 0, 0, 0);
    let events: Vec<_> = changes_on_day(&start, SVALBARD)
        .into_iter()
        .map(|(_, event)| event)
        .collect();
    assert_eq!(events, vec![AstronomicalDawn, AstronomicalDusk]);
}

// ── Search properties ──

#[test]
fn test_found_instants_hit_event_elevation() {
    for (start, location) in [
        (local(Los_Angeles, 2024, 1, 28, 0, 0, 0), SANTA_CLARA),
        (local(Longyearbyen, 2024, 9, 10, 0, 0, 0), SVALBARD),
    ] {
        let finder = TransitionFinder::new(location.0, location.1).unwrap();
        let mut seed = start;
        for _ in 0..6 {
            let estimate = finder.find_next(&seed).unwrap();
            assert!(estimate.converged);
            assert!(estimate.residual <= dec!(0.0001));
            let elevation = solar_elevation(estimate.change.time(), location.0, location.1).unwrap();
            assert_approx!(elevation, estimate.change.event().elevation(), 1e-4);
            seed = estimate.change.time().clone() + TimeDelta::minutes(1);
        }
    }
}

#[test]
fn test_change_is_strictly_after_start() {
    let start = local(Los_Angeles, 2024, 1, 28, 0, 0, 0);
    let first = next_sunlight_change(&start, SANTA_CLARA.0, SANTA_CLARA.1).unwrap();
    assert!(*first.time() > start);

    let just_after = first.time().clone() + TimeDelta::seconds(1);
    let second = next_sunlight_change(&just_after, SANTA_CLARA.0, SANTA_CLARA.1).unwrap();
    assert!(second.time() > first.time());
    assert_ne!(second.event(), first.event());
}

#[test]
fn test_change_derives_levels_from_event() {
    let start = local(Los_Angeles, 2024, 1, 28, 12, 0, 0);
    let change = next_sunlight_change(&start, SANTA_CLARA.0, SANTA_CLARA.1).unwrap();
    assert_eq!(change.event(), Sunset);
    assert_eq!(change.previous_level(), SunlightLevel::Daylight);
    assert_eq!(change.new_level(), SunlightLevel::CivilTwilight);
    assert_eq!(change.direction(), SolarDirection::Setting);
}

#[test]
fn test_result_keeps_caller_time_zone() {
    let start = Utc.with_ymd_and_hms(2024, 1, 28, 8, 0, 0).unwrap();
    let utc = next_sunlight_change(&start, SANTA_CLARA.0, SANTA_CLARA.1).unwrap();
    let la = next_sunlight_change(&start.with_timezone(&Los_Angeles), SANTA_CLARA.0, SANTA_CLARA.1).unwrap();
    assert_eq!(utc.event(), la.event());
    let diff = (utc.time().clone() - la.time().with_timezone(&Utc)).num_seconds().abs();
    assert!(diff <= 1, "zone representation moved the result by {}s", diff);
}

#[test]
fn test_loose_precision_still_lands_near_event() {
    let config = SearchConfig::new().with_precision(dec!(0.05));
    let finder = TransitionFinder::with_config(SANTA_CLARA.0, SANTA_CLARA.1, config).unwrap();
    let start = local(Los_Angeles, 2024, 1, 28, 12, 0, 0);
    let estimate = finder.find_next(&start).unwrap();
    assert!(estimate.residual <= dec!(0.05));
    assert_near(estimate.change.time(), &local(Los_Angeles, 2024, 1, 28, 17, 27, 0), 120);
}

#[test]
fn test_iteration_budget_returns_best_estimate() {
    let config = SearchConfig::new()
        .with_precision(dec!(0.0000000000000001))
        .with_max_iterations(2);
    let finder = TransitionFinder::with_config(SANTA_CLARA.0, SANTA_CLARA.1, config).unwrap();
    let start = local(Los_Angeles, 2024, 1, 28, 12, 0, 0);
    let estimate = finder.find_next(&start).unwrap();
    assert!(!estimate.converged);
    assert_eq!(estimate.iterations, 2);
    assert_eq!(estimate.change.event(), Sunset);
    assert_near(estimate.change.time(), &local(Los_Angeles, 2024, 1, 28, 17, 27, 0), 600);
}

#[test]
fn test_polar_skip_budget_is_enforced() {
    let config = SearchConfig::new().with_max_polar_skips(5);
    let finder = TransitionFinder::with_config(SVALBARD.0, SVALBARD.1, config).unwrap();
    let start = local(Longyearbyen, 2024, 4, 17, 0, 0, 0);
    assert_eq!(
        finder.find_next(&start).unwrap_err(),
        SunlightError::PolarSkipLimit { skips: 5 }
    );
}

#[test]
fn test_invalid_configuration_rejected() {
    let config = SearchConfig::new().with_max_iterations(0);
    assert!(matches!(
        TransitionFinder::with_config(0.0, 0.0, config),
        Err(SunlightError::InvalidConfig { .. })
    ));
    assert!(matches!(
        TransitionFinder::new(f64::NAN, 0.0),
        Err(SunlightError::NonFiniteCoordinate { .. })
    ));
}

#[test]
fn test_extrema_bracket_the_seed() {
    let finder = TransitionFinder::new(SANTA_CLARA.0, SANTA_CLARA.1).unwrap();
    let at = local(Los_Angeles, 2024, 1, 28, 9, 0, 0);
    let extrema = finder.solar_extrema(&at).unwrap();
    assert!(extrema.previous_noon <= at && at < extrema.next_noon);
    assert!(extrema.previous_midnight <= at && at < extrema.next_midnight);
    assert_eq!(extrema.previous_midnight.clone() - extrema.previous_noon.clone(), TimeDelta::hours(12));
    assert_eq!(extrema.next_midnight.clone() - extrema.next_noon.clone(), TimeDelta::hours(12));
    let span = (extrema.next_noon.clone() - extrema.previous_noon.clone()).num_minutes();
    assert!((span - 24 * 60).abs() <= 1, "noon to noon {} min", span);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_change_crosses_level_after_start(
        minutes in 0i64..(366 * 24 * 60),
        lat in -60.0f64..60.0,
        lon in -180.0f64..180.0,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::minutes(minutes);
        let change = next_sunlight_change(&start, lat, lon).unwrap();
        prop_assert!(*change.time() > start);
        prop_assert!(*change.time() - start < TimeDelta::hours(24));
        prop_assert_eq!(sunlight_level_at(&start, lat, lon).unwrap(), change.previous_level());
        let before = change.time().clone() - TimeDelta::seconds(5);
        let after = change.time().clone() + TimeDelta::seconds(5);
        if before > start {
            prop_assert_eq!(sunlight_level_at(&before, lat, lon).unwrap(), change.previous_level());
        }
        prop_assert_eq!(sunlight_level_at(&after, lat, lon).unwrap(), change.new_level());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_polar_change_is_first_crossing_after_start(
        minutes in 0i64..(366 * 24 * 60),
        lat in prop_oneof![60.0f64..85.0, -85.0f64..-60.0],
        lon in -180.0f64..180.0,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::minutes(minutes);
        let finder = TransitionFinder::new(lat, lon).unwrap();
        let estimate = finder.find_next(&start).unwrap();
        let change = &estimate.change;
        prop_assert!(*change.time() > start);
        prop_assert!(estimate.converged);
        let elevation = solar_elevation(change.time(), lat, lon).unwrap();
        prop_assert!((elevation - change.event().elevation()).abs() <= dec!(0.0001));
        prop_assert_eq!(sunlight_level_at(&start, lat, lon).unwrap(), change.previous_level());

        // Nothing crosses a boundary between the start and the reported change.
        let span = *change.time() - start;
        for k in 1..8 {
            let t = start + span * k / 8;
            if *change.time() - t > TimeDelta::minutes(1) {
                prop_assert_eq!(sunlight_level_at(&t, lat, lon).unwrap(), change.previous_level());
            }
        }
    }
}
