//! Search for the next instant at which the sunlight level changes.
//!
//! The search works on half days. Solar noon and solar midnight (noon + 12h)
//! bracket stretches where the elevation is roughly monotonic, so within one
//! half day a boundary is crossed at most once. A half day whose turning
//! point is still in the current level cannot contain a change and is
//! skipped; this is what carries the search through polar days and nights.
//! Inside a bracket the crossing is estimated from a sinusoidal model of the
//! elevation and then refined with a bracketed Newton iteration.

use chrono::{DateTime, TimeDelta, TimeZone};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, trace, warn};

use crate::angles::{self, coordinate};
use crate::config::SearchConfig;
use crate::error::SunlightError;
use crate::precision::{asin, sqrt, HALF_PI};
use crate::time::{self, shift};
use crate::types::{SolarDirection, SolarTimeOfDay, SunlightChange, SunlightLevel};

fn one_second() -> TimeDelta {
    TimeDelta::seconds(1)
}

/// Solar noons and midnights on either side of an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolarExtrema<Tz: TimeZone> {
    pub previous_noon: DateTime<Tz>,
    pub next_noon: DateTime<Tz>,
    pub previous_midnight: DateTime<Tz>,
    pub next_midnight: DateTime<Tz>,
}

/// A located change together with how the refinement went.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEstimate<Tz: TimeZone> {
    pub change: SunlightChange<Tz>,
    /// Refinement iterations spent on the final bracket.
    pub iterations: u32,
    /// Whether the elevation residual reached the configured precision.
    pub converged: bool,
    /// `|elevation - target|` at the returned instant, in degrees.
    pub residual: Decimal,
    /// Half days skipped because the level could not change in them.
    pub polar_skips: u32,
}

struct Bracket<Tz: TimeZone> {
    event: SolarTimeOfDay,
    low: DateTime<Tz>,
    high: DateTime<Tz>,
    guess: DateTime<Tz>,
}

/// Locates sunlight level changes for one location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFinder {
    latitude: Decimal,
    longitude: Decimal,
    config: SearchConfig,
}

impl TransitionFinder {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SunlightError> {
        Self::with_config(latitude, longitude, SearchConfig::default())
    }

    pub fn with_config(
        latitude: f64,
        longitude: f64,
        config: SearchConfig,
    ) -> Result<Self, SunlightError> {
        config.validate()?;
        Ok(Self {
            latitude: coordinate(latitude)?,
            longitude: coordinate(longitude)?,
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn elevation_at<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Result<Decimal, SunlightError> {
        Ok(angles::elevation_at(at, self.latitude, self.longitude)?)
    }

    pub fn level_at<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Result<SunlightLevel, SunlightError> {
        Ok(SunlightLevel::from_elevation(self.elevation_at(at)?))
    }

    /// Finds the nearest solar noons and midnights before and after `at`.
    ///
    /// Candidate dates are scanned outward from the local date of `at`,
    /// alternating backward and forward, until all four are known.
    pub fn solar_extrema<Tz: TimeZone>(
        &self,
        at: &DateTime<Tz>,
    ) -> Result<SolarExtrema<Tz>, SunlightError> {
        let zone = at.timezone();
        let date = at.naive_local().date();
        let days = self.config.noon_search_days();

        let mut previous_noon = None;
        let mut next_noon = None;
        let mut previous_midnight = None;
        let mut next_midnight = None;

        for distance in 0..=days {
            let candidates = if distance == 0 {
                [Some(date), None]
            } else {
                let delta = TimeDelta::days(distance);
                [date.checked_sub_signed(delta), date.checked_add_signed(delta)]
            };
            for day in candidates.into_iter().flatten() {
                let noon = angles::solar_noon_at(day, &zone, self.longitude)?;
                let midnight = shift(&noon, TimeDelta::hours(12), "computing solar midnight")?;
                if noon <= *at {
                    keep_latest(&mut previous_noon, noon);
                } else {
                    keep_earliest(&mut next_noon, noon);
                }
                if midnight <= *at {
                    keep_latest(&mut previous_midnight, midnight);
                } else {
                    keep_earliest(&mut next_midnight, midnight);
                }
            }
            if previous_noon.is_some()
                && next_noon.is_some()
                && previous_midnight.is_some()
                && next_midnight.is_some()
            {
                break;
            }
        }

        match (previous_noon, next_noon, previous_midnight, next_midnight) {
            (Some(previous_noon), Some(next_noon), Some(previous_midnight), Some(next_midnight)) => {
                Ok(SolarExtrema {
                    previous_noon,
                    next_noon,
                    previous_midnight,
                    next_midnight,
                })
            }
            _ => Err(SunlightError::SolarNoonNotFound { date, days }),
        }
    }

    /// Finds the first sunlight level change strictly after `start`.
    ///
    /// Refinement that runs out of iterations still returns its best estimate;
    /// check [`TransitionEstimate::converged`] to tell the two apart.
    #[tracing::instrument(level = "debug", skip(self, start), fields(start = ?start))]
    pub fn find_next<Tz: TimeZone>(
        &self,
        start: &DateTime<Tz>,
    ) -> Result<TransitionEstimate<Tz>, SunlightError> {
        let half_day = TimeDelta::hours(12);
        let mut seed = start.clone();

        for skips in 0..=self.config.max_polar_skips() {
            let elevation = self.elevation_at(&seed)?;
            let ahead = self.elevation_at(&shift(&seed, one_second(), "probing direction")?)?;
            let direction = if ahead > elevation {
                SolarDirection::Rising
            } else {
                SolarDirection::Setting
            };
            let level = SunlightLevel::from_elevation(elevation);
            let extrema = self.solar_extrema(&seed)?;
            trace!(?level, ?direction, %elevation, "classified seed");

            let turn = match direction {
                SolarDirection::Rising => &extrema.next_noon,
                SolarDirection::Setting => &extrema.next_midnight,
            };
            if turn.clone() - seed.clone() <= half_day && self.level_at(turn)? == level {
                debug!(?level, ?direction, ?turn, "level holds through turning point, skipping");
                seed = shift(turn, one_second(), "skipping a polar half day")?;
                continue;
            }

            for candidate in [direction, direction.reversed()] {
                let Some(event) = level.exit_event(candidate) else {
                    continue;
                };
                if let Some(bracket) = self.bracket(&seed, elevation, event, &extrema)? {
                    let mut estimate = self.refine(bracket)?;
                    estimate.polar_skips = skips;
                    debug!(
                        event = ?estimate.change.event(),
                        time = ?estimate.change.time(),
                        iterations = estimate.iterations,
                        skips,
                        "found sunlight change"
                    );
                    return Ok(estimate);
                }
            }

            // Only reached when the seed sits next to an extremum whose
            // approximated time disagrees with the observed direction.
            let nearest = if extrema.next_noon < extrema.next_midnight {
                &extrema.next_noon
            } else {
                &extrema.next_midnight
            };
            debug!(?level, ?nearest, "no reachable boundary, advancing to next turning point");
            seed = shift(nearest, one_second(), "advancing past a turning point")?;
        }

        Err(SunlightError::PolarSkipLimit {
            skips: self.config.max_polar_skips(),
        })
    }

    /// Sets up the half-day bracket in which `event` would happen, or `None`
    /// when the elevation at the closing turning point does not get past the
    /// event's elevation.
    fn bracket<Tz: TimeZone>(
        &self,
        seed: &DateTime<Tz>,
        seed_elevation: Decimal,
        event: SolarTimeOfDay,
        extrema: &SolarExtrema<Tz>,
    ) -> Result<Option<Bracket<Tz>>, SunlightError> {
        let target = event.elevation();
        let (opening, closing, other) = match event.direction() {
            SolarDirection::Rising => (
                &extrema.previous_midnight,
                &extrema.next_noon,
                &extrema.previous_noon,
            ),
            SolarDirection::Setting => (
                &extrema.previous_noon,
                &extrema.next_midnight,
                &extrema.previous_midnight,
            ),
        };

        let closing_elevation = self.elevation_at(closing)?;
        let reachable = match event.direction() {
            SolarDirection::Rising => seed_elevation < target && closing_elevation >= target,
            SolarDirection::Setting => seed_elevation >= target && closing_elevation < target,
        };
        if !reachable {
            trace!(?event, %closing_elevation, "event not reachable before turning point");
            return Ok(None);
        }

        // Interpolate over the whole half day when the seed is inside it.
        let (anchor, anchor_elevation) = if opening > other {
            (opening.clone(), self.elevation_at(opening)?)
        } else {
            (seed.clone(), seed_elevation)
        };
        let guess = interpolate_crossing(&anchor, anchor_elevation, closing, closing_elevation, target)?;
        let guess = if guess > *seed && guess < *closing {
            guess
        } else {
            time::midpoint(seed, closing)
        };

        Ok(Some(Bracket {
            event,
            low: seed.clone(),
            high: closing.clone(),
            guess,
        }))
    }

    /// Newton iteration on elevation, kept inside the bracket.
    ///
    /// The slope is the elevation change over one second. Steps that would
    /// leave the bracket are replaced by bisection.
    fn refine<Tz: TimeZone>(&self, bracket: Bracket<Tz>) -> Result<TransitionEstimate<Tz>, SunlightError> {
        let Bracket {
            event,
            mut low,
            mut high,
            guess,
        } = bracket;
        let target = event.elevation();
        let rising = event.direction() == SolarDirection::Rising;
        let resolution = TimeDelta::milliseconds(1);

        let mut t = guess;
        let mut best: Option<(DateTime<Tz>, Decimal)> = None;
        let mut iterations = 0;

        while iterations < self.config.max_iterations() {
            iterations += 1;
            let elevation = self.elevation_at(&t)?;
            let residual = (elevation - target).abs();
            if best.as_ref().map_or(true, |(_, r)| residual < *r) {
                best = Some((t.clone(), residual));
            }
            if residual <= self.config.precision() {
                return Ok(TransitionEstimate {
                    change: SunlightChange::new(t, event),
                    iterations,
                    converged: true,
                    residual,
                    polar_skips: 0,
                });
            }

            if (elevation < target) == rising {
                low = t.clone();
            } else {
                high = t.clone();
            }
            if high.clone() - low.clone() <= resolution {
                break;
            }

            let slope = self.elevation_at(&shift(&t, one_second(), "estimating slope")?)? - elevation;
            let newton = if slope.is_zero() {
                None
            } else {
                (target - elevation)
                    .checked_div(slope)
                    .and_then(time::seconds_to_delta)
                    .and_then(|step| t.clone().checked_add_signed(step))
            };
            t = match newton {
                Some(next) if next > low && next < high => next,
                _ => time::midpoint(&low, &high),
            };
        }

        let (time, residual) = match best {
            Some(best) => best,
            None => {
                let residual = (self.elevation_at(&t)? - target).abs();
                (t, residual)
            }
        };
        warn!(?event, iterations, %residual, "refinement stopped short of the configured precision");
        Ok(TransitionEstimate {
            change: SunlightChange::new(time, event),
            iterations,
            converged: false,
            residual,
            polar_skips: 0,
        })
    }
}

fn keep_latest<Tz: TimeZone>(slot: &mut Option<DateTime<Tz>>, candidate: DateTime<Tz>) {
    if slot.as_ref().map_or(true, |current| candidate > *current) {
        *slot = Some(candidate);
    }
}

fn keep_earliest<Tz: TimeZone>(slot: &mut Option<DateTime<Tz>>, candidate: DateTime<Tz>) {
    if slot.as_ref().map_or(true, |current| candidate < *current) {
        *slot = Some(candidate);
    }
}

/// Estimates when the elevation reaches `target` between `from` and `to`.
///
/// Between a solar midnight and the following noon the elevation behaves like
/// `a + (b - a)·sin²(π/2·f)` in the elapsed fraction `f`, so the fraction for
/// an elevation ratio `r` is `f = asin(√r) / (π/2)`. The same holds from noon
/// to midnight with the roles of `a` and `b` swapped.
pub fn interpolate_crossing<Tz: TimeZone>(
    from: &DateTime<Tz>,
    from_elevation: Decimal,
    to: &DateTime<Tz>,
    to_elevation: Decimal,
    target: Decimal,
) -> Result<DateTime<Tz>, SunlightError> {
    let span = to_elevation - from_elevation;
    let ratio = if span.is_zero() {
        dec!(0.5)
    } else {
        ((target - from_elevation) / span).clamp(Decimal::ZERO, Decimal::ONE)
    };
    let fraction = asin(sqrt(ratio)?)? / HALF_PI;
    let seconds = time::delta_to_seconds(to.clone() - from.clone()) * fraction;
    let delta = time::seconds_to_delta(seconds).ok_or(SunlightError::TimeOutOfRange {
        context: "estimating a crossing",
    })?;
    shift(from, delta, "estimating a crossing")
}

/// The first sunlight level change strictly after `start`.
pub fn next_sunlight_change<Tz: TimeZone>(
    start: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
) -> Result<SunlightChange<Tz>, SunlightError> {
    Ok(TransitionFinder::new(latitude, longitude)?
        .find_next(start)?
        .change)
}
