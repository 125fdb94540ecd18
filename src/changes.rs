//! Lazy, unbounded sequence of sunlight changes.

use std::iter::FusedIterator;

use chrono::{DateTime, TimeDelta, TimeZone};

use crate::config::SearchConfig;
use crate::error::SunlightError;
use crate::transitions::TransitionFinder;
use crate::types::SunlightChange;

/// Offset added to each found change before searching for the next one.
pub const RESTART_STEP_SECONDS: i64 = 60;

/// Iterator over successive sunlight changes.
///
/// Never ends on its own; bound it with `take` or `take_while`. After an
/// error has been yielded the iterator is exhausted. It only moves forward
/// and cannot be cloned or rewound; start a new one to replay.
#[derive(Debug)]
pub struct SunlightChanges<Tz: TimeZone> {
    finder: TransitionFinder,
    next_seed: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> SunlightChanges<Tz> {
    pub fn new(finder: TransitionFinder, start: DateTime<Tz>) -> Self {
        Self {
            finder,
            next_seed: Some(start),
        }
    }
}

impl<Tz: TimeZone> Iterator for SunlightChanges<Tz> {
    type Item = Result<SunlightChange<Tz>, SunlightError>;

    fn next(&mut self) -> Option<Self::Item> {
        let seed = self.next_seed.take()?;
        match self.finder.find_next(&seed) {
            Ok(estimate) => {
                self.next_seed = estimate
                    .change
                    .time()
                    .clone()
                    .checked_add_signed(TimeDelta::seconds(RESTART_STEP_SECONDS));
                Some(Ok(estimate.change))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

impl<Tz: TimeZone> FusedIterator for SunlightChanges<Tz> {}

/// All sunlight changes after `start`, in ascending order.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use sunlight_tracker::sunlight_changes;
///
/// let start = Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap();
/// let day = sunlight_changes(&start, 51.5, 0.0)
///     .unwrap()
///     .take(8)
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(day.len(), 8);
/// assert!(day.windows(2).all(|w| w[0].time() < w[1].time()));
/// ```
pub fn sunlight_changes<Tz: TimeZone>(
    start: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
) -> Result<SunlightChanges<Tz>, SunlightError> {
    sunlight_changes_with_config(start, latitude, longitude, SearchConfig::default())
}

pub fn sunlight_changes_with_config<Tz: TimeZone>(
    start: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
    config: SearchConfig,
) -> Result<SunlightChanges<Tz>, SunlightError> {
    let finder = TransitionFinder::with_config(latitude, longitude, config)?;
    Ok(SunlightChanges::new(finder, start.clone()))
}
