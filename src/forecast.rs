//! Daily Forecast Aggregation Module
//!
//! Collapses 3-hour provider samples into per-day highs, lows and a single
//! advisory for each of the next three calendar days after "today".

use crate::models::{DailySummary, ForecastResult, ForecastSample};
use chrono::{Local, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Number of days returned by a forecast
pub const FORECAST_DAYS: usize = 3;

/// Wind speed above which a day is considered windy
pub const HIGH_WIND_THRESHOLD: f64 = 10.0;

/// High temperature above which sunscreen is advised
pub const HEAT_THRESHOLD: f64 = 40.0;

/// How lows, highs and the wind metric are derived for a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Low and high are the min and max of the sample temperature, and the
    /// wind metric repeats the high. Matches the responses of the service
    /// this one replaces.
    #[default]
    Parity,
    /// Low and high come from the per-sample min/max temperatures and the
    /// wind metric is the strongest wind speed of the day.
    Corrected,
}

/// Advisory attached to a day, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    Storm,
    Umbrella,
    Wind,
    Sunscreen,
    None,
}

impl Advisory {
    /// Pick the advisory for a day; the first matching condition wins
    #[must_use]
    pub fn select(conditions: &DayConditions, high_temp: f64) -> Self {
        if conditions.thunderstorm {
            Advisory::Storm
        } else if conditions.rain {
            Advisory::Umbrella
        } else if conditions.high_wind {
            Advisory::Wind
        } else if high_temp > HEAT_THRESHOLD {
            Advisory::Sunscreen
        } else {
            Advisory::None
        }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::Storm => "Don\u{2019}t step out! A Storm is brewing!",
            Advisory::Umbrella => "Carry umbrella",
            Advisory::Wind => "It\u{2019}s too windy, watch out!",
            Advisory::Sunscreen => "Use sunscreen lotion",
            Advisory::None => "",
        }
    }
}

/// Notable conditions seen in any sample of a day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayConditions {
    pub rain: bool,
    pub thunderstorm: bool,
    pub high_wind: bool,
}

impl DayConditions {
    #[must_use]
    pub fn from_samples(samples: &[&ForecastSample]) -> Self {
        Self {
            rain: samples.iter().any(|s| s.mentions("rain")),
            thunderstorm: samples.iter().any(|s| s.mentions("thunderstorm")),
            high_wind: samples.iter().any(|s| s.wind_speed > HIGH_WIND_THRESHOLD),
        }
    }
}

/// Aggregate samples using the system's local time zone
#[must_use]
pub fn aggregate(
    location_name: &str,
    samples: &[ForecastSample],
    today: NaiveDate,
    mode: AggregationMode,
) -> ForecastResult {
    aggregate_in(&Local, location_name, samples, today, mode)
}

/// Aggregate samples into at most [`FORECAST_DAYS`] daily summaries.
///
/// Samples are bucketed by their calendar date in `tz`. Only dates strictly
/// after `today` are kept, earliest first.
#[must_use]
pub fn aggregate_in<Tz: TimeZone>(
    tz: &Tz,
    location_name: &str,
    samples: &[ForecastSample],
    today: NaiveDate,
    mode: AggregationMode,
) -> ForecastResult {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ForecastSample>> = BTreeMap::new();
    for sample in samples {
        match tz.timestamp_opt(sample.timestamp, 0).earliest() {
            Some(local) => by_date.entry(local.date_naive()).or_default().push(sample),
            None => debug!("Skipping sample with out-of-range timestamp {}", sample.timestamp),
        }
    }

    let days: Vec<DailySummary> = by_date
        .into_iter()
        .filter(|(date, _)| *date > today)
        .take(FORECAST_DAYS)
        .map(|(date, day_samples)| summarize_day(tz, date, &day_samples, mode))
        .collect();

    debug!(
        "Aggregated {} samples into {} days for {}",
        samples.len(),
        days.len(),
        location_name
    );

    ForecastResult::new(location_name, days)
}

fn summarize_day<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    samples: &[&ForecastSample],
    mode: AggregationMode,
) -> DailySummary {
    let (low_temp, high_temp, wind_metric) = match mode {
        AggregationMode::Parity => {
            let high = max_of(samples.iter().map(|s| s.temperature));
            let low = min_of(samples.iter().map(|s| s.temperature));
            (low, high, high)
        }
        AggregationMode::Corrected => {
            let high = max_of(samples.iter().map(|s| s.temp_max));
            let low = min_of(samples.iter().map(|s| s.temp_min));
            let wind = max_of(samples.iter().map(|s| s.wind_speed));
            (low, high, wind)
        }
    };

    let conditions = DayConditions::from_samples(samples);
    let advisory = Advisory::select(&conditions, high_temp);

    DailySummary {
        day_start: start_of_day(tz, date),
        low_temp,
        high_temp,
        advisory: advisory.message().to_string(),
        wind_metric,
    }
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

fn min_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::INFINITY, f64::min)
}

/// Unix seconds of the first instant of `date` in `tz`.
///
/// When midnight falls into a DST gap the first valid hour is used.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|hours| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(hours)))
                .earliest()
        })
        .map_or_else(|| midnight.and_utc().timestamp(), |dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Unix seconds for `hour`:00 UTC on the given day
    fn at(day: NaiveDate, hour: u32) -> i64 {
        day.and_hms_opt(hour, 0, 0).unwrap().and_utc().timestamp()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 10)
    }

    fn run(samples: &[ForecastSample]) -> ForecastResult {
        aggregate_in(&Utc, "Testville", samples, today(), AggregationMode::Parity)
    }

    #[test]
    fn test_empty_samples_yield_no_days() {
        let result = run(&[]);
        assert_eq!(result.location_name, "Testville");
        assert!(result.days.is_empty());
    }

    #[test]
    fn test_excludes_today_and_past() {
        let samples = vec![
            ForecastSample::new(at(date(2024, 6, 9), 12), 10.0, "clear", 1.0),
            ForecastSample::new(at(today(), 23), 11.0, "clear", 1.0),
            ForecastSample::new(at(date(2024, 6, 11), 0), 12.0, "clear", 1.0),
        ];
        let result = run(&samples);
        assert_eq!(result.days.len(), 1);
        assert_eq!(result.days[0].day_start, at(date(2024, 6, 11), 0));
    }

    #[test]
    fn test_takes_first_three_days_sorted() {
        let samples: Vec<ForecastSample> = [15, 12, 11, 14, 13]
            .iter()
            .map(|d| ForecastSample::new(at(date(2024, 6, *d), 9), 20.0, "clear", 2.0))
            .collect();
        let result = run(&samples);

        let starts: Vec<i64> = result.days.iter().map(|d| d.day_start).collect();
        assert_eq!(
            starts,
            vec![
                at(date(2024, 6, 11), 0),
                at(date(2024, 6, 12), 0),
                at(date(2024, 6, 13), 0)
            ]
        );
    }

    #[test]
    fn test_parity_low_high_and_wind_metric() {
        let day = date(2024, 6, 11);
        let mut cold = ForecastSample::new(at(day, 3), 14.5, "clear", 3.0);
        cold.temp_min = 2.0;
        let samples = vec![
            cold,
            ForecastSample::new(at(day, 12), 22.0, "clear", 6.0),
            ForecastSample::new(at(day, 18), 19.0, "clear", 4.0),
        ];
        let result = run(&samples);
        let summary = &result.days[0];

        assert_eq!(summary.low_temp, 14.5);
        assert_eq!(summary.high_temp, 22.0);
        assert_eq!(summary.wind_metric, 22.0);
        assert_eq!(summary.advisory, "");
    }

    #[test]
    fn test_corrected_mode_uses_min_max_and_wind() {
        let day = date(2024, 6, 11);
        let mut first = ForecastSample::new(at(day, 3), 14.5, "clear", 3.0);
        first.temp_min = 12.0;
        let mut second = ForecastSample::new(at(day, 15), 21.0, "clear", 7.5);
        second.temp_max = 23.5;

        let result = aggregate_in(
            &Utc,
            "Testville",
            &[first, second],
            today(),
            AggregationMode::Corrected,
        );
        let summary = &result.days[0];
        assert_eq!(summary.low_temp, 12.0);
        assert_eq!(summary.high_temp, 23.5);
        assert_eq!(summary.wind_metric, 7.5);
    }

    #[rstest]
    #[case::storm_beats_everything(&[("Thunderstorm with heavy rain", 15.0)], 45.0, Advisory::Storm)]
    #[case::storm_with_calm_wind(&[("thunderstorm", 5.0)], 20.0, Advisory::Storm)]
    #[case::rain_beats_wind(&[("light rain", 12.0)], 20.0, Advisory::Umbrella)]
    #[case::rain_in_other_sample(&[("clear sky", 1.0), ("Moderate Rain", 1.0)], 20.0, Advisory::Umbrella)]
    #[case::wind_beats_heat(&[("clear sky", 10.5)], 41.0, Advisory::Wind)]
    #[case::wind_at_threshold_is_calm(&[("clear sky", 10.0)], 20.0, Advisory::None)]
    #[case::heat(&[("clear sky", 2.0)], 40.5, Advisory::Sunscreen)]
    #[case::heat_at_threshold(&[("clear sky", 2.0)], 40.0, Advisory::None)]
    fn test_advisory_priority(
        #[case] entries: &[(&str, f64)],
        #[case] temperature: f64,
        #[case] expected: Advisory,
    ) {
        let day = date(2024, 6, 12);
        let samples: Vec<ForecastSample> = entries
            .iter()
            .enumerate()
            .map(|(i, (description, wind))| {
                ForecastSample::new(at(day, 3 * i as u32), temperature, *description, *wind)
            })
            .collect();

        let result = run(&samples);
        assert_eq!(result.days.len(), 1);
        assert_eq!(result.days[0].advisory, expected.message());
    }

    #[test]
    fn test_storm_message_text() {
        assert_eq!(
            Advisory::Storm.message(),
            "Don\u{2019}t step out! A Storm is brewing!"
        );
        assert_eq!(Advisory::Umbrella.message(), "Carry umbrella");
        assert_eq!(Advisory::None.message(), "");
    }

    #[test]
    fn test_grouping_follows_time_zone() {
        // 23:00 UTC on the 11th is already the 12th at UTC+02:00
        let samples = vec![ForecastSample::new(at(date(2024, 6, 11), 23), 18.0, "clear", 1.0)];
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();

        let result = aggregate_in(&tz, "Athens", &samples, today(), AggregationMode::Parity);
        assert_eq!(result.days.len(), 1);
        let expected_start = tz
            .from_local_datetime(&date(2024, 6, 12).and_time(NaiveTime::MIN))
            .unwrap()
            .timestamp();
        assert_eq!(result.days[0].day_start, expected_start);
    }

    #[test]
    fn test_aggregate_uses_local_zone_for_future_days() {
        let tomorrow = Local::now().date_naive() + TimeDelta::days(1);
        let noon = Local
            .from_local_datetime(&tomorrow.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap();
        let samples = vec![ForecastSample::new(noon.timestamp(), 25.0, "rain", 1.0)];

        let result = aggregate(
            "Local",
            &samples,
            Local::now().date_naive(),
            AggregationMode::Parity,
        );
        assert_eq!(result.days.len(), 1);
        assert_eq!(result.days[0].advisory, "Carry umbrella");
    }
}
