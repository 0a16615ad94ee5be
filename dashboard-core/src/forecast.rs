use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{model::ForecastPoint, provider::ForecastSample};

/// Group 3-hour samples by UTC calendar day and reduce each day to its
/// minimum and maximum temperature. Days come out in ascending order.
pub fn aggregate_daily(samples: &[ForecastSample]) -> Vec<ForecastPoint> {
    let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

    for sample in samples {
        let t = sample.temperature;
        days.entry(sample.time.date_naive())
            .and_modify(|(min, max)| {
                *min = min.min(t);
                *max = max.max(t);
            })
            .or_insert((t, t));
    }

    days.into_iter()
        .map(|(date, (min_temperature, max_temperature))| ForecastPoint {
            date,
            min_temperature,
            max_temperature,
        })
        .collect()
}
