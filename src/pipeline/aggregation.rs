//! Grouped counts and hour-of-day filtering over records.
//!
//! Every function takes anything that yields `&Record`, so a `&Dataset` and a
//! `&Subset` can be passed interchangeably.

use crate::data_model::{Counts, EntityCount, Record, SentimentCount, Subset};
use crate::error::{DashboardError, Result};

pub const HOURS_PER_DAY: u32 = 24;

pub fn count_by_sentiment<'a, I>(records: I) -> SentimentCount
where
    I: IntoIterator<Item = &'a Record>,
{
    Counts::tally(records.into_iter().map(|r| r.sentiment))
}

/// Records per entity, descending by count, ties in first-seen order.
pub fn count_by_entity<'a, I>(records: I) -> EntityCount
where
    I: IntoIterator<Item = &'a Record>,
{
    Counts::tally(records.into_iter().map(|r| r.entity.clone()))
}

pub fn count_by_entity_and_sentiment<'a, I>(records: I, entity: &str) -> SentimentCount
where
    I: IntoIterator<Item = &'a Record>,
{
    count_by_sentiment(records.into_iter().filter(|r| r.entity == entity))
}

pub fn filter_by_entity<'a, I>(records: I, entity: &str) -> Subset<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().filter(|r| r.entity == entity).collect()
}

pub fn validate_hour(hour: u32) -> Result<u32> {
    if hour < HOURS_PER_DAY {
        Ok(hour)
    } else {
        Err(DashboardError::InvalidHour(hour))
    }
}

/// Records created during `hour` (0-23), in the offset each timestamp carries.
pub fn filter_by_hour<'a, I>(records: I, hour: u32) -> Result<Subset<'a>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let hour = validate_hour(hour)?;
    Ok(records.into_iter().filter(|r| r.hour() == hour).collect())
}

pub fn hourly_histogram<'a, I>(records: I) -> [usize; HOURS_PER_DAY as usize]
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut histogram = [0usize; HOURS_PER_DAY as usize];
    for record in records {
        histogram[record.hour() as usize] += 1;
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::{Dataset, Sentiment};
    use chrono::{FixedOffset, TimeZone};

    fn record(id: usize, sentiment: Sentiment, entity: &str, hour: u32) -> Record {
        let offset = FixedOffset::west_opt(8 * 3600).unwrap();
        Record {
            id: format!("t{}", id),
            text: format!("tweet number {}", id),
            sentiment,
            entity: entity.to_string(),
            created_at: offset.with_ymd_and_hms(2015, 2, 24, hour, 15, 0).unwrap(),
            coordinates: None,
        }
    }

    fn scenario() -> Dataset {
        Dataset::new(
            "memory",
            vec![
                record(0, Sentiment::Positive, "Delta", 9),
                record(1, Sentiment::Negative, "Delta", 9),
                record(2, Sentiment::Positive, "United", 17),
            ],
            0,
        )
    }

    fn larger() -> Dataset {
        let entities = ["United", "Delta", "Southwest", "Virgin America"];
        let records = (0..200)
            .map(|i| {
                record(
                    i,
                    Sentiment::ALL[(i * 7) % 3],
                    entities[(i * 3) % entities.len()],
                    ((i * 5) % 24) as u32,
                )
            })
            .collect();
        Dataset::new("memory", records, 0)
    }

    #[test]
    fn test_scenario_counts() {
        let dataset = scenario();
        let by_sentiment = count_by_sentiment(&dataset);
        assert_eq!(by_sentiment.get(&Sentiment::Positive), 2);
        assert_eq!(by_sentiment.get(&Sentiment::Negative), 1);
        assert_eq!(by_sentiment.get(&Sentiment::Neutral), 0);
        assert_eq!(by_sentiment.len(), 2);

        let by_entity = count_by_entity(&dataset);
        let order: Vec<(&String, usize)> = by_entity.iter().collect();
        assert_eq!(
            order,
            vec![(&"Delta".to_string(), 2), (&"United".to_string(), 1)]
        );
    }

    #[test]
    fn test_sentiment_counts_sum_to_dataset_size() {
        let dataset = larger();
        let counts = count_by_sentiment(&dataset);
        let sum: usize = Sentiment::ALL.iter().map(|s| counts.get(s)).sum();
        assert_eq!(sum, dataset.len());
        assert_eq!(count_by_entity(&dataset).total(), dataset.len());
    }

    #[test]
    fn test_entity_breakdown_sums_to_entity_size() {
        let dataset = larger();
        for entity in dataset.entities() {
            let expected = dataset.iter().filter(|r| r.entity == entity).count();
            assert_eq!(
                count_by_entity_and_sentiment(&dataset, entity).total(),
                expected
            );
            assert_eq!(filter_by_entity(&dataset, entity).len(), expected);
        }
        assert!(count_by_entity_and_sentiment(&dataset, "Alaska").is_empty());
    }

    #[test]
    fn test_hours_partition_the_dataset() {
        let dataset = larger();
        let mut seen = std::collections::HashSet::new();
        let mut total = 0;
        for hour in 0..24 {
            let subset = filter_by_hour(&dataset, hour).unwrap();
            for r in &subset {
                assert_eq!(r.hour(), hour);
                assert!(seen.insert(r.id.clone()), "record {} counted twice", r.id);
            }
            total += subset.len();
        }
        assert_eq!(total, dataset.len());
        assert_eq!(hourly_histogram(&dataset).iter().sum::<usize>(), dataset.len());
    }

    #[test]
    fn test_filter_by_hour_rejects_out_of_range() {
        let dataset = scenario();
        assert!(matches!(
            filter_by_hour(&dataset, 25),
            Err(DashboardError::InvalidHour(25))
        ));
        assert!(filter_by_hour(&dataset, 24).is_err());
        assert!(filter_by_hour(&dataset, 23).unwrap().is_empty());
    }

    #[test]
    fn test_filters_compose_over_subsets() {
        let dataset = scenario();
        let delta = filter_by_entity(&dataset, "Delta");
        let at_nine = filter_by_hour(&delta, 9).unwrap();
        assert_eq!(at_nine.len(), 2);
        assert_eq!(count_by_sentiment(&at_nine).total(), 2);
    }
}
