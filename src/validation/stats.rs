/*!
 * Aggregate statistics over validation records.
 */

use serde::Serialize;
use std::collections::BTreeMap;

use super::scoring::{QualityCategory, ScoreBucket, ValidationRecord};

/// Count and share of records in one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BucketStat {
    pub count: usize,
    pub percentage: f64,
}

/// Summary of a set of overall scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub buckets: BTreeMap<ScoreBucket, BucketStat>,
    pub category_means: BTreeMap<QualityCategory, f64>,
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self::from_records(std::iter::empty())
    }
}

impl AggregateStats {
    /// Summarize records; every bucket is present even when empty
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ValidationRecord>,
    {
        let mut scores = Vec::new();
        let mut buckets: BTreeMap<ScoreBucket, BucketStat> = ScoreBucket::ALL
            .iter()
            .map(|b| (*b, BucketStat::default()))
            .collect();
        let mut category_totals: BTreeMap<QualityCategory, (f64, usize)> = BTreeMap::new();

        for record in records {
            scores.push(record.overall_score);
            if let Some(stat) = buckets.get_mut(&record.bucket) {
                stat.count += 1;
            }
            for (category, score) in &record.category_scores {
                let total = category_totals.entry(*category).or_insert((0.0, 0));
                total.0 += score;
                total.1 += 1;
            }
        }

        let count = scores.len();
        for stat in buckets.values_mut() {
            stat.percentage = percentage(stat.count, count);
        }

        let category_means = category_totals
            .into_iter()
            .map(|(category, (sum, n))| (category, sum / n as f64))
            .collect();

        if count == 0 {
            return Self {
                count,
                mean: 0.0,
                median: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
                buckets,
                category_means,
            };
        }

        let mean = scores.iter().sum::<f64>() / count as f64;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count as f64;

        scores.sort_by(|a, b| a.total_cmp(b));
        let median = if count % 2 == 0 {
            (scores[count / 2 - 1] + scores[count / 2]) / 2.0
        } else {
            scores[count / 2]
        };

        Self {
            count,
            mean,
            median,
            std_dev: variance.sqrt(),
            min: scores[0],
            max: scores[count - 1],
            buckets,
            category_means,
        }
    }

    /// Records in a bucket
    pub fn bucket_count(&self, bucket: ScoreBucket) -> usize {
        self.buckets.get(&bucket).map(|b| b.count).unwrap_or(0)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
