//! Aggregate step statistics over a slice of activities.
//!
//! Pure computation; rendering is the caller's concern.

use crate::db::Activity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivitySummary {
    pub count: usize,
    pub total: i64,
    /// Rounded mean step count
    pub average: i64,
    pub max: i64,
    pub min: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionBucket {
    pub label: &'static str,
    pub count: usize,
    pub percent: f64,
}

#[must_use]
pub fn summarize(activities: &[Activity]) -> ActivitySummary {
    if activities.is_empty() {
        return ActivitySummary::default();
    }

    let total: i64 = activities.iter().map(|a| a.steps).sum();
    let max = activities.iter().map(|a| a.steps).max().unwrap_or(0);
    let min = activities.iter().map(|a| a.steps).min().unwrap_or(0);

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let average = (total as f64 / activities.len() as f64).round() as i64;

    ActivitySummary {
        count: activities.len(),
        total,
        average,
        max,
        min,
    }
}

/// Step-range distribution with empty buckets dropped.
#[must_use]
pub fn distribution(activities: &[Activity]) -> Vec<DistributionBucket> {
    let mut counts = [0_usize; 4];
    for activity in activities {
        let bucket = match activity.steps {
            ..=2_000 => 0,
            2_001..=5_000 => 1,
            5_001..=10_000 => 2,
            _ => 3,
        };
        counts[bucket] += 1;
    }

    let total = activities.len().max(1);
    let labels = ["0-2K", "2K-5K", "5K-10K", "10K+"];

    #[allow(clippy::cast_precision_loss)]
    let buckets = labels
        .iter()
        .zip(counts)
        .filter(|&(_, count)| count > 0)
        .map(|(&label, count)| DistributionBucket {
            label,
            count,
            percent: count as f64 / total as f64 * 100.0,
        })
        .collect();

    buckets
}
