use crate::index::settings::RangeBucketing;
use crate::types::BucketCounts;
use std::collections::BTreeMap;

/// Maps continuous values to bucket starts.
///
/// Natural buckets are `floor(value / step) * step`. Values in `[0, step)` are
/// refined by seeds: such a value lands in the largest seed not above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBucketer {
    step: i64,
    seeds: Vec<i64>,
}

impl RangeBucketer {
    /// A non-positive step degrades to 1. Seeds outside `[0, step)` are ignored.
    pub fn new(step: i64, seeds: &[i64]) -> Self {
        let step = if step > 0 {
            step
        } else {
            tracing::warn!("[BUCKETS] invalid step {}, using 1", step);
            1
        };
        let mut seeds: Vec<i64> = seeds.iter().copied().filter(|s| (0..step).contains(s)).collect();
        seeds.sort_unstable();
        seeds.dedup();
        RangeBucketer { step, seeds }
    }

    pub fn from_bucketing(bucketing: &RangeBucketing) -> Self {
        Self::new(bucketing.step, &bucketing.seeds)
    }

    /// Effective step after degradation.
    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn seeds(&self) -> &[i64] {
        &self.seeds
    }

    /// Bucket start for `value`.
    ///
    /// `None` for non-finite values and for values whose bucket start does
    /// not fit in an `i64`.
    pub fn bucket_of(&self, value: f64) -> Option<i64> {
        if !value.is_finite() {
            return None;
        }
        let floored = value.floor();
        let quotient = (floored / self.step as f64).floor();
        if quotient < i64::MIN as f64 || quotient >= i64::MAX as f64 {
            return None;
        }
        let natural = (quotient as i64).checked_mul(self.step)?;
        if natural == 0 {
            let exact = floored as i64;
            if let Some(seed) = self.seeds.iter().rev().find(|s| **s <= exact) {
                return Some(*seed);
            }
        }
        Some(natural)
    }

    /// Groups `values` into ascending bucket counts. Empty buckets are not emitted.
    pub fn bucketize<I>(&self, values: I) -> BucketCounts
    where
        I: IntoIterator<Item = f64>,
    {
        let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
        for bucket in values.into_iter().filter_map(|v| self.bucket_of(v)) {
            *counts.entry(bucket).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }

    /// Seeds worth offering as options given the populated buckets.
    ///
    /// A seed is offered when some populated bucket in `[0, step)` starts at
    /// or above it.
    pub fn offered_seeds(&self, buckets: &BucketCounts) -> Vec<i64> {
        let Some(highest_low) = buckets
            .keys()
            .copied()
            .filter(|k| (0..self.step).contains(k))
            .max()
        else {
            return Vec::new();
        };
        self.seeds
            .iter()
            .copied()
            .filter(|s| *s <= highest_low)
            .collect()
    }
}
