use super::FacetExecutor;
use crate::index::cumulative::CumulativeIndex;
use crate::index::settings::RangeBucketing;
use crate::query::buckets::RangeBucketer;
use crate::query::filter::{CompiledFilter, Constraint, MatchMasks};
use crate::types::{BucketCounts, Field, Item, RangeBound, RangeOptions};
use std::collections::BTreeMap;

/// Everything computed for one range facet.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFacet {
    pub buckets: BucketCounts,
    pub options: RangeOptions,
    /// Effective bucket step.
    pub step: i64,
    /// Smallest floored value in the self-excluded item set.
    pub min_value: Option<i64>,
    /// Exact floored value → count for values in `[0, step)`.
    pub exact: BucketCounts,
}

impl FacetExecutor {
    pub(crate) fn compute_range(
        &self,
        items: &[Item],
        filter: &CompiledFilter,
        masks: &MatchMasks,
        field: Field,
        bucketing: &RangeBucketing,
    ) -> RangeFacet {
        let bucketer = RangeBucketer::from_bucketing(bucketing);
        let values: Vec<f64> = masks
            .excluding(field)
            .filter_map(|i| items[i].number(field))
            .collect();

        let buckets = bucketer.bucketize(values.iter().copied());
        let index = CumulativeIndex::from_counts(&buckets);

        let (selected_lo, selected_hi) = selected_bounds(filter, field, &bucketer);

        let mut candidates: Vec<i64> = index.keys().to_vec();
        candidates.extend(bucketer.offered_seeds(&buckets));

        let options = RangeOptions {
            from: index.from_options(selected_hi, &candidates),
            to: index.to_options(selected_lo, &candidates),
        };

        let floored = values.iter().map(|v| v.floor() as i64);
        let min_value = floored.clone().min();
        let mut exact: BTreeMap<i64, u64> = BTreeMap::new();
        for v in floored.filter(|v| (0..bucketer.step()).contains(v)) {
            *exact.entry(v).or_insert(0) += 1;
        }

        tracing::debug!(
            "[FACET_RANGE] {} step={} values={} buckets={} lo={:?} hi={:?}",
            field,
            bucketer.step(),
            values.len(),
            buckets.len(),
            selected_lo,
            selected_hi
        );

        RangeFacet {
            buckets,
            options,
            step: bucketer.step(),
            min_value,
            exact: exact.into_iter().collect(),
        }
    }
}

/// Selected `{min, max}` for `field` as cumulative-index bounds.
///
/// The lower bound moves to its containing bucket so an option list built
/// from bucket starts lines up with it. The upper bound stays a plain value;
/// the index selects every bucket starting at or below it.
///
/// A lower bound past every representable bucket selects nothing when
/// positive and everything when negative.
fn selected_bounds(
    filter: &CompiledFilter,
    field: Field,
    bucketer: &RangeBucketer,
) -> (RangeBound, RangeBound) {
    let Some(Constraint::Between(range)) = filter.constraint(field) else {
        return (RangeBound::Unbounded, RangeBound::Unbounded);
    };
    let lo = match range.min {
        Some(v) => match bucketer.bucket_of(v) {
            Some(bucket) => RangeBound::Bound(bucket),
            None if v > 0.0 => RangeBound::Bound(i64::MAX),
            None => RangeBound::Unbounded,
        },
        None => RangeBound::Unbounded,
    };
    let hi = range
        .max
        .map(|v| v.floor() as i64)
        .map_or(RangeBound::Unbounded, RangeBound::Bound);
    (lo, hi)
}
