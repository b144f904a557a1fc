use crate::types::{BucketCounts, RangeBound, RangeOption};

/// Sorted bucket starts with a parallel inclusive prefix-sum array.
///
/// Built once per range facet per request. `prefix[i]` is the number of items
/// in buckets `keys[0..=i]`, so any inclusive key range sums in O(log n)
/// through two binary searches. Both the "From" and the "To" option lists are
/// answered from the same index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CumulativeIndex {
    keys: Vec<i64>,
    prefix: Vec<u64>,
}

impl CumulativeIndex {
    /// Accepts buckets in any order. Duplicate keys are merged.
    pub fn from_buckets<I>(buckets: I) -> Self
    where
        I: IntoIterator<Item = (i64, u64)>,
    {
        let mut pairs: Vec<(i64, u64)> = buckets.into_iter().collect();
        pairs.sort_unstable_by_key(|(k, _)| *k);

        let mut keys: Vec<i64> = Vec::with_capacity(pairs.len());
        let mut prefix: Vec<u64> = Vec::with_capacity(pairs.len());
        let mut running = 0u64;
        for (key, count) in pairs {
            running += count;
            if keys.last() == Some(&key) {
                if let Some(last) = prefix.last_mut() {
                    *last = running;
                }
            } else {
                keys.push(key);
                prefix.push(running);
            }
        }
        CumulativeIndex { keys, prefix }
    }

    pub fn from_counts(counts: &BucketCounts) -> Self {
        Self::from_buckets(counts.iter().map(|(k, c)| (*k, *c)))
    }

    pub fn keys(&self) -> &[i64] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.prefix.last().copied().unwrap_or(0)
    }

    /// `P[i]`. Out-of-range indices clamp to the total.
    pub fn prefix_at(&self, i: usize) -> u64 {
        self.prefix.get(i).copied().unwrap_or_else(|| self.total())
    }

    /// `P[i - 1]` with `P[-1] = 0`.
    fn prefix_before(&self, i: usize) -> u64 {
        if i == 0 {
            0
        } else {
            self.prefix_at(i - 1)
        }
    }

    /// Sum of bucket counts for key indices `i..=j`. Empty when `i > j`.
    pub fn range_sum(&self, i: usize, j: usize) -> u64 {
        if i > j || i >= self.keys.len() {
            return 0;
        }
        self.prefix_at(j).saturating_sub(self.prefix_before(i))
    }

    /// Index of the first key `>= lo`, or `None` if every key is below `lo`.
    pub fn lower_index(&self, lo: i64) -> Option<usize> {
        let i = self.keys.partition_point(|k| *k < lo);
        (i < self.keys.len()).then_some(i)
    }

    /// Index of the last key `<= hi`, or `None` if every key is above `hi`.
    pub fn upper_index(&self, hi: i64) -> Option<usize> {
        self.keys.partition_point(|k| *k <= hi).checked_sub(1)
    }

    /// Items in buckets whose start lies in `[lo, hi]`.
    ///
    /// `lo` is expected in bucket space (a bucket start or seed); `hi` may be
    /// any value and selects every bucket starting at or below it. Crossed
    /// bounds yield 0.
    pub fn count_between(&self, lo: RangeBound, hi: RangeBound) -> u64 {
        let upper = match hi {
            RangeBound::Unbounded => self.total(),
            RangeBound::Bound(h) => self.upper_index(h).map_or(0, |j| self.prefix_at(j)),
        };
        let below = match lo {
            RangeBound::Unbounded => 0,
            RangeBound::Bound(l) => match self.lower_index(l) {
                Some(i) => self.prefix_before(i),
                None => self.total(),
            },
        };
        upper.saturating_sub(below)
    }

    /// "From" options given the currently selected upper bound.
    ///
    /// `Any` comes first. Candidates are offered ascending; zero-count
    /// candidates are dropped except the lowest one.
    pub fn from_options(&self, selected_hi: RangeBound, candidates: &[i64]) -> Vec<RangeOption> {
        let mut options = Vec::with_capacity(candidates.len() + 1);
        options.push(RangeOption {
            bound: RangeBound::Unbounded,
            count: self.count_between(RangeBound::Unbounded, selected_hi),
        });
        for (pos, lo) in sorted_unique(candidates).into_iter().enumerate() {
            let count = self.count_between(RangeBound::Bound(lo), selected_hi);
            if count > 0 || pos == 0 {
                options.push(RangeOption {
                    bound: RangeBound::Bound(lo),
                    count,
                });
            }
        }
        options
    }

    /// "To" options given the currently selected lower bound (in bucket space).
    pub fn to_options(&self, selected_lo: RangeBound, candidates: &[i64]) -> Vec<RangeOption> {
        let mut options = Vec::with_capacity(candidates.len() + 1);
        options.push(RangeOption {
            bound: RangeBound::Unbounded,
            count: self.count_between(selected_lo, RangeBound::Unbounded),
        });
        for hi in sorted_unique(candidates) {
            let count = self.count_between(selected_lo, RangeBound::Bound(hi));
            if count > 0 {
                options.push(RangeOption {
                    bound: RangeBound::Bound(hi),
                    count,
                });
            }
        }
        options
    }
}

fn sorted_unique(values: &[i64]) -> Vec<i64> {
    let mut v = values.to_vec();
    v.sort_unstable();
    v.dedup();
    v
}
