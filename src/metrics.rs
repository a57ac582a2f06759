//! Cache statistics, compiled only with the `metrics` feature.
//!
//! Plain counters updated inline by the cache; high-water marks track the
//! worst case since construction. All access is externally synchronized by
//! the cache's single-threaded contract.

#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub high_water_count: usize,
    pub high_water_bytes: usize,
    pub budgeted_high_water_count: usize,
    pub budgeted_high_water_bytes: usize,
    pub scratch_find_calls: u64,
    pub scratch_find_hits: u64,
    pub scratch_find_misses: u64,
    pub unique_find_calls: u64,
    pub unique_find_hits: u64,
    pub unique_find_misses: u64,
    pub released_entries: u64,
    pub released_bytes: u64,
}

impl CacheMetrics {
    pub(crate) fn record_totals(
        &mut self,
        count: usize,
        bytes: usize,
        budgeted_count: usize,
        budgeted_bytes: usize,
    ) {
        self.high_water_count = self.high_water_count.max(count);
        self.high_water_bytes = self.high_water_bytes.max(bytes);
        self.budgeted_high_water_count = self.budgeted_high_water_count.max(budgeted_count);
        self.budgeted_high_water_bytes = self.budgeted_high_water_bytes.max(budgeted_bytes);
    }

    pub(crate) fn record_scratch_find(&mut self, hit: bool) {
        self.scratch_find_calls += 1;
        if hit {
            self.scratch_find_hits += 1;
        } else {
            self.scratch_find_misses += 1;
        }
    }

    pub(crate) fn record_unique_find(&mut self, hit: bool) {
        self.unique_find_calls += 1;
        if hit {
            self.unique_find_hits += 1;
        } else {
            self.unique_find_misses += 1;
        }
    }

    pub(crate) fn record_release(&mut self, bytes: usize) {
        self.released_entries += 1;
        self.released_bytes += bytes as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_water_marks_never_regress() {
        let mut metrics = CacheMetrics::default();

        metrics.record_totals(10, 1000, 8, 800);
        metrics.record_totals(4, 400, 2, 200);

        assert_eq!(metrics.high_water_count, 10);
        assert_eq!(metrics.high_water_bytes, 1000);
        assert_eq!(metrics.budgeted_high_water_count, 8);
        assert_eq!(metrics.budgeted_high_water_bytes, 800);
    }

    #[test]
    fn find_counters_split_hits_and_misses() {
        let mut metrics = CacheMetrics::default();

        metrics.record_scratch_find(true);
        metrics.record_scratch_find(false);
        metrics.record_unique_find(true);

        assert_eq!(metrics.scratch_find_calls, 2);
        assert_eq!(metrics.scratch_find_hits, 1);
        assert_eq!(metrics.scratch_find_misses, 1);
        assert_eq!(metrics.unique_find_calls, 1);
        assert_eq!(metrics.unique_find_hits, 1);
    }
}
