//! I/O batch-size histograms
//!
//! Each histogram has ten buckets over the non-negative integers. A value
//! lands in the first bucket whose bound it satisfies; the last bucket takes
//! everything else.
//!
//! Labels are what the status API has always emitted. Some of them do not
//! match the bucket bound (`lt_2` is the `== 1` bucket, `lt_3` in the iovs
//! table is `<= 2`). Consumers key on the labels, so they stay as they are.

/// Number of buckets in every histogram
pub const BUCKETS: usize = 10;

/// Bucket predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// value == n
    Eq(u64),
    /// value < n
    Lt(u64),
    /// value <= n
    Le(u64),
    /// anything not matched by an earlier bucket
    Rest,
}

impl Bound {
    pub fn matches(&self, value: u64) -> bool {
        match *self {
            Bound::Eq(n) => value == n,
            Bound::Lt(n) => value < n,
            Bound::Le(n) => value <= n,
            Bound::Rest => true,
        }
    }
}

/// Ordered bucket bounds and their rendered labels
#[derive(Debug)]
pub struct BucketTable {
    pub bounds: [Bound; BUCKETS],
    pub labels: [&'static str; BUCKETS],
}

impl BucketTable {
    /// Index of the bucket `value` falls into
    pub fn bucket_of(&self, value: u64) -> usize {
        self.bounds
            .iter()
            .position(|bound| bound.matches(value))
            .unwrap_or(BUCKETS - 1)
    }
}

/// Messages per writev batch
pub static MSGS_TABLE: BucketTable = BucketTable {
    bounds: [
        Bound::Eq(1),
        Bound::Lt(3),
        Bound::Lt(6),
        Bound::Lt(12),
        Bound::Lt(128),
        Bound::Lt(256),
        Bound::Lt(512),
        Bound::Lt(600),
        Bound::Lt(1000),
        Bound::Rest,
    ],
    labels: [
        "lt_2", "lt_3", "lt_6", "lt_12", "lt_128", "lt_256", "lt_512", "lt_600", "lt_1000",
        "gt_1000",
    ],
};

/// iovecs per writev batch
pub static IOVS_TABLE: BucketTable = BucketTable {
    bounds: [
        Bound::Le(2),
        Bound::Lt(10),
        Bound::Lt(20),
        Bound::Lt(200),
        Bound::Lt(300),
        Bound::Lt(500),
        Bound::Lt(700),
        Bound::Lt(900),
        Bound::Lt(1024),
        Bound::Rest,
    ],
    labels: [
        "lt_3", "lt_10", "lt_20", "lt_200", "lt_300", "lt_500", "lt_700", "lt_900", "lt_1024",
        "gt_1024",
    ],
};

/// Packets per sendmmsg batch
pub static SENDMMSG_TABLE: BucketTable = BucketTable {
    bounds: [
        Bound::Eq(1),
        Bound::Lt(10),
        Bound::Lt(100),
        Bound::Lt(200),
        Bound::Lt(300),
        Bound::Lt(400),
        Bound::Lt(500),
        Bound::Lt(600),
        Bound::Lt(1000),
        Bound::Rest,
    ],
    labels: [
        "lt_2", "lt_10", "lt_100", "lt_200", "lt_300", "lt_400", "lt_500", "lt_600", "lt_1000",
        "gt_1000",
    ],
};

/// Packets per GSO batch
pub static GSO_TABLE: BucketTable = BucketTable {
    bounds: [
        Bound::Eq(1),
        Bound::Lt(3),
        Bound::Lt(6),
        Bound::Lt(9),
        Bound::Lt(16),
        Bound::Lt(32),
        Bound::Lt(64),
        Bound::Lt(128),
        Bound::Lt(512),
        Bound::Rest,
    ],
    labels: [
        "lt_2", "lt_3", "lt_6", "lt_9", "lt_16", "lt_32", "lt_64", "lt_128", "lt_512", "gt_512",
    ],
};

/// Ten-bucket counter over one table
#[derive(Debug, Clone)]
pub struct PerfHistogram {
    table: &'static BucketTable,
    counts: [u64; BUCKETS],
}

impl PerfHistogram {
    pub fn new(table: &'static BucketTable) -> Self {
        Self {
            table,
            counts: [0; BUCKETS],
        }
    }

    /// Count one observed batch size; returns the bucket index
    pub fn record(&mut self, value: u64) -> usize {
        let idx = self.table.bucket_of(value);
        self.counts[idx] += 1;
        idx
    }

    pub fn counts(&self) -> &[u64; BUCKETS] {
        &self.counts
    }

    /// Count for the bucket rendered under `label`
    pub fn count(&self, label: &str) -> Option<u64> {
        self.table
            .labels
            .iter()
            .position(|l| *l == label)
            .map(|idx| self.counts[idx])
    }

    /// (label, count) pairs in bucket order
    pub fn buckets(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.table.labels.iter().copied().zip(self.counts.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msgs_buckets() {
        assert_eq!(MSGS_TABLE.bucket_of(1), 0);
        assert_eq!(MSGS_TABLE.bucket_of(2), 1);
        assert_eq!(MSGS_TABLE.bucket_of(5), 2);
        assert_eq!(MSGS_TABLE.bucket_of(12), 4);
        assert_eq!(MSGS_TABLE.bucket_of(599), 7);
        assert_eq!(MSGS_TABLE.bucket_of(999), 8);
        assert_eq!(MSGS_TABLE.bucket_of(1000), 9);
        assert_eq!(MSGS_TABLE.bucket_of(u64::MAX), 9);
    }

    #[test]
    fn test_msgs_zero_is_not_the_single_bucket() {
        // 0 fails "== 1" and lands in "< 3"
        assert_eq!(MSGS_TABLE.bucket_of(0), 1);
    }

    #[test]
    fn test_iovs_buckets() {
        assert_eq!(IOVS_TABLE.bucket_of(0), 0);
        assert_eq!(IOVS_TABLE.bucket_of(2), 0);
        assert_eq!(IOVS_TABLE.bucket_of(3), 1);
        assert_eq!(IOVS_TABLE.bucket_of(1023), 8);
        assert_eq!(IOVS_TABLE.bucket_of(1024), 9);
    }

    #[test]
    fn test_sendmmsg_buckets() {
        assert_eq!(SENDMMSG_TABLE.bucket_of(1), 0);
        assert_eq!(SENDMMSG_TABLE.bucket_of(9), 1);
        assert_eq!(SENDMMSG_TABLE.bucket_of(99), 2);
        assert_eq!(SENDMMSG_TABLE.bucket_of(450), 6);
        assert_eq!(SENDMMSG_TABLE.bucket_of(1000), 9);
    }

    #[test]
    fn test_gso_buckets() {
        assert_eq!(GSO_TABLE.bucket_of(1), 0);
        assert_eq!(GSO_TABLE.bucket_of(8), 3);
        assert_eq!(GSO_TABLE.bucket_of(16), 5);
        assert_eq!(GSO_TABLE.bucket_of(511), 8);
        assert_eq!(GSO_TABLE.bucket_of(512), 9);
    }

    #[test]
    fn test_histogram_record() {
        let mut hist = PerfHistogram::new(&MSGS_TABLE);
        hist.record(1);
        hist.record(1);
        hist.record(2);
        hist.record(5000);

        assert_eq!(hist.count("lt_2"), Some(2));
        assert_eq!(hist.count("lt_3"), Some(1));
        assert_eq!(hist.count("gt_1000"), Some(1));
        assert_eq!(hist.count("lt_9"), None);
        assert_eq!(hist.counts().iter().sum::<u64>(), 4);
    }

    #[test]
    fn test_histogram_buckets_order() {
        let hist = PerfHistogram::new(&GSO_TABLE);
        let labels: Vec<_> = hist.buckets().map(|(label, _)| label).collect();

        assert_eq!(labels.len(), BUCKETS);
        assert_eq!(labels.first(), Some(&"lt_2"));
        assert_eq!(labels.last(), Some(&"gt_512"));
    }
}
