//! Statistics primitives
//!
//! Building blocks shared by the registry: id generation, bandwidth meters
//! and batch-size histograms.

pub mod histogram;
pub mod id;
pub mod metrics;

pub use histogram::{BucketTable, PerfHistogram};
pub use id::IdGenerator;
pub use metrics::Kbps;
