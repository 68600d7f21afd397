//! Live statistics for RTMP streaming servers
//!
//! `rtmp-stats` keeps an in-memory model of every virtual host, stream and
//! client a media server is serving. Connection events feed the registry;
//! a background task samples rolling bandwidth; the status API reads JSON
//! snapshots back out.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rtmp_stats::{Request, StatisticRegistry};
//!
//! #[tokio::main]
//! async fn main() -> rtmp_stats::Result<()> {
//!     let registry = Arc::new(StatisticRegistry::new());
//!     let _sampler = registry.spawn_sample_task();
//!
//!     let req = Request::new("__defaultVhost__", "live", "test");
//!     registry.on_stream_publish(&req, 1);
//!
//!     println!("{}", registry.dumps_streams()?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod media;
pub mod registry;
pub mod session;
pub mod stats;

pub use error::{DumpError, Error, Result};
pub use registry::{RegistryConfig, StaticVhostConfig, StatisticRegistry, VhostConfig, VhostSettings};
pub use session::{ConnType, ConnectionHandle, Request, DEFAULT_VHOST};
pub use stats::{IdGenerator, Kbps};
