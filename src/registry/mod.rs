//! Live statistics registry
//!
//! The registry tracks every vhost, stream and client the server knows
//! about, keeps their bandwidth meters current and renders snapshots for the
//! status API.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<StatisticRegistry>
//!                  ┌──────────────────────────────┐
//!                  │ vhosts:  id -> VhostEntry    │◄── name index
//!                  │ streams: id -> StreamEntry   │◄── url index
//!                  │ clients: id -> ClientEntry   │
//!                  │ kbps (server), perf histos   │
//!                  └──────────────┬───────────────┘
//!                                 │
//!        ┌────────────────────────┼────────────────────────┐
//!        │                        │                        │
//!        ▼                        ▼                        ▼
//!  [Connections]           [Sample task]             [Status API]
//!  on_client()             kbps_sample()             dumps_vhosts()
//!  kbps_add_delta()        every interval            dumps_streams()
//!  on_disconnect()                                   dumps_clients()
//! ```
//!
//! # Delta propagation
//!
//! A client's traffic is credited to its stream, that stream's vhost and
//! the server meter. Records refer to their parents by id, so a client
//! whose stream was closed keeps crediting the vhost and server while the
//! stream level is skipped.

pub mod config;
pub mod dump;
pub mod entry;
pub mod store;

pub use config::{RegistryConfig, StaticVhostConfig, VhostConfig, VhostSettings};
pub use entry::{ClientEntry, StreamEntry, VhostEntry};
pub use store::StatisticRegistry;
