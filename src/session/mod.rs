//! Session-side collaborators
//!
//! What the registry knows about a connection: the request it carried and a
//! handle used to collect its traffic.

pub mod connection;
pub mod request;

pub use connection::{ConnType, ConnectionHandle};
pub use request::{Request, DEFAULT_VHOST};
