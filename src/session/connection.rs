//! Connection collaborators
//!
//! The registry never owns sockets. It keeps a handle to each connection so
//! bandwidth deltas can be collected, and a classification of what the
//! connection is doing.

use std::fmt;

/// Handle to a live connection
pub trait ConnectionHandle: Send + Sync {
    /// Connection id, the key of the client record
    fn id(&self) -> i64;

    /// Bytes received and sent since the previous call
    ///
    /// Each call resets the connection's delta counters.
    fn remark(&self) -> (u64, u64);
}

/// What a connection is doing on its stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnType {
    /// Not yet identified
    Unknown,
    /// Playing (subscriber)
    Play,
    /// Publishing via FMLE-style commands (releaseStream/FCPublish/publish)
    FmlePublish,
    /// Publishing via a bare publish command
    FlashPublish,
    /// Publishing via Haivision encoders
    HaivisionPublish,
}

impl ConnType {
    /// Name as rendered by the status API
    pub fn name(&self) -> &'static str {
        match self {
            ConnType::Unknown => "Unknown",
            ConnType::Play => "Play",
            ConnType::FmlePublish => "fmle-publish",
            ConnType::FlashPublish => "flash-publish",
            ConnType::HaivisionPublish => "haivision-publish",
        }
    }

    /// Everything except a player counts as a publisher
    pub fn is_publish(&self) -> bool {
        !matches!(self, ConnType::Play)
    }
}

impl fmt::Display for ConnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
