//! Registry records
//!
//! One record type per level of the hierarchy. Parents are referenced by id,
//! never by pointer: a client whose stream has been removed holds a stale id
//! that simply fails to resolve.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::media::{AudioInfo, VideoInfo};
use crate::session::{ConnType, ConnectionHandle, Request};
use crate::stats::Kbps;

/// A virtual host
#[derive(Debug, Clone)]
pub struct VhostEntry {
    /// Generated id
    pub id: i64,

    /// Vhost name, the natural key
    pub name: String,

    /// Clients attached to streams of this vhost
    pub nb_clients: u64,

    /// Streams currently publishing on this vhost
    pub nb_streams: u64,

    /// Traffic of every stream on this vhost
    pub kbps: Kbps,
}

impl VhostEntry {
    pub(super) fn new(id: i64, name: String) -> Self {
        Self {
            id,
            name,
            nb_clients: 0,
            nb_streams: 0,
            kbps: Kbps::new(),
        }
    }
}

/// A logical stream (vhost + app + stream name)
#[derive(Debug, Clone)]
pub struct StreamEntry {
    /// Generated id
    pub id: i64,

    /// Id of the owning vhost, fixed at creation
    pub vhost_id: i64,

    /// Application name
    pub app: String,

    /// Stream name
    pub name: String,

    /// Canonical stream URL, the natural key
    pub url: String,

    /// Whether a publisher is currently active
    pub active: bool,

    /// Connection id of the publisher
    pub publisher_cid: Option<i64>,

    /// Video descriptor, once a video-info event arrived
    pub video: Option<VideoInfo>,

    /// Audio descriptor, once an audio-info event arrived
    pub audio: Option<AudioInfo>,

    /// Clients attached to this stream
    pub nb_clients: u64,

    /// Video frames counted so far
    pub nb_frames: u64,

    /// Traffic of every client on this stream
    pub kbps: Kbps,

    /// When the record was created
    pub created_at: Instant,
}

impl StreamEntry {
    pub(super) fn new(id: i64, vhost_id: i64, req: &Request, url: String) -> Self {
        Self {
            id,
            vhost_id,
            app: req.app.clone(),
            name: req.stream.clone(),
            url,
            active: false,
            publisher_cid: None,
            video: None,
            audio: None,
            nb_clients: 0,
            nb_frames: 0,
            kbps: Kbps::new(),
            created_at: Instant::now(),
        }
    }

    /// Mark the stream published by `cid`
    ///
    /// Returns true when the stream went from inactive to active.
    pub(super) fn publish(&mut self, cid: i64) -> bool {
        let was_active = self.active;
        self.publisher_cid = Some(cid);
        self.active = true;
        !was_active
    }

    /// Drop publish state and media descriptors
    ///
    /// Returns true when the stream was active.
    pub(super) fn close(&mut self) -> bool {
        let was_active = self.active;
        self.video = None;
        self.audio = None;
        self.active = false;
        was_active
    }

    /// Time since the record was created
    pub fn live_time(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// A connected session attached to a stream
#[derive(Clone)]
pub struct ClientEntry {
    /// Connection id, supplied by the caller
    pub id: i64,

    /// Id of the stream the client is attached to
    pub stream_id: i64,

    /// Id of that stream's vhost
    pub vhost_id: i64,

    /// Handle to the live connection
    pub conn: Arc<dyn ConnectionHandle>,

    /// Request the client announced
    pub req: Request,

    /// What the connection is doing
    pub conn_type: ConnType,

    /// When the client joined
    pub created_at: Instant,
}

impl ClientEntry {
    pub(super) fn new(
        id: i64,
        stream_id: i64,
        vhost_id: i64,
        conn: Arc<dyn ConnectionHandle>,
        req: Request,
        conn_type: ConnType,
    ) -> Self {
        Self {
            id,
            stream_id,
            vhost_id,
            conn,
            req,
            conn_type,
            created_at: Instant::now(),
        }
    }

    /// Time since the client joined
    pub fn alive(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl fmt::Debug for ClientEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientEntry")
            .field("id", &self.id)
            .field("stream_id", &self.stream_id)
            .field("vhost_id", &self.vhost_id)
            .field("conn_id", &self.conn.id())
            .field("req", &self.req)
            .field("conn_type", &self.conn_type)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_publish_transitions() {
        let req = Request::new("v", "live", "s");
        let mut stream = StreamEntry::new(1, 0, &req, req.stream_url());

        assert!(stream.publish(7));
        assert!(stream.active);
        assert_eq!(stream.publisher_cid, Some(7));

        // Republish keeps the stream active and updates the publisher
        assert!(!stream.publish(8));
        assert_eq!(stream.publisher_cid, Some(8));
    }

    #[test]
    fn test_stream_close_clears_media() {
        use crate::media::{AudioChannels, AudioCodecId, AudioSampleRate, AacObjectType};

        let req = Request::new("v", "live", "s");
        let mut stream = StreamEntry::new(1, 0, &req, req.stream_url());
        stream.audio = Some(AudioInfo {
            codec: AudioCodecId::Aac,
            sample_rate: AudioSampleRate::R44100,
            channels: AudioChannels::Stereo,
            object_type: AacObjectType::Lc,
        });

        // Close without publish reports inactive
        assert!(!stream.close());
        assert!(stream.audio.is_none());

        stream.publish(3);
        assert!(stream.close());
        assert!(!stream.active);
    }
}
