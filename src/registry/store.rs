//! Statistics registry implementation
//!
//! The central registry that tracks every vhost, stream and client, keeps
//! their bandwidth meters up to date and counts I/O batch sizes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::media::{AudioInfo, VideoInfo};
use crate::session::{ConnType, ConnectionHandle, Request};
use crate::stats::histogram::{GSO_TABLE, IOVS_TABLE, MSGS_TABLE, SENDMMSG_TABLE};
use crate::stats::{IdGenerator, Kbps, PerfHistogram};

use super::config::{RegistryConfig, StaticVhostConfig, VhostConfig};
use super::entry::{ClientEntry, StreamEntry, VhostEntry};

/// Registry state guarded by the registry lock
///
/// Records live in the id-keyed maps; the name/url maps only point at ids.
pub(super) struct Inner {
    pub(super) vhosts: BTreeMap<i64, VhostEntry>,
    vhost_ids: HashMap<String, i64>,

    pub(super) streams: BTreeMap<i64, StreamEntry>,
    stream_ids: HashMap<String, i64>,

    pub(super) clients: BTreeMap<i64, ClientEntry>,

    /// Server-wide meter
    pub(super) kbps: Kbps,

    pub(super) perf_msgs: PerfHistogram,
    pub(super) perf_iovs: PerfHistogram,
    pub(super) perf_sendmmsg: PerfHistogram,
    pub(super) perf_gso: PerfHistogram,
}

impl Inner {
    fn new() -> Self {
        Self {
            vhosts: BTreeMap::new(),
            vhost_ids: HashMap::new(),
            streams: BTreeMap::new(),
            stream_ids: HashMap::new(),
            clients: BTreeMap::new(),
            kbps: Kbps::new(),
            perf_msgs: PerfHistogram::new(&MSGS_TABLE),
            perf_iovs: PerfHistogram::new(&IOVS_TABLE),
            perf_sendmmsg: PerfHistogram::new(&SENDMMSG_TABLE),
            perf_gso: PerfHistogram::new(&GSO_TABLE),
        }
    }

    /// Resolve a vhost by name, creating it on first reference
    fn vhost_or_create(&mut self, ids: &IdGenerator, name: &str) -> i64 {
        if let Some(&id) = self.vhost_ids.get(name) {
            return id;
        }

        let id = ids.next_id();
        self.vhosts.insert(id, VhostEntry::new(id, name.to_string()));
        self.vhost_ids.insert(name.to_string(), id);

        tracing::debug!(vhost = name, id = id, "Vhost created");
        id
    }

    /// Resolve a stream by its canonical URL, creating it on first reference
    fn stream_or_create(&mut self, ids: &IdGenerator, vhost_id: i64, req: &Request) -> i64 {
        let url = req.stream_url();
        if let Some(&id) = self.stream_ids.get(&url) {
            return id;
        }

        let id = ids.next_id();
        self.streams
            .insert(id, StreamEntry::new(id, vhost_id, req, url.clone()));

        tracing::debug!(stream = %url, id = id, vhost_id = vhost_id, "Stream created");
        self.stream_ids.insert(url, id);
        id
    }

    /// Resolve a request to (owning vhost, stream)
    ///
    /// The vhost returned is the one recorded when the stream was created.
    /// Different vhost/app splits can share a stream URL, so the request's
    /// own vhost is not necessarily the owner.
    fn resolve(&mut self, ids: &IdGenerator, req: &Request) -> (i64, i64) {
        let vhost_id = self.vhost_or_create(ids, &req.vhost);
        let stream_id = self.stream_or_create(ids, vhost_id, req);
        let owner = self
            .streams
            .get(&stream_id)
            .map_or(vhost_id, |stream| stream.vhost_id);
        (owner, stream_id)
    }

    /// Credit a client's delta to its stream, vhost and the server
    ///
    /// Returns false when the client is unknown; nothing is credited then.
    fn propagate(&mut self, client_id: i64, in_bytes: u64, out_bytes: u64) -> bool {
        let Some((stream_id, vhost_id)) = self
            .clients
            .get(&client_id)
            .map(|c| (c.stream_id, c.vhost_id))
        else {
            return false;
        };

        self.kbps.add_delta(in_bytes, out_bytes);

        match self.streams.get_mut(&stream_id) {
            Some(stream) => stream.kbps.add_delta(in_bytes, out_bytes),
            None => tracing::debug!(
                client = client_id,
                stream_id = stream_id,
                "Delta for client of removed stream"
            ),
        }
        if let Some(vhost) = self.vhosts.get_mut(&vhost_id) {
            vhost.kbps.add_delta(in_bytes, out_bytes);
        }
        true
    }

    /// Count one client against a stream and its vhost
    fn attach(&mut self, stream_id: i64, vhost_id: i64) {
        if let Some(stream) = self.streams.get_mut(&stream_id) {
            stream.nb_clients += 1;
        }
        if let Some(vhost) = self.vhosts.get_mut(&vhost_id) {
            vhost.nb_clients += 1;
        }
    }

    /// Uncount one client; a stream that was already removed is skipped
    fn detach(&mut self, stream_id: i64, vhost_id: i64) {
        match self.streams.get_mut(&stream_id) {
            Some(stream) => stream.nb_clients = stream.nb_clients.saturating_sub(1),
            None => tracing::debug!(stream_id = stream_id, "Client detached from removed stream"),
        }
        if let Some(vhost) = self.vhosts.get_mut(&vhost_id) {
            vhost.nb_clients = vhost.nb_clients.saturating_sub(1);
        }
    }
}

/// Central registry for live statistics
///
/// All state sits behind one `parking_lot::Mutex`. Every operation takes the
/// lock for its own duration only, and collaborators (connection handles,
/// vhost config) are never called while it is held.
pub struct StatisticRegistry {
    pub(super) inner: Mutex<Inner>,

    ids: IdGenerator,

    server_id: i64,

    config: RegistryConfig,

    pub(super) vhost_config: Arc<dyn VhostConfig>,
}

impl StatisticRegistry {
    /// Create a registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default(), Arc::new(StaticVhostConfig::default()))
    }

    /// Create a registry with custom configuration
    pub fn with_config(config: RegistryConfig, vhost_config: Arc<dyn VhostConfig>) -> Self {
        Self::with_ids(config, vhost_config, IdGenerator::new())
    }

    /// Create a registry drawing ids from `ids`
    pub fn with_ids(
        config: RegistryConfig,
        vhost_config: Arc<dyn VhostConfig>,
        ids: IdGenerator,
    ) -> Self {
        let server_id = ids.next_id();

        Self {
            inner: Mutex::new(Inner::new()),
            ids,
            server_id,
            config,
            vhost_config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Id assigned to this server at construction
    pub fn server_id(&self) -> i64 {
        self.server_id
    }

    pub fn find_vhost(&self, id: i64) -> Option<VhostEntry> {
        self.inner.lock().vhosts.get(&id).cloned()
    }

    pub fn find_vhost_by_name(&self, name: &str) -> Option<VhostEntry> {
        let inner = self.inner.lock();
        let id = inner.vhost_ids.get(name)?;
        inner.vhosts.get(id).cloned()
    }

    pub fn find_stream(&self, id: i64) -> Option<StreamEntry> {
        self.inner.lock().streams.get(&id).cloned()
    }

    pub fn find_stream_by_url(&self, url: &str) -> Option<StreamEntry> {
        let inner = self.inner.lock();
        let id = inner.stream_ids.get(url)?;
        inner.streams.get(id).cloned()
    }

    pub fn find_client(&self, id: i64) -> Option<ClientEntry> {
        self.inner.lock().clients.get(&id).cloned()
    }

    /// Get the vhost named `name`, creating it if needed
    pub fn create_or_get_vhost(&self, name: &str) -> VhostEntry {
        let mut inner = self.inner.lock();
        let id = inner.vhost_or_create(&self.ids, name);
        inner.vhosts[&id].clone()
    }

    /// Get the stream at vhost/app/stream, creating it (and its vhost) if needed
    pub fn create_or_get_stream(&self, vhost: &str, app: &str, stream: &str) -> StreamEntry {
        let req = Request::new(vhost, app, stream);

        let mut inner = self.inner.lock();
        let (_, stream_id) = inner.resolve(&self.ids, &req);
        inner.streams[&stream_id].clone()
    }

    /// Record the video descriptor of a stream
    pub fn on_video_info(&self, req: &Request, info: VideoInfo) {
        let mut inner = self.inner.lock();
        let (_, stream_id) = inner.resolve(&self.ids, req);

        if let Some(stream) = inner.streams.get_mut(&stream_id) {
            stream.video = Some(info);
        }
    }

    /// Record the audio descriptor of a stream
    pub fn on_audio_info(&self, req: &Request, info: AudioInfo) {
        let mut inner = self.inner.lock();
        let (_, stream_id) = inner.resolve(&self.ids, req);

        if let Some(stream) = inner.streams.get_mut(&stream_id) {
            stream.audio = Some(info);
        }
    }

    /// Add to a stream's frame counter
    pub fn on_video_frames(&self, req: &Request, nb_frames: u64) {
        let mut inner = self.inner.lock();
        let (_, stream_id) = inner.resolve(&self.ids, req);

        if let Some(stream) = inner.streams.get_mut(&stream_id) {
            stream.nb_frames += nb_frames;
        }
    }

    /// Mark a stream published by connection `cid`
    pub fn on_stream_publish(&self, req: &Request, cid: i64) {
        let mut inner = self.inner.lock();
        let (vhost_id, stream_id) = inner.resolve(&self.ids, req);

        let activated = match inner.streams.get_mut(&stream_id) {
            Some(stream) => stream.publish(cid),
            None => return,
        };
        if activated {
            if let Some(vhost) = inner.vhosts.get_mut(&vhost_id) {
                vhost.nb_streams += 1;
            }
        }

        tracing::info!(
            stream = %req.stream_url(),
            cid = cid,
            new = activated,
            "Stream published"
        );
    }

    /// Close a stream and drop it from the registry
    ///
    /// The stream is removed even when clients are still attached. Those
    /// clients keep the stream id; anything resolving through it later
    /// finds nothing and skips the stream level.
    pub fn on_stream_close(&self, req: &Request) {
        let mut inner = self.inner.lock();
        let (vhost_id, stream_id) = inner.resolve(&self.ids, req);

        let Some(mut stream) = inner.streams.remove(&stream_id) else {
            return;
        };
        inner.stream_ids.remove(&stream.url);

        if stream.close() {
            if let Some(vhost) = inner.vhosts.get_mut(&vhost_id) {
                vhost.nb_streams = vhost.nb_streams.saturating_sub(1);
            }
        }

        if stream.nb_clients > 0 {
            tracing::warn!(
                stream = %stream.url,
                id = stream.id,
                clients = stream.nb_clients,
                "Stream closed with clients still attached"
            );
        } else {
            tracing::info!(stream = %stream.url, id = stream.id, "Stream closed");
        }
    }

    /// Register or re-announce a client
    ///
    /// Counts are bumped only the first time a connection id is seen. A
    /// re-announce that resolves to a different stream moves the client and
    /// its counts over to that stream.
    pub fn on_client(
        &self,
        id: i64,
        req: &Request,
        conn: Arc<dyn ConnectionHandle>,
        conn_type: ConnType,
    ) {
        let mut inner = self.inner.lock();
        let (vhost_id, stream_id) = inner.resolve(&self.ids, req);

        let moved_from = match inner.clients.get_mut(&id) {
            Some(client) => {
                client.conn = conn;
                client.req = req.clone();
                client.conn_type = conn_type;

                if client.stream_id == stream_id {
                    return;
                }
                let from = (client.stream_id, client.vhost_id);
                client.stream_id = stream_id;
                client.vhost_id = vhost_id;
                Some(from)
            }
            None => {
                let client = ClientEntry::new(id, stream_id, vhost_id, conn, req.clone(), conn_type);
                inner.clients.insert(id, client);
                None
            }
        };

        if let Some((old_stream, old_vhost)) = moved_from {
            inner.detach(old_stream, old_vhost);
        }
        inner.attach(stream_id, vhost_id);

        tracing::debug!(
            id = id,
            stream = %req.stream_url(),
            conn_type = %conn_type,
            "Client joined"
        );
    }

    /// Drop a client; unknown ids are ignored
    pub fn on_disconnect(&self, id: i64) {
        let mut inner = self.inner.lock();

        let Some(client) = inner.clients.remove(&id) else {
            return;
        };
        inner.detach(client.stream_id, client.vhost_id);

        tracing::debug!(id = id, stream_id = client.stream_id, "Client disconnected");
    }

    /// Collect a connection's traffic since its last tick
    ///
    /// Connections without a client record are left untouched so their
    /// delta is not consumed. The delta is read outside the lock, so a
    /// client can disconnect in between; its bytes then go to the server
    /// meter only.
    pub fn kbps_add_delta(&self, conn: &dyn ConnectionHandle) {
        let id = conn.id();
        if !self.inner.lock().clients.contains_key(&id) {
            return;
        }

        let (in_bytes, out_bytes) = conn.remark();

        let mut inner = self.inner.lock();
        if !inner.propagate(id, in_bytes, out_bytes) {
            inner.kbps.add_delta(in_bytes, out_bytes);
            tracing::debug!(client = id, "Delta for client that disconnected");
        }
    }

    /// Credit one tick of client traffic to server, stream and vhost
    ///
    /// Each meter receives the delta exactly once. A client whose stream
    /// was removed still credits the server and vhost.
    pub fn add_delta(&self, client_id: i64, in_bytes: u64, out_bytes: u64) {
        self.inner.lock().propagate(client_id, in_bytes, out_bytes);
    }

    /// Refresh the rolling rates of the server and every vhost and stream
    ///
    /// Returns a copy of the server meter.
    pub fn kbps_sample(&self) -> Kbps {
        let mut inner = self.inner.lock();

        inner.kbps.sample();
        for vhost in inner.vhosts.values_mut() {
            vhost.kbps.sample();
        }
        for stream in inner.streams.values_mut() {
            stream.kbps.sample();
        }

        inner.kbps.clone()
    }

    /// Count one writev batch: messages and iovecs
    pub fn perf_on_writev(&self, nb_msgs: u64, nb_iovs: u64) {
        let mut inner = self.inner.lock();
        inner.perf_msgs.record(nb_msgs);
        inner.perf_iovs.record(nb_iovs);
    }

    /// Count one sendmmsg batch
    pub fn perf_on_sendmmsg(&self, nb_packets: u64) {
        self.inner.lock().perf_sendmmsg.record(nb_packets);
    }

    /// Count one GSO batch
    pub fn perf_on_gso(&self, nb_packets: u64) {
        self.inner.lock().perf_gso.record(nb_packets);
    }

    pub fn vhost_count(&self) -> usize {
        self.inner.lock().vhosts.len()
    }

    pub fn stream_count(&self) -> usize {
        self.inner.lock().streams.len()
    }

    pub fn client_count(&self) -> usize {
        self.inner.lock().clients.len()
    }

    /// Copies of every vhost record, in id order
    pub fn vhosts(&self) -> Vec<VhostEntry> {
        self.inner.lock().vhosts.values().cloned().collect()
    }

    /// Copies of every stream record, in id order
    pub fn streams(&self) -> Vec<StreamEntry> {
        self.inner.lock().streams.values().cloned().collect()
    }

    /// Copies of the client records at positions `[start, start + count)`
    pub fn clients(&self, start: usize, count: usize) -> Vec<ClientEntry> {
        self.inner
            .lock()
            .clients
            .values()
            .skip(start)
            .take(count)
            .cloned()
            .collect()
    }

    /// Spawn the periodic sampling task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn_sample_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let interval = registry.config.sample_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let kbps = registry.kbps_sample();
                tracing::trace!(
                    recv_kbps = kbps.recv_kbps_30s(),
                    send_kbps = kbps.send_kbps_30s(),
                    "Bandwidth sampled"
                );
            }
        })
    }
}

impl Default for StatisticRegistry {
    fn default() -> Self {
        Self::new()
    }
}
