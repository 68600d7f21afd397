//! Snapshot rendering for the status API
//!
//! Entities are copied out of the registry under the lock and rendered after
//! it is released, so vhost config lookups never run while the lock is held.
//! Key order is part of the output contract.

use serde_json::{json, Map, Number, Value};

use crate::error::{DumpError, Error, Result};
use crate::stats::PerfHistogram;

use super::config::VhostConfig;
use super::entry::{ClientEntry, StreamEntry, VhostEntry};
use super::store::StatisticRegistry;

/// Render a float, rejecting NaN and infinities
fn number(field: &'static str, value: f64) -> std::result::Result<Value, DumpError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or(DumpError::NonFiniteNumber { field, value })
}

fn render_vhost(
    vhost: &VhostEntry,
    config: &dyn VhostConfig,
) -> std::result::Result<Value, DumpError> {
    let mut hls = Map::new();
    let hls_enabled = config.hls_enabled(&vhost.name);
    hls.insert("enabled".into(), Value::Bool(hls_enabled));
    if hls_enabled {
        let fragment = config.hls_fragment(&vhost.name).as_secs_f64();
        hls.insert("fragment".into(), number("hls.fragment", fragment)?);
    }

    Ok(json!({
        "id": vhost.id,
        "name": vhost.name,
        "enabled": config.vhost_enabled(&vhost.name),
        "clients": vhost.nb_clients,
        "streams": vhost.nb_streams,
        "send_bytes": vhost.kbps.send_bytes(),
        "recv_bytes": vhost.kbps.recv_bytes(),
        "kbps": {
            "recv_30s": vhost.kbps.recv_kbps_30s(),
            "send_30s": vhost.kbps.send_kbps_30s(),
        },
        "hls": hls,
    }))
}

fn render_stream(stream: &StreamEntry) -> std::result::Result<Value, DumpError> {
    let video = match &stream.video {
        Some(video) => json!({
            "codec": video.codec.name(),
            "profile": video.profile.name(),
            "level": video.level.name(),
            "width": video.width,
            "height": video.height,
        }),
        None => Value::Null,
    };

    let audio = match &stream.audio {
        Some(audio) => json!({
            "codec": audio.codec.name(),
            "sample_rate": audio.sample_rate.hz(),
            "channel": audio.channels.count(),
            "profile": audio.object_type.name(),
        }),
        None => Value::Null,
    };

    let live_ms = u64::try_from(stream.live_time().as_millis()).unwrap_or(u64::MAX);

    Ok(json!({
        "id": stream.id,
        "name": stream.name,
        "vhost": stream.vhost_id,
        "app": stream.app,
        "live_ms": live_ms,
        "clients": stream.nb_clients,
        "frames": stream.nb_frames,
        "send_bytes": stream.kbps.send_bytes(),
        "recv_bytes": stream.kbps.recv_bytes(),
        "kbps": {
            "recv_30s": stream.kbps.recv_kbps_30s(),
            "send_30s": stream.kbps.send_kbps_30s(),
        },
        "publish": {
            "active": stream.active,
            "cid": stream.publisher_cid.unwrap_or(-1),
        },
        "video": video,
        "audio": audio,
    }))
}

fn render_client(client: &ClientEntry) -> std::result::Result<Value, DumpError> {
    let alive = number("alive", client.alive().as_secs_f64())?;

    Ok(json!({
        "id": client.id,
        "vhost": client.vhost_id,
        "stream": client.stream_id,
        "ip": client.req.ip,
        "pageUrl": client.req.page_url,
        "swfUrl": client.req.swf_url,
        "tcUrl": client.req.tc_url,
        "url": client.req.stream_url(),
        "type": client.conn_type.name(),
        "publish": client.conn_type.is_publish(),
        "alive": alive,
    }))
}

/// Buckets as a label -> count object, in bucket order
fn render_histogram(hist: &PerfHistogram) -> Value {
    let buckets: Map<String, Value> = hist
        .buckets()
        .map(|(label, count)| (label.to_string(), Value::from(count)))
        .collect();
    Value::Object(buckets)
}

impl StatisticRegistry {
    /// Render every vhost
    pub fn dumps_vhosts(&self) -> Result<Value> {
        let vhosts = self.vhosts();
        let config = self.vhost_config.as_ref();

        vhosts
            .iter()
            .map(|vhost| render_vhost(vhost, config).map_err(|e| Error::dump("dump vhost", e)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    /// Render every stream
    pub fn dumps_streams(&self) -> Result<Value> {
        self.streams()
            .iter()
            .map(|stream| render_stream(stream).map_err(|e| Error::dump("dump stream", e)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    /// Render the clients at positions `[start, start + count)`
    pub fn dumps_clients(&self, start: usize, count: usize) -> Result<Value> {
        self.clients(start, count)
            .iter()
            .map(|client| render_client(client).map_err(|e| Error::dump("dump client", e)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    pub fn dumps_perf_writev(&self) -> Value {
        let (msgs, iovs) = {
            let inner = self.inner.lock();
            (inner.perf_msgs.clone(), inner.perf_iovs.clone())
        };

        json!({
            "msgs": render_histogram(&msgs),
            "iovs": render_histogram(&iovs),
        })
    }

    pub fn dumps_perf_sendmmsg(&self) -> Value {
        let msgs = self.inner.lock().perf_sendmmsg.clone();
        json!({ "msgs": render_histogram(&msgs) })
    }

    pub fn dumps_perf_gso(&self) -> Value {
        let msgs = self.inner.lock().perf_gso.clone();
        json!({ "msgs": render_histogram(&msgs) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio_test::assert_ok;

    use super::*;
    use crate::media::{AvcLevel, AvcProfile, VideoCodecId, VideoInfo};
    use crate::media::{AacObjectType, AudioChannels, AudioCodecId, AudioInfo, AudioSampleRate};
    use crate::registry::config::{RegistryConfig, StaticVhostConfig, VhostSettings};
    use crate::session::connection::mock::MockConnection;
    use crate::session::{ConnType, Request, DEFAULT_VHOST};

    fn registry() -> StatisticRegistry {
        let vhosts = StaticVhostConfig::new()
            .vhost("hls.example.com", VhostSettings::default().hls(Duration::from_millis(2500)))
            .vhost("off.example.com", VhostSettings::default().disabled());
        StatisticRegistry::with_config(RegistryConfig::default(), Arc::new(vhosts))
    }

    fn keys(value: &Value) -> Vec<&str> {
        value
            .as_object()
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_number_rejects_non_finite() {
        assert_eq!(number("alive", 1.5).unwrap(), json!(1.5));

        let err = number("alive", f64::NAN).unwrap_err();
        assert!(matches!(err, DumpError::NonFiniteNumber { field: "alive", value } if value.is_nan()));

        let err = number("hls.fragment", f64::INFINITY).unwrap_err();
        assert!(matches!(err, DumpError::NonFiniteNumber { field: "hls.fragment", .. }));

        let wrapped = Error::dump("dump client", err);
        assert!(wrapped.to_string().starts_with("dump client: "));
    }

    #[test]
    fn test_dump_vhost_fields() {
        let registry = registry();
        registry.create_or_get_vhost("hls.example.com");
        registry.create_or_get_vhost("off.example.com");

        let dump = assert_ok!(registry.dumps_vhosts());
        let vhosts = dump.as_array().unwrap();
        assert_eq!(vhosts.len(), 2);

        let hls = &vhosts[0];
        assert_eq!(
            keys(hls),
            vec![
                "id", "name", "enabled", "clients", "streams", "send_bytes", "recv_bytes",
                "kbps", "hls"
            ]
        );
        assert_eq!(hls["name"], "hls.example.com");
        assert_eq!(hls["enabled"], true);
        assert_eq!(hls["hls"], json!({ "enabled": true, "fragment": 2.5 }));
        assert_eq!(hls["kbps"], json!({ "recv_30s": 0, "send_30s": 0 }));

        let off = &vhosts[1];
        assert_eq!(off["enabled"], false);
        assert_eq!(off["hls"], json!({ "enabled": false }));
    }

    #[test]
    fn test_dump_stream_media() {
        let registry = registry();
        let req = Request::new(DEFAULT_VHOST, "live", "cam");

        registry.on_video_info(
            &req,
            VideoInfo {
                codec: VideoCodecId::Avc,
                profile: AvcProfile::High,
                level: AvcLevel::L31,
                width: 1280,
                height: 720,
            },
        );
        registry.on_stream_publish(&req, 42);

        let dump = assert_ok!(registry.dumps_streams());
        let stream = &dump[0];

        assert_eq!(
            keys(stream),
            vec![
                "id", "name", "vhost", "app", "live_ms", "clients", "frames", "send_bytes",
                "recv_bytes", "kbps", "publish", "video", "audio"
            ]
        );
        assert_eq!(stream["name"], "cam");
        assert_eq!(stream["app"], "live");
        assert_eq!(
            stream["vhost"],
            json!(registry.find_vhost_by_name(DEFAULT_VHOST).unwrap().id)
        );
        assert_eq!(stream["publish"], json!({ "active": true, "cid": 42 }));
        assert_eq!(
            stream["video"],
            json!({
                "codec": "H264",
                "profile": "High",
                "level": "3.1",
                "width": 1280,
                "height": 720,
            })
        );
        assert!(stream["audio"].is_null());
    }

    #[test]
    fn test_dump_stream_audio_and_unpublished() {
        let registry = registry();
        let req = Request::new("v", "live", "radio");

        registry.on_audio_info(
            &req,
            AudioInfo {
                codec: AudioCodecId::Aac,
                sample_rate: AudioSampleRate::R44100,
                channels: AudioChannels::Stereo,
                object_type: AacObjectType::Lc,
            },
        );

        let dump = assert_ok!(registry.dumps_streams());
        let stream = &dump[0];

        assert!(stream["video"].is_null());
        assert_eq!(
            stream["audio"],
            json!({ "codec": "AAC", "sample_rate": 44100, "channel": 2, "profile": "LC" })
        );
        assert_eq!(stream["publish"], json!({ "active": false, "cid": -1 }));
    }

    #[test]
    fn test_dump_client_fields() {
        let registry = registry();
        let req = Request::new(DEFAULT_VHOST, "live", "cam")
            .ip("10.0.0.7")
            .page_url("http://example.com/player.html")
            .swf_url("http://example.com/player.swf")
            .tc_url("rtmp://example.com/live");
        registry.on_client(9, &req, Arc::new(MockConnection::new(9)), ConnType::FmlePublish);

        let dump = assert_ok!(registry.dumps_clients(0, 10));
        let client = &dump[0];

        assert_eq!(
            keys(client),
            vec![
                "id", "vhost", "stream", "ip", "pageUrl", "swfUrl", "tcUrl", "url", "type",
                "publish", "alive"
            ]
        );
        assert_eq!(client["id"], 9);
        assert_eq!(client["ip"], "10.0.0.7");
        assert_eq!(client["tcUrl"], "rtmp://example.com/live");
        assert_eq!(client["url"], "/live/cam");
        assert_eq!(client["type"], "fmle-publish");
        assert_eq!(client["publish"], true);
        assert!(client["alive"].as_f64().unwrap() >= 0.0);

        let stream = registry.find_stream_by_url("/live/cam").unwrap();
        assert_eq!(client["stream"], json!(stream.id));
        assert_eq!(client["vhost"], json!(stream.vhost_id));
    }

    #[test]
    fn test_dump_clients_paging() {
        let registry = registry();
        let req = Request::new("v", "live", "s");
        for id in 1..=5 {
            registry.on_client(id, &req, Arc::new(MockConnection::new(id)), ConnType::Play);
        }

        let page = assert_ok!(registry.dumps_clients(2, 2));
        let ids: Vec<_> = page
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 4]);

        let empty = assert_ok!(registry.dumps_clients(10, 2));
        assert_eq!(empty, json!([]));
    }

    #[test]
    fn test_dump_empty_registry() {
        let registry = registry();
        assert_eq!(assert_ok!(registry.dumps_vhosts()), json!([]));
        assert_eq!(assert_ok!(registry.dumps_streams()), json!([]));
        assert_eq!(assert_ok!(registry.dumps_clients(0, 100)), json!([]));
    }

    #[test]
    fn test_dump_perf_writev() {
        let registry = registry();
        registry.perf_on_writev(1, 2);
        registry.perf_on_writev(700, 2048);

        let dump = registry.dumps_perf_writev();

        assert_eq!(keys(&dump), vec!["msgs", "iovs"]);
        assert_eq!(
            keys(&dump["msgs"]),
            vec![
                "lt_2", "lt_3", "lt_6", "lt_12", "lt_128", "lt_256", "lt_512", "lt_600",
                "lt_1000", "gt_1000"
            ]
        );
        assert_eq!(dump["msgs"]["lt_2"], 1);
        assert_eq!(dump["msgs"]["lt_1000"], 1);
        assert_eq!(dump["iovs"]["lt_3"], 1);
        assert_eq!(dump["iovs"]["gt_1024"], 1);
    }

    #[test]
    fn test_dump_perf_sendmmsg_and_gso() {
        let registry = registry();
        registry.perf_on_sendmmsg(150);
        registry.perf_on_gso(1);
        registry.perf_on_gso(1);

        let sendmmsg = registry.dumps_perf_sendmmsg();
        assert_eq!(keys(&sendmmsg), vec!["msgs"]);
        assert_eq!(sendmmsg["msgs"]["lt_200"], 1);
        assert_eq!(sendmmsg["msgs"]["lt_2"], 0);

        let gso = registry.dumps_perf_gso();
        assert_eq!(gso["msgs"]["lt_2"], 2);
        assert_eq!(keys(&gso["msgs"]).last().copied(), Some("gt_512"));
    }
}
