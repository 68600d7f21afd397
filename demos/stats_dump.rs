//! Stats Dump - Drives the statistics registry with simulated traffic
//!
//! Run with: cargo run --example stats_dump
//!
//! This example demonstrates:
//! - Sharing one `StatisticRegistry` as `Arc<StatisticRegistry>`
//! - Feeding publish, media-info, client and traffic events
//! - Running the background sampling task
//! - Printing the JSON snapshots the status API would serve

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rtmp_stats::media::{
    AacObjectType, AudioChannels, AudioCodecId, AudioInfo, AudioSampleRate, AvcLevel, AvcProfile,
    VideoCodecId, VideoInfo,
};
use rtmp_stats::{
    ConnType, ConnectionHandle, RegistryConfig, Request, StaticVhostConfig, StatisticRegistry,
    VhostSettings, DEFAULT_VHOST,
};

/// Fake connection that accrues a fixed amount of traffic per tick
struct SimulatedConnection {
    id: i64,
    recv: AtomicU64,
    send: AtomicU64,
}

impl SimulatedConnection {
    fn new(id: i64) -> Self {
        Self {
            id,
            recv: AtomicU64::new(0),
            send: AtomicU64::new(0),
        }
    }

    fn transfer(&self, recv: u64, send: u64) {
        self.recv.fetch_add(recv, Ordering::Relaxed);
        self.send.fetch_add(send, Ordering::Relaxed);
    }
}

impl ConnectionHandle for SimulatedConnection {
    fn id(&self) -> i64 {
        self.id
    }

    fn remark(&self) -> (u64, u64) {
        (
            self.recv.swap(0, Ordering::Relaxed),
            self.send.swap(0, Ordering::Relaxed),
        )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rtmp_stats=debug".parse()?)
                .add_directive("stats_dump=debug".parse()?),
        )
        .init();

    let vhosts = StaticVhostConfig::new().vhost(
        "live.example.com",
        VhostSettings::default().hls(Duration::from_secs(4)),
    );
    let config = RegistryConfig::new().sample_interval(Duration::from_millis(500));
    let registry = Arc::new(StatisticRegistry::with_config(config, Arc::new(vhosts)));

    let sampler = registry.spawn_sample_task();

    // One publisher per vhost
    let streams = [
        Request::new(DEFAULT_VHOST, "live", "lobby").ip("192.168.1.10"),
        Request::new("live.example.com", "live", "match").ip("192.168.1.11"),
    ];

    let mut connections = Vec::new();
    let mut next_cid = 1;

    for req in &streams {
        let publisher = Arc::new(SimulatedConnection::new(next_cid));
        next_cid += 1;

        registry.on_client(publisher.id, req, publisher.clone(), ConnType::FmlePublish);
        registry.on_stream_publish(req, publisher.id);
        registry.on_video_info(
            req,
            VideoInfo {
                codec: VideoCodecId::Avc,
                profile: AvcProfile::High,
                level: AvcLevel::L4,
                width: 1920,
                height: 1080,
            },
        );
        registry.on_audio_info(
            req,
            AudioInfo {
                codec: AudioCodecId::Aac,
                sample_rate: AudioSampleRate::R44100,
                channels: AudioChannels::Stereo,
                object_type: AacObjectType::Lc,
            },
        );
        connections.push((publisher, 625_000u64, 0u64));

        // A handful of players on each stream
        for _ in 0..3 {
            let player = Arc::new(SimulatedConnection::new(next_cid));
            next_cid += 1;

            let play_req = req.clone().ip(format!("10.0.0.{}", next_cid));
            registry.on_client(player.id, &play_req, player.clone(), ConnType::Play);
            connections.push((player, 0, 625_000));
        }
    }

    // Drive a few seconds of traffic
    for tick in 0..6 {
        for (conn, recv, send) in &connections {
            conn.transfer(*recv, *send);
            registry.kbps_add_delta(conn.as_ref());
        }
        for req in &streams {
            registry.on_video_frames(req, 30);
        }
        registry.perf_on_writev(1 + tick * 40, 2 + tick * 100);
        registry.perf_on_gso(1 << tick);

        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    // The first player leaves
    registry.on_disconnect(2);

    println!("vhosts:  {}", serde_json::to_string_pretty(&registry.dumps_vhosts()?)?);
    println!("streams: {}", serde_json::to_string_pretty(&registry.dumps_streams()?)?);
    println!("clients: {}", serde_json::to_string_pretty(&registry.dumps_clients(0, 10)?)?);
    println!("writev:  {}", registry.dumps_perf_writev());
    println!("gso:     {}", registry.dumps_perf_gso());

    sampler.abort();
    Ok(())
}
