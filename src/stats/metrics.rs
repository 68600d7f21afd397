//! Bandwidth metrics
//!
//! Every server, vhost and stream record carries a `Kbps` meter. Connections
//! report incremental byte counts via `add_delta`; a periodic `sample`
//! folds the cumulative totals into a 30-second rolling rate.

use std::time::{Duration, Instant};

/// Width of the rolling rate window
pub const KBPS_WINDOW: Duration = Duration::from_secs(30);

/// One rolling-rate slot
#[derive(Debug, Clone, Copy)]
struct RateSample {
    /// Cumulative bytes at the last rate update
    total: u64,
    /// When the rate was last updated
    at: Instant,
    /// Rate over the last completed window, in kbps
    kbps: u64,
}

impl RateSample {
    fn new(at: Instant) -> Self {
        Self { total: 0, at, kbps: 0 }
    }

    /// Recompute the rate once a full window has elapsed
    fn update(&mut self, total: u64, now: Instant) {
        let elapsed = now.saturating_duration_since(self.at);
        if elapsed < KBPS_WINDOW {
            return;
        }

        let elapsed_ms = elapsed.as_millis() as u64;
        // bytes * 8 / ms == kbits / s
        self.kbps = total.saturating_sub(self.total) * 8 / elapsed_ms.max(1);
        self.total = total;
        self.at = now;
    }
}

/// Byte counters with a 30-second rolling kbps view
#[derive(Debug, Clone)]
pub struct Kbps {
    recv_bytes: u64,
    send_bytes: u64,
    recv_30s: RateSample,
    send_30s: RateSample,
}

impl Kbps {
    /// Create a meter starting now
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a meter whose first window opens at `start`
    pub fn starting_at(start: Instant) -> Self {
        Self {
            recv_bytes: 0,
            send_bytes: 0,
            recv_30s: RateSample::new(start),
            send_30s: RateSample::new(start),
        }
    }

    /// Add bytes observed on one connection since its previous tick
    pub fn add_delta(&mut self, in_bytes: u64, out_bytes: u64) {
        self.recv_bytes = self.recv_bytes.saturating_add(in_bytes);
        self.send_bytes = self.send_bytes.saturating_add(out_bytes);
    }

    /// Refresh the rolling rates
    pub fn sample(&mut self) {
        self.sample_at(Instant::now());
    }

    /// Refresh the rolling rates as of `now`
    pub fn sample_at(&mut self, now: Instant) {
        self.recv_30s.update(self.recv_bytes, now);
        self.send_30s.update(self.send_bytes, now);
    }

    pub fn recv_bytes(&self) -> u64 {
        self.recv_bytes
    }

    pub fn send_bytes(&self) -> u64 {
        self.send_bytes
    }

    pub fn recv_kbps_30s(&self) -> u64 {
        self.recv_30s.kbps
    }

    pub fn send_kbps_30s(&self) -> u64 {
        self.send_30s.kbps
    }
}

impl Default for Kbps {
    fn default() -> Self {
        Self::new()
    }
}
