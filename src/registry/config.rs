//! Registry configuration
//!
//! Sampling cadence for the registry, and the per-vhost settings the status
//! API reports alongside each vhost.

use std::collections::HashMap;
use std::time::Duration;

/// Configuration for the statistics registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Interval between bandwidth sampling passes
    pub sample_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(10),
        }
    }
}

impl RegistryConfig {
    /// Create a new registry config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling interval
    pub fn sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }
}

/// Per-vhost configuration lookups
pub trait VhostConfig: Send + Sync {
    /// Whether the vhost is enabled
    fn vhost_enabled(&self, vhost: &str) -> bool;

    /// Whether HLS is enabled on the vhost
    fn hls_enabled(&self, vhost: &str) -> bool;

    /// HLS fragment duration
    fn hls_fragment(&self, vhost: &str) -> Duration;
}

/// Settings for one vhost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VhostSettings {
    pub enabled: bool,
    pub hls_enabled: bool,
    pub hls_fragment: Duration,
}

impl Default for VhostSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            hls_enabled: false,
            hls_fragment: Duration::from_secs(10),
        }
    }
}

impl VhostSettings {
    /// Enable HLS with the given fragment duration
    pub fn hls(mut self, fragment: Duration) -> Self {
        self.hls_enabled = true;
        self.hls_fragment = fragment;
        self
    }

    /// Mark the vhost disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// In-memory `VhostConfig` with per-vhost overrides
#[derive(Debug, Clone, Default)]
pub struct StaticVhostConfig {
    defaults: VhostSettings,
    vhosts: HashMap<String, VhostSettings>,
}

impl StaticVhostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings used for vhosts without an override
    pub fn defaults(mut self, settings: VhostSettings) -> Self {
        self.defaults = settings;
        self
    }

    /// Override the settings of one vhost
    pub fn vhost(mut self, name: impl Into<String>, settings: VhostSettings) -> Self {
        self.vhosts.insert(name.into(), settings);
        self
    }

    fn settings(&self, vhost: &str) -> &VhostSettings {
        self.vhosts.get(vhost).unwrap_or(&self.defaults)
    }
}

impl VhostConfig for StaticVhostConfig {
    fn vhost_enabled(&self, vhost: &str) -> bool {
        self.settings(vhost).enabled
    }

    fn hls_enabled(&self, vhost: &str) -> bool {
        self.settings(vhost).hls_enabled
    }

    fn hls_fragment(&self, vhost: &str) -> Duration {
        self.settings(vhost).hls_fragment
    }
}
