//! Client request descriptor
//!
//! Identifies which vhost/app/stream a connection addresses, plus the
//! connect-time URLs reported back by the status API.

/// Vhost name used when the client did not address a specific vhost
pub const DEFAULT_VHOST: &str = "__defaultVhost__";

/// Request descriptor supplied with every ingestion event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Virtual host name
    pub vhost: String,

    /// Application name (e.g., "live")
    pub app: String,

    /// Stream name
    pub stream: String,

    /// Remote client IP
    pub ip: String,

    /// Page URL from the connect command
    pub page_url: String,

    /// SWF URL from the connect command
    pub swf_url: String,

    /// TC URL from the connect command
    pub tc_url: String,
}

impl Request {
    /// Create a request for the given vhost, app and stream
    pub fn new(vhost: impl Into<String>, app: impl Into<String>, stream: impl Into<String>) -> Self {
        Self {
            vhost: vhost.into(),
            app: app.into(),
            stream: stream.into(),
            ip: String::new(),
            page_url: String::new(),
            swf_url: String::new(),
            tc_url: String::new(),
        }
    }

    /// Set the remote IP
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Set the page URL
    pub fn page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = url.into();
        self
    }

    /// Set the SWF URL
    pub fn swf_url(mut self, url: impl Into<String>) -> Self {
        self.swf_url = url.into();
        self
    }

    /// Set the TC URL
    pub fn tc_url(mut self, url: impl Into<String>) -> Self {
        self.tc_url = url.into();
        self
    }

    /// Canonical stream URL, the natural key of a stream
    ///
    /// `/app/stream` on the default vhost, `vhost/app/stream` otherwise.
    pub fn stream_url(&self) -> String {
        if self.vhost == DEFAULT_VHOST {
            format!("/{}/{}", self.app, self.stream)
        } else {
            format!("{}/{}/{}", self.vhost, self.app, self.stream)
        }
    }
}
