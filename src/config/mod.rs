// ABOUTME: Startup configuration for the watcher process
// Defaults are resolved once at construction, before any connection is opened

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use thiserror::Error;

/// Port used when deriving the default remote domain.
pub const DEFAULT_PORT: u16 = 1571;

/// Byte ceiling for inlining file content into events.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2000;

/// Errors raised while resolving startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },
}

/// Immutable configuration resolved at startup.
///
/// The remote domain is computed here when not supplied, so it is always
/// final before the session dials out.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Project identifier announced on connect
    pub name: String,
    /// Full remote address, e.g. `http://192.168.1.10:1571`
    pub domain: String,
    /// Port used for the derived default domain
    pub port: u16,
    /// Byte ceiling for inlining file content
    pub max_file_size: u64,
    /// Glob patterns excluded from watching
    pub exclude: Vec<String>,
    /// Per-change console diagnostics
    pub debug: bool,
}

impl WatchConfig {
    /// Resolve a configuration, deriving the domain from the local network
    /// address when none is supplied.
    pub fn new(
        name: String,
        domain: Option<String>,
        port: u16,
        max_file_size: u64,
        exclude: Vec<String>,
        debug: bool,
    ) -> Self {
        let domain = domain.unwrap_or_else(|| format!("http://{}:{}", local_ip(), port));

        Self {
            name,
            domain,
            port,
            max_file_size,
            exclude,
            debug,
        }
    }
}

/// Best-effort local network address, falling back to loopback.
///
/// Binding a UDP socket and "connecting" it to a public address selects the
/// outbound interface without sending any packet.
fn local_ip() -> IpAddr {
    let probe = || -> Option<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        Some(socket.local_addr().ok()?.ip())
    };

    probe().unwrap_or_else(|| IpAddr::V4(Ipv4Addr::LOCALHOST))
}
