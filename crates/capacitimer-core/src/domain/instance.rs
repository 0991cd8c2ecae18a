//! A Capacitimer server found on the local network.

use serde::{Deserialize, Serialize};

/// One discovery candidate offered in the connection settings.
///
/// Candidates are keyed by [`host`](Self::host): two announcements that
/// resolve to the same address describe the same server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredInstance {
    /// The advertised service name, e.g. `"Capacitimer (Stage Left)"`.
    pub name: String,
    /// The resolved address used to connect (usually an IPv4 literal).
    pub host: String,
    /// A display-friendly host name with the `.local` suffix removed.
    pub hostname: String,
    /// The advertised HTTP port.
    pub port: u16,
    /// The fully-qualified service name.
    pub fqdn: String,
}

impl DiscoveredInstance {
    /// Label shown in a host selection list, e.g. `"Stage Left (192.168.1.20)"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.hostname, self.host)
    }
}
