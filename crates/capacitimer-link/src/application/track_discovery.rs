//! DiscoveryTracker: maintains the list of Capacitimer servers seen on the LAN.
//!
//! Service resolution itself (multicast DNS) belongs to the host.  It feeds
//! this tracker a stream of [`DiscoveryEvent`]s over an mpsc channel; the
//! tracker filters them, resolves a usable address, and keeps one candidate
//! per address.
//!
//! # Address resolution
//!
//! An announcement can carry several hints.  The first usable one wins:
//!
//! 1. the first IPv4 address in the resolved address list;
//! 2. the address the announcement was received from, when IPv4;
//! 3. the advertised host name;
//! 4. the fully-qualified service name.
//!
//! The same chain is applied to withdrawals, so a withdrawal removes exactly
//! the candidate its announcement created.
//!
//! Every change to the candidate set is pushed to the host with
//! `refresh_config_fields` so the new servers become selectable.  Repeated
//! identical announcements are not changes.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;

use capacitimer_core::DiscoveredInstance;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::host::HostSurface;

/// Service-name prefix that identifies Capacitimer servers.
pub const DEFAULT_SERVICE_PREFIX: &str = "capacitimer";

/// One resolved service record, as reported by the discovery collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceAnnouncement {
    /// Service instance name, e.g. `"Capacitimer Stage Left"`.
    pub name: String,
    /// Advertised host name, e.g. `"stage-left.local"`.
    pub host: Option<String>,
    /// Fully-qualified service name.
    pub fqdn: String,
    pub port: u16,
    /// Addresses the host name resolved to.
    pub addresses: Vec<IpAddr>,
    /// Source address of the announcement packet.
    pub referer: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    Announced(ServiceAnnouncement),
    Withdrawn(ServiceAnnouncement),
}

/// Tracks discovery candidates keyed by resolved address.
pub struct DiscoveryTracker {
    prefix: String,
    candidates: BTreeMap<String, DiscoveredInstance>,
    host: Arc<dyn HostSurface>,
}

impl DiscoveryTracker {
    pub fn new(prefix: &str, host: Arc<dyn HostSurface>) -> Self {
        Self {
            prefix: prefix.to_lowercase(),
            candidates: BTreeMap::new(),
            host,
        }
    }

    /// Current candidates, ordered by address.
    pub fn candidates(&self) -> Vec<DiscoveredInstance> {
        self.candidates.values().cloned().collect()
    }

    /// Applies one event.  Returns `true` when the candidate set changed.
    pub fn handle(&mut self, event: DiscoveryEvent) -> bool {
        let changed = match event {
            DiscoveryEvent::Announced(service) => self.upsert(service),
            DiscoveryEvent::Withdrawn(service) => self.remove(&service),
        };
        if changed {
            self.host.refresh_config_fields(&self.candidates());
        }
        changed
    }

    /// Consumes events until the sender side is dropped, then returns the
    /// tracker.
    pub async fn run(mut self, mut events: mpsc::Receiver<DiscoveryEvent>) -> Self {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        debug!("discovery event stream closed");
        self
    }

    fn matches(&self, service: &ServiceAnnouncement) -> bool {
        service.name.to_lowercase().starts_with(&self.prefix)
    }

    fn upsert(&mut self, service: ServiceAnnouncement) -> bool {
        if !self.matches(&service) {
            debug!(name = %service.name, "ignoring non-Capacitimer service");
            return false;
        }
        let Some(address) = resolve_address(&service) else {
            debug!(name = %service.name, "announcement carries no usable address");
            return false;
        };

        let instance = DiscoveredInstance {
            hostname: display_hostname(service.host.as_deref().unwrap_or(&service.fqdn)),
            name: service.name,
            host: address.clone(),
            port: service.port,
            fqdn: service.fqdn,
        };
        if self.candidates.get(&address) == Some(&instance) {
            return false;
        }
        info!(host = %address, name = %instance.name, "discovered Capacitimer server");
        self.candidates.insert(address, instance);
        true
    }

    fn remove(&mut self, service: &ServiceAnnouncement) -> bool {
        if !self.matches(service) {
            return false;
        }
        let Some(address) = resolve_address(service) else {
            return false;
        };
        let removed = self.candidates.remove(&address).is_some();
        if removed {
            info!(host = %address, "Capacitimer server withdrawn");
        }
        removed
    }
}

/// Picks the best connectable address for a service.
pub fn resolve_address(service: &ServiceAnnouncement) -> Option<String> {
    service
        .addresses
        .iter()
        .find(|addr| addr.is_ipv4())
        .or(service.referer.as_ref().filter(|addr| addr.is_ipv4()))
        .map(IpAddr::to_string)
        .or_else(|| non_blank(service.host.as_deref()))
        .or_else(|| non_blank(Some(service.fqdn.as_str())))
}

/// Strips a trailing `.local` or `.local.` from a host name.
pub fn display_hostname(host: &str) -> String {
    host.strip_suffix(".local.")
        .or_else(|| host.strip_suffix(".local"))
        .unwrap_or(host)
        .to_string()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::RecordingHost;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn tracker() -> (DiscoveryTracker, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let tracker = DiscoveryTracker::new(
            DEFAULT_SERVICE_PREFIX,
            Arc::clone(&host) as Arc<dyn HostSurface>,
        );
        (tracker, host)
    }

    fn service(name: &str, ip: [u8; 4]) -> ServiceAnnouncement {
        ServiceAnnouncement {
            name: name.to_string(),
            host: Some("stage-left.local".to_string()),
            fqdn: format!("{name}._http._tcp.local."),
            port: 80,
            addresses: vec![IpAddr::V4(Ipv4Addr::from(ip))],
            referer: None,
        }
    }

    #[test]
    fn test_same_address_yields_one_candidate() {
        // Arrange
        let (mut tracker, host) = tracker();

        // Act
        tracker.handle(DiscoveryEvent::Announced(service("Capacitimer A", [10, 0, 0, 5])));
        tracker.handle(DiscoveryEvent::Announced(service("Capacitimer B", [10, 0, 0, 5])));

        // Assert
        let candidates = tracker.candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Capacitimer B");
        assert_eq!(host.config_refreshes.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_withdrawal_removes_candidate() {
        let (mut tracker, host) = tracker();
        tracker.handle(DiscoveryEvent::Announced(service("Capacitimer", [10, 0, 0, 5])));

        let changed = tracker.handle(DiscoveryEvent::Withdrawn(service("Capacitimer", [10, 0, 0, 5])));

        assert!(changed);
        assert!(tracker.candidates().is_empty());
        let refreshes = host.config_refreshes.lock().unwrap();
        assert_eq!(refreshes.last().map(Vec::len), Some(0));
    }

    #[test]
    fn test_repeated_announcement_does_not_refresh() {
        let (mut tracker, host) = tracker();
        assert!(tracker.handle(DiscoveryEvent::Announced(service("Capacitimer", [10, 0, 0, 5]))));
        assert!(!tracker.handle(DiscoveryEvent::Announced(service("Capacitimer", [10, 0, 0, 5]))));
        assert_eq!(host.config_refreshes.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let (mut tracker, _host) = tracker();
        assert!(tracker.handle(DiscoveryEvent::Announced(service("CAPACITIMER-FOH", [10, 0, 0, 7]))));
        assert!(!tracker.handle(DiscoveryEvent::Announced(service("Printer", [10, 0, 0, 8]))));
        assert_eq!(tracker.candidates().len(), 1);
    }

    #[test]
    fn test_unknown_withdrawal_is_not_a_change() {
        let (mut tracker, host) = tracker();
        assert!(!tracker.handle(DiscoveryEvent::Withdrawn(service("Capacitimer", [10, 0, 0, 9]))));
        assert!(host.config_refreshes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_resolution_prefers_first_ipv4() {
        let svc = ServiceAnnouncement {
            addresses: vec![
                IpAddr::V6(Ipv6Addr::LOCALHOST),
                IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
                IpAddr::V4(Ipv4Addr::new(192, 168, 1, 21)),
            ],
            referer: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))),
            ..service("Capacitimer", [0, 0, 0, 0])
        };
        assert_eq!(resolve_address(&svc).as_deref(), Some("192.168.1.20"));
    }

    #[test]
    fn test_resolution_falls_back_to_referer_then_host_then_fqdn() {
        let mut svc = ServiceAnnouncement {
            addresses: vec![IpAddr::V6(Ipv6Addr::LOCALHOST)],
            referer: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))),
            ..service("Capacitimer", [0, 0, 0, 0])
        };
        assert_eq!(resolve_address(&svc).as_deref(), Some("10.0.0.1"));

        svc.referer = Some(IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(resolve_address(&svc).as_deref(), Some("stage-left.local"));

        svc.host = None;
        assert_eq!(
            resolve_address(&svc).as_deref(),
            Some("Capacitimer._http._tcp.local.")
        );
    }

    #[test]
    fn test_display_hostname_strips_local_suffix() {
        assert_eq!(display_hostname("stage-left.local"), "stage-left");
        assert_eq!(display_hostname("stage-left.local."), "stage-left");
        assert_eq!(display_hostname("timer.example.com"), "timer.example.com");
    }

    #[tokio::test]
    async fn test_run_consumes_channel_until_closed() {
        // Arrange
        let (tracker, _host) = tracker();
        let (tx, rx) = mpsc::channel(8);
        tx.send(DiscoveryEvent::Announced(service("Capacitimer", [10, 0, 0, 5])))
            .await
            .unwrap();
        tx.send(DiscoveryEvent::Announced(service("Capacitimer 2", [10, 0, 0, 6])))
            .await
            .unwrap();
        drop(tx);

        // Act
        let tracker = tracker.run(rx).await;

        // Assert
        let hosts: Vec<String> = tracker.candidates().into_iter().map(|c| c.host).collect();
        assert_eq!(hosts, vec!["10.0.0.5".to_string(), "10.0.0.6".to_string()]);
    }
}
