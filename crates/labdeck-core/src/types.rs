//! Core domain types for the labdeck dashboard backend.
//!
//! These are the wire types shared between the scan engine, the config
//! store, and the HTTP API.

use serde::{Deserialize, Serialize};

// ── Discovery ─────────────────────────────────────────────────────

/// A host discovered on the local network.
///
/// Hosts are produced wholesale per scan; a new discovery replaces the
/// previous result set entirely rather than updating hosts in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub address: String,
    /// Open TCP ports, sorted and deduplicated.
    #[serde(default)]
    pub open_ports: Vec<u16>,
    /// Recognized service names, ordered by port number.
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub suggested_links: Vec<Link>,
    /// Raw scanner output lines describing detected services.
    #[serde(default)]
    pub banners: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_guess: Option<String>,
    /// Auxiliary tags, sorted and deduplicated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl Host {
    /// A bare host as produced by the host sweep: address only.
    pub fn stub(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            open_ports: Vec::new(),
            services: Vec::new(),
            suggested_links: Vec::new(),
            banners: Vec::new(),
            role_guess: None,
            labels: Vec::new(),
        }
    }
}

/// A clickable link: a service UI, a dashboard panel, documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

// ── Health checks ─────────────────────────────────────────────────

/// One liveness check to run against a target.
///
/// `kind` stays a free-form string on the wire (`type`): documents may
/// carry check kinds this backend does not implement, and those must
/// still validate. Unrecognized kinds are skipped at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Aggregate liveness verdict for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Online,
    Offline,
    Unknown,
}

/// Outcome of evaluating a list of checks against one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResult {
    pub target: String,
    pub status: HealthStatus,
    /// One entry per input check, in input order. A check that was
    /// skipped (unrecognized kind, missing parameter) records `false`.
    pub results: Vec<bool>,
}

// ── Scheduling ────────────────────────────────────────────────────

/// Recurring-scan configuration.
///
/// In-memory only: runtime changes do not survive a restart. The
/// startup value is seeded from [`crate::Settings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_subnet")]
    pub subnet: String,
    #[serde(default)]
    pub interval_min: u64,
    #[serde(default = "default_top_ports")]
    pub top_ports: u16,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            enabled: false,
            subnet: default_subnet(),
            interval_min: 0,
            top_ports: default_top_ports(),
        }
    }
}

fn default_subnet() -> String {
    "192.168.0.0/24".to_string()
}

fn default_top_ports() -> u16 {
    100
}

// ── Dashboard document ────────────────────────────────────────────

/// The user-curated topology document.
///
/// This tree defines what "valid" means for the config store: a
/// candidate document must deserialize into it. Unknown fields are
/// tolerated: the store persists the raw JSON payload, so anything
/// the schema does not model survives a save/restore round trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grafana: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// A named group of servers on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub servers: Vec<Server>,
}

/// One server entry in the dashboard document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    /// Network address. Older documents used the key `ip`.
    #[serde(default, alias = "ip", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_spec_uses_type_on_the_wire() {
        let check: CheckSpec = serde_json::from_str(r#"{"type":"tcp","port":22}"#).unwrap();
        assert_eq!(check.kind, "tcp");
        assert_eq!(check.port, Some(22));
        assert_eq!(check.url, None);

        let json = serde_json::to_string(&check).unwrap();
        assert!(json.contains("\"type\":\"tcp\""));
        assert!(!json.contains("kind"));
    }

    #[test]
    fn health_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Online).unwrap(),
            "\"online\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unknown).unwrap(),
            "\"unknown\""
        );
    }

    #[test]
    fn host_stub_omits_empty_optionals() {
        let host = Host::stub("192.168.1.10");
        let json = serde_json::to_string(&host).unwrap();
        assert!(json.contains("\"address\":\"192.168.1.10\""));
        assert!(!json.contains("role_guess"));
        assert!(!json.contains("labels"));
    }

    #[test]
    fn schedule_state_defaults() {
        let state = ScheduleState::default();
        assert!(!state.enabled);
        assert_eq!(state.subnet, "192.168.0.0/24");
        assert_eq!(state.interval_min, 0);
        assert_eq!(state.top_ports, 100);

        // A bare `{}` deserializes to the same defaults.
        let parsed: ScheduleState = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn empty_document_is_valid() {
        let doc: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert!(doc.groups.is_empty());
        assert!(doc.grafana.is_none());
    }

    #[test]
    fn server_accepts_legacy_ip_alias() {
        let server: Server =
            serde_json::from_str(r#"{"name":"nas","ip":"192.168.1.20"}"#).unwrap();
        assert_eq!(server.address.as_deref(), Some("192.168.1.20"));
    }

    #[test]
    fn group_without_name_is_invalid() {
        let result = serde_json::from_str::<DashboardConfig>(r#"{"groups":[{"servers":[]}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn full_document_round_trip() {
        let raw = r#"{
            "grafana": {"url": "http://grafana.lan:3000"},
            "groups": [{
                "name": "Compute",
                "servers": [{
                    "name": "pve1",
                    "address": "192.168.1.2",
                    "os": "Proxmox VE",
                    "role": "Hypervisor",
                    "tags": ["prod"],
                    "links": [{"label": "UI", "url": "https://192.168.1.2:8006"}],
                    "checks": [{"type": "ping"}, {"type": "tcp", "port": 8006}]
                }]
            }]
        }"#;

        let doc: DashboardConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.groups.len(), 1);
        let server = &doc.groups[0].servers[0];
        assert_eq!(server.name, "pve1");
        assert_eq!(server.checks.len(), 2);
        assert_eq!(server.checks[1].kind, "tcp");
        assert_eq!(server.links[0].url, "https://192.168.1.2:8006");
    }
}
