//! Port-based service fingerprinting.
//!
//! Pure lookup tables: a well-known-port table mapping open ports to
//! service names and dashboard links, and an ordered keyword rule table
//! that guesses a host's role from its service names and banner lines.
//! Same inputs always produce the same outputs.

use labdeck_core::types::{Host, Link};

/// Well-known ports: service name plus an optional link template where
/// `{host}` is replaced by the host address.
const PORT_TABLE: &[(u16, &str, Option<&str>)] = &[
    (22, "SSH", None),
    (80, "HTTP", Some("http://{host}")),
    (139, "NetBIOS", None),
    (443, "HTTPS", Some("https://{host}")),
    (445, "SMB", None),
    (3000, "Grafana", Some("http://{host}:3000")),
    (8006, "Proxmox UI", Some("https://{host}:8006")),
    (8080, "HTTP-Alt", Some("http://{host}:8080")),
    (8443, "HTTPS-Alt", Some("https://{host}:8443")),
    (9090, "Prometheus", Some("http://{host}:9090")),
    (9100, "Node Exporter", Some("http://{host}:9100/metrics")),
];

/// Role heuristics, evaluated top-to-bottom against the lowercased
/// services + banners blob. A matching rule always contributes its
/// label; its role (when present) wins only if no earlier rule set one.
const ROLE_RULES: &[(&[&str], Option<&str>, &str)] = &[
    (&["proxmox", ":8006"], Some("Hypervisor"), "proxmox"),
    (&["grafana", ":3000"], Some("Monitoring"), "grafana"),
    (&["prometheus", ":9090"], Some("Monitoring"), "prometheus"),
    (&["smb", "netbios", "microsoft-ds", ":445"], Some("File server"), "smb"),
    (&["nginx", "apache", "http"], Some("Web server"), "http"),
    (&["openssh", ":22"], None, "ssh"),
    (&["mysql", ":3306"], Some("Database"), "mysql"),
    (&["postgres", ":5432"], Some("Database"), "postgres"),
    (&["kubernetes", "kube"], Some("Kubernetes node"), "k8s"),
    (&["docker"], None, "docker"),
    (&["printer", "ipp"], Some("Printer"), "printer"),
];

/// Map open ports to recognized service names and dashboard links.
///
/// Ports are walked sorted and deduplicated; ports outside the table
/// contribute nothing.
pub fn suggest_links(address: &str, open_ports: &[u16]) -> (Vec<String>, Vec<Link>) {
    let mut ports: Vec<u16> = open_ports.to_vec();
    ports.sort_unstable();
    ports.dedup();

    let mut services = Vec::new();
    let mut links = Vec::new();
    for port in ports {
        if let Some((_, name, template)) = PORT_TABLE.iter().find(|(p, _, _)| *p == port) {
            services.push((*name).to_string());
            if let Some(template) = template {
                links.push(Link {
                    label: (*name).to_string(),
                    url: template.replace("{host}", address),
                });
            }
        }
    }
    (services, links)
}

/// Guess a host's role from its service names and banner lines.
///
/// Returns the first matching role (or `None`) and the sorted,
/// deduplicated set of labels of every matching rule.
pub fn guess_role(services: &[String], banners: &[String]) -> (Option<String>, Vec<String>) {
    let blob = services
        .iter()
        .chain(banners.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut role = None;
    let mut labels = Vec::new();
    for (keywords, rule_role, label) in ROLE_RULES {
        if keywords.iter().any(|kw| blob.contains(kw)) {
            if role.is_none() {
                role = rule_role.map(str::to_string);
            }
            labels.push((*label).to_string());
        }
    }
    labels.sort();
    labels.dedup();
    (role, labels)
}

/// Fill a host's fingerprint fields from its open ports and banners.
pub fn annotate(host: &mut Host) {
    let (services, links) = suggest_links(&host.address, &host.open_ports);
    host.services = services;
    host.suggested_links = links;
    let (role, labels) = guess_role(&host.services, &host.banners);
    host.role_guess = role;
    host.labels = labels;
}
