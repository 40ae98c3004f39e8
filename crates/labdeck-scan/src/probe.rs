//! Liveness probes.
//!
//! Evaluates a batch of health checks against a target host. Probes are
//! total: every failure mode (missing binary, timeout, refused connect,
//! bad parameters) records `false` for that check, never an error, so a
//! dashboard refresh always gets an answer for every host.

use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use labdeck_core::types::{CheckSpec, HealthResult, HealthStatus};

/// Per-probe time budget. Curl and ping enforce their own limits via
/// flags; the TCP connect is bounded here.
const TCP_TIMEOUT: Duration = Duration::from_secs(3);

/// Run `checks` against `target` strictly in order.
///
/// `results` is parallel to `checks`; a check that could not run
/// (unknown kind or missing parameter) records `false` without counting
/// toward the status. Status is `online` if any executed check
/// succeeded, `offline` if at least one executed and all failed, and
/// `unknown` otherwise.
pub async fn evaluate(target: &str, checks: &[CheckSpec]) -> HealthResult {
    let mut results = Vec::with_capacity(checks.len());
    let mut executed = Vec::new();

    for check in checks {
        let outcome = match check.kind.as_str() {
            "http" => match &check.url {
                Some(url) => Some(http_probe(url).await),
                None => None,
            },
            "tcp" => match check.port {
                Some(port) => Some(tcp_probe(target, port).await),
                None => None,
            },
            "ping" => Some(ping_probe(target).await),
            _ => None,
        };

        match outcome {
            Some(ok) => {
                executed.push(ok);
                results.push(ok);
            }
            None => results.push(false),
        }
    }

    let status = if executed.iter().any(|ok| *ok) {
        HealthStatus::Online
    } else if !executed.is_empty() {
        HealthStatus::Offline
    } else {
        HealthStatus::Unknown
    };

    HealthResult {
        target: target.to_string(),
        status,
        results,
    }
}

/// HTTP reachability via curl. Any status code counts as reachable,
/// 4xx/5xx included; curl's "000" placeholder does not.
async fn http_probe(url: &str) -> bool {
    let output = Command::new("curl")
        .args(["-sk", "--max-time", "3", "-o", "/dev/null", "-w", "%{http_code}"])
        .arg(url)
        .output()
        .await;

    match output {
        Ok(output) => curl_reachable(
            &String::from_utf8_lossy(&output.stdout),
            output.status.success(),
        ),
        Err(_) => false,
    }
}

/// Interpret curl's `%{http_code}` write-out plus its exit status.
///
/// "000" is curl's placeholder for no response; any positive code means
/// the endpoint answered. An empty write-out falls back to the exit
/// status.
fn curl_reachable(code: &str, exit_ok: bool) -> bool {
    let code = code.trim();
    if code.is_empty() {
        exit_ok
    } else {
        code.parse::<u32>().map(|c| c > 0).unwrap_or(false)
    }
}

/// TCP reachability via a bounded connect.
async fn tcp_probe(host: &str, port: u16) -> bool {
    matches!(
        timeout(TCP_TIMEOUT, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// ICMP reachability via the system ping binary.
async fn ping_probe(host: &str) -> bool {
    let mut cmd = Command::new("ping");
    if cfg!(windows) {
        cmd.args(["-n", "1"]);
    } else {
        cmd.args(["-c", "1", "-W", "2"]);
    }
    match cmd.arg(host).output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn tcp_check(port: u16) -> CheckSpec {
        CheckSpec {
            kind: "tcp".to_string(),
            url: None,
            port: Some(port),
        }
    }

    #[test]
    fn curl_zero_code_is_unreachable() {
        // The written code wins over the exit status.
        assert!(!curl_reachable("000", false));
        assert!(!curl_reachable("000", true));
    }

    #[test]
    fn curl_error_status_is_still_reachable() {
        assert!(curl_reachable("503", true));
        assert!(curl_reachable("404\n", true));
    }

    #[test]
    fn curl_empty_output_falls_back_to_exit_status() {
        assert!(curl_reachable("", true));
        assert!(!curl_reachable("", false));
    }

    #[tokio::test]
    async fn empty_checks_are_unknown() {
        let result = evaluate("127.0.0.1", &[]).await;
        assert_eq!(result.status, HealthStatus::Unknown);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn unrecognized_kind_is_skipped() {
        let checks = vec![CheckSpec {
            kind: "snmp".to_string(),
            url: None,
            port: None,
        }];
        let result = evaluate("127.0.0.1", &checks).await;
        assert_eq!(result.status, HealthStatus::Unknown);
        assert_eq!(result.results, vec![false]);
    }

    #[tokio::test]
    async fn missing_parameters_are_skipped() {
        let checks = vec![
            CheckSpec {
                kind: "http".to_string(),
                url: None,
                port: None,
            },
            CheckSpec {
                kind: "tcp".to_string(),
                url: None,
                port: None,
            },
        ];
        let result = evaluate("127.0.0.1", &checks).await;
        assert_eq!(result.status, HealthStatus::Unknown);
        assert_eq!(result.results, vec![false, false]);
    }

    #[tokio::test]
    async fn open_tcp_port_is_online() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let result = evaluate("127.0.0.1", &[tcp_check(port)]).await;
        assert_eq!(result.status, HealthStatus::Online);
        assert_eq!(result.results, vec![true]);
    }

    #[tokio::test]
    async fn closed_tcp_port_is_offline() {
        // Bind then drop to find a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = evaluate("127.0.0.1", &[tcp_check(port)]).await;
        assert_eq!(result.status, HealthStatus::Offline);
        assert_eq!(result.results, vec![false]);
    }

    #[tokio::test]
    async fn any_success_wins_over_failures() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();

        let checks = vec![
            CheckSpec {
                kind: "bogus".to_string(),
                url: None,
                port: None,
            },
            tcp_check(open),
        ];
        let result = evaluate("127.0.0.1", &checks).await;
        assert_eq!(result.status, HealthStatus::Online);
        assert_eq!(result.results, vec![false, true]);
    }

    #[tokio::test]
    async fn results_stay_parallel_to_checks() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        let closed = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let p = l.local_addr().unwrap().port();
            drop(l);
            p
        };

        let checks = vec![tcp_check(closed), tcp_check(open), tcp_check(closed)];
        let result = evaluate("127.0.0.1", &checks).await;
        assert_eq!(result.results, vec![false, true, false]);
        assert_eq!(result.status, HealthStatus::Online);
    }
}
