use super::{PingObservation, PortObservation, Transport};
use std::{io::ErrorKind, net::IpAddr, process::Stdio, time::Duration};
use tokio::{
    net::{TcpStream, lookup_host},
    process::Command,
    time,
};

// extra time given to the ping process on top of its own deadline
const PING_GRACE: Duration = Duration::from_secs(2);

// exit status meaning "sent, but nothing came back"
#[cfg(target_os = "macos")]
const PING_NO_REPLY: i32 = 2;
#[cfg(not(target_os = "macos"))]
const PING_NO_REPLY: i32 = 1;

/// Probes backed by the operating system: DNS, the `ping` utility and TCP sockets
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTransport;

impl Transport for SystemTransport {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, String> {
        let addrs = lookup_host((host, 0)).await.map_err(|e| e.to_string())?;
        let mut ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
        ips.dedup();
        if ips.is_empty() {
            return Err(format!("no addresses found for {host}"));
        }
        Ok(ips)
    }

    async fn ping(&self, host: &str, timeout: Duration) -> PingObservation {
        let mut cmd = ping_command(host, timeout);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return PingObservation::Unavailable(format!("cannot run ping: {e}")),
        };

        let deadline = ping_deadline(timeout);
        let output = match time::timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return PingObservation::Failed(format!("ping failed: {e}")),
            Err(_) => {
                return PingObservation::Failed(format!(
                    "ping did not finish within {}s",
                    deadline.as_secs()
                ));
            }
        };

        match output.status.code() {
            Some(0) => PingObservation::Reply,
            Some(PING_NO_REPLY) => PingObservation::NoReply,
            code => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                let status = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                if stderr.is_empty() {
                    PingObservation::Failed(format!("ping exited with status {status}"))
                } else {
                    PingObservation::Failed(format!("ping exited with status {status}: {stderr}"))
                }
            }
        }
    }

    async fn connect_tcp(&self, host: &str, port: u16, timeout: Duration) -> PortObservation {
        match time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => {
                drop(stream);
                PortObservation::Open
            }
            Ok(Err(e)) => match e.kind() {
                ErrorKind::ConnectionRefused => PortObservation::Refused,
                ErrorKind::TimedOut => PortObservation::TimedOut,
                _ => PortObservation::Unreachable(e.to_string()),
            },
            Err(_) => PortObservation::TimedOut,
        }
    }
}

const fn ping_deadline(timeout: Duration) -> Duration {
    timeout.saturating_add(PING_GRACE)
}

#[cfg(windows)]
fn ping_command(host: &str, timeout: Duration) -> Command {
    let mut cmd = Command::new("ping");
    cmd.arg("-n")
        .arg("1")
        .arg("-w")
        .arg(timeout.as_millis().to_string())
        .arg(host);
    cmd
}

#[cfg(target_os = "macos")]
fn ping_command(host: &str, timeout: Duration) -> Command {
    let mut cmd = Command::new("ping");
    cmd.arg("-c")
        .arg("1")
        .arg("-t")
        .arg(timeout.as_secs().max(1).to_string())
        .arg(host);
    cmd
}

#[cfg(not(any(windows, target_os = "macos")))]
fn ping_command(host: &str, timeout: Duration) -> Command {
    let mut cmd = Command::new("ping");
    cmd.arg("-c")
        .arg("1")
        .arg("-W")
        .arg(timeout.as_secs().max(1).to_string())
        .arg(host);
    cmd
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_tcp_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let observation = SystemTransport
            .connect_tcp("127.0.0.1", port, Duration::from_secs(2))
            .await;
        assert_eq!(observation, PortObservation::Open);
    }

    #[tokio::test]
    async fn test_connect_tcp_refused() {
        // grab a free port, then release it so nothing listens there
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let observation = SystemTransport
            .connect_tcp("127.0.0.1", port, Duration::from_secs(2))
            .await;
        assert_eq!(observation, PortObservation::Refused);
    }

    #[test]
    fn test_ping_deadline() {
        assert_eq!(ping_deadline(Duration::from_secs(5)), Duration::from_secs(7));
        assert_eq!(ping_deadline(Duration::MAX), Duration::MAX);
    }

    #[tokio::test]
    async fn test_resolve_loopback() {
        let ips = SystemTransport.resolve("127.0.0.1").await.unwrap();
        assert_eq!(ips, vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_resolve_invalid_host() {
        assert!(SystemTransport.resolve("host.invalid").await.is_err());
    }
}
