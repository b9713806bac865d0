//! Network and mail abstractions for testability

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use surge_ping::{Client, PingIdentifier, PingSequence, ICMP};
use tokio::net::TcpStream;

use crate::error::InfraPulseError;

/// Outcome of an ICMP echo run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PingSummary {
    pub transmitted: u16,
    pub received: u16,
    /// Error from the last failed echo attempt, if any
    pub last_error: Option<String>,
}

/// Abstraction over the reachability prober and the TCP dialer
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait NetworkProbe: Send + Sync {
    /// Send up to `attempts` echo requests to `host`, bounded by `timeout` overall
    async fn ping(&self, host: &str, attempts: u16, timeout: Duration)
        -> crate::Result<PingSummary>;

    /// Open a TCP connection to `host:port` and close it again
    async fn connect(&self, host: &str, port: u16, timeout: Duration) -> crate::Result<()>;
}

/// An outgoing alert email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Abstraction over the mail relay
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait MailTransport: Send + Sync {
    /// Deliver one message to all of its recipients
    async fn send(&self, message: &MailMessage) -> crate::Result<()>;
}

/// Production prober using ICMP sockets and tokio TCP streams
#[derive(Debug, Default)]
pub struct SystemNetworkProbe;

/// Resolve a host name or literal address to its first IP address
pub async fn resolve_host(host: &str) -> crate::Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    let mut addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| InfraPulseError::Probe(format!("lookup {}: {}", host, e)))?;
    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| InfraPulseError::Probe(format!("lookup {}: no addresses found", host)))
}

/// Run `fut` under `limit`, turning an elapsed timer into a probe error
async fn bounded<T>(
    limit: Duration,
    what: impl std::fmt::Display,
    fut: impl std::future::Future<Output = crate::Result<T>>,
) -> crate::Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| {
            Err(InfraPulseError::Probe(format!(
                "{}: i/o timeout after {:?}",
                what, limit
            )))
        })
}

impl SystemNetworkProbe {
    async fn echo(&self, host: &str, attempts: u16, timeout: Duration) -> crate::Result<PingSummary> {
        let ip = resolve_host(host).await?;

        let config = match ip {
            IpAddr::V4(_) => surge_ping::Config::default(),
            IpAddr::V6(_) => surge_ping::Config::builder().kind(ICMP::V6).build(),
        };
        let client = Client::new(&config).map_err(|e| {
            InfraPulseError::Probe(format!("failed to open ICMP socket for {}: {}", host, e))
        })?;

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout / u32::from(attempts.max(1)));

        let payload = [0u8; 56];
        let mut summary = PingSummary::default();
        for seq in 0..attempts {
            summary.transmitted += 1;
            match pinger.ping(PingSequence(seq), &payload).await {
                Ok((_, rtt)) => {
                    tracing::debug!("Echo reply from {} ({}) in {:?}", host, ip, rtt);
                    summary.received += 1;
                    break;
                }
                Err(e) => {
                    tracing::debug!("Echo {} to {} failed: {}", seq, host, e);
                    summary.last_error = Some(e.to_string());
                }
            }
        }

        Ok(summary)
    }
}

#[async_trait]
impl NetworkProbe for SystemNetworkProbe {
    /// Name resolution counts against `timeout` as well as the echoes
    async fn ping(
        &self,
        host: &str,
        attempts: u16,
        timeout: Duration,
    ) -> crate::Result<PingSummary> {
        bounded(
            timeout,
            format!("ping {}", host),
            self.echo(host, attempts, timeout),
        )
        .await
    }

    async fn connect(&self, host: &str, port: u16, timeout: Duration) -> crate::Result<()> {
        tracing::debug!("Dialing {}:{}", host, port);
        let dial = async {
            TcpStream::connect((host, port))
                .await
                .map(drop)
                .map_err(|e| InfraPulseError::Probe(format!("dial tcp {}:{}: {}", host, port, e)))
        };
        bounded(timeout, format!("dial tcp {}:{}", host, port), dial).await
    }
}
