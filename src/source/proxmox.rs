//! Proxmox VE source using the HTTP API.
//!
//! Authenticates with an API token (`user@realm!tokenid=secret`) and reads:
//!
//! - `/nodes` for the host list
//! - `/nodes/{node}/qemu` and `/nodes/{node}/lxc` for guests
//! - `/nodes/{node}/{qemu|lxc}/{vmid}/status/current` for the I/O counters of
//!   running guests, which the list endpoints may report stale
//!
//! ## Example
//!
//! ```rust,no_run
//! use pvetop::{InventorySource, ProxmoxSource};
//!
//! # tokio_test::block_on(async {
//! let source = ProxmoxSource::builder()
//!     .endpoint("https://pve.local:8006")
//!     .token("root@pam!pvetop=00000000-0000-0000-0000-000000000000")
//!     .build()?;
//!
//! for host in source.get_hosts().await? {
//!     println!("{} is {}", host.id, host.status);
//! }
//! # Ok::<(), pvetop::SourceError>(())
//! # });
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{InventorySource, SourceError};
use crate::data::{Host, HostStatus, Instance, InstanceId, InstanceKind, InstanceStatus};

/// Inventory source backed by a Proxmox VE cluster.
#[derive(Debug, Clone)]
pub struct ProxmoxSource {
    client: Client,
    base_url: String,
    token: String,
    description: String,
}

impl ProxmoxSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> ProxmoxSourceBuilder {
        ProxmoxSourceBuilder::default()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("PVEAPIToken={}", self.token))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Auth(format!("{} rejected the API token", path)));
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(envelope.data)
    }

    async fn list_guests(
        &self,
        node: &str,
        kind: InstanceKind,
    ) -> Result<Vec<Instance>, SourceError> {
        let entries: Vec<GuestEntry> = self
            .get(&format!("/nodes/{}/{}", node, kind.label()))
            .await?;

        let mut guests = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut guest = entry.into_instance(kind, node);
            if guest.is_running() {
                self.refresh_counters(&mut guest).await;
            }
            guests.push(guest);
        }
        Ok(guests)
    }

    /// Overwrite the I/O counters with the live values. Failures keep the
    /// values from the list endpoint.
    async fn refresh_counters(&self, guest: &mut Instance) {
        let path = format!(
            "/nodes/{}/{}/{}/status/current",
            guest.host,
            guest.kind.label(),
            guest.id
        );
        match self.get::<GuestCounters>(&path).await {
            Ok(counters) => {
                guest.disk_read = counters.diskread;
                guest.disk_write = counters.diskwrite;
                guest.net_in = counters.netin;
                guest.net_out = counters.netout;
            }
            Err(e) => {
                tracing::debug!(vmid = guest.id, error = %e, "status/current failed, keeping list counters");
            }
        }
    }
}

#[async_trait]
impl InventorySource for ProxmoxSource {
    async fn get_hosts(&self) -> Result<Vec<Host>, SourceError> {
        let nodes: Vec<NodeEntry> = self.get("/nodes").await?;
        Ok(nodes.into_iter().map(NodeEntry::into_host).collect())
    }

    async fn get_instances(&self, host_id: &str) -> Result<Vec<Instance>, SourceError> {
        let mut guests = self.list_guests(host_id, InstanceKind::Vm).await?;
        guests.extend(self.list_guests(host_id, InstanceKind::Container).await?);
        Ok(guests)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`ProxmoxSource`].
#[derive(Debug, Default)]
pub struct ProxmoxSourceBuilder {
    endpoint: Option<String>,
    token: Option<String>,
    verify_tls: bool,
    timeout: Option<Duration>,
}

impl ProxmoxSourceBuilder {
    /// Set the API endpoint (e.g., "https://pve.local:8006").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the endpoint from a host name and port.
    pub fn host(self, host: &str, port: u16) -> Self {
        self.endpoint(format!("https://{}:{}", host, port))
    }

    /// Set the API token (`user@realm!tokenid=secret`).
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Verify the server certificate (default: off, Proxmox ships self-signed).
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<ProxmoxSource, SourceError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!self.verify_tls)
            .build()?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "https://localhost:8006".to_string());
        let endpoint = endpoint.trim_end_matches('/').to_string();

        Ok(ProxmoxSource {
            client,
            base_url: format!("{}/api2/json", endpoint),
            token: self.token.unwrap_or_default(),
            description: endpoint,
        })
    }
}

/// Every Proxmox response is wrapped in `{"data": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    node: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    cpu: f64,
    #[serde(default)]
    maxcpu: u32,
    #[serde(default)]
    mem: u64,
    #[serde(default)]
    maxmem: u64,
    #[serde(default)]
    disk: u64,
    #[serde(default)]
    maxdisk: u64,
    #[serde(default)]
    uptime: u64,
}

impl NodeEntry {
    fn into_host(self) -> Host {
        Host {
            id: self.node,
            status: HostStatus::from(self.status.unwrap_or_else(|| "unknown".to_string())),
            cpu: self.cpu,
            max_cpu: self.maxcpu,
            mem: self.mem,
            max_mem: self.maxmem,
            disk: self.disk,
            max_disk: self.maxdisk,
            uptime: self.uptime,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GuestEntry {
    #[serde(deserialize_with = "vmid")]
    vmid: InstanceId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    cpu: f64,
    #[serde(default)]
    cpus: u32,
    #[serde(default)]
    mem: u64,
    #[serde(default)]
    maxmem: u64,
    #[serde(default)]
    disk: u64,
    #[serde(default)]
    maxdisk: u64,
    #[serde(default)]
    netin: u64,
    #[serde(default)]
    netout: u64,
    #[serde(default)]
    diskread: u64,
    #[serde(default)]
    diskwrite: u64,
    #[serde(default)]
    uptime: u64,
}

impl GuestEntry {
    fn into_instance(self, kind: InstanceKind, node: &str) -> Instance {
        Instance {
            id: self.vmid,
            name: self.name.unwrap_or_else(|| format!("{}-{}", kind.label(), self.vmid)),
            kind,
            host: node.to_string(),
            status: InstanceStatus::from(self.status.unwrap_or_else(|| "unknown".to_string())),
            cpu: self.cpu,
            cpus: self.cpus,
            mem: self.mem,
            max_mem: self.maxmem,
            disk: self.disk,
            max_disk: self.maxdisk,
            net_in: self.netin,
            net_out: self.netout,
            disk_read: self.diskread,
            disk_write: self.diskwrite,
            uptime: self.uptime,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GuestCounters {
    #[serde(default)]
    netin: u64,
    #[serde(default)]
    netout: u64,
    #[serde(default)]
    diskread: u64,
    #[serde(default)]
    diskwrite: u64,
}

/// Some PVE versions report container VMIDs as strings.
fn vmid<'de, D>(deserializer: D) -> Result<InstanceId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(InstanceId),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let source = ProxmoxSource::builder().build().unwrap();
        assert_eq!(source.base_url, "https://localhost:8006/api2/json");
        assert_eq!(source.description(), "https://localhost:8006");
        assert!(source.token.is_empty());
    }

    #[test]
    fn test_builder_custom() {
        let source = ProxmoxSource::builder()
            .host("pve.lan", 8443)
            .token("root@pam!top=secret")
            .verify_tls(true)
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(source.base_url, "https://pve.lan:8443/api2/json");
        assert_eq!(source.token, "root@pam!top=secret");
    }

    #[test]
    fn test_guest_entry_conversion() {
        let json = r#"{ "vmid": "204", "status": "running", "cpu": 0.12, "cpus": 2,
                        "mem": 100, "maxmem": 400, "netin": 7, "diskread": 9 }"#;
        let entry: GuestEntry = serde_json::from_str(json).unwrap();
        let guest = entry.into_instance(InstanceKind::Container, "pve2");

        assert_eq!(guest.id, 204);
        assert_eq!(guest.name, "lxc-204");
        assert_eq!(guest.host, "pve2");
        assert!(guest.is_running());
        assert_eq!(guest.mem_percent(), 25.0);
        assert_eq!(guest.net_in, 7);
        assert_eq!(guest.disk_read, 9);
    }

    #[test]
    fn test_node_entry_without_metrics() {
        let json = r#"{ "node": "pve3", "status": "offline" }"#;
        let host = serde_json::from_str::<NodeEntry>(json).unwrap().into_host();

        assert_eq!(host.id, "pve3");
        assert!(!host.is_online());
        assert_eq!(host.max_mem, 0);
    }

    #[tokio::test]
    async fn test_get_instances_merges_kinds_and_live_counters() {
        let mut server = mockito::Server::new_async().await;
        let auth = "PVEAPIToken=root@pam!top=secret";

        let qemu = server
            .mock("GET", "/api2/json/nodes/pve1/qemu")
            .match_header("authorization", auth)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[
                    {"vmid":100,"name":"db","status":"running","diskread":1,"netin":1},
                    {"vmid":101,"name":"old","status":"stopped"}
                ]}"#,
            )
            .create_async()
            .await;
        let lxc = server
            .mock("GET", "/api2/json/nodes/pve1/lxc")
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"vmid":"200","name":"ct","status":"running"}]}"#)
            .create_async()
            .await;
        let live = server
            .mock("GET", "/api2/json/nodes/pve1/qemu/100/status/current")
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"diskread":5000,"diskwrite":10,"netin":300,"netout":20}}"#)
            .create_async()
            .await;
        let missing = server
            .mock("GET", "/api2/json/nodes/pve1/lxc/200/status/current")
            .with_status(500)
            .create_async()
            .await;

        let source = ProxmoxSource::builder()
            .endpoint(server.url())
            .token("root@pam!top=secret")
            .build()
            .unwrap();
        let guests = source.get_instances("pve1").await.unwrap();

        qemu.assert_async().await;
        lxc.assert_async().await;
        live.assert_async().await;
        missing.assert_async().await;

        let ids: Vec<u32> = guests.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![100, 101, 200]);
        assert_eq!(guests[0].disk_read, 5000);
        assert_eq!(guests[0].net_out, 20);
        assert_eq!(guests[2].kind, InstanceKind::Container);
        assert_eq!(guests[2].disk_read, 0);
    }

    #[tokio::test]
    async fn test_rejected_token_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _nodes = server
            .mock("GET", "/api2/json/nodes")
            .with_status(401)
            .create_async()
            .await;

        let source = ProxmoxSource::builder().endpoint(server.url()).build().unwrap();
        let err = source.get_hosts().await.unwrap_err();

        assert!(matches!(err, SourceError::Auth(_)));
    }
}
