//! Inventory types shared by every data source.
//!
//! These match the JSON format used by [`FileSource`](crate::source::FileSource)
//! snapshot files. The Proxmox client converts its wire responses into them.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Guest identifier (the Proxmox VMID), unique across the cluster.
pub type InstanceId = u32;

/// Kind of guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceKind {
    /// Full virtual machine (QEMU/KVM).
    #[serde(rename = "qemu")]
    Vm,
    /// System container (LXC).
    #[serde(rename = "lxc")]
    Container,
}

impl InstanceKind {
    /// Label used in the TYPE column and in API paths.
    pub fn label(&self) -> &'static str {
        match self {
            InstanceKind::Vm => "qemu",
            InstanceKind::Container => "lxc",
        }
    }
}

/// Run state of a guest. Anything other than `running` is grouped together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Running,
    Other(String),
}

impl InstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Running => "running",
            InstanceStatus::Other(s) => s,
        }
    }
}

impl From<String> for InstanceStatus {
    fn from(s: String) -> Self {
        if s == "running" {
            InstanceStatus::Running
        } else {
            InstanceStatus::Other(s)
        }
    }
}

impl From<InstanceStatus> for String {
    fn from(status: InstanceStatus) -> Self {
        match status {
            InstanceStatus::Running => "running".to_string(),
            InstanceStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reachability of a host. Anything other than `online` is grouped together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HostStatus {
    Online,
    Other(String),
}

impl HostStatus {
    pub fn as_str(&self) -> &str {
        match self {
            HostStatus::Online => "online",
            HostStatus::Other(s) => s,
        }
    }
}

impl From<String> for HostStatus {
    fn from(s: String) -> Self {
        if s == "online" {
            HostStatus::Online
        } else {
            HostStatus::Other(s)
        }
    }
}

impl From<HostStatus> for String {
    fn from(status: HostStatus) -> Self {
        match status {
            HostStatus::Online => "online".to_string(),
            HostStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A virtual machine or container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub name: String,
    pub kind: InstanceKind,
    /// Owning host. May name a host missing from the snapshot.
    pub host: String,
    pub status: InstanceStatus,
    /// CPU usage as a fraction of the guest's own cores (0.0..=1.0).
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub cpus: u32,
    #[serde(default)]
    pub mem: u64,
    #[serde(default)]
    pub max_mem: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub max_disk: u64,
    #[serde(default)]
    pub net_in: u64,
    #[serde(default)]
    pub net_out: u64,
    #[serde(default)]
    pub disk_read: u64,
    #[serde(default)]
    pub disk_write: u64,
    #[serde(default)]
    pub uptime: u64,
}

impl Instance {
    pub fn is_running(&self) -> bool {
        self.status == InstanceStatus::Running
    }

    /// Memory usage in percent, 0 when the maximum is unknown.
    pub fn mem_percent(&self) -> f64 {
        percent(self.mem, self.max_mem)
    }
}

/// A node that runs instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub status: HostStatus,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub max_cpu: u32,
    #[serde(default)]
    pub mem: u64,
    #[serde(default)]
    pub max_mem: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub max_disk: u64,
    #[serde(default)]
    pub uptime: u64,
}

impl Host {
    pub fn is_online(&self) -> bool {
        self.status == HostStatus::Online
    }

    /// Memory usage in percent, 0 when the maximum is unknown.
    pub fn mem_percent(&self) -> f64 {
        percent(self.mem, self.max_mem)
    }
}

/// A complete, immutable sample of the inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub captured_at: SystemTime,
    pub instances: Vec<Instance>,
    pub hosts: Vec<Host>,
}

impl Snapshot {
    /// Build a snapshot stamped with the current wall-clock time.
    pub fn new(hosts: Vec<Host>, instances: Vec<Instance>) -> Self {
        Self {
            captured_at: SystemTime::now(),
            instances,
            hosts,
        }
    }

    pub fn running_count(&self) -> usize {
        self.instances.iter().filter(|i| i.is_running()).count()
    }

    pub fn online_count(&self) -> usize {
        self.hosts.iter().filter(|h| h.is_online()).count()
    }

    /// Count (vms, containers) placed on the given host.
    pub fn kinds_on_host(&self, host_id: &str) -> (usize, usize) {
        self.instances
            .iter()
            .filter(|i| i.host == host_id)
            .fold((0, 0), |(vms, cts), i| match i.kind {
                InstanceKind::Vm => (vms + 1, cts),
                InstanceKind::Container => (vms, cts + 1),
            })
    }
}

fn percent(used: u64, max: u64) -> f64 {
    if max == 0 {
        0.0
    } else {
        used as f64 / max as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_instance() {
        let json = r#"{
            "id": 101,
            "name": "web",
            "kind": "lxc",
            "host": "pve1",
            "status": "stopped",
            "mem": 512
        }"#;

        let instance: Instance = serde_json::from_str(json).unwrap();
        assert_eq!(instance.id, 101);
        assert_eq!(instance.kind, InstanceKind::Container);
        assert_eq!(instance.status, InstanceStatus::Other("stopped".to_string()));
        assert!(!instance.is_running());
        assert_eq!(instance.mem, 512);
        assert_eq!(instance.disk_read, 0);
    }

    #[test]
    fn test_status_serializes_as_plain_string() {
        let json = serde_json::to_string(&HostStatus::Online).unwrap();
        assert_eq!(json, r#""online""#);
        let json = serde_json::to_string(&InstanceStatus::Other("paused".into())).unwrap();
        assert_eq!(json, r#""paused""#);
    }

    #[test]
    fn test_mem_percent_with_zero_max() {
        let host = Host {
            id: "pve1".into(),
            status: HostStatus::Other("offline".into()),
            cpu: 0.0,
            max_cpu: 0,
            mem: 100,
            max_mem: 0,
            disk: 0,
            max_disk: 0,
            uptime: 0,
        };
        assert_eq!(host.mem_percent(), 0.0);
    }
}
