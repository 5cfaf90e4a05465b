//! Inventory source abstraction.
//!
//! A source answers two questions: which hosts exist, and which instances
//! run on a given host. Everything else (aggregation across hosts, building
//! a [`Snapshot`]) is provided on top of those two calls.

mod error;
mod file;
mod proxmox;

pub use error::SourceError;
pub use file::FileSource;
pub use proxmox::{ProxmoxSource, ProxmoxSourceBuilder};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::data::{Host, Instance, Snapshot};

/// Trait for fetching inventory from a virtualization platform.
///
/// # Example
///
/// ```no_run
/// use pvetop::{FileSource, InventorySource};
///
/// # tokio_test::block_on(async {
/// let source = FileSource::new("inventory.json");
/// let snapshot = source.fetch_snapshot().await?;
/// println!("{} guests on {} hosts", snapshot.instances.len(), snapshot.hosts.len());
/// # Ok::<(), pvetop::SourceError>(())
/// # });
/// ```
#[async_trait]
pub trait InventorySource: Send + Sync + Debug {
    /// List all hosts.
    async fn get_hosts(&self) -> Result<Vec<Host>, SourceError>;

    /// List the instances placed on one host.
    async fn get_instances(&self, host_id: &str) -> Result<Vec<Instance>, SourceError>;

    /// Human-readable description shown in the title bar.
    fn description(&self) -> &str;

    /// Instances of every host.
    ///
    /// Fails only when the host list itself cannot be fetched.
    async fn get_all_instances(&self) -> Result<Vec<Instance>, SourceError> {
        let hosts = self.get_hosts().await?;
        Ok(self.collect_instances(&hosts).await)
    }

    /// Hosts and their instances as one snapshot, enumerating hosts once.
    async fn fetch_snapshot(&self) -> Result<Snapshot, SourceError> {
        let hosts = self.get_hosts().await?;
        let instances = self.collect_instances(&hosts).await;
        Ok(Snapshot::new(hosts, instances))
    }

    /// Instances of the given hosts. A host that fails is skipped.
    async fn collect_instances(&self, hosts: &[Host]) -> Vec<Instance> {
        let mut all = Vec::new();
        for host in hosts {
            match self.get_instances(&host.id).await {
                Ok(instances) => all.extend(instances),
                Err(e) => {
                    tracing::warn!(host = %host.id, error = %e, "skipping host, instance listing failed");
                }
            }
        }
        all
    }
}
