//! Inventory data and the pure computations over it.
//!
//! ## Submodules
//!
//! - [`model`]: [`Instance`], [`Host`] and [`Snapshot`]
//! - [`store`]: [`SnapshotStore`], the current and previous generation
//! - [`rate`]: throughput derived from cumulative counters
//! - [`sort`]: running-first instance ordering
//! - [`layout`]: width-driven column selection
//! - [`units`]: number formatting for table cells
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot (completed fetch)
//!        │
//!        ▼
//! SnapshotStore::push()  ──▶ previous generation kept for deltas
//!        │
//!        ▼ (per render)
//! RateEstimator ──▶ sort_instances() ──▶ LayoutPlanner::plan()
//! ```

pub mod layout;
pub mod model;
pub mod rate;
pub mod sort;
pub mod store;
pub mod units;

pub use layout::{ColumnSpec, LayoutPlanner};
pub use model::{Host, HostStatus, Instance, InstanceId, InstanceKind, InstanceStatus, Snapshot};
pub use rate::{compute_paired_rate, compute_rate, RateEstimator};
pub use sort::{sort_instances, SortKey};
pub use store::SnapshotStore;

#[cfg(test)]
pub(crate) mod testutil {
    use super::model::*;

    /// A minimal guest on host `pve1`.
    pub fn instance(id: InstanceId, running: bool) -> Instance {
        Instance {
            id,
            name: format!("guest-{id}"),
            kind: InstanceKind::Vm,
            host: "pve1".to_string(),
            status: if running {
                InstanceStatus::Running
            } else {
                InstanceStatus::Other("stopped".to_string())
            },
            cpu: 0.0,
            cpus: 1,
            mem: 0,
            max_mem: 0,
            disk: 0,
            max_disk: 0,
            net_in: 0,
            net_out: 0,
            disk_read: 0,
            disk_write: 0,
            uptime: 0,
        }
    }

    pub fn host(id: &str) -> Host {
        Host {
            id: id.to_string(),
            status: HostStatus::Online,
            cpu: 0.0,
            max_cpu: 8,
            mem: 0,
            max_mem: 0,
            disk: 0,
            max_disk: 0,
            uptime: 0,
        }
    }

    pub fn snapshot(instances: Vec<Instance>) -> Snapshot {
        Snapshot::new(vec![host("pve1")], instances)
    }
}
