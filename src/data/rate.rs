//! Throughput derived from cumulative counters of two snapshots.

use super::model::Instance;
use super::store::SnapshotStore;

/// Bytes per second between two samples of a cumulative counter.
///
/// Returns 0 without a previous sample or when `elapsed_seconds` is not a
/// positive number. A counter that went down (guest restart) counts as 0.
pub fn compute_rate(current: u64, previous: Option<u64>, elapsed_seconds: f64) -> f64 {
    compute_paired_rate((current, 0), previous.map(|p| (p, 0)), elapsed_seconds)
}

/// Like [`compute_rate`] for a pair of counters (read+write, in+out).
///
/// Each delta is clamped on its own, then the sum is divided by the elapsed
/// time.
pub fn compute_paired_rate(
    current: (u64, u64),
    previous: Option<(u64, u64)>,
    elapsed_seconds: f64,
) -> f64 {
    let Some(previous) = previous else {
        return 0.0;
    };
    if elapsed_seconds <= 0.0 || !elapsed_seconds.is_finite() {
        return 0.0;
    }

    let first = current.0.saturating_sub(previous.0);
    let second = current.1.saturating_sub(previous.1);
    (first as f64 + second as f64) / elapsed_seconds
}

/// Lazily computes rates against the two generations held by a store.
#[derive(Debug, Clone, Copy)]
pub struct RateEstimator<'a> {
    store: &'a SnapshotStore,
    elapsed: f64,
}

impl<'a> RateEstimator<'a> {
    pub fn new(store: &'a SnapshotStore) -> Self {
        Self {
            store,
            elapsed: store.elapsed_seconds(),
        }
    }

    /// Combined disk read+write throughput of an instance.
    pub fn disk_rate(&self, instance: &Instance) -> f64 {
        let previous = self
            .store
            .previous_instance(instance.id)
            .map(|p| (p.disk_read, p.disk_write));
        compute_paired_rate(
            (instance.disk_read, instance.disk_write),
            previous,
            self.elapsed,
        )
    }

    /// Combined network in+out throughput of an instance.
    pub fn net_rate(&self, instance: &Instance) -> f64 {
        let previous = self
            .store
            .previous_instance(instance.id)
            .map(|p| (p.net_in, p.net_out));
        compute_paired_rate((instance.net_in, instance.net_out), previous, self.elapsed)
    }

    /// Sum of disk rates of running instances on a host.
    pub fn host_disk_rate(&self, host_id: &str) -> f64 {
        self.running_on(host_id).map(|i| self.disk_rate(i)).sum()
    }

    /// Sum of network rates of running instances on a host.
    pub fn host_net_rate(&self, host_id: &str) -> f64 {
        self.running_on(host_id).map(|i| self.net_rate(i)).sum()
    }

    fn running_on<'s>(&'s self, host_id: &'s str) -> impl Iterator<Item = &'a Instance> + 's {
        self.store
            .current()
            .into_iter()
            .flat_map(|s| s.instances.iter())
            .filter(move |i| i.host == host_id && i.is_running())
    }
}
