//! Two-generation snapshot storage.

use std::collections::HashMap;
use std::time::Instant;

use super::model::{Instance, InstanceId, Snapshot};

/// Keeps the current and the immediately previous snapshot.
///
/// Nothing older is retained. Snapshots are replaced wholesale and never
/// mutated once stored.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Option<(Snapshot, Instant)>,
    previous: Option<(Snapshot, Instant)>,
    /// Position of each instance id inside `previous.instances`.
    previous_index: HashMap<InstanceId, usize>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `snapshot` current, demoting the old current to previous.
    pub fn push(&mut self, snapshot: Snapshot, received_at: Instant) {
        self.previous = self.current.take();
        self.current = Some((snapshot, received_at));

        self.previous_index = match &self.previous {
            Some((prev, _)) => prev
                .instances
                .iter()
                .enumerate()
                .map(|(idx, instance)| (instance.id, idx))
                .collect(),
            None => HashMap::new(),
        };
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref().map(|(s, _)| s)
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref().map(|(s, _)| s)
    }

    /// Time of arrival of the current snapshot.
    pub fn current_received_at(&self) -> Option<Instant> {
        self.current.as_ref().map(|(_, ts)| *ts)
    }

    /// Seconds between the two generations, 0 if either is missing.
    pub fn elapsed_seconds(&self) -> f64 {
        match (&self.current, &self.previous) {
            (Some((_, cur)), Some((_, prev))) => cur
                .checked_duration_since(*prev)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// The previous-generation sample of an instance, if it existed then.
    pub fn previous_instance(&self, id: InstanceId) -> Option<&Instance> {
        let (prev, _) = self.previous.as_ref()?;
        let idx = *self.previous_index.get(&id)?;
        prev.instances.get(idx)
    }

    /// Number of known hosts in the current snapshot.
    pub fn host_count(&self) -> usize {
        self.current().map(|s| s.hosts.len()).unwrap_or(0)
    }
}
