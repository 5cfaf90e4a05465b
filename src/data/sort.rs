//! Instance ordering with running-first priority.

use std::cmp::Ordering;

use super::model::Instance;
use super::rate::RateEstimator;

/// Column to sort the instance table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Id,
    Name,
    Status,
    /// CPU usage fraction (default).
    #[default]
    Cpu,
    /// Memory used as a percent of the guest's maximum.
    Memory,
    /// Combined disk read+write rate.
    DiskRate,
    /// Combined network in+out rate.
    NetRate,
}

impl SortKey {
    /// Short label shown in the title bar.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Id => "vmid",
            SortKey::Name => "name",
            SortKey::Status => "status",
            SortKey::Cpu => "cpu",
            SortKey::Memory => "mem",
            SortKey::DiskRate => "disk",
            SortKey::NetRate => "net",
        }
    }
}

/// Sort instances in place.
///
/// Running instances always come first. Non-running ones are ordered by id
/// ascending no matter the key. Among running instances the key decides and
/// `reverse` flips only that comparison. The sort is stable, so sorting an
/// already sorted slice again leaves it unchanged.
pub fn sort_instances(
    instances: &mut [&Instance],
    key: SortKey,
    reverse: bool,
    rates: &RateEstimator<'_>,
) {
    instances.sort_by(|a, b| compare(a, b, key, reverse, rates));
}

fn compare(
    a: &Instance,
    b: &Instance,
    key: SortKey,
    reverse: bool,
    rates: &RateEstimator<'_>,
) -> Ordering {
    match (a.is_running(), b.is_running()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.id.cmp(&b.id),
        (true, true) => {
            let ord = match key {
                SortKey::Id => a.id.cmp(&b.id),
                SortKey::Name => a.name.cmp(&b.name),
                SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
                SortKey::Cpu => a.cpu.total_cmp(&b.cpu),
                SortKey::Memory => a.mem_percent().total_cmp(&b.mem_percent()),
                SortKey::DiskRate => rates.disk_rate(a).total_cmp(&rates.disk_rate(b)),
                SortKey::NetRate => rates.net_rate(a).total_cmp(&rates.net_rate(b)),
            };
            if reverse {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}
