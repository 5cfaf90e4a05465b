//! Column sets of the guest and host tables.
//!
//! Widths include the trailing separator, so a row with every column shown is
//! exactly [`LayoutPlanner::full_width`] cells wide.

use crate::data::{ColumnSpec, LayoutPlanner, SortKey};

/// Horizontal alignment of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceColumn {
    Id,
    Name,
    Kind,
    Status,
    Cpu,
    Mem,
    MemGib,
    Disk,
    Net,
    Node,
}

pub const INSTANCE_COLUMNS: [ColumnSpec<InstanceColumn>; 10] = [
    ColumnSpec::optional(InstanceColumn::Id, 7),
    ColumnSpec::mandatory(InstanceColumn::Name, 21),
    ColumnSpec::optional(InstanceColumn::Kind, 7),
    ColumnSpec::optional(InstanceColumn::Status, 9),
    ColumnSpec::optional(InstanceColumn::Cpu, 7),
    ColumnSpec::optional(InstanceColumn::Mem, 7),
    ColumnSpec::optional(InstanceColumn::MemGib, 16),
    ColumnSpec::optional(InstanceColumn::Disk, 14),
    ColumnSpec::optional(InstanceColumn::Net, 14),
    ColumnSpec::mandatory(InstanceColumn::Node, 9),
];

pub const INSTANCE_SACRIFICE: [InstanceColumn; 8] = [
    InstanceColumn::Disk,
    InstanceColumn::Net,
    InstanceColumn::MemGib,
    InstanceColumn::Id,
    InstanceColumn::Status,
    InstanceColumn::Kind,
    InstanceColumn::Mem,
    InstanceColumn::Cpu,
];

impl InstanceColumn {
    pub fn title(&self) -> &'static str {
        match self {
            InstanceColumn::Id => "ID",
            InstanceColumn::Name => "NAME",
            InstanceColumn::Kind => "TYPE",
            InstanceColumn::Status => "STATUS",
            InstanceColumn::Cpu => "CPU%",
            InstanceColumn::Mem => "MEM%",
            InstanceColumn::MemGib => "MEM(GiB)",
            InstanceColumn::Disk => "DISK(KiB/s)",
            InstanceColumn::Net => "NET(KiB/s)",
            InstanceColumn::Node => "NODE",
        }
    }

    pub fn align(&self) -> Align {
        match self {
            InstanceColumn::Id
            | InstanceColumn::Name
            | InstanceColumn::Kind
            | InstanceColumn::Status
            | InstanceColumn::Node => Align::Left,
            _ => Align::Right,
        }
    }

    /// The sort key whose arrow is drawn on this column's header.
    pub fn sort_key(&self) -> Option<SortKey> {
        match self {
            InstanceColumn::Id => Some(SortKey::Id),
            InstanceColumn::Name => Some(SortKey::Name),
            InstanceColumn::Status => Some(SortKey::Status),
            InstanceColumn::Cpu => Some(SortKey::Cpu),
            InstanceColumn::Mem => Some(SortKey::Memory),
            InstanceColumn::Disk => Some(SortKey::DiskRate),
            InstanceColumn::Net => Some(SortKey::NetRate),
            InstanceColumn::Kind | InstanceColumn::MemGib | InstanceColumn::Node => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostColumn {
    Node,
    Status,
    Cpu,
    Mem,
    MemGib,
    Disk,
    Net,
    Vms,
    Cts,
}

pub const HOST_COLUMNS: [ColumnSpec<HostColumn>; 9] = [
    ColumnSpec::mandatory(HostColumn::Node, 13),
    ColumnSpec::optional(HostColumn::Status, 9),
    ColumnSpec::optional(HostColumn::Cpu, 7),
    ColumnSpec::optional(HostColumn::Mem, 7),
    ColumnSpec::optional(HostColumn::MemGib, 16),
    ColumnSpec::optional(HostColumn::Disk, 14),
    ColumnSpec::optional(HostColumn::Net, 14),
    ColumnSpec::optional(HostColumn::Vms, 7),
    ColumnSpec::optional(HostColumn::Cts, 7),
];

pub const HOST_SACRIFICE: [HostColumn; 8] = [
    HostColumn::Disk,
    HostColumn::Net,
    HostColumn::MemGib,
    HostColumn::Vms,
    HostColumn::Cts,
    HostColumn::Status,
    HostColumn::Mem,
    HostColumn::Cpu,
];

impl HostColumn {
    pub fn title(&self) -> &'static str {
        match self {
            HostColumn::Node => "NODE",
            HostColumn::Status => "STATUS",
            HostColumn::Cpu => "CPU%",
            HostColumn::Mem => "MEM%",
            HostColumn::MemGib => "MEM(GiB)",
            HostColumn::Disk => "DISK(KiB/s)",
            HostColumn::Net => "NET(KiB/s)",
            HostColumn::Vms => "#VMs",
            HostColumn::Cts => "#CTs",
        }
    }

    pub fn align(&self) -> Align {
        match self {
            HostColumn::Node | HostColumn::Status => Align::Left,
            _ => Align::Right,
        }
    }
}

pub fn instance_planner() -> LayoutPlanner<'static, InstanceColumn> {
    LayoutPlanner::new(&INSTANCE_COLUMNS, &INSTANCE_SACRIFICE)
}

pub fn host_planner() -> LayoutPlanner<'static, HostColumn> {
    LayoutPlanner::new(&HOST_COLUMNS, &HOST_SACRIFICE)
}
