//! Width-driven column selection.

/// Width of the gap that follows every column.
pub const SEPARATOR_WIDTH: usize = 1;

/// A table column and the space it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec<C> {
    pub column: C,
    /// Display width including the trailing separator.
    pub width: usize,
    /// Mandatory columns are never hidden.
    pub mandatory: bool,
}

impl<C> ColumnSpec<C> {
    pub const fn mandatory(column: C, width: usize) -> Self {
        Self {
            column,
            width,
            mandatory: true,
        }
    }

    pub const fn optional(column: C, width: usize) -> Self {
        Self {
            column,
            width,
            mandatory: false,
        }
    }

    /// Width of the text field itself.
    pub fn field_width(&self) -> usize {
        self.width.saturating_sub(SEPARATOR_WIDTH)
    }
}

/// Picks which columns of a table fit into the available width.
///
/// Columns listed in the sacrifice list are hidden one at a time, in order,
/// until the row fits. Columns the list never names stay visible even if the
/// row still overflows. There is no hysteresis: every call starts from the
/// full column set.
#[derive(Debug, Clone, Copy)]
pub struct LayoutPlanner<'a, C> {
    columns: &'a [ColumnSpec<C>],
    sacrifice: &'a [C],
}

impl<'a, C: Copy + PartialEq> LayoutPlanner<'a, C> {
    /// `columns` is in display order.
    pub fn new(columns: &'a [ColumnSpec<C>], sacrifice: &'a [C]) -> Self {
        Self { columns, sacrifice }
    }

    /// Visible columns, in display order, for a terminal `available` cells wide.
    pub fn plan(&self, available: usize) -> Vec<ColumnSpec<C>> {
        let mut hidden: Vec<C> = Vec::new();
        let mut total = self.full_width();

        for &victim in self.sacrifice {
            if total <= available {
                break;
            }
            let Some(spec) = self.columns.iter().find(|c| c.column == victim) else {
                continue;
            };
            if spec.mandatory || hidden.contains(&victim) {
                continue;
            }
            hidden.push(victim);
            total = total.saturating_sub(spec.width);
        }

        self.columns
            .iter()
            .filter(|c| !hidden.contains(&c.column))
            .copied()
            .collect()
    }

    /// Width of all columns shown together.
    pub fn full_width(&self) -> usize {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Width of the mandatory columns alone.
    pub fn mandatory_width(&self) -> usize {
        self.columns.iter().filter(|c| c.mandatory).map(|c| c.width).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Col {
        Id,
        Name,
        Cpu,
        Mem,
        Disk,
        Node,
    }

    const COLUMNS: [ColumnSpec<Col>; 6] = [
        ColumnSpec::optional(Col::Id, 7),
        ColumnSpec::mandatory(Col::Name, 21),
        ColumnSpec::optional(Col::Cpu, 7),
        ColumnSpec::optional(Col::Mem, 7),
        ColumnSpec::optional(Col::Disk, 14),
        ColumnSpec::mandatory(Col::Node, 9),
    ];
    const SACRIFICE: [Col; 4] = [Col::Disk, Col::Id, Col::Mem, Col::Cpu];

    fn visible(width: usize) -> Vec<Col> {
        LayoutPlanner::new(&COLUMNS, &SACRIFICE)
            .plan(width)
            .into_iter()
            .map(|c| c.column)
            .collect()
    }

    #[test]
    fn test_field_width_excludes_separator() {
        assert_eq!(COLUMNS[1].field_width(), 20);
    }

    #[test]
    fn test_everything_fits_on_wide_terminal() {
        let sum: usize = COLUMNS.iter().map(|c| c.width).sum();
        assert_eq!(visible(sum).len(), COLUMNS.len());
        assert_eq!(visible(500).len(), COLUMNS.len());
    }

    #[test]
    fn test_narrow_terminal_keeps_only_mandatory() {
        let planner = LayoutPlanner::new(&COLUMNS, &SACRIFICE);
        assert_eq!(planner.mandatory_width(), 30);
        assert_eq!(visible(30), vec![Col::Name, Col::Node]);
        assert_eq!(visible(10), vec![Col::Name, Col::Node]);
        assert_eq!(visible(0), vec![Col::Name, Col::Node]);
    }

    #[test]
    fn test_drops_in_sacrifice_order_and_stops_early() {
        let full = LayoutPlanner::new(&COLUMNS, &SACRIFICE).full_width();
        assert_eq!(full, 65);
        // one cell short: only DISK goes
        assert_eq!(
            visible(full - 1),
            vec![Col::Id, Col::Name, Col::Cpu, Col::Mem, Col::Node]
        );
        // without DISK and ID: 21 + 7 + 7 + 9
        assert_eq!(visible(44), vec![Col::Name, Col::Cpu, Col::Mem, Col::Node]);
        assert_eq!(visible(43), vec![Col::Name, Col::Cpu, Col::Node]);
    }

    #[test]
    fn test_mandatory_never_hidden_for_any_width() {
        for width in 0..100 {
            let cols = visible(width);
            assert!(cols.contains(&Col::Name));
            assert!(cols.contains(&Col::Node));
        }
    }

    #[test]
    fn test_exhausted_sacrifice_list_leaves_rest_visible() {
        let sacrifice = [Col::Disk];
        let cols: Vec<Col> = LayoutPlanner::new(&COLUMNS, &sacrifice)
            .plan(0)
            .into_iter()
            .map(|c| c.column)
            .collect();
        assert_eq!(cols, vec![Col::Id, Col::Name, Col::Cpu, Col::Mem, Col::Node]);
    }

    #[test]
    fn test_sacrifice_list_naming_mandatory_column_is_ignored() {
        let sacrifice = [Col::Name, Col::Disk];
        let cols: Vec<Col> = LayoutPlanner::new(&COLUMNS, &sacrifice)
            .plan(0)
            .into_iter()
            .map(|c| c.column)
            .collect();
        assert!(cols.contains(&Col::Name));
        assert!(!cols.contains(&Col::Disk));
    }
}
