use std::collections::HashMap;

use prettytable::{Cell, Row, Table};
use serde::Serialize;

use crate::solver::{constraint::Constraint, csp::ConstraintId};

/// Holds performance counters for a single constraint.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct PerConstraintStats {
    /// How many times the constraint was revised (propagator run or arc
    /// revision).
    pub revisions: u64,
    /// How many revisions removed at least one value.
    pub prunings: u64,
    /// Total time spent revising, in microseconds.
    pub time_spent_micros: u64,
}

/// Counters for one whole search.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SearchStats {
    /// Nodes entered in the search tree.
    pub nodes_explored: u64,
    /// Value choices that failed and were undone.
    pub backtracks: u64,
    /// Per-constraint revision counters.
    pub constraint_stats: HashMap<ConstraintId, PerConstraintStats>,
}

/// Renders every constraint's counters as a text table in registry
/// order, closing with a totals row that also carries the node and
/// backtrack counts. Constraints that were never revised still get a
/// row, so silent ones stand out.
pub fn render_stats_table(stats: &SearchStats, constraints: &[Constraint]) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Constraint"),
        Cell::new("Revisions"),
        Cell::new("Prunings"),
        Cell::new("Prune rate"),
        Cell::new("Time (ms)"),
    ]));

    let mut totals = PerConstraintStats::default();
    for (id, constraint) in constraints.iter().enumerate() {
        let entry = stats
            .constraint_stats
            .get(&id)
            .copied()
            .unwrap_or_default();
        totals.revisions += entry.revisions;
        totals.prunings += entry.prunings;
        totals.time_spent_micros += entry.time_spent_micros;

        let descriptor = constraint.descriptor();
        table.add_row(counter_row(
            id.to_string(),
            format!("{}: {}", descriptor.name, descriptor.description),
            &entry,
        ));
    }

    table.add_row(counter_row(
        String::new(),
        format!(
            "total over {} nodes, {} backtracks",
            stats.nodes_explored, stats.backtracks
        ),
        &totals,
    ));

    table.to_string()
}

fn counter_row(id: String, label: String, entry: &PerConstraintStats) -> Row {
    Row::new(vec![
        Cell::new(&id),
        Cell::new(&label),
        Cell::new(&entry.revisions.to_string()),
        Cell::new(&entry.prunings.to_string()),
        Cell::new(&prune_rate(entry)),
        Cell::new(&format!("{:.3}", entry.time_spent_micros as f64 / 1000.0)),
    ])
}

/// Share of revisions that removed at least one value.
fn prune_rate(entry: &PerConstraintStats) -> String {
    if entry.revisions == 0 {
        "-".to_string()
    } else {
        format!("{:.0}%", 100.0 * entry.prunings as f64 / entry.revisions as f64)
    }
}
