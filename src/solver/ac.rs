//! Arc-consistency over the binary constraints of a problem.
//!
//! Both algorithms work on directed arcs: every binary constraint yields
//! the arc `(var1, var2)` and its reverse. All-different constraints are
//! n-ary and are not revised here; their filtering happens during search
//! through their local propagator.

use std::collections::{HashMap, VecDeque};

use tracing::trace;

use crate::{
    error::Result,
    solver::{
        constraint::Constraint,
        csp::{ConstraintId, VariableId},
        stats::SearchStats,
        variable::Variable,
        work_list::ArcQueue,
    },
};

/// One direction of a binary constraint. `forward` arcs revise `var1`
/// against `var2`; reverse arcs swap the roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectedArc {
    pub constraint: ConstraintId,
    pub x: VariableId,
    pub y: VariableId,
    pub forward: bool,
}

impl DirectedArc {
    /// Feasibility of value `a` of `x` with value `b` of `y` under the
    /// arc's constraint.
    fn feasible(&self, constraint: &Constraint, a: i64, b: i64) -> bool {
        if self.forward {
            constraint.pair_feasible(a, b)
        } else {
            constraint.pair_feasible(b, a)
        }
    }
}

/// The two directed arcs of every binary constraint, in registry order.
pub fn collect_arcs(constraints: &[Constraint]) -> Vec<DirectedArc> {
    let mut arcs = Vec::new();
    for (id, constraint) in constraints.iter().enumerate() {
        if let Some([v1, v2]) = constraint.binary_vars() {
            arcs.push(DirectedArc {
                constraint: id,
                x: v1,
                y: v2,
                forward: true,
            });
            arcs.push(DirectedArc {
                constraint: id,
                x: v2,
                y: v1,
                forward: false,
            });
        }
    }
    arcs
}

/// AC-3: revises arcs from a worklist until it drains, re-enqueueing the
/// arcs pointing at any variable whose domain shrank. Returns `false` as
/// soon as some live domain at `level` is wiped out.
pub fn ac3(
    vars: &mut [Variable],
    constraints: &[Constraint],
    arcs: &[DirectedArc],
    level: usize,
    stats: &mut SearchStats,
) -> Result<bool> {
    let mut queue = ArcQueue::new();
    for &arc in arcs {
        queue.push_back(arc);
    }

    while let Some(arc) = queue.pop_front() {
        let constraint = &constraints[arc.constraint];
        let started = std::time::Instant::now();
        let constraint_stats = stats.constraint_stats.entry(arc.constraint).or_default();
        constraint_stats.revisions += 1;

        let mut removed_any = false;
        let candidates: Vec<i64> = vars[arc.x].live(level).to_vec();
        for a in candidates {
            let supported = vars[arc.y]
                .live(level)
                .iter()
                .any(|&b| arc.feasible(constraint, a, b));
            if !supported {
                trace!(var = arc.x, value = a, level, "unsupported value removed");
                vars[arc.x].remove(a, level)?;
                removed_any = true;
            }
        }

        if removed_any {
            constraint_stats.prunings += 1;
        }
        constraint_stats.time_spent_micros += started.elapsed().as_micros() as u64;

        if vars[arc.x].live_size(level) == 0 {
            return Ok(false);
        }

        if removed_any {
            for &other in arcs {
                if other.y == arc.x && other.x != arc.y {
                    queue.push_back(other);
                }
            }
        }
    }

    Ok(true)
}

/// AC-4: counts the supporters of every arc/value pair once, then drains a
/// queue of removed values, decrementing the counters of the values they
/// supported. Returns `false` as soon as some live domain at `level` is
/// wiped out.
pub fn ac4(
    vars: &mut [Variable],
    constraints: &[Constraint],
    arcs: &[DirectedArc],
    level: usize,
    stats: &mut SearchStats,
) -> Result<bool> {
    // supporters[(y, b)] lists every (arc, a) pair that b supports;
    // counters[(arc, a)] is the number of live supporters of a on that arc.
    let mut supporters: HashMap<(VariableId, i64), Vec<(usize, i64)>> = HashMap::new();
    let mut counters: HashMap<(usize, i64), u32> = HashMap::new();
    let mut queue: VecDeque<(VariableId, i64)> = VecDeque::new();

    for (arc_idx, arc) in arcs.iter().enumerate() {
        let constraint = &constraints[arc.constraint];
        let started = std::time::Instant::now();
        let constraint_stats = stats.constraint_stats.entry(arc.constraint).or_default();
        constraint_stats.revisions += 1;

        let x_values: Vec<i64> = vars[arc.x].live(level).to_vec();
        let y_values: Vec<i64> = vars[arc.y].live(level).to_vec();
        for a in x_values {
            let mut total = 0;
            for &b in &y_values {
                if arc.feasible(constraint, a, b) {
                    total += 1;
                    supporters.entry((arc.y, b)).or_default().push((arc_idx, a));
                }
            }
            counters.insert((arc_idx, a), total);
            if total == 0 {
                trace!(var = arc.x, value = a, level, "no supporters at init");
                vars[arc.x].remove(a, level)?;
                constraint_stats.prunings += 1;
                if vars[arc.x].live_size(level) == 0 {
                    return Ok(false);
                }
                queue.push_back((arc.x, a));
            }
        }
        stats
            .constraint_stats
            .entry(arc.constraint)
            .or_default()
            .time_spent_micros += started.elapsed().as_micros() as u64;
    }

    while let Some((y, b)) = queue.pop_front() {
        let Some(supported) = supporters.get(&(y, b)) else {
            continue;
        };
        for &(arc_idx, a) in supported {
            let Some(count) = counters.get_mut(&(arc_idx, a)) else {
                continue;
            };
            *count = count.saturating_sub(1);
            if *count == 0 {
                let x = arcs[arc_idx].x;
                if vars[x].contains(a, level) {
                    trace!(var = x, value = a, level, "last supporter lost");
                    vars[x].remove(a, level)?;
                    stats
                        .constraint_stats
                        .entry(arcs[arc_idx].constraint)
                        .or_default()
                        .prunings += 1;
                    if vars[x].live_size(level) == 0 {
                        return Ok(false);
                    }
                    queue.push_back((x, a));
                }
            }
        }
    }

    Ok(true)
}
