//! The depth-first backtracking driver.
//!
//! One node of the search tree corresponds to one recursion level: the
//! driver snapshots every live domain into the next level, branches on a
//! variable picked by the configured heuristic and walks its value
//! ordering, running the configured look-ahead after each commitment.
//! Undoing a value is a single size-counter copy per variable.

use std::time::{Duration, Instant};

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    error::Result,
    solver::{
        ac::{ac3, ac4, DirectedArc},
        constraint::{Constraint, Propagation},
        csp::VariableId,
        heuristics::{
            value::{order_values, ValueSelection},
            variable::{select_variable, VariableSelection},
        },
        incidence::IncidenceIndex,
        stats::SearchStats,
        variable::Variable,
    },
};

/// The look-ahead run after each value commitment. Exactly one mode is
/// active per solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookAhead {
    /// Plain backtracking: the constraints incident to the fresh
    /// assignment are checked on committed values only.
    Bt,
    /// Forward checking: the incident constraints' propagators prune the
    /// unassigned neighbours.
    #[default]
    Fc,
    /// Maintained arc-consistency via AC-3 at every node.
    Mac3,
    /// Maintained arc-consistency via AC-4 at every node.
    Mac4,
}

/// The search state borrowed from the `Csp` for one `solve()` call.
pub(crate) struct Backtracker<'a> {
    pub vars: &'a mut [Variable],
    pub constraints: &'a [Constraint],
    pub arcs: &'a [DirectedArc],
    pub incidence: &'a IncidenceIndex,
    pub variable_selection: VariableSelection,
    pub value_selection: ValueSelection,
    pub look_ahead: LookAhead,
    pub assignments: &'a mut [Option<i64>],
    pub nb_assigned: &'a mut usize,
    pub stats: &'a mut SearchStats,
    pub rng: &'a mut ChaCha8Rng,
    pub started: Instant,
    pub time_limit: Option<Duration>,
    pub timed_out: &'a mut bool,
}

impl Backtracker<'_> {
    pub fn run(&mut self) -> Result<bool> {
        self.backtrack(0)
    }

    fn backtrack(&mut self, level: usize) -> Result<bool> {
        if *self.nb_assigned == self.vars.len() {
            return Ok(true);
        }
        if let Some(limit) = self.time_limit {
            if self.started.elapsed() >= limit {
                debug!(level, "time budget exhausted, unwinding");
                *self.timed_out = true;
                return Ok(false);
            }
        }
        self.stats.nodes_explored += 1;

        for var in self.vars.iter_mut() {
            var.push_level(level);
        }

        let var_id = select_variable(
            self.variable_selection,
            self.vars,
            self.assignments,
            self.incidence,
            level,
            self.rng,
        )?;
        let order = order_values(
            self.value_selection,
            &self.vars[var_id],
            self.incidence,
            level,
            self.rng,
        );
        trace!(level, var = var_id, candidates = order.len(), "branching");

        *self.nb_assigned += 1;
        for value in order {
            if !self.vars[var_id].contains(value, level) {
                continue;
            }
            self.assignments[var_id] = Some(value);
            self.vars[var_id].restrict_to(value, level + 1)?;

            let consistent = self.run_look_ahead(var_id, level)?;
            if consistent && self.backtrack(level + 1)? {
                return Ok(true);
            }

            self.stats.backtracks += 1;
            for var in self.vars.iter_mut() {
                var.push_level(level);
            }
        }

        trace!(level, var = var_id, "values exhausted, backtracking");
        self.assignments[var_id] = None;
        *self.nb_assigned -= 1;
        Ok(false)
    }

    /// Runs the configured look-ahead for the fresh assignment of
    /// `var_id`. Returns `false` when the subtree below is proven empty.
    fn run_look_ahead(&mut self, var_id: VariableId, level: usize) -> Result<bool> {
        match self.look_ahead {
            LookAhead::Bt => {
                for &cid in self.incidence.incident(var_id) {
                    if !self.constraints[cid].is_feasible(self.assignments) {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            LookAhead::Fc => {
                for &cid in self.incidence.incident(var_id) {
                    let started = Instant::now();
                    let outcome = self.constraints[cid].propagate(
                        cid,
                        var_id,
                        self.assignments,
                        self.vars,
                        level,
                    )?;
                    let constraint_stats = self.stats.constraint_stats.entry(cid).or_default();
                    constraint_stats.revisions += 1;
                    constraint_stats.time_spent_micros += started.elapsed().as_micros() as u64;
                    match outcome {
                        Propagation::Pruned(0) => {}
                        Propagation::Pruned(_) => constraint_stats.prunings += 1,
                        Propagation::Contradiction => return Ok(false),
                    }
                }
                Ok(true)
            }
            LookAhead::Mac3 => ac3(
                self.vars,
                self.constraints,
                self.arcs,
                level + 1,
                self.stats,
            ),
            LookAhead::Mac4 => ac4(
                self.vars,
                self.constraints,
                self.arcs,
                level + 1,
                self.stats,
            ),
        }
    }
}
