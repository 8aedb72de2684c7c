use std::collections::HashMap;

use crate::solver::{
    constraint::Constraint,
    csp::{ConstraintId, VariableId},
    variable::Variable,
};

/// Static incidence information, rebuilt at the start of every solve.
///
/// The matrix and the support counters cover binary constraints only; the
/// per-variable constraint lists cover every variant so the driver can
/// find the constraints touched by a fresh assignment.
#[derive(Debug, Clone, Default)]
pub struct IncidenceIndex {
    linked: Vec<Vec<bool>>,
    incident: Vec<Vec<ConstraintId>>,
    support_counts: Vec<HashMap<i64, u32>>,
}

impl IncidenceIndex {
    /// Builds the index from the current constraints. Support counters are
    /// taken over the level-0 live domains, so a root consistency pass run
    /// beforehand is reflected in the counts.
    pub fn build(vars: &[Variable], constraints: &[Constraint]) -> Self {
        let n = vars.len();
        let mut linked = vec![vec![false; n]; n];
        let mut incident = vec![Vec::new(); n];
        let mut support_counts: Vec<HashMap<i64, u32>> = vars
            .iter()
            .map(|var| var.initial_domain().iter().map(|&v| (v, 0)).collect())
            .collect();

        for (id, constraint) in constraints.iter().enumerate() {
            for &var in constraint.scope() {
                if !incident[var].contains(&id) {
                    incident[var].push(id);
                }
            }
            if let Some([v1, v2]) = constraint.binary_vars() {
                // a unary-shaped constraint links no pair of variables
                if v1 != v2 {
                    linked[v1][v2] = true;
                    linked[v2][v1] = true;
                }
                for &a in vars[v1].live(0) {
                    for &b in vars[v2].live(0) {
                        if constraint.pair_feasible(a, b) {
                            *support_counts[v1].entry(a).or_insert(0) += 1;
                            *support_counts[v2].entry(b).or_insert(0) += 1;
                        }
                    }
                }
            }
        }

        Self {
            linked,
            incident,
            support_counts,
        }
    }

    /// Whether some binary constraint links the two variables.
    pub fn linked(&self, a: VariableId, b: VariableId) -> bool {
        self.linked[a][b]
    }

    /// Number of distinct variables sharing a binary constraint with `var`.
    pub fn degree(&self, var: VariableId) -> usize {
        self.linked[var].iter().filter(|&&l| l).count()
    }

    /// Every constraint whose scope contains `var`.
    pub fn incident(&self, var: VariableId) -> &[ConstraintId] {
        &self.incident[var]
    }

    /// How many binary-constraint pairings support `value` of `var`.
    pub fn support_count(&self, var: VariableId, value: i64) -> u32 {
        self.support_counts[var].get(&value).copied().unwrap_or(0)
    }
}
