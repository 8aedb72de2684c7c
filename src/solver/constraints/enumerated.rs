use std::collections::HashSet;

use crate::{
    error::Result,
    solver::{
        constraint::{ConstraintDescriptor, Propagation},
        csp::VariableId,
        variable::Variable,
    },
};

/// A binary constraint given in extension: the set of feasible `(a, b)`
/// value pairs over `(var1, var2)`, materialized at construction from the
/// variables' initial domains and a caller-supplied predicate.
#[derive(Debug, Clone)]
pub struct EnumeratedConstraint {
    vars: [VariableId; 2],
    feasible_pairs: HashSet<(i64, i64)>,
}

impl EnumeratedConstraint {
    /// Enumerates the cartesian product of the two initial domains and
    /// keeps the pairs accepted by `pred`.
    pub fn from_domains(
        var1: VariableId,
        var2: VariableId,
        dom1: &[i64],
        dom2: &[i64],
        pred: impl Fn(i64, i64) -> bool,
    ) -> Self {
        let mut feasible_pairs = HashSet::new();
        for &a in dom1 {
            for &b in dom2 {
                if pred(a, b) {
                    feasible_pairs.insert((a, b));
                }
            }
        }
        Self {
            vars: [var1, var2],
            feasible_pairs,
        }
    }

    /// Builds the constraint from an explicit pair set.
    pub fn from_pairs(
        var1: VariableId,
        var2: VariableId,
        pairs: impl IntoIterator<Item = (i64, i64)>,
    ) -> Self {
        Self {
            vars: [var1, var2],
            feasible_pairs: pairs.into_iter().collect(),
        }
    }

    pub fn scope(&self) -> &[VariableId] {
        &self.vars
    }

    pub fn vars(&self) -> [VariableId; 2] {
        self.vars
    }

    pub fn pair_count(&self) -> usize {
        self.feasible_pairs.len()
    }

    pub fn feasible(&self, a: i64, b: i64) -> bool {
        self.feasible_pairs.contains(&(a, b))
    }

    /// The symmetric constraint with variable roles swapped.
    pub fn reverse(&self) -> Self {
        Self {
            vars: [self.vars[1], self.vars[0]],
            feasible_pairs: self.feasible_pairs.iter().map(|&(a, b)| (b, a)).collect(),
        }
    }

    pub fn is_feasible(&self, assignments: &[Option<i64>]) -> bool {
        match (assignments[self.vars[0]], assignments[self.vars[1]]) {
            (Some(a), Some(b)) => self.feasible(a, b),
            _ => true,
        }
    }

    pub(crate) fn propagate(
        &self,
        assigned: VariableId,
        assigned_value: i64,
        assignments: &[Option<i64>],
        vars: &mut [Variable],
        level: usize,
    ) -> Result<Propagation> {
        let other = if assigned == self.vars[0] {
            self.vars[1]
        } else {
            self.vars[0]
        };

        if assignments[other].is_some() {
            return Ok(Propagation::Pruned(0));
        }

        let mut pruned = 0;
        let candidates: Vec<i64> = vars[other].live(level + 1).to_vec();
        for value in candidates {
            let feasible = if other == self.vars[1] {
                self.feasible(assigned_value, value)
            } else {
                self.feasible(value, assigned_value)
            };
            if !feasible {
                vars[other].remove(value, level + 1)?;
                pruned += 1;
                if vars[other].live_size(level + 1) == 0 {
                    return Ok(Propagation::Contradiction);
                }
            }
        }

        Ok(Propagation::Pruned(pruned))
    }

    pub fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "Enumerated".to_string(),
            description: format!(
                "(?{}, ?{}) in {} pairs",
                self.vars[0],
                self.vars[1],
                self.feasible_pairs.len()
            ),
        }
    }
}
