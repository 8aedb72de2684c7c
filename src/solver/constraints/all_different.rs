use std::collections::HashSet;

use crate::{
    error::Result,
    solver::{
        constraint::{ConstraintDescriptor, Propagation},
        csp::VariableId,
        variable::Variable,
    },
};

/// An n-ary constraint requiring pairwise distinct values over its scope.
///
/// Propagation is the cheap variant: a freshly committed value is removed
/// from the live domains of every other unassigned scope member. No
/// stronger matching-based filtering is attempted.
#[derive(Debug, Clone)]
pub struct AllDifferentConstraint {
    vars: Vec<VariableId>,
}

impl AllDifferentConstraint {
    pub fn new(vars: Vec<VariableId>) -> Self {
        Self { vars }
    }

    pub fn scope(&self) -> &[VariableId] {
        &self.vars
    }

    /// True when the committed values of the scope are pairwise distinct,
    /// ignoring unassigned members.
    pub fn is_feasible(&self, assignments: &[Option<i64>]) -> bool {
        let mut seen = HashSet::new();
        self.vars
            .iter()
            .filter_map(|&v| assignments[v])
            .all(|value| seen.insert(value))
    }

    pub(crate) fn propagate(
        &self,
        assigned: VariableId,
        assigned_value: i64,
        assignments: &[Option<i64>],
        vars: &mut [Variable],
        level: usize,
    ) -> Result<Propagation> {
        let mut pruned = 0;
        for &other in &self.vars {
            if other == assigned || assignments[other].is_some() {
                continue;
            }
            if vars[other].contains(assigned_value, level + 1) {
                vars[other].remove(assigned_value, level + 1)?;
                pruned += 1;
                if vars[other].live_size(level + 1) == 0 {
                    return Ok(Propagation::Contradiction);
                }
            }
        }
        Ok(Propagation::Pruned(pruned))
    }

    pub fn descriptor(&self) -> ConstraintDescriptor {
        let vars_str = self
            .vars
            .iter()
            .map(|v| format!("?{}", v))
            .collect::<Vec<_>>()
            .join(", ");
        ConstraintDescriptor {
            name: "AllDifferent".to_string(),
            description: format!("AllDifferent({})", vars_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::AllDifferentConstraint;
    use crate::solver::{constraint::Propagation, variable::Variable};

    fn vars(n: usize, min: i64, max: i64) -> Vec<Variable> {
        (0..n)
            .map(|id| {
                let mut var = Variable::new(id, format!("x{id}"), min, max).unwrap();
                var.init_levels(n);
                var.push_level(0);
                var
            })
            .collect()
    }

    #[test]
    fn feasibility_ignores_unassigned_members() {
        let c = AllDifferentConstraint::new(vec![0, 1, 2]);
        assert!(c.is_feasible(&[Some(1), None, Some(2)]));
        assert!(!c.is_feasible(&[Some(1), Some(1), None]));
        assert!(c.is_feasible(&[None, None, None]));
    }

    #[test]
    fn committed_value_is_removed_from_the_other_members() {
        let mut vs = vars(3, 1, 3);
        let c = AllDifferentConstraint::new(vec![0, 1, 2]);
        let assignments = vec![Some(2), None, None];
        let outcome = c.propagate(0, 2, &assignments, &mut vs, 0).unwrap();
        assert_eq!(outcome, Propagation::Pruned(2));
        assert!(!vs[1].contains(2, 1));
        assert!(!vs[2].contains(2, 1));
        assert_eq!(vs[1].live_size(1), 2);
    }

    #[test]
    fn already_assigned_members_are_skipped() {
        let mut vs = vars(3, 1, 3);
        let c = AllDifferentConstraint::new(vec![0, 1, 2]);
        let assignments = vec![Some(2), Some(3), None];
        let outcome = c.propagate(0, 2, &assignments, &mut vs, 0).unwrap();
        assert_eq!(outcome, Propagation::Pruned(1));
        // var 1 is assigned, its stored domain is left alone
        assert!(vs[1].contains(2, 1));
    }

    #[test]
    fn wiping_a_member_is_a_contradiction() {
        let mut vs = vars(2, 1, 1);
        let c = AllDifferentConstraint::new(vec![0, 1]);
        let assignments = vec![Some(1), None];
        let outcome = c.propagate(0, 1, &assignments, &mut vs, 0).unwrap();
        assert_eq!(outcome, Propagation::Contradiction);
    }
}
