use crate::{
    error::{Result, SolverError},
    solver::{
        constraints::{
            all_different::AllDifferentConstraint, enumerated::EnumeratedConstraint,
            linear::LinearConstraint,
        },
        csp::{ConstraintId, VariableId},
        variable::Variable,
    },
};

/// The outcome of one local propagation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Propagation completed; the count is the number of values removed.
    Pruned(usize),
    /// Some neighbour's live domain was wiped out.
    Contradiction,
}

/// A human-readable label for a constraint, used by the statistics table.
#[derive(Debug, Clone)]
pub struct ConstraintDescriptor {
    pub name: String,
    pub description: String,
}

/// A constraint of the problem, as a closed sum over the supported
/// variants. Binary variants additionally expose pairwise feasibility and
/// a `reverse()` view for the arc-consistency algorithms; all-different is
/// n-ary and takes no part in arc-consistency.
#[derive(Debug, Clone)]
pub enum Constraint {
    Enumerated(EnumeratedConstraint),
    Linear(LinearConstraint),
    AllDifferent(AllDifferentConstraint),
}

impl Constraint {
    pub fn scope(&self) -> &[VariableId] {
        match self {
            Constraint::Enumerated(c) => c.scope(),
            Constraint::Linear(c) => c.scope(),
            Constraint::AllDifferent(c) => c.scope(),
        }
    }

    /// The `(var1, var2)` pair of a binary constraint.
    pub fn binary_vars(&self) -> Option<[VariableId; 2]> {
        match self {
            Constraint::Enumerated(c) => Some(c.vars()),
            Constraint::Linear(c) => Some(c.vars()),
            Constraint::AllDifferent(_) => None,
        }
    }

    /// Feasibility of the value pair `(a, b)` for `(var1, var2)`. Only
    /// meaningful for binary constraints.
    pub fn pair_feasible(&self, a: i64, b: i64) -> bool {
        match self {
            Constraint::Enumerated(c) => c.feasible(a, b),
            Constraint::Linear(c) => c.feasible(a, b),
            Constraint::AllDifferent(_) => {
                unreachable!("all-different constraints have no binary arcs")
            }
        }
    }

    /// Tuple-level feasibility over the committed values of the scope.
    /// Unassigned scope members make the check vacuously true.
    pub fn is_feasible(&self, assignments: &[Option<i64>]) -> bool {
        match self {
            Constraint::Enumerated(c) => c.is_feasible(assignments),
            Constraint::Linear(c) => c.is_feasible(assignments),
            Constraint::AllDifferent(c) => c.is_feasible(assignments),
        }
    }

    /// Prunes the live domains of the unassigned scope neighbours of
    /// `assigned` at `level + 1`, given its committed value.
    ///
    /// Calling this for a variable outside the scope, or for a variable
    /// without a committed value, is a caller bug and fails loudly.
    pub fn propagate(
        &self,
        id: ConstraintId,
        assigned: VariableId,
        assignments: &[Option<i64>],
        vars: &mut [Variable],
        level: usize,
    ) -> Result<Propagation> {
        if !self.scope().contains(&assigned) {
            return Err(SolverError::VariableNotInScope {
                var: assigned,
                constraint: id,
            }
            .into());
        }
        let assigned_value = match assignments[assigned] {
            Some(value) => value,
            None => return Err(SolverError::UnassignedPropagation { var: assigned }.into()),
        };

        match self {
            Constraint::Enumerated(c) => {
                c.propagate(assigned, assigned_value, assignments, vars, level)
            }
            Constraint::Linear(c) => {
                c.propagate(assigned, assigned_value, assignments, vars, level)
            }
            Constraint::AllDifferent(c) => {
                c.propagate(assigned, assigned_value, assignments, vars, level)
            }
        }
    }

    pub fn descriptor(&self) -> ConstraintDescriptor {
        match self {
            Constraint::Enumerated(c) => c.descriptor(),
            Constraint::Linear(c) => c.descriptor(),
            Constraint::AllDifferent(c) => c.descriptor(),
        }
    }
}

impl From<EnumeratedConstraint> for Constraint {
    fn from(c: EnumeratedConstraint) -> Self {
        Constraint::Enumerated(c)
    }
}

impl From<LinearConstraint> for Constraint {
    fn from(c: LinearConstraint) -> Self {
        Constraint::Linear(c)
    }
}

impl From<AllDifferentConstraint> for Constraint {
    fn from(c: AllDifferentConstraint) -> Self {
        Constraint::AllDifferent(c)
    }
}

#[cfg(test)]
mod tests {
    use super::Constraint;
    use crate::{
        error::SolverError,
        solver::{constraints::enumerated::EnumeratedConstraint, variable::Variable},
    };

    #[test]
    fn propagate_rejects_a_variable_outside_the_scope() {
        let c: Constraint = EnumeratedConstraint::from_pairs(0, 1, [(1, 1)]).into();
        let mut vars = vec![
            Variable::new(0, "x", 1, 2).unwrap(),
            Variable::new(1, "y", 1, 2).unwrap(),
            Variable::new(2, "z", 1, 2).unwrap(),
        ];
        for var in vars.iter_mut() {
            var.init_levels(3);
        }
        let assignments = vec![None, None, Some(1)];
        let err = c.propagate(7, 2, &assignments, &mut vars, 0).unwrap_err();
        assert!(matches!(
            err.kind(),
            SolverError::VariableNotInScope { var: 2, constraint: 7 }
        ));
    }

    #[test]
    fn propagate_rejects_an_unassigned_variable() {
        let c: Constraint = EnumeratedConstraint::from_pairs(0, 1, [(1, 1)]).into();
        let mut vars = vec![
            Variable::new(0, "x", 1, 2).unwrap(),
            Variable::new(1, "y", 1, 2).unwrap(),
        ];
        for var in vars.iter_mut() {
            var.init_levels(2);
        }
        let assignments = vec![None, None];
        let err = c.propagate(0, 0, &assignments, &mut vars, 0).unwrap_err();
        assert!(matches!(
            err.kind(),
            SolverError::UnassignedPropagation { var: 0 }
        ));
    }
}
