use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    solver::{
        constraint::{ConstraintDescriptor, Propagation},
        csp::VariableId,
        variable::Variable,
    },
};

/// The comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelOp {
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl RelOp {
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            RelOp::Eq => lhs == rhs,
            RelOp::Neq => lhs != rhs,
            RelOp::Lt => lhs < rhs,
            RelOp::Leq => lhs <= rhs,
            RelOp::Gt => lhs > rhs,
            RelOp::Geq => lhs >= rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Eq => "==",
            RelOp::Neq => "!=",
            RelOp::Lt => "<",
            RelOp::Leq => "<=",
            RelOp::Gt => ">",
            RelOp::Geq => ">=",
        }
    }
}

/// A binary linear constraint `coef1·x1 + coef2·x2 RELOP rhs` over two
/// integer variables with real coefficients.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    vars: [VariableId; 2],
    coef1: f64,
    coef2: f64,
    relop: RelOp,
    rhs: f64,
}

impl LinearConstraint {
    pub fn new(
        var1: VariableId,
        var2: VariableId,
        coef1: f64,
        coef2: f64,
        relop: RelOp,
        rhs: f64,
    ) -> Self {
        Self {
            vars: [var1, var2],
            coef1,
            coef2,
            relop,
            rhs,
        }
    }

    pub fn scope(&self) -> &[VariableId] {
        &self.vars
    }

    pub fn vars(&self) -> [VariableId; 2] {
        self.vars
    }

    pub fn relop(&self) -> RelOp {
        self.relop
    }

    /// Feasibility of the value pair `(a, b)` for `(var1, var2)`.
    pub fn feasible(&self, a: i64, b: i64) -> bool {
        self.relop
            .holds(self.coef1 * a as f64 + self.coef2 * b as f64, self.rhs)
    }

    /// The symmetric constraint with variable roles swapped.
    pub fn reverse(&self) -> Self {
        Self {
            vars: [self.vars[1], self.vars[0]],
            coef1: self.coef2,
            coef2: self.coef1,
            relop: self.relop,
            rhs: self.rhs,
        }
    }

    /// True when the constraint holds on the committed values, vacuously
    /// true while either variable is unassigned.
    pub fn is_feasible(&self, assignments: &[Option<i64>]) -> bool {
        match (assignments[self.vars[0]], assignments[self.vars[1]]) {
            (Some(a), Some(b)) => self.feasible(a, b),
            _ => true,
        }
    }

    /// Substitutes the committed value of `assigned` and prunes the other
    /// variable's live domain at `level + 1`.
    pub(crate) fn propagate(
        &self,
        assigned: VariableId,
        assigned_value: i64,
        assignments: &[Option<i64>],
        vars: &mut [Variable],
        level: usize,
    ) -> Result<Propagation> {
        let (other, coef_assigned, coef_other) = if assigned == self.vars[0] {
            (self.vars[1], self.coef1, self.coef2)
        } else {
            (self.vars[0], self.coef2, self.coef1)
        };

        // Unary shape: both slots name the same variable, so the committed
        // value decides feasibility outright.
        if other == assigned {
            return if self.feasible(assigned_value, assigned_value) {
                Ok(Propagation::Pruned(0))
            } else {
                Ok(Propagation::Contradiction)
            };
        }

        if assignments[other].is_some() {
            return Ok(Propagation::Pruned(0));
        }

        let updated_rhs = self.rhs - coef_assigned * assigned_value as f64;

        // Degenerate scope: with no remaining coefficient the residual
        // comparison either always holds or never does.
        if coef_other == 0.0 {
            return if self.relop.holds(0.0, updated_rhs) {
                Ok(Propagation::Pruned(0))
            } else {
                Ok(Propagation::Contradiction)
            };
        }

        let mut pruned = 0;
        let candidates: Vec<i64> = vars[other].live(level + 1).to_vec();
        for value in candidates {
            if !self.relop.holds(coef_other * value as f64, updated_rhs) {
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
            name: "Linear".to_string(),
            description: format!(
                "{}*?{} + {}*?{} {} {}",
                self.coef1,
                self.vars[0],
                self.coef2,
                self.vars[1],
                self.relop.symbol(),
                self.rhs
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{LinearConstraint, RelOp};
    use crate::solver::{constraint::Propagation, variable::Variable};

    fn vars(ranges: &[(i64, i64)]) -> Vec<Variable> {
        ranges
            .iter()
            .enumerate()
            .map(|(id, &(min, max))| {
                let mut var = Variable::new(id, format!("x{id}"), min, max).unwrap();
                var.init_levels(ranges.len());
                var
            })
            .collect()
    }

    #[test]
    fn relop_holds() {
        assert!(RelOp::Leq.holds(2.0, 2.0));
        assert!(!RelOp::Lt.holds(2.0, 2.0));
        assert!(RelOp::Neq.holds(1.0, 2.0));
        assert!(RelOp::Geq.holds(3.0, 2.0));
    }

    #[test]
    fn feasibility_is_vacuous_on_partial_assignments() {
        // x + y == 3
        let c = LinearConstraint::new(0, 1, 1.0, 1.0, RelOp::Eq, 3.0);
        assert!(c.is_feasible(&[Some(1), None]));
        assert!(c.is_feasible(&[Some(1), Some(2)]));
        assert!(!c.is_feasible(&[Some(2), Some(2)]));
    }

    #[test]
    fn propagation_prunes_violating_values() {
        // x - y <= 0, i.e. x <= y
        let mut vs = vars(&[(0, 5), (0, 5)]);
        let c = LinearConstraint::new(0, 1, 1.0, -1.0, RelOp::Leq, 0.0);
        for var in vs.iter_mut() {
            var.push_level(0);
        }
        let assignments = vec![Some(3), None];
        let outcome = c.propagate(0, 3, &assignments, &mut vs, 0).unwrap();
        assert_eq!(outcome, Propagation::Pruned(3));
        let mut live = vs[1].live(1).to_vec();
        live.sort_unstable();
        assert_eq!(live, vec![3, 4, 5]);
    }

    #[test]
    fn negative_coefficient_prunes_on_the_correct_side() {
        // -2*y + x >= 0 with x assigned 3: y must satisfy -2*y >= -3
        let mut vs = vars(&[(0, 5), (0, 5)]);
        let c = LinearConstraint::new(1, 0, -2.0, 1.0, RelOp::Geq, 0.0);
        for var in vs.iter_mut() {
            var.push_level(0);
        }
        let assignments = vec![Some(3), None];
        let outcome = c.propagate(0, 3, &assignments, &mut vs, 0).unwrap();
        assert_eq!(outcome, Propagation::Pruned(4));
        let mut live = vs[1].live(1).to_vec();
        live.sort_unstable();
        assert_eq!(live, vec![0, 1]);
    }

    #[test]
    fn domain_wipeout_is_a_contradiction() {
        // x + y == 20 is impossible over [0,5] x [0,5]
        let mut vs = vars(&[(0, 5), (0, 5)]);
        let c = LinearConstraint::new(0, 1, 1.0, 1.0, RelOp::Eq, 20.0);
        for var in vs.iter_mut() {
            var.push_level(0);
        }
        let assignments = vec![Some(5), None];
        let outcome = c.propagate(0, 5, &assignments, &mut vs, 0).unwrap();
        assert_eq!(outcome, Propagation::Contradiction);
    }

    #[test]
    fn zero_remaining_coefficient_degenerates() {
        let mut vs = vars(&[(0, 5), (0, 5)]);
        for var in vs.iter_mut() {
            var.push_level(0);
        }
        let assignments = vec![Some(1), None];

        // x + 0*y == 1 with x = 1 stays satisfiable, nothing to prune
        let sat = LinearConstraint::new(0, 1, 1.0, 0.0, RelOp::Eq, 1.0);
        assert_eq!(
            sat.propagate(0, 1, &assignments, &mut vs, 0).unwrap(),
            Propagation::Pruned(0)
        );

        // x + 0*y == 2 with x = 1 can never hold
        let unsat = LinearConstraint::new(0, 1, 1.0, 0.0, RelOp::Eq, 2.0);
        assert_eq!(
            unsat.propagate(0, 1, &assignments, &mut vs, 0).unwrap(),
            Propagation::Contradiction
        );
    }

    #[test]
    fn unary_shape_checks_the_committed_value() {
        let mut vs = vars(&[(0, 5)]);
        let c = LinearConstraint::new(0, 0, 1.0, 0.0, RelOp::Eq, 3.0);

        let assignments = vec![Some(3)];
        assert_eq!(
            c.propagate(0, 3, &assignments, &mut vs, 0).unwrap(),
            Propagation::Pruned(0)
        );

        let assignments = vec![Some(2)];
        assert_eq!(
            c.propagate(0, 2, &assignments, &mut vs, 0).unwrap(),
            Propagation::Contradiction
        );
    }

    #[test]
    fn reverse_swaps_roles() {
        let c = LinearConstraint::new(0, 1, 2.0, -1.0, RelOp::Lt, 4.0);
        let r = c.reverse();
        assert_eq!(r.vars(), [1, 0]);
        for a in 0..4 {
            for b in 0..4 {
                assert_eq!(c.feasible(a, b), r.feasible(b, a));
            }
        }
    }
}
