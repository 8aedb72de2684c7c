use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Result, SolverError},
    solver::{
        ac::{ac3, ac4, collect_arcs},
        constraint::Constraint,
        constraints::{
            all_different::AllDifferentConstraint, enumerated::EnumeratedConstraint,
            linear::LinearConstraint,
        },
        expr::Var,
        heuristics::{value::ValueSelection, variable::VariableSelection},
        incidence::IncidenceIndex,
        search::{Backtracker, LookAhead},
        stats::SearchStats,
        variable::Variable,
    },
};

/// A numeric identifier for a single variable of the problem. Ids are
/// dense and assigned in insertion order.
pub type VariableId = usize;
/// A numeric identifier for a single constraint of the problem.
pub type ConstraintId = usize;

/// The arc-consistency algorithm used for a root-only preprocessing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcAlgorithm {
    Ac3,
    Ac4,
}

/// A finite-domain constraint satisfaction problem together with its
/// search configuration and the transient state of the last `solve()`.
///
/// Variables and constraints are appended during construction and never
/// deleted; domains are mutated only by the search. A `Csp` is not meant
/// to be shared across threads while solving.
#[derive(Debug, Clone)]
pub struct Csp {
    vars: Vec<Variable>,
    constraints: Vec<Constraint>,
    incidence: IncidenceIndex,
    variable_selection: VariableSelection,
    value_selection: ValueSelection,
    look_ahead: LookAhead,
    preprocessing: Option<AcAlgorithm>,
    time_limit: Option<Duration>,
    rng: ChaCha8Rng,
    assignments: Vec<Option<i64>>,
    nb_assigned: usize,
    stats: SearchStats,
    explore_time: Duration,
    timed_out: bool,
    feasible: bool,
}

impl Csp {
    pub fn new() -> Self {
        Self {
            vars: Vec::new(),
            constraints: Vec::new(),
            incidence: IncidenceIndex::default(),
            variable_selection: VariableSelection::default(),
            value_selection: ValueSelection::default(),
            look_ahead: LookAhead::default(),
            preprocessing: None,
            time_limit: None,
            rng: ChaCha8Rng::seed_from_u64(0),
            assignments: Vec::new(),
            nb_assigned: 0,
            stats: SearchStats::default(),
            explore_time: Duration::ZERO,
            timed_out: false,
            feasible: false,
        }
    }

    /// Adds a variable over the inclusive range `[dom_min, dom_max]` and
    /// returns its handle.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        dom_min: i64,
        dom_max: i64,
    ) -> Result<Var> {
        let id = self.vars.len();
        self.vars.push(Variable::new(id, name, dom_min, dom_max)?);
        Ok(Var(id))
    }

    /// Adds a binary constraint in extension: the feasible pairs are
    /// enumerated from the two initial domains through `pred`.
    pub fn add_enumerated(
        &mut self,
        x: Var,
        y: Var,
        pred: impl Fn(i64, i64) -> bool,
    ) -> Result<ConstraintId> {
        let x = self.check_var(x)?;
        let y = self.check_var(y)?;
        if x == y {
            return Err(SolverError::DuplicateVariable { var: x }.into());
        }
        let constraint = EnumeratedConstraint::from_domains(
            x,
            y,
            self.vars[x].initial_domain(),
            self.vars[y].initial_domain(),
            pred,
        );
        Ok(self.push_constraint(constraint.into()))
    }

    /// Adds a linear constraint, typically built through the expression
    /// layer (`(x + y).eq(3)`). Single-variable comparisons arrive here
    /// with both slots naming the same variable and a zero second
    /// coefficient.
    pub fn add_linear(&mut self, constraint: LinearConstraint) -> Result<ConstraintId> {
        let [v1, v2] = constraint.vars();
        self.check_var(Var(v1))?;
        self.check_var(Var(v2))?;
        Ok(self.push_constraint(constraint.into()))
    }

    /// Adds an all-different constraint over the given variables.
    pub fn add_all_different(&mut self, vars: &[Var]) -> Result<ConstraintId> {
        if vars.len() < 2 {
            return Err(SolverError::EmptyScope.into());
        }
        let ids = vars
            .iter()
            .map(|&var| self.check_var(var))
            .collect::<Result<Vec<VariableId>>>()?;
        Ok(self.push_constraint(AllDifferentConstraint::new(ids).into()))
    }

    pub fn set_variable_selection(&mut self, selection: VariableSelection) {
        self.variable_selection = selection;
    }

    pub fn set_value_selection(&mut self, selection: ValueSelection) {
        self.value_selection = selection;
    }

    pub fn set_look_ahead(&mut self, look_ahead: LookAhead) {
        self.look_ahead = look_ahead;
    }

    /// Requests a root-only consistency pass for the non-MAC look-ahead
    /// modes. MAC3/MAC4 already imply the corresponding root pass.
    pub fn set_preprocessing(&mut self, preprocessing: Option<AcAlgorithm>) {
        self.preprocessing = preprocessing;
    }

    /// Bounds the wall-clock budget of the next `solve()`. The driver
    /// polls the clock at every node entry and unwinds once the budget is
    /// spent.
    pub fn set_time_limit(&mut self, limit: Duration) {
        self.time_limit = Some(limit);
    }

    /// Reseeds the generator behind the arbitrary heuristics, making
    /// randomized runs reproducible.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Decides feasibility. On `true` the committed values are readable
    /// through [`assignments`](Self::assignments) / [`value_of`](Self::value_of)
    /// and satisfy every constraint; on `false` with
    /// [`timed_out`](Self::timed_out) unset the problem is provably
    /// infeasible.
    pub fn solve(&mut self) -> Result<bool> {
        let n = self.vars.len();
        self.assignments = vec![None; n];
        self.nb_assigned = 0;
        self.stats = SearchStats::default();
        self.explore_time = Duration::ZERO;
        self.timed_out = false;
        self.feasible = false;
        for var in self.vars.iter_mut() {
            var.init_levels(n);
        }

        debug!(
            vars = n,
            constraints = self.constraints.len(),
            look_ahead = ?self.look_ahead,
            "solve started"
        );

        let arcs = collect_arcs(&self.constraints);

        let root_ac = match self.look_ahead {
            LookAhead::Mac3 => Some(AcAlgorithm::Ac3),
            LookAhead::Mac4 => Some(AcAlgorithm::Ac4),
            _ => self.preprocessing,
        };
        if let Some(algorithm) = root_ac {
            let consistent = match algorithm {
                AcAlgorithm::Ac3 => {
                    ac3(&mut self.vars, &self.constraints, &arcs, 0, &mut self.stats)?
                }
                AcAlgorithm::Ac4 => {
                    ac4(&mut self.vars, &self.constraints, &arcs, 0, &mut self.stats)?
                }
            };
            if !consistent {
                debug!("root consistency wiped out a domain");
                return Ok(false);
            }
        }

        self.incidence = IncidenceIndex::build(&self.vars, &self.constraints);

        let started = Instant::now();
        let mut search = Backtracker {
            vars: &mut self.vars,
            constraints: &self.constraints,
            arcs: &arcs,
            incidence: &self.incidence,
            variable_selection: self.variable_selection,
            value_selection: self.value_selection,
            look_ahead: self.look_ahead,
            assignments: &mut self.assignments,
            nb_assigned: &mut self.nb_assigned,
            stats: &mut self.stats,
            rng: &mut self.rng,
            started,
            time_limit: self.time_limit,
            timed_out: &mut self.timed_out,
        };
        let feasible = search.run()?;
        self.explore_time = started.elapsed();
        self.feasible = feasible;

        debug!(
            feasible,
            nodes = self.stats.nodes_explored,
            timed_out = self.timed_out,
            "solve finished"
        );
        Ok(feasible)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.vars
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// One slot per variable; `Some` only for values committed by the
    /// last feasible solve.
    pub fn assignments(&self) -> &[Option<i64>] {
        &self.assignments
    }

    pub fn value_of(&self, var: Var) -> Option<i64> {
        self.assignments.get(var.0).copied().flatten()
    }

    pub fn nodes_explored(&self) -> u64 {
        self.stats.nodes_explored
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn explore_time(&self) -> Duration {
        self.explore_time
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    fn push_constraint(&mut self, constraint: Constraint) -> ConstraintId {
        let id = self.constraints.len();
        self.constraints.push(constraint);
        id
    }

    fn check_var(&self, var: Var) -> Result<VariableId> {
        if var.0 < self.vars.len() {
            Ok(var.0)
        } else {
            Err(SolverError::UnknownVariable { var: var.0 }.into())
        }
    }
}

impl Default for Csp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::{AcAlgorithm, Csp};
    use crate::{
        error::SolverError,
        solver::{
            expr::Var,
            heuristics::{value::ValueSelection, variable::VariableSelection},
            search::LookAhead,
        },
    };

    const ALL_LOOK_AHEADS: [LookAhead; 4] =
        [LookAhead::Bt, LookAhead::Fc, LookAhead::Mac3, LookAhead::Mac4];
    const ALL_VARIABLE_SELECTIONS: [VariableSelection; 4] = [
        VariableSelection::Arbitrary,
        VariableSelection::SmallestDomain,
        VariableSelection::MostConstrained,
        VariableSelection::DomOverConstr,
    ];
    const ALL_VALUE_SELECTIONS: [ValueSelection; 4] = [
        ValueSelection::Arbitrary,
        ValueSelection::Ascending,
        ValueSelection::Descending,
        ValueSelection::MostSupported,
    ];

    /// x, y in [0,5] with x + y == 3 and x <= y; x may additionally be
    /// pinned through a single-variable equality.
    fn linear_scenario(pin_x: Option<i64>) -> (Csp, Var, Var) {
        let mut csp = Csp::new();
        let x = csp.add_variable("x", 0, 5).unwrap();
        let y = csp.add_variable("y", 0, 5).unwrap();
        csp.add_linear((x + y).eq(3).unwrap()).unwrap();
        csp.add_linear(x.le(y).unwrap()).unwrap();
        if let Some(value) = pin_x {
            csp.add_linear(x.eq(value).unwrap()).unwrap();
        }
        (csp, x, y)
    }

    fn assert_satisfies_all(csp: &Csp) {
        for constraint in csp.constraints() {
            assert!(
                constraint.is_feasible(csp.assignments()),
                "violated: {:?}",
                constraint.descriptor()
            );
        }
    }

    #[test]
    fn linear_scenario_is_feasible_and_verified() {
        let (mut csp, x, y) = linear_scenario(None);
        assert!(csp.solve().unwrap());
        assert!(csp.is_feasible());
        assert_satisfies_all(&csp);
        let solution = (csp.value_of(x).unwrap(), csp.value_of(y).unwrap());
        assert!(solution == (0, 3) || solution == (1, 2), "got {solution:?}");
    }

    #[test]
    fn linear_scenario_solution_set_is_exactly_two_pairs() {
        for look_ahead in ALL_LOOK_AHEADS {
            for pinned in 0..=5 {
                let (mut csp, x, y) = linear_scenario(Some(pinned));
                csp.set_look_ahead(look_ahead);
                let feasible = csp.solve().unwrap();
                if pinned <= 1 {
                    assert!(
                        feasible,
                        "{look_ahead:?}: x = {pinned} should extend to a solution"
                    );
                    assert_eq!(csp.value_of(x), Some(pinned));
                    assert_eq!(csp.value_of(y), Some(3 - pinned));
                    assert_satisfies_all(&csp);
                } else {
                    assert!(!feasible, "{look_ahead:?}: x = {pinned} should be infeasible");
                }
            }
        }
    }

    #[test]
    fn result_is_independent_of_configuration() {
        for look_ahead in ALL_LOOK_AHEADS {
            for variable_selection in ALL_VARIABLE_SELECTIONS {
                for value_selection in ALL_VALUE_SELECTIONS {
                    let (mut csp, _, _) = linear_scenario(None);
                    csp.set_look_ahead(look_ahead);
                    csp.set_variable_selection(variable_selection);
                    csp.set_value_selection(value_selection);
                    assert!(
                        csp.solve().unwrap(),
                        "{look_ahead:?}/{variable_selection:?}/{value_selection:?} disagreed"
                    );
                    assert_satisfies_all(&csp);
                }
            }
        }
    }

    #[test]
    fn single_value_domains_are_assigned_immediately() {
        let mut csp = Csp::new();
        let x = csp.add_variable("x", 2, 2).unwrap();
        let y = csp.add_variable("y", 1, 3).unwrap();
        csp.add_linear(x.ne(y).unwrap()).unwrap();
        assert!(csp.solve().unwrap());
        assert_eq!(csp.value_of(x), Some(2));
        assert_ne!(csp.value_of(y), Some(2));
    }

    #[test]
    fn empty_feasible_set_makes_the_problem_infeasible() {
        for look_ahead in ALL_LOOK_AHEADS {
            let mut csp = Csp::new();
            let x = csp.add_variable("x", 1, 3).unwrap();
            let y = csp.add_variable("y", 1, 3).unwrap();
            csp.add_enumerated(x, y, |_, _| false).unwrap();
            csp.set_look_ahead(look_ahead);
            assert!(!csp.solve().unwrap());
            assert!(!csp.timed_out());
        }
    }

    #[test]
    fn pigeonhole_all_different_is_infeasible() {
        for look_ahead in ALL_LOOK_AHEADS {
            let mut csp = Csp::new();
            let vars: Vec<Var> = (0..3)
                .map(|i| csp.add_variable(format!("x{i}"), 1, 2).unwrap())
                .collect();
            csp.add_all_different(&vars).unwrap();
            csp.set_look_ahead(look_ahead);
            assert!(!csp.solve().unwrap(), "{look_ahead:?} missed the pigeonhole");
        }
    }

    #[test]
    fn zero_time_limit_reports_a_timeout() {
        let (mut csp, _, _) = linear_scenario(None);
        csp.set_time_limit(Duration::ZERO);
        assert!(!csp.solve().unwrap());
        assert!(csp.timed_out());
        assert!(!csp.is_feasible());
        assert_eq!(csp.nodes_explored(), 0);
    }

    #[test]
    fn root_preprocessing_prunes_before_plain_backtracking() {
        let mut csp = Csp::new();
        let x = csp.add_variable("x", 1, 3).unwrap();
        let y = csp.add_variable("y", 1, 3).unwrap();
        csp.add_linear(x.lt(y).unwrap()).unwrap();
        csp.set_look_ahead(LookAhead::Bt);
        csp.set_preprocessing(Some(AcAlgorithm::Ac4));
        assert!(csp.solve().unwrap());
        // 3 lost its support on x, 1 on y
        assert!(!csp.variables()[x.id()].contains(3, 0));
        assert!(!csp.variables()[y.id()].contains(1, 0));
    }

    #[test]
    fn seeded_randomized_runs_are_reproducible() {
        let run = |seed: u64| {
            let (mut csp, _, _) = linear_scenario(None);
            csp.set_variable_selection(VariableSelection::Arbitrary);
            csp.set_value_selection(ValueSelection::Arbitrary);
            csp.set_seed(seed);
            assert!(csp.solve().unwrap());
            (csp.nodes_explored(), csp.assignments().to_vec())
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn solving_twice_is_stable() {
        let (mut csp, _, _) = linear_scenario(None);
        assert!(csp.solve().unwrap());
        let first = csp.assignments().to_vec();
        assert!(csp.solve().unwrap());
        assert_eq!(csp.assignments(), &first[..]);
    }

    #[test]
    fn foreign_variable_handles_are_rejected() {
        let mut other = Csp::new();
        let foreign = other.add_variable("a", 1, 2).unwrap();
        let _ = other.add_variable("b", 1, 2).unwrap();

        let mut csp = Csp::new();
        let x = csp.add_variable("x", 1, 2).unwrap();
        let err = csp.add_enumerated(x, Var(9), |_, _| true).unwrap_err();
        assert!(matches!(err.kind(), SolverError::UnknownVariable { var: 9 }));

        // a foreign handle with an in-range id cannot be told apart; only
        // out-of-range ids are caught
        let _ = foreign;
    }

    #[test]
    fn inverted_bounds_surface_at_the_call() {
        let mut csp = Csp::new();
        let err = csp.add_variable("x", 3, 1).unwrap_err();
        assert!(matches!(
            err.kind(),
            SolverError::InvertedDomainBounds { .. }
        ));
    }
}
