use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SolverError},
    solver::{csp::VariableId, incidence::IncidenceIndex, variable::Variable},
};

/// The strategy used to pick the next variable to branch on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableSelection {
    /// Uniform random pick among the unassigned variables.
    Arbitrary,
    /// Smallest live domain, ties broken by lowest id. The classic
    /// fail-first rule.
    #[default]
    SmallestDomain,
    /// Highest static degree in the incidence matrix, ties by lowest id.
    MostConstrained,
    /// Smallest live-domain-size over degree ratio; variables without any
    /// binary constraint are set aside and one of them is picked at random
    /// only when no constrained candidate exists.
    DomOverConstr,
}

/// Picks the next unassigned variable according to `selection`.
pub fn select_variable<R: Rng>(
    selection: VariableSelection,
    vars: &[Variable],
    assignments: &[Option<i64>],
    incidence: &IncidenceIndex,
    level: usize,
    rng: &mut R,
) -> Result<VariableId> {
    match selection {
        VariableSelection::Arbitrary => {
            let unassigned: Vec<VariableId> = (0..vars.len())
                .filter(|&id| assignments[id].is_none())
                .collect();
            unassigned
                .choose(rng)
                .copied()
                .ok_or_else(|| SolverError::NoUnassignedVariable.into())
        }
        VariableSelection::SmallestDomain => {
            let mut best: Option<(usize, VariableId)> = None;
            for (id, var) in vars.iter().enumerate() {
                if assignments[id].is_some() {
                    continue;
                }
                let size = var.live_size(level);
                if best.map_or(true, |(best_size, _)| size < best_size) {
                    best = Some((size, id));
                }
            }
            match best {
                Some((0, id)) => Err(SolverError::EmptyLiveDomain { var: id, level }.into()),
                Some((_, id)) => Ok(id),
                None => Err(SolverError::NoUnassignedVariable.into()),
            }
        }
        VariableSelection::MostConstrained => {
            let mut best: Option<(usize, VariableId)> = None;
            for id in 0..vars.len() {
                if assignments[id].is_some() {
                    continue;
                }
                let degree = incidence.degree(id);
                if best.map_or(true, |(best_degree, _)| degree > best_degree) {
                    best = Some((degree, id));
                }
            }
            best.map(|(_, id)| id)
                .ok_or_else(|| SolverError::NoUnassignedVariable.into())
        }
        VariableSelection::DomOverConstr => {
            let mut best: Option<(f64, VariableId)> = None;
            let mut isolated: Vec<VariableId> = Vec::new();
            for (id, var) in vars.iter().enumerate() {
                if assignments[id].is_some() {
                    continue;
                }
                let degree = incidence.degree(id);
                if degree == 0 {
                    isolated.push(id);
                    continue;
                }
                let ratio = var.live_size(level) as f64 / degree as f64;
                if best.map_or(true, |(best_ratio, _)| ratio < best_ratio) {
                    best = Some((ratio, id));
                }
            }
            if let Some((_, id)) = best {
                Ok(id)
            } else {
                isolated
                    .choose(rng)
                    .copied()
                    .ok_or_else(|| SolverError::NoUnassignedVariable.into())
            }
        }
    }
}
