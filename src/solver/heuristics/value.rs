use std::cmp::Reverse;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::solver::{incidence::IncidenceIndex, variable::Variable};

/// The strategy used to order the candidate values of a branching
/// variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueSelection {
    /// Uniform random permutation of the live domain.
    Arbitrary,
    /// Numeric ascending.
    #[default]
    Ascending,
    /// Numeric descending.
    Descending,
    /// Decreasing number of supporting pairings over the binary
    /// constraints, ties in ascending numeric order.
    MostSupported,
}

/// The live values of `var` at `level`, in the order they should be tried.
pub fn order_values<R: Rng>(
    selection: ValueSelection,
    var: &Variable,
    incidence: &IncidenceIndex,
    level: usize,
    rng: &mut R,
) -> Vec<i64> {
    match selection {
        ValueSelection::Arbitrary => {
            let mut values = var.live(level).to_vec();
            values.shuffle(rng);
            values
        }
        ValueSelection::Ascending => {
            let mut values = var.live(level).to_vec();
            values.sort_unstable();
            values
        }
        ValueSelection::Descending => {
            let mut values = var.live(level).to_vec();
            values.sort_unstable_by_key(|&v| Reverse(v));
            values
        }
        ValueSelection::MostSupported => {
            // ranked over the initial domain, then filtered to the live
            // prefix, mirroring how the support counters are keyed
            let mut values = var.initial_domain().to_vec();
            values.sort_unstable_by_key(|&v| (Reverse(incidence.support_count(var.id, v)), v));
            values.retain(|&v| var.contains(v, level));
            values
        }
    }
}
