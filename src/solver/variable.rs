//! The trailed domain store backing every variable.
//!
//! Each variable keeps its values in a single array together with one size
//! counter per search depth. The live domain at level `l` is the prefix
//! `values[..level_size[l]]`; removing a value swaps it behind the live
//! prefix, so the array always stays a permutation of the initial domain
//! and restoring a level is a single counter copy.

use crate::{
    error::{Result, SolverError},
    solver::csp::VariableId,
};

/// An integer decision variable with a contiguous initial domain and a
/// level-indexed working domain.
#[derive(Debug, Clone)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    dom_min: i64,
    dom_max: i64,
    values: Vec<i64>,
    level_size: Vec<usize>,
}

impl Variable {
    /// Creates a variable over the inclusive range `[dom_min, dom_max]`.
    pub fn new(id: VariableId, name: impl Into<String>, dom_min: i64, dom_max: i64) -> Result<Self> {
        let name = name.into();
        if dom_min > dom_max {
            return Err(SolverError::InvertedDomainBounds {
                name,
                min: dom_min,
                max: dom_max,
            }
            .into());
        }
        Ok(Self {
            id,
            name,
            dom_min,
            dom_max,
            values: (dom_min..=dom_max).collect(),
            level_size: vec![(dom_max - dom_min + 1) as usize],
        })
    }

    pub fn dom_min(&self) -> i64 {
        self.dom_min
    }

    pub fn dom_max(&self) -> i64 {
        self.dom_max
    }

    /// Number of values in the initial domain.
    pub fn initial_size(&self) -> usize {
        self.values.len()
    }

    /// The full value array. This is a permutation of the initial domain,
    /// not necessarily in insertion order.
    pub fn initial_domain(&self) -> &[i64] {
        &self.values
    }

    /// Resets the size counters so that every level from the root down to
    /// `max_depth` sees the full domain. Called once per solve.
    pub fn init_levels(&mut self, max_depth: usize) {
        self.level_size = vec![self.values.len(); max_depth + 1];
    }

    /// The live values at `level`, as a read-only prefix view.
    pub fn live(&self, level: usize) -> &[i64] {
        &self.values[..self.level_size[level]]
    }

    pub fn live_size(&self, level: usize) -> usize {
        self.level_size[level]
    }

    /// Whether `value` is live at `level`.
    pub fn contains(&self, value: i64, level: usize) -> bool {
        self.live(level).contains(&value)
    }

    /// Removes `value` from the live domain at `level` by swapping it with
    /// the last live entry. Removing a value that is not live is a caller
    /// bug and fails loudly.
    pub fn remove(&mut self, value: i64, level: usize) -> Result<()> {
        let slot = self.live(level).iter().position(|&v| v == value);
        match slot {
            Some(i) => {
                let last = self.level_size[level] - 1;
                self.values.swap(i, last);
                self.level_size[level] -= 1;
                Ok(())
            }
            None => Err(SolverError::ValueNotInDomain {
                var: self.id,
                value,
                level,
            }
            .into()),
        }
    }

    /// Shrinks the live domain at `level` to the single value `value`,
    /// swapping it to the front of the array.
    pub fn restrict_to(&mut self, value: i64, level: usize) -> Result<()> {
        let slot = self.live(level).iter().position(|&v| v == value);
        match slot {
            Some(i) => {
                self.values.swap(i, 0);
                self.level_size[level] = 1;
                Ok(())
            }
            None => Err(SolverError::ValueNotInDomain {
                var: self.id,
                value,
                level,
            }
            .into()),
        }
    }

    /// Copies the size counter from `level` into `level + 1`, making the
    /// child level start from (or fall back to) the parent's live domain.
    /// Serves both as the snapshot before committing an assignment and as
    /// the restoration step on every value retry.
    pub fn push_level(&mut self, level: usize) {
        self.level_size[level + 1] = self.level_size[level];
    }
}
