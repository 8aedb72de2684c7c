use std::backtrace::Backtrace;

use crate::solver::csp::{ConstraintId, VariableId};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The error kinds surfaced by the solver.
///
/// Configuration errors are reported by the API call that caused them.
/// Domain-store and propagation misuse are caller bugs: they abort the
/// current solve instead of being silently recovered. Search outcomes
/// (feasible, infeasible, timeout) are ordinary return values, never errors.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("domain bounds for variable '{name}' are inverted: [{min}, {max}]")]
    InvertedDomainBounds { name: String, min: i64, max: i64 },

    #[error("affine expression mentions {count} distinct variables, at most two are supported")]
    TooManyVariables { count: usize },

    #[error("affine comparison references no variables")]
    NoVariables,

    #[error("variable {var} appears twice in a constraint scope")]
    DuplicateVariable { var: VariableId },

    #[error("variable id {var} is not part of this problem")]
    UnknownVariable { var: VariableId },

    #[error("all-different constraint needs at least two variables")]
    EmptyScope,

    #[error("value {value} is not live in the domain of variable {var} at level {level}")]
    ValueNotInDomain {
        var: VariableId,
        value: i64,
        level: usize,
    },

    #[error("variable {var} is not in the scope of constraint {constraint}")]
    VariableNotInScope {
        var: VariableId,
        constraint: ConstraintId,
    },

    #[error("variable {var} has no committed value to propagate")]
    UnassignedPropagation { var: VariableId },

    #[error("no unassigned variable left to select")]
    NoUnassignedVariable,

    #[error("variable {var} has an empty live domain at level {level}")]
    EmptyLiveDomain { var: VariableId, level: usize },

    #[error("malformed DIMACS instance: {0}")]
    MalformedInstance(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inner: {inner}\n{backtrace}")]
    Inner {
        inner: Box<SolverError>,
        backtrace: Box<Backtrace>,
    },
}

impl From<SolverError> for Error {
    fn from(inner: SolverError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(std::backtrace::Backtrace::capture()),
        }
    }
}

impl Error {
    /// The underlying error kind, without the captured backtrace.
    pub fn kind(&self) -> &SolverError {
        match self {
            Error::Inner { inner, .. } => inner,
        }
    }
}
