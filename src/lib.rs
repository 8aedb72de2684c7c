//! Ramus is a solver for finite-domain constraint satisfaction problems
//! over integer variables.
//!
//! Feasibility is decided by depth-first backtracking over a trailed
//! domain store, combined with constraint propagation and configurable
//! search heuristics.
//!
//! # Core Concepts
//!
//! - **[`Csp`]**: the problem aggregate. Variables and constraints are
//!   appended through its builders; `solve()` runs the search and leaves
//!   the committed assignment readable.
//! - **[`Constraint`]**: a closed sum over the supported variants —
//!   binary constraints in extension, binary linear constraints, and
//!   n-ary all-different.
//! - **Look-ahead**: the work done at every search node before recursing,
//!   one of plain backtracking, forward checking, or maintained
//!   arc-consistency via AC-3 or AC-4 ([`LookAhead`]).
//! - **Heuristics**: variable selection ([`VariableSelection`]) and value
//!   ordering ([`ValueSelection`]) strategies drive the shape of the
//!   search tree; the randomized ones draw from a seedable generator.
//!
//! # Example: two variables, one linear constraint
//!
//! ```
//! use ramus::{Csp, LookAhead};
//!
//! # fn main() -> ramus::Result<()> {
//! let mut csp = Csp::new();
//! let x = csp.add_variable("x", 0, 5)?;
//! let y = csp.add_variable("y", 0, 5)?;
//! csp.add_linear((x + y).eq(3)?)?;
//! csp.add_linear(x.le(y)?)?;
//! csp.set_look_ahead(LookAhead::Mac3);
//!
//! assert!(csp.solve()?);
//! let x_value = csp.value_of(x).unwrap();
//! let y_value = csp.value_of(y).unwrap();
//! assert_eq!(x_value + y_value, 3);
//! assert!(x_value <= y_value);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod problems;
pub mod solver;

pub use error::{Error, Result, SolverError};
pub use solver::{
    ac::{ac3, ac4, collect_arcs, DirectedArc},
    constraint::{Constraint, ConstraintDescriptor, Propagation},
    constraints,
    constraints::{
        all_different::AllDifferentConstraint,
        enumerated::EnumeratedConstraint,
        linear::{LinearConstraint, RelOp},
    },
    csp::{AcAlgorithm, ConstraintId, Csp, VariableId},
    expr::{AffineExpr, Var},
    heuristics::{value::ValueSelection, variable::VariableSelection},
    search::LookAhead,
    stats::{render_stats_table, PerConstraintStats, SearchStats},
    variable::Variable,
};
