//! A small expression layer for writing linear constraints directly, e.g.
//! `(x + y).eq(3)` or `(2.0 * x - y).le(4)`.
//!
//! Expressions normalize to an affine form over the distinct variables
//! they mention. Comparing two expressions (or an expression and a
//! scalar) builds a [`LinearConstraint`]; a difference over a single
//! variable fills the constraint's second slot with a zero coefficient.
//! Three or more distinct variables, or none at all, are configuration
//! errors.

use std::ops::{Add, Mul, Neg, Sub};

use crate::{
    error::{Result, SolverError},
    solver::{
        constraints::linear::{LinearConstraint, RelOp},
        csp::VariableId,
    },
};

/// A lightweight, copyable handle to a problem variable, handed out by
/// `Csp::add_variable`.
#[derive(Debug, Clone, Copy)]
pub struct Var(pub(crate) VariableId);

impl Var {
    pub fn id(self) -> VariableId {
        self.0
    }
}

/// An affine expression `sum(coef_i * var_i) + constant`, normalized so
/// that every variable appears at most once and zero coefficients are
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct AffineExpr {
    terms: Vec<(VariableId, f64)>,
    constant: f64,
}

impl AffineExpr {
    fn add_term(&mut self, var: VariableId, coef: f64) {
        if let Some(slot) = self.terms.iter_mut().find(|(v, _)| *v == var) {
            slot.1 += coef;
        } else {
            self.terms.push((var, coef));
        }
        self.terms.retain(|&(_, c)| c != 0.0);
    }

    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    fn relate(self, rhs: impl Into<AffineExpr>, relop: RelOp) -> Result<LinearConstraint> {
        let rhs: AffineExpr = rhs.into();
        let diff = self - rhs;
        match diff.terms[..] {
            [(v1, c1), (v2, c2)] => {
                Ok(LinearConstraint::new(v1, v2, c1, c2, relop, -diff.constant))
            }
            // a single-variable comparison reuses the variable in the
            // second slot with a zero coefficient
            [(v, c)] => Ok(LinearConstraint::new(v, v, c, 0.0, relop, -diff.constant)),
            [] => Err(SolverError::NoVariables.into()),
            _ => Err(SolverError::TooManyVariables {
                count: diff.terms.len(),
            }
            .into()),
        }
    }

    pub fn eq(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        self.relate(rhs, RelOp::Eq)
    }

    pub fn ne(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        self.relate(rhs, RelOp::Neq)
    }

    pub fn lt(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        self.relate(rhs, RelOp::Lt)
    }

    pub fn le(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        self.relate(rhs, RelOp::Leq)
    }

    pub fn gt(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        self.relate(rhs, RelOp::Gt)
    }

    pub fn ge(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        self.relate(rhs, RelOp::Geq)
    }
}

impl Var {
    pub fn eq(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        AffineExpr::from(self).eq(rhs)
    }

    pub fn ne(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        AffineExpr::from(self).ne(rhs)
    }

    pub fn lt(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        AffineExpr::from(self).lt(rhs)
    }

    pub fn le(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        AffineExpr::from(self).le(rhs)
    }

    pub fn gt(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        AffineExpr::from(self).gt(rhs)
    }

    pub fn ge(self, rhs: impl Into<AffineExpr>) -> Result<LinearConstraint> {
        AffineExpr::from(self).ge(rhs)
    }
}

impl From<Var> for AffineExpr {
    fn from(var: Var) -> Self {
        AffineExpr {
            terms: vec![(var.0, 1.0)],
            constant: 0.0,
        }
    }
}

impl From<f64> for AffineExpr {
    fn from(constant: f64) -> Self {
        AffineExpr {
            terms: Vec::new(),
            constant,
        }
    }
}

impl From<i64> for AffineExpr {
    fn from(constant: i64) -> Self {
        AffineExpr::from(constant as f64)
    }
}

impl From<i32> for AffineExpr {
    fn from(constant: i32) -> Self {
        AffineExpr::from(constant as f64)
    }
}

impl<T: Into<AffineExpr>> Add<T> for AffineExpr {
    type Output = AffineExpr;

    fn add(mut self, rhs: T) -> AffineExpr {
        let rhs: AffineExpr = rhs.into();
        for (var, coef) in rhs.terms {
            self.add_term(var, coef);
        }
        self.constant += rhs.constant;
        self
    }
}

impl<T: Into<AffineExpr>> Sub<T> for AffineExpr {
    type Output = AffineExpr;

    fn sub(self, rhs: T) -> AffineExpr {
        let rhs: AffineExpr = rhs.into();
        self + (-rhs)
    }
}

impl Neg for AffineExpr {
    type Output = AffineExpr;

    fn neg(mut self) -> AffineExpr {
        for term in self.terms.iter_mut() {
            term.1 = -term.1;
        }
        self.constant = -self.constant;
        self
    }
}

impl Mul<f64> for AffineExpr {
    type Output = AffineExpr;

    fn mul(mut self, scalar: f64) -> AffineExpr {
        for term in self.terms.iter_mut() {
            term.1 *= scalar;
        }
        self.constant *= scalar;
        self.terms.retain(|&(_, c)| c != 0.0);
        self
    }
}

impl<T: Into<AffineExpr>> Add<T> for Var {
    type Output = AffineExpr;

    fn add(self, rhs: T) -> AffineExpr {
        AffineExpr::from(self) + rhs
    }
}

impl<T: Into<AffineExpr>> Sub<T> for Var {
    type Output = AffineExpr;

    fn sub(self, rhs: T) -> AffineExpr {
        AffineExpr::from(self) - rhs
    }
}

impl Neg for Var {
    type Output = AffineExpr;

    fn neg(self) -> AffineExpr {
        -AffineExpr::from(self)
    }
}

impl Mul<f64> for Var {
    type Output = AffineExpr;

    fn mul(self, scalar: f64) -> AffineExpr {
        AffineExpr::from(self) * scalar
    }
}

impl Mul<Var> for f64 {
    type Output = AffineExpr;

    fn mul(self, var: Var) -> AffineExpr {
        AffineExpr::from(var) * self
    }
}

impl Mul<AffineExpr> for f64 {
    type Output = AffineExpr;

    fn mul(self, expr: AffineExpr) -> AffineExpr {
        expr * self
    }
}
