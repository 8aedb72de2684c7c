//! Ready-made problem builders on top of the public construction API,
//! together with solver-independent solution checkers.

pub mod coloring;
pub mod queens;
