//! Variable-selection and value-ordering strategies driving the search
//! tree. Both are chosen per solve through the `Csp` setters; randomized
//! strategies draw from the solver-owned seedable generator.

pub mod value;
pub mod variable;
