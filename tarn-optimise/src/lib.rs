//! Constant propagation over the lowered representation.
//!
//! [`ConstantPropagation`] computes a [`Lattice`] value for every name in a
//! namespace, then rewrites the namespace: constant references are inlined,
//! constant bindings dropped and branches on constants folded away.

pub mod fold;
pub mod ir;
pub mod lattice;
pub mod propagation;

pub use lattice::{Comparison, Lattice};
pub use propagation::ConstantPropagation;
