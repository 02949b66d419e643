//! Mathematical primitives for distribution conversion.

pub mod grid;
pub mod index;
pub mod interp;
