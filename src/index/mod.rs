//! Dense embedding matrix aligned with the template catalog.
//!
//! Row `i` holds the unit-norm vector of catalog entry `i`. The loader refuses
//! to build a matrix unless every catalog id has a vector of the same
//! dimension; a partially filled matrix would silently shift rows against
//! templates.

pub mod error;
pub mod loader;
pub mod matrix;


pub use error::{IndexError, IndexResult};
pub use loader::load_matrix;
pub use matrix::EmbeddingMatrix;
