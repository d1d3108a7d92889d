//! Formula to clause conversion: NNF normalization followed by
//! structure-preserving clausification

pub mod nnf;
pub mod tseitin;

pub use nnf::{normalize, Nnf};
pub use tseitin::{clausify, define, Clausified};
