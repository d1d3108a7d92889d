//! Core propositional types: formulas, literals, clauses and symbol tables

pub mod formula;
pub mod literal;
pub mod symbols;

pub use formula::Formula;
pub use literal::{Clause, Literal, PropId};
pub use symbols::{AuxCounter, PropositionResolver, QueryScope, SymbolTable};
