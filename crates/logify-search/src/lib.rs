//! In-process MaxSAT search for logify
//!
//! `logify` only talks to solvers through [`logify::MaxSatSolver`]. This
//! crate supplies one that needs no external binary, for small knowledge
//! bases and for tests.
//!
//! ```
//! use logify::{Constraint, EngineConfig, QueryEngine, Verdict};
//! use logify_search::BranchAndBound;
//!
//! let engine = QueryEngine::new(EngineConfig::default(), BranchAndBound::new());
//! let kb = engine.build(&[Constraint::hard("P1 => P2".parse()?)])?;
//! assert_eq!(engine.entailment(&kb, &"~P1 | P2".parse()?)?, Verdict::Holds(true));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod branch_bound;

pub use branch_bound::BranchAndBound;
