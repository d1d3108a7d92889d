//! Logify: weighted propositional reasoning
//!
//! A knowledge base of hard and soft (confidence-weighted) constraints over
//! named propositions is compiled to weighted CNF once; entailment,
//! consistency and confidence queries then clausify only the query formula
//! and hand the combined clause set to a MaxSAT backend.
//!
//! ```no_run
//! use logify::{Constraint, EngineConfig, ExternalMaxSat, QueryEngine, Verdict};
//!
//! let solver = ExternalMaxSat::new("/usr/local/bin/maxsat-solver");
//! let engine = QueryEngine::new(EngineConfig::default(), solver);
//! let kb = engine.build(&[
//!     Constraint::hard("P1 => P2".parse()?),
//!     Constraint::soft("P2 => P3".parse()?, 0.9)?,
//! ])?;
//! assert_eq!(engine.entailment(&kb, &"~P1 | P2".parse()?)?, Verdict::Holds(true));
//! let value = engine.confidence(&kb, &"P3".parse()?)?;
//! # let _ = value;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cnf;
pub mod config;
pub mod encoding;
pub mod error;
pub mod json;
pub mod knowledge_base;
pub mod logic;
pub mod parser;
pub mod query;
pub mod solver;

pub use config::EngineConfig;
pub use error::{ErrorKind, LogifyError, Result};

pub use logic::{Clause, Formula, Literal, PropId, SymbolTable};
pub use parser::{parse_formula, ParsedFormula, SyntaxError, SyntaxErrorKind, MAX_NESTING};

pub use cnf::{clausify, normalize, Clausified, Nnf};
pub use encoding::{encode, Constraint, WeightTransform, WeightedClauseSet, WeightedEncoder};
pub use knowledge_base::{HardSetStatus, KnowledgeBase};

pub use query::{confidence_from_costs, Answer, AnswerKind, Cost, QueryEngine, Verdict};
pub use json::{ConstraintKind, ConstraintRecord, QueryRequest, QueryResponse, QueryType};

pub use solver::{
    ExternalMaxSat, MaxSatProblem, MaxSatSolver, Solution, SolverError, SolverOutcome,
};
