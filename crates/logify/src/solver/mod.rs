//! Weighted MaxSAT solver boundary
//!
//! The engine hands a solver mandatory clauses plus weighted optional
//! clauses and gets back either `Unsatisfiable` or an assignment that
//! satisfies every mandatory clause while minimising the total weight of
//! violated optional clauses. Pure SAT is the same call with no optional
//! clauses. Backends are swappable behind [`MaxSatSolver`]; this crate
//! ships only [`ExternalMaxSat`], which drives a solver binary, and leaves
//! the search itself to that solver.

pub mod external;
pub mod wcnf;

#[cfg(test)]
pub(crate) mod exhaustive;

pub use external::ExternalMaxSat;

use crate::logic::Clause;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// One solver call. Clauses are borrowed so a knowledge base's encoding
/// can be submitted with every query without being copied.
#[derive(Debug, Clone, Default)]
pub struct MaxSatProblem<'a> {
    /// Variables are `1..=num_vars`
    pub num_vars: u32,
    pub hard: Vec<&'a Clause>,
    pub soft: Vec<(&'a Clause, u64)>,
}

impl<'a> MaxSatProblem<'a> {
    pub fn new(num_vars: u32) -> Self {
        MaxSatProblem {
            num_vars,
            hard: Vec::new(),
            soft: Vec::new(),
        }
    }

    pub fn with_hard<I>(mut self, clauses: I) -> Self
    where
        I: IntoIterator<Item = &'a Clause>,
    {
        self.hard.extend(clauses);
        self
    }

    pub fn with_soft<I>(mut self, clauses: I) -> Self
    where
        I: IntoIterator<Item = (&'a Clause, u64)>,
    {
        self.soft.extend(clauses);
        self
    }

    /// Largest variable referenced by any clause, or `num_vars` if larger
    pub fn var_count(&self) -> u32 {
        self.hard
            .iter()
            .copied()
            .chain(self.soft.iter().map(|(c, _)| *c))
            .filter_map(Clause::max_prop)
            .map(|p| p.get())
            .fold(self.num_vars, u32::max)
    }

    pub fn is_pure_sat(&self) -> bool {
        self.soft.is_empty()
    }

    /// Sum of weights of optional clauses violated by `assignment`
    pub fn cost_of(&self, assignment: &[bool]) -> u64 {
        self.soft
            .iter()
            .filter(|(c, _)| !c.is_satisfied_by(assignment))
            .fold(0u64, |acc, (_, w)| acc.saturating_add(*w))
    }

    pub fn satisfies_hard(&self, assignment: &[bool]) -> bool {
        self.hard.iter().all(|c| c.is_satisfied_by(assignment))
    }
}

/// Optimal assignment and the weight of the optional clauses it violates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Indexed by `PropId::index`
    pub assignment: Vec<bool>,
    pub cost: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverOutcome {
    /// The mandatory clauses alone cannot be satisfied
    Unsatisfiable,
    Optimal(Solution),
}

impl SolverOutcome {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SolverOutcome::Optimal(_))
    }

    pub fn cost(&self) -> Option<u64> {
        match self {
            SolverOutcome::Optimal(s) => Some(s.cost),
            SolverOutcome::Unsatisfiable => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("time budget of {budget:?} exceeded")]
    Timeout { budget: Duration },

    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    Failure(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A weighted MaxSAT backend
pub trait MaxSatSolver: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Solve within `budget`. An exhausted budget is `SolverError::Timeout`,
    /// never a partial answer.
    fn solve(
        &self,
        problem: &MaxSatProblem<'_>,
        budget: Duration,
    ) -> Result<SolverOutcome, SolverError>;
}

impl<S: MaxSatSolver + ?Sized> MaxSatSolver for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(
        &self,
        problem: &MaxSatProblem<'_>,
        budget: Duration,
    ) -> Result<SolverOutcome, SolverError> {
        (**self).solve(problem, budget)
    }
}

impl<S: MaxSatSolver + ?Sized> MaxSatSolver for std::sync::Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(
        &self,
        problem: &MaxSatProblem<'_>,
        budget: Duration,
    ) -> Result<SolverOutcome, SolverError> {
        (**self).solve(problem, budget)
    }
}
