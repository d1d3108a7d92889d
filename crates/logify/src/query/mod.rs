//! Query engine: entailment, consistency and confidence over a knowledge base
//!
//! Each query clausifies only its own formula, in a [`QueryScope`] layered
//! over the knowledge base's symbol table, and submits the knowledge base's
//! clauses by reference together with the query clauses. Nothing about the
//! knowledge base is mutated, so queries can run concurrently.

pub mod answer;

pub use answer::{Answer, AnswerKind};

use crate::cnf::{clausify, normalize};
use crate::config::EngineConfig;
use crate::encoding::Constraint;
use crate::error::{LogifyError, Result};
use crate::json::{ConstraintRecord, QueryRequest, QueryResponse, QueryType};
use crate::knowledge_base::KnowledgeBase;
use crate::logic::{Formula, QueryScope};
use crate::solver::{MaxSatProblem, MaxSatSolver, SolverError, SolverOutcome};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Result of an entailment or consistency query
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "crate::json::HoldsJson", into = "crate::json::HoldsJson")]
pub enum Verdict {
    Holds(bool),
    /// The hard constraints are inconsistent, so any answer would be vacuous
    Vacuous,
}

impl Verdict {
    /// `Some(b)` for a definite answer
    pub fn holds(self) -> Option<bool> {
        match self {
            Verdict::Holds(b) => Some(b),
            Verdict::Vacuous => None,
        }
    }
}

/// Optimal violated soft weight for one side of a confidence query
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cost {
    Finite(u64),
    /// Hard constraints plus this side are unsatisfiable; above every
    /// finite cost
    Unreachable,
}

/// `cost(~q) / (cost(q) + cost(~q))`
///
/// An unreachable side pushes the value to 0 or 1; two zero costs (no soft
/// evidence either way) give 0.5.
pub fn confidence_from_costs(query: Cost, negation: Cost) -> Result<f64> {
    match (query, negation) {
        (Cost::Unreachable, Cost::Unreachable) => Err(LogifyError::BothUnreachable),
        (Cost::Unreachable, Cost::Finite(_)) => Ok(0.0),
        (Cost::Finite(_), Cost::Unreachable) => Ok(1.0),
        (Cost::Finite(0), Cost::Finite(0)) => Ok(0.5),
        (Cost::Finite(q), Cost::Finite(nq)) => Ok(nq as f64 / (q as f64 + nq as f64)),
    }
}

/// Answers queries against knowledge bases with one solver backend
pub struct QueryEngine {
    solver: Box<dyn MaxSatSolver>,
    config: EngineConfig,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("solver", &self.solver.name())
            .field("config", &self.config)
            .finish()
    }
}

impl QueryEngine {
    pub fn new(config: EngineConfig, solver: impl MaxSatSolver + 'static) -> Self {
        QueryEngine {
            solver: Box::new(solver),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn solver(&self) -> &dyn MaxSatSolver {
        self.solver.as_ref()
    }

    pub fn build(&self, constraints: &[Constraint]) -> Result<KnowledgeBase> {
        KnowledgeBase::build(constraints, &self.config, self.solver.as_ref())
    }

    pub fn load(&self, records: &[ConstraintRecord]) -> Result<KnowledgeBase> {
        KnowledgeBase::from_records(records, &self.config, self.solver.as_ref())
    }

    /// Does `query` follow from the hard constraints?
    pub fn entailment(&self, kb: &KnowledgeBase, query: &Formula) -> Result<Verdict> {
        if !kb.is_consistent() {
            return Ok(Verdict::Vacuous);
        }
        let outcome = self.solve(kb, &query.clone().negated(), false)?;
        Ok(Verdict::Holds(!outcome.is_satisfiable()))
    }

    /// Can `query` hold together with the hard constraints?
    pub fn consistency(&self, kb: &KnowledgeBase, query: &Formula) -> Result<Verdict> {
        if !kb.is_consistent() {
            return Ok(Verdict::Vacuous);
        }
        let outcome = self.solve(kb, query, false)?;
        Ok(Verdict::Holds(outcome.is_satisfiable()))
    }

    /// Optimal violated soft weight under the hard constraints plus `formula`
    pub fn cost(&self, kb: &KnowledgeBase, formula: &Formula) -> Result<Cost> {
        Ok(match self.solve(kb, formula, true)? {
            SolverOutcome::Unsatisfiable => Cost::Unreachable,
            SolverOutcome::Optimal(solution) => Cost::Finite(solution.cost),
        })
    }

    /// Plausibility of `query` in [0, 1] from the soft constraints
    pub fn confidence(&self, kb: &KnowledgeBase, query: &Formula) -> Result<f64> {
        let positive = self.cost(kb, query)?;
        let negative = self.cost(kb, &query.clone().negated())?;
        confidence_from_costs(positive, negative)
    }

    /// Answer a parsed request; every failure becomes an error response
    pub fn run(&self, kb: &KnowledgeBase, request: &QueryRequest) -> QueryResponse {
        let formula: Formula = match request.formula.parse() {
            Ok(f) => f,
            Err(e) => return QueryResponse::error(&LogifyError::Syntax(e)),
        };
        match request.query_type {
            QueryType::Entailment => self.entailment(kb, &formula).into(),
            QueryType::Consistency => self.consistency(kb, &formula).into(),
            QueryType::Confidence => self.confidence(kb, &formula).into(),
        }
    }

    /// Answer requests in parallel; responses keep the request order
    pub fn run_batch(&self, kb: &KnowledgeBase, requests: &[QueryRequest]) -> Vec<QueryResponse> {
        requests.par_iter().map(|request| self.run(kb, request)).collect()
    }

    /// Clausify `formula` against the knowledge base and solve, with or
    /// without the soft clauses
    fn solve(
        &self,
        kb: &KnowledgeBase,
        formula: &Formula,
        with_soft: bool,
    ) -> Result<SolverOutcome> {
        let mut scope = QueryScope::new(kb.symbols());
        for name in formula.propositions() {
            let (_, is_new) = scope.intern(&name);
            if is_new && self.config.strict_propositions {
                return Err(LogifyError::UnknownProposition { name });
            }
        }

        let nnf = normalize(formula);
        let (clausified, counter) = clausify(&nnf, &scope, scope.aux_counter())?;
        let num_vars = counter.peek().get() - 1;

        let mut problem = MaxSatProblem::new(num_vars)
            .with_hard(kb.hard_clauses())
            .with_hard(&clausified.clauses);
        if with_soft {
            problem = problem.with_soft(kb.soft_clauses().iter().map(|(c, &w)| (c, w)));
        }

        let budget = self.config.solver_timeout();
        let started = Instant::now();
        let result = self.solver.solve(&problem, budget);
        tracing::debug!(
            solver = self.solver.name(),
            vars = num_vars,
            hard = problem.hard.len(),
            soft = problem.soft.len(),
            query_clauses = clausified.clauses.len(),
            outcome = ?result.as_ref().map(SolverOutcome::cost),
            elapsed_us = started.elapsed().as_micros() as u64,
            "solver call"
        );

        result.map_err(|e| {
            if let SolverError::Timeout { budget } = &e {
                tracing::warn!(?budget, query = %formula, "solver timed out; result unknown");
            }
            LogifyError::from(e)
        })
    }
}
