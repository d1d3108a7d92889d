//! Knowledge base: an encoded, immutable constraint set
//!
//! The hard set is checked for satisfiability once, at construction, and
//! the verdict is stored so every later query can report vacuous answers
//! without solving again.

use crate::config::EngineConfig;
use crate::encoding::{encode, Constraint, WeightTransform, WeightedClauseSet};
use crate::error::{LogifyError, Result};
use crate::json::ConstraintRecord;
use crate::logic::{Clause, SymbolTable};
use crate::solver::{MaxSatSolver, SolverOutcome};
use indexmap::{IndexMap, IndexSet};
use std::time::Instant;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HardSetStatus {
    Consistent,
    /// No assignment satisfies the hard constraints; entailment and
    /// consistency queries answer `Vacuous`
    Inconsistent,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    encoding: WeightedClauseSet,
    status: HardSetStatus,
    constraint_count: usize,
}

impl KnowledgeBase {
    /// Encode `constraints` and check the hard set with `solver`.
    ///
    /// Fails with `SolverTimeout` if the check does not finish within the
    /// configured budget, and with `InconsistentHardSet` if the hard set is
    /// unsatisfiable and `reject_inconsistent_hard_set` is on.
    pub fn build(
        constraints: &[Constraint],
        config: &EngineConfig,
        solver: &dyn MaxSatSolver,
    ) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();
        let encoding = encode(constraints, WeightTransform::new(config.weight_scale))?;

        let outcome = solver.solve(&encoding.hard_problem(), config.solver_timeout())?;
        let status = match outcome {
            SolverOutcome::Unsatisfiable => HardSetStatus::Inconsistent,
            SolverOutcome::Optimal(_) => HardSetStatus::Consistent,
        };

        if status == HardSetStatus::Inconsistent {
            tracing::warn!(
                constraints = constraints.len(),
                hard_clauses = encoding.hard().len(),
                "hard constraints are inconsistent; entailment and consistency will be vacuous"
            );
            if config.reject_inconsistent_hard_set {
                return Err(LogifyError::InconsistentHardSet);
            }
        }

        tracing::info!(
            constraints = constraints.len(),
            propositions = encoding.symbols().named_count(),
            auxiliaries = encoding.symbols().len() - encoding.symbols().named_count(),
            hard_clauses = encoding.hard().len(),
            soft_clauses = encoding.soft().len(),
            consistent = status == HardSetStatus::Consistent,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "knowledge base built"
        );

        Ok(KnowledgeBase {
            encoding,
            status,
            constraint_count: constraints.len(),
        })
    }

    /// Build from external records (parses every formula first)
    pub fn from_records(
        records: &[ConstraintRecord],
        config: &EngineConfig,
        solver: &dyn MaxSatSolver,
    ) -> Result<Self> {
        let constraints = records
            .iter()
            .map(ConstraintRecord::to_constraint)
            .collect::<Result<Vec<_>>>()?;
        Self::build(&constraints, config, solver)
    }

    /// Build from a JSON array of records
    pub fn from_json(
        text: &str,
        config: &EngineConfig,
        solver: &dyn MaxSatSolver,
    ) -> Result<Self> {
        let records: Vec<ConstraintRecord> = serde_json::from_str(text)?;
        Self::from_records(&records, config, solver)
    }

    pub fn status(&self) -> HardSetStatus {
        self.status
    }

    pub fn is_consistent(&self) -> bool {
        self.status == HardSetStatus::Consistent
    }

    pub fn encoding(&self) -> &WeightedClauseSet {
        &self.encoding
    }

    pub fn symbols(&self) -> &SymbolTable {
        self.encoding.symbols()
    }

    pub fn hard_clauses(&self) -> &IndexSet<Clause> {
        self.encoding.hard()
    }

    pub fn soft_clauses(&self) -> &IndexMap<Clause, u64> {
        self.encoding.soft()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraint_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::exhaustive::Exhaustive;

    fn hard(text: &str) -> Constraint {
        Constraint::hard(text.parse().unwrap())
    }

    #[test]
    fn test_consistent_build() {
        let kb = KnowledgeBase::build(
            &[hard("P1 => P2"), hard("P1")],
            &EngineConfig::default(),
            &Exhaustive,
        )
        .unwrap();
        assert!(kb.is_consistent());
        assert_eq!(kb.constraint_count(), 2);
        assert_eq!(kb.symbols().named_count(), 2);
    }

    #[test]
    fn test_inconsistent_is_flagged() {
        let constraints = [hard("P1"), hard("~P1")];
        let kb = KnowledgeBase::build(&constraints, &EngineConfig::default(), &Exhaustive).unwrap();
        assert_eq!(kb.status(), HardSetStatus::Inconsistent);

        let config = EngineConfig {
            reject_inconsistent_hard_set: true,
            ..EngineConfig::default()
        };
        let err = KnowledgeBase::build(&constraints, &config, &Exhaustive).unwrap_err();
        assert!(matches!(err, LogifyError::InconsistentHardSet));
    }

    #[test]
    fn test_build_times_out() {
        let config = EngineConfig::default().with_solver_timeout(std::time::Duration::ZERO);
        let err = KnowledgeBase::build(&[hard("a")], &config, &Exhaustive).unwrap_err();
        assert!(matches!(err, LogifyError::SolverTimeout { .. }));
    }

    #[test]
    fn test_from_json() {
        let text = r#"[
            {"kind": "hard", "formula": "P1 => P2"},
            {"kind": "soft", "formula": "P2", "confidence": 0.8}
        ]"#;
        let kb = KnowledgeBase::from_json(text, &EngineConfig::default(), &Exhaustive).unwrap();
        assert_eq!(kb.hard_clauses().len(), 1);
        assert_eq!(kb.soft_clauses().len(), 2);
    }
}
