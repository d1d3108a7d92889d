//! Truth-table backend for unit tests

use super::{MaxSatProblem, MaxSatSolver, Solution, SolverError, SolverOutcome};
use std::time::Duration;

/// Tries every assignment; only usable for a handful of variables
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Exhaustive;

const MAX_VARS: u32 = 20;

impl MaxSatSolver for Exhaustive {
    fn name(&self) -> &str {
        "exhaustive"
    }

    fn solve(
        &self,
        problem: &MaxSatProblem<'_>,
        budget: Duration,
    ) -> Result<SolverOutcome, SolverError> {
        if budget.is_zero() {
            return Err(SolverError::Timeout { budget });
        }
        let n = problem.var_count();
        if n > MAX_VARS {
            return Err(SolverError::Failure(format!("{} variables is too many", n)));
        }
        let best = (0u32..1 << n)
            .map(|bits| (0..n).map(|i| bits & (1 << i) != 0).collect::<Vec<_>>())
            .filter(|assignment| problem.satisfies_hard(assignment))
            .map(|assignment| Solution {
                cost: problem.cost_of(&assignment),
                assignment,
            })
            .min_by_key(|s| s.cost);
        Ok(match best {
            Some(solution) => SolverOutcome::Optimal(solution),
            None => SolverOutcome::Unsatisfiable,
        })
    }
}
