//! Exact MaxSAT backend
//!
//! Depth-first branch and bound over the variables in id order. Mandatory
//! clauses are enforced by unit propagation; a branch is pruned as soon as
//! its lower bound reaches the best cost found so far. The lower bound is
//! the weight of optional clauses already falsified plus, for every
//! unassigned variable with optional unit clauses on both polarities, the
//! lighter of the two. Search order is fixed, so results are reproducible.
//!
//! The search loop is iterative (explicit trail) and checks the deadline and
//! the cancellation flag every `CHECK_INTERVAL` nodes.

use logify::solver::{MaxSatProblem, MaxSatSolver, Solution, SolverError, SolverOutcome};
use logify::{Literal, PropId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const CHECK_INTERVAL: u64 = 256;

/// In-process branch-and-bound solver
#[derive(Debug, Clone, Default)]
pub struct BranchAndBound {
    cancel: Arc<AtomicBool>,
}

impl BranchAndBound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a cancellation flag with the caller. Setting it makes every
    /// running and future solve return `SolverError::Cancelled` until it is
    /// cleared again.
    pub fn with_cancel_flag(cancel: Arc<AtomicBool>) -> Self {
        BranchAndBound { cancel }
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.cancel.store(false, Ordering::Relaxed);
    }
}

impl MaxSatSolver for BranchAndBound {
    fn name(&self) -> &str {
        "branch-and-bound"
    }

    fn solve(
        &self,
        problem: &MaxSatProblem<'_>,
        budget: Duration,
    ) -> Result<SolverOutcome, SolverError> {
        if budget.is_zero() {
            return Err(SolverError::Timeout { budget });
        }
        if self.cancel.load(Ordering::Relaxed) {
            return Err(SolverError::Cancelled);
        }
        let limits = Limits {
            deadline: Instant::now().checked_add(budget),
            budget,
            cancel: &self.cancel,
        };
        Search::new(problem).run(&limits)
    }
}

struct Limits<'c> {
    deadline: Option<Instant>,
    budget: Duration,
    cancel: &'c AtomicBool,
}

impl Limits<'_> {
    fn check(&self) -> Result<(), SolverError> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(SolverError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(SolverError::Timeout { budget: self.budget });
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Reason {
    /// Branching choice whose other polarity is still to be explored
    Decision,
    /// Second polarity of a decision
    Flipped,
    /// Forced by a mandatory clause
    Implied,
}

enum ClauseState {
    Satisfied,
    Falsified,
    Unit(Literal),
    Open,
}

/// Index into per-literal tables
fn slot(lit: Literal) -> usize {
    lit.prop().index() * 2 + usize::from(!lit.is_positive())
}

struct Search<'p> {
    hard: Vec<&'p [Literal]>,
    soft: Vec<(&'p [Literal], u64)>,
    /// Mandatory clauses containing each literal, by `slot`
    occurs: Vec<Vec<usize>>,
    /// Per variable: total weight of optional units `{v}` and `{~v}`
    unit_weight: Vec<[u64; 2]>,
    /// Variables mentioned by some clause; the rest are fixed to false
    relevant: Vec<bool>,
    values: Vec<Option<bool>>,
    trail: Vec<(Literal, Reason)>,
    /// Next trail entry to propagate
    qhead: usize,
}

impl<'p> Search<'p> {
    fn new(problem: &MaxSatProblem<'p>) -> Self {
        let n = problem.var_count() as usize;
        let hard: Vec<&'p [Literal]> = problem.hard.iter().map(|&c| c.literals()).collect();
        let soft: Vec<(&'p [Literal], u64)> =
            problem.soft.iter().map(|&(c, w)| (c.literals(), w)).collect();

        let mut occurs = vec![Vec::new(); 2 * n];
        let mut relevant = vec![false; n];
        for (ci, lits) in hard.iter().enumerate() {
            for &lit in lits.iter() {
                occurs[slot(lit)].push(ci);
                relevant[lit.prop().index()] = true;
            }
        }
        let mut unit_weight = vec![[0u64; 2]; n];
        for (lits, weight) in &soft {
            for &lit in lits.iter() {
                relevant[lit.prop().index()] = true;
            }
            if let [lit] = lits {
                let w = &mut unit_weight[lit.prop().index()][usize::from(!lit.is_positive())];
                *w = w.saturating_add(*weight);
            }
        }

        Search {
            hard,
            soft,
            occurs,
            unit_weight,
            relevant,
            values: vec![None; n],
            trail: Vec::with_capacity(n),
            qhead: 0,
        }
    }

    fn run(mut self, limits: &Limits<'_>) -> Result<SolverOutcome, SolverError> {
        // Empty and unit mandatory clauses, before any decision
        for ci in 0..self.hard.len() {
            let lits = self.hard[ci];
            match *lits {
                [] => return Ok(SolverOutcome::Unsatisfiable),
                [lit] => match self.value(lit) {
                    Some(true) => {}
                    Some(false) => return Ok(SolverOutcome::Unsatisfiable),
                    None => self.assign(lit, Reason::Implied),
                },
                _ => {}
            }
        }

        let mut best: Option<Solution> = None;
        let mut nodes: u64 = 0;
        loop {
            nodes += 1;
            if nodes % CHECK_INTERVAL == 0 {
                limits.check()?;
            }

            if !self.propagate() {
                if !self.backtrack() {
                    break;
                }
                continue;
            }

            let bound = self.lower_bound();
            if best.as_ref().is_some_and(|b| bound >= b.cost) {
                if !self.backtrack() {
                    break;
                }
                continue;
            }

            match self.pick_branch() {
                Some(lit) => self.assign(lit, Reason::Decision),
                None => {
                    let solution = Solution {
                        assignment: self.values.iter().map(|v| v.unwrap_or(false)).collect(),
                        cost: bound,
                    };
                    let optimal = solution.cost == 0;
                    best = Some(solution);
                    if optimal || !self.backtrack() {
                        break;
                    }
                }
            }
        }

        tracing::trace!(nodes, cost = ?best.as_ref().map(|b| b.cost), "search finished");
        Ok(match best {
            Some(solution) => SolverOutcome::Optimal(solution),
            None => SolverOutcome::Unsatisfiable,
        })
    }

    fn value(&self, lit: Literal) -> Option<bool> {
        self.values[lit.prop().index()].map(|v| lit.holds(v))
    }

    fn assign(&mut self, lit: Literal, reason: Reason) {
        self.values[lit.prop().index()] = Some(lit.is_positive());
        self.trail.push((lit, reason));
    }

    fn clause_state(&self, lits: &[Literal]) -> ClauseState {
        let mut open = None;
        let mut unassigned = 0;
        for &lit in lits {
            match self.value(lit) {
                Some(true) => return ClauseState::Satisfied,
                Some(false) => {}
                None => {
                    unassigned += 1;
                    open = Some(lit);
                }
            }
        }
        match (unassigned, open) {
            (0, _) => ClauseState::Falsified,
            (1, Some(lit)) => ClauseState::Unit(lit),
            _ => ClauseState::Open,
        }
    }

    /// Propagate pending trail entries. Returns false on conflict.
    fn propagate(&mut self) -> bool {
        while self.qhead < self.trail.len() {
            let (lit, _) = self.trail[self.qhead];
            self.qhead += 1;
            let falsified = slot(-lit);
            for k in 0..self.occurs[falsified].len() {
                let ci = self.occurs[falsified][k];
                match self.clause_state(self.hard[ci]) {
                    ClauseState::Satisfied | ClauseState::Open => {}
                    ClauseState::Falsified => {
                        self.qhead = self.trail.len();
                        return false;
                    }
                    ClauseState::Unit(unit) => self.assign(unit, Reason::Implied),
                }
            }
        }
        true
    }

    /// Undo up to the latest unexplored decision and take its other branch.
    /// Returns false when the search space is exhausted.
    fn backtrack(&mut self) -> bool {
        while let Some((lit, reason)) = self.trail.pop() {
            self.values[lit.prop().index()] = None;
            if reason == Reason::Decision {
                self.qhead = self.trail.len();
                self.assign(-lit, Reason::Flipped);
                return true;
            }
        }
        false
    }

    fn lower_bound(&self) -> u64 {
        let mut cost = 0u64;
        for (lits, weight) in &self.soft {
            if lits.iter().all(|&l| self.value(l) == Some(false)) {
                cost = cost.saturating_add(*weight);
            }
        }
        for (value, [pos, neg]) in self.values.iter().zip(&self.unit_weight) {
            if value.is_none() {
                cost = cost.saturating_add((*pos).min(*neg));
            }
        }
        cost
    }

    /// First unassigned relevant variable, with the polarity that violates
    /// the lighter optional unit
    fn pick_branch(&self) -> Option<Literal> {
        (0..self.values.len())
            .find(|&i| self.relevant[i] && self.values[i].is_none())
            .and_then(|i| {
                let [pos, neg] = self.unit_weight[i];
                PropId::new(i as u32 + 1).map(|p| Literal::new(p, pos > neg))
            })
    }
}
