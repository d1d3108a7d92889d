//! Weighted encoding of hard and soft constraints
//!
//! Hard constraints are normalized, clausified and asserted. A soft
//! constraint `(f, w)` is reified: a literal `c` with `c <=> f` is obtained
//! (the literal itself when `f` is one, a fresh auxiliary otherwise), its
//! definition clauses are asserted, and two optional units are added:
//! `{c}` weighing `W(w)` and `{~c}` weighing `W(1 - w)`.

pub mod weights;

pub use weights::{validate_confidence, WeightTransform};

use crate::cnf::{clausify, define, normalize};
use crate::error::Result;
use crate::logic::{Clause, Formula, SymbolTable};
use crate::solver::wcnf::to_wcnf_string;
use crate::solver::MaxSatProblem;
use indexmap::{IndexMap, IndexSet};

/// A constraint over named propositions
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Hard(Formula),
    Soft { formula: Formula, confidence: f64 },
}

impl Constraint {
    pub fn hard(formula: Formula) -> Self {
        Constraint::Hard(formula)
    }

    /// Soft constraint; the confidence must lie strictly between 0 and 1
    pub fn soft(formula: Formula, confidence: f64) -> Result<Self> {
        let confidence = validate_confidence(confidence)?;
        Ok(Constraint::Soft { formula, confidence })
    }

    pub fn formula(&self) -> &Formula {
        match self {
            Constraint::Hard(f) | Constraint::Soft { formula: f, .. } => f,
        }
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, Constraint::Hard(_))
    }
}

/// Clausal form of a constraint set together with its symbol table
#[derive(Debug, Clone, Default)]
pub struct WeightedClauseSet {
    hard: IndexSet<Clause>,
    soft: IndexMap<Clause, u64>,
    symbols: SymbolTable,
}

impl WeightedClauseSet {
    pub fn hard(&self) -> &IndexSet<Clause> {
        &self.hard
    }

    pub fn soft(&self) -> &IndexMap<Clause, u64> {
        &self.soft
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Total number of propositions, named and auxiliary
    pub fn num_vars(&self) -> u32 {
        self.symbols.len() as u32
    }

    pub fn len(&self) -> usize {
        self.hard.len() + self.soft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hard.is_empty() && self.soft.is_empty()
    }

    pub fn total_soft_weight(&self) -> u64 {
        self.soft.values().fold(0u64, |acc, &w| acc.saturating_add(w))
    }

    /// Solver problem over the hard clauses only
    pub fn hard_problem(&self) -> MaxSatProblem<'_> {
        MaxSatProblem::new(self.num_vars()).with_hard(self.hard.iter())
    }

    /// Solver problem over every clause
    pub fn problem(&self) -> MaxSatProblem<'_> {
        self.hard_problem()
            .with_soft(self.soft.iter().map(|(c, &w)| (c, w)))
    }

    pub fn to_wcnf(&self) -> String {
        to_wcnf_string(&self.problem())
    }
}

/// Incremental encoder; ids are assigned in the order constraints are added
#[derive(Debug, Clone, Default)]
pub struct WeightedEncoder {
    set: WeightedClauseSet,
    transform: WeightTransform,
}

impl WeightedEncoder {
    pub fn new(transform: WeightTransform) -> Self {
        WeightedEncoder {
            set: WeightedClauseSet::default(),
            transform,
        }
    }

    pub fn add(&mut self, constraint: &Constraint) -> Result<()> {
        // Name ids first, in first-occurrence order, so auxiliaries come after
        for name in constraint.formula().propositions() {
            self.set.symbols.intern(&name);
        }
        let nnf = normalize(constraint.formula());
        let counter = self.set.symbols.aux_counter();

        match constraint {
            Constraint::Hard(_) => {
                let (clausified, counter) = clausify(&nnf, &self.set.symbols, counter)?;
                self.set.symbols.absorb_auxiliaries(counter);
                self.set.hard.extend(clausified.clauses);
            }
            Constraint::Soft { confidence, .. } => {
                let (asserted, negated) = self.transform.pair(*confidence)?;
                let (c, definition, counter) = define(&nnf, &self.set.symbols, counter)?;
                self.set.symbols.absorb_auxiliaries(counter);
                self.set.hard.extend(definition.clauses);
                self.add_soft(Clause::unit(c), asserted);
                self.add_soft(Clause::unit(-c), negated);
            }
        }
        Ok(())
    }

    fn add_soft(&mut self, clause: Clause, weight: u64) {
        let entry = self.set.soft.entry(clause).or_insert(0);
        *entry = entry.saturating_add(weight);
    }

    pub fn finish(self) -> WeightedClauseSet {
        self.set
    }
}

/// Encode a whole constraint list
pub fn encode(constraints: &[Constraint], transform: WeightTransform) -> Result<WeightedClauseSet> {
    let mut encoder = WeightedEncoder::new(transform);
    for constraint in constraints {
        encoder.add(constraint)?;
    }
    Ok(encoder.finish())
}
