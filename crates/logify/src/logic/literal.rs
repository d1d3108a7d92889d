//! Proposition ids, literals and clauses
//!
//! Literals use the DIMACS convention: a positive integer `n` is
//! proposition `n` true, `-n` is proposition `n` false. Ids start at 1.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::ops::Neg;

/// Identifier of a proposition (named or auxiliary) within one knowledge base
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropId(NonZeroU32);

impl PropId {
    /// Create from a raw 1-based index. Returns None for 0.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(PropId)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Zero-based index, for dense per-proposition tables
    pub fn index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub fn positive(self) -> Literal {
        Literal::new(self, true)
    }

    pub fn negative(self) -> Literal {
        Literal::new(self, false)
    }
}

impl fmt::Display for PropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A signed reference to a proposition
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal(i32);

impl Literal {
    pub fn new(prop: PropId, positive: bool) -> Self {
        let v = prop.get() as i32;
        Literal(if positive { v } else { -v })
    }

    /// Build from a DIMACS integer. Returns None for 0.
    pub fn from_dimacs(value: i32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Literal(value))
        }
    }

    pub fn prop(self) -> PropId {
        // Non-zero by construction
        PropId(NonZeroU32::new(self.0.unsigned_abs()).unwrap_or(NonZeroU32::MIN))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn to_dimacs(self) -> i32 {
        self.0
    }

    /// Whether this literal is true when its proposition has `value`
    pub fn holds(self, value: bool) -> bool {
        self.is_positive() == value
    }
}

impl Neg for Literal {
    type Output = Literal;

    fn neg(self) -> Literal {
        Literal(-self.0)
    }
}

/// Orders by proposition first, negative before positive
impl Ord for Literal {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.0.unsigned_abs(), self.0 > 0).cmp(&(other.0.unsigned_abs(), other.0 > 0))
    }
}

impl PartialOrd for Literal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A clause (disjunction of literals), kept sorted and duplicate-free
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    /// Create a clause; literal order and repetitions are normalised away
    pub fn new(mut literals: Vec<Literal>) -> Self {
        literals.sort_unstable();
        literals.dedup();
        Clause { literals }
    }

    pub fn unit(lit: Literal) -> Self {
        Clause { literals: vec![lit] }
    }

    /// Convenience constructor from DIMACS integers (zeros are skipped)
    pub fn from_dimacs(values: &[i32]) -> Self {
        Clause::new(values.iter().filter_map(|&v| Literal::from_dimacs(v)).collect())
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Check if this clause is empty (contradiction)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if this clause contains complementary literals
    pub fn is_tautology(&self) -> bool {
        // Sorted by proposition, so complements are adjacent
        self.literals
            .windows(2)
            .any(|w| w[0].prop() == w[1].prop() && w[0] != w[1])
    }

    /// Evaluate under a total assignment indexed by `PropId::index`
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        self.literals
            .iter()
            .any(|lit| assignment.get(lit.prop().index()).is_some_and(|&v| lit.holds(v)))
    }

    pub fn max_prop(&self) -> Option<PropId> {
        self.literals.iter().map(|l| l.prop()).max()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, lit) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", lit)?;
        }
        write!(f, "}}")
    }
}
