//! Propositional formula trees
//!
//! A `Formula` is an owned tree over named propositions. Every
//! transformation stage (normalisation, clausification) consumes one tree
//! and produces a new one; trees are never shared between stages.

use indexmap::IndexSet;
use std::fmt;

/// Propositional formula over named atoms
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// Proposition, referenced by name
    Atom(String),
    /// Negation
    Not(Box<Formula>),
    /// Conjunction of any number of operands
    And(Vec<Formula>),
    /// Disjunction of any number of operands
    Or(Vec<Formula>),
    /// Implication
    Implies(Box<Formula>, Box<Formula>),
    /// Biconditional
    Iff(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn atom(name: impl Into<String>) -> Self {
        Formula::Atom(name.into())
    }

    pub fn not(f: Formula) -> Self {
        Formula::Not(Box::new(f))
    }

    pub fn implies(a: Formula, b: Formula) -> Self {
        Formula::Implies(Box::new(a), Box::new(b))
    }

    pub fn iff(a: Formula, b: Formula) -> Self {
        Formula::Iff(Box::new(a), Box::new(b))
    }

    /// Negate this formula, consuming it
    pub fn negated(self) -> Self {
        Formula::Not(Box::new(self))
    }

    /// Distinct proposition names in first-occurrence order (left to right)
    pub fn propositions(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        let mut stack = vec![self];
        while let Some(f) = stack.pop() {
            match f {
                Formula::Atom(name) => {
                    if !names.contains(name.as_str()) {
                        names.insert(name.clone());
                    }
                }
                Formula::Not(inner) => stack.push(inner),
                Formula::And(fs) | Formula::Or(fs) => stack.extend(fs.iter().rev()),
                Formula::Implies(a, b) | Formula::Iff(a, b) => {
                    stack.push(b);
                    stack.push(a);
                }
            }
        }
        names
    }

    /// Evaluate under an assignment of truth values to proposition names
    pub fn evaluate<F>(&self, value: &F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match self {
            Formula::Atom(name) => value(name),
            Formula::Not(f) => !f.evaluate(value),
            Formula::And(fs) => fs.iter().all(|f| f.evaluate(value)),
            Formula::Or(fs) => fs.iter().any(|f| f.evaluate(value)),
            Formula::Implies(a, b) => !a.evaluate(value) || b.evaluate(value),
            Formula::Iff(a, b) => a.evaluate(value) == b.evaluate(value),
        }
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(f) = stack.pop() {
            count += 1;
            match f {
                Formula::Atom(_) => {}
                Formula::Not(inner) => stack.push(inner),
                Formula::And(fs) | Formula::Or(fs) => stack.extend(fs),
                Formula::Implies(a, b) | Formula::Iff(a, b) => {
                    stack.push(a);
                    stack.push(b);
                }
            }
        }
        count
    }

    /// Binding strength used by `Display` to decide where parentheses go.
    /// Higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Formula::Iff(..) => 1,
            Formula::Implies(..) => 2,
            Formula::Or(fs) | Formula::And(fs) if fs.len() == 1 => fs[0].precedence(),
            Formula::Or(fs) | Formula::And(fs) if fs.is_empty() => 5,
            Formula::Or(_) => 3,
            Formula::And(_) => 4,
            Formula::Not(_) | Formula::Atom(_) => 5,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Prints with the fewest parentheses the grammar needs; every tree the
/// parser produces reads back to an equal tree.
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Atom(name) => write!(f, "{}", name),
            Formula::Not(inner) => {
                write!(f, "~")?;
                inner.fmt_operand(f, 5)
            }
            // Empty connectives have no surface syntax.
            Formula::And(fs) if fs.is_empty() => write!(f, "true"),
            Formula::Or(fs) if fs.is_empty() => write!(f, "false"),
            Formula::And(fs) | Formula::Or(fs) if fs.len() == 1 => fmt::Display::fmt(&fs[0], f),
            Formula::And(fs) | Formula::Or(fs) => {
                let (op, prec) = if matches!(self, Formula::And(_)) {
                    (" & ", 4)
                } else {
                    (" | ", 3)
                };
                for (i, sub) in fs.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", op)?;
                    }
                    // Same-kind children are parenthesised so the n-ary
                    // structure survives a parse round trip.
                    sub.fmt_operand(f, prec + 1)?;
                }
                Ok(())
            }
            Formula::Implies(a, b) => {
                a.fmt_operand(f, 3)?;
                write!(f, " => ")?;
                b.fmt_operand(f, 2)
            }
            Formula::Iff(a, b) => {
                a.fmt_operand(f, 2)?;
                write!(f, " <=> ")?;
                b.fmt_operand(f, 1)
            }
        }
    }
}
