//! Structure-preserving (Tseitin) clausification
//!
//! Every conjunction or disjunction below the root is replaced by a fresh
//! auxiliary proposition `a`, and clauses for `a <=> subformula` are added.
//! The root's own clauses are asserted directly. Output size is linear in
//! the size of the NNF tree.
//!
//! Auxiliary ids come from an explicit `AuxCounter`: the caller passes the
//! counter in and gets the advanced counter back, so a fixed tree and a
//! fixed starting counter always produce the same clauses.

use super::nnf::Nnf;
use crate::error::{LogifyError, Result};
use crate::logic::{AuxCounter, Clause, Literal, PropId, PropositionResolver};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Clauses produced for one formula
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clausified {
    /// Clauses in emission order, without duplicates or tautologies
    pub clauses: Vec<Clause>,
    /// Auxiliary propositions introduced, in allocation order
    pub auxiliaries: Vec<PropId>,
}

/// Clausify `nnf`, asserting it.
///
/// Every proposition name in the tree must resolve through `resolver`.
pub fn clausify<R>(nnf: &Nnf, resolver: &R, counter: AuxCounter) -> Result<(Clausified, AuxCounter)>
where
    R: PropositionResolver + ?Sized,
{
    let mut tseitin = Tseitin::new(resolver, counter);
    tseitin.assert_root(nnf)?;
    Ok(tseitin.finish())
}

/// Clausify only the definition of `nnf`, returning a literal equivalent to
/// it instead of asserting it.
///
/// A bare literal is returned as-is with no clauses. Anything else gets an
/// auxiliary `c` with clauses for `c <=> nnf`.
pub fn define<R>(
    nnf: &Nnf,
    resolver: &R,
    counter: AuxCounter,
) -> Result<(Literal, Clausified, AuxCounter)>
where
    R: PropositionResolver + ?Sized,
{
    let mut tseitin = Tseitin::new(resolver, counter);
    let lit = tseitin.literal_for(nnf)?;
    let (clausified, counter) = tseitin.finish();
    Ok((lit, clausified, counter))
}

struct Tseitin<'r, R: ?Sized> {
    resolver: &'r R,
    counter: AuxCounter,
    clauses: IndexSet<Clause>,
    auxiliaries: Vec<PropId>,
    /// Literal of every composite node already visited, by address
    visited: HashMap<*const Nnf, Literal>,
    /// Structurally equal subformulas share one auxiliary: the key is the
    /// connective and the operand literals
    definitions: HashMap<(bool, Vec<Literal>), Literal>,
}

impl<'r, R> Tseitin<'r, R>
where
    R: PropositionResolver + ?Sized,
{
    fn new(resolver: &'r R, counter: AuxCounter) -> Self {
        Tseitin {
            resolver,
            counter,
            clauses: IndexSet::new(),
            auxiliaries: Vec::new(),
            visited: HashMap::new(),
            definitions: HashMap::new(),
        }
    }

    fn finish(self) -> (Clausified, AuxCounter) {
        tracing::trace!(
            clauses = self.clauses.len(),
            auxiliaries = self.auxiliaries.len(),
            "clausified"
        );
        (
            Clausified {
                clauses: self.clauses.into_iter().collect(),
                auxiliaries: self.auxiliaries,
            },
            self.counter,
        )
    }

    fn emit(&mut self, literals: Vec<Literal>) {
        let clause = Clause::new(literals);
        if !clause.is_tautology() {
            self.clauses.insert(clause);
        }
    }

    fn resolve(&self, name: &str, positive: bool) -> Result<Literal> {
        self.resolver
            .resolve(name)
            .map(|id| Literal::new(id, positive))
            .ok_or_else(|| LogifyError::UnknownProposition {
                name: name.to_string(),
            })
    }

    /// Conjunctions at the root are split into separate assertions; a
    /// disjunction becomes one clause over its operands' literals
    fn assert_root(&mut self, root: &Nnf) -> Result<()> {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node {
                Nnf::Literal { name, positive } => {
                    let lit = self.resolve(name, *positive)?;
                    self.emit(vec![lit]);
                }
                Nnf::And(children) => stack.extend(children.iter().rev().map(|c| &**c)),
                Nnf::Or(children) => {
                    let literals = children
                        .iter()
                        .map(|child| self.literal_for(child))
                        .collect::<Result<Vec<_>>>()?;
                    self.emit(literals);
                }
            }
        }
        Ok(())
    }

    /// Literal equivalent to `root`, defining auxiliaries bottom-up
    fn literal_for(&mut self, root: &Nnf) -> Result<Literal> {
        enum Visit<'n> {
            Enter(&'n Nnf),
            Define(&'n Nnf, bool, usize),
        }

        let mut stack = vec![Visit::Enter(root)];
        let mut operands: Vec<Literal> = Vec::new();
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(node) => {
                    let (children, conjunction) = match node {
                        Nnf::Literal { name, positive } => {
                            operands.push(self.resolve(name, *positive)?);
                            continue;
                        }
                        Nnf::And(children) => (children, true),
                        Nnf::Or(children) => (children, false),
                    };
                    if let Some(&lit) = self.visited.get(&(node as *const Nnf)) {
                        operands.push(lit);
                        continue;
                    }
                    stack.push(Visit::Define(node, conjunction, children.len()));
                    stack.extend(children.iter().rev().map(|c| Visit::Enter(&**c)));
                }
                Visit::Define(node, conjunction, n) => {
                    let children = operands.split_off(operands.len() - n);
                    let lit = self.define_node(conjunction, children);
                    self.visited.insert(node as *const Nnf, lit);
                    operands.push(lit);
                }
            }
        }
        Ok(operands.pop().unwrap_or_else(|| unreachable!()))
    }

    /// Fresh auxiliary `a` with clauses for `a <=> op(operands)`
    fn define_node(&mut self, conjunction: bool, operands: Vec<Literal>) -> Literal {
        let key = (conjunction, operands);
        if let Some(&lit) = self.definitions.get(&key) {
            return lit;
        }

        let (aux, counter) = self.counter.fresh();
        self.counter = counter;
        self.auxiliaries.push(aux);
        let a = aux.positive();
        let operands = &key.1;

        if conjunction {
            // a => x_i
            for &x in operands {
                self.emit(vec![-a, x]);
            }
            // x_1 & ... & x_n => a
            let mut back: Vec<Literal> = operands.iter().map(|&x| -x).collect();
            back.push(a);
            self.emit(back);
        } else {
            // a => x_1 | ... | x_n
            let mut forth = operands.clone();
            forth.push(-a);
            self.emit(forth);
            // x_i => a
            for &x in operands {
                self.emit(vec![a, -x]);
            }
        }

        self.definitions.insert(key, a);
        a
    }
}
