//! Negation normal form
//!
//! `Nnf` can only express literals, conjunction and disjunction, so a value
//! of this type is in NNF by construction. Children are reference counted:
//! a subformula that the `<=>` rewrite needs twice in the same polarity is
//! built once and shared, which keeps the result linear in the input.

use crate::logic::Formula;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Formula in negation normal form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nnf {
    /// Proposition or negated proposition
    Literal { name: String, positive: bool },
    /// Conjunction; empty means true
    And(Vec<Arc<Nnf>>),
    /// Disjunction; empty means false
    Or(Vec<Arc<Nnf>>),
}

impl Nnf {
    pub fn positive(name: impl Into<String>) -> Self {
        Nnf::Literal {
            name: name.into(),
            positive: true,
        }
    }

    pub fn negative(name: impl Into<String>) -> Self {
        Nnf::Literal {
            name: name.into(),
            positive: false,
        }
    }

    pub fn and(children: Vec<Nnf>) -> Self {
        Nnf::And(children.into_iter().map(Arc::new).collect())
    }

    pub fn or(children: Vec<Nnf>) -> Self {
        Nnf::Or(children.into_iter().map(Arc::new).collect())
    }

    pub fn evaluate<F>(&self, value: &F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        fn eval<F: Fn(&str) -> bool>(
            node: &Nnf,
            value: &F,
            seen: &mut HashMap<*const Nnf, bool>,
        ) -> bool {
            let key = node as *const Nnf;
            if let Some(&v) = seen.get(&key) {
                return v;
            }
            let v = match node {
                Nnf::Literal { name, positive } => value(name) == *positive,
                Nnf::And(fs) => fs.iter().all(|f| eval(f, value, seen)),
                Nnf::Or(fs) => fs.iter().any(|f| eval(f, value, seen)),
            };
            seen.insert(key, v);
            v
        }
        eval(self, value, &mut HashMap::new())
    }

    /// Number of distinct nodes; a shared subformula counts once
    pub fn size(&self) -> usize {
        let mut seen: HashSet<*const Nnf> = HashSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if !seen.insert(node as *const Nnf) {
                continue;
            }
            if let Nnf::And(fs) | Nnf::Or(fs) = node {
                stack.extend(fs.iter().map(|f| &**f));
            }
        }
        seen.len()
    }
}

/// Convert to negation normal form.
///
/// Rewrites `a => b` to `~a | b` and `a <=> b` to `(~a | b) & (~b | a)`,
/// pushes negations to the atoms with De Morgan's laws and drops double
/// negations. Nested conjunctions (disjunctions) are flattened into their
/// parent. Each subformula is converted at most once per polarity and the
/// result shared, so the output stays linear in the size of the input.
/// Runs on an explicit work stack, so deep formulas do not exhaust the call
/// stack.
pub fn normalize(formula: &Formula) -> Nnf {
    type Key = (*const Formula, bool);

    enum WorkItem<'f> {
        Process(&'f Formula, bool), // (formula, negate)
        CombineAnd(usize, Option<Key>),
        CombineOr(usize, Option<Key>),
    }

    let mut stack: Vec<WorkItem<'_>> = vec![WorkItem::Process(formula, false)];
    let mut results: Vec<Arc<Nnf>> = Vec::new();
    let mut done: HashMap<Key, Arc<Nnf>> = HashMap::new();

    while let Some(item) = stack.pop() {
        match item {
            WorkItem::Process(formula, negate) => {
                let key = (formula as *const Formula, negate);
                if let Some(shared) = done.get(&key) {
                    results.push(Arc::clone(shared));
                    continue;
                }
                match formula {
                    Formula::Atom(name) => results.push(Arc::new(Nnf::Literal {
                        name: name.clone(),
                        positive: !negate,
                    })),

                    // Double negation - just flip and continue
                    Formula::Not(f) => stack.push(WorkItem::Process(f, !negate)),

                    // ~(A & B) = ~A | ~B
                    Formula::And(fs) => {
                        stack.push(if negate {
                            WorkItem::CombineOr(fs.len(), Some(key))
                        } else {
                            WorkItem::CombineAnd(fs.len(), Some(key))
                        });
                        for f in fs.iter().rev() {
                            stack.push(WorkItem::Process(f, negate));
                        }
                    }

                    // ~(A | B) = ~A & ~B
                    Formula::Or(fs) => {
                        stack.push(if negate {
                            WorkItem::CombineAnd(fs.len(), Some(key))
                        } else {
                            WorkItem::CombineOr(fs.len(), Some(key))
                        });
                        for f in fs.iter().rev() {
                            stack.push(WorkItem::Process(f, negate));
                        }
                    }

                    // A => B = ~A | B
                    Formula::Implies(a, b) if !negate => {
                        stack.push(WorkItem::CombineOr(2, Some(key)));
                        stack.push(WorkItem::Process(b, false));
                        stack.push(WorkItem::Process(a, true));
                    }
                    // ~(A => B) = A & ~B
                    Formula::Implies(a, b) => {
                        stack.push(WorkItem::CombineAnd(2, Some(key)));
                        stack.push(WorkItem::Process(b, true));
                        stack.push(WorkItem::Process(a, false));
                    }

                    // A <=> B = (~A | B) & (~B | A)
                    Formula::Iff(a, b) if !negate => {
                        stack.push(WorkItem::CombineAnd(2, Some(key)));
                        // Second Or: (~B | A)
                        stack.push(WorkItem::CombineOr(2, None));
                        stack.push(WorkItem::Process(a, false));
                        stack.push(WorkItem::Process(b, true));
                        // First Or: (~A | B)
                        stack.push(WorkItem::CombineOr(2, None));
                        stack.push(WorkItem::Process(b, false));
                        stack.push(WorkItem::Process(a, true));
                    }
                    // ~(A <=> B) = (A & ~B) | (B & ~A)
                    Formula::Iff(a, b) => {
                        stack.push(WorkItem::CombineOr(2, Some(key)));
                        // Second And: (B & ~A)
                        stack.push(WorkItem::CombineAnd(2, None));
                        stack.push(WorkItem::Process(a, true));
                        stack.push(WorkItem::Process(b, false));
                        // First And: (A & ~B)
                        stack.push(WorkItem::CombineAnd(2, None));
                        stack.push(WorkItem::Process(b, true));
                        stack.push(WorkItem::Process(a, false));
                    }
                }
            }

            WorkItem::CombineAnd(n, key) => {
                let children = results.split_off(results.len() - n);
                let node = combine(children, true);
                if let Some(key) = key {
                    done.insert(key, Arc::clone(&node));
                }
                results.push(node);
            }

            WorkItem::CombineOr(n, key) => {
                let children = results.split_off(results.len() - n);
                let node = combine(children, false);
                if let Some(key) = key {
                    done.insert(key, Arc::clone(&node));
                }
                results.push(node);
            }
        }
    }

    match results.pop() {
        Some(root) => Nnf::clone(&root),
        None => Nnf::And(Vec::new()),
    }
}

/// Build an n-ary node, splicing in children of the same kind
fn combine(children: Vec<Arc<Nnf>>, conjunction: bool) -> Arc<Nnf> {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match &*child {
            Nnf::And(grandchildren) if conjunction => flat.extend(grandchildren.iter().cloned()),
            Nnf::Or(grandchildren) if !conjunction => flat.extend(grandchildren.iter().cloned()),
            _ => flat.push(child),
        }
    }
    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            return only;
        }
    }
    Arc::new(if conjunction {
        Nnf::And(flat)
    } else {
        Nnf::Or(flat)
    })
}
