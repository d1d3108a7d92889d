//! Proposition table: bidirectional name/id mapping for one knowledge base
//!
//! Named and auxiliary propositions share a single dense id space starting
//! at 1. Ids are handed out at first encounter and never reused, so an
//! encoding built against a table stays valid for as long as the table
//! lives. Auxiliary ids are flagged and carry no name.

use super::literal::PropId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Named(String),
    Auxiliary,
}

/// Resolves proposition names to ids
pub trait PropositionResolver {
    fn resolve(&self, name: &str) -> Option<PropId>;
}

/// Next free id for auxiliary propositions.
///
/// Threaded explicitly through clausification: a call takes a counter and
/// returns the advanced one, so the same input and starting counter always
/// yield the same ids.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuxCounter(u32);

impl AuxCounter {
    /// Counter whose first fresh id is `next`
    pub fn starting_at(next: PropId) -> Self {
        AuxCounter(next.get())
    }

    /// Allocate one id, returning it with the advanced counter
    pub fn fresh(self) -> (PropId, AuxCounter) {
        let id = PropId::new(self.0).unwrap_or_else(|| unreachable!("counter starts at 1"));
        (id, AuxCounter(self.0 + 1))
    }

    /// The id the next call to `fresh` would return
    pub fn peek(self) -> PropId {
        PropId::new(self.0).unwrap_or_else(|| unreachable!("counter starts at 1"))
    }
}

/// Symbol table for the propositions of one knowledge base
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Entries indexed by `PropId::index`
    entries: Vec<Entry>,
    /// Lookup table from name to id
    lookup: HashMap<String, PropId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            entries: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Intern a name, returning its id (get-or-create)
    pub fn intern(&mut self, name: &str) -> PropId {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = self.next_id();
        self.entries.push(Entry::Named(name.to_string()));
        self.lookup.insert(name.to_string(), id);
        id
    }

    /// Get the id for an already-interned name
    pub fn get(&self, name: &str) -> Option<PropId> {
        self.lookup.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Name of a named proposition; None for auxiliaries and unknown ids
    pub fn name(&self, id: PropId) -> Option<&str> {
        match self.entries.get(id.index()) {
            Some(Entry::Named(name)) => Some(name),
            _ => None,
        }
    }

    pub fn is_auxiliary(&self, id: PropId) -> bool {
        matches!(self.entries.get(id.index()), Some(Entry::Auxiliary))
    }

    /// Id that the next interned name or auxiliary will receive
    pub fn next_id(&self) -> PropId {
        PropId::new(self.entries.len() as u32 + 1).unwrap_or_else(|| unreachable!())
    }

    /// Counter for clausification starting after every id in the table
    pub fn aux_counter(&self) -> AuxCounter {
        AuxCounter::starting_at(self.next_id())
    }

    /// Record every id handed out by `counter` beyond the table's end as
    /// auxiliary. Returns the newly registered ids.
    pub fn absorb_auxiliaries(&mut self, counter: AuxCounter) -> Vec<PropId> {
        let mut added = Vec::new();
        while self.next_id() < counter.peek() {
            added.push(self.next_id());
            self.entries.push(Entry::Auxiliary);
        }
        added
    }

    /// Number of propositions (named and auxiliary)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn named_count(&self) -> usize {
        self.lookup.len()
    }

    /// Named propositions in id order
    pub fn named(&self) -> impl Iterator<Item = (PropId, &str)> {
        self.entries.iter().enumerate().filter_map(|(i, e)| match e {
            Entry::Named(name) => PropId::new(i as u32 + 1).map(|id| (id, name.as_str())),
            Entry::Auxiliary => None,
        })
    }

    /// Auxiliary propositions in id order
    pub fn auxiliaries(&self) -> impl Iterator<Item = PropId> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| match e {
            Entry::Auxiliary => PropId::new(i as u32 + 1),
            Entry::Named(_) => None,
        })
    }
}

impl PropositionResolver for SymbolTable {
    fn resolve(&self, name: &str) -> Option<PropId> {
        self.get(name)
    }
}

/// Per-query extension of a table.
///
/// Names the table does not know get ids after every id in the table.
/// The table itself is never touched, so concurrent queries against one
/// knowledge base see identical numbering.
#[derive(Debug)]
pub struct QueryScope<'a> {
    base: &'a SymbolTable,
    extra: HashMap<String, PropId>,
    next: u32,
}

impl<'a> QueryScope<'a> {
    pub fn new(base: &'a SymbolTable) -> Self {
        QueryScope {
            base,
            extra: HashMap::new(),
            next: base.next_id().get(),
        }
    }

    /// Intern a name in the scope; returns the id and whether it is new to
    /// the underlying table
    pub fn intern(&mut self, name: &str) -> (PropId, bool) {
        if let Some(id) = self.base.get(name) {
            return (id, false);
        }
        if let Some(&id) = self.extra.get(name) {
            return (id, true);
        }
        let id = PropId::new(self.next).unwrap_or_else(|| unreachable!());
        self.next += 1;
        self.extra.insert(name.to_string(), id);
        (id, true)
    }

    pub fn aux_counter(&self) -> AuxCounter {
        AuxCounter(self.next)
    }
}

impl PropositionResolver for QueryScope<'_> {
    fn resolve(&self, name: &str) -> Option<PropId> {
        self.base.get(name).or_else(|| self.extra.get(name).copied())
    }
}
