//! Dependency graph between labels.
//!
//! Stores a set of ordered pairs `(s, t)`, read as "s depends on t". In the
//! spreadsheet, `s` is a formula cell and `t` a variable its formula
//! references. Following the naming of the pair positions:
//!
//! - the *dependents* of `s` are every `t` with `(s, t)` in the graph;
//! - the *dependees* of `t` are every `s` with `(s, t)` in the graph.
//!
//! Both directions are indexed, so either query is a map lookup. A label
//! whose set becomes empty is removed from the index entirely.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// s -> { t | (s, t) }
    forward: BTreeMap<String, BTreeSet<String>>,
    /// t -> { s | (s, t) }
    reverse: BTreeMap<String, BTreeSet<String>>,
    pairs: usize,
}

fn link(index: &mut BTreeMap<String, BTreeSet<String>>, key: &str, value: &str) -> bool {
    index
        .entry(key.to_string())
        .or_default()
        .insert(value.to_string())
}

fn unlink(index: &mut BTreeMap<String, BTreeSet<String>>, key: &str, value: &str) -> bool {
    let Some(set) = index.get_mut(key) else {
        return false;
    };
    let removed = set.remove(value);
    if set.is_empty() {
        index.remove(key);
    }
    removed
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pairs in the graph.
    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }

    /// Number of labels `s` with `(s, t)` in the graph.
    pub fn dependee_count(&self, t: &str) -> usize {
        self.reverse.get(t).map_or(0, BTreeSet::len)
    }

    pub fn has_dependents(&self, s: &str) -> bool {
        self.forward.contains_key(s)
    }

    pub fn has_dependees(&self, t: &str) -> bool {
        self.reverse.contains_key(t)
    }

    /// Every `t` with `(s, t)` in the graph, in sorted order.
    pub fn dependents(&self, s: &str) -> impl Iterator<Item = &str> + '_ {
        self.forward
            .get(s)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Every `s` with `(s, t)` in the graph, in sorted order.
    pub fn dependees(&self, t: &str) -> impl Iterator<Item = &str> + '_ {
        self.reverse
            .get(t)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Add `(s, t)`. Adding a pair that is already present does nothing.
    pub fn add_dependency(&mut self, s: &str, t: &str) {
        if link(&mut self.forward, s, t) {
            link(&mut self.reverse, t, s);
            self.pairs += 1;
        }
    }

    /// Remove `(s, t)` if present.
    pub fn remove_dependency(&mut self, s: &str, t: &str) {
        if unlink(&mut self.forward, s, t) {
            unlink(&mut self.reverse, t, s);
            self.pairs -= 1;
        }
    }

    /// Replace every `(s, _)` pair with `(s, t)` for each `t` in
    /// `new_dependents`.
    pub fn replace_dependents<I, S>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let old: Vec<String> = self.dependents(s).map(str::to_string).collect();
        for t in &old {
            self.remove_dependency(s, t);
        }
        for t in new_dependents {
            self.add_dependency(s, t.as_ref());
        }
    }

    /// Replace every `(_, t)` pair with `(s, t)` for each `s` in
    /// `new_dependees`.
    pub fn replace_dependees<I, S>(&mut self, t: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let old: Vec<String> = self.dependees(t).map(str::to_string).collect();
        for s in &old {
            self.remove_dependency(s, t);
        }
        for s in new_dependees {
            self.add_dependency(s.as_ref(), t);
        }
    }
}
