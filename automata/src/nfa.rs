use std::{
    collections::BTreeSet,
    fmt::{Debug, Display},
};

use bit_set::BitSet;
use itertools::Itertools;

use crate::{Acceptor, AutomatonError, CharAlphabet, Dfa, StateId, Symbol};

/// An edge of an [`Nfa`]. A `label` of `None` marks an epsilon edge. Edges are ordered by source,
/// then label (epsilon first, then symbols in ascending order) and finally target.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NfaEdge {
    /// The state in which the edge starts.
    pub source: StateId,
    /// The symbol on the edge, `None` for an epsilon edge.
    pub label: Option<Symbol>,
    /// The state in which the edge ends.
    pub target: StateId,
}

impl NfaEdge {
    /// Creates a new edge.
    pub fn new(source: StateId, label: Option<Symbol>, target: StateId) -> Self {
        Self {
            source,
            label,
            target,
        }
    }

    /// Returns true if this is an epsilon edge.
    pub fn is_epsilon(&self) -> bool {
        self.label.is_none()
    }
}

impl Display for NfaEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.label {
            Some(sym) => write!(f, "{} -{}-> {}", self.source, sym, self.target),
            None => write!(f, "{} -ε-> {}", self.source, self.target),
        }
    }
}

/// A nondeterministic finite automaton with optional epsilon edges.
///
/// States are the indices `0..self.size()`, there may be any number of initial states and the
/// edges are kept in an ordered set, so iterating over them is deterministic.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Nfa {
    alphabet: CharAlphabet,
    initial: BTreeSet<StateId>,
    accepting: Vec<bool>,
    edges: BTreeSet<NfaEdge>,
}

impl Nfa {
    /// Creates an automaton without states.
    pub fn new(alphabet: CharAlphabet) -> Self {
        Self {
            alphabet,
            initial: BTreeSet::new(),
            accepting: vec![],
            edges: BTreeSet::new(),
        }
    }

    pub(crate) fn from_raw(
        alphabet: CharAlphabet,
        initial: BTreeSet<StateId>,
        accepting: Vec<bool>,
        edges: BTreeSet<NfaEdge>,
    ) -> Self {
        Self {
            alphabet,
            initial,
            accepting,
            edges,
        }
    }

    /// Builds an NFA from its edges, initial and accepting states. The number of states is one
    /// more than the largest state index that is mentioned.
    pub fn from_parts<E, I, F>(
        alphabet: CharAlphabet,
        edges: E,
        initial: I,
        accepting: F,
    ) -> Result<Self, AutomatonError>
    where
        E: IntoIterator<Item = (StateId, Option<Symbol>, StateId)>,
        I: IntoIterator<Item = StateId>,
        F: IntoIterator<Item = StateId>,
    {
        let edges = edges.into_iter().collect_vec();
        let initial = initial.into_iter().collect_vec();
        let accepting = accepting.into_iter().collect_vec();
        let size = edges
            .iter()
            .flat_map(|(p, _, q)| [*p, *q])
            .chain(initial.iter().copied())
            .chain(accepting.iter().copied())
            .max()
            .map_or(0, |max| max + 1);

        let mut nfa = Self::new(alphabet);
        nfa.accepting = vec![false; size];
        for (source, label, target) in edges {
            nfa.add_edge(NfaEdge::new(source, label, target))?;
        }
        for q in initial {
            nfa.add_initial(q)?;
        }
        for q in accepting {
            nfa.set_accepting(q, true)?;
        }
        Ok(nfa)
    }

    fn check_state(&self, q: StateId) -> Result<(), AutomatonError> {
        if q < self.size() {
            Ok(())
        } else {
            Err(AutomatonError::UnknownState(q))
        }
    }

    /// Adds a new state and returns its index.
    pub fn add_state(&mut self, accepting: bool) -> StateId {
        self.accepting.push(accepting);
        self.accepting.len() - 1
    }

    /// Makes `q` an initial state.
    pub fn add_initial(&mut self, q: StateId) -> Result<(), AutomatonError> {
        self.check_state(q)?;
        self.initial.insert(q);
        Ok(())
    }

    /// Marks the state `q` as accepting or rejecting.
    pub fn set_accepting(&mut self, q: StateId, accepting: bool) -> Result<(), AutomatonError> {
        let flag = self
            .accepting
            .get_mut(q)
            .ok_or(AutomatonError::UnknownState(q))?;
        *flag = accepting;
        Ok(())
    }

    /// Inserts an edge, returns true if it was not present before.
    pub fn add_edge(&mut self, edge: NfaEdge) -> Result<bool, AutomatonError> {
        self.check_state(edge.source)?;
        self.check_state(edge.target)?;
        if let Some(symbol) = edge.label {
            if !self.alphabet.contains(symbol) {
                return Err(AutomatonError::UnknownSymbol(symbol));
            }
        }
        Ok(self.edges.insert(edge))
    }

    /// Removes an edge, returns true if it was present.
    pub fn remove_edge(&mut self, edge: &NfaEdge) -> bool {
        self.edges.remove(edge)
    }

    /// Returns true if the automaton contains the given edge.
    pub fn contains_edge(&self, edge: &NfaEdge) -> bool {
        self.edges.contains(edge)
    }

    /// The alphabet over which the automaton reads words.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.accepting.len()
    }

    /// Returns an iterator over all state indices.
    pub fn states(&self) -> std::ops::Range<StateId> {
        0..self.size()
    }

    /// The set of initial states.
    pub fn initial(&self) -> &BTreeSet<StateId> {
        &self.initial
    }

    /// Returns true if `q` exists and is accepting.
    pub fn is_accepting(&self, q: StateId) -> bool {
        self.accepting.get(q).copied().unwrap_or(false)
    }

    /// Returns an iterator over all edges in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = &NfaEdge> + '_ {
        self.edges.iter()
    }

    /// The number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns an iterator over the edges leaving `q`, ordered by label and target.
    pub fn edges_from(&self, q: StateId) -> impl Iterator<Item = &NfaEdge> + '_ {
        self.edges
            .range(NfaEdge::new(q, None, 0)..)
            .take_while(move |e| e.source == q)
    }

    /// Returns true if some edge is an epsilon edge.
    pub fn has_epsilon(&self) -> bool {
        self.edges.iter().any(NfaEdge::is_epsilon)
    }

    /// Checks that every state index is in range and every label is part of the alphabet.
    pub fn validate(&self) -> Result<(), AutomatonError> {
        for edge in &self.edges {
            self.check_state(edge.source)?;
            self.check_state(edge.target)?;
            if let Some(sym) = edge.label.filter(|sym| !self.alphabet.contains(*sym)) {
                return Err(AutomatonError::UnknownSymbol(sym));
            }
        }
        self.initial.iter().try_for_each(|q| self.check_state(*q))
    }

    /// Extends `states` by everything that is reachable through epsilon edges.
    pub fn epsilon_closure(&self, states: &BitSet) -> BitSet {
        let mut closure = states.clone();
        let mut stack = states.iter().collect_vec();
        while let Some(q) = stack.pop() {
            for edge in self.edges_from(q).filter(|e| e.is_epsilon()) {
                if closure.insert(edge.target) {
                    stack.push(edge.target);
                }
            }
        }
        closure
    }

    /// The epsilon closure of the initial states.
    pub fn initial_closure(&self) -> BitSet {
        self.epsilon_closure(&self.initial.iter().copied().collect())
    }

    /// Computes the epsilon closed set of states that is reached from `states` by reading `symbol`.
    pub fn step(&self, states: &BitSet, symbol: Symbol) -> BitSet {
        let direct: BitSet = states
            .iter()
            .flat_map(|q| self.edges_from(q))
            .filter(|e| e.label == Some(symbol))
            .map(|e| e.target)
            .collect();
        self.epsilon_closure(&direct)
    }

    /// Returns true if some state in `states` is accepting.
    pub fn any_accepting(&self, states: &BitSet) -> bool {
        states.iter().any(|q| self.is_accepting(q))
    }

    /// Gives back an equivalent automaton without epsilon edges that has the same states. A state
    /// gets every symbol edge of the states in its epsilon closure and is accepting if its closure
    /// contains an accepting state.
    pub fn without_epsilon(&self) -> Nfa {
        if !self.has_epsilon() {
            return self.clone();
        }
        let mut out = Nfa {
            alphabet: self.alphabet.clone(),
            initial: self.initial.clone(),
            accepting: self.accepting.clone(),
            edges: BTreeSet::new(),
        };
        for q in self.states() {
            let closure = self.epsilon_closure(&BitSet::from_iter([q]));
            out.accepting[q] = self.any_accepting(&closure);
            for p in closure.iter() {
                out.edges.extend(
                    self.edges_from(p)
                        .filter(|e| !e.is_epsilon())
                        .map(|e| NfaEdge::new(q, e.label, e.target)),
                );
            }
        }
        out
    }

    /// The set of states that can be reached from an initial state.
    pub fn reachable(&self) -> BitSet {
        let mut seen: BitSet = self.initial.iter().copied().collect();
        let mut stack = self.initial.iter().copied().collect_vec();
        while let Some(q) = stack.pop() {
            for edge in self.edges_from(q) {
                if seen.insert(edge.target) {
                    stack.push(edge.target);
                }
            }
        }
        seen
    }

    /// The set of states from which an accepting state can be reached.
    pub fn coreachable(&self) -> BitSet {
        let mut seen: BitSet = self.states().filter(|q| self.accepting[*q]).collect();
        let mut changed = true;
        while changed {
            changed = false;
            for edge in &self.edges {
                if seen.contains(edge.target) && seen.insert(edge.source) {
                    changed = true;
                }
            }
        }
        seen
    }

    /// Removes the state `q` together with all edges touching it. States with a larger index are
    /// shifted down by one.
    pub fn remove_state(&self, q: StateId) -> Result<Nfa, AutomatonError> {
        self.check_state(q)?;
        let shift = |p: StateId| if p > q { p - 1 } else { p };
        let mut accepting = self.accepting.clone();
        accepting.remove(q);
        Ok(Nfa {
            alphabet: self.alphabet.clone(),
            initial: self
                .initial
                .iter()
                .filter(|p| **p != q)
                .map(|p| shift(*p))
                .collect(),
            accepting,
            edges: self
                .edges
                .iter()
                .filter(|e| e.source != q && e.target != q)
                .map(|e| NfaEdge::new(shift(e.source), e.label, shift(e.target)))
                .collect(),
        })
    }

    /// Merges the state `merged` into `kept`: every edge touching `merged` is moved to `kept`,
    /// `kept` becomes accepting (or initial) if either of the two was, and then `merged` is
    /// removed as in [`Nfa::remove_state`].
    pub fn merge_states(&self, kept: StateId, merged: StateId) -> Result<Nfa, AutomatonError> {
        self.check_state(kept)?;
        self.check_state(merged)?;
        if kept == merged {
            return Ok(self.clone());
        }
        let rename = |p: StateId| if p == merged { kept } else { p };
        let mut out = self.clone();
        out.accepting[kept] |= self.accepting[merged];
        if out.initial.remove(&merged) {
            out.initial.insert(kept);
        }
        out.edges = self
            .edges
            .iter()
            .map(|e| NfaEdge::new(rename(e.source), e.label, rename(e.target)))
            .collect();
        out.remove_state(merged)
    }
}

impl From<&Dfa> for Nfa {
    fn from(dfa: &Dfa) -> Self {
        let mut nfa = Nfa::new(dfa.alphabet().clone());
        nfa.accepting = dfa.states().map(|q| dfa.is_accepting(q)).collect();
        nfa.initial.insert(dfa.initial());
        nfa.edges = dfa
            .transitions()
            .map(|(p, a, q)| NfaEdge::new(p, Some(a), q))
            .collect();
        nfa
    }
}

impl Acceptor for Nfa {
    fn accepts(&self, word: &[Symbol]) -> bool {
        let reached = word
            .iter()
            .fold(self.initial_closure(), |states, sym| self.step(&states, *sym));
        self.any_accepting(&reached)
    }
}

impl Debug for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "NFA over {} with initial states {:?}",
            self.alphabet, self.initial
        )?;
        for q in self.states() {
            write!(f, "{}{}", if self.accepting[q] { "*" } else { " " }, q)?;
            for edge in self.edges_from(q) {
                match edge.label {
                    Some(sym) => write!(f, "\t{}->{}", sym, edge.target)?,
                    None => write!(f, "\tε->{}", edge.target)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bit_set::BitSet;

    use crate::{alphabet, tests::even_a, Acceptor, AutomatonError, Nfa, NfaEdge};
    use pretty_assertions::assert_eq;

    fn word(w: &str) -> Vec<char> {
        w.chars().collect()
    }

    /// Accepts words over {a, b} whose second to last symbol is `a`, with an epsilon detour.
    fn second_last_a() -> Nfa {
        Nfa::from_parts(
            alphabet!('a', 'b'),
            [
                (0, Some('a'), 0),
                (0, Some('b'), 0),
                (0, Some('a'), 1),
                (1, None, 2),
                (2, Some('a'), 3),
                (2, Some('b'), 3),
            ],
            [0],
            [3],
        )
        .unwrap()
    }

    #[test]
    fn nfa_acceptance() {
        let nfa = second_last_a();
        for p in ["aa", "ab", "bab", "aaab"] {
            assert!(nfa.accepts(&word(p)), "Should accept {p}");
        }
        for n in ["", "a", "b", "ba", "abb"] {
            assert!(nfa.rejects(&word(n)), "Should reject {n}");
        }
    }

    #[test]
    fn epsilon_removal_keeps_states_and_language() {
        let nfa = second_last_a();
        let free = nfa.without_epsilon();
        assert!(!free.has_epsilon());
        assert_eq!(free.size(), nfa.size());
        assert!(free.contains_edge(&NfaEdge::new(1, Some('a'), 3)));
        for w in ["", "a", "ab", "ba", "bab", "abb", "aaab"] {
            assert_eq!(free.accepts(&word(w)), nfa.accepts(&word(w)), "{w}");
        }
    }

    #[test]
    fn closure_and_reachability() {
        let nfa = second_last_a();
        assert_eq!(
            nfa.epsilon_closure(&BitSet::from_iter([1])),
            BitSet::from_iter([1, 2])
        );
        let mut nfa = nfa;
        let dead = nfa.add_state(false);
        nfa.add_edge(NfaEdge::new(3, Some('a'), dead)).unwrap();
        assert!(nfa.reachable().contains(dead));
        assert!(!nfa.coreachable().contains(dead));
        assert!(nfa.coreachable().contains(0));
    }

    #[test]
    fn remove_and_merge_states() {
        let nfa = Nfa::from(&even_a());
        let mut doubled = nfa.clone();
        let copy = doubled.add_state(true);
        doubled.add_edge(NfaEdge::new(1, Some('a'), copy)).unwrap();
        doubled.add_edge(NfaEdge::new(copy, Some('a'), 1)).unwrap();
        doubled.add_edge(NfaEdge::new(copy, Some('b'), copy)).unwrap();

        let merged = doubled.merge_states(0, copy).unwrap();
        assert_eq!(merged, nfa);

        let removed = doubled.remove_state(copy).unwrap();
        assert_eq!(removed, nfa);
        assert_eq!(
            doubled.remove_state(9).map(|n| n.size()),
            Err(AutomatonError::UnknownState(9))
        );
    }

    #[test]
    fn edges_are_validated() {
        let mut nfa = Nfa::new(alphabet!('a'));
        let q = nfa.add_state(false);
        assert_eq!(
            nfa.add_edge(NfaEdge::new(q, Some('x'), q)),
            Err(AutomatonError::UnknownSymbol('x'))
        );
        assert_eq!(
            nfa.add_edge(NfaEdge::new(q, Some('a'), 4)),
            Err(AutomatonError::UnknownState(4))
        );
        assert_eq!(nfa.add_edge(NfaEdge::new(q, Some('a'), q)), Ok(true));
        assert_eq!(nfa.add_edge(NfaEdge::new(q, Some('a'), q)), Ok(false));
    }
}
