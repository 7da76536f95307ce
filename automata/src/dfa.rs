use std::fmt::{Debug, Display};

use itertools::Itertools;

use crate::{Acceptor, AutomatonError, CharAlphabet, StateId, Symbol};

/// A deterministic finite automaton over a [`CharAlphabet`].
///
/// States are the indices `0..self.size()`. The transition function is stored as a table that
/// has one row per state and one column per symbol of the alphabet, in the order of the
/// alphabet. While an automaton is being built the table may contain holes, [`Dfa::check_complete`]
/// reports them. A word whose run hits a hole is rejected.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Dfa {
    alphabet: CharAlphabet,
    initial: StateId,
    accepting: Vec<bool>,
    transitions: Vec<Vec<Option<StateId>>>,
}

impl Dfa {
    /// Creates a new instance with a single, rejecting state that serves as the initial state and
    /// has no outgoing transitions.
    pub fn trivial(alphabet: CharAlphabet) -> Self {
        let width = alphabet.size();
        Self {
            alphabet,
            initial: 0,
            accepting: vec![false],
            transitions: vec![vec![None; width]],
        }
    }

    /// Builds a DFA from an iterator over transitions `(source, symbol, target)`, an iterator over
    /// the accepting states and the initial state. The number of states is one more than the
    /// largest state index that is mentioned anywhere.
    ///
    /// Returns an error if a symbol is not part of the alphabet or if two different targets are
    /// given for the same source and symbol. The resulting automaton is not required to be
    /// complete.
    pub fn from_parts<T, F>(
        alphabet: CharAlphabet,
        transitions: T,
        accepting: F,
        initial: StateId,
    ) -> Result<Self, AutomatonError>
    where
        T: IntoIterator<Item = (StateId, Symbol, StateId)>,
        F: IntoIterator<Item = StateId>,
    {
        let transitions = transitions.into_iter().collect_vec();
        let accepting = accepting.into_iter().collect_vec();
        let size = transitions
            .iter()
            .flat_map(|(p, _, q)| [*p, *q])
            .chain(accepting.iter().copied())
            .chain([initial])
            .max()
            .map(|max| max + 1)
            .unwrap_or(1);

        let mut dfa = Self::trivial(alphabet);
        dfa.initial = initial;
        while dfa.size() < size {
            dfa.add_state(false);
        }
        for (source, symbol, target) in transitions {
            if let Some(first) = dfa.set_transition(source, symbol, target)? {
                if first != target {
                    return Err(AutomatonError::ConflictingTransition {
                        state: source,
                        symbol,
                        first,
                        second: target,
                    });
                }
            }
        }
        for q in accepting {
            dfa.set_accepting(q, true)?;
        }
        Ok(dfa)
    }

    pub(crate) fn from_table(
        alphabet: CharAlphabet,
        initial: StateId,
        accepting: Vec<bool>,
        transitions: Vec<Vec<Option<StateId>>>,
    ) -> Self {
        debug_assert_eq!(accepting.len(), transitions.len());
        debug_assert!(transitions.iter().all(|row| row.len() == alphabet.size()));
        Self {
            alphabet,
            initial,
            accepting,
            transitions,
        }
    }

    /// Adds a new state without outgoing transitions and returns its index.
    pub fn add_state(&mut self, accepting: bool) -> StateId {
        let id = self.size();
        self.accepting.push(accepting);
        self.transitions.push(vec![None; self.alphabet.size()]);
        id
    }

    /// Sets the target of the transition on `symbol` out of `source`. Gives back the previous
    /// target, if there was one.
    pub fn set_transition(
        &mut self,
        source: StateId,
        symbol: Symbol,
        target: StateId,
    ) -> Result<Option<StateId>, AutomatonError> {
        let index = self
            .alphabet
            .index_of(symbol)
            .ok_or(AutomatonError::UnknownSymbol(symbol))?;
        self.set_transition_at(source, index, target)
    }

    /// Works like [`Dfa::set_transition`] but takes the position of the symbol in the alphabet.
    pub fn set_transition_at(
        &mut self,
        source: StateId,
        symbol_index: usize,
        target: StateId,
    ) -> Result<Option<StateId>, AutomatonError> {
        self.check_state(target)?;
        let row = self
            .transitions
            .get_mut(source)
            .ok_or(AutomatonError::UnknownState(source))?;
        let slot = row.get_mut(symbol_index).ok_or_else(|| {
            AutomatonError::UnknownSymbol(self.alphabet.get(symbol_index).unwrap_or('?'))
        })?;
        Ok(slot.replace(target))
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

    fn check_state(&self, q: StateId) -> Result<(), AutomatonError> {
        if q < self.size() {
            Ok(())
        } else {
            Err(AutomatonError::UnknownState(q))
        }
    }

    /// The alphabet over which the automaton reads words.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    /// The initial state.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.accepting.len()
    }

    /// Returns an iterator over all state indices.
    pub fn states(&self) -> std::ops::Range<StateId> {
        0..self.size()
    }

    /// Returns true if `q` exists and is accepting.
    pub fn is_accepting(&self, q: StateId) -> bool {
        self.accepting.get(q).copied().unwrap_or(false)
    }

    /// Returns the indices of all states that are accepting.
    pub fn accepting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states().filter(|q| self.accepting[*q])
    }

    /// The successor of `q` on `symbol`, if the transition exists.
    pub fn successor(&self, q: StateId, symbol: Symbol) -> Option<StateId> {
        self.successor_at(q, self.alphabet.index_of(symbol)?)
    }

    /// The successor of `q` on the symbol at position `symbol_index` of the alphabet.
    #[inline]
    pub fn successor_at(&self, q: StateId, symbol_index: usize) -> Option<StateId> {
        self.transitions.get(q)?.get(symbol_index).copied().flatten()
    }

    /// Returns an iterator over all transitions `(source, symbol, target)`, ordered by source and
    /// then by symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Symbol, StateId)> + '_ {
        self.transitions.iter().enumerate().flat_map(move |(q, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(i, p)| p.map(|p| (q, self.alphabet[i], p)))
        })
    }

    /// Verifies that every state has a transition for every symbol. Reports the first missing
    /// pair in the order of states and symbols.
    pub fn check_complete(&self) -> Result<(), AutomatonError> {
        for (q, row) in self.transitions.iter().enumerate() {
            if let Some(i) = row.iter().position(Option::is_none) {
                return Err(AutomatonError::MissingTransition {
                    state: q,
                    symbol: self.alphabet[i],
                });
            }
        }
        Ok(())
    }

    /// Returns true if [`Dfa::check_complete`] succeeds.
    pub fn is_complete(&self) -> bool {
        self.check_complete().is_ok()
    }

    /// Gives back a complete automaton that accepts the same language. Missing transitions are
    /// redirected to a fresh rejecting sink, which is only added if `self` is not complete.
    pub fn completed(&self) -> Dfa {
        if self.is_complete() {
            return self.clone();
        }
        let mut out = self.clone();
        let sink = out.add_state(false);
        for row in &mut out.transitions {
            for slot in row.iter_mut().filter(|slot| slot.is_none()) {
                *slot = Some(sink);
            }
        }
        out
    }

    /// Runs the automaton on `word` starting in `origin`. Gives back the reached state or `None`
    /// if the run hits a missing transition or a symbol outside the alphabet.
    pub fn run_from(&self, origin: StateId, word: &[Symbol]) -> Option<StateId> {
        word.iter()
            .try_fold(origin, |q, symbol| self.successor(q, *symbol))
    }

    /// Runs the automaton on `word` from the initial state.
    pub fn run(&self, word: &[Symbol]) -> Option<StateId> {
        self.run_from(self.initial, word)
    }

    /// Returns true if `word` leads from `origin` to an accepting state.
    pub fn accepts_from(&self, origin: StateId, word: &[Symbol]) -> bool {
        self.run_from(origin, word)
            .map(|q| self.is_accepting(q))
            .unwrap_or(false)
    }
}

impl Acceptor for Dfa {
    fn accepts(&self, word: &[Symbol]) -> bool {
        self.accepts_from(self.initial, word)
    }
}

impl Debug for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DFA over {} with initial state {}", self.alphabet, self.initial)?;
        for (q, row) in self.transitions.iter().enumerate() {
            write!(f, "{}{}", if self.accepting[q] { "*" } else { " " }, q)?;
            for (i, target) in row.iter().enumerate() {
                match target {
                    Some(p) => write!(f, "\t{}->{}", self.alphabet[i], p)?,
                    None => write!(f, "\t{}->_", self.alphabet[i])?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{alphabet, tests::even_a, Acceptor, AutomatonError, Dfa};
    use pretty_assertions::assert_eq;

    #[test]
    fn dfa_acceptance() {
        let dfa = even_a();
        for p in ["", "b", "aa", "abab", "bbaab"] {
            assert!(dfa.accepts(&p.chars().collect::<Vec<_>>()), "Should accept {p}");
        }
        for n in ["a", "ab", "aaa", "bab"] {
            assert!(dfa.rejects(&n.chars().collect::<Vec<_>>()), "Should reject {n}");
        }
        assert!(!dfa.accepts(&['c']));
    }

    #[test]
    fn missing_and_conflicting_transitions() {
        let partial = Dfa::from_parts(alphabet!('a', 'b'), [(0, 'a', 1), (1, 'a', 0)], [0], 0)
            .unwrap();
        assert_eq!(
            partial.check_complete(),
            Err(AutomatonError::MissingTransition {
                state: 0,
                symbol: 'b'
            })
        );
        assert!(!partial.accepts(&['b']));

        let completed = partial.completed();
        assert_eq!(completed.size(), 3);
        assert!(completed.is_complete());
        assert!(completed.accepts(&['a', 'a']));
        assert!(!completed.accepts(&['b']));

        let conflict = Dfa::from_parts(alphabet!('a'), [(0, 'a', 1), (0, 'a', 0)], [], 0);
        assert!(matches!(
            conflict,
            Err(AutomatonError::ConflictingTransition { state: 0, .. })
        ));

        let unknown = Dfa::from_parts(alphabet!('a'), [(0, 'b', 0)], [], 0);
        assert_eq!(unknown, Err(AutomatonError::UnknownSymbol('b')));
    }

    #[test]
    fn incremental_construction() {
        let mut dfa = Dfa::trivial(alphabet!('a'));
        let q1 = dfa.add_state(true);
        assert_eq!(dfa.set_transition(0, 'a', q1), Ok(None));
        assert_eq!(dfa.set_transition(q1, 'a', q1), Ok(None));
        assert_eq!(dfa.set_transition(q1, 'a', 0), Ok(Some(q1)));
        assert_eq!(dfa.set_transition(q1, 'a', 7), Err(AutomatonError::UnknownState(7)));
        assert_eq!(dfa.transitions().count(), 2);
        assert!(dfa.accepts(&['a']));
        assert!(!dfa.accepts(&['a', 'a']));
    }
}
