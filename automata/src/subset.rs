use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::trace;

use crate::{Dfa, Map, Nfa, StateId};

impl Nfa {
    /// Turns `self` into an equivalent [`Dfa`] through the subset construction. Every state of the
    /// result stands for an epsilon closed set of states of `self` and it is accepting iff that
    /// set contains an accepting state.
    ///
    /// Sets are discovered from a FIFO worklist and numbered in the order of discovery, with the
    /// successors of a set visited in the order of the alphabet, so the result does not depend on
    /// any hashing order. The empty set is treated like any other set, which makes the result
    /// complete.
    pub fn determinize(&self) -> Dfa {
        let alphabet = self.alphabet().clone();
        let start = self.initial_closure();

        let mut index: Map<BitSet, StateId> = Map::default();
        let mut sets = vec![start.clone()];
        let mut transitions: Vec<Vec<Option<StateId>>> = vec![];
        index.insert(start, 0);

        let mut worklist = VecDeque::from([0]);
        while let Some(current) = worklist.pop_front() {
            let mut row = Vec::with_capacity(alphabet.size());
            for symbol in alphabet.universe() {
                let successor = self.step(&sets[current], symbol);
                let id = match index.get(&successor) {
                    Some(id) => *id,
                    None => {
                        let id = sets.len();
                        index.insert(successor.clone(), id);
                        sets.push(successor);
                        worklist.push_back(id);
                        id
                    }
                };
                row.push(Some(id));
            }
            // sets are popped in the order in which they were numbered
            debug_assert_eq!(transitions.len(), current);
            transitions.push(row);
        }

        let accepting = sets.iter().map(|set| self.any_accepting(set)).collect();
        trace!(
            "determinized NFA with {} states into DFA with {} states",
            self.size(),
            sets.len()
        );
        Dfa::from_table(alphabet, 0, accepting, transitions)
    }

    /// Decides language equivalence of two NFAs on their minimal deterministic images. Returns a
    /// shortest word from the symmetric difference if the languages differ.
    pub fn equivalence(&self, other: &Nfa) -> Result<(), Vec<crate::Symbol>> {
        self.determinize()
            .minimize()
            .equivalence(&other.determinize().minimize())
    }
}

#[cfg(test)]
mod tests {
    use crate::{alphabet, tests::even_a, Acceptor, Nfa};
    use pretty_assertions::assert_eq;

    #[test]
    fn subset_construction() {
        // words whose second to last symbol is an a
        let nfa = Nfa::from_parts(
            alphabet!('a', 'b'),
            [
                (0, Some('a'), 0),
                (0, Some('b'), 0),
                (0, Some('a'), 1),
                (1, Some('a'), 2),
                (1, Some('b'), 2),
            ],
            [0],
            [2],
        )
        .unwrap();
        let dfa = nfa.determinize();
        assert!(dfa.is_complete());
        assert_eq!(dfa.size(), 4);
        for w in ["", "a", "ab", "ba", "bab", "abb", "aaab", "bbaa"] {
            let w: Vec<_> = w.chars().collect();
            assert_eq!(dfa.accepts(&w), nfa.accepts(&w), "{w:?}");
        }
    }

    #[test]
    fn degenerate_inputs() {
        let empty = Nfa::new(alphabet!('a', 'b'));
        let dfa = empty.determinize();
        assert_eq!(dfa.size(), 1);
        assert!(dfa.is_empty_language());

        let no_symbols = Nfa::from_parts(alphabet!(), [(0, None, 1)], [0], [1]).unwrap();
        let dfa = no_symbols.determinize();
        assert_eq!(dfa.size(), 1);
        assert!(dfa.accepts(&[]));
    }

    #[test]
    fn nfa_equivalence() {
        let dfa = Nfa::from(&even_a());
        let mut nfa = dfa.clone();
        let copy = nfa.add_state(true);
        nfa.add_initial(copy).unwrap();
        nfa.add_edge(crate::NfaEdge::new(copy, Some('b'), 0)).unwrap();
        assert_eq!(nfa.equivalence(&dfa), Ok(()));
        nfa.add_edge(crate::NfaEdge::new(copy, Some('a'), copy)).unwrap();
        assert_eq!(nfa.equivalence(&dfa), Err(vec!['a']));
    }
}
