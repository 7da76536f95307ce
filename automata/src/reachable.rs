use std::collections::VecDeque;

use crate::{Dfa, StateId, Symbol};

/// Type alias for a minimal representative of a state which is its length-lexicographically minimal
/// access sequence and its state index.
pub type MinimalRepresentative = (Vec<Symbol>, StateId);

/// Iterates over the minimal representatives of the states of a [`Dfa`] that are reachable from a
/// given origin. A minimal representative for a state `q` is the length-lexicographically minimal
/// word with which `q` can be reached. States are produced in breadth-first order, so the words
/// come out sorted length-lexicographically as well.
#[derive(Debug, Clone)]
pub struct MinimalRepresentatives<'a> {
    dfa: &'a Dfa,
    seen: Vec<bool>,
    queue: VecDeque<MinimalRepresentative>,
}

impl<'a> MinimalRepresentatives<'a> {
    /// Starts the exploration in `origin`.
    pub fn new(dfa: &'a Dfa, origin: StateId) -> Self {
        let mut seen = vec![false; dfa.size()];
        let mut queue = VecDeque::new();
        if let Some(flag) = seen.get_mut(origin) {
            *flag = true;
            queue.push_back((vec![], origin));
        }
        Self { dfa, seen, queue }
    }
}

impl Iterator for MinimalRepresentatives<'_> {
    type Item = MinimalRepresentative;

    fn next(&mut self) -> Option<Self::Item> {
        let (access, q) = self.queue.pop_front()?;
        for (i, sym) in self.dfa.alphabet().universe().enumerate() {
            if let Some(p) = self.dfa.successor_at(q, i) {
                if !self.seen[p] {
                    self.seen[p] = true;
                    let mut new_access = access.clone();
                    new_access.push(sym);
                    self.queue.push_back((new_access, p));
                }
            }
        }
        Some((access, q))
    }
}

impl Dfa {
    /// Returns an iterator over the minimal representatives of all reachable states.
    pub fn minimal_representatives(&self) -> MinimalRepresentatives<'_> {
        MinimalRepresentatives::new(self, self.initial())
    }

    /// Gives for every state its minimal representative, or `None` if it is not reachable.
    pub fn access_words(&self) -> Vec<Option<Vec<Symbol>>> {
        let mut out = vec![None; self.size()];
        for (word, q) in self.minimal_representatives() {
            out[q] = Some(word);
        }
        out
    }

    /// The states that are reachable from the initial state, in ascending order.
    pub fn reachable_states(&self) -> Vec<StateId> {
        let mut states: Vec<_> = self.minimal_representatives().map(|(_, q)| q).collect();
        states.sort_unstable();
        states
    }

    /// Tries to construct a word witnessing that the accepted language is not empty. Gives back the
    /// length-lexicographically least accepted word if one exists.
    pub fn shortest_accepted(&self) -> Option<Vec<Symbol>> {
        self.minimal_representatives()
            .find_map(|(word, q)| self.is_accepting(q).then_some(word))
    }

    /// Returns true if and only if the accepted language is empty.
    pub fn is_empty_language(&self) -> bool {
        self.shortest_accepted().is_none()
    }
}

#[cfg(test)]
mod tests {
    use crate::{alphabet, tests::wiki_dfa, Dfa};
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    #[test]
    fn reachable_states() {
        let mut dfa = Dfa::trivial(alphabet!('a', 'b'));
        let q0 = dfa.initial();
        let q1 = dfa.add_state(false);
        let q2 = dfa.add_state(true);
        let q3 = dfa.add_state(true);
        for (p, a, q) in [
            (q0, 'a', q1),
            (q0, 'b', q0),
            (q1, 'a', q2),
            (q1, 'b', q0),
            (q2, 'a', q2),
            (q2, 'b', q2),
            (q3, 'a', q2),
            (q3, 'b', q3),
        ] {
            dfa.set_transition(p, a, q).unwrap();
        }

        assert_eq!(dfa.reachable_states(), vec![q0, q1, q2]);
        assert_eq!(dfa.shortest_accepted(), Some(vec!['a', 'a']));
        assert_eq!(dfa.access_words()[q3], None);
    }

    #[test]
    fn representatives_are_length_lexicographic() {
        let reps = wiki_dfa().minimal_representatives().collect_vec();
        assert_eq!(
            reps,
            vec![
                (vec![], 0),
                (vec!['a'], 1),
                (vec!['b'], 2),
                (vec!['a', 'b'], 3),
                (vec!['b', 'a'], 4),
                (vec!['b', 'b'], 5)
            ]
        );
    }

    #[test]
    fn empty_language() {
        let dfa = Dfa::from_parts(alphabet!('a'), [(0, 'a', 0)], [], 0).unwrap();
        assert!(dfa.is_empty_language());
        let dfa = Dfa::from_parts(alphabet!(), [], [0], 0).unwrap();
        assert_eq!(dfa.shortest_accepted(), Some(vec![]));
    }
}
