use std::collections::VecDeque;

use itertools::Itertools;
use tracing::trace;

use crate::{CharAlphabet, Dfa, Map, StateId, Symbol};

/// A state of the product of two (possibly partial) DFAs. `None` stands for the implicit rejecting
/// sink that a run enters when it hits a missing transition.
type ProductState = (Option<StateId>, Option<StateId>);

/// The reachable part of the product of two DFAs, explored breadth-first over the union of both
/// alphabets. Every discovered state remembers the state and symbol it was discovered from, so that
/// shortest words can be read off.
struct ProductExploration<'a> {
    left: &'a Dfa,
    right: &'a Dfa,
    alphabet: CharAlphabet,
    states: Vec<ProductState>,
    parents: Vec<Option<(usize, Symbol)>>,
    index: Map<ProductState, usize>,
}

impl<'a> ProductExploration<'a> {
    fn new(left: &'a Dfa, left_origin: StateId, right: &'a Dfa, right_origin: StateId) -> Self {
        let alphabet = left
            .alphabet()
            .universe()
            .merge(right.alphabet().universe())
            .dedup()
            .collect();
        let origin = (Some(left_origin), Some(right_origin));
        let mut index = Map::default();
        index.insert(origin, 0);
        Self {
            left,
            right,
            alphabet,
            states: vec![origin],
            parents: vec![None],
            index,
        }
    }

    fn step(&self, (l, r): ProductState, symbol: Symbol) -> ProductState {
        (
            l.and_then(|l| self.left.successor(l, symbol)),
            r.and_then(|r| self.right.successor(r, symbol)),
        )
    }

    fn accepting(&self, (l, r): ProductState) -> (bool, bool) {
        (
            l.map_or(false, |l| self.left.is_accepting(l)),
            r.map_or(false, |r| self.right.is_accepting(r)),
        )
    }

    /// Explores the product until `stop` holds for a discovered state. Gives back the index of
    /// that state, or `None` once everything reachable has been seen.
    fn explore<F: Fn(&Self, ProductState) -> bool>(&mut self, stop: F) -> Option<usize> {
        let mut queue = VecDeque::from([0]);
        if stop(&*self, self.states[0]) {
            return Some(0);
        }
        while let Some(current) = queue.pop_front() {
            for i in 0..self.alphabet.size() {
                let symbol = self.alphabet[i];
                let next = self.step(self.states[current], symbol);
                if self.index.contains_key(&next) {
                    continue;
                }
                let id = self.states.len();
                self.index.insert(next, id);
                self.states.push(next);
                self.parents.push(Some((current, symbol)));
                if stop(&*self, next) {
                    return Some(id);
                }
                queue.push_back(id);
            }
        }
        None
    }

    fn word_to(&self, mut id: usize) -> Vec<Symbol> {
        let mut word = vec![];
        while let Some((parent, symbol)) = self.parents[id] {
            word.push(symbol);
            id = parent;
        }
        word.reverse();
        word
    }
}

fn disagree(exploration: &ProductExploration<'_>, state: ProductState) -> bool {
    let (l, r) = exploration.accepting(state);
    l != r
}

impl Dfa {
    /// Checks whether `self` is equivalent to `other`, i.e. whether the two DFAs accept the same
    /// language. The product of both automata is explored breadth-first in search of a state in
    /// which exactly one side accepts, which would be reachable in the symmetric difference.
    /// Returns `Err(word)` with a shortest word from the symmetric difference if the languages
    /// differ.
    pub fn equivalence(&self, other: &Dfa) -> Result<(), Vec<Symbol>> {
        let mut exploration = ProductExploration::new(self, self.initial(), other, other.initial());
        match exploration.explore(disagree) {
            Some(id) => {
                let word = exploration.word_to(id);
                trace!("found counterexample {:?}", word);
                Err(word)
            }
            None => Ok(()),
        }
    }

    /// Returns true if `self` and `other` accept the same language.
    pub fn equivalent(&self, other: &Dfa) -> bool {
        self.equivalence(other).is_ok()
    }

    /// Builds the reachable part of the product automaton that accepts exactly the words that are
    /// accepted by one of `self` and `other` but not both. The result is complete and reads words
    /// over the union of both alphabets; its language is empty iff the two are equivalent.
    pub fn symmetric_difference(&self, other: &Dfa) -> Dfa {
        let mut exploration = ProductExploration::new(self, self.initial(), other, other.initial());
        exploration.explore(|_, _| false);
        let alphabet = exploration.alphabet.clone();
        let accepting = exploration
            .states
            .iter()
            .map(|state| disagree(&exploration, *state))
            .collect_vec();
        let transitions = exploration
            .states
            .iter()
            .map(|state| {
                alphabet
                    .universe()
                    .map(|symbol| exploration.index.get(&exploration.step(*state, symbol)).copied())
                    .collect_vec()
            })
            .collect_vec();
        Dfa::from_table(alphabet, 0, accepting, transitions)
    }

    /// Attempts to separate the state `left` from the state `right` by finding a word that is
    /// accepted from exactly one of them. This is a shortest word in the symmetric difference of
    /// the languages of the two states, or `None` if they are equivalent.
    pub fn separate(&self, left: StateId, right: StateId) -> Option<Vec<Symbol>> {
        if left == right || left >= self.size() || right >= self.size() {
            return None;
        }
        let mut exploration = ProductExploration::new(self, left, self, right);
        let id = exploration.explore(disagree)?;
        Some(exploration.word_to(id))
    }
}

#[cfg(test)]
mod tests {
    use crate::{alphabet, tests::even_a, tests::wiki_dfa, Acceptor, Dfa};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn odd_b() -> Dfa {
        Dfa::from_parts(
            alphabet!('a', 'b'),
            [(0, 'a', 0), (0, 'b', 1), (1, 'a', 1), (1, 'b', 0)],
            [1],
            0,
        )
        .unwrap()
    }

    #[test]
    #[traced_test]
    fn equivalence_gives_shortest_counterexample() {
        assert_eq!(even_a().equivalence(&even_a()), Ok(()));
        assert_eq!(even_a().equivalence(&odd_b()), Err(vec![]));

        let mut relabeled = even_a();
        // a redundant copy of the initial state
        let copy = relabeled.add_state(true);
        relabeled.set_transition(copy, 'a', 1).unwrap();
        relabeled.set_transition(copy, 'b', copy).unwrap();
        relabeled.set_transition(1, 'a', copy).unwrap();
        assert!(relabeled.equivalent(&even_a()));

        relabeled.set_accepting(copy, false).unwrap();
        assert_eq!(relabeled.equivalence(&even_a()), Err(vec!['a', 'a']));
    }

    #[test]
    fn symmetric_difference_language() {
        let diff = even_a().symmetric_difference(&odd_b());
        assert!(diff.is_complete());
        for w in ["", "ab", "aab", "bb"] {
            let w: Vec<_> = w.chars().collect();
            assert_eq!(
                diff.accepts(&w),
                even_a().accepts(&w) != odd_b().accepts(&w),
                "{w:?}"
            );
        }
        assert!(even_a().symmetric_difference(&even_a()).is_empty_language());
    }

    #[test]
    fn partial_automata_reject_on_missing_moves() {
        let partial = Dfa::from_parts(alphabet!('a', 'b'), [(0, 'a', 0)], [0], 0).unwrap();
        let only_a = Dfa::from_parts(
            alphabet!('a', 'b'),
            [(0, 'a', 0), (0, 'b', 1), (1, 'a', 1), (1, 'b', 1)],
            [0],
            0,
        )
        .unwrap();
        assert!(partial.equivalent(&only_a));
        assert_eq!(partial.symmetric_difference(&only_a).size(), 2);
    }

    #[test]
    fn separating_states() {
        let dfa = wiki_dfa();
        assert_eq!(dfa.separate(0, 1), None);
        assert_eq!(dfa.separate(2, 4), None);
        assert_eq!(dfa.separate(0, 2), Some(vec![]));
        assert_eq!(dfa.separate(0, 5), Some(vec!['b']));
    }
}
