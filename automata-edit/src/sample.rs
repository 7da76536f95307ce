use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
};

use automata::{Acceptor, CharAlphabet, Dfa, Symbol};
use itertools::Itertools;
use tracing::debug;

/// A finite set of words labelled with membership in a target language, used to reject candidate
/// automata cheaply before running an exact equivalence check.
///
/// The sample of a target is built from its minimal DFA. For every state `q` we take its minimal
/// access word `u_q` and every state pair `p, q` contributes a shortest word that separates the two.
/// The sample then consists of all words `u_q x w` where `x` is empty or a single symbol and `w`
/// is empty or one of the separators, each labelled with the verdict of the target. Any automaton
/// that accepts the target language agrees with every label.
#[derive(Clone, Eq, PartialEq)]
pub struct TestSample {
    alphabet: CharAlphabet,
    words: BTreeMap<Vec<Symbol>, bool>,
}

impl TestSample {
    /// Builds the sample for the language accepted by `goal`. The automaton is minimized first, so
    /// the resulting sample only depends on the language.
    pub fn from_goal(goal: &Dfa) -> Self {
        let minimal = goal.minimize();
        let access = minimal
            .minimal_representatives()
            .map(|(word, _)| word)
            .collect_vec();

        let mut separators = BTreeSet::from([vec![]]);
        for (p, q) in minimal.states().tuple_combinations() {
            if let Some(word) = minimal.separate(p, q) {
                separators.insert(word);
            }
        }

        let extensions = std::iter::once(None)
            .chain(minimal.alphabet().universe().map(Some))
            .collect_vec();

        let mut words = BTreeMap::new();
        for u in &access {
            for x in &extensions {
                for w in &separators {
                    let mut word = u.clone();
                    word.extend(x.iter());
                    word.extend(w.iter());
                    let label = minimal.accepts(&word);
                    words.insert(word, label);
                }
            }
        }
        debug!(
            "built test sample with {} words from {} access words and {} separators",
            words.len(),
            access.len(),
            separators.len()
        );

        Self {
            alphabet: minimal.alphabet().clone(),
            words,
        }
    }

    /// The alphabet of the target.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    /// Gives an iterator over all words in the sample with their label.
    pub fn entries(&self) -> impl Iterator<Item = (&[Symbol], bool)> + '_ {
        self.words.iter().map(|(w, c)| (w.as_slice(), *c))
    }

    /// Gives an iterator over all words that belong to the target language.
    pub fn positive_words(&self) -> impl Iterator<Item = &[Symbol]> + '_ {
        self.entries().filter_map(|(w, c)| c.then_some(w))
    }

    /// Gives an iterator over all words that do not belong to the target language.
    pub fn negative_words(&self) -> impl Iterator<Item = &[Symbol]> + '_ {
        self.entries().filter_map(|(w, c)| (!c).then_some(w))
    }

    /// Classifying a word returns its label, if it is part of the sample.
    pub fn classify(&self, word: &[Symbol]) -> Option<bool> {
        self.words.get(word).copied()
    }

    /// The number of words in the sample.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the sample contains no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Runs every word of the sample through `candidate`. Returns `Err((word, label))` for the
    /// first word on which the candidate disagrees with its label, where `label` is the verdict of
    /// the target.
    pub fn consistent_with<A: Acceptor>(&self, candidate: A) -> Result<(), (Vec<Symbol>, bool)> {
        for (word, label) in &self.words {
            if candidate.accepts(word) != *label {
                return Err((word.clone(), *label));
            }
        }
        Ok(())
    }
}

impl Debug for TestSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Test sample over {}", self.alphabet)?;
        for (word, label) in &self.words {
            write!(f, "\n\t{}\t{:?}", label, word.iter().collect::<String>())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TestSample;
    use automata::{prelude::*, random::generate_random_dfa};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn even_a() -> Dfa {
        Dfa::from_parts(
            alphabet!('a', 'b'),
            [(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)],
            [0],
            0,
        )
        .unwrap()
    }

    /// Permutes the states of `dfa` and adds a copy of every state, so that the result accepts the
    /// same language but looks nothing like the original.
    fn scramble(dfa: &Dfa) -> Dfa {
        let n = dfa.size();
        // state q becomes n - 1 - q, its copy 2n - 1 - q
        let flip = |q: StateId| n - 1 - q;
        let copy = |q: StateId| 2 * n - 1 - q;
        let mut transitions = vec![];
        for (p, a, q) in dfa.transitions() {
            transitions.push((flip(p), a, copy(q)));
            transitions.push((copy(p), a, flip(q)));
        }
        let accepting = dfa
            .accepting_states()
            .flat_map(|q| [flip(q), copy(q)])
            .collect::<Vec<_>>();
        Dfa::from_parts(
            dfa.alphabet().clone(),
            transitions,
            accepting,
            flip(dfa.initial()),
        )
        .unwrap()
    }

    #[test]
    #[traced_test]
    fn sample_of_even_a() {
        let sample = TestSample::from_goal(&even_a());
        // access words {ε, a}, extensions {ε, a, b} and the two states are separated by ε
        assert_eq!(sample.len(), 5);
        assert_eq!(sample.classify(&[]), Some(true));
        assert_eq!(sample.classify(&['a', 'a']), Some(true));
        assert_eq!(sample.classify(&['a', 'b']), Some(false));
        assert_eq!(sample.classify(&['b', 'b', 'b']), None);
        assert_eq!(sample.positive_words().count(), 3);
        assert_eq!(sample.negative_words().count(), 2);
        assert!(sample.consistent_with(even_a()).is_ok());
    }

    #[test]
    fn sample_rejects_wrong_candidate() {
        let sample = TestSample::from_goal(&even_a());
        let mut wrong = even_a();
        wrong.set_accepting(1, true).unwrap();
        assert_eq!(sample.consistent_with(&wrong), Err((vec!['a'], false)));
    }

    #[test]
    fn equivalent_candidates_are_never_rejected() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..30 {
            let goal = generate_random_dfa(&mut rng, 2, 5, 0.3);
            let sample = TestSample::from_goal(&goal);
            let scrambled = scramble(&goal);
            assert!(scrambled.equivalent(&goal));
            assert_eq!(sample.consistent_with(&scrambled), Ok(()));
            assert_eq!(sample.consistent_with(Nfa::from(&scrambled)), Ok(()));

            let other = generate_random_dfa(&mut rng, 2, 5, 0.3);
            if other.equivalent(&goal) {
                assert_eq!(sample.consistent_with(&other), Ok(()));
            }
        }
    }
}
