use itertools::Itertools;

use crate::{Dfa, Nfa, NfaEdge, StateId};

/// Relates the states of an automaton to the states of its canonical form.
///
/// Canonical ids are assigned in depth-first discovery order from the initial state(s), where the
/// outgoing moves of a state are explored in the order of the alphabet. States that are not
/// reachable get the remaining ids in ascending order of their original index.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Relabeling {
    to_canonical: Vec<StateId>,
    to_original: Vec<StateId>,
}

impl Relabeling {
    /// The relabeling that maps every one of `size` states to itself.
    pub fn identity(size: usize) -> Self {
        Self {
            to_canonical: (0..size).collect(),
            to_original: (0..size).collect(),
        }
    }

    fn from_order(order: Vec<StateId>) -> Self {
        let mut to_canonical = vec![0; order.len()];
        for (canonical, original) in order.iter().enumerate() {
            to_canonical[*original] = canonical;
        }
        Self {
            to_canonical,
            to_original: order,
        }
    }

    /// The canonical id of the original state `q`.
    pub fn canonical(&self, q: StateId) -> Option<StateId> {
        self.to_canonical.get(q).copied()
    }

    /// The original id of the canonical state `q`.
    pub fn original(&self, q: StateId) -> Option<StateId> {
        self.to_original.get(q).copied()
    }

    /// Translates a canonical id back, keeping ids beyond the relabeled range unchanged. Such
    /// ids belong to states that were added after canonicalization.
    pub fn original_or_same(&self, q: StateId) -> StateId {
        self.original(q).unwrap_or(q)
    }

    /// The number of relabeled states.
    pub fn len(&self) -> usize {
        self.to_original.len()
    }

    /// Returns true if no state is relabeled.
    pub fn is_empty(&self) -> bool {
        self.to_original.is_empty()
    }

    /// Returns true if every state keeps its id.
    pub fn is_identity(&self) -> bool {
        self.to_original.iter().enumerate().all(|(i, q)| i == *q)
    }

}

/// Computes the discovery order of a depth-first traversal. `successors` must list the moves of
/// a state in the fixed order in which they are explored.
fn discovery_order<R, F, I>(size: usize, roots: R, successors: F) -> Vec<StateId>
where
    R: IntoIterator<Item = StateId>,
    F: Fn(StateId) -> I,
    I: IntoIterator<Item = StateId>,
{
    let mut seen = vec![false; size];
    let mut order = Vec::with_capacity(size);
    for root in roots {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        order.push(root);
        let mut stack = vec![successors(root).into_iter().collect_vec().into_iter()];
        while let Some(moves) = stack.last_mut() {
            match moves.next() {
                Some(p) if !seen[p] => {
                    seen[p] = true;
                    order.push(p);
                    stack.push(successors(p).into_iter().collect_vec().into_iter());
                }
                Some(_) => {}
                None => {
                    stack.pop();
                }
            }
        }
    }
    order.extend((0..size).filter(|q| !seen[*q]));
    order
}

impl Dfa {
    /// Produces an isomorphic automaton whose states are numbered in depth-first discovery order,
    /// together with the [`Relabeling`] that relates the ids of `self` to the new ones.
    pub fn canonicalize(&self) -> (Dfa, Relabeling) {
        let width = self.alphabet().size();
        let order = discovery_order(self.size(), [self.initial()], |q| {
            (0..width).filter_map(move |i| self.successor_at(q, i))
        });
        let relabeling = Relabeling::from_order(order);
        (self.relabel(&relabeling), relabeling)
    }

    /// Renames the states of `self` according to `relabeling`.
    pub fn relabel(&self, relabeling: &Relabeling) -> Dfa {
        let width = self.alphabet().size();
        let map = |q: StateId| relabeling.canonical(q).unwrap_or(q);
        let (accepting, transitions): (Vec<_>, Vec<_>) = (0..self.size())
            .map(|canonical| {
                let q = relabeling.original_or_same(canonical);
                let row = (0..width)
                    .map(|i| self.successor_at(q, i).map(map))
                    .collect_vec();
                (self.is_accepting(q), row)
            })
            .unzip();
        Dfa::from_table(
            self.alphabet().clone(),
            map(self.initial()),
            accepting,
            transitions,
        )
    }
}

impl Nfa {
    /// Produces an isomorphic automaton whose states are numbered in depth-first discovery order,
    /// starting from the initial states in ascending order. Outgoing edges are explored in the
    /// order of their labels (epsilon first) and then their targets.
    pub fn canonicalize(&self) -> (Nfa, Relabeling) {
        let order = discovery_order(self.size(), self.initial().iter().copied(), |q| {
            self.edges_from(q).map(|e| e.target)
        });
        let relabeling = Relabeling::from_order(order);
        (self.relabel(&relabeling), relabeling)
    }

    /// Renames the states of `self` according to `relabeling`.
    pub fn relabel(&self, relabeling: &Relabeling) -> Nfa {
        let map = |q: StateId| relabeling.canonical(q).unwrap_or(q);
        Nfa::from_raw(
            self.alphabet().clone(),
            self.initial().iter().map(|q| map(*q)).collect(),
            self.states()
                .map(|canonical| self.is_accepting(relabeling.original_or_same(canonical)))
                .collect(),
            self.edges()
                .map(|e| NfaEdge::new(map(e.source), e.label, map(e.target)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{alphabet, tests::wiki_dfa, Acceptor, Dfa, Nfa, Relabeling};
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_ids_follow_discovery_order() {
        // 0 -a-> 2, 0 -b-> 1, 2 -a-> 1, unreachable 3
        let dfa = Dfa::from_parts(
            alphabet!('a', 'b'),
            [
                (0, 'a', 2),
                (0, 'b', 1),
                (1, 'a', 1),
                (1, 'b', 1),
                (2, 'a', 1),
                (2, 'b', 0),
                (3, 'a', 3),
                (3, 'b', 0),
            ],
            [1],
            0,
        )
        .unwrap();
        let (canonical, relabeling) = dfa.canonicalize();
        assert_eq!(relabeling.original(0), Some(0));
        assert_eq!(relabeling.original(1), Some(2));
        assert_eq!(relabeling.original(2), Some(1));
        assert_eq!(relabeling.original(3), Some(3));
        assert_eq!(relabeling.canonical(2), Some(1));
        assert_eq!(canonical.successor(0, 'a'), Some(1));
        assert!(canonical.is_accepting(2));
        assert_eq!(canonical.initial(), 0);
    }

    #[test]
    fn isomorphic_automata_have_the_same_canonical_form() {
        let dfa = wiki_dfa();
        // Swap states 0 and 4 and make 4 the initial state.
        let swap = |q: usize| match q {
            0 => 4,
            4 => 0,
            q => q,
        };
        let permuted = Dfa::from_parts(
            dfa.alphabet().clone(),
            dfa.transitions().map(|(p, a, q)| (swap(p), a, swap(q))),
            dfa.accepting_states().map(swap),
            swap(dfa.initial()),
        )
        .unwrap();
        assert_ne!(permuted, dfa);
        assert_eq!(permuted.canonicalize().0, dfa.canonicalize().0);

        let (canonical, relabeling) = dfa.canonicalize();
        for w in ["", "b", "ab", "aab", "bb", "bab"] {
            let w: Vec<_> = w.chars().collect();
            assert_eq!(canonical.accepts(&w), dfa.accepts(&w));
            let reached = dfa.run(&w).unwrap();
            assert_eq!(relabeling.canonical(reached), canonical.run(&w));
        }
    }

    #[test]
    fn identity_relabeling() {
        let identity = Relabeling::identity(4);
        assert!(identity.is_identity());
        assert_eq!(identity.len(), 4);
        assert_eq!(identity.original(3), Some(3));
        assert!(!Relabeling::from_order(vec![1, 0]).is_identity());
    }

    #[test]
    fn nfa_canonicalization() {
        let nfa = Nfa::from_parts(
            alphabet!('a'),
            [(2, Some('a'), 0), (0, Some('a'), 1), (2, None, 1)],
            [2],
            [1],
        )
        .unwrap();
        let (canonical, relabeling) = nfa.canonicalize();
        assert_eq!(relabeling.original(0), Some(2));
        // epsilon edges are explored first
        assert_eq!(relabeling.original(1), Some(1));
        assert_eq!(relabeling.original(2), Some(0));
        assert_eq!(canonical.initial().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert!(canonical.accepts(&[]));
        assert!(canonical.accepts(&['a', 'a']));
    }

}
