use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::trace;

use crate::{Dfa, StateId};

/// Computes the coarsest partition of the reachable states of `dfa` that is compatible with the
/// transitions and separates accepting from rejecting states, using Hopcroft's partition
/// refinement. The automaton is expected to be complete.
///
/// Refinement starts with the partition into accepting and rejecting states, where an empty class
/// is dropped. Splitters are taken from an explicit stack. Blocks in the result are ordered by their
/// least element.
pub fn partition_refinement(dfa: &Dfa) -> Vec<BTreeSet<StateId>> {
    let reachable = dfa.reachable_states();
    let (accepting, rejecting): (BTreeSet<_>, BTreeSet<_>) =
        reachable.iter().copied().partition(|q| dfa.is_accepting(*q));
    let mut p: Vec<_> = [rejecting, accepting]
        .into_iter()
        .filter(|o| !o.is_empty())
        .collect();
    let mut w = p.clone();

    while let Some(a) = w.pop() {
        for i in 0..dfa.alphabet().size() {
            let x = reachable
                .iter()
                .filter(|q| {
                    dfa.successor_at(**q, i)
                        .map(|t| a.contains(&t))
                        .unwrap_or(false)
                })
                .copied()
                .collect::<BTreeSet<_>>();

            let mut new_p = vec![];
            for y in &p {
                if x.intersection(y).next().is_none() || y.difference(&x).next().is_none() {
                    new_p.push(y.clone());
                    continue;
                }
                let int = x.intersection(y).cloned().collect::<BTreeSet<_>>();
                let diff = y.difference(&x).cloned().collect::<BTreeSet<_>>();

                if let Some(pos) = w.iter().position(|o| o == y) {
                    w.remove(pos);
                    w.extend([int.clone(), diff.clone()]);
                } else {
                    w.push(if int.len() <= diff.len() {
                        int.clone()
                    } else {
                        diff.clone()
                    });
                }

                new_p.extend([int, diff]);
            }
            p = new_p;
        }
    }
    p.sort_by_key(|block| block.first().copied());
    p
}

impl Dfa {
    /// Computes the minimal DFA that accepts the same language as `self`. Missing transitions are
    /// first redirected to a rejecting sink and unreachable states are dropped, then the states
    /// are merged according to [`partition_refinement`]. The states of the result are numbered
    /// canonically, so two automata accept the same language iff their minimizations are equal.
    pub fn minimize(&self) -> Dfa {
        let complete = self.completed();
        let partition = partition_refinement(&complete);
        let mut class_of = vec![None; complete.size()];
        for (class, block) in partition.iter().enumerate() {
            for q in block {
                class_of[*q] = Some(class);
            }
        }

        let width = complete.alphabet().size();
        let (accepting, transitions): (Vec<_>, Vec<_>) = partition
            .iter()
            .map(|block| {
                // a block is never empty and all its members agree on acceptance and successors
                let representative = *block.first().expect("blocks are non-empty");
                let row = (0..width)
                    .map(|i| {
                        complete
                            .successor_at(representative, i)
                            .and_then(|p| class_of[p])
                    })
                    .collect_vec();
                (complete.is_accepting(representative), row)
            })
            .unzip();
        let initial = class_of[complete.initial()].unwrap_or(0);
        trace!(
            "minimized DFA with {} states to {} states",
            self.size(),
            partition.len()
        );
        Dfa::from_table(complete.alphabet().clone(), initial, accepting, transitions)
            .canonicalize()
            .0
    }

    /// Returns true if no DFA with fewer states accepts the same language.
    pub fn is_minimal(&self) -> bool {
        self.minimize().size() == self.size()
    }
}
