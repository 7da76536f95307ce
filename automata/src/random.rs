use tracing::trace;

use crate::{CharAlphabet, Dfa};

/// Uses a sprout-like algorithm to generate a random, complete DFA over the first `symbols` latin
/// letters with at most `max_states` states. `probability` determines how likely a back edge to
/// an existing state is. The algorithm is as follows:
/// 1. Start with a single state.
/// 2. For each state and each symbol, go through the existing states in order and with probability
///    `probability` add a back edge to that state.
/// 3. If no back edge was added, insert an edge to a new state, or to a random existing state once
///    `max_states` is reached.
/// 4. Repeat until all states and symbols have been treated.
///
/// Finally every state is made accepting with probability one half. All states are reachable.
pub fn generate_random_dfa(
    rng: &mut fastrand::Rng,
    symbols: usize,
    max_states: usize,
    probability: f64,
) -> Dfa {
    let alphabet = CharAlphabet::alphabetic(symbols);
    let mut dfa = Dfa::trivial(alphabet);
    let max_states = max_states.max(1);

    let mut current = 0;
    while current < dfa.size() {
        'symbols: for i in 0..symbols {
            for target in 0..=current {
                if rng.f64() < probability {
                    dfa.set_transition_at(current, i, target)
                        .expect("target exists");
                    continue 'symbols;
                }
            }
            // no back edge was chosen
            let target = if dfa.size() < max_states {
                dfa.add_state(false)
            } else {
                rng.usize(0..dfa.size())
            };
            dfa.set_transition_at(current, i, target)
                .expect("target exists");
        }
        current += 1;
    }

    for q in dfa.states() {
        dfa.set_accepting(q, rng.bool()).expect("state exists");
    }
    trace!("generated random DFA\n{}", dfa);
    dfa
}
