use std::fmt::Display;

use crate::{alphabet::CharAlphabet, StateId, Symbol};

/// Abstracts the ways in which an automaton can be malformed.
#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum AutomatonError {
    /// The automaton has no move for `symbol` out of `state`. Deterministic automata are expected
    /// to be complete, a missing move is never replaced by an implicit sink.
    MissingTransition { state: StateId, symbol: Symbol },
    /// A second, different target was given for the same state and symbol of a DFA.
    ConflictingTransition {
        state: StateId,
        symbol: Symbol,
        first: StateId,
        second: StateId,
    },
    /// A state index that is not smaller than the number of states.
    UnknownState(StateId),
    /// A symbol that is not part of the alphabet.
    UnknownSymbol(Symbol),
    /// Two automata that should be compared are defined over different alphabets.
    AlphabetMismatch {
        expected: CharAlphabet,
        found: CharAlphabet,
    },
}

impl Display for AutomatonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutomatonError::MissingTransition { state, symbol } => {
                write!(f, "State {state} has no transition on '{symbol}'")
            }
            AutomatonError::ConflictingTransition {
                state,
                symbol,
                first,
                second,
            } => write!(
                f,
                "State {state} has two transitions on '{symbol}' (to {first} and to {second})"
            ),
            AutomatonError::UnknownState(q) => write!(f, "Unknown state {q}"),
            AutomatonError::UnknownSymbol(sym) => {
                write!(f, "Symbol '{sym}' is not part of the alphabet")
            }
            AutomatonError::AlphabetMismatch { expected, found } => {
                write!(f, "Expected alphabet {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for AutomatonError {}
