//! Library for working with finite automata on finite words.
//!
//! Provides deterministic ([`Dfa`]) and nondeterministic ([`Nfa`]) automata over a
//! [`CharAlphabet`], together with the algorithms that are needed to compare them:
//! canonical relabeling of states, subset construction, minimization by partition refinement
//! and equivalence checking through the symmetric difference.
#![warn(missing_docs)]

/// Defines alphabets and symbols.
pub mod alphabet;
pub use alphabet::{CharAlphabet, Symbol};

mod error;
pub use error::AutomatonError;

mod dfa;
pub use dfa::Dfa;

mod nfa;
pub use nfa::{Nfa, NfaEdge};

mod canonical;
pub use canonical::Relabeling;

mod reachable;
pub use reachable::MinimalRepresentatives;

mod product;

mod subset;

mod minimize;
pub use minimize::partition_refinement;

/// Generation of random automata, mainly used for testing and benchmarking.
#[cfg(feature = "random")]
pub mod random;

/// Index of a state. States of an automaton with `n` states are always `0..n`.
pub type StateId = usize;

/// The map type used throughout the crate, where iteration order does not matter.
pub type Map<K, V> = ahash::HashMap<K, V>;

/// Implemented by objects which can accept a finite word.
#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, Box<T>)]
pub trait Acceptor {
    /// Returns true iff the given `word` is accepted.
    fn accepts(&self, word: &[Symbol]) -> bool;

    /// Returns the opposite of `accepts`.
    fn rejects(&self, word: &[Symbol]) -> bool {
        !self.accepts(word)
    }
}

/// Re-exports the most commonly used items.
pub mod prelude {
    pub use crate::{
        alphabet, Acceptor, AutomatonError, CharAlphabet, Dfa, Nfa, NfaEdge, Relabeling,
        StateId, Symbol,
    };
}
