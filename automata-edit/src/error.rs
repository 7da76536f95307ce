use std::fmt::Display;

use automata::{AutomatonError, NfaEdge, StateId, Symbol};

use crate::edit::EditKind;

/// Represents the different ways in which applying an [`crate::Edit`] to an automaton can fail.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EditError {
    /// The edit refers to a state or symbol that the automaton does not have.
    Automaton(AutomatonError),
    /// The transition that should be redirected does not currently lead to the recorded state.
    UnexpectedTarget {
        /// Source of the transition.
        source: StateId,
        /// Symbol of the transition.
        symbol: Symbol,
        /// The target recorded in the edit.
        expected: StateId,
        /// The actual target, if any.
        found: Option<StateId>,
    },
    /// An added state would not receive the id recorded in the edit.
    UnexpectedStateId {
        /// The id recorded in the edit.
        expected: StateId,
        /// The id the new state would get.
        found: StateId,
    },
    /// The edge that should be removed or redirected does not exist.
    MissingEdge(NfaEdge),
    /// The kind of edit cannot be applied to this kind of automaton.
    Unsupported(EditKind),
}

impl Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::Automaton(err) => write!(f, "{err}"),
            EditError::UnexpectedTarget {
                source,
                symbol,
                expected,
                found,
            } => match found {
                Some(found) => write!(
                    f,
                    "Transition on '{symbol}' out of {source} leads to {found}, not {expected}"
                ),
                None => write!(f, "State {source} has no transition on '{symbol}'"),
            },
            EditError::UnexpectedStateId { expected, found } => {
                write!(f, "New state would be {found}, not {expected}")
            }
            EditError::MissingEdge(edge) => write!(f, "Edge {edge} does not exist"),
            EditError::Unsupported(kind) => write!(f, "Cannot apply {kind} to this automaton"),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditError::Automaton(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AutomatonError> for EditError {
    fn from(value: AutomatonError) -> Self {
        Self::Automaton(value)
    }
}

/// The reasons for which an edit distance search cannot be carried out.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SearchError {
    /// One of the input automata is malformed, for example a DFA is missing a transition.
    Malformed(AutomatonError),
    /// An edit that was generated during the search could not be applied.
    Edit(EditError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Malformed(err) => write!(f, "Malformed automaton: {err}"),
            SearchError::Edit(err) => write!(f, "Could not apply edit: {err}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Malformed(err) => Some(err),
            SearchError::Edit(err) => Some(err),
        }
    }
}

impl From<AutomatonError> for SearchError {
    fn from(value: AutomatonError) -> Self {
        Self::Malformed(value)
    }
}

impl From<EditError> for SearchError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}
