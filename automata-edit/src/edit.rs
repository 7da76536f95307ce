use std::fmt::Display;

use automata::{Dfa, Nfa, NfaEdge, Relabeling, StateId, Symbol};

use crate::EditError;

/// The kinds of [`Edit`] there are, without their arguments.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum EditKind {
    /// See [`Edit::ToggleAccept`].
    ToggleAccept,
    /// See [`Edit::RedirectTransition`].
    RedirectTransition,
    /// See [`Edit::AddState`].
    AddState,
    /// See [`Edit::AddEdge`].
    AddEdge,
    /// See [`Edit::RemoveEdge`].
    RemoveEdge,
    /// See [`Edit::RemoveState`].
    RemoveState,
    /// See [`Edit::CollapseStates`].
    CollapseStates,
}

impl Display for EditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EditKind::ToggleAccept => "toggle-accept",
            EditKind::RedirectTransition => "redirect-transition",
            EditKind::AddState => "add-state",
            EditKind::AddEdge => "add-edge",
            EditKind::RemoveEdge => "remove-edge",
            EditKind::RemoveState => "remove-state",
            EditKind::CollapseStates => "collapse-states",
        };
        write!(f, "{name}")
    }
}

/// A single atomic modification of an automaton. States are referred to by their index in the
/// automaton the edit is applied to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[allow(missing_docs)]
pub enum Edit {
    /// Makes `state` accepting or rejecting.
    ToggleAccept { state: StateId, accepting: bool },
    /// Changes the target of the transition (or edge) on `symbol` out of `source` from `from` to `to`.
    RedirectTransition {
        source: StateId,
        symbol: Symbol,
        from: StateId,
        to: StateId,
    },
    /// Adds the non-accepting state `state`. In a DFA the new state loops on every symbol.
    AddState { state: StateId },
    /// Adds an edge to an NFA.
    AddEdge {
        source: StateId,
        symbol: Symbol,
        target: StateId,
    },
    /// Removes an edge from an NFA.
    RemoveEdge {
        source: StateId,
        symbol: Symbol,
        target: StateId,
    },
    /// Removes a state and every edge touching it from an NFA.
    RemoveState { state: StateId },
    /// Merges `merged` into `kept` in an NFA.
    CollapseStates { kept: StateId, merged: StateId },
}

impl Edit {
    /// The kind of this edit.
    pub fn kind(&self) -> EditKind {
        match self {
            Edit::ToggleAccept { .. } => EditKind::ToggleAccept,
            Edit::RedirectTransition { .. } => EditKind::RedirectTransition,
            Edit::AddState { .. } => EditKind::AddState,
            Edit::AddEdge { .. } => EditKind::AddEdge,
            Edit::RemoveEdge { .. } => EditKind::RemoveEdge,
            Edit::RemoveState { .. } => EditKind::RemoveState,
            Edit::CollapseStates { .. } => EditKind::CollapseStates,
        }
    }

    /// Returns true for [`Edit::ToggleAccept`].
    pub fn is_toggle(&self) -> bool {
        matches!(self, Edit::ToggleAccept { .. })
    }

    /// Applies `f` to every state mentioned in the edit.
    pub fn map_states<F: Fn(StateId) -> StateId>(&self, f: F) -> Edit {
        match *self {
            Edit::ToggleAccept { state, accepting } => Edit::ToggleAccept {
                state: f(state),
                accepting,
            },
            Edit::RedirectTransition {
                source,
                symbol,
                from,
                to,
            } => Edit::RedirectTransition {
                source: f(source),
                symbol,
                from: f(from),
                to: f(to),
            },
            Edit::AddState { state } => Edit::AddState { state: f(state) },
            Edit::AddEdge {
                source,
                symbol,
                target,
            } => Edit::AddEdge {
                source: f(source),
                symbol,
                target: f(target),
            },
            Edit::RemoveEdge {
                source,
                symbol,
                target,
            } => Edit::RemoveEdge {
                source: f(source),
                symbol,
                target: f(target),
            },
            Edit::RemoveState { state } => Edit::RemoveState { state: f(state) },
            Edit::CollapseStates { kept, merged } => Edit::CollapseStates {
                kept: f(kept),
                merged: f(merged),
            },
        }
    }

    /// Translates the states of an edit on a relabeled automaton back to the original numbering.
    /// States that the relabeling does not know about, such as freshly added ones, stay as they are.
    pub fn relabel(&self, relabeling: &Relabeling) -> Edit {
        self.map_states(|q| relabeling.original_or_same(q))
    }

    /// Applies the edit to a copy of `dfa`. Only toggles, redirections and added states make sense
    /// for a DFA.
    pub fn apply_to_dfa(&self, dfa: &Dfa) -> Result<Dfa, EditError> {
        let mut out = dfa.clone();
        match *self {
            Edit::ToggleAccept { state, accepting } => out.set_accepting(state, accepting)?,
            Edit::RedirectTransition {
                source,
                symbol,
                from,
                to,
            } => {
                let found = dfa.successor(source, symbol);
                if found != Some(from) {
                    return Err(EditError::UnexpectedTarget {
                        source,
                        symbol,
                        expected: from,
                        found,
                    });
                }
                out.set_transition(source, symbol, to)?;
            }
            Edit::AddState { state } => {
                if state != dfa.size() {
                    return Err(EditError::UnexpectedStateId {
                        expected: state,
                        found: dfa.size(),
                    });
                }
                out.add_state(false);
                for i in 0..dfa.alphabet().size() {
                    out.set_transition_at(state, i, state)?;
                }
            }
            _ => return Err(EditError::Unsupported(self.kind())),
        }
        Ok(out)
    }

    /// Applies the edit to a copy of `nfa`.
    pub fn apply_to_nfa(&self, nfa: &Nfa) -> Result<Nfa, EditError> {
        let mut out = nfa.clone();
        match *self {
            Edit::ToggleAccept { state, accepting } => out.set_accepting(state, accepting)?,
            Edit::RedirectTransition {
                source,
                symbol,
                from,
                to,
            } => {
                let old = NfaEdge::new(source, Some(symbol), from);
                if !out.remove_edge(&old) {
                    return Err(EditError::MissingEdge(old));
                }
                out.add_edge(NfaEdge::new(source, Some(symbol), to))?;
            }
            Edit::AddState { state } => {
                if state != nfa.size() {
                    return Err(EditError::UnexpectedStateId {
                        expected: state,
                        found: nfa.size(),
                    });
                }
                out.add_state(false);
            }
            Edit::AddEdge {
                source,
                symbol,
                target,
            } => {
                out.add_edge(NfaEdge::new(source, Some(symbol), target))?;
            }
            Edit::RemoveEdge {
                source,
                symbol,
                target,
            } => {
                let edge = NfaEdge::new(source, Some(symbol), target);
                if !out.remove_edge(&edge) {
                    return Err(EditError::MissingEdge(edge));
                }
            }
            Edit::RemoveState { state } => return Ok(nfa.remove_state(state)?),
            Edit::CollapseStates { kept, merged } => return Ok(nfa.merge_states(kept, merged)?),
        }
        Ok(out)
    }
}

impl Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edit::ToggleAccept { state, accepting } => write!(
                f,
                "make state {state} {}",
                if *accepting { "accepting" } else { "rejecting" }
            ),
            Edit::RedirectTransition {
                source,
                symbol,
                from,
                to,
            } => write!(
                f,
                "redirect the '{symbol}' transition of state {source} from {from} to {to}"
            ),
            Edit::AddState { state } => write!(f, "add state {state}"),
            Edit::AddEdge {
                source,
                symbol,
                target,
            } => write!(f, "add a '{symbol}' edge from {source} to {target}"),
            Edit::RemoveEdge {
                source,
                symbol,
                target,
            } => write!(f, "remove the '{symbol}' edge from {source} to {target}"),
            Edit::RemoveState { state } => write!(f, "remove state {state}"),
            Edit::CollapseStates { kept, merged } => {
                write!(f, "merge state {merged} into state {kept}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Edit, EditKind};
    use crate::EditError;
    use automata::{prelude::*, Relabeling};
    use pretty_assertions::assert_eq;

    fn even_a() -> Dfa {
        Dfa::from_parts(
            alphabet!('a', 'b'),
            [(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)],
            [0],
            0,
        )
        .unwrap()
    }

    #[test]
    fn dfa_edits() {
        let dfa = even_a();
        let toggled = Edit::ToggleAccept {
            state: 1,
            accepting: true,
        }
        .apply_to_dfa(&dfa)
        .unwrap();
        assert!(toggled.accepts(&['a']));
        assert!(!dfa.accepts(&['a']), "the original is left untouched");

        let redirected = Edit::RedirectTransition {
            source: 0,
            symbol: 'a',
            from: 1,
            to: 0,
        }
        .apply_to_dfa(&dfa)
        .unwrap();
        assert!(redirected.accepts(&['a', 'a', 'a']));

        let grown = Edit::AddState { state: 2 }.apply_to_dfa(&dfa).unwrap();
        assert_eq!(grown.size(), 3);
        assert!(grown.is_complete());
        assert_eq!(grown.successor(2, 'b'), Some(2));
        assert!(grown.equivalent(&dfa));
    }

    #[test]
    fn stale_dfa_edits_are_rejected() {
        let dfa = even_a();
        assert_eq!(
            Edit::RedirectTransition {
                source: 0,
                symbol: 'a',
                from: 0,
                to: 1
            }
            .apply_to_dfa(&dfa),
            Err(EditError::UnexpectedTarget {
                source: 0,
                symbol: 'a',
                expected: 0,
                found: Some(1)
            })
        );
        assert_eq!(
            Edit::AddState { state: 5 }.apply_to_dfa(&dfa),
            Err(EditError::UnexpectedStateId {
                expected: 5,
                found: 2
            })
        );
        assert_eq!(
            Edit::RemoveState { state: 0 }.apply_to_dfa(&dfa),
            Err(EditError::Unsupported(EditKind::RemoveState))
        );
        assert!(matches!(
            Edit::ToggleAccept {
                state: 9,
                accepting: true
            }
            .apply_to_dfa(&dfa),
            Err(EditError::Automaton(AutomatonError::UnknownState(9)))
        ));
    }

    #[test]
    fn nfa_edits() {
        let nfa = Nfa::from(&even_a());
        let added = Edit::AddEdge {
            source: 0,
            symbol: 'a',
            target: 0,
        }
        .apply_to_nfa(&nfa)
        .unwrap();
        assert_eq!(added.edge_count(), 5);
        assert!(added.accepts(&['a']));

        let removed = Edit::RemoveEdge {
            source: 0,
            symbol: 'a',
            target: 1,
        }
        .apply_to_nfa(&nfa)
        .unwrap();
        assert!(!removed.accepts(&['a', 'a']));
        assert_eq!(
            Edit::RemoveEdge {
                source: 0,
                symbol: 'a',
                target: 0
            }
            .apply_to_nfa(&nfa),
            Err(EditError::MissingEdge(NfaEdge::new(0, Some('a'), 0)))
        );

        let redirected = Edit::RedirectTransition {
            source: 1,
            symbol: 'a',
            from: 0,
            to: 1,
        }
        .apply_to_nfa(&nfa)
        .unwrap();
        assert!(redirected.contains_edge(&NfaEdge::new(1, Some('a'), 1)));
        assert!(!redirected.contains_edge(&NfaEdge::new(1, Some('a'), 0)));

        let smaller = Edit::RemoveState { state: 1 }.apply_to_nfa(&nfa).unwrap();
        assert_eq!(smaller.size(), 1);
        let merged = Edit::CollapseStates { kept: 0, merged: 1 }
            .apply_to_nfa(&nfa)
            .unwrap();
        assert_eq!(merged.size(), 1);
        assert!(merged.accepts(&['a']));
    }

    #[test]
    fn relabel_and_display() {
        let edit = Edit::RedirectTransition {
            source: 0,
            symbol: 'b',
            from: 1,
            to: 2,
        };
        let (_, relabeling) = Dfa::from_parts(
            alphabet!('a', 'b'),
            [
                (0, 'a', 2),
                (0, 'b', 0),
                (1, 'a', 1),
                (1, 'b', 1),
                (2, 'a', 1),
                (2, 'b', 2),
            ],
            [],
            0,
        )
        .unwrap()
        .canonicalize();
        assert_eq!(
            edit.relabel(&relabeling),
            Edit::RedirectTransition {
                source: 0,
                symbol: 'b',
                from: 2,
                to: 1
            }
        );
        assert_eq!(
            Edit::AddState { state: 7 }.relabel(&Relabeling::identity(3)),
            Edit::AddState { state: 7 }
        );
        assert_eq!(
            edit.to_string(),
            "redirect the 'b' transition of state 0 from 1 to 2"
        );
        assert_eq!(
            Edit::CollapseStates { kept: 0, merged: 2 }.to_string(),
            "merge state 2 into state 0"
        );
        assert_eq!(EditKind::ToggleAccept.to_string(), "toggle-accept");
    }
}
