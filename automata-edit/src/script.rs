use std::fmt::Display;

use automata::{Dfa, Nfa, Relabeling};
use itertools::Itertools;

use crate::{Edit, EditError};

/// Number of [`Edit::ToggleAccept`] edits in a script that contribute to its cost. Further toggles
/// are free. This is a grading policy, flipping the acceptance of many states is usually a single
/// conceptual mistake.
pub const TOGGLE_COST_CAP: usize = 2;

/// An ordered sequence of edits that turns a candidate automaton into one accepting the target
/// language. The edits are applied one after another, each refers to the states of the automaton
/// produced by its predecessors.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct EditScript(Vec<Edit>);

impl EditScript {
    /// Creates a script from the given edits.
    pub fn new<I: IntoIterator<Item = Edit>>(edits: I) -> Self {
        Self(edits.into_iter().collect())
    }

    /// The edits in the order in which they are applied.
    pub fn edits(&self) -> &[Edit] {
        &self.0
    }

    /// The number of edits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the script does nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends an edit.
    pub fn push(&mut self, edit: Edit) {
        self.0.push(edit)
    }

    /// Gives an iterator over the edits.
    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.0.iter()
    }

    /// The number of toggles in the script, including those that are free.
    pub fn toggles(&self) -> usize {
        self.0.iter().filter(|edit| edit.is_toggle()).count()
    }

    /// The cost of the script: every edit costs one, except that only the first
    /// [`TOGGLE_COST_CAP`] toggles are counted.
    pub fn cost(&self) -> usize {
        let toggles = self.toggles();
        self.len() - toggles + toggles.min(TOGGLE_COST_CAP)
    }

    /// Translates every edit back to the state numbering of the automaton that `relabeling` was
    /// computed for. See [`Edit::relabel`].
    pub fn relabel(&self, relabeling: &Relabeling) -> EditScript {
        self.0.iter().map(|edit| edit.relabel(relabeling)).collect()
    }

    /// Applies all edits in order to a copy of `dfa`.
    pub fn apply_to_dfa(&self, dfa: &Dfa) -> Result<Dfa, EditError> {
        self.0
            .iter()
            .try_fold(dfa.clone(), |current, edit| edit.apply_to_dfa(&current))
    }

    /// Applies all edits in order to a copy of `nfa`.
    pub fn apply_to_nfa(&self, nfa: &Nfa) -> Result<Nfa, EditError> {
        self.0
            .iter()
            .try_fold(nfa.clone(), |current, edit| edit.apply_to_nfa(&current))
    }
}

impl FromIterator<Edit> for EditScript {
    fn from_iter<T: IntoIterator<Item = Edit>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl IntoIterator for EditScript {
    type Item = Edit;
    type IntoIter = std::vec::IntoIter<Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for EditScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "no edits");
        }
        write!(f, "{}", self.0.iter().join(", then "))
    }
}
