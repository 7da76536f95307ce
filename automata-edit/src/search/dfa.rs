use std::time::Duration;

use automata::{AutomatonError, CharAlphabet, Dfa, Relabeling};
use tracing::{debug, info};

use super::{Deadline, EditSpace, IterativeDeepening};
use crate::{
    Edit, EditError, EditScript, Outcome, SearchError, SearchOptions, SearchReport, SearchStats,
    TestSample,
};

/// Computes a cheapest script among the shortest ones that turn `candidate` into a DFA accepting
/// the same language as `goal`, searching for at most `timeout`.
///
/// Both automata have to be complete and read words over `alphabet`. See [`DfaEditSearch`] for
/// more control over the search.
pub fn dfa_edit_distance(
    goal: &Dfa,
    candidate: &Dfa,
    alphabet: &CharAlphabet,
    timeout: Duration,
) -> Result<SearchReport, SearchError> {
    DfaEditSearch::new(goal, candidate, alphabet)?
        .with_options(SearchOptions::default().with_timeout(timeout))
        .run()
}

pub(super) fn check_alphabet(
    expected: &CharAlphabet,
    found: &CharAlphabet,
) -> Result<(), AutomatonError> {
    if expected == found {
        Ok(())
    } else {
        Err(AutomatonError::AlphabetMismatch {
            expected: expected.clone(),
            found: found.clone(),
        })
    }
}

/// An edit distance search between two complete DFAs.
///
/// The goal is minimized and both automata are canonicalized before searching, the edits in the
/// resulting [`SearchReport`] refer to the canonical ids of the candidate. The search modifies the
/// candidate by toggling the acceptance of states and by redirecting transitions. If the candidate
/// has fewer states than the minimal goal, fresh states are added up front.
#[derive(Debug, Clone)]
pub struct DfaEditSearch {
    goal: Dfa,
    candidate: Dfa,
    relabeling: Relabeling,
    options: SearchOptions,
}

impl DfaEditSearch {
    /// Prepares a search, failing if one of the automata is not complete or if they are not both
    /// defined over `alphabet`.
    pub fn new(goal: &Dfa, candidate: &Dfa, alphabet: &CharAlphabet) -> Result<Self, SearchError> {
        check_alphabet(alphabet, goal.alphabet())?;
        check_alphabet(alphabet, candidate.alphabet())?;
        goal.check_complete()?;
        candidate.check_complete()?;

        let (canonical, relabeling) = candidate.canonicalize();
        Ok(Self {
            goal: goal.minimize(),
            candidate: canonical,
            relabeling,
            options: SearchOptions::default(),
        })
    }

    /// Replaces the options of the search.
    pub fn with_options(self, options: SearchOptions) -> Self {
        Self { options, ..self }
    }

    /// The minimal, canonical goal.
    pub fn goal(&self) -> &Dfa {
        &self.goal
    }

    /// The canonicalized candidate, which the edits of a report refer to.
    pub fn candidate(&self) -> &Dfa {
        &self.candidate
    }

    /// Runs the search.
    pub fn run(&self) -> Result<SearchReport, SearchError> {
        let deadline = Deadline::new(self.options.timeout());
        if self.candidate.equivalent(&self.goal) {
            info!("candidate already accepts the target language");
            return Ok(self.report(Outcome::AlreadyEquivalent, SearchStats::default()));
        }

        let mut start = self.candidate.clone();
        let mut prefix = EditScript::default();
        if self.options.fill_size_deficit() {
            while start.size() < self.goal.size() {
                let edit = Edit::AddState { state: start.size() };
                start = edit.apply_to_dfa(&start)?;
                prefix.push(edit);
            }
            if !prefix.is_empty() {
                debug!("added {} states to match the size of the goal", prefix.len());
            }
        }

        let space = DfaSpace {
            goal: &self.goal,
            width: self.goal.alphabet().size(),
        };
        let max_depth = self
            .options
            .max_depth()
            .unwrap_or_else(|| space.slot_count(&start));
        let sample = TestSample::from_goal(&self.goal);
        info!(
            "searching edits of a candidate with {} states against a goal with {} states, at most {} edits",
            start.size(),
            self.goal.size(),
            max_depth
        );
        let (outcome, stats) =
            IterativeDeepening::new(&space, &sample, deadline, prefix).run(&start, max_depth)?;
        Ok(self.report(outcome, stats))
    }

    fn report(&self, outcome: Outcome, stats: SearchStats) -> SearchReport {
        SearchReport {
            outcome,
            stats,
            relabeling: self.relabeling.clone(),
        }
    }
}

/// Toggles and redirections of a complete DFA. Toggling state `q` has slot `q`, redirecting the
/// transition on the `i`-th symbol out of `q` has slot `n + q * width + i`, shared by all new
/// targets.
struct DfaSpace<'a> {
    goal: &'a Dfa,
    width: usize,
}

impl DfaSpace<'_> {
    fn slot_count(&self, dfa: &Dfa) -> usize {
        dfa.size() * (1 + self.width)
    }
}

impl EditSpace for DfaSpace<'_> {
    type Automaton = Dfa;

    fn edits(&self, current: &Dfa, after: Option<usize>) -> Vec<(usize, Edit)> {
        let n = current.size();
        let first = after.map_or(0, |slot| slot + 1);
        let mut edits = vec![];

        for state in first.min(n)..n {
            edits.push((
                state,
                Edit::ToggleAccept {
                    state,
                    accepting: !current.is_accepting(state),
                },
            ));
        }

        for slot in first.max(n)..self.slot_count(current) {
            let source = (slot - n) / self.width;
            let index = (slot - n) % self.width;
            let symbol = current.alphabet()[index];
            let Some(from) = current.successor_at(source, index) else {
                continue;
            };
            edits.extend(current.states().filter(|to| *to != from).map(|to| {
                (
                    slot,
                    Edit::RedirectTransition {
                        source,
                        symbol,
                        from,
                        to,
                    },
                )
            }));
        }
        edits
    }

    fn apply(&self, current: &Dfa, edit: &Edit) -> Result<Dfa, EditError> {
        edit.apply_to_dfa(current)
    }

    fn is_equivalent(&self, candidate: &Dfa) -> bool {
        candidate.equivalent(self.goal)
    }
}
