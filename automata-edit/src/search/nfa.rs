use std::time::Duration;

use automata::{CharAlphabet, Dfa, Nfa, NfaEdge, Relabeling};
use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::{debug, info, trace};

use super::{dfa::check_alphabet, Deadline, EditSpace, IterativeDeepening};
use crate::{
    Edit, EditError, EditScript, Outcome, SearchError, SearchOptions, SearchReport, SearchStats,
    TestSample,
};

/// Computes a cheapest script among the shortest ones that turn `candidate` into an NFA accepting
/// the same language as `goal`, searching for at most `timeout`. If the candidate already accepts
/// that language but is larger than the goal, a single simplification is suggested instead.
///
/// See [`NfaEditSearch`] for more control over the search.
pub fn nfa_edit_distance(
    goal: &Nfa,
    candidate: &Nfa,
    alphabet: &CharAlphabet,
    timeout: Duration,
) -> Result<SearchReport, SearchError> {
    NfaEditSearch::new(goal, candidate, alphabet)?
        .with_options(SearchOptions::default().with_timeout(timeout))
        .run()
}

/// An edit distance search between two NFAs.
///
/// Epsilon edges are removed from both automata first, which keeps their states, and the candidate
/// is canonicalized; edits in the resulting [`SearchReport`] refer to the states of that
/// epsilon-free, canonical candidate. Equivalence is decided on the minimal deterministic images,
/// the test sample is checked by simulating the candidate directly.
///
/// A candidate is edited by toggling the acceptance of states, by adding, removing and redirecting
/// edges. The number of states stays the same.
#[derive(Debug, Clone)]
pub struct NfaEditSearch {
    goal: Nfa,
    minimal_goal: Dfa,
    candidate: Nfa,
    relabeling: Relabeling,
    options: SearchOptions,
}

impl NfaEditSearch {
    /// Prepares a search, failing if one of the automata refers to states or symbols it does not
    /// have, or if they are not both defined over `alphabet`.
    pub fn new(goal: &Nfa, candidate: &Nfa, alphabet: &CharAlphabet) -> Result<Self, SearchError> {
        check_alphabet(alphabet, goal.alphabet())?;
        check_alphabet(alphabet, candidate.alphabet())?;
        goal.validate()?;
        candidate.validate()?;

        let goal = goal.without_epsilon();
        let (canonical, relabeling) = candidate.without_epsilon().canonicalize();
        Ok(Self {
            minimal_goal: goal.determinize().minimize(),
            goal,
            candidate: canonical,
            relabeling,
            options: SearchOptions::default(),
        })
    }

    /// Replaces the options of the search.
    pub fn with_options(self, options: SearchOptions) -> Self {
        Self { options, ..self }
    }

    /// The minimal DFA for the target language.
    pub fn minimal_goal(&self) -> &Dfa {
        &self.minimal_goal
    }

    /// The epsilon-free, canonical candidate, which the edits of a report refer to.
    pub fn candidate(&self) -> &Nfa {
        &self.candidate
    }

    /// Returns true if the candidate has more states than the goal, or as many states and more
    /// edges.
    pub fn is_oversized(&self) -> bool {
        (self.candidate.size(), self.candidate.edge_count())
            > (self.goal.size(), self.goal.edge_count())
    }

    /// Runs the search.
    pub fn run(&self) -> Result<SearchReport, SearchError> {
        let deadline = Deadline::new(self.options.timeout());
        let space = NfaSpace::new(&self.minimal_goal, &self.candidate);
        let sample = TestSample::from_goal(&self.minimal_goal);

        if space.is_equivalent(&self.candidate) {
            if !self.is_oversized() {
                info!("candidate already accepts the target language");
                return Ok(self.report(Outcome::AlreadyEquivalent, SearchStats::default()));
            }
            info!(
                "candidate accepts the target language with {} states and {} edges, looking for a simplification",
                self.candidate.size(),
                self.candidate.edge_count()
            );
            let (outcome, stats) = self.collapse(&space, &sample, deadline)?;
            return Ok(self.report(outcome, stats));
        }

        let max_depth = self
            .options
            .max_depth()
            .unwrap_or_else(|| space.slot_count());
        info!(
            "searching edits of an NFA with {} states and {} edges, at most {} edits",
            self.candidate.size(),
            self.candidate.edge_count(),
            max_depth
        );
        let (outcome, stats) =
            IterativeDeepening::new(&space, &sample, deadline, EditScript::default())
                .run(&self.candidate, max_depth)?;
        Ok(self.report(outcome, stats))
    }

    /// Looks for one edit that makes the candidate smaller without changing its language. Tries
    /// removing a state that is unreachable or from which nothing is accepted, then merging two
    /// states and finally removing a single edge. Gives back the first edit that works.
    fn collapse(
        &self,
        space: &NfaSpace<'_>,
        sample: &TestSample,
        deadline: Deadline,
    ) -> Result<(Outcome, SearchStats), EditError> {
        let reachable = self.candidate.reachable();
        let coreachable = self.candidate.coreachable();
        let useless = self
            .candidate
            .states()
            .filter(|q| !reachable.contains(*q) || !coreachable.contains(*q))
            .map(|state| Edit::RemoveState { state });
        let merges = self
            .candidate
            .states()
            .tuple_combinations()
            .map(|(kept, merged)| Edit::CollapseStates { kept, merged });
        let removals = self
            .candidate
            .edges()
            .filter_map(|edge| {
                edge.label.map(|symbol| Edit::RemoveEdge {
                    source: edge.source,
                    symbol,
                    target: edge.target,
                })
            })
            .collect_vec();

        let mut stats = SearchStats {
            sample_size: sample.len(),
            ..Default::default()
        };
        let mut outcome = Outcome::AlreadyEquivalent;
        for edit in useless.chain(merges).chain(removals) {
            if deadline.expired() {
                info!("no simplification found before the time ran out");
                outcome = Outcome::SimplificationTimedOut;
                break;
            }
            stats.calls += 1;
            let simplified = edit.apply_to_nfa(&self.candidate)?;
            if sample.consistent_with(&simplified).is_err() {
                stats.oracle_rejections += 1;
                continue;
            }
            stats.exact_checks += 1;
            if space.is_equivalent(&simplified) {
                debug!("{} {edit}", "simplification".green());
                outcome = Outcome::Simplifiable(edit);
                break;
            }
            trace!("{edit} changes the language");
        }
        stats.elapsed = deadline.elapsed();
        Ok((outcome, stats))
    }

    fn report(&self, outcome: Outcome, stats: SearchStats) -> SearchReport {
        SearchReport {
            outcome,
            stats,
            relabeling: self.relabeling.clone(),
        }
    }
}

/// Toggles and edge edits of an NFA with `n` states. Toggling state `q` has slot `q`. Every
/// possible edge `(p, a, q)` where `a` is the `i`-th symbol has slot `n + (p * width + i) * n + q`.
/// An edge that is absent can be added, one that is present can be removed or redirected to any
/// target that `p` does not reach on `a` yet.
struct NfaSpace<'a> {
    goal: &'a Dfa,
    alphabet: CharAlphabet,
    n: usize,
}

impl<'a> NfaSpace<'a> {
    fn new(goal: &'a Dfa, candidate: &Nfa) -> Self {
        Self {
            goal,
            alphabet: candidate.alphabet().clone(),
            n: candidate.size(),
        }
    }

    fn slot_count(&self) -> usize {
        self.n + self.n * self.alphabet.size() * self.n
    }
}

impl EditSpace for NfaSpace<'_> {
    type Automaton = Nfa;

    fn edits(&self, current: &Nfa, after: Option<usize>) -> Vec<(usize, Edit)> {
        let n = self.n;
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

        for slot in first.max(n)..self.slot_count() {
            let target = (slot - n) % n;
            let row = (slot - n) / n;
            let source = row / self.alphabet.size();
            let symbol = self.alphabet[row % self.alphabet.size()];
            let edge = NfaEdge::new(source, Some(symbol), target);
            if !current.contains_edge(&edge) {
                edits.push((
                    slot,
                    Edit::AddEdge {
                        source,
                        symbol,
                        target,
                    },
                ));
                continue;
            }
            edits.push((
                slot,
                Edit::RemoveEdge {
                    source,
                    symbol,
                    target,
                },
            ));
            edits.extend(
                (0..n)
                    .filter(|to| !current.contains_edge(&NfaEdge::new(source, Some(symbol), *to)))
                    .map(|to| {
                        (
                            slot,
                            Edit::RedirectTransition {
                                source,
                                symbol,
                                from: target,
                                to,
                            },
                        )
                    }),
            );
        }
        edits
    }

    fn apply(&self, current: &Nfa, edit: &Edit) -> Result<Nfa, EditError> {
        edit.apply_to_nfa(current)
    }

    fn is_equivalent(&self, candidate: &Nfa) -> bool {
        // minimal automata are numbered canonically, so equal languages give equal automata
        candidate.determinize().minimize() == *self.goal
    }
}
