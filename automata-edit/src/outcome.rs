use std::{fmt::Display, time::Duration};

use automata::Relabeling;

use crate::{Edit, EditScript};

/// The result of an edit distance search.
#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Outcome {
    /// The candidate accepts the target language and there is nothing to suggest.
    AlreadyEquivalent,
    /// The candidate accepts the target language, but applying the given edit makes it smaller
    /// while keeping the language.
    Simplifiable(Edit),
    /// The candidate accepts the target language and is larger than needed, but the time budget
    /// ran out before every simplification could be tried.
    SimplificationTimedOut,
    /// A cheapest script among the shortest ones that make the candidate equivalent to the target.
    Found(EditScript),
    /// The time budget ran out before a depth could be searched completely. All depths up to and
    /// including `completed_depth` have been ruled out.
    TimedOut { completed_depth: usize },
    /// No script with at most `max_depth` edits exists.
    Exhausted { max_depth: usize },
}

impl Outcome {
    /// Returns true if the candidate already accepts the target language.
    pub fn is_equivalent(&self) -> bool {
        matches!(
            self,
            Outcome::AlreadyEquivalent
                | Outcome::Simplifiable(_)
                | Outcome::SimplificationTimedOut
        )
    }

    /// Returns true if the search ran out of time.
    pub fn timed_out(&self) -> bool {
        matches!(
            self,
            Outcome::TimedOut { .. } | Outcome::SimplificationTimedOut
        )
    }

    /// The script that was found, if any.
    pub fn script(&self) -> Option<&EditScript> {
        match self {
            Outcome::Found(script) => Some(script),
            _ => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::AlreadyEquivalent => write!(f, "your automaton already matches"),
            Outcome::Simplifiable(edit) => write!(
                f,
                "your automaton already matches, but it can be simplified: {edit}"
            ),
            Outcome::SimplificationTimedOut => write!(
                f,
                "your automaton already matches, but looking for a simplification ran out of time"
            ),
            Outcome::Found(script) => {
                write!(f, "edit distance {}: {script}", script.cost())
            }
            Outcome::TimedOut { .. } => {
                write!(f, "no edit distance found (try a larger time budget)")
            }
            Outcome::Exhausted { max_depth: 1 } => {
                write!(f, "no edit distance found within 1 edit")
            }
            Outcome::Exhausted { max_depth } => {
                write!(f, "no edit distance found within {max_depth} edits")
            }
        }
    }
}

/// Counters that describe how much work a search did.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct SearchStats {
    /// Number of visited nodes of the search tree, over all iterations.
    pub calls: u64,
    /// Number of leaves that were rejected by the test sample.
    pub oracle_rejections: u64,
    /// Number of exact equivalence checks.
    pub exact_checks: u64,
    /// The largest depth that was searched completely.
    pub completed_depth: usize,
    /// The number of words in the test sample.
    pub sample_size: usize,
    /// Wall clock time spent in the search.
    pub elapsed: Duration,
}

/// Everything a search produces: the [`Outcome`], some statistics and the relabeling that relates
/// the state ids in the outcome to the ids of the candidate that was passed in.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SearchReport {
    /// What was found.
    pub outcome: Outcome,
    /// How much work it took.
    pub stats: SearchStats,
    /// Maps the canonical state ids that edits refer to onto the ids of the given candidate.
    pub relabeling: Relabeling,
}

impl SearchReport {
    /// The script that was found, with states numbered canonically.
    pub fn script(&self) -> Option<&EditScript> {
        self.outcome.script()
    }

    /// The script that was found, with states numbered like in the given candidate.
    pub fn original_script(&self) -> Option<EditScript> {
        self.script().map(|script| script.relabel(&self.relabeling))
    }

    /// The cost of the script that was found.
    pub fn cost(&self) -> Option<usize> {
        self.script().map(EditScript::cost)
    }

    /// Returns true if the search ran out of time.
    pub fn timed_out(&self) -> bool {
        self.outcome.timed_out()
    }
}

impl Display for SearchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.outcome)
    }
}
