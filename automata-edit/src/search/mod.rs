//! Iterative deepening search for cheapest edit scripts.
//!
//! The search tree has one node per sequence of edits. Every edit occupies a numbered *slot* and
//! along a branch the slots have to strictly increase, so a set of edits on distinct slots is
//! visited exactly once, no matter in which order its edits could be applied. All alternatives for
//! the same slot, such as the possible new targets of one transition, share that slot.

use std::{
    ops::ControlFlow,
    time::{Duration, Instant},
};

use automata::Acceptor;
use owo_colors::OwoColorize;
use tracing::{debug, info, trace};

use crate::{Edit, EditError, EditScript, Outcome, SearchStats, TestSample, TOGGLE_COST_CAP};

mod dfa;
pub use dfa::{dfa_edit_distance, DfaEditSearch};

mod nfa;
pub use nfa::{nfa_edit_distance, NfaEditSearch};

/// The edits that can be made to an automaton, arranged in slots.
pub(crate) trait EditSpace {
    /// The kind of automaton that is edited.
    type Automaton: Acceptor;

    /// Gives every edit applicable to `current` whose slot is larger than `after`, in ascending
    /// order of slots.
    fn edits(&self, current: &Self::Automaton, after: Option<usize>) -> Vec<(usize, Edit)>;

    /// Applies `edit` to a copy of `current`.
    fn apply(&self, current: &Self::Automaton, edit: &Edit) -> Result<Self::Automaton, EditError>;

    /// Decides whether `candidate` accepts the target language.
    fn is_equivalent(&self, candidate: &Self::Automaton) -> bool;
}

/// A wall clock budget that starts running when it is created.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub(crate) fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Why a search stopped before it was done.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Interrupt {
    TimedOut,
    Failed(EditError),
}

/// One edit on the path from the root of the search tree to the current node. Every frame of the
/// recursion owns its own link and points to the one of its caller, so leaving a frame undoes the
/// edit without any bookkeeping.
#[derive(Debug)]
struct Branch<'a> {
    edit: Edit,
    slot: usize,
    toggles: usize,
    cost: usize,
    parent: Option<&'a Branch<'a>>,
}

impl<'a> Branch<'a> {
    /// Extends `parent` by `edit`. Without a parent, toggles and cost are counted on top of
    /// `root`, which holds the toggles and cost of the edits made before the search.
    fn extend(
        parent: Option<&'a Branch<'a>>,
        root: (usize, usize),
        slot: usize,
        edit: Edit,
    ) -> Self {
        let (toggles, cost) = parent.map_or(root, |p| (p.toggles, p.cost));
        let (toggles, cost) = if edit.is_toggle() {
            (toggles + 1, cost + usize::from(toggles < TOGGLE_COST_CAP))
        } else {
            (toggles, cost + 1)
        };
        Self {
            edit,
            slot,
            toggles,
            cost,
            parent,
        }
    }

    /// The edits from the root to this branch, in the order in which they were made.
    fn edits(&self) -> Vec<Edit> {
        let mut edits = vec![self.edit];
        let mut current = self.parent;
        while let Some(branch) = current {
            edits.push(branch.edit);
            current = branch.parent;
        }
        edits.reverse();
        edits
    }
}

/// Searches for a cheapest script among the shortest scripts that turn `start` into an automaton
/// which `space` deems equivalent to the target. `prefix` holds edits that were already made to
/// obtain `start`, they are put in front of every script that is found.
pub(crate) struct IterativeDeepening<'s, S: EditSpace> {
    space: &'s S,
    sample: &'s TestSample,
    deadline: Deadline,
    prefix: EditScript,
    best: Option<EditScript>,
    stats: SearchStats,
}

impl<'s, S: EditSpace> IterativeDeepening<'s, S> {
    pub(crate) fn new(
        space: &'s S,
        sample: &'s TestSample,
        deadline: Deadline,
        prefix: EditScript,
    ) -> Self {
        Self {
            space,
            sample,
            deadline,
            prefix,
            best: None,
            stats: SearchStats {
                sample_size: sample.len(),
                ..Default::default()
            },
        }
    }

    /// Searches with one more edit per round, until a round yields a script or `max_depth` rounds
    /// are done. A round that finds a script is still searched completely, so the cheapest one at
    /// that depth is returned.
    pub(crate) fn run(
        mut self,
        start: &S::Automaton,
        max_depth: usize,
    ) -> Result<(Outcome, SearchStats), EditError> {
        let outcome = 'rounds: {
            for depth in 1..=max_depth {
                debug!("searching for scripts with {depth} edits");
                match self.explore(start, None, depth) {
                    ControlFlow::Break(Interrupt::TimedOut) => {
                        info!(
                            "search timed out after {} calls while at depth {depth}",
                            self.stats.calls
                        );
                        break 'rounds Outcome::TimedOut {
                            completed_depth: self.stats.completed_depth,
                        };
                    }
                    ControlFlow::Break(Interrupt::Failed(err)) => return Err(err),
                    ControlFlow::Continue(()) => {}
                }
                self.stats.completed_depth = depth;
                if let Some(best) = self.best.take() {
                    info!(
                        "found script of cost {} with {} edits after {} calls",
                        best.cost(),
                        best.len(),
                        self.stats.calls
                    );
                    break 'rounds Outcome::Found(best);
                }
            }
            info!("no script with at most {max_depth} edits exists");
            Outcome::Exhausted { max_depth }
        };
        self.stats.elapsed = self.deadline.elapsed();
        Ok((outcome, self.stats))
    }

    fn explore(
        &mut self,
        current: &S::Automaton,
        branch: Option<&Branch<'_>>,
        remaining: usize,
    ) -> ControlFlow<Interrupt> {
        if self.deadline.expired() {
            return ControlFlow::Break(Interrupt::TimedOut);
        }
        self.stats.calls += 1;

        if remaining == 0 {
            if let Some(branch) = branch {
                self.check(current, branch);
            }
            return ControlFlow::Continue(());
        }

        let root = (self.prefix.toggles(), self.prefix.cost());
        for (slot, edit) in self.space.edits(current, branch.map(|b| b.slot)) {
            let child = Branch::extend(branch, root, slot, edit);
            // scripts never get cheaper when they are extended
            if self
                .best
                .as_ref()
                .is_some_and(|best| child.cost >= best.cost())
            {
                continue;
            }
            let next = match self.space.apply(current, &edit) {
                Ok(next) => next,
                Err(err) => return ControlFlow::Break(Interrupt::Failed(err)),
            };
            self.explore(&next, Some(&child), remaining - 1)?;
        }
        ControlFlow::Continue(())
    }

    fn check(&mut self, candidate: &S::Automaton, branch: &Branch<'_>) {
        if let Err((word, label)) = self.sample.consistent_with(candidate) {
            self.stats.oracle_rejections += 1;
            trace!(
                "{} by {:?} (should be {})",
                "rejected".red(),
                word.iter().collect::<String>(),
                label
            );
            return;
        }
        self.stats.exact_checks += 1;
        if !self.space.is_equivalent(candidate) {
            trace!("passed the sample but is not equivalent");
            return;
        }

        let script: EditScript = self
            .prefix
            .iter()
            .copied()
            .chain(branch.edits())
            .collect();
        if self
            .best
            .as_ref()
            .map_or(true, |best| script.cost() < best.cost())
        {
            debug!("{} {script} with cost {}", "new best".green(), script.cost());
            self.best = Some(script);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Branch;
    use crate::Edit;
    use pretty_assertions::assert_eq;

    #[test]
    fn branches_track_capped_cost() {
        let toggle = |state| Edit::ToggleAccept {
            state,
            accepting: false,
        };
        let first = Branch::extend(None, (0, 0), 0, toggle(0));
        let second = Branch::extend(Some(&first), (0, 0), 1, toggle(1));
        let third = Branch::extend(Some(&second), (0, 0), 2, toggle(2));
        let fourth = Branch::extend(Some(&third), (0, 0), 7, Edit::AddState { state: 3 });
        assert_eq!(
            (first.cost, second.cost, third.cost, fourth.cost),
            (1, 2, 2, 3)
        );
        assert_eq!(fourth.toggles, 3);
        assert_eq!(
            fourth.edits(),
            vec![toggle(0), toggle(1), toggle(2), Edit::AddState { state: 3 }]
        );

        // two toggles made before the search already use up the counted ones
        let after_prefix = Branch::extend(None, (2, 5), 0, toggle(0));
        assert_eq!((after_prefix.toggles, after_prefix.cost), (3, 5));
    }
}
