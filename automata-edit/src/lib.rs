//! Computes how far a finite automaton is from accepting a target language, measured in edits.
//!
//! Given a reference automaton (the goal) and a candidate, a search looks for a cheapest sequence
//! of small modifications that makes the candidate accept the language of the goal. Candidates
//! are first compared against a [`TestSample`] of the goal, only those that pass are checked for
//! equivalence exactly.
//!
//! ```
//! use std::time::Duration;
//! use automata::prelude::*;
//! use automata_edit::{dfa_edit_distance, Edit};
//!
//! let goal = Dfa::from_parts(
//!     alphabet!('a', 'b'),
//!     [(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)],
//!     [0],
//!     0,
//! )
//! .unwrap();
//! let mut candidate = goal.clone();
//! candidate.set_accepting(1, true).unwrap();
//!
//! let report = dfa_edit_distance(&goal, &candidate, &alphabet!('a', 'b'), Duration::from_secs(1)).unwrap();
//! let script = report.script().unwrap();
//! assert_eq!(script.cost(), 1);
//! assert_eq!(script.edits(), &[Edit::ToggleAccept { state: 1, accepting: false }]);
//! ```
#![warn(missing_docs)]

mod error;
pub use error::{EditError, SearchError};

mod edit;
pub use edit::{Edit, EditKind};

mod script;
pub use script::{EditScript, TOGGLE_COST_CAP};

mod sample;
pub use sample::TestSample;

mod options;
pub use options::{SearchOptions, DEFAULT_TIMEOUT};

mod outcome;
pub use outcome::{Outcome, SearchReport, SearchStats};

mod search;
pub use search::{dfa_edit_distance, nfa_edit_distance, DfaEditSearch, NfaEditSearch};
