use std::time::Duration;

/// The wall clock budget that is used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configures an edit distance search.
///
/// ```
/// use std::time::Duration;
/// use automata_edit::SearchOptions;
///
/// let options = SearchOptions::default()
///     .with_timeout(Duration::from_millis(500))
///     .with_max_depth(4);
/// assert_eq!(options.max_depth(), Some(4));
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SearchOptions {
    timeout: Duration,
    max_depth: Option<usize>,
    fill_size_deficit: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_depth: None,
            fill_size_deficit: true,
        }
    }
}

impl SearchOptions {
    /// Sets the wall clock budget of the whole search. Once it is used up the search stops and
    /// reports a timeout.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Limits the number of edits that are tried by the iterative deepening. Without a limit, the
    /// search goes as deep as the number of distinct edit slots of the candidate.
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..self
        }
    }

    /// Disables the states that are added up front when a deterministic candidate has fewer
    /// states than the minimal target.
    pub fn without_size_fill(self) -> Self {
        Self {
            fill_size_deficit: false,
            ..self
        }
    }

    /// The wall clock budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The configured depth limit, if any.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Whether missing states are added before the search.
    pub fn fill_size_deficit(&self) -> bool {
        self.fill_size_deficit
    }
}
