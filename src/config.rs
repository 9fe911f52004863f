//! Search configuration.

use crate::error::{Result, SearchError};

/// The classic UCT exploration weight (roughly `sqrt(2)`).
pub const DEFAULT_EXPLORATION: f64 = 1.4;

/// How simulations (rollout + backpropagation) are executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Run every simulation on the calling thread right after its leaf is selected.  Combined
    /// with [`Randomness::Seeded`] and a deterministic rollout policy the search is reproducible.
    Inline,
    /// Hand simulations to this many worker threads while the calling thread keeps running the
    /// tree policy.
    Workers(usize),
}

impl Default for Dispatch {
    fn default() -> Self {
        let n = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Dispatch::Workers(n)
    }
}

/// Source of randomness for breaking ties between equally scored children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Randomness {
    /// A ChaCha20 stream seeded from the operating system; not reproducible.
    Entropy,
    /// A ChaCha20 stream seeded with the given value; for deterministic replay.
    Seeded(u64),
}

impl Default for Randomness {
    fn default() -> Self {
        Randomness::Entropy
    }
}

/// How the action returned by the search is picked among the root's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalSelection {
    /// Highest average outcome, i.e. UCT with an exploration weight of `0.0`.
    BestMean,
    /// Highest visit count.
    MostVisited,
}

impl Default for FinalSelection {
    fn default() -> Self {
        FinalSelection::BestMean
    }
}

/// Search configuration parameters.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Number of simulations per search; the only termination control.
    pub simulations: usize,

    /// UCT exploration weight used while descending the tree.
    pub exploration: f64,

    /// Where rollouts run.
    pub dispatch: Dispatch,

    /// Tie-breaking random source.
    pub randomness: Randomness,

    /// Rule for the final decision at the root.
    pub final_selection: FinalSelection,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            simulations: 1000,
            exploration: DEFAULT_EXPLORATION,
            dispatch: Dispatch::default(),
            randomness: Randomness::default(),
            final_selection: FinalSelection::default(),
        }
    }
}

impl SearchConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(simulations: usize) -> Self {
        Self {
            simulations,
            ..Default::default()
        }
    }

    /// Run simulations on the calling thread with a seeded tie-breaker.
    pub fn deterministic(simulations: usize, seed: u64) -> Self {
        Self {
            simulations,
            dispatch: Dispatch::Inline,
            randomness: Randomness::Seeded(seed),
            ..Default::default()
        }
    }

    /// Set the UCT exploration weight.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Set where rollouts run.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Set the tie-breaking random source.
    pub fn with_randomness(mut self, randomness: Randomness) -> Self {
        self.randomness = randomness;
        self
    }

    /// Set the final decision rule.
    pub fn with_final_selection(mut self, final_selection: FinalSelection) -> Self {
        self.final_selection = final_selection;
        self
    }

    /// Check the parameters before a search is started.
    pub fn validate(&self) -> Result<()> {
        if self.simulations == 0 {
            return Err(SearchError::NoSimulations);
        }
        if !(self.exploration >= 0.0 && self.exploration.is_finite()) {
            return Err(SearchError::InvalidConfig(format!(
                "exploration weight must be finite and non-negative, got {}",
                self.exploration
            )));
        }
        if let Dispatch::Workers(0) = self.dispatch {
            return Err(SearchError::InvalidConfig(
                "at least one worker thread is required".to_string(),
            ));
        }
        Ok(())
    }
}
