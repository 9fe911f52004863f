use thiserror::Error;

/// Errors that can occur during a search.
///
/// The search itself has no recoverable failure modes; every variant reports either unusable
/// input or a [`DecisionState`](crate::DecisionState) / policy implementation that broke its
/// contract.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A search needs at least one simulation to produce an action.
    #[error("simulation count must be at least 1")]
    NoSimulations,

    /// The root state is already terminal, so there is no action to recommend.
    #[error("root state is terminal")]
    TerminalRoot,

    /// A state that is not ended enumerated no legal actions.
    #[error("non-terminal state at depth {depth} has no legal actions")]
    NoLegalActions {
        /// Depth of the offending node (the root has depth 0).
        depth: usize,
    },

    /// A rollout stopped because `is_game_ended` returned `true`, but `evaluate_game` reported the
    /// game as ongoing.
    #[error("rollout reached an ended state that evaluates as ongoing")]
    UnresolvedOutcome,

    /// A rollout ended with an outcome that is not a finite number.
    #[error("rollout produced a non-finite outcome: {0}")]
    NonFiniteOutcome(f64),

    /// No child of a fully expanded node could be scored for selection.
    #[error("no child of the node at depth {depth} could be selected")]
    NoSelectableChild {
        /// Depth of the node whose children were compared.
        depth: usize,
    },

    /// The operating system random source could not seed the tie-breaker.
    #[error("failed to obtain randomness: {0}")]
    Entropy(#[from] rand::Error),

    /// The configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A simulation worker panicked, or user supplied code panicked on a worker while holding the
    /// tree lock.  Panics raised on the calling thread (e.g. in `legal_actions` during the tree
    /// policy) are not caught and unwind out of the search.
    #[error("simulation worker panicked")]
    WorkerPanicked,
}

/// Convenience `Result` type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
