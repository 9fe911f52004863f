/// Which participant is to move, expressed relative to the fixed reference player from whose
/// perspective [`DecisionState::evaluate_game`] reports outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Perspective {
    /// The reference player is to move.
    Reference,
    /// The reference player's opponent is to move.
    Opponent,
}

impl Perspective {
    /// `+1.0` for [`Perspective::Reference`] and `-1.0` for [`Perspective::Opponent`]; used as the
    /// sign multiplier during backpropagation.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Perspective::Reference => 1.0,
            Perspective::Opponent => -1.0,
        }
    }

    /// The other participant.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Perspective::Reference => Perspective::Opponent,
            Perspective::Opponent => Perspective::Reference,
        }
    }
}

/// The evaluation of a state; the outcome is only available once the game has ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameResult {
    /// The game is still in progress.
    Ongoing,
    /// The game is over with the given signed outcome, from the perspective of the reference
    /// player.
    Ended(f64),
}

impl GameResult {
    /// Returns `true` for [`GameResult::Ended`].
    #[inline]
    pub fn is_ended(&self) -> bool {
        matches!(self, GameResult::Ended(_))
    }

    /// The outcome if the game has ended.
    #[inline]
    pub fn outcome(&self) -> Option<f64> {
        match *self {
            GameResult::Ended(v) => Some(v),
            GameResult::Ongoing => None,
        }
    }
}

/// Requires implementation by the user in order to provide the rules of the decision process.
///
/// A `DecisionState` represents one point in a one or two player (possibly stochastic) decision
/// process.  The search clones states freely: the tree keeps its own copy per node and every
/// rollout works on a private clone.
///
/// # Implementation Note
///
/// `Clone` must produce an independent copy: mutating a clone must never be observable through
/// the original or any other clone.  Types with shared interior mutability (e.g. an
/// `Rc<RefCell<_>>` board) break this requirement and result in logic errors.
pub trait DecisionState: Clone {
    /// The move identifier that transitions this state into a successor.
    type Action: Action<Self>;

    /// The actions available from this state, in a fixed order.  Expansion consumes them front to
    /// back, so the order determines the order in which children are created.
    ///
    /// A non-terminal state must return at least one action; an empty result for a state that is
    /// not ended is reported as
    /// [`SearchError::NoLegalActions`](crate::SearchError::NoLegalActions).
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Resolve any hidden or random information into a concrete instance.  Called on a private
    /// clone before each rollout.  The default does nothing, which is correct for games of perfect
    /// information.
    fn randomize_unknowns(&mut self) {}

    /// Whether play has ended.  Checked before every rollout step.
    fn is_game_ended(&self) -> bool;

    /// Evaluate the state.  The outcome is a finite signed value from the perspective of the
    /// reference player and is only meaningful for ended games; a non-finite outcome fails the
    /// search with [`SearchError::NonFiniteOutcome`](crate::SearchError::NonFiniteOutcome).
    /// The search treats a node as terminal iff this returns [`GameResult::Ended`].
    fn evaluate_game(&self) -> GameResult;

    /// The participant to move.  For single player processes this is always
    /// [`Perspective::Reference`].
    fn next_to_move(&self) -> Perspective;
}

/// An immutable move identifier.
///
/// `Debug` and `PartialEq` allow the recommended action to be inspected and compared by callers.
pub trait Action<S>: Clone + std::fmt::Debug + PartialEq {
    /// Apply the action, producing the successor state.  The state is passed by value; it is
    /// always a copy owned by the caller, so mutating it in place and returning it is fine.
    fn apply_to(&self, state: S) -> S;
}

/// Chooses the action used to advance a rollout.
///
/// Called only with states that are not ended; must return a legal action for that state.  The
/// policy is shared by all simulation workers, hence `Sync` and `&self` (a policy that needs a
/// random source can keep it behind a `Mutex` or use a thread local one).
///
/// Any `Fn(&S) -> S::Action + Sync` closure is a `RolloutPolicy`.
pub trait RolloutPolicy<S: DecisionState>: Sync {
    /// Pick an action for `state`.
    fn choose(&self, state: &S) -> S::Action;
}

impl<S, F> RolloutPolicy<S> for F
where
    S: DecisionState,
    F: Fn(&S) -> S::Action + Sync,
{
    #[inline(always)]
    fn choose(&self, state: &S) -> S::Action {
        self(state)
    }
}

/// A rollout policy picking uniformly among the legal actions using the thread local random
/// number generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandom;

impl<S: DecisionState> RolloutPolicy<S> for UniformRandom {
    fn choose(&self, state: &S) -> S::Action {
        use rand::seq::SliceRandom;

        let actions = state.legal_actions();
        actions
            .choose(&mut rand::thread_rng())
            .cloned()
            .expect("rollout policy called on a state without legal actions")
    }
}
