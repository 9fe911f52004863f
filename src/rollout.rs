use crate::decision_state::{Action, DecisionState, RolloutPolicy};
use crate::error::{Result, SearchError};

/// Play `state` forward to the end of the game and return the outcome.
///
/// `state` is the caller's private clone of a node's state: hidden information is resolved on
/// it first, then the policy advances it until `is_game_ended` holds.  Nothing shared is touched,
/// so any number of rollouts may run at the same time.
pub(crate) fn rollout<S, P>(mut state: S, policy: &P) -> Result<f64>
where
    S: DecisionState,
    P: ?Sized + RolloutPolicy<S>,
{
    state.randomize_unknowns();
    while !state.is_game_ended() {
        let action = policy.choose(&state);
        state = action.apply_to(state);
    }
    let outcome = state
        .evaluate_game()
        .outcome()
        .ok_or(SearchError::UnresolvedOutcome)?;
    if !outcome.is_finite() {
        return Err(SearchError::NonFiniteOutcome(outcome));
    }
    Ok(outcome)
}
