//! The search driver: repeated tree policy, simulation and backpropagation, followed by the
//! final decision at the root.

use crate::config::{Dispatch, FinalSelection, SearchConfig};
use crate::decision_state::{DecisionState, RolloutPolicy};
use crate::error::{Result, SearchError};
use crate::rollout::rollout;
use crate::selection;
use crate::tie_break::TieBreaker;
use crate::tree::{NodeId, Tree};

use std::sync::Mutex;
use std::thread;

/// Run a search from `initial_state` with the default configuration and `simulation_count`
/// simulations, returning the recommended action.
///
/// # Examples
///
/// ```
/// use rollout_mcts::prelude::*;
///
/// // Whoever takes the last of the `left` sticks (1 or 2 per turn) wins.
/// #[derive(Clone, Debug)]
/// struct Sticks {
///     left: u32,
///     to_move: Perspective,
/// }
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Take(u32);
///
/// impl Action<Sticks> for Take {
///     fn apply_to(&self, mut s: Sticks) -> Sticks {
///         s.left -= self.0;
///         s.to_move = s.to_move.flip();
///         s
///     }
/// }
///
/// impl DecisionState for Sticks {
///     type Action = Take;
///
///     fn legal_actions(&self) -> Vec<Take> {
///         (1..=self.left.min(2)).map(Take).collect()
///     }
///
///     fn is_game_ended(&self) -> bool {
///         self.left == 0
///     }
///
///     fn evaluate_game(&self) -> GameResult {
///         match (self.left, self.to_move) {
///             (0, Perspective::Opponent) => GameResult::Ended(1.0),
///             (0, Perspective::Reference) => GameResult::Ended(-1.0),
///             _ => GameResult::Ongoing,
///         }
///     }
///
///     fn next_to_move(&self) -> Perspective {
///         self.to_move
///     }
/// }
///
/// let state = Sticks { left: 2, to_move: Perspective::Reference };
/// let action = search(state, UniformRandom, 200).unwrap();
/// assert_eq!(action, Take(2));
/// ```
pub fn search<S, P>(
    initial_state: S,
    rollout_policy: P,
    simulation_count: usize,
) -> Result<S::Action>
where
    S: DecisionState + Send,
    S::Action: Send,
    P: RolloutPolicy<S>,
{
    let config = SearchConfig::with_simulations(simulation_count);
    Mcts::new(config, rollout_policy).search(initial_state)
}

/// The result of [`Mcts::search_tree`]: the recommended action together with the finished tree.
#[derive(Debug)]
pub struct SearchOutcome<S: DecisionState> {
    /// The recommended action at the root.
    pub action: S::Action,
    /// The tree built by the search, for inspection only.
    pub tree: Tree<S>,
}

/// A configured search, reusable for any number of independent searches (no state is carried
/// over between them).
#[derive(Debug, Clone)]
pub struct Mcts<P> {
    config: SearchConfig,
    policy: P,
}

impl<P> Mcts<P> {
    /// Construct a new `Mcts` from a configuration and the rollout policy.
    pub fn new(config: SearchConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search from `state` and return the recommended action.
    pub fn search<S>(&self, state: S) -> Result<S::Action>
    where
        S: DecisionState + Send,
        S::Action: Send,
        P: RolloutPolicy<S>,
    {
        self.search_tree(state).map(|outcome| outcome.action)
    }

    /// Search from `state` and return the recommended action along with the tree.
    ///
    /// Returns only after every dispatched simulation has been backpropagated, so the root's visit
    /// count equals the configured number of simulations.
    pub fn search_tree<S>(&self, state: S) -> Result<SearchOutcome<S>>
    where
        S: DecisionState + Send,
        S::Action: Send,
        P: RolloutPolicy<S>,
    {
        self.config.validate()?;
        let mut tie_breaker = TieBreaker::new(self.config.randomness)?;

        let tree = Tree::new(state);
        if tree.root().is_terminal() {
            return Err(SearchError::TerminalRoot);
        }

        log::debug!(
            "starting search: {} simulations, {:?}",
            self.config.simulations,
            self.config.dispatch
        );

        let tree = match self.config.dispatch {
            Dispatch::Inline => self.run_inline(tree, &mut tie_breaker)?,
            Dispatch::Workers(n) => self.run_workers(tree, &mut tie_breaker, n)?,
        };

        debug_assert_eq!(tree.root().visits(), self.config.simulations as f64);

        let best = match self.config.final_selection {
            FinalSelection::BestMean => {
                selection::uct_best_child(&tree, NodeId::ROOT, 0.0, &mut tie_breaker)
            }
            FinalSelection::MostVisited => {
                selection::most_visited_child(&tree, NodeId::ROOT, &mut tie_breaker)
            }
        }
        .ok_or(SearchError::NoLegalActions { depth: 0 })?;

        let action = tree
            .get(best)
            .action()
            .cloned()
            .expect("child without causing action");

        log::debug!(
            "search finished: {} nodes, best action {:?} (visits {}, mean {:?})",
            tree.len(),
            action,
            tree.get(best).visits(),
            tree.get(best).mean()
        );

        Ok(SearchOutcome { action, tree })
    }

    fn run_inline<S>(&self, mut tree: Tree<S>, tie_breaker: &mut TieBreaker) -> Result<Tree<S>>
    where
        S: DecisionState,
        P: RolloutPolicy<S>,
    {
        for _ in 0..self.config.simulations {
            let leaf = tree.tree_policy(self.config.exploration, tie_breaker)?;
            let result = rollout(tree.get(leaf).state().clone(), &self.policy)?;
            tree.backpropagate(leaf, result);
        }
        Ok(tree)
    }

    // The calling thread runs the tree policy and feeds leaves to the workers through a bounded
    // channel; workers roll out and backpropagate.  A single lock over the whole tree is held by
    // the tree policy and by every backpropagation.  All workers are joined before the tree is
    // handed back.
    fn run_workers<S>(
        &self,
        tree: Tree<S>,
        tie_breaker: &mut TieBreaker,
        n_workers: usize,
    ) -> Result<Tree<S>>
    where
        S: DecisionState + Send,
        S::Action: Send,
        P: RolloutPolicy<S>,
    {
        let shared = Mutex::new(tree);
        let (tx, rx) = crossbeam_channel::bounded::<(NodeId, S)>(n_workers);

        let result = thread::scope(|scope| {
            let handles = (0..n_workers)
                .map(|_| {
                    let rx = rx.clone();
                    let shared = &shared;
                    let policy = &self.policy;
                    scope.spawn(move || -> Result<usize> {
                        let mut n_done = 0;
                        for (leaf, state) in rx.iter() {
                            let result = rollout(state, policy)?;
                            // poisoned by a panic on another worker
                            let mut tree =
                                shared.lock().map_err(|_| SearchError::WorkerPanicked)?;
                            tree.backpropagate(leaf, result);
                            n_done += 1;
                        }
                        Ok(n_done)
                    })
                })
                .collect::<Vec<_>>();
            drop(rx);

            let mut first_err = None;
            for _ in 0..self.config.simulations {
                let job = {
                    let mut tree = match shared.lock() {
                        Ok(tree) => tree,
                        Err(_) => {
                            first_err = Some(SearchError::WorkerPanicked);
                            break;
                        }
                    };
                    match tree.tree_policy(self.config.exploration, tie_breaker) {
                        Ok(leaf) => (leaf, tree.get(leaf).state().clone()),
                        Err(e) => {
                            first_err = Some(e);
                            break;
                        }
                    }
                };
                // only fails once every worker has quit, in which case the reason is collected
                // when joining below
                if tx.send(job).is_err() {
                    break;
                }
            }
            drop(tx);

            for h in handles {
                match h.join() {
                    Ok(Ok(n_done)) => log::trace!("worker finished {} simulations", n_done),
                    Ok(Err(e)) => {
                        log::warn!("simulation worker failed: {}", e);
                        first_err.get_or_insert(e);
                    }
                    Err(_) => {
                        log::warn!("simulation worker panicked");
                        first_err.get_or_insert(SearchError::WorkerPanicked);
                    }
                }
            }

            match first_err {
                Some(e) => Err(e),
                None => Ok(()),
            }
        });
        result?;

        shared.into_inner().map_err(|_| SearchError::WorkerPanicked)
    }
}
