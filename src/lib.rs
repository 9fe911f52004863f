//! A [Monte Carlo tree search](https://en.wikipedia.org/wiki/Monte_Carlo_tree_search) (MCTS)
//! using the UCT selection rule, with rollouts running concurrently on worker threads.
//!
//! # Features
//!
//! - **_UCT:_** children are selected by their upper confidence bound `q/n + c * sqrt(2 ln(N) /
//! n)`.  Unvisited children always win, so every action is tried before statistics are compared,
//! and every legal action of a node is expanded before the search descends through it.  Ties are
//! broken uniformly at random by a ChaCha20 generator.
//!
//! - **_Concurrent rollouts:_** the calling thread runs the tree policy and hands each selected
//! leaf, together with its own copy of the leaf's state, to a pool of scoped worker threads that
//! play the game out and backpropagate the result.  All workers are joined before the final
//! decision is taken, so the root always reflects exactly the requested number of simulations.
//! See [`Dispatch`].
//!
//! - **_Two player and stochastic games:_** outcomes are reported from the perspective of a fixed
//! reference player and sign-flipped during backpropagation according to who moved.  Hidden or
//! random information is resolved once per rollout via [`DecisionState::randomize_unknowns`].
//!
//! - **_Reproducible when asked:_** with [`Dispatch::Inline`], [`Randomness::Seeded`] and a
//! deterministic rollout policy a search is fully deterministic.
//!
//! # Usage
//!
//! Using this library mainly requires implementing the [`DecisionState`] and [`Action`] traits
//! for a game.  A rollout policy is anything implementing [`RolloutPolicy`], including plain
//! closures; [`UniformRandom`] picks uniformly among the legal actions.  The [`search`] function
//! runs a search with the default [`SearchConfig`]; use [`Mcts`] for anything else.
//!
//! See the provided [implementation][nim_url] of Nim and the code below for a demonstration of
//! the library interface.
//!
//! ```
//! use rollout_mcts::prelude::*;
//!
//! // A die is rolled in secret; guess whether it came up high.
//! #[derive(Clone, Debug)]
//! struct Guess {
//!     die: Option<u8>,
//!     guess: Option<bool>,
//! }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Call {
//!     High,
//!     Low,
//! }
//!
//! impl Action<Guess> for Call {
//!     fn apply_to(&self, mut state: Guess) -> Guess {
//!         state.guess = Some(*self == Call::High);
//!         state
//!     }
//! }
//!
//! impl DecisionState for Guess {
//!     type Action = Call;
//!
//!     fn legal_actions(&self) -> Vec<Call> {
//!         match self.guess {
//!             Some(_) => vec![],
//!             None => vec![Call::High, Call::Low],
//!         }
//!     }
//!
//!     fn randomize_unknowns(&mut self) {
//!         use rand::Rng;
//!         self.die = Some(rand::thread_rng().gen_range(1..=6));
//!     }
//!
//!     fn is_game_ended(&self) -> bool {
//!         self.guess.is_some()
//!     }
//!
//!     fn evaluate_game(&self) -> GameResult {
//!         match (self.guess, self.die) {
//!             (Some(high), Some(d)) if high == (d > 2) => GameResult::Ended(1.0),
//!             (Some(_), Some(_)) => GameResult::Ended(-1.0),
//!             // the guess is made but the die is only read during rollouts
//!             (Some(_), None) => GameResult::Ended(0.0),
//!             (None, _) => GameResult::Ongoing,
//!         }
//!     }
//!
//!     fn next_to_move(&self) -> Perspective {
//!         Perspective::Reference
//!     }
//! }
//!
//! let mcts = Mcts::new(SearchConfig::with_simulations(500), UniformRandom);
//! let outcome = mcts.search_tree(Guess { die: None, guess: None }).unwrap();
//!
//! assert_eq!(outcome.tree.get_root_info().visits, 500.0);
//! for (action, info) in outcome.tree.get_next_move_info() {
//!     println!("{:?}: {:?}", action, info);
//! }
//! ```
//!
//! [nim_url]: ../rollout_mcts_test_nim/index.html

// Helpful references:
// https://www.cs.swarthmore.edu/~mitchell/classes/cs63/f20/reading/mcts.pdf
// http://incompleteideas.net/book/RLbook2018.pdf

#![forbid(unsafe_code)]
#![warn(
    rust_2018_idioms,
    missing_debug_implementations,
    missing_docs,
    rustdoc::broken_intra_doc_links
)]

mod config;
mod decision_state;
mod error;
mod rollout;
mod search;
mod selection;
mod tie_break;
mod tree;

#[doc(inline)]
pub use prelude::*;

pub use error::Result;

#[doc(hidden)]
pub mod prelude {
    pub use crate::config::{
        Dispatch, FinalSelection, Randomness, SearchConfig, DEFAULT_EXPLORATION,
    };
    pub use crate::decision_state::{
        Action, DecisionState, GameResult, Perspective, RolloutPolicy, UniformRandom,
    };
    pub use crate::error::SearchError;
    pub use crate::search::{search, Mcts, SearchOutcome};
    pub use crate::selection::uct_score;
    pub use crate::tree::{Node, NodeId, NodeInfo, Tree};

    #[cfg(feature = "test_internals")]
    pub use crate::tree::test::*;
}
