//! A [`rollout_mcts`](../rollout_mcts/index.html) API demonstration of a simple
//! [Nim](https://en.wikipedia.org/wiki/Nim) variant. See
//! [code](../src/rollout_mcts_test_nim/lib.rs.html#1-999).
//!
//! The game involves two players, a pile of items and a maximum move value.  The players take
//! turns removing between 1 and `max_move` items from the pile.  The player who takes the last
//! item wins.  Outcomes are reported from the perspective of the player who moves first.
//!
//! Under perfect play, the player to move loses exactly when the pile is a multiple of
//! `max_move + 1`, which makes the recommended action easy to check.

// A discussion of Nim strategy: https://webdocs.cs.ualberta.ca/~hayward/355/jem/nim.html

use rollout_mcts::prelude::*;

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[doc(hidden)]
#[derive(Clone, Debug, PartialEq)]
pub struct Nim {
    pub remaining: u32,
    pub max_move: u32,
    pub to_move: Perspective,
}

impl Nim {
    /// A new game in which the reference player moves first.
    pub fn new(remaining: u32, max_move: u32) -> Self {
        Self {
            remaining,
            max_move,
            to_move: Perspective::Reference,
        }
    }

    /// The number of items the player to move should take, if the position is winning.
    pub fn winning_move(&self) -> Option<u32> {
        match self.remaining % (self.max_move + 1) {
            0 => None,
            n => Some(n),
        }
    }
}

#[doc(hidden)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Take(pub u32);

impl Action<Nim> for Take {
    fn apply_to(&self, mut state: Nim) -> Nim {
        state.remaining -= self.0;
        state.to_move = state.to_move.flip();
        state
    }
}

impl DecisionState for Nim {
    type Action = Take;

    fn legal_actions(&self) -> Vec<Take> {
        (1..=self.max_move.min(self.remaining)).map(Take).collect()
    }

    fn is_game_ended(&self) -> bool {
        self.remaining == 0
    }

    fn evaluate_game(&self) -> GameResult {
        match (self.remaining, self.to_move) {
            // whoever moved last took the final item
            (0, Perspective::Opponent) => GameResult::Ended(1.0),
            (0, Perspective::Reference) => GameResult::Ended(-1.0),
            _ => GameResult::Ongoing,
        }
    }

    fn next_to_move(&self) -> Perspective {
        self.to_move
    }
}

/// A rollout policy picking uniformly among the legal actions from a seeded generator shared by
/// all workers.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    #[doc(hidden)]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl<S: DecisionState> RolloutPolicy<S> for SeededRandom {
    fn choose(&self, state: &S) -> S::Action {
        let actions = state.legal_actions();
        actions
            .choose(&mut *self.rng.lock().unwrap())
            .cloned()
            .expect("rollout from a state without legal actions")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn configs(simulations: usize) -> Vec<SearchConfig> {
        vec![
            SearchConfig::deterministic(simulations, 0),
            SearchConfig::with_simulations(simulations).with_dispatch(Dispatch::Workers(4)),
        ]
    }

    #[test_log::test]
    fn test_immediate_win() {
        for config in configs(200) {
            let mcts = Mcts::new(config, SeededRandom::new(0));
            assert_eq!(mcts.search(Nim::new(3, 3)).unwrap(), Take(3));
        }
    }

    #[test_log::test]
    fn test_finds_winning_move() {
        let state = Nim::new(7, 3);
        assert_eq!(state.winning_move(), Some(3));

        for config in configs(5000) {
            for final_selection in &[FinalSelection::BestMean, FinalSelection::MostVisited] {
                let mcts = Mcts::new(
                    config.clone().with_final_selection(*final_selection),
                    SeededRandom::new(1),
                );
                let outcome = mcts.search_tree(state.clone()).unwrap();
                assert_eq!(outcome.action, Take(3), "{:?}", final_selection);

                let info = outcome.tree.get_next_move_info();
                log::debug!("{:?}", info);
                assert_eq!(info.len(), 3);
            }
        }
    }

    #[test_log::test]
    fn test_tree_invariants() {
        for config in configs(1000) {
            let mcts = Mcts::new(config, SeededRandom::new(2));
            let outcome = mcts.search_tree(Nim::new(12, 3)).unwrap();
            let tree = &outcome.tree;

            assert_eq!(tree.get_root_info().visits, 1000.0);
            assert_eq!(tree.get_root_info().direct_visits, 0);
            let n_nodes = rollout_mcts::prelude::check_tree(tree);
            assert_eq!(n_nodes, tree.len());

            for id in tree.ids() {
                let node = tree.get(id);
                assert!(node.depth() as u32 + node.state().remaining <= 12);
                if let Some(mean) = node.mean() {
                    assert!((-1.0..=1.0).contains(&mean));
                }
            }
        }
    }

    #[test]
    fn test_trivial_game() {
        // one item left: the only legal action must be returned for any simulation count
        for n in &[1, 2, 10] {
            for config in configs(*n) {
                let mcts = Mcts::new(config, SeededRandom::new(3));
                assert_eq!(mcts.search(Nim::new(1, 3)).unwrap(), Take(1));
            }
        }
    }

    #[test]
    fn test_ended_game() {
        assert!(matches!(
            search(Nim::new(0, 3), UniformRandom, 10),
            Err(SearchError::TerminalRoot)
        ));
    }

    #[test]
    fn test_search_entry_point() {
        let action = search(Nim::new(5, 3), SeededRandom::new(4), 2000).unwrap();
        assert_eq!(action, Take(1));
    }

    // The reference player calls a coin that is only flipped once the call is made.  Both calls
    // are equally good, so neither should be preferred over many searches.
    #[derive(Clone, Debug)]
    struct CoinCall {
        call: Option<bool>,
        coin: Option<bool>,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Call(bool);

    impl Action<CoinCall> for Call {
        fn apply_to(&self, mut state: CoinCall) -> CoinCall {
            state.call = Some(self.0);
            state
        }
    }

    impl DecisionState for CoinCall {
        type Action = Call;

        fn legal_actions(&self) -> Vec<Call> {
            match self.call {
                Some(_) => vec![],
                None => vec![Call(true), Call(false)],
            }
        }

        fn randomize_unknowns(&mut self) {
            self.coin = Some(rand::random());
        }

        fn is_game_ended(&self) -> bool {
            self.call.is_some()
        }

        fn evaluate_game(&self) -> GameResult {
            match (self.call, self.coin) {
                (Some(call), Some(coin)) if call == coin => GameResult::Ended(1.0),
                (Some(_), Some(_)) => GameResult::Ended(-1.0),
                // called, coin still in the air
                (Some(_), None) => GameResult::Ended(0.0),
                (None, _) => GameResult::Ongoing,
            }
        }

        fn next_to_move(&self) -> Perspective {
            Perspective::Reference
        }
    }

    #[test]
    fn test_symmetric_game() {
        const TRIALS: usize = 400;

        let state = CoinCall {
            call: None,
            coin: None,
        };
        let config = SearchConfig::with_simulations(50).with_dispatch(Dispatch::Inline);
        let mcts = Mcts::new(config, UniformRandom);

        let heads = (0..TRIALS)
            .filter(|_| mcts.search(state.clone()).unwrap() == Call(true))
            .count();
        assert!((140..=260).contains(&heads), "heads called {} times", heads);
    }

    // The reference player picks a side, then the opponent replies.  Both sides lead to identical
    // subtrees in which the first reply wins for the reference player and the second loses.
    #[derive(Clone, Debug)]
    struct Mirror {
        moves: Vec<u8>,
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Choice(u8);

    impl Action<Mirror> for Choice {
        fn apply_to(&self, mut state: Mirror) -> Mirror {
            state.moves.push(self.0);
            state
        }
    }

    impl DecisionState for Mirror {
        type Action = Choice;

        fn legal_actions(&self) -> Vec<Choice> {
            if self.is_game_ended() {
                vec![]
            } else {
                vec![Choice(0), Choice(1)]
            }
        }

        fn is_game_ended(&self) -> bool {
            self.moves.len() == 2
        }

        fn evaluate_game(&self) -> GameResult {
            match self.moves.as_slice() {
                [_, 0] => GameResult::Ended(1.0),
                [_, _] => GameResult::Ended(-1.0),
                _ => GameResult::Ongoing,
            }
        }

        fn next_to_move(&self) -> Perspective {
            match self.moves.len() {
                1 => Perspective::Opponent,
                _ => Perspective::Reference,
            }
        }
    }

    #[test]
    fn test_mirrored_zero_sum_game() {
        const TRIALS: usize = 400;

        let config = SearchConfig::with_simulations(30).with_dispatch(Dispatch::Inline);
        let mcts = Mcts::new(config, UniformRandom);

        let mut first = 0;
        for _ in 0..TRIALS {
            let outcome = mcts.search_tree(Mirror { moves: vec![] }).unwrap();
            if outcome.action == Choice(0) {
                first += 1;
            }
            // the opponent learns to refute either side
            for (_, info) in outcome.tree.get_next_move_info() {
                assert!(info.value / info.visits < 0.5, "{:?}", info);
            }
        }
        assert!((140..=260).contains(&first), "first side chosen {} times", first);
    }

    #[test]
    fn test_exhaustion_before_descent() {
        // with as many simulations as root actions, every action is tried exactly once
        let mcts = Mcts::new(SearchConfig::deterministic(5, 0), SeededRandom::new(5));
        let outcome = mcts.search_tree(Nim::new(20, 5)).unwrap();
        let info = outcome.tree.get_next_move_info();

        assert_eq!(
            info.iter().map(|(a, _)| *a).collect::<Vec<_>>(),
            (1..=5).map(Take).collect::<Vec<_>>()
        );
        assert!(info.iter().all(|(_, i)| i.visits == 1.0 && i.n_children == 0));
    }

    fn arb_dispatch() -> impl Strategy<Value = Dispatch> {
        prop_oneof![Just(Dispatch::Inline), (1usize..5).prop_map(Dispatch::Workers)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_search_invariants(
            remaining in 1u32..16,
            max_move in 1u32..5,
            simulations in 1usize..300,
            dispatch in arb_dispatch(),
            seed in any::<u64>(),
        ) {
            let state = Nim::new(remaining, max_move);
            let config = SearchConfig::with_simulations(simulations)
                .with_dispatch(dispatch)
                .with_randomness(Randomness::Seeded(seed));
            let mcts = Mcts::new(config, SeededRandom::new(seed));
            let outcome = mcts.search_tree(state.clone()).unwrap();

            prop_assert!(state.legal_actions().contains(&outcome.action));
            prop_assert_eq!(outcome.tree.get_root_info().visits, simulations as f64);
            check_tree(&outcome.tree);

            // the chosen child has the best mean among the visited children
            let best = outcome
                .tree
                .get_next_move_info()
                .into_iter()
                .filter(|(_, i)| i.visits > 0.0)
                .map(|(_, i)| i.value / i.visits)
                .fold(f64::NEG_INFINITY, f64::max);
            let chosen = outcome
                .tree
                .get_next_move_info()
                .into_iter()
                .find(|(a, _)| *a == outcome.action)
                .map(|(_, i)| i.value / i.visits)
                .unwrap();
            prop_assert_eq!(chosen, best);
        }
    }
}
