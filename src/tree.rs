use crate::decision_state::{Action, DecisionState};
use crate::error::{Result, SearchError};
use crate::selection;
use crate::tie_break::TieBreaker;

use std::collections::VecDeque;

/// Index of a `Node` within its `Tree`.
///
/// Nodes are never removed during a search, so a `NodeId` stays valid for the lifetime of the
/// `Tree` that handed it out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root is always the first node of the arena.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena (i.e. creation order).
    pub fn index(self) -> usize {
        self.0
    }
}

/// The fundamental type composing a `Tree`.
///
/// A node owns the decision state it represents.  The link to its parent is an index into the
/// arena (never an owning edge) and is only used for walking up during backpropagation.
///
/// Only the statistics (`value`, `visits`, `direct_visits`) and the hand-over of actions from
/// `untried_actions` to `children` change after construction.
#[derive(Debug)]
pub struct Node<S: DecisionState> {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    state: S,
    // legal actions of `state` not yet expanded; popped from the front
    untried_actions: VecDeque<S::Action>,
    action: Option<S::Action>,
    // `evaluate_game` on an immutable state, so it is computed once
    terminal: bool,
    depth: usize,
    q: f64,
    n: f64,
    direct_visits: usize,
}

impl<S: DecisionState> Node<S> {
    fn new(parent: Option<NodeId>, depth: usize, state: S, action: Option<S::Action>) -> Self {
        let untried_actions = state.legal_actions().into_iter().collect();
        let terminal = state.evaluate_game().is_ended();
        Self {
            parent,
            children: Vec::new(),
            state,
            untried_actions,
            action,
            terminal,
            depth,
            q: 0.0,
            n: 0.0,
            direct_visits: 0,
        }
    }

    /// The root has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether the node's state evaluates as ended.  Authoritative for halting the tree policy,
    /// even if the state still reports legal actions.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Whether every legal action has been turned into a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried_actions.is_empty()
    }

    fn pop_first_untried_action(&mut self) -> Option<S::Action> {
        self.untried_actions.pop_front()
    }

    fn add_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    /// `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in order of expansion.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The decision state this node represents.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Legal actions of the node's state that have not been expanded, in enumeration order.
    pub fn untried_actions(&self) -> impl Iterator<Item = &S::Action> + '_ {
        self.untried_actions.iter()
    }

    /// The action that produced this node from its parent (`None` for the root).
    pub fn action(&self) -> Option<&S::Action> {
        self.action.as_ref()
    }

    /// Cumulative backpropagated outcome, from the perspective of the participant to move at the
    /// parent.  Always `0.0` for the root.
    pub fn value(&self) -> f64 {
        self.q
    }

    /// Number of simulations that passed through this node.
    pub fn visits(&self) -> f64 {
        self.n
    }

    /// Average outcome; `None` before the first visit.
    pub fn mean(&self) -> Option<f64> {
        if self.n > 0.0 {
            Some(self.q / self.n)
        } else {
            None
        }
    }

    /// Number of simulations whose rollout started at this node.
    pub fn direct_visits(&self) -> usize {
        self.direct_visits
    }

    /// Distance from the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Summary statistics of the node.
    pub fn get_node_info(&self) -> NodeInfo {
        NodeInfo {
            depth: self.depth,
            visits: self.n,
            value: self.q,
            direct_visits: self.direct_visits,
            n_children: self.children.len(),
            n_untried: self.untried_actions.len(),
            terminal: self.terminal,
        }
    }
}

/// Contains information about a specific `Node`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    /// Distance from the root.
    pub depth: usize,
    /// See [`Node::visits`].
    pub visits: f64,
    /// See [`Node::value`].
    pub value: f64,
    /// See [`Node::direct_visits`].
    pub direct_visits: usize,
    /// Number of expanded children.
    pub n_children: usize,
    /// Number of legal actions not yet expanded.
    pub n_untried: usize,
    /// See [`Node::is_terminal`].
    pub terminal: bool,
}

/// The search tree: an arena of `Node`s with a unique root.
///
/// A `Tree` only lives for the duration of one search (and, if requested, inside the returned
/// [`SearchOutcome`](crate::SearchOutcome) for inspection); it is never reused.
#[derive(Debug)]
pub struct Tree<S: DecisionState> {
    nodes: Vec<Node<S>>,
}

impl<S: DecisionState> Tree<S> {
    /// Construct a new `Tree` holding only the root.
    pub(crate) fn new(root_state: S) -> Self {
        Self {
            nodes: vec![Node::new(None, 0, root_state, None)],
        }
    }

    /// The node of the state the search started from.
    pub fn root(&self) -> &Node<S> {
        self.get(NodeId::ROOT)
    }

    /// Look up a node.
    ///
    /// # Panics
    /// Panics if `id` was not handed out by this tree.
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<S> {
        &mut self.nodes[id.0]
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; the root exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in creation order (parents before their children).
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Returns a `NodeInfo` for the root.
    pub fn get_root_info(&self) -> NodeInfo {
        self.root().get_node_info()
    }

    /// Returns the action and `NodeInfo` of every expanded child of the root, in expansion order.
    pub fn get_next_move_info(&self) -> Vec<(S::Action, NodeInfo)> {
        self.root()
            .children()
            .iter()
            .map(|&c| {
                let child = self.get(c);
                let action = child
                    .action()
                    .cloned()
                    .expect("child without causing action");
                (action, child.get_node_info())
            })
            .collect()
    }

    /// Turn the first untried action of `id` into a new child and return the child.  Returns
    /// `None` if `id` is fully expanded.  Not idempotent: each call consumes one action.
    pub(crate) fn expand(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.get_mut(id);
        let action = parent.pop_first_untried_action()?;
        let depth = parent.depth + 1;
        let state = action.apply_to(parent.state.clone());

        log::trace!("expanding {:?} at depth {}", action, depth);

        let child = Node::new(Some(id), depth, state, Some(action));
        let child_id = NodeId(self.nodes.len());
        self.nodes.push(child);
        self.get_mut(id).add_child(child_id);
        Some(child_id)
    }

    /// Propagate a rollout outcome from `leaf` up to the root.
    ///
    /// Every non-root node on the path accumulates the outcome multiplied by the sign of the
    /// participant to move at its parent, i.e. the participant who chose the action leading to
    /// it; the root only counts the visit.
    pub(crate) fn backpropagate(&mut self, leaf: NodeId, result: f64) {
        self.get_mut(leaf).direct_visits += 1;

        let mut id = leaf;
        while let Some(parent) = self.get(id).parent {
            let sign = self.get(parent).state.next_to_move().sign();
            let node = self.get_mut(id);
            node.q += result * sign;
            node.n += 1.0;
            id = parent;
        }
        self.get_mut(id).n += 1.0;

        log::trace!("backpropagated {} from depth {}", result, self.get(leaf).depth);
    }

    /// Descend from the root to the node the next simulation should start from.
    ///
    /// Expansion takes priority over descent: the first node on the path that still has untried
    /// actions is expanded and the new child returned.  Otherwise the descent continues through
    /// `uct_best_child` with exploration weight `c` until a terminal node is reached.  Fails if a
    /// node has no children to descend into or none of them can be scored.
    pub(crate) fn tree_policy(&mut self, c: f64, tie_breaker: &mut TieBreaker) -> Result<NodeId> {
        let mut id = NodeId::ROOT;
        loop {
            let node = self.get(id);
            if node.is_terminal() {
                return Ok(id);
            }
            if !node.is_fully_expanded() {
                // can't fail, there is at least one untried action
                return Ok(self.expand(id).expect("untried action vanished"));
            }
            if node.children().is_empty() {
                return Err(SearchError::NoLegalActions { depth: node.depth });
            }
            let depth = node.depth;
            id = selection::uct_best_child(self, id, c, tie_breaker)
                .ok_or(SearchError::NoSelectableChild { depth })?;
        }
    }

    #[cfg(test)]
    pub(crate) fn set_stats(&mut self, id: NodeId, q: f64, n: f64) {
        let node = self.get_mut(id);
        node.q = q;
        node.n = n;
    }
}

#[cfg(any(test, feature = "test_internals"))]
pub(crate) mod test {
    use super::*;

    /// Checks the structural and accounting invariants of a finished search tree and returns the
    /// number of nodes:
    ///
    /// - every node's visits equal the visits of its children plus the rollouts started at it
    /// - children actions followed by untried actions reproduce the node's legal actions
    /// - parent links, depths and creation order are consistent
    #[doc(hidden)]
    pub fn check_tree<S>(t: &Tree<S>) -> usize
    where
        S: DecisionState,
    {
        for id in t.ids() {
            let node = t.get(id);

            let child_visits: f64 = node.children().iter().map(|&c| t.get(c).visits()).sum();
            assert_eq!(
                node.visits(),
                child_visits + node.direct_visits() as f64,
                "visit conservation violated at {:?}",
                id
            );

            let mut actions = node
                .children()
                .iter()
                .map(|&c| t.get(c).action().cloned().expect("child without action"))
                .collect::<Vec<_>>();
            actions.extend(node.untried_actions().cloned());
            assert_eq!(
                actions,
                node.state().legal_actions(),
                "children and untried actions do not partition the legal actions at {:?}",
                id
            );

            for &c in node.children() {
                let child = t.get(c);
                assert_eq!(child.parent(), Some(id));
                assert_eq!(child.depth(), node.depth() + 1);
                assert!(c > id, "child created before parent");
            }

            assert_eq!(node.is_root(), id == NodeId::ROOT);
        }
        t.len()
    }
}
