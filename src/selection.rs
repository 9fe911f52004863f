//! Child selection at a node: UCT scoring with uniform tie-breaking.

use crate::decision_state::DecisionState;
use crate::tie_break::TieBreaker;
use crate::tree::{Node, NodeId, Tree};

/// The UCT score of a child.
///
/// Unvisited children score `+inf` so that every child is tried once before statistics are
/// compared.  Otherwise the score is `q / n + c * sqrt(2 * ln(parent_visits) / n)`; with `c == 0`
/// the exploration term is skipped entirely (pure exploitation).
#[inline]
pub fn uct_score(parent_visits: f64, q: f64, n: f64, c: f64) -> f64 {
    if n == 0.0 {
        f64::INFINITY
    } else if c == 0.0 {
        q / n
    } else {
        q / n + c * (2.0 * parent_visits.ln() / n).sqrt()
    }
}

/// Among the children of `id`, pick the one with the highest UCT score for exploration weight
/// `c`.  Children whose scores are exactly equal are chosen between uniformly at random.  Returns
/// `None` if `id` has no children.
pub(crate) fn uct_best_child<S>(
    tree: &Tree<S>,
    id: NodeId,
    c: f64,
    tie_breaker: &mut TieBreaker,
) -> Option<NodeId>
where
    S: DecisionState,
{
    let node = tree.get(id);
    best_by(tree, node.children(), tie_breaker, |child| {
        uct_score(node.visits(), child.value(), child.visits(), c)
    })
}

/// Among the children of `id`, pick the one visited most often, breaking ties uniformly at
/// random.  Returns `None` if `id` has no children.
pub(crate) fn most_visited_child<S>(
    tree: &Tree<S>,
    id: NodeId,
    tie_breaker: &mut TieBreaker,
) -> Option<NodeId>
where
    S: DecisionState,
{
    best_by(tree, tree.get(id).children(), tie_breaker, |child| {
        child.visits()
    })
}

fn best_by<S, F>(
    tree: &Tree<S>,
    children: &[NodeId],
    tie_breaker: &mut TieBreaker,
    score: F,
) -> Option<NodeId>
where
    S: DecisionState,
    F: Fn(&Node<S>) -> f64,
{
    let mut max_value = f64::NEG_INFINITY;
    let mut best_children = Vec::new();
    for &c in children {
        let v = score(tree.get(c));
        if v > max_value {
            max_value = v;
            best_children.clear();
            best_children.push(c);
        } else if v == max_value {
            best_children.push(c);
        }
    }
    tie_breaker.choose(best_children)
}
