//! Scratch state shared by the unweighted searches (§4.3 BNS, §4.4 MV).
//!
//! Both searches walk the same kind of labelled BFS/DFS forest over nodes:
//! a level/distance and a predecessor arc to reconstruct the path. Keeping
//! the arrays in one reusable struct avoids reallocating them for every
//! search call, the way the original kept them as long-lived members of
//! its search object rather than locals.

use crate::network::{ArcId, NodeId};

/// Sentinel for "no level assigned yet".
pub const UNREACHED: u32 = u32::MAX;

/// Reusable scratch arrays for one BNS or MV search over a fixed-size
/// network. Call [`SearchState::reset`] between searches instead of
/// rebuilding.
#[derive(Debug, Clone)]
pub struct SearchState {
    /// BFS/DFS level (tenacity for MV) assigned to each node, or
    /// [`UNREACHED`].
    pub level: Vec<u32>,
    /// The arc a node was first reached through, if any.
    pub pred: Vec<Option<ArcId>>,
    /// Nodes temporarily excluded from the search (already matched into a
    /// settled blossom, or blocked via [`crate::nested_family::NestedFamily::block`]).
    pub excluded: fixedbitset::FixedBitSet,
}

impl SearchState {
    /// Allocates scratch state for a network with `n` nodes.
    pub fn new(n: usize) -> Self {
        SearchState {
            level: vec![UNREACHED; n],
            pred: vec![None; n],
            excluded: fixedbitset::FixedBitSet::with_capacity(n),
        }
    }

    /// Clears all labels for reuse on the next search, without
    /// reallocating.
    pub fn reset(&mut self) {
        self.level.iter_mut().for_each(|l| *l = UNREACHED);
        self.pred.iter_mut().for_each(|p| *p = None);
        self.excluded.clear();
    }

    /// `true` if `v` has been assigned a level by the current search.
    pub fn is_reached(&self, v: NodeId) -> bool {
        self.level[v.index()] != UNREACHED
    }

    /// Walks `pred` back from `v` to a root (a node with no predecessor),
    /// returning the arcs traversed in root-to-`v` order. `host` is used
    /// only to find each arc's tail, i.e. where to continue walking from.
    pub fn path_to<H: crate::network::BalancedHost + ?Sized>(&self, host: &H, v: NodeId) -> Vec<ArcId> {
        let mut arcs = Vec::new();
        let mut cur = v;
        while let Some(a) = self.pred[cur.index()] {
            arcs.push(a);
            cur = host.tail(a);
        }
        arcs.reverse();
        arcs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_every_node_unreached() {
        let s = SearchState::new(4);
        for v in 0..4 {
            assert!(!s.is_reached(NodeId(v)));
        }
    }

    #[test]
    fn reset_clears_levels_and_exclusions() {
        let mut s = SearchState::new(2);
        s.level[0] = 3;
        s.excluded.insert(1);
        s.reset();
        assert!(!s.is_reached(NodeId(0)));
        assert!(!s.excluded[1]);
    }
}
