//! Internal ordinary max-flow helper, used only by the Anstee reduction
//! (§4.6) to find an (unbalanced) feasible flow before symmetrising it.
//!
//! A plain BFS augmenting-path max-flow, grounded on the teacher's own
//! `ford_fulkerson` (Edmonds-Karp: always take the shortest augmenting
//! path in the residual graph). Never exposed outside the crate; it is a
//! building block for [`crate::reduction::anstee`], not a general-purpose
//! max-flow API in its own right.

use std::collections::VecDeque;

use crate::error::{checked_add, SolveResult};
use crate::network::{out_arcs, residual, ArcId, BalancedHost, NodeId};

/// Finds a single shortest augmenting path from `source` to `sink` in the
/// residual network (ignoring skew-symmetry), or `None` if none exists.
fn shortest_augmenting_path<H: BalancedHost + ?Sized>(
    host: &H,
    source: NodeId,
    sink: NodeId,
) -> Option<Vec<ArcId>> {
    let n = host.node_count();
    let mut pred: Vec<Option<ArcId>> = vec![None; n];
    let mut seen = fixedbitset::FixedBitSet::with_capacity(n);
    seen.insert(source.index());
    let mut queue = VecDeque::from([source]);

    while let Some(u) = queue.pop_front() {
        if u == sink {
            let mut path = Vec::new();
            let mut cur = sink;
            while let Some(a) = pred[cur.index()] {
                path.push(a);
                cur = host.tail(a);
            }
            path.reverse();
            return Some(path);
        }
        for a in out_arcs(host, u) {
            if residual(host, a) <= 0 {
                continue;
            }
            let w = host.head(a);
            if seen[w.index()] {
                continue;
            }
            seen.insert(w.index());
            pred[w.index()] = Some(a);
            queue.push_back(w);
        }
    }
    None
}

/// Repeatedly augments along shortest paths until `source` cannot reach
/// `sink` in the residual network. Pushes flow with a plain (non-balanced)
/// update on each of the two arcs in an orbit pair that matter for an
/// ordinary digraph: `a` and its reverse `a⊕1`; the complement pair is
/// left untouched here and is reconciled afterward by
/// [`crate::network::symmetrise`].
pub(crate) fn ordinary_max_flow<H: BalancedHost + ?Sized>(
    host: &mut H,
    source: NodeId,
    sink: NodeId,
) -> SolveResult<i64> {
    let mut total = 0i64;
    while let Some(path) = shortest_augmenting_path(host, source, sink) {
        let bottleneck = path.iter().map(|&a| residual(host, a)).min().unwrap_or(0);
        if bottleneck <= 0 {
            break;
        }
        for &a in &path {
            let rev = host.reverse_arc(a);
            let new_a = checked_add(host.flow(a), bottleneck)?;
            let new_rev = checked_add(host.flow(rev), -bottleneck)?;
            host.set_flow(a, new_a);
            host.set_flow(rev, new_rev);
        }
        total = checked_add(total, bottleneck)?;
        log::trace!("maxflow: augmented {bottleneck} units, total {total}");
    }
    Ok(total)
}
