//! The skew-symmetric residual network abstraction (C2, §4.1).
//!
//! This module owns no adjacency storage of its own. It is a thin view,
//! expressed as a trait (`BalancedHost`), over whatever incidence
//! structure the caller already has; everything else in the crate talks
//! to the network only through this trait and the free functions below,
//! never by reaching into a concrete graph type. That mirrors the
//! "view wraps base network" composition the original class hierarchy
//! used inheritance for (§9 design note).

mod host;

pub use host::{HostAdapter, VecHost};

use crate::error::{checked_add, SolveResult};

/// A node index in `0..n`, `n` even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// An arc index in `0..2m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArcId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ArcId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The narrow interface the solver consumes from a host graph (§6).
///
/// Node complementation defaults to the standard `v XOR 1` bijection and
/// arc reversal/complementation to `a XOR 1` / `a XOR 2`, the pairing
/// convention of §3. A host with a non-standard layout may override them,
/// as long as the algebra of §3 ("Arc") still holds.
pub trait BalancedHost {
    /// Number of nodes, always even.
    fn node_count(&self) -> usize;
    /// Number of arcs, always even (`2m`).
    fn arc_count(&self) -> usize;

    /// The tail (source) endpoint of arc `a`.
    fn tail(&self, a: ArcId) -> NodeId;
    /// The head (target) endpoint of arc `a`.
    fn head(&self, a: ArcId) -> NodeId;

    /// Lower capacity bound `ℓ(a) ≥ 0`.
    fn lower(&self, a: ArcId) -> i64;
    /// Upper capacity bound `u(a) ≥ ℓ(a)`.
    fn upper(&self, a: ArcId) -> i64;
    /// Integer length/cost `w(a)`.
    fn length(&self, a: ArcId) -> i64;
    /// Current flow value `f(a) ∈ [ℓ(a), u(a)]`.
    fn flow(&self, a: ArcId) -> i64;
    /// Overwrites the flow value of `a`. Callers outside this module
    /// should prefer [`balanced_push`], which keeps the 4-orbit
    /// consistent; this is the primitive it is built on.
    fn set_flow(&mut self, a: ArcId, value: i64);

    /// The first outgoing arc at `v`, in implementation-defined but
    /// stable order, or `None` if `v` has no outgoing arcs.
    fn first_out(&self, v: NodeId) -> Option<ArcId>;
    /// The next outgoing arc at `v` after `a`, or `None` if `a` was the
    /// last one.
    fn next_out(&self, a: ArcId, v: NodeId) -> Option<ArcId>;

    /// `true` if costs are meaningful; when `false` the driver wraps the
    /// host in a [`HostAdapter`] supplying an all-zero cost function.
    fn has_costs(&self) -> bool {
        true
    }
    /// `true` if any arc has `ℓ(a) > 0`; when `false` the driver can skip
    /// the lower-bound pre-push step.
    fn has_lower_bounds(&self) -> bool {
        true
    }
    /// `true` if the host already satisfies the skew-symmetry invariants
    /// of §3; when `false` the driver wraps the host to double it.
    fn is_already_skew_symmetric(&self) -> bool {
        true
    }

    /// The complementary node `v̄`.
    fn complement_node(&self, v: NodeId) -> NodeId {
        NodeId(v.0 ^ 1)
    }
    /// The reverse arc `a⊕1`.
    fn reverse_arc(&self, a: ArcId) -> ArcId {
        ArcId(a.0 ^ 1)
    }
    /// The complementary arc `a⊕2`.
    fn complement_arc(&self, a: ArcId) -> ArcId {
        ArcId(a.0 ^ 2)
    }
}

/// An iterator over the outgoing arcs at a node, built from
/// [`BalancedHost::first_out`]/[`BalancedHost::next_out`].
pub struct OutArcs<'a, H: ?Sized> {
    host: &'a H,
    node: NodeId,
    current: Option<ArcId>,
}

impl<'a, H: BalancedHost + ?Sized> Iterator for OutArcs<'a, H> {
    type Item = ArcId;

    fn next(&mut self) -> Option<ArcId> {
        let arc = self.current?;
        self.current = self.host.next_out(arc, self.node);
        Some(arc)
    }
}

/// Returns an iterator over the arcs leaving `v`.
pub fn out_arcs<H: BalancedHost + ?Sized>(host: &H, v: NodeId) -> OutArcs<'_, H> {
    OutArcs { host, node: v, current: host.first_out(v) }
}

/// Remaining forward capacity of `a` under the current flow:
/// `r(a) = u(a) − f(a)`.
///
/// The host is expected to maintain the reverse arc's bounds so that this
/// single formula also yields the classical `f(ā) − ℓ(ā)` residual on the
/// reverse direction (the host stores `u(a⊕1) = −ℓ(a)`, `ℓ(a⊕1) = −u(a)`,
/// `f(a⊕1) = −f(a)`, which is exactly the antisymmetry invariant of §3);
/// there is no separate "is this arc forward" branch to maintain.
pub fn residual<H: BalancedHost + ?Sized>(host: &H, a: ArcId) -> i64 {
    host.upper(a) - host.flow(a)
}

/// The balanced residual capacity: the amount by which `a` and its
/// complement can both still absorb flow while remaining balanced.
pub fn balanced_residual<H: BalancedHost + ?Sized>(host: &H, a: ArcId) -> i64 {
    let c = host.complement_arc(a);
    residual(host, a).min(residual(host, c))
}

/// Pushes `delta ≥ 0` units of flow along `a`, keeping the 4-orbit
/// `{a, a⊕1, a⊕2, a⊕3}` balanced and skew-symmetric (§4.1).
///
/// Requires `0 ≤ delta ≤ balanced_residual(host, a)`.
pub fn balanced_push<H: BalancedHost + ?Sized>(
    host: &mut H,
    a: ArcId,
    delta: i64,
) -> SolveResult<()> {
    if delta == 0 {
        return Ok(());
    }
    if delta < 0 || delta > balanced_residual(host, a) {
        return Err(crate::error::SolveError::CapacityExceeded { arc: a });
    }
    let rev = host.reverse_arc(a);
    let comp = host.complement_arc(a);
    let rev_comp = host.complement_arc(rev);

    let new_a = checked_add(host.flow(a), delta)?;
    let new_comp = checked_add(host.flow(comp), delta)?;
    let new_rev = checked_add(host.flow(rev), -delta)?;
    let new_rev_comp = checked_add(host.flow(rev_comp), -delta)?;

    host.set_flow(a, new_a);
    host.set_flow(comp, new_comp);
    host.set_flow(rev, new_rev);
    host.set_flow(rev_comp, new_rev_comp);

    log::trace!(
        "balanced_push: a={a:?} delta={delta} -> f(a)={new_a} f(a^2)={new_comp}"
    );
    Ok(())
}

/// Symmetrises an arbitrary feasible flow produced outside this crate
/// (e.g. by the internal ordinary max-flow helper in [`crate::maxflow`])
/// into a balanced one: every arc pair `(a, a⊕2)` is averaged.
///
/// The averaging can leave a `.5` remainder on arcs whose combined flow
/// is odd; those are recorded in `fractional` so [`crate::reduction`] can
/// later repair them with `cancel_even`/`cancel_odd`. Flow values
/// themselves stay integral (rounded toward `-∞`); the caller must treat
/// any arc flagged in `fractional` as "really" holding an extra half unit.
pub fn symmetrise<H: BalancedHost + ?Sized>(
    host: &mut H,
    fractional: &mut fixedbitset::FixedBitSet,
) {
    fractional.clear();
    fractional.grow(host.arc_count());
    let mut done = fixedbitset::FixedBitSet::with_capacity(host.arc_count());
    for raw in 0..host.arc_count() {
        if done[raw] {
            continue;
        }
        let a = ArcId(raw as u32);
        let c = host.complement_arc(a);
        let sum = host.flow(a) + host.flow(c);
        let half = sum.rem_euclid(2) != 0;
        let averaged = sum.div_euclid(2);
        host.set_flow(a, averaged);
        host.set_flow(c, averaged);
        if half {
            fractional.insert(a.index());
            fractional.insert(c.index());
        }
        done.insert(a.index());
        done.insert(c.index());
    }
    log::debug!("symmetrise: {} fractional arcs remain", fractional.count_ones(..));
}

/// Marks a previously-symmetrised flow as no longer guaranteed balanced
/// (the inverse annotation of [`symmetrise`], §4.1). This crate does not
/// need to track the annotation anywhere beyond the caller's own
/// bookkeeping; the function exists so call sites can document intent at
/// the point a caller mutates a host's flow outside of `balanced_push`.
pub fn relax<H: BalancedHost + ?Sized>(_host: &mut H) {
    log::debug!("relax: flow on this host is no longer assumed balanced");
}
