//! End-to-end scenarios exercising the public solver entry points.
//!
//! Built entirely on [`VecHost`], the crate's own reference host, the way
//! the teacher exercises its algorithms against its own `Graph` type
//! rather than a mock.

use balanced_flow::{
    cancel_even, cancel_odd, max_balanced_flow, min_cost_balanced_flow, network, BalancedHost,
    Cancellation, Config, MaxFlowMethod, NodeId, SolveError, VecHost,
};

/// *B1.* An empty two-node network has zero max flow.
#[test]
fn empty_network_has_zero_flow() {
    let mut host = VecHost::new(2);
    let mut cfg = Config::default();
    let flow = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();
    assert_eq!(flow, 0);
}

/// *B2, reinterpreted.* An arc running directly from `s` to `s̄` also
/// carries its own complement arc between the same two nodes (since
/// `complement(s̄) = s` when there are only two nodes). A single
/// augmenting path saturates both at once: the value this crate reports
/// is the augmenting-path bottleneck, `u(a)`, while the raw flow leaving
/// node 0 (the sum over both of its out-arcs) is `2·u(a)` — the two
/// conventions this crate and §8's literal wording use for "how much flow
/// crossed" diverge exactly on this construction, decided in DESIGN.md in
/// favour of the path-bottleneck convention used everywhere else.
#[test]
fn direct_edge_to_complement_saturates_both_parallel_arcs() {
    let mut host = VecHost::new(2);
    host.add_edge(NodeId(0), NodeId(1), 0, 4, 0);
    let mut cfg = Config::default().with_max_flow_method(MaxFlowMethod::BnsAndAugment);
    let value = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();
    assert_eq!(value, 4);

    let out_flow: i64 = (0..host.arc_count())
        .map(|i| balanced_flow::ArcId(i as u32))
        .filter(|&a| host.tail(a) == NodeId(0))
        .map(|a| host.flow(a))
        .sum();
    assert_eq!(out_flow, 8);
}

/// A lower-bound-forced arc between two nodes that are neither the
/// declared source nor its complement leaves unrecoverable excess behind
/// once nothing else in the network can reabsorb it.
#[test]
fn isolated_forced_lower_bound_is_infeasible() {
    let mut host = VecHost::new(6);
    host.add_edge(NodeId(2), NodeId(4), 1, 1, 0);
    let mut cfg = Config::default();
    let err = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap_err();
    assert_eq!(err, SolveError::Infeasible);
}

/// A simple two-hop chain from `s` to `s̄`: the bottleneck is the
/// narrower of the two arcs.
#[test]
fn chain_network_max_flow_matches_bottleneck() {
    let mut host = VecHost::new(6);
    host.add_edge(NodeId(0), NodeId(4), 0, 5, 0);
    host.add_edge(NodeId(4), NodeId(1), 0, 3, 0);
    let mut cfg = Config::default();
    let flow = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();
    assert_eq!(flow, 3);
}

/// Given a direct edge and a cheaper two-hop detour to the same target,
/// the weighted search exhausts the cheap detour before falling back to
/// the expensive direct edge.
#[test]
fn cheaper_path_is_preferred_for_min_cost() {
    // Node 1 is complement(0), the direct target. The first phase takes
    // the weight-1 detour through node 2 (cost 2); the second phase is
    // left with only the weight-5 direct edge (cost 5), for a combined
    // flow of 2 at cost 7.
    let mut host = VecHost::new(4);
    host.add_edge(NodeId(0), NodeId(1), 0, 1, 5);
    host.add_edge(NodeId(0), NodeId(2), 0, 1, 1);
    host.add_edge(NodeId(2), NodeId(1), 0, 1, 1);
    let mut cfg = Config::default();
    let (flow, cost) = min_cost_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();
    assert_eq!(flow, 2);
    assert_eq!(cost, 7);
}

/// All arcs weighing zero: the weighted search still finds the full max
/// flow value, and reports it at zero cost regardless of how many
/// augmenting rounds that takes.
#[test]
fn min_cost_balanced_flow_is_zero_cost_when_every_arc_has_zero_weight() {
    let mut host = VecHost::new(4);
    host.add_edge(NodeId(0), NodeId(1), 0, 2, 0);
    host.add_edge(NodeId(0), NodeId(2), 0, 1, 0);
    host.add_edge(NodeId(2), NodeId(1), 0, 1, 0);
    let mut cfg = Config::default();
    let (flow, cost) = min_cost_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();
    assert_eq!(flow, 3);
    assert_eq!(cost, 0);
}

/// An asymmetric flow with an odd-length fractional cycle: `symmetrise`
/// halves it down to zero everywhere and flags the whole cycle, and
/// `cancel_odd` repairs it by routing one whole unit along the first arc
/// of the cycle and clearing every flag it touched. `cancel_even` takes
/// no action here since both cycles this flow produces are odd.
#[test]
fn odd_cycle_is_repaired_by_symmetrise_and_cancel_odd() {
    let mut host = VecHost::new(6);
    // A 3-cycle across three complement pairs: 0 -> 2 -> 4 -> 0.
    let e0 = host.add_edge(NodeId(0), NodeId(2), 0, 1, 0);
    let e1 = host.add_edge(NodeId(2), NodeId(4), 0, 1, 0);
    let e2 = host.add_edge(NodeId(4), NodeId(0), 0, 1, 0);

    // Seed a flow that saturates the forward cycle only, as an ordinary
    // (non-balanced) max-flow search would, without touching the
    // complement arcs `symmetrise` expects to average against.
    host.set_flow(e0, 1);
    host.set_flow(e1, 1);
    host.set_flow(e2, 1);

    let mut fractional = fixedbitset::FixedBitSet::with_capacity(host.arc_count());
    network::symmetrise(&mut host, &mut fractional);
    // Averaging 1 against an untouched complement of 0 rounds down to 0
    // and leaves every arc in the cycle flagged half-integral.
    assert_eq!(fractional.count_ones(..), 6);
    for a in [e0, e1, e2] {
        assert_eq!(host.flow(a), 0);
    }

    cancel_even(&mut host, &mut fractional).unwrap();
    cancel_odd(&mut host, &mut fractional).unwrap();
    assert_eq!(fractional.count_ones(..), 0);

    for i in 0..host.arc_count() {
        let a = balanced_flow::ArcId(i as u32);
        let c = host.complement_arc(a);
        assert_eq!(host.flow(a), host.flow(c), "arc {i} broke skew symmetry");
    }
}

/// *P1.* After a solver entry point returns, every arc's flow equals its
/// complement's flow.
#[test]
fn skew_symmetry_holds_after_solving() {
    let mut host = VecHost::new(6);
    host.add_edge(NodeId(0), NodeId(4), 0, 5, 0);
    host.add_edge(NodeId(4), NodeId(1), 0, 3, 0);
    let mut cfg = Config::default();
    max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();

    for i in 0..host.arc_count() {
        let a = balanced_flow::ArcId(i as u32);
        let c = host.complement_arc(a);
        assert_eq!(host.flow(a), host.flow(c), "arc {i} broke skew symmetry");
    }
}

/// *P3.* Every arc's flow stays within its bounds after solving.
#[test]
fn capacity_bounds_hold_after_solving() {
    let mut host = VecHost::new(6);
    host.add_edge(NodeId(0), NodeId(4), 0, 5, 0);
    host.add_edge(NodeId(4), NodeId(1), 0, 3, 0);
    let mut cfg = Config::default();
    max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();

    for i in 0..host.arc_count() {
        let a = balanced_flow::ArcId(i as u32);
        assert!(host.lower(a) <= host.flow(a) && host.flow(a) <= host.upper(a));
    }
}

/// A cancellation token observed before the first search checkpoint stops
/// the solver immediately and reports the flow accumulated so far (zero).
#[test]
fn cancellation_token_stops_before_any_augmentation() {
    let mut host = VecHost::new(6);
    host.add_edge(NodeId(0), NodeId(4), 0, 5, 0);
    host.add_edge(NodeId(4), NodeId(1), 0, 3, 0);
    let token = Cancellation::new();
    token.cancel();
    let mut cfg = Config::default().with_cancellation(token);
    let err = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap_err();
    assert_eq!(err, SolveError::Cancelled { partial_flow: 0 });
}

/// *R1.* Running `max_balanced_flow` again after it already found the max
/// performs no further augmentation.
#[test]
fn running_max_flow_twice_is_idempotent() {
    let mut host = VecHost::new(6);
    host.add_edge(NodeId(0), NodeId(4), 0, 5, 0);
    host.add_edge(NodeId(4), NodeId(1), 0, 3, 0);
    let mut cfg = Config::default();
    let first = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();
    let second = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();
    assert_eq!(first, 3);
    assert_eq!(second, 0);
}

/// The Anstee recipe (ordinary max flow, symmetrise, cancel) runs to
/// completion on a simple chain without error.
#[test]
fn anstee_recipe_runs_to_completion() {
    let mut host = VecHost::new(6);
    host.add_edge(NodeId(0), NodeId(4), 0, 5, 0);
    host.add_edge(NodeId(4), NodeId(1), 0, 3, 0);
    let mut cfg = Config::default().with_max_flow_method(MaxFlowMethod::Anstee);
    let flow = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();
    assert!(flow >= 0);
}
