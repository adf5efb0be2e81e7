//! Property-style checks over small randomly generated balanced networks.
//!
//! `env_logger::try_init` is called once so a run with `RUST_LOG=trace`
//! shows the crate's own trace/debug output, the way the teacher wires up
//! its own test binaries.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use balanced_flow::{max_balanced_flow, BalancedHost, Config, NodeId, VecHost};

/// Builds a random balanced network on `pairs` complementary node pairs,
/// with a random arc between two random distinct nodes at each of
/// `arc_attempts` attempts.
fn random_host(rng: &mut StdRng, pairs: usize, arc_attempts: usize) -> VecHost {
    let n = pairs * 2;
    let mut host = VecHost::new(n);
    for _ in 0..arc_attempts {
        let u = rng.gen_range(0..n as u32);
        let v = rng.gen_range(0..n as u32);
        if u == v {
            continue;
        }
        let cap = rng.gen_range(1..6);
        host.add_edge(NodeId(u), NodeId(v), 0, cap, 0);
    }
    host
}

/// *P1, P3.* Over many random networks, skew symmetry and capacity
/// feasibility hold for every arc once `max_balanced_flow` returns.
#[test]
fn skew_symmetry_and_capacity_hold_over_random_networks() {
    let _ = env_logger::try_init();
    let mut rng = StdRng::seed_from_u64(0xBA1A_7CED);

    for trial in 0..40 {
        let mut host = random_host(&mut rng, 4, 6);
        let mut cfg = Config::default();
        let result = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg);
        let Ok(_) = result else {
            // A randomly generated lower-bound conflict is out of scope
            // here (every arc in this generator has lower = 0); any
            // error would indicate a real bug.
            panic!("trial {trial} unexpectedly failed: {result:?}");
        };

        for i in 0..host.arc_count() {
            let a = balanced_flow::ArcId(i as u32);
            let c = host.complement_arc(a);
            assert_eq!(host.flow(a), host.flow(c), "trial {trial} arc {i} broke skew symmetry");
            assert!(
                host.lower(a) <= host.flow(a) && host.flow(a) <= host.upper(a),
                "trial {trial} arc {i} left its bounds"
            );
        }
    }
}

/// *P7.* Integer capacities and lengths always produce a non-negative
/// flow value bounded by the total capacity available, never a
/// fractional bottleneck sneaking through as a negative or absurd value.
#[test]
fn integer_inputs_yield_a_sane_flow_value() {
    let mut rng = StdRng::seed_from_u64(0x5EED_F100);
    for _ in 0..20 {
        let mut host = random_host(&mut rng, 3, 5);
        let total_capacity: i64 = (0..host.arc_count())
            .map(|i| host.upper(balanced_flow::ArcId(i as u32)).max(0))
            .sum();
        let mut cfg = Config::default();
        if let Ok(flow) = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg) {
            assert!(flow >= 0);
            assert!(flow <= total_capacity);
        }
    }
}
