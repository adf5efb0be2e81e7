//! Augmenting-path algorithms for skew-symmetric (balanced) network flows.
//!
//! A balanced network pairs every node `v` with a complement `v̄` and every
//! arc `a` with a reverse `a⊕1` and a complement `a⊕2`, and requires
//! `f(a) = f(a⊕2)` for every arc. This crate finds maximum and
//! minimum-cost balanced flows over networks shaped that way — node
//! matching, T-joins, and several other combinatorial problems reduce to
//! an instance of this model, which is why it is exposed as the shared
//! core rather than bundled into any one of them.
//!
//! Callers bring their own graph storage and implement [`BalancedHost`]
//! over it (or use [`VecHost`] directly); this crate holds no adjacency
//! structure of its own, matching the "trait over owned storage" split
//! its teacher uses between its own traversal traits and its graph types.
//!
//! ```
//! use balanced_flow::{max_balanced_flow, Config, NodeId, VecHost};
//!
//! let mut host = VecHost::new(4);
//! host.add_edge(NodeId(0), NodeId(1), 0, 3, 0);
//! let mut cfg = Config::default();
//! let flow = max_balanced_flow(&mut host, &[NodeId(0)], &mut cfg).unwrap();
//! assert_eq!(flow, 3);
//! ```

#![doc(html_root_url = "https://docs.rs/balanced-flow/0.1.0/")]
#![forbid(unsafe_code)]

#[cfg(not(feature = "std"))]
compile_error!("balanced_flow currently requires the `std` feature");

pub mod bns;
pub mod config;
pub mod error;
mod maxflow;
pub mod mv;
pub mod nested_family;
pub mod network;
pub mod prelude;
pub mod primal_dual;
pub mod reduction;
pub mod search_state;

pub use config::{BnsVariant, Cancellation, Config, MaxFlowMethod, Progress, PrimalDualVariant};
pub use error::SolveError;
pub use network::{ArcId, BalancedHost, HostAdapter, NodeId, VecHost};
pub use reduction::{cancel_even, cancel_odd, max_balanced_flow, min_cost_balanced_flow};

/// The result type every public entry point in this crate returns.
pub type SolveResult<T> = Result<T, SolveError>;
