//! Explicit, per-call configuration.
//!
//! The original library threads a global `goblinDefaultContext` singleton
//! through every object. That is replaced here with a plain struct the
//! caller builds once and passes by reference to each entry point; nothing
//! under `balanced_flow` keeps mutable state at the crate level.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which balanced-network-search variant to run (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BnsVariant {
    /// Exact breadth-first search with explicit blossom shrinking. O(n·m).
    #[default]
    KocayStone,
    /// Depth-first search that shrinks as soon as a common ancestor is
    /// found on the stack. Falls back to `KocayStone` if the DFS stack
    /// depth guard trips (see the Open Question resolution in DESIGN.md).
    KamedaMunro,
    /// Cheap first pass with no explicit blossom formation, followed by
    /// an exact re-check. Never trusted on its own; see
    /// [`Config::trust_heuristic`].
    HeuristicBreadthFirst,
}

/// Which primal-dual recipe §4.5 should use to recompute modified lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimalDualVariant {
    /// Node-oriented: recomputes `w̃(a)` on demand by walking the nesting
    /// forest. Cheaper memory, slower per iteration.
    #[default]
    PrimalDual0,
    /// Arc-oriented: maintains `w̃(a)` explicitly and shifts it
    /// incrementally. Faster per iteration, O(m) extra memory.
    PrimalDual1,
}

/// Which top-level max-flow recipe `max_balanced_flow` should dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxFlowMethod {
    /// Single-path BNS augmentation, repeated to the max.
    BnsAndAugment,
    /// Micali-Vazirani phased augmentation (§4.4).
    #[default]
    MicaliVazirani,
    /// Capacity-scaling wrapper around BNS.
    BalancedScaling,
    /// Ordinary max-flow, symmetrise, cancel odd cycles (§4.6).
    Anstee,
}

/// A cooperative cancellation token (§5).
///
/// Cloning shares the same underlying flag; a supervising thread calls
/// [`Cancellation::cancel`] and the solver observes it at the next
/// checkpoint (between BFS layers, MV phases, or primal-dual iterations).
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the solver stop at its next checkpoint.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A snapshot of solver progress, delivered to [`Config`]'s optional
/// progress callback. Purely advisory: observing it never alters solver
/// state (§5).
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    /// Number of phases (MV) or iterations (primal-dual) completed so far.
    pub phases_completed: u32,
    /// The balanced flow value accumulated so far.
    pub flow_so_far: i64,
}

/// Per-call solver configuration.
///
/// Constructed with [`Config::default`] and tuned with the `with_*`
/// builder methods; never stored as crate-level mutable state.
pub struct Config {
    pub(crate) bns_variant: BnsVariant,
    pub(crate) primal_dual_variant: PrimalDualVariant,
    pub(crate) max_flow_method: MaxFlowMethod,
    pub(crate) trust_heuristic: bool,
    pub(crate) debug_checks: bool,
    pub(crate) cancellation: Cancellation,
    pub(crate) on_progress: Option<Box<dyn FnMut(Progress)>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bns_variant: BnsVariant::default(),
            primal_dual_variant: PrimalDualVariant::default(),
            max_flow_method: MaxFlowMethod::default(),
            trust_heuristic: false,
            debug_checks: cfg!(debug_assertions),
            cancellation: Cancellation::default(),
            on_progress: None,
        }
    }
}

impl Config {
    /// Selects the unweighted-search variant used by C3/C4.
    pub fn with_bns_variant(mut self, variant: BnsVariant) -> Self {
        self.bns_variant = variant;
        self
    }

    /// Selects the weighted primal-dual recipe used by C5.
    pub fn with_primal_dual_variant(mut self, variant: PrimalDualVariant) -> Self {
        self.primal_dual_variant = variant;
        self
    }

    /// Selects which recipe `max_balanced_flow` dispatches to.
    pub fn with_max_flow_method(mut self, method: MaxFlowMethod) -> Self {
        self.max_flow_method = method;
        self
    }

    /// Allows the heuristic BNS pass (§9 Open Question) to contribute
    /// augmentations without a follow-up exact re-check. Off by default.
    pub fn with_trust_heuristic(mut self, trust: bool) -> Self {
        self.trust_heuristic = trust;
        self
    }

    /// Forces the debug-only invariant checks on or off regardless of the
    /// build profile.
    pub fn with_debug_checks(mut self, enabled: bool) -> Self {
        self.debug_checks = enabled;
        self
    }

    /// Attaches a cooperative cancellation token.
    pub fn with_cancellation(mut self, token: Cancellation) -> Self {
        self.cancellation = token;
        self
    }

    /// Attaches a progress-report callback, polled at phase/iteration
    /// boundaries.
    pub fn with_progress(mut self, callback: impl FnMut(Progress) + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub(crate) fn report(&mut self, phases_completed: u32, flow_so_far: i64) {
        if let Some(callback) = self.on_progress.as_mut() {
            callback(Progress { phases_completed, flow_so_far });
        }
    }

    pub(crate) fn check_cancelled(&self, partial_flow: i64) -> crate::error::SolveResult<()> {
        if self.cancellation.is_cancelled() {
            Err(crate::error::SolveError::Cancelled { partial_flow })
        } else {
            Ok(())
        }
    }
}
