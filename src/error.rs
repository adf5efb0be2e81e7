//! The error taxonomy for the balanced-flow solver.
//!
//! Every failure mode a solver entry point can produce maps to exactly one
//! [`SolveError`] variant. The type intentionally stays a plain enum with a
//! hand-written `Display`/`Error` impl rather than pulling in a derive-macro
//! error crate: the error set is small, closed, and known ahead of time.

use core::fmt;

use crate::network::ArcId;

/// Failure outcome of a top-level solver entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// A node or arc index was out of the range the host reported.
    RangeViolation {
        /// The offending index.
        index: u32,
        /// The exclusive upper bound it should have respected.
        bound: u32,
    },
    /// A balanced push would have exceeded the residual capacity of `arc`.
    ///
    /// This indicates a bug in the search that produced the augmenting
    /// walk, not a problem with the caller's input.
    CapacityExceeded {
        /// The arc whose residual capacity was about to be violated.
        arc: ArcId,
    },
    /// An operation that requires a balanced flow was invoked while the
    /// flow is half-integral or has not been symmetrised.
    NonBalancedState,
    /// No s-t balanced flow exists given the lower-bound constraints.
    Infeasible,
    /// A capacity, flow, potential, or cost exceeded the representable
    /// range of `i64`.
    NumericOverflow,
    /// An internal invariant did not hold.
    ///
    /// Produced whenever [`Config::with_debug_checks`](crate::config::Config::with_debug_checks)
    /// leaves the checkpoint enabled (the default in debug builds, opt-in in
    /// release) and a `debug_invariant!` call in this crate trips; with
    /// checks disabled the same condition is simply never evaluated.
    InternalInconsistency {
        /// A short, stable description of which invariant failed.
        detail: &'static str,
    },
    /// The caller's cancellation token was observed mid-search.
    Cancelled {
        /// The balanced flow value accumulated before cancellation.
        partial_flow: i64,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SolveError::RangeViolation { index, bound } => {
                write!(f, "index {index} out of range, bound is {bound}")
            }
            SolveError::CapacityExceeded { arc } => {
                write!(f, "balanced push would exceed residual capacity of arc {arc:?}")
            }
            SolveError::NonBalancedState => {
                write!(f, "operation requires a balanced (symmetrised) flow")
            }
            SolveError::Infeasible => write!(f, "no feasible balanced flow satisfies the lower bounds"),
            SolveError::NumericOverflow => write!(f, "arithmetic overflow in flow, potential, or cost"),
            SolveError::InternalInconsistency { detail } => {
                write!(f, "internal invariant violated: {detail}")
            }
            SolveError::Cancelled { partial_flow } => {
                write!(f, "search cancelled with partial flow {partial_flow}")
            }
        }
    }
}

impl std::error::Error for SolveError {}

pub(crate) type SolveResult<T> = Result<T, SolveError>;

/// Checked `i64` addition that maps overflow to [`SolveError::NumericOverflow`].
pub(crate) fn checked_add(a: i64, b: i64) -> SolveResult<i64> {
    a.checked_add(b).ok_or(SolveError::NumericOverflow)
}

/// Surfaces an internal invariant failure.
///
/// Gated on `cfg.debug_checks` at runtime rather than a compile-time
/// `cfg(debug_assertions)`, so `Config::with_debug_checks` actually controls
/// whether a violation returns `Err(InternalInconsistency)` or is skipped,
/// in either build profile. `$cfg` must be a `&Config` (or `Config`) in
/// scope at the call site.
macro_rules! debug_invariant {
    ($cfg:expr, $cond:expr, $detail:expr) => {
        if $cfg.debug_checks && !$cond {
            return Err($crate::error::SolveError::InternalInconsistency { detail: $detail });
        }
    };
}

pub(crate) use debug_invariant;
