//! Commonly used items.
//!
//! ```
//! use balanced_flow::prelude::*;
//! ```

#[doc(no_inline)]
pub use crate::config::{BnsVariant, Config, MaxFlowMethod, PrimalDualVariant};
#[doc(no_inline)]
pub use crate::error::SolveError;
#[doc(no_inline)]
pub use crate::network::{ArcId, BalancedHost, NodeId, VecHost};
#[doc(no_inline)]
pub use crate::reduction::{cancel_even, cancel_odd, max_balanced_flow, min_cost_balanced_flow};
