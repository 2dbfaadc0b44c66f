use std::fmt;

use crate::region::RegionId;

/// Where a region stands relative to its target tile count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionState {
    Growing,
    Shrinking,
    Stable,
    /// Unstable with no legal move for the configured grace period.
    Unsatisfiable,
}

impl RegionState {
    #[inline] pub fn is_stable(self) -> bool { self == Self::Stable }
}

/// Outcome of one engine step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// At least one region can still move.
    Active,
    /// Every region owns exactly its target.
    Converged,
    /// Every unstable region is blocked; ids in ascending order.
    Unsatisfiable(Vec<RegionId>),
}

impl Status {
    /// Check if the driver loop should stop.
    #[inline] pub fn is_done(&self) -> bool { !matches!(self, Self::Active) }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Converged => write!(f, "converged"),
            Self::Unsatisfiable(ids) => {
                let ids = ids.iter().map(RegionId::as_str).collect::<Vec<_>>();
                write!(f, "unsatisfiable ({})", ids.join(", "))
            }
        }
    }
}
