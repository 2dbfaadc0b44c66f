use crate::metrics::TargetPolicy;

/// Consecutive blocked steps before a region is reported unsatisfiable.
pub const DEFAULT_GRACE_STEPS: u32 = 30;

/// Cadence at which an interactive driver calls `iterate`.
pub const COMPUTE_FPS: f64 = 60.0;

/// Tuning knobs for the cartogram engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub grace_steps: u32,
    pub policy: TargetPolicy,
    /// Release every component of a split cluster except the largest before moving.
    pub repair_fragments: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { grace_steps: DEFAULT_GRACE_STEPS, policy: TargetPolicy::default(), repair_fragments: true }
    }
}
