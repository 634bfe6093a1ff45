use std::fmt;

/// Why no rate could be derived from a counter reading this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GapReason {
    /// First reading ever seen for this key; there is nothing to diff against.
    FirstObservation,
    /// The invocation timestamp did not advance past the stored reference
    /// point (backward clock jump, or a duplicate invocation).
    NonPositiveTimeDelta { dt: f64 },
    /// The counter delta cannot be explained as normal growth or a single
    /// wraparound (device reset, counter reinitialized).
    ImplausibleDelta { delta: f64 },
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapReason::FirstObservation => write!(f, "first observation"),
            GapReason::NonPositiveTimeDelta { dt } => {
                write!(f, "non-positive time delta ({dt}s)")
            }
            GapReason::ImplausibleDelta { delta } => {
                write!(f, "implausible counter delta ({delta})")
            }
        }
    }
}

/// Expected, recoverable signal: this counter has no usable history, skip its
/// rate for the current cycle.
///
/// This is routine on the first cycle after a check is configured and after a
/// device reboot. Callers branch on it and suppress the affected metric; it
/// must never be turned into a monitoring failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("no usable history for counter '{key}': {reason}")]
pub struct InsufficientHistory {
    pub key: String,
    pub reason: GapReason,
}

impl InsufficientHistory {
    pub(crate) fn new(key: &str, reason: GapReason) -> Self {
        Self {
            key: key.to_string(),
            reason,
        }
    }
}
