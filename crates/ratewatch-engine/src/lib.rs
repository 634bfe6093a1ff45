//! Rate computation for monotonically increasing counters.
//!
//! Checks run as short-lived invocations, so turning a raw counter reading
//! into a per-second rate means diffing against the reading persisted by the
//! *previous* invocation. [`compute_rate`] owns that diff and every way it
//! can go wrong: missing history, clocks that did not advance, counters that
//! wrapped at their bit width, and readings too bogus to interpret. All of
//! those surface as the typed [`InsufficientHistory`] signal; none of them
//! panic or escape as a numeric fault.
//!
//! [`average::compute_average`] provides time-weighted smoothing of gauges
//! over the same value store.

pub mod average;
pub mod error;
pub mod width;

#[cfg(test)]
mod tests;

pub use average::compute_average;
pub use error::{GapReason, InsufficientHistory};
pub use width::WidthPolicy;

use ratewatch_store::ValueStore;
use serde::{Deserialize, Serialize};

/// The reference point persisted per counter key: the invocation timestamp
/// (epoch seconds, as reported by the invocation) and the raw reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterState {
    pub time: f64,
    pub value: f64,
}

/// How to interpret a counter that decreased between two readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Reinterpret the decrease as a wraparound of a fixed-width counter at
    /// a width inferred from the previous reading. The right choice for
    /// byte, packet, error and tick counters.
    #[default]
    Detect,
    /// Return the raw negative rate. For values that legitimately decrease
    /// and were fed through the rate engine anyway.
    AllowNegative,
}

/// Computes the per-second rate of `key` since the previous invocation, with
/// the default wraparound width heuristic. See [`compute_rate_with`].
pub fn compute_rate(
    store: &dyn ValueStore,
    key: &str,
    now: f64,
    value: f64,
    policy: OverflowPolicy,
) -> Result<f64, InsufficientHistory> {
    compute_rate_with(store, key, now, value, policy, &WidthPolicy::default())
}

/// Computes the per-second rate of `key` since the previous invocation.
///
/// The new `(now, value)` reference point is persisted unconditionally,
/// whether or not a rate comes out, so the next invocation always diffs
/// against this one. Store faults on either side degrade to the
/// no-history path instead of propagating; losing one cycle of output is
/// recoverable, failing the check is not.
///
/// # Errors
///
/// [`InsufficientHistory`] on the first observation of a key, when the
/// timestamp did not advance (`dt <= 0`), and when the delta cannot be
/// explained under `policy` (see [`GapReason`]).
pub fn compute_rate_with(
    store: &dyn ValueStore,
    key: &str,
    now: f64,
    value: f64,
    policy: OverflowPolicy,
    widths: &WidthPolicy,
) -> Result<f64, InsufficientHistory> {
    let prev = load_state(store, key);
    save_state(store, key, CounterState { time: now, value });

    let Some(prev) = prev else {
        return Err(InsufficientHistory::new(key, GapReason::FirstObservation));
    };

    let dt = now - prev.time;
    if dt <= 0.0 {
        return Err(InsufficientHistory::new(
            key,
            GapReason::NonPositiveTimeDelta { dt },
        ));
    }

    let mut dv = value - prev.value;
    if dv < 0.0 && policy == OverflowPolicy::Detect {
        let Some(width) = widths.infer(prev.value) else {
            return Err(InsufficientHistory::new(
                key,
                GapReason::ImplausibleDelta { delta: dv },
            ));
        };
        dv = value + width - prev.value;
        if dv < 0.0 {
            // Still negative after assuming a wrap: the reading predates
            // even the wrapped counter's origin. Give up for this cycle.
            return Err(InsufficientHistory::new(
                key,
                GapReason::ImplausibleDelta { delta: dv },
            ));
        }
    }

    let rate = dv / dt;
    if policy == OverflowPolicy::Detect && rate.abs() > widths.plausible_rate_bound() {
        return Err(InsufficientHistory::new(
            key,
            GapReason::ImplausibleDelta { delta: dv },
        ));
    }
    Ok(rate)
}

fn load_state(store: &dyn ValueStore, key: &str) -> Option<CounterState> {
    let doc = match store.get(key) {
        Ok(doc) => doc?,
        Err(e) => {
            // Fail open: an unreadable store means "no history", so one
            // storage hiccup costs a cycle of output, not the check.
            tracing::warn!(key, error = %e, "Value store read failed, treating as no history");
            return None;
        }
    };
    match serde_json::from_value(doc) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(key, error = %e, "Stored counter state unreadable, treating as no history");
            None
        }
    }
}

fn save_state(store: &dyn ValueStore, key: &str, state: CounterState) {
    let Ok(doc) = serde_json::to_value(state) else {
        return;
    };
    if let Err(e) = store.set(key, &doc) {
        tracing::warn!(key, error = %e, "Value store write failed, reference point lost");
    }
}
