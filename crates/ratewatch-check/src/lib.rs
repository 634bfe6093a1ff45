//! Check invocation contract.
//!
//! A check is re-run every monitoring cycle against a fresh [`CheckContext`]
//! carrying the scope's value store and the cycle's timestamp. Counter
//! history lives entirely in the store, so checks themselves stay stateless
//! across invocations and a killed invocation leaves nothing to clean up.
//!
//! When a counter has no usable history yet, the check skips that metric for
//! the cycle; a check whose every metric is rate-derived may legitimately
//! produce no output at all on its first cycle (`Ok(None)`).

pub mod levels;
pub mod memory;
pub mod network;


pub use levels::Levels;

use anyhow::Result;
use ratewatch_common::types::CheckOutput;
use ratewatch_engine::{compute_average, compute_rate, InsufficientHistory, OverflowPolicy};
use ratewatch_store::ValueStore;

/// Per-invocation handle a check computes rates and averages through.
///
/// Built once per cycle from the scope's store handle and the invocation
/// timestamp (epoch seconds). Each counter a check tracks gets its own key,
/// by convention `"<metric-name>.<item-identifier>"`, so one check can follow
/// many interfaces independently.
pub struct CheckContext<'a> {
    store: &'a dyn ValueStore,
    now: f64,
}

impl<'a> CheckContext<'a> {
    pub fn new(store: &'a dyn ValueStore, now: f64) -> Self {
        Self { store, now }
    }

    /// The invocation timestamp, epoch seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Per-second rate of `value` under `key` with wraparound detection, the
    /// right call for monotonic hardware and OS counters.
    ///
    /// # Errors
    ///
    /// [`InsufficientHistory`] when no rate is available this cycle; skip the
    /// metric and carry on.
    pub fn rate(&self, key: &str, value: f64) -> Result<f64, InsufficientHistory> {
        compute_rate(self.store, key, self.now, value, OverflowPolicy::Detect)
    }

    /// Like [`CheckContext::rate`] with an explicit overflow policy, for the
    /// rare value that legitimately decreases.
    pub fn rate_with_policy(
        &self,
        key: &str,
        value: f64,
        policy: OverflowPolicy,
    ) -> Result<f64, InsufficientHistory> {
        compute_rate(self.store, key, self.now, value, policy)
    }

    /// Time-weighted average of a gauge, half-life `backlog_minutes`.
    pub fn average(&self, key: &str, value: f64, backlog_minutes: f64) -> f64 {
        compute_average(self.store, key, self.now, value, backlog_minutes)
    }
}

/// A service check run once per monitoring cycle.
///
/// Implementations are registered in the agent's check loop. The trait
/// requires `Send + Sync` so checks can be driven from a multi-threaded
/// runtime.
pub trait Check: Send + Sync {
    /// Returns the check name (e.g. `"network"`), used for logging and as
    /// the value-store key prefix.
    fn name(&self) -> &str;

    /// Runs the check for the current cycle.
    ///
    /// `Ok(None)` means every metric was suppressed for lack of counter
    /// history; the caller logs it and moves on, it is not a failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying system API call fails.
    fn run(&mut self, ctx: &CheckContext<'_>) -> Result<Option<CheckOutput>>;
}
