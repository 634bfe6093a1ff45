use ratewatch_store::ValueStore;
use serde::{Deserialize, Serialize};

/// Persisted state of one exponentially weighted moving average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageState {
    /// When this average was first seeded, for warm-up shortening.
    pub start_time: f64,
    pub last_time: f64,
    pub average: f64,
}

/// Exponentially weighted moving average of a gauge, persisted in the value
/// store under `key`.
///
/// `backlog_minutes` is the half-life horizon: a sample `backlog_minutes` in
/// the past contributes half as much as the current one. During warm-up,
/// while less than one full horizon of data exists, the horizon is shortened
/// to the observed lifetime so early output tracks the raw value instead of
/// being dragged toward the seed.
///
/// Unlike rate computation there is always something to return: the first
/// call yields the raw value, and a non-advancing clock yields the stored
/// average unchanged. Store faults degrade to first-call behavior.
pub fn compute_average(
    store: &dyn ValueStore,
    key: &str,
    now: f64,
    value: f64,
    backlog_minutes: f64,
) -> f64 {
    let Some(prev) = load_state(store, key) else {
        save_state(
            store,
            key,
            AverageState {
                start_time: now,
                last_time: now,
                average: value,
            },
        );
        return value;
    };

    let dt = now - prev.last_time;
    if dt <= 0.0 {
        return prev.average;
    }

    let elapsed_minutes = (now - prev.start_time) / 60.0;
    let horizon_minutes = backlog_minutes.min(elapsed_minutes).max(dt / 60.0);
    let weight = 0.5_f64.powf(dt / (horizon_minutes * 60.0));
    let average = weight * prev.average + (1.0 - weight) * value;

    save_state(
        store,
        key,
        AverageState {
            start_time: prev.start_time,
            last_time: now,
            average,
        },
    );
    average
}

fn load_state(store: &dyn ValueStore, key: &str) -> Option<AverageState> {
    let doc = match store.get(key) {
        Ok(doc) => doc?,
        Err(e) => {
            tracing::warn!(key, error = %e, "Value store read failed, reseeding average");
            return None;
        }
    };
    match serde_json::from_value(doc) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(key, error = %e, "Stored average unreadable, reseeding");
            None
        }
    }
}

fn save_state(store: &dyn ValueStore, key: &str, state: AverageState) {
    let Ok(doc) = serde_json::to_value(state) else {
        return;
    };
    if let Err(e) = store.set(key, &doc) {
        tracing::warn!(key, error = %e, "Value store write failed, average state lost");
    }
}
