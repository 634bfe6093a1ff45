use crate::average::compute_average;
use crate::width::{WidthPolicy, WIDTH_32BIT, WIDTH_64BIT};
use crate::{compute_rate, compute_rate_with, CounterState, GapReason, OverflowPolicy};
use ratewatch_store::{MemoryValueStore, StoreError, ValueStore};

fn stored_state(store: &MemoryValueStore, key: &str) -> CounterState {
    let doc = store.get(key).unwrap().expect("state should be persisted");
    serde_json::from_value(doc).unwrap()
}

#[test]
fn first_call_signals_insufficient_history() {
    let store = MemoryValueStore::new();
    let err = compute_rate(&store, "if0.rx_bytes", 1000.0, 500.0, OverflowPolicy::Detect)
        .unwrap_err();
    assert_eq!(err.reason, GapReason::FirstObservation);
    assert_eq!(err.key, "if0.rx_bytes");

    // The reading is persisted anyway, as the next call's reference point.
    let state = stored_state(&store, "if0.rx_bytes");
    assert_eq!(state, CounterState { time: 1000.0, value: 500.0 });
}

#[test]
fn steady_counter_yields_exact_rate() {
    let store = MemoryValueStore::new();
    let _ = compute_rate(&store, "k", 1000.0, 500.0, OverflowPolicy::Detect);
    let rate = compute_rate(&store, "k", 1060.0, 1700.0, OverflowPolicy::Detect).unwrap();
    assert_eq!(rate, (1700.0 - 500.0) / 60.0);
}

#[test]
fn idle_counter_yields_zero_rate() {
    let store = MemoryValueStore::new();
    let _ = compute_rate(&store, "k", 1000.0, 500.0, OverflowPolicy::Detect);
    let rate = compute_rate(&store, "k", 1060.0, 500.0, OverflowPolicy::Detect).unwrap();
    assert_eq!(rate, 0.0);
}

#[test]
fn duplicate_invocation_is_skipped() {
    let store = MemoryValueStore::new();
    let _ = compute_rate(&store, "k", 1000.0, 500.0, OverflowPolicy::Detect);
    let err = compute_rate(&store, "k", 1000.0, 500.0, OverflowPolicy::Detect).unwrap_err();
    assert_eq!(err.reason, GapReason::NonPositiveTimeDelta { dt: 0.0 });
    assert_eq!(stored_state(&store, "k"), CounterState { time: 1000.0, value: 500.0 });
}

#[test]
fn backward_clock_skips_but_keeps_latest_reading() {
    let store = MemoryValueStore::new();
    let _ = compute_rate(&store, "k", 1000.0, 500.0, OverflowPolicy::Detect);
    let err = compute_rate(&store, "k", 940.0, 600.0, OverflowPolicy::Detect).unwrap_err();
    assert!(matches!(err.reason, GapReason::NonPositiveTimeDelta { .. }));

    // The newer reading wins, so recovery only costs one more cycle.
    assert_eq!(stored_state(&store, "k"), CounterState { time: 940.0, value: 600.0 });
}

#[test]
fn wraparound_of_32bit_counter_is_corrected() {
    let store = MemoryValueStore::new();
    let _ = compute_rate(&store, "k", 1000.0, WIDTH_32BIT - 10.0, OverflowPolicy::Detect);
    let rate = compute_rate(&store, "k", 1060.0, 5.0, OverflowPolicy::Detect).unwrap();
    // Delta is 15: the counter ran 10 to the wrap point, then 5 past zero.
    assert_eq!(rate, 15.0 / 60.0);
}

#[test]
fn wraparound_width_follows_previous_magnitude() {
    let store = MemoryValueStore::new();
    let prev = WIDTH_32BIT + 100.0;
    let _ = compute_rate(&store, "k", 1000.0, prev, OverflowPolicy::Detect);
    let rate = compute_rate(&store, "k", 1060.0, 50.0, OverflowPolicy::Detect).unwrap();
    assert_eq!(rate, (50.0 + WIDTH_64BIT - prev) / 60.0);
}

#[test]
fn allow_negative_returns_raw_negative_rate() {
    let store = MemoryValueStore::new();
    let _ = compute_rate(&store, "k", 1000.0, 500.0, OverflowPolicy::AllowNegative);
    let rate = compute_rate(&store, "k", 1060.0, 200.0, OverflowPolicy::AllowNegative).unwrap();
    assert_eq!(rate, (200.0 - 500.0) / 60.0);
}

#[test]
fn decrease_beyond_every_width_is_implausible() {
    let store = MemoryValueStore::new();
    let widths = WidthPolicy::new(vec![WIDTH_32BIT]);
    let prev = WIDTH_32BIT + 100.0;
    let _ = compute_rate_with(&store, "k", 1000.0, prev, OverflowPolicy::Detect, &widths);
    let err = compute_rate_with(&store, "k", 1060.0, 50.0, OverflowPolicy::Detect, &widths)
        .unwrap_err();
    assert!(matches!(err.reason, GapReason::ImplausibleDelta { .. }));

    // The bogus reading still becomes the new reference point.
    assert_eq!(stored_state(&store, "k"), CounterState { time: 1060.0, value: 50.0 });
}

#[test]
fn absurd_rate_is_implausible() {
    let store = MemoryValueStore::new();
    let widths = WidthPolicy::new(vec![WIDTH_32BIT]);
    let _ = compute_rate_with(&store, "k", 1000.0, 0.0, OverflowPolicy::Detect, &widths);
    // More than 2 full 32-bit wraps per second cannot be disambiguated.
    let err = compute_rate_with(
        &store,
        "k",
        1001.0,
        3.0 * WIDTH_32BIT,
        OverflowPolicy::Detect,
        &widths,
    )
    .unwrap_err();
    assert!(matches!(err.reason, GapReason::ImplausibleDelta { .. }));
}

#[test]
fn interface_counter_end_to_end() {
    let store = MemoryValueStore::new();
    let key = "if0.rx_bytes";

    let err = compute_rate(&store, key, 1000.0, 500.0, OverflowPolicy::Detect).unwrap_err();
    assert_eq!(err.reason, GapReason::FirstObservation);
    assert_eq!(stored_state(&store, key), CounterState { time: 1000.0, value: 500.0 });

    let rate = compute_rate(&store, key, 1060.0, 1700.0, OverflowPolicy::Detect).unwrap();
    assert_eq!(rate, 20.0);
    assert_eq!(stored_state(&store, key), CounterState { time: 1060.0, value: 1700.0 });

    let rate = compute_rate(&store, key, 1120.0, 100.0, OverflowPolicy::Detect).unwrap();
    assert_eq!(rate, (100.0 + WIDTH_32BIT - 1700.0) / 60.0);
}

#[test]
fn keys_do_not_share_history() {
    let store = MemoryValueStore::new();
    let _ = compute_rate(&store, "if0.rx_bytes", 1000.0, 500.0, OverflowPolicy::Detect);
    let err =
        compute_rate(&store, "if0.tx_bytes", 1060.0, 900.0, OverflowPolicy::Detect).unwrap_err();
    assert_eq!(err.reason, GapReason::FirstObservation);
}

/// A store whose backing storage is gone, for the fail-open path.
struct FailingStore;

impl ValueStore for FailingStore {
    fn get(&self, _key: &str) -> ratewatch_store::Result<Option<serde_json::Value>> {
        Err(StoreError::Io(std::io::Error::other("backing storage gone")))
    }

    fn set(&self, _key: &str, _value: &serde_json::Value) -> ratewatch_store::Result<()> {
        Err(StoreError::Io(std::io::Error::other("backing storage gone")))
    }
}

#[test]
fn store_failure_degrades_to_no_history() {
    let err = compute_rate(&FailingStore, "k", 1000.0, 500.0, OverflowPolicy::Detect)
        .unwrap_err();
    assert_eq!(err.reason, GapReason::FirstObservation);
}

#[test]
fn corrupt_stored_state_degrades_to_no_history() {
    let store = MemoryValueStore::new();
    store.set("k", &serde_json::json!("not a counter state")).unwrap();
    let err = compute_rate(&store, "k", 1000.0, 500.0, OverflowPolicy::Detect).unwrap_err();
    assert_eq!(err.reason, GapReason::FirstObservation);

    // And the entry is healthy again afterwards.
    let rate = compute_rate(&store, "k", 1060.0, 1100.0, OverflowPolicy::Detect).unwrap();
    assert_eq!(rate, 10.0);
}

#[test]
fn width_policy_orders_and_filters_candidates() {
    let policy = WidthPolicy::new(vec![WIDTH_64BIT, -1.0, WIDTH_32BIT, WIDTH_32BIT, f64::NAN]);
    assert_eq!(policy.infer(0.0), Some(WIDTH_32BIT));
    assert_eq!(policy.infer(WIDTH_32BIT - 1.0), Some(WIDTH_32BIT));
    assert_eq!(policy.infer(WIDTH_32BIT), Some(WIDTH_64BIT));
    assert_eq!(policy.plausible_rate_bound(), 2.0 * WIDTH_64BIT);

    let empty = WidthPolicy::new(Vec::new());
    assert_eq!(empty.infer(0.0), None);
}

#[test]
fn average_first_call_returns_raw_value() {
    let store = MemoryValueStore::new();
    assert_eq!(compute_average(&store, "mem", 1000.0, 40.0, 15.0), 40.0);
}

#[test]
fn average_of_constant_signal_is_the_signal() {
    let store = MemoryValueStore::new();
    let mut avg = 0.0;
    for i in 0..10 {
        avg = compute_average(&store, "mem", 1000.0 + 60.0 * i as f64, 40.0, 15.0);
    }
    assert!((avg - 40.0).abs() < 1e-9);
}

#[test]
fn average_moves_toward_new_level() {
    let store = MemoryValueStore::new();
    compute_average(&store, "mem", 0.0, 40.0, 15.0);
    let mut avg = 40.0;
    for i in 1..=5 {
        avg = compute_average(&store, "mem", 60.0 * i as f64, 90.0, 15.0);
    }
    assert!(avg > 40.0 && avg < 90.0);

    // One half-life after the jump, the gap has roughly halved.
    let store = MemoryValueStore::new();
    compute_average(&store, "mem", 0.0, 40.0, 15.0);
    compute_average(&store, "mem", 100.0 * 60.0, 40.0, 15.0);
    let avg = compute_average(&store, "mem", 115.0 * 60.0, 90.0, 15.0);
    assert!((avg - 65.0).abs() < 1.0);
}

#[test]
fn average_ignores_non_advancing_clock() {
    let store = MemoryValueStore::new();
    compute_average(&store, "mem", 1000.0, 40.0, 15.0);
    let avg = compute_average(&store, "mem", 1060.0, 60.0, 15.0);
    let repeated = compute_average(&store, "mem", 1060.0, 99.0, 15.0);
    assert_eq!(repeated, avg);
}

#[test]
fn average_survives_store_failure() {
    assert_eq!(compute_average(&FailingStore, "mem", 1000.0, 40.0, 15.0), 40.0);
}
