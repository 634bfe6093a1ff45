use crate::{Check, CheckContext, Levels};
use anyhow::Result;
use ratewatch_common::types::{CheckOutput, Metric, ServiceState};
use sysinfo::Networks;

const COUNTERS: [(&str, &str); 6] = [
    ("rx_bytes", "B/s"),
    ("tx_bytes", "B/s"),
    ("rx_packets", "pkt/s"),
    ("tx_packets", "pkt/s"),
    ("rx_errors", "err/s"),
    ("tx_errors", "err/s"),
];

/// Per-interface traffic and error rates from the OS interface counters.
///
/// The raw counters are cumulative since boot and wrap at their bit width;
/// each one is fed through the rate engine under the key
/// `net.<interface>.<counter>`. Interfaces whose counters lack history this
/// cycle contribute no metrics, so the very first cycle after configuration
/// typically reports nothing.
pub struct NetworkCheck {
    networks: Networks,
    /// Optional levels on the per-second error rates.
    error_levels: Option<Levels>,
}

impl NetworkCheck {
    pub fn new(error_levels: Option<Levels>) -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            error_levels,
        }
    }
}

impl Check for NetworkCheck {
    fn name(&self) -> &str {
        "network"
    }

    fn run(&mut self, ctx: &CheckContext<'_>) -> Result<Option<CheckOutput>> {
        self.networks.refresh();

        let mut state = ServiceState::Ok;
        let mut metrics = Vec::new();
        let mut summaries = Vec::new();

        for (name, data) in self.networks.iter() {
            let readings = [
                data.total_received(),
                data.total_transmitted(),
                data.total_packets_received(),
                data.total_packets_transmitted(),
                data.total_errors_on_received(),
                data.total_errors_on_transmitted(),
            ];

            let mut rates = [None; COUNTERS.len()];
            for (i, ((counter, unit), reading)) in COUNTERS.iter().zip(readings).enumerate() {
                let key = format!("net.{name}.{counter}");
                match ctx.rate(&key, reading as f64) {
                    Ok(rate) => {
                        rates[i] = Some(rate);
                        metrics.push(Metric::new(format!("{name}.{counter}"), rate, *unit));
                    }
                    Err(e) => {
                        tracing::debug!(key = %key, reason = %e.reason, "Skipping counter this cycle");
                    }
                }
            }

            if let (Some(rx), Some(tx)) = (rates[0], rates[1]) {
                summaries.push(format!("{name}: rx {rx:.1} B/s, tx {tx:.1} B/s"));
            }

            if let Some(levels) = self.error_levels {
                for rate in rates[4..].iter().flatten() {
                    let err_state = levels.classify(*rate);
                    if err_state > state {
                        summaries.push(format!("{name}: {rate:.2} errors/s"));
                        state = err_state;
                    }
                }
            }
        }

        if metrics.is_empty() {
            return Ok(None);
        }
        Ok(Some(CheckOutput {
            state,
            summary: summaries.join("; "),
            metrics,
        }))
    }
}
