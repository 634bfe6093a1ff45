use serde::{Deserialize, Serialize};

/// Service state of a monitored object, ordered from best to worst.
///
/// The ordering follows the monitoring convention that an unknown result is
/// worse than a warning but better than a confirmed critical, so the worst of
/// several states can be taken with [`Ord::max`].
///
/// # Examples
///
/// ```
/// use ratewatch_common::types::ServiceState;
///
/// let state: ServiceState = "warn".parse().unwrap();
/// assert_eq!(state, ServiceState::Warn);
/// assert_eq!(state.to_string(), "WARN");
/// assert_eq!(ServiceState::Warn.max(ServiceState::Crit), ServiceState::Crit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Ok,
    Warn,
    Unknown,
    Crit,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceState::Ok => write!(f, "OK"),
            ServiceState::Warn => write!(f, "WARN"),
            ServiceState::Unknown => write!(f, "UNKNOWN"),
            ServiceState::Crit => write!(f, "CRIT"),
        }
    }
}

impl std::str::FromStr for ServiceState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ok" => Ok(ServiceState::Ok),
            "warn" | "warning" => Ok(ServiceState::Warn),
            "unknown" => Ok(ServiceState::Unknown),
            "crit" | "critical" => Ok(ServiceState::Crit),
            _ => Err(format!("unknown service state: {s}")),
        }
    }
}

/// A single named measurement emitted by a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    /// Display unit (e.g. `"B/s"`, `"%"`). Empty for dimensionless values.
    #[serde(default)]
    pub unit: String,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// The result of one check invocation: a state, a one-line summary, and the
/// metrics that were actually computed this cycle.
///
/// Metrics whose counters had no usable history are simply absent, so a
/// freshly configured check produces a shorter output on its first cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutput {
    pub state: ServiceState,
    pub summary: String,
    pub metrics: Vec<Metric>,
}

impl CheckOutput {
    pub fn new(state: ServiceState, summary: impl Into<String>) -> Self {
        Self {
            state,
            summary: summary.into(),
            metrics: Vec::new(),
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }
}
