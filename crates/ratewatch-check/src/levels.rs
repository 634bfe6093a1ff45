use ratewatch_common::types::ServiceState;
use serde::{Deserialize, Serialize};

/// Warn/crit thresholds on an upper bound.
///
/// # Examples
///
/// ```
/// use ratewatch_check::Levels;
/// use ratewatch_common::types::ServiceState;
///
/// let levels = Levels::new(80.0, 90.0);
/// assert_eq!(levels.classify(75.0), ServiceState::Ok);
/// assert_eq!(levels.classify(80.0), ServiceState::Warn);
/// assert_eq!(levels.classify(95.0), ServiceState::Crit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    pub warn: f64,
    pub crit: f64,
}

impl Levels {
    pub fn new(warn: f64, crit: f64) -> Self {
        Self { warn, crit }
    }

    pub fn classify(&self, value: f64) -> ServiceState {
        if value >= self.crit {
            ServiceState::Crit
        } else if value >= self.warn {
            ServiceState::Warn
        } else {
            ServiceState::Ok
        }
    }
}
