use crate::{Check, CheckContext, Levels};
use anyhow::Result;
use ratewatch_common::types::{CheckOutput, Metric};
use sysinfo::System;

/// Memory utilization, smoothed before threshold comparison.
///
/// The used-percent gauge is averaged over `backlog_minutes` via the value
/// store, so a short allocation spike between two cycles does not flap the
/// service state. Unlike counter rates, the gauge is always available, so
/// this check emits output on every cycle including the first.
pub struct MemoryCheck {
    system: System,
    levels: Levels,
    backlog_minutes: f64,
}

impl MemoryCheck {
    pub fn new(levels: Levels, backlog_minutes: f64) -> Self {
        Self {
            system: System::new(),
            levels,
            backlog_minutes,
        }
    }
}

impl Check for MemoryCheck {
    fn name(&self) -> &str {
        "memory"
    }

    fn run(&mut self, ctx: &CheckContext<'_>) -> Result<Option<CheckOutput>> {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let used_pct = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        let avg_pct = ctx.average("mem.used_pct", used_pct, self.backlog_minutes);
        let state = self.levels.classify(avg_pct);

        let output = CheckOutput::new(
            state,
            format!(
                "used {used_pct:.1}% ({:.0} min average {avg_pct:.1}%)",
                self.backlog_minutes
            ),
        )
        .with_metric(Metric::new("used_pct", used_pct, "%"))
        .with_metric(Metric::new("used_pct_avg", avg_pct, "%"));

        Ok(Some(output))
    }
}
