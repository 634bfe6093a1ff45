mod config;

use anyhow::Result;
use chrono::Utc;
use ratewatch_check::memory::MemoryCheck;
use ratewatch_check::network::NetworkCheck;
use ratewatch_check::{Check, CheckContext};
use ratewatch_store::StoreManager;
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ratewatch=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    let config = config::AgentConfig::load(&config_path)?;
    tracing::info!(scope = %config.scope_id, "ratewatch-agent starting");

    let manager = StoreManager::new(&config.data_dir)?;

    let mut checks: Vec<Box<dyn Check>> = vec![
        Box::new(NetworkCheck::new(config.network.error_levels)),
        Box::new(MemoryCheck::new(
            config.memory.levels,
            config.memory.backlog_minutes,
        )),
    ];

    let mut tick = interval(Duration::from_secs(config.check_interval_secs));

    tracing::info!(
        interval_secs = config.check_interval_secs,
        data_dir = %config.data_dir.display(),
        "Starting check loop"
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {
                // One store acquisition and one context per invocation, so
                // counter history survives this process and any restart.
                let store = match manager.get_store(&config.scope_id) {
                    Ok(store) => store,
                    Err(e) => {
                        tracing::warn!(error = %e, "Value store unavailable, skipping cycle");
                        continue;
                    }
                };
                let now = Utc::now().timestamp_millis() as f64 / 1000.0;
                let ctx = CheckContext::new(&*store, now);

                for check in &mut checks {
                    match check.run(&ctx) {
                        Ok(Some(output)) => {
                            tracing::info!(
                                check = check.name(),
                                state = %output.state,
                                metrics = output.metrics.len(),
                                "{}",
                                output.summary
                            );
                        }
                        Ok(None) => {
                            tracing::debug!(
                                check = check.name(),
                                "No counter history yet, output suppressed"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(check = check.name(), error = %e, "Check failed");
                        }
                    }
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    Ok(())
}
