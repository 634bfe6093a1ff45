use ratewatch_check::Levels;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    /// Monitored-object identity; every counter history is scoped to it.
    pub scope_id: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    #[serde(default)]
    pub memory: MemoryCheckConfig,
    #[serde(default)]
    pub network: NetworkCheckConfig,
}

#[derive(Debug, Deserialize)]
pub struct MemoryCheckConfig {
    #[serde(default = "default_memory_levels")]
    pub levels: Levels,
    #[serde(default = "default_backlog_minutes")]
    pub backlog_minutes: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct NetworkCheckConfig {
    /// Optional levels on per-second interface error rates.
    pub error_levels: Option<Levels>,
}

impl Default for MemoryCheckConfig {
    fn default() -> Self {
        Self {
            levels: default_memory_levels(),
            backlog_minutes: default_backlog_minutes(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/ratewatch")
}

fn default_check_interval() -> u64 {
    60
}

fn default_memory_levels() -> Levels {
    Levels::new(80.0, 90.0)
}

fn default_backlog_minutes() -> f64 {
    15.0
}

impl AgentConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
