use anyhow::{Context, Result};
use dossier_extract::{DEFAULT_BASE_URL, DEFAULT_MODEL_PRIORITY, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::ensure_dossier_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub extraction: ExtractionSection,
}

/// Model priority and retry tuning. The API key itself comes only from the
/// GEMINI_API_KEY environment variable, never from this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSection {
    /// Candidate models, highest preference first.
    pub models: Vec<String>,
    /// Attempts per model on transient failures.
    pub attempts_per_model: u32,
    /// Linear backoff step between attempts, in seconds.
    pub backoff_step_secs: u64,
    /// Pause before switching to the next model, in seconds.
    pub model_pause_secs: u64,
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionSection {
                models: DEFAULT_MODEL_PRIORITY.map(String::from).to_vec(),
                attempts_per_model: 3,
                backoff_step_secs: 4,
                model_pause_secs: 1,
                base_url: DEFAULT_BASE_URL.to_string(),
            },
        }
    }
}

impl ExtractionSection {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts_per_model: self.attempts_per_model,
            backoff_step: Duration::from_secs(self.backoff_step_secs),
            model_pause: Duration::from_secs(self.model_pause_secs),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_dossier_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config đã tồn tại: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Đã ghi {}", p.display());
    Ok(())
}
