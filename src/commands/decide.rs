use crate::analyzers::{self, load_enabled};
use crate::config::load_config;
use crate::engine::{evaluate, Report};
use crate::io::{create_writer, OutputFormat};
use crate::vcs::GitRepository;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DecideConfig {
    pub base: String,
    pub head: String,
    pub format: OutputFormat,
    pub enable_analyzer: Vec<String>,
    pub disable_analyzer: Vec<String>,
    pub repo: PathBuf,
    pub config: PathBuf,
}

/// Evaluate `base..head` in the repository without rendering.
pub fn evaluate_revisions(config: &DecideConfig) -> Result<Report> {
    let settings = load_config(&config.config)
        .with_context(|| format!("Failed to load {}", config.config.display()))?;

    let enabled = load_enabled(
        analyzers::global()?,
        &settings,
        &config.enable_analyzer,
        &config.disable_analyzer,
    )?;

    let repository = GitRepository::open(&config.repo)?;
    let report = evaluate(&repository, &config.base, &config.head, &settings, &enabled)
        .with_context(|| format!("Failed to compare {}..{}", config.base, config.head))?;
    Ok(report)
}

pub fn run_decide(config: DecideConfig) -> Result<()> {
    let report = evaluate_revisions(&config)?;
    let mut writer = create_writer(config.format);
    writer.write_report(&report)?;
    Ok(())
}
