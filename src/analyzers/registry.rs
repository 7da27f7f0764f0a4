//! Name → constructor registry for surface analyzers.
//!
//! Built-ins are added by [`register_builtin`], an explicit ordered call list
//! run once at start-up. The process-wide copy is installed into a `OnceLock`
//! by [`install`] and is read-only afterwards; nothing registers lazily.

use super::cli_surface::CliAnalyzer;
use super::migrations::MigrationsAnalyzer;
use super::openapi::OpenApiAnalyzer;
use super::web_routes::WebRoutesAnalyzer;
use super::DynAnalyzer;
use crate::config::BumpscopeConfig;
use crate::core::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

pub type AnalyzerConstructor = fn(&BumpscopeConfig) -> Box<dyn DynAnalyzer>;

#[derive(Clone)]
pub struct AnalyzerRegistration {
    pub name: String,
    pub constructor: AnalyzerConstructor,
    pub description: String,
}

impl std::fmt::Debug for AnalyzerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerRegistration")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzerRegistry {
    entries: BTreeMap<String, AnalyzerRegistration>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in analyzers only.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        register_builtin(&mut registry)?;
        Ok(registry)
    }

    /// Register `name`. An existing name is replaced only when `override_existing` is set.
    pub fn register(
        &mut self,
        name: &str,
        constructor: AnalyzerConstructor,
        description: &str,
        override_existing: bool,
    ) -> Result<()> {
        if self.entries.contains_key(name) && !override_existing {
            return Err(Error::DuplicateAnalyzer(name.to_string()));
        }
        tracing::debug!(analyzer = name, override_existing, "registering analyzer");
        self.entries.insert(
            name.to_string(),
            AnalyzerRegistration {
                name: name.to_string(),
                constructor,
                description: description.to_string(),
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&AnalyzerRegistration> {
        self.entries
            .get(name)
            .ok_or_else(|| Error::AnalyzerNotFound(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalyzerRegistration> {
        self.entries.values()
    }
}

/// Register every built-in analyzer, in a fixed order.
pub fn register_builtin(registry: &mut AnalyzerRegistry) -> Result<()> {
    registry.register(
        "cli",
        |config| Box::new(CliAnalyzer::new(config)),
        "Track changes in argparse and click command-line interfaces.",
        false,
    )?;
    registry.register(
        "migrations",
        |config| Box::new(MigrationsAnalyzer::new(config)),
        "Flag schema changes in Alembic migration scripts.",
        false,
    )?;
    registry.register(
        "openapi",
        |config| Box::new(OpenApiAnalyzer::new(config)),
        "Analyze OpenAPI documents for endpoint and schema changes.",
        false,
    )?;
    registry.register(
        "web_routes",
        |config| Box::new(WebRoutesAnalyzer::new(config)),
        "Track changes in Flask and FastAPI routes.",
        false,
    )?;
    Ok(())
}

static REGISTRY: OnceLock<AnalyzerRegistry> = OnceLock::new();

/// Install the process-wide registry. Only the first call succeeds.
pub fn install(registry: AnalyzerRegistry) -> Result<()> {
    REGISTRY.set(registry).map_err(|_| Error::RegistryInstalled)
}

/// The registry installed at start-up. Reading it before [`install`] is an error.
pub fn global() -> Result<&'static AnalyzerRegistry> {
    REGISTRY.get().ok_or(Error::RegistryNotInstalled)
}

/// Instantiate `(configured ∪ enable) − disable`, in sorted name order.
///
/// An unregistered name fails the whole load.
pub fn load_enabled(
    registry: &AnalyzerRegistry,
    config: &BumpscopeConfig,
    enable: &[String],
    disable: &[String],
) -> Result<Vec<Box<dyn DynAnalyzer>>> {
    let disabled: BTreeSet<&str> = disable.iter().map(String::as_str).collect();
    let selected: BTreeSet<String> = config
        .enabled_analyzers()
        .into_iter()
        .chain(enable.iter().cloned())
        .filter(|name| !disabled.contains(name.as_str()))
        .collect();

    selected
        .iter()
        .map(|name| {
            let registration = registry.lookup(name)?;
            tracing::info!(analyzer = %name, "enabling analyzer");
            Ok((registration.constructor)(config))
        })
        .collect()
}
