use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::Severity;
use crate::diff::DiffRules;
use crate::signature::ExtractOptions;

/// Root configuration structure for bumpscope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BumpscopeConfig {
    /// Public roots and visibility rule
    #[serde(default)]
    pub project: ProjectConfig,

    /// Paths excluded from signature extraction
    #[serde(default)]
    pub ignore: IgnoreConfig,

    /// Severity overrides for annotation changes
    #[serde(default)]
    pub rules: RulesConfig,

    /// Surface analyzers switched on or off by name
    #[serde(default)]
    pub analyzers: BTreeMap<String, bool>,

    #[serde(default)]
    pub migrations: MigrationsConfig,

    #[serde(default)]
    pub openapi: OpenApiConfig,

    #[serde(default)]
    pub cli: CliConfig,
}

impl BumpscopeConfig {
    /// Names of analyzers set to `true`, in sorted order.
    pub fn enabled_analyzers(&self) -> Vec<String> {
        self.analyzers
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn diff_rules(&self) -> DiffRules {
        DiffRules {
            return_type_change: self.rules.return_type_change,
            param_annotation_change: self.rules.param_annotation_change,
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            private_prefixes: self.project.private_prefixes.clone(),
        }
    }

    /// Get ignore patterns from configuration
    pub fn get_ignore_patterns(&self) -> &[String] {
        &self.ignore.paths
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default = "default_public_roots")]
    pub public_roots: Vec<String>,

    /// Name prefixes that mark a symbol private
    #[serde(default = "default_private_prefixes")]
    pub private_prefixes: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            public_roots: default_public_roots(),
            private_prefixes: default_private_prefixes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreConfig {
    #[serde(default = "default_ignore_paths")]
    pub paths: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            paths: default_ignore_paths(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    #[serde(default = "default_rule_severity")]
    pub return_type_change: Severity,

    #[serde(default = "default_rule_severity")]
    pub param_annotation_change: Severity,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            return_type_change: default_rule_severity(),
            param_annotation_change: default_rule_severity(),
        }
    }
}

/// Directories holding migration scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsConfig {
    #[serde(default = "default_migration_paths")]
    pub paths: Vec<String>,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            paths: default_migration_paths(),
        }
    }
}

/// OpenAPI documents, YAML or JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OpenApiConfig {
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Globs selecting the files that declare the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub paths: Vec<String>,
}

fn default_public_roots() -> Vec<String> {
    vec![".".to_string()]
}

fn default_private_prefixes() -> Vec<String> {
    vec!["_".to_string()]
}

fn default_ignore_paths() -> Vec<String> {
    ["tests/**", "examples/**", "scripts/**"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_rule_severity() -> Severity {
    Severity::Minor
}

fn default_migration_paths() -> Vec<String> {
    vec!["migrations".to_string()]
}
