//! Validation with error accumulation for configuration.
//!
//! Every problem is collected before reporting so a user sees all issues in
//! a single run. Messages carry the dotted field path.

use super::BumpscopeConfig;
use crate::core::Severity;

/// Validate a parsed configuration, returning every problem found.
pub fn validate_config(config: &BumpscopeConfig) -> Result<(), Vec<String>> {
    let problems: Vec<String> = [
        validate_rule("rules.return_type_change", config.rules.return_type_change),
        validate_rule(
            "rules.param_annotation_change",
            config.rules.param_annotation_change,
        ),
    ]
    .into_iter()
    .flatten()
    .chain(validate_globs("ignore.paths", &config.ignore.paths))
    .chain(validate_globs("cli.paths", &config.cli.paths))
    .chain(validate_non_empty(
        "project.public_roots",
        &config.project.public_roots,
    ))
    .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn validate_rule(field: &str, severity: Severity) -> Option<String> {
    (!severity.affects_bump()).then(|| {
        format!("{field}: expected one of major, minor, patch (got: {severity})")
    })
}

fn validate_globs(field: &str, patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .filter_map(|pattern| {
            glob::Pattern::new(pattern)
                .err()
                .map(|e| format!("{field}: invalid glob '{pattern}': {e}"))
        })
        .collect()
}

fn validate_non_empty(field: &str, values: &[String]) -> Option<String> {
    values
        .is_empty()
        .then(|| format!("{field}: at least one entry is required"))
}
