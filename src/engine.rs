//! Orchestration of one base-versus-head evaluation.
//!
//! Builds both public API tables, diffs them, runs every enabled surface
//! analyzer and folds the combined impacts into a [`Decision`].

use crate::analyzers::cli_surface::matches_cli_paths;
use crate::analyzers::DynAnalyzer;
use crate::config::BumpscopeConfig;
use crate::core::{Decision, Impact, Result};
use crate::decision::decide;
use crate::diff::diff_public_api;
use crate::python::{parse_with_policy, ParsePolicy};
use crate::signature::{extract_from_module, module_name_from_path, PublicApi};
use crate::vcs::{is_under, SourceReader};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, info_span};

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub impacts: Vec<Impact>,
    pub decision: Decision,
}

impl Report {
    pub fn empty() -> Self {
        Self {
            impacts: Vec::new(),
            decision: Decision::none(),
        }
    }

    pub fn from_impacts(impacts: Vec<Impact>) -> Self {
        let decision = decide(&impacts);
        Self { impacts, decision }
    }
}

/// Public API of every Python file under the public roots at `rev`.
///
/// Files are processed in path order. A file that does not parse aborts the
/// build with an error naming it.
pub fn build_api_at_ref(
    reader: &dyn SourceReader,
    rev: &str,
    config: &BumpscopeConfig,
) -> Result<PublicApi> {
    let _span = info_span!("build_api", rev).entered();
    let options = config.extract_options();
    let mut api = PublicApi::new();

    for root in &config.project.public_roots {
        let files =
            reader.list_source_files(rev, std::slice::from_ref(root), config.get_ignore_patterns())?;
        for path in files {
            let Some(source) = reader.read_file_at(rev, &path)? else {
                continue;
            };
            let module_name = module_name_from_path(root, &path)?;
            // Core signatures never tolerate unparsable source.
            let Some(module) = parse_with_policy(&source, &path, ParsePolicy::Strict)? else {
                continue;
            };
            api.extend(extract_from_module(&module_name, &module, &options));
        }
    }

    debug!(rev, symbols = api.len(), "built public api");
    Ok(api)
}

/// Collect and compare each analyzer in turn, concatenating impacts in
/// analyzer order.
pub fn run_analyzers(
    reader: &dyn SourceReader,
    base: &str,
    head: &str,
    analyzers: &[Box<dyn DynAnalyzer>],
) -> Result<Vec<Impact>> {
    let mut impacts = Vec::new();
    for analyzer in analyzers {
        let _span = info_span!("analyzer", name = analyzer.name()).entered();
        let old = analyzer.collect_state(reader, base)?;
        let new = analyzer.collect_state(reader, head)?;
        let found = analyzer.compare_states(&old, &new)?;
        debug!(impacts = found.len(), "analyzer finished");
        impacts.extend(found);
    }
    Ok(impacts)
}

/// Whether any changed path can affect a tracked surface.
pub fn has_relevant_changes(changed: &BTreeSet<String>, config: &BumpscopeConfig) -> bool {
    changed.iter().any(|path| {
        config
            .project
            .public_roots
            .iter()
            .chain(&config.migrations.paths)
            .any(|root| is_under(path, root))
            || matches_cli_paths(path, &config.cli.paths)
            || config
                .openapi
                .paths
                .iter()
                .any(|doc| doc.trim_start_matches("./") == path)
    })
}

/// Full evaluation of `base` against `head`.
///
/// Signature impacts come first, then analyzer impacts. When nothing
/// relevant changed between the two revisions the run is skipped and an
/// empty report is returned.
pub fn evaluate(
    reader: &dyn SourceReader,
    base: &str,
    head: &str,
    config: &BumpscopeConfig,
    analyzers: &[Box<dyn DynAnalyzer>],
) -> Result<Report> {
    let _span = info_span!("evaluate", base, head).entered();

    let changed = reader.changed_paths(base, head)?;
    if !has_relevant_changes(&changed, config) {
        info!(
            changed = changed.len(),
            "no relevant paths changed; skipping evaluation"
        );
        return Ok(Report::empty());
    }

    let old = build_api_at_ref(reader, base, config)?;
    let new = build_api_at_ref(reader, head, config)?;
    let mut impacts = diff_public_api(&old, &new, &config.diff_rules());
    impacts.extend(run_analyzers(reader, base, head, analyzers)?);

    let report = Report::from_impacts(impacts);
    info!(
        level = report.decision.level_label(),
        impacts = report.impacts.len(),
        "evaluation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{load_enabled, AnalyzerRegistry};
    use crate::core::{Error, Severity};
    use crate::vcs::MemorySource;
    use pretty_assertions::assert_eq;

    fn config() -> BumpscopeConfig {
        let mut config = BumpscopeConfig::default();
        config.project.public_roots = vec!["pkg".into()];
        config
    }

    #[test]
    fn test_build_api_uses_module_names() {
        let source = MemorySource::new()
            .with_file("HEAD", "pkg/__init__.py", "def top():\n    pass\n")
            .with_file("HEAD", "pkg/util/io.py", "def read(path):\n    pass\n")
            .with_file("HEAD", "tests/test_io.py", "def test_x():\n    pass\n");
        let api = build_api_at_ref(&source, "HEAD", &config()).unwrap();
        assert_eq!(
            api.keys().collect::<Vec<_>>(),
            vec!["__init__:top", "util.io:read"]
        );
    }

    #[test]
    fn test_parse_failure_names_file() {
        let source = MemorySource::new().with_file("HEAD", "pkg/bad.py", "def f(:\n");
        let err = build_api_at_ref(&source, "HEAD", &config()).unwrap_err();
        assert!(matches!(err, Error::Parse { ref file, .. } if file.ends_with("pkg/bad.py")));
    }

    #[test]
    fn test_core_is_strict_while_analyzers_are_lenient() {
        let source = MemorySource::new().with_file(
            "HEAD",
            "pkg/app.py",
            "@app.get('/items')\ndef items(:\n    pass\n",
        );
        let registry = AnalyzerRegistry::with_builtins().unwrap();
        let analyzers =
            load_enabled(&registry, &config(), &["web_routes".to_string()], &[]).unwrap();

        let state = analyzers[0].collect_state(&source, "HEAD").unwrap();
        assert!(analyzers[0].compare_states(&state, &state).unwrap().is_empty());
        assert!(matches!(
            build_api_at_ref(&source, "HEAD", &config()),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_unrelated_changes_short_circuit() {
        let source = MemorySource::new()
            .with_file("base", "pkg/a.py", "def f():\n    pass\n")
            .with_file("base", "README.md", "old")
            .with_file("head", "pkg/a.py", "def f():\n    pass\n")
            .with_file("head", "README.md", "new");
        let report = evaluate(&source, "base", "head", &config(), &[]).unwrap();
        assert_eq!(report, Report::empty());
    }

    #[test]
    fn test_signature_impacts_precede_analyzer_impacts() {
        let source = MemorySource::new()
            .with_file(
                "base",
                "pkg/app.py",
                "@app.get('/items')\ndef items():\n    pass\n",
            )
            .with_file("head", "pkg/app.py", "def other():\n    pass\n");
        let registry = AnalyzerRegistry::with_builtins().unwrap();
        let analyzers =
            load_enabled(&registry, &config(), &["web_routes".to_string()], &[]).unwrap();
        let report = evaluate(&source, "base", "head", &config(), &analyzers).unwrap();
        assert_eq!(
            report.impacts,
            vec![
                Impact::major("app:items", "Removed public symbol"),
                Impact::minor("app:other", "Added public symbol"),
                Impact::major("GET /items", "Removed route"),
            ]
        );
        assert_eq!(report.decision.level, Some(Severity::Major));
        assert!((report.decision.confidence - 2.0 / 3.0).abs() < 1e-9);
    }
}
