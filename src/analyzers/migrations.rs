//! Alembic migration scripts as a contract surface.
//!
//! Operations are read from the `upgrade()` function of every script under
//! the configured migration directories. Scripts are best-effort signals: one
//! that fails to parse contributes no operations instead of failing the run.

use super::SurfaceAnalyzer;
use crate::config::BumpscopeConfig;
use crate::core::{Impact, Result, Severity};
use crate::python::literals::bool_value;
use crate::python::{
    callee_attribute, canonical_text, node_text, parse_with_policy, statements, walk_tree,
    CallParts, Definition, ParsePolicy,
};
use crate::vcs::{is_under, SourceReader};
use serde::Serialize;
use std::collections::BTreeMap;
use tree_sitter::Node;

/// One schema-changing call found in an upgrade function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationOp {
    pub severity: Severity,
    pub reason: &'static str,
    /// Canonical argument text; distinguishes otherwise equal operations.
    pub detail: String,
}

/// Script path → operations in source order.
pub type MigrationState = BTreeMap<String, Vec<MigrationOp>>;

pub struct MigrationsAnalyzer {
    dirs: Vec<String>,
}

impl MigrationsAnalyzer {
    pub fn new(config: &BumpscopeConfig) -> Self {
        Self {
            dirs: config.migrations.paths.clone(),
        }
    }
}

impl SurfaceAnalyzer for MigrationsAnalyzer {
    type State = MigrationState;

    fn name(&self) -> &str {
        "migrations"
    }

    fn collect(&self, reader: &dyn SourceReader, rev: &str) -> Result<MigrationState> {
        let mut state = MigrationState::new();
        let scripts = reader.list_files(rev)?.into_iter().filter(|path| {
            path.ends_with(".py") && self.dirs.iter().any(|dir| is_under(path, dir))
        });
        for path in scripts {
            let Some(source) = reader.read_file_at(rev, &path)? else {
                continue;
            };
            let ops = analyze_script(&source, &path)?;
            state.insert(path, ops);
        }
        tracing::debug!(rev, scripts = state.len(), "collected migration scripts");
        Ok(state)
    }

    fn compare(&self, old: &MigrationState, new: &MigrationState) -> Vec<Impact> {
        diff_migrations(old, new)
    }
}

/// Operations in the script's `upgrade()`; empty when it does not parse.
pub fn analyze_script(source: &str, path: &str) -> Result<Vec<MigrationOp>> {
    let Some(module) = parse_with_policy(source, path, ParsePolicy::Lenient)? else {
        return Ok(Vec::new());
    };
    let source = module.source.as_str();
    let mut ops = Vec::new();

    for stmt in statements(&module.root()) {
        let Some(def) = Definition::from_statement(stmt) else {
            continue;
        };
        if !def.is_function() || def.name(source) != Some("upgrade") {
            continue;
        }
        let Some(body) = def.body() else {
            continue;
        };
        walk_tree(body, &mut |node| {
            if let Some(op) = classify_call(node, source) {
                ops.push(op);
            }
        });
    }
    Ok(ops)
}

fn classify_call(node: Node<'_>, source: &str) -> Option<MigrationOp> {
    let call = CallParts::from_node(node, source)?;
    let object = call.function.child_by_field_name("object")?;
    if object.kind() != "identifier" || node_text(&object, source) != "op" {
        return None;
    }
    let (severity, reason) = match callee_attribute(&call.function, source)? {
        "drop_column" => (Severity::Major, "Dropped column"),
        "add_column" => add_column_impact(&call, source)?,
        "create_index" => (Severity::Minor, "Added index"),
        "drop_index" => (Severity::Major, "Dropped index"),
        "drop_table" => (Severity::Major, "Dropped table"),
        "create_table" => (Severity::Minor, "Added table"),
        _ => return None,
    };
    let detail = node
        .child_by_field_name("arguments")
        .map(|args| canonical_text(&args, source))
        .unwrap_or_default();
    Some(MigrationOp {
        severity,
        reason,
        detail,
    })
}

/// A column is breaking when it is non-nullable with no default of either kind.
fn add_column_impact(call: &CallParts<'_>, source: &str) -> Option<(Severity, &'static str)> {
    let column = call.positional.iter().find_map(|arg| {
        CallParts::from_node(*arg, source)
            .filter(|c| callee_attribute(&c.function, source) == Some("Column"))
    })?;
    let nullable = column
        .keyword("nullable")
        .and_then(|n| bool_value(&n))
        .unwrap_or(true);
    let has_default = column.has_keyword("default") || column.has_keyword("server_default");
    if !nullable && !has_default {
        Some((Severity::Major, "Added non-nullable column"))
    } else {
        Some((Severity::Minor, "Added column"))
    }
}

/// Report operations of scripts that are new at head, or that a modified
/// script gained. Removed scripts report nothing.
///
/// Operations are matched as a multiset: each base operation cancels at most
/// one identical head operation.
pub fn diff_migrations(old: &MigrationState, new: &MigrationState) -> Vec<Impact> {
    let mut impacts = Vec::new();
    for (path, ops) in new {
        let mut unmatched: Vec<&MigrationOp> = old
            .get(path)
            .map(|before| before.iter().collect())
            .unwrap_or_default();
        for op in ops {
            match unmatched.iter().position(|previous| *previous == op) {
                Some(index) => {
                    unmatched.swap_remove(index);
                }
                None => impacts.push(Impact::new(op.severity, path.as_str(), op.reason)),
            }
        }
    }
    impacts
}
