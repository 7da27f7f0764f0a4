//! HTTP route tracking for Flask and FastAPI style applications.
//!
//! A route is any function decorated with `@x.route(path, methods=[...])`
//! (method defaults to GET) or `@x.get(path)` / `@x.post(path)` and the
//! other HTTP verbs. Each route keeps its handler's parameters with a
//! required flag (no default value).

use super::SurfaceAnalyzer;
use crate::config::BumpscopeConfig;
use crate::core::{Impact, Result};
use crate::python::literals::{string_elements, string_value};
use crate::python::{
    callee_attribute, parse_with_policy, walk_tree, CallParts, Definition, ParsePolicy,
};
use crate::signature::extractor::parameter_list;
use crate::vcs::SourceReader;
use std::collections::BTreeMap;
use std::fmt;

const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "options", "head"];

/// Route identity: URL path plus upper-case HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey {
    pub path: String,
    pub method: String,
}

impl RouteKey {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Handler parameter name → required.
pub type RouteParams = BTreeMap<String, bool>;

pub type RouteTable = BTreeMap<RouteKey, RouteParams>;

pub struct WebRoutesAnalyzer {
    roots: Vec<String>,
    ignores: Vec<String>,
}

impl WebRoutesAnalyzer {
    pub fn new(config: &BumpscopeConfig) -> Self {
        Self {
            roots: config.project.public_roots.clone(),
            ignores: config.ignore.paths.clone(),
        }
    }
}

impl SurfaceAnalyzer for WebRoutesAnalyzer {
    type State = RouteTable;

    fn name(&self) -> &str {
        "web_routes"
    }

    fn collect(&self, reader: &dyn SourceReader, rev: &str) -> Result<RouteTable> {
        let mut routes = RouteTable::new();
        for path in reader.list_source_files(rev, &self.roots, &self.ignores)? {
            let Some(source) = reader.read_file_at(rev, &path)? else {
                continue;
            };
            routes.extend(extract_routes(&source, &path)?);
        }
        tracing::debug!(rev, routes = routes.len(), "collected web routes");
        Ok(routes)
    }

    fn compare(&self, old: &RouteTable, new: &RouteTable) -> Vec<Impact> {
        diff_routes(old, new)
    }
}

/// Routes declared in one file. Unparsable files yield no routes.
pub fn extract_routes(source: &str, path: &str) -> Result<RouteTable> {
    let Some(module) = parse_with_policy(source, path, ParsePolicy::Lenient)? else {
        return Ok(RouteTable::new());
    };
    let source = module.source.as_str();
    let mut routes = RouteTable::new();

    walk_tree(module.root(), &mut |node| {
        if node.kind() != "decorated_definition" {
            return;
        }
        let Some(def) = Definition::from_statement(node) else {
            return;
        };
        if !def.is_function() {
            return;
        }
        let endpoints: Vec<RouteKey> = def
            .decorators
            .iter()
            .filter_map(|decorator| route_decorator(*decorator, source))
            .flatten()
            .collect();
        if endpoints.is_empty() {
            return;
        }
        let params = handler_params(&def, source);
        for key in endpoints {
            routes.insert(key, params.clone());
        }
    });

    Ok(routes)
}

fn route_decorator(decorator: tree_sitter::Node<'_>, source: &str) -> Option<Vec<RouteKey>> {
    let call = CallParts::from_node(decorator, source)?;
    if call.function.kind() != "attribute" {
        return None;
    }
    let verb = callee_attribute(&call.function, source)?.to_ascii_lowercase();
    let path = call
        .positional
        .first()
        .and_then(|arg| string_value(arg, source))?;

    if verb == "route" {
        let methods = call
            .keyword("methods")
            .map(|m| string_elements(&m, source))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| vec!["GET".to_string()]);
        Some(
            methods
                .into_iter()
                .map(|m| RouteKey::new(path.clone(), m.to_ascii_uppercase()))
                .collect(),
        )
    } else if HTTP_METHODS.contains(&verb.as_str()) {
        Some(vec![RouteKey::new(path, verb.to_ascii_uppercase())])
    } else {
        None
    }
}

fn handler_params(def: &Definition<'_>, source: &str) -> RouteParams {
    def.node
        .child_by_field_name("parameters")
        .map(|params| parameter_list(&params, source))
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.kind.is_variadic() && p.name != "self" && p.name != "cls")
        .map(|p| {
            let required = p.is_required();
            (p.name, required)
        })
        .collect()
}

/// Removed routes, then routes present on both sides, then added routes.
pub fn diff_routes(old: &RouteTable, new: &RouteTable) -> Vec<Impact> {
    let mut impacts: Vec<Impact> = old
        .keys()
        .filter(|key| !new.contains_key(*key))
        .map(|key| Impact::major(key.to_string(), "Removed route"))
        .collect();

    for (key, old_params) in old {
        if let Some(new_params) = new.get(key) {
            impacts.extend(diff_params(&key.to_string(), old_params, new_params));
        }
    }

    impacts.extend(
        new.keys()
            .filter(|key| !old.contains_key(*key))
            .map(|key| Impact::minor(key.to_string(), "Added route")),
    );
    impacts
}

fn diff_params(symbol: &str, old: &RouteParams, new: &RouteParams) -> Vec<Impact> {
    let mut impacts = Vec::new();
    for (name, &required) in old {
        if !new.contains_key(name) {
            impacts.push(if required {
                Impact::major(symbol, format!("Removed required param '{name}'"))
            } else {
                Impact::minor(symbol, format!("Removed optional param '{name}'"))
            });
        }
    }
    for (name, &required) in new {
        match old.get(name) {
            None if required => {
                impacts.push(Impact::major(symbol, format!("Added required param '{name}'")))
            }
            None => impacts.push(Impact::minor(symbol, format!("Added optional param '{name}'"))),
            Some(&was_required) if was_required && !required => {
                impacts.push(Impact::minor(symbol, format!("Param '{name}' became optional")))
            }
            Some(&was_required) if !was_required && required => {
                impacts.push(Impact::major(symbol, format!("Param '{name}' became required")))
            }
            Some(_) => {}
        }
    }
    impacts
}
