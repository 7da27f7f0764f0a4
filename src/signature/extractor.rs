//! Signature extraction from Python source.
//!
//! Walks module-level functions and classes (including those defined under
//! module-level `if`/`try`/`with` blocks), applies the visibility filter
//! (explicit `__all__` when it can be evaluated, the private-prefix rule
//! otherwise) and records every eligible function and method signature.

use super::{ParamKind, Parameter, PublicApi, Signature};
use crate::core::Result;
use crate::python::literals::{string_sequence, Bindings};
use crate::python::{
    canonical_text, module_statements, named_children, node_text, parse_with_policy, statements,
    Definition, ParsePolicy, PythonModule,
};
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Visibility settings for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Names starting with any of these prefixes are private.
    pub private_prefixes: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            private_prefixes: vec!["_".to_string()],
        }
    }
}

impl ExtractOptions {
    pub fn is_private(&self, name: &str) -> bool {
        self.private_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
    }
}

/// Extract the public API of one module from its source text.
///
/// A parse failure is returned as an error; it is never downgraded to an
/// empty table.
pub fn extract_public_api(
    module_name: &str,
    source: &str,
    options: &ExtractOptions,
) -> Result<PublicApi> {
    match parse_with_policy(source, module_name, ParsePolicy::Strict)? {
        Some(module) => Ok(extract_from_module(module_name, &module, options)),
        None => Ok(PublicApi::new()),
    }
}

/// Extract the public API from an already parsed module.
pub fn extract_from_module(
    module_name: &str,
    module: &PythonModule,
    options: &ExtractOptions,
) -> PublicApi {
    let source = module.source.as_str();
    let exports = parse_exports(module);
    let is_eligible = |name: &str| match &exports {
        Some(names) => names.contains(name),
        None => !options.is_private(name),
    };

    let mut api = PublicApi::new();
    for stmt in module_statements(&module.root()) {
        let Some(definition) = Definition::from_statement(stmt) else {
            continue;
        };
        let Some(name) = definition.name(source) else {
            continue;
        };
        if !is_eligible(name) {
            continue;
        }

        if definition.is_function() {
            let signature = build_signature(format!("{module_name}:{name}"), &definition.node, source);
            api.insert(signature.qualified_name.clone(), signature);
        } else if definition.is_class() {
            for method in class_methods(&definition, source, options) {
                let signature = build_signature(
                    format!("{module_name}:{name}.{}", method.0),
                    &method.1,
                    source,
                );
                api.insert(signature.qualified_name.clone(), signature);
            }
        }
    }

    tracing::trace!(module = module_name, symbols = api.len(), "extracted public api");
    api
}

fn class_methods<'tree>(
    class: &Definition<'tree>,
    source: &str,
    options: &ExtractOptions,
) -> Vec<(String, Node<'tree>)> {
    let Some(body) = class.body() else {
        return Vec::new();
    };
    statements(&body)
        .into_iter()
        .filter_map(Definition::from_statement)
        .filter(Definition::is_function)
        .filter_map(|method| {
            let name = method.name(source)?;
            if options.is_private(name) {
                return None;
            }
            Some((name.to_string(), method.node))
        })
        .collect()
}

fn build_signature(qualified_name: String, function: &Node, source: &str) -> Signature {
    let parameters = function
        .child_by_field_name("parameters")
        .map(|params| parameter_list(&params, source))
        .unwrap_or_default();
    let returns = function
        .child_by_field_name("return_type")
        .map(|ret| canonical_text(&ret, source));

    Signature {
        qualified_name,
        parameters,
        returns,
    }
}

/// Classify every parameter in declaration order.
///
/// A `/` marker turns the parameters before it into positional-only; a bare
/// `*` or a `*args` makes every later named parameter keyword-only.
pub(crate) fn parameter_list(parameters: &Node, source: &str) -> Vec<Parameter> {
    let mut out: Vec<Parameter> = Vec::new();
    let mut keyword_only = false;

    for child in named_children(parameters) {
        let named_kind = if keyword_only {
            ParamKind::KeywordOnly
        } else {
            ParamKind::PositionalOrKeyword
        };

        match child.kind() {
            "identifier" => out.push(Parameter::new(node_text(&child, source), named_kind)),
            "default_parameter" | "typed_default_parameter" => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let mut param = Parameter::new(node_text(&name, source), named_kind);
                param.default = child
                    .child_by_field_name("value")
                    .map(|v| canonical_text(&v, source));
                param.annotation = child
                    .child_by_field_name("type")
                    .map(|t| canonical_text(&t, source));
                out.push(param);
            }
            "typed_parameter" => {
                let annotation = child
                    .child_by_field_name("type")
                    .map(|t| canonical_text(&t, source));
                let Some(inner) = named_children(&child).into_iter().next() else {
                    continue;
                };
                let mut param = match inner.kind() {
                    "list_splat_pattern" => {
                        keyword_only = true;
                        Parameter::new(splat_name(&inner, source), ParamKind::VarPositional)
                    }
                    "dictionary_splat_pattern" => {
                        Parameter::new(splat_name(&inner, source), ParamKind::VarKeyword)
                    }
                    _ => Parameter::new(node_text(&inner, source), named_kind),
                };
                param.annotation = annotation;
                out.push(param);
            }
            "list_splat_pattern" => {
                keyword_only = true;
                out.push(Parameter::new(
                    splat_name(&child, source),
                    ParamKind::VarPositional,
                ));
            }
            "dictionary_splat_pattern" => out.push(Parameter::new(
                splat_name(&child, source),
                ParamKind::VarKeyword,
            )),
            "keyword_separator" => keyword_only = true,
            "positional_separator" => {
                for param in out.iter_mut() {
                    if param.kind == ParamKind::PositionalOrKeyword {
                        param.kind = ParamKind::PositionalOnly;
                    }
                }
            }
            _ => {}
        }
    }

    out
}

fn splat_name(pattern: &Node, source: &str) -> String {
    named_children(pattern)
        .first()
        .map(|n| node_text(n, source))
        .unwrap_or_else(|| node_text(pattern, source).trim_start_matches('*'))
        .to_string()
}

/// Evaluate the module's explicit export list.
///
/// Returns `None` when `__all__` is absent or when any statement building it
/// cannot be evaluated, so callers fall back to the prefix rule.
fn parse_exports(module: &PythonModule) -> Option<BTreeSet<String>> {
    let source = module.source.as_str();
    let mut bindings = Bindings::new();
    let mut exports: Option<Vec<String>> = None;
    let mut malformed = false;

    for stmt in module_statements(&module.root()) {
        if stmt.kind() != "expression_statement" {
            continue;
        }
        let Some(expr) = named_children(&stmt).into_iter().next() else {
            continue;
        };
        match expr.kind() {
            "assignment" => {
                let Some(left) = expr.child_by_field_name("left") else {
                    continue;
                };
                if left.kind() != "identifier" {
                    continue;
                }
                let name = node_text(&left, source);
                let value = expr
                    .child_by_field_name("right")
                    .and_then(|right| string_sequence(&right, source, &bindings));
                if name == "__all__" {
                    malformed = value.is_none();
                    exports = value;
                } else {
                    match value {
                        Some(v) => {
                            bindings.insert(name.to_string(), v);
                        }
                        None => {
                            bindings.remove(name);
                        }
                    }
                }
            }
            "augmented_assignment" => {
                let targets_all = expr
                    .child_by_field_name("left")
                    .is_some_and(|l| node_text(&l, source) == "__all__");
                if !targets_all {
                    continue;
                }
                let is_add = expr
                    .child_by_field_name("operator")
                    .is_some_and(|op| node_text(&op, source) == "+=");
                let value = expr
                    .child_by_field_name("right")
                    .and_then(|right| string_sequence(&right, source, &bindings));
                match (exports.as_mut(), value, is_add) {
                    (Some(current), Some(extra), true) => current.extend(extra),
                    _ => malformed = true,
                }
            }
            "call" => {
                if let Some((method, args)) = all_method_call(&expr, source) {
                    let current = exports.get_or_insert_with(Vec::new);
                    match (method, args.first()) {
                        ("extend", Some(arg)) => match string_sequence(arg, source, &bindings) {
                            Some(extra) => current.extend(extra),
                            None => malformed = true,
                        },
                        ("append", Some(arg)) => {
                            match crate::python::literals::string_value(arg, source) {
                                Some(name) => current.push(name),
                                None => malformed = true,
                            }
                        }
                        _ => malformed = true,
                    }
                }
            }
            _ => {}
        }
    }

    if malformed {
        tracing::debug!(
            path = %module.path.display(),
            "__all__ could not be evaluated; using default visibility"
        );
        return None;
    }
    exports.map(|names| names.into_iter().collect())
}

/// Recognise `__all__.extend(...)` / `__all__.append(...)`.
fn all_method_call<'tree>(call: &Node<'tree>, source: &str) -> Option<(&'static str, Vec<Node<'tree>>)> {
    let function = call.child_by_field_name("function")?;
    if function.kind() != "attribute" {
        return None;
    }
    let object = function.child_by_field_name("object")?;
    if node_text(&object, source) != "__all__" {
        return None;
    }
    let method = match node_text(&function.child_by_field_name("attribute")?, source) {
        "extend" => "extend",
        "append" => "append",
        _ => return None,
    };
    let args = call
        .child_by_field_name("arguments")
        .map(|a| named_children(&a))
        .unwrap_or_default();
    Some((method, args))
}
