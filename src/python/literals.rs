//! Literal evaluation for a tiny, safe subset of Python expressions.
//!
//! Only string literals, sequences of them, `+` concatenation and references
//! to names bound earlier in the same module are understood. Anything else
//! evaluates to `None`; no general expression evaluation takes place.

use super::{named_children, node_text};
use std::collections::HashMap;
use tree_sitter::Node;

/// Module-level names bound to string sequences, in assignment order.
pub type Bindings = HashMap<String, Vec<String>>;

/// Value of a string literal, or `None` for bytes, f-strings with
/// interpolation and non-string nodes.
pub fn string_value(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "string" => {
            let children = named_children(node);
            let prefix = children
                .iter()
                .find(|c| c.kind() == "string_start")
                .map(|c| node_text(c, source))
                .unwrap_or("");
            if prefix.contains(['b', 'B']) || children.iter().any(|c| c.kind() == "interpolation")
            {
                return None;
            }
            Some(
                children
                    .iter()
                    .filter(|c| c.kind() == "string_content")
                    .map(|c| node_text(c, source))
                    .collect(),
            )
        }
        "concatenated_string" => named_children(node)
            .iter()
            .map(|part| string_value(part, source))
            .collect(),
        "parenthesized_expression" => named_children(node)
            .first()
            .and_then(|inner| string_value(inner, source)),
        _ => None,
    }
}

/// Evaluate a list, tuple or set of string literals, following `+` and
/// name references through `bindings`.
pub fn string_sequence(node: &Node, source: &str, bindings: &Bindings) -> Option<Vec<String>> {
    match node.kind() {
        "list" | "tuple" | "set" | "expression_list" => named_children(node)
            .iter()
            .map(|element| string_value(element, source))
            .collect(),
        "binary_operator" => {
            let operator = node.child_by_field_name("operator")?;
            if node_text(&operator, source) != "+" {
                return None;
            }
            let mut left = string_sequence(&node.child_by_field_name("left")?, source, bindings)?;
            let right = string_sequence(&node.child_by_field_name("right")?, source, bindings)?;
            left.extend(right);
            Some(left)
        }
        "identifier" => bindings.get(node_text(node, source)).cloned(),
        "parenthesized_expression" => named_children(node)
            .first()
            .and_then(|inner| string_sequence(inner, source, bindings)),
        _ => None,
    }
}

/// `True`/`False` literal value.
pub fn bool_value(node: &Node) -> Option<bool> {
    match node.kind() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// String elements of a list/tuple literal, skipping anything non-literal.
pub fn string_elements(node: &Node, source: &str) -> Vec<String> {
    match node.kind() {
        "list" | "tuple" | "set" => named_children(node)
            .iter()
            .filter_map(|element| string_value(element, source))
            .collect(),
        _ => Vec::new(),
    }
}
