//! Tree-sitter parser integration for Python
//!
//! Provides parsing with the tree-sitter Python grammar plus the small set of
//! node helpers shared by the signature extractor and the surface analyzers.

pub mod literals;

use crate::core::{Error, Result};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// A parsed Python source file.
pub struct PythonModule {
    pub tree: Tree,
    pub source: String,
    pub path: PathBuf,
}

impl PythonModule {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

/// How a component reacts to source it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePolicy {
    /// The failure is returned to the caller.
    Strict,
    /// The failure is logged and the file contributes nothing.
    Lenient,
}

/// Parse Python source into a tree-sitter tree.
///
/// Tree-sitter always produces a tree; any ERROR or MISSING node in it is
/// reported as a parse error with a 1-based location.
pub fn parse_module(source: &str, path: impl AsRef<Path>) -> Result<PythonModule> {
    let path = path.as_ref();
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| Error::parse(path, 0, 0, format!("failed to load Python grammar: {e}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::parse(path, 0, 0, "parser produced no tree"))?;

    if let Some(bad) = first_error_node(tree.root_node()) {
        let message = if bad.is_missing() {
            format!("missing '{}'", bad.kind())
        } else {
            "invalid syntax".to_string()
        };
        return Err(Error::parse(path, node_line(&bad), node_column(&bad), message));
    }

    Ok(PythonModule {
        tree,
        source: source.to_string(),
        path: path.to_path_buf(),
    })
}

/// Parse according to `policy`; lenient failures become `Ok(None)`.
pub fn parse_with_policy(
    source: &str,
    path: impl AsRef<Path>,
    policy: ParsePolicy,
) -> Result<Option<PythonModule>> {
    match (parse_module(source, path.as_ref()), policy) {
        (Ok(module), _) => Ok(Some(module)),
        (Err(e), ParsePolicy::Strict) => Err(e),
        (Err(e), ParsePolicy::Lenient) => {
            tracing::warn!(path = %path.as_ref().display(), error = %e, "skipping unparsable file");
            Ok(None)
        }
    }
}

fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(first_error_node)
        .or(Some(node))
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Get the line number for a tree-sitter node (1-indexed)
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Get the column number for a tree-sitter node (1-indexed)
pub fn node_column(node: &Node) -> usize {
    node.start_position().column + 1
}

/// Named children of `node` with comments removed.
pub fn named_children<'tree>(node: &Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Render an expression to whitespace-insensitive text.
///
/// Tokens are joined without spaces except between two word-like tokens and
/// after commas, so `Optional[ int ]` and `Optional[int]` compare equal.
/// String literals are kept verbatim.
pub fn canonical_text(node: &Node, source: &str) -> String {
    let mut tokens = Vec::new();
    collect_tokens(*node, source, &mut tokens);

    let mut out = String::new();
    let mut prev: Option<&str> = None;
    for token in tokens {
        if let Some(p) = prev {
            let word_gap = p.ends_with(is_word_char) && token.starts_with(is_word_char);
            if word_gap || p == "," {
                out.push(' ');
            }
        }
        out.push_str(token);
        prev = Some(token);
    }
    out
}

fn collect_tokens<'a>(node: Node, source: &'a str, out: &mut Vec<&'a str>) {
    if node.kind() == "comment" {
        return;
    }
    if node.child_count() == 0 || node.kind() == "string" {
        let text = node_text(&node, source).trim();
        if !text.is_empty() {
            out.push(text);
        }
        return;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    for child in children {
        collect_tokens(child, source, out);
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '"' || c == '\''
}

/// Statements of a module or block, comments removed.
pub fn statements<'tree>(node: &Node<'tree>) -> Vec<Node<'tree>> {
    named_children(node)
}

/// Statements that execute at module scope.
///
/// Looks through `if`/`elif`/`else`, `try`/`except`/`finally` and `with`
/// blocks, never into function or class bodies.
pub fn module_statements<'tree>(root: &Node<'tree>) -> Vec<Node<'tree>> {
    let mut out = Vec::new();
    collect_module_statements(root, &mut out);
    out
}

fn collect_module_statements<'tree>(node: &Node<'tree>, out: &mut Vec<Node<'tree>>) {
    for stmt in statements(node) {
        match stmt.kind() {
            "if_statement" | "try_statement" | "with_statement" => {
                collect_compound_blocks(&stmt, out)
            }
            _ => out.push(stmt),
        }
    }
}

fn collect_compound_blocks<'tree>(node: &Node<'tree>, out: &mut Vec<Node<'tree>>) {
    for child in named_children(node) {
        match child.kind() {
            "block" => collect_module_statements(&child, out),
            "elif_clause" | "else_clause" | "except_clause" | "except_group_clause"
            | "finally_clause" => collect_compound_blocks(&child, out),
            _ => {}
        }
    }
}

/// A function or class definition together with its decorators.
pub struct Definition<'tree> {
    pub node: Node<'tree>,
    pub decorators: Vec<Node<'tree>>,
}

impl<'tree> Definition<'tree> {
    /// Unwrap a statement into a definition, looking through `decorated_definition`.
    pub fn from_statement(stmt: Node<'tree>) -> Option<Self> {
        match stmt.kind() {
            "function_definition" | "class_definition" => Some(Self {
                node: stmt,
                decorators: Vec::new(),
            }),
            "decorated_definition" => {
                let node = stmt.child_by_field_name("definition")?;
                let decorators = named_children(&stmt)
                    .into_iter()
                    .filter(|c| c.kind() == "decorator")
                    .filter_map(|d| named_children(&d).into_iter().next())
                    .collect();
                Some(Self { node, decorators })
            }
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        self.node.kind() == "function_definition"
    }

    pub fn is_class(&self) -> bool {
        self.node.kind() == "class_definition"
    }

    pub fn name<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source))
    }

    pub fn body(&self) -> Option<Node<'tree>> {
        self.node.child_by_field_name("body")
    }
}

/// Dotted name for identifier and attribute chains (`app.get`, `sa.Column`).
pub fn dotted_name(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source).to_string()),
        "attribute" => {
            let object = node.child_by_field_name("object")?;
            let attr = node.child_by_field_name("attribute")?;
            Some(format!(
                "{}.{}",
                dotted_name(&object, source)?,
                node_text(&attr, source)
            ))
        }
        _ => None,
    }
}

/// Last segment of a dotted callee (`route` for `app.route`).
pub fn callee_attribute<'a>(function: &Node, source: &'a str) -> Option<&'a str> {
    match function.kind() {
        "identifier" => Some(node_text(function, source)),
        "attribute" => function
            .child_by_field_name("attribute")
            .map(|a| node_text(&a, source)),
        _ => None,
    }
}

/// Arguments of a call expression split into positional and keyword parts.
pub struct CallParts<'tree> {
    pub function: Node<'tree>,
    pub positional: Vec<Node<'tree>>,
    pub keywords: Vec<(String, Node<'tree>)>,
}

impl<'tree> CallParts<'tree> {
    pub fn from_node(node: Node<'tree>, source: &str) -> Option<Self> {
        if node.kind() != "call" {
            return None;
        }
        let function = node.child_by_field_name("function")?;
        let arguments = node.child_by_field_name("arguments")?;
        let mut positional = Vec::new();
        let mut keywords = Vec::new();
        if arguments.kind() == "argument_list" {
            for arg in named_children(&arguments) {
                match arg.kind() {
                    "keyword_argument" => {
                        if let (Some(name), Some(value)) = (
                            arg.child_by_field_name("name"),
                            arg.child_by_field_name("value"),
                        ) {
                            keywords.push((node_text(&name, source).to_string(), value));
                        }
                    }
                    "list_splat" | "dictionary_splat" => {}
                    _ => positional.push(arg),
                }
            }
        }
        Some(Self {
            function,
            positional,
            keywords,
        })
    }

    pub fn keyword(&self, name: &str) -> Option<Node<'tree>> {
        self.keywords
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    pub fn has_keyword(&self, name: &str) -> bool {
        self.keyword(name).is_some()
    }
}

/// Depth-first visit of every node below `node`, including `node` itself.
pub fn walk_tree<'tree>(node: Node<'tree>, visit: &mut dyn FnMut(Node<'tree>)) {
    visit(node);
    let mut cursor = node.walk();
    let children: Vec<Node<'tree>> = node.named_children(&mut cursor).collect();
    for child in children {
        walk_tree(child, visit);
    }
}
