//! Command-line surface recovered statically from `argparse` and `click`
//! declarations.
//!
//! The state maps a space-joined command path (`""` for the root command) to
//! its options and arguments, each flagged required or optional. Nothing is
//! imported or executed; only declaration shapes are read.

use super::SurfaceAnalyzer;
use crate::config::BumpscopeConfig;
use crate::core::{Impact, Result};
use crate::python::literals::{bool_value, string_value};
use crate::python::{
    callee_attribute, dotted_name, node_text, parse_with_policy, walk_tree, CallParts,
    Definition, ParsePolicy,
};
use crate::vcs::SourceReader;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tree_sitter::Node;

/// Option or argument name → required.
pub type CommandOptions = BTreeMap<String, bool>;

/// Command path → options.
pub type CliSurface = BTreeMap<String, CommandOptions>;

const ROOT_LABEL: &str = "<root>";

pub struct CliAnalyzer {
    paths: Vec<String>,
    roots: Vec<String>,
    ignores: Vec<String>,
}

impl CliAnalyzer {
    pub fn new(config: &BumpscopeConfig) -> Self {
        Self {
            paths: config.cli.paths.clone(),
            roots: config.project.public_roots.clone(),
            ignores: config.ignore.paths.clone(),
        }
    }

    fn source_files(&self, reader: &dyn SourceReader, rev: &str) -> Result<BTreeSet<String>> {
        if self.paths.is_empty() {
            return reader.list_source_files(rev, &self.roots, &self.ignores);
        }
        Ok(reader
            .list_files(rev)?
            .into_iter()
            .filter(|path| path.ends_with(".py") && matches_cli_paths(path, &self.paths))
            .collect())
    }
}

impl SurfaceAnalyzer for CliAnalyzer {
    type State = CliSurface;

    fn name(&self) -> &str {
        "cli"
    }

    fn collect(&self, reader: &dyn SourceReader, rev: &str) -> Result<CliSurface> {
        let mut surface = CliSurface::new();
        for path in self.source_files(reader, rev)? {
            let Some(source) = reader.read_file_at(rev, &path)? else {
                continue;
            };
            for (command, options) in extract_cli(&source, &path)? {
                surface.entry(command).or_default().extend(options);
            }
        }
        tracing::debug!(rev, commands = surface.len(), "collected cli surface");
        Ok(surface)
    }

    fn compare(&self, old: &CliSurface, new: &CliSurface) -> Vec<Impact> {
        diff_cli(old, new)
    }
}

/// Commands declared in one file. Unparsable files declare nothing.
pub fn extract_cli(source: &str, path: &str) -> Result<CliSurface> {
    let Some(module) = parse_with_policy(source, path, ParsePolicy::Lenient)? else {
        return Ok(CliSurface::new());
    };
    let mut walker = CliWalker::new(&module.source);
    walk_tree(module.root(), &mut |node| walker.visit(node));
    Ok(walker.surface)
}

fn join_command(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent} {name}")
    }
}

fn option_identifier(flag: &str) -> String {
    flag.trim_start_matches('-').replace('-', "_")
}

struct CliWalker<'s> {
    source: &'s str,
    surface: CliSurface,
    /// argparse parser variables → command path
    parsers: HashMap<String, String>,
    /// `add_subparsers()` results → owning command path
    subparsers: HashMap<String, String>,
    /// click group/command functions → command path
    click_commands: HashMap<String, String>,
}

impl<'s> CliWalker<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            surface: CliSurface::new(),
            parsers: HashMap::new(),
            subparsers: HashMap::new(),
            click_commands: HashMap::new(),
        }
    }

    fn visit(&mut self, node: Node<'_>) {
        match node.kind() {
            "assignment" => self.visit_assignment(node),
            "call" => self.visit_call(node),
            "decorated_definition" => self.visit_click_definition(node),
            _ => {}
        }
    }

    fn visit_assignment(&mut self, node: Node<'_>) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };
        if left.kind() != "identifier" {
            return;
        }
        let Some(call) = CallParts::from_node(right, self.source) else {
            return;
        };
        let target = node_text(&left, self.source).to_string();
        let Some(method) = callee_attribute(&call.function, self.source) else {
            return;
        };

        match method {
            "ArgumentParser" => {
                self.surface.entry(String::new()).or_default();
                self.parsers.insert(target, String::new());
            }
            "add_subparsers" => {
                if let Some(owner) = self.receiver_path(&call, &self.parsers) {
                    self.subparsers.insert(target, owner);
                }
            }
            "add_parser" => {
                if let Some(path) = self.subparser_path(&call) {
                    self.parsers.insert(target, path);
                }
            }
            // Groups add options to the parser they were created from.
            "add_argument_group" | "add_mutually_exclusive_group" => {
                if let Some(owner) = self.receiver_path(&call, &self.parsers) {
                    self.parsers.insert(target, owner);
                }
            }
            _ => {}
        }
    }

    fn visit_call(&mut self, node: Node<'_>) {
        let Some(call) = CallParts::from_node(node, self.source) else {
            return;
        };
        match callee_attribute(&call.function, self.source) {
            Some("add_parser") if call.function.kind() == "attribute" => {
                if let Some(path) = self.subparser_path(&call) {
                    self.surface.entry(path).or_default();
                }
            }
            Some("add_argument") if call.function.kind() == "attribute" => {
                let Some(command) = self.receiver_path(&call, &self.parsers) else {
                    return;
                };
                if let Some((name, required)) = self.argparse_option(&call) {
                    self.surface.entry(command).or_default().insert(name, required);
                }
            }
            _ => {}
        }
    }

    /// Command path of the variable the method is called on.
    fn receiver_path(&self, call: &CallParts<'_>, table: &HashMap<String, String>) -> Option<String> {
        let object = call.function.child_by_field_name("object")?;
        if object.kind() != "identifier" {
            return None;
        }
        table.get(node_text(&object, self.source)).cloned()
    }

    fn subparser_path(&self, call: &CallParts<'_>) -> Option<String> {
        let parent = self.receiver_path(call, &self.subparsers)?;
        let name = call
            .positional
            .first()
            .and_then(|arg| string_value(arg, self.source))?;
        Some(join_command(&parent, &name))
    }

    fn argparse_option(&self, call: &CallParts<'_>) -> Option<(String, bool)> {
        let flags: Vec<String> = call
            .positional
            .iter()
            .filter_map(|arg| string_value(arg, self.source))
            .collect();
        let first = flags.first()?;
        let positional = !first.starts_with('-');

        let dest = call
            .keyword("dest")
            .and_then(|d| string_value(&d, self.source))
            .or_else(|| {
                if positional {
                    return Some(first.clone());
                }
                flags
                    .iter()
                    .find(|f| f.starts_with("--"))
                    .or(Some(first))
                    .map(|f| option_identifier(f))
            })?;
        if dest == "help" {
            return None;
        }

        let required = positional
            || call
                .keyword("required")
                .and_then(|r| bool_value(&r))
                .unwrap_or(false);
        Some((dest, required))
    }

    fn visit_click_definition(&mut self, node: Node<'_>) {
        let Some(def) = Definition::from_statement(node) else {
            return;
        };
        if !def.is_function() {
            return;
        }
        let Some(function_name) = def.name(self.source).map(str::to_string) else {
            return;
        };

        let mut command_path: Option<String> = None;
        let mut options = CommandOptions::new();
        for decorator in &def.decorators {
            let (callee, call) = match decorator.kind() {
                "call" => {
                    let Some(call) = CallParts::from_node(*decorator, self.source) else {
                        continue;
                    };
                    (dotted_name(&call.function, self.source), Some(call))
                }
                _ => (dotted_name(decorator, self.source), None),
            };
            let Some(callee) = callee else {
                continue;
            };
            let (owner, decorator_name) = match callee.rsplit_once('.') {
                Some((owner, name)) => (owner, name),
                None => ("", callee.as_str()),
            };

            match decorator_name {
                "group" | "command" if owner.is_empty() || owner == "click" => {
                    command_path = Some(String::new());
                }
                "group" | "command" => {
                    if let Some(parent) = self.click_commands.get(owner) {
                        let name = call
                            .as_ref()
                            .and_then(|c| c.positional.first())
                            .and_then(|n| string_value(n, self.source))
                            .unwrap_or_else(|| function_name.to_lowercase().replace('_', "-"));
                        command_path = Some(join_command(parent, &name));
                    }
                }
                "option" | "argument" if owner.is_empty() || owner == "click" => {
                    if let Some((name, required)) = call
                        .as_ref()
                        .and_then(|c| self.click_param(c, decorator_name == "argument"))
                    {
                        options.insert(name, required);
                    }
                }
                _ => {}
            }
        }

        if let Some(path) = command_path {
            self.surface.entry(path.clone()).or_default().extend(options);
            self.click_commands.insert(function_name, path);
        }
    }

    fn click_param(&self, call: &CallParts<'_>, is_argument: bool) -> Option<(String, bool)> {
        let decls: Vec<String> = call
            .positional
            .iter()
            .filter_map(|arg| string_value(arg, self.source))
            .collect();
        let name = decls
            .iter()
            .find(|d| !d.starts_with('-'))
            .cloned()
            .or_else(|| decls.iter().find(|d| d.starts_with("--")).cloned())
            .or_else(|| decls.first().cloned())
            .map(|d| {
                let primary = d.split('/').next().unwrap_or(d.as_str());
                option_identifier(primary).to_lowercase()
            })?;
        let required = call
            .keyword("required")
            .and_then(|r| bool_value(&r))
            .unwrap_or(is_argument);
        Some((name, required))
    }
}

fn command_label(command: &str) -> &str {
    if command.is_empty() {
        ROOT_LABEL
    } else {
        command
    }
}

/// Removed commands, then commands on both sides, then added commands.
pub fn diff_cli(old: &CliSurface, new: &CliSurface) -> Vec<Impact> {
    let mut impacts: Vec<Impact> = old
        .keys()
        .filter(|cmd| !new.contains_key(*cmd))
        .map(|cmd| Impact::major(command_label(cmd), "Removed command"))
        .collect();

    for (cmd, old_options) in old {
        let Some(new_options) = new.get(cmd) else {
            continue;
        };
        let symbol = command_label(cmd);
        for name in old_options.keys().filter(|o| !new_options.contains_key(*o)) {
            impacts.push(Impact::major(symbol, format!("Removed option '{name}'")));
        }
        for (name, &required) in new_options {
            match old_options.get(name) {
                None if required => {
                    impacts.push(Impact::major(symbol, format!("Added required option '{name}'")))
                }
                None => {
                    impacts.push(Impact::minor(symbol, format!("Added optional option '{name}'")))
                }
                Some(&was) if !was && required => {
                    impacts.push(Impact::major(symbol, format!("Option '{name}' became required")))
                }
                Some(&was) if was && !required => {
                    impacts.push(Impact::minor(symbol, format!("Option '{name}' became optional")))
                }
                Some(_) => {}
            }
        }
    }

    impacts.extend(
        new.keys()
            .filter(|cmd| !old.contains_key(*cmd))
            .map(|cmd| Impact::minor(command_label(cmd), "Added command")),
    );
    impacts
}

/// Whether `path` is selected by the configured CLI globs.
pub fn matches_cli_paths(path: &str, globs: &[String]) -> bool {
    globs
        .iter()
        .filter_map(|g| glob::Pattern::new(g).ok())
        .any(|p| p.matches(path))
}
