//! Public API data model: parameters, signatures and per-snapshot tables.
//!
//! A [`PublicApi`] maps a qualified symbol (`module:name` or
//! `module:Class.method`) to its [`Signature`]. Tables are built fresh for
//! each snapshot and never mutated after extraction.

pub mod extractor;
pub mod module_path;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use extractor::{extract_from_module, extract_public_api, ExtractOptions};
pub use module_path::module_name_from_path;

/// How a parameter can be supplied by a caller.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ParamKind {
    #[serde(rename = "posonly")]
    PositionalOnly,
    #[serde(rename = "pos")]
    PositionalOrKeyword,
    #[serde(rename = "vararg")]
    VarPositional,
    #[serde(rename = "kwonly")]
    KeywordOnly,
    #[serde(rename = "varkw")]
    VarKeyword,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::PositionalOnly => "posonly",
            ParamKind::PositionalOrKeyword => "pos",
            ParamKind::VarPositional => "vararg",
            ParamKind::KeywordOnly => "kwonly",
            ParamKind::VarKeyword => "varkw",
        }
    }

    /// Positional-only or positional-or-keyword.
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword
        )
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamKind,
    /// Canonical text of the default expression, if any.
    pub default: Option<String>,
    /// Canonical text of the annotation, if any.
    pub annotation: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            annotation: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A parameter callers must supply: no default and not variadic.
    pub fn is_required(&self) -> bool {
        !self.has_default() && !self.kind.is_variadic()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Signature {
    pub qualified_name: String,
    pub parameters: Vec<Parameter>,
    pub returns: Option<String>,
}

impl Signature {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            parameters: Vec::new(),
            returns: None,
        }
    }

    pub fn with_params(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = Some(returns.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Qualified symbol name to signature. Sorted for deterministic iteration.
pub type PublicApi = BTreeMap<String, Signature>;
