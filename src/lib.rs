// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod decision;
pub mod diff;
pub mod engine;
pub mod io;
pub mod observability;
pub mod python;
pub mod signature;
pub mod vcs;

// Re-export commonly used types
pub use crate::core::{Decision, Error, Impact, Result, Severity};

pub use crate::signature::{
    extract_public_api, module_name_from_path, ExtractOptions, ParamKind, Parameter, PublicApi,
    Signature,
};

pub use crate::diff::{compare_signatures, diff_public_api, DiffRules};

pub use crate::decision::decide;

pub use crate::analyzers::{
    AnalyzerRegistration, AnalyzerRegistry, AnalyzerState, DynAnalyzer, SurfaceAnalyzer,
};

pub use crate::config::{load_config, BumpscopeConfig};

pub use crate::engine::{build_api_at_ref, evaluate, run_analyzers, Report};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::vcs::{GitRepository, MemorySource, SourceReader};
