//! Configuration loading and validation.
//!
//! Configuration lives in a TOML file (`bumpscope.toml` by default). Every
//! section is optional and falls back to its defaults; unknown fields are
//! rejected so typos do not silently change behavior.

pub mod core;
pub mod loader;
pub mod validation;

pub use self::core::{
    BumpscopeConfig, CliConfig, IgnoreConfig, MigrationsConfig, OpenApiConfig, ProjectConfig,
    RulesConfig,
};
pub use loader::{default_config_template, load_config, parse_and_validate_config, DEFAULT_CONFIG_FILE};
pub use validation::validate_config;
