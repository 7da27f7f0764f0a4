use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use super::core::BumpscopeConfig;
use super::validation::validate_config;
use crate::core::{Error, Result};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "bumpscope.toml";

/// Pure function to read config file contents
pub(crate) fn read_config_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse and validate config from a TOML string; `origin` names the file in errors
pub fn parse_and_validate_config(contents: &str, origin: &Path) -> Result<BumpscopeConfig> {
    let config = toml::from_str::<BumpscopeConfig>(contents).map_err(|e| {
        Error::Configuration(format!("failed to parse {}: {}", origin.display(), e))
    })?;

    validate_config(&config).map_err(|problems| {
        Error::Configuration(format!(
            "invalid configuration in {}: {}",
            origin.display(),
            problems.join("; ")
        ))
    })?;

    Ok(config)
}

/// Load configuration from `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<BumpscopeConfig> {
    let contents = match read_config_file(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!(
                "No config found at {}. Using default config.",
                path.display()
            );
            return Ok(BumpscopeConfig::default());
        }
        Err(e) => {
            log::warn!("Failed to read config file {}: {}", path.display(), e);
            return Err(e.into());
        }
    };

    let config = parse_and_validate_config(&contents, path)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Commented template written by `bumpscope init`
pub fn default_config_template() -> &'static str {
    r#"# bumpscope configuration

[project]
public_roots = ["."]
private_prefixes = ["_"]

[ignore]
paths = ["tests/**", "examples/**", "scripts/**"]

[rules]
# major | minor | patch
return_type_change = "minor"
param_annotation_change = "minor"

[analyzers]
# cli = true
# migrations = true
# openapi = true
# web_routes = true

[migrations]
paths = ["migrations"]

[openapi]
paths = []

[cli]
paths = []
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use indoc::indoc;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn origin() -> PathBuf {
        PathBuf::from("bumpscope.toml")
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BumpscopeConfig::default());
        assert_eq!(config.project.public_roots, vec!["."]);
        assert_eq!(config.migrations.paths, vec!["migrations"]);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = parse_and_validate_config(
            indoc! {r#"
                [project]
                public_roots = ["src/pkg"]

                [rules]
                return_type_change = "major"

                [analyzers]
                web_routes = true
                cli = false
            "#},
            &origin(),
        )
        .unwrap();
        assert_eq!(config.project.public_roots, vec!["src/pkg"]);
        assert_eq!(config.project.private_prefixes, vec!["_"]);
        assert_eq!(config.rules.return_type_change, Severity::Major);
        assert_eq!(config.rules.param_annotation_change, Severity::Minor);
        assert_eq!(config.enabled_analyzers(), vec!["web_routes"]);
    }

    #[test]
    fn test_unknown_field_is_configuration_error() {
        let err = parse_and_validate_config("[project]\nroots = []\n", &origin()).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("bumpscope.toml")));
    }

    #[test]
    fn test_warn_rule_severity_is_rejected() {
        let err = parse_and_validate_config("[rules]\nreturn_type_change = \"warn\"\n", &origin())
            .unwrap_err();
        assert!(err.to_string().contains("rules.return_type_change"));
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config = parse_and_validate_config(default_config_template(), &origin()).unwrap();
        assert_eq!(config, BumpscopeConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bumpscope.toml");
        fs::write(&path, "[openapi]\npaths = [\"openapi.yaml\"]\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.openapi.paths, vec!["openapi.yaml"]);
    }
}
