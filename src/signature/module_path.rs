use crate::core::{Error, Result};
use std::path::{Component, Path};

/// Convert a file path to a dotted module name relative to `root`.
///
/// `pkg/sub/mod.py` under root `pkg` becomes `sub.mod`; a nested package's
/// `__init__.py` names the package itself. Roots `.` and `""` match any
/// relative path.
pub fn module_name_from_path(root: &str, path: &str) -> Result<String> {
    let root_path = normalize(root);
    let file_path = normalize(path);

    let relative = if root_path.as_os_str().is_empty() {
        file_path.as_path()
    } else {
        file_path.strip_prefix(&root_path).map_err(|_| {
            Error::Configuration(format!("'{path}' is not relative to '{root}'"))
        })?
    };

    let mut parts: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.len() > 1 && parts.last().map(String::as_str) == Some("__init__") {
        parts.pop();
    }
    Ok(parts.join("."))
}

fn normalize(path: &str) -> std::path::PathBuf {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_nested() {
        assert_eq!(module_name_from_path("pkg", "pkg/a/b/mod.py").unwrap(), "a.b.mod");
    }

    #[test]
    fn test_module_name_dot_root() {
        assert_eq!(module_name_from_path(".", "pkg/mod.py").unwrap(), "pkg.mod");
        assert_eq!(module_name_from_path("./", "pkg/mod.py").unwrap(), "pkg.mod");
    }

    #[test]
    fn test_module_name_package_init() {
        assert_eq!(module_name_from_path("src", "src/pkg/__init__.py").unwrap(), "pkg");
        assert_eq!(module_name_from_path("pkg", "pkg/__init__.py").unwrap(), "__init__");
    }

    #[test]
    fn test_module_name_outside_root() {
        assert!(module_name_from_path("pkg", "other/mod.py").is_err());
    }
}
