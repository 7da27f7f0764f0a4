use crate::config::default_config_template;
use crate::io;
use anyhow::Result;
use std::path::Path;

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if io::file_exists(path) && !force {
        anyhow::bail!(
            "Configuration file {} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    io::write_file(path, default_config_template())?;
    println!("Created {} configuration file", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bumpscope.toml");
        init_config(&path, false).unwrap();
        std::fs::write(&path, "# edited\n").unwrap();

        assert!(init_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited\n");

        init_config(&path, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            default_config_template()
        );
    }
}
