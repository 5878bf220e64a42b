//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::collections::HashSet;
use std::path::Path;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "weave.toml";

/// Loads and validates `<project_dir>/weave.toml`.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `weave.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.paths.output.as_deref() == Some("") {
        return Err(ConfigError::ValidationError(
            "paths.output must not be empty".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for name in &config.backends.enable {
        if name.is_empty() {
            return Err(ConfigError::ValidationError(
                "backends.enable contains an empty name".to_string(),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "backend '{name}' is enabled twice"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionSetting;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "geo"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "geo");
        assert!(config.project.version.is_empty());
        assert!(config.paths.include.is_empty());
        assert!(config.paths.output.is_none());
        assert!(config.backends.enable.is_empty());
        assert!(config.backends.options.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "geo"
version = "0.3.0"

[paths]
include = ["idl"]
output = "out"

[backends]
enable = ["cpp-user", "ani-bridge"]

[backends.options.ani-bridge]
keep_name = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.version, "0.3.0");
        assert_eq!(config.paths.include, vec!["idl"]);
        assert_eq!(config.paths.output.as_deref(), Some("out"));
        assert_eq!(config.backends.enable, vec!["cpp-user", "ani-bridge"]);
        assert_eq!(
            config.backends.options["ani-bridge"]["keep_name"],
            OptionSetting::Bool(true)
        );
    }

    #[test]
    fn missing_name_errors() {
        let err = load_config_from_str("[project]\nname = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn missing_project_table_errors() {
        let err = load_config_from_str("[paths]\ninclude = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn duplicate_backend_errors() {
        let toml = r#"
[project]
name = "geo"

[backends]
enable = ["cpp-user", "cpp-user"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("cpp-user")));
    }

    #[test]
    fn empty_output_errors() {
        let toml = r#"
[project]
name = "geo"

[paths]
output = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn option_values_must_be_bool_or_string() {
        let toml = r#"
[project]
name = "geo"

[backends.options.ani-bridge]
keep_name = 3
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[project]\nname = \"geo\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "geo");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
