//! Configuration types deserialized from `weave.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// The top-level project configuration parsed from `weave.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Backend selection and options.
    #[serde(default)]
    pub backends: BackendsConfig,
}

/// Core project metadata.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
}

/// Where declarations are read from and generated files go.
///
/// Relative paths are relative to the directory holding `weave.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct PathsConfig {
    /// Directories searched for declaration files.
    #[serde(default)]
    pub include: Vec<String>,
    /// The output root.
    #[serde(default)]
    pub output: Option<String>,
}

/// The `[backends]` table.
#[derive(Debug, Default, Deserialize)]
pub struct BackendsConfig {
    /// Backends to run, in request order.
    #[serde(default)]
    pub enable: Vec<String>,
    /// Option tables keyed by backend name.
    #[serde(default)]
    pub options: BTreeMap<String, BTreeMap<String, OptionSetting>>,
}

/// A single backend option as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OptionSetting {
    /// `key = true`
    Bool(bool),
    /// `key = "value"`
    Str(String),
}

impl fmt::Display for OptionSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionSetting::Bool(b) => write!(f, "{b}"),
            OptionSetting::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl ProjectConfig {
    /// Declaration directories resolved against `base`.
    pub fn include_dirs(&self, base: &Path) -> Vec<PathBuf> {
        self.paths.include.iter().map(|p| base.join(p)).collect()
    }

    /// The output root resolved against `base`, if configured.
    pub fn output_dir(&self, base: &Path) -> Option<PathBuf> {
        self.paths.output.as_ref().map(|p| base.join(p))
    }

    /// Checks every backend named in `[backends]` against `known`.
    pub fn check_backends<S: AsRef<str>>(&self, known: &[S]) -> Result<(), ConfigError> {
        let is_known = |name: &str| known.iter().any(|k| k.as_ref() == name);
        if let Some(name) = self.backends.enable.iter().find(|n| !is_known(n.as_str())) {
            return Err(ConfigError::UnknownBackend {
                name: name.clone(),
                section: "backends.enable",
            });
        }
        if let Some(name) = self.backends.options.keys().find(|n| !is_known(n.as_str())) {
            return Err(ConfigError::UnknownBackend {
                name: name.clone(),
                section: "backends.options",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_settings_are_untagged() {
        let table: BTreeMap<String, OptionSetting> =
            toml::from_str("keep_name = true\nprefix = \"ark\"").unwrap();
        assert_eq!(table["keep_name"], OptionSetting::Bool(true));
        assert_eq!(table["prefix"], OptionSetting::Str("ark".to_string()));
    }

    #[test]
    fn option_setting_display() {
        assert_eq!(OptionSetting::Bool(false).to_string(), "false");
        assert_eq!(OptionSetting::Str("x".to_string()).to_string(), "\"x\"");
    }

    #[test]
    fn backend_names_are_checked() {
        let config: ProjectConfig = toml::from_str(
            r#"
[project]
name = "demo"

[backends]
enable = ["cpp-user"]

[backends.options.ani-brige]
keep_name = true
"#,
        )
        .unwrap();
        let err = config
            .check_backends(&["cpp-user", "ani-bridge"])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownBackend { ref name, section: "backends.options" } if name == "ani-brige"
        ));

        let err = config.check_backends(&["ani-brige"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownBackend { section: "backends.enable", .. }
        ));
        assert!(config
            .check_backends(&["cpp-user", "ani-brige"])
            .is_ok());
    }

    #[test]
    fn paths_resolve_against_base() {
        let config: ProjectConfig = toml::from_str(
            r#"
[project]
name = "demo"

[paths]
include = ["idl", "vendor/idl"]
output = "generated"
"#,
        )
        .unwrap();
        let base = Path::new("/work/demo");
        assert_eq!(
            config.include_dirs(base),
            vec![base.join("idl"), base.join("vendor/idl")]
        );
        assert_eq!(config.output_dir(base), Some(base.join("generated")));
    }
}
