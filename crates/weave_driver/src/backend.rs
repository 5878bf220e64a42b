//! The backend trait, its descriptor, and per-backend options.

use std::collections::BTreeMap;
use std::fmt;

use weave_analysis::AnalysisManager;
use weave_decl::PackageGroup;
use weave_output::OutputManager;

use crate::error::{CompileError, DriverError};

/// A code generator bound to one compiler run.
///
/// The driver calls [`inject`](Backend::inject) on every backend of the plan
/// before any [`generate`](Backend::generate) runs, so that synthetic
/// packages are visible to all generators.
pub trait Backend {
    /// Adds synthetic declarations to the still-mutable graph.
    fn inject(&mut self, _pg: &mut PackageGroup) -> Result<(), CompileError> {
        Ok(())
    }

    /// Emits this backend's files.
    fn generate(&mut self, ctx: &CompilerContext<'_>) -> Result<(), CompileError>;
}

/// What a backend sees while generating.
pub struct CompilerContext<'a> {
    analyses: &'a AnalysisManager,
    outputs: &'a OutputManager,
}

impl<'a> CompilerContext<'a> {
    /// Bundles the run's analysis cache and output table.
    pub fn new(analyses: &'a AnalysisManager, outputs: &'a OutputManager) -> Self {
        Self { analyses, outputs }
    }

    /// The shared analysis cache.
    pub fn analyses(&self) -> &'a AnalysisManager {
        self.analyses
    }

    /// The shared output table.
    pub fn outputs(&self) -> &'a OutputManager {
        self.outputs
    }

    /// The frozen declaration graph.
    pub fn package_group(&self) -> &'a PackageGroup {
        self.analyses.package_group()
    }
}

/// A single backend option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A boolean switch.
    Bool(bool),
    /// A string value.
    Str(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Options passed to one backend's factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendOptions {
    backend: String,
    values: BTreeMap<String, OptionValue>,
}

impl BackendOptions {
    /// Creates an empty option table for `backend`.
    pub fn new(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
            values: BTreeMap::new(),
        }
    }

    /// The backend these options belong to.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Sets an option, replacing any previous value.
    pub fn set(&mut self, key: &str, value: OptionValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Returns the raw value of an option.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Returns whether no option is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reads a boolean option, `false` when unset.
    pub fn flag(&self, key: &str) -> Result<bool, DriverError> {
        match self.values.get(key) {
            None => Ok(false),
            Some(OptionValue::Bool(b)) => Ok(*b),
            Some(other) => Err(self.invalid(key, format!("expected a boolean, found {other}"))),
        }
    }

    /// Reads a string option.
    pub fn string(&self, key: &str) -> Result<Option<&str>, DriverError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(OptionValue::Str(s)) => Ok(Some(s)),
            Some(other) => Err(self.invalid(key, format!("expected a string, found {other}"))),
        }
    }

    /// Fails on the first key not in `known`.
    pub fn expect_only(&self, known: &[&str]) -> Result<(), DriverError> {
        match self.values.keys().find(|k| !known.contains(&k.as_str())) {
            Some(key) => Err(self.invalid(key, "unrecognised option".to_string())),
            None => Ok(()),
        }
    }

    fn invalid(&self, key: &str, reason: String) -> DriverError {
        DriverError::InvalidOption {
            backend: self.backend.clone(),
            option: key.to_string(),
            reason,
        }
    }
}

type Factory = dyn Fn(&BackendOptions) -> Result<Box<dyn Backend>, CompileError>;

/// A registered backend: its name, the backends it requires, and how to
/// construct it.
pub struct BackendDescriptor {
    name: String,
    summary: String,
    requires: Vec<String>,
    factory: Box<Factory>,
}

impl BackendDescriptor {
    /// Creates a descriptor with no dependencies.
    pub fn new<F>(name: &str, factory: F) -> Self
    where
        F: Fn(&BackendOptions) -> Result<Box<dyn Backend>, CompileError> + 'static,
    {
        Self {
            name: name.to_string(),
            summary: String::new(),
            requires: Vec::new(),
            factory: Box::new(factory),
        }
    }

    /// Declares the backends that must run before this one, in order.
    pub fn requires(mut self, deps: &[&str]) -> Self {
        self.requires = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Sets the one-line description shown by `weave backends`.
    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    /// The backend name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The one-line description.
    pub fn description(&self) -> &str {
        &self.summary
    }

    /// The declared dependencies.
    pub fn dependencies(&self) -> &[String] {
        &self.requires
    }

    /// Builds a fresh backend instance.
    pub fn construct(&self, options: &BackendOptions) -> Result<Box<dyn Backend>, CompileError> {
        (self.factory)(options)
    }
}

impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop;

    impl Backend for Nop {
        fn generate(&mut self, _ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
            Ok(())
        }
    }

    #[test]
    fn descriptor_builder() {
        let d = BackendDescriptor::new("cpp-user", |_| Ok(Box::new(Nop)))
            .requires(&["cpp-common"])
            .summary("C++ user headers");
        assert_eq!(d.name(), "cpp-user");
        assert_eq!(d.dependencies(), ["cpp-common"]);
        assert_eq!(d.description(), "C++ user headers");
        assert!(d.construct(&BackendOptions::default()).is_ok());
        assert!(format!("{d:?}").contains("cpp-user"));
    }

    #[test]
    fn option_accessors() {
        let mut opts = BackendOptions::new("ani-bridge");
        opts.set("keep_name", OptionValue::Bool(true));
        opts.set("module", OptionValue::Str("geo".into()));
        assert_eq!(opts.flag("keep_name"), Ok(true));
        assert_eq!(opts.flag("missing"), Ok(false));
        assert_eq!(opts.string("module"), Ok(Some("geo")));
        assert!(matches!(
            opts.flag("module"),
            Err(DriverError::InvalidOption { option, .. }) if option == "module"
        ));
    }

    #[test]
    fn expect_only_rejects_unknown_keys() {
        let mut opts = BackendOptions::new("ani-bridge");
        opts.set("keep_nam", OptionValue::Bool(true));
        let err = opts.expect_only(&["keep_name"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "backend 'ani-bridge': invalid option 'keep_nam': unrecognised option"
        );
        assert!(BackendOptions::new("x").expect_only(&[]).is_ok());
    }
}
