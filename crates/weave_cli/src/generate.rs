//! `weave generate`: declaration files in, bindings out.
//!
//! 1. Load `weave.toml` (from `--config`, or the current directory if present)
//! 2. Merge command-line flags on top of it
//! 3. Load every declaration file under the include directories
//! 4. Run the requested backends and flush the output tree

use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::path::{Path, PathBuf};

use weave_codegen::default_registry;
use weave_config::{ConfigError, OptionSetting, ProjectConfig, CONFIG_FILE};
use weave_decl::load_dirs;
use weave_driver::{BackendOptions, CompilerInstance, CompilerOptions, OptionValue};

use crate::{GenerateArgs, GlobalArgs};

/// Backends every run starts with.
const ALWAYS: [&str; 2] = ["abi-header", "abi-source"];

/// A loaded configuration and the directory its relative paths resolve against.
struct Project {
    config: ProjectConfig,
    base: PathBuf,
}

/// Everything a run needs after flags and configuration are merged.
#[derive(Debug)]
struct Plan {
    include_dirs: Vec<PathBuf>,
    options: CompilerOptions,
}

/// Runs the `weave generate` command.
///
/// Returns exit code 0 on success; every failure is reported as an error.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let registry = default_registry()?;
    let project = load_project(global.config.as_deref(), Path::new("."))?;
    if let Some(project) = &project {
        let known: Vec<&str> = registry.descriptors().map(|d| d.name()).collect();
        project.config.check_backends(&known)?;
        if !global.quiet {
            eprintln!(
                "   Generating {} v{}",
                project.config.project.name, project.config.project.version
            );
        }
    }

    let plan = plan(args, project.as_ref())?;
    tracing::debug!(
        include = ?plan.include_dirs,
        backends = ?plan.options.backends,
        "merged command line and configuration"
    );
    let output_dir = plan
        .options
        .output_dir
        .clone()
        .ok_or("no output directory")?;
    if !global.quiet {
        eprintln!("    Backends {}", plan.options.backends.join(", "));
    }

    let package_group = load_dirs(&plan.include_dirs)?;
    if !global.quiet {
        eprintln!(
            "      Loaded {} packages from {} directories",
            package_group.packages().count(),
            plan.include_dirs.len()
        );
    }

    let mut instance = CompilerInstance::new(&registry, package_group, plan.options);
    let summary = instance.run()?;

    if !global.quiet {
        eprintln!(
            "    Finished {} files in {} ({} written, {} unchanged, {} removed)",
            summary.outputs,
            output_dir.display(),
            summary.files.written,
            summary.files.unchanged,
            summary.files.removed
        );
    }
    if global.verbose {
        eprintln!(
            "    Analyses {} computed, {} reused",
            summary.analyses.misses, summary.analyses.hits
        );
    }
    Ok(0)
}

/// Loads the explicit configuration file, or `weave.toml` in `cwd` if one exists.
fn load_project(explicit: Option<&str>, cwd: &Path) -> Result<Option<Project>, ConfigError> {
    match explicit {
        Some(path) => {
            let path = Path::new(path);
            let config = weave_config::load_config_file(path)?;
            let base = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => cwd.to_path_buf(),
            };
            Ok(Some(Project { config, base }))
        }
        None if cwd.join(CONFIG_FILE).is_file() => {
            let config = weave_config::load_config(cwd)?;
            Ok(Some(Project {
                config,
                base: cwd.to_path_buf(),
            }))
        }
        None => Ok(None),
    }
}

/// Merges the command line on top of the configuration.
///
/// Lists (include directories, backends) are appended to the configured
/// ones; the output directory on the command line replaces the configured one.
fn plan(args: &GenerateArgs, project: Option<&Project>) -> Result<Plan, Box<dyn Error>> {
    let mut include_dirs = project
        .map(|p| p.config.include_dirs(&p.base))
        .unwrap_or_default();
    include_dirs.extend(args.include.iter().map(PathBuf::from));
    if include_dirs.is_empty() {
        return Err("no declaration directories given (pass -I or set paths.include)".into());
    }

    let output_dir = match &args.output {
        Some(dir) => PathBuf::from(dir),
        None => project
            .and_then(|p| p.config.output_dir(&p.base))
            .ok_or("no output directory given (pass -O or set paths.output)")?,
    };

    let enabled = project
        .map(|p| p.config.backends.enable.as_slice())
        .unwrap_or_default();
    let configured = project.map(|p| &p.config.backends.options);

    Ok(Plan {
        include_dirs,
        options: CompilerOptions {
            backends: requested_backends(args, enabled),
            output_dir: Some(output_dir),
            backend_options: backend_options(args, configured),
        },
    })
}

/// Backend names in request order, without repeats.
fn requested_backends(args: &GenerateArgs, enabled: &[String]) -> Vec<String> {
    let flags = [
        (args.author, "cpp-author"),
        (args.user, "cpp-user"),
        (args.ani, "ani-bridge"),
        (args.c_impl, "c-impl"),
        (args.debug, "pretty-print"),
    ];
    let names = ALWAYS
        .iter()
        .copied()
        .chain(enabled.iter().map(String::as_str))
        .chain(flags.iter().filter(|(on, _)| *on).map(|(_, name)| *name))
        .chain(args.backends.iter().map(String::as_str));

    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// Per-backend options from the configuration, then from flags.
fn backend_options(
    args: &GenerateArgs,
    configured: Option<&BTreeMap<String, BTreeMap<String, OptionSetting>>>,
) -> HashMap<String, BackendOptions> {
    let mut out: HashMap<String, BackendOptions> = HashMap::new();
    for (backend, table) in configured.into_iter().flatten() {
        let opts = out
            .entry(backend.clone())
            .or_insert_with(|| BackendOptions::new(backend));
        for (key, setting) in table {
            opts.set(key, option_value(setting));
        }
    }
    if args.keep_name {
        out.entry("ani-bridge".to_string())
            .or_insert_with(|| BackendOptions::new("ani-bridge"))
            .set("keep_name", OptionValue::Bool(true));
    }
    out
}

fn option_value(setting: &OptionSetting) -> OptionValue {
    match setting {
        OptionSetting::Bool(b) => OptionValue::Bool(*b),
        OptionSetting::Str(s) => OptionValue::Str(s.clone()),
    }
}
