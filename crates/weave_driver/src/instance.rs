//! One compiler run: resolve, construct, inject, generate, flush.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use weave_analysis::{AnalysisManager, CacheStats};
use weave_common::InternalError;
use weave_decl::PackageGroup;
use weave_output::{FlushReport, OutputManager};

use crate::backend::{Backend, BackendOptions, CompilerContext};
use crate::error::{CompileError, DriverError};
use crate::registry::BackendRegistry;

/// Where a [`CompilerInstance`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerState {
    /// Created, not yet run.
    Idle,
    /// The execution plan is known.
    BackendsResolved,
    /// Every backend of the plan has been constructed.
    BackendsConstructed,
    /// Every backend has injected its synthetic declarations.
    Injected,
    /// Every backend has generated its files.
    Generated,
    /// Outputs are flushed and the manifest saved.
    Done,
    /// A step failed; the instance cannot be reused.
    Failed,
}

impl fmt::Display for CompilerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What to run and where to put the results.
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Backend names to run, in request order.
    pub backends: Vec<String>,
    /// Output root. `None` keeps every file in memory.
    pub output_dir: Option<PathBuf>,
    /// Options keyed by backend name.
    pub backend_options: HashMap<String, BackendOptions>,
}

/// Result of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Backends in the order they ran.
    pub backends: Vec<String>,
    /// Number of output files produced.
    pub outputs: usize,
    /// What happened on disk.
    pub files: FlushReport,
    /// Analysis cache counters at the end of the run.
    pub analyses: CacheStats,
}

/// Drives one compilation over a declaration graph.
pub struct CompilerInstance<'r> {
    registry: &'r BackendRegistry,
    options: CompilerOptions,
    package_group: Option<PackageGroup>,
    outputs: OutputManager,
    analyses: Option<AnalysisManager>,
    state: CompilerState,
}

impl<'r> CompilerInstance<'r> {
    /// Prepares a run. Nothing happens until [`run`](Self::run).
    pub fn new(
        registry: &'r BackendRegistry,
        package_group: PackageGroup,
        options: CompilerOptions,
    ) -> Self {
        Self {
            registry,
            options,
            package_group: Some(package_group),
            outputs: OutputManager::new(),
            analyses: None,
            state: CompilerState::Idle,
        }
    }

    /// The current state.
    pub fn state(&self) -> CompilerState {
        self.state
    }

    /// Every file committed so far, including those of a failed run.
    pub fn outputs(&self) -> &OutputManager {
        &self.outputs
    }

    /// The analysis cache, once generation has started.
    pub fn analyses(&self) -> Option<&AnalysisManager> {
        self.analyses.as_ref()
    }

    /// Runs every phase. An instance runs at most once.
    pub fn run(&mut self) -> Result<RunSummary, CompileError> {
        if self.state != CompilerState::Idle {
            return Err(DriverError::NotIdle(self.state).into());
        }
        let result = self.run_phases();
        if let Err(e) = &result {
            tracing::error!(state = %self.state, error = %e, "compilation failed");
            self.state = CompilerState::Failed;
        }
        result
    }

    fn run_phases(&mut self) -> Result<RunSummary, CompileError> {
        let registry = self.registry;
        let mut configured: Vec<&String> = self.options.backend_options.keys().collect();
        configured.sort();
        if let Some(unknown) = configured.into_iter().find(|name| registry.get(name).is_none()) {
            return Err(DriverError::OptionsForUnknownBackend(unknown.clone()).into());
        }
        let plan = registry.collect_required_backends(&self.options.backends)?;
        let names: Vec<String> = plan.iter().map(|d| d.name().to_string()).collect();
        tracing::info!(backends = ?names, "resolved backends");
        self.state = CompilerState::BackendsResolved;

        let mut backends: Vec<(&str, Box<dyn Backend>)> = Vec::with_capacity(plan.len());
        for descriptor in &plan {
            let options = self
                .options
                .backend_options
                .get(descriptor.name())
                .cloned()
                .unwrap_or_else(|| BackendOptions::new(descriptor.name()));
            backends.push((descriptor.name(), descriptor.construct(&options)?));
        }
        self.state = CompilerState::BackendsConstructed;

        let mut pg = self
            .package_group
            .take()
            .ok_or_else(|| InternalError::new("declaration graph was already consumed"))?;
        for (name, backend) in &mut backends {
            let before = pg.package_count();
            backend.inject(&mut pg)?;
            tracing::debug!(
                backend = %name,
                injected = pg.package_count() - before,
                "injected declarations"
            );
        }
        self.state = CompilerState::Injected;

        let mut summary = RunSummary {
            backends: names,
            ..RunSummary::default()
        };
        let analyses = AnalysisManager::new(Rc::new(pg));
        for (name, backend) in &mut backends {
            tracing::info!(backend = %name, "generating");
            let ctx = CompilerContext::new(&analyses, &self.outputs);
            backend.generate(&ctx).map_err(|e| match e {
                CompileError::Internal(bug) => CompileError::Internal(bug.in_backend(name)),
                other => other,
            })?;
            if let Some(dst) = &self.options.output_dir {
                summary.files.merge(self.outputs.flush(dst)?);
            }
        }
        self.state = CompilerState::Generated;

        if let Some(dst) = &self.options.output_dir {
            summary.files.merge(self.outputs.finish(dst)?);
        }
        summary.outputs = self.outputs.len();
        summary.analyses = analyses.stats();
        tracing::debug!(
            hits = summary.analyses.hits,
            misses = summary.analyses.misses,
            entries = summary.analyses.entries,
            "analysis cache statistics"
        );
        tracing::info!(
            outputs = summary.outputs,
            written = summary.files.written,
            unchanged = summary.files.unchanged,
            removed = summary.files.removed,
            "compilation finished"
        );
        self.analyses = Some(analyses);
        self.state = CompilerState::Done;
        Ok(summary)
    }
}
