//! Run orchestration
//!
//! A [Session] holds every module a scenario names, keyed by id, together
//! with the version control backend that saving goes through. The binary
//! builds one from a scenario and then calls [Session::run] with the mode
//! picked on the command line.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{BumpError, Result};
use crate::module::{Artifact, Gav, ModuleRef, ProjectModule, ReadonlyModule, SnapshotFinding};
use crate::vcs::{distinct_labels, NoopVersionControl, VersionControl};
use crate::warning::RunWarning;

/// What a run does with the modules once the scenario is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Write, commit and label
    Normal,
    /// Validate only, nothing is written
    DryRun,
    /// Write but never commit or label
    PrepareTest,
    /// Back out uncommitted changes
    Revert,
}

impl RunMode {
    /// Pick the mode from command line flags; revert wins, then dry run
    pub fn from_flags(dry_run: bool, prepare_test: bool, revert: bool) -> Self {
        if revert {
            RunMode::Revert
        } else if dry_run {
            RunMode::DryRun
        } else if prepare_test {
            RunMode::PrepareTest
        } else {
            RunMode::Normal
        }
    }

    /// Modes that write pom.xml files
    pub fn writes(&self) -> bool {
        matches!(self, RunMode::Normal | RunMode::PrepareTest)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Normal => "normal",
            RunMode::DryRun => "dry run",
            RunMode::PrepareTest => "prepare test build",
            RunMode::Revert => "revert",
        };
        write!(f, "{}", name)
    }
}

/// Coordinates of a module before and after the scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bump {
    pub module: String,
    pub original: String,
    pub updated: String,
    pub label: Option<String>,
}

impl Bump {
    pub fn changed(&self) -> bool {
        self.original != self.updated
    }
}

/// Snapshot references left in one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSnapshots {
    pub module: String,
    pub findings: Vec<SnapshotFinding>,
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: RunMode,
    pub saved: usize,
    pub committed: usize,
    pub labels: Vec<String>,
    pub restored: usize,
}

impl RunSummary {
    fn new(mode: RunMode) -> Self {
        RunSummary {
            mode,
            saved: 0,
            committed: 0,
            labels: Vec::new(),
            restored: 0,
        }
    }
}

#[derive(Debug)]
struct Entry {
    id: String,
    module: ModuleRef,
    original: String,
}

/// Modules taking part in a run and the backend saving them
pub struct Session {
    base_dir: PathBuf,
    entries: Vec<Entry>,
    vcs: Box<dyn VersionControl>,
}

impl Session {
    /// Start a session without version control
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Session {
            base_dir: base_dir.into(),
            entries: Vec::new(),
            vcs: Box::new(NoopVersionControl),
        }
    }

    pub fn with_version_control(mut self, vcs: Box<dyn VersionControl>) -> Self {
        self.vcs = vcs;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn version_control(&self) -> &dyn VersionControl {
        self.vcs.as_ref()
    }

    /// Load the module in `path` below the base directory, using the path as its id
    pub fn load(&mut self, path: &str) -> Result<&mut ProjectModule> {
        self.load_as(path, path)
    }

    /// Load the module in `path` below the base directory under `id`
    pub fn load_as(&mut self, id: &str, path: &str) -> Result<&mut ProjectModule> {
        self.ensure_unused(id)?;
        let module = ProjectModule::load(&self.base_dir, path)?;
        info!(id, path, gav = %module.gav(), "loaded module");
        self.push(id, ModuleRef::Project(module))?.editable_mut()
    }

    /// Load a module and give it a version and label straight away
    pub fn load_module(
        &mut self,
        id: &str,
        path: &str,
        version: Option<&str>,
        label: Option<&str>,
    ) -> Result<&mut ProjectModule> {
        let module = self.load_as(id, path)?;
        if let Some(version) = version {
            module.set_version(version)?;
        }
        if let Some(label) = label {
            module.set_label(label);
        }
        Ok(module)
    }

    /// Register a module known only by its coordinates
    pub fn add_readonly(&mut self, id: &str, module: ReadonlyModule) -> Result<()> {
        self.ensure_unused(id)?;
        debug!(id, gav = %module.gav(), "added readonly module");
        self.push(id, ModuleRef::Readonly(module))?;
        Ok(())
    }

    fn ensure_unused(&self, id: &str) -> Result<()> {
        if self.entries.iter().any(|e| e.id == id) {
            return Err(BumpError::scenario(format!("module id '{}' is used twice", id)));
        }
        Ok(())
    }

    fn push(&mut self, id: &str, module: ModuleRef) -> Result<&mut ModuleRef> {
        let original = module.gav();
        self.entries.push(Entry {
            id: id.to_string(),
            module,
            original,
        });
        self.entries
            .last_mut()
            .map(|e| &mut e.module)
            .ok_or_else(|| BumpError::state("module list is empty after insert"))
    }

    pub fn find(&self, id: &str) -> Result<&ModuleRef> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.module)
            .ok_or_else(|| unknown(id))
    }

    /// Editable module by id; read-only modules refuse
    pub fn find_mut(&mut self, id: &str) -> Result<&mut ProjectModule> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| unknown(id))?
            .module
            .editable_mut()
    }

    /// Current coordinates of a module, copied so the referencing module can be edited
    fn coordinates(&self, id: &str) -> Result<Gav> {
        Gav::of(self.find(id)?.as_artifact())
    }

    /// Point `module_id`'s declared version of `dependency_id` at its current version
    pub fn update_dependency(&mut self, module_id: &str, dependency_id: &str) -> Result<()> {
        let target = self.coordinates(dependency_id)?;
        self.find_mut(module_id)?.update_dependency(&target)
    }

    pub fn update_plugin_dependency(&mut self, module_id: &str, plugin_id: &str) -> Result<()> {
        let target = self.coordinates(plugin_id)?;
        self.find_mut(module_id)?.update_plugin_dependency(&target)
    }

    /// Point `module_id`'s parent version at `parent_id`'s current version
    pub fn update_parent(&mut self, module_id: &str, parent_id: &str) -> Result<()> {
        let target = self.coordinates(parent_id)?;
        self.find_mut(module_id)?.set_parent_version_from(&target)
    }

    /// Editable modules in load order
    pub fn modules(&self) -> Vec<&ProjectModule> {
        editable(&self.entries)
    }

    /// Modules registered by coordinates only, in registration order
    pub fn readonly_modules(&self) -> Vec<&ReadonlyModule> {
        self.entries
            .iter()
            .filter_map(|e| match &e.module {
                ModuleRef::Readonly(module) => Some(module),
                ModuleRef::Project(_) => None,
            })
            .collect()
    }

    /// Before/after coordinates of each editable module
    pub fn bumps(&self) -> Vec<Bump> {
        self.entries
            .iter()
            .filter_map(|e| {
                let module = e.module.editable().ok()?;
                Some(Bump {
                    module: e.id.clone(),
                    original: e.original.clone(),
                    updated: module.gav(),
                    label: module.label().filter(|l| !l.is_empty()).map(String::from),
                })
            })
            .collect()
    }

    /// Modules that still reference snapshot versions
    pub fn snapshot_report(&self) -> Vec<ModuleSnapshots> {
        self.entries
            .iter()
            .filter_map(|e| {
                let findings = e.module.editable().ok()?.find_snapshots();
                (!findings.is_empty()).then(|| ModuleSnapshots {
                    module: e.id.clone(),
                    findings,
                })
            })
            .collect()
    }

    /// Non-fatal problems with the run as set up
    pub fn warnings(&self, include_snapshots: bool) -> Vec<RunWarning> {
        let mut warnings = Vec::new();
        let modules = self.modules();

        if modules.is_empty() {
            warnings.push(RunWarning::NoModulesLoaded);
        }

        let labels = distinct_labels(&modules);
        if self.vcs.is_noop() && !labels.is_empty() {
            warnings.push(RunWarning::LabelsWithoutVersionControl { labels });
        }

        if include_snapshots {
            warnings.extend(self.snapshot_report().into_iter().map(|report| {
                RunWarning::SnapshotsFound {
                    module: report.module,
                    count: report.findings.len(),
                }
            }));
        }
        warnings
    }

    /// Prepare and write every editable module
    pub fn save_all(&mut self) -> Result<usize> {
        let modules = editable(&self.entries);
        for module in &modules {
            self.vcs.prepare_save(module)?;
            module.save()?;
            debug!(module = %module, "saved");
        }
        Ok(modules.len())
    }

    /// Commit every editable module, then apply labels once for the batch.
    ///
    /// Does nothing without version control.
    pub fn commit_all(&mut self) -> Result<(usize, Vec<String>)> {
        if self.vcs.is_noop() {
            warn!("no version control configured, skipping commit");
            return Ok((0, Vec::new()));
        }
        let modules = editable(&self.entries);
        self.vcs.commit_all(&modules)?;
        self.vcs.label(&modules)?;
        info!(vcs = self.vcs.name(), count = modules.len(), "committed");
        Ok((modules.len(), distinct_labels(&modules)))
    }

    /// Back out uncommitted changes to every editable module
    pub fn restore_all(&mut self) -> Result<usize> {
        if self.vcs.is_noop() {
            return Err(BumpError::config(
                "Reverting needs a version control backend",
            ));
        }
        let modules = editable(&self.entries);
        self.vcs.restore(&modules)?;
        Ok(modules.len())
    }

    pub fn run(&mut self, mode: RunMode) -> Result<RunSummary> {
        info!(%mode, vcs = self.vcs.name(), "running");
        let mut summary = RunSummary::new(mode);

        match mode {
            RunMode::DryRun => {}
            RunMode::PrepareTest => {
                summary.saved = self.save_all()?;
            }
            RunMode::Normal => {
                summary.saved = self.save_all()?;
                let (committed, labels) = self.commit_all()?;
                summary.committed = committed;
                summary.labels = labels;
            }
            RunMode::Revert => {
                summary.restored = self.restore_all()?;
            }
        }
        Ok(summary)
    }
}

fn editable(entries: &[Entry]) -> Vec<&ProjectModule> {
    entries
        .iter()
        .filter_map(|e| e.module.editable().ok())
        .collect()
}

fn unknown(id: &str) -> BumpError {
    BumpError::scenario(format!("no module with id '{}'", id))
}
