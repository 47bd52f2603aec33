//! Version control lifecycle
//!
//! Saving a batch of modules runs through four hooks:
//!
//! 1. [VersionControl::prepare_save] before a pom.xml is written
//! 2. [VersionControl::commit] after it is written
//! 3. [VersionControl::label] once per batch, after every commit
//! 4. [VersionControl::restore] to back out uncommitted changes instead
//!
//! Implementations:
//!
//! - [NoopVersionControl]: plain saving to disk
//! - [git::GitVersionControl]: Git through libgit2
//! - [subversion::Subversion] and [clearcase::ClearCase]: external binaries run
//!   through a [command::CommandRunner]

pub mod clearcase;
pub mod command;
pub mod git;
pub mod mock;
pub mod subversion;

pub use clearcase::ClearCase;
pub use command::{CommandLine, CommandRunner, ProcessRunner};
pub use git::GitVersionControl;
pub use mock::RecordingRunner;
pub use subversion::Subversion;

use std::path::Path;
use std::time::Duration;

use crate::config::{Config, VersionControlKind};
use crate::error::{BumpError, Result};
use crate::module::ProjectModule;

/// Hooks a version control backend provides around saving modules
pub trait VersionControl {
    /// Short name for messages, e.g. "git"
    fn name(&self) -> &'static str;

    /// True for the backend that does nothing
    fn is_noop(&self) -> bool {
        false
    }

    /// Called before the module's pom.xml is written.
    ///
    /// Calling it again for a module that has not been committed yet must
    /// not prepare it twice.
    fn prepare_save(&mut self, _module: &ProjectModule) -> Result<()> {
        Ok(())
    }

    /// Commit the written pom.xml with the module's resolved commit message
    fn commit(&mut self, module: &ProjectModule) -> Result<()>;

    fn commit_all(&mut self, modules: &[&ProjectModule]) -> Result<()> {
        for module in modules {
            self.commit(module)?;
        }
        Ok(())
    }

    /// Apply the pending labels of a committed batch.
    ///
    /// Modules without a label are skipped; each distinct label is created
    /// once before it is applied.
    fn label(&mut self, modules: &[&ProjectModule]) -> Result<()>;

    /// Revert uncommitted changes; labels already applied stay
    fn restore(&mut self, modules: &[&ProjectModule]) -> Result<()>;
}

/// Backend used when no version control is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVersionControl;

impl VersionControl for NoopVersionControl {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_noop(&self) -> bool {
        true
    }

    fn commit(&mut self, _module: &ProjectModule) -> Result<()> {
        Ok(())
    }

    fn label(&mut self, _modules: &[&ProjectModule]) -> Result<()> {
        Ok(())
    }

    fn restore(&mut self, _modules: &[&ProjectModule]) -> Result<()> {
        Ok(())
    }
}

/// Modules carrying a non-empty label, in batch order
pub fn modules_to_label<'a>(modules: &[&'a ProjectModule]) -> Vec<&'a ProjectModule> {
    modules.iter().copied().filter(|m| m.has_label()).collect()
}

/// Each label used in the batch once, in order of first use
pub fn distinct_labels(modules: &[&ProjectModule]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in modules.iter().filter_map(|m| m.label()) {
        if !label.is_empty() && !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels
}

/// Build the backend selected by the configuration
pub fn from_config(config: &Config) -> Result<Box<dyn VersionControl>> {
    let timeout = Duration::from_secs(config.version_control.command_timeout_secs);

    match config.version_control.kind {
        VersionControlKind::None => Ok(Box::new(NoopVersionControl)),
        VersionControlKind::Git => Ok(Box::new(GitVersionControl::new(
            config.git.repository.clone(),
        ))),
        VersionControlKind::Subversion => {
            let svn = &config.subversion;
            Ok(Box::new(
                Subversion::new(
                    executable_name(&svn.command),
                    svn.tags_base.clone(),
                    svn.alternate_repository_base.clone(),
                    ProcessRunner,
                )
                .with_timeout(timeout),
            ))
        }
        VersionControlKind::Clearcase => {
            let command = config.clearcase.command.as_deref().ok_or_else(|| {
                BumpError::config("No clearcase.command defined for the cleartool executable")
            })?;
            if !Path::new(command).exists() {
                return Err(BumpError::config(format!(
                    "clearcase.command {} doesn't exist",
                    command
                )));
            }
            Ok(Box::new(
                ClearCase::new(
                    command,
                    Duration::from_secs(config.clearcase.label_timeout_secs),
                    ProcessRunner,
                )
                .with_timeout(timeout),
            ))
        }
    }
}

/// Windows needs the `.exe` suffix spelled out
fn executable_name(command: &str) -> String {
    if cfg!(windows) && !command.to_lowercase().ends_with(".exe") {
        format!("{}.exe", command)
    } else {
        command.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pom::PomDocument;

    fn module(name: &str, label: Option<&str>) -> ProjectModule {
        let doc = PomDocument::parse(
            format!("{}/pom.xml", name),
            &format!(
                "<project><groupId>g</groupId><artifactId>{}</artifactId><version>1</version></project>",
                name
            ),
        )
        .unwrap();
        let mut module = ProjectModule::from_document(doc, name);
        if let Some(label) = label {
            module.set_label(label);
        }
        module
    }

    #[test]
    fn test_modules_to_label_skips_unlabeled() {
        let a = module("a", Some("REL_1"));
        let b = module("b", None);
        let c = module("c", Some(""));
        let labeled = modules_to_label(&[&a, &b, &c]);
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].name(), "a");
    }

    #[test]
    fn test_distinct_labels_keeps_first_use_order() {
        let a = module("a", Some("REL_2"));
        let b = module("b", Some("REL_1"));
        let c = module("c", Some("REL_2"));
        let d = module("d", None);
        assert_eq!(distinct_labels(&[&a, &b, &c, &d]), vec!["REL_2", "REL_1"]);
    }

    #[test]
    fn test_noop_accepts_everything() {
        let a = module("a", Some("REL_1"));
        let mut vcs = NoopVersionControl;
        assert!(vcs.is_noop());
        vcs.prepare_save(&a).unwrap();
        vcs.commit_all(&[&a]).unwrap();
        vcs.label(&[&a]).unwrap();
        vcs.restore(&[&a]).unwrap();
    }

    #[test]
    fn test_from_config_defaults_to_noop() {
        let vcs = from_config(&Config::default()).unwrap();
        assert!(vcs.is_noop());
        assert_eq!(vcs.name(), "none");
    }

    #[test]
    fn test_from_config_clearcase_needs_command() {
        let mut config = Config::default();
        config.version_control.kind = VersionControlKind::Clearcase;
        let err = from_config(&config).err().unwrap();
        assert!(err.to_string().contains("clearcase.command"));

        config.clearcase.command = Some("/nonexistent/cleartool".to_string());
        let err = from_config(&config).err().unwrap();
        assert!(err.to_string().contains("doesn't exist"));
    }

    #[test]
    fn test_from_config_builds_named_backends() {
        let mut config = Config::default();
        config.version_control.kind = VersionControlKind::Git;
        assert_eq!(from_config(&config).unwrap().name(), "git");

        config.version_control.kind = VersionControlKind::Subversion;
        assert_eq!(from_config(&config).unwrap().name(), "subversion");
    }
}
