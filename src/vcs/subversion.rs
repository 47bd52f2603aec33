use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use super::command::{CommandLine, CommandRunner, DEFAULT_COMMAND_TIMEOUT};
use super::{modules_to_label, VersionControl};
use crate::error::{BumpError, Result};
use crate::module::{Artifact, ProjectModule};

/// Subversion through the `svn` command line client.
///
/// Labels are copies of the module directory below `<repository root>/<tags base>`.
pub struct Subversion<R: CommandRunner> {
    command: String,
    tags_base: String,
    alternate_repository_base: Option<String>,
    timeout: Duration,
    runner: R,
}

impl<R: CommandRunner> Subversion<R> {
    /// # Arguments
    /// * `command` - The svn executable
    /// * `tags_base` - Directory below the repository root that holds tags
    /// * `alternate_repository_base` - Copy this path below the repository root
    ///   instead of the module directory when labeling
    /// * `runner` - Runs the svn commands
    pub fn new(
        command: impl Into<String>,
        tags_base: impl Into<String>,
        alternate_repository_base: Option<String>,
        runner: R,
    ) -> Self {
        Subversion {
            command: command.into(),
            tags_base: tags_base.into(),
            alternate_repository_base,
            timeout: DEFAULT_COMMAND_TIMEOUT,
            runner,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn svn(&self) -> CommandLine {
        CommandLine::new(&self.command)
    }

    fn run(&mut self, command: CommandLine) -> Result<String> {
        self.runner.run(&command, self.timeout)
    }

    fn repository_root(&mut self, module: &ProjectModule) -> Result<String> {
        let info = self.svn().arg("info").arg(module.pom_file().display().to_string());
        let output = self.run(info)?;
        parse_repository_root(&output).ok_or_else(|| {
            BumpError::version_control(format!(
                "No repository URL could be found for: {}",
                module.gav()
            ))
        })
    }
}

impl<R: CommandRunner> VersionControl for Subversion<R> {
    fn name(&self) -> &'static str {
        "subversion"
    }

    fn commit(&mut self, module: &ProjectModule) -> Result<()> {
        let commit = self
            .svn()
            .arg("commit")
            .arg("-m")
            .arg(module.resolved_commit_message())
            .arg(module.pom_file().display().to_string());
        self.run(commit)?;
        Ok(())
    }

    fn label(&mut self, modules: &[&ProjectModule]) -> Result<()> {
        let mut copied: HashSet<(String, String)> = HashSet::new();

        for module in modules_to_label(modules) {
            let label = module.label().unwrap_or_default().to_string();
            let root = self.repository_root(module)?;
            let source = match &self.alternate_repository_base {
                Some(base) => format!("{}/{}", root, base),
                None => module.directory().display().to_string(),
            };
            let destination = format!("{}/{}/{}", root, self.tags_base, label);

            if !copied.insert((label.clone(), source.clone())) {
                debug!(%label, %source, "already copied in this batch");
                continue;
            }

            let copy = self
                .svn()
                .arg("copy")
                .arg("-m")
                .arg("")
                .arg(source)
                .arg(destination);
            self.run(copy)?;
        }
        Ok(())
    }

    fn restore(&mut self, modules: &[&ProjectModule]) -> Result<()> {
        for module in modules {
            let revert = self
                .svn()
                .arg("revert")
                .arg(module.pom_file().display().to_string());
            self.run(revert)?;
        }
        Ok(())
    }
}

/// `Repository Root:` line of `svn info` output
fn parse_repository_root(info: &str) -> Option<String> {
    let pattern = Regex::new(r"(?m)^Repository Root: (\S+)").ok()?;
    pattern.captures(info).map(|c| c[1].to_string())
}
