use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use super::command::{CommandLine, CommandRunner, DEFAULT_COMMAND_TIMEOUT};
use super::{distinct_labels, modules_to_label, VersionControl};
use crate::error::Result;
use crate::module::ProjectModule;

/// Default time allowed for a single `mklabel`, which may walk a whole tree
pub const DEFAULT_LABEL_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// ClearCase through `cleartool`.
///
/// A pom.xml is checked out before it is written and checked in on commit.
pub struct ClearCase<R: CommandRunner> {
    cleartool: String,
    timeout: Duration,
    label_timeout: Duration,
    checked_out: HashSet<PathBuf>,
    runner: R,
}

impl<R: CommandRunner> ClearCase<R> {
    pub fn new(cleartool: impl Into<String>, label_timeout: Duration, runner: R) -> Self {
        ClearCase {
            cleartool: cleartool.into(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
            label_timeout,
            checked_out: HashSet::new(),
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

    fn cleartool(&self) -> CommandLine {
        CommandLine::new(&self.cleartool)
    }

    fn run(&mut self, command: CommandLine, timeout: Duration) -> Result<String> {
        self.runner.run(&command, timeout)
    }
}

impl<R: CommandRunner> VersionControl for ClearCase<R> {
    fn name(&self) -> &'static str {
        "clearcase"
    }

    fn prepare_save(&mut self, module: &ProjectModule) -> Result<()> {
        let pom = module.pom_file().to_path_buf();
        if self.checked_out.contains(&pom) {
            debug!(pom = %pom.display(), "already checked out");
            return Ok(());
        }
        let checkout = self
            .cleartool()
            .arg("checkout")
            .arg("-nc")
            .arg(pom.display().to_string());
        self.run(checkout, self.timeout)?;
        self.checked_out.insert(pom);
        Ok(())
    }

    fn commit(&mut self, module: &ProjectModule) -> Result<()> {
        let pom = module.pom_file().to_path_buf();
        let checkin = self
            .cleartool()
            .arg("checkin")
            .arg("-c")
            .arg(module.resolved_commit_message())
            .arg(pom.display().to_string());
        self.run(checkin, self.timeout)?;
        self.checked_out.remove(&pom);
        Ok(())
    }

    fn label(&mut self, modules: &[&ProjectModule]) -> Result<()> {
        for label in distinct_labels(modules) {
            let create = self.cleartool().arg("mklbtype").arg("-nc").arg(label);
            self.run(create, self.timeout)?;
        }

        for module in modules_to_label(modules) {
            let label = module.label().unwrap_or_default();
            let mut apply = self.cleartool().arg("mklabel");
            if !module.label_only_pom_xml() {
                apply = apply.arg("-recurse");
            }
            apply = apply.arg("-replace").arg("-nc").arg(label);
            if module.label_only_pom_xml() {
                apply = apply
                    .arg(module.pom_file().display().to_string())
                    .arg(module.directory().display().to_string());
            } else {
                apply = apply.arg(module.directory().display().to_string());
            }
            self.run(apply, self.label_timeout)?;
        }
        Ok(())
    }

    fn restore(&mut self, modules: &[&ProjectModule]) -> Result<()> {
        for module in modules {
            let pom = module.pom_file().to_path_buf();
            let uncheckout = self
                .cleartool()
                .arg("uncheckout")
                .arg("-rm")
                .arg(pom.display().to_string());
            self.run(uncheckout, self.timeout)?;
            self.checked_out.remove(&pom);
        }
        Ok(())
    }
}
