use std::collections::HashSet;
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{Commit, ErrorCode, ObjectType, Repository, Signature};
use tracing::{debug, info};

use super::{modules_to_label, VersionControl};
use crate::error::{BumpError, Result};
use crate::module::ProjectModule;

/// Git through libgit2.
///
/// Commits go to the current branch of the repository containing the
/// module; labels are lightweight tags on the resulting HEAD.
#[derive(Debug, Default, Clone)]
pub struct GitVersionControl {
    repository: Option<PathBuf>,
}

impl GitVersionControl {
    /// # Arguments
    /// * `repository` - Repository to use; discovered from each module's directory if `None`
    pub fn new(repository: Option<PathBuf>) -> Self {
        GitVersionControl { repository }
    }

    fn open(&self, module: &ProjectModule) -> Result<Repository> {
        let repo = match &self.repository {
            Some(path) => Repository::open(path),
            None => Repository::discover(module.directory()),
        };
        repo.map_err(|e| {
            BumpError::version_control(format!(
                "No git repository found for {}: {}",
                module.pom_file().display(),
                e.message()
            ))
        })
    }
}

impl VersionControl for GitVersionControl {
    fn name(&self) -> &'static str {
        "git"
    }

    fn commit(&mut self, module: &ProjectModule) -> Result<()> {
        let repo = self.open(module)?;
        let path = relative_to_workdir(&repo, module.pom_file())?;

        let mut index = repo.index()?;
        index.add_path(&path)?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let signature = repo
            .signature()
            .or_else(|_| Signature::now("pom-bump", "pom-bump@localhost"))?;
        let parent = head_commit(&repo)?;
        let parents: Vec<&Commit> = parent.iter().collect();

        let message = module.resolved_commit_message();
        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &message,
            &tree,
            &parents,
        )?;
        info!(commit = %oid, path = %path.display(), "committed");
        Ok(())
    }

    fn label(&mut self, modules: &[&ProjectModule]) -> Result<()> {
        let mut tagged: HashSet<(PathBuf, String)> = HashSet::new();

        for module in modules_to_label(modules) {
            let label = module.label().unwrap_or_default();
            let repo = self.open(module)?;
            let key = (repo.path().to_path_buf(), label.to_string());
            if !tagged.insert(key) {
                debug!(label, "tag already created in this batch");
                continue;
            }

            let head = repo.head()?.peel(ObjectType::Commit)?;
            repo.tag_lightweight(label, &head, true).map_err(|e| {
                BumpError::version_control(format!("Cannot create tag '{}': {}", label, e.message()))
            })?;
            info!(tag = label, "tagged HEAD");
        }
        Ok(())
    }

    fn restore(&mut self, modules: &[&ProjectModule]) -> Result<()> {
        for module in modules {
            let repo = self.open(module)?;
            let path = relative_to_workdir(&repo, module.pom_file())?;

            let mut checkout = CheckoutBuilder::new();
            checkout.force().path(path.as_path());
            repo.checkout_head(Some(&mut checkout))?;
            debug!(path = %path.display(), "restored from HEAD");
        }
        Ok(())
    }
}

/// Current HEAD commit, `None` on a branch without commits
fn head_commit(repo: &Repository) -> Result<Option<Commit<'_>>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn relative_to_workdir(repo: &Repository, file: &Path) -> Result<PathBuf> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| BumpError::version_control("Bare git repositories are not supported"))?;
    let workdir = workdir.canonicalize()?;
    let file = file.canonicalize()?;

    file.strip_prefix(&workdir)
        .map(Path::to_path_buf)
        .map_err(|_| {
            BumpError::version_control(format!(
                "{} is outside the git repository {}",
                file.display(),
                workdir.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const POM: &str = "<project>\n  <groupId>g</groupId>\n  <artifactId>core</artifactId>\n  <version>1.0</version>\n</project>\n";

    fn repo_with_module() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        fs::create_dir(dir.path().join("core")).unwrap();
        fs::write(dir.path().join("core/pom.xml"), POM).unwrap();
        (dir, repo)
    }

    fn head_message(repo: &Repository) -> String {
        repo.head()
            .unwrap()
            .peel_to_commit()
            .unwrap()
            .message()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_commit_on_unborn_branch_then_on_top() {
        let (dir, repo) = repo_with_module();
        let mut module = ProjectModule::load(dir.path(), "core").unwrap();
        let mut vcs = GitVersionControl::new(None);

        vcs.commit(&module).unwrap();
        assert_eq!(head_message(&repo), "Update g:core:1.0");

        module.set_version("1.1").unwrap();
        module.save_with(&mut vcs).unwrap();
        assert_eq!(head_message(&repo), "Bump 1.0 -> 1.1");

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.parent_count(), 1);
    }

    #[test]
    fn test_label_tags_head_once() {
        let (dir, repo) = repo_with_module();
        let mut module = ProjectModule::load(dir.path(), "core").unwrap();
        module.set_label("REL_1_0");
        let mut vcs = GitVersionControl::new(Some(dir.path().to_path_buf()));

        vcs.commit(&module).unwrap();
        vcs.label(&[&module, &module]).unwrap();

        let tags = repo.tag_names(None).unwrap();
        let tags: Vec<&str> = tags.iter().flatten().collect();
        assert_eq!(tags, vec!["REL_1_0"]);
    }

    #[test]
    fn test_restore_discards_written_change() {
        let (dir, _repo) = repo_with_module();
        let mut module = ProjectModule::load(dir.path(), "core").unwrap();
        let mut vcs = GitVersionControl::new(None);
        vcs.commit(&module).unwrap();

        module.set_version("9.9").unwrap();
        module.save().unwrap();
        vcs.restore(&[&module]).unwrap();

        let content = fs::read_to_string(dir.path().join("core/pom.xml")).unwrap();
        assert_eq!(content, POM);
    }

    #[test]
    fn test_missing_repository_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pom.xml"), POM).unwrap();
        let module = ProjectModule::load(dir.path(), "").unwrap();
        let mut vcs = GitVersionControl::new(Some(dir.path().join("nope")));

        let err = vcs.commit(&module).unwrap_err();
        assert!(err.to_string().contains("No git repository found"));
    }
}
