use std::fmt;
use std::path::Path;

use tracing::debug;

use super::snapshot::{is_snapshot, SnapshotFinding, SnapshotKind};
use super::Artifact;
use crate::error::{BumpError, Result};
use crate::pom::{Element, PomDocument};
use crate::vcs::VersionControl;

const DEPENDENCY_LISTS: [&[&str]; 2] = [&["dependencyManagement", "dependencies"], &["dependencies"]];
const PLUGIN_LISTS: [&[&str]; 2] = [&["build", "pluginManagement", "plugins"], &["build", "plugins"]];

/// Kind of versioned reference a module can hold to another module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reference {
    Dependency,
    Plugin,
}

impl Reference {
    /// Lists to search, management block first
    fn lists(self) -> [&'static [&'static str]; 2] {
        match self {
            Reference::Dependency => DEPENDENCY_LISTS,
            Reference::Plugin => PLUGIN_LISTS,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Reference::Dependency => "dependency",
            Reference::Plugin => "plugin dependency",
        }
    }

    fn management(self) -> &'static str {
        match self {
            Reference::Dependency => "dependencyManagement",
            Reference::Plugin => "pluginManagement",
        }
    }
}

/// A Maven module backed by a pom.xml that may be edited and saved.
///
/// Holds the pending label and commit message that version control uses
/// once the module has been written.
#[derive(Debug)]
pub struct ProjectModule {
    document: PomDocument,
    name: String,
    original_version: Option<String>,
    label: Option<String>,
    commit_message: Option<String>,
    label_only_pom_xml: bool,
}

impl ProjectModule {
    /// Load the module in directory `name` below `base_dir`.
    ///
    /// # Arguments
    /// * `base_dir` - Base directory of the module tree
    /// * `name` - Module directory relative to `base_dir`; empty for `base_dir` itself
    ///
    /// # Returns
    /// * `Ok(ProjectModule)` - The loaded module
    /// * `Err` - If a directory is missing or the pom.xml cannot be parsed
    pub fn load(base_dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let document = PomDocument::load(base_dir, name)?;
        Ok(Self::from_document(document, name))
    }

    /// Wrap an already parsed descriptor
    pub fn from_document(document: PomDocument, name: impl Into<String>) -> Self {
        let original_version = document.child_text(&["version"]);
        ProjectModule {
            document,
            name: name.into(),
            original_version,
            label: None,
            commit_message: None,
            label_only_pom_xml: false,
        }
    }

    /// Symbolic module name, the directory it was loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &PomDocument {
        &self.document
    }

    pub fn pom_file(&self) -> &Path {
        self.document.path()
    }

    /// Directory containing the pom.xml
    pub fn directory(&self) -> &Path {
        self.pom_file().parent().unwrap_or_else(|| Path::new("."))
    }

    /// Version declared by the module itself when it was loaded
    pub fn original_version(&self) -> Option<&str> {
        self.original_version.as_deref()
    }

    fn own_or_parent(&self, item: &str) -> Option<String> {
        self.document
            .child_text(&[item])
            .or_else(|| self.document.child_text(&["parent", item]))
    }

    pub fn set_group_id(&mut self, group_id: &str) -> Result<()> {
        self.set_own("groupId", group_id)
    }

    pub fn set_artifact_id(&mut self, artifact_id: &str) -> Result<()> {
        self.set_own("artifactId", artifact_id)
    }

    /// Set the module's own version.
    ///
    /// The first call also picks a default commit message describing the
    /// bump, unless a message was already set.
    pub fn set_version(&mut self, version: &str) -> Result<()> {
        let original = self.original_version.clone().ok_or_else(|| {
            BumpError::state(format!(
                "{} can't be given a version since it has no version of its own",
                self.gav()
            ))
        })?;
        self.set_own("version", version)?;
        if self.commit_message.is_none() {
            self.commit_message = Some(format!("Bump {} -> {}", original, version));
        }
        Ok(())
    }

    fn set_own(&mut self, item: &str, value: &str) -> Result<()> {
        if self.document.element(&[item]).is_none() {
            return Err(BumpError::state(format!(
                "{} has no {} of its own",
                self.gav(),
                item
            )));
        }
        debug!(module = %self.name, item, value, "setting own value");
        self.document.set_child_text(&[item], value)
    }

    /// Version of the parent block, `None` without a parent
    pub fn parent_version(&self) -> Option<String> {
        self.document.child_text(&["parent", "version"])
    }

    pub fn set_parent_version(&mut self, version: &str) -> Result<()> {
        let parent = self.document.element(&["parent"]).ok_or_else(|| {
            BumpError::argument(format!("no parent defined in module {}", self.gav()))
        })?;
        if parent.child("version").is_none() {
            return Err(BumpError::state(format!(
                "no version defined for the parent of {}",
                self.gav()
            )));
        }
        debug!(module = %self.name, version, "setting parent version");
        self.document.set_child_text(&["parent", "version"], version)
    }

    /// Point the parent version at `parent`'s current version.
    ///
    /// The existing parent block must name `parent` by groupId and artifactId.
    pub fn set_parent_version_from(&mut self, parent: &dyn Artifact) -> Result<()> {
        let existing = self.document.element(&["parent"]).ok_or_else(|| {
            BumpError::argument(format!(
                "no parent in module {}, can't update version",
                self.gav()
            ))
        })?;
        let same_group = existing.child_text("groupId") == parent.group_id();
        let same_artifact = existing.child_text("artifactId") == parent.artifact_id();
        if !(same_group && same_artifact) {
            return Err(BumpError::argument(format!(
                "no such parent in {}: {}",
                self.gav(),
                parent.gav()
            )));
        }
        let version = parent.version().ok_or_else(|| {
            BumpError::argument(format!("parent {} has no version", parent.gav()))
        })?;
        self.set_parent_version(&version)
    }

    /// Update the version this module declares for `dependency`.
    ///
    /// Looks in `dependencyManagement` before `dependencies`. A version given
    /// as `${name}` is updated through the `name` property instead.
    pub fn update_dependency(&mut self, dependency: &dyn Artifact) -> Result<()> {
        self.update_reference(dependency, Reference::Dependency)
    }

    /// Update the version this module declares for the plugin `plugin`.
    ///
    /// Looks in `build/pluginManagement` before `build/plugins`.
    pub fn update_plugin_dependency(&mut self, plugin: &dyn Artifact) -> Result<()> {
        self.update_reference(plugin, Reference::Plugin)
    }

    fn update_reference(&mut self, target: &dyn Artifact, kind: Reference) -> Result<()> {
        let new_version = target.version().ok_or_else(|| {
            BumpError::argument(format!("{} {} has no version", kind.describe(), target.gav()))
        })?;
        let (list, index) = self.find_reference(target, kind).ok_or_else(|| {
            BumpError::argument(format!(
                "no such {} found in {}: {}",
                kind.describe(),
                self.gav(),
                target.gav()
            ))
        })?;

        let entry_version = self
            .document
            .element(list)
            .and_then(|l| l.elements().nth(index))
            .and_then(|entry| entry.child_text("version"))
            .ok_or_else(|| {
                BumpError::argument(format!(
                    "in {}, no version defined for {}, probably defined elsewhere in a {}",
                    self.gav(),
                    target.gav(),
                    kind.management()
                ))
            })?;

        if let Some(property) = property_placeholder(&entry_version) {
            debug!(module = %self.name, property, "version given by property");
            return self.update_property(property, &new_version);
        }

        let entry = self
            .document
            .element_mut(list)
            .and_then(|l| l.elements_mut().nth(index))
            .and_then(|entry| entry.child_mut("version"));
        if let Some(version) = entry {
            version.set_text(&new_version);
        }
        debug!(
            module = %self.name,
            target = %target.gav(),
            "updated {}",
            kind.describe()
        );
        Ok(())
    }

    /// Locate the first entry naming `target`: the list path and the entry's index in it
    fn find_reference(
        &self,
        target: &dyn Artifact,
        kind: Reference,
    ) -> Option<(&'static [&'static str], usize)> {
        let group_id = target.group_id()?;
        let artifact_id = target.artifact_id()?;

        kind.lists().into_iter().find_map(|list| {
            self.document
                .children(list)
                .iter()
                .position(|entry| {
                    entry.child_text("groupId").as_deref() == Some(group_id.as_str())
                        && entry.child_text("artifactId").as_deref() == Some(artifact_id.as_str())
                })
                .map(|index| (list, index))
        })
    }

    /// Set the value of an existing property
    pub fn update_property(&mut self, name: &str, value: &str) -> Result<()> {
        let properties = self.document.element(&["properties"]).ok_or_else(|| {
            BumpError::argument(format!("no properties defined in module {}", self.gav()))
        })?;
        if properties.child(name).is_none() {
            return Err(BumpError::argument(format!(
                "no property {} defined in module {}",
                name,
                self.gav()
            )));
        }
        debug!(module = %self.name, property = name, value, "updating property");
        self.document.set_child_text(&["properties", name], value)
    }

    /// Every `-SNAPSHOT` value in the descriptor.
    ///
    /// Reported in order: module version (own or inherited), parent version,
    /// properties, dependencies, managed dependencies, plugins, managed plugins.
    pub fn find_snapshots(&self) -> Vec<SnapshotFinding> {
        let mut findings = Vec::new();

        if let Some(version) = Artifact::version(self).filter(|v| is_snapshot(v)) {
            findings.push(SnapshotFinding::new(SnapshotKind::ModuleVersion, version));
        }

        if let Some(version) = self.parent_version().filter(|v| is_snapshot(v)) {
            findings.push(SnapshotFinding::new(SnapshotKind::ParentVersion, version));
        }

        for property in self.document.children(&["properties"]) {
            let value = property.text();
            if is_snapshot(&value) {
                findings.push(SnapshotFinding::new(
                    SnapshotKind::Property,
                    format!("{}:{}", property.local_name(), value),
                ));
            }
        }

        let entry_lists: [(SnapshotKind, &[&str]); 4] = [
            (SnapshotKind::Dependency, &["dependencies"]),
            (SnapshotKind::DependencyManagement, &["dependencyManagement", "dependencies"]),
            (SnapshotKind::Plugin, &["build", "plugins"]),
            (SnapshotKind::PluginManagement, &["build", "pluginManagement", "plugins"]),
        ];
        for (kind, list) in entry_lists {
            for entry in self.document.children(list) {
                if let Some(version) = entry.child_text("version").filter(|v| is_snapshot(v)) {
                    findings.push(SnapshotFinding::new(kind, entry_gav(entry, &version)));
                }
            }
        }

        findings
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Label to apply when the module is committed; needs version control to take effect
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn has_label(&self) -> bool {
        self.label.as_deref().is_some_and(|l| !l.is_empty())
    }

    pub fn commit_message(&self) -> Option<&str> {
        self.commit_message.as_deref()
    }

    /// Use this message instead of the default one when committing
    pub fn set_commit_message(&mut self, message: impl Into<String>) {
        self.commit_message = Some(message.into());
    }

    /// Message to commit with, falling back to a generic one
    pub fn resolved_commit_message(&self) -> String {
        match self.commit_message.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => format!("Update {}", self.gav()),
        }
    }

    /// If true only the pom.xml is labeled, otherwise the module's whole directory tree
    pub fn label_only_pom_xml(&self) -> bool {
        self.label_only_pom_xml
    }

    pub fn set_label_only_pom_xml(&mut self, only_pom_xml: bool) {
        self.label_only_pom_xml = only_pom_xml;
    }

    /// Write the descriptor back to its pom.xml
    pub fn save(&self) -> Result<()> {
        self.document.save()
    }

    /// Save through version control: prepare, write, commit.
    ///
    /// Labels are applied per batch, see [crate::session::Session::commit_all].
    pub fn save_with(&self, vcs: &mut dyn VersionControl) -> Result<()> {
        vcs.prepare_save(self)?;
        self.save()?;
        vcs.commit(self)
    }
}

impl Artifact for ProjectModule {
    fn group_id(&self) -> Option<String> {
        self.own_or_parent("groupId")
    }

    /// Never inherited from the parent
    fn artifact_id(&self) -> Option<String> {
        self.document.child_text(&["artifactId"])
    }

    fn version(&self) -> Option<String> {
        self.own_or_parent("version")
    }
}

impl fmt::Display for ProjectModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.gav())
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Name inside a `${name}` version, if the version is exactly that shape
fn property_placeholder(version: &str) -> Option<&str> {
    version
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
}

fn entry_gav(entry: &Element, version: &str) -> String {
    format!(
        "{}:{}:{}",
        entry.child_text("groupId").unwrap_or_default(),
        entry.child_text("artifactId").unwrap_or_default(),
        version
    )
}
