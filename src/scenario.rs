//! Scenario files
//!
//! A scenario names the modules to bump and how they reference each other.
//! It is applied in two passes: every module is loaded and given its own
//! version first, then parent, dependency, plugin and property updates run
//! in file order. References therefore always see the new versions, wherever
//! the referenced module appears in the file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{BumpError, Result};
use crate::module::ReadonlyModule;
use crate::session::Session;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub readonly: Vec<ReadonlySpec>,

    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleSpec>,
}

/// A module outside our control, referenced by coordinates
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReadonlySpec {
    pub id: String,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// A module loaded from a pom.xml and what to change in it
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    /// Directory relative to the base directory; empty for the base directory
    #[serde(default)]
    pub path: String,

    /// Defaults to `path`
    pub id: Option<String>,

    pub version: Option<String>,

    pub label: Option<String>,

    pub commit_message: Option<String>,

    #[serde(default)]
    pub label_only_pom_xml: bool,

    /// Id of the module whose version the parent block should take
    pub parent: Option<String>,

    /// Literal parent version
    pub parent_version: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub plugins: Vec<String>,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl ModuleSpec {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.path)
    }
}

impl Scenario {
    /// Read a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BumpError::scenario(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| BumpError::scenario(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load every module into `session` and apply all updates
    pub fn apply(&self, session: &mut Session) -> Result<()> {
        for spec in &self.readonly {
            session.add_readonly(
                &spec.id,
                ReadonlyModule::new(&spec.group_id, &spec.artifact_id, &spec.version),
            )?;
        }

        for spec in &self.modules {
            let module = session.load_module(
                spec.id(),
                &spec.path,
                spec.version.as_deref(),
                spec.label.as_deref(),
            )?;
            if let Some(message) = &spec.commit_message {
                module.set_commit_message(message);
            }
            module.set_label_only_pom_xml(spec.label_only_pom_xml);
        }

        for spec in &self.modules {
            let id = spec.id();
            debug!(id, "applying references");

            if let Some(version) = &spec.parent_version {
                session.find_mut(id)?.set_parent_version(version)?;
            }
            if let Some(parent) = &spec.parent {
                session.update_parent(id, parent)?;
            }
            for dependency in &spec.dependencies {
                session.update_dependency(id, dependency)?;
            }
            for plugin in &spec.plugins {
                session.update_plugin_dependency(id, plugin)?;
            }
            for (name, value) in &spec.properties {
                session.find_mut(id)?.update_property(name, value)?;
            }
        }
        Ok(())
    }
}
