//! Maven modules and their identity
//!
//! Two kinds of module take part in a bump:
//!
//! - [ProjectModule]: backed by a pom.xml we own and may edit
//! - [ReadonlyModule]: a dependency outside our control, known only by its
//!   coordinates
//!
//! Both expose their coordinates through the [Artifact] trait, which is all
//! that dependency, plugin and parent updates need from the module being
//! referenced. [ModuleRef] holds either kind where a driver keeps them side
//! by side; editing is only reachable through [ModuleRef::editable_mut].

pub mod project;
pub mod readonly;
pub mod snapshot;

pub use project::ProjectModule;
pub use readonly::ReadonlyModule;
pub use snapshot::{SnapshotFinding, SnapshotKind};

use std::fmt;

use crate::error::{BumpError, Result};

/// Read access to Maven coordinates
pub trait Artifact {
    fn group_id(&self) -> Option<String>;

    fn artifact_id(&self) -> Option<String>;

    fn version(&self) -> Option<String>;

    /// `groupId:artifactId:version`, missing parts left empty
    fn gav(&self) -> String {
        format!(
            "{}:{}:{}",
            self.group_id().unwrap_or_default(),
            self.artifact_id().unwrap_or_default(),
            self.version().unwrap_or_default()
        )
    }
}

/// Owned groupId/artifactId/version triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gav {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Gav {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Gav {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// Capture the current coordinates of any artifact.
    ///
    /// Fails if one of the three parts cannot be resolved.
    pub fn of(artifact: &dyn Artifact) -> Result<Self> {
        let missing = |part: &str| {
            BumpError::argument(format!("{} has no {}", artifact.gav(), part))
        };
        Ok(Gav {
            group_id: artifact.group_id().ok_or_else(|| missing("groupId"))?,
            artifact_id: artifact.artifact_id().ok_or_else(|| missing("artifactId"))?,
            version: artifact.version().ok_or_else(|| missing("version"))?,
        })
    }
}

impl Artifact for Gav {
    fn group_id(&self) -> Option<String> {
        Some(self.group_id.clone())
    }

    fn artifact_id(&self) -> Option<String> {
        Some(self.artifact_id.clone())
    }

    fn version(&self) -> Option<String> {
        Some(self.version.clone())
    }
}

impl fmt::Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// A module as held by a driver: editable or read-only
#[derive(Debug)]
pub enum ModuleRef {
    Project(ProjectModule),
    Readonly(ReadonlyModule),
}

impl ModuleRef {
    pub fn is_readonly(&self) -> bool {
        matches!(self, ModuleRef::Readonly(_))
    }

    pub fn editable(&self) -> Result<&ProjectModule> {
        match self {
            ModuleRef::Project(module) => Ok(module),
            ModuleRef::Readonly(module) => Err(BumpError::unsupported(module.gav())),
        }
    }

    /// Mutable access for editing; read-only modules refuse
    pub fn editable_mut(&mut self) -> Result<&mut ProjectModule> {
        match self {
            ModuleRef::Project(module) => Ok(module),
            ModuleRef::Readonly(module) => Err(BumpError::unsupported(module.gav())),
        }
    }

    pub fn as_artifact(&self) -> &dyn Artifact {
        match self {
            ModuleRef::Project(module) => module,
            ModuleRef::Readonly(module) => module,
        }
    }
}

impl Artifact for ModuleRef {
    fn group_id(&self) -> Option<String> {
        self.as_artifact().group_id()
    }

    fn artifact_id(&self) -> Option<String> {
        self.as_artifact().artifact_id()
    }

    fn version(&self) -> Option<String> {
        self.as_artifact().version()
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleRef::Project(module) => fmt::Display::fmt(module, f),
            ModuleRef::Readonly(module) => fmt::Display::fmt(module, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gav_display_and_trait_agree() {
        let gav = Gav::new("g", "a", "v");
        assert_eq!(gav.to_string(), "g:a:v");
        assert_eq!(Artifact::gav(&gav), "g:a:v");
    }

    #[test]
    fn test_gav_of_copies_coordinates() {
        let external = ReadonlyModule::new("org.slf4j", "slf4j-api", "2.0.9");
        let gav = Gav::of(&external).unwrap();
        assert_eq!(gav, Gav::new("org.slf4j", "slf4j-api", "2.0.9"));
    }

    #[test]
    fn test_readonly_ref_refuses_editing() {
        let mut module = ModuleRef::Readonly(ReadonlyModule::new("g", "a", "1"));
        assert!(module.is_readonly());
        assert!(module.editable().unwrap_err().is_unsupported());
        let err = module.editable_mut().unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("g:a:1"));
    }

    #[test]
    fn test_module_ref_exposes_identity() {
        let module = ModuleRef::Readonly(ReadonlyModule::new("g", "a", "1"));
        assert_eq!(module.gav(), "g:a:1");
        assert_eq!(module.to_string(), "g:a:1");
    }
}
