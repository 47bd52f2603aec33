use std::fmt;

/// Version suffix that marks a development build
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Where in a descriptor a snapshot reference was found.
///
/// Variants are listed in the order a scan reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SnapshotKind {
    ModuleVersion,
    ParentVersion,
    Property,
    Dependency,
    DependencyManagement,
    Plugin,
    PluginManagement,
}

impl SnapshotKind {
    pub fn label(&self) -> &'static str {
        match self {
            SnapshotKind::ModuleVersion => "Module version",
            SnapshotKind::ParentVersion => "Parent version",
            SnapshotKind::Property => "Property",
            SnapshotKind::Dependency => "Dependency",
            SnapshotKind::DependencyManagement => "Dependency management",
            SnapshotKind::Plugin => "Plugin",
            SnapshotKind::PluginManagement => "Plugin management",
        }
    }
}

/// One `-SNAPSHOT` reference in a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFinding {
    pub kind: SnapshotKind,
    /// Version, `name:value` for properties, `groupId:artifactId:version` for entries
    pub detail: String,
}

impl SnapshotFinding {
    pub fn new(kind: SnapshotKind, detail: impl Into<String>) -> Self {
        SnapshotFinding {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SnapshotFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.label(), self.detail)
    }
}

pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT_SUFFIX)
}
