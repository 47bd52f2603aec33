use std::fmt;

use super::{Artifact, Gav};

/// A module we have no control over but still reference by coordinates.
///
/// It has no descriptor behind it, so there is nothing to edit or save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadonlyModule {
    coordinates: Gav,
}

impl ReadonlyModule {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ReadonlyModule {
            coordinates: Gav::new(group_id, artifact_id, version),
        }
    }
}

impl From<Gav> for ReadonlyModule {
    fn from(coordinates: Gav) -> Self {
        ReadonlyModule { coordinates }
    }
}

impl Artifact for ReadonlyModule {
    fn group_id(&self) -> Option<String> {
        Some(self.coordinates.group_id.clone())
    }

    fn artifact_id(&self) -> Option<String> {
        Some(self.coordinates.artifact_id.clone())
    }

    fn version(&self) -> Option<String> {
        Some(self.coordinates.version.clone())
    }
}

impl fmt::Display for ReadonlyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.coordinates, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_accessors() {
        let module = ReadonlyModule::new("org.junit", "junit", "4.13.2");
        assert_eq!(module.group_id().as_deref(), Some("org.junit"));
        assert_eq!(module.artifact_id().as_deref(), Some("junit"));
        assert_eq!(module.version().as_deref(), Some("4.13.2"));
        assert_eq!(module.gav(), "org.junit:junit:4.13.2");
    }

    #[test]
    fn test_display_is_gav() {
        let module = ReadonlyModule::from(Gav::new("a", "b", "c"));
        assert_eq!(module.to_string(), "a:b:c");
    }
}
