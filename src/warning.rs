use std::fmt;

/// Non-fatal conditions found while running a scenario.
/// These are reported to the user but do not stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunWarning {
    /// The module still references `-SNAPSHOT` versions
    SnapshotsFound { module: String, count: usize },
    /// Labels were requested but there is no version control to apply them
    LabelsWithoutVersionControl { labels: Vec<String> },
    /// The scenario did not load any module for update
    NoModulesLoaded,
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::SnapshotsFound { module, count } => {
                let noun = if *count == 1 { "reference" } else { "references" };
                write!(f, "{} has {} SNAPSHOT {}", module, count, noun)
            }
            RunWarning::LabelsWithoutVersionControl { labels } => {
                write!(
                    f,
                    "No version control configured, labels will not be applied: {}",
                    labels.join(", ")
                )
            }
            RunWarning::NoModulesLoaded => write!(f, "No modules were loaded for update"),
        }
    }
}
