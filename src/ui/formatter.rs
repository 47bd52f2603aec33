//! Pure formatting functions for UI output.
//!
//! Everything shown to the user goes through here. Colors come from
//! `console`, which drops them when the stream is not a terminal.

use console::style;

use crate::session::{Bump, ModuleSnapshots, RunMode, RunSummary};
use crate::warning::RunWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a run warning to the user.
pub fn display_warning(warning: &RunWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// `ORG:`/`NEW:` lines for one module
pub fn format_bump(bump: &Bump) -> String {
    let mut text = format!("ORG: {}\nNEW: {}", bump.original, bump.updated);
    if let Some(label) = &bump.label {
        text.push_str(&format!(" ({})", label));
    }
    text
}

/// Display the coordinates of each module before and after the scenario.
///
/// # Arguments
/// * `bumps` - One entry per module loaded for update, in load order
pub fn display_bumps(bumps: &[Bump]) {
    println!("\n{}", style("Modules:").bold());
    for bump in bumps {
        let line = format_bump(bump);
        if bump.changed() {
            println!("{}", style(line).green());
        } else {
            println!("{}", line);
        }
    }
}

/// Display every snapshot reference, grouped by module.
pub fn display_snapshot_report(report: &[ModuleSnapshots]) {
    if report.is_empty() {
        display_success("No SNAPSHOT references found");
        return;
    }
    println!("\n{}", style("SNAPSHOT references:").bold());
    for module in report {
        println!("  {}", style(&module.module).cyan());
        for finding in &module.findings {
            println!("    {}", finding);
        }
    }
}

/// Summary line describing what a run did
pub fn format_summary(summary: &RunSummary) -> String {
    match summary.mode {
        RunMode::DryRun => "Dry run, nothing was written".to_string(),
        RunMode::PrepareTest => format!("Wrote {} pom.xml file(s), nothing committed", summary.saved),
        RunMode::Revert => format!("Restored {} pom.xml file(s)", summary.restored),
        RunMode::Normal => {
            let mut text = format!(
                "Wrote {} and committed {} pom.xml file(s)",
                summary.saved, summary.committed
            );
            if !summary.labels.is_empty() {
                text.push_str(&format!(", labeled {}", summary.labels.join(", ")));
            }
            text
        }
    }
}

pub fn display_summary(summary: &RunSummary) {
    display_success(&format_summary(summary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{SnapshotFinding, SnapshotKind};

    fn bump(label: Option<&str>) -> Bump {
        Bump {
            module: "core".to_string(),
            original: "g:core:1.0-SNAPSHOT".to_string(),
            updated: "g:core:1.0".to_string(),
            label: label.map(String::from),
        }
    }

    #[test]
    fn test_format_bump_with_label() {
        assert_eq!(
            format_bump(&bump(Some("REL_1_0"))),
            "ORG: g:core:1.0-SNAPSHOT\nNEW: g:core:1.0 (REL_1_0)"
        );
        assert_eq!(
            format_bump(&bump(None)),
            "ORG: g:core:1.0-SNAPSHOT\nNEW: g:core:1.0"
        );
    }

    #[test]
    fn test_format_summary_lists_labels() {
        let summary = RunSummary {
            mode: RunMode::Normal,
            saved: 2,
            committed: 2,
            labels: vec!["REL_1".to_string()],
            restored: 0,
        };
        assert_eq!(
            format_summary(&summary),
            "Wrote 2 and committed 2 pom.xml file(s), labeled REL_1"
        );
    }

    #[test]
    fn test_display_functions_print() {
        // Visual verification test - output goes to stdout/stderr
        display_error("test error");
        display_status("test status");
        display_warning(&RunWarning::NoModulesLoaded);
        display_bumps(&[bump(None)]);
        display_snapshot_report(&[ModuleSnapshots {
            module: "core".to_string(),
            findings: vec![SnapshotFinding::new(SnapshotKind::ModuleVersion, "1.0-SNAPSHOT")],
        }]);
    }
}
