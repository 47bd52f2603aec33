use std::time::Duration;

use crate::error::Result;
use crate::vcs::command::{CommandLine, CommandRunner};

/// Command runner that records command lines instead of running them
#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
    commands: Vec<(CommandLine, Duration)>,
    output: String,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every command with this standard output
    pub fn with_output(output: impl Into<String>) -> Self {
        RecordingRunner {
            commands: Vec::new(),
            output: output.into(),
        }
    }

    /// Recorded command lines, oldest first
    pub fn commands(&self) -> Vec<&CommandLine> {
        self.commands.iter().map(|(cmd, _)| cmd).collect()
    }

    /// Timeout each command was given
    pub fn timeouts(&self) -> Vec<Duration> {
        self.commands.iter().map(|(_, timeout)| *timeout).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &CommandLine, timeout: Duration) -> Result<String> {
        self.commands.push((command.clone(), timeout));
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut runner = RecordingRunner::with_output("ok");
        let first = CommandLine::new("svn").arg("revert");
        let second = CommandLine::new("svn").arg("commit");

        assert_eq!(runner.run(&first, Duration::from_secs(1)).unwrap(), "ok");
        runner.run(&second, Duration::from_secs(2)).unwrap();

        assert_eq!(runner.commands(), vec![&first, &second]);
        assert_eq!(
            runner.timeouts(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn test_default_is_empty() {
        let runner = RecordingRunner::default();
        assert!(runner.commands().is_empty());
    }
}
