use std::fmt;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::error::{BumpError, Result};

/// Default timeout for a single version control command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// An external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        CommandLine {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs external commands on behalf of a version control backend
pub trait CommandRunner {
    /// Run `command` to completion and return its standard output.
    ///
    /// Fails if the command cannot be started, exits unsuccessfully, or is
    /// still running when `timeout` expires.
    fn run(&mut self, command: &CommandLine, timeout: Duration) -> Result<String>;
}

/// Runs commands as child processes, killing them on timeout
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &CommandLine, timeout: Duration) -> Result<String> {
        info!("Running command: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            BumpError::version_control(format!("Failed to execute {}: {}", command.program, e))
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_all(stdout));
        let stderr_reader = thread::spawn(move || read_all(stderr));

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BumpError::version_control(format!(
                    "{} timed out after {} seconds",
                    command,
                    timeout.as_secs()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(BumpError::version_control(format!(
                "{} failed with exit code {}\nStdout: {}\nStderr: {}",
                command,
                status.code().unwrap_or(-1),
                stdout,
                stderr
            )));
        }

        Ok(stdout)
    }
}

fn read_all(stream: Option<impl Read>) -> String {
    let mut bytes = Vec::new();
    if let Some(mut stream) = stream {
        let _ = stream.read_to_end(&mut bytes);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_display_quotes_spaces() {
        let cmd = CommandLine::new("svn")
            .arg("commit")
            .arg("-m")
            .arg("Bump 1.0 -> 1.1")
            .arg("core/pom.xml");
        assert_eq!(cmd.to_string(), "svn commit -m \"Bump 1.0 -> 1.1\" core/pom.xml");
    }

    #[test]
    fn test_command_line_display_quotes_empty_args() {
        let cmd = CommandLine::new("svn").arg("copy").arg("-m").arg("");
        assert_eq!(cmd.to_string(), "svn copy -m \"\"");
    }

    #[test]
    fn test_missing_program_fails() {
        let cmd = CommandLine::new("/nonexistent/path/to/vcs-tool");
        let err = ProcessRunner
            .run(&cmd, DEFAULT_COMMAND_TIMEOUT)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to execute"));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout() {
        let cmd = CommandLine::new("sh").arg("-c").arg("echo 'Repository Root: file:///repo'");
        let out = ProcessRunner.run(&cmd, DEFAULT_COMMAND_TIMEOUT).unwrap();
        assert_eq!(out.trim(), "Repository Root: file:///repo");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_fails() {
        let cmd = CommandLine::new("sh").arg("-c").arg("echo broken >&2; exit 3");
        let err = ProcessRunner.run(&cmd, DEFAULT_COMMAND_TIMEOUT).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exit code 3"));
        assert!(msg.contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_command() {
        let cmd = CommandLine::new("sleep").arg("5");
        let err = ProcessRunner
            .run(&cmd, Duration::from_millis(200))
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
