use std::io;
use std::process::Command;

use tracing::debug;

/// Captured result of one external command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Standard output, decoded lossily as UTF-8
    pub stdout: String,
}

/// Seam between the collector and the external `gh` / `git` programs.
pub trait CommandRunner {
    /// Run `program` with `args` to completion and capture its stdout.
    /// Only a failure to spawn is an error; a non-zero exit is reported
    /// through `CommandOutput::success`.
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Runs commands as real child processes.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            program,
            ?args,
            status = ?output.status.code(),
            stdout_bytes = stdout.len(),
            "command finished"
        );
        Ok(CommandOutput {
            success: output.status.success(),
            stdout,
        })
    }
}

#[cfg(test)]
pub use fake::FakeRunner;
