//! Check execution.
//!
//! Running a check has two halves. [`CheckRunner::execute`] spawns the
//! command and collects its result without touching the check, so it can
//! run concurrently with other passes. [`CheckRunner::complete`] applies
//! the result and drives the incident state machine; callers serialize it
//! per check.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use vigil_protocols::{Check, CheckDefinition, CheckError, Event};

use crate::command::CommandSpec;
use crate::processor::{EventProcessor, Transition};

/// Status recorded for a command that ended without an exit code.
pub const SIGNALLED_STATUS: i32 = -1;

/// The collected result of one command execution.
#[derive(Debug, Clone)]
pub struct Execution {
    pub status: i32,
    pub output: String,
    pub issued_at: DateTime<Utc>,
    pub executed_at: DateTime<Utc>,
    pub duration: f64,
}

impl Execution {
    /// Write this result into the check's run state.
    pub fn apply(self, check: &mut Check) {
        let state = &mut check.state;
        state.issued_at = Some(self.issued_at);
        state.executed_at = Some(self.executed_at);
        state.duration = self.duration;
        state.status = self.status;
        state.output = self.output;
        state.record_history(self.status);
    }
}

/// Executes checks and feeds their results to the [`EventProcessor`].
pub struct CheckRunner {
    commands_dir: PathBuf,
    processor: Arc<EventProcessor>,
    timeout: Option<Duration>,
}

impl CheckRunner {
    pub fn new(commands_dir: impl Into<PathBuf>, processor: Arc<EventProcessor>) -> Self {
        Self {
            commands_dir: commands_dir.into(),
            processor,
            timeout: None,
        }
    }

    /// Bound each command's run time. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn commands_dir(&self) -> &Path {
        &self.commands_dir
    }

    /// Resolve a check command against the commands directory.
    pub fn resolve(&self, command: &str) -> Result<CommandSpec, CheckError> {
        CommandSpec::resolve(&self.commands_dir, command)
    }

    /// Spawn the check's command and collect its exit status and output.
    ///
    /// stdout and stderr share one pipe, so the output keeps the order in
    /// which the command wrote it. A command killed by a signal is recorded
    /// with [`SIGNALLED_STATUS`].
    pub async fn execute(&self, definition: &CheckDefinition) -> Result<Execution, CheckError> {
        let spec = self.resolve(&definition.command)?;
        let spawn_error = |e: io::Error| CheckError::Spawn {
            command: definition.command.clone(),
            reason: e.to_string(),
        };

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).stdin(Stdio::null()).kill_on_drop(true);

        debug!(check = %definition.name, program = %spec.program.display(), "Executing check");

        let issued_at = Utc::now();
        let started = Instant::now();

        let run = combined_output(cmd);
        let (status, raw) = match self.timeout {
            Some(limit) => timeout(limit, run).await.map_err(|_| CheckError::Timeout {
                command: definition.command.clone(),
                secs: limit.as_secs(),
            })?,
            None => run.await,
        }
        .map_err(spawn_error)?;

        let duration = started.elapsed().as_secs_f64();
        let executed_at = Utc::now();

        let status = match status.code() {
            Some(code) => code,
            None => {
                warn!(check = %definition.name, "Command ended without an exit code ({})", status);
                SIGNALLED_STATUS
            }
        };

        let mut text = String::from_utf8_lossy(&raw).into_owned();
        if text.ends_with('\n') {
            text.pop();
        }

        Ok(Execution {
            status,
            output: text,
            issued_at,
            executed_at,
            duration,
        })
    }

    /// Apply an execution to the check and run one state-machine pass.
    pub async fn complete(&self, check: &mut Check, execution: Execution) -> Transition {
        execution.apply(check);
        debug!(
            check = %check.name(),
            status = check.state.status,
            duration = check.state.duration,
            "Check executed"
        );

        self.processor.process(Event::new(check)).await
    }

    /// Execute and complete in one step.
    pub async fn run(&self, check: &mut Check) -> Result<Transition, CheckError> {
        let execution = self.execute(&check.definition).await?;
        Ok(self.complete(check, execution).await)
    }
}

/// Run `cmd` with stdout and stderr on a single pipe and wait for it.
///
/// Dropping the returned future kills the child.
#[cfg(unix)]
async fn combined_output(mut cmd: Command) -> io::Result<(ExitStatus, Vec<u8>)> {
    use tokio::io::AsyncReadExt;
    use tokio::net::unix::pipe;

    let (writer, mut reader) = pipe::pipe()?;
    let writer = writer.into_blocking_fd()?;
    cmd.stderr(Stdio::from(writer.try_clone()?))
        .stdout(Stdio::from(writer));

    let mut child = cmd.spawn()?;
    // The command keeps copies of the write end; EOF needs them closed.
    drop(cmd);

    let mut output = Vec::new();
    reader.read_to_end(&mut output).await?;
    let status = child.wait().await?;
    Ok((status, output))
}

#[cfg(not(unix))]
async fn combined_output(mut cmd: Command) -> io::Result<(ExitStatus, Vec<u8>)> {
    let output = cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).output().await?;
    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);
    Ok((output.status, combined))
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
