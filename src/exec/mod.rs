//! Narrow seam over the external programs both tools drive.
//!
//! Everything that leaves the process (`port`, `dot`, `sed`, the image
//! viewer) goes through [`CommandRunner`], so traversal and patching logic can
//! be exercised against recorded fakes.

use std::fmt;

use crate::error::{PortError, Result};

pub mod system;

pub use system::SystemRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() {
                f.write_str(" ''")?;
            } else if arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Stdout followed by stderr, the way a terminal would have shown them.
    pub fn combined_text(&self) -> String {
        let mut text = self.stdout_text();
        if !self.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&String::from_utf8_lossy(&self.stderr));
        }
        text
    }
}

pub trait CommandRunner {
    /// Runs the command to completion and captures its output.
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;

    /// Starts the command with a writable stdin whose stdout is collected on
    /// [`RunningCommand::finish`].
    fn spawn(&self, command: &CommandSpec) -> Result<Box<dyn RunningCommand>>;
}

pub trait RunningCommand {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Closes stdin and waits for the process to exit.
    fn finish(self: Box<Self>) -> Result<CommandOutput>;
}

pub fn expect_success(command: &CommandSpec, output: CommandOutput) -> Result<CommandOutput> {
    if output.success() {
        Ok(output)
    } else {
        Err(command_failure(command, &output))
    }
}

pub fn command_failure(command: &CommandSpec, output: &CommandOutput) -> PortError {
    PortError::Command {
        program: command.program.clone(),
        status: output.status,
        output: output.combined_text(),
    }
}
