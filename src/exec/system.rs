use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use tracing::debug;

use crate::error::{PortError, Result};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, RunningCommand};
use crate::util::output;

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %command, "running");
        output::step("run", &command.to_string());
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| PortError::Spawn {
                program: command.program.clone(),
                source,
            })?;
        debug!(command = %command, status = ?output.status.code(), "finished");
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn spawn(&self, command: &CommandSpec) -> Result<Box<dyn RunningCommand>> {
        debug!(command = %command, "spawning");
        output::step("pipe", &command.to_string());
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PortError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        Ok(Box::new(SystemProcess {
            program: command.program.clone(),
            child,
            stdin,
            stdout,
            stderr,
        }))
    }
}

struct SystemProcess {
    program: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    stderr: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl RunningCommand for SystemProcess {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("stdin of `{}` is already closed", self.program))?;
        stdin
            .write_all(bytes)
            .map_err(|err| anyhow::anyhow!("failed to write to `{}`: {}", self.program, err))?;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<CommandOutput> {
        drop(self.stdin.take());
        let status = self.child.wait()?;
        let stdout = collect(self.stdout.take(), &self.program)?;
        let stderr = collect(self.stderr.take(), &self.program)?;
        debug!(program = %self.program, status = ?status.code(), "finished");
        Ok(CommandOutput {
            status: status.code(),
            stdout,
            stderr,
        })
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>, program: &str) -> Result<Vec<u8>> {
    match handle {
        Some(handle) => {
            let bytes = handle
                .join()
                .map_err(|_| anyhow::anyhow!("output reader for `{}` panicked", program))??;
            Ok(bytes)
        }
        None => Ok(Vec::new()),
    }
}
