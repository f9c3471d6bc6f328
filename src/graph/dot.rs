use crate::error::{PortError, Result};
use crate::exec::{command_failure, CommandRunner, CommandSpec, RunningCommand};

/// Destination for the graph description, one statement per line.
pub trait GraphSink {
    fn write_line(&mut self, line: &str) -> Result<()>;
}

impl GraphSink for Vec<String> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// A running `dot` process fed statement by statement.
pub struct RenderProcess {
    command: CommandSpec,
    /// Taken once the process has been waited on.
    process: Option<Box<dyn RunningCommand>>,
}

impl RenderProcess {
    pub fn start(runner: &dyn CommandRunner, dot: &str, format: &str) -> Result<Self> {
        let command = CommandSpec::new(dot).arg(format!("-T{format}"));
        let process = runner.spawn(&command)?;
        Ok(Self {
            command,
            process: Some(process),
        })
    }

    /// Closes the input side and returns the rendered image.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let process = self.take_process()?;
        let output = process.finish()?;
        if !output.success() {
            return Err(command_failure(&self.command, &output));
        }
        Ok(output.stdout)
    }

    fn take_process(&mut self) -> Result<Box<dyn RunningCommand>> {
        self.process.take().ok_or_else(|| self.exited())
    }

    fn exited(&self) -> PortError {
        PortError::Other(anyhow::anyhow!("`{}` has already exited", self.command))
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(process) = self.process.as_mut() else {
            return Err(self.exited());
        };
        let Err(write_error) = process.write_all(bytes) else {
            return Ok(());
        };

        // A renderer that quit early (bad -T format, say) closes its stdin;
        // its exit status and stderr explain why, the broken pipe does not.
        let output = self.take_process()?.finish()?;
        if !output.success() {
            return Err(command_failure(&self.command, &output));
        }
        Err(write_error)
    }
}

impl GraphSink for RenderProcess {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.write_all(line.as_bytes())?;
        self.write_all(b"\n")
    }
}

/// Frames a streamed edge list as a `Digraph G { ... }` document.
pub struct DotWriter<S: GraphSink> {
    sink: S,
}

impl<S: GraphSink> DotWriter<S> {
    pub fn begin(mut sink: S) -> Result<Self> {
        sink.write_line("Digraph G {")?;
        Ok(Self { sink })
    }

    pub fn finish(mut self, roots: &[String]) -> Result<S> {
        self.sink.write_line(&format!(
            "graph [label=\"Dependencies of {}\"];",
            escape_dot_id(&roots.join(","))
        ))?;
        self.sink.write_line("}")?;
        Ok(self.sink)
    }
}

impl<S: GraphSink> GraphSink for DotWriter<S> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.sink.write_line(line)
    }
}

pub fn escape_dot_id(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
