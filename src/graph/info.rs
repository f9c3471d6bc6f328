use tracing::debug;

use crate::exec::{CommandRunner, CommandSpec};
use crate::graph::DependencyKind;

/// Source of the raw `port info` text for a package.
pub trait InfoSource {
    /// Returns `None` when the query failed; such a package simply has no
    /// dependencies as far as the graph is concerned.
    fn info(&self, package: &str) -> Option<String>;
}

/// Queries `port info <package>` through a [`CommandRunner`].
pub struct PortInfo<'a> {
    runner: &'a dyn CommandRunner,
    port: String,
}

impl<'a> PortInfo<'a> {
    pub fn new(runner: &'a dyn CommandRunner, port: impl Into<String>) -> Self {
        Self {
            runner,
            port: port.into(),
        }
    }
}

impl InfoSource for PortInfo<'_> {
    fn info(&self, package: &str) -> Option<String> {
        let command = CommandSpec::new(&self.port).arg("info").arg(package);
        match self.runner.run(&command) {
            Ok(output) if output.success() => Some(output.stdout_text()),
            Ok(output) => {
                debug!(%package, status = ?output.status, "port info failed");
                None
            }
            Err(err) => {
                debug!(%package, error = %err, "port info could not run");
                None
            }
        }
    }
}

/// Dependency names listed after the first colon of a `port info` line.
pub fn extract(line: &str) -> Vec<String> {
    let list = match line.find(':') {
        Some(idx) => &line[idx + 1..],
        None => line,
    };
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// All classified dependency lines of an info listing, in output order.
pub fn dependencies(info: &str) -> Vec<(DependencyKind, Vec<String>)> {
    info.lines()
        .filter_map(|line| DependencyKind::classify(line).map(|kind| (kind, extract(line))))
        .collect()
}
