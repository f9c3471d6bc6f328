use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use crate::cli::GlobalArgs;
use crate::config::resolve::load_config;
use crate::config::Config;
use crate::error::{PortError, Result};
use crate::exec::{CommandRunner, CommandSpec, SystemRunner};
use crate::graph::render_graph;
use crate::util::output;

#[derive(Parser, Debug)]
#[command(name = "dep-tree")]
#[command(about = "Render the dependency graph of one or more ports", long_about = None)]
pub struct DepTreeCli {
    /// Ports to graph. A bare non-negative number sets the maximum depth
    /// (0 = unlimited).
    #[arg(value_name = "PORT", allow_negative_numbers = true)]
    pub targets: Vec<String>,
    /// Maximum traversal depth (0 = unlimited).
    #[arg(short = 'd', long)]
    pub depth: Option<usize>,
    /// Image to write (default: <first port>.<format>).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Graphviz output format passed to `dot -T`.
    #[arg(short = 'T', long)]
    pub format: Option<String>,
    /// Do not open the image once it is written.
    #[arg(long)]
    pub no_open: bool,
    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPlan {
    pub ports: Vec<String>,
    pub max_depth: usize,
    pub format: String,
    pub output: PathBuf,
    pub open: bool,
}

impl GraphPlan {
    /// `Ok(None)` when no port was named.
    pub fn resolve(cli: &DepTreeCli, config: &Config) -> Result<Option<Self>> {
        let (ports, positional_depth) = split_targets(&cli.targets)?;
        let Some(first) = ports.first().cloned() else {
            return Ok(None);
        };
        let format = cli
            .format
            .clone()
            .unwrap_or_else(|| config.graph.format.clone());
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{first}.{format}")));
        Ok(Some(Self {
            max_depth: positional_depth
                .or(cli.depth)
                .unwrap_or(config.graph.max_depth),
            open: config.graph.open && !cli.no_open,
            ports,
            format,
            output,
        }))
    }
}

/// Separates port names from bare numbers; the last number is the depth.
/// Negative or out-of-range integers are rejected rather than taken as ports.
pub fn split_targets(targets: &[String]) -> Result<(Vec<String>, Option<usize>)> {
    let mut ports = Vec::new();
    let mut depth = None;
    for target in targets {
        if !is_integer(target) {
            ports.push(target.clone());
            continue;
        }
        let value = target.parse::<usize>().map_err(|_| {
            PortError::Other(anyhow::anyhow!(
                "invalid depth `{target}`: expected a non-negative integer"
            ))
        })?;
        depth = Some(value);
    }
    Ok((ports, depth))
}

fn is_integer(target: &str) -> bool {
    let digits = target.strip_prefix(['-', '+']).unwrap_or(target);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

pub fn run() -> ExitCode {
    if std::env::args_os().skip(1).any(|arg| arg == "-?") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let cli = DepTreeCli::parse();
    cli.global.init();
    match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            output::error(&err.to_string());
            if let Some(captured) = err.command_output() {
                if !captured.trim().is_empty() {
                    output::process_output(captured);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: DepTreeCli) -> Result<ExitCode> {
    let config = load_config(cli.global.config.clone())?;
    let Some(plan) = GraphPlan::resolve(&cli, &config)? else {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    };

    let runner = SystemRunner;
    output::info(&format!(
        "Scanning dependencies of {} ({})",
        plan.ports.join(", "),
        match plan.max_depth {
            0 => "unlimited depth".to_string(),
            depth => format!("depth {depth}"),
        }
    ));
    let image = render_graph(
        &runner,
        &config.tools.port,
        &config.tools.dot,
        &plan.format,
        &plan.ports,
        plan.max_depth,
    )?;
    fs::write(&plan.output, image)
        .with_context(|| format!("failed to write {}", plan.output.display()))?;
    println!("Wrote {}", plan.output.display());

    if plan.open {
        open_image(&runner, &config.tools.viewer, &plan.output);
    }
    Ok(ExitCode::SUCCESS)
}

/// The image is already on disk, so a missing or failing viewer only warns.
fn open_image(runner: &dyn CommandRunner, viewer: &str, image: &Path) {
    let command = CommandSpec::new(viewer).arg(image.display().to_string());
    match runner.run(&command) {
        Ok(result) if result.success() => {}
        Ok(result) => output::warn(&format!(
            "{} exited with {:?} while opening {}",
            viewer,
            result.status,
            image.display()
        )),
        Err(err) => output::warn(&format!("could not open {}: {}", image.display(), err)),
    }
}

fn print_usage() {
    let _ = DepTreeCli::command().print_help();
}
