use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use crate::checksums::{ChecksumFixer, Outcome, ReplacementMap};
use crate::cli::GlobalArgs;
use crate::config::resolve::load_config;
use crate::config::MissingArgs;
use crate::error::{PortError, Result};
use crate::exec::SystemRunner;
use crate::util::output;

const USAGE: &str = "Usage: update-checksums portname [port ...]";

#[derive(Parser, Debug)]
#[command(name = "update-checksums")]
#[command(
    about = "Runs the checksum phase and fixes any stale checksums in the given ports' Portfiles",
    long_about = None
)]
pub struct UpdateChecksumsCli {
    /// Ports whose Portfiles should be checked and fixed.
    #[arg(value_name = "PORT")]
    pub ports: Vec<String>,
    /// Stop at the first port whose Portfile or checksums cannot be read.
    #[arg(long)]
    pub fail_fast: bool,
    /// Report stale checksums without editing any Portfile.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
    #[command(flatten)]
    pub global: GlobalArgs,
}

pub fn run() -> ExitCode {
    let cli = UpdateChecksumsCli::parse();
    cli.global.init();
    match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            output::error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: UpdateChecksumsCli) -> Result<ExitCode> {
    let config = load_config(cli.global.config.clone())?;
    if cli.ports.is_empty() {
        println!("{USAGE}");
        return Ok(match config.checksums.missing_args {
            MissingArgs::Usage => ExitCode::SUCCESS,
            MissingArgs::Error => ExitCode::from(2),
        });
    }

    let runner = SystemRunner;
    let fixer = ChecksumFixer::new(&runner, &config.tools).dry_run(cli.dry_run);
    let isolate = config.checksums.isolate_failures && !cli.fail_fast;

    let mut failed = 0usize;
    for port in &cli.ports {
        let announce = |portfile: &Path, replacements: &ReplacementMap| {
            println!("Updating: {}", portfile.display());
            list_replacements(replacements);
        };
        match fixer.process_with(port, announce) {
            Ok(outcome) => {
                if outcome.is_failure() {
                    failed += 1;
                }
                report(&outcome);
            }
            Err(err) => {
                failed += 1;
                report_port_error(port, &err);
                if !isolate {
                    break;
                }
            }
        }
    }

    if failed > 0 {
        output::warn(&format!(
            "{} of {} port(s) could not be updated",
            failed,
            cli.ports.len()
        ));
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::UpToDate { portfile } => {
            println!("No updates required: {}", portfile.display());
        }
        // Announced before the editor ran.
        Outcome::Updated { .. } => {}
        Outcome::WouldUpdate {
            portfile,
            replacements,
        } => {
            println!("Would update: {}", portfile.display());
            list_replacements(replacements);
        }
        Outcome::EditFailed { portfile, error } => {
            output::error(&format!(
                "Error while updating portfile [{}]: [{}]",
                portfile.display(),
                error
            ));
            if let Some(captured) = error.command_output() {
                output::process_output(captured);
            }
        }
    }
}

fn list_replacements(replacements: &ReplacementMap) {
    for pair in replacements.iter() {
        output::info(&format!("  {} -> {}", pair.recorded, pair.actual));
    }
}

fn report_port_error(port: &str, err: &PortError) {
    output::error(&format!("Failed to process {port}: {err}"));
    if let Some(captured) = err.command_output() {
        if !captured.trim().is_empty() {
            output::process_output(captured);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::update_checksums::UpdateChecksumsCli;

    #[test]
    fn parses_ports_and_flags() {
        let cli = UpdateChecksumsCli::try_parse_from([
            "update-checksums",
            "--fail-fast",
            "-n",
            "libfoo",
            "py312-bar",
        ])
        .expect("parse args");
        assert_eq!(cli.ports, vec!["libfoo", "py312-bar"]);
        assert!(cli.fail_fast);
        assert!(cli.dry_run);
        assert_eq!(cli.global.verbose, 0);
    }

    #[test]
    fn no_ports_is_accepted_by_the_parser() {
        let cli = UpdateChecksumsCli::try_parse_from(["update-checksums", "-vv"])
            .expect("parse args");
        assert!(cli.ports.is_empty());
        assert_eq!(cli.global.verbose, 2);
    }
}
