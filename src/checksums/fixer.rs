use std::path::{Path, PathBuf};

use tracing::debug;

use crate::checksums::{parse_replacements, ReplacementMap};
use crate::config::ToolsConfig;
use crate::error::{PortError, Result};
use crate::exec::{command_failure, expect_success, CommandRunner, CommandSpec};

/// `port -v checksum` exits with this status when it found mismatches; its
/// output is still complete.
const CHECKSUM_MISMATCH_STATUS: i32 = 1;

#[derive(Debug)]
pub enum Outcome {
    UpToDate {
        portfile: PathBuf,
    },
    Updated {
        portfile: PathBuf,
        replacements: ReplacementMap,
    },
    /// `--dry-run`: what would have been rewritten.
    WouldUpdate {
        portfile: PathBuf,
        replacements: ReplacementMap,
    },
    EditFailed {
        portfile: PathBuf,
        error: PortError,
    },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::EditFailed { .. })
    }
}

/// Brings the checksums recorded in a port's Portfile in line with its
/// distfiles.
pub struct ChecksumFixer<'a> {
    runner: &'a dyn CommandRunner,
    tools: &'a ToolsConfig,
    dry_run: bool,
}

impl<'a> ChecksumFixer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, tools: &'a ToolsConfig) -> Self {
        Self {
            runner,
            tools,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Resolver and verifier failures are returned as errors; a failing
    /// editor is reported through [`Outcome::EditFailed`].
    pub fn process(&self, package: &str) -> Result<Outcome> {
        self.process_with(package, |_, _| {})
    }

    /// Like [`process`](Self::process), calling `before_edit` once the
    /// stale checksums are known and before the Portfile is touched.
    pub fn process_with<F>(&self, package: &str, before_edit: F) -> Result<Outcome>
    where
        F: FnOnce(&Path, &ReplacementMap),
    {
        let portfile = self.portfile(package)?;
        let replacements = self.replacements(package)?;

        if replacements.is_empty() {
            return Ok(Outcome::UpToDate { portfile });
        }
        if self.dry_run {
            return Ok(Outcome::WouldUpdate {
                portfile,
                replacements,
            });
        }

        before_edit(&portfile, &replacements);
        match self.rewrite(&portfile, &replacements) {
            Ok(()) => Ok(Outcome::Updated {
                portfile,
                replacements,
            }),
            Err(error) => Ok(Outcome::EditFailed { portfile, error }),
        }
    }

    pub fn portfile(&self, package: &str) -> Result<PathBuf> {
        let command = CommandSpec::new(&self.tools.port).args(["file", package]);
        let output = expect_success(&command, self.runner.run(&command)?)?;
        let path = output.stdout_text().trim().to_string();
        if path.is_empty() {
            return Err(PortError::Other(anyhow::anyhow!(
                "`{}` printed no Portfile path for {}",
                command,
                package
            )));
        }
        Ok(PathBuf::from(path))
    }

    pub fn replacements(&self, package: &str) -> Result<ReplacementMap> {
        let command = CommandSpec::new(&self.tools.port).args(["-v", "checksum", package]);
        let output = self.runner.run(&command)?;
        match output.status {
            Some(0) | Some(CHECKSUM_MISMATCH_STATUS) => {
                let replacements = parse_replacements(&output.combined_text());
                debug!(%package, stale = replacements.len(), "checksums verified");
                Ok(replacements)
            }
            _ => Err(command_failure(&command, &output)),
        }
    }

    fn rewrite(&self, portfile: &Path, replacements: &ReplacementMap) -> Result<()> {
        let command = CommandSpec::new(&self.tools.sed)
            .args(self.tools.sed_in_place.iter().cloned())
            .args(replacements.sed_expressions())
            .arg(portfile.display().to_string());
        expect_success(&command, self.runner.run(&command)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::checksums::{ChecksumFixer, Outcome};
    use crate::config::ToolsConfig;
    use crate::error::PortError;
    use crate::exec::fake::FakeRunner;
    use crate::exec::CommandOutput;

    const PORTFILE: &str = "/opt/local/var/macports/sources/rsync.macports.org/macports/release/tarballs/ports/archivers/libfoo/Portfile";

    fn tools() -> ToolsConfig {
        ToolsConfig {
            sed_in_place: vec!["-i".to_string(), String::new()],
            ..ToolsConfig::default()
        }
    }

    fn runner_with_checksum_output(status: i32, output: &str) -> FakeRunner {
        let mut runner = FakeRunner::new();
        runner.respond("port file libfoo", 0, &format!("{PORTFILE}\n"));
        runner.respond("port -v checksum libfoo", status, output);
        runner
    }

    #[test]
    fn up_to_date_port_runs_no_editor() {
        let runner = runner_with_checksum_output(0, "--->  Verifying checksums for libfoo\n");
        let tools = tools();
        let outcome = ChecksumFixer::new(&runner, &tools)
            .process("libfoo")
            .expect("process libfoo");

        assert!(matches!(outcome, Outcome::UpToDate { ref portfile } if portfile == &PathBuf::from(PORTFILE)));
        assert!(runner.calls_to("sed").is_empty());
    }

    #[test]
    fn stale_checksums_are_rewritten_in_one_editor_call() {
        let runner = runner_with_checksum_output(
            1,
            "Portfile checksum: libfoo-1.2.tar.gz rmd160 1111aaaa\n\
             Distfile checksum: libfoo-1.2.tar.gz rmd160 2222bbbb\n\
             Portfile checksum: libfoo-1.2.tar.gz sha256 3333cccc\n\
             Distfile checksum: libfoo-1.2.tar.gz sha256 4444dddd\n",
        );
        let tools = tools();
        let outcome = ChecksumFixer::new(&runner, &tools)
            .process("libfoo")
            .expect("process libfoo");

        match outcome {
            Outcome::Updated { replacements, .. } => assert_eq!(replacements.len(), 2),
            other => panic!("unexpected outcome: {other:?}"),
        }
        let sed_calls = runner.calls_to("sed");
        assert_eq!(sed_calls.len(), 1);
        assert_eq!(
            sed_calls[0].args,
            vec![
                "-i",
                "",
                "-e",
                "s/1111aaaa/2222bbbb/",
                "-e",
                "s/3333cccc/4444dddd/",
                PORTFILE,
            ]
        );
    }

    #[test]
    fn checksum_output_on_stderr_is_parsed() {
        let mut runner = runner_with_checksum_output(0, "");
        runner.respond_with(
            "port -v checksum libfoo",
            CommandOutput {
                status: Some(1),
                stdout: b"--->  Verifying checksums for libfoo\n".to_vec(),
                stderr: b"Portfile checksum: f.tgz md5 abc123\nDistfile checksum: f.tgz md5 def456\n"
                    .to_vec(),
            },
        );
        let tools = tools();
        let replacements = ChecksumFixer::new(&runner, &tools)
            .replacements("libfoo")
            .expect("replacements");
        assert_eq!(replacements.get("abc123"), Some("def456"));
    }

    #[test]
    fn verifier_failure_other_than_mismatch_propagates() {
        let runner = runner_with_checksum_output(2, "Error: Unable to fetch distfile\n");
        let tools = tools();
        let err = ChecksumFixer::new(&runner, &tools)
            .process("libfoo")
            .expect_err("status 2 should fail");

        assert!(matches!(err, PortError::Command { status: Some(2), .. }));
        assert!(runner.calls_to("sed").is_empty());
    }

    #[test]
    fn resolver_failure_propagates_before_verification() {
        let mut runner = FakeRunner::new();
        runner.respond("port file nosuch", 1, "Error: Port nosuch not found\n");
        let tools = tools();
        let err = ChecksumFixer::new(&runner, &tools)
            .process("nosuch")
            .expect_err("unknown port should fail");

        assert!(err.to_string().contains("port"));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn editor_failure_is_an_outcome_with_captured_output() {
        let mut runner = runner_with_checksum_output(
            1,
            "Portfile checksum: f.tgz md5 abc123\nDistfile checksum: f.tgz md5 def456\n",
        );
        runner.respond(
            &format!("sed -i '' -e s/abc123/def456/ {PORTFILE}"),
            1,
            "sed: Portfile: Permission denied\n",
        );
        let tools = tools();
        let outcome = ChecksumFixer::new(&runner, &tools)
            .process("libfoo")
            .expect("editor failure is not an error");

        assert!(outcome.is_failure());
        match outcome {
            Outcome::EditFailed { error, .. } => {
                assert_eq!(
                    error.command_output(),
                    Some("sed: Portfile: Permission denied\n")
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn dry_run_never_edits() {
        let runner = runner_with_checksum_output(
            1,
            "Portfile checksum: f.tgz md5 abc123\nDistfile checksum: f.tgz md5 def456\n",
        );
        let tools = tools();
        let outcome = ChecksumFixer::new(&runner, &tools)
            .dry_run(true)
            .process("libfoo")
            .expect("process libfoo");

        assert!(matches!(outcome, Outcome::WouldUpdate { .. }));
        assert!(runner.calls_to("sed").is_empty());
    }

    #[test]
    fn before_edit_runs_ahead_of_the_editor() {
        let runner = runner_with_checksum_output(
            1,
            "Portfile checksum: f.tgz md5 abc123\nDistfile checksum: f.tgz md5 def456\n",
        );
        let tools = tools();
        let mut seen = None;
        let outcome = ChecksumFixer::new(&runner, &tools)
            .process_with("libfoo", |portfile, replacements| {
                seen = Some((
                    portfile.to_path_buf(),
                    replacements.len(),
                    runner.calls_to("sed").len(),
                ));
            })
            .expect("process libfoo");

        assert!(matches!(outcome, Outcome::Updated { .. }));
        assert_eq!(seen, Some((PathBuf::from(PORTFILE), 1, 0)));
        assert_eq!(runner.calls_to("sed").len(), 1);
    }

    #[test]
    fn before_edit_is_skipped_without_stale_checksums() {
        let runner = runner_with_checksum_output(0, "");
        let tools = tools();
        let mut called = false;
        ChecksumFixer::new(&runner, &tools)
            .process_with("libfoo", |_, _| called = true)
            .expect("process libfoo");
        assert!(!called);
    }
}
