use std::path::PathBuf;

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::util::output;

pub mod dep_tree;
pub mod update_checksums;

/// Flags shared by both tools.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default: $PORTUTILS_CONFIG, then ~/.config/portutils/config.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Show each external command; repeat for trace logging (-vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Suppress informational output.
    #[arg(short, long)]
    pub quiet: bool,
    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,
}

impl GlobalArgs {
    pub fn init(&self) {
        output::configure(self.verbose > 0, self.quiet, self.no_color);
        init_logging(self.verbose);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "portutils=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use crate::cli::dep_tree::DepTreeCli;
    use crate::cli::update_checksums::UpdateChecksumsCli;

    #[test]
    fn every_flag_has_help_text() {
        for command in [DepTreeCli::command(), UpdateChecksumsCli::command()] {
            for arg in command.get_arguments() {
                if matches!(arg.get_id().as_str(), "help" | "version") {
                    continue;
                }
                assert!(
                    arg.get_help().is_some(),
                    "`{}` of {} has no help text",
                    arg.get_id(),
                    command.get_name()
                );
            }
        }
    }
}
