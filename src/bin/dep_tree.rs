use std::process::ExitCode;

fn main() -> ExitCode {
    portutils::cli::dep_tree::run()
}
