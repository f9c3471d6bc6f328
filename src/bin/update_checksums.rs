use std::process::ExitCode;

fn main() -> ExitCode {
    portutils::cli::update_checksums::run()
}
