use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use console::style;

static QUIET: AtomicBool = AtomicBool::new(false);
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn configure(verbose: bool, quiet: bool, no_color: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
    QUIET.store(quiet, Ordering::Relaxed);
    if no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

pub fn info(message: &str) {
    if QUIET.load(Ordering::Relaxed) {
        return;
    }
    let _ = writeln!(io::stderr(), "{}", message);
}

pub fn warn(message: &str) {
    let _ = writeln!(io::stderr(), "{}", style(message).yellow());
}

pub fn error(message: &str) {
    let _ = writeln!(io::stderr(), "{}", style(message).red());
}

/// Echoes an external command line when running verbosely.
pub fn step(tool: &str, message: &str) {
    if !VERBOSE.load(Ordering::Relaxed) || QUIET.load(Ordering::Relaxed) {
        return;
    }
    let _ = writeln!(io::stderr(), "{} {}", style(tool).cyan(), message);
}

/// Indents captured process output under an error message.
pub fn process_output(output: &str) {
    let mut err = io::stderr();
    let _ = writeln!(err, "Process output:");
    for line in output.trim_end_matches('\n').split('\n') {
        let _ = writeln!(err, "{} {}", style(">>").dim(), line);
    }
}
