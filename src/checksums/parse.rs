use std::sync::OnceLock;

use regex::Regex;

use crate::checksums::ReplacementMap;

fn portfile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Portfile checksum: .* ([0-9a-f]+)$").expect("valid Portfile checksum regex")
    })
}

fn distfile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Distfile checksum: .* ([0-9a-f]+)$").expect("valid Distfile checksum regex")
    })
}

enum ScanState {
    AwaitingOrig,
    AwaitingNew { recorded: String },
}

/// Pairs each `Portfile checksum` line of `port -v checksum` output with the
/// `Distfile checksum` line that follows it.
///
/// A second `Portfile checksum` line before the pair completes replaces the
/// pending recorded value. Anything else is noise.
pub fn parse_replacements(output: &str) -> ReplacementMap {
    let mut replacements = ReplacementMap::new();
    let mut state = ScanState::AwaitingOrig;

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(caps) = portfile_pattern().captures(line) {
            state = ScanState::AwaitingNew {
                recorded: caps[1].to_string(),
            };
            continue;
        }
        if let ScanState::AwaitingNew { recorded } = &state {
            if let Some(caps) = distfile_pattern().captures(line) {
                replacements.insert(recorded.clone(), &caps[1]);
                state = ScanState::AwaitingOrig;
            }
        }
    }

    replacements
}
