pub mod fixer;
pub mod parse;

pub use fixer::{ChecksumFixer, Outcome};
pub use parse::parse_replacements;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumPair {
    /// Value currently written in the Portfile.
    pub recorded: String,
    /// Value computed from the downloaded distfile.
    pub actual: String,
}

/// Stale checksum → correct checksum, in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    entries: Vec<ChecksumPair>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-inserting a recorded value replaces its target in place.
    pub fn insert(&mut self, recorded: impl Into<String>, actual: impl Into<String>) {
        let recorded = recorded.into();
        let actual = actual.into();
        match self.entries.iter_mut().find(|pair| pair.recorded == recorded) {
            Some(pair) => pair.actual = actual,
            None => self.entries.push(ChecksumPair { recorded, actual }),
        }
    }

    pub fn get(&self, recorded: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|pair| pair.recorded == recorded)
            .map(|pair| pair.actual.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChecksumPair> {
        self.entries.iter()
    }

    /// `sed` arguments performing one substitution per entry.
    pub fn sed_expressions(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|pair| {
                [
                    "-e".to_string(),
                    format!("s/{}/{}/", pair.recorded, pair.actual),
                ]
            })
            .collect()
    }
}
