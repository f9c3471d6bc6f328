use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::Result;
use crate::graph::dot::GraphSink;
use crate::graph::info::{dependencies, InfoSource};
use crate::graph::{DependencyEdge, DependencyKind};

/// Depth-limited walk over `port info` dependency listings.
///
/// Work is deduplicated per `(package, depth)`. A port is scanned again only
/// when reached at a shallower depth than any earlier visit, since that visit
/// can reach edges a depth-limited deeper one could not; a deeper revisit can
/// never add anything, which is what makes cycles terminate. Edges are
/// deduplicated globally on their exact statement text.
#[derive(Debug, Default)]
pub struct Traversal {
    max_depth: usize,
    /// Shallowest depth each port has been visited at.
    visited: HashMap<String, usize>,
    emitted: HashSet<String>,
}

struct Frame {
    package: String,
    depth: usize,
    pending: std::vec::IntoIter<(DependencyKind, String)>,
}

impl Traversal {
    /// `max_depth == 0` means unbounded.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn edge_count(&self) -> usize {
        self.emitted.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Walks `package` and everything reachable from it, streaming each new
    /// edge to `sink` in depth-first declaration order.
    pub fn scan<I, S>(&mut self, info: &I, sink: &mut S, package: &str, depth: usize) -> Result<()>
    where
        I: InfoSource + ?Sized,
        S: GraphSink + ?Sized,
    {
        let mut stack = Vec::new();
        if let Some(frame) = self.enter(info, package, depth) {
            stack.push(frame);
        }

        loop {
            let next = match stack.last_mut() {
                None => break,
                Some(frame) => frame.pending.next().map(|(kind, dep)| {
                    (
                        DependencyEdge::new(frame.package.clone(), dep, kind),
                        frame.depth + 1,
                    )
                }),
            };

            match next {
                None => {
                    stack.pop();
                }
                Some((edge, child_depth)) => {
                    let statement = edge.to_string();
                    if !self.emitted.contains(&statement) {
                        sink.write_line(&statement)?;
                        self.emitted.insert(statement);
                    }
                    if let Some(frame) = self.enter(info, &edge.to, child_depth) {
                        stack.push(frame);
                    }
                }
            }
        }

        Ok(())
    }

    fn enter<I>(&mut self, info: &I, package: &str, depth: usize) -> Option<Frame>
    where
        I: InfoSource + ?Sized,
    {
        match self.visited.get(package) {
            Some(&seen) if seen <= depth => return None,
            _ => {
                self.visited.insert(package.to_string(), depth);
            }
        }
        if self.max_depth != 0 && depth + 1 > self.max_depth {
            return None;
        }

        debug!(%package, depth, "scanning");
        let listed = info
            .info(package)
            .map(|text| dependencies(&text))
            .unwrap_or_default();
        let pending: Vec<(DependencyKind, String)> = listed
            .into_iter()
            .flat_map(|(kind, names)| names.into_iter().map(move |name| (kind, name)))
            .collect();

        Some(Frame {
            package: package.to_string(),
            depth,
            pending: pending.into_iter(),
        })
    }
}
