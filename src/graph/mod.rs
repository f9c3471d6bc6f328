use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::exec::CommandRunner;

pub mod dot;
pub mod info;
pub mod traverse;

pub use dot::{DotWriter, GraphSink, RenderProcess};
pub use info::{InfoSource, PortInfo};
pub use traverse::Traversal;

/// Why one port depends on another. Only affects how the edge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Build,
    Library,
    Runtime,
}

impl DependencyKind {
    /// Section labels as printed by `port info`, in the order lines are
    /// classified.
    const LABELS: [(&'static str, DependencyKind); 3] = [
        ("Build Dependencies", DependencyKind::Build),
        ("Library Dependencies", DependencyKind::Library),
        ("Runtime Dependencies", DependencyKind::Runtime),
    ];

    pub fn classify(line: &str) -> Option<Self> {
        Self::LABELS
            .iter()
            .find(|(label, _)| line.contains(label))
            .map(|(_, kind)| *kind)
    }

    pub fn style(self) -> Option<&'static str> {
        match self {
            DependencyKind::Build => Some("dotted"),
            DependencyKind::Library => None,
            DependencyKind::Runtime => Some("dashed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    pub kind: DependencyKind,
}

impl DependencyEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" -> \"{}\"",
            dot::escape_dot_id(&self.from),
            dot::escape_dot_id(&self.to)
        )?;
        if let Some(style) = self.kind.style() {
            write!(f, " [style={style}]")?;
        }
        f.write_str(";")
    }
}

/// Walks every root into one shared graph, piping the description through
/// `dot` as edges are discovered, and returns the rendered image.
pub fn render_graph(
    runner: &dyn CommandRunner,
    port: &str,
    dot: &str,
    format: &str,
    roots: &[String],
    max_depth: usize,
) -> Result<Vec<u8>> {
    let info = PortInfo::new(runner, port);
    let render = RenderProcess::start(runner, dot, format)?;
    let mut writer = DotWriter::begin(render)?;
    let mut traversal = Traversal::new(max_depth);
    for root in roots {
        traversal.scan(&info, &mut writer, root, 0)?;
    }
    debug!(
        edges = traversal.edge_count(),
        visited = traversal.visited_count(),
        "traversal complete"
    );
    writer.finish(roots)?.finish()
}
