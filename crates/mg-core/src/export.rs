//! Graph export in DOT (Graphviz) and JSON form

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::graph::MigrationGraph;
use crate::loader::load_from_dir;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Dot,
    Json,
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dot" => Ok(ExportFormat::Dot),
            "json" => Ok(ExportFormat::Json),
            other => Err(CoreError::UnsupportedExportFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Dot => write!(f, "dot"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportNode<'a> {
    timestamp: i64,
    name: &'a str,
    parents: Vec<i64>,
    children: Vec<i64>,
}

/// Load the configured migrations and write their graph to `writer`.
pub fn export_graph(writer: &mut dyn Write, config: &Config, format: ExportFormat) -> CoreResult<()> {
    let graph = MigrationGraph::build(load_from_dir(&config.migrations_dir())?)?;
    if graph.is_empty() {
        return Err(CoreError::NoMigrations);
    }

    let rendered = match format {
        ExportFormat::Dot => render_dot(&graph),
        ExportFormat::Json => render_json(&graph)?,
    };
    writer.write_all(rendered.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Render the graph as a Graphviz digraph, vertices and edges ascending.
pub fn render_dot(graph: &MigrationGraph) -> String {
    let mut out = String::from("digraph Migrations {\n  node [shape=box];\n");
    for def in graph.definitions() {
        out.push_str(&format!(
            "  \"{}\" [label=\"{}\\n({})\"];\n",
            def.timestamp,
            def.name.replace('"', "\\\""),
            def.timestamp
        ));
    }
    for (parent, children) in graph.adjacency_map() {
        for child in children {
            out.push_str(&format!("  \"{parent}\" -> \"{child}\";\n"));
        }
    }
    out.push_str("}\n");
    out
}

/// Render the graph as pretty JSON keyed by timestamp.
pub fn render_json(graph: &MigrationGraph) -> CoreResult<String> {
    let nodes: BTreeMap<i64, ExportNode<'_>> = graph
        .definitions()
        .map(|def| {
            (
                def.timestamp,
                ExportNode {
                    timestamp: def.timestamp,
                    name: &def.name,
                    parents: graph.parents(def.timestamp),
                    children: graph.children(def.timestamp),
                },
            )
        })
        .collect();

    let mut json = serde_json::to_string_pretty(&nodes)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
