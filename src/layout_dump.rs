use crate::layout::{Layout, RouteStrategy};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub slug: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub path: String,
    pub status: String,
    pub opacity: f32,
    pub custom_position: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub strategy: String,
    pub blocked: bool,
    pub points: Vec<[f32; 2]>,
}

fn strategy_name(strategy: RouteStrategy) -> &'static str {
    match strategy {
        RouteStrategy::Direct => "direct",
        RouteStrategy::HorizontalFirst => "horizontal-first",
        RouteStrategy::VerticalFirst => "vertical-first",
        RouteStrategy::WideArc => "wide-arc",
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                slug: node.slug.clone(),
                name: node.name.clone(),
                x: node.x,
                y: node.y,
                radius: node.radius,
                path: node.path_slug.clone(),
                status: node.status.as_str().to_string(),
                opacity: node.opacity,
                custom_position: node.custom_position,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                strategy: strategy_name(edge.strategy).to_string(),
                blocked: edge.blocked,
                points: edge.points.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect();

        LayoutDump {
            min_x: layout.min_x,
            min_y: layout.min_y,
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: Option<&Path>, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, &dump)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}
