use std::collections::BTreeMap;

use crate::graph::NodeIcon;
use crate::ir::{ExerciseStatus, Point};

use super::routing::RouteStrategy;

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub slug: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub path_slug: String,
    pub color: String,
    pub status: ExerciseStatus,
    pub icon: NodeIcon,
    pub opacity: f32,
    /// Position comes from the drag overlay rather than the resolver.
    pub custom_position: bool,
}

impl NodeLayout {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    pub points: Vec<Point>,
    pub strategy: RouteStrategy,
    pub blocked: bool,
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn empty() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            min_x: 0.0,
            min_y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}
