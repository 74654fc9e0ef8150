pub mod drag;
pub mod resolve;
pub mod routing;
pub(crate) mod types;

pub use drag::{DragController, DragSession, PositionOverlay, propagate_drag, transitive_dependents};
pub use resolve::resolve_layout;
pub use routing::{
    ObstacleNode, Route, RouteStrategy, build_obstacles, path_obstacle_intersections, route_path,
    route_path_with_strategy, segment_intersects_circle,
};
pub use types::*;

use std::collections::BTreeMap;

use crate::config::{LayoutConfig, VisibilityConfig};
use crate::graph::{GraphIndex, SkillTreeNode, build_graph};
use crate::ir::SkillTreeData;
use crate::visibility::{Filters, visibility};

/// Builds, resolves and routes the whole tree in one pass.
pub fn compute_layout(
    data: &SkillTreeData,
    overlay: &PositionOverlay,
    filters: &Filters,
    config: &LayoutConfig,
    visibility_config: &VisibilityConfig,
) -> Layout {
    let mut nodes = build_graph(&data.exercises, &data.paths);
    resolve_layout(&mut nodes, config);
    overlay.apply(&mut nodes);
    layout_nodes(&nodes, overlay, filters, config, visibility_config)
}

/// Turns positioned nodes into a render-ready layout. Routing only looks at
/// positions, so two calls that differ only in `filters` produce identical edges.
pub fn layout_nodes(
    nodes: &[SkillTreeNode],
    overlay: &PositionOverlay,
    filters: &Filters,
    config: &LayoutConfig,
    visibility_config: &VisibilityConfig,
) -> Layout {
    if nodes.is_empty() {
        return Layout::empty();
    }

    let index = GraphIndex::new(nodes);
    let mut node_layouts = BTreeMap::new();
    for node in nodes {
        if node_layouts.contains_key(node.slug()) {
            continue;
        }
        node_layouts.insert(
            node.slug().to_string(),
            NodeLayout {
                slug: node.slug().to_string(),
                name: node.exercise.name.clone(),
                x: node.position.x,
                y: node.position.y,
                radius: config.node_radius,
                path_slug: node.path.slug.clone(),
                color: node.path.color.clone(),
                status: node.exercise.status,
                icon: node.icon.clone(),
                opacity: visibility(node, filters, visibility_config),
                custom_position: overlay.get(node.slug()).is_some(),
            },
        );
    }

    let edges = route_edges(nodes, &index, config, &node_layouts);

    let pad = config.padding + config.node_radius;
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for node in node_layouts.values() {
        min_x = min_x.min(node.x - pad);
        min_y = min_y.min(node.y - pad);
        max_x = max_x.max(node.x + pad);
        max_y = max_y.max(node.y + pad);
    }
    for edge in &edges {
        for point in &edge.points {
            min_x = min_x.min(point.x - config.padding);
            min_y = min_y.min(point.y - config.padding);
            max_x = max_x.max(point.x + config.padding);
            max_y = max_y.max(point.y + config.padding);
        }
    }

    Layout {
        nodes: node_layouts,
        edges,
        min_x,
        min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}

fn route_edges(
    nodes: &[SkillTreeNode],
    index: &GraphIndex,
    config: &LayoutConfig,
    node_layouts: &BTreeMap<String, NodeLayout>,
) -> Vec<EdgeLayout> {
    let mut edges = Vec::new();
    let mut blocked = 0usize;
    for node in nodes {
        for dep in &node.dependencies {
            let Some(dep_idx) = index.get(dep) else {
                continue;
            };
            let source = &nodes[dep_idx];
            let obstacles = build_obstacles(nodes, source.slug(), node.slug(), config.node_radius);
            let route = route_path_with_strategy(
                source.position,
                node.position,
                &obstacles,
                config.node_radius,
                &config.routing,
            );
            if route.blocked {
                blocked += 1;
            }
            let opacity = match (node_layouts.get(source.slug()), node_layouts.get(node.slug())) {
                (Some(a), Some(b)) => a.opacity.min(b.opacity),
                _ => 1.0,
            };
            edges.push(EdgeLayout {
                from: source.slug().to_string(),
                to: node.slug().to_string(),
                points: route.points,
                strategy: route.strategy,
                blocked: route.blocked,
                opacity,
            });
        }
    }
    if blocked > 0 {
        tracing::warn!(blocked, edges = edges.len(), "connectors overlap nodes");
    }
    tracing::debug!(edges = edges.len(), "routed connectors");
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Exercise, Path, Point};

    fn data() -> SkillTreeData {
        SkillTreeData {
            exercises: vec![
                Exercise::new("root").with_path("a"),
                Exercise::new("mid").with_dependencies(&["root"]).with_path("b"),
                Exercise::new("leaf").with_dependencies(&["mid", "ghost"]),
                Exercise::new("wide")
                    .with_dependencies(&["root"])
                    .with_position(120.0, 100.0),
            ],
            paths: vec![Path::new("a", "#111111"), Path::new("b", "#222222")],
        }
    }

    fn layout(overlay: &PositionOverlay, filters: &Filters) -> Layout {
        compute_layout(
            &data(),
            overlay,
            filters,
            &LayoutConfig::default(),
            &VisibilityConfig::default(),
        )
    }

    #[test]
    fn emits_one_edge_per_resolved_dependency() {
        let layout = layout(&PositionOverlay::new(), &Filters::default());
        assert_eq!(layout.nodes.len(), 4);
        let pairs: Vec<(&str, &str)> = layout
            .edges
            .iter()
            .map(|edge| (edge.from.as_str(), edge.to.as_str()))
            .collect();
        assert_eq!(pairs, vec![("root", "mid"), ("mid", "leaf"), ("root", "wide")]);
        assert_eq!(layout.nodes["mid"].color, "#222222");
        assert_eq!(layout.nodes["leaf"].color, "#111111");
    }

    #[test]
    fn bounds_cover_every_node() {
        let layout = layout(&PositionOverlay::new(), &Filters::default());
        for node in layout.nodes.values() {
            assert!(node.x - node.radius >= layout.min_x);
            assert!(node.y - node.radius >= layout.min_y);
            assert!(node.x + node.radius <= layout.min_x + layout.width);
            assert!(node.y + node.radius <= layout.min_y + layout.height);
        }
    }

    #[test]
    fn overlay_moves_nodes_and_edges() {
        let mut overlay = PositionOverlay::new();
        overlay.insert("leaf", Point::new(300.0, 400.0));
        let layout = layout(&overlay, &Filters::default());
        let leaf = &layout.nodes["leaf"];
        assert_eq!(leaf.center(), Point::new(300.0, 400.0));
        assert!(leaf.custom_position);
        assert!(!layout.nodes["mid"].custom_position);
        let edge = layout.edges.iter().find(|edge| edge.to == "leaf").unwrap();
        assert_eq!(*edge.points.last().unwrap(), Point::new(300.0, 380.0));
    }

    #[test]
    fn filters_change_opacity_but_not_routes() {
        let plain = layout(&PositionOverlay::new(), &Filters::default());
        let mut filters = Filters::default();
        filters.paths.insert("b".to_string());
        let filtered = layout(&PositionOverlay::new(), &filters);
        assert!(filtered.nodes["root"].opacity < 1.0);
        assert_eq!(filtered.nodes["mid"].opacity, 1.0);
        for (a, b) in plain.edges.iter().zip(&filtered.edges) {
            assert_eq!(a.points, b.points);
        }
        let edge = filtered.edges.iter().find(|edge| edge.to == "mid").unwrap();
        assert_eq!(edge.opacity, filtered.nodes["root"].opacity);
    }

    #[test]
    fn empty_input_gives_empty_layout() {
        let layout = compute_layout(
            &SkillTreeData::default(),
            &PositionOverlay::new(),
            &Filters::default(),
            &LayoutConfig::default(),
            &VisibilityConfig::default(),
        );
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
        assert_eq!(layout.width, 0.0);
    }
}
