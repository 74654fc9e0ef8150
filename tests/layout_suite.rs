use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use skill_tree_layout::layout::{
    RouteStrategy, build_obstacles, path_obstacle_intersections, transitive_dependents,
};
use skill_tree_layout::{
    Filters, LayoutConfig, Point, PositionOverlay, RenderConfig, SkillTreeData, SkillTreeNode,
    Theme, VisibilityConfig, build_graph, compute_layout, propagate_drag, render_svg,
    resolve_layout,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> SkillTreeData {
    SkillTreeData::load(&fixture_path(name)).expect("fixture load failed")
}

fn resolved(data: &SkillTreeData) -> Vec<SkillTreeNode> {
    let mut nodes = build_graph(&data.exercises, &data.paths);
    resolve_layout(&mut nodes, &LayoutConfig::default());
    nodes
}

fn positions(nodes: &[SkillTreeNode]) -> BTreeMap<String, Point> {
    nodes
        .iter()
        .map(|node| (node.exercise.slug.clone(), node.position))
        .collect()
}

#[test]
fn chain_example_resolves_and_drags() {
    let nodes = resolved(&load("chain.json"));
    let pos = positions(&nodes);
    assert_eq!(pos["root"], Point::new(0.0, 0.0));
    assert_eq!(pos["mid"], Point::new(0.0, 50.0));
    assert_eq!(pos["leaf"], Point::new(0.0, 100.0));

    let moved = propagate_drag("root", Point::new(20.0, 0.0), &nodes);
    assert_eq!(moved["mid"], Point::new(20.0, 50.0));
    assert_eq!(moved["leaf"], Point::new(20.0, 100.0));
}

#[test]
fn curriculum_positions_follow_anchor_rule() {
    let data = load("curriculum.json");
    let pos = positions(&resolved(&data));
    assert_eq!(pos["hello"], Point::new(0.0, 0.0));
    assert_eq!(pos["variables"], Point::new(-120.0, 100.0));
    assert_eq!(pos["functions"], Point::new(120.0, 100.0));
    // functions has the larger x + y, default offset puts closures under it
    assert_eq!(pos["closures"], Point::new(120.0, 150.0));
    assert_eq!(pos["ownership"], Point::new(-120.0, 200.0));
    assert_eq!(pos["lifetimes"], Point::new(120.0, 200.0));
    assert_eq!(pos["unsafe"], Point::new(120.0, 250.0));
    assert_eq!(pos["bridge"], Point::new(0.0, 200.0));
}

#[test]
fn root_invariant_holds() {
    let data = load("curriculum.json");
    for node in resolved(&data) {
        if node.dependencies.is_empty() {
            assert_eq!(Some(node.position), node.exercise.position.or(Some(Point::default())));
        }
    }
}

#[test]
fn resolve_is_idempotent_on_fixtures() {
    for name in ["chain.json", "curriculum.json", "cycle.json5"] {
        let data = load(name);
        let mut nodes = build_graph(&data.exercises, &data.paths);
        let config = LayoutConfig::default();
        resolve_layout(&mut nodes, &config);
        let first = positions(&nodes);
        resolve_layout(&mut nodes, &config);
        assert_eq!(first, positions(&nodes), "{name}");
    }
}

#[test]
fn drag_keeps_dependents_coherent() {
    let nodes = resolved(&load("curriculum.json"));
    let pos = positions(&nodes);
    let target = Point::new(-200.0, 140.0);
    let moved = propagate_drag("variables", target, &nodes);
    let offset = target - pos["variables"];

    let closure = transitive_dependents("variables", &nodes);
    for slug in ["closures", "ownership", "lifetimes", "unsafe"] {
        assert!(closure.iter().any(|s| s == slug), "{slug} missing from closure");
    }
    assert_eq!(moved.len(), closure.len() + 1);
    for slug in &closure {
        assert_eq!(moved[slug] - pos[slug], offset, "{slug}");
    }
    for slug in ["hello", "functions", "bridge"] {
        assert!(!moved.contains_key(slug));
    }
}

#[test]
fn cyclic_input_terminates() {
    let data = load("cycle.json5");
    let nodes = resolved(&data);
    let pos = positions(&nodes);
    assert_eq!(pos["b"], Point::new(0.0, 50.0));
    assert_eq!(pos["a"], Point::new(0.0, 100.0));
    assert_eq!(pos["c"], Point::new(30.0, 80.0));

    let moved = propagate_drag("a", Point::new(10.0, 100.0), &nodes);
    assert_eq!(moved.len(), 3);
    assert_eq!(moved["a"], Point::new(10.0, 100.0));
    assert_eq!(moved["b"], Point::new(10.0, 50.0));
    assert_eq!(moved["c"], Point::new(40.0, 80.0));
}

#[test]
fn routes_anchor_to_node_edges_and_avoid_obstacles() {
    let data = load("curriculum.json");
    let config = LayoutConfig::default();
    let layout = compute_layout(
        &data,
        &PositionOverlay::new(),
        &Filters::default(),
        &config,
        &VisibilityConfig::default(),
    );
    let nodes = resolved(&data);
    assert!(!layout.edges.is_empty());
    for edge in &layout.edges {
        let from = layout.nodes[&edge.from].center();
        let to = layout.nodes[&edge.to].center();
        let first = edge.points[0];
        let last = edge.points[edge.points.len() - 1];
        assert!(edge.points.len() >= 2);
        assert_eq!(first, Point::new(from.x, from.y + config.node_radius));
        assert_eq!(last, Point::new(to.x, to.y - config.node_radius));

        let obstacles = build_obstacles(&nodes, &edge.from, &edge.to, config.node_radius);
        assert!(obstacles.iter().all(|o| o.slug != edge.from && o.slug != edge.to));
        if !edge.blocked {
            let hits = path_obstacle_intersections(&edge.points, &obstacles, config.routing.clearance);
            assert_eq!(hits, 0, "{} -> {}", edge.from, edge.to);
        }
    }

    let straight = layout
        .edges
        .iter()
        .find(|edge| edge.from == "hello" && edge.to == "bridge")
        .unwrap();
    assert_eq!(straight.strategy, RouteStrategy::Direct);
    assert_eq!(straight.points.len(), 2);

    // bridge sits between ownership and lifetimes; no fallback clears it
    let crowded = layout
        .edges
        .iter()
        .find(|edge| edge.from == "ownership" && edge.to == "lifetimes")
        .unwrap();
    assert!(crowded.blocked);
    assert_eq!(crowded.strategy, RouteStrategy::Direct);
}

#[test]
fn filter_changes_leave_routes_untouched() {
    let data = load("curriculum.json");
    let config = LayoutConfig::default();
    let vis = VisibilityConfig::default();
    let overlay = PositionOverlay::new();
    let base = compute_layout(&data, &overlay, &Filters::default(), &config, &vis);

    let mut filters = Filters::default();
    filters.paths.insert("systems".to_string());
    filters.products.insert("web".to_string());
    let filtered = compute_layout(&data, &overlay, &filters, &config, &vis);
    let searched = compute_layout(
        &data,
        &overlay,
        &Filters {
            search: "memory".to_string(),
            ..Default::default()
        },
        &config,
        &vis,
    );

    assert_eq!(base.edges.len(), filtered.edges.len());
    for ((a, b), c) in base.edges.iter().zip(&filtered.edges).zip(&searched.edges) {
        assert_eq!(a.points, b.points);
        assert_eq!(a.points, c.points);
    }
    assert!(filtered.nodes["hello"].opacity < 1.0);
    assert_eq!(searched.nodes["ownership"].opacity, 1.0);
    assert_eq!(searched.nodes["hello"].opacity, vis.search_miss_opacity);
}

#[test]
fn dragged_overlay_survives_save_and_load() {
    let data = load("chain.json");
    let nodes = resolved(&data);
    let mut overlay = PositionOverlay::new();
    overlay.merge(propagate_drag("mid", Point::new(40.0, 60.0), &nodes));

    let dir = std::env::temp_dir().join(format!("sktree-overlay-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("positions.json");
    overlay.save(&file).unwrap();
    let restored = PositionOverlay::load(&file).unwrap();
    std::fs::remove_dir_all(&dir).ok();
    assert_eq!(restored, overlay);

    let layout = compute_layout(
        &data,
        &restored,
        &Filters::default(),
        &LayoutConfig::default(),
        &VisibilityConfig::default(),
    );
    assert_eq!(layout.nodes["leaf"].center(), Point::new(40.0, 110.0));
    assert!(layout.nodes["leaf"].custom_position);
    assert!(!layout.nodes["root"].custom_position);
}

#[test]
fn renders_every_fixture() {
    for name in ["chain.json", "curriculum.json", "cycle.json5"] {
        let data = load(name);
        let layout = compute_layout(
            &data,
            &PositionOverlay::new(),
            &Filters::default(),
            &LayoutConfig::default(),
            &VisibilityConfig::default(),
        );
        let svg = render_svg(&layout, &Theme::modern(), &RenderConfig::default());
        assert!(svg.contains("<svg"), "{name}: missing <svg tag");
        assert!(svg.contains("</svg>"), "{name}: missing </svg tag");
        assert_eq!(svg.matches("<circle").count(), data.exercises.len(), "{name}");
    }
}

#[test]
fn missing_fixture_reports_io_error() {
    let err = SkillTreeData::load(&fixture_path("does-not-exist.json")).unwrap_err();
    assert!(err.to_string().contains("does-not-exist.json"));
}
