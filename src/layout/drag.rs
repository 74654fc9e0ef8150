use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SkillTreeError;
use crate::graph::{GraphIndex, SkillTreeNode};
use crate::ir::Point;

/// All nodes reachable through `dependents` edges from `slug`, in breadth-first
/// discovery order. The start node is never included, even when a cycle leads
/// back to it.
pub fn transitive_dependents(slug: &str, nodes: &[SkillTreeNode]) -> Vec<String> {
    let index = GraphIndex::new(nodes);
    let Some(start) = index.get(slug) else {
        return Vec::new();
    };
    collect_dependents(start, nodes, &index)
        .into_iter()
        .map(|idx| nodes[idx].slug().to_string())
        .collect()
}

fn collect_dependents(start: usize, nodes: &[SkillTreeNode], index: &GraphIndex) -> Vec<usize> {
    let mut visited = vec![false; nodes.len()];
    visited[start] = true;
    let mut queue = VecDeque::from([start]);
    let mut found = Vec::new();
    while let Some(idx) = queue.pop_front() {
        for dependent in &nodes[idx].dependents {
            let Some(dep_idx) = index.get(dependent) else {
                continue;
            };
            if visited[dep_idx] {
                continue;
            }
            visited[dep_idx] = true;
            found.push(dep_idx);
            queue.push_back(dep_idx);
        }
    }
    found
}

/// Moves `slug` to `new_position` and carries every transitive dependent along
/// by the same offset. Returns an empty map when `slug` is unknown.
pub fn propagate_drag(
    slug: &str,
    new_position: Point,
    nodes: &[SkillTreeNode],
) -> BTreeMap<String, Point> {
    let index = GraphIndex::new(nodes);
    let mut moved = BTreeMap::new();
    let Some(start) = index.get(slug) else {
        return moved;
    };
    let offset = new_position - nodes[start].position;
    moved.insert(slug.to_string(), new_position);
    for idx in collect_dependents(start, nodes, &index) {
        let node = &nodes[idx];
        moved.insert(node.slug().to_string(), node.position + offset);
    }
    tracing::debug!(slug, moved = moved.len(), "propagated drag");
    moved
}

/// Caller-owned absolute positions layered over the resolved layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionOverlay {
    positions: BTreeMap<String, Point>,
}

impl PositionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn get(&self, slug: &str) -> Option<Point> {
        self.positions.get(slug).copied()
    }

    pub fn insert(&mut self, slug: &str, position: Point) {
        self.positions.insert(slug.to_string(), position);
    }

    pub fn merge(&mut self, moved: BTreeMap<String, Point>) {
        self.positions.extend(moved);
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> {
        self.positions.iter().map(|(slug, point)| (slug.as_str(), *point))
    }

    /// Writes overlay positions onto matching nodes. Unknown slugs are ignored.
    pub fn apply(&self, nodes: &mut [SkillTreeNode]) {
        if self.positions.is_empty() {
            return;
        }
        for node in nodes.iter_mut() {
            if let Some(point) = self.positions.get(node.slug()) {
                node.position = *point;
            }
        }
    }

    pub fn from_json(input: &str) -> Result<Self, SkillTreeError> {
        serde_json::from_str(input).map_err(|err| SkillTreeError::Parse {
            what: "position overlay",
            message: err.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, SkillTreeError> {
        serde_json::to_string_pretty(self).map_err(|source| SkillTreeError::Serialize {
            what: "position overlay",
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SkillTreeError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SkillTreeError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        Self::from_json(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<(), SkillTreeError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| SkillTreeError::Io {
            source,
            path: path.to_path_buf(),
        })
    }
}

/// One drag gesture. Positions are read from the nodes as they were when the
/// gesture began; callers apply previews to a render copy, not to those nodes.
#[derive(Debug, Clone)]
pub struct DragSession {
    slug: String,
    origin: Point,
    delta: Point,
}

impl DragSession {
    pub fn begin(slug: &str, nodes: &[SkillTreeNode]) -> Option<Self> {
        let node = nodes.iter().find(|node| node.slug() == slug)?;
        Some(Self {
            slug: slug.to_string(),
            origin: node.position,
            delta: Point::default(),
        })
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn current_position(&self) -> Point {
        self.origin + self.delta
    }

    /// Accumulates a pointer delta and returns the preview positions.
    pub fn pointer_moved(&mut self, delta: Point, nodes: &[SkillTreeNode]) -> BTreeMap<String, Point> {
        self.delta = self.delta + delta;
        propagate_drag(&self.slug, self.current_position(), nodes)
    }

    pub fn release(self, final_position: Point, nodes: &[SkillTreeNode]) -> BTreeMap<String, Point> {
        propagate_drag(&self.slug, final_position, nodes)
    }
}

/// Drag mode state: the overlay and the gesture in flight. Turning drag mode
/// off drops every custom position.
#[derive(Debug, Clone)]
pub struct DragController {
    enabled: bool,
    overlay: PositionOverlay,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(overlay: PositionOverlay) -> Self {
        Self {
            enabled: true,
            overlay,
            session: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn overlay(&self) -> &PositionOverlay {
        &self.overlay
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.overlay.clear();
            self.session = None;
        }
    }

    /// `nodes` are resolver output; the overlay is applied internally.
    pub fn begin(&mut self, slug: &str, nodes: &[SkillTreeNode]) -> bool {
        if !self.enabled {
            return false;
        }
        let current = self.overlaid(nodes);
        self.session = DragSession::begin(slug, &current);
        self.session.is_some()
    }

    pub fn pointer_moved(
        &mut self,
        delta: Point,
        nodes: &[SkillTreeNode],
    ) -> Option<BTreeMap<String, Point>> {
        let current = self.overlaid(nodes);
        let session = self.session.as_mut()?;
        Some(session.pointer_moved(delta, &current))
    }

    pub fn release(&mut self, final_position: Point, nodes: &[SkillTreeNode]) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        let current = self.overlaid(nodes);
        let moved = session.release(final_position, &current);
        self.overlay.merge(moved);
        true
    }

    fn overlaid(&self, nodes: &[SkillTreeNode]) -> Vec<SkillTreeNode> {
        let mut current = nodes.to_vec();
        self.overlay.apply(&mut current);
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::graph::build_graph;
    use crate::ir::Exercise;
    use crate::layout::resolve_layout;

    fn sample() -> Vec<SkillTreeNode> {
        let exercises = vec![
            Exercise::new("root"),
            Exercise::new("mid").with_dependencies(&["root"]),
            Exercise::new("leaf").with_dependencies(&["mid"]),
            Exercise::new("side").with_position(200.0, 0.0),
        ];
        let mut nodes = build_graph(&exercises, &[]);
        resolve_layout(&mut nodes, &LayoutConfig::default());
        nodes
    }

    #[test]
    fn dragging_root_moves_whole_chain() {
        let nodes = sample();
        let moved = propagate_drag("root", Point::new(20.0, 0.0), &nodes);
        assert_eq!(moved.len(), 3);
        assert_eq!(moved["root"], Point::new(20.0, 0.0));
        assert_eq!(moved["mid"], Point::new(20.0, 50.0));
        assert_eq!(moved["leaf"], Point::new(20.0, 100.0));
        assert!(!moved.contains_key("side"));
    }

    #[test]
    fn dragging_leaf_moves_only_leaf() {
        let nodes = sample();
        let moved = propagate_drag("leaf", Point::new(-10.0, 90.0), &nodes);
        assert_eq!(moved.len(), 1);
        assert_eq!(moved["leaf"], Point::new(-10.0, 90.0));
    }

    #[test]
    fn unknown_slug_is_a_no_op() {
        assert!(propagate_drag("ghost", Point::new(1.0, 1.0), &sample()).is_empty());
        assert!(transitive_dependents("ghost", &sample()).is_empty());
    }

    #[test]
    fn diamond_dependents_share_one_offset() {
        let exercises = vec![
            Exercise::new("a"),
            Exercise::new("b").with_dependencies(&["a"]).with_position(-40.0, 50.0),
            Exercise::new("c").with_dependencies(&["a"]).with_position(40.0, 50.0),
            Exercise::new("d").with_dependencies(&["b", "c"]),
        ];
        let mut nodes = build_graph(&exercises, &[]);
        resolve_layout(&mut nodes, &LayoutConfig::default());
        let moved = propagate_drag("a", Point::new(5.0, 15.0), &nodes);
        for node in &nodes {
            let delta = moved[node.slug()] - node.position;
            assert_eq!(delta, Point::new(5.0, 15.0), "{}", node.slug());
        }
        assert_eq!(transitive_dependents("a", &nodes), vec!["b", "c", "d"]);
    }

    #[test]
    fn cyclic_dependents_terminate_and_keep_target() {
        let exercises = vec![
            Exercise::new("a").with_dependencies(&["b"]),
            Exercise::new("b").with_dependencies(&["a"]),
        ];
        let mut nodes = build_graph(&exercises, &[]);
        resolve_layout(&mut nodes, &LayoutConfig::default());
        let moved = propagate_drag("a", Point::new(0.0, 0.0), &nodes);
        assert_eq!(moved.len(), 2);
        assert_eq!(moved["a"], Point::new(0.0, 0.0));
        assert_eq!(transitive_dependents("a", &nodes), vec!["b"]);
    }

    #[test]
    fn overlay_round_trips_through_json() {
        let mut overlay = PositionOverlay::new();
        overlay.insert("a", Point::new(1.5, -2.0));
        let json = overlay.to_json().unwrap();
        assert!(json.contains("\"a\""));
        assert_eq!(PositionOverlay::from_json(&json).unwrap(), overlay);
        assert!(PositionOverlay::from_json("[1, 2]").is_err());
    }

    #[test]
    fn overlay_applies_only_known_slugs() {
        let mut nodes = sample();
        let mut overlay = PositionOverlay::new();
        overlay.insert("mid", Point::new(7.0, 7.0));
        overlay.insert("ghost", Point::new(9.0, 9.0));
        overlay.apply(&mut nodes);
        let mid = nodes.iter().find(|node| node.slug() == "mid").unwrap();
        assert_eq!(mid.position, Point::new(7.0, 7.0));
        let leaf = nodes.iter().find(|node| node.slug() == "leaf").unwrap();
        assert_eq!(leaf.position, Point::new(0.0, 100.0));
    }

    #[test]
    fn session_accumulates_pointer_deltas() {
        let nodes = sample();
        let mut session = DragSession::begin("mid", &nodes).unwrap();
        session.pointer_moved(Point::new(3.0, 0.0), &nodes);
        let preview = session.pointer_moved(Point::new(2.0, 5.0), &nodes);
        assert_eq!(preview["mid"], Point::new(5.0, 55.0));
        assert_eq!(preview["leaf"], Point::new(5.0, 105.0));
        assert_eq!(session.current_position(), Point::new(5.0, 55.0));
        let done = session.release(Point::new(10.0, 50.0), &nodes);
        assert_eq!(done["leaf"], Point::new(10.0, 100.0));
        assert!(DragSession::begin("ghost", &nodes).is_none());
    }

    #[test]
    fn controller_builds_on_previous_drags_and_clears_when_disabled() {
        let nodes = sample();
        let mut controller = DragController::new(PositionOverlay::new());
        assert!(controller.begin("root", &nodes));
        assert!(controller.release(Point::new(10.0, 0.0), &nodes));
        assert!(controller.begin("mid", &nodes));
        let preview = controller.pointer_moved(Point::new(0.0, 10.0), &nodes).unwrap();
        assert_eq!(preview["leaf"], Point::new(10.0, 110.0));
        assert!(controller.release(Point::new(10.0, 60.0), &nodes));
        assert_eq!(controller.overlay().get("root"), Some(Point::new(10.0, 0.0)));
        assert_eq!(controller.overlay().get("leaf"), Some(Point::new(10.0, 110.0)));

        controller.set_enabled(false);
        assert!(controller.overlay().is_empty());
        assert!(!controller.begin("root", &nodes));
        assert!(!controller.release(Point::new(0.0, 0.0), &nodes));
    }
}
