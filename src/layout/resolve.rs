use crate::config::LayoutConfig;
use crate::graph::{GraphIndex, SkillTreeNode};
use crate::ir::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    InProgress,
    Positioned,
}

/// Assigns absolute positions from the relative offsets stored on each exercise.
///
/// Dependencies are positioned first (post-order). A node with resolvable
/// dependencies is placed at its anchor dependency plus its own offset, where
/// the anchor is the dependency with the largest `x + y`; on a tie the first
/// dependency in declaration order wins. Roots, and nodes whose dependencies
/// all fail to resolve, sit at their own offset.
///
/// Positions are reset before resolving, so repeated calls give identical
/// results. A dependency that is still being resolved (a cycle) contributes
/// whatever position it currently holds.
pub fn resolve_layout(nodes: &mut [SkillTreeNode], config: &LayoutConfig) {
    let index = GraphIndex::new(nodes);
    for node in nodes.iter_mut() {
        node.position = Point::default();
    }

    let mut visits = vec![Visit::Pending; nodes.len()];
    let mut stack: Vec<(usize, bool)> = Vec::new();

    for root in 0..nodes.len() {
        if visits[root] != Visit::Pending {
            continue;
        }
        stack.push((root, false));
        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                nodes[idx].position = place_node(idx, nodes, &index, config);
                visits[idx] = Visit::Positioned;
                continue;
            }
            if visits[idx] != Visit::Pending {
                continue;
            }
            visits[idx] = Visit::InProgress;
            stack.push((idx, true));
            for dep in nodes[idx].dependencies.iter().rev() {
                if let Some(dep_idx) = index.get(dep)
                    && visits[dep_idx] == Visit::Pending
                {
                    stack.push((dep_idx, false));
                }
            }
        }
    }

    tracing::debug!(nodes = nodes.len(), "resolved skill tree layout");
}

fn place_node(
    idx: usize,
    nodes: &[SkillTreeNode],
    index: &GraphIndex,
    config: &LayoutConfig,
) -> Point {
    let node = &nodes[idx];
    match anchor_dependency(node, nodes, index) {
        Some(anchor) => {
            nodes[anchor].position + node.offset().unwrap_or(config.dependent_offset)
        }
        None => node.offset().unwrap_or_default(),
    }
}

/// Index of the dependency with the largest `x + y`. First encountered wins ties.
pub(crate) fn anchor_dependency(
    node: &SkillTreeNode,
    nodes: &[SkillTreeNode],
    index: &GraphIndex,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for dep in &node.dependencies {
        let Some(dep_idx) = index.get(dep) else {
            continue;
        };
        match best {
            Some(current)
                if nodes[current].position.diagonal() >= nodes[dep_idx].position.diagonal() => {}
            _ => best = Some(dep_idx),
        }
    }
    best
}
