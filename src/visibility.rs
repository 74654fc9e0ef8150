use std::collections::BTreeSet;

use crate::config::VisibilityConfig;
use crate::graph::SkillTreeNode;
use crate::ir::{Difficulty, ExerciseStatus};

/// Active filter selections. An empty set means that category is not filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub paths: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub difficulties: BTreeSet<Difficulty>,
    pub statuses: BTreeSet<ExerciseStatus>,
    pub search: String,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
            && self.products.is_empty()
            && self.difficulties.is_empty()
            && self.statuses.is_empty()
            && self.search.trim().is_empty()
    }
}

fn matches_search(node: &SkillTreeNode, needle: &str) -> bool {
    let exercise = &node.exercise;
    let hit = |text: &str| text.to_lowercase().contains(needle);
    hit(&exercise.name)
        || hit(&exercise.slug)
        || hit(&exercise.description)
        || exercise.tags.iter().any(|tag| hit(tag))
}

/// Opacity for one node. A non-empty search decides on its own; otherwise a
/// status mismatch pins the node to the status floor and the remaining
/// categories interpolate between the filter floor and fully opaque.
pub fn visibility(node: &SkillTreeNode, filters: &Filters, config: &VisibilityConfig) -> f32 {
    let needle = filters.search.trim().to_lowercase();
    if !needle.is_empty() {
        return if matches_search(node, &needle) {
            1.0
        } else {
            config.search_miss_opacity.clamp(0.0, 1.0)
        };
    }

    if !filters.statuses.is_empty() && !filters.statuses.contains(&node.exercise.status) {
        return config.status_floor.clamp(0.0, 1.0);
    }

    let mut active = 0u32;
    let mut matched = 0u32;
    if !filters.paths.is_empty() {
        active += 1;
        if filters.paths.contains(&node.path.slug) {
            matched += 1;
        }
    }
    if !filters.products.is_empty() {
        active += 1;
        if node
            .exercise
            .products
            .iter()
            .any(|product| filters.products.contains(product))
        {
            matched += 1;
        }
    }
    if !filters.difficulties.is_empty() {
        active += 1;
        if node
            .exercise
            .difficulty
            .is_some_and(|difficulty| filters.difficulties.contains(&difficulty))
        {
            matched += 1;
        }
    }
    if active == 0 {
        return 1.0;
    }

    let floor = config.filter_floor.clamp(0.0, 1.0);
    let ratio = matched as f32 / active as f32;
    (floor + (1.0 - floor) * ratio).clamp(0.0, 1.0)
}
