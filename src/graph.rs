use std::collections::HashMap;

use crate::ir::{Exercise, ExerciseStatus, Path, Point};

/// Icon shown inside a node, decided once when the graph is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeIcon {
    Custom(String),
    Status(ExerciseStatus),
}

impl NodeIcon {
    pub fn resolve(exercise: &Exercise) -> Self {
        match exercise.icon.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Self::Custom(name.to_string()),
            _ => Self::Status(exercise.status),
        }
    }

    /// Short text glyph drawn by the SVG renderer.
    pub fn glyph(&self) -> String {
        match self {
            Self::Custom(name) => name.chars().take(2).collect::<String>().to_uppercase(),
            Self::Status(ExerciseStatus::Active) => "\u{2713}".to_string(),
            Self::Status(ExerciseStatus::Scheduled) => "\u{25F7}".to_string(),
            Self::Status(ExerciseStatus::Tentative) => "?".to_string(),
            Self::Status(ExerciseStatus::InDevelopment) => "\u{2692}".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkillTreeNode {
    pub exercise: Exercise,
    pub path: Path,
    pub dependencies: Vec<String>,
    pub dependents: Vec<String>,
    /// Absolute position, filled in by the layout resolver.
    pub position: Point,
    pub icon: NodeIcon,
}

impl SkillTreeNode {
    pub fn slug(&self) -> &str {
        &self.exercise.slug
    }

    /// The exercise's own relative offset, if it declared one.
    pub fn offset(&self) -> Option<Point> {
        self.exercise.position
    }
}

/// Arena lookup from slug to index into a node slice. First occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    by_slug: HashMap<String, usize>,
}

impl GraphIndex {
    pub fn new(nodes: &[SkillTreeNode]) -> Self {
        let mut by_slug = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            by_slug.entry(node.slug().to_string()).or_insert(idx);
        }
        Self { by_slug }
    }

    pub fn get(&self, slug: &str) -> Option<usize> {
        self.by_slug.get(slug).copied()
    }

    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }
}

fn resolve_path(exercise: &Exercise, paths: &[Path], fallback: &Path) -> Path {
    if let Some(slug) = exercise.path_slug.as_deref() {
        if let Some(path) = paths.iter().find(|path| path.slug == slug) {
            return path.clone();
        }
        tracing::warn!(
            exercise = %exercise.slug,
            path = slug,
            "unknown path, using fallback"
        );
    }
    fallback.clone()
}

pub fn build_graph(exercises: &[Exercise], paths: &[Path]) -> Vec<SkillTreeNode> {
    let fallback = paths.first().cloned().unwrap_or_else(Path::fallback);

    let mut nodes: Vec<SkillTreeNode> = exercises
        .iter()
        .map(|exercise| SkillTreeNode {
            path: resolve_path(exercise, paths, &fallback),
            dependencies: exercise.dependencies.clone().unwrap_or_default(),
            dependents: Vec::new(),
            position: Point::default(),
            icon: NodeIcon::resolve(exercise),
            exercise: exercise.clone(),
        })
        .collect();

    let index = GraphIndex::new(&nodes);
    if index.len() != nodes.len() {
        tracing::warn!(
            nodes = nodes.len(),
            unique = index.len(),
            "duplicate exercise slugs; first occurrence is used for lookups"
        );
    }

    let mut links: Vec<(usize, String)> = Vec::new();
    for node in &nodes {
        for dep in &node.dependencies {
            match index.get(dep) {
                Some(dep_idx) => links.push((dep_idx, node.slug().to_string())),
                None => tracing::warn!(
                    exercise = %node.slug(),
                    dependency = %dep,
                    "dependency not found, skipping"
                ),
            }
        }
    }
    for (dep_idx, dependent) in links {
        let dependents = &mut nodes[dep_idx].dependents;
        if !dependents.contains(&dependent) {
            dependents.push(dependent);
        }
    }

    tracing::debug!(nodes = nodes.len(), paths = paths.len(), "built skill tree graph");
    nodes
}
