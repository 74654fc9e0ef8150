#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod theme;
pub mod visibility;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, RoutingConfig, VisibilityConfig, load_config};
pub use error::SkillTreeError;
pub use graph::{NodeIcon, SkillTreeNode, build_graph};
pub use ir::{Difficulty, Exercise, ExerciseStatus, Path, Point, SkillTreeData};
pub use layout::{
    DragController, DragSession, Layout, ObstacleNode, PositionOverlay, compute_layout,
    propagate_drag, resolve_layout, route_path,
};
pub use render::render_svg;
pub use theme::Theme;
pub use visibility::{Filters, visibility};

/// Everything needed to go from input data to SVG in one call.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub visibility: VisibilityConfig,
    pub render: RenderConfig,
    pub filters: Filters,
    pub overlay: PositionOverlay,
}

impl RenderOptions {
    pub fn skill_tree_default() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        let theme = Theme::modern();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            render,
            ..Default::default()
        }
    }
}

/// Parses skill tree data (JSON or JSON5) and renders it to SVG.
pub fn render_with_options(input: &str, options: &RenderOptions) -> Result<String, SkillTreeError> {
    let data = SkillTreeData::parse(input)?;
    let layout = compute_layout(
        &data,
        &options.overlay,
        &options.filters,
        &options.layout,
        &options.visibility,
    );
    Ok(render_svg(&layout, &options.theme, &options.render))
}
