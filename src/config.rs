use crate::ir::Point;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Extra distance kept between a connector and any obstacle circle.
    pub clearance: f32,
    /// Fraction of the vertical run taken before the bend on a downward direct route.
    pub direct_down_ratio: f32,
    /// Fraction of the horizontal run taken before the bend on an upward direct route.
    pub direct_up_ratio: f32,
    pub wide_down_ratio: f32,
    pub wide_up_ratio: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            clearance: 6.0,
            direct_down_ratio: 0.6,
            direct_up_ratio: 0.5,
            wide_down_ratio: 0.3,
            wide_up_ratio: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_radius: f32,
    pub padding: f32,
    /// Offset applied to a dependent exercise that does not declare one.
    pub dependent_offset: Point,
    pub routing: RoutingConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_radius: 20.0,
            padding: 40.0,
            dependent_offset: Point::new(0.0, 50.0),
            routing: RoutingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    pub search_miss_opacity: f32,
    pub filter_floor: f32,
    pub status_floor: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            search_miss_opacity: 0.2,
            filter_floor: 0.3,
            status_floor: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub show_labels: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            show_labels: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub visibility: VisibilityConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::skill_tree_default();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            visibility: VisibilityConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariablesFile {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    node_border_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
    glyph_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    clearance: Option<f32>,
    direct_down_ratio: Option<f32>,
    direct_up_ratio: Option<f32>,
    wide_down_ratio: Option<f32>,
    wide_up_ratio: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_radius: Option<f32>,
    padding: Option<f32>,
    dependent_offset: Option<Point>,
    routing: Option<RoutingConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisibilityConfigFile {
    search_miss_opacity: Option<f32>,
    filter_floor: Option<f32>,
    status_floor: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
    show_labels: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariablesFile>,
    layout: Option<LayoutConfigFile>,
    visibility: Option<VisibilityConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "default" || theme_name == "base" {
            config.theme = Theme::skill_tree_default();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.node_border_color {
            config.theme.node_border_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.glyph_color {
            config.theme.glyph_color = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_radius {
            config.layout.node_radius = v.max(0.0);
        }
        if let Some(v) = layout.padding {
            config.layout.padding = v.max(0.0);
        }
        if let Some(v) = layout.dependent_offset {
            config.layout.dependent_offset = v;
        }
        if let Some(routing) = layout.routing {
            let target = &mut config.layout.routing;
            if let Some(v) = routing.clearance {
                target.clearance = v.max(0.0);
            }
            if let Some(v) = routing.direct_down_ratio {
                target.direct_down_ratio = v.clamp(0.0, 1.0);
            }
            if let Some(v) = routing.direct_up_ratio {
                target.direct_up_ratio = v.clamp(0.0, 1.0);
            }
            if let Some(v) = routing.wide_down_ratio {
                target.wide_down_ratio = v.clamp(0.0, 1.0);
            }
            if let Some(v) = routing.wide_up_ratio {
                target.wide_up_ratio = v.clamp(0.0, 1.0);
            }
        }
    }

    if let Some(vis) = parsed.visibility {
        if let Some(v) = vis.search_miss_opacity {
            config.visibility.search_miss_opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = vis.filter_floor {
            config.visibility.filter_floor = v.clamp(0.0, 1.0);
        }
        if let Some(v) = vis.status_floor {
            config.visibility.status_floor = v.clamp(0.0, 1.0);
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
        if let Some(v) = render.show_labels {
            config.render.show_labels = v;
        }
    }

    Ok(config)
}
