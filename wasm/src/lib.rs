use std::collections::BTreeMap;

use serde::Deserialize;
use skill_tree_layout::{
    Difficulty, ExerciseStatus, Point, PositionOverlay, RenderOptions, render_with_options,
};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkillTreeRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    show_labels: Option<bool>,
    search: Option<String>,
    #[serde(default)]
    paths: Vec<String>,
    #[serde(default)]
    products: Vec<String>,
    #[serde(default)]
    difficulties: Vec<String>,
    #[serde(default)]
    statuses: Vec<String>,
    #[serde(default)]
    positions: BTreeMap<String, Point>,
}

fn build_render_options(options: SkillTreeRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::skill_tree_default()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(show_labels) = options.show_labels {
        render_options.render.show_labels = show_labels;
    }

    let filters = &mut render_options.filters;
    filters.search = options.search.unwrap_or_default();
    filters.paths.extend(options.paths);
    filters.products.extend(options.products);
    // unknown tokens are ignored, a browser filter panel only offers known ones
    filters
        .difficulties
        .extend(options.difficulties.iter().filter_map(|t| Difficulty::from_token(t)));
    filters
        .statuses
        .extend(options.statuses.iter().filter_map(|t| ExerciseStatus::from_token(t)));

    let mut overlay = PositionOverlay::new();
    overlay.merge(options.positions);
    render_options.overlay = overlay;

    render_options
}

#[wasm_bindgen]
pub fn render_skill_tree_svg(data: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<SkillTreeRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        SkillTreeRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(data, &render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}
