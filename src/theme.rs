use serde::{Deserialize, Serialize};

use crate::ir::ExerciseStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub node_border_color: String,
    pub line_color: String,
    pub background: String,
    pub glyph_color: String,
    pub dragged_outline: String,
}

impl Theme {
    pub fn skill_tree_default() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#333333".to_string(),
            node_border_color: "#333333".to_string(),
            line_color: "#555555".to_string(),
            background: "#FFFFFF".to_string(),
            glyph_color: "#FFFFFF".to_string(),
            dragged_outline: "#F59E0B".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            text_color: "#1C2430".to_string(),
            node_border_color: "#C7D2E5".to_string(),
            line_color: "#7A8AA6".to_string(),
            background: "#FFFFFF".to_string(),
            glyph_color: "#FFFFFF".to_string(),
            dragged_outline: "#F59E0B".to_string(),
        }
    }

    /// Dash pattern for a node outline; only active exercises get a solid ring.
    pub fn status_dasharray(&self, status: ExerciseStatus) -> Option<&'static str> {
        match status {
            ExerciseStatus::Active => None,
            ExerciseStatus::Scheduled => Some("6 3"),
            ExerciseStatus::Tentative => Some("2 3"),
            ExerciseStatus::InDevelopment => Some("8 2 2 2"),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::skill_tree_default()
    }
}
