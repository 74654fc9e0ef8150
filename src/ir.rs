use std::ops::{Add, Sub};
use std::path::Path as FsPath;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SkillTreeError;

pub const DEFAULT_PATH_SLUG: &str = "default";
pub const DEFAULT_PATH_COLOR: &str = "#7A8AA6";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn diagonal(self) -> f32 {
        self.x + self.y
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseStatus {
    Active,
    Scheduled,
    Tentative,
    InDevelopment,
}

impl ExerciseStatus {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "scheduled" => Some(Self::Scheduled),
            "tentative" => Some(Self::Tentative),
            "in-development" | "in_development" | "indevelopment" => Some(Self::InDevelopment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Scheduled => "scheduled",
            Self::Tentative => "tentative",
            Self::InDevelopment => "in-development",
        }
    }
}

impl Default for ExerciseStatus {
    fn default() -> Self {
        Self::Tentative
    }
}

// Unknown statuses fall back to `Tentative` so one bad record does not reject the document.
impl<'de> Deserialize<'de> for ExerciseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_token(&raw).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ExerciseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    /// Offset relative to the anchor dependency, or the absolute position for roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learn_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_url: Option<String>,
}

impl Exercise {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: slug.to_string(),
            ..Default::default()
        }
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.dependencies = Some(deps.iter().map(|dep| dep.to_string()).collect());
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    pub fn with_path(mut self, path_slug: &str) -> Self {
        self.path_slug = Some(path_slug.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_path_color")]
    pub color: String,
}

fn default_path_color() -> String {
    DEFAULT_PATH_COLOR.to_string()
}

impl Path {
    pub fn new(slug: &str, color: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: slug.to_string(),
            description: String::new(),
            color: color.to_string(),
        }
    }

    pub fn fallback() -> Self {
        Self {
            slug: DEFAULT_PATH_SLUG.to_string(),
            name: "Default".to_string(),
            description: String::new(),
            color: default_path_color(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillTreeData {
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub paths: Vec<Path>,
}

impl SkillTreeData {
    /// Parses JSON, falling back to JSON5 for hand-edited files.
    pub fn parse(input: &str) -> Result<Self, SkillTreeError> {
        match serde_json::from_str::<Self>(input) {
            Ok(data) => Ok(data),
            Err(json_err) => json5::from_str::<Self>(input).map_err(|json5_err| {
                SkillTreeError::Parse {
                    what: "skill tree data",
                    message: format!("{json_err}; json5: {json5_err}"),
                }
            }),
        }
    }

    pub fn load(path: &FsPath) -> Result<Self, SkillTreeError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SkillTreeError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        Self::parse(&contents)
    }
}
